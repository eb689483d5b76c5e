use serde_json::Value;
use std::collections::HashMap;

/// Local names bound while rendering, organized as a stack of frames.
///
/// A frame is pushed for the body of every "if", "for", "while" and "block",
/// so a name first assigned inside a body is gone once the body ends.
#[derive(Debug, Clone)]
pub struct Frames {
    stack: Vec<HashMap<String, Value>>,
}

impl Frames {
    /// Create a new [`Frames`] containing a single, empty frame.
    pub fn new() -> Self {
        Self {
            stack: vec![HashMap::new()],
        }
    }

    /// Begin a new innermost frame.
    pub fn push(&mut self) {
        self.stack.push(HashMap::new());
    }

    /// Discard the innermost frame.
    ///
    /// The outermost frame is never removed.
    pub fn pop(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    /// Return the value of the name, searching from the innermost frame out.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.stack.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Bind the name in the innermost frame.
    pub fn bind(&mut self, name: &str, value: Value) {
        if let Some(frame) = self.stack.last_mut() {
            frame.insert(name.to_owned(), value);
        }
    }

    /// Assign the name.
    ///
    /// The nearest frame that already binds the name is updated, otherwise the
    /// name is bound in the innermost frame.
    pub fn set(&mut self, name: &str, value: Value) {
        match self
            .stack
            .iter_mut()
            .rev()
            .find_map(|frame| frame.get_mut(name))
        {
            Some(slot) => *slot = value,
            None => self.bind(name, value),
        }
    }

    /// Return a copy of every visible binding, flattened into a single frame.
    pub fn snapshot(&self) -> Self {
        let mut flat = HashMap::new();
        for frame in &self.stack {
            flat.extend(frame.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        Self { stack: vec![flat] }
    }
}

impl Default for Frames {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Frames;
    use serde_json::json;

    #[test]
    fn test_shadow_and_pop() {
        let mut frames = Frames::new();
        frames.bind("a", json!(1));
        frames.push();
        frames.bind("a", json!(2));

        assert_eq!(frames.get("a"), Some(&json!(2)));
        frames.pop();
        assert_eq!(frames.get("a"), Some(&json!(1)));
    }

    #[test]
    fn test_set_updates_nearest() {
        let mut frames = Frames::new();
        frames.bind("total", json!(0));
        frames.push();
        frames.set("total", json!(5));
        frames.set("scratch", json!(true));
        frames.pop();

        assert_eq!(frames.get("total"), Some(&json!(5)));
        assert_eq!(frames.get("scratch"), None);
    }

    #[test]
    fn test_snapshot() {
        let mut frames = Frames::new();
        frames.bind("a", json!(1));
        frames.push();
        frames.bind("a", json!(2));
        frames.bind("b", json!(3));

        let mut snapshot = frames.snapshot();
        snapshot.pop();
        assert_eq!(snapshot.get("a"), Some(&json!(2)));
        assert_eq!(snapshot.get("b"), Some(&json!(3)));
    }
}
