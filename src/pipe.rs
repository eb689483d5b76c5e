use serde_json::{Map, Value};
use std::fmt::{Arguments, Result, Write};

/// Wraps some underlying buffer by providing methods that write to it
/// in different formats.
pub struct Pipe<'buffer> {
    buffer: &'buffer mut (dyn Write + 'buffer),
}

impl<'buffer> Pipe<'buffer> {
    /// Create a new Pipe that writes to the given buffer.
    pub fn new(buffer: &'buffer mut String) -> Self {
        Self { buffer }
    }

    /// Write the given Value to the Pipe buffer.
    ///
    /// The Pipe will handle formatting the value. When `escape` is true, any
    /// text within the value is HTML escaped.
    ///
    /// # Errors
    ///
    /// The Pipe supports all Value types, so the only error that will
    /// be returned is propogated from the [write!] macro itself.
    pub fn write_value(&mut self, value: &Value, escape: bool) -> Result {
        match value {
            Value::Null => Ok(()),
            Value::Bool(bool) => write!(self.buffer, "{bool}"),
            Value::Number(number) => write!(self.buffer, "{number}"),
            Value::String(string) => self.write_text(string, escape),
            Value::Array(array) => self.write_array(array, escape),
            Value::Object(object) => self.write_object(object, escape),
        }
    }

    /// Write the text to the buffer, escaping `&`, `<`, `>`, `"` and `'`
    /// when asked to.
    fn write_text(&mut self, text: &str, escape: bool) -> Result {
        if !escape {
            return self.buffer.write_str(text);
        }

        let mut last = 0;
        for (index, char) in text.char_indices() {
            let entity = match char {
                '&' => "&amp;",
                '<' => "&lt;",
                '>' => "&gt;",
                '"' => "&quot;",
                '\'' => "&#39;",
                _ => continue,
            };
            self.buffer.write_str(&text[last..index])?;
            self.buffer.write_str(entity)?;
            last = index + 1;
        }

        self.buffer.write_str(&text[last..])
    }

    /// Write the value to the buffer as a comma separated list and
    /// surrounded by braces.
    fn write_array(&mut self, value: &[Value], escape: bool) -> Result {
        write!(self.buffer, "[")?;
        let mut iter = value.iter();
        if let Some(item) = iter.next() {
            self.write_value(item, escape)?;
            for item in iter {
                write!(self.buffer, ", ")?;
                self.write_value(item, escape)?;
            }
        }
        write!(self.buffer, "]")
    }

    /// Write the value to the buffer as key/value pairs and surrounded
    /// by curly braces.
    fn write_object(&mut self, value: &Map<String, Value>, escape: bool) -> Result {
        write!(self.buffer, "{{")?;
        let mut iter = value.iter();
        if let Some((key, value)) = iter.next() {
            self.write_text(key, escape)?;
            write!(self.buffer, ": ")?;
            self.write_value(value, escape)?;
            for (key, value) in iter {
                write!(self.buffer, ", ")?;
                self.write_text(key, escape)?;
                write!(self.buffer, ": ")?;
                self.write_value(value, escape)?;
            }
        }
        write!(self.buffer, "}}")
    }
}

impl Write for Pipe<'_> {
    #[inline]
    fn write_str(&mut self, s: &str) -> Result {
        Write::write_str(self.buffer, s)
    }

    #[inline]
    fn write_char(&mut self, c: char) -> Result {
        Write::write_char(self.buffer, c)
    }

    #[inline]
    fn write_fmt(&mut self, args: Arguments<'_>) -> Result {
        Write::write_fmt(self.buffer, args)
    }
}

/// Return the text a [`Value`] renders as, without escaping.
///
/// Strings are returned as-is rather than quoted, `none` becomes an empty
/// string.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(string) => string.clone(),
        value => {
            let mut buffer = String::new();
            // Writing to a String never fails.
            let _ = Pipe::new(&mut buffer).write_value(value, false);

            buffer
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{stringify, Pipe};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::{json, Value};

    #[rstest]
    #[case(json!(null), "")]
    #[case(json!(true), "true")]
    #[case(json!(10), "10")]
    #[case(json!(1.5), "1.5")]
    #[case(json!("<b>"), "&lt;b&gt;")]
    #[case(json!("Tom & 'Jerry' \"x\""), "Tom &amp; &#39;Jerry&#39; &quot;x&quot;")]
    #[case(json!([1, "<", null]), "[1, &lt;, ]")]
    #[case(json!({"a": "<"}), "{a: &lt;}")]
    #[case(json!([]), "[]")]
    fn test_write_escaped(#[case] value: Value, #[case] expect: &str) {
        let mut buffer = String::new();
        Pipe::new(&mut buffer).write_value(&value, true).unwrap();

        assert_eq!(buffer, expect);
    }

    #[test]
    fn test_write_raw() {
        let mut buffer = String::new();
        Pipe::new(&mut buffer)
            .write_value(&json!("<b>&</b>"), false)
            .unwrap();

        assert_eq!(buffer, "<b>&</b>");
    }

    #[test]
    fn test_stringify() {
        assert_eq!(stringify(&json!("a")), "a");
        assert_eq!(stringify(&json!([1, 2])), "[1, 2]");
        assert_eq!(stringify(&json!(null)), "");
    }
}
