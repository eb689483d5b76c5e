use crate::log::Error;
use serde::Serialize;
use serde_json::{to_value, Value};
use std::collections::HashMap;

/// Provides storage for data that templates can be rendered against.
///
/// Named values are found by name from within a template. Positional values,
/// added with [`push`][`Store::push`], are bound in order to the parameters
/// a template declares with `with`.
///
/// # Examples
///
/// ```
/// use brim::Store;
///
/// let store = Store::new()
///     .with_must("name", "taylor")
///     .with_arg_must("Welcome");
///
/// assert_eq!(store.get("name").and_then(|v| v.as_str()), Some("taylor"));
/// assert_eq!(store.positional().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Store {
    data: HashMap<String, Value>,
    positional: Vec<Value>,
}

impl Store {
    /// Create a new Store.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            positional: vec![],
        }
    }

    /// Insert the value into the Store.
    ///
    /// # Errors
    ///
    /// Returns an error if the serialization fails.
    pub fn insert<S, T>(&mut self, key: S, value: T) -> Result<(), Error>
    where
        S: Into<String>,
        T: Serialize,
    {
        let key = key.into();
        let value = serialize(&key, value)?;
        self.data.insert(key, value);

        Ok(())
    }

    /// Insert the value into the Store.
    ///
    /// # Panics
    ///
    /// Will panic if the serialization fails.
    #[inline]
    pub fn insert_must<S, T>(&mut self, key: S, value: T)
    where
        S: Into<String>,
        T: Serialize,
    {
        self.data.insert(
            key.into(),
            to_value(value).expect("value should be serializable"),
        );
    }

    /// Insert the value into the Store.
    ///
    /// Returns the Store, so additional methods may be chained.
    ///
    /// # Errors
    ///
    /// Returns an error if the serialization fails.
    pub fn with<S, T>(mut self, key: S, value: T) -> Result<Self, Error>
    where
        S: Into<String>,
        T: Serialize,
    {
        self.insert(key, value)?;

        Ok(self)
    }

    /// Insert the value into the Store.
    ///
    /// Returns the Store, so additional methods may be chained.
    ///
    /// # Panics
    ///
    /// Will panic if the serialization fails.
    #[inline]
    pub fn with_must<S, T>(mut self, key: S, value: T) -> Self
    where
        S: Into<String>,
        T: Serialize,
    {
        self.insert_must(key, value);

        self
    }

    /// Add a positional argument.
    ///
    /// # Errors
    ///
    /// Returns an error if the serialization fails.
    pub fn push<T>(&mut self, value: T) -> Result<(), Error>
    where
        T: Serialize,
    {
        let index = self.positional.len().to_string();
        let value = serialize(&index, value)?;
        self.positional.push(value);

        Ok(())
    }

    /// Add a positional argument.
    ///
    /// Returns the Store, so additional methods may be chained.
    ///
    /// # Errors
    ///
    /// Returns an error if the serialization fails.
    pub fn with_arg<T>(mut self, value: T) -> Result<Self, Error>
    where
        T: Serialize,
    {
        self.push(value)?;

        Ok(self)
    }

    /// Add a positional argument.
    ///
    /// Returns the Store, so additional methods may be chained.
    ///
    /// # Panics
    ///
    /// Will panic if the serialization fails.
    #[inline]
    pub fn with_arg_must<T>(mut self, value: T) -> Self
    where
        T: Serialize,
    {
        self.positional
            .push(to_value(value).expect("value should be serializable"));

        self
    }

    /// Get the value of the given key, if any.
    #[inline]
    pub fn get(&self, index: &str) -> Option<&Value> {
        self.data.get(index)
    }

    /// Return the positional arguments, in the order they were added.
    #[inline]
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }
}

/// Serialize the value, naming the key in the error when it fails.
fn serialize<T>(key: &str, value: T) -> Result<Value, Error>
where
    T: Serialize,
{
    to_value(value).map_err(|error| {
        Error::build(format!("value for `{key}` is unserializable")).with_source(error)
    })
}

#[cfg(test)]
mod tests {
    use crate::Store;
    use serde::Serialize;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_insert() {
        let mut store = Store::new();
        store.insert_must("one", "two");

        assert!(store
            .get("one")
            .is_some_and(|t| t.as_str().unwrap() == "two"));
    }

    #[test]
    fn test_insert_fluent() {
        assert!(Store::new()
            .with_must("three", "four")
            .get("three")
            .is_some_and(|t| t.as_str().unwrap() == "four"))
    }

    #[test]
    fn test_insert_struct() {
        #[derive(Serialize)]
        struct Person {
            name: String,
            age: u8,
        }

        let store = Store::new().with_must(
            "person",
            Person {
                name: "taylor".into(),
                age: 33,
            },
        );

        assert_eq!(store.get("person"), Some(&json!({"name": "taylor", "age": 33})));
    }

    #[test]
    fn test_insert_unserializable() {
        // Maps with non-string keys can not become json objects.
        let mut map = HashMap::new();
        map.insert((1, 2), "a");

        assert!(Store::new().with("map", map).is_err());
    }

    #[test]
    fn test_positional() {
        let store = Store::new().with_arg_must(1).with_arg("two").unwrap();

        assert_eq!(store.positional(), &[json!(1), json!("two")]);
    }
}
