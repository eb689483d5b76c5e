//! Contains the `Function` trait and other types useful for creating and using functions.
//!
//! A function is any type which implements the [`Function`][`crate::function::Function`]
//! trait. You can assign a function to an [`Engine`][`crate::Engine`] with the
//! [`add_function`][`crate::Engine::add_function()`] method, and it will be available in
//! any [`Template`][`crate::Template`] rendered by that engine.
//!
//! Functions may be called directly, or at the end of a pipe:
//!
//! ```html
//! (( upper(name) ))
//! (( name | join(", ") | upper ))
//! ```
//!
//! The pipe `value | name(arguments)` is the same as `name(value, arguments)`, so in the
//! second expression `join` receives the value of `name` as its first argument and `", "`
//! as its second.
//!
//! Every `Engine` starts out with these functions:
//!
//! | name | arguments | returns |
//! | --- | --- | --- |
//! | `len` | string, list or object | number of characters or items |
//! | `range` | `end`, or `start, end`, or `start, end, step` | list of integers |
//! | `upper` | string | uppercase string |
//! | `lower` | string | lowercase string |
//! | `join` | list, optional separator | string |
//! | `str` | any value | the value as it would render, unescaped |
//!
//! # Examples
//!
//! We'll create a function that allows us to repeat a string.
//!
//! You can either create a struct and implement the trait on that, or just create
//! a function matching the trait signature. Brim will accept both.
//!
//! ```rust
//! use brim::{
//!     function::{
//!         serde::{json, Value},
//!         Error,
//!     },
//!     Engine, Store,
//! };
//!
//! fn repeat(arguments: &[Value]) -> Result<Value, Error> {
//!     match arguments {
//!         [Value::String(text), Value::Number(count)] => {
//!             let count = count.as_u64().unwrap_or(0) as usize;
//!             Ok(json!(text.repeat(count)))
//!         }
//!         _ => Err(Error::build("function `repeat` expects a string and a number")),
//!     }
//! }
//!
//! let engine = Engine::default().with_function_must("repeat", repeat);
//! let template = engine.compile("(( word | repeat(3) ))").unwrap();
//!
//! let result = engine.render_template(&template, &Store::new().with_must("word", "ha"));
//!
//! assert_eq!(result.unwrap(), "hahaha");
//! ```
//!
//! If you return an [`Error`][`crate::function::Error`] from your function, Brim will
//! attach the line and column of the call before handing it back.
mod builtin;

pub mod serde {
    //! Contains types from `serde_json`.
    pub use serde_json::*;
}
pub mod visual {
    //! Contains the `Visual` trait and different types which implement `Visual`.
    pub use crate::log::{Pointer, Visual};
}

pub use crate::{log::Error, region::Region};

pub(crate) use builtin::builtins;

use serde_json::Value;

/// Describes a type which can be called from within a template.
pub trait Function: Sync + Send {
    /// Execute the function with the given arguments and return a new Value as output.
    fn call(&self, arguments: &[Value]) -> Result<Value, Error>;
}

/// Allows assignment of any function matching the signature of `call` as a `Function`
/// to `Engine`, instead of requiring a struct be created.
impl<F> Function for F
where
    F: Fn(&[Value]) -> Result<Value, Error> + Sync + Send,
{
    fn call(&self, arguments: &[Value]) -> Result<Value, Error> {
        self(arguments)
    }
}

#[cfg(test)]
mod tests {
    use crate::{engine::Engine, log::Error, store::Store};
    use serde_json::{json, Value};

    #[test]
    fn test_call_chain() {
        let engine = get_test_engine();
        let result = engine.render_template(
            &engine.compile("(( name | to_lowercase | left(3) ))").unwrap(),
            &Store::new().with_must("name", "TAYLOR"),
        );

        assert_eq!(result.unwrap(), "tay");
    }

    #[test]
    fn test_call_chain_error() {
        let engine = get_test_engine();
        let result = engine.render_template(
            &engine
                .compile("(( name | to_lowercase | left(\"10\") ))")
                .unwrap(),
            &Store::new().with_must("name", "TAYLOR"),
        );

        let error = result.unwrap_err();
        assert_eq!(error.position().map(|p| p.column), Some(26));
    }

    #[test]
    fn test_struct_function() {
        struct Prefix(&'static str);

        impl super::Function for Prefix {
            fn call(&self, arguments: &[Value]) -> Result<Value, Error> {
                let rest = arguments.first().and_then(Value::as_str).unwrap_or_default();

                Ok(json!(format!("{}{rest}", self.0)))
            }
        }

        let engine = Engine::default().with_function_must("greet", Prefix("hello, "));
        let result = engine.render_template(
            &engine.compile("(( greet(name) ))").unwrap(),
            &Store::new().with_must("name", "taylor"),
        );

        assert_eq!(result.unwrap(), "hello, taylor");
    }

    /// Return a new Engine equipped with test functions.
    fn get_test_engine() -> Engine {
        Engine::default()
            .with_function_must("to_lowercase", to_lowercase)
            .with_function_must("left", left)
    }

    /// Lowercase the given value.
    ///
    /// # Errors
    ///
    /// Returns an Error if the Value is not of type String.
    fn to_lowercase(arguments: &[Value]) -> Result<Value, Error> {
        match arguments {
            [Value::String(string)] => Ok(json!(string.to_lowercase())),
            _ => Err(Error::build("function `to_lowercase` requires string input")),
        }
    }

    /// Return the first n characters of the input Value from the left,
    /// where n is the value of the argument.
    ///
    /// Similar to TSQL `LEFT`.
    ///
    /// # Errors
    ///
    /// Returns an Error if the input is not a string, the wrong number of
    /// arguments is provided, or the argument is not a number.
    fn left(arguments: &[Value]) -> Result<Value, Error> {
        let [value, n] = arguments else {
            return Err(Error::build(format!(
                "function `left` expects `2` arguments, received `{}`",
                arguments.len()
            )));
        };

        match (value, n) {
            (Value::String(string), Value::Number(number)) => match number.as_u64() {
                Some(u64) => Ok(json!(string.chars().take(u64 as usize).collect::<String>())),
                None => Err(Error::build(format!(
                    "function `left` expects an integer (not a float) that fits in u64, \
                    `{number}` is invalid"
                ))),
            },
            (Value::String(_), n) => Err(Error::build(format!(
                "function `left` expects a number argument, received `{n}`"
            ))),
            _ => Err(Error::build("function `left` expects string input")),
        }
    }
}
