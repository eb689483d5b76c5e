use super::{Error, ErrorKind};
use std::fmt::Display;

pub const UNEXPECTED_TOKEN: &str = "unexpected token";
pub const UNEXPECTED_BLOCK: &str = "unexpected block";
pub const UNEXPECTED_EOF: &str = "unexpected eof";
pub const UNCLOSED_TAG: &str = "unclosed tag";
pub const UNCLOSED_BLOCK: &str = "unclosed block";
pub const INVALID_SYNTAX: &str = "invalid syntax";
pub const INVALID_FUNCTION: &str = "invalid function";
pub const INCOMPATIBLE_TYPES: &str = "incompatible types";

/// Return an [`Error`] explaining that the end of source was not expected.
pub fn error_eof(source: &str) -> Error {
    let source_len = source.len();
    Error::new(ErrorKind::Parse, UNEXPECTED_EOF)
        .with_pointer(source, source_len..source_len)
        .with_help("expected additional tokens, did you close all blocks and expressions?")
}

/// Return an [`Error`] explaining that the write operation failed.
///
/// This is likely caused by a failure during a `write!` macro operation.
pub fn error_write() -> Error {
    Error::build("write failure")
        .with_help("failed to write result of render, are you low on memory?")
}

/// Return an [`Error`] describing an identifier that is not defined anywhere.
pub fn error_undefined(name: &str) -> Error {
    Error::new(ErrorKind::Name, format!("undefined name `{name}`")).with_help(format!(
        "`{name}` is not a local, not in the store and not a global, \
        did you forget to pass it in?"
    ))
}

/// Return an [`Error`] describing a missing template.
pub fn error_missing_template(name: &str) -> Error {
    Error::new(ErrorKind::NotFound, format!("template `{name}` not found")).with_help(format!(
        "no file named `{name}` exists in the template directory"
    ))
}

/// Return an [`Error`] describing a template chain that loops back on itself.
pub fn error_circular(chain: &[String], name: &str) -> Error {
    let path = chain
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(name))
        .collect::<Vec<_>>()
        .join(" -> ");

    Error::new(
        ErrorKind::CircularExtends,
        format!("template `{name}` extends or includes itself"),
    )
    .with_help(format!("the chain is `{path}`"))
}

/// Return a string describing an unexpected operator.
pub fn expected_operator<T>(received: T) -> String
where
    T: Display,
{
    format!(
        "expected operator like `+`, `-`, `*`, `/`, `==`, `!=`, `>=`, `<=`, found `{}`",
        received
    )
}

/// Return a string describing an unexpected token where a keyword was expected.
pub fn expected_keyword<T>(received: T) -> String
where
    T: Display,
{
    format!(
        "expected keyword like `if`, `for`, `while`, `set`, `block`, `extends`, \
        `include`, `with` or `end`, found {}",
        received
    )
}

#[cfg(test)]
mod tests {
    use super::error_circular;

    #[test]
    fn test_circular_chain() {
        let error = error_circular(&["a.html".into(), "b.html".into()], "a.html");

        assert_eq!(error.help(), Some("the chain is `a.html -> b.html -> a.html`"));
    }
}
