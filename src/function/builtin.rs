use crate::{function::Function, log::Error, pipe::stringify, render::type_name};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Return the functions every `Engine` starts out with.
pub(crate) fn builtins() -> HashMap<String, Box<dyn Function>> {
    let mut functions: HashMap<String, Box<dyn Function>> = HashMap::new();
    functions.insert("len".into(), Box::new(len));
    functions.insert("range".into(), Box::new(range));
    functions.insert("upper".into(), Box::new(upper));
    functions.insert("lower".into(), Box::new(lower));
    functions.insert("join".into(), Box::new(join));
    functions.insert("str".into(), Box::new(to_str));

    functions
}

/// Return the number of characters in a string, or items in a list or object.
fn len(arguments: &[Value]) -> Result<Value, Error> {
    let [value] = arguments else {
        return Err(error_count("len", "1", arguments));
    };

    let length = match value {
        Value::String(string) => string.chars().count(),
        Value::Array(array) => array.len(),
        Value::Object(object) => object.len(),
        value => {
            return Err(Error::build(format!(
                "function `len` expects a string, list or object, received `{}`",
                type_name(value)
            )))
        }
    };

    Ok(json!(length))
}

/// Return a list of integers.
///
/// `range(3)` is `[0, 1, 2]`, `range(1, 3)` is `[1, 2]` and `range(0, 6, 2)`
/// is `[0, 2, 4]`.
fn range(arguments: &[Value]) -> Result<Value, Error> {
    let integers = arguments
        .iter()
        .map(|value| {
            value.as_i64().ok_or_else(|| {
                Error::build(format!(
                    "function `range` expects integer arguments, received `{value}`"
                ))
            })
        })
        .collect::<Result<Vec<i64>, Error>>()?;

    let (start, end, step) = match integers[..] {
        [end] => (0, end, 1),
        [start, end] => (start, end, 1),
        [start, end, step] => (start, end, step),
        _ => return Err(error_count("range", "1 to 3", arguments)),
    };
    if step == 0 {
        return Err(Error::build("function `range` expects a step other than `0`"));
    }

    let mut items = vec![];
    let mut current = start;
    while (step > 0 && current < end) || (step < 0 && current > end) {
        items.push(json!(current));
        match current.checked_add(step) {
            Some(next) => current = next,
            None => break,
        }
    }

    Ok(Value::Array(items))
}

fn upper(arguments: &[Value]) -> Result<Value, Error> {
    match arguments {
        [Value::String(string)] => Ok(json!(string.to_uppercase())),
        _ => Err(Error::build("function `upper` requires string input")
            .with_help("use quotes or `str` to coerce data to string")),
    }
}

fn lower(arguments: &[Value]) -> Result<Value, Error> {
    match arguments {
        [Value::String(string)] => Ok(json!(string.to_lowercase())),
        _ => Err(Error::build("function `lower` requires string input")
            .with_help("use quotes or `str` to coerce data to string")),
    }
}

/// Join the items of a list into a string, with an optional separator.
fn join(arguments: &[Value]) -> Result<Value, Error> {
    let (items, separator) = match arguments {
        [Value::Array(items)] => (items, ""),
        [Value::Array(items), Value::String(separator)] => (items, separator.as_str()),
        _ => {
            return Err(Error::build(
                "function `join` expects a list and an optional string separator",
            ))
        }
    };

    let joined = items.iter().map(stringify).collect::<Vec<_>>().join(separator);

    Ok(json!(joined))
}

/// Return the value as it would be rendered, without escaping.
fn to_str(arguments: &[Value]) -> Result<Value, Error> {
    match arguments {
        [value] => Ok(Value::String(stringify(value))),
        _ => Err(error_count("str", "1", arguments)),
    }
}

fn error_count(name: &str, expect: &str, arguments: &[Value]) -> Error {
    Error::build(format!(
        "function `{name}` expects `{expect}` arguments, received `{}`",
        arguments.len()
    ))
}

#[cfg(test)]
mod tests {
    use super::builtins;
    use rstest::rstest;
    use serde_json::{json, Value};

    #[rstest]
    #[case("len", vec![json!("héllo")], json!(5))]
    #[case("len", vec![json!([1, 2])], json!(2))]
    #[case("len", vec![json!({"a": 1})], json!(1))]
    #[case("range", vec![json!(3)], json!([0, 1, 2]))]
    #[case("range", vec![json!(1), json!(3)], json!([1, 2]))]
    #[case("range", vec![json!(0), json!(6), json!(2)], json!([0, 2, 4]))]
    #[case("range", vec![json!(3), json!(0), json!(-1)], json!([3, 2, 1]))]
    #[case("range", vec![json!(-2)], json!([]))]
    #[case("upper", vec![json!("abc")], json!("ABC"))]
    #[case("lower", vec![json!("ABC")], json!("abc"))]
    #[case("join", vec![json!(["a", 1, null])], json!("a1"))]
    #[case("join", vec![json!(["a", "b"]), json!(", ")], json!("a, b"))]
    #[case("str", vec![json!(1.5)], json!("1.5"))]
    #[case("str", vec![json!([1, "a"])], json!("[1, a]"))]
    fn test_builtin(#[case] name: &str, #[case] arguments: Vec<Value>, #[case] expect: Value) {
        let functions = builtins();
        let function = functions.get(name).unwrap();

        assert_eq!(function.call(&arguments), Ok(expect));
    }

    #[rstest]
    #[case("len", vec![json!(1)])]
    #[case("len", vec![])]
    #[case("range", vec![json!(0), json!(5), json!(0)])]
    #[case("range", vec![json!("a")])]
    #[case("range", vec![])]
    #[case("upper", vec![json!(1)])]
    #[case("join", vec![json!("a")])]
    #[case("str", vec![json!(1), json!(2)])]
    fn test_builtin_error(#[case] name: &str, #[case] arguments: Vec<Value>) {
        let functions = builtins();

        assert!(functions.get(name).unwrap().call(&arguments).is_err());
    }
}
