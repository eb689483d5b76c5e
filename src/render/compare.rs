use crate::{
    compile::Operator,
    log::{Error, INCOMPATIBLE_TYPES},
};
use serde_json::{Number, Value};
use std::cmp::Ordering;

/// Return true if the given [`Value`] is truthy.
///
/// `false`, `0`, `""`, `[]`, `{}` and `none` are falsy, everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(bo) => *bo,
        Value::Number(nu) => nu.as_f64().is_some_and(|n| n != 0.0),
        Value::String(st) => !st.is_empty(),
        Value::Array(ar) => !ar.is_empty(),
        Value::Object(ob) => !ob.is_empty(),
        Value::Null => false,
    }
}

/// Return true if the two [`Value`] instances are structurally equal.
///
/// Numbers are equal when they hold the same amount, so `1` equals `1.0`.
pub fn is_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => match (left.as_i64(), right.as_i64()) {
            (Some(left), Some(right)) => left == right,
            _ => left.as_f64() == right.as_f64(),
        },
        (Value::Array(left), Value::Array(right)) => {
            left.len() == right.len() && left.iter().zip(right).all(|(l, r)| is_equal(l, r))
        }
        (Value::Object(left), Value::Object(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .all(|(key, l)| right.get(key).is_some_and(|r| is_equal(l, r)))
        }
        (left, right) => left == right,
    }
}

/// Compare the two [`Value`] instances with the given [`Operator`].
///
/// Equality works on any two values. Ordering works on two numbers, two
/// strings or two booleans.
///
/// # Errors
///
/// Returns an [`Error`] if the two types cannot be compared, or the `Operator`
/// is not a comparison.
pub fn compare_values(left: &Value, operator: Operator, right: &Value) -> Result<bool, Error> {
    match operator {
        Operator::Equal => return Ok(is_equal(left, right)),
        Operator::NotEqual => return Ok(!is_equal(left, right)),
        _ => (),
    }

    let ordering = match (left, right) {
        (Value::Number(l), Value::Number(r)) => match (l.as_i64(), r.as_i64()) {
            (Some(l), Some(r)) => Some(l.cmp(&r)),
            _ => as_float(l).partial_cmp(&as_float(r)),
        },
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        (Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
        (left, right) => {
            return Err(Error::build(INCOMPATIBLE_TYPES).with_help(format!(
                "types `{}` and `{}` cannot be compared with `{operator}`",
                type_name(left),
                type_name(right)
            )))
        }
    };

    let result = match (operator, ordering) {
        (_, None) => false,
        (Operator::Greater, Some(o)) => o == Ordering::Greater,
        (Operator::Lesser, Some(o)) => o == Ordering::Less,
        (Operator::GreaterOrEqual, Some(o)) => o != Ordering::Less,
        (Operator::LesserOrEqual, Some(o)) => o != Ordering::Greater,
        (unsupported, _) => {
            return Err(Error::build(INCOMPATIBLE_TYPES)
                .with_help(format!("operator `{unsupported}` is not a comparison")))
        }
    };

    Ok(result)
}

/// Apply the arithmetic [`Operator`] to the two [`Value`] instances.
///
/// `+` works on two numbers, two strings or two arrays. The other operators
/// only work on numbers. Integers stay integers, except for `/` which always
/// produces a float.
///
/// # Errors
///
/// Returns an [`Error`] on mismatched types, integer overflow, or division
/// by zero.
pub fn apply_operator(left: &Value, operator: Operator, right: &Value) -> Result<Value, Error> {
    if operator.is_comparison() {
        return compare_values(left, operator, right).map(Value::Bool);
    }

    match (left, right) {
        (Value::Number(l), Value::Number(r)) => apply_numbers(l, operator, r),
        (Value::String(l), Value::String(r)) if operator == Operator::Add => {
            Ok(Value::String(format!("{l}{r}")))
        }
        (Value::Array(l), Value::Array(r)) if operator == Operator::Add => {
            Ok(Value::Array(l.iter().chain(r).cloned().collect()))
        }
        (left, right) => Err(Error::build(INCOMPATIBLE_TYPES).with_help(format!(
            "operator `{operator}` is invalid on types `{}` and `{}`",
            type_name(left),
            type_name(right)
        ))),
    }
}

/// Apply the arithmetic [`Operator`] to two numbers.
fn apply_numbers(left: &Number, operator: Operator, right: &Number) -> Result<Value, Error> {
    if operator == Operator::Divide {
        let divisor = as_float(right);
        if divisor == 0.0 {
            return Err(error_zero());
        }

        return Ok(float(as_float(left) / divisor));
    }

    if let (Some(l), Some(r)) = (left.as_i64(), right.as_i64()) {
        let result = match operator {
            Operator::Add => l.checked_add(r),
            Operator::Subtract => l.checked_sub(r),
            Operator::Multiply => l.checked_mul(r),
            _ => {
                if r == 0 {
                    return Err(error_zero());
                }
                l.checked_rem(r)
            }
        };

        return result.map(Value::from).ok_or_else(|| {
            Error::build("integer overflow")
                .with_help(format!("`{l} {operator} {r}` does not fit in a 64-bit integer"))
        });
    }

    let (l, r) = (as_float(left), as_float(right));
    let result = match operator {
        Operator::Add => l + r,
        Operator::Subtract => l - r,
        Operator::Multiply => l * r,
        _ => {
            if r == 0.0 {
                return Err(error_zero());
            }
            l % r
        }
    };

    Ok(float(result))
}

/// Negate a number.
///
/// # Errors
///
/// Returns an [`Error`] if the value is not a number, or is the smallest
/// 64-bit integer.
pub fn negate(value: &Value) -> Result<Value, Error> {
    let Value::Number(number) = value else {
        return Err(Error::build(INCOMPATIBLE_TYPES).with_help(format!(
            "only numbers can be negated, found `{}`",
            type_name(value)
        )));
    };

    match number.as_i64() {
        Some(n) => n
            .checked_neg()
            .map(Value::from)
            .ok_or_else(|| Error::build("integer overflow")),
        None => Ok(float(-as_float(number))),
    }
}

/// Return true if the needle is found within the haystack.
///
/// Arrays are searched for an equal element, objects for a key, and strings
/// for a substring.
///
/// # Errors
///
/// Returns an [`Error`] if the haystack can not be searched for the needle.
pub fn contains(needle: &Value, haystack: &Value) -> Result<bool, Error> {
    match (needle, haystack) {
        (needle, Value::Array(array)) => Ok(array.iter().any(|item| is_equal(needle, item))),
        (Value::String(key), Value::Object(object)) => Ok(object.contains_key(key)),
        (Value::String(part), Value::String(string)) => Ok(string.contains(part.as_str())),
        (needle, haystack) => Err(Error::build(INCOMPATIBLE_TYPES).with_help(format!(
            "can not search for `{}` in `{}`",
            type_name(needle),
            type_name(haystack)
        ))),
    }
}

/// Return a short name for the type of the [`Value`], used in error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "none",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

fn as_float(number: &Number) -> f64 {
    number.as_f64().unwrap_or(f64::NAN)
}

/// Return the float as a [`Value`], which is `none` for NaN and infinity.
fn float(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

fn error_zero() -> Error {
    Error::build("division by zero").with_help("the right side of `/` and `%` must not be zero")
}

#[cfg(test)]
mod tests {
    use super::{apply_operator, compare_values, contains, is_equal, is_truthy, negate};
    use crate::{compile::Operator, log::ErrorKind};
    use rstest::rstest;
    use serde_json::{json, Value};

    #[rstest]
    #[case(json!("lorem"), true)]
    #[case(json!(12), true)]
    #[case(json!(-12), true)]
    #[case(json!(114.4), true)]
    #[case(json!(true), true)]
    #[case(json!(["lorem"]), true)]
    #[case(json!({"lorem": "ipsum"}), true)]
    #[case(json!(""), false)]
    #[case(json!(0), false)]
    #[case(json!(0.0), false)]
    #[case(json!(false), false)]
    #[case(json!([]), false)]
    #[case(json!({}), false)]
    #[case(json!(null), false)]
    fn test_truthy(#[case] value: Value, #[case] expect: bool) {
        assert_eq!(is_truthy(&value), expect);
    }

    #[test]
    fn test_equal_is_structural() {
        assert!(is_equal(&json!(1), &json!(1.0)));
        assert!(is_equal(&json!(["a", {"b": 1}]), &json!(["a", {"b": 1.0}])));
        assert!(!is_equal(&json!(["one"]), &json!(["two"])));
        assert!(!is_equal(&json!("1"), &json!(1)));
    }

    #[rstest]
    #[case(json!(100), Operator::Greater, json!(50))]
    #[case(json!("a"), Operator::Lesser, json!("b"))]
    #[case(json!(true), Operator::Greater, json!(false))]
    #[case(json!(10), Operator::GreaterOrEqual, json!(10.0))]
    #[case(json!(1.5), Operator::LesserOrEqual, json!(2))]
    #[case(json!([1]), Operator::Equal, json!([1]))]
    #[case(json!({"a": 1}), Operator::NotEqual, json!({"a": 2}))]
    #[case(json!(null), Operator::Equal, json!(null))]
    fn test_compare_true(#[case] left: Value, #[case] operator: Operator, #[case] right: Value) {
        assert_eq!(compare_values(&left, operator, &right), Ok(true));
    }

    #[test]
    fn test_compare_incompatible() {
        let error = compare_values(&json!("hello"), Operator::Greater, &json!(true)).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Render);
        assert!(compare_values(&json!([1]), Operator::Lesser, &json!([2])).is_err());
    }

    #[rstest]
    #[case(json!(1), Operator::Add, json!(2), json!(3))]
    #[case(json!(1.5), Operator::Add, json!(2), json!(3.5))]
    #[case(json!("a"), Operator::Add, json!("b"), json!("ab"))]
    #[case(json!([1]), Operator::Add, json!([2]), json!([1, 2]))]
    #[case(json!(7), Operator::Subtract, json!(10), json!(-3))]
    #[case(json!(6), Operator::Multiply, json!(7), json!(42))]
    #[case(json!(7), Operator::Divide, json!(2), json!(3.5))]
    #[case(json!(7), Operator::Modulo, json!(4), json!(3))]
    #[case(json!(2), Operator::Lesser, json!(4), json!(true))]
    fn test_apply(
        #[case] left: Value,
        #[case] operator: Operator,
        #[case] right: Value,
        #[case] expect: Value,
    ) {
        assert_eq!(apply_operator(&left, operator, &right), Ok(expect));
    }

    #[rstest]
    #[case(json!(1), Operator::Divide, json!(0))]
    #[case(json!(1), Operator::Modulo, json!(0))]
    #[case(json!(i64::MAX), Operator::Add, json!(1))]
    #[case(json!("a"), Operator::Subtract, json!("b"))]
    #[case(json!(true), Operator::Add, json!(false))]
    #[case(json!("1"), Operator::Add, json!(1))]
    fn test_apply_error(#[case] left: Value, #[case] operator: Operator, #[case] right: Value) {
        assert!(apply_operator(&left, operator, &right).is_err());
    }

    #[test]
    fn test_negate() {
        assert_eq!(negate(&json!(5)), Ok(json!(-5)));
        assert_eq!(negate(&json!(-1.5)), Ok(json!(1.5)));
        assert!(negate(&json!(i64::MIN)).is_err());
        assert!(negate(&json!("a")).is_err());
    }

    #[test]
    fn test_contains() {
        assert_eq!(contains(&json!(2), &json!([1, 2.0])), Ok(true));
        assert_eq!(contains(&json!("a"), &json!({"a": 1})), Ok(true));
        assert_eq!(contains(&json!("ell"), &json!("hello")), Ok(true));
        assert_eq!(contains(&json!("z"), &json!("hello")), Ok(false));
        assert!(contains(&json!(1), &json!("hello")).is_err());
    }
}
