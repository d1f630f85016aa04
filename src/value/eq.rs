//! Identity and structural equality.

use super::Value;

/// Identity equality between numbers: `NaN` equals only `NaN`, and `+0` is
/// distinct from `-0`.
pub fn same_number(a: f64, b: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return a.is_nan() && b.is_nan();
    }
    a == b && a.is_sign_negative() == b.is_sign_negative()
}

/// Identity equality, the comparison literal patterns use.
///
/// Primitives compare by value (numbers via [`same_number`], integers and
/// floats cross-compare). Containers and other reference-like values are
/// never identical unless they are the same function.
pub fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            match (a.as_number(), b.as_number()) {
                (Some(x), Some(y)) => same_number(x, y),
                _ => false,
            }
        }
        (Value::BigInt(x), Value::BigInt(y)) => x == y,
        (Value::Symbol(x), Value::Symbol(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Function(x), Value::Function(y)) => x.ptr_eq(y),
        _ => false,
    }
}

/// Structural equality for literals, sequences, mappings and the other
/// compound kinds.
///
/// Unlike [`same_value`], `+0` and `-0` are equal here. `NaN` still equals
/// `NaN`.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            match (a, b) {
                (Value::Int(x), Value::Int(y)) => x == y,
                _ => match (a.as_number(), b.as_number()) {
                    (Some(x), Some(y)) => x == y || (x.is_nan() && y.is_nan()),
                    _ => false,
                },
            }
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| deep_equal(x, y)))
        }
        (Value::Set(xs), Value::Set(ys)) => {
            xs.len() == ys.len() && xs.iter().all(|x| ys.iter().any(|y| deep_equal(x, y)))
        }
        (Value::Map(xs), Value::Map(ys)) => {
            xs.len() == ys.len()
                && xs.iter().all(|(kx, vx)| {
                    ys.iter()
                        .any(|(ky, vy)| deep_equal(kx, ky) && deep_equal(vx, vy))
                })
        }
        (Value::RegExp(x), Value::RegExp(y)) => x.as_str() == y.as_str(),
        (Value::Date(x), Value::Date(y)) => x == y,
        (Value::Error(x), Value::Error(y)) => x == y,
        (Value::Instance(x), Value::Instance(y)) => {
            x.class.name == y.class.name
                && x.fields.len() == y.fields.len()
                && x
                    .fields
                    .iter()
                    .all(|(k, v)| y.fields.get(k).is_some_and(|w| deep_equal(v, w)))
        }
        _ => same_value(a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ErrorValue;

    #[test]
    fn nan_and_signed_zero_identity() {
        assert!(same_value(&Value::Float(f64::NAN), &Value::Float(f64::NAN)));
        assert!(!same_value(&Value::Float(0.0), &Value::Float(-0.0)));
        assert!(!same_value(&Value::Int(0), &Value::Float(-0.0)));
        assert!(same_value(&Value::Int(0), &Value::Float(0.0)));
    }

    #[test]
    fn int_float_cross_compare() {
        assert!(same_value(&Value::Int(4), &Value::Float(4.0)));
        assert!(!same_value(&Value::Int(4), &Value::Float(4.2)));
        assert!(!same_value(&Value::Int(1), &Value::BigInt(1)));
    }

    #[test]
    fn containers_are_not_identical() {
        let a = Value::array([Value::Int(1)]);
        assert!(!same_value(&a, &a.clone()));
        assert!(deep_equal(&a, &a.clone()));
    }

    #[test]
    fn deep_equal_objects_ignore_order() {
        let a = Value::object([("x", Value::Int(1)), ("y", Value::Int(2))]);
        let b = Value::object([("y", Value::Int(2)), ("x", Value::Int(1))]);
        let c = Value::object([("x", Value::Int(1))]);
        assert!(deep_equal(&a, &b));
        assert!(!deep_equal(&a, &c));
        assert!(!deep_equal(&c, &a));
    }

    #[test]
    fn deep_equal_nested() {
        let a = Value::object([("p", Value::array([Value::Int(1), Value::from("s")]))]);
        let b = Value::object([("p", Value::array([Value::Int(1), Value::from("s")]))]);
        let c = Value::object([("p", Value::array([Value::Int(1), Value::from("t")]))]);
        assert!(deep_equal(&a, &b));
        assert!(!deep_equal(&a, &c));
    }

    #[test]
    fn deep_equal_zero_signs_and_nan() {
        assert!(deep_equal(&Value::Float(0.0), &Value::Float(-0.0)));
        assert!(deep_equal(&Value::Float(f64::NAN), &Value::Float(f64::NAN)));
    }

    #[test]
    fn deep_equal_sets_and_maps_unordered() {
        let s1 = Value::Set(vec![Value::Int(1), Value::Int(2)]);
        let s2 = Value::Set(vec![Value::Int(2), Value::Int(1)]);
        assert!(deep_equal(&s1, &s2));

        let m1 = Value::Map(vec![(Value::from("a"), Value::Int(1))]);
        let m2 = Value::Map(vec![(Value::from("a"), Value::Int(2))]);
        assert!(!deep_equal(&m1, &m2));
    }

    #[test]
    fn deep_equal_misc_kinds() {
        assert!(deep_equal(&Value::Date(5), &Value::Date(5)));
        assert!(!deep_equal(&Value::Date(5), &Value::Int(5)));
        assert!(deep_equal(
            &Value::regexp("^a+$").unwrap(),
            &Value::regexp("^a+$").unwrap()
        ));
        assert!(deep_equal(
            &Value::Error(ErrorValue::new("TypeError", "x")),
            &Value::Error(ErrorValue::new("TypeError", "x"))
        ));
    }
}
