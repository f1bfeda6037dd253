use serde_json::{json, Value};

use jobsub_core::function::{CallArgs, FunctionFailure, FunctionRegistry};

/// Functions every `jobsub` binary can run as function jobs.
pub fn builtin_registry() -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();
    registry.register_fn("echo", echo);
    registry.register_fn("sum", sum);
    registry
}

/// Return the arguments unchanged.
fn echo(args: CallArgs) -> Result<Value, FunctionFailure> {
    Ok(Value::from(args))
}

/// Add numbers given positionally, as `{"values": [...]}`, or as a single number.
fn sum(args: CallArgs) -> Result<Value, FunctionFailure> {
    let values = match args {
        CallArgs::None => Vec::new(),
        CallArgs::Positional(values) => values,
        CallArgs::Keyword(mut map) => match map.remove("values") {
            Some(Value::Array(values)) => values,
            Some(other) => {
                return Err(FunctionFailure::type_error(format!(
                    "values must be a list, got {other}"
                )))
            }
            None => return Err(FunctionFailure::type_error("missing keyword argument 'values'")),
        },
        CallArgs::Single(value) => vec![value],
    };

    for value in &values {
        if !value.is_number() {
            return Err(FunctionFailure::type_error(format!("not a number: {value}")));
        }
    }
    if values.iter().all(|v| v.is_i64() || v.is_u64()) {
        return sum_integers(&values);
    }
    Ok(json!(values.iter().filter_map(Value::as_f64).sum::<f64>()))
}

/// Exact integer sum; results beyond `u64` are an overflow.
fn sum_integers(values: &[Value]) -> Result<Value, FunctionFailure> {
    let mut total: i128 = 0;
    for value in values {
        let n = match value.as_i64() {
            Some(n) => i128::from(n),
            None => value.as_u64().map(i128::from).unwrap_or_default(),
        };
        total = total
            .checked_add(n)
            .ok_or_else(|| FunctionFailure::new("OverflowError", "integer sum overflowed"))?;
    }
    if let Ok(n) = i64::try_from(total) {
        Ok(json!(n))
    } else if let Ok(n) = u64::try_from(total) {
        Ok(json!(n))
    } else {
        Err(FunctionFailure::new(
            "OverflowError",
            format!("integer sum {total} does not fit in 64 bits"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: Value) -> Result<Value, FunctionFailure> {
        builtin_registry()
            .get(name)
            .unwrap()
            .call(CallArgs::from(args))
    }

    #[test]
    fn sum_accepts_each_argument_shape() {
        assert_eq!(call("sum", json!([1, 2, 3])).unwrap(), json!(6));
        assert_eq!(call("sum", json!({"values": [1.5, 2]})).unwrap(), json!(3.5));
        assert_eq!(call("sum", json!(4)).unwrap(), json!(4));
        assert_eq!(call("sum", json!(null)).unwrap(), json!(0));
    }

    #[test]
    fn sum_keeps_large_integers_exact() {
        let big = 9_007_199_254_740_993i64;
        assert_eq!(call("sum", json!([big, 1])).unwrap(), json!(big + 1));
        assert_eq!(
            call("sum", json!([u64::MAX - 1, 1])).unwrap(),
            json!(u64::MAX)
        );
        assert_eq!(call("sum", json!([i64::MIN, -1])).unwrap_err().kind, "OverflowError");
    }

    #[test]
    fn sum_reports_type_errors() {
        assert_eq!(call("sum", json!([1, "x"])).unwrap_err().kind, "TypeError");
        assert_eq!(call("sum", json!({"other": 1})).unwrap_err().kind, "TypeError");
    }

    #[test]
    fn echo_returns_arguments() {
        assert_eq!(call("echo", json!({"a": [1]})).unwrap(), json!({"a": [1]}));
        assert_eq!(call("echo", json!(null)).unwrap(), json!(null));
    }
}
