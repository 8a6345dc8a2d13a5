// [apps/worker/src/function_registry.rs]
//! The worker's named-function registry. Resolves the Open Question left
//! by the opaque serialization non-goal: since Rust cannot deserialize an
//! arbitrary closure the way the original's cloudpickle-based blob did,
//! `func` in an `execute` envelope is a name looked up here rather than
//! executable bytes.

use serde_json::Value;

pub fn dispatch(func_name: &str, args: &Value, kwargs: &Value) -> Result<Value, String> {
    match func_name {
        "add" => add(args),
        "echo" => Ok(echo(args, kwargs)),
        "sleep" => sleep(args),
        other => Err(format!("unknown function: {other}")),
    }
}

fn add(args: &Value) -> Result<Value, String> {
    let items = args.as_array().ok_or("add expects a positional argument array")?;
    let mut total = 0.0;
    for item in items {
        total += item.as_f64().ok_or("add expects numeric arguments")?;
    }
    Ok(Value::from(total))
}

fn echo(args: &Value, kwargs: &Value) -> Value {
    serde_json::json!({ "args": args, "kwargs": kwargs })
}

fn sleep(args: &Value) -> Result<Value, String> {
    let seconds = args
        .as_array()
        .and_then(|a| a.first())
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    std::thread::sleep(std::time::Duration::from_secs_f64(seconds.max(0.0)));
    Ok(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn add_sums_positional_arguments() {
        let result = dispatch("add", &json!([1, 2, 3]), &json!({})).unwrap();
        assert_eq!(result, json!(6.0));
    }

    #[test]
    fn unknown_function_is_an_error() {
        let err = dispatch("does_not_exist", &json!([]), &json!({})).unwrap_err();
        assert!(err.contains("does_not_exist"));
    }
}
