//! JSON ↔ [`Value`] for command-line input and output.

use serde_json::{json, Map, Number, Value as Json};
use xrpc_codec::scalar::{encode_base64, format_timestamp};
use xrpc_value::{to_value, Value};

use crate::exit::{CliError, CliResult, DATA_INVALID, USAGE};

/// Parse a JSON document into parameters.
///
/// An array gives one parameter per element; any other document is a
/// single parameter.
pub fn params_from_json(text: &str) -> CliResult<Vec<Value>> {
    let parsed: Json = serde_json::from_str(text)
        .map_err(|err| CliError::new(USAGE, format!("params are not valid JSON: {err}")))?;
    let items = match parsed {
        Json::Array(items) => items,
        other => vec![other],
    };
    items
        .iter()
        .map(|item| {
            to_value(item)
                .map_err(|err| CliError::new(DATA_INVALID, format!("cannot encode {item}: {err}")))
        })
        .collect()
}

/// Render a value as JSON. Binary becomes base64 text, timestamps their
/// wire form, and non-finite doubles `null`.
pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Boolean(flag) => Json::Bool(*flag),
        Value::Integer(n) => Json::from(*n),
        Value::Double(x) => Number::from_f64(*x).map(Json::Number).unwrap_or(Json::Null),
        Value::Text(text) => Json::String(text.clone()),
        Value::Timestamp(stamp) => Json::String(format_timestamp(stamp)),
        Value::Binary(bytes) => Json::String(encode_base64(bytes)),
        Value::List(items) => Json::Array(items.iter().map(value_to_json).collect()),
        Value::Record(record) => Json::Object(
            record
                .iter()
                .map(|(name, member)| (name.clone(), value_to_json(member)))
                .collect::<Map<String, Json>>(),
        ),
        Value::Fault(fault) => json!({ "faultCode": fault.code, "faultString": fault.message }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_spreads_into_params() {
        let params = params_from_json(r#"[1, "two", 2.5, true, {"k": [null]}]"#);
        let err = params.unwrap_err();
        assert_eq!(err.code, DATA_INVALID);

        let params = params_from_json(r#"[1, "two", 2.5, true, {"k": []}]"#).unwrap();
        assert_eq!(
            params,
            vec![
                Value::Integer(1),
                Value::from("two"),
                Value::Double(2.5),
                Value::Boolean(true),
                Value::record([("k", Value::List(vec![]))]),
            ]
        );
    }

    #[test]
    fn scalar_document_is_one_param() {
        assert_eq!(params_from_json("42").unwrap(), vec![Value::Integer(42)]);
        assert_eq!(params_from_json("[]").unwrap(), Vec::<Value>::new());
    }

    #[test]
    fn invalid_json_is_usage_error() {
        assert_eq!(params_from_json("{nope").unwrap_err().code, USAGE);
    }

    #[test]
    fn values_render_as_json() {
        let value = Value::record([
            ("bin", Value::Binary(b"you can't read this!".to_vec())),
            ("nan", Value::Double(f64::NAN)),
            ("list", Value::List(vec![Value::Integer(1), Value::from("x")])),
        ]);
        assert_eq!(
            value_to_json(&value),
            json!({
                "bin": "eW91IGNhbid0IHJlYWQgdGhpcyE=",
                "nan": null,
                "list": [1, "x"],
            })
        );
    }
}
