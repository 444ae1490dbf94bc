//! Conversion of result types into plain JSON-like values.

use crate::error::{InsightError, Result};
use serde::Serialize;
use serde_json::Value;

/// Convert any result into nested maps, lists and primitives.
///
/// Non-finite floats become `null`. Fitted-model handles are not serialized.
pub fn to_primitive<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| InsightError::Computation(format!("export failed: {}", e)))
}

/// Pretty-printed JSON text of `value`.
pub fn to_json_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let primitive = to_primitive(value)?;
    serde_json::to_string_pretty(&primitive)
        .map_err(|e| InsightError::Computation(format!("export failed: {}", e)))
}

/// Flatten nested values into `(dotted.key, scalar)` rows.
///
/// Object keys and array positions are joined with `.`. Empty objects and
/// arrays produce no rows.
pub fn flatten(value: &Value) -> Vec<(String, Value)> {
    let mut rows = Vec::new();
    visit(value, &mut String::new(), &mut rows);
    rows
}

fn visit(value: &Value, prefix: &mut String, rows: &mut Vec<(String, Value)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                descend(child, prefix, key, rows);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                descend(child, prefix, &i.to_string(), rows);
            }
        }
        scalar => rows.push((prefix.clone(), scalar.clone())),
    }
}

fn descend(child: &Value, prefix: &mut String, key: &str, rows: &mut Vec<(String, Value)>) {
    let restore = prefix.len();
    if !prefix.is_empty() {
        prefix.push('.');
    }
    prefix.push_str(key);
    visit(child, prefix, rows);
    prefix.truncate(restore);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Sample {
        aic: f64,
        coefficients: Vec<f64>,
        name: &'static str,
    }

    #[test]
    fn non_finite_becomes_null() {
        let value = to_primitive(&Sample {
            aic: f64::NAN,
            coefficients: vec![0.5, f64::INFINITY],
            name: "ARIMA(1, 0, 0)",
        })
        .unwrap();
        assert_eq!(value["aic"], Value::Null);
        assert_eq!(value["coefficients"], json!([0.5, null]));
        assert_eq!(value["name"], json!("ARIMA(1, 0, 0)"));
    }

    #[test]
    fn flatten_uses_dotted_keys() {
        let value = json!({
            "best_model": {"fit_statistics": {"aic": 10.5}, "order": {"p": 1}},
            "lags": [0.1, 0.2],
            "empty": {},
            "note": null,
        });
        let rows = flatten(&value);
        let lookup = |key: &str| rows.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone());
        assert_eq!(lookup("best_model.fit_statistics.aic"), Some(json!(10.5)));
        assert_eq!(lookup("best_model.order.p"), Some(json!(1)));
        assert_eq!(lookup("lags.1"), Some(json!(0.2)));
        assert_eq!(lookup("note"), Some(Value::Null));
        assert!(lookup("empty").is_none());
        assert_eq!(rows.len(), 5);
    }

    #[test]
    fn scalar_root_has_empty_key() {
        assert_eq!(flatten(&json!(3)), vec![(String::new(), json!(3))]);
    }

    #[test]
    fn json_string_is_valid() {
        let text = to_json_string(&json!({"a": [1, 2]})).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["a"][1], json!(2));
    }
}
