//! Named column casters and text type inference.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

use tabula_core::value::to_display_string;

/// A caster that can be named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// 64-bit integer. Floats are truncated; text must hold an integer.
    #[serde(alias = "integer")]
    Int,
    /// 64-bit float.
    #[serde(alias = "number")]
    Float,
    /// Text, rendered the way CSV export renders it.
    #[serde(alias = "string")]
    Str,
    /// Boolean from bools, numbers and yes/no style text.
    #[serde(alias = "boolean")]
    Bool,
    /// JSON parsed from text; non-text values pass through.
    Json,
}

impl ColumnType {
    /// Lowercase name as used in configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::Bool => "bool",
            Self::Json => "json",
        }
    }

    /// Converts a value, or explains why it cannot be converted.
    pub fn cast(self, value: &Value) -> Result<Value, String> {
        match self {
            Self::Int => cast_int(value),
            Self::Float => cast_float(value),
            Self::Str => Ok(Value::String(to_display_string(value))),
            Self::Bool => cast_bool(value),
            Self::Json => match value {
                Value::String(s) => serde_json::from_str(s).map_err(|e| e.to_string()),
                other => Ok(other.clone()),
            },
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn cast_int(value: &Value) -> Result<Value, String> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(Value::from(i));
            }
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < 9.2e18)
                .map(|f| Value::from(f.trunc() as i64))
                .ok_or_else(|| format!("{n} is out of integer range"))
        }
        Value::Bool(b) => Ok(Value::from(i64::from(*b))),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| format!("'{s}' is not an integer")),
        other => Err(format!("cannot convert {} to int", kind(other))),
    }
}

fn cast_float(value: &Value) -> Result<Value, String> {
    let f = match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        other => return Err(format!("cannot convert {} to float", kind(other))),
    };
    f.and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| format!("'{}' is not a finite number", to_display_string(value)))
}

fn cast_bool(value: &Value) -> Result<Value, String> {
    match value {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::Number(n) => Ok(Value::Bool(n.as_f64().is_some_and(|f| f != 0.0))),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "on" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "n" | "off" | "0" | "" => Ok(Value::Bool(false)),
            _ => Err(format!("'{s}' is not a boolean")),
        },
        other => Err(format!("cannot convert {} to bool", kind(other))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Reads a delimited text field as the most specific scalar it spells.
///
/// Empty → null, then integer, finite float, `true`/`false`, else text.
#[must_use]
pub fn infer_value(field: &str) -> Value {
    if field.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = field.parse::<i64>() {
        return Value::from(i);
    }
    if let Some(n) = field.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }
    if field.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if field.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    Value::String(field.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_int_cast() {
        assert_eq!(ColumnType::Int.cast(&json!("42")).unwrap(), json!(42));
        assert_eq!(ColumnType::Int.cast(&json!(" 7 ")).unwrap(), json!(7));
        assert_eq!(ColumnType::Int.cast(&json!(3.9)).unwrap(), json!(3));
        assert_eq!(ColumnType::Int.cast(&json!(true)).unwrap(), json!(1));
        assert!(ColumnType::Int.cast(&json!("3.5")).is_err());
        assert!(ColumnType::Int.cast(&json!("abc")).is_err());
        assert!(ColumnType::Int.cast(&Value::Null).is_err());
    }

    #[test]
    fn test_float_cast() {
        assert_eq!(ColumnType::Float.cast(&json!("2.5")).unwrap(), json!(2.5));
        assert_eq!(ColumnType::Float.cast(&json!(2)).unwrap(), json!(2.0));
        assert!(ColumnType::Float.cast(&json!("NaN")).is_err());
        assert!(ColumnType::Float.cast(&json!("x")).is_err());
    }

    #[test]
    fn test_str_cast() {
        assert_eq!(ColumnType::Str.cast(&json!(12)).unwrap(), json!("12"));
        assert_eq!(ColumnType::Str.cast(&Value::Null).unwrap(), json!(""));
    }

    #[test]
    fn test_bool_cast() {
        assert_eq!(ColumnType::Bool.cast(&json!("Yes")).unwrap(), json!(true));
        assert_eq!(ColumnType::Bool.cast(&json!("0")).unwrap(), json!(false));
        assert_eq!(ColumnType::Bool.cast(&json!(2)).unwrap(), json!(true));
        assert!(ColumnType::Bool.cast(&json!("maybe")).is_err());
    }

    #[test]
    fn test_json_cast() {
        assert_eq!(
            ColumnType::Json.cast(&json!("[1, 2]")).unwrap(),
            json!([1, 2])
        );
        assert_eq!(ColumnType::Json.cast(&json!(5)).unwrap(), json!(5));
        assert!(ColumnType::Json.cast(&json!("{oops")).is_err());
    }

    #[test]
    fn test_column_type_aliases() {
        let parsed: ColumnType = serde_json::from_value(json!("integer")).unwrap();
        assert_eq!(parsed, ColumnType::Int);
        let parsed: ColumnType = serde_json::from_value(json!("string")).unwrap();
        assert_eq!(parsed, ColumnType::Str);
    }

    #[test]
    fn test_infer_value() {
        assert_eq!(infer_value(""), Value::Null);
        assert_eq!(infer_value("12"), json!(12));
        assert_eq!(infer_value("-1.5"), json!(-1.5));
        assert_eq!(infer_value("TRUE"), json!(true));
        assert_eq!(infer_value("007a"), json!("007a"));
        assert_eq!(infer_value(" 1"), json!(" 1"));
    }
}
