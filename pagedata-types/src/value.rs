//! Dynamically typed field values.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A property value stored on an object instance or a document.
///
/// Absence is represented by `Option<FieldValue>` (a missing map entry),
/// never by a null variant. `List` carries the values of a multi-select
/// field.
///
/// Untagged deserialization note: date-shaped strings (`2024-01-31`)
/// deserialize as `Date`, everything else string-like as `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    Text(String),
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// View this value as a list, if it is one.
    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Int(n)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Float(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        FieldValue::Date(d)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(items: Vec<FieldValue>) -> Self {
        FieldValue::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_conversions() {
        assert_eq!(FieldValue::from("x"), FieldValue::Text("x".to_string()));
        assert_eq!(FieldValue::from(7i64), FieldValue::Int(7));
        assert_eq!(FieldValue::from(true), FieldValue::Bool(true));
    }

    #[test]
    fn test_as_list() {
        let list = FieldValue::List(vec!["a".into(), "b".into()]);
        assert_eq!(list.as_list().unwrap().len(), 2);
        assert!(FieldValue::Int(1).as_list().is_none());
    }

    #[test]
    fn test_yaml_untagged_roundtrip() {
        let v: Vec<FieldValue> = serde_yaml::from_str("[hello, 3, true, 2024-01-31]").unwrap();
        assert_eq!(v[0], FieldValue::Text("hello".to_string()));
        assert_eq!(v[1], FieldValue::Int(3));
        assert_eq!(v[2], FieldValue::Bool(true));
        assert_eq!(
            v[3],
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())
        );
    }
}
