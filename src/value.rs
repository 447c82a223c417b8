//!
//! Generic data values carried from in-memory objects to the wire.
//!
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// A single column value, restricted to what SQL Server round-trips.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Tinyint(i8),
    Smallint(i16),
    Int(i32),
    Bigint(i64),
    Float(f32),
    Double(f64),
    BigDecimal(BigDecimal),
    Char(char),
    Text(String),
    Json(JsonValue),
    Uuid(Uuid),
    Blob(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Timestamp(DateTime<Utc>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Tinyint(v) => Some(v as i64),
            Value::Smallint(v) => Some(v as i64),
            Value::Int(v) => Some(v as i64),
            Value::Bigint(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match *self {
            Value::Text(ref v) => Some(v),
            _ => None,
        }
    }
}

macro_rules! impl_from_value {
    ($t:ty, $variant:ident) => {
        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::$variant(v)
            }
        }
    };
}

impl_from_value!(bool, Bool);
impl_from_value!(i8, Tinyint);
impl_from_value!(i16, Smallint);
impl_from_value!(i32, Int);
impl_from_value!(i64, Bigint);
impl_from_value!(f32, Float);
impl_from_value!(f64, Double);
impl_from_value!(BigDecimal, BigDecimal);
impl_from_value!(char, Char);
impl_from_value!(String, Text);
impl_from_value!(JsonValue, Json);
impl_from_value!(Uuid, Uuid);
impl_from_value!(Vec<u8>, Blob);
impl_from_value!(NaiveDate, Date);
impl_from_value!(NaiveTime, Time);
impl_from_value!(NaiveDateTime, DateTime);
impl_from_value!(DateTime<Utc>, Timestamp);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn option_maps_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(5i32)), Value::Int(5));
    }

    #[test]
    fn integral_widening() {
        assert_eq!(Value::Tinyint(3).as_i64(), Some(3));
        assert_eq!(Value::Bigint(9).as_i64(), Some(9));
        assert_eq!(Value::Text("x".into()).as_i64(), None);
    }
}
