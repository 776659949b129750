//! The document value model.
//!
//! Every slot in a map or sequence holds either a [`ScalarValue`] or a
//! reference to a nested object. Reads hand these back as [`Value`]; nested
//! input for bulk writes is described with [`Composite`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::MAX_SAFE_INTEGER;
use crate::types::ObjId;

pub mod composite;
pub mod errors;

pub use composite::Composite;
pub use errors::ValueError;

/// The kind of a container object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjType {
    /// String-keyed map.
    Map,
    /// Ordered list of values.
    List,
    /// Sequence of Unicode code points.
    Text,
}

impl fmt::Display for ObjType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjType::Map => write!(f, "map"),
            ObjType::List => write!(f, "list"),
            ObjType::Text => write!(f, "text"),
        }
    }
}

/// A leaf value.
///
/// `Counter` is a scalar that merges by summing concurrent increments.
/// `Timestamp` holds milliseconds since the Unix epoch.
///
/// ```
/// use accord::ScalarValue;
///
/// assert!(ScalarValue::from("hi") == "hi");
/// assert!(ScalarValue::Int(3) == 3);
/// assert!(ScalarValue::Boolean(true) == true);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    Null,
    Boolean(bool),
    Int(i64),
    Uint(u64),
    F64(f64),
    Str(String),
    Bytes(Vec<u8>),
    Timestamp(i64),
    Counter(i64),
}

impl ScalarValue {
    /// Check if this value is a counter.
    pub fn is_counter(&self) -> bool {
        matches!(self, ScalarValue::Counter(_))
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    /// The value as a string slice, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The value as a signed integer. Counters and timestamps count.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ScalarValue::Int(n) | ScalarValue::Counter(n) | ScalarValue::Timestamp(n) => Some(*n),
            ScalarValue::Uint(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    /// The value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScalarValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// A timestamp as a UTC datetime.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            ScalarValue::Timestamp(ms) => DateTime::from_timestamp_millis(*ms),
            _ => None,
        }
    }

    /// Convert a numeric value to `f64`, refusing integers outside ±2^53.
    ///
    /// Returns `Ok(None)` for non-numeric values.
    pub fn to_f64_checked(&self) -> Result<Option<f64>, ValueError> {
        let check = |magnitude: u64, value: String| {
            if magnitude > MAX_SAFE_INTEGER {
                Err(ValueError::PrecisionLoss { value })
            } else {
                Ok(())
            }
        };
        match self {
            ScalarValue::F64(f) => Ok(Some(*f)),
            ScalarValue::Int(n) | ScalarValue::Counter(n) | ScalarValue::Timestamp(n) => {
                check(n.unsigned_abs(), n.to_string())?;
                Ok(Some(*n as f64))
            }
            ScalarValue::Uint(n) => {
                check(*n, n.to_string())?;
                Ok(Some(*n as f64))
            }
            _ => Ok(None),
        }
    }

    /// Render as JSON.
    ///
    /// Bytes become an array of numbers, timestamps an RFC 3339 string and
    /// non-finite floats `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            ScalarValue::Null => Json::Null,
            ScalarValue::Boolean(b) => Json::Bool(*b),
            ScalarValue::Int(n) | ScalarValue::Counter(n) => Json::from(*n),
            ScalarValue::Uint(n) => Json::from(*n),
            ScalarValue::F64(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            ScalarValue::Str(s) => Json::String(s.clone()),
            ScalarValue::Bytes(b) => Json::Array(b.iter().map(|x| Json::from(*x)).collect()),
            ScalarValue::Timestamp(ms) => match DateTime::from_timestamp_millis(*ms) {
                Some(dt) => Json::String(dt.to_rfc3339()),
                None => Json::from(*ms),
            },
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Null => write!(f, "null"),
            ScalarValue::Boolean(b) => write!(f, "{b}"),
            ScalarValue::Int(n) => write!(f, "{n}"),
            ScalarValue::Uint(n) => write!(f, "{n}"),
            ScalarValue::F64(x) => write!(f, "{x}"),
            ScalarValue::Str(s) => write!(f, "\"{s}\""),
            ScalarValue::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            ScalarValue::Timestamp(ms) => write!(f, "Timestamp({ms})"),
            ScalarValue::Counter(n) => write!(f, "Counter({n})"),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        ScalarValue::Str(s.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        ScalarValue::Str(s)
    }
}

impl From<i64> for ScalarValue {
    fn from(n: i64) -> Self {
        ScalarValue::Int(n)
    }
}

impl From<i32> for ScalarValue {
    fn from(n: i32) -> Self {
        ScalarValue::Int(n.into())
    }
}

impl From<u64> for ScalarValue {
    fn from(n: u64) -> Self {
        ScalarValue::Uint(n)
    }
}

impl From<f64> for ScalarValue {
    fn from(x: f64) -> Self {
        ScalarValue::F64(x)
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        ScalarValue::Boolean(b)
    }
}

impl From<Vec<u8>> for ScalarValue {
    fn from(b: Vec<u8>) -> Self {
        ScalarValue::Bytes(b)
    }
}

impl From<()> for ScalarValue {
    fn from(_: ()) -> Self {
        ScalarValue::Null
    }
}

impl From<DateTime<Utc>> for ScalarValue {
    fn from(dt: DateTime<Utc>) -> Self {
        ScalarValue::Timestamp(dt.timestamp_millis())
    }
}

impl PartialEq<str> for ScalarValue {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for ScalarValue {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl PartialEq<i64> for ScalarValue {
    fn eq(&self, other: &i64) -> bool {
        matches!(self, ScalarValue::Int(n) | ScalarValue::Counter(n) if n == other)
    }
}

impl PartialEq<bool> for ScalarValue {
    fn eq(&self, other: &bool) -> bool {
        self.as_bool() == Some(*other)
    }
}

/// A value read out of the document.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A leaf value.
    Scalar(ScalarValue),
    /// A nested object and its id.
    Object(ObjType, ObjId),
}

impl Value {
    /// The scalar, if this is not an object.
    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            Value::Scalar(s) => Some(s),
            Value::Object(..) => None,
        }
    }

    /// Consume into the scalar, if this is not an object.
    pub fn into_scalar(self) -> Option<ScalarValue> {
        match self {
            Value::Scalar(s) => Some(s),
            Value::Object(..) => None,
        }
    }

    /// The object id, if this is an object.
    pub fn obj_id(&self) -> Option<ObjId> {
        match self {
            Value::Object(_, id) => Some(*id),
            Value::Scalar(_) => None,
        }
    }

    /// The object kind, if this is an object.
    pub fn obj_type(&self) -> Option<ObjType> {
        match self {
            Value::Object(typ, _) => Some(*typ),
            Value::Scalar(_) => None,
        }
    }

    /// Check if this value is a nested object.
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(..))
    }

    /// The string, if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(ScalarValue::as_str)
    }

    /// The integer, if this is an integer-like scalar.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_scalar().and_then(ScalarValue::as_i64)
    }
}

impl From<ScalarValue> for Value {
    fn from(s: ScalarValue) -> Self {
        Value::Scalar(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(s) => write!(f, "{s}"),
            Value::Object(typ, id) => write!(f, "{typ}({id})"),
        }
    }
}

impl PartialEq<ScalarValue> for Value {
    fn eq(&self, other: &ScalarValue) -> bool {
        self.as_scalar() == Some(other)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl PartialEq<i64> for Value {
    fn eq(&self, other: &i64) -> bool {
        self.as_scalar().is_some_and(|s| s == other)
    }
}

impl PartialEq<bool> for Value {
    fn eq(&self, other: &bool) -> bool {
        self.as_scalar().is_some_and(|s| s == other)
    }
}
