//! Nested input values for bulk writes.

use std::collections::BTreeMap;

use super::{ObjType, ScalarValue, ValueError};

/// A tree of values to be written in one call.
///
/// Writing a composite creates one object per `Map`, `List` and `Text`
/// node and one put or insert per scalar.
///
/// ```
/// use accord::Composite;
/// use serde_json::json;
///
/// let c = Composite::from_json(json!({"tags": ["a", "b"], "n": 3}));
/// assert!(matches!(c, Composite::Map(_)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Composite {
    /// A leaf value.
    Scalar(ScalarValue),
    /// A map of nested values.
    Map(BTreeMap<String, Composite>),
    /// A list of nested values.
    List(Vec<Composite>),
    /// A text object with initial contents.
    Text(String),
}

impl Composite {
    /// Convert a JSON tree.
    ///
    /// Strings become string scalars, not text objects; wrap a string in
    /// [`Composite::Text`] to get a collaboratively editable text.
    pub fn from_json(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Composite::Scalar(ScalarValue::Null),
            Json::Bool(b) => Composite::Scalar(ScalarValue::Boolean(b)),
            Json::Number(n) => Composite::Scalar(if let Some(i) = n.as_i64() {
                ScalarValue::Int(i)
            } else if let Some(u) = n.as_u64() {
                ScalarValue::Uint(u)
            } else {
                ScalarValue::F64(n.as_f64().unwrap_or(f64::NAN))
            }),
            Json::String(s) => Composite::Scalar(ScalarValue::Str(s)),
            Json::Array(items) => Composite::List(items.into_iter().map(Self::from_json).collect()),
            Json::Object(map) => Composite::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Parse JSON text and convert it.
    pub fn from_json_str(input: &str) -> Result<Self, ValueError> {
        let json: serde_json::Value =
            serde_json::from_str(input).map_err(|e| ValueError::UnsupportedJson {
                reason: e.to_string(),
            })?;
        Ok(Self::from_json(json))
    }

    /// The object kind this node creates, or `None` for scalars.
    pub fn obj_type(&self) -> Option<ObjType> {
        match self {
            Composite::Scalar(_) => None,
            Composite::Map(_) => Some(ObjType::Map),
            Composite::List(_) => Some(ObjType::List),
            Composite::Text(_) => Some(ObjType::Text),
        }
    }
}

impl From<ScalarValue> for Composite {
    fn from(value: ScalarValue) -> Self {
        Composite::Scalar(value)
    }
}

macro_rules! composite_from_scalar {
    ($($t:ty),*) => {
        $(impl From<$t> for Composite {
            fn from(value: $t) -> Self {
                Composite::Scalar(value.into())
            }
        })*
    };
}

composite_from_scalar!(&str, String, i64, i32, u64, f64, bool);
