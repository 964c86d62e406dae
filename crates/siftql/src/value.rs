use serde::{Serialize, Serializer};
use std::fmt;

///
/// Value
///
/// The right-hand side of a comparison clause.
///
/// Scalars are `Text`, `Int`, `Uint`, `Float`, `Bool`, and `Null`. `List` is
/// only meaningful as the value of a set/range operator (`in`, `not in`,
/// `between`); nested lists are representable so that validation — not
/// parsing — can report each offending element with its position.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Float(f64),
    Int(i64),
    List(Vec<Self>),
    Null,
    Text(String),
    Uint(u64),
}

impl Value {
    /// Decode a JSON value. Objects are not representable and yield `None`.
    ///
    /// Integers decode as `Int` unless they only fit an unsigned 64-bit
    /// width; all other numbers decode as `Float`.
    #[must_use]
    pub fn from_json(json: &serde_json::Value) -> Option<Self> {
        match json {
            serde_json::Value::Null => Some(Self::Null),
            serde_json::Value::Bool(v) => Some(Self::Bool(*v)),
            serde_json::Value::Number(n) => {
                if let Some(v) = n.as_i64() {
                    Some(Self::Int(v))
                } else if let Some(v) = n.as_u64() {
                    Some(Self::Uint(v))
                } else {
                    n.as_f64().map(Self::Float)
                }
            }
            serde_json::Value::String(v) => Some(Self::Text(v.clone())),
            serde_json::Value::Array(items) => items
                .iter()
                .map(Self::from_json)
                .collect::<Option<Vec<_>>>()
                .map(Self::List),
            serde_json::Value::Object(_) => None,
        }
    }

    /// Whether this value is a scalar (anything but `List`).
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Self::List(_))
    }

    /// Stable human-readable value kind label for diagnostics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Bool(_) => "Bool",
            Self::Float(_) => "Float",
            Self::Int(_) => "Int",
            Self::List(_) => "List",
            Self::Null => "Null",
            Self::Text(_) => "Text",
            Self::Uint(_) => "Uint",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Null => write!(f, "null"),
            Self::Text(v) => write!(f, "\"{v}\""),
            Self::Uint(v) => write!(f, "{v}"),
        }
    }
}

// Values serialize to their plain JSON shape so bound parameters can be
// handed straight to an execution layer.
impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::List(items) => items.serialize(serializer),
            Self::Null => serializer.serialize_none(),
            Self::Text(v) => serializer.serialize_str(v),
            Self::Uint(v) => serializer.serialize_u64(*v),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::Uint(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

///
/// TESTS
///
