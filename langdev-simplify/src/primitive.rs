//! The format-agnostic tree produced by simplification.

use crate::Visitable;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::sync::Arc;

/// Ordered identifier → value mapping. Keys keep insertion order.
pub type Mapping = IndexMap<String, Primitive>;

/// A simplified value: a scalar, an ordered mapping or a sequence.
///
/// `Date` and `DateTime` are intermediate scalars; wire encoders normally
/// map them to strings through their type encoders.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Sequence(Vec<Primitive>),
    Mapping(Mapping),
}

/// Runtime kind of a [`Primitive`], the key for type encoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Null,
    Bool,
    Integer,
    Float,
    String,
    Date,
    DateTime,
    Sequence,
    Mapping,
}

impl Primitive {
    #[must_use]
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Null => PrimitiveKind::Null,
            Self::Bool(_) => PrimitiveKind::Bool,
            Self::Integer(_) => PrimitiveKind::Integer,
            Self::Float(_) => PrimitiveKind::Float,
            Self::String(_) => PrimitiveKind::String,
            Self::Date(_) => PrimitiveKind::Date,
            Self::DateTime(_) => PrimitiveKind::DateTime,
            Self::Sequence(_) => PrimitiveKind::Sequence,
            Self::Mapping(_) => PrimitiveKind::Mapping,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Primitive]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Looks a key up when this is a mapping.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Primitive> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// ISO-8601 text for dates and timestamps.
    #[must_use]
    pub fn isoformat(&self) -> Option<String> {
        match self {
            Self::Date(date) => Some(date.format("%Y-%m-%d").to_string()),
            Self::DateTime(ts) => Some(ts.to_rfc3339_opts(SecondsFormat::AutoSi, false)),
            _ => None,
        }
    }
}

impl From<bool> for Primitive {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Primitive {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u64> for Primitive {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or(Self::Float(value as f64), Self::Integer)
    }
}

impl From<f64> for Primitive {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Primitive {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Primitive {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<Primitive>> for Primitive {
    fn from(items: Vec<Primitive>) -> Self {
        Self::Sequence(items)
    }
}

impl From<Mapping> for Primitive {
    fn from(map: Mapping) -> Self {
        Self::Mapping(map)
    }
}

impl Serialize for Primitive {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::String(s) => serializer.serialize_str(s),
            Self::Date(_) | Self::DateTime(_) => {
                serializer.serialize_str(&self.isoformat().unwrap_or_default())
            }
            Self::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Mapping(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

// ── Visitable scalars and wrappers ───────────────────────────────

macro_rules! visitable_scalar {
    ($($ty:ty => |$v:ident| $conv:expr),* $(,)?) => {
        $(
            impl Visitable for $ty {
                fn as_primitive(&self) -> Option<Primitive> {
                    let $v = self;
                    Some($conv)
                }
            }
        )*
    };
}

visitable_scalar! {
    bool => |v| Primitive::Bool(*v),
    i32 => |v| Primitive::Integer(i64::from(*v)),
    i64 => |v| Primitive::Integer(*v),
    u32 => |v| Primitive::Integer(i64::from(*v)),
    u64 => |v| Primitive::from(*v),
    usize => |v| Primitive::from(*v as u64),
    f64 => |v| Primitive::Float(*v),
    String => |v| Primitive::String(v.clone()),
    &'static str => |v| Primitive::String((*v).to_string()),
    NaiveDate => |v| Primitive::Date(*v),
    DateTime<Utc> => |v| Primitive::DateTime(*v),
    Primitive => |v| v.clone(),
}

impl<T: Visitable> Visitable for Option<T> {
    fn as_primitive(&self) -> Option<Primitive> {
        self.is_none().then_some(Primitive::Null)
    }

    fn delegate(&self) -> Option<&dyn Visitable> {
        self.as_ref().map(|v| v as &dyn Visitable)
    }
}

impl<T: Visitable> Visitable for Arc<T> {
    fn delegate(&self) -> Option<&dyn Visitable> {
        Some(&**self as &dyn Visitable)
    }
}

impl<T: Visitable> Visitable for Box<T> {
    fn delegate(&self) -> Option<&dyn Visitable> {
        Some(&**self as &dyn Visitable)
    }
}

impl<T: Visitable> Visitable for Vec<T> {
    fn elements(&self) -> Option<Vec<&dyn Visitable>> {
        Some(self.iter().map(|v| v as &dyn Visitable).collect())
    }
}
