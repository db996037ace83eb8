//! A dynamic value covering the whole [`Type`] vocabulary.
//!
//! [`Value`] is what a generic decoder produces when it has no destination
//! type to fill, and it reflects back into a [`ValueParser`] unchanged, which
//! makes it handy for replaying captured input.
//!
//! [`ValueParser`]: crate::ValueParser

use core::error::Error as StdError;
use std::time::{Duration, SystemTime};

use bstr::BString;
use thiserror::Error;

use crate::{Entries, Mapping, Reflect, Reflection, Type};

/// Elements of a [`Value::Array`].
pub type Array = Vec<Value>;

/// Any value the parsing protocol can express.
///
/// # Examples
///
/// ```
/// use objconv::{Map, Type, Value};
///
/// let mut map = Map::new();
/// map.insert("answer", 42i64);
/// let value = Value::Map(map);
/// assert_eq!(value.kind(), Type::Map);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Nil,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// An unsigned integer.
    Uint(u64),
    /// A floating point number.
    Float(f64),
    /// A string.
    String(String),
    /// A byte sequence.
    Bytes(BString),
    /// A point in time.
    Timestamp(SystemTime),
    /// A span of time.
    Duration(Duration),
    /// An error, kept as its message.
    Error(ErrorValue),
    /// An array.
    Array(Array),
    /// A map.
    Map(Map),
}

impl Value {
    /// The [`Type`] tag of this value.
    #[must_use]
    pub fn kind(&self) -> Type {
        match self {
            Value::Nil => Type::Nil,
            Value::Bool(_) => Type::Bool,
            Value::Int(_) => Type::Int,
            Value::Uint(_) => Type::Uint,
            Value::Float(_) => Type::Float,
            Value::String(_) => Type::String,
            Value::Bytes(_) => Type::Bytes,
            Value::Timestamp(_) => Type::Timestamp,
            Value::Duration(_) => Type::Duration,
            Value::Error(_) => Type::Error,
            Value::Array(_) => Type::Array,
            Value::Map(_) => Type::Map,
        }
    }

    /// Returns `true` if the value is [`Value::Nil`].
    #[must_use]
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Borrows the string if this is a [`Value::String`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        if let Self::String(v) = self {
            Some(v)
        } else {
            None
        }
    }

    /// Borrows the elements if this is a [`Value::Array`].
    #[must_use]
    pub fn as_array(&self) -> Option<&Array> {
        if let Self::Array(v) = self {
            Some(v)
        } else {
            None
        }
    }

    /// Borrows the entries if this is a [`Value::Map`].
    #[must_use]
    pub fn as_map(&self) -> Option<&Map> {
        if let Self::Map(v) = self {
            Some(v)
        } else {
            None
        }
    }
}

impl Reflect for Value {
    fn reflect(&self) -> Reflection<'_> {
        match self {
            Value::Nil => Reflection::Nil,
            Value::Bool(v) => Reflection::Bool(*v),
            Value::Int(v) => Reflection::Int(*v),
            Value::Uint(v) => Reflection::Uint(*v),
            Value::Float(v) => Reflection::Float(*v),
            Value::String(v) => Reflection::String(v),
            Value::Bytes(v) => Reflection::Bytes(v.as_slice()),
            Value::Timestamp(v) => Reflection::Timestamp(*v),
            Value::Duration(v) => Reflection::Duration(*v),
            Value::Error(v) => Reflection::Error(v),
            Value::Array(v) => Reflection::Array(v),
            Value::Map(v) => Reflection::Map(v),
        }
    }
}

/// Entries of a [`Value::Map`], kept in insertion order.
///
/// Keys may be any [`Value`], so lookups are linear.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Map {
    entries: Vec<(Value, Value)>,
}

impl Map {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts an entry, replacing and returning the value of an equal key.
    pub fn insert(&mut self, key: impl Into<Value>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        if let Some((_, slot)) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(core::mem::replace(slot, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Looks up the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl<K: Into<Value>, V: Into<Value>> FromIterator<(K, V)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Map::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Mapping for Map {
    fn known_len(&self) -> Option<usize> {
        Some(self.entries.len())
    }

    fn entries(&self) -> Entries<'_> {
        Box::new(
            self.entries
                .iter()
                .map(|(k, v)| (k as &dyn Reflect, v as &dyn Reflect)),
        )
    }
}

impl Reflect for Map {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::Map(self)
    }
}

/// An error value owned by a [`Value`], reduced to its message.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("{message}")]
pub struct ErrorValue {
    message: String,
}

impl ErrorValue {
    /// Creates an error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&(dyn StdError + 'static)> for ErrorValue {
    fn from(err: &(dyn StdError + 'static)) -> Self {
        Self::new(err.to_string())
    }
}

impl Reflect for ErrorValue {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::Error(self)
    }
}

macro_rules! impl_from {
    ($($variant:ident($($ty:ty),*)),* $(,)?) => {$($(
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v.into())
            }
        }
    )*)*};
}

impl_from! {
    Bool(bool),
    Int(i8, i16, i32, i64),
    Uint(u8, u16, u32, u64),
    Float(f32, f64),
    String(String, &str),
    Bytes(BString, &[u8]),
    Timestamp(SystemTime),
    Duration(Duration),
    Error(ErrorValue),
    Array(Array),
    Map(Map),
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Nil
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}
