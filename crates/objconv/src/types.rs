use core::fmt;

/// The shape of the next value in a parsed stream.
///
/// A decoder calls [`Parser::parse_type`](crate::Parser::parse_type) and uses
/// the returned tag to pick which getter, or which composite protocol, to run
/// next.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    /// Absence of a value.
    Nil,
    /// A boolean.
    Bool,
    /// A signed integer of any width.
    Int,
    /// An unsigned integer of any width.
    Uint,
    /// A floating point number of any width.
    Float,
    /// A text string.
    String,
    /// An opaque byte sequence.
    Bytes,
    /// A point in time.
    #[cfg_attr(feature = "serde", serde(rename = "time"))]
    Timestamp,
    /// A span of time.
    Duration,
    /// An error value.
    Error,
    /// A homogeneous sequence, traversed with the array protocol.
    Array,
    /// A keyed collection or a record, traversed with the map protocol.
    Map,
}

impl Type {
    /// All tags, in classification priority order for the scalar ones.
    pub const ALL: [Type; 12] = [
        Type::Nil,
        Type::Bool,
        Type::Int,
        Type::Uint,
        Type::Float,
        Type::String,
        Type::Bytes,
        Type::Timestamp,
        Type::Duration,
        Type::Error,
        Type::Array,
        Type::Map,
    ];

    /// The lowercase name of the tag.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Type::Nil => "nil",
            Type::Bool => "bool",
            Type::Int => "int",
            Type::Uint => "uint",
            Type::Float => "float",
            Type::String => "string",
            Type::Bytes => "bytes",
            Type::Timestamp => "time",
            Type::Duration => "duration",
            Type::Error => "error",
            Type::Array => "array",
            Type::Map => "map",
        }
    }

    /// Returns `true` for [`Type::Array`] and [`Type::Map`].
    #[must_use]
    pub const fn is_composite(self) -> bool {
        matches!(self, Type::Array | Type::Map)
    }

    /// Returns `true` for every tag that is read with a single getter.
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        !self.is_composite()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
