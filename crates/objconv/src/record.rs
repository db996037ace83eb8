//! Field metadata for values with named fields.
//!
//! A [`Record`] hands the parser a cached [`Struct`] description plus an
//! accessor per field. The parser never computes metadata itself; it asks for
//! it on every map traversal and filters fields through their omission
//! predicates.

use std::time::SystemTime;

use log::{debug, warn};

use crate::{Reflect, Reflection};

/// A value with named fields, presented to decoders as a map.
///
/// Implement it with the [`record!`](crate::record!) macro, or by hand when
/// the field list must be computed differently.
pub trait Record {
    /// Field metadata for this record's type. Implementations should compute
    /// it once per type and return the cached copy.
    fn struct_info(&self) -> &Struct;

    /// Accessor for the field at `index`, as numbered by
    /// [`StructField::index`].
    fn field(&self, index: usize) -> Option<&dyn Reflect>;
}

/// Ordered field metadata of a record type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Struct {
    /// Fields in declaration order, skipped fields removed.
    pub fields: Vec<StructField>,
}

/// Metadata of one record field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructField {
    /// Key the field is exposed under.
    pub name: &'static str,
    /// Position passed to [`Record::field`].
    pub index: usize,
    /// Omit the field when it holds an empty value (see [`is_empty`]).
    pub omit_empty: bool,
    /// Omit the field when it holds a zero value (see [`is_zero`]).
    pub omit_zero: bool,
}

/// A parsed field tag.
///
/// The grammar is `name[,flag]*` where flags are `omitempty` and `omitzero`.
/// An empty name keeps the declared field name, unknown flags are ignored and
/// the tag `-` drops the field entirely.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tag {
    /// Name override; empty when the declared name is kept.
    pub name: &'static str,
    /// `omitempty` flag.
    pub omit_empty: bool,
    /// `omitzero` flag.
    pub omit_zero: bool,
}

impl Tag {
    /// Parses a tag. Returns `None` for `-`, which excludes the field.
    #[must_use]
    pub fn parse(tag: &'static str) -> Option<Self> {
        if tag == "-" {
            return None;
        }
        let mut parts = tag.split(',');
        let mut parsed = Tag {
            name: parts.next().unwrap_or_default().trim(),
            ..Tag::default()
        };
        for flag in parts {
            match flag.trim() {
                "omitempty" => parsed.omit_empty = true,
                "omitzero" => parsed.omit_zero = true,
                _ => {}
            }
        }
        Some(parsed)
    }
}

impl Struct {
    /// Builds the metadata from `(field name, tag)` pairs in declaration
    /// order. The position of each pair becomes the field's index.
    #[must_use]
    pub fn from_tags(fields: &[(&'static str, &'static str)]) -> Self {
        let fields = fields
            .iter()
            .enumerate()
            .filter_map(|(index, &(declared, tag))| {
                let tag = Tag::parse(tag)?;
                Some(StructField {
                    name: if tag.name.is_empty() { declared } else { tag.name },
                    index,
                    omit_empty: tag.omit_empty,
                    omit_zero: tag.omit_zero,
                })
            })
            .collect();
        Self { fields }
    }

    /// Looks a field up by its exposed name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&StructField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl StructField {
    /// Omission predicate, evaluated against this field's value in one
    /// particular record instance.
    #[must_use]
    pub fn omits(&self, value: &dyn Reflect) -> bool {
        (self.omit_empty && is_empty(value)) || (self.omit_zero && is_zero(value))
    }
}

/// Reports whether `value` is empty: nil, `false`, zero numbers, zero
/// durations, and empty strings, bytes, arrays or maps.
///
/// Wrappers are not looked through, so `Some(0)` is not empty.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn is_empty(value: &dyn Reflect) -> bool {
    match value.reflect() {
        Reflection::Nil | Reflection::Indirect(None) => true,
        Reflection::Bool(b) => !b,
        Reflection::Int(n) => n == 0,
        Reflection::Uint(n) => n == 0,
        Reflection::Float(n) => n == 0.0,
        Reflection::String(s) => s.is_empty(),
        Reflection::Bytes(b) => b.is_empty(),
        Reflection::Duration(d) => d.is_zero(),
        Reflection::Array(seq) => seq.get(0).is_none(),
        Reflection::Map(map) => map.entries().next().is_none(),
        Reflection::Timestamp(_)
        | Reflection::Error(_)
        | Reflection::Record(_)
        | Reflection::Indirect(Some(_))
        | Reflection::Unsupported(_) => false,
    }
}

/// Reports whether `value` holds its zero value: everything [`is_empty`]
/// accepts, the Unix epoch, and records whose fields are all zero.
#[must_use]
pub fn is_zero(value: &dyn Reflect) -> bool {
    match value.reflect() {
        Reflection::Timestamp(t) => t == SystemTime::UNIX_EPOCH,
        Reflection::Record(record) => record
            .struct_info()
            .fields
            .iter()
            .all(|f| record.field(f.index).is_none_or(is_zero)),
        _ => is_empty(value),
    }
}

/// Key/value pairs of the fields of `record` that survive omission.
pub(crate) fn visible_fields(record: &dyn Record) -> Vec<(&dyn Reflect, &dyn Reflect)> {
    let info = record.struct_info();
    info.fields
        .iter()
        .filter_map(|field| {
            let Some(value) = record.field(field.index) else {
                warn!("record has no accessor for field {:?}", field.name);
                return None;
            };
            if field.omits(value) {
                debug!("omitting field {:?}", field.name);
                return None;
            }
            Some((&field.name as &dyn Reflect, value))
        })
        .collect()
}

/// Implements [`Record`] and [`Reflect`] for a non-generic struct.
///
/// Each listed field may carry a [`Tag`]. The [`Struct`] metadata is built
/// on first use and cached for the lifetime of the program.
///
/// ```rust
/// use objconv::{record, Parser, Type, ValueParser};
///
/// struct Point {
///     x: i64,
///     y: i64,
///     label: String,
/// }
///
/// record!(Point { x, y: "y,omitempty", label: "name" });
///
/// let point = Point { x: 1, y: 0, label: "origin".into() };
/// let mut parser = ValueParser::new(&point);
/// assert_eq!(parser.parse_type().unwrap(), Type::Map);
/// assert_eq!(parser.parse_map_begin().unwrap(), Some(2));
/// assert_eq!(parser.parse_string().unwrap(), b"x");
/// ```
#[macro_export]
macro_rules! record {
    (@tag) => {
        ""
    };
    (@tag $tag:literal) => {
        $tag
    };
    ($ty:ty { $($field:ident $(: $tag:literal)?),* $(,)? }) => {
        impl $crate::Record for $ty {
            fn struct_info(&self) -> &$crate::Struct {
                static INFO: ::std::sync::OnceLock<$crate::Struct> = ::std::sync::OnceLock::new();
                INFO.get_or_init(|| {
                    $crate::Struct::from_tags(&[
                        $((::core::stringify!($field), $crate::record!(@tag $($tag)?))),*
                    ])
                })
            }

            fn field(&self, index: usize) -> ::core::option::Option<&dyn $crate::Reflect> {
                let fields: &[&dyn $crate::Reflect] = &[$(&self.$field),*];
                fields.get(index).copied()
            }
        }

        impl $crate::Reflect for $ty {
            fn reflect(&self) -> $crate::Reflection<'_> {
                $crate::Reflection::Record(self)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use rstest::rstest;

    use super::*;

    struct Inner {
        a: i32,
        b: Option<String>,
    }

    crate::record!(Inner { a, b });

    struct Outer {
        id: u64,
        note: String,
        inner: Inner,
        hidden: bool,
    }

    crate::record!(Outer {
        id: "ID",
        note: ",omitempty",
        inner: "inner,omitzero",
        hidden: "-",
    });

    #[rstest]
    #[case::plain("name", Some(Tag { name: "name", omit_empty: false, omit_zero: false }))]
    #[case::flags("n,omitempty,omitzero", Some(Tag { name: "n", omit_empty: true, omit_zero: true }))]
    #[case::keep_name(",omitzero", Some(Tag { name: "", omit_empty: false, omit_zero: true }))]
    #[case::unknown_flag("n,string", Some(Tag { name: "n", omit_empty: false, omit_zero: false }))]
    #[case::skip("-", None)]
    #[case::dash_name("-,", Some(Tag { name: "-", omit_empty: false, omit_zero: false }))]
    fn parses_tags(#[case] raw: &'static str, #[case] expected: Option<Tag>) {
        assert_eq!(Tag::parse(raw), expected);
    }

    #[test]
    fn struct_metadata_follows_tags() {
        let outer = Outer {
            id: 1,
            note: String::new(),
            inner: Inner { a: 0, b: None },
            hidden: true,
        };
        let info = outer.struct_info();
        let names: Vec<_> = info.fields.iter().map(|f| f.name).collect();
        assert_eq!(names, ["ID", "note", "inner"]);
        assert_eq!(info.field("inner").map(|f| f.index), Some(2));
        assert!(info.field("hidden").is_none());
    }

    #[test]
    fn metadata_is_cached_per_type() {
        let a = Inner { a: 1, b: None };
        let b = Inner { a: 2, b: None };
        assert!(core::ptr::eq(a.struct_info(), b.struct_info()));
    }

    #[rstest]
    #[case::nil(&(), true)]
    #[case::none(&None::<i32>, true)]
    #[case::some_zero(&Some(0), false)]
    #[case::false_(&false, true)]
    #[case::zero(&0u8, true)]
    #[case::float(&0.0f64, true)]
    #[case::text(&"", true)]
    #[case::bytes(&Vec::<u8>::new(), true)]
    #[case::array(&[0i32; 0], true)]
    #[case::nonempty_array(&[0i32], false)]
    #[case::duration(&Duration::ZERO, true)]
    #[case::epoch(&SystemTime::UNIX_EPOCH, false)]
    fn empty_values(#[case] value: &dyn Reflect, #[case] expected: bool) {
        assert_eq!(is_empty(value), expected);
    }

    #[test]
    fn zero_records_and_epoch() {
        assert!(is_zero(&SystemTime::UNIX_EPOCH));
        assert!(is_zero(&Inner { a: 0, b: None }));
        assert!(!is_zero(&Inner { a: 0, b: Some(String::new()) }));
        assert!(!is_empty(&Inner { a: 0, b: None }));
    }

    #[test]
    fn visible_fields_apply_omission() {
        let outer = Outer {
            id: 7,
            note: String::new(),
            inner: Inner { a: 0, b: None },
            hidden: false,
        };
        let keys: Vec<_> = visible_fields(&outer)
            .into_iter()
            .map(|(key, _)| match key.reflect() {
                Reflection::String(s) => s.to_owned(),
                other => panic!("field names are strings, got {other:?}"),
            })
            .collect();
        assert_eq!(keys, ["ID"]);
    }
}
