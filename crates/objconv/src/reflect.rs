//! Runtime introspection over in-memory values.
//!
//! Rust has no built-in reflection, so values opt in through [`Reflect`],
//! which describes one layer of a value as a [`Reflection`]. Classification
//! order is decided by the impls themselves:
//!
//! 1. Domain types (timestamps, durations, errors) report themselves even when
//!    they are reference-like, e.g. `Box<dyn Error>` is an error, not a box.
//! 2. Scalars report their category.
//! 3. Contiguous sequences of `u8` report [`Reflection::Bytes`]; every other
//!    sequence reports [`Reflection::Array`].
//! 4. Associative containers report [`Reflection::Map`] and records report
//!    [`Reflection::Record`], which the parser also presents as a map.
//! 5. References, smart pointers and `Option` report
//!    [`Reflection::Indirect`], which [`resolve`] unwraps.

use core::{any::type_name, error::Error as StdError, fmt};
use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap, VecDeque},
    hash::BuildHasher,
    rc::Rc,
    sync::Arc,
    time::{Duration, SystemTime},
};

use bstr::{BStr, BString};

use crate::{Error, Record, Type};

/// A value that can describe its own shape to the [`ValueParser`].
///
/// [`ValueParser`]: crate::ValueParser
pub trait Reflect {
    /// Describes the outermost layer of this value.
    fn reflect(&self) -> Reflection<'_>;

    /// Views a slice of `Self` as raw bytes. Only `u8` returns `Some`, which is
    /// how containers of bytes tell themselves apart from arrays.
    #[doc(hidden)]
    fn byte_slice(items: &[Self]) -> Option<&[u8]>
    where
        Self: Sized,
    {
        let _ = items;
        None
    }
}

/// One layer of a reflected value.
#[derive(Clone, Copy)]
pub enum Reflection<'a> {
    /// The unit value or an explicit nil.
    Nil,
    /// A boolean.
    Bool(bool),
    /// A signed integer, widened to 64 bits.
    Int(i64),
    /// An unsigned integer, widened to 64 bits.
    Uint(u64),
    /// A float, widened to 64 bits.
    Float(f64),
    /// A string.
    String(&'a str),
    /// A contiguous byte sequence.
    Bytes(&'a [u8]),
    /// A timestamp.
    Timestamp(SystemTime),
    /// A duration.
    Duration(Duration),
    /// An error value.
    Error(&'a (dyn StdError + 'static)),
    /// A sequence of values.
    Array(&'a dyn Sequence),
    /// An associative container.
    Map(&'a dyn Mapping),
    /// A value with named fields.
    Record(&'a dyn Record),
    /// A reference, smart pointer or optional. `None` is an empty wrapper.
    Indirect(Option<&'a dyn Reflect>),
    /// A value outside the type vocabulary, carrying its type name.
    Unsupported(&'static str),
}

impl Reflection<'_> {
    /// Type of a reflection produced by [`resolve`].
    pub(crate) fn kind(&self) -> Result<Type, Error> {
        Ok(match self {
            // resolve() never leaves a wrapper that still holds a value
            Reflection::Nil | Reflection::Indirect(_) => Type::Nil,
            Reflection::Bool(_) => Type::Bool,
            Reflection::Int(_) => Type::Int,
            Reflection::Uint(_) => Type::Uint,
            Reflection::Float(_) => Type::Float,
            Reflection::String(_) => Type::String,
            Reflection::Bytes(_) => Type::Bytes,
            Reflection::Timestamp(_) => Type::Timestamp,
            Reflection::Duration(_) => Type::Duration,
            Reflection::Error(_) => Type::Error,
            Reflection::Array(_) => Type::Array,
            Reflection::Map(_) | Reflection::Record(_) => Type::Map,
            Reflection::Unsupported(name) => return Err(Error::UnsupportedType(*name)),
        })
    }
}

impl fmt::Debug for Reflection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reflection::Nil => f.write_str("Nil"),
            Reflection::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Reflection::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Reflection::Uint(v) => f.debug_tuple("Uint").field(v).finish(),
            Reflection::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Reflection::String(v) => f.debug_tuple("String").field(v).finish(),
            Reflection::Bytes(v) => f.debug_tuple("Bytes").field(&BStr::new(v)).finish(),
            Reflection::Timestamp(v) => f.debug_tuple("Timestamp").field(v).finish(),
            Reflection::Duration(v) => f.debug_tuple("Duration").field(v).finish(),
            Reflection::Error(e) => f.debug_tuple("Error").field(&format_args!("{e}")).finish(),
            Reflection::Array(seq) => f.debug_struct("Array").field("len", &seq.known_len()).finish(),
            Reflection::Map(map) => f.debug_struct("Map").field("len", &map.known_len()).finish(),
            Reflection::Record(record) => f
                .debug_struct("Record")
                .field("fields", &record.struct_info().fields.len())
                .finish(),
            Reflection::Indirect(Some(_)) => f.write_str("Indirect(Some(..))"),
            Reflection::Indirect(None) => f.write_str("Indirect(None)"),
            Reflection::Unsupported(name) => f.debug_tuple("Unsupported").field(name).finish(),
        }
    }
}

/// A sequence whose elements can be visited by index.
pub trait Sequence {
    /// Number of elements, or `None` when it is not known up front.
    fn known_len(&self) -> Option<usize>;

    /// The element at `index`, or `None` past the end.
    fn get(&self, index: usize) -> Option<&dyn Reflect>;
}

/// Iterator over the entries of a [`Mapping`].
pub type Entries<'a> = Box<dyn Iterator<Item = (&'a dyn Reflect, &'a dyn Reflect)> + 'a>;

/// An associative container.
pub trait Mapping {
    /// Number of entries, or `None` when it is not known up front.
    fn known_len(&self) -> Option<usize>;

    /// Every key/value pair, in the container's native order.
    fn entries(&self) -> Entries<'_>;
}

/// Unwraps every [`Reflection::Indirect`] layer of `value`.
///
/// Stops at the first value that is not a wrapper, or at an empty wrapper,
/// which resolves to [`Reflection::Nil`]. More than `max_indirections`
/// unwrapping steps fail with [`Error::IndirectionLimitExceeded`].
pub fn resolve(value: &dyn Reflect, max_indirections: usize) -> Result<Reflection<'_>, Error> {
    let mut reflection = value.reflect();
    let mut steps = 0;
    while let Reflection::Indirect(inner) = reflection {
        let Some(inner) = inner else {
            return Ok(Reflection::Nil);
        };
        if steps == max_indirections {
            return Err(Error::IndirectionLimitExceeded(max_indirections));
        }
        steps += 1;
        reflection = inner.reflect();
    }
    Ok(reflection)
}

/// Classifies `value` into the [`Type`] vocabulary.
///
/// # Errors
///
/// [`Error::UnsupportedType`] when the value has no matching type, and
/// [`Error::IndirectionLimitExceeded`] as described in [`resolve`].
pub fn classify(value: &dyn Reflect, max_indirections: usize) -> Result<Type, Error> {
    resolve(value, max_indirections)?.kind()
}

fn element<T: Reflect>(items: &[T], index: usize) -> Option<&dyn Reflect> {
    items.get(index).map(|item| item as &dyn Reflect)
}

fn sequence_or_bytes<'a, T: Reflect>(items: &'a [T], seq: &'a dyn Sequence) -> Reflection<'a> {
    match T::byte_slice(items) {
        Some(bytes) => Reflection::Bytes(bytes),
        None => Reflection::Array(seq),
    }
}

// --- scalars ---

impl Reflect for () {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::Nil
    }
}

impl Reflect for bool {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::Bool(*self)
    }
}

macro_rules! reflect_signed {
    ($($ty:ty),*) => {$(
        impl Reflect for $ty {
            #[allow(
                clippy::cast_lossless,
                clippy::cast_possible_truncation,
                clippy::unnecessary_cast
            )]
            fn reflect(&self) -> Reflection<'_> {
                Reflection::Int(*self as i64)
            }
        }
    )*};
}

macro_rules! reflect_unsigned {
    ($($ty:ty),*) => {$(
        impl Reflect for $ty {
            #[allow(
                clippy::cast_lossless,
                clippy::cast_possible_truncation,
                clippy::unnecessary_cast
            )]
            fn reflect(&self) -> Reflection<'_> {
                Reflection::Uint(*self as u64)
            }
        }
    )*};
}

reflect_signed!(i8, i16, i32, i64, isize);
reflect_unsigned!(u16, u32, u64, usize);

impl Reflect for u8 {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::Uint(u64::from(*self))
    }

    fn byte_slice(items: &[Self]) -> Option<&[u8]> {
        Some(items)
    }
}

impl Reflect for f32 {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::Float(f64::from(*self))
    }
}

impl Reflect for f64 {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::Float(*self)
    }
}

impl Reflect for String {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::String(self.as_str())
    }
}

impl Reflect for &str {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::String(self)
    }
}

impl Reflect for Box<str> {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::String(self)
    }
}

impl Reflect for Rc<str> {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::String(self)
    }
}

impl Reflect for Arc<str> {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::String(self)
    }
}

impl Reflect for Cow<'_, str> {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::String(self)
    }
}

// --- domain types ---

impl Reflect for SystemTime {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::Timestamp(*self)
    }
}

impl Reflect for Duration {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::Duration(*self)
    }
}

impl Reflect for std::io::Error {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::Error(self)
    }
}

impl Reflect for Box<dyn StdError> {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::Error(&**self)
    }
}

impl Reflect for Box<dyn StdError + Send + Sync> {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::Error(&**self)
    }
}

impl Reflect for Arc<dyn StdError + Send + Sync> {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::Error(&**self)
    }
}

// --- sequences and bytes ---

impl<T: Reflect> Sequence for Vec<T> {
    fn known_len(&self) -> Option<usize> {
        Some(self.len())
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        element(self, index)
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn reflect(&self) -> Reflection<'_> {
        sequence_or_bytes(self, self)
    }
}

impl<T: Reflect, const N: usize> Sequence for [T; N] {
    fn known_len(&self) -> Option<usize> {
        Some(N)
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        element(self, index)
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn reflect(&self) -> Reflection<'_> {
        sequence_or_bytes(self, self)
    }
}

impl<T: Reflect> Sequence for &[T] {
    fn known_len(&self) -> Option<usize> {
        Some(self.len())
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        element(self, index)
    }
}

impl<T: Reflect> Reflect for &[T] {
    fn reflect(&self) -> Reflection<'_> {
        sequence_or_bytes(self, self)
    }
}

impl<T: Reflect> Sequence for Box<[T]> {
    fn known_len(&self) -> Option<usize> {
        Some(self.len())
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        element(self, index)
    }
}

impl<T: Reflect> Reflect for Box<[T]> {
    fn reflect(&self) -> Reflection<'_> {
        sequence_or_bytes(self, self)
    }
}

impl<T: Reflect + Clone> Sequence for Cow<'_, [T]> {
    fn known_len(&self) -> Option<usize> {
        Some(self.len())
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        element(self, index)
    }
}

impl<T: Reflect + Clone> Reflect for Cow<'_, [T]> {
    fn reflect(&self) -> Reflection<'_> {
        sequence_or_bytes(self, self)
    }
}

// Not contiguous, so even `VecDeque<u8>` is an array.
impl<T: Reflect> Sequence for VecDeque<T> {
    fn known_len(&self) -> Option<usize> {
        Some(self.len())
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        VecDeque::get(self, index).map(|item| item as &dyn Reflect)
    }
}

impl<T: Reflect> Reflect for VecDeque<T> {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::Array(self)
    }
}

impl Reflect for BString {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::Bytes(self.as_slice())
    }
}

impl Reflect for &BStr {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::Bytes(self)
    }
}

// --- maps ---

impl<K: Reflect, V: Reflect> Mapping for BTreeMap<K, V> {
    fn known_len(&self) -> Option<usize> {
        Some(self.len())
    }

    fn entries(&self) -> Entries<'_> {
        Box::new(
            self.iter()
                .map(|(k, v)| (k as &dyn Reflect, v as &dyn Reflect)),
        )
    }
}

impl<K: Reflect, V: Reflect> Reflect for BTreeMap<K, V> {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::Map(self)
    }
}

impl<K: Reflect, V: Reflect, S: BuildHasher> Mapping for HashMap<K, V, S> {
    fn known_len(&self) -> Option<usize> {
        Some(self.len())
    }

    fn entries(&self) -> Entries<'_> {
        Box::new(
            self.iter()
                .map(|(k, v)| (k as &dyn Reflect, v as &dyn Reflect)),
        )
    }
}

impl<K: Reflect, V: Reflect, S: BuildHasher> Reflect for HashMap<K, V, S> {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::Map(self)
    }
}

// --- indirection ---

impl<T: Reflect> Reflect for &T {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::Indirect(Some(*self as &dyn Reflect))
    }
}

impl<T: Reflect> Reflect for &mut T {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::Indirect(Some(&**self as &dyn Reflect))
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::Indirect(Some(&**self as &dyn Reflect))
    }
}

impl<T: Reflect> Reflect for Rc<T> {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::Indirect(Some(&**self as &dyn Reflect))
    }
}

impl<T: Reflect> Reflect for Arc<T> {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::Indirect(Some(&**self as &dyn Reflect))
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn reflect(&self) -> Reflection<'_> {
        Reflection::Indirect(self.as_ref().map(|v| v as &dyn Reflect))
    }
}

// --- outside the vocabulary ---

macro_rules! reflect_fn_pointer {
    ($($arg:ident),*) => {
        impl<Ret, $($arg),*> Reflect for fn($($arg),*) -> Ret {
            fn reflect(&self) -> Reflection<'_> {
                Reflection::Unsupported(type_name::<Self>())
            }
        }
    };
}

reflect_fn_pointer!();
reflect_fn_pointer!(A);
reflect_fn_pointer!(A, B);
reflect_fn_pointer!(A, B, C);

#[cfg(test)]
mod tests {
    use std::{
        collections::{BTreeMap, HashMap, VecDeque},
        io,
        time::{Duration, SystemTime},
    };

    use bstr::BString;
    use rstest::rstest;

    use super::*;

    const LIMIT: usize = 64;

    #[rstest]
    #[case::unit(&(), Type::Nil)]
    #[case::none(&None::<i32>, Type::Nil)]
    #[case::bool(&true, Type::Bool)]
    #[case::i8(&-3i8, Type::Int)]
    #[case::isize(&7isize, Type::Int)]
    #[case::u8(&1u8, Type::Uint)]
    #[case::usize(&7usize, Type::Uint)]
    #[case::f32(&1.5f32, Type::Float)]
    #[case::f64(&2.5f64, Type::Float)]
    #[case::string(&String::from("x"), Type::String)]
    #[case::str(&"x", Type::String)]
    #[case::byte_vec(&vec![1u8, 2, 3], Type::Bytes)]
    #[case::byte_array(&[1u8, 2, 3], Type::Bytes)]
    #[case::bstring(&BString::from("raw"), Type::Bytes)]
    #[case::int_vec(&vec![1i32, 2, 3], Type::Array)]
    #[case::int_array(&[1u16, 2, 3], Type::Array)]
    #[case::byte_deque(&VecDeque::from([1u8, 2]), Type::Array)]
    #[case::btree(&BTreeMap::from([("a", 1)]), Type::Map)]
    #[case::hash(&HashMap::from([(1u32, "a")]), Type::Map)]
    #[case::time(&SystemTime::UNIX_EPOCH, Type::Timestamp)]
    #[case::duration(&Duration::from_secs(1), Type::Duration)]
    #[case::io_error(&io::Error::other("boom"), Type::Error)]
    fn classifies(#[case] value: &dyn Reflect, #[case] expected: Type) {
        assert_eq!(classify(value, LIMIT), Ok(expected));
    }

    #[test]
    fn boxed_error_is_an_error_not_a_pointer() {
        let err: Box<dyn StdError + Send + Sync> = "broken".into();
        assert_eq!(classify(&err, LIMIT), Ok(Type::Error));
        let Ok(Reflection::Error(inner)) = resolve(&err, LIMIT) else {
            panic!("expected an error reflection");
        };
        assert_eq!(inner.to_string(), "broken");
    }

    #[test]
    fn bytes_and_arrays_of_equal_length_differ() {
        let bytes: Vec<u8> = vec![1, 2, 3];
        let words: Vec<u16> = vec![1, 2, 3];
        assert_eq!(classify(&bytes, LIMIT), Ok(Type::Bytes));
        assert_eq!(classify(&words, LIMIT), Ok(Type::Array));
    }

    #[test]
    fn wrappers_are_unwrapped_until_a_value() {
        let value = Some(Box::new(Rc::new(Some(42i64))));
        let Ok(Reflection::Int(n)) = resolve(&value, LIMIT) else {
            panic!("expected an int");
        };
        assert_eq!(n, 42);

        let empty: Option<Box<Option<i64>>> = Some(Box::new(None));
        assert!(matches!(resolve(&empty, LIMIT), Ok(Reflection::Nil)));
    }

    #[test]
    fn indirection_limit_is_enforced() {
        let value = Some(Some(Some(1i32)));
        assert_eq!(classify(&value, 3), Ok(Type::Int));
        assert_eq!(
            classify(&value, 2),
            Err(Error::IndirectionLimitExceeded(2))
        );
    }

    #[test]
    fn function_pointers_are_unsupported() {
        fn answer() -> i32 {
            42
        }
        let f: fn() -> i32 = answer;
        let Err(Error::UnsupportedType(name)) = classify(&f, LIMIT) else {
            panic!("function pointers must not classify");
        };
        assert!(name.contains("fn"), "type name was {name}");
    }

    #[test]
    fn debug_shows_bytes_readably() {
        let bytes = b"hi".to_vec();
        assert_eq!(format!("{:?}", bytes.reflect()), "Bytes(\"hi\")");
    }
}
