//! The pull-based parsing protocol shared by every input format.
//!
//! A format plugin implements [`Parser`]; a generic decoder drives it. The
//! decoder must follow this grammar, and a parser may assume it does:
//!
//! - [`Parser::parse_type`] may be called any number of times before a value
//!   is consumed and keeps returning the same [`Type`].
//! - Exactly one getter matching that type is then called. Calling the wrong
//!   getter is a caller bug; parsers may fail with a type mismatch or return
//!   garbage, never anything to rely on.
//! - Arrays: `parse_array_begin` returns `Some(n)` or `None` when the length
//!   cannot be known up front. With `Some(n)`, each element is parsed in turn
//!   with `parse_array_next` called once between adjacent elements (so `n - 1`
//!   times). With `None`, `parse_array_next` is called before every element
//!   and returns [`Step::End`] once, after the last one. `parse_array_end`
//!   closes the array either way.
//! - Maps follow the same rules per entry, with `parse_map_value` called
//!   after each key has been parsed and before its value's type is queried.
//! - Composites nest: a child composite is opened and closed entirely while
//!   its parent is suspended.

use core::error::Error as StdError;
use std::time::{Duration, SystemTime};

use crate::Type;

/// Outcome of a `Next` call.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// The parser moved to the next element (or map key).
    Advanced,
    /// The composite has no more elements. Only returned when its length was
    /// unknown at `Begin`.
    End,
}

impl Step {
    /// Returns `true` if this is [`Step::End`].
    #[must_use]
    pub const fn is_end(self) -> bool {
        matches!(self, Step::End)
    }
}

/// A stateful, single-consumer source of values for a generic decoder.
///
/// Parsers are driven by one caller at a time and are not meant to be shared.
/// Views returned by [`parse_string`](Parser::parse_string),
/// [`parse_bytes`](Parser::parse_bytes) and [`parse_error`](Parser::parse_error)
/// borrow the parser and so end at its next call; copy them to keep them.
pub trait Parser {
    /// Error produced by this format.
    type Error: StdError;

    /// Reports the type of the next value without consuming it.
    fn parse_type(&mut self) -> Result<Type, Self::Error>;

    /// Consumes a nil value.
    fn parse_nil(&mut self) -> Result<(), Self::Error>;

    /// Consumes a boolean.
    fn parse_bool(&mut self) -> Result<bool, Self::Error>;

    /// Consumes a signed integer.
    fn parse_int(&mut self) -> Result<i64, Self::Error>;

    /// Consumes an unsigned integer.
    fn parse_uint(&mut self) -> Result<u64, Self::Error>;

    /// Consumes a floating point number.
    fn parse_float(&mut self) -> Result<f64, Self::Error>;

    /// Consumes a string. Returned as bytes since formats do not all
    /// guarantee UTF-8.
    fn parse_string(&mut self) -> Result<&[u8], Self::Error>;

    /// Consumes a byte sequence.
    fn parse_bytes(&mut self) -> Result<&[u8], Self::Error>;

    /// Consumes a timestamp.
    fn parse_time(&mut self) -> Result<SystemTime, Self::Error>;

    /// Consumes a duration.
    fn parse_duration(&mut self) -> Result<Duration, Self::Error>;

    /// Consumes an error value.
    fn parse_error(&mut self) -> Result<&(dyn StdError + 'static), Self::Error>;

    /// Opens an array, returning its length if known.
    fn parse_array_begin(&mut self) -> Result<Option<usize>, Self::Error>;

    /// Moves between array elements.
    fn parse_array_next(&mut self) -> Result<Step, Self::Error>;

    /// Closes the innermost array.
    fn parse_array_end(&mut self) -> Result<(), Self::Error>;

    /// Opens a map, returning its number of entries if known.
    fn parse_map_begin(&mut self) -> Result<Option<usize>, Self::Error>;

    /// Switches from the current key to its value.
    fn parse_map_value(&mut self) -> Result<(), Self::Error>;

    /// Moves between map entries.
    fn parse_map_next(&mut self) -> Result<Step, Self::Error>;

    /// Closes the innermost map.
    fn parse_map_end(&mut self) -> Result<(), Self::Error>;
}

impl<P: Parser + ?Sized> Parser for &mut P {
    type Error = P::Error;

    fn parse_type(&mut self) -> Result<Type, Self::Error> {
        (**self).parse_type()
    }

    fn parse_nil(&mut self) -> Result<(), Self::Error> {
        (**self).parse_nil()
    }

    fn parse_bool(&mut self) -> Result<bool, Self::Error> {
        (**self).parse_bool()
    }

    fn parse_int(&mut self) -> Result<i64, Self::Error> {
        (**self).parse_int()
    }

    fn parse_uint(&mut self) -> Result<u64, Self::Error> {
        (**self).parse_uint()
    }

    fn parse_float(&mut self) -> Result<f64, Self::Error> {
        (**self).parse_float()
    }

    fn parse_string(&mut self) -> Result<&[u8], Self::Error> {
        (**self).parse_string()
    }

    fn parse_bytes(&mut self) -> Result<&[u8], Self::Error> {
        (**self).parse_bytes()
    }

    fn parse_time(&mut self) -> Result<SystemTime, Self::Error> {
        (**self).parse_time()
    }

    fn parse_duration(&mut self) -> Result<Duration, Self::Error> {
        (**self).parse_duration()
    }

    fn parse_error(&mut self) -> Result<&(dyn StdError + 'static), Self::Error> {
        (**self).parse_error()
    }

    fn parse_array_begin(&mut self) -> Result<Option<usize>, Self::Error> {
        (**self).parse_array_begin()
    }

    fn parse_array_next(&mut self) -> Result<Step, Self::Error> {
        (**self).parse_array_next()
    }

    fn parse_array_end(&mut self) -> Result<(), Self::Error> {
        (**self).parse_array_end()
    }

    fn parse_map_begin(&mut self) -> Result<Option<usize>, Self::Error> {
        (**self).parse_map_begin()
    }

    fn parse_map_value(&mut self) -> Result<(), Self::Error> {
        (**self).parse_map_value()
    }

    fn parse_map_next(&mut self) -> Result<Step, Self::Error> {
        (**self).parse_map_next()
    }

    fn parse_map_end(&mut self) -> Result<(), Self::Error> {
        (**self).parse_map_end()
    }
}
