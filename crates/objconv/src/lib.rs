//! Decoding core of a generic object-conversion library.
//!
//! Every wire format plugs into decoding by implementing [`Parser`], a
//! pull-based protocol that reports the [`Type`] of the next value and then
//! hands it out piece by piece. A generic decoder only ever talks to that
//! trait, so supporting a new format never touches the decoder.
//!
//! [`ValueParser`] is the reference implementation. It walks an in-memory
//! value through [`Reflect`] and answers each call exactly as a format parser
//! would for the encoded form of the same value, which makes it both a test
//! oracle for real formats and a way to convert between in-memory values.
//!
//! ```rust
//! use objconv::{Parser, Step, Type, ValueParser, record};
//!
//! struct User {
//!     name: String,
//!     admin: bool,
//!     groups: Vec<&'static str>,
//! }
//!
//! record!(User { name, admin: "admin,omitempty", groups });
//!
//! let user = User { name: "ada".into(), admin: false, groups: vec!["ops"] };
//! let mut parser = ValueParser::new(&user);
//!
//! assert_eq!(parser.parse_type()?, Type::Map);
//! assert_eq!(parser.parse_map_begin()?, Some(2));
//! assert_eq!(parser.parse_string()?, b"name");
//! parser.parse_map_value()?;
//! assert_eq!(parser.parse_string()?, b"ada");
//! assert_eq!(parser.parse_map_next()?, Step::Advanced);
//! assert_eq!(parser.parse_string()?, b"groups");
//! parser.parse_map_value()?;
//! assert_eq!(parser.parse_array_begin()?, Some(1));
//! assert_eq!(parser.parse_string()?, b"ops");
//! parser.parse_array_end()?;
//! parser.parse_map_end()?;
//! assert!(parser.is_finished());
//! # Ok::<(), objconv::Error>(())
//! ```
//!
//! The crate logs through the [`log`] facade and installs no logger of its
//! own.

mod error;
mod options;
mod parser;
mod record;
mod reflect;
mod types;
mod unbounded;
mod value;
mod value_parser;

#[cfg(test)]
mod tests;

pub use error::Error;
pub use options::ParserOptions;
pub use parser::{Parser, Step};
pub use record::{Record, Struct, StructField, Tag, is_empty, is_zero};
pub use reflect::{Entries, Mapping, Reflect, Reflection, Sequence, classify, resolve};
pub use types::Type;
pub use unbounded::Unbounded;
pub use value::{Array, ErrorValue, Map, Value};
pub use value_parser::ValueParser;
