use thiserror::Error;

use crate::Type;

/// Faults reported by the in-memory [`ValueParser`](crate::ValueParser).
///
/// Two families live here. Unsupported-input faults ([`UnsupportedType`],
/// the depth and indirection limits, [`MissingElement`]) come from the value
/// graph itself. Protocol-misuse faults (see [`Error::is_protocol_misuse`])
/// mean the caller broke the calling grammar of [`Parser`](crate::Parser).
/// Neither kind leaves the parser stacks in a half-updated state.
///
/// The end of an unknown-length composite is not an error; it is reported
/// through [`Step::End`](crate::Step::End).
///
/// [`UnsupportedType`]: Error::UnsupportedType
/// [`MissingElement`]: Error::MissingElement
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The value does not map onto any [`Type`]. Carries the Rust type name.
    #[error("unsupported type found in value parser: {0}")]
    UnsupportedType(&'static str),

    /// A getter, `Begin`, `Next`, `MapValue` or `End` call did not match the
    /// type of the current value or of the innermost open composite.
    #[error("type mismatch: expected {expected} but found {found}")]
    TypeMismatch {
        /// The type implied by the operation that was called.
        expected: Type,
        /// The type actually found.
        found: Type,
    },

    /// `Next`, `MapValue` or `End` was called while no composite was open.
    #[error("no array or map is open")]
    NoOpenComposite,

    /// `MapValue` was called before `Next` positioned the map on a key, or
    /// after the map was exhausted.
    #[error("map value requested with no current key")]
    NoCurrentEntry,

    /// `Next` was called after the last element had already been reached.
    #[error("next called past the end of a composite of length {length}")]
    NextPastEnd {
        /// Number of elements the composite holds.
        length: usize,
    },

    /// A sequence or mapping reported more elements than it could produce.
    #[error("composite has no element at index {index}")]
    MissingElement {
        /// Index that could not be read.
        index: usize,
    },

    /// Opening another composite would exceed the configured nesting depth.
    #[error("nesting depth limit of {0} exceeded")]
    DepthLimitExceeded(usize),

    /// Unwrapping references and optionals took more than the configured
    /// number of steps.
    #[error("more than {0} levels of indirection")]
    IndirectionLimitExceeded(usize),
}

impl Error {
    /// Returns `true` for faults caused by a caller violating the parsing
    /// protocol rather than by the value being parsed.
    #[must_use]
    pub fn is_protocol_misuse(&self) -> bool {
        matches!(
            self,
            Self::TypeMismatch { .. }
                | Self::NoOpenComposite
                | Self::NoCurrentEntry
                | Self::NextPastEnd { .. }
        )
    }
}
