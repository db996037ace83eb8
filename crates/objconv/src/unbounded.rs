use std::iter;

use crate::{Entries, Mapping, Reflect, Reflection, Sequence};

/// Hides the length of the wrapped array or map.
///
/// Text formats cannot tell how many elements a composite holds until they
/// reach its closing delimiter. Wrapping a container in `Unbounded` makes the
/// [`ValueParser`](crate::ValueParser) behave the same way: `Begin` reports no
/// length and `Next` signals [`Step::End`](crate::Step::End) after the last
/// element. Any other value passes through unchanged.
///
/// The wrapper applies to the container it holds directly; it is not carried
/// through references or boxes inside it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Unbounded<T>(pub T);

impl<T: Reflect> Sequence for Unbounded<T> {
    fn known_len(&self) -> Option<usize> {
        None
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        match self.0.reflect() {
            Reflection::Array(seq) => seq.get(index),
            _ => None,
        }
    }
}

impl<T: Reflect> Mapping for Unbounded<T> {
    fn known_len(&self) -> Option<usize> {
        None
    }

    fn entries(&self) -> Entries<'_> {
        match self.0.reflect() {
            Reflection::Map(map) => map.entries(),
            _ => Box::new(iter::empty()),
        }
    }
}

impl<T: Reflect> Reflect for Unbounded<T> {
    fn reflect(&self) -> Reflection<'_> {
        match self.0.reflect() {
            Reflection::Array(_) => Reflection::Array(self),
            Reflection::Map(_) => Reflection::Map(self),
            other => other,
        }
    }
}
