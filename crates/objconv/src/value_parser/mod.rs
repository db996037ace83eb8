//! A [`Parser`] that replays an in-memory value.
//!
//! The engine keeps two stacks. The value stack holds the value currently
//! being read at each open nesting level, with the root kept aside so the
//! stack is empty whenever no composite is open. The context stack holds one
//! [`Context`] per open array or map, recording where iteration stands and
//! which value-stack depth to unwind to when the composite moves on.
//!
//! Every operation validates before it mutates: a failed call leaves both
//! stacks exactly as they were.

use core::error::Error as StdError;
use std::time::{Duration, SystemTime};

use log::trace;

use crate::{
    Error, Parser, ParserOptions, Reflect, Reflection, Sequence, Step, Type, record::visible_fields,
    resolve,
};


/// Backing storage of an open composite.
enum Frame<'a> {
    Sequence(&'a dyn Sequence),
    /// Key/value pairs captured at `Begin`, from a mapping or the surviving
    /// fields of a record.
    Entries(Vec<(&'a dyn Reflect, &'a dyn Reflect)>),
}

/// Iteration state of one open composite.
struct Context<'a> {
    /// [`Type::Array`] or [`Type::Map`].
    kind: Type,
    frame: Frame<'a>,
    /// Length reported by `Begin`.
    length: Option<usize>,
    /// Index of the element (or entry key) on top of the value stack.
    cursor: Option<usize>,
    /// Set once an unknown-length composite has reported [`Step::End`]; the
    /// cursor then still points at the last element visited.
    exhausted: bool,
    /// Value-stack depth when the composite was opened.
    base: usize,
}

impl<'a> Context<'a> {
    /// The element at `index`, or the key of the entry at `index`.
    fn child(&self, index: usize) -> Option<&'a dyn Reflect> {
        match &self.frame {
            Frame::Sequence(seq) => seq.get(index),
            Frame::Entries(entries) => entries.get(index).map(|&(key, _)| key),
        }
    }

    fn entry_value(&self, index: usize) -> Option<&'a dyn Reflect> {
        match &self.frame {
            Frame::Sequence(_) => None,
            Frame::Entries(entries) => entries.get(index).map(|&(_, value)| value),
        }
    }

    /// Elements visited so far.
    fn visited(&self) -> usize {
        self.cursor.map_or(0, |index| index + 1)
    }
}

/// Traverses an in-memory value graph, answering [`Parser`] calls the same
/// way a wire-format parser would for the equivalent encoded input.
///
/// Any value implementing [`Reflect`] can be replayed: scalars, strings,
/// byte buffers, sequences, maps, records declared with
/// [`record!`](crate::record!), and any mix of references, boxes and options
/// around them.
///
/// # Examples
///
/// ```
/// use objconv::{Parser, Step, Type, Unbounded, ValueParser};
///
/// let values = vec![1i64, 2, 3];
/// let mut parser = ValueParser::new(&values);
/// assert_eq!(parser.parse_type().unwrap(), Type::Array);
/// assert_eq!(parser.parse_array_begin().unwrap(), Some(3));
/// assert_eq!(parser.parse_int().unwrap(), 1);
/// assert_eq!(parser.parse_array_next().unwrap(), Step::Advanced);
/// assert_eq!(parser.parse_int().unwrap(), 2);
/// assert_eq!(parser.parse_array_next().unwrap(), Step::Advanced);
/// assert_eq!(parser.parse_int().unwrap(), 3);
/// parser.parse_array_end().unwrap();
/// assert!(parser.is_finished());
///
/// // Without a known length, `Next` runs before every element.
/// let unbounded = Unbounded(vec![true]);
/// let mut parser = ValueParser::new(&unbounded);
/// assert_eq!(parser.parse_array_begin().unwrap(), None);
/// assert_eq!(parser.parse_array_next().unwrap(), Step::Advanced);
/// assert!(parser.parse_bool().unwrap());
/// assert_eq!(parser.parse_array_next().unwrap(), Step::End);
/// parser.parse_array_end().unwrap();
/// ```
pub struct ValueParser<'a> {
    root: &'a dyn Reflect,
    stack: Vec<&'a dyn Reflect>,
    contexts: Vec<Context<'a>>,
    options: ParserOptions,
}

impl<'a> ValueParser<'a> {
    /// Creates a parser over `root` with default [`ParserOptions`].
    #[must_use]
    pub fn new(root: &'a dyn Reflect) -> Self {
        Self::with_options(root, ParserOptions::default())
    }

    /// Creates a parser over `root`.
    #[must_use]
    pub fn with_options(root: &'a dyn Reflect, options: ParserOptions) -> Self {
        Self {
            root,
            stack: Vec::new(),
            contexts: Vec::new(),
            options,
        }
    }

    /// Number of arrays and maps currently open.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.contexts.len()
    }

    /// Returns `true` when no composite is open and no child value is pending,
    /// i.e. every `Begin` has been matched by its `End`.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.contexts.is_empty() && self.stack.is_empty()
    }

    /// The options this parser was created with.
    #[must_use]
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    fn top(&self) -> &'a dyn Reflect {
        self.stack.last().copied().unwrap_or(self.root)
    }

    fn current(&self) -> Result<Reflection<'a>, Error> {
        resolve(self.top(), self.options.max_indirections)
    }

    fn push(&mut self, value: &'a dyn Reflect) {
        self.stack.push(value);
        trace!("ValueParser: push value, stack depth {}", self.stack.len());
    }

    fn unwind(&mut self, depth: usize) {
        if self.stack.len() > depth {
            self.stack.truncate(depth);
            trace!("ValueParser: unwind value stack to depth {depth}");
        }
    }

    /// The innermost context, checked against the composite kind an
    /// operation applies to.
    fn context(&self, kind: Type) -> Result<&Context<'a>, Error> {
        let context = self.contexts.last().ok_or(Error::NoOpenComposite)?;
        if context.kind == kind {
            Ok(context)
        } else {
            Err(Error::TypeMismatch {
                expected: kind,
                found: context.kind,
            })
        }
    }

    fn begin(&mut self, kind: Type) -> Result<Option<usize>, Error> {
        if self.contexts.len() >= self.options.max_depth {
            return Err(Error::DepthLimitExceeded(self.options.max_depth));
        }

        let (frame, length) = match (kind, self.current()?) {
            (Type::Array, Reflection::Array(seq)) => (Frame::Sequence(seq), seq.known_len()),
            (Type::Map, Reflection::Map(map)) => {
                let entries: Vec<_> = map.entries().collect();
                let length = map.known_len().map(|_| entries.len());
                (Frame::Entries(entries), length)
            }
            (Type::Map, Reflection::Record(record)) => {
                let entries = visible_fields(record);
                let length = Some(entries.len());
                (Frame::Entries(entries), length)
            }
            (_, found) => {
                return Err(Error::TypeMismatch {
                    expected: kind,
                    found: found.kind()?,
                });
            }
        };

        let mut context = Context {
            kind,
            frame,
            length,
            cursor: None,
            exhausted: false,
            base: self.stack.len(),
        };

        let first = match length {
            Some(0) | None => None,
            Some(_) => Some(context.child(0).ok_or(Error::MissingElement { index: 0 })?),
        };

        if let Some(first) = first {
            context.cursor = Some(0);
            self.push(first);
        }
        self.contexts.push(context);
        trace!(
            "ValueParser: begin {kind} of length {length:?}, depth {}",
            self.contexts.len()
        );
        Ok(length)
    }

    fn next(&mut self, kind: Type) -> Result<Step, Error> {
        let context = self.context(kind)?;
        if context.exhausted {
            return Err(Error::NextPastEnd {
                length: context.visited(),
            });
        }

        let index = context.cursor.map_or(0, |index| index + 1);
        let base = context.base;
        let child = context.child(index);

        match (context.length, child) {
            (Some(length), _) if index >= length => Err(Error::NextPastEnd { length }),
            (Some(_), None) => Err(Error::MissingElement { index }),
            (None, None) => {
                self.unwind(base);
                if let Some(context) = self.contexts.last_mut() {
                    context.exhausted = true;
                }
                trace!("ValueParser: {kind} exhausted after {index} elements");
                Ok(Step::End)
            }
            (_, Some(child)) => {
                self.unwind(base);
                self.push(child);
                if let Some(context) = self.contexts.last_mut() {
                    context.cursor = Some(index);
                }
                Ok(Step::Advanced)
            }
        }
    }

    fn end(&mut self, kind: Type) -> Result<(), Error> {
        let base = self.context(kind)?.base;
        self.unwind(base);
        self.contexts.pop();
        trace!("ValueParser: end {kind}, depth {}", self.contexts.len());
        Ok(())
    }
}

/// Builds the fault for a getter called against a value of another type.
fn mismatch(expected: Type, found: &Reflection<'_>) -> Error {
    match found.kind() {
        Ok(found) => Error::TypeMismatch { expected, found },
        Err(err) => err,
    }
}

impl Parser for ValueParser<'_> {
    type Error = Error;

    fn parse_type(&mut self) -> Result<Type, Error> {
        self.current()?.kind()
    }

    fn parse_nil(&mut self) -> Result<(), Error> {
        match self.current()? {
            Reflection::Nil => Ok(()),
            other => Err(mismatch(Type::Nil, &other)),
        }
    }

    fn parse_bool(&mut self) -> Result<bool, Error> {
        match self.current()? {
            Reflection::Bool(v) => Ok(v),
            other => Err(mismatch(Type::Bool, &other)),
        }
    }

    fn parse_int(&mut self) -> Result<i64, Error> {
        match self.current()? {
            Reflection::Int(v) => Ok(v),
            other => Err(mismatch(Type::Int, &other)),
        }
    }

    fn parse_uint(&mut self) -> Result<u64, Error> {
        match self.current()? {
            Reflection::Uint(v) => Ok(v),
            other => Err(mismatch(Type::Uint, &other)),
        }
    }

    fn parse_float(&mut self) -> Result<f64, Error> {
        match self.current()? {
            Reflection::Float(v) => Ok(v),
            other => Err(mismatch(Type::Float, &other)),
        }
    }

    fn parse_string(&mut self) -> Result<&[u8], Error> {
        match self.current()? {
            Reflection::String(v) => Ok(v.as_bytes()),
            other => Err(mismatch(Type::String, &other)),
        }
    }

    fn parse_bytes(&mut self) -> Result<&[u8], Error> {
        match self.current()? {
            Reflection::Bytes(v) => Ok(v),
            other => Err(mismatch(Type::Bytes, &other)),
        }
    }

    fn parse_time(&mut self) -> Result<SystemTime, Error> {
        match self.current()? {
            Reflection::Timestamp(v) => Ok(v),
            other => Err(mismatch(Type::Timestamp, &other)),
        }
    }

    fn parse_duration(&mut self) -> Result<Duration, Error> {
        match self.current()? {
            Reflection::Duration(v) => Ok(v),
            other => Err(mismatch(Type::Duration, &other)),
        }
    }

    fn parse_error(&mut self) -> Result<&(dyn StdError + 'static), Error> {
        match self.current()? {
            Reflection::Error(v) => Ok(v),
            other => Err(mismatch(Type::Error, &other)),
        }
    }

    fn parse_array_begin(&mut self) -> Result<Option<usize>, Error> {
        self.begin(Type::Array)
    }

    fn parse_array_next(&mut self) -> Result<Step, Error> {
        self.next(Type::Array)
    }

    fn parse_array_end(&mut self) -> Result<(), Error> {
        self.end(Type::Array)
    }

    fn parse_map_begin(&mut self) -> Result<Option<usize>, Error> {
        self.begin(Type::Map)
    }

    fn parse_map_value(&mut self) -> Result<(), Error> {
        let context = self.context(Type::Map)?;
        let value = context
            .cursor
            .filter(|_| !context.exhausted)
            .and_then(|index| context.entry_value(index))
            .ok_or(Error::NoCurrentEntry)?;
        // The key stays at `base`; a repeated call replaces the value above it.
        let key_depth = context.base + 1;
        self.unwind(key_depth);
        self.push(value);
        Ok(())
    }

    fn parse_map_next(&mut self) -> Result<Step, Error> {
        self.next(Type::Map)
    }

    fn parse_map_end(&mut self) -> Result<(), Error> {
        self.end(Type::Map)
    }
}

impl core::fmt::Debug for ValueParser<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ValueParser")
            .field("stack_depth", &self.stack.len())
            .field("depth", &self.contexts.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
