/// Limits applied by the [`ValueParser`](crate::ValueParser) while it walks a
/// value graph.
///
/// The parser only ever borrows the values it reads, so these limits are what
/// turns a self-referencing graph (for example through `Rc` cells) into an
/// error instead of an endless traversal.
///
/// # Default
///
/// `max_depth` is 1024 and `max_indirections` is 64.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Maximum number of arrays and maps open at the same time.
    ///
    /// Opening one more fails with
    /// [`Error::DepthLimitExceeded`](crate::Error::DepthLimitExceeded) and
    /// leaves the parser unchanged.
    ///
    /// # Default
    ///
    /// `1024`
    pub max_depth: usize,

    /// Maximum number of references, boxes and optionals unwrapped to reach a
    /// single value.
    ///
    /// # Default
    ///
    /// `64`
    pub max_indirections: usize,
}

impl ParserOptions {
    /// Default nesting limit.
    pub const DEFAULT_MAX_DEPTH: usize = 1024;
    /// Default indirection limit.
    pub const DEFAULT_MAX_INDIRECTIONS: usize = 64;
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_indirections: Self::DEFAULT_MAX_INDIRECTIONS,
        }
    }
}
