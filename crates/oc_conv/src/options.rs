/// Default nesting limit of [`Options::max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Runtime knobs shared by [`Encoder`](crate::Encoder) and [`Decoder`](crate::Decoder).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Fail with [`ErrorKind::DepthLimit`](crate::ErrorKind::DepthLimit) once arrays
    /// and maps nest deeper than this. `None` disables the guard.
    pub max_depth: Option<usize>,
    /// Fall back to ASCII case-insensitive matching of record keys on decode.
    pub case_insensitive_fields: bool,
}

impl Options {
    pub const DEFAULT: Self = Self {
        max_depth: Some(DEFAULT_MAX_DEPTH),
        case_insensitive_fields: true,
    };
}

impl Default for Options {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}
