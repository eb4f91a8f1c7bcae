use alloc::borrow::Cow;
use core::fmt;

use thiserror::Error as ThisError;

use crate::Type;

/// Boxed error returned by user hooks and format internals.
pub type BoxError = Box<dyn core::error::Error + Send + Sync + 'static>;

// -----------------------------------------------------------------------------
// ErrorKind

/// What went wrong, without the location.
#[derive(Debug, ThisError)]
#[non_exhaustive]
pub enum ErrorKind {
    #[error("type `{type_path}` has no canonical representation")]
    UnsupportedType { type_path: &'static str },

    #[error("value {value} does not fit in `{target}`")]
    Overflow { value: Cow<'static, str>, target: &'static str },

    #[error("expected {expected}, found {found}")]
    ShapeMismatch { expected: Cow<'static, str>, found: Type },

    #[error("expected at most {expected} elements, found more")]
    Length { expected: usize },

    #[error("malformed input: {0}")]
    Malformed(BoxError),

    #[error("hook of `{type_path}` failed: {source}")]
    Hook { type_path: &'static str, source: BoxError },

    #[error("nesting deeper than {0} levels")]
    DepthLimit(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// -----------------------------------------------------------------------------
// PathSegment

/// One step of the location attached to an [`Error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A record field, by its wire name.
    Field(&'static str),
    /// An array element, or the ordinal of an entry in a map or record.
    ///
    /// Map keys are arbitrary values, so map paths are positional.
    Index(usize),
}

// -----------------------------------------------------------------------------
// Error

/// The error type of every encode and decode operation.
///
/// The kind is boxed to keep `Error` four words wide whatever the kind carries.
/// Dispatchers append [`PathSegment`]s while unwinding, so the path is only built
/// when something actually failed.
///
/// ```
/// use oc_conv::{Error, ErrorKind, PathSegment};
///
/// let err = Error::length(2)
///     .at(PathSegment::Index(3))
///     .at(PathSegment::Field("items"));
/// assert_eq!(err.path_string(), ".items[3]");
/// assert!(matches!(err.kind(), ErrorKind::Length { expected: 2 }));
/// ```
pub struct Error {
    kind: Box<ErrorKind>,
    // Stored innermost first.
    path: Vec<PathSegment>,
}

impl Error {
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind: Box::new(kind),
            path: Vec::new(),
        }
    }

    #[cold]
    pub fn unsupported(type_path: &'static str) -> Self {
        Self::new(ErrorKind::UnsupportedType { type_path })
    }

    #[cold]
    pub fn overflow(value: impl fmt::Display, target: &'static str) -> Self {
        Self::new(ErrorKind::Overflow {
            value: Cow::Owned(value.to_string()),
            target,
        })
    }

    #[cold]
    pub fn mismatch(expected: impl Into<Cow<'static, str>>, found: Type) -> Self {
        Self::new(ErrorKind::ShapeMismatch {
            expected: expected.into(),
            found,
        })
    }

    #[cold]
    pub fn length(expected: usize) -> Self {
        Self::new(ErrorKind::Length { expected })
    }

    /// Framing errors raised by formats.
    #[cold]
    pub fn malformed(err: impl Into<BoxError>) -> Self {
        Self::new(ErrorKind::Malformed(err.into()))
    }

    #[cold]
    pub fn hook(type_path: &'static str, source: impl Into<BoxError>) -> Self {
        Self::new(ErrorKind::Hook {
            type_path,
            source: source.into(),
        })
    }

    #[inline]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    #[inline]
    pub fn into_kind(self) -> ErrorKind {
        *self.kind
    }

    /// Prepend an outer location, used while unwinding.
    #[must_use]
    pub fn at(mut self, segment: PathSegment) -> Self {
        self.path.push(segment);
        self
    }

    /// Location segments, outermost first.
    pub fn path(&self) -> impl Iterator<Item = &PathSegment> {
        self.path.iter().rev()
    }

    /// Location rendered as `.field[3].inner`, empty at the root.
    pub fn path_string(&self) -> String {
        let mut out = String::new();
        for segment in self.path() {
            match segment {
                PathSegment::Field(name) => {
                    out.push('.');
                    out.push_str(name);
                }
                PathSegment::Index(index) => {
                    out.push('[');
                    out.push_str(&index.to_string());
                    out.push(']');
                }
            }
        }
        out
    }
}

impl From<ErrorKind> for Error {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<std::io::Error> for Error {
    #[inline]
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io(err))
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("path", &self.path_string())
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            fmt::Display::fmt(&self.kind, f)
        } else {
            write!(f, "at `{}`: {}", self.path_string(), self.kind)
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match &*self.kind {
            ErrorKind::Malformed(err) | ErrorKind::Hook { source: err, .. } => Some(&**err),
            ErrorKind::Io(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, PathSegment};
    use crate::Type;

    #[test]
    fn display_includes_path() {
        let err = Error::mismatch("array", Type::Map)
            .at(PathSegment::Field("inner"))
            .at(PathSegment::Index(0))
            .at(PathSegment::Field("list"));
        assert_eq!(err.to_string(), "at `.list[0].inner`: expected array, found map");
    }

    #[test]
    fn root_error_has_no_prefix() {
        let err = Error::overflow(300, "i8");
        assert_eq!(err.to_string(), "value 300 does not fit in `i8`");
    }

    #[test]
    fn error_stays_small() {
        assert_eq!(size_of::<Error>(), 4 * size_of::<usize>());
    }
}
