use thiserror::Error as ThisError;

/// Error of the registry entry points.
#[derive(Debug, ThisError)]
#[non_exhaustive]
pub enum CodecError {
    #[error("no codec registered under `{0}`")]
    CodecNotFound(String),

    #[error(transparent)]
    Conv(#[from] oc_conv::Error),
}

impl From<std::io::Error> for CodecError {
    #[inline]
    fn from(err: std::io::Error) -> Self {
        Self::Conv(err.into())
    }
}
