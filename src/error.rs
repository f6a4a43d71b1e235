use thiserror::Error;

/// Error taxonomy for engine operations.
///
/// `Configuration` is always fatal to the operation and never retried. The
/// per-artifact variants abort a batch only when the artifact's
/// `fail_on_error` flag is set; otherwise the batch logs a warning and
/// continues with the next artifact.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to resolve {coordinate}: {source}")]
    Resolution {
        coordinate: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to install {coordinate}: {source}")]
    Installation {
        coordinate: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to deploy {coordinate}: {source}")]
    Deployment {
        coordinate: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    pub fn resolution(coordinate: impl Into<String>, source: anyhow::Error) -> Error {
        Error::Resolution {
            coordinate: coordinate.into(),
            source: source.into(),
        }
    }

    pub fn installation(coordinate: impl Into<String>, source: anyhow::Error) -> Error {
        Error::Installation {
            coordinate: coordinate.into(),
            source: source.into(),
        }
    }

    pub fn deployment(coordinate: impl Into<String>, source: anyhow::Error) -> Error {
        Error::Deployment {
            coordinate: coordinate.into(),
            source: source.into(),
        }
    }

    /// Configuration errors abort the whole step even for artifacts marked
    /// with `fail_on_error = false`.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
