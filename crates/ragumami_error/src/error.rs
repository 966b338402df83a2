//! Top-level error wrapper types.

use crate::{ConfigError, GenerationError, GenerationErrorKind, SchemaError, ServerError};

/// Every concern-specific error the workspace can produce.
///
/// # Examples
///
/// ```
/// use ragumami_error::{ConfigError, RagumamiError};
///
/// let err: RagumamiError = ConfigError::new("missing model").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum RagumamiErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Text-generation backend error
    #[from(GenerationError)]
    Generation(GenerationError),
    /// Warehouse schema error
    #[from(SchemaError)]
    Schema(SchemaError),
    /// HTTP server error
    #[from(ServerError)]
    Server(ServerError),
}

/// Ragumami error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Ragumami Error: {}", _0)]
pub struct RagumamiError(Box<RagumamiErrorKind>);

impl RagumamiError {
    /// Create a new error from a kind.
    pub fn new(kind: RagumamiErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &RagumamiErrorKind {
        &self.0
    }

    /// The generation error kind, if this error came from the model backend.
    pub fn generation_kind(&self) -> Option<&GenerationErrorKind> {
        match self.kind() {
            RagumamiErrorKind::Generation(e) => Some(&e.kind),
            _ => None,
        }
    }

    /// The error message without source location, suitable for API callers.
    pub fn message(&self) -> String {
        match self.kind() {
            RagumamiErrorKind::Config(e) => e.message.clone(),
            RagumamiErrorKind::Generation(e) => e.kind.to_string(),
            RagumamiErrorKind::Schema(e) => e.kind.to_string(),
            RagumamiErrorKind::Server(e) => e.kind.to_string(),
        }
    }
}

// Generic From implementation for any type that converts to RagumamiErrorKind
impl<T> From<T> for RagumamiError
where
    T: Into<RagumamiErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Ragumami operations.
pub type RagumamiResult<T> = std::result::Result<T, RagumamiError>;
