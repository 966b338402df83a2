//! Errors raised while talking to the text-generation backend.

/// Generation backend error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum GenerationErrorKind {
    /// Request rejected before any network I/O (e.g. empty prompt)
    #[display("Invalid generation request: {}", _0)]
    InvalidRequest(String),
    /// The HTTP client could not be constructed
    #[display("Failed to build HTTP client: {}", _0)]
    ClientBuild(String),
    /// A single attempt exceeded its connect or request budget
    #[display("{} timed out", operation)]
    Timeout {
        /// Operation that timed out ("generate", "embed")
        operation: String,
    },
    /// One attempt answered with a 5xx status
    #[display("Model backend returned server error {}", status_code)]
    ServerStatus {
        /// HTTP status code
        status_code: u16,
    },
    /// Every attempt allowed by the retry policy answered with a 5xx status
    #[display(
        "Model backend still failing after {} attempts (last status {})",
        attempts,
        last_status
    )]
    RetryExhausted {
        /// Total attempts made, including the first
        attempts: u32,
        /// Status of the final attempt
        last_status: u16,
    },
    /// The backend rejected the request (4xx); never retried
    #[display("Model backend rejected request with status {}", status_code)]
    ClientStatus {
        /// HTTP status code
        status_code: u16,
    },
    /// Configured model is not installed on the backend
    #[display("Model not found: {}", _0)]
    ModelNotFound(String),
    /// Connection refused, DNS failure, broken body stream and similar
    #[display("Transport error: {}", _0)]
    Transport(String),
}

impl GenerationErrorKind {
    /// Check if this error should trigger another attempt.
    ///
    /// Only server-side failures (HTTP 500-599) are retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationErrorKind::ServerStatus { status_code } => {
                (500..=599).contains(status_code)
            }
            _ => false,
        }
    }
}

/// Generation error with source location tracking.
///
/// # Examples
///
/// ```
/// use ragumami_error::{GenerationError, GenerationErrorKind, RetryableError};
///
/// let err = GenerationError::new(GenerationErrorKind::ServerStatus { status_code: 503 });
/// assert!(err.is_retryable());
/// assert!(format!("{}", err).contains("503"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Generation Error: {} at line {} in {}", kind, line, file)]
pub struct GenerationError {
    /// The kind of error that occurred
    pub kind: GenerationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl GenerationError {
    /// Create a new GenerationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GenerationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// True if the attempt ran out of its timeout budget.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, GenerationErrorKind::Timeout { .. })
    }

    /// True if the logical call failed after spending its whole retry budget.
    pub fn is_retry_exhausted(&self) -> bool {
        matches!(self.kind, GenerationErrorKind::RetryExhausted { .. })
    }
}

/// Trait for errors that support retry logic.
///
/// Transient errors (a 5xx from the model backend) return true. Permanent
/// errors such as a 4xx, a timeout or a refused connection return false.
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    fn is_retryable(&self) -> bool;
}

impl RetryableError for GenerationErrorKind {
    fn is_retryable(&self) -> bool {
        GenerationErrorKind::is_retryable(self)
    }
}

impl RetryableError for GenerationError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
