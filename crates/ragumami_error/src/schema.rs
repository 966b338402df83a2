//! Warehouse schema resolution errors.
//!
//! These never reach an HTTP caller: the schema context provider absorbs them
//! and substitutes the fallback template.

/// Schema resolution error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SchemaErrorKind {
    /// Warehouse could not be reached
    #[display("Connection failed: {}", _0)]
    Connection(String),
    /// Credentials missing, expired or rejected
    #[display("Authentication failed: {}", _0)]
    Auth(String),
    /// Requested table does not exist
    #[display("Table not found: {}", _0)]
    TableNotFound(String),
    /// Metadata query failed
    #[display("Query failed: {}", _0)]
    Query(String),
    /// Warehouse response could not be decoded
    #[display("Failed to decode response: {}", _0)]
    Deserialization(String),
    /// A rendered schema context was blank
    #[display("Schema context is empty")]
    EmptyContext,
    /// Live source is misconfigured
    #[display("Configuration error: {}", _0)]
    Configuration(String),
}

/// Schema error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Schema Error: {} at line {} in {}", kind, line, file)]
pub struct SchemaError {
    /// The error kind
    pub kind: SchemaErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl SchemaError {
    /// Create a new SchemaError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: SchemaErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
