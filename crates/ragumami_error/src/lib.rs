//! Error types for the Ragumami RAG API.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use ragumami_error::{GenerationError, GenerationErrorKind, RagumamiResult};
//!
//! fn call_backend() -> RagumamiResult<String> {
//!     Err(GenerationError::new(GenerationErrorKind::ClientStatus { status_code: 404 }))?
//! }
//!
//! match call_backend() {
//!     Ok(text) => println!("Got: {}", text),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod generation;
mod schema;
mod server;

pub use config::ConfigError;
pub use error::{RagumamiError, RagumamiErrorKind, RagumamiResult};
pub use generation::{GenerationError, GenerationErrorKind, RetryableError};
pub use schema::{SchemaError, SchemaErrorKind};
pub use server::{ServerError, ServerErrorKind};
