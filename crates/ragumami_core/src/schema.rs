//! Schema context and warehouse metadata records.

use derive_getters::Getters;
use ragumami_error::{SchemaError, SchemaErrorKind};
use serde::{Deserialize, Serialize};

/// Static schema description used when no live warehouse is configured or
/// the live source fails.
pub const DEFAULT_FALLBACK_SCHEMA: &str = "\
=== UMAMI ANALYTICS DATABASE SCHEMA (STATIC) ===
Live warehouse metadata is unavailable; this is a minimal example schema.

Table: `website`
Columns:
  - website_id (STRING, REQUIRED) - Unique id of the tracked website
  - name (STRING, REQUIRED) - Display name of the website
  - domain (STRING, NULLABLE) - Primary domain

Table: `event`
Columns:
  - event_id (STRING, REQUIRED)
  - website_id (STRING, REQUIRED) - References website.website_id
  - session_id (STRING, REQUIRED)
  - url_path (STRING, NULLABLE) - Path of the visited page
  - event_name (STRING, NULLABLE) - Custom event name, empty for pageviews
  - created_at (TIMESTAMP, REQUIRED)

Other tables: session, pageview, event_data.
";

/// Where a schema context came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SchemaSourceKind {
    /// Rendered from a live metadata query
    Live,
    /// Static template
    Fallback,
}

/// Textual description of queryable tables, embedded in SQL prompts.
///
/// Never empty.
///
/// # Examples
///
/// ```
/// use ragumami_core::{SchemaContext, SchemaSourceKind};
///
/// let context = SchemaContext::default_fallback();
/// assert_eq!(*context.source(), SchemaSourceKind::Fallback);
/// assert!(!context.text().is_empty());
///
/// assert!(SchemaContext::new(SchemaSourceKind::Live, "  \n").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct SchemaContext {
    source: SchemaSourceKind,
    text: String,
}

impl SchemaContext {
    /// Wrap rendered text, rejecting blank text.
    #[track_caller]
    pub fn new(source: SchemaSourceKind, text: impl Into<String>) -> Result<Self, SchemaError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(SchemaError::new(SchemaErrorKind::EmptyContext));
        }
        Ok(Self { source, text })
    }

    /// The built-in static schema.
    pub fn default_fallback() -> Self {
        Self {
            source: SchemaSourceKind::Fallback,
            text: DEFAULT_FALLBACK_SCHEMA.to_string(),
        }
    }
}

/// A tracked website, as listed in the warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Website {
    /// Website id (UUID string)
    pub id: String,
    /// Display name
    pub name: String,
    /// Primary domain, if recorded
    pub domain: Option<String>,
}

/// One column of a warehouse table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    /// Column name
    pub name: String,
    /// Warehouse type (STRING, INTEGER, TIMESTAMP, ...)
    pub data_type: String,
    /// NULLABLE, REQUIRED or REPEATED
    pub mode: String,
    /// Column description, if any
    pub description: Option<String>,
}

/// Column listing for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name without project or dataset
    pub table_name: String,
    /// Columns in declaration order
    pub columns: Vec<TableColumn>,
}
