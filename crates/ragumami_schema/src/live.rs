//! Schema context rendered from live warehouse metadata.

use ragumami_core::{SchemaContext, SchemaSourceKind, TableSchema, Website};
use ragumami_error::SchemaError;
use ragumami_interface::WarehouseMetadata;
use std::fmt::Write;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// A table name paired with the outcome of reading its columns.
pub type TableListing = (String, Result<TableSchema, SchemaError>);

/// Schema source backed by a warehouse metadata query.
#[derive(Clone)]
pub struct LiveSource {
    warehouse: Arc<dyn WarehouseMetadata>,
}

impl std::fmt::Debug for LiveSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveSource")
            .field("project_id", &self.warehouse.project_id())
            .field("dataset", &self.warehouse.dataset())
            .finish()
    }
}

impl LiveSource {
    /// Wrap a warehouse metadata client.
    pub fn new(warehouse: Arc<dyn WarehouseMetadata>) -> Self {
        Self { warehouse }
    }

    /// Query the warehouse and render the context.
    ///
    /// Failing to list websites or tables fails the whole source. A failure
    /// reading one table's columns is rendered inline instead.
    #[instrument(skip(self), fields(project = %self.warehouse.project_id(), dataset = %self.warehouse.dataset()))]
    pub async fn context(&self) -> Result<SchemaContext, SchemaError> {
        let websites = self.warehouse.list_websites().await?;
        let table_names = self.warehouse.list_tables().await?;
        debug!(
            websites = websites.len(),
            tables = table_names.len(),
            "Fetched warehouse metadata"
        );

        let mut tables = Vec::with_capacity(table_names.len());
        for name in table_names {
            let schema = self.warehouse.table_schema(&name).await;
            if let Err(e) = &schema {
                warn!(table = %name, error = %e.kind, "Failed to read table schema");
            }
            tables.push((name, schema));
        }

        let text = render_live_context(
            self.warehouse.project_id(),
            self.warehouse.dataset(),
            &websites,
            &tables,
        );
        SchemaContext::new(SchemaSourceKind::Live, text)
    }
}

/// Render warehouse metadata into the fixed prompt layout.
///
/// # Examples
///
/// ```
/// use ragumami_core::Website;
/// use ragumami_schema::render_live_context;
///
/// let websites = vec![Website {
///     id: "abc".into(),
///     name: "nav.no".into(),
///     domain: None,
/// }];
/// let text = render_live_context("proj", "umami", &websites, &[]);
/// assert!(text.contains("- nav.no (ID: abc, Domain: N/A)"));
/// assert!(text.contains("`proj.umami.table_name`"));
/// ```
pub fn render_live_context(
    project_id: &str,
    dataset: &str,
    websites: &[Website],
    tables: &[TableListing],
) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_live_context(&mut out, project_id, dataset, websites, tables);
    out
}

fn write_live_context(
    out: &mut String,
    project_id: &str,
    dataset: &str,
    websites: &[Website],
    tables: &[TableListing],
) -> std::fmt::Result {
    writeln!(out, "=== BIGQUERY DATABASE SCHEMA ===")?;
    writeln!(out, "Project: {}", project_id)?;
    writeln!(out, "Dataset: {}", dataset)?;
    writeln!(out)?;

    writeln!(out, "=== AVAILABLE WEBSITES ===")?;
    if websites.is_empty() {
        writeln!(out, "No websites found")?;
    }
    for website in websites {
        writeln!(
            out,
            "- {} (ID: {}, Domain: {})",
            website.name,
            website.id,
            website.domain.as_deref().unwrap_or("N/A")
        )?;
    }
    writeln!(out)?;

    writeln!(out, "=== DATABASE TABLES ===")?;
    for (name, schema) in tables {
        match schema {
            Ok(schema) => {
                writeln!(out, "\nTable: `{}.{}.{}`", project_id, dataset, name)?;
                writeln!(out, "Columns:")?;
                for column in &schema.columns {
                    write!(out, "  - {} ({}, {})", column.name, column.data_type, column.mode)?;
                    if let Some(description) = &column.description {
                        write!(out, " - {}", description)?;
                    }
                    writeln!(out)?;
                }
            }
            Err(e) => writeln!(
                out,
                "\nTable: `{}.{}.{}` - Error reading schema: {}",
                project_id, dataset, name, e.kind
            )?,
        }
    }
    writeln!(out)?;

    writeln!(out, "=== QUERY INSTRUCTIONS ===")?;
    writeln!(
        out,
        "- Always use fully qualified table names: `{}.{}.table_name`",
        project_id, dataset
    )?;
    writeln!(out, "- Use backticks (`) around table names")?;
    writeln!(out, "- Filter by website_id when querying event or event_data tables")?;
    writeln!(out, "- Match website names from user queries to website_id values listed above")
}
