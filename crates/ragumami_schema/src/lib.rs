//! Schema context for grounding SQL generation.
//!
//! A [`SchemaContextProvider`] is either backed by a live warehouse
//! ([`LiveSource`]) or by a static template ([`FallbackSource`]). The live
//! variant never surfaces its failures: any error while querying the warehouse
//! is logged and the fallback template is used instead.
//!
//! [`BigQueryMetadataClient`] is the production
//! [`WarehouseMetadata`](ragumami_interface::WarehouseMetadata) implementation,
//! speaking the BigQuery REST API.
//!
//! # Example
//!
//! ```
//! use ragumami_core::SchemaSourceKind;
//! use ragumami_schema::SchemaContextProvider;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let provider = SchemaContextProvider::fallback();
//! let context = provider.context().await;
//! assert_eq!(*context.source(), SchemaSourceKind::Fallback);
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bigquery;
mod fallback;
mod live;
mod provider;

pub use bigquery::{
    BigQueryConfig, BigQueryConfigBuilder, BigQueryConfigBuilderError, BigQueryMetadataClient,
    TokenSource,
};
pub use fallback::FallbackSource;
pub use live::{LiveSource, TableListing, render_live_context};
pub use provider::SchemaContextProvider;
