//! BigQuery REST metadata client.

mod client;
mod config;
mod token;
mod wire;

pub use client::BigQueryMetadataClient;
pub use config::{BigQueryConfig, BigQueryConfigBuilder, BigQueryConfigBuilderError};
pub use token::TokenSource;
