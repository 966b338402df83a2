//! Single decision point between the live and fallback schema sources.

use crate::{FallbackSource, LiveSource};
use ragumami_core::{SchemaContext, SchemaSourceKind};
use ragumami_interface::WarehouseMetadata;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Produces the schema context for SQL prompts.
///
/// `context` never fails: when the live source errors, the fallback template
/// is returned and the error is only logged.
#[derive(Debug, Clone)]
pub enum SchemaContextProvider {
    /// Query the warehouse, substituting `fallback` on failure
    Live {
        /// Live warehouse source
        live: LiveSource,
        /// Substitute used when the live source fails
        fallback: FallbackSource,
    },
    /// Always use the static template
    Fallback(FallbackSource),
}

impl SchemaContextProvider {
    /// Live warehouse with the built-in fallback template.
    pub fn live(warehouse: Arc<dyn WarehouseMetadata>) -> Self {
        Self::Live {
            live: LiveSource::new(warehouse),
            fallback: FallbackSource::default(),
        }
    }

    /// Static built-in template only.
    pub fn fallback() -> Self {
        Self::Fallback(FallbackSource::default())
    }

    /// Live when a warehouse is configured, static otherwise.
    pub fn from_optional(warehouse: Option<Arc<dyn WarehouseMetadata>>) -> Self {
        match warehouse {
            Some(warehouse) => Self::live(warehouse),
            None => Self::fallback(),
        }
    }

    /// Replace the fallback template used by either variant.
    pub fn with_fallback(self, fallback: FallbackSource) -> Self {
        match self {
            Self::Live { live, .. } => Self::Live { live, fallback },
            Self::Fallback(_) => Self::Fallback(fallback),
        }
    }

    /// Which source is attempted first.
    pub fn preferred_source(&self) -> SchemaSourceKind {
        match self {
            Self::Live { .. } => SchemaSourceKind::Live,
            Self::Fallback(_) => SchemaSourceKind::Fallback,
        }
    }

    /// Resolve the schema context.
    #[instrument(skip(self), fields(preferred = %self.preferred_source()))]
    pub async fn context(&self) -> SchemaContext {
        match self {
            Self::Live { live, fallback } => match live.context().await {
                Ok(context) => {
                    debug!(length = context.text().len(), "Using live schema context");
                    context
                }
                Err(e) => {
                    warn!(error = %e, "Live schema unavailable, using fallback template");
                    fallback.context()
                }
            },
            Self::Fallback(fallback) => fallback.context(),
        }
    }
}
