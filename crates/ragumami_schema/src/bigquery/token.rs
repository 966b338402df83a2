//! Bearer tokens for the REST API.

use super::wire::MetadataToken;
use ragumami_error::{SchemaError, SchemaErrorKind};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// Tokens are refreshed this long before they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Where bearer tokens come from.
pub enum TokenSource {
    /// A token supplied through configuration
    Static(String),
    /// The compute metadata server of the host the service runs on
    MetadataServer {
        /// Token endpoint
        url: String,
        /// Last token and the instant it stops being usable
        cached: Mutex<Option<(String, Instant)>>,
    },
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(_) => f.write_str("Static(<redacted>)"),
            Self::MetadataServer { url, .. } => {
                f.debug_struct("MetadataServer").field("url", url).finish()
            }
        }
    }
}

impl TokenSource {
    /// Ask the metadata server at `url` for tokens.
    pub fn metadata_server(url: impl Into<String>) -> Self {
        Self::MetadataServer {
            url: url.into(),
            cached: Mutex::new(None),
        }
    }

    /// A usable token, fetched or refreshed if needed.
    pub(crate) async fn token(&self, client: &reqwest::Client) -> Result<String, SchemaError> {
        match self {
            Self::Static(token) => Ok(token.clone()),
            Self::MetadataServer { url, cached } => {
                if let Some(token) = read_cache(cached) {
                    return Ok(token);
                }

                debug!(url = %url, "Fetching access token from metadata server");
                let response = client
                    .get(url)
                    .header("Metadata-Flavor", "Google")
                    .send()
                    .await
                    .map_err(|e| {
                        SchemaError::new(SchemaErrorKind::Auth(format!(
                            "Metadata server unreachable: {}",
                            e
                        )))
                    })?;

                if !response.status().is_success() {
                    return Err(SchemaError::new(SchemaErrorKind::Auth(format!(
                        "Metadata server returned {}",
                        response.status()
                    ))));
                }

                let token: MetadataToken = response.json().await.map_err(|e| {
                    SchemaError::new(SchemaErrorKind::Deserialization(format!(
                        "Invalid token response: {}",
                        e
                    )))
                })?;

                let valid_until = Instant::now()
                    + Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_MARGIN);
                if let Ok(mut guard) = cached.lock() {
                    *guard = Some((token.access_token.clone(), valid_until));
                }
                Ok(token.access_token)
            }
        }
    }
}

fn read_cache(cached: &Mutex<Option<(String, Instant)>>) -> Option<String> {
    let guard = cached.lock().ok()?;
    match guard.as_ref() {
        Some((token, valid_until)) if Instant::now() < *valid_until => Some(token.clone()),
        _ => None,
    }
}
