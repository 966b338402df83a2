//! Response bodies the client actually decodes.
//!
//! Generation and embedding bodies are forwarded or discarded unparsed; only
//! the model listing used by `validate` is decoded.

use serde::Deserialize;

/// `GET /api/tags` response.
#[derive(Debug, Deserialize)]
pub(crate) struct TagsResponse {
    #[serde(default)]
    pub models: Vec<LocalModel>,
}

/// One installed model.
#[derive(Debug, Deserialize)]
pub(crate) struct LocalModel {
    pub name: String,
}
