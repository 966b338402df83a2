//! Rendered prompt text.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// What a prompt asks the model to do.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PromptIntent {
    /// Conversational answer
    Chat,
    /// SQL generation
    Sql,
}

/// Fully rendered instruction text sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Prompt {
    intent: PromptIntent,
    text: String,
}

impl Prompt {
    /// Wrap rendered text.
    pub fn new(intent: PromptIntent, text: impl Into<String>) -> Self {
        Self {
            intent,
            text: text.into(),
        }
    }

    /// Take the rendered text.
    pub fn into_text(self) -> String {
        self.text
    }
}
