//! Static schema template.

use ragumami_core::{DEFAULT_FALLBACK_SCHEMA, SchemaContext, SchemaSourceKind};
use ragumami_error::SchemaError;

/// Schema source that always returns the same text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackSource {
    template: SchemaContext,
}

impl FallbackSource {
    /// Use a custom template instead of the built-in one.
    ///
    /// Blank templates are rejected so the source can never produce an empty
    /// context.
    #[track_caller]
    pub fn with_template(template: impl Into<String>) -> Result<Self, SchemaError> {
        Ok(Self {
            template: SchemaContext::new(SchemaSourceKind::Fallback, template)?,
        })
    }

    /// The template text.
    pub fn template(&self) -> &str {
        self.template.text()
    }

    /// Produce the fallback context.
    pub fn context(&self) -> SchemaContext {
        self.template.clone()
    }
}

impl Default for FallbackSource {
    fn default() -> Self {
        Self {
            template: SchemaContext::default_fallback(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_builtin_schema() {
        let source = FallbackSource::default();
        assert_eq!(source.template(), DEFAULT_FALLBACK_SCHEMA);
        assert_eq!(*source.context().source(), SchemaSourceKind::Fallback);
    }

    #[test]
    fn blank_template_is_rejected() {
        assert!(FallbackSource::with_template("   ").is_err());
        let source = FallbackSource::with_template("Table: `website`").unwrap();
        assert_eq!(source.context().text(), "Table: `website`");
    }
}
