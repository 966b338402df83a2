//! Prompt templates.

use ragumami_core::{Prompt, PromptIntent, SchemaContext};

/// Wrap a chat message in the assistant persona.
///
/// # Examples
///
/// ```
/// use ragumami_rag::build_chat_prompt;
///
/// let prompt = build_chat_prompt("Hvor mange besøk i går?");
/// assert!(prompt.text().contains("Brukerens spørsmål: Hvor mange besøk i går?"));
/// ```
pub fn build_chat_prompt(message: &str) -> Prompt {
    Prompt::new(
        PromptIntent::Chat,
        format!(
            "Du er en hjelpsom AI-assistent for Umami Analytics.\n\
             Brukerens spørsmål: {}\n\
             \n\
             Gi et kort og nyttig svar.",
            message
        ),
    )
}

/// Wrap a natural-language query and the schema context in SQL instructions.
pub fn build_sql_prompt(query: &str, schema: &SchemaContext) -> Prompt {
    Prompt::new(
        PromptIntent::Sql,
        format!(
            "You are a SQL expert. Generate a BigQuery Standard SQL query for the user query below.\n\
             \n\
             Schema:\n\
             {}\n\
             \n\
             Rules:\n\
             - Always use fully qualified table names (`project.dataset.table`).\n\
             - Quote every table reference in backticks (`), as BigQuery requires.\n\
             - Match websites and other entities named in the user query to the identifiers listed in the schema, and filter on those identifiers.\n\
             \n\
             User Query: {}\n\
             \n\
             Return only the SQL query, no explanations.",
            schema.text().trim_end(),
            query
        ),
    )
}
