//! Table and column names for the pgvector document table.

use crate::RetrievalError;

/// Where documents and their embeddings live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub table: String,
    pub id_column: String,
    pub vector_column: String,
    pub content_column: String,
    pub metadata_column: String,
}

impl Default for TableSchema {
    fn default() -> Self {
        Self {
            table: "bp_docs_gemini".into(),
            id_column: "id".into(),
            vector_column: "embedding".into(),
            content_column: "text".into(),
            metadata_column: "metadata".into(),
        }
    }
}

impl TableSchema {
    /// Names are spliced into SQL, so each must be a plain identifier.
    pub fn validate(&self) -> Result<(), RetrievalError> {
        let names = [
            &self.table,
            &self.id_column,
            &self.vector_column,
            &self.content_column,
            &self.metadata_column,
        ];
        match names.into_iter().find(|n| !is_identifier(n)) {
            Some(bad) => Err(RetrievalError::InvalidSchema(bad.clone())),
            None => Ok(()),
        }
    }

    pub(crate) fn search_sql(&self) -> String {
        format!(
            r#"SELECT "{content}", "{metadata}" FROM "{table}" ORDER BY "{vector}" <=> $1::text::vector ASC LIMIT $2"#,
            content = self.content_column,
            metadata = self.metadata_column,
            table = self.table,
            vector = self.vector_column,
        )
    }

    pub(crate) fn create_table_sql(&self) -> String {
        format!(
            r#"CREATE TABLE IF NOT EXISTS "{table}" (
                "{id}" uuid NOT NULL DEFAULT gen_random_uuid() PRIMARY KEY,
                "{content}" text,
                "{metadata}" jsonb,
                "{vector}" vector
            )"#,
            table = self.table,
            id = self.id_column,
            content = self.content_column,
            metadata = self.metadata_column,
            vector = self.vector_column,
        )
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else { return false };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name.len() <= 63
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schema_is_valid() {
        let schema = TableSchema::default();
        assert!(schema.validate().is_ok());
        assert_eq!(
            schema.search_sql(),
            r#"SELECT "text", "metadata" FROM "bp_docs_gemini" ORDER BY "embedding" <=> $1::text::vector ASC LIMIT $2"#
        );
        assert!(schema.create_table_sql().contains(r#""embedding" vector"#));
    }

    #[test]
    fn test_rejects_non_identifiers() {
        for bad in ["", "1docs", "docs; DROP TABLE x", "bp\"docs", "docs-2"] {
            let schema = TableSchema { table: bad.into(), ..TableSchema::default() };
            assert!(
                matches!(schema.validate(), Err(RetrievalError::InvalidSchema(ref n)) if n == bad),
                "accepted {bad:?}"
            );
        }
    }
}
