//! SQL identifier validation and quoting.
//!
//! Column and table names of profiled tables come from external data drops and
//! may contain spaces, punctuation or mixed case. They are never interpolated
//! into SQL unquoted.

use crate::error::{ProfilerError, Result};
use crate::target::QualifiedTable;

/// Maximum identifier length accepted in generated SQL.
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

/// SQL identifier validation and quoting utilities.
pub struct SqlSecurity;

impl SqlSecurity {
    /// Validates and quotes a single identifier.
    ///
    /// The identifier is wrapped in double quotes and any embedded double quote
    /// is doubled, so DataFusion resolves it verbatim (case preserved).
    ///
    /// # Examples
    /// ```rust
    /// use table_profiler::security::SqlSecurity;
    ///
    /// assert_eq!(SqlSecurity::quote_identifier("c_num").unwrap(), "\"c_num\"");
    /// assert_eq!(SqlSecurity::quote_identifier("Order \"ID\"").unwrap(), "\"Order \"\"ID\"\"\"");
    /// assert!(SqlSecurity::quote_identifier("").is_err());
    /// ```
    pub fn quote_identifier(identifier: &str) -> Result<String> {
        Self::validate_identifier(identifier)?;
        let escaped = identifier.replace('"', "\"\"");
        Ok(format!("\"{escaped}\""))
    }

    /// Quotes a `(namespace, table)` pair as `"namespace"."table"`.
    pub fn quote_table(table: &QualifiedTable) -> Result<String> {
        Ok(format!(
            "{}.{}",
            Self::quote_identifier(&table.namespace)?,
            Self::quote_identifier(&table.table)?
        ))
    }

    /// Validates an identifier without quoting it.
    pub fn validate_identifier(identifier: &str) -> Result<()> {
        if identifier.trim().is_empty() {
            return Err(ProfilerError::InvalidIdentifier(
                "SQL identifier cannot be empty or whitespace-only".to_string(),
            ));
        }

        if identifier.len() > MAX_IDENTIFIER_LENGTH {
            return Err(ProfilerError::InvalidIdentifier(format!(
                "SQL identifier too long (max {MAX_IDENTIFIER_LENGTH} bytes)"
            )));
        }

        if identifier.chars().any(char::is_control) {
            return Err(ProfilerError::InvalidIdentifier(format!(
                "SQL identifier '{}' contains control characters",
                identifier.escape_debug()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_plain_identifier() {
        assert_eq!(SqlSecurity::quote_identifier("c_text").unwrap(), "\"c_text\"");
    }

    #[test]
    fn test_quote_preserves_spaces_and_case() {
        assert_eq!(
            SqlSecurity::quote_identifier("Date Of Birth").unwrap(),
            "\"Date Of Birth\""
        );
    }

    #[test]
    fn test_quote_escapes_embedded_quotes() {
        assert_eq!(
            SqlSecurity::quote_identifier("x\"; DROP TABLE t; --").unwrap(),
            "\"x\"\"; DROP TABLE t; --\""
        );
    }

    #[test]
    fn test_rejects_invalid_identifiers() {
        assert!(SqlSecurity::quote_identifier("   ").is_err());
        assert!(SqlSecurity::quote_identifier("bad\0name").is_err());
        assert!(SqlSecurity::quote_identifier("line\nbreak").is_err());
        assert!(SqlSecurity::quote_identifier(&"a".repeat(MAX_IDENTIFIER_LENGTH + 1)).is_err());
        assert!(SqlSecurity::quote_identifier(&"a".repeat(MAX_IDENTIFIER_LENGTH)).is_ok());
    }

    #[test]
    fn test_quote_table() {
        let table = QualifiedTable::new("data", "col_level_meta");
        assert_eq!(
            SqlSecurity::quote_table(&table).unwrap(),
            "\"data\".\"col_level_meta\""
        );
    }
}
