//! Warning system for schema declarations.
//!
//! Every anomaly met while building the model is recorded here and the
//! offending declaration is skipped, so one bad statement never aborts
//! diagram generation.

use super::value::{display_options, Options};

/// Non-fatal problems raised while declaring the schema
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaWarning {
    /// Top-level declaration the model does not understand
    UnknownDeclaration { name: String, args: String },
    /// Structural foreign key whose table or column could not be found
    UnresolvedForeignKey {
        from_table: String,
        to_table: String,
        column: String,
        options: Options,
    },
    /// Table declared more than once (both copies are kept)
    DuplicateTable { name: String },
    /// Column declared more than once in the same table (both copies are kept)
    DuplicateColumn { table: String, column: String },
    /// Column directive without a column name
    MissingColumnName { table: String, directive: String },
    /// Declaration issued after the model was rendered
    DeclarationAfterRender { name: String },
}

impl std::fmt::Display for SchemaWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaWarning::UnknownDeclaration { name, args } => {
                write!(f, "Missing definition #{}({})", name, args)
            }
            SchemaWarning::UnresolvedForeignKey {
                from_table,
                to_table,
                column,
                options,
            } => {
                write!(
                    f,
                    "Unable to add foreign key: {}, {} (column {})",
                    from_table, to_table, column
                )?;
                if !options.is_empty() {
                    write!(f, " {{{}}}", display_options(options))?;
                }
                Ok(())
            }
            SchemaWarning::DuplicateTable { name } => {
                write!(f, "Table '{}' declared more than once", name)
            }
            SchemaWarning::DuplicateColumn { table, column } => {
                write!(f, "Column '{}.{}' declared more than once", table, column)
            }
            SchemaWarning::MissingColumnName { table, directive } => {
                write!(
                    f,
                    "Column directive '{}' in table '{}' has no column name",
                    directive, table
                )
            }
            SchemaWarning::DeclarationAfterRender { name } => {
                write!(f, "Declaration '{}' ignored: schema already rendered", name)
            }
        }
    }
}

/// Collects warnings while the schema is declared
#[derive(Debug, Default)]
pub struct WarningCollector {
    warnings: Vec<SchemaWarning>,
    max_warnings: usize,
    dropped: usize,
}

impl WarningCollector {
    pub fn new() -> Self {
        Self::with_limit(100)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            warnings: Vec::new(),
            max_warnings: limit,
            dropped: 0,
        }
    }

    /// Add a warning
    pub fn add(&mut self, warning: SchemaWarning) {
        // Identical warnings (same unknown directive twice, ...) are reported once
        if self.warnings.contains(&warning) {
            return;
        }
        if self.warnings.len() >= self.max_warnings {
            self.dropped += 1;
            return;
        }
        self.warnings.push(warning);
    }

    /// Warnings discarded after the limit was reached
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Get all collected warnings
    pub fn warnings(&self) -> &[SchemaWarning] {
        &self.warnings
    }

    /// Check if any warnings were collected
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Get warning count
    pub fn count(&self) -> usize {
        self.warnings.len()
    }

    /// Print every warning to stderr
    pub fn print_summary(&self) {
        for warning in &self.warnings {
            eprintln!("WARN: {}", warning);
        }

        if self.dropped > 0 {
            eprintln!("WARN: ... ({} additional warnings truncated)", self.dropped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_collapsed() {
        let mut collector = WarningCollector::new();
        let w = SchemaWarning::UnknownDeclaration {
            name: "enable_extension".to_string(),
            args: "\"plpgsql\"".to_string(),
        };
        collector.add(w.clone());
        collector.add(w);
        assert_eq!(collector.count(), 1);
    }

    #[test]
    fn test_limit() {
        let mut collector = WarningCollector::with_limit(2);
        for i in 0..5 {
            collector.add(SchemaWarning::DuplicateTable {
                name: format!("t{}", i),
            });
        }
        assert_eq!(collector.count(), 2);
        assert_eq!(collector.dropped(), 3);
        assert!(collector.has_warnings());
    }

    #[test]
    fn test_repeated_warning_past_limit_not_counted() {
        let mut collector = WarningCollector::with_limit(1);
        let first = SchemaWarning::DuplicateTable {
            name: "users".to_string(),
        };
        collector.add(first.clone());
        collector.add(first.clone());
        collector.add(first);
        collector.add(SchemaWarning::DuplicateTable {
            name: "posts".to_string(),
        });
        assert_eq!(collector.count(), 1);
        assert_eq!(collector.dropped(), 1);
    }

    #[test]
    fn test_unresolved_message() {
        let w = SchemaWarning::UnresolvedForeignKey {
            from_table: "posts".to_string(),
            to_table: "users".to_string(),
            column: "user_id".to_string(),
            options: Options::new(),
        };
        assert_eq!(
            w.to_string(),
            "Unable to add foreign key: posts, users (column user_id)"
        );
    }
}
