//! Loader for ActiveRecord `schema.rb` files.
//!
//! The whole source is tokenized and parsed before anything touches the
//! model, so a syntax error aborts the run without a partial diagram.
//! Parsed statements are then replayed, in source order, as declarations
//! against a [`SchemaModel`].

mod lexer;
mod parser;

pub use parser::{Block, Statement};

use crate::schema::SchemaModel;
use anyhow::Context;
use lexer::Lexer;
use once_cell::sync::Lazy;
use parser::Parser;
use regex::Regex;
use std::fmt;
use std::fs;
use std::path::Path;

/// Receiver of the `define` wrapper: `ActiveRecord::Schema` or `ActiveRecord::Schema[7.1]`
static SCHEMA_RECEIVER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:ActiveRecord::)?Schema(?:\[[^\]]*\])?$").unwrap());

/// Syntax error in the schema source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    /// 1-based line of the offending token
    pub line: usize,
    pub message: String,
}

impl LoadError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for LoadError {}

/// Parse schema source into statements
pub fn parse(source: &str) -> Result<Vec<Statement>, LoadError> {
    let tokens = Lexer::new(source).tokenize()?;
    Parser::new(&tokens).parse_program()
}

/// Parse schema source and declare its contents on `model`
pub fn load_str(source: &str, model: &mut SchemaModel) -> Result<(), LoadError> {
    let statements = parse(source)?;
    apply(&statements, model);
    Ok(())
}

/// Read and load a schema file
pub fn load_file(path: &Path, model: &mut SchemaModel) -> anyhow::Result<()> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read schema file: {}", path.display()))?;
    load_str(&source, model).with_context(|| format!("invalid schema file: {}", path.display()))
}

/// Replay parsed statements as declarations
pub fn apply(statements: &[Statement], model: &mut SchemaModel) {
    for statement in statements {
        if let Some(block) = &statement.block {
            if statement.method == "define" && is_schema_receiver(&statement.receiver) {
                apply(&block.body, model);
                continue;
            }
        }

        if !statement.receiver.is_empty() {
            model.unknown_declaration(&statement.qualified_name(), &statement.args);
            continue;
        }

        model.declare(&statement.method, statement.args.clone(), |table| {
            if let Some(block) = &statement.block {
                for directive in &block.body {
                    table.directive(&directive.method, directive.args.clone());
                }
            }
        });
    }
}

fn is_schema_receiver(receiver: &[String]) -> bool {
    SCHEMA_RECEIVER_RE.is_match(&receiver.join("::"))
}
