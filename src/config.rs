//! YAML configuration for diagram generation.
//!
//! Every setting can also be given on the command line; flags win over the
//! file.

use crate::render::OutputFormat;
use crate::schema::ForeignKeyMode;
use anyhow::Context;
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete YAML configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErdConfig {
    /// Output format (plantuml, mermaid, json)
    pub format: Option<OutputFormat>,
    /// How `add_foreign_key` is interpreted (relational, structural)
    pub mode: Option<ForeignKeyMode>,
    /// Only include these tables (names or glob patterns)
    pub tables: Vec<String>,
    /// Exclude these tables (names or glob patterns)
    pub exclude: Vec<String>,
    /// Extra PlantUML directives, e.g. `skinparam monochrome true`
    pub skinparams: Vec<String>,
}

impl ErdConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: ErdConfig = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("invalid config file: {}", path.display()))?;
        Ok(config)
    }
}

/// Split a comma-separated list, dropping empty entries
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Compile table name patterns, rejecting invalid globs
pub fn compile_patterns(patterns: &[String]) -> anyhow::Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("invalid table pattern: {}", p)))
        .collect()
}
