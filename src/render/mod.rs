//! Diagram output formats for a schema model.
//!
//! Every renderer is a pure function of the model: the same model always
//! produces byte-identical output.

mod json;
mod mermaid;
mod plantuml;

pub use json::{to_json, ColumnJson, ErdJson, ErdStats, RelationJson, TableJson};
pub use mermaid::to_mermaid;
pub use plantuml::{to_plantuml, to_plantuml_with};

use crate::schema::SchemaModel;
use std::fmt;
use std::str::FromStr;

/// Output format for the diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// PlantUML entity diagram
    #[default]
    PlantUml,
    /// Mermaid erDiagram format
    Mermaid,
    /// JSON format for programmatic use
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plantuml" | "puml" | "uml" => Ok(OutputFormat::PlantUml),
            "mermaid" | "mmd" => Ok(OutputFormat::Mermaid),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!(
                "Unknown format: {}. Valid options: plantuml, mermaid, json",
                s
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::PlantUml => write!(f, "plantuml"),
            OutputFormat::Mermaid => write!(f, "mermaid"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl OutputFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::PlantUml => "puml",
            OutputFormat::Mermaid => "mmd",
            OutputFormat::Json => "json",
        }
    }

    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "puml" | "plantuml" | "pu" | "uml" => Some(OutputFormat::PlantUml),
            "mmd" | "mermaid" => Some(OutputFormat::Mermaid),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Extra rendering settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Additional PlantUML directives emitted after the fixed hints
    pub hints: Vec<String>,
}

/// Render the model in the requested format
pub fn render(model: &SchemaModel, format: OutputFormat, options: &RenderOptions) -> String {
    match format {
        OutputFormat::PlantUml => to_plantuml_with(model, options),
        OutputFormat::Mermaid => to_mermaid(model),
        OutputFormat::Json => to_json(model),
    }
}
