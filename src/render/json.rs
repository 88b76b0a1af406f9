//! JSON format output for the schema model.

use crate::schema::{Options, SchemaModel};
use serde::Serialize;

/// JSON representation of the diagram
#[derive(Debug, Serialize)]
pub struct ErdJson {
    pub tables: Vec<TableJson>,
    pub relationships: Vec<RelationJson>,
    pub stats: ErdStats,
}

/// JSON representation of a table
#[derive(Debug, Serialize)]
pub struct TableJson {
    pub name: String,
    #[serde(skip_serializing_if = "Options::is_empty")]
    pub options: Options,
    pub columns: Vec<ColumnJson>,
}

/// JSON representation of a column
#[derive(Debug, Serialize)]
pub struct ColumnJson {
    pub name: String,
    #[serde(rename = "type")]
    pub col_type: String,
    pub is_foreign_key: bool,
    #[serde(skip_serializing_if = "Options::is_empty")]
    pub options: Options,
}

/// JSON representation of a relation
#[derive(Debug, Serialize)]
pub struct RelationJson {
    pub from_table: String,
    pub to_table: String,
    pub join_column: String,
    pub explicit_column: bool,
}

/// Diagram statistics
#[derive(Debug, Serialize)]
pub struct ErdStats {
    pub table_count: usize,
    pub column_count: usize,
    pub relationship_count: usize,
}

/// Generate JSON output from a schema model
pub fn to_json(model: &SchemaModel) -> String {
    let erd = build_erd_json(model);
    serde_json::to_string_pretty(&erd).unwrap_or_else(|_| "{}".to_string())
}

/// Build the JSON structure
pub fn build_erd_json(model: &SchemaModel) -> ErdJson {
    let tables = model
        .tables()
        .iter()
        .map(|table| TableJson {
            name: table.name.clone(),
            options: table.options.clone(),
            columns: table
                .columns
                .iter()
                .map(|col| ColumnJson {
                    name: col.name.clone(),
                    col_type: col.col_type.clone(),
                    is_foreign_key: col.is_foreign_key(),
                    options: col.options.clone(),
                })
                .collect(),
        })
        .collect();

    let relationships = model
        .relations()
        .iter()
        .map(|rel| RelationJson {
            from_table: rel.from_table.clone(),
            to_table: rel.to_table.clone(),
            join_column: rel.inferred_join_column(),
            explicit_column: rel.explicit_column().is_some(),
        })
        .collect();

    ErdJson {
        tables,
        relationships,
        stats: ErdStats {
            table_count: model.table_count(),
            column_count: model.column_count(),
            relationship_count: model.relation_count(),
        },
    }
}
