//! Mermaid erDiagram format output.

use crate::schema::{diagram_alias, SchemaModel};

/// Generate Mermaid erDiagram from a schema model
pub fn to_mermaid(model: &SchemaModel) -> String {
    let mut output = String::new();

    output.push_str("erDiagram\n");

    for table in model.tables() {
        output.push_str(&format!("    {} {{\n", diagram_alias(&table.name)));
        output.push_str("        integer id PK\n");

        for col in &table.columns {
            let col_type = diagram_alias(&col.col_type);
            let col_name = diagram_alias(&col.name);

            if col.is_foreign_key() {
                output.push_str(&format!("        {} {} FK\n", col_type, col_name));
            } else {
                output.push_str(&format!("        {} {}\n", col_type, col_name));
            }
        }

        output.push_str("    }\n");
    }

    if !model.relations().is_empty() {
        output.push('\n');
    }

    // Child side is many, parent side exactly one
    for relation in model.relations() {
        output.push_str(&format!(
            "    {} }}o--|| {} : \"{}\"\n",
            diagram_alias(&relation.from_table),
            diagram_alias(&relation.to_table),
            relation.inferred_join_column()
        ));
    }

    output
}
