//! PlantUML entity diagram output.

use super::RenderOptions;
use crate::schema::{diagram_alias, SchemaModel, Table};
use ahash::AHashSet;

/// Hints emitted at the top of every document
const FIXED_HINTS: [&str; 2] = ["hide circle", "skinparam linetype ortho"];

/// Generate a PlantUML document with default options
pub fn to_plantuml(model: &SchemaModel) -> String {
    to_plantuml_with(model, &RenderOptions::default())
}

/// Generate a PlantUML document.
///
/// Layout: start marker, hints, entity blocks separated by blank lines,
/// one edge per relation, end marker.
pub fn to_plantuml_with(model: &SchemaModel, options: &RenderOptions) -> String {
    let mut output = String::new();

    output.push_str("@startuml\n\n");
    for hint in FIXED_HINTS.iter().copied().chain(options.hints.iter().map(String::as_str)) {
        output.push_str(hint);
        output.push('\n');
    }

    if !model.tables().is_empty() {
        output.push('\n');
        output.push_str(&entity_blocks(model.tables()).join("\n"));
    }

    if !model.relations().is_empty() {
        output.push('\n');
        for relation in model.relations() {
            output.push_str(&relation.to_plantuml());
            output.push('\n');
        }
    }

    output.push_str("\n@enduml\n");
    output
}

/// Entity blocks in declaration order. A repeated alias gets a numeric
/// suffix on its later copies; edges keep pointing at the first one.
fn entity_blocks(tables: &[Table]) -> Vec<String> {
    let mut used: AHashSet<String> = AHashSet::new();
    tables
        .iter()
        .map(|table| {
            let base = diagram_alias(&table.name);
            let mut alias = base.clone();
            let mut n = 1;
            while !used.insert(alias.clone()) {
                n += 1;
                alias = format!("{}_{}", base, n);
            }
            table.to_plantuml_as(&alias)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{options, DirectiveArgs, Options};

    #[test]
    fn test_empty_model() {
        let model = SchemaModel::new();
        assert_eq!(
            to_plantuml(&model),
            "@startuml\n\nhide circle\nskinparam linetype ortho\n\n@enduml\n"
        );
    }

    #[test]
    fn test_extra_hints() {
        let model = SchemaModel::new();
        let options = RenderOptions {
            hints: vec!["left to right direction".to_string()],
        };
        let output = to_plantuml_with(&model, &options);
        assert!(output.contains("skinparam linetype ortho\nleft to right direction\n"));
    }

    #[test]
    fn test_full_document() {
        let mut model = SchemaModel::new();
        model.create_table("users", Options::new(), |t| {
            t.directive("string", DirectiveArgs::named("name"));
        });
        model.create_table("posts", Options::new(), |t| {
            t.directive("string", DirectiveArgs::named("title"));
            t.directive("bigint", DirectiveArgs::named("author_id"));
        });
        model.add_foreign_key("posts", "users", Options::new());
        model.add_foreign_key("posts", "users", options([("column", "author_id")]));

        let expected = "\
@startuml

hide circle
skinparam linetype ortho

entity \"users\" as users {
  id : integer <<generated>>
  --
  name : string
}

entity \"posts\" as posts {
  id : integer <<generated>>
  --
  title : string
  *author_id : bigint
}

users --|{ posts
users --|{ posts : author_id

@enduml
";
        assert_eq!(to_plantuml(&model), expected);
    }

    #[test]
    fn test_duplicate_table_gets_distinct_alias() {
        let mut model = SchemaModel::new();
        model.create_table("users", Options::new(), |t| {
            t.directive("string", DirectiveArgs::named("name"));
        });
        model.create_table("users", Options::new(), |t| {
            t.directive("string", DirectiveArgs::named("email"));
        });
        model.create_table("user-roles", Options::new(), |_| {});
        model.create_table("user_roles", Options::new(), |_| {});
        model.add_foreign_key("users", "user_roles", Options::new());

        let output = to_plantuml(&model);
        assert!(output.contains("entity \"users\" as users {\n"));
        assert!(output.contains("entity \"users\" as users_2 {\n"));
        assert!(output.contains("entity \"user-roles\" as user_roles {\n"));
        assert!(output.contains("entity \"user_roles\" as user_roles_2 {\n"));
        assert!(output.contains("user_roles --|{ users\n"));
    }

    #[test]
    fn test_relations_without_tables() {
        let mut model = SchemaModel::new();
        model.add_foreign_key("orders", "customers", Options::new());
        assert_eq!(
            to_plantuml(&model),
            "@startuml\n\nhide circle\nskinparam linetype ortho\n\ncustomers --|{ orders\n\n@enduml\n"
        );
    }
}
