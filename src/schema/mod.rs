//! Schema model built from `schema.rb` declarations.
//!
//! This module provides:
//! - Data models for tables, columns and relations
//! - Open-ended column directives (`t.string`, `t.citext`, ... any name)
//! - Foreign-key inference by naming convention
//! - The `SchemaModel` aggregate driven by the loader

mod inflect;
mod model;
mod value;
mod warnings;

pub use inflect::singularize;
pub use model::*;
pub use value::{display_options, options, OptionValue, Options};
pub use warnings::{SchemaWarning, WarningCollector};

use ahash::AHashMap;
use once_cell::sync::Lazy;

/// Column name suffixes that mark a column as a foreign key by convention
const FOREIGN_KEY_SUFFIXES: [&str; 2] = ["_id", "_type"];

/// Make a name safe for use as a diagram identifier
pub fn diagram_alias(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Column definition within a table
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Declared type, i.e. the directive name (`string`, `integer`, `jsonb`, ...)
    pub col_type: String,
    /// Remaining arguments of the directive
    pub options: Options,
    /// Explicitly flagged by `add_foreign_key`
    pub foreign_key: bool,
}

impl Column {
    pub fn new(col_type: impl Into<String>, name: impl Into<String>, options: Options) -> Self {
        Self {
            name: name.into(),
            col_type: col_type.into(),
            options,
            foreign_key: false,
        }
    }

    /// Explicitly flagged, or named like a reference (`author_id`, `owner_type`)
    pub fn is_foreign_key(&self) -> bool {
        self.foreign_key
            || FOREIGN_KEY_SUFFIXES
                .iter()
                .any(|suffix| self.name.ends_with(suffix))
    }

    /// PlantUML attribute line, `*` marks foreign keys
    pub fn to_plantuml(&self) -> String {
        let marker = if self.is_foreign_key() { "*" } else { "" };
        format!("{}{} : {}", marker, self.name, self.col_type)
    }
}

/// Arguments of a directive call: positional values then keyword options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectiveArgs {
    pub positional: Vec<OptionValue>,
    pub options: Options,
}

impl DirectiveArgs {
    pub fn new(positional: Vec<OptionValue>, options: Options) -> Self {
        Self {
            positional,
            options,
        }
    }

    /// Arguments with a single positional name and no options
    pub fn named(name: &str) -> Self {
        Self::new(vec![OptionValue::Str(name.to_string())], Options::new())
    }
}

impl std::fmt::Display for DirectiveArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts: Vec<String> = self.positional.iter().map(|v| v.to_string()).collect();
        if !self.options.is_empty() {
            parts.push(display_options(&self.options));
        }
        write!(f, "{}", parts.join(", "))
    }
}

type DirectiveFn = fn(&mut Table, &str, DirectiveArgs);

/// Directives with a fixed meaning inside a table block.
///
/// Anything not listed here declares a column whose type is the directive name.
static TABLE_DIRECTIVES: Lazy<AHashMap<&'static str, DirectiveFn>> = Lazy::new(|| {
    let mut map: AHashMap<&'static str, DirectiveFn> = AHashMap::new();
    map.insert("index", ignore_directive);
    map
});

fn ignore_directive(_table: &mut Table, _directive: &str, _args: DirectiveArgs) {}

fn column_directive(table: &mut Table, directive: &str, args: DirectiveArgs) {
    let DirectiveArgs {
        positional,
        mut options,
    } = args;
    let mut positional = positional.into_iter();

    let name = match positional.next().as_ref().and_then(OptionValue::as_name) {
        Some(name) => name.to_string(),
        None => {
            table.warnings.push(SchemaWarning::MissingColumnName {
                table: table.name.clone(),
                directive: directive.to_string(),
            });
            return;
        }
    };

    let extra: Vec<OptionValue> = positional.collect();
    if !extra.is_empty() {
        options.insert("args".to_string(), OptionValue::List(extra));
    }

    table.declare_column(directive, &name, options);
}

/// Table definition collecting columns in declaration order
#[derive(Debug, Clone)]
pub struct Table {
    /// Table name
    pub name: String,
    /// Options given to `create_table` (`force: :cascade`, `id: :uuid`, ...)
    pub options: Options,
    /// Column definitions in order
    pub columns: Vec<Column>,
    /// Warnings raised by directives, drained by the owning model
    warnings: Vec<SchemaWarning>,
}

impl Table {
    /// Create a new empty table
    pub fn new(name: impl Into<String>, options: Options) -> Self {
        Self {
            name: name.into(),
            options,
            columns: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Apply a directive from the table block (`t.<directive> args`)
    pub fn directive(&mut self, name: &str, args: DirectiveArgs) {
        let handler = TABLE_DIRECTIVES
            .get(name)
            .copied()
            .unwrap_or(column_directive as DirectiveFn);
        handler(self, name, args);
    }

    /// Append a column of the given type
    pub fn declare_column(&mut self, col_type: &str, column_name: &str, options: Options) {
        if self.get_column(column_name).is_some() {
            self.warnings.push(SchemaWarning::DuplicateColumn {
                table: self.name.clone(),
                column: column_name.to_string(),
            });
        }
        self.columns.push(Column::new(col_type, column_name, options));
    }

    /// Get a column by name
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Flag a column as foreign key. Returns false if there is no such column.
    pub fn add_foreign_key_by_name(&mut self, column_name: &str) -> bool {
        match self.columns.iter_mut().find(|c| c.name == column_name) {
            Some(column) => {
                column.foreign_key = true;
                true
            }
            None => false,
        }
    }

    pub(crate) fn take_warnings(&mut self) -> Vec<SchemaWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// PlantUML entity block with the synthetic `id` primary key
    pub fn to_plantuml(&self) -> String {
        self.to_plantuml_as(&diagram_alias(&self.name))
    }

    /// Entity block under an explicit alias
    pub fn to_plantuml_as(&self, alias: &str) -> String {
        let mut output = String::new();
        output.push_str(&format!("entity \"{}\" as {} {{\n", self.name, alias));
        output.push_str("  id : integer <<generated>>\n");
        output.push_str("  --\n");
        for column in &self.columns {
            output.push_str(&format!("  {}\n", column.to_plantuml()));
        }
        output.push_str("}\n");
        output
    }
}

/// Association between two tables declared by `add_foreign_key`
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    /// Table holding the foreign key
    pub from_table: String,
    /// Referenced table
    pub to_table: String,
    /// Options, notably `column:` overriding the join column
    pub options: Options,
}

impl Relation {
    pub fn new(from_table: impl Into<String>, to_table: impl Into<String>, options: Options) -> Self {
        Self {
            from_table: from_table.into(),
            to_table: to_table.into(),
            options,
        }
    }

    /// Join column given by `column:`, if present and non-empty
    pub fn explicit_column(&self) -> Option<&str> {
        explicit_column(&self.options)
    }

    /// Join column: explicit override or `<singular to_table>_id`
    pub fn inferred_join_column(&self) -> String {
        join_column(&self.to_table, &self.options)
    }

    /// PlantUML edge, many side on the table holding the foreign key
    pub fn to_plantuml(&self) -> String {
        let mut line = format!(
            "{} --|{{ {}",
            diagram_alias(&self.to_table),
            diagram_alias(&self.from_table)
        );
        if let Some(column) = self.explicit_column() {
            line.push_str(&format!(" : {}", column));
        }
        line
    }
}

fn explicit_column(options: &Options) -> Option<&str> {
    options
        .get("column")
        .and_then(OptionValue::as_name)
        .filter(|c| !c.is_empty())
}

/// Join column for a foreign key towards `to_table`
pub fn join_column(to_table: &str, options: &Options) -> String {
    match explicit_column(options) {
        Some(column) => column.to_string(),
        None => format!("{}_id", singularize(to_table)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_key_convention() {
        assert!(Column::new("integer", "author_id", Options::new()).is_foreign_key());
        assert!(Column::new("string", "owner_type", Options::new()).is_foreign_key());
        assert!(!Column::new("string", "title", Options::new()).is_foreign_key());
        // case-sensitive suffix
        assert!(!Column::new("integer", "AUTHOR_ID", Options::new()).is_foreign_key());
        assert!(!Column::new("string", "identity", Options::new()).is_foreign_key());
    }

    #[test]
    fn test_column_plantuml() {
        let mut col = Column::new("bigint", "editor", Options::new());
        assert_eq!(col.to_plantuml(), "editor : bigint");
        col.foreign_key = true;
        assert_eq!(col.to_plantuml(), "*editor : bigint");
        assert_eq!(
            Column::new("bigint", "user_id", Options::new()).to_plantuml(),
            "*user_id : bigint"
        );
    }

    #[test]
    fn test_any_directive_declares_column() {
        let mut table = Table::new("events", Options::new());
        table.directive("string", DirectiveArgs::named("title"));
        table.directive("tsvector", DirectiveArgs::named("search"));
        table.directive(
            "index",
            DirectiveArgs::new(
                vec![OptionValue::List(vec!["title".into()])],
                options([("name", "index_events_on_title")]),
            ),
        );

        let types: Vec<_> = table.columns.iter().map(|c| c.col_type.as_str()).collect();
        assert_eq!(types, vec!["string", "tsvector"]);
    }

    #[test]
    fn test_directive_options_and_extra_args() {
        let mut table = Table::new("products", Options::new());
        table.directive(
            "decimal",
            DirectiveArgs::new(
                vec!["price".into(), "extra".into()],
                options([("precision", 10), ("scale", 2)]),
            ),
        );

        let col = &table.columns[0];
        assert_eq!(col.name, "price");
        assert_eq!(col.options.get("precision"), Some(&OptionValue::Int(10)));
        assert_eq!(
            col.options.get("args"),
            Some(&OptionValue::List(vec!["extra".into()]))
        );
    }

    #[test]
    fn test_directive_without_name_warns() {
        let mut table = Table::new("posts", Options::new());
        table.directive("timestamps", DirectiveArgs::default());
        assert!(table.columns.is_empty());
        assert_eq!(
            table.take_warnings(),
            vec![SchemaWarning::MissingColumnName {
                table: "posts".to_string(),
                directive: "timestamps".to_string(),
            }]
        );
    }

    #[test]
    fn test_add_foreign_key_by_name() {
        let mut table = Table::new("posts", Options::new());
        table.declare_column("bigint", "writer", Options::new());
        assert!(table.add_foreign_key_by_name("writer"));
        assert!(table.columns[0].is_foreign_key());
        assert!(!table.add_foreign_key_by_name("missing"));
    }

    #[test]
    fn test_table_plantuml() {
        let mut table = Table::new("users", Options::new());
        table.declare_column("string", "name", Options::new());
        table.declare_column("integer", "age", Options::new());
        assert_eq!(
            table.to_plantuml(),
            "entity \"users\" as users {\n  id : integer <<generated>>\n  --\n  name : string\n  age : integer\n}\n"
        );
    }

    #[test]
    fn test_table_alias_escaped() {
        let table = Table::new("audit.log-entries", Options::new());
        assert!(table
            .to_plantuml()
            .starts_with("entity \"audit.log-entries\" as audit_log_entries {"));
    }

    #[test]
    fn test_relation_join_column() {
        let inferred = Relation::new("books", "authors", Options::new());
        assert_eq!(inferred.inferred_join_column(), "author_id");
        assert_eq!(inferred.to_plantuml(), "authors --|{ books");

        let explicit = Relation::new("books", "users", options([("column", "editor_id")]));
        assert_eq!(explicit.inferred_join_column(), "editor_id");
        assert_eq!(explicit.to_plantuml(), "users --|{ books : editor_id");

        let empty = Relation::new("books", "users", options([("column", "")]));
        assert_eq!(empty.inferred_join_column(), "user_id");
        assert_eq!(empty.to_plantuml(), "users --|{ books");
    }
}
