//! The schema aggregate and its declaration API.

use super::value::{OptionValue, Options};
use super::warnings::{SchemaWarning, WarningCollector};
use super::{join_column, DirectiveArgs, Relation, Table};
use ahash::AHashSet;
use glob::Pattern;
use std::cell::Cell;
use std::fmt;
use std::str::FromStr;

/// How `add_foreign_key` is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForeignKeyMode {
    /// Record a relation edge between the two tables
    #[default]
    Relational,
    /// Flag the join column on the existing table, no edge
    Structural,
}

impl FromStr for ForeignKeyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "relational" | "relation" | "relations" => Ok(ForeignKeyMode::Relational),
            "structural" | "column" | "columns" => Ok(ForeignKeyMode::Structural),
            _ => Err(format!(
                "Unknown foreign key mode: {}. Valid options: relational, structural",
                s
            )),
        }
    }
}

impl fmt::Display for ForeignKeyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForeignKeyMode::Relational => write!(f, "relational"),
            ForeignKeyMode::Structural => write!(f, "structural"),
        }
    }
}

/// Lifecycle of a schema model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    /// Nothing declared yet
    Empty,
    /// Declarations are being applied
    Declaring,
    /// Rendered at least once, read-only from now on
    Rendered,
}

/// All tables and relations of one schema definition
///
/// Built once through the declaration API, then rendered any number of
/// times. The model is not `Sync`; share it across threads only behind
/// external synchronization.
#[derive(Debug)]
pub struct SchemaModel {
    tables: Vec<Table>,
    relations: Vec<Relation>,
    mode: ForeignKeyMode,
    state: Cell<ModelState>,
    warnings: WarningCollector,
}

impl Default for SchemaModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaModel {
    /// Create an empty model in relational mode
    pub fn new() -> Self {
        Self::with_mode(ForeignKeyMode::default())
    }

    pub fn with_mode(mode: ForeignKeyMode) -> Self {
        Self {
            tables: Vec::new(),
            relations: Vec::new(),
            mode,
            state: Cell::new(ModelState::Empty),
            warnings: WarningCollector::new(),
        }
    }

    pub fn mode(&self) -> ForeignKeyMode {
        self.mode
    }

    pub fn state(&self) -> ModelState {
        self.state.get()
    }

    /// Tables in declaration order
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Relations in declaration order
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Get a table by name (first declaration wins)
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn warnings(&self) -> &WarningCollector {
        &self.warnings
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    pub fn column_count(&self) -> usize {
        self.tables.iter().map(|t| t.columns.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.relations.is_empty()
    }

    /// Move to `Declaring`, or refuse when the model was already rendered
    fn begin_declaration(&mut self, name: &str) -> bool {
        match self.state.get() {
            ModelState::Rendered => {
                self.warnings.add(SchemaWarning::DeclarationAfterRender {
                    name: name.to_string(),
                });
                false
            }
            _ => {
                self.state.set(ModelState::Declaring);
                true
            }
        }
    }

    /// Dispatch a top-level declaration by name.
    ///
    /// `body` receives the table while a `create_table` block is built and is
    /// ignored for every other declaration.
    pub fn declare<F>(&mut self, name: &str, args: DirectiveArgs, body: F)
    where
        F: FnOnce(&mut Table),
    {
        match name {
            "create_table" => match first_name(&args) {
                Some(table_name) => self.create_table(&table_name, args.options, body),
                None => self.unknown_declaration(name, &args),
            },
            "add_foreign_key" => {
                let mut names = args.positional.iter().filter_map(OptionValue::as_name);
                match (names.next(), names.next()) {
                    (Some(from), Some(to)) => {
                        let (from, to) = (from.to_string(), to.to_string());
                        self.add_foreign_key(&from, &to, args.options)
                    }
                    _ => self.unknown_declaration(name, &args),
                }
            }
            _ => self.unknown_declaration(name, &args),
        }
    }

    /// Build a table through `build` and append it
    pub fn create_table<F>(&mut self, name: &str, options: Options, build: F)
    where
        F: FnOnce(&mut Table),
    {
        if !self.begin_declaration("create_table") {
            return;
        }

        if self.get_table(name).is_some() {
            self.warnings.add(SchemaWarning::DuplicateTable {
                name: name.to_string(),
            });
        }

        let mut table = Table::new(name, options);
        build(&mut table);
        for warning in table.take_warnings() {
            self.warnings.add(warning);
        }
        self.tables.push(table);
    }

    /// Register a foreign key from `from_table` to `to_table`
    pub fn add_foreign_key(&mut self, from_table: &str, to_table: &str, options: Options) {
        if !self.begin_declaration("add_foreign_key") {
            return;
        }

        match self.mode {
            ForeignKeyMode::Relational => {
                self.relations.push(Relation::new(from_table, to_table, options));
            }
            ForeignKeyMode::Structural => {
                let column = join_column(to_table, &options);
                let flagged = self
                    .tables
                    .iter_mut()
                    .find(|t| t.name == from_table)
                    .map(|t| t.add_foreign_key_by_name(&column))
                    .unwrap_or(false);

                if !flagged {
                    self.warnings.add(SchemaWarning::UnresolvedForeignKey {
                        from_table: from_table.to_string(),
                        to_table: to_table.to_string(),
                        column,
                        options,
                    });
                }
            }
        }
    }

    /// Record an unsupported declaration and move on
    pub fn unknown_declaration(&mut self, name: &str, args: &DirectiveArgs) {
        if !self.begin_declaration(name) {
            return;
        }
        self.warnings.add(SchemaWarning::UnknownDeclaration {
            name: name.to_string(),
            args: args.to_string(),
        });
    }

    /// Keep only tables matching any pattern, and relations between kept tables
    pub fn retain_tables(&mut self, patterns: &[Pattern]) {
        if patterns.is_empty() {
            return;
        }

        let matching: AHashSet<String> = self
            .tables
            .iter()
            .map(|t| t.name.clone())
            .filter(|name| patterns.iter().any(|p| p.matches(name)))
            .collect();

        self.apply_table_filter(&matching);
    }

    /// Drop tables matching any pattern, and relations touching them
    pub fn exclude_tables(&mut self, patterns: &[Pattern]) {
        if patterns.is_empty() {
            return;
        }

        let remaining: AHashSet<String> = self
            .tables
            .iter()
            .map(|t| t.name.clone())
            .filter(|name| !patterns.iter().any(|p| p.matches(name)))
            .collect();

        self.apply_table_filter(&remaining);
    }

    fn apply_table_filter(&mut self, keep: &AHashSet<String>) {
        self.tables.retain(|t| keep.contains(&t.name));
        self.relations
            .retain(|r| keep.contains(&r.from_table) && keep.contains(&r.to_table));
    }

    /// Render as PlantUML and mark the model read-only
    pub fn render(&self) -> String {
        self.state.set(ModelState::Rendered);
        crate::render::to_plantuml(self)
    }
}

/// First positional argument as a name
fn first_name(args: &DirectiveArgs) -> Option<String> {
    args.positional
        .first()
        .and_then(OptionValue::as_name)
        .map(str::to_string)
}
