mod diagram;

use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "schema-erd")]
#[command(version)]
#[command(
    about = "Generate a PlantUML entity-relationship diagram from a Rails schema.rb",
    long_about = None
)]
pub struct Cli {
    /// Schema definition file (db/schema.rb)
    #[arg(required_unless_present = "completions")]
    pub file: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format: plantuml, mermaid, json (default: from output extension, else plantuml)
    #[arg(short, long)]
    pub format: Option<String>,

    /// How add_foreign_key is drawn: relational (edges) or structural (flag columns)
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Only include these tables (comma-separated, glob patterns allowed)
    #[arg(short, long)]
    pub tables: Option<String>,

    /// Exclude these tables (comma-separated, glob patterns allowed)
    #[arg(short, long)]
    pub exclude: Option<String>,

    /// YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Do not print warnings
    #[arg(short, long)]
    pub quiet: bool,

    /// Print shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(shell) = cli.completions {
        generate(shell, &mut Cli::command(), "schema-erd", &mut io::stdout());
        return Ok(());
    }

    diagram::run(cli)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_file_required() {
        assert!(Cli::try_parse_from(["schema-erd"]).is_err());
        assert!(Cli::try_parse_from(["schema-erd", "--completions", "bash"]).is_ok());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "schema-erd",
            "db/schema.rb",
            "-f",
            "mermaid",
            "--tables",
            "users,posts",
            "-q",
        ])
        .unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("db/schema.rb")));
        assert_eq!(cli.format.as_deref(), Some("mermaid"));
        assert_eq!(cli.tables.as_deref(), Some("users,posts"));
        assert!(cli.quiet);
    }
}
