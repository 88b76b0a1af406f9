//! Diagram generation: load, filter, render, write.

use super::Cli;
use anyhow::{anyhow, bail, Result};
use schema_erd::config::{compile_patterns, parse_list, ErdConfig};
use schema_erd::loader;
use schema_erd::render::{self, OutputFormat, RenderOptions};
use schema_erd::schema::{ForeignKeyMode, SchemaModel};
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub fn run(cli: Cli) -> Result<()> {
    let file = match cli.file {
        Some(ref file) => file,
        None => bail!("missing schema file argument"),
    };

    let config = match cli.config {
        Some(ref path) => ErdConfig::load(path)?,
        None => ErdConfig::default(),
    };

    let format = resolve_format(cli.format.as_deref(), cli.output.as_deref(), &config)?;

    let mode = match cli.mode {
        Some(ref m) => m.parse::<ForeignKeyMode>().map_err(|e| anyhow!(e))?,
        None => config.mode.unwrap_or_default(),
    };

    let tables = cli.tables.as_deref().map(parse_list).unwrap_or(config.tables);
    let exclude = cli.exclude.as_deref().map(parse_list).unwrap_or(config.exclude);
    let tables = compile_patterns(&tables)?;
    let exclude = compile_patterns(&exclude)?;

    if !file.exists() {
        bail!("input file does not exist: {}", file.display());
    }

    let mut model = SchemaModel::with_mode(mode);
    loader::load_file(file, &mut model)?;

    model.retain_tables(&tables);
    model.exclude_tables(&exclude);

    let options = RenderOptions {
        hints: config.skinparams,
    };
    let output_content = render::render(&model, format, &options);

    if let Some(ref out_path) = cli.output {
        let mut out = File::create(out_path)?;
        out.write_all(output_content.as_bytes())?;
    } else {
        print!("{}", output_content);
    }

    if !cli.quiet {
        model.warnings().print_summary();
        if let Some(ref out_path) = cli.output {
            eprintln!(
                "ERD written to: {} ({} tables, {} columns, {} relations)",
                out_path.display(),
                model.table_count(),
                model.column_count(),
                model.relation_count()
            );
        }
    }

    Ok(())
}

/// Explicit flag, then config, then output extension, then PlantUML
fn resolve_format(
    flag: Option<&str>,
    output: Option<&Path>,
    config: &ErdConfig,
) -> Result<OutputFormat> {
    if let Some(f) = flag {
        return f.parse().map_err(|e: String| anyhow!(e));
    }
    if let Some(format) = config.format {
        return Ok(format);
    }
    Ok(output
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .and_then(OutputFormat::from_extension)
        .unwrap_or_default())
}
