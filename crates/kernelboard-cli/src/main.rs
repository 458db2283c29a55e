//! Kernelboard CLI - serve the dashboard and export reports.

mod config;
mod error;
mod page;
mod server;
mod state;

use clap::{Parser, Subcommand, ValueEnum};
use config::{FileConfig, PlanSource, ServeConfig, ServeOverrides};
use error::CliError;
use kernelboard_charts::render_dashboard;
use kernelboard_core::{apply, Field, FilterSelection, Table};
use kernelboard_report::{write_atomically, write_csv, ReportExporter, DEFAULT_TITLE};
use kernelboard_yaml::{load_file, Catalog, CatalogStats, FileSummary};
use serde::Serialize;
use state::AppState;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "kernelboard")]
#[command(about = "Linux kernel build/test plan dashboard")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the interactive dashboard
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind
        #[arg(short, long)]
        bind: Option<String>,

        /// Plan file to show
        #[arg(long, conflicts_with = "plans_dir")]
        plan: Option<PathBuf>,

        /// Directory of plan files, selectable in the dashboard
        #[arg(long)]
        plans_dir: Option<PathBuf>,

        /// Dashboard title
        #[arg(long)]
        title: Option<String>,

        /// Config file (default: ./kernelboard.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Check that a plan file loads
    Check {
        /// Path to the plan file
        #[arg(default_value = "plan.yml")]
        plan: PathBuf,
    },

    /// Write the HTML report for a plan
    Report {
        /// Path to the plan file
        plan: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "report.html")]
        output: PathBuf,

        /// Restrict records, as field=value (repeatable)
        #[arg(short, long = "filter", value_name = "FIELD=VALUE")]
        filters: Vec<String>,

        /// Report title
        #[arg(long, default_value = DEFAULT_TITLE)]
        title: String,
    },

    /// Write the filtered records as CSV
    Export {
        /// Path to the plan file
        plan: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "filtered_data.csv")]
        output: PathBuf,

        /// Restrict records, as field=value (repeatable)
        #[arg(short, long = "filter", value_name = "FIELD=VALUE")]
        filters: Vec<String>,
    },

    /// Summarize devices and tests of every plan in a directory
    Summary {
        /// Directory of plan files
        dir: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            port,
            bind,
            plan,
            plans_dir,
            title,
            config,
        } => serve(
            ServeOverrides {
                plan,
                plans_dir,
                bind,
                port,
                title,
            },
            config.as_deref(),
        ),
        Commands::Check { plan } => check(&plan),
        Commands::Report {
            plan,
            output,
            filters,
            title,
        } => report(&plan, &output, &filters, &title),
        Commands::Export {
            plan,
            output,
            filters,
        } => export(&plan, &output, &filters),
        Commands::Summary { dir, format } => summary(&dir, format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn serve(flags: ServeOverrides, config: Option<&Path>) -> Result<(), CliError> {
    let config = ServeConfig::resolve(flags, FileConfig::discover(config)?);
    let catalog = match &config.source {
        PlanSource::File(path) => Catalog::single(path),
        PlanSource::Dir(dir) => {
            let catalog = Catalog::scan(dir)?;
            if catalog.is_empty() {
                return Err(CliError::EmptyCatalog(dir.clone()));
            }
            catalog
        }
    };
    let state = AppState::new(config.title.clone(), catalog);
    server::serve(&config, state)
}

fn check(path: &Path) -> Result<(), CliError> {
    println!("Checking plan: {}", path.display());
    let table = load_file(path)?;
    println!("Plan valid!");
    println!("  Records: {}", table.len());
    for field in Field::ALL {
        println!("  {}: {}", field.plural(), table.count_distinct(field));
    }
    Ok(())
}

/// Parse `field=value` arguments into a selection.
fn parse_filters(filters: &[String]) -> Result<FilterSelection, CliError> {
    let mut selection = FilterSelection::new();
    for raw in filters {
        let (key, value) = raw
            .split_once('=')
            .filter(|(_, v)| !v.is_empty())
            .ok_or_else(|| CliError::Filter(raw.clone()))?;
        let field: Field = key.trim().parse().map_err(|_| CliError::Filter(raw.clone()))?;
        selection.select(field, [value.to_string()]);
    }
    Ok(selection)
}

/// The full table of `plan`, the records matching `filters`, and the selection.
fn load_filtered(
    plan: &Path,
    filters: &[String],
) -> Result<(Table, Table, FilterSelection), CliError> {
    let selection = parse_filters(filters)?;
    let table = load_file(plan)?;
    let filtered = apply(&table, &selection);
    if filtered.is_empty() {
        log::warn!("no records match the given filters");
    }
    Ok((table, filtered, selection))
}

fn report(plan: &Path, output: &Path, filters: &[String], title: &str) -> Result<(), CliError> {
    let (full, table, selection) = load_filtered(plan, filters)?;
    let charts = render_dashboard(&table);
    ReportExporter::new(title)
        .with_selection(selection)
        .with_domain(&full)
        .export_to_path(&table, &charts, output)?;
    println!("Report written to {} ({} records)", output.display(), table.len());
    Ok(())
}

fn export(plan: &Path, output: &Path, filters: &[String]) -> Result<(), CliError> {
    let (_, table, _) = load_filtered(plan, filters)?;
    write_atomically(output, |out| Ok(write_csv(&table, out)?))?;
    println!("CSV written to {} ({} records)", output.display(), table.len());
    Ok(())
}

#[derive(Serialize)]
struct SummaryOutput {
    files: Vec<FileSummary>,
    stats: CatalogStats,
}

fn summary(dir: &Path, format: Format) -> Result<(), CliError> {
    let catalog = Catalog::scan(dir)?;
    if catalog.is_empty() {
        return Err(CliError::EmptyCatalog(dir.to_path_buf()));
    }
    let files = catalog.summaries();
    let stats = CatalogStats::from_summaries(&files);
    match format {
        Format::Json => {
            println!("{}", serde_json::to_string_pretty(&SummaryOutput { files, stats })?);
        }
        Format::Text => {
            println!("{:<40} {:>8} {:>8}", "FILE", "DEVICES", "TESTS");
            for s in &files {
                println!("{:<40} {:>8} {:>8}", s.file, s.device_count, s.test_count);
            }
            println!();
            println!("Files: {}", stats.files);
            println!("Average tests per file: {:.1}", stats.average_tests);
            println!("Maximum tests: {}", stats.max_tests);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filters() {
        let selection = parse_filters(&[
            "architecture=arm64".to_string(),
            "arch=x86".to_string(),
            "test=ltp=syscalls".to_string(),
        ])
        .unwrap();
        let arches: Vec<&str> = selection
            .allowed(Field::Architecture)
            .unwrap()
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(arches, vec!["arm64", "x86"]);
        assert!(selection
            .allowed(Field::TestName)
            .is_some_and(|s| s.contains("ltp=syscalls")));
    }

    #[test]
    fn test_parse_filters_rejects_bad_input() {
        for bad in ["arm64", "arch=", "cpu=arm64"] {
            assert!(matches!(
                parse_filters(&[bad.to_string()]),
                Err(CliError::Filter(_))
            ));
        }
    }

    #[test]
    fn test_cli_parses_report() {
        let cli = Cli::try_parse_from([
            "kernelboard",
            "report",
            "plan.yml",
            "-o",
            "out.html",
            "--filter",
            "arch=arm64",
            "-f",
            "device=juno",
        ])
        .unwrap();
        match cli.command {
            Commands::Report { filters, output, .. } => {
                assert_eq!(filters.len(), 2);
                assert_eq!(output, PathBuf::from("out.html"));
            }
            _ => panic!("expected report"),
        }
    }

    #[test]
    fn test_cli_plan_conflicts_with_dir() {
        assert!(Cli::try_parse_from(["kernelboard", "serve", "--plan", "a.yml", "--plans-dir", "p"]).is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
