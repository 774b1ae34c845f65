//! `prisma-json-types`: rewrite a generated Prisma client declaration file in place.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use prisma_json_types::schema::Datamodel;
use prisma_json_types::{GenerateOptions, RewriteConfig, RewriteReport, generate};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "prisma-json-types")]
#[command(about = "Typed Json fields for generated Prisma client declarations")]
#[command(version)]
struct Cli {
    /// DMMF document (or its `datamodel` section) as JSON
    #[arg(long, value_name = "FILE")]
    schema: PathBuf,

    /// Declaration file or client directory to rewrite
    #[arg(long, value_name = "PATH")]
    declarations: Option<PathBuf>,

    /// Namespace for `[Name]` annotations
    #[arg(long, value_name = "NS")]
    namespace: Option<String>,

    /// Type for Json fields without an annotation
    #[arg(long, value_name = "TYPE")]
    use_type: Option<String>,

    /// Config file (default: ./prisma-json-types.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Compute the rewrite without writing the file
    #[arg(long)]
    dry_run: bool,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<RewriteConfig> {
    let mut config = match &cli.config {
        Some(path) => RewriteConfig::load_file(path)?,
        None => {
            let cwd = std::env::current_dir().context("failed to get current directory")?;
            RewriteConfig::load(&cwd)?
        }
    };
    if let Some(namespace) = &cli.namespace {
        config.namespace = namespace.clone();
    }
    if let Some(use_type) = &cli.use_type {
        config.use_type = Some(use_type.clone());
    }
    Ok(config)
}

fn load_schema(path: &Path) -> Result<Datamodel> {
    let input = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read schema {}", path.display()))?;
    Datamodel::from_json(&input).with_context(|| format!("invalid schema {}", path.display()))
}

fn summary(path: &Path, report: &RewriteReport, dry_run: bool) -> String {
    let stats = &report.stats;
    let outcome = if dry_run {
        "dry run"
    } else if report.written {
        "written"
    } else {
        "unchanged"
    };
    format!(
        "{}: {} fields in {} declarations ({} direct, {} relation), {} failed [{outcome}]",
        path.display(),
        stats.fields_rewritten,
        stats.direct + stats.fallback,
        stats.direct,
        stats.fallback,
        stats.failed,
    )
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let datamodel = load_schema(&cli.schema)?;
    let declarations = config
        .declarations_path(cli.declarations.as_deref())
        .ok_or_else(|| {
            anyhow!("no declaration file: pass --declarations or set client_output in the config")
        })?;
    tracing::debug!(?config, declarations = %declarations.display(), "resolved inputs");

    let report = generate(
        &datamodel,
        &declarations,
        &config,
        GenerateOptions {
            dry_run: cli.dry_run,
        },
    )
    .with_context(|| format!("failed to rewrite {}", declarations.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", summary(&declarations, &report, cli.dry_run));
        for failure in &report.failures {
            eprintln!("skipped {}: {}", failure.alias, failure.message);
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
