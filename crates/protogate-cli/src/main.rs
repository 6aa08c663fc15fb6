use clap::{Parser, Subcommand};
use colored::Colorize;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use protogate_core::{CompatibilityReport, Config, SchemaFormat, Severity, TypeDef, TypeIndex};
use protogate_engine::{CompatibilityAnalyzer, FindingPolicy, VerdictAggregator};
use protogate_loader::{LoadedSchema, LockFile, SchemaLoader};
use protogate_suite::{ScenarioHarness, SuiteReport};

const DEFAULT_CONFIG: &str = "protogate.toml";

/// Exit code when the candidate breaks compatibility
const EXIT_INCOMPATIBLE: i32 = 1;

/// Exit code when either schema fails to load
const EXIT_LOAD_ERROR: i32 = 2;

/// protogate - backward-compatibility gate for protobuf schemas
#[derive(Parser)]
#[command(name = "protogate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: protogate.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a candidate schema against a released baseline
    Check {
        /// Baseline schema (file or directory)
        #[arg(short, long)]
        baseline: PathBuf,

        /// Candidate schema (file or directory)
        #[arg(short = 'n', long)]
        candidate: PathBuf,

        /// Output file for report.json
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,

        /// Also output markdown report
        #[arg(short, long)]
        markdown: Option<PathBuf>,

        /// Input format: auto, lock, descriptor-set
        #[arg(short, long)]
        format: Option<SchemaFormat>,

        /// Skip load-time validation
        #[arg(long)]
        no_validate: bool,
    },

    /// Run every scenario under one or more suite directories
    Suite {
        /// Suite directories
        #[arg(required = true)]
        dirs: Vec<PathBuf>,

        /// Output file for the JSON suite report
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List every qualified type path in a schema
    Index {
        /// Schema (file or directory)
        path: PathBuf,

        /// Input format: auto, lock, descriptor-set
        #[arg(short, long)]
        format: Option<SchemaFormat>,
    },

    /// Write a lock file snapshot of a schema
    Lock {
        /// Schema (file or directory)
        path: PathBuf,

        /// Output lock file
        #[arg(short, long, default_value = "proto.lock")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref(), cli.verbose)?;
    tracing::debug!(
        format = ?config.loader.format,
        validate = config.loader.validate,
        overrides = config.severity.overrides.len(),
        "Configuration loaded"
    );

    match cli.command {
        Commands::Check { baseline, candidate, output, markdown, format, no_validate } => {
            let mut config = config;
            if let Some(format) = format {
                config.loader.format = format;
            }
            if no_validate {
                config.loader.validate = false;
            }
            check_command(&config, &baseline, &candidate, &output, markdown.as_deref(), cli.verbose).await
        }
        Commands::Suite { dirs, output } => {
            suite_command(&config, &dirs, output.as_deref(), cli.verbose)
        }
        Commands::Index { path, format } => {
            let mut config = config;
            if let Some(format) = format {
                config.loader.format = format;
            }
            index_command(&config, &path)
        }
        Commands::Lock { path, output } => {
            lock_command(&config, &path, &output, cli.verbose)
        }
    }
}

/// Log to stderr; RUST_LOG wins, otherwise `--verbose` selects debug
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    if let Some(config_path) = path {
        return Config::from_file(config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()));
    }

    let default_path = Path::new(DEFAULT_CONFIG);
    if default_path.exists() {
        Config::from_file(default_path)
            .with_context(|| format!("Failed to load config {}", default_path.display()))
    } else {
        if verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Ok(Config::default())
    }
}

/// Load one schema on the blocking pool
async fn load_schema(loader: SchemaLoader, path: PathBuf, role: &'static str) -> Result<LoadedSchema> {
    tokio::task::spawn_blocking(move || {
        loader
            .load_path(&path)
            .with_context(|| format!("Failed to load {} {}", role, path.display()))
    })
    .await
    .context("Schema loader task failed")?
}

/// Check command - compare candidate against baseline
async fn check_command(
    config: &Config,
    baseline_path: &Path,
    candidate_path: &Path,
    output: &Path,
    markdown: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let loader = SchemaLoader::from_config(&config.loader);

    if verbose {
        eprintln!("{} {}", "Loading baseline from:".cyan(), baseline_path.display());
        eprintln!("{} {}", "Loading candidate from:".cyan(), candidate_path.display());
    }

    let loaded = tokio::try_join!(
        load_schema(loader.clone(), baseline_path.to_path_buf(), "baseline"),
        load_schema(loader, candidate_path.to_path_buf(), "candidate"),
    );
    let (baseline, candidate) = match loaded {
        Ok(pair) => pair,
        Err(err) => exit_load_error(&err),
    };

    let (old, new) = match (TypeIndex::build(&baseline.tree), TypeIndex::build(&candidate.tree)) {
        (Ok(old), Ok(new)) => (old, new),
        (Err(err), _) | (_, Err(err)) => exit_load_error(&anyhow::Error::new(err)),
    };

    if verbose {
        eprintln!("{} {} baseline / {} candidate types", "Indexed".cyan(), old.len(), new.len());
    }

    let aggregator = VerdictAggregator::with_policy(FindingPolicy::from_config(config));
    let verdict = aggregator.aggregate(CompatibilityAnalyzer::findings(&old, &new));

    let report = CompatibilityReport::from_verdict(verdict)
        .with_inputs(baseline.digest, candidate.digest)
        .with_type_counts(old.len(), new.len());

    report.save_to_file(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if verbose {
        eprintln!("{} {}", "Report saved to:".green(), output.display());
    }

    if let Some(md_path) = markdown {
        std::fs::write(md_path, report.to_markdown())
            .with_context(|| format!("Failed to write {}", md_path.display()))?;
        if verbose {
            eprintln!("{} {}", "Markdown report saved to:".green(), md_path.display());
        }
    }

    print_report_summary(&report);

    if !report.compatible {
        std::process::exit(EXIT_INCOMPATIBLE);
    }

    Ok(())
}

fn exit_load_error(err: &anyhow::Error) -> ! {
    eprintln!("{} {:#}", "Load error:".red().bold(), err);
    std::process::exit(EXIT_LOAD_ERROR);
}

/// Suite command - run scenario directories
fn suite_command(config: &Config, dirs: &[PathBuf], output: Option<&Path>, verbose: bool) -> Result<()> {
    let mut suites = Vec::with_capacity(dirs.len());

    for dir in dirs {
        if verbose {
            eprintln!("{} {}", "Running suite:".cyan(), dir.display());
        }
        suites.push(ScenarioHarness::new(dir, config).run()?);
    }

    let report = SuiteReport::new(suites);
    report.print_terminal_report();

    if let Some(path) = output {
        report.save_json(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Detailed JSON report saved to: {}", path.display());
    }

    if !report.is_success() {
        std::process::exit(EXIT_INCOMPATIBLE);
    }

    Ok(())
}

/// Index command - list qualified type paths
fn index_command(config: &Config, path: &Path) -> Result<()> {
    let loaded = SchemaLoader::from_config(&config.loader).load_path(path)?;
    let index = TypeIndex::build(&loaded.tree)?;

    for entry in index.iter() {
        let kind = match entry.def {
            TypeDef::Message(_) => "message".cyan(),
            TypeDef::Enum(_) => "enum".magenta(),
        };
        println!("{:<8} {}  {}", kind, entry.path, entry.file.dimmed());
    }

    println!();
    println!("{} types", index.len());
    Ok(())
}

/// Lock command - snapshot a schema as a lock file
fn lock_command(config: &Config, path: &Path, output: &Path, verbose: bool) -> Result<()> {
    let loaded = SchemaLoader::from_config(&config.loader).load_path(path)?;
    let json = LockFile::from_tree(&loaded.tree).to_json()?;

    std::fs::write(output, json)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if verbose {
        eprintln!("{} {}", "Lock file saved to:".green(), output.display());
    }
    Ok(())
}

fn print_report_summary(report: &CompatibilityReport) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Schema Compatibility Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("Version: {}", report.version);
    println!("Timestamp: {}", report.timestamp);
    println!(
        "Types: {} baseline / {} candidate",
        report.summary.baseline_types, report.summary.candidate_types
    );
    println!();

    println!("{}", "Summary:".bold());
    println!("  Total findings: {}", report.summary.total);

    if report.summary.errors > 0 {
        println!("  Errors:   {}", format!("{}", report.summary.errors).red().bold());
    } else {
        println!("  Errors:   {}", format!("{}", report.summary.errors).green());
    }

    if report.summary.warnings > 0 {
        println!("  Warnings: {}", format!("{}", report.summary.warnings).yellow());
    } else {
        println!("  Warnings: {}", format!("{}", report.summary.warnings).green());
    }

    println!("  Info:     {}", report.summary.info);
    println!();

    for finding in report.findings.iter().chain(&report.advisories) {
        let severity_str = match finding.severity {
            Severity::Error => "ERROR".red().bold(),
            Severity::Warn => "WARN".yellow().bold(),
            Severity::Info => "INFO".cyan(),
        };

        println!("  [{}] {}: {}", severity_str, finding.kind, finding.message);

        if let Some(loc) = &finding.location {
            println!("    at {}", loc.file);
        }

        if let Some(exp) = &finding.expected {
            println!("    Expected: {}", exp);
        }
        if let Some(act) = &finding.actual {
            println!("    Actual:   {}", act);
        }
    }

    if report.compatible {
        println!("{}", "✓ Candidate is backward compatible".green().bold());
    } else {
        println!("{}", "✗ Candidate breaks backward compatibility".red().bold());
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}
