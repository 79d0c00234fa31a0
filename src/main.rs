use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use mediauat::config::{LogFormat, LoggingConfig, UatConfig};
use mediauat::report::{self, ReportFormat};
use mediauat::{workspace, Status, Suite, Summary, TestResult, TestRunner};

#[derive(Parser)]
#[command(
    name = "mediauat",
    about = "Acceptance-test runner for media and asset pipelines",
    version,
    long_about = None
)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a test suite (by name or path) or every suite with --all
    Run {
        /// Suite name in the suites directory, or a path to a suite file
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        suite: Option<String>,

        /// Run every suite in the suites directory
        #[arg(long)]
        all: bool,

        /// Report format: json or html
        #[arg(long, default_value = "json")]
        format: ReportFormat,

        /// Report output path (defaults to the reports directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Quick-validate a single asset
    Validate {
        /// Path to the asset file
        asset: PathBuf,
    },

    /// List available test suites
    List,

    /// Create the suites/reports directories and a sample suite
    Init {
        /// Name of the project
        project_name: String,
    },
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber: stderr always, plus the per-run log file
/// when `[logging] log_dir` is set. Returns the log file path.
fn init_tracing(logging: &LoggingConfig) -> Result<Option<PathBuf>> {
    let log_file = logging.open_log_file(&chrono::Local::now())?;

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    layers.push(match logging.format {
        LogFormat::Json => fmt::layer().json().with_writer(io::stderr).boxed(),
        LogFormat::Text => fmt::layer().with_writer(io::stderr).boxed(),
    });

    let path = log_file.map(|(path, file)| {
        let writer = Mutex::new(file);
        layers.push(match logging.format {
            LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
            LogFormat::Text => fmt::layer().with_ansi(false).with_writer(writer).boxed(),
        });
        path
    });

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter(&logging.level))
        .init();
    Ok(path)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config fallback warnings fire before the configured subscriber exists.
    let bootstrap = fmt()
        .with_env_filter(env_filter("warn"))
        .with_writer(io::stderr)
        .finish();
    let config = tracing::subscriber::with_default(bootstrap, || {
        UatConfig::resolve(cli.config.as_deref())
    })?;

    let log_path = init_tracing(&config.logging)?;
    match &config.source {
        Some(path) => info!(path = %path.display(), "Loaded configuration"),
        None => debug!("Using default configuration"),
    }
    if let Some(path) = &log_path {
        info!(path = %path.display(), "Writing run log");
    }

    match cli.command {
        Commands::Run {
            suite,
            all,
            format,
            output,
        } => {
            let suites = if all {
                let files = workspace::suite_files(&config.paths.suites_dir)?;
                if files.is_empty() {
                    anyhow::bail!(
                        "No test suites found in {}. Run 'mediauat init <project>' first.",
                        config.paths.suites_dir.display()
                    );
                }
                files
            } else {
                let name = suite.context("suite name required")?;
                vec![workspace::resolve_suite(&config.paths.suites_dir, &name)]
            };

            let mut loaded = Vec::with_capacity(suites.len());
            for path in &suites {
                loaded.push(Suite::load(path)?);
            }

            let (results, summary) = run_all(&config, &loaded);
            print_summary(&summary);

            let target = output.unwrap_or_else(|| {
                config
                    .paths
                    .reports_dir
                    .join(report::default_file_name(format, &chrono::Local::now()))
            });
            report::write(&results, &summary, format, Some(target.as_path()))?;
            println!("Report: {}", target.display());

            if !summary.is_success() {
                std::process::exit(1);
            }
        }
        Commands::Validate { asset } => {
            let suite = workspace::quick_validation_suite(&asset);
            let mut runner = TestRunner::with_probe(Box::new(config.probe.build()));
            print_header(&format!("Validating: {}", display_name(&asset)));
            let results = runner.run_suite(&suite);
            print_results(results);
            let summary = runner.summary();
            print_summary(&summary);

            if !summary.is_success() {
                std::process::exit(1);
            }
        }
        Commands::List => {
            print_header("Available Test Suites");
            let listing = workspace::list_suites(&config.paths.suites_dir)?;
            if listing.is_empty() {
                println!("  No test suites found.");
                println!("  Run: mediauat init <project_name>");
            }
            for entry in listing {
                let stem = entry
                    .path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                match entry.suite {
                    Ok(suite) => {
                        let desc = if suite.description.is_empty() {
                            "No description"
                        } else {
                            suite.description.as_str()
                        };
                        println!("  {}", suite.name);
                        println!("    {}", desc);
                        println!("    {} test(s)\n", suite.len());
                    }
                    Err(e) => {
                        debug!(error = %e, "Unreadable suite");
                        println!("  {} (invalid)", stem);
                    }
                }
            }
        }
        Commands::Init { project_name } => {
            print_header(&format!("Initializing UAT Project: {}", project_name));
            let suite_path = workspace::init_project(
                &config.paths.suites_dir,
                &config.paths.reports_dir,
                &project_name,
            )?;
            println!("Project initialized.");
            println!("\nNext steps:");
            println!("  1. Edit test suite: {}", suite_path.display());
            println!("  2. Run tests: mediauat run {}_tests", project_name);
        }
    }

    Ok(())
}

/// Run each suite with a fresh runner and fold everything into one report.
fn run_all(config: &UatConfig, suites: &[Suite]) -> (Vec<TestResult>, Summary) {
    let started = Instant::now();
    let mut results = Vec::new();
    for suite in suites {
        print_header(&format!("Running Test Suite: {}", suite.name));
        if !suite.description.is_empty() {
            println!("{}\n", suite.description);
        }
        let mut runner = TestRunner::with_probe(Box::new(config.probe.build()));
        runner.run_suite(suite);
        print_results(runner.results());
        results.extend(runner.into_results());
    }
    let summary = Summary::from_results(&results, started.elapsed().as_secs_f64());
    (results, summary)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_header(title: &str) {
    println!("\n{:=<60}", "");
    println!("  {}", title);
    println!("{:=<60}\n", "");
}

fn print_results(results: &[TestResult]) {
    let total = results.len();
    for (i, res) in results.iter().enumerate() {
        println!(
            "  [{}/{}] {:<30} {:<8} ({:.3}s)",
            i + 1,
            total,
            res.name,
            res.status.as_str().to_uppercase(),
            res.duration
        );
        if matches!(res.status, Status::Failed | Status::Error) {
            println!("        -> {}", res.message);
        }
    }
}

fn print_summary(summary: &Summary) {
    println!("\n{:-<60}", "");
    println!("Test Summary");
    println!("{:-<60}", "");
    println!("  Total:    {}", summary.total);
    println!("  Passed:   {}", summary.passed);
    println!("  Failed:   {}", summary.failed);
    println!("  Errors:   {}", summary.errors);
    println!("  Skipped:  {}", summary.skipped);
    println!("  Duration: {:.2}s", summary.duration);
    println!("  Success:  {:.1}%", summary.success_rate);

    if summary.is_success() {
        println!("\nALL TESTS PASSED\n");
    } else {
        println!("\nTESTS FAILED\n");
    }
}
