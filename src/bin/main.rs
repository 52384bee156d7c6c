//! yelp-insights CLI - run the Yelp analytics dashboard
//!
//! Usage:
//!   yelp-insights list [--dialect <dialect>]
//!   yelp-insights sql <report> [--dialect <dialect>]
//!   yelp-insights run [--report <id>]... [--format text|json]
//!   yelp-insights check
//!   yelp-insights serve [--port <port>] [--open]
//!
//! Examples:
//!   yelp-insights --connection local run --report monthly_reviews
//!   yelp-insights sql top_businesses_per_city --dialect snowflake
//!   YELP_DB_DRIVER=sqlite YELP_DB_URL=./yelp.db yelp-insights run --format json

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use yelp_insights::catalog::ReportCatalog;
use yelp_insights::config::Settings;
use yelp_insights::render::{JsonSink, ResultSink, TextSink};
use yelp_insights::runner::ReportRunner;
use yelp_insights::source::{self, DataSource};
use yelp_insights::sql::Dialect;

#[derive(Parser)]
#[command(name = "yelp-insights")]
#[command(about = "Yelp Data Analysis Dashboard - ten fixed reports over businesses and reviews")]
#[command(version)]
struct Cli {
    /// Path to a settings file (defaults to the standard lookup)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Named connection from the settings file
    #[arg(long, global = true)]
    connection: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the reports in the catalog
    List {
        /// SQL dialect (defaults to the connection's)
        #[arg(short, long)]
        dialect: Option<DialectArg>,
    },

    /// Print the SQL of one report
    Sql {
        /// Report id
        report: String,

        /// SQL dialect (defaults to the connection's)
        #[arg(short, long)]
        dialect: Option<DialectArg>,
    },

    /// Run reports and render the results
    Run {
        /// Report id to run; repeat for several (default: all)
        #[arg(short, long)]
        report: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Run every report once and verify it returns the columns it declares
    Check,

    /// Serve the dashboard over HTTP
    #[cfg(feature = "ui")]
    Serve {
        #[arg(short, long, default_value_t = 3000)]
        port: u16,

        /// Open a browser once the server is up
        #[arg(long)]
        open: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectArg {
    Sqlite,
    Snowflake,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Sqlite => Dialect::Sqlite,
            DialectArg::Snowflake => Dialect::Snowflake,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Bar charts and tables for the terminal
    Text,
    /// One JSON document
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = match load_settings(cli.config.as_ref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let connection = cli.connection.as_deref();

    match cli.command {
        Commands::List { dialect } => cmd_list(&settings, connection, dialect),
        Commands::Sql { report, dialect } => cmd_sql(&settings, connection, &report, dialect),
        Commands::Run { report, format } => cmd_run(&settings, connection, &report, format),
        Commands::Check => cmd_check(&settings, connection),
        #[cfg(feature = "ui")]
        Commands::Serve { port, open } => cmd_serve(&settings, connection, port, open),
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("yelp_insights=info"),
        2 => EnvFilter::new("yelp_insights=debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings, yelp_insights::config::SettingsError> {
    match path {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    }
}

/// Dialect from the flag, else the configured connection's, else SQLite.
fn pick_dialect(settings: &Settings, connection: Option<&str>, arg: Option<DialectArg>) -> Dialect {
    if let Some(arg) = arg {
        return arg.into();
    }
    settings
        .resolve_connection(connection)
        .map(|c| c.driver.dialect())
        .unwrap_or_default()
}

/// The Yelp catalog for `dialect`, cut to `requested` ids or else to the
/// configured `[dashboard] reports`.
fn build_catalog(settings: &Settings, dialect: Dialect, requested: &[String]) -> Option<ReportCatalog> {
    let catalog = match ReportCatalog::yelp(dialect, &settings.tables) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Catalog error: {}", e);
            return None;
        }
    };
    let ids = settings.dashboard.report_selection(requested);
    if ids.is_empty() {
        return Some(catalog);
    }
    match catalog.select(ids) {
        Ok(c) => Some(c),
        Err(e) => {
            eprintln!("{}. Run `yelp-insights list` for the catalog.", e);
            None
        }
    }
}

fn open_source(
    settings: &Settings,
    connection: Option<&str>,
) -> Option<Box<dyn DataSource + Send>> {
    let config = match settings.resolve_connection(connection) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Connection error: {}", e);
            return None;
        }
    };
    match source::open(&config, settings) {
        Ok(s) => Some(s),
        Err(e) => {
            eprintln!("Error opening {}: {}", config.redacted(), e);
            None
        }
    }
}

fn cmd_list(settings: &Settings, connection: Option<&str>, dialect: Option<DialectArg>) -> ExitCode {
    let dialect = pick_dialect(settings, connection, dialect);
    let Some(catalog) = build_catalog(settings, dialect, &[]) else {
        return ExitCode::FAILURE;
    };

    println!("{} ({} reports, {} dialect)", settings.dashboard.title, catalog.len(), dialect);
    println!();
    for (i, report) in catalog.list().iter().enumerate() {
        println!("{:>3}. {:<30} {:<7} {}", i + 1, report.id, report.kind, report.title);
    }
    ExitCode::SUCCESS
}

fn cmd_sql(
    settings: &Settings,
    connection: Option<&str>,
    id: &str,
    dialect: Option<DialectArg>,
) -> ExitCode {
    let dialect = pick_dialect(settings, connection, dialect);
    let Some(catalog) = build_catalog(settings, dialect, &[id.to_string()]) else {
        return ExitCode::FAILURE;
    };

    match catalog.get(id) {
        Some(report) => {
            println!("-- {}", report.title);
            println!("-- Dialect: {}", dialect);
            println!("{};", report.sql.trim_end());
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("Unknown report '{}'. Run `yelp-insights list` for the catalog.", id);
            ExitCode::FAILURE
        }
    }
}

fn cmd_run(
    settings: &Settings,
    connection: Option<&str>,
    ids: &[String],
    format: OutputFormat,
) -> ExitCode {
    let Some(source) = open_source(settings, connection) else {
        return ExitCode::FAILURE;
    };
    let Some(catalog) = build_catalog(settings, source.dialect(), ids) else {
        return ExitCode::FAILURE;
    };

    if matches!(format, OutputFormat::Text) {
        println!("{}", settings.dashboard.title);
        println!();
    }

    let stdout = io::stdout().lock();
    let mut sink: Box<dyn ResultSink> = match format {
        OutputFormat::Text => Box::new(TextSink::new(stdout, settings.dashboard.display_rows)),
        OutputFormat::Json => Box::new(JsonSink::new(stdout, settings.dashboard.title.clone())),
    };

    let runner = ReportRunner::new(&*source);
    match runner.run_all(&catalog, sink.as_mut()) {
        Ok(summary) if summary.is_success() => ExitCode::SUCCESS,
        Ok(summary) => {
            for (id, error) in summary.failed() {
                eprintln!("report {} failed: {}", id, error);
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Output error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_check(settings: &Settings, connection: Option<&str>) -> ExitCode {
    let Some(source) = open_source(settings, connection) else {
        return ExitCode::FAILURE;
    };
    let Some(catalog) = build_catalog(settings, source.dialect(), &[]) else {
        return ExitCode::FAILURE;
    };

    println!("Checking {} reports against {}", catalog.len(), source.describe());
    let mut failed = 0;
    for result in catalog.self_test(&*source) {
        match result.outcome {
            Ok(rows) => println!("  ok    {:<30} {} rows", result.report, rows),
            Err(e) => {
                failed += 1;
                println!("  FAIL  {:<30} {}", result.report, e);
            }
        }
    }

    if failed == 0 {
        println!("All reports passed.");
        ExitCode::SUCCESS
    } else {
        println!("{} report(s) failed.", failed);
        ExitCode::FAILURE
    }
}

#[cfg(feature = "ui")]
fn cmd_serve(settings: &Settings, connection: Option<&str>, port: u16, open: bool) -> ExitCode {
    use std::sync::{Arc, Mutex};
    use yelp_insights::web::{serve, AppState};

    let Some(source) = open_source(settings, connection) else {
        return ExitCode::FAILURE;
    };
    let Some(catalog) = build_catalog(settings, source.dialect(), &[]) else {
        return ExitCode::FAILURE;
    };

    let state = Arc::new(AppState {
        title: settings.dashboard.title.clone(),
        catalog,
        source: Mutex::new(source),
    });

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };
    match runtime.block_on(serve(Arc::clone(&state), port, open)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
