mod check;
mod logging;
mod report;
mod tui;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use blur_core::{BlurConfig, Error as CoreError, FailurePolicy, redact_connection_string};
use blur_engine::{Coordinator, EngineError, Environment, RunOptions, TracingProgress};
use blur_generate::FakerCategory;
use blur_postgres::{DEFAULT_SCHEMA, PostgresDatabase};

#[derive(Debug, Error)]
enum CliError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unsupported engine: {0}")]
    UnsupportedEngine(String),
    #[error("logging error: {0}")]
    Logging(String),
}

const EXIT_RUN_FAILED: u8 = 1;
const EXIT_ERROR: u8 = 2;
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser, Debug)]
#[command(name = "blur", version, about = "Obfuscate personal data in non-production databases")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replace configured columns with synthetic values, table by table.
    Obfuscate(ObfuscateArgs),
    /// Validate the configuration, and the live schema when a URL is given.
    Check(CheckArgs),
    /// List generators, faker categories and modifiers.
    Generators,
}

#[derive(Args, Debug)]
struct ObfuscateArgs {
    /// Configuration file.
    #[arg(long, default_value = "blur.toml")]
    config: PathBuf,
    /// Database connection string.
    #[arg(long, env = "DATABASE_URL", value_name = "CONNECTION_STRING")]
    database_url: String,
    /// Schema holding the configured tables.
    #[arg(long, default_value = DEFAULT_SCHEMA)]
    schema: String,
    /// Environment name; `production` is always refused. Falls back to APP_ENV.
    #[arg(long = "env", env = "BLUR_ENV", value_name = "NAME")]
    environment: Option<String>,
    /// Choose the tables to process interactively.
    #[arg(short, long, default_value_t = false, conflicts_with = "tables")]
    interactive: bool,
    /// Comma-separated subset of the configured tables.
    #[arg(long, value_delimiter = ',')]
    tables: Vec<String>,
    /// Skip every table that sorts before this one.
    #[arg(long, value_name = "TABLE")]
    continue_from: Option<String>,
    /// Seed for reproducible synthetic values (overrides the config).
    #[arg(long)]
    seed: Option<u64>,
    /// lenient, strict or fail_fast (overrides the config).
    #[arg(long, value_name = "POLICY")]
    failure_policy: Option<FailurePolicy>,
    /// Write the run report as JSON.
    #[arg(long)]
    report: Option<PathBuf>,
    /// Append NDJSON log events to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Configuration file.
    #[arg(long, default_value = "blur.toml")]
    config: PathBuf,
    /// Also check tables and columns against this database.
    #[arg(long, env = "DATABASE_URL", value_name = "CONNECTION_STRING")]
    database_url: Option<String>,
    /// Schema holding the configured tables.
    #[arg(long, default_value = DEFAULT_SCHEMA)]
    schema: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::Obfuscate(args) => run_obfuscate(args).await,
        Command::Check(args) => run_check(args).await,
        Command::Generators => run_generators(),
    };

    match outcome {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(event = "run_failed", error = %err);
            eprintln!("error: {err}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

async fn run_obfuscate(args: ObfuscateArgs) -> Result<ExitCode, CliError> {
    let ObfuscateArgs {
        config,
        database_url,
        schema,
        environment,
        interactive,
        tables,
        continue_from,
        seed,
        failure_policy,
        report: report_path,
        log_file,
    } = args;

    logging::init_logging(log_file.as_deref())?;

    let environment = Environment::new(
        environment
            .or_else(|| std::env::var("APP_ENV").ok())
            .unwrap_or_else(|| Environment::default().name().to_string()),
    );
    if environment.is_production() {
        return Err(EngineError::ProductionGuard(environment.name().to_string()).into());
    }

    let config_path = config;
    let config = load(&config_path)?;
    let engine = detect_engine(&database_url)?;
    let connection = redact_connection_string(&database_url);

    tracing::info!(
        event = "run_started",
        engine,
        connection = %connection.redacted,
        schema = %schema,
        environment = environment.name(),
        config = %config_path.display()
    );

    let timer = Instant::now();
    let db = PostgresDatabase::connect(&database_url, schema).await?;
    let coordinator = Coordinator::new();

    let selection = if interactive {
        let candidates = coordinator
            .candidate_tables(&db, &config, &environment)
            .await?;
        match tui::pick_tables(&candidates)? {
            Some(selection) => Some(selection),
            None => {
                tracing::warn!(event = "selection_cancelled", "no tables were processed");
                return Ok(ExitCode::from(EXIT_INTERRUPTED));
            }
        }
    } else if tables.is_empty() {
        None
    } else {
        Some(tables)
    };

    let cancel = CancellationToken::new();
    let interrupted = cancel.clone();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!(
                event = "interrupt_received",
                "stopping after the current chunk"
            );
            signal_token.cancel();
        }
    });

    let options = RunOptions {
        environment,
        selection,
        continue_from,
        failure_policy,
        seed,
        cancel,
    };
    let mut progress = TracingProgress::default();
    let result = coordinator
        .run(&db, &config, options, &mut progress)
        .await?;

    if let Some(path) = &report_path {
        report::write_report(path, &result)?;
        tracing::info!(event = "report_written", path = %path.display());
    }
    print!("{}", report::render_summary(&result));

    let duration_ms = timer.elapsed().as_millis();
    let status = if result.success { "success" } else { "failure" };
    tracing::info!(event = "run_finished", status, duration_ms = duration_ms);

    Ok(if interrupted.is_cancelled() {
        ExitCode::from(EXIT_INTERRUPTED)
    } else if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_RUN_FAILED)
    })
}

async fn run_check(args: CheckArgs) -> Result<ExitCode, CliError> {
    logging::init_logging(None)?;

    let contents = std::fs::read_to_string(&args.config)?;
    let config: BlurConfig = toml::from_str(&contents)?;
    let coordinator = Coordinator::new();

    let registries =
        check::check_registries(&config, coordinator.generators(), coordinator.modifiers());
    let mut report = check::full_report(&config, registries);

    if let Some(url) = &args.database_url {
        detect_engine(url)?;
        let db = PostgresDatabase::connect(url, args.schema).await?;
        let database = db.database_name().await?;
        tracing::info!(event = "schema_check", database = %database, schema = db.schema());
        report.merge(check::check_schema(&db, &config, coordinator.modifiers()).await?);
    }

    print!("{}", check::render_report(&report));
    println!(
        "{}: {} error(s), {} warning(s)",
        args.config.display(),
        report.errors.len(),
        report.warnings.len()
    );

    Ok(if report.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_RUN_FAILED)
    })
}

fn run_generators() -> Result<ExitCode, CliError> {
    let coordinator = Coordinator::new();
    println!("generators: {}", coordinator.generators().names().join(", "));
    println!(
        "faker categories: {}",
        FakerCategory::names().collect::<Vec<_>>().join(", ")
    );
    println!("modifiers: {}", coordinator.modifiers().names().join(", "));
    Ok(ExitCode::SUCCESS)
}

fn load(path: &Path) -> Result<BlurConfig, CliError> {
    blur_core::load_config(path).map_err(|err| match err {
        CoreError::Io(io) => {
            CliError::InvalidConfig(format!("cannot read {}: {io}", path.display()))
        }
        other => CliError::Core(other),
    })
}

fn detect_engine(conn: &str) -> Result<&'static str, CliError> {
    if conn.starts_with("postgres://") || conn.starts_with("postgresql://") {
        Ok("postgres")
    } else {
        Err(CliError::UnsupportedEngine(
            redact_connection_string(conn).redacted,
        ))
    }
}
