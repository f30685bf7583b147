/// Version injected at compile time via AWSFIND_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("AWSFIND_VERSION") {
    Some(v) => v,
    None => "dev",
};

use anyhow::{Context, Result};
use awsfind::aws::client::AwsClient;
use awsfind::config::Config;
use awsfind::report::{self, ReportStyle};
use awsfind::resource::{all_resources, run_probes, select_resources};
use clap::{Parser, ValueEnum};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Search AWS resources for a substring
#[derive(Parser, Debug)]
#[command(name = "awsfind", version = VERSION, about, long_about = None)]
struct Args {
    /// Text to look for (prompted for when omitted)
    #[arg(env = "AWSFIND_TERM")]
    term: Option<String>,

    /// AWS profile to use
    #[arg(short, long)]
    profile: Option<String>,

    /// AWS region to use
    #[arg(short, long)]
    region: Option<String>,

    /// Only search these resource types (comma separated, see --list-types)
    #[arg(long, value_delimiter = ',')]
    only: Vec<String>,

    /// Stop at the first resource type that fails
    #[arg(long)]
    fail_fast: bool,

    /// Print without emoji
    #[arg(long)]
    plain: bool,

    /// List the searchable resource types and exit
    #[arg(long)]
    list_types: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: cannot open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("awsfind {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("awsfind").join("awsfind.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".awsfind").join("awsfind.log");
    }
    PathBuf::from("awsfind.log")
}

/// Ask for the search term on stdin
fn prompt_for_term() -> Result<String> {
    print!("Enter the search string: ");
    io::stdout().flush()?;

    read_term(io::stdin().lock())
}

/// Read one line as the search term. A closed input is an error rather
/// than an empty term, which would match everything.
fn read_term<R: BufRead>(mut reader: R) -> Result<String> {
    let mut line = String::new();
    let read = reader
        .read_line(&mut line)
        .context("Failed to read search string")?;

    if read == 0 {
        return Err(anyhow::anyhow!("No search string given"));
    }

    Ok(line.trim().to_string())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    match run(args).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("Fatal: {:#}", err);
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    if args.list_types {
        for resource in all_resources() {
            println!("{:<26} {}", resource.key, resource.display_name);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config = Config::load();
    let resources = select_resources(&config.effective_resources(&args.only))?;

    let term = match args.term {
        Some(term) => term,
        None => prompt_for_term()?,
    };

    let profile = config.effective_profile(args.profile.as_deref());
    let region = config.effective_region(args.region.as_deref());
    let client = AwsClient::new(profile.as_deref(), region.as_deref()).await?;

    tracing::info!(
        "Searching {} resource types for {:?} in {}",
        resources.len(),
        term,
        client.region().unwrap_or("<no region>")
    );

    let style = ReportStyle { icons: !args.plain };
    let mut stdout = io::stdout();

    report::render_header(&mut stdout, &term, style)?;
    let outcomes = run_probes(&resources, &client, &term, args.fail_fast).await;
    report::render_sections(&mut stdout, &outcomes, style)?;

    let failed = report::failed_types(&outcomes);

    if failed.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("Error: failed to query {}", failed.join(", "));
        Ok(ExitCode::FAILURE)
    }
}
