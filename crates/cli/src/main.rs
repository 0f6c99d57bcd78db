use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use tally_cli::{Command, HolidayArgs};
use tally_db::{Database, DbError};

/// Environment variable name for the database path
const TALLY_DB_PATH_ENV: &str = "TALLY_DB_PATH";

/// Tally - working-day age reports for task queues
#[derive(Parser)]
#[command(name = "tly")]
#[command(version = "0.1.0")]
#[command(about = "Working-day age reports for task queues", long_about = None)]
struct Args {
    /// Path to the database directory (can also be set via TALLY_DB_PATH env var)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(flatten)]
    holidays: HolidayArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Option<Command>,
}

/// Get the database path from command line, environment variable, or default.
///
/// Priority:
/// 1. Command line --db argument
/// 2. TALLY_DB_PATH environment variable (if non-empty)
/// 3. Default path (<project root>/.tally/data)
fn resolve_db_path(cli_db: Option<PathBuf>) -> PathBuf {
    if let Some(path) = cli_db {
        return path;
    }

    if let Ok(env_path) = std::env::var(TALLY_DB_PATH_ENV)
        && !env_path.is_empty()
    {
        return PathBuf::from(env_path);
    }

    Database::default_path()
}

/// Initialize logging from the RUST_LOG environment variable
///
/// Examples:
/// - `RUST_LOG=trace` - show all trace logs
/// - `RUST_LOG=tally_core=debug` - show report building details
/// - `RUST_LOG=warn` - show warn and above (default)
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(e) = run_app().await {
        eprintln!("error: {}", e.full_message());
        process::exit(1);
    }
}

/// Main application logic - separated for testability
async fn run_app() -> Result<(), DbError> {
    let args = Args::parse();
    run_with_args(&args).await
}

/// Run the application with the given arguments
async fn run_with_args(args: &Args) -> Result<(), DbError> {
    let Some(cmd) = &args.command else {
        println!("Welcome to Tally!");
        println!("Use 'tly --help' for usage information.");
        return Ok(());
    };

    let calendar = args.holidays.calendar();

    let result = match cmd {
        // Offset conversion never touches stored tasks
        Command::Convert(convert) => convert.execute(&calendar)?,
        _ => {
            let db_path = resolve_db_path(args.db.clone());
            let db = Database::connect(&db_path).await?;
            db.init().await?;
            cmd.execute(&db, &calendar).await?
        }
    };
    println!("{}", result);

    Ok(())
}
