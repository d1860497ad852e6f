use clap::Parser;
use log::{error, info};
use love_journal_core::config::DEFAULT_DB_FILE_NAME;
use love_journal_core::{
    default_log_level, init_logging, DatabaseConfig, Journal, LogTarget, RecurrencePolicy,
};
use love_journal_server::{build_router, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "love_journal_server", version, about = "Love journal HTTP API")]
struct Args {
    /// SQLite database file.
    #[arg(long, env = "LOVE_JOURNAL_DB_PATH", default_value = DEFAULT_DB_FILE_NAME)]
    db_path: PathBuf,

    /// Listen address.
    #[arg(long, env = "LOVE_JOURNAL_BIND", default_value = "0.0.0.0:8000")]
    bind: SocketAddr,

    /// trace|debug|info|warn|error; defaults per build mode.
    #[arg(long, env = "LOVE_JOURNAL_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rotating log files; stderr when absent.
    #[arg(long, env = "LOVE_JOURNAL_LOG_DIR")]
    log_dir: Option<String>,

    /// Seconds a connection waits on a locked database.
    #[arg(long, default_value_t = 30)]
    busy_timeout_secs: u64,

    /// Create tables without SQLite STRICT typing.
    #[arg(long)]
    no_strict: bool,

    /// current-year|roll-forward
    #[arg(long, default_value = "current-year")]
    recurrence: RecurrencePolicy,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    let logging = LogTarget::from_option(args.log_dir.as_deref())
        .and_then(|target| init_logging(&level, target));
    if let Err(err) = logging {
        eprintln!("failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=server_exit module=server status=error error={err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = DatabaseConfig::new(args.db_path)
        .with_busy_timeout(Duration::from_secs(args.busy_timeout_secs))
        .with_strict(!args.no_strict);

    let journal = tokio::task::spawn_blocking(move || Journal::open(config, args.recurrence))
        .await??;
    let router = build_router(AppState::new(journal.clone()));

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    info!(
        "event=server_start module=server status=ok bind={} recurrence={}",
        args.bind,
        args.recurrence.as_str()
    );

    let served = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    tokio::task::spawn_blocking(move || journal.shutdown()).await?;
    info!("event=server_stop module=server status=ok");
    served?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("event=server_signal module=server status=error error={err}");
    }
}
