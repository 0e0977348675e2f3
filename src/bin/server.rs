//! socketmap-sql Server Binary
//!
//! Serves socketmap lookups on stdin/stdout. Meant to be spawned by Postfix,
//! e.g. through `spawn(8)`. Logs go to stderr.

use std::io::{self, BufReader, BufWriter, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use socketmap_sql::config::DEFAULT_CONFIG_PATH;
use socketmap_sql::session::IdleTimeoutReader;
use socketmap_sql::transform::TransformRegistry;
use socketmap_sql::{query, Config, Session, SessionEnd};
use tracing_subscriber::{fmt, EnvFilter};

/// socketmap-sql Server
#[derive(Parser, Debug)]
#[command(name = "socketmap-sql")]
#[command(about = "Postfix socketmap daemon backed by SQL queries")]
#[command(version)]
struct Args {
    /// Path to config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Seconds to wait for a request before exiting (0 waits forever)
    #[arg(short, long, default_value = "5")]
    timeout: u64,
}

fn main() -> ExitCode {
    // stdout carries the protocol, so logs must go to stderr
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,socketmap_sql=debug"));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(end) => {
            tracing::debug!("Session ended: {:?}", end);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("socketmap-sql failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> socketmap_sql::Result<SessionEnd> {
    tracing::debug!("socketmap-sql v{}", socketmap_sql::VERSION);
    tracing::debug!("Config file: {}", args.config.display());

    let transforms = TransformRegistry::new();
    let mut config = Config::load(&args.config, &transforms)?;
    config.idle_timeout = (args.timeout > 0).then(|| Duration::from_secs(args.timeout));

    if config.tables.is_empty() {
        tracing::warn!("No tables configured; every lookup will fail");
    } else {
        tracing::info!("Serving tables: {}", config.tables.names().join(", "));
    }

    let handle = query::connect(&config.database)?;

    let reader: Box<dyn Read> = match config.idle_timeout {
        Some(timeout) => Box::new(IdleTimeoutReader::spawn(io::stdin(), timeout)?),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let writer = BufWriter::new(io::stdout().lock());

    let mut session = Session::new(reader, writer, handle, &config);
    session.run()
}
