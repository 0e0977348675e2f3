//! socketmap-sql CLI Client
//!
//! Interactive debugging: spawns the server with the given config and sends
//! each typed line as a request.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::{Command, ExitCode};

use clap::Parser;
use socketmap_sql::client::Client;
use socketmap_sql::config::DEFAULT_CONFIG_PATH;

/// socketmap-sql CLI
#[derive(Parser, Debug)]
#[command(name = "socketmap-sql-cli")]
#[command(about = "Debug client for socketmap-sql")]
#[command(version)]
struct Args {
    /// Path to config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Server binary to spawn (defaults to socketmap-sql next to this one)
    #[arg(short, long)]
    server: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("socketmap-sql-cli: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> socketmap_sql::Result<()> {
    let server = match &args.server {
        Some(path) => path.clone(),
        None => std::env::current_exe()?.with_file_name("socketmap-sql"),
    };

    let mut command = Command::new(server);
    // The REPL decides when to stop, not the idle timeout
    command.arg("--config").arg(&args.config).arg("--timeout").arg("0");
    let mut client = Client::spawn(command)?;

    println!("Type '.exit' to exit.");
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "socketmap> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let request = line.trim_end_matches(['\r', '\n']);
        if request == ".exit" {
            break;
        }

        match client.send(request.as_bytes())? {
            Some(response) => println!("{}", String::from_utf8_lossy(&response)),
            None => {
                println!("server exited");
                break;
            }
        }
    }

    client.close()?;
    Ok(())
}
