use std::time::Duration;

use clap::{Parser, Subcommand};
use metronome_cli::Connection;
use metronome_cli::readline;
use metronome_core::protocol::Command;

/// Interactive client for the metronome timer service
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Server address to connect to
    #[arg(short, long, default_value = "127.0.0.1:7654")]
    address: String,
}

#[derive(Parser)]
#[command(about = "client")]
struct Repl {
    #[command(subcommand)]
    command: ReplCommand,
}

#[derive(Subcommand)]
enum ReplCommand {
    /// Arm timer <ID> to fire after <SECONDS>
    Set { id: usize, seconds: u64 },
    /// Cancel a pending timer
    Cancel { id: usize },
    /// Atomically re-arm a timer with a new timeout
    Reset { id: usize, seconds: u64 },
    /// Close the connection and exit
    Quit,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();
    let mut connection = Connection::connect(&args.address)
        .await
        .map_err(|e| e.to_string())?;
    println!("connected to {}", args.address);

    loop {
        let Some(line) = readline()? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &mut connection).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => eprintln!("{err}"),
        }
    }

    Ok(())
}

async fn respond(line: &str, connection: &mut Connection) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: invalid quoting")?;
    args.insert(0, "metronome".to_string());
    let repl = Repl::try_parse_from(args).map_err(|e| e.to_string())?;

    let command = match repl.command {
        ReplCommand::Set { id, seconds } => Command::Set {
            id,
            timeout: Duration::from_secs(seconds),
        },
        ReplCommand::Cancel { id } => Command::Cancel { id },
        ReplCommand::Reset { id, seconds } => Command::Reset {
            id,
            timeout: Duration::from_secs(seconds),
        },
        ReplCommand::Quit => return Ok(true),
    };

    connection.send(&command).await.map_err(|e| e.to_string())?;
    Ok(false)
}
