use clap::Parser;
use metronome_core::ServerConfig;
use metronome_server::{listener, logging};

/// Countdown timer service speaking `VERB:ID:TIMEOUT` over TCP
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Address to bind (overrides the stored configuration)
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Timer slots per client session
    #[arg(long)]
    timers: Option<usize>,

    /// Persist the effective configuration before serving
    #[arg(long)]
    save_config: bool,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    let _guard = logging::init();

    let mut config = ServerConfig::load();
    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(timers) = args.timers {
        config.timers_per_session = timers;
    }

    if args.save_config {
        if let Err(error) = config.save() {
            tracing::warn!(%error, "could not persist configuration");
        }
    }

    listener::serve(config).await
}
