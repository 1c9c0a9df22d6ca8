use clap::Parser;
use fresh_stub::Store;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "fresh-stub", about = "In-memory stub of the Freshservice asset API")]
struct Cli {
    /// Port to listen on.
    #[arg(long, default_value_t = 8322)]
    port: u16,

    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let addr = format!("{}:{}", cli.bind, cli.port);
    info!("starting fresh-stub on http://{addr}");

    let store = Arc::new(Store::default());
    if let Err(e) = fresh_stub::run_server(&store, &addr) {
        error!("{e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
