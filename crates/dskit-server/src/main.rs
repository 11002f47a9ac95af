use clap::Parser;
use dskit_server::RegistryDir;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "dskit-server", about = "Serve a dskit registry directory over HTTP")]
struct Cli {
    /// Port to listen on.
    #[arg(long, default_value_t = 8321)]
    port: u16,

    /// Registry directory containing registry.json and component files.
    #[arg(long, default_value = "./registry")]
    dir: PathBuf,

    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if !cli.dir.is_dir() {
        error!("registry directory {} does not exist", cli.dir.display());
        return ExitCode::FAILURE;
    }
    if !cli.dir.join(dskit_server::MANIFEST_FILE).is_file() {
        tracing::warn!(
            "{} has no {}; clients will fail until it is created",
            cli.dir.display(),
            dskit_server::MANIFEST_FILE
        );
    }

    let addr = format!("{}:{}", cli.host, cli.port);
    info!("starting dskit-server on {addr}");

    let registry = Arc::new(RegistryDir::new(cli.dir));
    match dskit_server::run_server(&registry, &addr) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("server failed: {e}");
            ExitCode::FAILURE
        }
    }
}
