use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use mkchat::connector::adapter::{web, DEFAULT_BASE_URL};
use mkchat::{Commands, Container, ContainerConfig, Router, DEFAULT_TEMPERATURE};

#[derive(Parser)]
#[command(name = "mkchat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// API key for the generative-language service
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// TOML file with a [gemini_ai] table holding a quoted value, e.g. api_key = "AIza..."
    #[arg(long, global = true, default_value = "credentials.toml")]
    credentials: PathBuf,

    #[arg(long, global = true, env = "GEMINI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Sampling temperature (0.0 = deterministic)
    #[arg(long, global = true, default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// Answer from an offline mock model instead of the remote API
    #[arg(long, global = true)]
    mock_model: bool,

    /// Reuse replies for prompts already answered with the same key
    #[arg(long, global = true)]
    cache_responses: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let container = Container::new(ContainerConfig {
        api_key: cli.api_key,
        credentials_path: cli.credentials,
        base_url: cli.base_url,
        temperature: cli.temperature,
        mock_model: cli.mock_model,
        cache_responses: cli.cache_responses,
    })?;

    match cli.command {
        Commands::Serve { port, public } => {
            let ip = if public {
                IpAddr::V4(Ipv4Addr::UNSPECIFIED)
            } else {
                IpAddr::V4(Ipv4Addr::LOCALHOST)
            };
            info!(
                "Starting web UI (service: {}, temperature: {})",
                container.service_name(),
                container.temperature()
            );
            let interaction = Arc::new(container.interaction_loop());
            web::serve(interaction, SocketAddr::new(ip, port)).await?;
        }
        command => {
            let router = Router::new(&container);
            let output = router.route(command).await?;
            println!("{}", output);
        }
    }

    Ok(())
}
