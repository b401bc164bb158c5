use anyhow::Result;
use clap::Parser;
use gemini_proxy::config::{Config, CredentialSource, EnvCredentials, API_KEY_VAR};
use gemini_proxy::server::Application;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "gemini-proxy")]
#[command(about = "Forward prompts to Gemini without exposing the API key")]
struct CliArgs {
    /// Address to listen on. Overrides HOST.
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on. Overrides PORT.
    #[arg(long, short)]
    port: Option<u16>,
}

/// Startup warning when the key lookup the proxy uses would come back empty.
fn missing_key_warning(credentials: &dyn CredentialSource) -> Option<String> {
    credentials.api_key().is_none().then(|| {
        format!(
            "{} is not set; requests will fail until it is configured",
            API_KEY_VAR
        )
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gemini_proxy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let mut config = Config::from_env()?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    info!("Starting gemini-proxy");
    if let Some(message) = missing_key_warning(&EnvCredentials::new()) {
        warn!("{}", message);
    }

    let app = Application::build(config).await?;
    app.run_until_stopped().await?;

    Ok(())
}
