use anyhow::{Context, Result};
use talentboard::config::BoardConfig;
use talentboard::server::ServerBuilder;
use tracing_subscriber::EnvFilter;

/// Environment variable naming the YAML configuration file
const CONFIG_ENV: &str = "TALENTBOARD_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("talentboard=info,tower_http=info")),
        )
        .init();

    let config = match std::env::var(CONFIG_ENV) {
        Ok(path) => {
            tracing::info!(%path, "loading configuration");
            BoardConfig::from_yaml_file(&path).with_context(|| format!("loading {}", path))?
        }
        Err(_) => {
            tracing::info!("{} not set, using default configuration", CONFIG_ENV);
            BoardConfig::default()
        }
    };

    ServerBuilder::new(config).serve().await
}
