use std::sync::Arc;

use assistant_backend::{config::Config, routes, state::AppState};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if config.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    if config.server_api_key.is_none() {
        warn!("SERVER_API_KEY is not set; every /api request will fail");
    }
    if config.openai.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; model calls will fail");
    }

    let addr = config.bind_addr();
    let state = Arc::new(AppState::from_config(config)?);
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "AI service listening");
    axum::serve(listener, app).await?;
    Ok(())
}
