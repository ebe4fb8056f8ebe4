use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use smart_notes::config::StubConfig;
use smart_notes::stub::{StubState, router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "smart_notes=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = StubConfig::new_from_env()?;
    let app = router(StubState::default());

    info!("stub API listening on http://{}/api", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
