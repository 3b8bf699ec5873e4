use anyhow::Context;
use perfserve::{config, model, observability, server};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Init
    observability::init_tracing();
    model::onnx::init_ort()?;

    // 2. Load Config
    let config = config::AppConfig::resolve(std::env::var(config::CONFIG_ENV).ok())?;

    // 3. Load every pipeline before accepting traffic
    let registry = model::loader::load_registry(&config.models)
        .context("failed to load model artifacts")?;
    tracing::info!("Loaded pipelines: {:?}", registry);

    let metrics = observability::install_metrics().context("failed to install metrics recorder")?;

    // 4. Create Router
    let app = server::routes::create_router(registry, metrics);

    // 5. Bind & Serve
    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    tracing::info!(
        "Server listening on http://{}:{}",
        config.server.host,
        config.server.port
    );

    axum::serve(listener, app).await?;

    Ok(())
}
