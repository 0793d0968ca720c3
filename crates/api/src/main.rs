use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mercado_observability::init();

    let data_dir = std::env::var("MERCADO_DATA_DIR").ok().map(PathBuf::from);
    if data_dir.is_none() {
        tracing::warn!("MERCADO_DATA_DIR not set; running with in-memory storage");
    }

    let services = mercado_api::app::services::build_services(data_dir)?;
    let app = mercado_api::app::build_app(std::sync::Arc::new(services));

    let addr = std::env::var("MERCADO_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
