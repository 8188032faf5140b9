use std::sync::Arc;

use anyhow::Result;
use routing_engine::config::Config;
use routing_engine::Router;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info,routing_engine=debug").init();

    info!("starting routing engine");

    let config = Config::from_env()?;
    config.validate()?;

    let metrics_handle = routing_engine::metrics::install();
    let router = Arc::new(Router::new(config.clone()));

    let listen_addr = config.listen_addr.clone();
    let app = routing_engine::http::build_app(router, metrics_handle);

    info!(%listen_addr, "listening");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
