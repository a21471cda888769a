use microshop::api::gateway::{GatewayState, UpstreamTable, router};
use microshop::config::GatewayConfig;
use microshop::server::{init_tracing, serve};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = GatewayConfig::from_env()?;
    info!(
        products = %config.product_service_url,
        auth = %config.user_service_url,
        orders = %config.order_service_url,
        "upstreams configured"
    );

    let state = GatewayState::new(UpstreamTable::from_config(&config));
    serve("gateway", router(state), config.port).await
}
