use anyhow::Context;
use microshop::api::routes::order_router;
use microshop::config::ServiceConfig;
use microshop::persistence::{MemoryStore, PgStore, connect_and_migrate};
use microshop::server::{init_tracing, serve};
use tracing::warn;

const DEFAULT_PORT: u16 = 3003;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = ServiceConfig::from_env(DEFAULT_PORT)?;
    match config.database_url.as_deref() {
        Some(url) => {
            let pool = connect_and_migrate(url)
                .await
                .context("failed to connect to database")?;
            serve("order-service", order_router(PgStore::new(pool.clone())), config.port).await?;
            pool.close().await;
        }
        None => {
            warn!("DATABASE_URL not set, orders are kept in memory");
            serve("order-service", order_router(MemoryStore::new()), config.port).await?;
        }
    }
    Ok(())
}
