//! PostgreSQL connection setup.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// PostgreSQL-backed store shared by all three services. Cloning is cheap.
#[derive(Clone, Debug)]
pub struct PgStore {
    pub(crate) pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Open a pool of up to five connections and bring the schema up to date.
pub async fn connect_and_migrate(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}
