use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::Config;

fn pool_options(cfg: &Config) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(cfg.db_max_connections)
        .acquire_timeout(Duration::from_secs(cfg.db_acquire_timeout_secs))
}

/// Connects and applies the embedded migrations.
pub async fn connect_pg(cfg: &Config) -> anyhow::Result<PgPool> {
    let pool = pool_options(cfg).connect(&cfg.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("database ready");
    Ok(pool)
}

/// Pool that opens connections on first use. Nothing is checked up front.
pub fn connect_pg_lazy(cfg: &Config) -> anyhow::Result<PgPool> {
    Ok(pool_options(cfg).connect_lazy(&cfg.database_url)?)
}
