use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Create the PostgreSQL connection pool and run migrations.
///
/// Unlike ancillary stores, the vector store is not optional here: without
/// it the service can neither ingest nor answer, so a bad connection fails
/// startup instead of degrading.
pub async fn init_pg_pool(config: &folio_core::config::PostgresConfig) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.connection_string())
        .await
        .map_err(|e| {
            anyhow::anyhow!(
                "failed to connect to PostgreSQL at {}:{}/{}: {}",
                config.host,
                config.port,
                config.database,
                e
            )
        })?;
    info!(
        "PostgreSQL connected: {}:{}/{}",
        config.host, config.port, config.database
    );

    sqlx::migrate!("../../migrations").run(&pool).await?;
    info!("Database migrations applied");

    Ok(pool)
}
