use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the `internships` table and its indexes if they do not exist.
/// Timestamps are unix seconds.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS internships (
            id VARCHAR(255) PRIMARY KEY,
            active BOOLEAN,
            company_name VARCHAR(255),
            date_posted BIGINT,
            date_updated BIGINT,
            is_visible BOOLEAN,
            locations JSONB,
            season VARCHAR(100),
            sponsorship VARCHAR(255),
            title VARCHAR(500),
            url TEXT,
            keywords JSONB,
            scraped_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_internships_date_posted ON internships (date_posted DESC)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_internships_active ON internships (active)")
        .execute(pool)
        .await?;

    info!("Schema ready");
    Ok(())
}
