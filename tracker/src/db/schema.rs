use sqlx::AnyPool;

pub async fn migrate(pool: &AnyPool) -> anyhow::Result<()> {
    // Raw samples, pruned by the retention job
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS prices (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  price REAL NOT NULL,
  timestamp_ms BIGINT NOT NULL
);
"#,
    )
    .execute(pool)
    .await?;

    // One row per calendar day; `day` is ISO-8601 so text order is date order
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS price_summaries (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  day TEXT NOT NULL UNIQUE,
  min_price REAL NOT NULL,
  max_price REAL NOT NULL
);
"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(r#"CREATE INDEX IF NOT EXISTS idx_prices_timestamp ON prices(timestamp_ms);"#)
        .execute(pool)
        .await?;

    Ok(())
}
