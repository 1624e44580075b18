use anyhow::{Context, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{AnyPool, Row};

use crate::price::model::{DailySummary, DayRange, PriceSample, day_key, parse_day_key};
use crate::price::repository::{PriceRepository, SummaryRepository};

/// SQLx-backed Price Store.
/// Responsible only for persistence and row mapping.
pub struct SqlxPriceRepository {
    pool: AnyPool,
}

impl SqlxPriceRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PriceRepository for SqlxPriceRepository {
    async fn insert(&self, price: f64, timestamp: DateTime<Utc>) -> anyhow::Result<PriceSample> {
        let result = sqlx::query(
            r#"
INSERT INTO prices (price, timestamp_ms)
VALUES (?, ?);
"#,
        )
        .bind(price)
        .bind(timestamp.timestamp_millis())
        .execute(&self.pool)
        .await
        .context("insert price sample")?;

        let id = result
            .last_insert_id()
            .ok_or_else(|| anyhow!("driver returned no id for inserted price"))?;

        Ok(PriceSample {
            id,
            price,
            timestamp,
        })
    }

    async fn latest(&self) -> anyhow::Result<Option<PriceSample>> {
        let row = sqlx::query(
            r#"
SELECT id, price, timestamp_ms
FROM prices
ORDER BY timestamp_ms DESC, id DESC
LIMIT 1;
"#,
        )
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(row_to_sample(&r)?)),
            None => Ok(None),
        }
    }

    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> anyhow::Result<u64> {
        let result = sqlx::query(r#"DELETE FROM prices WHERE timestamp_ms < ?;"#)
            .bind(cutoff.timestamp_millis())
            .execute(&self.pool)
            .await
            .context("prune price samples")?;

        Ok(result.rows_affected())
    }
}

/// SQLx-backed Summary Store.
pub struct SqlxSummaryRepository {
    pool: AnyPool,
}

impl SqlxSummaryRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SummaryRepository for SqlxSummaryRepository {
    async fn get(&self, day: NaiveDate) -> anyhow::Result<Option<DailySummary>> {
        let row = sqlx::query(
            r#"
SELECT id, day, min_price, max_price
FROM price_summaries
WHERE day = ?;
"#,
        )
        .bind(day_key(day))
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(row_to_summary(&r)?)),
            None => Ok(None),
        }
    }

    async fn upsert_widen(&self, price: f64, day: NaiveDate) -> anyhow::Result<()> {
        // Single statement so concurrent writers cannot interleave read and write.
        sqlx::query(
            r#"
INSERT INTO price_summaries (day, min_price, max_price)
VALUES (?, ?, ?)
ON CONFLICT(day) DO UPDATE SET
  min_price = CASE
    WHEN excluded.min_price < price_summaries.min_price THEN excluded.min_price
    ELSE price_summaries.min_price
  END,
  max_price = CASE
    WHEN excluded.max_price > price_summaries.max_price THEN excluded.max_price
    ELSE price_summaries.max_price
  END;
"#,
        )
        .bind(day_key(day))
        .bind(price)
        .bind(price)
        .execute(&self.pool)
        .await
        .with_context(|| format!("upsert summary for {day}"))?;

        Ok(())
    }

    async fn max_of_max_price(&self, range: &DayRange) -> anyhow::Result<Option<f64>> {
        let row = sqlx::query(
            r#"
SELECT MAX(max_price) AS max_price
FROM price_summaries
WHERE day >= ? AND day <= ?;
"#,
        )
        .bind(day_key(range.start()))
        .bind(day_key(range.end()))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get::<Option<f64>, _>("max_price")?)
    }

    async fn list_all(&self) -> anyhow::Result<Vec<DailySummary>> {
        let rows = sqlx::query(
            r#"
SELECT id, day, min_price, max_price
FROM price_summaries
ORDER BY day ASC;
"#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            match row_to_summary(&r) {
                Ok(s) => out.push(s),
                Err(e) => {
                    // poison-row resilience: skip but don't fail the listing
                    tracing::warn!(error = %e, "skipping malformed summary row");
                }
            }
        }

        Ok(out)
    }
}

/* =========================
Row mapping
========================= */

fn row_to_sample(r: &sqlx::any::AnyRow) -> anyhow::Result<PriceSample> {
    let ts_ms: i64 = r.try_get("timestamp_ms")?;
    let timestamp = DateTime::<Utc>::from_timestamp_millis(ts_ms)
        .ok_or_else(|| anyhow!("timestamp out of range: {ts_ms}"))?;

    Ok(PriceSample {
        id: r.try_get("id")?,
        price: r.try_get("price")?,
        timestamp,
    })
}

fn row_to_summary(r: &sqlx::any::AnyRow) -> anyhow::Result<DailySummary> {
    let day_str: String = r.try_get("day")?;
    let day = parse_day_key(&day_str).with_context(|| format!("invalid day {day_str:?}"))?;

    Ok(DailySummary {
        id: r.try_get("id")?,
        day,
        min_price: r.try_get("min_price")?,
        max_price: r.try_get("max_price")?,
    })
}
