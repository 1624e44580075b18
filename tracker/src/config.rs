use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BITCOIN_API_URL: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=usd";

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Database connection string.
    pub database_url: String,

    /// Upstream quote endpoint polled by the ingestion job.
    pub bitcoin_api_url: String,

    // =========================
    // Read API
    // =========================
    pub app_host: String,
    pub app_port: u16,

    /// Origins allowed by the CORS layer.
    pub allowed_origins: Vec<String>,

    // =========================
    // Jobs
    // =========================
    /// Ingestion tick period.
    pub fetch_interval: Duration,

    /// Retention tick period.
    pub retention_interval: Duration,

    /// Raw samples older than this many days are pruned.
    /// Daily summaries are never pruned.
    pub retention_days: i64,

    // =========================
    // Alerting
    // =========================
    /// Fraction of the trailing historic max the price must fall by
    /// before a dip alert fires. Must lie in (0, 1).
    pub dip_fraction: f64,

    /// Recipient of dip alerts. `None` disables alerting.
    pub alert_destination: Option<String>,

    /// Webhook used to deliver alerts. `None` falls back to logging them.
    pub alert_webhook_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let dip_fraction = parse_or(&lookup, "DIP_FRACTION", 0.1_f64);
        let dip_fraction = if dip_fraction > 0.0 && dip_fraction < 1.0 {
            dip_fraction
        } else {
            tracing::warn!(dip_fraction, "DIP_FRACTION out of (0, 1); using 0.1");
            0.1
        };

        Self {
            database_url: text("DATABASE_URL", "sqlite://btc_tracker.db?mode=rwc"),
            bitcoin_api_url: text("BITCOIN_API_URL", DEFAULT_BITCOIN_API_URL),

            app_host: text("APP_HOST", "127.0.0.1"),
            app_port: parse_or(&lookup, "APP_PORT", 8000),
            allowed_origins: text("ALLOWED_ORIGINS", "http://localhost:5173")
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),

            fetch_interval: Duration::from_secs(
                parse_or(&lookup, "FETCH_INTERVAL_SECS", 60_u64).max(1),
            ),
            retention_interval: Duration::from_secs(
                parse_or(&lookup, "RETENTION_INTERVAL_SECS", 86_400_u64).max(1),
            ),
            retention_days: parse_or(&lookup, "RETENTION_DAYS", 90_i64).max(1),

            dip_fraction,
            alert_destination: optional("ALERT_DESTINATION"),
            alert_webhook_url: optional("ALERT_WEBHOOK_URL"),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.app_host, self.app_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "malformed config value; using default");
            default
        }),
    }
}
