pub mod coingecko;

use async_trait::async_trait;

pub use coingecko::{CoinGeckoClient, PriceApiError};

/// Upstream source of the current bitcoin/USD quote.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_price(&self) -> Result<f64, PriceApiError>;
}
