use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::market::PriceSource;
use crate::market::coingecko::errors::PriceApiError;
use crate::market::coingecko::types::SimplePriceEnvelope;

#[derive(Clone)]
pub struct CoinGeckoClient {
    http: Client,
    url: String,
}

impl CoinGeckoClient {
    pub fn new(url: String) -> Result<Self, PriceApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(5))
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self { http, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    #[instrument(skip(self), fields(url = %self.url), level = "debug")]
    async fn fetch_price(&self) -> Result<f64, PriceApiError> {
        let resp = self.http.get(&self.url).send().await?.error_for_status()?;

        let body = resp.bytes().await?;
        let price = parse_quote(&body)?;

        debug!(price, "bitcoin price fetched");
        Ok(price)
    }
}

pub fn parse_quote(body: &[u8]) -> Result<f64, PriceApiError> {
    let envelope: SimplePriceEnvelope = serde_json::from_slice(body)?;
    let price = envelope.bitcoin.usd;

    if !price.is_finite() || price <= 0.0 {
        return Err(PriceApiError::NonPositive(price));
    }

    Ok(price)
}
