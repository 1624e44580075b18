use serde::Deserialize;

/// `{"bitcoin": {"usd": 84123.0}}`
#[derive(Debug, Deserialize)]
pub struct SimplePriceEnvelope {
    pub bitcoin: UsdQuote,
}

#[derive(Debug, Deserialize)]
pub struct UsdQuote {
    pub usd: f64,
}
