use thiserror::Error;

#[derive(Error, Debug)]
pub enum PriceApiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid response from price api: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("price api returned a non-positive quote: {0}")]
    NonPositive(f64),
}
