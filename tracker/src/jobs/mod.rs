pub mod cleaner;
pub mod fetcher;

pub use cleaner::PriceCleaner;
pub use fetcher::{AlertRoute, PriceFetcher};
