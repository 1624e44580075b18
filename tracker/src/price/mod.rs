pub mod model;
pub mod repository;
pub mod repository_sqlx;

pub use model::{DailySummary, DayRange, PriceSample};
pub use repository::{PriceRepository, SummaryRepository};
pub use repository_sqlx::{SqlxPriceRepository, SqlxSummaryRepository};
