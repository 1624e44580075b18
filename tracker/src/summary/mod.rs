pub mod alert;
pub mod cache;
pub mod engine;

pub use alert::DipPolicy;
pub use cache::{SummaryCacheState, SummaryView};
pub use engine::{IngestOutcome, SummaryEngine};
