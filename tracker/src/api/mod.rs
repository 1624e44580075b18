pub mod handlers;
pub mod responses;
pub mod server;

use std::sync::Arc;

use crate::price::repository::{PriceRepository, SummaryRepository};

pub use server::ApiServer;

/// Read-only handles shared by every request. The API never touches the engine.
#[derive(Clone)]
pub struct ApiState {
    pub prices: Arc<dyn PriceRepository>,
    pub summaries: Arc<dyn SummaryRepository>,
}
