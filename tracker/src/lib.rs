pub mod api;
pub mod config;
pub mod db;
pub mod jobs;
pub mod market;
pub mod metrics;
pub mod notify;
pub mod price;
pub mod summary;

pub mod error;
pub mod logger;
pub mod time;

#[cfg(test)]
pub(crate) mod testing;
