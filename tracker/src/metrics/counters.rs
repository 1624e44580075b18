use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Minimal counters for operational visibility.
#[derive(Clone, Default)]
pub struct Counters {
    pub samples_ingested: Arc<AtomicU64>,
    pub samples_rejected: Arc<AtomicU64>,
    pub store_failures: Arc<AtomicU64>,
    pub summary_writes: Arc<AtomicU64>,
    pub rollovers: Arc<AtomicU64>,

    pub fetch_failures: Arc<AtomicU64>,
    pub alerts_dispatched: Arc<AtomicU64>,
    pub samples_pruned: Arc<AtomicU64>,
}

pub fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

pub fn read(counter: &AtomicU64) -> u64 {
    counter.load(Ordering::Relaxed)
}
