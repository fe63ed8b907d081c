use crate::model::SearchResult;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Observer interface for a running search. Callbacks fire on the caller's
/// thread, once per scanned item; there is no background execution context.
pub trait SearchObserver {
    fn on_progress(&mut self, _label: &str, _fraction: f32) {}
    fn on_complete(&mut self, _result: &SearchResult) {}
    fn on_cancelled(&mut self) {}
}

/// Observer that ignores everything.
pub struct NullObserver;

impl SearchObserver for NullObserver {}

/// Cooperative cancellation flag, checked between scan items (never
/// mid-item). Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
