//! Append-only observation collection shared by workers

use portlens_common::{Observation, ScanObserver};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Workers hold clones and only ever append; the orchestrator takes the
/// vector back once every worker has been joined.
#[derive(Clone)]
pub struct ResultCollector {
    observations: Arc<Mutex<Vec<Observation>>>,
    observer: Option<Arc<dyn ScanObserver>>,
}

impl ResultCollector {
    pub fn new(observer: Option<Arc<dyn ScanObserver>>) -> Self {
        Self {
            observations: Arc::new(Mutex::new(Vec::new())),
            observer,
        }
    }

    /// Record one observation. The lock covers the push only.
    pub async fn append(&self, observation: Observation) {
        if let Some(observer) = &self.observer {
            observer.on_observation(&observation);
        }
        self.observations.lock().await.push(observation);
    }

    /// Take the observations in arrival order.
    pub async fn into_observations(self) -> Vec<Observation> {
        match Arc::try_unwrap(self.observations) {
            Ok(inner) => inner.into_inner(),
            // a clone is still alive somewhere; copy rather than lose data
            Err(shared) => shared.lock().await.clone(),
        }
    }
}
