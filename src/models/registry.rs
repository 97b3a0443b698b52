//! Process-wide model sharing.
//!
//! Training runs at most once per process: [`LazyModel`] guards the first
//! initialization with a mutex and stores the result in a `OnceLock`. After
//! that, readers take an `Arc<FittedModel>` from the [`ModelHandle`] without
//! locking.
//!
//! Re-training (e.g. the TUI reloading the dataset) builds a brand-new model and
//! swaps the `Arc` atomically. Predictions already holding the old `Arc` finish
//! against the old coefficients.

use std::sync::{Arc, Mutex, OnceLock};

use arc_swap::ArcSwap;

use crate::data::Dataset;
use crate::error::Result;
use crate::fit::train;
use crate::models::FittedModel;

/// The current model, replaceable as a whole but never mutated in place.
#[derive(Debug)]
pub struct ModelHandle {
    current: ArcSwap<FittedModel>,
}

impl ModelHandle {
    pub fn new(model: FittedModel) -> Self {
        Self {
            current: ArcSwap::from_pointee(model),
        }
    }

    /// Snapshot of the model currently visible to predictors.
    pub fn current(&self) -> Arc<FittedModel> {
        self.current.load_full()
    }

    /// Publish a new model; returns the one it replaced.
    pub fn replace(&self, model: FittedModel) -> Arc<FittedModel> {
        self.current.swap(Arc::new(model))
    }

    /// Train on `dataset` and publish the result. On failure the current model stays.
    pub fn retrain(&self, dataset: &Dataset) -> Result<Arc<FittedModel>> {
        let model = train(dataset)?;
        self.replace(model);
        Ok(self.current())
    }
}

/// Write-once holder for a [`ModelHandle`].
#[derive(Debug)]
pub struct LazyModel {
    cell: OnceLock<ModelHandle>,
    init_lock: Mutex<()>,
}

impl Default for LazyModel {
    fn default() -> Self {
        Self::new()
    }
}

impl LazyModel {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    pub fn get(&self) -> Option<&ModelHandle> {
        self.cell.get()
    }

    /// Return the handle, running `init` if nothing has been stored yet.
    ///
    /// `init` runs at most once across all threads as long as it succeeds; a
    /// failed `init` leaves the holder empty so a later call can try again.
    pub fn get_or_try_init<F>(&self, init: F) -> Result<&ModelHandle>
    where
        F: FnOnce() -> Result<FittedModel>,
    {
        if let Some(handle) = self.cell.get() {
            return Ok(handle);
        }

        let _guard = self.init_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(handle) = self.cell.get() {
            return Ok(handle);
        }

        let model = init()?;
        Ok(self.cell.get_or_init(|| ModelHandle::new(model)))
    }
}

/// The process-wide model used by the `devest` front ends.
pub static SHARED_MODEL: LazyModel = LazyModel::new();

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::data::{SyntheticConfig, generate_dataset};
    use crate::error::EstimatorError;

    fn dataset(seed: u64) -> Dataset {
        generate_dataset(&SyntheticConfig { rows: 40, seed, noise_scale: 1.0 }).unwrap()
    }

    #[test]
    fn init_runs_once_under_contention() {
        let lazy = LazyModel::new();
        let calls = AtomicUsize::new(0);
        let ds = dataset(1);

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    let handle = lazy
                        .get_or_try_init(|| {
                            calls.fetch_add(1, Ordering::SeqCst);
                            train(&ds)
                        })
                        .unwrap();
                    let model = handle.current();
                    assert!(model.predict(&ds.records()[0].features).is_ok());
                });
            }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_init_can_be_retried() {
        let lazy = LazyModel::new();
        let err = lazy.get_or_try_init(|| Err(EstimatorError::EmptyDataset));
        assert!(err.is_err());
        assert!(lazy.get().is_none());

        assert!(lazy.get_or_try_init(|| train(&dataset(2))).is_ok());
        assert!(lazy.get().is_some());
    }

    #[test]
    fn retrain_swaps_without_touching_old_snapshot() {
        let handle = ModelHandle::new(train(&dataset(3)).unwrap());
        let before = handle.current();
        let before_coefs = before.coefficients().clone();

        handle.retrain(&dataset(4)).unwrap();
        let after = handle.current();

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(before.coefficients(), &before_coefs);
        assert_ne!(after.coefficients(), &before_coefs);
    }

    #[test]
    fn failed_retrain_keeps_current_model() {
        let handle = ModelHandle::new(train(&dataset(5)).unwrap());
        let before = handle.current();
        assert!(handle.retrain(&Dataset::from_records(Vec::new())).is_err());
        assert!(Arc::ptr_eq(&before, &handle.current()));
    }
}
