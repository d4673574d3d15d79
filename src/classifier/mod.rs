//! Pretrained pair classifier.
//!
//! The pipeline hands every pair's [`ScoreVector`](crate::scoring::ScoreVector) values, in
//! feature-key order, to a [`Classifier`] and stores the returned label.

pub mod error;
pub mod linear;

pub use error::ClassifierError;
pub use linear::LinearClassifier;

/// Opaque, stateless mapping from a numeric feature vector to a label.
pub trait Classifier: Send + Sync {
    /// Feature names the classifier was trained on, when known.
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Width of the feature vector the classifier accepts, when fixed.
    fn n_features(&self) -> Option<usize> {
        None
    }

    fn predict(&self, features: &[f64]) -> Result<String, ClassifierError>;

    /// Fails unless the classifier's width and feature names, where known, fit `keys`.
    fn check_features(&self, keys: &[String]) -> Result<(), ClassifierError> {
        if let Some(expected) = self.n_features() {
            if expected != keys.len() {
                return Err(ClassifierError::FeatureCountMismatch {
                    expected,
                    actual: keys.len(),
                });
            }
        }
        match self.feature_names() {
            Some(names) if names != keys => Err(ClassifierError::FeatureNamesMismatch {
                expected: keys.to_vec(),
                actual: names.to_vec(),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(any(test, feature = "mock"))]
pub use mock::MockClassifier;

#[cfg(any(test, feature = "mock"))]
mod mock {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::RwLock;

    use super::{Classifier, ClassifierError};

    /// Labels pairs by thresholding the first feature. Can be told to fail or panic once it
    /// has seen a given number of predictions.
    #[derive(Debug)]
    pub struct MockClassifier {
        threshold: f64,
        fail_after: RwLock<Option<usize>>,
        panic_after: RwLock<Option<usize>>,
        calls: AtomicUsize,
    }

    impl MockClassifier {
        pub fn new(threshold: f64) -> Self {
            Self {
                threshold,
                fail_after: RwLock::new(None),
                panic_after: RwLock::new(None),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn fail_after(&self, calls: usize) {
            *self.fail_after.write() = Some(calls);
        }

        pub fn panic_after(&self, calls: usize) {
            *self.panic_after.write() = Some(calls);
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Default for MockClassifier {
        fn default() -> Self {
            Self::new(0.5)
        }
    }

    impl Classifier for MockClassifier {
        fn predict(&self, features: &[f64]) -> Result<String, ClassifierError> {
            let seen = self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(limit) = *self.panic_after.read() {
                if seen >= limit {
                    panic!("mock classifier panicked after {} calls", limit);
                }
            }
            if let Some(limit) = *self.fail_after.read() {
                if seen >= limit {
                    return Err(ClassifierError::PredictionFailed {
                        reason: format!("mock classifier failed after {} calls", limit),
                    });
                }
            }

            let first = features.first().copied().unwrap_or(0.0);
            Ok(if first >= self.threshold {
                "related".to_string()
            } else {
                "unrelated".to_string()
            })
        }
    }
}
