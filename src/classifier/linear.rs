use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Classifier, ClassifierError};

/// Exported weights of a trained linear model.
///
/// A single coefficient row is a binary model: a positive decision value selects
/// `classes[1]`, anything else `classes[0]`. With one row per class the highest decision
/// value wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    pub classes: Vec<String>,
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
}

impl LinearModel {
    pub fn validate(&self) -> Result<(), String> {
        if self.classes.len() < 2 {
            return Err(format!(
                "at least two classes required, got {}",
                self.classes.len()
            ));
        }

        let rows = self.coefficients.len();
        if rows == 0 {
            return Err("no coefficient rows".to_string());
        }
        if rows != 1 && rows != self.classes.len() {
            return Err(format!(
                "{} coefficient rows for {} classes",
                rows,
                self.classes.len()
            ));
        }
        if rows == 1 && self.classes.len() != 2 {
            return Err(format!(
                "a single coefficient row needs exactly two classes, got {}",
                self.classes.len()
            ));
        }
        if self.intercepts.len() != rows {
            return Err(format!(
                "{} intercepts for {} coefficient rows",
                self.intercepts.len(),
                rows
            ));
        }

        let width = self.coefficients[0].len();
        if width == 0 {
            return Err("coefficient rows are empty".to_string());
        }
        if self.coefficients.iter().any(|row| row.len() != width) {
            return Err("coefficient rows differ in length".to_string());
        }
        if let Some(features) = &self.features {
            if features.len() != width {
                return Err(format!(
                    "{} feature names for {} coefficients",
                    features.len(),
                    width
                ));
            }
        }

        let finite = self
            .coefficients
            .iter()
            .flatten()
            .chain(&self.intercepts)
            .all(|v| v.is_finite());
        if !finite {
            return Err("weights must be finite".to_string());
        }

        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.first().map_or(0, Vec::len)
    }
}

#[derive(Debug, Clone)]
pub struct LinearClassifier {
    model: LinearModel,
}

impl LinearClassifier {
    pub fn new(model: LinearModel) -> Result<Self, ClassifierError> {
        model
            .validate()
            .map_err(|reason| ClassifierError::ModelLoadFailed { reason })?;
        Ok(Self { model })
    }

    pub fn from_json(json: &str) -> Result<Self, ClassifierError> {
        Self::new(serde_json::from_str(json)?)
    }

    /// Loads a JSON artifact from disk.
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        if !path.exists() {
            return Err(ClassifierError::ModelNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let classifier = Self::from_json(&content)?;

        info!(
            path = %path.display(),
            classes = classifier.model.classes.len(),
            features = classifier.model.n_features(),
            "Loaded linear classifier"
        );
        Ok(classifier)
    }

    pub fn model(&self) -> &LinearModel {
        &self.model
    }

    pub fn classes(&self) -> &[String] {
        &self.model.classes
    }

    /// Decision value of every coefficient row.
    pub fn decision_function(&self, features: &[f64]) -> Result<Vec<f64>, ClassifierError> {
        let expected = self.model.n_features();
        if features.len() != expected {
            return Err(ClassifierError::FeatureCountMismatch {
                expected,
                actual: features.len(),
            });
        }

        Ok(self
            .model
            .coefficients
            .iter()
            .zip(&self.model.intercepts)
            .map(|(row, intercept)| {
                row.iter().zip(features).map(|(w, x)| w * x).sum::<f64>() + intercept
            })
            .collect())
    }
}

impl Classifier for LinearClassifier {
    fn feature_names(&self) -> Option<&[String]> {
        self.model.features.as_deref()
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.model.n_features())
    }

    fn predict(&self, features: &[f64]) -> Result<String, ClassifierError> {
        if features.iter().any(|v| !v.is_finite()) {
            return Err(ClassifierError::PredictionFailed {
                reason: "non-finite feature value".to_string(),
            });
        }

        let decision = self.decision_function(features)?;

        let class = if let [value] = decision.as_slice() {
            usize::from(*value > 0.0)
        } else {
            // First maximum wins on ties.
            decision
                .iter()
                .enumerate()
                .fold((0, f64::NEG_INFINITY), |best, (i, v)| {
                    if *v > best.1 { (i, *v) } else { best }
                })
                .0
        };

        debug!(class = class, "Linear prediction");
        Ok(self.model.classes[class].clone())
    }
}
