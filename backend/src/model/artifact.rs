//! Versioned on-disk model format.
//!
//! An artifact is a JSON document describing one fitted estimator, with an
//! optional standardisation step in front of it:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "disease": "diabetes",
//!   "feature_count": 8,
//!   "scaler": { "mean": [...], "scale": [...] },
//!   "estimator": { "type": "logistic_regression", "coefficients": [...], "intercept": -0.4 }
//! }
//! ```
//!
//! The estimator family decides the predictor's capability:
//! `logistic_regression` reports calibrated probabilities, `linear_svc`
//! reports a decision score and `nearest_centroid` reports labels only.

use std::path::Path;
use std::sync::Arc;

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use shared::Disease;

use super::predictor::{Capability, ModelError, Predictor, check_dimension, sigmoid};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse artifact: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported artifact format version {0}")]
    UnsupportedVersion(u32),
    #[error("artifact is for {found}, expected {expected}")]
    DiseaseMismatch { expected: Disease, found: Disease },
    #[error("{what} has {actual} entries, expected {expected}")]
    Dimension {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("scaler contains a zero or non-finite scale")]
    InvalidScale,
    #[error("artifact contains non-finite parameters")]
    NonFiniteParameter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerParams {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EstimatorParams {
    LogisticRegression { coefficients: Vec<f64>, intercept: f64 },
    LinearSvc { coefficients: Vec<f64>, intercept: f64 },
    NearestCentroid { centroids: [Vec<f64>; 2] },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub disease: Disease,
    pub feature_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaler: Option<ScalerParams>,
    pub estimator: EstimatorParams,
}

impl ModelArtifact {
    pub fn from_path(path: &Path) -> Result<Self, ArtifactError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn capability(&self) -> Capability {
        match self.estimator {
            EstimatorParams::LogisticRegression { .. } => Capability::CalibratedProbability,
            EstimatorParams::LinearSvc { .. } => Capability::DecisionScore,
            EstimatorParams::NearestCentroid { .. } => Capability::LabelOnly,
        }
    }

    pub fn validate(&self, expected: Disease, schema_len: usize) -> Result<(), ArtifactError> {
        if self.format_version != FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion(self.format_version));
        }
        if self.disease != expected {
            return Err(ArtifactError::DiseaseMismatch {
                expected,
                found: self.disease,
            });
        }
        check_len("feature_count", schema_len, self.feature_count)?;

        let n = self.feature_count;
        if let Some(scaler) = &self.scaler {
            check_len("scaler.mean", n, scaler.mean.len())?;
            check_len("scaler.scale", n, scaler.scale.len())?;
            if scaler.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
                return Err(ArtifactError::InvalidScale);
            }
            check_finite(&scaler.mean)?;
        }

        match &self.estimator {
            EstimatorParams::LogisticRegression {
                coefficients,
                intercept,
            }
            | EstimatorParams::LinearSvc {
                coefficients,
                intercept,
            } => {
                check_len("coefficients", n, coefficients.len())?;
                check_finite(coefficients)?;
                check_finite(&[*intercept])?;
            }
            EstimatorParams::NearestCentroid { centroids } => {
                for centroid in centroids {
                    check_len("centroid", n, centroid.len())?;
                    check_finite(centroid)?;
                }
            }
        }
        Ok(())
    }

    /// Builds the predictor. Call [`ModelArtifact::validate`] first.
    pub fn into_predictor(self) -> Arc<dyn Predictor> {
        let scaler = self.scaler.map(Standardizer::from);
        match self.estimator {
            EstimatorParams::LogisticRegression {
                coefficients,
                intercept,
            } => Arc::new(LogisticRegression {
                linear: LinearModel::new(scaler, coefficients, intercept),
            }),
            EstimatorParams::LinearSvc {
                coefficients,
                intercept,
            } => Arc::new(LinearSvc {
                linear: LinearModel::new(scaler, coefficients, intercept),
            }),
            EstimatorParams::NearestCentroid { centroids } => {
                let [negative, positive] = centroids;
                Arc::new(NearestCentroid {
                    scaler,
                    centroids: [Array1::from(negative), Array1::from(positive)],
                })
            }
        }
    }
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<(), ArtifactError> {
    if expected != actual {
        return Err(ArtifactError::Dimension {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_finite(values: &[f64]) -> Result<(), ArtifactError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ArtifactError::NonFiniteParameter)
    }
}

#[derive(Debug, Clone)]
struct Standardizer {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl From<ScalerParams> for Standardizer {
    fn from(params: ScalerParams) -> Self {
        Self {
            mean: Array1::from(params.mean),
            scale: Array1::from(params.scale),
        }
    }
}

impl Standardizer {
    fn transform(&self, x: &Array1<f64>) -> Array1<f64> {
        (x - &self.mean) / &self.scale
    }
}

fn prepare(scaler: Option<&Standardizer>, features: &[f64]) -> Array1<f64> {
    let x = Array1::from(features.to_vec());
    match scaler {
        Some(scaler) => scaler.transform(&x),
        None => x,
    }
}

#[derive(Debug, Clone)]
struct LinearModel {
    scaler: Option<Standardizer>,
    coefficients: Array1<f64>,
    intercept: f64,
}

impl LinearModel {
    fn new(scaler: Option<Standardizer>, coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            scaler,
            coefficients: Array1::from(coefficients),
            intercept,
        }
    }

    /// Unchecked margin. May be infinite or NaN when standardisation overflows.
    fn raw_margin(&self, features: &[f64]) -> Result<f64, ModelError> {
        check_dimension(self.coefficients.len(), features)?;
        let x = prepare(self.scaler.as_ref(), features);
        Ok(self.coefficients.dot(&x) + self.intercept)
    }

    /// Hard label from the sign of the margin; NaN falls to class 0.
    fn label(&self, features: &[f64]) -> Result<u8, ModelError> {
        Ok(u8::from(self.raw_margin(features)? > 0.0))
    }

    fn margin(&self, features: &[f64]) -> Result<f64, ModelError> {
        let margin = self.raw_margin(features)?;
        if margin.is_finite() {
            Ok(margin)
        } else {
            Err(ModelError::NonFinite)
        }
    }
}

#[derive(Debug)]
struct LogisticRegression {
    linear: LinearModel,
}

impl Predictor for LogisticRegression {
    fn capability(&self) -> Capability {
        Capability::CalibratedProbability
    }

    fn predict(&self, features: &[f64]) -> Result<u8, ModelError> {
        self.linear.label(features)
    }

    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], ModelError> {
        let p1 = sigmoid(self.linear.margin(features)?);
        Ok([1.0 - p1, p1])
    }
}

#[derive(Debug)]
struct LinearSvc {
    linear: LinearModel,
}

impl Predictor for LinearSvc {
    fn capability(&self) -> Capability {
        Capability::DecisionScore
    }

    fn predict(&self, features: &[f64]) -> Result<u8, ModelError> {
        self.linear.label(features)
    }

    fn decision_function(&self, features: &[f64]) -> Result<f64, ModelError> {
        self.linear.margin(features)
    }
}

#[derive(Debug)]
struct NearestCentroid {
    scaler: Option<Standardizer>,
    centroids: [Array1<f64>; 2],
}

impl Predictor for NearestCentroid {
    fn capability(&self) -> Capability {
        Capability::LabelOnly
    }

    fn predict(&self, features: &[f64]) -> Result<u8, ModelError> {
        check_dimension(self.centroids[0].len(), features)?;
        let x = prepare(self.scaler.as_ref(), features);
        let distance = |c: &Array1<f64>| {
            let diff = &x - c;
            diff.dot(&diff)
        };
        // Overflowed distances compare false, leaving class 0.
        let (d0, d1) = (distance(&self.centroids[0]), distance(&self.centroids[1]));
        Ok(u8::from(d1 < d0))
    }
}
