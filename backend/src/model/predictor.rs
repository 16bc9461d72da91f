use std::fmt;
use std::sync::Arc;

/// What a predictor can report beyond its hard label. Resolved once when the
/// model is registered and dispatched on by the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    CalibratedProbability,
    DecisionScore,
    LabelOnly,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::CalibratedProbability => write!(f, "calibrated probability"),
            Capability::DecisionScore => write!(f, "decision score"),
            Capability::LabelOnly => write!(f, "label only"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("{0} is not supported by this model")]
    Unsupported(&'static str),
    #[error("model produced a non-finite value")]
    NonFinite,
    #[error("model error: {0}")]
    Internal(String),
}

/// A pre-fit binary classifier.
///
/// `predict` returns the raw class index (0 or 1) in the model's own
/// encoding. The optional capabilities default to `Unsupported`.
pub trait Predictor: Send + Sync {
    fn capability(&self) -> Capability;

    fn predict(&self, features: &[f64]) -> Result<u8, ModelError>;

    /// Class-membership probabilities `[p(class 0), p(class 1)]`.
    fn predict_proba(&self, _features: &[f64]) -> Result<[f64; 2], ModelError> {
        Err(ModelError::Unsupported("predict_proba"))
    }

    /// Signed margin; positive favours class 1.
    fn decision_function(&self, _features: &[f64]) -> Result<f64, ModelError> {
        Err(ModelError::Unsupported("decision_function"))
    }
}

/// A predictor together with the capability it was registered with.
#[derive(Clone)]
pub struct RegisteredModel {
    predictor: Arc<dyn Predictor>,
    capability: Capability,
}

impl RegisteredModel {
    pub fn new(predictor: Arc<dyn Predictor>) -> Self {
        let capability = predictor.capability();
        Self {
            predictor,
            capability,
        }
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn predictor(&self) -> &dyn Predictor {
        self.predictor.as_ref()
    }
}

impl fmt::Debug for RegisteredModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredModel")
            .field("capability", &self.capability)
            .finish()
    }
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

pub(crate) fn check_dimension(expected: usize, features: &[f64]) -> Result<(), ModelError> {
    if features.len() != expected {
        return Err(ModelError::DimensionMismatch {
            expected,
            actual: features.len(),
        });
    }
    Ok(())
}
