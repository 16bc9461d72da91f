use serde::{Deserialize, Serialize};

use crate::disease::{Disease, Label};

/// Outcome of deriving a risk percentage from a model.
///
/// `Unsupported` and `Failed` are kept apart so a client can tell "this model
/// cannot produce probabilities" from "the probability computation broke".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RiskEstimate {
    Available { percent: f64 },
    Unsupported,
    Failed { reason: String },
}

impl RiskEstimate {
    pub fn percent(&self) -> Option<f64> {
        match self {
            RiskEstimate::Available { percent } => Some(*percent),
            _ => None,
        }
    }

    /// Message shown next to the result when no gauge can be drawn.
    pub fn unavailable_message(&self) -> Option<&'static str> {
        match self {
            RiskEstimate::Available { .. } => None,
            RiskEstimate::Unsupported => Some("Risk probability data not available for this model."),
            RiskEstimate::Failed { .. } => Some(
                "Risk probability gauge could not be generated due to model limitations or error.",
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub disease: Disease,
    pub label: Label,
    pub risk: RiskEstimate,
}

impl PredictionResult {
    pub fn risk_percent(&self) -> Option<f64> {
        self.risk.percent()
    }

    pub fn headline(&self) -> String {
        format!("{} Prediction: {}", self.disease, self.label)
    }
}
