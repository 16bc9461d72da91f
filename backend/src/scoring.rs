//! Turns a registered model and a feature vector into a [`PredictionResult`].
//!
//! The breast cancer model was fit with "benign" as its positive class, so its
//! label is inverted and its at-risk probability is read from class 0. Every
//! other model already uses 1 = at risk.

use shared::{Disease, Label, PredictionResult, RiskEstimate};

use crate::model::{Capability, ModelError, RegisteredModel, predictor::sigmoid};

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("{disease} model failed to predict: {source}")]
    Predict {
        disease: Disease,
        #[source]
        source: ModelError,
    },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RiskUnavailable {
    #[error("model exposes neither probabilities nor decision scores")]
    Unsupported,
    #[error("risk computation failed: {0}")]
    ComputeError(String),
}

impl From<RiskUnavailable> for RiskEstimate {
    fn from(err: RiskUnavailable) -> Self {
        match err {
            RiskUnavailable::Unsupported => RiskEstimate::Unsupported,
            RiskUnavailable::ComputeError(reason) => RiskEstimate::Failed { reason },
        }
    }
}

pub fn score(
    model: &RegisteredModel,
    disease: Disease,
    features: &[f64],
) -> Result<PredictionResult, ScoringError> {
    let raw = model
        .predictor()
        .predict(features)
        .map_err(|source| ScoringError::Predict { disease, source })?;

    let mut label = Label::from_class(raw);
    if disease.inverts_label() {
        label = label.inverted();
    }

    let risk = match derive_risk(model, disease, features) {
        Ok(percent) => RiskEstimate::Available { percent },
        Err(err) => {
            if let RiskUnavailable::ComputeError(reason) = &err {
                log::warn!("Risk derivation failed for {}: {}", disease, reason);
            }
            err.into()
        }
    };

    Ok(PredictionResult {
        disease,
        label,
        risk,
    })
}

/// Risk percentage of the at-risk class, dispatched on the capability the
/// model was registered with.
pub fn derive_risk(
    model: &RegisteredModel,
    disease: Disease,
    features: &[f64],
) -> Result<f64, RiskUnavailable> {
    let probabilities = match model.capability() {
        Capability::CalibratedProbability => model
            .predictor()
            .predict_proba(features)
            .map_err(compute_error)?,
        Capability::DecisionScore => {
            let score = model
                .predictor()
                .decision_function(features)
                .map_err(compute_error)?;
            if !score.is_finite() {
                return Err(RiskUnavailable::ComputeError(
                    "decision score is not finite".to_string(),
                ));
            }
            let p1 = sigmoid(score);
            [1.0 - p1, p1]
        }
        Capability::LabelOnly => return Err(RiskUnavailable::Unsupported),
    };

    let p = probabilities[disease.at_risk_class()];
    if !p.is_finite() || !(0.0..=1.0).contains(&p) {
        return Err(RiskUnavailable::ComputeError(format!(
            "probability {p} is outside [0, 1]"
        )));
    }
    Ok(p * 100.0)
}

fn compute_error(err: ModelError) -> RiskUnavailable {
    RiskUnavailable::ComputeError(err.to_string())
}
