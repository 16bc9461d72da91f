use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Diseases the portal ships a model for.
///
/// `Display` gives the human-readable name used in reports and the UI;
/// [`Disease::slug`] gives the stable identifier used on the wire and for
/// model artifact file names.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
pub enum Disease {
    #[strum(serialize = "Diabetes")]
    Diabetes,
    #[strum(serialize = "Heart Disease")]
    HeartDisease,
    #[strum(serialize = "Parkinson's")]
    Parkinsons,
    #[strum(serialize = "Breast Cancer")]
    BreastCancer,
}

impl Disease {
    pub fn slug(&self) -> &'static str {
        match self {
            Disease::Diabetes => "diabetes",
            Disease::HeartDisease => "heart_disease",
            Disease::Parkinsons => "parkinsons",
            Disease::BreastCancer => "breast_cancer",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "diabetes" => Some(Disease::Diabetes),
            "heart_disease" => Some(Disease::HeartDisease),
            "parkinsons" => Some(Disease::Parkinsons),
            "breast_cancer" => Some(Disease::BreastCancer),
            _ => None,
        }
    }

    /// Whether the model's raw class encoding is inverted relative to
    /// "1 = at risk". The breast cancer model's positive class is "benign".
    pub fn inverts_label(&self) -> bool {
        matches!(self, Disease::BreastCancer)
    }

    /// Index of the class column holding the at-risk probability, after
    /// polarity correction.
    pub fn at_risk_class(&self) -> usize {
        if self.inverts_label() { 0 } else { 1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter, EnumString)]
pub enum Sex {
    Male,
    Female,
    Other,
}

/// Binary diagnosis label. `Positive` always means "at risk" once the
/// per-disease polarity correction has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    #[display(fmt = "Negative (Not At Risk)")]
    Negative,
    #[display(fmt = "Positive (At Risk)")]
    Positive,
}

impl Label {
    /// Maps a raw class index. Anything other than 1 is treated as the
    /// negative class.
    pub fn from_class(class: u8) -> Self {
        if class == 1 {
            Label::Positive
        } else {
            Label::Negative
        }
    }

    pub fn class(&self) -> u8 {
        match self {
            Label::Negative => 0,
            Label::Positive => 1,
        }
    }

    pub fn inverted(&self) -> Self {
        match self {
            Label::Negative => Label::Positive,
            Label::Positive => Label::Negative,
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, Label::Positive)
    }
}
