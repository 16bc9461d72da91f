//! Per-disease input schema: the ordered field names that define both the
//! input form and the feature-vector ordering a model was fit against.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::disease::Disease;

const DIABETES_FIELDS: &[&str] = &[
    "Number of Pregnancies",
    "Glucose Level",
    "Blood Pressure",
    "Skin Thickness",
    "Insulin Level",
    "BMI",
    "Diabetes Pedigree Function",
    "Age",
];

const HEART_DISEASE_FIELDS: &[&str] = &[
    "Age",
    "Sex (1=Male, 0=Female)",
    "Chest Pain types",
    "Resting Blood Pressure",
    "Serum Cholestoral in mg/dl",
    "Fasting Blood Sugar > 120 mg/dl (1 = true; 0 = false)",
    "Resting Electrocardiographic results (0,1,2)",
    "Maximum Heart Rate achieved",
    "Exercise Induced Angina (1 = yes; 0 = no)",
    "ST depression",
    "Slope of the peak exercise ST segment",
    "Number of major vessels (0-3)",
    "Thal (1 = normal; 2 = fixed defect; 3 = reversable defect)",
];

const PARKINSONS_FIELDS: &[&str] = &[
    "MDVP:Fo(Hz)",
    "MDVP:Fhi(Hz)",
    "MDVP:Flo(Hz)",
    "MDVP:Jitter(%)",
    "MDVP:Jitter(Abs)",
    "MDVP:RAP",
    "MDVP:PPQ",
    "Jitter:DDP",
    "MDVP:Shimmer",
    "MDVP:Shimmer(dB)",
    "Shimmer:APQ3",
    "Shimmer:APQ5",
    "MDVP:APQ",
    "Shimmer:DDA",
    "NHR",
    "HNR",
    "RPDE",
    "DFA",
    "spread1",
    "spread2",
    "D2",
    "PPE",
];

const BREAST_CANCER_FIELDS: &[&str] = &[
    "Mean Radius",
    "Mean Texture",
    "Mean Perimeter",
    "Mean Area",
    "Mean Smoothness",
    "Mean Compactness",
    "Mean Concavity",
    "Mean Concave Points",
    "Mean Symmetry",
    "Mean Fractal Dimension",
    "SE Radius",
    "SE Texture",
    "SE Perimeter",
    "SE Area",
    "SE Smoothness",
    "SE Compactness",
    "SE Concavity",
    "SE Concave Points",
    "SE Symmetry",
    "SE Fractal Dimension",
    "Worst Radius",
    "Worst Texture",
    "Worst Perimeter",
    "Worst Area",
    "Worst Smoothness",
    "Worst Compactness",
    "Worst Concavity",
    "Worst Concave Points",
    "Worst Symmetry",
    "Worst Fractal Dimension",
];

pub fn schema(disease: Disease) -> &'static [&'static str] {
    match disease {
        Disease::Diabetes => DIABETES_FIELDS,
        Disease::HeartDisease => HEART_DISEASE_FIELDS,
        Disease::Parkinsons => PARKINSONS_FIELDS,
        Disease::BreastCancer => BREAST_CANCER_FIELDS,
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("{disease} expects {expected} values, got {actual}")]
    LengthMismatch {
        disease: Disease,
        expected: usize,
        actual: usize,
    },
    #[error("value for '{field}' is not a finite number")]
    NonFinite { field: &'static str },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub value: f64,
}

/// Validated, schema-ordered feature values for one disease.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    disease: Disease,
    features: Vec<Feature>,
}

impl FeatureVector {
    pub fn from_schema(disease: Disease, values: &[f64]) -> Result<Self, SchemaError> {
        let fields = schema(disease);
        if fields.len() != values.len() {
            return Err(SchemaError::LengthMismatch {
                disease,
                expected: fields.len(),
                actual: values.len(),
            });
        }

        let features = fields
            .iter()
            .zip(values)
            .map(|(field, value)| {
                if value.is_finite() {
                    Ok(Feature {
                        name: field.to_string(),
                        value: *value,
                    })
                } else {
                    Err(SchemaError::NonFinite { field })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { disease, features })
    }

    pub fn disease(&self) -> Disease {
        self.disease
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn values(&self) -> Vec<f64> {
        self.features.iter().map(|f| f.value).collect()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Form description served to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiseaseSchema {
    pub disease: Disease,
    pub display_name: String,
    pub fields: Vec<String>,
}

impl DiseaseSchema {
    pub fn for_disease(disease: Disease) -> Self {
        Self {
            disease,
            display_name: disease.to_string(),
            fields: schema(disease).iter().map(|f| f.to_string()).collect(),
        }
    }
}
