pub mod chat;
pub mod disease;
pub mod prediction;
pub mod schema;

use serde::{Deserialize, Serialize};

pub use chat::{ChatRole, ChatTurn};
pub use disease::{Disease, Label, Sex};
pub use prediction::{PredictionResult, RiskEstimate};
pub use schema::{DiseaseSchema, Feature, FeatureVector, SchemaError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorIdentity {
    pub email: String,
    pub doctor_id: String,
    pub organization_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientInfo {
    pub name: String,
    pub age: u32,
    pub sex: Sex,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub disease: Disease,
    pub patient: PatientInfo,
    /// Values in the order given by the disease schema.
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportLink {
    pub file_name: String,
    pub download_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub result: PredictionResult,
    pub headline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_message: Option<String>,
    pub recommendation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gauge_svg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs_svg: Option<String>,
    pub report: ReportLink,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub doctor_id: String,
    pub organization_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub doctor: DoctorIdentity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatHistoryResponse {
    pub turns: Vec<ChatTurn>,
}
