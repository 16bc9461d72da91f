use serde::{Deserialize, Serialize};
use shared::DoctorIdentity;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // doctor email
    pub sid: Uuid,
    pub doctor_id: String,
    pub org_id: String,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn identity(&self) -> DoctorIdentity {
        DoctorIdentity {
            email: self.sub.clone(),
            doctor_id: self.doctor_id.clone(),
            organization_id: self.org_id.clone(),
        }
    }
}

/// Request-scoped principal inserted by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPrincipal {
    pub session_id: Uuid,
    pub identity: DoctorIdentity,
}
