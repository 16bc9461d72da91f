use super::models::Claims;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use shared::DoctorIdentity;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT encoding error: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
    #[error("JWT decoding error: {0}")]
    Decoding(String),
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            lifetime: Duration::hours(24),
        }
    }

    /// How long an issued token, and the session behind it, stays valid.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn generate_token(&self, session_id: Uuid, doctor: &DoctorIdentity) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + self.lifetime;

        let claims = Claims {
            sub: doctor.email.clone(),
            sid: session_id,
            doctor_id: doctor.doctor_id.clone(),
            org_id: doctor.organization_id.clone(),
            exp: expiration.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let header = Header::new(Algorithm::HS256);
        encode(&header, &claims, &self.encoding_key).map_err(JwtError::Encoding)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        if token.is_empty() || token.split('.').count() != 3 {
            return Err(JwtError::InvalidToken);
        }

        let validation = Validation::new(Algorithm::HS256);
        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(token_data) => {
                log::debug!(
                    "JWT decoded. Doctor: {}, Session: {}, Exp: {}",
                    token_data.claims.sub,
                    token_data.claims.sid,
                    token_data.claims.exp
                );
                Ok(token_data.claims)
            }
            Err(err) => {
                log::debug!("JWT decode error: {:?}", err);
                match err.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        Err(JwtError::TokenExpired)
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken
                    | jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        Err(JwtError::InvalidToken)
                    }
                    _ => Err(JwtError::Decoding(err.to_string())),
                }
            }
        }
    }
}
