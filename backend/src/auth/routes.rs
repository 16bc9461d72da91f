use actix_web::{HttpResponse, web};
use shared::{AuthResponse, DoctorIdentity, LoginRequest, SignupRequest};

use super::credentials::CredentialStore;
use super::jwt::JwtService;
use super::middleware::AuthenticatedUser;
use crate::error::ApiError;
use crate::session::SessionStore;

fn open_session(
    sessions: &SessionStore,
    jwt: &JwtService,
    doctor: DoctorIdentity,
) -> Result<AuthResponse, ApiError> {
    let session_id = sessions.create(doctor.clone());
    match jwt.generate_token(session_id, &doctor) {
        Ok(token) => Ok(AuthResponse { token, doctor }),
        Err(e) => {
            sessions.remove(session_id);
            Err(e.into())
        }
    }
}

pub async fn signup(
    body: web::Json<SignupRequest>,
    credentials: web::Data<CredentialStore>,
    sessions: web::Data<SessionStore>,
    jwt: web::Data<JwtService>,
) -> Result<HttpResponse, ApiError> {
    let doctor = credentials.register(
        &body.email,
        &body.password,
        &body.doctor_id,
        &body.organization_id,
    )?;
    let response = open_session(&sessions, &jwt, doctor)?;
    Ok(HttpResponse::Created().json(response))
}

pub async fn login(
    body: web::Json<LoginRequest>,
    credentials: web::Data<CredentialStore>,
    sessions: web::Data<SessionStore>,
    jwt: web::Data<JwtService>,
) -> Result<HttpResponse, ApiError> {
    let doctor = credentials.verify(&body.email, &body.password).map_err(|e| {
        log::warn!("Failed login for {}", body.email.trim());
        ApiError::from(e)
    })?;
    log::info!("Doctor {} logged in", doctor.email);
    let response = open_session(&sessions, &jwt, doctor)?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn logout(
    user: AuthenticatedUser,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, ApiError> {
    sessions.remove(user.0.session_id);
    log::info!("Doctor {} logged out", user.0.identity.email);
    Ok(HttpResponse::NoContent().finish())
}

pub async fn me(user: AuthenticatedUser) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(user.0.identity))
}
