use super::jwt::JwtService;
use super::models::SessionPrincipal;
use crate::error::ApiError;
use crate::session::SessionStore;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use actix_web::{FromRequest, HttpRequest};
use futures::future::{Ready, err, ok};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub const PUBLIC_PATHS: [&str; 3] = ["/health", "/auth/login", "/auth/signup"];

#[derive(Clone)]
pub struct AuthMiddleware {
    jwt_service: Arc<JwtService>,
    sessions: SessionStore,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService, sessions: SessionStore) -> Self {
        Self {
            jwt_service: Arc::new(jwt_service),
            sessions,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<actix_web::body::EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Arc::new(service),
            jwt_service: self.jwt_service.clone(),
            sessions: self.sessions.clone(),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Arc<S>,
    jwt_service: Arc<JwtService>,
    sessions: SessionStore,
}

#[derive(Debug)]
enum AuthError {
    NoAuthHeader,
    InvalidHeaderFormat,
    NotBearerToken,
    VerificationFailed(String),
    UnknownSession,
}

impl AuthError {
    fn log_message(&self, path: &str) -> String {
        match self {
            AuthError::NoAuthHeader => format!("No Authorization header found for path: {}", path),
            AuthError::InvalidHeaderFormat => format!("Invalid Authorization header format (non-UTF-8) for path: {}", path),
            AuthError::NotBearerToken => format!("Authorization header for path {} doesn't start with 'Bearer '", path),
            AuthError::VerificationFailed(e) => format!("JWT token verification failed for path {}: {}", path, e),
            AuthError::UnknownSession => format!("Token for path {} refers to a closed session", path),
        }
    }

    fn client_error(&self) -> ApiError {
        let message = match self {
            AuthError::VerificationFailed(_) => "Token verification failed",
            AuthError::UnknownSession => "Session has ended, please log in again",
            _ => "Missing or invalid authorization token",
        };
        ApiError::Unauthorized(message.to_string())
    }
}

fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

fn validate_request_token(
    req: &ServiceRequest,
    jwt_service: &JwtService,
    sessions: &SessionStore,
) -> Result<SessionPrincipal, AuthError> {
    let auth_header = req.headers().get("Authorization").ok_or(AuthError::NoAuthHeader)?;
    let auth_str = auth_header.to_str().map_err(|_| AuthError::InvalidHeaderFormat)?;
    let token = auth_str.strip_prefix("Bearer ").ok_or(AuthError::NotBearerToken)?;

    let claims = jwt_service
        .verify_token(token)
        .map_err(|e| AuthError::VerificationFailed(e.to_string()))?;

    // The session is authoritative: logout invalidates still-unexpired tokens.
    let identity = sessions
        .identity(claims.sid)
        .ok_or(AuthError::UnknownSession)?;

    Ok(SessionPrincipal {
        session_id: claims.sid,
        identity,
    })
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<actix_web::body::EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let jwt_service = self.jwt_service.clone();
        let sessions = self.sessions.clone();

        Box::pin(async move {
            let path_str = req.path().to_string();

            if is_public(&path_str) {
                let res = service.call(req).await?;
                return Ok(res.map_into_left_body());
            }
            log::debug!("Auth middleware processing path: {}", &path_str);

            match validate_request_token(&req, &jwt_service, &sessions) {
                Ok(principal) => {
                    req.extensions_mut().insert(principal);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(auth_error) => {
                    log::warn!("{}", auth_error.log_message(&path_str));

                    let (http_req, _payload) = req.into_parts();
                    let response = HttpResponse::Unauthorized()
                        .json(auth_error.client_error().body())
                        .map_into_right_body();
                    Ok(ServiceResponse::new(http_req, response))
                }
            }
        })
    }
}

/// The signed-in doctor for this request. Refuses with 401 when the request
/// did not pass through [`AuthMiddleware`].
pub struct AuthenticatedUser(pub SessionPrincipal);

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<SessionPrincipal>() {
            Some(principal) => ok(AuthenticatedUser(principal.clone())),
            None => {
                log::warn!("No authenticated session for path: {}", req.path());
                err(ApiError::Unauthorized(
                    "Missing or invalid authorization token".to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_login_signup_and_health_are_public() {
        assert!(is_public("/health"));
        assert!(is_public("/auth/login"));
        assert!(is_public("/auth/signup"));
        assert!(!is_public("/auth/logout"));
        assert!(!is_public("/api/predict"));
        assert!(!is_public("/auth/login/extra"));
    }
}
