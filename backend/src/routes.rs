use std::sync::Arc;

use actix_files::NamedFile;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;
use shared::{
    ChatHistoryResponse, ChatRequest, Disease, DiseaseSchema, PredictRequest, PredictResponse,
    ReportLink,
};
use strum::IntoEnumIterator;

use crate::auth::routes::{login, logout, me, signup};
use crate::auth::{AuthMiddleware, AuthenticatedUser, CredentialStore, JwtService};
use crate::chat::CompletionService;
use crate::error::ApiError;
use crate::pipeline::PredictionPipeline;
use crate::session::SessionStore;

/// Shared services handed to every worker.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: PredictionPipeline,
    pub sessions: SessionStore,
    pub credentials: CredentialStore,
    pub jwt: JwtService,
    pub chat: Arc<dyn CompletionService>,
}

impl AppState {
    pub fn auth_middleware(&self) -> AuthMiddleware {
        AuthMiddleware::new(self.jwt.clone(), self.sessions.clone())
    }

    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.pipeline.clone()))
            .app_data(web::Data::new(self.sessions.clone()))
            .app_data(web::Data::new(self.credentials.clone()))
            .app_data(web::Data::new(self.jwt.clone()))
            .app_data(web::Data::from(self.chat.clone()));
        configure_routes(cfg);
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(health)))
        .service(
            web::scope("/auth")
                .route("/signup", web::post().to(signup))
                .route("/login", web::post().to(login))
                .route("/logout", web::post().to(logout))
                .route("/me", web::get().to(me)),
        )
        .service(
            web::scope("/api")
                .route("/diseases", web::get().to(list_diseases))
                .route("/predict", web::post().to(predict))
                .route("/reports/{file_name}", web::get().to(download_report))
                .service(
                    web::resource("/chat")
                        .route(web::get().to(chat_history))
                        .route(web::post().to(send_chat))
                        .route(web::delete().to(clear_chat)),
                ),
        );
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({"status": "ok"}))
}

async fn list_diseases(_user: AuthenticatedUser) -> HttpResponse {
    let schemas: Vec<DiseaseSchema> = Disease::iter().map(DiseaseSchema::for_disease).collect();
    HttpResponse::Ok().json(schemas)
}

async fn predict(
    user: AuthenticatedUser,
    body: web::Json<PredictRequest>,
    pipeline: web::Data<PredictionPipeline>,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, ApiError> {
    let principal = user.0;
    let request = body.into_inner();
    let doctor = principal.identity.clone();
    let runner = pipeline.clone();

    let outcome = web::block(move || runner.run(&doctor, &request)).await??;

    let granted = sessions.with_session(principal.session_id, |s| {
        s.grant_report(outcome.report_file.clone())
    });
    if granted.is_none() {
        log::warn!("Session ended before report {} was issued", outcome.report_file);
    }

    let response = PredictResponse {
        headline: outcome.result.headline(),
        risk_message: outcome.risk_message.map(str::to_string),
        recommendation: outcome.recommendation.to_string(),
        gauge_svg: outcome.gauge_svg,
        inputs_svg: outcome.inputs_svg,
        report: ReportLink {
            download_url: format!("/api/reports/{}", outcome.report_file),
            file_name: outcome.report_file,
        },
        result: outcome.result,
    };
    Ok(HttpResponse::Ok().json(response))
}

async fn download_report(
    req: HttpRequest,
    user: AuthenticatedUser,
    path: web::Path<String>,
    pipeline: web::Data<PredictionPipeline>,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, ApiError> {
    let file_name = path.into_inner();
    let owned = sessions
        .with_session(user.0.session_id, |s| s.owns_report(&file_name))
        .unwrap_or(false);
    if !owned {
        log::warn!("{} requested unknown report {}", user.0.identity.email, file_name);
        return Err(ApiError::NotFound("Report not found".to_string()));
    }

    let report_path = pipeline.store().resolve_report(&file_name)?;
    let file = NamedFile::open(&report_path)
        .map_err(|e| ApiError::Internal(format!("Failed to open report: {}", e)))?
        .set_content_disposition(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file_name.clone())],
        });

    pipeline
        .scheduler()
        .schedule([report_path], pipeline.cleanup().grace());
    log::info!("Report {} downloaded", file_name);
    Ok(file.into_response(&req))
}

async fn chat_history(
    user: AuthenticatedUser,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, ApiError> {
    let turns = sessions
        .with_session(user.0.session_id, |s| s.chat.turns().to_vec())
        .ok_or_else(session_ended)?;
    Ok(HttpResponse::Ok().json(ChatHistoryResponse { turns }))
}

async fn send_chat(
    user: AuthenticatedUser,
    body: web::Json<ChatRequest>,
    sessions: web::Data<SessionStore>,
    service: web::Data<dyn CompletionService>,
) -> Result<HttpResponse, ApiError> {
    let session_id = user.0.session_id;
    let exchange = sessions
        .with_session(session_id, |s| s.chat.begin(&body.message))
        .ok_or_else(session_ended)??;

    let outcome = service.complete(&exchange.conversation).await;

    let reply = sessions
        .with_session(session_id, |s| s.chat.finish(exchange, outcome))
        .ok_or_else(session_ended)?;
    Ok(HttpResponse::Ok().json(reply))
}

async fn clear_chat(
    user: AuthenticatedUser,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, ApiError> {
    sessions
        .with_session(user.0.session_id, |s| s.chat.clear())
        .ok_or_else(session_ended)?;
    Ok(HttpResponse::NoContent().finish())
}

fn session_ended() -> ApiError {
    ApiError::Unauthorized("Session has ended, please log in again".to_string())
}
