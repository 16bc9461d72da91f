use std::path::PathBuf;
use std::sync::Arc;

use actix_web::{App, http::StatusCode, test};
use backend::auth::{CredentialStore, JwtService};
use backend::chat::{ChatError, CompletionService};
use backend::cleanup::CleanupScheduler;
use backend::config::{CleanupSettings, OrganizationInfo};
use backend::model::ModelRegistry;
use backend::pipeline::PredictionPipeline;
use backend::routes::AppState;
use backend::session::SessionStore;
use backend::storage::ArtifactStore;
use futures::future::BoxFuture;
use serde_json::{Value, json};
use shared::{AuthResponse, ChatTurn, PredictResponse};

struct FailingChat;

impl CompletionService for FailingChat {
    fn complete<'a>(&'a self, _conversation: &'a [ChatTurn]) -> BoxFuture<'a, Result<String, ChatError>> {
        Box::pin(async {
            Err(ChatError::Api {
                status: 500,
                message: "upstream unavailable".into(),
            })
        })
    }
}

fn models_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("models")
}

fn state(dir: &std::path::Path) -> AppState {
    let registry = ModelRegistry::load_from_dir(&models_dir()).expect("shipped models load");
    AppState {
        pipeline: PredictionPipeline::new(
            registry,
            ArtifactStore::new(dir.join("reports"), dir.join("reports/charts")),
            OrganizationInfo::default(),
            CleanupScheduler::start(),
            CleanupSettings::default(),
        ),
        sessions: SessionStore::new(),
        credentials: CredentialStore::new(),
        jwt: JwtService::new("test-secret"),
        chat: Arc::new(FailingChat),
    }
}

macro_rules! app {
    ($state:expr) => {{
        let state = $state.clone();
        test::init_service(
            App::new()
                .wrap(state.auth_middleware())
                .configure(|cfg| state.configure(cfg)),
        )
        .await
    }};
}

fn signup_body(email: &str) -> Value {
    json!({
        "email": email,
        "password": "correct horse",
        "doctor_id": "DOC-42",
        "organization_id": "ORG-7"
    })
}

fn predict_body(name: &str) -> Value {
    json!({
        "disease": "diabetes",
        "patient": {"name": name, "age": 52, "sex": "Female"},
        "values": [2.0, 148.0, 72.0, 35.0, 0.0, 33.6, 0.627, 50.0]
    })
}

fn pdf_count(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir.join("reports"))
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter(|e| e.path().extension().is_some_and(|x| x == "pdf"))
                .count()
        })
        .unwrap_or(0)
}

#[actix_web::test]
async fn health_is_public() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app!(state(tmp.path()));
    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn protected_routes_require_a_token() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app!(state(tmp.path()));

    let req = test::TestRequest::post()
        .uri("/api/predict")
        .set_json(predict_body("Jane Doe"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "unauthorized");

    let req = test::TestRequest::get()
        .uri("/api/diseases")
        .insert_header(("Authorization", "Bearer not.a.token"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(pdf_count(tmp.path()), 0);
}

#[actix_web::test]
async fn signup_login_logout_flow() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app!(state(tmp.path()));

    let req = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(signup_body("doc@clinic.org"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(signup_body("doc@clinic.org"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({"email": "doc@clinic.org", "password": "wrong"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid email or password");

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({"email": "doc@clinic.org", "password": "correct horse"}))
        .to_request();
    let auth: AuthResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(auth.doctor.doctor_id, "DOC-42");
    let bearer = format!("Bearer {}", auth.token);

    let req = test::TestRequest::get()
        .uri("/auth/me")
        .insert_header(("Authorization", bearer.as_str()))
        .to_request();
    let me: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(me["organization_id"], "ORG-7");

    let req = test::TestRequest::get()
        .uri("/api/diseases")
        .insert_header(("Authorization", bearer.as_str()))
        .to_request();
    let diseases: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(diseases.as_array().map(Vec::len), Some(4));

    let req = test::TestRequest::post()
        .uri("/auth/logout")
        .insert_header(("Authorization", bearer.as_str()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    // Token is still unexpired, but its session is gone.
    let req = test::TestRequest::get()
        .uri("/auth/me")
        .insert_header(("Authorization", bearer.as_str()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

macro_rules! signed_up_token {
    ($app:expr, $email:expr) => {{
        let req = test::TestRequest::post()
            .uri("/auth/signup")
            .set_json(signup_body($email))
            .to_request();
        let auth: AuthResponse = test::call_and_read_body_json($app, req).await;
        format!("Bearer {}", auth.token)
    }};
}

#[actix_web::test]
async fn prediction_produces_a_downloadable_report() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app!(state(tmp.path()));
    let bearer = signed_up_token!(&app, "doc@clinic.org");

    let req = test::TestRequest::post()
        .uri("/api/predict")
        .insert_header(("Authorization", bearer.as_str()))
        .set_json(predict_body("Jane Doe"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let outcome: PredictResponse = test::read_body_json(resp).await;

    assert!(outcome.headline.starts_with("Diabetes Prediction: "));
    let risk = outcome.result.risk_percent().expect("logistic model yields a probability");
    assert!((0.0..=100.0).contains(&risk));
    assert!(!outcome.recommendation.is_empty());
    assert!(outcome.report.file_name.starts_with("Jane_Doe_Medical_Report_"));

    let req = test::TestRequest::get()
        .uri(&outcome.report.download_url)
        .insert_header(("Authorization", bearer.as_str()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = test::read_body(resp).await;
    assert!(bytes.starts_with(b"%PDF"));

    // Another doctor cannot fetch it.
    let other = signed_up_token!(&app, "other@clinic.org");
    let req = test::TestRequest::get()
        .uri(&outcome.report.download_url)
        .insert_header(("Authorization", other.as_str()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn heart_disease_without_probabilities_still_reports() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app!(state(tmp.path()));
    let bearer = signed_up_token!(&app, "doc@clinic.org");

    let req = test::TestRequest::post()
        .uri("/api/predict")
        .insert_header(("Authorization", bearer.as_str()))
        .set_json(json!({
            "disease": "heart_disease",
            "patient": {"name": "Bob", "age": 63, "sex": "Male"},
            "values": [63.0, 1.0, 3.0, 145.0, 233.0, 1.0, 0.0, 150.0, 0.0, 2.3, 0.0, 0.0, 1.0]
        }))
        .to_request();
    let outcome: PredictResponse = test::call_and_read_body_json(&app, req).await;
    assert!(outcome.result.risk_percent().is_none());
    assert!(outcome.gauge_svg.is_none());
    assert_eq!(
        outcome.risk_message.as_deref(),
        Some("Risk probability data not available for this model.")
    );
    assert_eq!(pdf_count(tmp.path()), 1);
}

#[actix_web::test]
async fn missing_patient_name_is_rejected_without_writing_files() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app!(state(tmp.path()));
    let bearer = signed_up_token!(&app, "doc@clinic.org");

    let req = test::TestRequest::post()
        .uri("/api/predict")
        .insert_header(("Authorization", bearer.as_str()))
        .set_json(predict_body("   "))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Patient name is required");
    assert_eq!(pdf_count(tmp.path()), 0);

    let mut short = predict_body("Jane");
    short["values"] = json!([1.0, 2.0]);
    let req = test::TestRequest::post()
        .uri("/api/predict")
        .insert_header(("Authorization", bearer.as_str()))
        .set_json(short)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    assert_eq!(pdf_count(tmp.path()), 0);
}

#[actix_web::test]
async fn chat_failure_is_recorded_as_assistant_turn() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app!(state(tmp.path()));
    let bearer = signed_up_token!(&app, "doc@clinic.org");

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .insert_header(("Authorization", bearer.as_str()))
        .set_json(json!({"message": "What is HbA1c?"}))
        .to_request();
    let reply: ChatTurn = test::call_and_read_body_json(&app, req).await;
    assert!(reply.content.starts_with("⚠️ Error generating response: "));

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .insert_header(("Authorization", bearer.as_str()))
        .set_json(json!({"message": "  "}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/api/chat")
        .insert_header(("Authorization", bearer.as_str()))
        .to_request();
    let history: Value = test::call_and_read_body_json(&app, req).await;
    let turns = history["turns"].as_array().cloned().unwrap_or_default();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0]["role"], "user");
    assert_eq!(turns[0]["content"], "What is HbA1c?");
    assert_eq!(turns[1]["role"], "assistant");

    let req = test::TestRequest::delete()
        .uri("/api/chat")
        .insert_header(("Authorization", bearer.as_str()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri("/api/chat")
        .insert_header(("Authorization", bearer.as_str()))
        .to_request();
    let history: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(history["turns"].as_array().map(Vec::len), Some(0));
}
