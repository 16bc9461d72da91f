use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use shared::ChatTurn;
use url::Url;

use super::{ChatError, CompletionService, role_label};
use crate::config::GeminiConfig;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Client for the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiService {
    http_client: HttpClient,
    api_key: String,
    endpoint: Url,
}

impl GeminiService {
    pub fn new(
        api_key: String,
        model: &str,
        base_url: &Url,
        timeout: Duration,
    ) -> Result<Self, ChatError> {
        Ok(Self {
            http_client: HttpClient::builder().timeout(timeout).build()?,
            api_key,
            endpoint: endpoint(base_url, model)?,
        })
    }

    /// `None` when no API key is configured.
    pub fn from_config(config: &GeminiConfig) -> Result<Option<Self>, ChatError> {
        match &config.api_key {
            Some(key) => {
                Self::new(key.clone(), &config.model, &config.base_url, config.timeout).map(Some)
            }
            None => Ok(None),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn generate(&self, conversation: &[ChatTurn]) -> Result<String, ChatError> {
        let body = GenerateRequest {
            contents: conversation
                .iter()
                .map(|turn| Content {
                    role: role_label(turn.role),
                    parts: [Part {
                        text: &turn.content,
                    }],
                })
                .collect(),
        };

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            let message = serde_json::from_str::<ApiErrorBody>(&error_text)
                .map(|b| b.error.message)
                .unwrap_or(error_text);
            return Err(ChatError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        extract_text(parsed)
    }
}

fn endpoint(base_url: &Url, model: &str) -> Result<Url, ChatError> {
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(&format!("v1beta/models/{}:generateContent", model))?)
}

fn extract_text(response: GenerateResponse) -> Result<String, ChatError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        Err(ChatError::EmptyResponse)
    } else {
        Ok(text)
    }
}

impl CompletionService for GeminiService {
    fn complete<'a>(&'a self, conversation: &'a [ChatTurn]) -> BoxFuture<'a, Result<String, ChatError>> {
        Box::pin(self.generate(conversation))
    }
}
