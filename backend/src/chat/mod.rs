//! Doctor's assistant chat.
//!
//! A [`ChatHistory`] belongs to one session. Each exchange is split into
//! [`ChatHistory::begin`] and [`ChatHistory::finish`] so the owner can
//! release its lock while the completion request is in flight.

pub mod gemini;

use futures::future::BoxFuture;
use shared::{ChatRole, ChatTurn};

pub use gemini::GeminiService;

pub const SYSTEM_PROMPT: &str = "You are a highly professional medical assistant AI helping doctors. \
                                 Provide accurate, concise, and evidence-based medical advice. \
                                 If unsure, recommend consulting a specialist.";

pub const ERROR_PREFIX: &str = "⚠️ Error generating response: ";

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Message must not be empty")]
    EmptyMessage,
    #[error("chat assistant is not configured (GEMINI_API_KEY is unset)")]
    NotConfigured,
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("URL parsing failed: {0}")]
    Url(#[from] url::ParseError),
    #[error("completion API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("completion API returned no text")]
    EmptyResponse,
}

/// Text completion over a whole conversation. The last turn is the new
/// prompt.
pub trait CompletionService: Send + Sync {
    fn complete<'a>(&'a self, conversation: &'a [ChatTurn]) -> BoxFuture<'a, Result<String, ChatError>>;
}

/// Installed when no API key is configured; every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredService;

impl CompletionService for UnconfiguredService {
    fn complete<'a>(&'a self, _conversation: &'a [ChatTurn]) -> BoxFuture<'a, Result<String, ChatError>> {
        Box::pin(async { Err(ChatError::NotConfigured) })
    }
}

pub fn error_reply(err: &ChatError) -> String {
    format!("{}{}", ERROR_PREFIX, err)
}

#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    turns: Vec<ChatTurn>,
    // What the model has actually seen: prompts as sent and its own replies.
    context: Vec<ChatTurn>,
}

/// An exchange started by [`ChatHistory::begin`].
#[derive(Debug, Clone)]
pub struct PendingExchange {
    pub conversation: Vec<ChatTurn>,
}

impl PendingExchange {
    fn prompt(&self) -> Option<&ChatTurn> {
        self.conversation.last()
    }
}

impl ChatHistory {
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
        self.context.clear();
    }

    /// Records the user's message and returns the conversation to send.
    pub fn begin(&mut self, input: &str) -> Result<PendingExchange, ChatError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        self.turns.push(ChatTurn::user(input));

        let mut conversation = self.context.clone();
        conversation.push(ChatTurn::user(format!("{}\n\n{}", SYSTEM_PROMPT, input)));
        Ok(PendingExchange { conversation })
    }

    /// Appends the assistant turn for a completed exchange and returns it.
    /// Failures become an assistant turn carrying the error text.
    pub fn finish(
        &mut self,
        exchange: PendingExchange,
        outcome: Result<String, ChatError>,
    ) -> ChatTurn {
        let reply = match outcome {
            Ok(text) => {
                let text = text.trim().to_string();
                if let Some(prompt) = exchange.prompt() {
                    self.context.push(prompt.clone());
                    self.context.push(ChatTurn::assistant(text.clone()));
                }
                ChatTurn::assistant(text)
            }
            Err(err) => {
                log::warn!("Chat completion failed: {}", err);
                ChatTurn::assistant(error_reply(&err))
            }
        };
        self.turns.push(reply.clone());
        reply
    }
}

/// Runs one exchange against a history the caller owns outright.
pub async fn send(
    history: &mut ChatHistory,
    service: &dyn CompletionService,
    input: &str,
) -> Result<ChatTurn, ChatError> {
    let exchange = history.begin(input)?;
    let outcome = service.complete(&exchange.conversation).await;
    Ok(history.finish(exchange, outcome))
}

pub fn role_label(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Assistant => "model",
    }
}
