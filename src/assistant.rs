use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

pub const SYSTEM_PROMPT: &str = "You are an academic assistant for a university course on \
dynamic psychology and psychological measurement (Freud's structural model, defence \
mechanisms, psychosexual stages, Maslow, Rogers, test theory, projective tests). Answer in \
the language of the question, in clear academic style. Use **bold** lines for headings and \
'- ' for bullet points. When asked for practice questions, write each one as:\n\
س1: <question>\n\
أ) <option>\n\
ب) <option>\n\
ج) <option>\n\
د) <option>\n\
الإجابة الصحيحة: <letter>\n\
الشرح الأكاديمي: <explanation>";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("the assistant is not configured")]
    Disabled,
    #[error("the assistant returned an empty response")]
    EmptyResponse,
    #[error("assistant request failed with status {0}")]
    HttpStatus(u16),
    #[cfg(feature = "network")]
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Turns a conversation into the next assistant reply. Blocking.
pub trait Assistant: Send + Sync {
    fn reply(&self, history: &[Message]) -> Result<String, AssistantError>;

    fn is_enabled(&self) -> bool {
        true
    }
}

/// Used when no API key is configured or the app runs with `--offline`.
pub struct OfflineAssistant;

impl Assistant for OfflineAssistant {
    fn reply(&self, _history: &[Message]) -> Result<String, AssistantError> {
        Err(AssistantError::Disabled)
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

fn build_request<'a>(model: &'a str, history: &'a [Message]) -> ChatRequest<'a> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(ChatMessage {
        role: "system",
        content: SYSTEM_PROMPT,
    });
    messages.extend(history.iter().map(|m| ChatMessage {
        role: match m.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        },
        content: &m.content,
    }));
    ChatRequest {
        model,
        messages,
        temperature: 0.4,
    }
}

fn first_choice(body: ChatResponse) -> Result<String, AssistantError> {
    body.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(AssistantError::EmptyResponse)
}

/// OpenAI-compatible `/chat/completions` client.
#[cfg(feature = "network")]
pub struct HttpAssistant {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[cfg(feature = "network")]
impl HttpAssistant {
    pub fn new(config: &Config, api_key: String) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.assistant_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.assistant_base_url.trim_end_matches('/').to_string(),
            model: config.assistant_model.clone(),
            api_key,
        })
    }
}

#[cfg(feature = "network")]
impl Assistant for HttpAssistant {
    fn reply(&self, history: &[Message]) -> Result<String, AssistantError> {
        let url = format!("{}/chat/completions", self.base_url);
        let payload = build_request(&self.model, history);
        tracing::debug!(messages = payload.messages.len(), model = %self.model, "assistant request");

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()?;
        if !response.status().is_success() {
            return Err(AssistantError::HttpStatus(response.status().as_u16()));
        }
        first_choice(response.json()?)
    }
}

/// Pick the assistant implementation for this run.
pub fn from_config(config: &Config, offline: bool) -> Arc<dyn Assistant> {
    if offline {
        tracing::info!("assistant disabled by --offline");
        return Arc::new(OfflineAssistant);
    }
    let Some(api_key) = config.assistant_api_key() else {
        tracing::info!(
            env = %config.assistant_api_key_env,
            "no assistant API key set; chat is offline"
        );
        return Arc::new(OfflineAssistant);
    };
    connect(config, api_key)
}

#[cfg(feature = "network")]
fn connect(config: &Config, api_key: String) -> Arc<dyn Assistant> {
    match HttpAssistant::new(config, api_key) {
        Ok(assistant) => Arc::new(assistant),
        Err(e) => {
            tracing::warn!("failed to build assistant client: {e:#}");
            Arc::new(OfflineAssistant)
        }
    }
}

#[cfg(not(feature = "network"))]
fn connect(_config: &Config, _api_key: String) -> Arc<dyn Assistant> {
    tracing::info!("built without the network feature; chat is offline");
    Arc::new(OfflineAssistant)
}
