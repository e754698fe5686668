use thiserror::Error;

use crate::assistant::{AssistantError, Message, Role};
use crate::engine::reply::{self, Block};

pub const GREETING: &str = "مرحباً! أنا مساعدك الأكاديمي في علم النفس الدينامي والقياس النفسي. \
اسألني عن أي مفهوم، أو اطلب أسئلة تدريبية على إحدى المحاضرات.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("waiting for the assistant")]
    Busy,
    #[error("message is empty")]
    EmptyMessage,
    #[error("no failed request to retry")]
    NothingToRetry,
}

/// Conversation state between the user and the assistant.
///
/// A request is split in two halves so the call itself can run elsewhere:
/// [`submit`](Self::submit) hands out the history to send, and
/// [`receive`](Self::receive) records whatever came back.
pub struct ChatSession {
    transcript: Vec<Message>,
    busy: bool,
    last_error: Option<String>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            transcript: vec![Message::assistant(GREETING)],
            busy: false,
            last_error: None,
        }
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn can_retry(&self) -> bool {
        !self.busy && self.last_error.is_some()
    }

    pub fn submit(&mut self, text: &str) -> Result<Vec<Message>, ChatError> {
        if self.busy {
            return Err(ChatError::Busy);
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        self.transcript.push(Message::user(text));
        self.begin_request()
    }

    /// Resend the unchanged transcript after a failure.
    pub fn retry(&mut self) -> Result<Vec<Message>, ChatError> {
        if self.busy {
            return Err(ChatError::Busy);
        }
        if self.last_error.is_none() {
            return Err(ChatError::NothingToRetry);
        }
        self.begin_request()
    }

    fn begin_request(&mut self) -> Result<Vec<Message>, ChatError> {
        self.busy = true;
        self.last_error = None;
        Ok(self.transcript.clone())
    }

    pub fn receive(&mut self, result: Result<String, AssistantError>) {
        self.busy = false;
        match result {
            Ok(reply) => self.transcript.push(Message::assistant(reply)),
            Err(e) => {
                tracing::warn!("assistant request failed: {e}");
                self.last_error = Some(e.to_string());
            }
        }
    }

    /// Number of practice questions across all assistant replies, in
    /// transcript order.
    pub fn quiz_count(&self) -> usize {
        self.transcript
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .flat_map(|m| reply::parse(&m.content))
            .filter(|b| matches!(b, Block::Quiz(_)))
            .count()
    }
}
