//! Conversational Q&A over the uploaded material.

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::is_cancelled;
use crate::model::Message;
use crate::notify::Notifier;
use crate::traits::LearningApi;

/// Append-only chat log backed by the `/qa` endpoint.
#[derive(Debug, Default)]
pub struct QaPanel {
    messages: Vec<Message>,
}

impl QaPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Ask one question.
    ///
    /// Blank input is ignored (`Ok(None)`). The user message is logged before
    /// the request goes out; the reply is logged only if it arrives. A failed
    /// call leaves the user message without an answer.
    pub async fn ask(
        &mut self,
        question: &str,
        api: &dyn LearningApi,
        notifier: &dyn Notifier,
        cancel: &CancellationToken,
    ) -> Result<Option<String>> {
        if question.trim().is_empty() {
            return Ok(None);
        }

        self.messages.push(Message::user(question));
        info!(turn = self.messages.len(), "asking question");

        match api.ask(question, cancel).await {
            Ok(answer) => {
                self.messages.push(Message::assistant(answer.clone()));
                Ok(Some(answer))
            }
            Err(e) if is_cancelled(&e) => Err(e),
            Err(e) => {
                warn!("question failed: {e:#}");
                notifier.error("Failed to get an answer");
                Err(e)
            }
        }
    }
}
