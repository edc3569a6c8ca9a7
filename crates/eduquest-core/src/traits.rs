//! The learning API contract.
//!
//! The EduQuest backend does all of the heavy lifting (chunking, embeddings,
//! question generation, open-ended scoring). Components talk to it through
//! [`LearningApi`], implemented over HTTP by `eduquest-client`.
//!
//! Every call takes a [`CancellationToken`]. Implementations resolve a
//! cancelled call to [`ApiError::Cancelled`](crate::error::ApiError::Cancelled)
//! and callers drop the result without touching their state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::model::{CourseDocument, Preferences, Question, UploadReceipt};

/// Trait for backends that serve the learning workflow.
#[async_trait]
pub trait LearningApi: Send + Sync {
    /// Base URL requests are sent to (for diagnostics).
    fn base_url(&self) -> &str;

    /// `POST /documents`: upload a plain-text document.
    async fn upload_document(
        &self,
        request: &UploadRequest,
        cancel: &CancellationToken,
    ) -> anyhow::Result<UploadReceipt>;

    /// `GET /documents/latest`: fetch the most recent document.
    async fn latest_document(&self, cancel: &CancellationToken) -> anyhow::Result<CourseDocument>;

    /// `POST /qa`: answer a question about the uploaded material.
    async fn ask(&self, question: &str, cancel: &CancellationToken) -> anyhow::Result<String>;

    /// `POST /generate-notes`: generate course notes for the preferences.
    async fn generate_notes(
        &self,
        preferences: &Preferences,
        cancel: &CancellationToken,
    ) -> anyhow::Result<String>;

    /// `POST /generate-assessment`: generate a question set.
    async fn generate_assessment(
        &self,
        preferences: &Preferences,
        cancel: &CancellationToken,
    ) -> anyhow::Result<Vec<Question>>;

    /// `POST /score-answer`: score one open-ended answer, 0 to 100.
    async fn score_answer(
        &self,
        request: &ScoreRequest,
        cancel: &CancellationToken,
    ) -> anyhow::Result<f64>;
}

/// A document upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRequest {
    /// File name reported to the server.
    pub file_name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
    /// Preferences sent alongside the file, if any.
    #[serde(default)]
    pub preferences: Option<Preferences>,
}

/// Request to score an open-ended answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    pub model_answer: String,
    pub student_answer: String,
}
