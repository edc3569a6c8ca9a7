//! Document intake for the admin flow.
//!
//! Only plain-text files are accepted, judged by their *declared* MIME type.
//! The declared type comes from the file extension (or an explicit override),
//! the same way a browser fills in `File.type`; the bytes are never sniffed.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::is_cancelled;
use crate::model::{Preferences, UploadedDocument};
use crate::notify::Notifier;
use crate::progress::{play_steps, ProgressStep};
use crate::traits::{LearningApi, UploadRequest};

pub const PLAIN_TEXT: &str = "text/plain";

/// Scripted progress shown while an upload is pending.
pub const UPLOAD_STEPS: [ProgressStep; 5] = [
    ProgressStep {
        percent: 20,
        status: "Parsing document...",
    },
    ProgressStep {
        percent: 40,
        status: "Chunking content...",
    },
    ProgressStep {
        percent: 60,
        status: "Generating embeddings...",
    },
    ProgressStep {
        percent: 80,
        status: "Storing in vector database...",
    },
    ProgressStep {
        percent: 90,
        status: "Generating course notes...",
    },
];
const UPLOAD_COMPLETE: ProgressStep = ProgressStep {
    percent: 100,
    status: "Processing complete!",
};

/// Why a file could not be taken in.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntakeError {
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("no file selected")]
    NoFileSelected,
    #[error("file is not valid UTF-8 text: {0}")]
    NotUtf8(String),
}

/// A file picked by the user, with its declared MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    /// Read a file from disk. The declared type is `mime_override` when given,
    /// otherwise whatever the extension implies.
    pub fn from_path(path: &Path, mime_override: Option<&str>) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.txt".to_string());
        let mime_type = mime_override
            .map(str::to_string)
            .unwrap_or_else(|| declared_mime_type(path).to_string());
        Ok(Self {
            name,
            mime_type,
            bytes,
        })
    }
}

/// MIME type implied by a file extension.
pub fn declared_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "txt" | "text" => PLAIN_TEXT,
        "md" | "markdown" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// Tunables for the intake.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Delay between scripted progress steps.
    pub step_delay: Duration,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            step_delay: Duration::from_millis(1000),
        }
    }
}

/// Single-file upload screen.
#[derive(Debug, Default)]
pub struct DocumentIntake {
    config: IntakeConfig,
    selected: Option<SelectedFile>,
}

impl DocumentIntake {
    pub fn new(config: IntakeConfig) -> Self {
        Self {
            config,
            selected: None,
        }
    }

    /// Pick a file. Anything not declared `text/plain` is refused and the
    /// previous selection is kept.
    pub fn select(&mut self, file: SelectedFile, notifier: &dyn Notifier) -> Result<(), IntakeError> {
        let declared = file.mime_type.trim().to_ascii_lowercase();
        if declared != PLAIN_TEXT {
            notifier.error("Please upload a .txt file");
            return Err(IntakeError::UnsupportedType(file.mime_type));
        }
        debug!(name = %file.name, bytes = file.bytes.len(), "file selected");
        self.selected = Some(file);
        Ok(())
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    /// Send the selected file to the API.
    ///
    /// Scripted progress runs alongside the request. On failure the user is
    /// notified and the selection is left as it was.
    pub async fn upload(
        &self,
        api: &dyn LearningApi,
        preferences: Option<&Preferences>,
        notifier: &dyn Notifier,
        cancel: &CancellationToken,
    ) -> Result<UploadedDocument> {
        let Some(file) = &self.selected else {
            notifier.error("Please select a file first");
            return Err(IntakeError::NoFileSelected.into());
        };

        let text = match String::from_utf8(file.bytes.clone()) {
            Ok(text) => text,
            Err(e) => {
                notifier.error("Error processing file");
                return Err(IntakeError::NotUtf8(e.to_string()).into());
            }
        };

        let request = UploadRequest {
            file_name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            bytes: file.bytes.clone(),
            preferences: preferences.cloned(),
        };

        info!(name = %file.name, "uploading document");
        let steps = play_steps(&UPLOAD_STEPS, self.config.step_delay, notifier, cancel);
        tokio::pin!(steps);
        let upload = api.upload_document(&request, cancel);
        tokio::pin!(upload);

        let mut steps_done = false;
        let result = loop {
            tokio::select! {
                r = &mut upload => break r,
                _ = &mut steps, if !steps_done => steps_done = true,
            }
        };

        match result {
            Ok(receipt) => {
                if !steps_done {
                    steps.await;
                }
                notifier.progress(UPLOAD_COMPLETE.percent, UPLOAD_COMPLETE.status);
                notifier.success("Document processed successfully!");
                Ok(UploadedDocument {
                    file_name: file.name.clone(),
                    text,
                    receipt,
                })
            }
            Err(e) if is_cancelled(&e) => Err(e),
            Err(e) => {
                warn!("document upload failed: {e:#}");
                notifier.error("Error processing file");
                Err(e)
            }
        }
    }
}
