//! Subcommands. Each screen of the platform is one module.

pub mod admin;
pub mod assessment;
pub mod init;
pub mod landing;
pub mod reset;
pub mod student;
pub mod study;

use std::path::{Path, PathBuf};

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use eduquest_client::config::load_config_from;
use eduquest_client::{create_api, EduquestConfig, HttpLearningApi};
use eduquest_core::session::SessionStore;

/// What every screen needs: configuration, the session file and the root
/// cancellation token.
pub struct Context {
    pub config: EduquestConfig,
    pub session_path: PathBuf,
    pub cancel: CancellationToken,
}

impl Context {
    /// Load configuration and apply command-line overrides.
    pub fn load(
        config_path: Option<&Path>,
        api_url: Option<String>,
        session_path: Option<PathBuf>,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let mut config = load_config_from(config_path)?;
        if let Some(url) = api_url {
            config.api.base_url = Some(url);
        }
        let session_path = session_path.unwrap_or_else(|| config.session_path.clone());
        Ok(Self {
            config,
            session_path,
            cancel,
        })
    }

    pub fn api(&self) -> Result<HttpLearningApi> {
        create_api(&self.config)
    }

    pub fn session(&self) -> Result<SessionStore> {
        SessionStore::open(&self.session_path)
    }
}

/// Print a screen heading.
fn heading(title: &str) {
    println!("{title}");
    println!("{}", "=".repeat(title.chars().count()));
}
