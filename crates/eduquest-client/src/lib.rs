//! eduquest-client — HTTP access to the EduQuest learning API.
//!
//! Implements the `LearningApi` trait over HTTP, loads client configuration,
//! and ships a mock implementation for tests.

pub mod config;
pub mod http;
pub mod mock;

pub use config::{create_api, EduquestConfig};
pub use eduquest_core::error::ApiError;
pub use http::HttpLearningApi;
