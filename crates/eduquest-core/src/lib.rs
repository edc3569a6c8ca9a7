//! eduquest-core — Learning wizard state, API contract, and scoring.
//!
//! This crate defines the data model, the [`traits::LearningApi`] contract and
//! the wizard components (onboarding, intake, Q&A, assessment) that the CLI
//! drives. It performs no I/O of its own beyond the session file.

pub mod assessment;
pub mod error;
pub mod intake;
pub mod model;
pub mod notify;
pub mod onboarding;
pub mod portal;
pub mod progress;
pub mod qa;
pub mod routes;
pub mod scoring;
pub mod session;
pub mod traits;

pub use error::ApiError;
