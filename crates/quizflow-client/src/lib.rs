//! quizflow-client — HTTP quiz backend and configuration.
//!
//! Implements the `QuizBackend` trait over HTTP with reqwest, and loads the
//! `quizflow.toml` configuration that tells the CLI where the backend lives.

pub mod config;
pub mod http;

pub use config::{create_backend, load_config, load_config_from, ClientConfig};
pub use http::HttpBackend;
