//! quizflow-core — Quiz session engine, answer scoring, and progress
//! synchronization.
//!
//! This crate defines the question model, the session state machine, and the
//! backend trait that the rest of quizflow builds on. HTTP transport lives in
//! `quizflow-client`; rendering lives in `quizflow-report`.

pub mod answers;
pub mod completion;
pub mod error;
pub mod mock;
pub mod model;
pub mod quiz_file;
pub mod results;
pub mod scoring;
pub mod session;
pub mod sync;
pub mod traits;

pub use error::BackendError;
pub use results::{ResultsPayload, ResultsSource};
pub use session::{QuizSession, SessionConfig, SessionError, SessionSeed, SessionState, Transition};
pub use traits::QuizBackend;
