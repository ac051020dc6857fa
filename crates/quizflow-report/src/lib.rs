//! quizflow-report — Review page generation for finished quizzes.

pub mod html;

pub use html::{generate_html, write_html_report};
