//! Error types for the quiz engine, the theme store and the HTTP layer.

use std::path::PathBuf;

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use thiserror::Error;
use tracing::error;

use crate::config::Environment;

/// Contract violations raised by quiz transitions and bank edits.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
  #[error("quiz has no questions")]
  EmptyQuestionSet,

  #[error("question {index} out of range (quiz has {len} questions)")]
  QuestionOutOfRange { index: usize, len: usize },

  #[error("option {option} out of range for question {question} (expected 0..{count})")]
  OptionOutOfRange { question: usize, option: usize, count: usize },

  /// The question set may only change before a run starts.
  #[error("question set cannot change while a quiz run is in progress")]
  RunInProgress,

  #[error("invalid question: {0}")]
  InvalidQuestion(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ThemeError {
  #[error("invalid theme '{0}' (expected 'light' or 'dark')")]
  InvalidTheme(String),
}

/// Failures while serving requests.
#[derive(Debug, Error)]
pub enum ServerError {
  #[error("failed to read {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong!";

/// A server error bound to the environment that decides how much of it leaks
/// into the response body.
pub struct ErrorResponse {
  pub error: ServerError,
  pub environment: Environment,
}

impl ErrorResponse {
  pub fn new(error: ServerError, environment: Environment) -> Self {
    Self { error, environment }
  }
}

impl IntoResponse for ErrorResponse {
  fn into_response(self) -> Response {
    error!(target: "cyberkids_backend", error = %self.error, "Request failed");
    internal_error(self.environment, &self.error.to_string())
  }
}

/// 500 with the generic message; the raw message is only exposed in development.
pub fn internal_error(environment: Environment, message: &str) -> Response {
  let body = if environment.is_development() {
    serde_json::json!({ "error": GENERIC_ERROR_MESSAGE, "message": message })
  } else {
    serde_json::json!({ "error": GENERIC_ERROR_MESSAGE })
  };
  (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
