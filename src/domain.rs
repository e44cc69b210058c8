//! Domain models: quiz questions and the public description of the site.

use serde::{Deserialize, Serialize};

/// Number of answer options every question carries.
pub const OPTION_COUNT: usize = 4;

/// One multiple-choice question. Immutable once it is part of a bank.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
  pub prompt: String,
  pub options: [String; OPTION_COUNT],
  pub correct_option: usize,
  pub explanation: String,
}

impl Question {
  pub fn new(
    prompt: impl Into<String>,
    options: [&str; OPTION_COUNT],
    correct_option: usize,
    explanation: impl Into<String>,
  ) -> Self {
    Self {
      prompt: prompt.into(),
      options: options.map(String::from),
      correct_option,
      explanation: explanation.into(),
    }
  }

  pub fn is_correct(&self, option: usize) -> bool { self.correct_option == option }
}

/// Descriptive payload served by `/api/info`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteInfo {
  pub name: String,
  pub description: String,
  pub features: Vec<String>,
  pub tech: Vec<String>,
  pub mobile_friendly: bool,
}
