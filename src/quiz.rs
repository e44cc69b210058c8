//! Quiz engine: the question bank and the run state machine.
//!
//! A run moves `NotStarted -> InProgress { current } -> Completed`. Every
//! transition goes through [`step`], a pure function of the question set, the
//! current run and an action. [`QuizSession`] owns a bank plus a run and is the
//! explicit state object the UI layer keeps around.
//!
//! Rules:
//! - an answer is recorded at most once per question; later picks are ignored
//! - `Advance` is ignored until the current question has an answer
//! - out-of-range question/option indices are contract violations (errors)

use std::collections::BTreeMap;

use rand::{seq::SliceRandom, Rng};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::domain::{Question, OPTION_COUNT};
use crate::error::QuizError;

/// Ordered question set. Only `append` and `shuffle` may change it.
#[derive(Clone, Debug, Default)]
pub struct QuestionBank {
  questions: Vec<Question>,
}

impl QuestionBank {
  pub fn new(questions: Vec<Question>) -> Result<Self, QuizError> {
    let mut bank = Self::default();
    for q in questions {
      bank.append(q)?;
    }
    Ok(bank)
  }

  pub fn questions(&self) -> &[Question] { &self.questions }
  pub fn len(&self) -> usize { self.questions.len() }
  pub fn is_empty(&self) -> bool { self.questions.is_empty() }
  pub fn get(&self, index: usize) -> Option<&Question> { self.questions.get(index) }

  /// Validate and append a question at the end of the set.
  pub fn append(&mut self, question: Question) -> Result<(), QuizError> {
    validate_question(&question)?;
    self.questions.push(question);
    Ok(())
  }

  /// Random permutation of the whole set.
  pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
    self.questions.shuffle(rng);
  }
}

fn validate_question(q: &Question) -> Result<(), QuizError> {
  if q.prompt.trim().is_empty() {
    return Err(QuizError::InvalidQuestion("prompt is empty".into()));
  }
  if let Some(i) = q.options.iter().position(|o| o.trim().is_empty()) {
    return Err(QuizError::InvalidQuestion(format!("option {i} is empty")));
  }
  if q.correct_option >= OPTION_COUNT {
    return Err(QuizError::InvalidQuestion(format!(
      "correct option {} out of range (expected 0..{OPTION_COUNT})",
      q.correct_option
    )));
  }
  Ok(())
}

/// Score bracket of a finished run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
  /// >= 90%
  Champion,
  /// >= 70%
  Defender,
  /// >= 50%
  Explorer,
  Learner,
}

impl Tier {
  /// Integer comparison so that e.g. 9/10 lands exactly on the 90% boundary.
  pub fn for_score(score: usize, total: usize) -> Tier {
    let scaled = score * 100;
    if total == 0 {
      Tier::Learner
    } else if scaled >= 90 * total {
      Tier::Champion
    } else if scaled >= 70 * total {
      Tier::Defender
    } else if scaled >= 50 * total {
      Tier::Explorer
    } else {
      Tier::Learner
    }
  }

  pub fn message(self) -> &'static str {
    match self {
      Tier::Champion => "Amazing! You're a Cyber Champion! You really know how to stay safe online.",
      Tier::Defender => "Great job! You're a Cyber Defender. Just a few more things to learn.",
      Tier::Explorer => "Good effort! You're a Cyber Explorer. Keep practicing to get even safer.",
      Tier::Learner => "Keep learning! Review the safety tips and try the quiz again.",
    }
  }
}

/// Result of a completed run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QuizSummary {
  pub score: usize,
  pub total: usize,
  pub percentage: f64,
  pub tier: Tier,
  pub message: String,
}

impl QuizSummary {
  pub fn new(score: usize, total: usize) -> Self {
    let percentage = if total == 0 { 0.0 } else { score as f64 / total as f64 * 100.0 };
    let tier = Tier::for_score(score, total);
    Self { score, total, percentage, tier, message: tier.message().to_string() }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum QuizPhase {
  NotStarted,
  InProgress { current: usize },
  Completed { summary: QuizSummary },
}

/// One attempt through the question set.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QuizRun {
  phase: QuizPhase,
  /// question index -> chosen option
  answers: BTreeMap<usize, usize>,
  score: usize,
}

impl Default for QuizRun {
  fn default() -> Self {
    Self { phase: QuizPhase::NotStarted, answers: BTreeMap::new(), score: 0 }
  }
}

impl QuizRun {
  pub fn phase(&self) -> &QuizPhase { &self.phase }
  pub fn answers(&self) -> &BTreeMap<usize, usize> { &self.answers }
  pub fn answer_for(&self, question: usize) -> Option<usize> { self.answers.get(&question).copied() }
  pub fn score(&self) -> usize { self.score }
  pub fn is_active(&self) -> bool { matches!(self.phase, QuizPhase::InProgress { .. }) }

  pub fn current_index(&self) -> Option<usize> {
    match self.phase {
      QuizPhase::InProgress { current } => Some(current),
      _ => None,
    }
  }

  pub fn summary(&self) -> Option<&QuizSummary> {
    match &self.phase {
      QuizPhase::Completed { summary } => Some(summary),
      _ => None,
    }
  }

  fn fresh() -> Self {
    Self { phase: QuizPhase::InProgress { current: 0 }, ..Self::default() }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizAction {
  Start,
  SelectAnswer { question: usize, option: usize },
  Advance,
  Restart,
}

/// Why an action left the run untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
  NotActive,
  AlreadyAnswered,
  NotCurrentQuestion,
  Unanswered,
}

/// Right/wrong feedback for a freshly recorded answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnswerFeedback {
  pub question: usize,
  pub chosen: usize,
  pub correct_option: usize,
  pub is_correct: bool,
  pub explanation: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum QuizEvent {
  Started,
  Answered(AnswerFeedback),
  Advanced { current: usize },
  Completed(QuizSummary),
  Ignored { reason: IgnoreReason },
}

/// Outcome of a transition: the next run and what happened.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
  pub run: QuizRun,
  pub event: QuizEvent,
}

impl Step {
  fn ignored(run: &QuizRun, reason: IgnoreReason) -> Self {
    Self { run: run.clone(), event: QuizEvent::Ignored { reason } }
  }
}

/// Pure transition function.
pub fn step(questions: &[Question], run: &QuizRun, action: QuizAction) -> Result<Step, QuizError> {
  match action {
    QuizAction::Start | QuizAction::Restart => {
      if questions.is_empty() {
        return Err(QuizError::EmptyQuestionSet);
      }
      Ok(Step { run: QuizRun::fresh(), event: QuizEvent::Started })
    }

    QuizAction::SelectAnswer { question, option } => {
      let q = questions
        .get(question)
        .ok_or(QuizError::QuestionOutOfRange { index: question, len: questions.len() })?;
      if option >= q.options.len() {
        return Err(QuizError::OptionOutOfRange { question, option, count: q.options.len() });
      }

      let Some(current) = run.current_index() else {
        return Ok(Step::ignored(run, IgnoreReason::NotActive));
      };
      if run.answers.contains_key(&question) {
        return Ok(Step::ignored(run, IgnoreReason::AlreadyAnswered));
      }
      if question != current {
        return Ok(Step::ignored(run, IgnoreReason::NotCurrentQuestion));
      }

      let is_correct = q.is_correct(option);
      let mut next = run.clone();
      next.answers.insert(question, option);
      if is_correct {
        next.score += 1;
      }
      let feedback = AnswerFeedback {
        question,
        chosen: option,
        correct_option: q.correct_option,
        is_correct,
        explanation: q.explanation.clone(),
      };
      Ok(Step { run: next, event: QuizEvent::Answered(feedback) })
    }

    QuizAction::Advance => {
      let Some(current) = run.current_index() else {
        return Ok(Step::ignored(run, IgnoreReason::NotActive));
      };
      if !run.answers.contains_key(&current) {
        return Ok(Step::ignored(run, IgnoreReason::Unanswered));
      }

      let mut next = run.clone();
      if current + 1 >= questions.len() {
        let summary = QuizSummary::new(run.score, questions.len());
        next.phase = QuizPhase::Completed { summary: summary.clone() };
        Ok(Step { run: next, event: QuizEvent::Completed(summary) })
      } else {
        next.phase = QuizPhase::InProgress { current: current + 1 };
        Ok(Step { run: next, event: QuizEvent::Advanced { current: current + 1 } })
      }
    }
  }
}

/// A question bank plus the run played over it.
#[derive(Clone, Debug)]
pub struct QuizSession {
  bank: QuestionBank,
  run: QuizRun,
}

impl QuizSession {
  pub fn new(bank: QuestionBank) -> Self {
    Self { bank, run: QuizRun::default() }
  }

  pub fn bank(&self) -> &QuestionBank { &self.bank }
  pub fn run(&self) -> &QuizRun { &self.run }

  /// The question being shown, with its index.
  pub fn current_question(&self) -> Option<(usize, &Question)> {
    let i = self.run.current_index()?;
    self.bank.get(i).map(|q| (i, q))
  }

  #[instrument(level = "debug", skip(self), fields(score = self.run.score))]
  pub fn apply(&mut self, action: QuizAction) -> Result<QuizEvent, QuizError> {
    let Step { run, event } = step(self.bank.questions(), &self.run, action)?;
    self.run = run;
    match &event {
      QuizEvent::Completed(summary) => {
        info!(target: "quiz", score = summary.score, total = summary.total, tier = ?summary.tier, "Quiz completed");
      }
      QuizEvent::Ignored { reason } => debug!(target: "quiz", ?action, ?reason, "Quiz action ignored"),
      other => debug!(target: "quiz", ?action, event = ?other, "Quiz transition"),
    }
    Ok(event)
  }

  pub fn start(&mut self) -> Result<QuizEvent, QuizError> { self.apply(QuizAction::Start) }
  pub fn restart(&mut self) -> Result<QuizEvent, QuizError> { self.apply(QuizAction::Restart) }
  pub fn advance(&mut self) -> Result<QuizEvent, QuizError> { self.apply(QuizAction::Advance) }

  pub fn select_answer(&mut self, question: usize, option: usize) -> Result<QuizEvent, QuizError> {
    self.apply(QuizAction::SelectAnswer { question, option })
  }

  /// Administrative append; only allowed while no run is in progress.
  /// Any finished run is discarded since its indices refer to the old set.
  pub fn append_question(&mut self, question: Question) -> Result<(), QuizError> {
    if self.run.is_active() {
      return Err(QuizError::RunInProgress);
    }
    self.bank.append(question)?;
    self.run = QuizRun::default();
    Ok(())
  }

  pub fn shuffle_questions<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), QuizError> {
    if self.run.is_active() {
      return Err(QuizError::RunInProgress);
    }
    self.bank.shuffle(rng);
    self.run = QuizRun::default();
    Ok(())
  }
}
