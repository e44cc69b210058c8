//! Built-in content: the default question set and the site description.
//! Guarantees the app is useful without any external config.

use crate::domain::{Question, SiteInfo};

pub const APP_NAME: &str = "CyberKids";

/// The five questions every quiz run starts from.
pub fn seed_questions() -> Vec<Question> {
  vec![
    Question::new(
      "What makes a password strong?",
      [
        "Your pet's name",
        "A mix of letters, numbers and symbols",
        "Your birthday",
        "The word \"password\"",
      ],
      1,
      "Strong passwords are long and mix letters, numbers and symbols so nobody can guess them.",
    ),
    Question::new(
      "A stranger online asks where you live. What should you do?",
      [
        "Tell them, they seem nice",
        "Send them a photo of your house",
        "Don't answer and tell a trusted adult",
        "Give them your school name instead",
      ],
      2,
      "Never share personal information with strangers online. Always tell a grown-up you trust.",
    ),
    Question::new(
      "You get an email saying you won a prize and must click a link. What is it probably?",
      [
        "A real prize",
        "A phishing trick",
        "A message from your teacher",
        "A birthday card",
      ],
      1,
      "Messages that promise prizes and push you to click links are often phishing scams.",
    ),
    Question::new(
      "Who should you share your password with?",
      [
        "Your best friend",
        "Anyone who asks nicely",
        "Your online game teammates",
        "Only your parents or guardians",
      ],
      3,
      "Passwords are secret. Only parents or guardians who help keep you safe should know them.",
    ),
    Question::new(
      "What should you do before downloading a game or app?",
      [
        "Ask a trusted adult first",
        "Download it right away",
        "Click every pop-up you see",
        "Turn off the antivirus",
      ],
      0,
      "Checking with an adult helps you avoid apps that hide viruses or steal information.",
    ),
  ]
}

pub fn default_site_info() -> SiteInfo {
  SiteInfo {
    name: APP_NAME.into(),
    description: "A friendly place for kids to learn how to stay safe online.".into(),
    features: vec![
      "Interactive cybersecurity quiz".into(),
      "Light and dark themes".into(),
      "Online safety tips".into(),
      "Password strength lessons".into(),
    ],
    tech: vec!["Rust".into(), "axum".into(), "tokio".into()],
    mobile_friendly: true,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::OPTION_COUNT;

  #[test]
  fn seed_questions_are_well_formed() {
    let questions = seed_questions();
    assert_eq!(questions.len(), 5);
    for q in &questions {
      assert!(q.correct_option < OPTION_COUNT, "bad correct option in {:?}", q.prompt);
      assert!(!q.prompt.is_empty());
      assert!(!q.explanation.is_empty());
    }
  }
}
