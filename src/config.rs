//! Server configuration from environment variables plus optional site content
//! from TOML.
//!
//! Environment:
//!   HOST             : bind address (default 0.0.0.0)
//!   PORT             : u16 (default 3000)
//!   STATIC_DIR       : built SPA bundle (default ./static)
//!   APP_ENV          : development (default) | production | test
//!   SITE_CONFIG_PATH : TOML with `[site]` overrides and extra `[[questions]]`

use std::{
  fmt,
  net::{IpAddr, Ipv4Addr, SocketAddr},
  path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::domain::{Question, SiteInfo, OPTION_COUNT};
use crate::error::QuizError;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STATIC_DIR: &str = "./static";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
  #[default]
  Development,
  Production,
  Test,
}

impl Environment {
  pub fn parse(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "development" | "dev" => Some(Environment::Development),
      "production" | "prod" => Some(Environment::Production),
      "test" => Some(Environment::Test),
      _ => None,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Environment::Development => "development",
      Environment::Production => "production",
      Environment::Test => "test",
    }
  }

  pub fn is_development(self) -> bool { self == Environment::Development }
}

impl fmt::Display for Environment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
  pub host: IpAddr,
  pub port: u16,
  pub static_dir: PathBuf,
  pub environment: Environment,
  pub site_config_path: Option<PathBuf>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
      port: DEFAULT_PORT,
      static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
      environment: Environment::default(),
      site_config_path: None,
    }
  }
}

impl ServerConfig {
  pub fn from_env() -> Self {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Build from any key lookup; unparsable values fall back to defaults.
  pub fn from_lookup<F>(lookup: F) -> Self
  where
    F: Fn(&str) -> Option<String>,
  {
    let defaults = Self::default();

    let host = match lookup("HOST") {
      Some(h) => h.parse::<IpAddr>().unwrap_or_else(|_| {
        warn!(target: "cyberkids_backend", host = %h, "Invalid HOST; using default");
        defaults.host
      }),
      None => defaults.host,
    };
    let port = match lookup("PORT") {
      Some(p) => p.parse::<u16>().unwrap_or_else(|_| {
        warn!(target: "cyberkids_backend", port = %p, "Invalid PORT; using default");
        defaults.port
      }),
      None => defaults.port,
    };
    let environment = match lookup("APP_ENV") {
      Some(e) => Environment::parse(&e).unwrap_or_else(|| {
        warn!(target: "cyberkids_backend", env = %e, "Unknown APP_ENV; using development");
        Environment::Development
      }),
      None => defaults.environment,
    };

    Self {
      host,
      port,
      static_dir: lookup("STATIC_DIR").map(PathBuf::from).unwrap_or(defaults.static_dir),
      environment,
      site_config_path: lookup("SITE_CONFIG_PATH").filter(|p| !p.is_empty()).map(PathBuf::from),
    }
  }

  pub fn addr(&self) -> SocketAddr { SocketAddr::new(self.host, self.port) }
}

/// Optional TOML content layered over the built-in seeds.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SiteConfig {
  #[serde(default)]
  pub site: SiteOverrides,
  #[serde(default)]
  pub questions: Vec<QuestionCfg>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SiteOverrides {
  #[serde(default)] pub name: Option<String>,
  #[serde(default)] pub description: Option<String>,
  #[serde(default)] pub features: Option<Vec<String>>,
  #[serde(default)] pub tech: Option<Vec<String>>,
  #[serde(default)] pub mobile_friendly: Option<bool>,
}

impl SiteOverrides {
  pub fn apply(&self, base: SiteInfo) -> SiteInfo {
    SiteInfo {
      name: self.name.clone().unwrap_or(base.name),
      description: self.description.clone().unwrap_or(base.description),
      features: self.features.clone().unwrap_or(base.features),
      tech: self.tech.clone().unwrap_or(base.tech),
      mobile_friendly: self.mobile_friendly.unwrap_or(base.mobile_friendly),
    }
  }
}

/// Question entry accepted in TOML. Appended after the built-in questions.
#[derive(Clone, Debug, Deserialize)]
pub struct QuestionCfg {
  pub prompt: String,
  pub options: Vec<String>,
  pub correct_option: usize,
  #[serde(default)]
  pub explanation: String,
}

impl TryFrom<QuestionCfg> for Question {
  type Error = QuizError;

  fn try_from(cfg: QuestionCfg) -> Result<Self, Self::Error> {
    let got = cfg.options.len();
    let options: [String; OPTION_COUNT] = cfg.options.try_into().map_err(|_| {
      QuizError::InvalidQuestion(format!("expected {OPTION_COUNT} options, got {got}"))
    })?;
    Ok(Question {
      prompt: cfg.prompt,
      options,
      correct_option: cfg.correct_option,
      explanation: cfg.explanation,
    })
  }
}

pub fn parse_site_config(s: &str) -> Result<SiteConfig, toml::de::Error> {
  toml::from_str::<SiteConfig>(s)
}

/// Load `SiteConfig` from `path`. On any parsing/IO error, returns None.
pub fn load_site_config(path: &Path) -> Option<SiteConfig> {
  match std::fs::read_to_string(path) {
    Ok(s) => match parse_site_config(&s) {
      Ok(cfg) => {
        info!(target: "cyberkids_backend", path = %path.display(), questions = cfg.questions.len(), "Loaded site config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "cyberkids_backend", path = %path.display(), error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "cyberkids_backend", path = %path.display(), error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> =
      pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |k: &str| map.get(k).cloned()
  }

  #[test]
  fn defaults_when_env_is_empty() {
    let cfg = ServerConfig::from_lookup(lookup(&[]));
    assert_eq!(cfg, ServerConfig::default());
    assert_eq!(cfg.addr().to_string(), "0.0.0.0:3000");
  }

  #[test]
  fn reads_env_values() {
    let cfg = ServerConfig::from_lookup(lookup(&[
      ("HOST", "127.0.0.1"),
      ("PORT", "8080"),
      ("STATIC_DIR", "/srv/site"),
      ("APP_ENV", "Production"),
      ("SITE_CONFIG_PATH", "site.toml"),
    ]));
    assert_eq!(cfg.addr().to_string(), "127.0.0.1:8080");
    assert_eq!(cfg.static_dir, PathBuf::from("/srv/site"));
    assert_eq!(cfg.environment, Environment::Production);
    assert_eq!(cfg.site_config_path, Some(PathBuf::from("site.toml")));
  }

  #[test]
  fn bad_values_fall_back() {
    let cfg = ServerConfig::from_lookup(lookup(&[("PORT", "http"), ("APP_ENV", "staging"), ("HOST", "nope")]));
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.environment, Environment::Development);
    assert_eq!(cfg.host, ServerConfig::default().host);
  }

  #[test]
  fn parses_site_toml() {
    let cfg = parse_site_config(
      r#"
        [site]
        name = "Safe Surfers"
        mobile_friendly = false

        [[questions]]
        prompt = "What is a firewall?"
        options = ["A wall on fire", "A security guard for your network", "A video game", "A kind of virus"]
        correct_option = 1
        explanation = "Firewalls block unwanted traffic."
      "#,
    )
    .unwrap();

    let info = cfg.site.apply(crate::seeds::default_site_info());
    assert_eq!(info.name, "Safe Surfers");
    assert!(!info.mobile_friendly);
    assert!(!info.features.is_empty());

    let q = Question::try_from(cfg.questions[0].clone()).unwrap();
    assert_eq!(q.correct_option, 1);
  }

  #[test]
  fn question_needs_four_options() {
    let cfg = QuestionCfg { prompt: "p".into(), options: vec!["a".into(), "b".into()], correct_option: 0, explanation: String::new() };
    assert!(matches!(Question::try_from(cfg), Err(QuizError::InvalidQuestion(_))));
  }

  #[test]
  fn unreadable_file_yields_none() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_site_config(&dir.path().join("missing.toml")).is_none());
    let bad = dir.path().join("bad.toml");
    std::fs::write(&bad, "questions = 3").unwrap();
    assert!(load_site_config(&bad).is_none());
  }
}
