//! Application state shared by the handlers: config, site description and the
//! question bank. Nothing here is mutated after startup; requests are
//! independent.

use tracing::{error, info, instrument};

use crate::config::{load_site_config, ServerConfig, SiteConfig};
use crate::domain::{Question, SiteInfo};
use crate::quiz::QuestionBank;
use crate::seeds::{default_site_info, seed_questions};

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: ServerConfig,
    pub site: SiteInfo,
    pub questions: QuestionBank,
}

impl AppState {
    /// Build state from config: seed content, then layer the TOML file if any.
    #[instrument(level = "info", skip_all)]
    pub fn new(config: ServerConfig) -> Self {
        let site_cfg = config
            .site_config_path
            .as_deref()
            .and_then(load_site_config)
            .unwrap_or_default();
        Self::with_site_config(config, site_cfg)
    }

    pub fn with_site_config(config: ServerConfig, site_cfg: SiteConfig) -> Self {
        let site = site_cfg.site.apply(default_site_info());

        let mut questions = QuestionBank::default();
        for q in seed_questions() {
            if let Err(e) = questions.append(q) {
                error!(target: "quiz", error = %e, "Skipping built-in question");
            }
        }
        // Config-based questions go after the built-in ones; bad entries are skipped.
        for (i, qc) in site_cfg.questions.into_iter().enumerate() {
            match Question::try_from(qc).and_then(|q| questions.append(q)) {
                Ok(()) => {}
                Err(e) => error!(target: "quiz", entry = i, error = %e, "Skipping config question"),
            }
        }

        info!(target: "quiz", questions = questions.len(), site = %site.name, "Startup content inventory");

        Self { config, site, questions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_site_config, ServerConfig};

    #[test]
    fn config_questions_append_after_seeds() {
        let cfg = parse_site_config(
            r#"
            [[questions]]
            prompt = "Should you click pop-ups that say your computer is infected?"
            options = ["Yes", "No", "Only twice", "If they are red"]
            correct_option = 1

            [[questions]]
            prompt = "Broken entry"
            options = ["a", "b", "c", "d"]
            correct_option = 9
            "#,
        )
        .unwrap();
        let state = AppState::with_site_config(ServerConfig::default(), cfg);
        assert_eq!(state.questions.len(), 6);
        assert_eq!(state.questions.get(5).map(|q| q.correct_option), Some(1));
    }

    #[test]
    fn missing_config_file_uses_seeds() {
        let config = ServerConfig {
            site_config_path: Some("/definitely/not/here.toml".into()),
            ..ServerConfig::default()
        };
        let state = AppState::new(config);
        assert_eq!(state.questions.len(), 5);
        assert_eq!(state.site, default_site_info());
    }
}
