//! Public JSON DTOs for the HTTP endpoints (serde ready).

use serde::{Deserialize, Serialize};

use crate::config::Environment;
use crate::domain::SiteInfo;

pub const HEALTH_OK: &str = "OK";

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthOut {
    pub status: String,
    pub app: String,
    pub version: String,
    /// RFC 3339, UTC.
    pub timestamp: String,
    pub environment: Environment,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct InfoOut {
    #[serde(flatten)]
    pub site: SiteInfo,
    pub quiz_questions: usize,
}
