//! CyberKids backend: quiz engine, theme store and the static site server for
//! a children's online-safety website.

pub mod config;
pub mod domain;
pub mod error;
pub mod protocol;
pub mod quiz;
pub mod routes;
pub mod seeds;
pub mod state;
pub mod telemetry;
pub mod theme;
