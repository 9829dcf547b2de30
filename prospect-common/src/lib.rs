//! Common types shared across Prospect crates.
//!
//! This crate defines the scrape modes, the shared error taxonomy, and the
//! observability helpers used throughout the Prospect workspace. It is
//! intentionally lightweight so that every crate can depend on it without
//! pulling in heavy transitive costs.
//!
//! # Overview
//!
//! - [`ScrapeMode`]: the two caller-facing processing modes
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`ProspectError`] and [`Result`]: shared error handling
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod observability;

/// Processing mode selected by the caller.
///
/// `contact` runs the full contact-extraction pipeline with the one-level
/// contact-page fallback; `content` returns the normalized markdown of each
/// page with no recognizer logic applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeMode {
    Contact,
    Content,
}

impl ScrapeMode {
    /// Every mode the service understands, in documentation order.
    pub const SUPPORTED: [ScrapeMode; 2] = [ScrapeMode::Contact, ScrapeMode::Content];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScrapeMode::Contact => "contact",
            ScrapeMode::Content => "content",
        }
    }
}

impl fmt::Display for ScrapeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScrapeMode {
    type Err = ProspectError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "contact" => Ok(ScrapeMode::Contact),
            "content" => Ok(ScrapeMode::Content),
            other => Err(ProspectError::InvalidRequest(format!(
                "Invalid mode \"{other}\". Use \"contact\" or \"content\""
            ))),
        }
    }
}

/// Error types used across the Prospect system.
#[derive(thiserror::Error, Debug)]
pub enum ProspectError {
    /// The rendering engine could not load a page.
    #[error("Render error: {0}")]
    Render(String),

    /// A driver (browser session, network, etc.) reported an error.
    #[error("Driver error: {0}")]
    Driver(#[from] anyhow::Error),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A request was structurally invalid and was rejected before processing.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Navigation exceeded the configured timeout.
    #[error("Navigation timed out")]
    Timeout,
}

/// Convenient alias for results that use [`ProspectError`].
pub type Result<T> = std::result::Result<T, ProspectError>;
