//! Declarative verification scenarios.
//!
//! A scenario pairs a target URL with an ordered list of steps executed
//! after the initial page load has settled. The default one-shot
//! verification is a scenario with a single screenshot step; richer
//! scenarios can interact with the page first (wait for an element, click)
//! and are loadable from JSON.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single interaction or capture step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Poll until an element matching the CSS selector exists.
    WaitForSelector {
        selector: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
    /// Click the first element matching the CSS selector.
    Click { selector: String },
    /// Pause for a fixed amount of time.
    Wait { ms: u64 },
    /// Capture a full-page screenshot to the given path.
    Screenshot { path: PathBuf },
}

/// An ordered verification sequence against a single target URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    /// The default one-shot verification: load the target, wait for network
    /// idleness, capture one screenshot.
    pub fn initial_view(url: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            name: "initial_view".to_string(),
            url: url.into(),
            steps: vec![Step::Screenshot {
                path: output.into(),
            }],
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
