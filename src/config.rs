//! Configuration for the verification run and the Chrome launch settings.
//!
//! All parameters carry fixed defaults matching the one-shot verification
//! workflow: a local dev server root as the target and a fixed relative
//! output path for the screenshot artifact.

use crate::VerifyError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for a verification run.
///
/// # Examples
///
/// ```rust
/// use ui_verify::Config;
///
/// // The default run: http://localhost:3000 captured to
/// // jules-scratch/verification/initial_view.png
/// let config = Config::default();
///
/// let custom = Config {
///     target_url: "http://localhost:8080".to_string(),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Address of the web application under verification. The application
    /// must already be running; starting it is out of scope.
    pub target_url: String,

    /// File path the screenshot is written to, overwritten on each run.
    /// Parent directories are created if absent.
    pub output_path: PathBuf,

    /// Browser viewport used when rendering the page.
    pub viewport: Viewport,

    /// Upper bound on the navigation step (default: 30 seconds).
    pub navigation_timeout: Duration,

    /// Upper bound on the network-idle wait (default: 30 seconds).
    pub idle_timeout: Duration,

    /// Continuous quiet window required before the network counts as idle
    /// (default: 500ms).
    pub idle_quiet_period: Duration,

    /// Number of in-flight requests tolerated while still counting as idle
    /// (default: 0).
    pub max_inflight_requests: usize,

    /// Capture the entire rendered document rather than the visible
    /// viewport (default: true).
    pub full_page: bool,

    /// Path to a Chrome/Chromium executable. If None, the installation is
    /// auto-detected.
    pub chrome_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_url: "http://localhost:3000".to_string(),
            output_path: PathBuf::from("jules-scratch/verification/initial_view.png"),
            viewport: Viewport::default(),
            navigation_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(30),
            idle_quiet_period: Duration::from_millis(500),
            max_inflight_requests: 0,
            full_page: true,
            chrome_path: None,
        }
    }
}

/// Browser viewport dimensions used for rendering.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Viewport {
    /// Viewport width in pixels (default: 1280)
    pub width: u32,

    /// Viewport height in pixels (default: 720)
    pub height: u32,

    /// Device pixel ratio (default: 1.0)
    pub device_scale_factor: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            device_scale_factor: 1.0,
        }
    }
}

/// Generate Chrome command-line arguments for a headless one-shot run.
///
/// Each run gets a unique profile directory so repeated invocations never
/// trip Chrome's singleton lock.
pub fn get_chrome_args(config: &Config) -> Vec<String> {
    let unique_id = format!("{}-{}", std::process::id(), uuid::Uuid::new_v4());

    vec![
        "--headless".to_string(),
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-gpu".to_string(),
        "--disable-extensions".to_string(),
        "--disable-default-apps".to_string(),
        "--disable-sync".to_string(),
        "--no-first-run".to_string(),
        format!(
            "--window-size={},{}",
            config.viewport.width, config.viewport.height
        ),
        format!("--user-data-dir=/tmp/ui-verify-{unique_id}"),
    ]
}

/// Build the chromiumoxide launch configuration from [`Config`].
pub fn create_browser_config(
    config: &Config,
) -> Result<chromiumoxide::browser::BrowserConfig, VerifyError> {
    use chromiumoxide::browser::BrowserConfig;

    let mut builder = BrowserConfig::builder()
        .window_size(config.viewport.width, config.viewport.height)
        .args(get_chrome_args(config));

    if let Some(chrome_path) = &config.chrome_path {
        builder = builder.chrome_executable(chrome_path);
    }

    builder.build().map_err(VerifyError::Launch)
}
