//! The verification runner: one strict linear pass from browser launch to
//! screenshot capture.
//!
//! Each step is a precondition for the next. The browser instance is the
//! single exclusively-owned resource; once launched it is released exactly
//! once, on every exit path, and the first error raised is the one
//! reported.

use crate::{BrowserSession, Config, NetworkMonitor, Scenario, Step, VerifyError};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page, ScreenshotParams};
use image::GenericImageView;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};
use tracing::{debug, info};

/// Poll interval while waiting for an element to appear.
const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Outcome of a successful verification run.
#[derive(Debug, Clone)]
pub struct VerificationReport {
    pub scenario: String,
    pub output_path: PathBuf,
    pub file_size: usize,
    pub width: u32,
    pub height: u32,
    pub duration: Duration,
}

/// Drives a headless browser through the verification sequence.
///
/// # Examples
///
/// ```rust,no_run
/// use ui_verify::{Config, VerificationRunner};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let runner = VerificationRunner::new(Config::default());
///     let report = runner.run().await?;
///     println!("screenshot written: {}", report.output_path.display());
///     Ok(())
/// }
/// ```
pub struct VerificationRunner {
    config: Config,
}

impl VerificationRunner {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the default verification: load the configured target URL, wait
    /// for network idleness, write one full-page screenshot.
    pub async fn run(&self) -> Result<VerificationReport, VerifyError> {
        let scenario =
            Scenario::initial_view(&self.config.target_url, &self.config.output_path);
        self.run_scenario(&scenario).await
    }

    /// Run a scenario end to end.
    ///
    /// The browser is shut down after the inner sequence finishes, whether
    /// it succeeded or failed, so a late failure never leaks the Chrome
    /// process.
    pub async fn run_scenario(
        &self,
        scenario: &Scenario,
    ) -> Result<VerificationReport, VerifyError> {
        let started = Instant::now();
        info!(scenario = %scenario.name, url = %scenario.url, "starting verification");

        let mut session = BrowserSession::launch(&self.config).await?;

        let result = self.drive(&mut session, scenario, started).await;

        session.shutdown().await;
        result
    }

    async fn drive(
        &self,
        session: &mut BrowserSession,
        scenario: &Scenario,
        started: Instant,
    ) -> Result<VerificationReport, VerifyError> {
        session
            .browser
            .start_incognito_context()
            .await
            .map_err(|e| VerifyError::Context(e.to_string()))?;

        let page = session
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| VerifyError::Context(e.to_string()))?;

        self.set_viewport(&page).await?;

        // Attach before navigating so the document request itself is seen.
        let monitor = NetworkMonitor::attach(&page).await?;

        self.navigate(&page, &scenario.url).await?;

        monitor
            .wait_until_idle(
                self.config.max_inflight_requests,
                self.config.idle_quiet_period,
                self.config.idle_timeout,
            )
            .await?;

        let mut last_capture = None;
        for step in &scenario.steps {
            match step {
                Step::WaitForSelector {
                    selector,
                    timeout_ms,
                } => {
                    let limit = timeout_ms
                        .map(Duration::from_millis)
                        .unwrap_or(self.config.navigation_timeout);
                    self.wait_for_selector(&page, selector, limit).await?;
                }
                Step::Click { selector } => {
                    let element = page.find_element(selector.as_str()).await.map_err(|e| {
                        VerifyError::Navigation(format!("element {selector:?} not found: {e}"))
                    })?;
                    element
                        .click()
                        .await
                        .map_err(|e| VerifyError::Navigation(e.to_string()))?;
                    debug!(%selector, "clicked");
                }
                Step::Wait { ms } => sleep(Duration::from_millis(*ms)).await,
                Step::Screenshot { path } => {
                    last_capture = Some(self.capture(&page, path).await?);
                }
            }
        }

        monitor.detach();
        let _ = page.close().await;

        let (output_path, file_size, width, height) = last_capture
            .ok_or_else(|| VerifyError::Capture("scenario has no screenshot step".to_string()))?;

        info!(
            path = %output_path.display(),
            file_size, width, height,
            "verification complete"
        );

        Ok(VerificationReport {
            scenario: scenario.name.clone(),
            output_path,
            file_size,
            width,
            height,
            duration: started.elapsed(),
        })
    }

    async fn set_viewport(&self, page: &Page) -> Result<(), VerifyError> {
        let viewport = &self.config.viewport;

        let params = SetDeviceMetricsOverrideParams::builder()
            .width(viewport.width)
            .height(viewport.height)
            .device_scale_factor(viewport.device_scale_factor)
            .mobile(false)
            .build()
            .map_err(VerifyError::Context)?;

        page.execute(params)
            .await
            .map_err(|e| VerifyError::Context(e.to_string()))?;
        Ok(())
    }

    /// Navigate to the target and wait until the document has loaded.
    ///
    /// Connection refusal and DNS failures surface as
    /// [`VerifyError::Navigation`]; the deadline elapsing surfaces as
    /// [`VerifyError::Timeout`].
    async fn navigate(&self, page: &Page, url: &str) -> Result<(), VerifyError> {
        debug!(url, "navigating");

        let nav = async {
            page.goto(url)
                .await
                .map_err(|e| VerifyError::Navigation(e.to_string()))?;
            page.wait_for_navigation()
                .await
                .map_err(|e| VerifyError::Navigation(e.to_string()))?;
            Ok(())
        };

        match timeout(self.config.navigation_timeout, nav).await {
            Ok(result) => result,
            Err(_) => Err(VerifyError::Timeout(self.config.navigation_timeout)),
        }
    }

    async fn wait_for_selector(
        &self,
        page: &Page,
        selector: &str,
        limit: Duration,
    ) -> Result<(), VerifyError> {
        let deadline = Instant::now() + limit;
        loop {
            if page.find_element(selector).await.is_ok() {
                debug!(%selector, "element present");
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(VerifyError::Timeout(limit));
            }
            sleep(SELECTOR_POLL_INTERVAL).await;
        }
    }

    /// Write a PNG of the page to `path`, creating parent directories, and
    /// verify the artifact decodes as an image.
    async fn capture(
        &self,
        page: &Page,
        path: &Path,
    ) -> Result<(PathBuf, usize, u32, u32), VerifyError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(self.config.full_page)
            .build();

        let data = page
            .save_screenshot(params, path)
            .await
            .map_err(|e| VerifyError::Capture(e.to_string()))?;

        let img = image::load_from_memory(&data)
            .map_err(|e| VerifyError::Capture(format!("artifact is not a valid image: {e}")))?;
        let (width, height) = img.dimensions();

        debug!(path = %path.display(), bytes = data.len(), "screenshot written");
        Ok((path.to_path_buf(), data.len(), width, height))
    }
}
