//! Scoped ownership of a single headless Chrome process.
//!
//! The session is the top-level resource of a verification run: it must
//! outlive every browsing context and page created from it, and is released
//! exactly once via [`BrowserSession::shutdown`] on every exit path.

use crate::{create_browser_config, Config, VerifyError};
use chromiumoxide::browser::Browser;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// A launched Chrome instance together with its CDP event-loop task.
pub struct BrowserSession {
    pub(crate) browser: Browser,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    /// Launch a headless Chrome instance and start polling its CDP handler.
    ///
    /// Fails with [`VerifyError::Launch`] if the Chrome binary is missing
    /// or the process does not come up.
    pub async fn launch(config: &Config) -> Result<Self, VerifyError> {
        let browser_config = create_browser_config(config)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| VerifyError::Launch(e.to_string()))?;

        // The handler implements Stream and must be polled for the whole
        // lifetime of the browser connection.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    error!("CDP handler error: {e}");
                    break;
                }
            }
            debug!("CDP handler stream ended");
        });

        info!("headless Chrome launched");
        Ok(Self {
            browser,
            handler_task,
        })
    }

    /// Close the browser and reap the Chrome process.
    ///
    /// Contexts and pages owned by the instance are released transitively.
    /// Failures here are logged but not surfaced, so shutdown never masks
    /// an error raised by an earlier step.
    pub async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            error!("browser close failed: {e}");
        }
        if let Err(e) = self.browser.wait().await {
            debug!("browser process wait failed: {e}");
        }
        self.handler_task.abort();
        info!("browser shut down");
    }
}
