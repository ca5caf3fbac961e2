//! # ui-verify
//!
//! A one-shot visual verification tool for locally running web
//! applications. It launches a headless Chrome instance, opens an isolated
//! browsing context, navigates to the target URL, waits for network
//! idleness, and writes a full-page PNG screenshot to a fixed path for
//! manual or automated visual inspection.
//!
//! The flow is strictly linear: every step is a precondition for the next,
//! any failure is fatal, and the browser is released on every exit path
//! once it has been launched. There is no retry logic; a failed run is
//! re-invoked externally.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ui_verify::{Config, VerificationRunner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = VerificationRunner::new(Config::default());
//!     let report = runner.run().await?;
//!     println!(
//!         "captured {}x{} ({} bytes) to {}",
//!         report.width,
//!         report.height,
//!         report.file_size,
//!         report.output_path.display()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # The default run: http://localhost:3000 captured to
//! # jules-scratch/verification/initial_view.png
//! ui-verify
//!
//! # Override the constants without changing the core contract
//! ui-verify --url http://localhost:8080 --output shots/home.png --timeout 10
//!
//! # Run a scripted scenario (wait for elements, click, capture)
//! ui-verify --scenario scenarios/grid_view.json
//! ```

/// Configuration and Chrome launch settings
pub mod config;

/// Error types, one per verification step
pub mod error;

/// Scoped ownership of the headless Chrome process
pub mod browser;

/// Network-idleness tracking over CDP events
pub mod idle;

/// Declarative verification scenarios
pub mod scenario;

/// The linear verification sequence
pub mod runner;

/// Command-line interface
pub mod cli;

#[cfg(test)]
mod tests;

pub use browser::*;
pub use cli::*;
pub use config::*;
pub use error::*;
pub use idle::*;
pub use runner::*;
pub use scenario::*;
