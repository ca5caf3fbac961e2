use crate::Config;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "ui-verify")]
#[command(about = "One-shot visual verification for a locally running web app")]
#[command(version)]
pub struct Cli {
    #[arg(long, help = "Target URL (default: http://localhost:3000)")]
    pub url: Option<String>,

    #[arg(short, long, help = "Output file path for the screenshot")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Navigation and idle-wait timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Viewport width")]
    pub width: Option<u32>,

    #[arg(long, help = "Viewport height")]
    pub height: Option<u32>,

    #[arg(long, help = "Chrome executable path")]
    pub chrome_path: Option<String>,

    #[arg(long, help = "Scenario file (JSON) to run instead of the default")]
    pub scenario: Option<PathBuf>,

    #[arg(long, help = "Enable verbose logging")]
    pub verbose: bool,
}

impl Cli {
    /// Apply CLI overrides on top of the default configuration.
    pub fn to_config(&self) -> Config {
        let mut config = Config::default();

        if let Some(url) = &self.url {
            config.target_url = url.clone();
        }
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        if let Some(timeout) = self.timeout {
            config.navigation_timeout = Duration::from_secs(timeout);
            config.idle_timeout = Duration::from_secs(timeout);
        }
        if let Some(width) = self.width {
            config.viewport.width = width;
        }
        if let Some(height) = self.height {
            config.viewport.height = height;
        }
        if let Some(chrome_path) = &self.chrome_path {
            config.chrome_path = Some(chrome_path.clone());
        }

        config
    }
}

pub fn setup_logging(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    Ok(())
}
