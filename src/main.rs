use anyhow::Context as _;
use clap::Parser;
use tracing::{error, info};
use ui_verify::{setup_logging, Cli, Config, Scenario, VerificationRunner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    setup_logging(args.verbose)?;

    info!("starting ui-verify v{}", env!("CARGO_PKG_VERSION"));

    let config = args.to_config();
    validate_config(&config)?;

    let scenario = match &args.scenario {
        Some(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading scenario file {}", path.display()))?;
            Scenario::from_json(&json).context("parsing scenario file")?
        }
        None => Scenario::initial_view(&config.target_url, &config.output_path),
    };

    let runner = VerificationRunner::new(config);

    match runner.run_scenario(&scenario).await {
        Ok(report) => {
            println!("Verification succeeded:");
            println!("  Scenario: {}", report.scenario);
            println!("  Output: {}", report.output_path.display());
            println!("  Size: {} bytes", report.file_size);
            println!("  Dimensions: {}x{}", report.width, report.height);
            println!("  Duration: {:?}", report.duration);
            Ok(())
        }
        Err(e) => {
            error!("verification failed at {}: {}", e.step(), e);
            std::process::exit(1);
        }
    }
}

fn validate_config(config: &Config) -> anyhow::Result<()> {
    let parsed = url::Url::parse(&config.target_url)
        .with_context(|| format!("invalid target URL: {}", config.target_url))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("target URL must be http or https: {}", config.target_url);
    }
    if config.viewport.width == 0 || config.viewport.height == 0 {
        anyhow::bail!("viewport dimensions must be greater than 0");
    }
    if config.navigation_timeout.is_zero() || config.idle_timeout.is_zero() {
        anyhow::bail!("timeouts must be greater than 0");
    }

    Ok(())
}
