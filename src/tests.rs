#[cfg(test)]
mod integration_tests {
    use crate::{Cli, Config, Scenario, Step, VerifyError, Viewport};
    use clap::Parser;
    use std::time::Duration;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.target_url, "http://localhost:3000");
        assert_eq!(
            config.output_path.to_str().unwrap(),
            "jules-scratch/verification/initial_view.png"
        );
        assert_eq!(config.navigation_timeout, Duration::from_secs(30));
        assert_eq!(config.idle_timeout, Duration::from_secs(30));
        assert_eq!(config.idle_quiet_period, Duration::from_millis(500));
        assert_eq!(config.max_inflight_requests, 0);
        assert!(config.full_page);
        assert!(config.chrome_path.is_none());
    }

    #[test]
    fn test_viewport_default() {
        let viewport = Viewport::default();
        assert_eq!(viewport.width, 1280);
        assert_eq!(viewport.height, 720);
        assert_eq!(viewport.device_scale_factor, 1.0);
    }

    #[test]
    fn test_chrome_args_generation() {
        let config = Config::default();
        let args = crate::get_chrome_args(&config);

        assert!(args.contains(&"--headless".to_string()));
        assert!(args.contains(&"--no-sandbox".to_string()));
        assert!(args.contains(&"--disable-gpu".to_string()));
        assert!(args.contains(&format!(
            "--window-size={},{}",
            config.viewport.width, config.viewport.height
        )));
        assert!(args.iter().any(|a| a.starts_with("--user-data-dir=")));
    }

    #[test]
    fn test_chrome_args_unique_profile_dirs() {
        let config = Config::default();
        let first = crate::get_chrome_args(&config);
        let second = crate::get_chrome_args(&config);

        let dir = |args: &[String]| {
            args.iter()
                .find(|a| a.starts_with("--user-data-dir="))
                .cloned()
                .unwrap()
        };
        assert_ne!(dir(&first), dir(&second));
    }

    #[test]
    fn test_browser_config_creation() {
        let config = Config::default();
        assert!(crate::create_browser_config(&config).is_ok());
    }

    #[test]
    fn test_error_step_names() {
        assert_eq!(VerifyError::Launch("boom".to_string()).step(), "launch");
        assert_eq!(VerifyError::Context("gone".to_string()).step(), "context");
        assert_eq!(
            VerifyError::Navigation("refused".to_string()).step(),
            "navigate"
        );
        assert_eq!(VerifyError::Timeout(Duration::from_secs(5)).step(), "wait");
        assert_eq!(VerifyError::Capture("denied".to_string()).step(), "capture");
    }

    #[test]
    fn test_error_display_identifies_step() {
        let err = VerifyError::Navigation("net::ERR_CONNECTION_REFUSED".to_string());
        assert!(err.to_string().contains("navigation failed"));

        let err = VerifyError::Timeout(Duration::from_secs(30));
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_io_error_maps_to_capture() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: VerifyError = io.into();
        assert!(matches!(err, VerifyError::Capture(_)));
    }

    #[test]
    fn test_default_scenario_shape() {
        let scenario = Scenario::initial_view("http://localhost:3000", "out/initial_view.png");
        assert_eq!(scenario.name, "initial_view");
        assert_eq!(scenario.url, "http://localhost:3000");
        assert_eq!(scenario.steps.len(), 1);
        assert!(matches!(scenario.steps[0], Step::Screenshot { .. }));
    }

    #[test]
    fn test_scenario_from_json() {
        let json = r##"{
            "name": "grid_view",
            "url": "http://localhost:3000",
            "steps": [
                {"action": "wait_for_selector", "selector": "button[aria-label=\"grid-view\"]", "timeout_ms": 5000},
                {"action": "click", "selector": "button[aria-label=\"grid-view\"]"},
                {"action": "wait_for_selector", "selector": ".grid.grid-cols-3"},
                {"action": "screenshot", "path": "jules-scratch/verification/grid_view.png"}
            ]
        }"##;

        let scenario = Scenario::from_json(json).unwrap();
        assert_eq!(scenario.name, "grid_view");
        assert_eq!(scenario.steps.len(), 4);
        assert!(matches!(
            scenario.steps[0],
            Step::WaitForSelector {
                timeout_ms: Some(5000),
                ..
            }
        ));
        assert!(matches!(scenario.steps[1], Step::Click { .. }));
        assert!(matches!(
            scenario.steps[2],
            Step::WaitForSelector {
                timeout_ms: None,
                ..
            }
        ));
        assert!(matches!(scenario.steps[3], Step::Screenshot { .. }));
    }

    #[test]
    fn test_scenario_json_roundtrip() {
        let scenario = Scenario::initial_view("http://localhost:3000", "out.png");
        let json = serde_json::to_string(&scenario).unwrap();
        let parsed = Scenario::from_json(&json).unwrap();
        assert_eq!(parsed.name, scenario.name);
        assert_eq!(parsed.steps.len(), 1);
    }

    #[test]
    fn test_scenario_rejects_unknown_action() {
        let json = r##"{
            "name": "bad",
            "url": "http://localhost:3000",
            "steps": [{"action": "teleport", "selector": "#x"}]
        }"##;
        assert!(Scenario::from_json(json).is_err());
    }

    #[test]
    fn test_cli_defaults_match_spec_constants() {
        let args = Cli::parse_from(["ui-verify"]);
        let config = args.to_config();

        assert_eq!(config.target_url, "http://localhost:3000");
        assert_eq!(
            config.output_path.to_str().unwrap(),
            "jules-scratch/verification/initial_view.png"
        );
    }

    #[test]
    fn test_cli_overrides() {
        let args = Cli::parse_from([
            "ui-verify",
            "--url",
            "http://localhost:8080",
            "--output",
            "shots/home.png",
            "--timeout",
            "5",
            "--width",
            "800",
            "--height",
            "600",
            "--chrome-path",
            "/usr/bin/chromium",
        ]);
        let config = args.to_config();

        assert_eq!(config.target_url, "http://localhost:8080");
        assert_eq!(config.output_path.to_str().unwrap(), "shots/home.png");
        assert_eq!(config.navigation_timeout, Duration::from_secs(5));
        assert_eq!(config.idle_timeout, Duration::from_secs(5));
        assert_eq!(config.viewport.width, 800);
        assert_eq!(config.viewport.height, 600);
        assert_eq!(config.chrome_path.as_deref(), Some("/usr/bin/chromium"));
    }

    // Browser-backed tests below exercise the full sequence against a tiny
    // static HTTP server. They need a Chrome installation, so they are
    // opt-in via `cargo test -- --ignored`.

    async fn spawn_static_server() -> (tokio::task::JoinHandle<()>, String) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    let _ = stream.read(&mut buf).await;
                    let body = "<html><body><h1>AI Image Tagger</h1></body></html>";
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                });
            }
        });

        (handle, format!("http://{addr}"))
    }

    /// Accepts connections and reads the request but never writes a
    /// response, so navigation can only end by deadline.
    async fn spawn_stalling_server() -> (tokio::task::JoinHandle<()>, String) {
        use tokio::io::AsyncReadExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    let _ = stream.read(&mut buf).await;
                    // Hold the connection open without ever responding;
                    // `stream` stays alive inside the pending future.
                    std::future::pending::<()>().await;
                });
            }
        });

        (handle, format!("http://{addr}"))
    }

    fn test_config(target_url: String, file_stem: &str) -> Config {
        Config {
            target_url,
            output_path: std::env::temp_dir().join(format!(
                "ui-verify-test-{}-{}.png",
                std::process::id(),
                file_stem
            )),
            navigation_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(10),
            ..Default::default()
        }
    }

    #[tokio::test]
    #[ignore = "requires a local Chrome installation"]
    async fn test_run_against_static_page() {
        let (server, url) = spawn_static_server().await;
        let config = test_config(url, "static");
        let output_path = config.output_path.clone();
        let viewport = config.viewport.clone();

        let runner = crate::VerificationRunner::new(config);
        let report = runner.run().await.expect("verification should succeed");

        assert!(report.file_size > 0);
        assert!(output_path.exists());
        let bytes = std::fs::read(&output_path).unwrap();
        assert!(image::load_from_memory(&bytes).is_ok());

        // The static page is shorter than the viewport, so the full-page
        // capture matches the configured dimensions.
        assert_eq!(report.width, viewport.width);
        assert_eq!(report.height, viewport.height);

        server.abort();
        let _ = std::fs::remove_file(&output_path);
    }

    #[tokio::test]
    #[ignore = "requires a local Chrome installation"]
    async fn test_rerun_overwrites_artifact() {
        let (server, url) = spawn_static_server().await;
        let config = test_config(url, "rerun");
        let output_path = config.output_path.clone();

        let runner = crate::VerificationRunner::new(config);
        runner.run().await.expect("first run should succeed");
        runner.run().await.expect("second run should succeed");

        let bytes = std::fs::read(&output_path).unwrap();
        assert!(image::load_from_memory(&bytes).is_ok());

        server.abort();
        let _ = std::fs::remove_file(&output_path);
    }

    #[tokio::test]
    #[ignore = "requires a local Chrome installation"]
    async fn test_unreachable_target_is_navigation_error() {
        // Bind then drop to get a port that refuses connections.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = test_config(format!("http://127.0.0.1:{port}"), "refused");
        let output_path = config.output_path.clone();

        let runner = crate::VerificationRunner::new(config);
        let err = runner.run().await.expect_err("run should fail");

        assert!(matches!(err, VerifyError::Navigation(_)), "got {err:?}");
        assert!(!output_path.exists());
    }

    #[tokio::test]
    #[ignore = "requires a local Chrome installation"]
    async fn test_stalled_load_is_timeout_error() {
        let (server, url) = spawn_stalling_server().await;
        let mut config = test_config(url, "stalled");
        config.navigation_timeout = Duration::from_secs(3);
        config.idle_timeout = Duration::from_secs(3);
        let output_path = config.output_path.clone();
        let navigation_timeout = config.navigation_timeout;

        let started = std::time::Instant::now();
        let runner = crate::VerificationRunner::new(config);
        let err = runner.run().await.expect_err("run should fail");
        let elapsed = started.elapsed();

        assert!(matches!(err, VerifyError::Timeout(_)), "got {err:?}");
        // Bounded wall-clock: the configured timeout plus launch and
        // shutdown overhead.
        assert!(
            elapsed < navigation_timeout + Duration::from_secs(7),
            "took {elapsed:?}"
        );
        assert!(!output_path.exists());

        server.abort();
    }

    #[tokio::test]
    #[ignore = "requires a local Chrome installation"]
    async fn test_unwritable_output_is_capture_error() {
        let (server, url) = spawn_static_server().await;
        let mut config = test_config(url.clone(), "unwritable");
        config.output_path = std::path::PathBuf::from("/proc/ui-verify/denied.png");

        let runner = crate::VerificationRunner::new(config);
        let err = runner.run().await.expect_err("run should fail");

        assert!(matches!(err, VerifyError::Capture(_)), "got {err:?}");

        // The browser from the failed run was released; a fresh run against
        // the same server succeeds from a clean slate.
        let retry_config = test_config(url, "unwritable-retry");
        let retry_output = retry_config.output_path.clone();
        let retry = crate::VerificationRunner::new(retry_config);
        retry
            .run()
            .await
            .expect("run after a late failure should succeed");
        assert!(retry_output.exists());

        server.abort();
        let _ = std::fs::remove_file(&retry_output);
    }
}
