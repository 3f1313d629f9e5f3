mod harness;

use harness::config::ConfigBuilder;
use harness::mock_coqui::MockCoqui;
use harness::server::TestServer;

#[tokio::test]
async fn health_reports_engine_and_device() {
    let mock = MockCoqui::start().await.unwrap();
    let output = tempfile::tempdir().unwrap();
    let config = ConfigBuilder::new(&mock.base_url(), output.path()).build();

    let server = TestServer::start(config).await.unwrap();

    let resp = server.client().get(server.url("/health")).send().await.unwrap();

    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({ "status": "healthy", "engine": "coqui_server", "device": "cpu" })
    );
}

#[tokio::test]
async fn health_endpoint_disabled() {
    let mock = MockCoqui::start().await.unwrap();
    let output = tempfile::tempdir().unwrap();
    let config = ConfigBuilder::new(&mock.base_url(), output.path())
        .without_health()
        .build();

    let server = TestServer::start(config).await.unwrap();

    let resp = server.client().get(server.url("/health")).send().await.unwrap();

    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn unreachable_engine_fails_startup() {
    // Grab a free port, then release it so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let output = tempfile::tempdir().unwrap();
    let config = ConfigBuilder::new(&format!("http://{addr}"), output.path()).build();

    let err = TestServer::start(config).await.err().unwrap();

    assert!(err.to_string().contains("Failed to initialize speech engine"), "{err}");
}

#[tokio::test]
async fn unknown_default_format_fails_startup() {
    let mock = MockCoqui::start().await.unwrap();
    let output = tempfile::tempdir().unwrap();
    let config = ConfigBuilder::new(&mock.base_url(), output.path())
        .with_default_format("aiff")
        .build();

    let err = TestServer::start(config).await.err().unwrap();

    assert!(err.to_string().contains("unsupported default format 'aiff'"), "{err}");
}
