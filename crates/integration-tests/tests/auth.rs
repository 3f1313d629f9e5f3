mod harness;

use harness::config::ConfigBuilder;
use harness::mock_coqui::MockCoqui;
use harness::server::TestServer;

async fn protected_server(mock: &MockCoqui, output: &std::path::Path) -> TestServer {
    let config = ConfigBuilder::new(&mock.base_url(), output)
        .with_api_key("test-key")
        .build();

    TestServer::start(config).await.unwrap()
}

#[tokio::test]
async fn health_stays_public() {
    let mock = MockCoqui::start().await.unwrap();
    let output = tempfile::tempdir().unwrap();
    let server = protected_server(&mock, output.path()).await;

    let resp = server.client().get(server.url("/health")).send().await.unwrap();

    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn missing_key_is_unauthorized() {
    let mock = MockCoqui::start().await.unwrap();
    let output = tempfile::tempdir().unwrap();
    let server = protected_server(&mock, output.path()).await;

    let resp = server
        .client()
        .post(server.url("/tts"))
        .form(&[("text", "Hello")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["type"], "authentication_error");
    assert_eq!(mock.named_requests(), 0);
}

#[tokio::test]
async fn bearer_token_is_accepted() {
    let mock = MockCoqui::start().await.unwrap();
    let output = tempfile::tempdir().unwrap();
    let server = protected_server(&mock, output.path()).await;

    let resp = server
        .client()
        .get(server.url("/languages"))
        .bearer_auth("test-key")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn api_key_header_is_accepted() {
    let mock = MockCoqui::start().await.unwrap();
    let output = tempfile::tempdir().unwrap();
    let server = protected_server(&mock, output.path()).await;

    let resp = server
        .client()
        .get(server.url("/voices"))
        .header("X-API-Key", "test-key")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);

    let wrong = server
        .client()
        .get(server.url("/voices"))
        .header("X-API-Key", "other-key")
        .send()
        .await
        .unwrap();

    assert_eq!(wrong.status(), 401);
}
