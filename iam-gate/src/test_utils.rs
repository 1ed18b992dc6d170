use crate::gateway::{AuthenticationGateway, GatewayConfig, SimpleAuthenticationGateway};
use axum::body::Body;
use axum::Router;
use http::request::Parts;
use http::{HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use iam_client::HttpIamClient;
use log::LevelFilter;
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

pub const TEST_SERVICE_ID: &str = "test_service.test_namespace";

/// Test fixture with a mocked IAM backend.
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_example() {
///     let fixture = IamFixture::new().await;
///     fixture
///         .add_iam_mock(Method::GET, "/api/v2/getAuthLink", json!({ "redirect_url": "https://iam/login" }), StatusCode::OK, 1)
///         .await;
///     let decision = fixture.gateway().authenticate(&request).await;
/// }
/// ```
pub struct IamFixture {
    /// Mock server for the IAM backend
    pub iam_mock: MockServer,
    /// Client pointed at the mock server
    pub client: Arc<HttpIamClient>,
}

impl IamFixture {
    pub async fn new() -> Self {
        Self::setup_logger(LevelFilter::Debug);

        let iam_mock = MockServer::start().await;
        let client = Arc::new(HttpIamClient::new(iam_mock.uri(), reqwest::Client::new()));

        Self { iam_mock, client }
    }

    pub fn setup_logger(level: LevelFilter) {
        let _ = env_logger::builder()
            .filter_level(level)
            .is_test(true)
            .try_init();
    }

    pub fn config() -> GatewayConfig {
        GatewayConfig::new(TEST_SERVICE_ID)
    }

    pub fn gateway(&self) -> AuthenticationGateway {
        self.gateway_with(Self::config())
    }

    pub fn gateway_with(&self, config: GatewayConfig) -> AuthenticationGateway {
        AuthenticationGateway::new(self.client.clone(), config)
    }

    pub fn simple_gateway(&self) -> SimpleAuthenticationGateway {
        SimpleAuthenticationGateway::new(self.client.clone(), Self::config())
    }

    /// Adds a mock IAM route answering with `response_body` and `status_code`,
    /// expected to be called exactly `expected_calls` times
    pub async fn add_iam_mock(
        &self,
        method: Method,
        path: impl Into<String>,
        response_body: impl Serialize,
        status_code: StatusCode,
        expected_calls: u64,
    ) {
        Mock::given(matchers::method(method.as_str()))
            .and(matchers::path(path.into()))
            .respond_with(ResponseTemplate::new(status_code.as_u16()).set_body_json(response_body))
            .expect(expected_calls)
            .mount(&self.iam_mock)
            .await;
    }

    /// Fails the test if any IAM endpoint is called
    pub async fn expect_no_iam_calls(&self) {
        Mock::given(matchers::any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.iam_mock)
            .await;
    }
}

/// Request head as a protected service receives it from a browser
pub fn browser_request(method: Method, uri: &str) -> http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::HOST, "api.example.com")
        .header(http::header::REFERER, "https://app.example.com/page")
}

pub fn parts(builder: http::request::Builder) -> Parts {
    builder
        .body(())
        .expect("Failed to build request")
        .into_parts()
        .0
}

/// Response of a router under test
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("Failed to deserialize response JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Failed to convert response body to string")
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to send request");

    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read response body")
        .to_bytes()
        .to_vec();

    TestResponse {
        status,
        headers,
        body,
    }
}
