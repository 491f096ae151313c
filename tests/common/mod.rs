//! Local stand-in for the Mullvad API, shared by the integration tests

#![allow(dead_code)]

use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ACCOUNT: &str = "1234123412341234";
pub const TOKEN: &str = "test-access-token";

/// A mock server driven from synchronous tests.
/// The server is declared first so it is dropped before its runtime.
pub struct ApiServer {
    server: MockServer,
    rt: Runtime,
}

impl ApiServer {
    pub fn start() -> Self {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        Self { server, rt }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn mount(&self, mock: Mock) {
        self.rt.block_on(mock.mount(&self.server));
    }

    /// Token issuance that only accepts the test account
    pub fn mount_token(&self) {
        self.mount(
            Mock::given(method("POST"))
                .and(path("/auth/v1/token"))
                .and(wiremock::matchers::body_json(json!({ "account_number": ACCOUNT })))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(json!({ "access_token": TOKEN })),
                ),
        );
    }

    /// Device listing that requires the bearer token
    pub fn mount_devices(&self, body: serde_json::Value) {
        self.mount(
            Mock::given(method("GET"))
                .and(path("/accounts/v1/devices"))
                .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
                .respond_with(ResponseTemplate::new(200).set_body_json(body)),
        );
    }

    /// Check every mounted expectation
    pub fn verify(&self) {
        self.rt.block_on(self.server.verify());
    }

    /// Paths of every DELETE the server received, in order
    pub fn deleted_paths(&self) -> Vec<String> {
        self.rt
            .block_on(self.server.received_requests())
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.method.as_str() == "DELETE")
            .map(|request| request.url.path().to_string())
            .collect()
    }
}
