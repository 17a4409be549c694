//! HTTP 전송 계층.
//!
//! GET/POST/DELETE 호출을 실행하고, 유한한 타임아웃을 적용하며,
//! 전송/HTTP 실패를 `GatewayError` 분류 체계로 변환합니다.
//! base URL 허용 목록 검증은 이 계층에 도달하기 전에
//! (자격증명/커넥터 설정 생성 시) 완료됩니다.

use crate::error::{GatewayError, GatewayResult};
use crate::signer::SignedHeaders;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};

/// 허용되는 HTTP 메서드.
///
/// 닫힌 열거형이므로 GET/POST/DELETE 외의 메서드는 타입 수준에서
/// 표현 불가능하며, 네트워크 I/O 이전에 거부됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// DELETE
    Delete,
}

impl HttpMethod {
    /// 서명 메시지에 들어가는 대문자 표기를 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// 게이트웨이 HTTP 클라이언트.
///
/// 호출 간 공유되는 가변 상태가 없어 동시 호출에 조율이 필요
/// 없습니다. 모든 호출은 유한한 타임아웃을 가지며 무기한
/// 블록하지 않습니다.
pub struct GatewayClient {
    http: Client,
    base_url: String,
}

impl GatewayClient {
    /// 새 클라이언트를 생성합니다.
    ///
    /// `base_url`은 허용 목록 검증을 마친 URL이어야 합니다.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `GatewayError::Network`를
    /// 반환합니다.
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> GatewayResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| GatewayError::Network(format!("failed to build HTTP client: {}", e)))?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self { http, base_url })
    }

    /// REST 호출을 실행하고 디코드된 JSON을 반환합니다.
    ///
    /// `path`는 쿼리 문자열을 포함한 선행 슬래시 경로입니다
    /// (예: "/orders?status=all"). 서명 메시지의 경로와 동일한
    /// 문자열이어야 합니다.
    ///
    /// HTTP 200이면 디코드된 JSON을 반환합니다. 그 외 상태에서는
    /// 거래소 메시지를 검사하여 타임스탬프 만료를 별도 분류하고,
    /// 나머지는 상태 코드와 메시지를 담아 거부로 분류합니다.
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&serde_json::Value>,
        auth: Option<&SignedHeaders>,
    ) -> GatewayResult<serde_json::Value> {
        let url = format!("{}{}", self.base_url, path);

        debug!(method = method.as_str(), %url, "gateway request");

        let mut builder = match method {
            HttpMethod::Get => self.http.get(&url),
            HttpMethod::Post => self.http.post(&url),
            HttpMethod::Delete => self.http.delete(&url),
        };

        if let Some(headers) = auth {
            builder = builder
                .header("CB-ACCESS-SIGN", &headers.signature)
                .header("CB-ACCESS-TIMESTAMP", &headers.timestamp)
                .header("CB-ACCESS-KEY", &headers.key);
            if let Some(passphrase) = &headers.passphrase {
                builder = builder.header("CB-ACCESS-PASSPHRASE", passphrase);
            }
        }

        builder = builder.header("Content-Type", "application/json");

        if let Some(json) = body {
            builder = builder.json(json);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return serde_json::from_str(&text).map_err(|e| {
                error!(%url, error = %e, "failed to decode response body");
                GatewayError::Protocol(e.to_string())
            });
        }

        let message = exchange_message(&text);

        if message == "request timestamp expired" {
            error!(
                method = method.as_str(),
                %url,
                status = status.as_u16(),
                %message,
                "auth clock skew"
            );
            return Err(GatewayError::AuthClockSkew {
                status: status.as_u16(),
                message,
            });
        }

        error!(
            method = method.as_str(),
            %url,
            status = status.as_u16(),
            %message,
            "exchange rejected request"
        );
        Err(GatewayError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

/// 에러 응답 본문에서 거래소 메시지를 추출합니다.
///
/// `msg` 또는 `message` 필드를 차례로 찾고, 둘 다 없으면 본문
/// 전체를 그대로 사용합니다.
fn exchange_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["msg", "message"] {
            if let Some(message) = json.get(field).and_then(|v| v.as_str()) {
                return message.to_string();
            }
        }
    }
    body.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_request_decodes_success_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/time")
            .with_status(200)
            .with_body(r#"{"iso":"2021-01-01T00:00:00.000Z","epoch":1609459200.0}"#)
            .create_async()
            .await;

        let client = GatewayClient::new(server.url(), 5).unwrap();
        let json = client
            .request(HttpMethod::Get, "/time", None, None)
            .await
            .unwrap();

        assert_eq!(json["epoch"], 1609459200.0);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_timestamp_expired_classified_as_clock_skew() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/accounts")
            .with_status(401)
            .with_body(r#"{"message":"request timestamp expired"}"#)
            .create_async()
            .await;

        let client = GatewayClient::new(server.url(), 5).unwrap();
        let err = client
            .request(HttpMethod::Get, "/accounts", None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::AuthClockSkew { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_generic_401_is_rejection_not_clock_skew() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/accounts")
            .with_status(401)
            .with_body(r#"{"message":"Invalid API Key"}"#)
            .create_async()
            .await;

        let client = GatewayClient::new(server.url(), 5).unwrap();
        let err = client
            .request(HttpMethod::Get, "/accounts", None, None)
            .await
            .unwrap_err();

        match err {
            GatewayError::Rejected { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API Key");
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_client_and_server_rejections() {
        let mut server = mockito::Server::new_async().await;
        let _m404 = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body(r#"{"message":"NotFound"}"#)
            .create_async()
            .await;
        let _m503 = server
            .mock("GET", "/busy")
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let client = GatewayClient::new(server.url(), 5).unwrap();

        let err = client
            .request(HttpMethod::Get, "/missing", None, None)
            .await
            .unwrap_err();
        assert!(err.is_client_rejection());

        let err = client
            .request(HttpMethod::Get, "/busy", None, None)
            .await
            .unwrap_err();
        assert!(err.is_server_rejection());
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_protocol_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/time")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let client = GatewayClient::new(server.url(), 5).unwrap();
        let err = client
            .request(HttpMethod::Get, "/time", None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_auth_headers_forwarded() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/accounts")
            .match_header("CB-ACCESS-KEY", "my-key")
            .match_header("CB-ACCESS-TIMESTAMP", "1609459200")
            .match_header("CB-ACCESS-PASSPHRASE", "abcdefghij")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let headers = SignedHeaders {
            signature: "sig".to_string(),
            timestamp: "1609459200".to_string(),
            key: "my-key".to_string(),
            passphrase: Some("abcdefghij".to_string()),
        };

        let client = GatewayClient::new(server.url(), 5).unwrap();
        client
            .request(HttpMethod::Get, "/accounts", None, Some(&headers))
            .await
            .unwrap();

        mock.assert_async().await;
    }
}
