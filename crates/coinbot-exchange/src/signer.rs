//! 요청 서명.
//!
//! Coinbase Pro 계열 인증: base64로 디코드한 시크릿을 키로
//! `timestamp ‖ METHOD ‖ path ‖ body`를 HMAC-SHA256 서명하고
//! base64로 인코드합니다. 타임스탬프는 요청 빌드 시점이 아니라
//! 전송 시점에 생성됩니다 (시계 불일치로 인한 거부 방지).

use crate::error::{GatewayError, GatewayResult};
use crate::transport::HttpMethod;
use base64::Engine;
use coinbot_core::{Credentials, ValidationError};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

/// 서명 타임스탬프 공급원.
///
/// 운영 코드는 `SystemClock`을 사용하고, 테스트는 고정 시계를
/// 주입하여 서명을 결정적으로 만듭니다.
pub trait Clock: Send + Sync {
    /// 유닉스 epoch 초 단위 타임스탬프 문자열을 반환합니다.
    fn timestamp(&self) -> String;
}

/// 시스템 시계.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn timestamp(&self) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        format!("{:.6}", now.as_secs_f64())
    }
}

/// 요청 인증 헤더 집합.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    /// CB-ACCESS-SIGN — base64 인코드된 서명
    pub signature: String,
    /// CB-ACCESS-TIMESTAMP — 서명에 사용된 타임스탬프
    pub timestamp: String,
    /// CB-ACCESS-KEY — API 키
    pub key: String,
    /// CB-ACCESS-PASSPHRASE — API passphrase (해당 거래소만)
    pub passphrase: Option<String>,
}

/// 요청 서명기.
///
/// 고정된 입력에 대해 결정적입니다. 동시 호출 간 조율은 필요
/// 없으며, 타임스탬프는 요청마다 자체 일관성만 가지면 됩니다.
pub struct RequestSigner {
    credentials: Credentials,
    clock: Box<dyn Clock>,
}

impl RequestSigner {
    /// 시스템 시계를 사용하는 서명기를 생성합니다.
    pub fn new(credentials: Credentials) -> Self {
        Self::with_clock(credentials, Box::new(SystemClock))
    }

    /// 주어진 시계를 사용하는 서명기를 생성합니다.
    pub fn with_clock(credentials: Credentials, clock: Box<dyn Clock>) -> Self {
        Self { credentials, clock }
    }

    /// 전송 시점 타임스탬프로 요청을 서명합니다.
    pub fn sign_now(
        &self,
        method: HttpMethod,
        path: &str,
        body: &str,
    ) -> GatewayResult<SignedHeaders> {
        self.sign(method, path, body, &self.clock.timestamp())
    }

    /// 주어진 타임스탬프로 요청을 서명합니다.
    ///
    /// # Errors
    /// 시크릿이 base64가 아니면 `ValidationError`를 반환합니다
    /// (패닉하지 않습니다).
    pub fn sign(
        &self,
        method: HttpMethod,
        path: &str,
        body: &str,
        timestamp: &str,
    ) -> GatewayResult<SignedHeaders> {
        let hmac_key = base64::engine::general_purpose::STANDARD
            .decode(self.credentials.expose_secret())
            .map_err(|e| {
                GatewayError::Validation(ValidationError::credential("secret", e.to_string()))
            })?;

        let message = format!("{}{}{}{}", timestamp, method.as_str(), path, body);

        let mut mac = HmacSha256::new_from_slice(&hmac_key)
            .map_err(|e| GatewayError::Protocol(e.to_string()))?;
        mac.update(message.as_bytes());
        let signature =
            base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes());

        Ok(SignedHeaders {
            signature,
            timestamp: timestamp.to_string(),
            key: self.credentials.key().to_string(),
            passphrase: self.credentials.expose_passphrase().map(str::to_string),
        })
    }
}
