//! API 자격증명.
//!
//! 자격증명은 세션 시작 시 한 번 생성되어 프로세스 수명 동안 유지됩니다.
//! 형태 검증(길이/문자 집합)은 거래소별 규칙을 아는
//! `coinbot-exchange`의 검증 모듈이 수행하며, 이 타입은
//! 이미 검증된 값을 담는 불변 컨테이너입니다.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// 거래소 API 자격증명.
///
/// # 보안
/// - `secret`과 `passphrase`는 `SecretString`으로 보관됩니다.
/// - `Debug` 구현은 민감 정보를 마스킹합니다.
#[derive(Clone)]
pub struct Credentials {
    /// API 키
    key: String,
    /// API 시크릿
    secret: SecretString,
    /// API passphrase (Coinbase Pro 계열만 사용)
    passphrase: Option<SecretString>,
    /// REST API base URL (후행 슬래시로 정규화됨)
    base_url: String,
}

impl Credentials {
    /// 이미 검증된 필드로 자격증명을 생성합니다.
    ///
    /// 형태 검증은 수행하지 않습니다 — 호출자는
    /// `coinbot-exchange`의 `validate_credentials`를 통해 생성하거나,
    /// 외부 설정 로더가 검증한 값을 전달해야 합니다.
    /// base URL은 후행 슬래시가 붙도록 정규화됩니다.
    pub fn new(
        key: impl Into<String>,
        secret: impl Into<String>,
        passphrase: Option<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Self {
            key: key.into(),
            secret: SecretString::from(secret.into()),
            passphrase: passphrase.map(SecretString::from),
            base_url,
        }
    }

    /// API 키 반환.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// API 시크릿 평문 반환 (서명 계산 전용).
    pub fn expose_secret(&self) -> &str {
        self.secret.expose_secret()
    }

    /// passphrase 평문 반환 (인증 헤더 전용).
    pub fn expose_passphrase(&self) -> Option<&str> {
        self.passphrase.as_ref().map(|p| p.expose_secret())
    }

    /// 정규화된 base URL 반환.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let masked_key = if self.key.len() > 8 {
            format!("{}...{}", &self.key[..4], &self.key[self.key.len() - 4..])
        } else {
            "***REDACTED***".to_string()
        };

        f.debug_struct("Credentials")
            .field("key", &masked_key)
            .field("secret", &"***REDACTED***")
            .field("passphrase", &self.passphrase.as_ref().map(|_| "***REDACTED***"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalized() {
        let creds = Credentials::new("k", "s", None, "https://api.pro.coinbase.com");
        assert_eq!(creds.base_url(), "https://api.pro.coinbase.com/");

        let creds = Credentials::new("k", "s", None, "https://api.pro.coinbase.com/");
        assert_eq!(creds.base_url(), "https://api.pro.coinbase.com/");
    }

    #[test]
    fn test_debug_masks_secrets() {
        let creds = Credentials::new(
            "0123456789abcdef0123456789abcdef",
            "supersecret==",
            Some("abcdefghij".to_string()),
            "https://api.pro.coinbase.com",
        );
        let debug = format!("{:?}", creds);

        assert!(!debug.contains("supersecret"));
        assert!(!debug.contains("abcdefghij"));
        assert!(debug.contains("0123...cdef"));
    }

    #[test]
    fn test_expose_accessors() {
        let creds = Credentials::new("key", "secret", Some("pass".to_string()), "https://x/");
        assert_eq!(creds.key(), "key");
        assert_eq!(creds.expose_secret(), "secret");
        assert_eq!(creds.expose_passphrase(), Some("pass"));
    }
}
