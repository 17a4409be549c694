//! 게이트웨이 에러 분류.
//!
//! 검증 에러는 네트워크 요청 이전에 동기적으로 반환되고,
//! 나머지는 전송 경계에서 포착되어 커넥터의 `die_on_error`
//! 정책으로 라우팅됩니다.

use coinbot_core::ValidationError;
use thiserror::Error;

/// 게이트웨이 작업을 위한 Result 타입.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// 게이트웨이 에러 분류 체계.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// 호출자 입력 검증 실패 (네트워크로 전송되지 않음)
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// 연결 실패
    #[error("network error: {0}")]
    Network(String),

    /// 타임아웃 만료
    #[error("request timeout: {0}")]
    Timeout(String),

    /// 잘못된 응답 (디코드 실패)
    #[error("protocol error: {0}")]
    Protocol(String),

    /// 거래소가 거부한 요청 (4xx/5xx + 거래소 메시지)
    #[error("exchange rejected request ({status}): {message}")]
    Rejected {
        /// HTTP 상태 코드
        status: u16,
        /// 거래소 응답 메시지
        message: String,
    },

    /// 서명 타임스탬프 만료 (시스템 시계 불일치)
    #[error("auth clock skew ({status}): {message} (hint: check your system time is using NTP)")]
    AuthClockSkew {
        /// HTTP 상태 코드
        status: u16,
        /// 거래소 응답 메시지
        message: String,
    },
}

impl GatewayError {
    /// 일시적 장애인지 확인합니다 (재시도는 호출자의 몫).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GatewayError::Network(_) | GatewayError::Timeout(_) | GatewayError::AuthClockSkew { .. }
        )
    }

    /// 호출자 쪽 결함으로 인한 치명적 에러인지 확인합니다.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GatewayError::Validation(_))
    }

    /// 클라이언트(4xx) 거부인지 확인합니다.
    pub fn is_client_rejection(&self) -> bool {
        matches!(self, GatewayError::Rejected { status, .. } if (400..500).contains(status))
    }

    /// 서버(5xx) 거부인지 확인합니다.
    pub fn is_server_rejection(&self) -> bool {
        matches!(self, GatewayError::Rejected { status, .. } if (500..600).contains(status))
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout(err.to_string())
        } else if err.is_connect() {
            GatewayError::Network(err.to_string())
        } else if err.is_decode() {
            GatewayError::Protocol(err.to_string())
        } else {
            GatewayError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Protocol(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(GatewayError::Network("refused".to_string()).is_transient());
        assert!(GatewayError::Timeout("30s".to_string()).is_transient());
        assert!(GatewayError::AuthClockSkew {
            status: 401,
            message: "request timestamp expired".to_string()
        }
        .is_transient());

        let rejected = GatewayError::Rejected {
            status: 400,
            message: "Invalid order".to_string(),
        };
        assert!(!rejected.is_transient());
    }

    #[test]
    fn test_rejection_status_ranges() {
        let client = GatewayError::Rejected {
            status: 404,
            message: "NotFound".to_string(),
        };
        assert!(client.is_client_rejection());
        assert!(!client.is_server_rejection());

        let server = GatewayError::Rejected {
            status: 503,
            message: "Service Unavailable".to_string(),
        };
        assert!(server.is_server_rejection());
    }

    #[test]
    fn test_validation_is_fatal() {
        let err: GatewayError = ValidationError::InvalidMarket("btc-gbp".to_string()).into();
        assert!(err.is_fatal());
        assert!(!err.is_transient());
    }
}
