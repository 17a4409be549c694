//! 거래소 게이트웨이.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 마켓 심볼/자격증명 검증 (거래소별 문법 테이블)
//! - 요청 서명 (HMAC-SHA256, 주입 가능한 시계)
//! - HTTP 전송 계층 (타임아웃, 에러 분류)
//! - 수량 양자화 (증분 단위 내림)
//! - 응답 정규화 (주문/캔들/수수료/계좌)
//! - Coinbase Pro 커넥터 (인증 + 공개 API)

pub mod connector;
pub mod error;
pub mod normalize;
pub mod quantize;
pub mod signer;
pub mod transport;
pub mod validate;

pub use connector::coinbase::{
    CoinbaseClient, CoinbaseConfig, CoinbaseEnvironment, CoinbasePublicClient,
    MINIMUM_TRADE_AMOUNT,
};
pub use error::{GatewayError, GatewayResult};
pub use normalize::*;
pub use quantize::quantize;
pub use signer::{Clock, RequestSigner, SignedHeaders, SystemClock};
pub use transport::{GatewayClient, HttpMethod};
pub use validate::{
    is_account_id_valid, is_market_valid, parse_market, validate_base_url, validate_credentials,
    ExchangeId,
};
