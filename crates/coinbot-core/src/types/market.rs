//! 트레이딩 마켓(거래쌍) 정의.
//!
//! 마켓은 기준 통화(base), 호가 통화(quote), 그리고 거래소 표기
//! 심볼로 구성됩니다. 불변식: 심볼은 base + 구분자 + quote로
//! 정확히 재구성됩니다.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 거래 가능한 마켓 (거래쌍).
///
/// 생성자는 심볼 재구성 불변식을 보장합니다. 거래소 문법에 대한
/// 검증(문자 집합, 길이, quote 접미사 해석)은 `coinbot-exchange`의
/// 검증 모듈이 수행합니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Market {
    /// 기준 통화 (예: BTC)
    pub base_currency: String,
    /// 호가 통화 (예: GBP, USDT)
    pub quote_currency: String,
    /// 거래소 표기 심볼 (예: "BTC-GBP", "BTCUSDT")
    pub symbol: String,
}

impl Market {
    /// 하이픈 구분 심볼 마켓을 생성합니다 (Coinbase Pro 표기).
    pub fn hyphenated(base: impl Into<String>, quote: impl Into<String>) -> Self {
        let base = base.into();
        let quote = quote.into();
        let symbol = format!("{}-{}", base, quote);
        Self {
            base_currency: base,
            quote_currency: quote,
            symbol,
        }
    }

    /// 연결 심볼 마켓을 생성합니다 (Binance 표기).
    pub fn concatenated(base: impl Into<String>, quote: impl Into<String>) -> Self {
        let base = base.into();
        let quote = quote.into();
        let symbol = format!("{}{}", base, quote);
        Self {
            base_currency: base,
            quote_currency: quote,
            symbol,
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}
