//! 계좌 및 수수료 레코드.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// 수수료 폴백 기본값: 메이커 수수료율.
pub const DEFAULT_MAKER_FEE_RATE: Decimal = dec!(0.005);

/// 수수료 폴백 기본값: 테이커 수수료율.
pub const DEFAULT_TAKER_FEE_RATE: Decimal = dec!(0.005);

/// 정규화된 계좌 레코드.
///
/// 잔고가 0인 계좌는 관례상 정규화 단계에서 제외됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// 계좌 ID
    pub id: String,
    /// 통화 (예: "BTC")
    pub currency: String,
    /// 총 잔고
    pub balance: Decimal,
    /// 사용 가능한 잔고
    pub available: Decimal,
    /// 주문에 묶인 잔고
    pub hold: Decimal,
}

/// 정규화된 수수료 레코드.
///
/// 응답에 필드가 없으면 문서화된 기본값이 적용됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeRecord {
    /// 메이커 수수료율
    pub maker_rate: Decimal,
    /// 테이커 수수료율
    pub taker_rate: Decimal,
    /// 30일 USD 거래량
    pub usd_volume: Decimal,
}

impl Default for FeeRecord {
    fn default() -> Self {
        Self {
            maker_rate: DEFAULT_MAKER_FEE_RATE,
            taker_rate: DEFAULT_TAKER_FEE_RATE,
            usd_volume: Decimal::ZERO,
        }
    }
}
