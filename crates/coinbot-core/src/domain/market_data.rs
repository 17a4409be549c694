//! 시장 데이터 레코드.
//!
//! - `CandleRecord` - 정규화된 캔들 (시간 오름차순 불변식)
//! - `Ticker` - 마켓의 현재 시세 스냅숏

use crate::types::Granularity;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 정규화된 캔들 레코드.
///
/// 거래소는 최신순으로 캔들을 전달하지만, 정규화된 시퀀스는
/// 타임스탬프가 단조 비감소하는 과거순입니다. 모든 레코드에
/// 마켓과 granularity가 부착됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleRecord {
    /// 버킷 시작 시각
    pub timestamp: DateTime<Utc>,
    /// 마켓 심볼
    pub market: String,
    /// 캔들 버킷 폭
    pub granularity: Granularity,
    /// 시가
    pub open: Decimal,
    /// 고가
    pub high: Decimal,
    /// 저가
    pub low: Decimal,
    /// 종가
    pub close: Decimal,
    /// 거래량
    pub volume: Decimal,
}

/// 마켓 시세 스냅숏.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    /// 시세 시각
    pub timestamp: DateTime<Utc>,
    /// 마지막 체결 가격
    pub price: Decimal,
}
