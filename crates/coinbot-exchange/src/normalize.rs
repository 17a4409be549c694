//! 응답 정규화.
//!
//! 거래소의 느슨한 와이어 응답(문자열 숫자, 위치 기반 배열,
//! 선택적 필드)을 명시적 레코드 타입으로 변환합니다. 정규화는
//! 순수하고 상태가 없으며, 잘 형성된 입력에 대해 전역적입니다:
//! 실패 대신 문서화된 안전 폴백(0 대입, 항등 통과)을 적용합니다.

use chrono::{DateTime, Utc};
use coinbot_core::{
    AccountRecord, CandleRecord, FeeRecord, Granularity, OrderRecord, OrderStatus,
    OrderStatusFilter, OrderType, Side, Ticker, DEFAULT_MAKER_FEE_RATE, DEFAULT_TAKER_FEE_RATE,
};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

// ============================================================================
// 와이어 응답 타입
// ============================================================================

/// 주문 와이어 응답.
///
/// `specified_funds`는 수동으로 넣은 지정가 주문에는 존재하지
/// 않습니다 — 실패 대신 None으로 대체됩니다.
#[derive(Debug, Clone, Deserialize)]
pub struct RawOrder {
    pub created_at: Option<String>,
    pub product_id: Option<String>,
    pub side: Option<String>,
    #[serde(rename = "type")]
    pub order_type: Option<String>,
    pub size: Option<String>,
    pub price: Option<String>,
    pub filled_size: Option<String>,
    pub specified_funds: Option<String>,
    pub executed_value: Option<String>,
    pub fill_fees: Option<String>,
    pub status: Option<String>,
}

/// 캔들 와이어 응답: [epoch, low, high, open, close, volume].
#[derive(Debug, Clone, Deserialize)]
pub struct RawCandle(pub f64, pub f64, pub f64, pub f64, pub f64, pub f64);

/// 계좌 와이어 응답.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAccount {
    pub id: String,
    pub currency: String,
    pub balance: Option<String>,
    pub available: Option<String>,
    pub hold: Option<String>,
}

/// 수수료 와이어 응답.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFees {
    pub maker_fee_rate: Option<String>,
    pub taker_fee_rate: Option<String>,
    pub usd_volume: Option<String>,
}

/// 시세 와이어 응답.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTicker {
    pub time: Option<String>,
    pub price: Option<String>,
}

/// 상품(마켓 메타데이터) 와이어 응답.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProduct {
    pub base_increment: Option<String>,
    pub quote_increment: Option<String>,
}

/// 서버 시간 와이어 응답.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTime {
    pub epoch: Option<f64>,
}

// ============================================================================
// 파싱 헬퍼
// ============================================================================

/// 문자열 숫자 필드를 Decimal로 파싱합니다. 없거나 파싱 불가하면 0.
fn parse_decimal(value: &Option<String>) -> Decimal {
    value
        .as_deref()
        .and_then(|s| s.parse().ok())
        .unwrap_or(Decimal::ZERO)
}

/// RFC 3339 타임스탬프를 파싱합니다. 없거나 파싱 불가하면 epoch 0
/// (정규화가 결정적으로 유지되도록 현재 시각으로 폴백하지 않음).
fn parse_timestamp(value: &Option<String>) -> DateTime<Utc> {
    value
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

fn decimal_from_f64(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

// ============================================================================
// 주문 정규화
// ============================================================================

/// 단일 주문 응답을 정규화합니다.
///
/// 평균 체결 가격 = executed_value / filled_size (filled_size > 0일
/// 때), 아니면 0 (명시적 0 나눗셈 가드). 미체결(open) 주문은 와이어
/// size/price를 그대로 사용하고 체결량/수수료는 0입니다.
pub fn normalize_order(raw: &RawOrder) -> OrderRecord {
    let status = OrderStatus::from_wire(raw.status.as_deref().unwrap_or(""));
    let side = raw
        .side
        .as_deref()
        .and_then(Side::from_wire)
        .unwrap_or(Side::Buy);
    let order_type = OrderType::from_wire(raw.order_type.as_deref().unwrap_or(""));

    let (size, filled, fees, price) = if status == OrderStatus::Open {
        (
            parse_decimal(&raw.size),
            Decimal::ZERO,
            Decimal::ZERO,
            parse_decimal(&raw.price),
        )
    } else {
        let filled = parse_decimal(&raw.filled_size);
        let executed = parse_decimal(&raw.executed_value);
        let fees = parse_decimal(&raw.fill_fees);

        let price = if filled > Decimal::ZERO {
            executed / filled
        } else {
            Decimal::ZERO
        };

        // 수동 지정가 주문에는 specified_funds가 없다: filled로 폴백
        let size = match &raw.specified_funds {
            Some(_) => parse_decimal(&raw.specified_funds),
            None => filled,
        };

        (size, filled, fees, price)
    };

    OrderRecord {
        created_at: parse_timestamp(&raw.created_at),
        market: raw.product_id.clone().unwrap_or_default(),
        side,
        order_type,
        size,
        filled,
        fees,
        price,
        status,
    }
}

/// 주문 목록을 정규화합니다.
///
/// 거래소는 최신순으로 전달합니다. 선택적 필터(마켓/방향/상태)를
/// 적용한 뒤 과거순(시간 오름차순)으로 뒤집어 반환합니다.
pub fn normalize_orders(
    raw: &[RawOrder],
    market: Option<&str>,
    side: Option<Side>,
    status: OrderStatusFilter,
) -> Vec<OrderRecord> {
    raw.iter()
        .map(normalize_order)
        .filter(|order| market.map_or(true, |m| order.market == m))
        .filter(|order| side.map_or(true, |s| order.side == s))
        .filter(|order| status.matches(order.status))
        .rev()
        .collect()
}

// ============================================================================
// 캔들 정규화
// ============================================================================

/// 캔들 목록을 정규화합니다.
///
/// 거래소는 최신순으로 전달하므로 과거순으로 뒤집고, 모든
/// 레코드에 마켓과 granularity를 부착합니다. 결과 시퀀스의
/// 타임스탬프는 단조 비감소입니다.
pub fn normalize_candles(
    raw: &[RawCandle],
    market: &str,
    granularity: Granularity,
) -> Vec<CandleRecord> {
    raw.iter()
        .rev()
        .map(|candle| CandleRecord {
            timestamp: DateTime::from_timestamp(candle.0 as i64, 0).unwrap_or(DateTime::UNIX_EPOCH),
            market: market.to_string(),
            granularity,
            low: decimal_from_f64(candle.1),
            high: decimal_from_f64(candle.2),
            open: decimal_from_f64(candle.3),
            close: decimal_from_f64(candle.4),
            volume: decimal_from_f64(candle.5),
        })
        .collect()
}

// ============================================================================
// 수수료/계좌/시세 정규화
// ============================================================================

/// 수수료 응답을 정규화합니다. 없는 필드에는 문서화된 기본값을
/// 적용하고 경고를 남깁니다.
pub fn normalize_fees(raw: &RawFees) -> FeeRecord {
    let maker_rate = match &raw.maker_fee_rate {
        Some(_) => parse_decimal(&raw.maker_fee_rate),
        None => {
            warn!(
                "'maker_fee_rate' not in fees (using {} as a fallback)",
                DEFAULT_MAKER_FEE_RATE
            );
            DEFAULT_MAKER_FEE_RATE
        }
    };

    let taker_rate = match &raw.taker_fee_rate {
        Some(_) => parse_decimal(&raw.taker_fee_rate),
        None => {
            warn!(
                "'taker_fee_rate' not in fees (using {} as a fallback)",
                DEFAULT_TAKER_FEE_RATE
            );
            DEFAULT_TAKER_FEE_RATE
        }
    };

    FeeRecord {
        maker_rate,
        taker_rate,
        usd_volume: parse_decimal(&raw.usd_volume),
    }
}

/// 단일 계좌 응답을 정규화합니다.
pub fn normalize_account(raw: &RawAccount) -> AccountRecord {
    AccountRecord {
        id: raw.id.clone(),
        currency: raw.currency.clone(),
        balance: parse_decimal(&raw.balance),
        available: parse_decimal(&raw.available),
        hold: parse_decimal(&raw.hold),
    }
}

/// 계좌 목록을 정규화합니다. 잔고가 0인 계좌는 관례상 제외합니다.
pub fn normalize_accounts(raw: &[RawAccount]) -> Vec<AccountRecord> {
    raw.iter()
        .map(normalize_account)
        .filter(|account| account.balance != Decimal::ZERO)
        .collect()
}

/// 시세 응답을 정규화합니다.
///
/// 필드가 없으면 (현재 시각, 0)으로 강등됩니다 — 시세는 스냅숏
/// 값이므로 여기서는 현재 시각 폴백이 의도된 동작입니다.
pub fn normalize_ticker(raw: &RawTicker) -> Ticker {
    match (&raw.time, &raw.price) {
        (Some(time), Some(_)) if DateTime::parse_from_rfc3339(time).is_ok() => Ticker {
            timestamp: parse_timestamp(&raw.time),
            price: parse_decimal(&raw.price),
        },
        _ => Ticker {
            timestamp: Utc::now(),
            price: Decimal::ZERO,
        },
    }
}
