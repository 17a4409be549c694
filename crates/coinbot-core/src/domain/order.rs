//! 주문 타입.
//!
//! 이 모듈은 게이트웨이의 주문 관련 타입을 정의합니다:
//! - `Side` - 주문 방향 (매수/매도)
//! - `OrderType` - 주문 유형 (시장가/지정가/스톱)
//! - `OrderStatus` - 거래소가 보고하는 주문 상태
//! - `OrderStatusFilter` - 주문 조회 필터
//! - `OrderRequest` - 주문 요청 (호출마다 생성, 저장되지 않음)
//! - `OrderRecord` - 정규화된 주문 레코드

use crate::types::Market;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 주문 방향 (매수 또는 매도).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// 매수
    Buy,
    /// 매도
    Sell,
}

impl Side {
    /// 거래소 와이어 표기를 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }

    /// 와이어 표기에서 파싱합니다.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "buy" => Some(Side::Buy),
            "sell" => Some(Side::Sell),
            _ => None,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 주문 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// 시장가 주문 - 현재 시장 가격으로 즉시 체결
    Market,
    /// 지정가 주문 - 지정 가격 이상/이하에서 체결
    Limit,
    /// 스톱 주문
    Stop,
}

impl OrderType {
    /// 거래소 와이어 표기를 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "market",
            OrderType::Limit => "limit",
            OrderType::Stop => "stop",
        }
    }

    /// 와이어 표기에서 파싱합니다. 알 수 없는 유형은 지정가로 간주합니다.
    pub fn from_wire(s: &str) -> Self {
        match s {
            "market" => OrderType::Market,
            "stop" => OrderType::Stop,
            _ => OrderType::Limit,
        }
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 거래소가 보고하는 주문 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// 호가창에 등록됨
    Open,
    /// 접수 대기 중
    Pending,
    /// 완료됨 (체결 또는 취소)
    Done,
    /// 활성 상태 (스톱 주문 대기)
    Active,
}

impl OrderStatus {
    /// 거래소 와이어 표기를 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Open => "open",
            OrderStatus::Pending => "pending",
            OrderStatus::Done => "done",
            OrderStatus::Active => "active",
        }
    }

    /// 와이어 표기에서 파싱합니다. 알 수 없는 상태는 open으로 간주합니다.
    pub fn from_wire(s: &str) -> Self {
        match s {
            "pending" => OrderStatus::Pending,
            "done" => OrderStatus::Done,
            "active" => OrderStatus::Active,
            _ => OrderStatus::Open,
        }
    }

    /// 주문이 최종 상태인지 확인합니다.
    pub fn is_final(&self) -> bool {
        matches!(self, OrderStatus::Done)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 주문 조회 상태 필터.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderStatusFilter {
    /// 모든 상태
    #[default]
    All,
    /// 특정 상태만
    Only(OrderStatus),
}

impl OrderStatusFilter {
    /// 쿼리 파라미터 값을 반환합니다.
    pub fn as_query_value(&self) -> &'static str {
        match self {
            OrderStatusFilter::All => "all",
            OrderStatusFilter::Only(status) => status.as_str(),
        }
    }

    /// 주어진 상태가 필터를 통과하는지 확인합니다.
    pub fn matches(&self, status: OrderStatus) -> bool {
        match self {
            OrderStatusFilter::All => true,
            OrderStatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

/// 새 주문 생성을 위한 주문 요청.
///
/// 호출마다 생성되며 절대 저장되지 않습니다. 시장가 매수는 funds
/// (호가 통화 금액), 시장가/지정가 매도는 size(기준 통화 수량)를
/// 사용합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// 대상 마켓
    pub market: Market,
    /// 주문 방향
    pub side: Side,
    /// 주문 유형
    pub order_type: OrderType,
    /// 기준 통화 수량 (매도/지정가)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Decimal>,
    /// 호가 통화 금액 (시장가 매수)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funds: Option<Decimal>,
    /// 지정가 (지정가 주문만)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
}

impl OrderRequest {
    /// 시장가 매수 요청을 생성합니다 (호가 통화 금액 지정).
    pub fn market_buy(market: Market, funds: Decimal) -> Self {
        Self {
            market,
            side: Side::Buy,
            order_type: OrderType::Market,
            size: None,
            funds: Some(funds),
            price: None,
        }
    }

    /// 시장가 매도 요청을 생성합니다 (기준 통화 수량 지정).
    pub fn market_sell(market: Market, size: Decimal) -> Self {
        Self {
            market,
            side: Side::Sell,
            order_type: OrderType::Market,
            size: Some(size),
            funds: None,
            price: None,
        }
    }

    /// 지정가 매도 요청을 생성합니다.
    pub fn limit_sell(market: Market, size: Decimal, price: Decimal) -> Self {
        Self {
            market,
            side: Side::Sell,
            order_type: OrderType::Limit,
            size: Some(size),
            funds: None,
            price: Some(price),
        }
    }
}

/// 정규화된 주문 레코드.
///
/// 거래소 응답에서 호출마다 새로 생성됩니다. `price`는 체결
/// 평균가로 계산된 값이며, 원시 필드를 그대로 보관하지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// 주문 생성 시각
    pub created_at: DateTime<Utc>,
    /// 마켓 심볼
    pub market: String,
    /// 주문 방향
    pub side: Side,
    /// 주문 유형
    pub order_type: OrderType,
    /// 주문 수량/금액 (specified_funds, 없으면 filled로 폴백)
    pub size: Decimal,
    /// 체결 수량
    pub filled: Decimal,
    /// 체결 수수료
    pub fees: Decimal,
    /// 평균 체결 가격 (체결 없으면 0)
    pub price: Decimal,
    /// 주문 상태
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_side_wire_roundtrip() {
        assert_eq!(Side::from_wire("buy"), Some(Side::Buy));
        assert_eq!(Side::from_wire("sell"), Some(Side::Sell));
        assert_eq!(Side::from_wire("hold"), None);
        assert_eq!(Side::Buy.to_string(), "buy");
    }

    #[test]
    fn test_status_from_wire_defaults_to_open() {
        assert_eq!(OrderStatus::from_wire("done"), OrderStatus::Done);
        assert_eq!(OrderStatus::from_wire("active"), OrderStatus::Active);
        assert_eq!(OrderStatus::from_wire("???"), OrderStatus::Open);
    }

    #[test]
    fn test_status_filter() {
        assert_eq!(OrderStatusFilter::All.as_query_value(), "all");
        assert_eq!(
            OrderStatusFilter::Only(OrderStatus::Done).as_query_value(),
            "done"
        );
        assert!(OrderStatusFilter::All.matches(OrderStatus::Pending));
        assert!(OrderStatusFilter::Only(OrderStatus::Done).matches(OrderStatus::Done));
        assert!(!OrderStatusFilter::Only(OrderStatus::Done).matches(OrderStatus::Open));
    }

    #[test]
    fn test_market_buy_request() {
        let request = OrderRequest::market_buy(Market::hyphenated("BTC", "GBP"), dec!(100));
        assert_eq!(request.side, Side::Buy);
        assert_eq!(request.order_type, OrderType::Market);
        assert_eq!(request.funds, Some(dec!(100)));
        assert_eq!(request.size, None);
    }

    #[test]
    fn test_limit_sell_request() {
        let request =
            OrderRequest::limit_sell(Market::hyphenated("BTC", "GBP"), dec!(0.5), dec!(40000));
        assert_eq!(request.side, Side::Sell);
        assert_eq!(request.order_type, OrderType::Limit);
        assert_eq!(request.size, Some(dec!(0.5)));
        assert_eq!(request.price, Some(dec!(40000)));
    }
}
