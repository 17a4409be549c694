//! Coinbase Pro 커넥터.
//!
//! 인증 REST API(계좌/수수료/주문)와 공개 REST API(캔들/시세/서버
//! 시간) 구현. 운영망과 샌드박스를 모두 지원합니다.
//!
//! 전송/HTTP 실패는 `die_on_error` 정책으로 라우팅됩니다:
//! - `true`: 진단 컨텍스트를 로그로 남기고 즉시 프로세스를 종료
//! - `false`: 로그 후 빈 결과로 강등 (호출자는 "데이터 없음"과
//!   동일하게 취급)
//!
//! 검증 에러는 정책과 무관하게 항상 호출자에게 반환됩니다.

use crate::error::{GatewayError, GatewayResult};
use crate::normalize::{
    normalize_account, normalize_accounts, normalize_candles, normalize_fees, normalize_order,
    normalize_orders, normalize_ticker, RawAccount, RawCandle, RawFees, RawOrder, RawProduct,
    RawTicker, RawTime,
};
use crate::quantize::quantize;
use crate::signer::{Clock, RequestSigner};
use crate::transport::{GatewayClient, HttpMethod};
use crate::validate::{
    is_account_id_valid, is_market_valid, parse_market, validate_credentials, ExchangeId,
};
use chrono::{DateTime, Utc};
use coinbot_core::{
    AccountRecord, CandleRecord, Credentials, FeeRecord, Granularity, OrderRecord, OrderRequest,
    OrderStatusFilter, Side, Ticker, ValidationError, DEFAULT_MAKER_FEE_RATE,
    DEFAULT_TAKER_FEE_RATE,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use std::process;
use tracing::{debug, error, info, warn};

/// 최소 주문 금액 (호가 통화 기준).
pub const MINIMUM_TRADE_AMOUNT: Decimal = dec!(10);

/// 기본 요청 타임아웃 (초).
const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// 설정
// ============================================================================

/// Coinbase Pro 환경 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoinbaseEnvironment {
    /// 운영망
    #[default]
    Production,
    /// 샌드박스
    Sandbox,
}

impl CoinbaseEnvironment {
    /// 이 환경의 REST API 기본 URL 반환.
    pub fn rest_base_url(&self) -> &'static str {
        match self {
            CoinbaseEnvironment::Production => "https://api.pro.coinbase.com",
            CoinbaseEnvironment::Sandbox => "https://public.sandbox.pro.coinbase.com",
        }
    }
}

/// Coinbase Pro 클라이언트 설정.
///
/// `die_on_error`는 명시적으로만 설정되며 추론되지 않습니다.
#[derive(Debug, Clone)]
pub struct CoinbaseConfig {
    /// 검증된 API 자격증명 (base URL 포함)
    pub credentials: Credentials,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// 전송/API 에러 발생 시 프로세스를 종료할지 여부
    pub die_on_error: bool,
}

impl CoinbaseConfig {
    /// 검증된 자격증명으로 새 설정을 생성합니다.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            die_on_error: false,
        }
    }

    /// 요청 타임아웃을 설정합니다.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// 에러 시 프로세스 종료 정책을 설정합니다.
    pub fn with_die_on_error(mut self, die_on_error: bool) -> Self {
        self.die_on_error = die_on_error;
        self
    }

    /// 환경 변수에서 설정을 생성합니다.
    ///
    /// # 환경 변수
    /// - `COINBASE_API_KEY`, `COINBASE_API_SECRET`, `COINBASE_API_PASSPHRASE`
    /// - `COINBASE_SANDBOX`: "true"면 샌드박스 URL 사용
    ///
    /// 환경 변수가 없거나 자격증명 형태 검증에 실패하면 `None`을
    /// 반환합니다.
    pub fn from_env() -> Option<Self> {
        let key = std::env::var("COINBASE_API_KEY").ok()?;
        let secret = std::env::var("COINBASE_API_SECRET").ok()?;
        let passphrase = std::env::var("COINBASE_API_PASSPHRASE").ok()?;

        let environment = if std::env::var("COINBASE_SANDBOX")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false)
        {
            CoinbaseEnvironment::Sandbox
        } else {
            CoinbaseEnvironment::Production
        };

        let credentials = validate_credentials(
            ExchangeId::CoinbasePro,
            &key,
            &secret,
            Some(&passphrase),
            environment.rest_base_url(),
        )
        .ok()?;

        Some(Self::new(credentials))
    }
}

// ============================================================================
// 인증 클라이언트
// ============================================================================

/// Coinbase Pro 인증 클라이언트.
///
/// 불변 자격증명 외에 호출 간 공유되는 가변 상태가 없으므로,
/// 동시 호출에 조율이 필요 없습니다. 서명 타임스탬프는 요청마다
/// 전송 시점에 생성됩니다.
pub struct CoinbaseClient {
    config: CoinbaseConfig,
    transport: GatewayClient,
    signer: RequestSigner,
}

impl CoinbaseClient {
    /// 새 클라이언트를 생성합니다.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `GatewayError::Network`를
    /// 반환합니다.
    pub fn new(config: CoinbaseConfig) -> GatewayResult<Self> {
        let transport = GatewayClient::new(config.credentials.base_url(), config.timeout_secs)?;
        let signer = RequestSigner::new(config.credentials.clone());

        Ok(Self {
            config,
            transport,
            signer,
        })
    }

    /// 주어진 시계로 서명하는 클라이언트를 생성합니다 (테스트용).
    pub fn with_clock(config: CoinbaseConfig, clock: Box<dyn Clock>) -> GatewayResult<Self> {
        let transport = GatewayClient::new(config.credentials.base_url(), config.timeout_secs)?;
        let signer = RequestSigner::with_clock(config.credentials.clone(), clock);

        Ok(Self {
            config,
            transport,
            signer,
        })
    }

    /// 전송 시점 타임스탬프로 서명된 요청을 실행합니다.
    async fn signed_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> GatewayResult<serde_json::Value> {
        let body_text = body.as_ref().map(|b| b.to_string()).unwrap_or_default();
        let headers = self.signer.sign_now(method, path, &body_text)?;

        self.transport
            .request(method, path, body.as_ref(), Some(&headers))
            .await
    }

    /// 전송/API 에러를 `die_on_error` 정책으로 라우팅합니다.
    ///
    /// 검증 에러는 억제 대상이 아니며 그대로 반환됩니다.
    fn suppress<T>(
        &self,
        err: GatewayError,
        context: &'static str,
        fallback: impl FnOnce() -> T,
    ) -> GatewayResult<T> {
        if err.is_fatal() {
            return Err(err);
        }

        if self.config.die_on_error {
            error!(context = context, error = %err, "fatal gateway error, aborting (die_on_error)");
            process::exit(1);
        }

        error!(context = context, error = %err, "gateway error suppressed, degrading to empty result");
        Ok(fallback())
    }

    // === 계좌 작업 ===

    /// 계좌 목록을 조회합니다. 잔고가 0인 계좌는 제외됩니다.
    pub async fn get_accounts(&self) -> GatewayResult<Vec<AccountRecord>> {
        let raw = match self.signed_request(HttpMethod::Get, "/accounts", None).await {
            Ok(value) => value,
            Err(err) => return self.suppress(err, "GET /accounts", Vec::new),
        };

        let accounts: Vec<RawAccount> = match serde_json::from_value(raw) {
            Ok(accounts) => accounts,
            Err(err) => return self.suppress(err.into(), "GET /accounts", Vec::new),
        };

        Ok(normalize_accounts(&accounts))
    }

    /// 단일 계좌를 조회합니다.
    ///
    /// 계좌 ID는 네트워크 요청 전에 형태 검사를 통과해야 합니다.
    pub async fn get_account(&self, account_id: &str) -> GatewayResult<Option<AccountRecord>> {
        if !is_account_id_valid(account_id) {
            return Err(ValidationError::InvalidAccountId(account_id.to_string()).into());
        }

        let path = format!("/accounts/{}", account_id);
        let raw = match self.signed_request(HttpMethod::Get, &path, None).await {
            Ok(value) => value,
            Err(err) => return self.suppress(err, "GET /accounts/{id}", || None),
        };

        let account: RawAccount = match serde_json::from_value(raw) {
            Ok(account) => account,
            Err(err) => return self.suppress(err.into(), "GET /accounts/{id}", || None),
        };

        Ok(Some(normalize_account(&account)))
    }

    // === 수수료 작업 ===

    /// 수수료 일정을 조회합니다.
    ///
    /// `None`은 데이터 없음 또는 억제된 에러를 뜻합니다 (§die_on_error).
    pub async fn get_fees(&self) -> GatewayResult<Option<FeeRecord>> {
        let raw = match self.signed_request(HttpMethod::Get, "/fees", None).await {
            Ok(value) => value,
            Err(err) => return self.suppress(err, "GET /fees", || None),
        };

        let fees: RawFees = match serde_json::from_value(raw) {
            Ok(fees) => fees,
            Err(err) => return self.suppress(err.into(), "GET /fees", || None),
        };

        Ok(Some(normalize_fees(&fees)))
    }

    /// 메이커 수수료율을 조회합니다. 조회 불가 시 기본값으로
    /// 폴백합니다.
    pub async fn get_maker_fee(&self) -> GatewayResult<Decimal> {
        match self.get_fees().await? {
            Some(fees) => Ok(fees.maker_rate),
            None => {
                warn!(
                    "maker fee unavailable (using {} as a fallback)",
                    DEFAULT_MAKER_FEE_RATE
                );
                Ok(DEFAULT_MAKER_FEE_RATE)
            }
        }
    }

    /// 테이커 수수료율을 조회합니다. 조회 불가 시 기본값으로
    /// 폴백합니다.
    pub async fn get_taker_fee(&self) -> GatewayResult<Decimal> {
        match self.get_fees().await? {
            Some(fees) => Ok(fees.taker_rate),
            None => {
                warn!(
                    "taker fee unavailable (using {} as a fallback)",
                    DEFAULT_TAKER_FEE_RATE
                );
                Ok(DEFAULT_TAKER_FEE_RATE)
            }
        }
    }

    /// 30일 USD 거래량을 조회합니다. 조회 불가 시 0.
    pub async fn get_usd_volume(&self) -> GatewayResult<Decimal> {
        Ok(self
            .get_fees()
            .await?
            .map(|fees| fees.usd_volume)
            .unwrap_or(Decimal::ZERO))
    }

    // === 주문 작업 ===

    /// 주문 내역을 조회합니다 (선택적 마켓/방향/상태 필터).
    ///
    /// 결과는 시간 오름차순으로 정규화됩니다.
    pub async fn get_orders(
        &self,
        market: Option<&str>,
        side: Option<Side>,
        status: OrderStatusFilter,
    ) -> GatewayResult<Vec<OrderRecord>> {
        if let Some(symbol) = market {
            if !is_market_valid(ExchangeId::CoinbasePro, symbol) {
                return Err(ValidationError::InvalidMarket(symbol.to_string()).into());
            }
        }

        let path = format!("/orders?status={}", status.as_query_value());
        let raw = match self.signed_request(HttpMethod::Get, &path, None).await {
            Ok(value) => value,
            Err(err) => return self.suppress(err, "GET /orders", Vec::new),
        };

        let orders: Vec<RawOrder> = match serde_json::from_value(raw) {
            Ok(orders) => orders,
            Err(err) => return self.suppress(err.into(), "GET /orders", Vec::new),
        };

        Ok(normalize_orders(&orders, market, side, status))
    }

    /// 시장가 매수를 실행합니다 (호가 통화 금액 지정).
    ///
    /// 금액은 최소 주문 금액 이상이어야 하며, 거래소가 보고한
    /// quote_increment 해상도로 내림됩니다.
    pub async fn market_buy(
        &self,
        market: &str,
        funds: Decimal,
    ) -> GatewayResult<Option<OrderRecord>> {
        let market = parse_market(ExchangeId::CoinbasePro, market)?;

        if funds < MINIMUM_TRADE_AMOUNT {
            return Err(ValidationError::Order(format!(
                "trade amount is too small (>= {})",
                MINIMUM_TRADE_AMOUNT
            ))
            .into());
        }

        let funds = self
            .quantize_to_quote_increment(&market.symbol, funds)
            .await?;

        info!(market = %market, %funds, "placing market buy order");
        self.place_order(OrderRequest::market_buy(market, funds)).await
    }

    /// 시장가 매도를 실행합니다 (기준 통화 수량 지정).
    ///
    /// 수량은 거래소가 보고한 base_increment 해상도로 내림됩니다.
    pub async fn market_sell(
        &self,
        market: &str,
        size: Decimal,
    ) -> GatewayResult<Option<OrderRecord>> {
        let market = parse_market(ExchangeId::CoinbasePro, market)?;
        let size = self.quantize_to_base_increment(&market.symbol, size).await?;

        info!(market = %market, %size, "placing market sell order");
        self.place_order(OrderRequest::market_sell(market, size)).await
    }

    /// 지정가 매도 주문을 넣습니다.
    pub async fn limit_sell(
        &self,
        market: &str,
        size: Decimal,
        price: Decimal,
    ) -> GatewayResult<Option<OrderRecord>> {
        let market = parse_market(ExchangeId::CoinbasePro, market)?;
        let size = self.quantize_to_base_increment(&market.symbol, size).await?;

        info!(market = %market, %size, %price, "placing limit sell order");
        self.place_order(OrderRequest::limit_sell(market, size, price))
            .await
    }

    /// 마켓의 주문을 취소합니다. 취소된 주문 ID 목록을 반환합니다.
    pub async fn cancel_orders(&self, market: &str) -> GatewayResult<Vec<String>> {
        if !is_market_valid(ExchangeId::CoinbasePro, market) {
            return Err(ValidationError::InvalidMarket(market.to_string()).into());
        }

        let raw = match self.signed_request(HttpMethod::Delete, "/orders", None).await {
            Ok(value) => value,
            Err(err) => return self.suppress(err, "DELETE /orders", Vec::new),
        };

        match serde_json::from_value(raw) {
            Ok(ids) => Ok(ids),
            Err(err) => self.suppress(err.into(), "DELETE /orders", Vec::new),
        }
    }

    /// 거래소 서버 시간을 조회합니다.
    pub async fn get_time(&self) -> GatewayResult<Option<DateTime<Utc>>> {
        let raw = match self.signed_request(HttpMethod::Get, "/time", None).await {
            Ok(value) => value,
            Err(err) => return self.suppress(err, "GET /time", || None),
        };

        let time: RawTime = match serde_json::from_value(raw) {
            Ok(time) => time,
            Err(err) => return self.suppress(err.into(), "GET /time", || None),
        };

        Ok(time
            .epoch
            .and_then(|epoch| DateTime::from_timestamp(epoch as i64, 0)))
    }

    // === 내부 헬퍼 ===

    /// 주문 요청을 와이어 본문으로 직렬화합니다.
    fn order_body(request: &OrderRequest) -> serde_json::Value {
        let mut body = json!({
            "product_id": request.market.symbol,
            "type": request.order_type.as_str(),
            "side": request.side.as_str(),
        });

        if let Some(size) = request.size {
            body["size"] = json!(size.to_string());
        }
        if let Some(funds) = request.funds {
            body["funds"] = json!(funds.to_string());
        }
        if let Some(price) = request.price {
            body["price"] = json!(price.to_string());
        }

        body
    }

    async fn place_order(&self, request: OrderRequest) -> GatewayResult<Option<OrderRecord>> {
        let body = Self::order_body(&request);
        debug!(order = %body, "submitting order");

        let raw = match self
            .signed_request(HttpMethod::Post, "/orders", Some(body))
            .await
        {
            Ok(value) => value,
            Err(err) => return self.suppress(err, "POST /orders", || None),
        };

        let order: RawOrder = match serde_json::from_value(raw) {
            Ok(order) => order,
            Err(err) => return self.suppress(err.into(), "POST /orders", || None),
        };

        Ok(Some(normalize_order(&order)))
    }

    /// 마켓 메타데이터를 조회합니다. 조회 불가 시 `None`
    /// (양자화는 항등 통과로 폴백).
    async fn get_product(&self, market: &str) -> GatewayResult<Option<RawProduct>> {
        let path = format!("/products/{}", market);
        let raw = match self.signed_request(HttpMethod::Get, &path, None).await {
            Ok(value) => value,
            Err(err) => return self.suppress(err, "GET /products/{market}", || None),
        };

        match serde_json::from_value(raw) {
            Ok(product) => Ok(Some(product)),
            Err(err) => self.suppress(err.into(), "GET /products/{market}", || None),
        }
    }

    async fn quantize_to_base_increment(
        &self,
        market: &str,
        size: Decimal,
    ) -> GatewayResult<Decimal> {
        let increment = self
            .get_product(market)
            .await?
            .and_then(|product| product.base_increment);
        Ok(quantize(size, increment.as_deref()))
    }

    async fn quantize_to_quote_increment(
        &self,
        market: &str,
        funds: Decimal,
    ) -> GatewayResult<Decimal> {
        let increment = self
            .get_product(market)
            .await?
            .and_then(|product| product.quote_increment);
        Ok(quantize(funds, increment.as_deref()))
    }
}

// ============================================================================
// 공개 클라이언트
// ============================================================================

/// Coinbase Pro 공개 클라이언트 (자격증명 불필요).
pub struct CoinbasePublicClient {
    transport: GatewayClient,
    die_on_error: bool,
}

impl CoinbasePublicClient {
    /// 운영망을 향한 새 공개 클라이언트를 생성합니다.
    pub fn new() -> GatewayResult<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// 주어진 타임아웃으로 공개 클라이언트를 생성합니다.
    pub fn with_timeout(timeout_secs: u64) -> GatewayResult<Self> {
        let transport = GatewayClient::new(
            CoinbaseEnvironment::Production.rest_base_url(),
            timeout_secs,
        )?;

        Ok(Self {
            transport,
            die_on_error: false,
        })
    }

    /// 에러 시 프로세스 종료 정책을 설정합니다.
    pub fn with_die_on_error(mut self, die_on_error: bool) -> Self {
        self.die_on_error = die_on_error;
        self
    }

    fn suppress<T>(
        &self,
        err: GatewayError,
        context: &'static str,
        fallback: impl FnOnce() -> T,
    ) -> GatewayResult<T> {
        if err.is_fatal() {
            return Err(err);
        }

        if self.die_on_error {
            error!(context = context, error = %err, "fatal gateway error, aborting (die_on_error)");
            process::exit(1);
        }

        error!(context = context, error = %err, "gateway error suppressed, degrading to empty result");
        Ok(fallback())
    }

    /// 과거 캔들 데이터를 조회합니다.
    ///
    /// 결과는 시간 오름차순이며 모든 레코드에 마켓과 granularity가
    /// 부착됩니다. `start`/`end`는 ISO 8601 문자열입니다.
    pub async fn get_historical_data(
        &self,
        market: &str,
        granularity: Granularity,
        start: Option<&str>,
        end: Option<&str>,
    ) -> GatewayResult<Vec<CandleRecord>> {
        if !is_market_valid(ExchangeId::CoinbasePro, market) {
            return Err(ValidationError::InvalidMarket(market.to_string()).into());
        }

        let mut path = format!(
            "/products/{}/candles?granularity={}",
            market,
            granularity.as_secs()
        );
        if let Some(start) = start {
            path.push_str(&format!("&start={}", start));
        }
        if let Some(end) = end {
            path.push_str(&format!("&end={}", end));
        }

        let raw = match self.transport.request(HttpMethod::Get, &path, None, None).await {
            Ok(value) => value,
            Err(err) => return self.suppress(err, "GET /products/{market}/candles", Vec::new),
        };

        let candles: Vec<RawCandle> = match serde_json::from_value(raw) {
            Ok(candles) => candles,
            Err(err) => return self.suppress(err.into(), "GET /products/{market}/candles", Vec::new),
        };

        Ok(normalize_candles(&candles, market, granularity))
    }

    /// 마켓 시세를 조회합니다.
    ///
    /// 응답 필드가 없거나 호출이 억제되면 (현재 시각, 0)으로
    /// 강등됩니다.
    pub async fn get_ticker(&self, market: &str) -> GatewayResult<Ticker> {
        if !is_market_valid(ExchangeId::CoinbasePro, market) {
            return Err(ValidationError::InvalidMarket(market.to_string()).into());
        }

        let path = format!("/products/{}/ticker", market);
        let degraded = || Ticker {
            timestamp: Utc::now(),
            price: Decimal::ZERO,
        };

        let raw = match self.transport.request(HttpMethod::Get, &path, None, None).await {
            Ok(value) => value,
            Err(err) => return self.suppress(err, "GET /products/{market}/ticker", degraded),
        };

        let ticker: RawTicker = match serde_json::from_value(raw) {
            Ok(ticker) => ticker,
            Err(err) => return self.suppress(err.into(), "GET /products/{market}/ticker", degraded),
        };

        Ok(normalize_ticker(&ticker))
    }

    /// 거래소 서버 시간을 조회합니다.
    pub async fn get_time(&self) -> GatewayResult<Option<DateTime<Utc>>> {
        let raw = match self.transport.request(HttpMethod::Get, "/time", None, None).await {
            Ok(value) => value,
            Err(err) => return self.suppress(err, "GET /time", || None),
        };

        let time: RawTime = match serde_json::from_value(raw) {
            Ok(time) => time,
            Err(err) => return self.suppress(err.into(), "GET /time", || None),
        };

        Ok(time
            .epoch
            .and_then(|epoch| DateTime::from_timestamp(epoch as i64, 0)))
    }
}
