//! 마켓 심볼 및 자격증명의 순수 구문 검증.
//!
//! 거래소별 문법(심볼 표기, quote 우선순위, 자격증명 형태,
//! base URL 허용 목록)은 `ExchangeId`로 조회되는 상수 테이블로
//! 정의됩니다. 이 모듈의 함수는 네트워크를 전혀 호출하지 않으며,
//! 부수 효과가 없습니다.

use coinbot_core::{Credentials, Market, ValidationError};

/// 지원되는 거래소 식별자.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExchangeId {
    /// Coinbase Pro — 하이픈 구분 심볼 (BASE-QUOTE)
    CoinbasePro,
    /// Binance — 연결 심볼 (quote 접미사 해석 필요)
    Binance,
}

/// 심볼 표기 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SymbolStyle {
    /// "BTC-GBP" — 각 통화 2~5자, `[1-9A-Z]` (영(0) 제외)
    Hyphenated,
    /// "BTCUSDT" — 전체 5~12자, `[0-9A-Z]`
    Concatenated,
}

/// 거래소별 마켓 문법 테이블 항목.
struct MarketGrammar {
    style: SymbolStyle,
    /// quote 통화 접미사 해석용 정식 우선순위 목록.
    ///
    /// 순서가 곧 계약입니다: 여러 접미사가 동시에 일치하는 심볼은
    /// 오로지 이 목록의 순서로 해석됩니다. 함부로 재정렬하지
    /// 마십시오.
    quote_priority: &'static [&'static str],
}

/// Binance quote 통화 우선순위 목록 (정식, 재정렬 금지).
const BINANCE_QUOTE_CURRENCIES: &[&str] = &[
    "BTC", "BNB", "ETH", "USDT", "TUSD", "BUSD", "DAX", "NGN", "RUB", "TRY", "EUR", "GBP", "ZAR",
    "UAH", "DAI", "BIDR", "AUD", "US", "BRL", "BVND", "VAI",
];

const COINBASE_GRAMMAR: MarketGrammar = MarketGrammar {
    style: SymbolStyle::Hyphenated,
    quote_priority: &[],
};

const BINANCE_GRAMMAR: MarketGrammar = MarketGrammar {
    style: SymbolStyle::Concatenated,
    quote_priority: BINANCE_QUOTE_CURRENCIES,
};

/// 허용되는 base URL (운영 + 샌드박스만).
const COINBASE_VALID_URLS: &[&str] = &[
    "https://api.pro.coinbase.com",
    "https://api.pro.coinbase.com/",
    "https://public.sandbox.pro.coinbase.com",
    "https://public.sandbox.pro.coinbase.com/",
];

const BINANCE_VALID_URLS: &[&str] = &[
    "https://api.binance.com/",
    "https://testnet.binance.vision/",
    "https://api.binance.com",
    "https://testnet.binance.vision",
    "https://api.binance.us",
];

impl ExchangeId {
    fn grammar(&self) -> &'static MarketGrammar {
        match self {
            ExchangeId::CoinbasePro => &COINBASE_GRAMMAR,
            ExchangeId::Binance => &BINANCE_GRAMMAR,
        }
    }

    fn valid_urls(&self) -> &'static [&'static str] {
        match self {
            ExchangeId::CoinbasePro => COINBASE_VALID_URLS,
            ExchangeId::Binance => BINANCE_VALID_URLS,
        }
    }
}

/// 하이픈 표기 통화 문자: 대문자 및 1~9 (영 제외).
fn is_hyphenated_leg_char(c: char) -> bool {
    c.is_ascii_uppercase() || ('1'..='9').contains(&c)
}

fn is_valid_hyphenated_leg(leg: &str) -> bool {
    (2..=5).contains(&leg.len()) && leg.chars().all(is_hyphenated_leg_char)
}

/// 마켓 심볼이 거래소 문법에 맞는지 검사합니다.
///
/// 순수 함수이며 네트워크를 호출하지 않습니다.
pub fn is_market_valid(exchange: ExchangeId, symbol: &str) -> bool {
    match exchange.grammar().style {
        SymbolStyle::Hyphenated => match symbol.split_once('-') {
            Some((base, quote)) => is_valid_hyphenated_leg(base) && is_valid_hyphenated_leg(quote),
            None => false,
        },
        SymbolStyle::Concatenated => {
            (5..=12).contains(&symbol.len())
                && symbol
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        }
    }
}

/// 마켓 심볼을 base/quote 통화로 분해합니다.
///
/// 연결 표기(Binance)는 정식 quote 우선순위 목록을 순회하여 첫
/// 접미사 일치를 채택합니다. 일치하는 접미사가 없거나 base+quote
/// 길이가 심볼을 정확히 재구성하지 못하면
/// `ValidationError::InvalidMarket`으로 실패합니다.
pub fn parse_market(exchange: ExchangeId, symbol: &str) -> Result<Market, ValidationError> {
    if !is_market_valid(exchange, symbol) {
        return Err(ValidationError::InvalidMarket(symbol.to_string()));
    }

    match exchange.grammar().style {
        SymbolStyle::Hyphenated => {
            let (base, quote) = symbol
                .split_once('-')
                .ok_or_else(|| ValidationError::InvalidMarket(symbol.to_string()))?;
            Ok(Market::hyphenated(base, quote))
        }
        SymbolStyle::Concatenated => {
            for quote in exchange.grammar().quote_priority {
                if symbol.ends_with(quote) {
                    // quote가 심볼에 여러 번 나타나면 길이 검사가 실패한다
                    let base = symbol.replace(quote, "");
                    if base.len() + quote.len() != symbol.len() || base.is_empty() {
                        return Err(ValidationError::InvalidMarket(symbol.to_string()));
                    }
                    return Ok(Market::concatenated(base, *quote));
                }
            }
            Err(ValidationError::InvalidMarket(symbol.to_string()))
        }
    }
}

/// base URL이 허용 목록(운영/샌드박스)에 있는지 검증하고,
/// 후행 슬래시를 붙여 정규화한 URL을 반환합니다.
///
/// 허용 목록에 없는 URL로 향하는 요청은 네트워크 시도 이전에
/// 거부됩니다.
pub fn validate_base_url(exchange: ExchangeId, url: &str) -> Result<String, ValidationError> {
    if !exchange.valid_urls().contains(&url) {
        return Err(ValidationError::BaseUrl(url.to_string()));
    }

    if url.ends_with('/') {
        Ok(url.to_string())
    } else {
        Ok(format!("{}/", url))
    }
}

/// 계좌 ID 형태를 검사합니다 (36자, `[a-f0-9-]`).
pub fn is_account_id_valid(id: &str) -> bool {
    id.len() == 36
        && id
            .chars()
            .all(|c| ('a'..='f').contains(&c) || c.is_ascii_digit() || c == '-')
}

fn is_base64_text(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/')
}

/// 자격증명 형태를 검증하고 `Credentials`를 생성합니다.
///
/// 길이/문자 집합 검사만 수행하며 네트워크를 호출하지 않습니다.
/// 전부-아니면-전무: 필드 하나라도 실패하면 자격증명 전체가
/// 필드를 명시한 에러와 함께 거부됩니다.
///
/// 형태 규칙:
/// - Coinbase Pro: key는 소문자 16진수 32자, secret은 `==`로 끝나는
///   base64 텍스트, passphrase는 `[a-z0-9]` 10~12자 (필수)
/// - Binance: key/secret 모두 영숫자 64자, passphrase 없음
pub fn validate_credentials(
    exchange: ExchangeId,
    key: &str,
    secret: &str,
    passphrase: Option<&str>,
    base_url: &str,
) -> Result<Credentials, ValidationError> {
    match exchange {
        ExchangeId::CoinbasePro => {
            if key.len() != 32 || !key.chars().all(|c| ('a'..='f').contains(&c) || c.is_ascii_digit())
            {
                return Err(ValidationError::credential(
                    "key",
                    "expected 32 lowercase hex characters",
                ));
            }

            let body = secret.strip_suffix("==").unwrap_or("");
            if body.is_empty() || !is_base64_text(body) {
                return Err(ValidationError::credential(
                    "secret",
                    "expected base64 text ending in '=='",
                ));
            }

            match passphrase {
                Some(p)
                    if (10..=12).contains(&p.len())
                        && p.chars()
                            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) => {}
                Some(_) => {
                    return Err(ValidationError::credential(
                        "passphrase",
                        "expected 10-12 characters of [a-z0-9]",
                    ))
                }
                None => {
                    return Err(ValidationError::credential(
                        "passphrase",
                        "required for this exchange",
                    ))
                }
            }
        }
        ExchangeId::Binance => {
            if key.len() != 64 || !key.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(ValidationError::credential(
                    "key",
                    "expected 64 alphanumeric characters",
                ));
            }
            if secret.len() != 64 || !secret.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(ValidationError::credential(
                    "secret",
                    "expected 64 alphanumeric characters",
                ));
            }
            if passphrase.is_some() {
                return Err(ValidationError::credential(
                    "passphrase",
                    "not used by this exchange",
                ));
            }
        }
    }

    let base_url = validate_base_url(exchange, base_url)?;

    Ok(Credentials::new(
        key,
        secret,
        passphrase.map(str::to_string),
        base_url,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // === 마켓 문법 ===

    #[test]
    fn test_hyphenated_grammar() {
        assert!(is_market_valid(ExchangeId::CoinbasePro, "BTC-GBP"));
        assert!(is_market_valid(ExchangeId::CoinbasePro, "DOGE-USDT"));

        assert!(!is_market_valid(ExchangeId::CoinbasePro, "btc-gbp"));
        assert!(!is_market_valid(ExchangeId::CoinbasePro, "BTCGBP"));
        assert!(!is_market_valid(ExchangeId::CoinbasePro, "B-GBP"));
        assert!(!is_market_valid(ExchangeId::CoinbasePro, "TOOLONG-GBP"));
        // 영(0)은 하이픈 표기 문자 집합에서 제외된다
        assert!(!is_market_valid(ExchangeId::CoinbasePro, "B0ND-GBP"));
        assert!(!is_market_valid(ExchangeId::CoinbasePro, ""));
    }

    #[test]
    fn test_concatenated_grammar() {
        assert!(is_market_valid(ExchangeId::Binance, "BTCUSDT"));
        assert!(is_market_valid(ExchangeId::Binance, "ETHBTC"));

        assert!(!is_market_valid(ExchangeId::Binance, "btcusdt"));
        assert!(!is_market_valid(ExchangeId::Binance, "BTC-USDT"));
        assert!(!is_market_valid(ExchangeId::Binance, "BTCX"));
        assert!(!is_market_valid(ExchangeId::Binance, "VERYLONGSYMBOL"));
    }

    #[test]
    fn test_parse_market_hyphenated() {
        let market = parse_market(ExchangeId::CoinbasePro, "BTC-GBP").unwrap();
        assert_eq!(market.base_currency, "BTC");
        assert_eq!(market.quote_currency, "GBP");
        assert_eq!(market.symbol, "BTC-GBP");
    }

    #[test]
    fn test_parse_market_suffix_resolution() {
        let market = parse_market(ExchangeId::Binance, "BTCUSDT").unwrap();
        assert_eq!(market.base_currency, "BTC");
        assert_eq!(market.quote_currency, "USDT");
        assert_eq!(market.symbol, "BTCUSDT");

        // 우선순위 목록의 첫 일치가 승리한다
        let market = parse_market(ExchangeId::Binance, "BTCTUSD").unwrap();
        assert_eq!(market.quote_currency, "TUSD");
    }

    #[test]
    fn test_parse_market_rejects_unknown_suffix() {
        assert_eq!(
            parse_market(ExchangeId::Binance, "BTCXYZ"),
            Err(ValidationError::InvalidMarket("BTCXYZ".to_string()))
        );
    }

    #[test]
    fn test_parse_market_rejects_non_reconstructing() {
        // quote가 심볼 중간에도 나타나면 길이 재구성 검사가 실패한다
        assert_eq!(
            parse_market(ExchangeId::Binance, "BTCBTC"),
            Err(ValidationError::InvalidMarket("BTCBTC".to_string()))
        );
    }

    proptest! {
        #[test]
        fn prop_valid_hyphenated_symbols_accepted(
            base in "[1-9A-Z]{2,5}",
            quote in "[1-9A-Z]{2,5}",
        ) {
            let symbol = format!("{}-{}", base, quote);
            prop_assert!(is_market_valid(ExchangeId::CoinbasePro, &symbol));
        }

        #[test]
        fn prop_lowercase_symbols_rejected(symbol in "[a-z]{2,5}-[a-z]{2,5}") {
            prop_assert!(!is_market_valid(ExchangeId::CoinbasePro, &symbol));
        }
    }

    // === base URL 허용 목록 ===

    #[test]
    fn test_base_url_allow_list() {
        assert_eq!(
            validate_base_url(ExchangeId::CoinbasePro, "https://api.pro.coinbase.com").unwrap(),
            "https://api.pro.coinbase.com/"
        );
        assert_eq!(
            validate_base_url(
                ExchangeId::CoinbasePro,
                "https://public.sandbox.pro.coinbase.com/"
            )
            .unwrap(),
            "https://public.sandbox.pro.coinbase.com/"
        );

        assert!(validate_base_url(ExchangeId::CoinbasePro, "https://evil.example.com").is_err());
        assert!(validate_base_url(ExchangeId::CoinbasePro, "https://api.binance.com").is_err());
    }

    // === 자격증명 형태 ===

    const VALID_KEY: &str = "0123456789abcdef0123456789abcdef";
    const VALID_SECRET: &str = "MDEyMzQ1Njc4OWFiY2RlZmdoaWprbG1ub3BxcnN0dQ==";
    const VALID_PASSPHRASE: &str = "abcdefghij";
    const VALID_URL: &str = "https://api.pro.coinbase.com";

    #[test]
    fn test_coinbase_credentials_accepted() {
        let creds = validate_credentials(
            ExchangeId::CoinbasePro,
            VALID_KEY,
            VALID_SECRET,
            Some(VALID_PASSPHRASE),
            VALID_URL,
        )
        .unwrap();

        assert_eq!(creds.key(), VALID_KEY);
        assert_eq!(creds.base_url(), "https://api.pro.coinbase.com/");
    }

    #[test]
    fn test_coinbase_credentials_reject_bad_key() {
        let err = validate_credentials(
            ExchangeId::CoinbasePro,
            "SHORT",
            VALID_SECRET,
            Some(VALID_PASSPHRASE),
            VALID_URL,
        )
        .unwrap_err();

        assert!(matches!(err, ValidationError::Credential { field: "key", .. }));
    }

    #[test]
    fn test_coinbase_credentials_reject_bad_secret() {
        let err = validate_credentials(
            ExchangeId::CoinbasePro,
            VALID_KEY,
            "not base64 at all",
            Some(VALID_PASSPHRASE),
            VALID_URL,
        )
        .unwrap_err();

        assert!(matches!(err, ValidationError::Credential { field: "secret", .. }));
    }

    #[test]
    fn test_coinbase_credentials_require_passphrase() {
        let err =
            validate_credentials(ExchangeId::CoinbasePro, VALID_KEY, VALID_SECRET, None, VALID_URL)
                .unwrap_err();

        assert!(matches!(
            err,
            ValidationError::Credential { field: "passphrase", .. }
        ));
    }

    #[test]
    fn test_binance_credentials_shape() {
        let key64 = "A".repeat(64);
        let secret64 = "b".repeat(64);

        let creds = validate_credentials(
            ExchangeId::Binance,
            &key64,
            &secret64,
            None,
            "https://api.binance.com",
        )
        .unwrap();
        assert_eq!(creds.base_url(), "https://api.binance.com/");

        let err = validate_credentials(
            ExchangeId::Binance,
            "tooshort",
            &secret64,
            None,
            "https://api.binance.com",
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::Credential { field: "key", .. }));
    }

    // === 계좌 ID ===

    #[test]
    fn test_account_id_shape() {
        assert!(is_account_id_valid("b5f6e2a1-0d3c-4b7a-9e8f-1a2b3c4d5e6f"));
        assert!(!is_account_id_valid("not-a-uuid"));
        assert!(!is_account_id_valid("B5F6E2A1-0D3C-4B7A-9E8F-1A2B3C4D5E6F"));
    }
}
