//! 수량 양자화.
//!
//! 거래소가 보고하는 증분 단위 문자열(예: "0.01")의 소수 자릿수를
//! 세어, 주문 수량/금액을 그 자릿수로 내림합니다. 반올림이 아니라
//! 내림이므로 양자화된 값이 거래소 해상도를 초과하지 않습니다
//! (주문 거부 방지). 증분이 보고되지 않으면 값을 그대로
//! 통과시킵니다 (보수적 폴백, 거부하지 않음).

use rust_decimal::Decimal;

/// 증분 단위 문자열의 소수 자릿수를 셉니다.
///
/// "0.01" → 2, "1" → 0, "0.00000001" → 8.
fn decimal_places(increment: &str) -> u32 {
    match increment.split_once('.') {
        Some((_, fraction)) => fraction.len() as u32,
        None => 0,
    }
}

/// 수량을 증분 단위 해상도로 내림합니다.
///
/// 증분이 `None`이면 수량을 변경 없이 반환합니다.
pub fn quantize(amount: Decimal, increment: Option<&str>) -> Decimal {
    match increment {
        Some(increment) => amount.trunc_with_scale(decimal_places(increment)),
        None => amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quantize_floors_never_rounds() {
        assert_eq!(quantize(dec!(0.123456), Some("0.01")), dec!(0.12));
        assert_eq!(quantize(dec!(0.129999), Some("0.01")), dec!(0.12));
        assert_eq!(quantize(dec!(3.9), Some("1")), dec!(3));
    }

    #[test]
    fn test_quantize_passthrough_without_increment() {
        assert_eq!(quantize(dec!(5), None), dec!(5));
        assert_eq!(quantize(dec!(0.123456789), None), dec!(0.123456789));
    }

    #[test]
    fn test_quantize_exact_values_unchanged() {
        assert_eq!(quantize(dec!(0.12), Some("0.01")), dec!(0.12));
        assert_eq!(quantize(dec!(42), Some("1")), dec!(42));
    }

    #[test]
    fn test_quantize_satoshi_increment() {
        assert_eq!(
            quantize(dec!(0.123456789012), Some("0.00000001")),
            dec!(0.12345678)
        );
    }

    #[test]
    fn test_decimal_places() {
        assert_eq!(decimal_places("0.01"), 2);
        assert_eq!(decimal_places("1"), 0);
        assert_eq!(decimal_places("0.00000001"), 8);
    }

    proptest! {
        /// 양자화된 값은 원래 값을 넘지 않고, 오차는 증분 미만이다.
        #[test]
        fn prop_quantize_floors_within_one_increment(
            mantissa in 0u64..1_000_000_000_000,
            scale in 0u32..10,
            digits in 0u32..8,
        ) {
            let amount = Decimal::new(mantissa as i64, scale);
            let increment_str = if digits == 0 {
                "1".to_string()
            } else {
                format!("0.{}1", "0".repeat(digits as usize - 1))
            };
            let increment: Decimal = increment_str.parse().unwrap();

            let quantized = quantize(amount, Some(&increment_str));

            prop_assert!(quantized <= amount);
            prop_assert!(amount - quantized < increment);
        }
    }
}
