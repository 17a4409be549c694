//! 캔들 granularity 정의.
//!
//! 거래소가 지원하는 캔들 버킷 폭(초 단위)의 고정 집합과,
//! 각 granularity에 대응하는 리샘플링 주기 코드를 제공합니다.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// 지원되는 granularity 값 (초 단위).
pub const SUPPORTED_GRANULARITY: [u64; 6] = [60, 300, 900, 3600, 21600, 86400];

/// 캔들 granularity (버킷 폭).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// 1분봉 (60초)
    M1,
    /// 5분봉 (300초)
    M5,
    /// 15분봉 (900초)
    M15,
    /// 1시간봉 (3600초)
    H1,
    /// 6시간봉 (21600초)
    H6,
    /// 일봉 (86400초)
    D1,
}

impl Granularity {
    /// 초 단위 값을 반환합니다.
    pub fn as_secs(&self) -> u64 {
        match self {
            Granularity::M1 => 60,
            Granularity::M5 => 300,
            Granularity::M15 => 900,
            Granularity::H1 => 3600,
            Granularity::H6 => 21600,
            Granularity::D1 => 86400,
        }
    }

    /// 이 granularity의 기간을 반환합니다.
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.as_secs())
    }

    /// 초 단위 값에서 파싱합니다.
    ///
    /// 지원 집합에 없는 값은 `ValidationError::Granularity`로 거부됩니다.
    pub fn try_from_secs(secs: u64) -> Result<Self, ValidationError> {
        match secs {
            60 => Ok(Granularity::M1),
            300 => Ok(Granularity::M5),
            900 => Ok(Granularity::M15),
            3600 => Ok(Granularity::H1),
            21600 => Ok(Granularity::H6),
            86400 => Ok(Granularity::D1),
            other => Err(ValidationError::Granularity(other)),
        }
    }

    /// 거래소 간격 별칭("1m", "5m", ...)에서 파싱합니다.
    pub fn from_alias(s: &str) -> Option<Self> {
        match s {
            "1m" => Some(Granularity::M1),
            "5m" => Some(Granularity::M5),
            "15m" => Some(Granularity::M15),
            "1h" => Some(Granularity::H1),
            "6h" => Some(Granularity::H6),
            "1d" => Some(Granularity::D1),
            _ => None,
        }
    }

    /// 리샘플링 주기 코드를 반환합니다.
    ///
    /// 고정 대응표: 60→"T", 300→"5T", 900→"15T", 3600→"H",
    /// 21600→"6H", 86400→"D". 대응표에 없는 값의 폴백 코드는
    /// 일봉 "D"이며, 이 열거형에서는 도달할 수 없습니다.
    pub fn resample_code(&self) -> &'static str {
        match self {
            Granularity::M1 => "T",
            Granularity::M5 => "5T",
            Granularity::M15 => "15T",
            Granularity::H1 => "H",
            Granularity::H6 => "6H",
            Granularity::D1 => "D",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_secs())
    }
}

/// 초 단위 값에 대한 리샘플링 주기 코드 조회.
///
/// 지원 집합에 없는 값은 일봉 코드 "D"로 폴백합니다.
pub fn resample_code_for_secs(secs: u64) -> &'static str {
    Granularity::try_from_secs(secs)
        .map(|g| g.resample_code())
        .unwrap_or("D")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_granularity_secs() {
        assert_eq!(Granularity::M1.as_secs(), 60);
        assert_eq!(Granularity::H6.as_secs(), 21600);
        assert_eq!(Granularity::D1.as_secs(), 86400);
    }

    #[test]
    fn test_try_from_secs() {
        assert_eq!(Granularity::try_from_secs(300), Ok(Granularity::M5));
        assert_eq!(
            Granularity::try_from_secs(120),
            Err(ValidationError::Granularity(120))
        );
    }

    #[test]
    fn test_resample_codes() {
        assert_eq!(Granularity::M1.resample_code(), "T");
        assert_eq!(Granularity::M5.resample_code(), "5T");
        assert_eq!(Granularity::M15.resample_code(), "15T");
        assert_eq!(Granularity::H1.resample_code(), "H");
        assert_eq!(Granularity::H6.resample_code(), "6H");
        assert_eq!(Granularity::D1.resample_code(), "D");
    }

    #[test]
    fn test_resample_fallback_is_daily() {
        assert_eq!(resample_code_for_secs(3600), "H");
        assert_eq!(resample_code_for_secs(1234), "D");
    }

    #[test]
    fn test_from_alias() {
        assert_eq!(Granularity::from_alias("15m"), Some(Granularity::M15));
        assert_eq!(Granularity::from_alias("1d"), Some(Granularity::D1));
        assert_eq!(Granularity::from_alias("2h"), None);
    }

    #[test]
    fn test_supported_set_is_consistent() {
        for secs in SUPPORTED_GRANULARITY {
            assert_eq!(Granularity::try_from_secs(secs).unwrap().as_secs(), secs);
        }
    }
}
