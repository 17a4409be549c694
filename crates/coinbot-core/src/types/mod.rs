//! 게이트웨이 기본 타입.

pub mod granularity;
pub mod market;

pub use granularity::{resample_code_for_secs, Granularity, SUPPORTED_GRANULARITY};
pub use market::Market;
