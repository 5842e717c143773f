//! 分数与百分比的十进制运算
//!
//! 分数按 DECIMAL(10, 2) 存储，百分比在十进制下做四舍五入（远离零），
//! 避免二进制浮点在 .xx5 这类中点上向下舍入。

use rust_decimal::{Decimal, RoundingStrategy};

/// DECIMAL(10, 2) 整数部分的上限（不含）
const SCORE_BOUND: i64 = 100_000_000;

/// 四舍五入到 `dp` 位小数，中点远离零
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// JSON 中的分数转为两位小数；非有限值或超出列范围时返回 None
///
/// 先取 f64 的最短十进制表示再舍入，0.46 得到的是 0.46 而非其二进制近似值。
pub fn score_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    let exact: Decimal = value.to_string().parse().ok()?;
    let rounded = round_half_up(exact, 2);
    (rounded.abs() < Decimal::from(SCORE_BOUND)).then_some(rounded)
}

/// 输出到 JSON 的数值，取十进制文本再解析，得到最接近的 f64
pub fn to_f64(value: Decimal) -> f64 {
    value.normalize().to_string().parse().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_up_on_midpoints() {
        assert_eq!(round_half_up(Decimal::new(575, 5), 4), Decimal::new(58, 4));
        assert_eq!(round_half_up(Decimal::new(-125, 3), 2), Decimal::new(-13, 2));
        assert_eq!(round_half_up(Decimal::new(124, 3), 2), Decimal::new(12, 2));
    }

    #[test]
    fn test_score_from_f64() {
        assert_eq!(score_from_f64(0.46), Some(Decimal::new(46, 2)));
        assert_eq!(score_from_f64(89.995), Some(Decimal::new(9000, 2)));
        assert_eq!(score_from_f64(-5.0), Some(Decimal::new(-5, 0)));
        assert_eq!(score_from_f64(f64::NAN), None);
        assert_eq!(score_from_f64(f64::INFINITY), None);
        assert_eq!(score_from_f64(1e8), None);
        assert_eq!(score_from_f64(1e300), None);
    }

    #[test]
    fn test_to_f64() {
        assert_eq!(to_f64(Decimal::new(6667, 2)), 66.67);
        assert_eq!(to_f64(Decimal::new(840000, 4)), 84.0);
        assert_eq!(to_f64(Decimal::new(58, 2)), 0.58);
    }
}
