//! 数值转换工具。
//!
//! 工作区禁止有损 `as` 转换，统计计算里不可避免的 usize/f64 互转集中在这里。

/// 将计数转换为浮点数。样本量远小于 2^53，不会丢失精度。
#[allow(clippy::cast_precision_loss)]
pub fn to_f64(n: usize) -> f64 {
    n as f64
}

/// # Summary
/// 将非负浮点数向下取整为 usize。
///
/// # Logic
/// 1. 非有限值或负数一律视为 0。
/// 2. 其余值向下取整后截断。
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn floor_to_usize(x: f64) -> usize {
    if !x.is_finite() || x <= 0.0 {
        return 0;
    }
    x.floor() as usize
}

/// 将非负浮点数向上取整为 usize。
pub fn ceil_to_usize(x: f64) -> usize {
    floor_to_usize(x.ceil())
}

/// 将非负浮点数四舍五入为 usize。
pub fn round_to_usize(x: f64) -> usize {
    floor_to_usize(x.round())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_helpers() {
        assert_eq!(floor_to_usize(2.9), 2);
        assert_eq!(ceil_to_usize(2.1), 3);
        assert_eq!(round_to_usize(2.5), 3);
        assert_eq!(floor_to_usize(-1.0), 0);
        assert_eq!(floor_to_usize(f64::NAN), 0);
        assert_eq!(to_f64(12), 12.0);
    }
}
