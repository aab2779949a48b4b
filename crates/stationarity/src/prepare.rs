use tsa_core::common::num::to_f64;
use tsa_core::series::entity::TimeSeries;
use tsa_core::stationarity::error::StationarityError;

/// # Summary
/// 取出可用于检验的观测值。
///
/// # Logic
/// 1. 丢弃 `NaN` (差分与滚动运算留下的边缘缺失)。
/// 2. 拒绝无穷值。
/// 3. 拒绝常数序列，检验在零方差下无定义。
pub(crate) fn observations(series: &TimeSeries) -> Result<Vec<f64>, StationarityError> {
    let x: Vec<f64> = series.values().iter().copied().filter(|v| !v.is_nan()).collect();
    if let Some(pos) = x.iter().position(|v| v.is_infinite()) {
        return Err(StationarityError::InvalidInput(format!(
            "non-finite observation at position {} of {}",
            pos,
            series.name()
        )));
    }
    if x.is_empty() {
        return Err(StationarityError::InsufficientData {
            required: 1,
            got: 0,
        });
    }
    ensure_not_constant(&x)?;
    Ok(x)
}

pub(crate) fn is_constant(x: &[f64]) -> bool {
    match x.first() {
        Some(first) => x.iter().all(|v| v == first),
        None => true,
    }
}

pub(crate) fn ensure_not_constant(x: &[f64]) -> Result<(), StationarityError> {
    if is_constant(x) {
        return Err(StationarityError::NumericDegeneracy(
            "series is constant (zero variance)".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn ensure_length(x: &[f64], required: usize) -> Result<(), StationarityError> {
    if x.len() < required {
        return Err(StationarityError::InsufficientData {
            required,
            got: x.len(),
        });
    }
    Ok(())
}

/// 滞后 `lag` 的差分，结果比输入短 `lag`。
pub(crate) fn difference(x: &[f64], lag: usize) -> Vec<f64> {
    if lag == 0 || x.len() <= lag {
        return Vec::new();
    }
    x.iter().skip(lag).zip(x.iter()).map(|(a, b)| a - b).collect()
}

pub(crate) fn mean(x: &[f64]) -> f64 {
    x.iter().sum::<f64>() / to_f64(x.len())
}

/// `sum_{t=lag}^{n-1} e_t * e_{t-lag}`
pub(crate) fn lagged_cross_product(e: &[f64], lag: usize) -> f64 {
    e.iter().skip(lag).zip(e.iter()).map(|(a, b)| a * b).sum()
}

/// # Summary
/// Bartlett 核的长期方差估计 (Newey-West)。
///
/// # Logic
/// `(sum e_t^2 + 2 * sum_{i=1}^{lags} (1 - i/(lags+1)) * sum e_t e_{t-i}) / n`
pub(crate) fn bartlett_long_run_variance(e: &[f64], lags: usize) -> f64 {
    let mut s = lagged_cross_product(e, 0);
    for i in 1..=lags {
        let weight = 1.0 - to_f64(i) / (to_f64(lags) + 1.0);
        s += 2.0 * weight * lagged_cross_product(e, i);
    }
    s / to_f64(e.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difference() {
        assert_eq!(difference(&[1.0, 4.0, 9.0, 16.0], 1), vec![3.0, 5.0, 7.0]);
        assert_eq!(difference(&[1.0, 4.0, 9.0, 16.0], 2), vec![8.0, 12.0]);
        assert!(difference(&[1.0], 1).is_empty());
    }

    #[test]
    fn test_long_run_variance_without_lags_is_mean_square() {
        let e = [1.0, -1.0, 2.0, -2.0];
        assert!((bartlett_long_run_variance(&e, 0) - 2.5).abs() < 1e-12);
        // 负自相关使长期方差变小
        assert!(bartlett_long_run_variance(&e, 1) < 2.5);
    }

    #[test]
    fn test_constant_detection() {
        assert!(is_constant(&[3.0, 3.0, 3.0]));
        assert!(!is_constant(&[3.0, 3.0, 3.1]));
        assert!(matches!(
            ensure_not_constant(&[1.0, 1.0]),
            Err(StationarityError::NumericDegeneracy(_))
        ));
    }
}
