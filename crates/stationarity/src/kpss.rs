use crate::ols::OlsFit;
use crate::prepare::{bartlett_long_run_variance, ensure_length, lagged_cross_product, mean};
use std::collections::BTreeMap;
use tracing::{debug, warn};
use tsa_core::common::num::{floor_to_usize, to_f64};
use tsa_core::stationarity::entity::{HypothesisType, StationarityTestResult, TestKind};
use tsa_core::stationarity::error::StationarityError;

// Kwiatkowski et al. (1992) 表 1 的渐近临界值
const LEVEL_CRITICAL: [f64; 4] = [0.347, 0.463, 0.574, 0.739];
const TREND_CRITICAL: [f64; 4] = [0.119, 0.146, 0.176, 0.216];
const CRITICAL_PVALUES: [f64; 4] = [0.10, 0.05, 0.025, 0.01];
const CRITICAL_LABELS: [&str; 4] = ["10%", "5%", "2.5%", "1%"];

fn critical_table(hypothesis: HypothesisType) -> &'static [f64; 4] {
    match hypothesis {
        HypothesisType::LevelStationary => &LEVEL_CRITICAL,
        HypothesisType::TrendStationary => &TREND_CRITICAL,
    }
}

/// 去均值或去线性趋势后的残差。
fn detrend(x: &[f64], hypothesis: HypothesisType) -> Result<Vec<f64>, StationarityError> {
    match hypothesis {
        HypothesisType::LevelStationary => {
            let m = mean(x);
            Ok(x.iter().map(|v| v - m).collect())
        }
        HypothesisType::TrendStationary => {
            let rows: Vec<Vec<f64>> = (1..=x.len()).map(|t| vec![1.0, to_f64(t)]).collect();
            Ok(OlsFit::fit(x, &rows)?.residuals())
        }
    }
}

/// # Summary
/// Hobijn et al. (1998) 的数据驱动带宽。
///
/// # Logic
/// 1. 以 `floor(n^(2/9))` 个自协方差估计 s0 与 s1。
/// 2. `gamma = 1.1447 * ((s1/s0)^2)^(1/3)`，带宽取 `floor(gamma * n^(1/3))`，且不超过 `n - 1`。
fn auto_lags(resid: &[f64]) -> usize {
    let n = to_f64(resid.len());
    let covlags = floor_to_usize(n.powf(2.0 / 9.0));
    let mut s0 = lagged_cross_product(resid, 0) / n;
    let mut s1 = 0.0;
    for i in 1..=covlags {
        let prod = lagged_cross_product(resid, i) / (n / 2.0);
        s0 += prod;
        s1 += to_f64(i) * prod;
    }
    let ratio = s1 / s0;
    // 取 |s1/s0| 的 2/3 次幂，负自相关同样得到正带宽
    let gamma = 1.1447 * (ratio * ratio).powf(1.0 / 3.0);
    floor_to_usize(gamma * n.powf(1.0 / 3.0)).min(resid.len() - 1)
}

/// # Summary
/// 在临界值表上线性插值得到 p 值。
///
/// # Logic
/// 统计量落在表外时截断为 0.10 或 0.01 并记录警告，真实 p 值在截断值之外。
fn interpolate_p_value(stat: f64, crit: &[f64; 4]) -> f64 {
    if stat <= crit[0] {
        warn!(
            "KPSS statistic {:.4} is outside the p-value table, actual p-value is greater than {}",
            stat, CRITICAL_PVALUES[0]
        );
        return CRITICAL_PVALUES[0];
    }
    if stat >= crit[3] {
        warn!(
            "KPSS statistic {:.4} is outside the p-value table, actual p-value is smaller than {}",
            stat, CRITICAL_PVALUES[3]
        );
        return CRITICAL_PVALUES[3];
    }
    for i in 0..3 {
        let (lo, hi) = (crit[i], crit[i + 1]);
        if stat <= hi {
            let w = (stat - lo) / (hi - lo);
            return CRITICAL_PVALUES[i] + w * (CRITICAL_PVALUES[i + 1] - CRITICAL_PVALUES[i]);
        }
    }
    CRITICAL_PVALUES[3]
}

/// # Summary
/// KPSS 平稳性检验，原假设为 (水平或趋势) 平稳。
///
/// # Logic
/// 1. 按假设类型去均值或去趋势得到残差 e。
/// 2. `eta = sum(S_t^2) / n^2`，S_t 为残差累加和。
/// 3. 以 Bartlett 核长期方差归一化得到统计量。
///
/// # Arguments
/// * `x`: 已去除缺失值的非常数观测。
/// * `hypothesis`: 水平平稳 (常数) 或趋势平稳 (常数加线性趋势)。
/// * `n_lags`: 固定带宽，None 表示自动选择。
///
/// # Returns
/// 成功返回检验结果；固定带宽不小于样本量时返回 `InsufficientData`。
pub(crate) fn kpss(
    x: &[f64],
    hypothesis: HypothesisType,
    n_lags: Option<usize>,
) -> Result<StationarityTestResult, StationarityError> {
    let n = x.len();
    let ntrend = match hypothesis {
        HypothesisType::LevelStationary => 1,
        HypothesisType::TrendStationary => 2,
    };
    ensure_length(x, ntrend + 2)?;
    if let Some(fixed) = n_lags {
        ensure_length(x, fixed + 1)?;
    }

    let resid = detrend(x, hypothesis)?;
    let lags = match n_lags {
        Some(fixed) => fixed,
        None => {
            let lags = auto_lags(&resid);
            debug!("KPSS automatic bandwidth: {} lags for {} observations", lags, n);
            lags
        }
    };

    let nf = to_f64(n);
    let eta = resid
        .iter()
        .scan(0.0, |acc, e| {
            *acc += e;
            Some(*acc * *acc)
        })
        .sum::<f64>()
        / (nf * nf);
    let lrv = bartlett_long_run_variance(&resid, lags);
    if lrv.is_nan() || lrv <= 0.0 {
        return Err(StationarityError::NumericDegeneracy(
            "KPSS long-run variance is not positive".to_string(),
        ));
    }
    let statistic = eta / lrv;

    let crit = critical_table(hypothesis);
    let critical_values: BTreeMap<String, f64> = CRITICAL_LABELS
        .iter()
        .zip(crit.iter())
        .map(|(label, value)| ((*label).to_string(), *value))
        .collect();

    Ok(StationarityTestResult {
        test: TestKind::Kpss { hypothesis },
        statistic,
        p_value: interpolate_p_value(statistic, crit),
        lags_used: lags,
        nobs: n,
        critical_values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsa_core::test_utils::{ma_noise, random_walk, white_noise};

    #[test]
    fn test_p_value_interpolation() {
        let crit = &LEVEL_CRITICAL;
        assert_eq!(interpolate_p_value(0.1, crit), 0.10);
        assert_eq!(interpolate_p_value(2.0, crit), 0.01);
        assert!((interpolate_p_value(0.463, crit) - 0.05).abs() < 1e-12);
        let mid = interpolate_p_value((0.347 + 0.463) / 2.0, crit);
        assert!((mid - 0.075).abs() < 1e-12);
    }

    #[test]
    fn test_level_kpss_does_not_reject_on_noise() {
        let x = white_noise(200, 0);
        let r = kpss(&x, HypothesisType::LevelStationary, None).unwrap();
        assert!(r.p_value > 0.05, "{r:?}");
        assert_eq!(r.nobs, 200);
        assert_eq!(r.critical_values.len(), 4);
        assert_eq!(r.critical_values["5%"], 0.463);
    }

    #[test]
    fn test_auto_lags_on_negatively_autocorrelated_residuals() {
        for seed in [2, 3] {
            let x = ma_noise(200, -0.5, seed);
            let resid = detrend(&x, HypothesisType::LevelStationary).unwrap();
            let lags = auto_lags(&resid);
            assert!(lags > 0 && lags < 40, "seed {seed}: {lags}");
            let r = kpss(&x, HypothesisType::LevelStationary, None).unwrap();
            assert_eq!(r.lags_used, lags);
        }
    }

    #[test]
    fn test_auto_lags_depend_on_ratio_magnitude() {
        // 交替符号后 lag-1 自协方差反号，偶数阶不变
        let x = ma_noise(300, 0.6, 9);
        let flipped: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, v)| if i % 2 == 0 { *v } else { -*v })
            .collect();
        let a = auto_lags(&detrend(&x, HypothesisType::LevelStationary).unwrap());
        let b = auto_lags(&detrend(&flipped, HypothesisType::LevelStationary).unwrap());
        assert!(a > 0 && b > 0, "{a} {b}");
    }

    #[test]
    fn test_level_kpss_rejects_on_random_walk() {
        let x = random_walk(300, 0.5, 5);
        let r = kpss(&x, HypothesisType::LevelStationary, None).unwrap();
        assert_eq!(r.p_value, 0.01, "{r:?}");
    }

    #[test]
    fn test_trend_kpss_uses_trend_table() {
        let x = ma_noise(120, -0.5, 3);
        let r = kpss(&x, HypothesisType::TrendStationary, Some(4)).unwrap();
        assert_eq!(r.lags_used, 4);
        assert_eq!(r.critical_values["1%"], 0.216);
    }

    #[test]
    fn test_fixed_lags_must_fit_sample() {
        let x = [1.0, 2.0, 0.5, 1.5, 0.7];
        let err = kpss(&x, HypothesisType::LevelStationary, Some(5)).unwrap_err();
        assert_eq!(err, StationarityError::InsufficientData { required: 6, got: 5 });
    }

    #[test]
    fn test_too_short_for_trend() {
        let err = kpss(&[1.0, 2.0, 0.0], HypothesisType::TrendStationary, None).unwrap_err();
        assert_eq!(err, StationarityError::InsufficientData { required: 4, got: 3 });
    }
}
