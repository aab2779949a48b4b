use crate::ols::OlsFit;
use crate::prepare::{difference, ensure_length};
use nalgebra::{DMatrix, DVector};
use std::f64::consts::PI;
use tracing::debug;
use tsa_core::common::num::{round_to_usize, to_f64};
use tsa_core::stationarity::entity::{InformationCriterion, SeasonalMethod, SeasonalTestResult};
use tsa_core::stationarity::error::StationarityError;

/// # Summary
/// OCSB 检验的 5% 临界值曲面 (Osborn et al. 1988 的模拟结果拟合)。
pub(crate) fn ocsb_critical_value(period: usize) -> f64 {
    let log_m = to_f64(period).ln() - 0.765_645_1;
    -0.293_741_1 * (-0.285_085_3 * log_m - 0.059_836_44 * log_m * log_m).exp() - 1.652_202
}

/// OCSB 在给定 AR 阶数上限下需要的最少观测数。
fn ocsb_required(period: usize, max_lag: usize) -> usize {
    period + 2 * max_lag + 4
}

/// 以 `phi` 为 AR 系数的滤波残差 `d[s] - sum phi_i d[s-i]`。
fn ar_filtered(d: &[f64], s: usize, phi: &[f64]) -> f64 {
    d[s] - phi
        .iter()
        .enumerate()
        .map(|(i, p)| p * d[s - i - 1])
        .sum::<f64>()
}

/// # Summary
/// 在给定 AR 阶数下拟合 OCSB 回归。
///
/// # Logic
/// 设 `w = (1-B)(1-B^m) x`：
/// 1. 用 `w` 对自身 `lag` 个滞后做无常数回归，得到 AR 系数 φ。
/// 2. `Z4 = φ(B) (1-B^m) x`，`Z5 = φ(B) (1-B) x`。
/// 3. `w_t` 对 `w_{t-1..t-lag}`、`Z4_{t-1}`、`Z5_{t-m}` 做无常数回归。
///
/// 所有下标使用原序列的时间位置，样本从 `m + 1 + trim` 开始，`trim` 取候选阶数的上限，
/// 保证各候选阶数在同一样本上比较。
fn fit_ocsb(x: &[f64], period: usize, lag: usize, trim: usize) -> Result<OlsFit, StationarityError> {
    let n = x.len();
    let start = period + 1 + trim;
    // 三个序列都按原序列位置对齐，前缀用 NaN 占位
    let d_m: Vec<f64> = std::iter::repeat_n(f64::NAN, period)
        .chain(difference(x, period))
        .collect();
    let d_1: Vec<f64> = std::iter::once(f64::NAN).chain(difference(x, 1)).collect();
    let w: Vec<f64> = std::iter::once(f64::NAN).chain(difference(&d_m, 1)).collect();

    let phi: Vec<f64> = if lag == 0 {
        Vec::new()
    } else {
        let y: Vec<f64> = w[start..n].to_vec();
        let rows: Vec<Vec<f64>> = (start..n)
            .map(|t| (1..=lag).map(|i| w[t - i]).collect())
            .collect();
        OlsFit::fit(&y, &rows)?.params.iter().copied().collect()
    };

    let y: Vec<f64> = w[start..n].to_vec();
    let rows: Vec<Vec<f64>> = (start..n)
        .map(|t| {
            let mut row: Vec<f64> = (1..=lag).map(|i| w[t - i]).collect();
            row.push(ar_filtered(&d_m, t - 1, &phi));
            row.push(ar_filtered(&d_1, t - period, &phi));
            row
        })
        .collect();
    OlsFit::fit(&y, &rows)
}

/// # Summary
/// Osborn-Chui-Smith-Birchenhall 季节单位根检验。
///
/// # Logic
/// 1. AR 阶数在 `1..=max_lag` 中按信息准则选择，上限受样本量约束；`max_lag` 为 0 时不含 AR 项。
/// 2. 统计量为 `Z5` 系数的 t 值，与周期对应的临界值比较。
///
/// # Returns
/// 统计量大于临界值时 `needs_seasonal_difference` 为真；样本不足返回 `InsufficientData`。
pub(crate) fn ocsb(
    x: &[f64],
    period: usize,
    max_lag: usize,
    ic: InformationCriterion,
) -> Result<SeasonalTestResult, StationarityError> {
    let n = x.len();
    ensure_length(x, ocsb_required(period, 0))?;
    let usable = (0..=max_lag)
        .rev()
        .find(|l| n >= ocsb_required(period, *l))
        .unwrap_or(0);

    let (lag, fit) = if usable == 0 {
        (0, fit_ocsb(x, period, 0, 0)?)
    } else {
        let mut best: Option<(usize, f64, OlsFit)> = None;
        for lag in 1..=usable {
            let fit = fit_ocsb(x, period, lag, usable)?;
            let score = fit.information_criterion(ic);
            if best.as_ref().is_none_or(|(_, b, _)| score < *b) {
                best = Some((lag, score, fit));
            }
        }
        match best {
            Some((lag, _, fit)) => (lag, fit),
            None => (0, fit_ocsb(x, period, 0, 0)?),
        }
    };
    debug!(
        "OCSB lag selection: {:?} picked {} of max {} (requested {})",
        ic, lag, usable, max_lag
    );

    let statistic = fit.t_value(fit.k - 1);
    if !statistic.is_finite() {
        return Err(StationarityError::NumericDegeneracy(
            "OCSB regression fits the data exactly".to_string(),
        ));
    }
    Ok(SeasonalTestResult {
        test: SeasonalMethod::Ocsb,
        statistic,
        critical_value: ocsb_critical_value(period),
        lags_used: lag,
        period,
        nobs: fit.nobs,
    })
}

/// # Summary
/// Canova-Hansen 检验在周期 `period` 下的 5% 临界值。
///
/// # Logic
/// 常见周期查表，其余周期用 `0.269 * m^0.928` 近似。
pub(crate) fn canova_hansen_critical_value(period: usize) -> f64 {
    const TABLE: [f64; 11] = [
        0.461_714_6,
        0.747_965_5,
        1.000_781_8,
        1.237_535_0,
        1.462_524_0,
        1.692_020_0,
        1.904_309_6,
        2.116_960_2,
        2.326_856_2,
        2.540_692_2,
        2.739_100_7,
    ];
    match period {
        2..=12 => TABLE[period - 2],
        24 => 5.098_624,
        52 => 10.341_416,
        365 => 65.444_45,
        _ => 0.269 * to_f64(period).powf(0.928),
    }
}

/// 前 `m - 1` 个 Fourier 季节回归元，t 从 1 开始。
fn fourier_terms(n: usize, period: usize) -> Vec<Vec<f64>> {
    let m = to_f64(period);
    (1..=n)
        .map(|t| {
            let t = to_f64(t);
            (1..=period)
                .flat_map(|i| {
                    let angle = 2.0 * PI * to_f64(i) * t / m;
                    [angle.cos(), angle.sin()]
                })
                .take(period - 1)
                .collect()
        })
        .collect()
}

/// # Summary
/// Canova-Hansen 季节稳定性检验，原假设为确定性 (稳定) 季节。
///
/// # Logic
/// 1. `x` 对常数与 Fourier 季节项回归，得残差 e。
/// 2. `f_t = R_t * e_t`，以截断 `round(m * (n/100)^(1/4))` 的 Bartlett 核估计其长期协方差 Ω。
/// 3. `L = sum_t F_t' Ω^-1 F_t / n^2`，F_t 为 f 的累加和。
///
/// # Returns
/// 样本少于 `2m + 5` 返回 `InsufficientData`；Ω 奇异返回 `NumericDegeneracy`。
pub(crate) fn canova_hansen(x: &[f64], period: usize) -> Result<SeasonalTestResult, StationarityError> {
    let n = x.len();
    ensure_length(x, 2 * period + 5)?;
    let k = period - 1;

    let fourier = fourier_terms(n, period);
    let rows: Vec<Vec<f64>> = fourier
        .iter()
        .map(|r| std::iter::once(1.0).chain(r.iter().copied()).collect())
        .collect();
    let resid = OlsFit::fit(x, &rows)?.residuals();

    let flat: Vec<f64> = fourier
        .iter()
        .zip(resid.iter())
        .flat_map(|(r, e)| r.iter().map(move |v| v * e))
        .collect();
    let f = DMatrix::from_row_slice(n, k, &flat);

    let lags = round_to_usize(to_f64(period) * (to_f64(n) / 100.0).powf(0.25));
    let mut omega = f.transpose() * &f;
    for lag in 1..=lags.min(n - 1) {
        let weight = 1.0 - to_f64(lag) / (to_f64(lags) + 1.0);
        let lead = f.rows(lag, n - lag);
        let lagged = f.rows(0, n - lag);
        let cross = lead.transpose() * lagged;
        omega += (&cross + cross.transpose()) * weight;
    }
    omega /= to_f64(n);

    let omega_inv = omega.try_inverse().ok_or_else(|| {
        StationarityError::NumericDegeneracy(
            "Canova-Hansen long-run covariance is singular".to_string(),
        )
    })?;

    let mut cumulative = DVector::<f64>::zeros(k);
    let mut total = 0.0;
    for row in f.row_iter() {
        cumulative += row.transpose();
        total += (cumulative.transpose() * &omega_inv * &cumulative)[(0, 0)];
    }
    let statistic = total / (to_f64(n) * to_f64(n));
    if !statistic.is_finite() {
        return Err(StationarityError::NumericDegeneracy(
            "Canova-Hansen statistic is not finite".to_string(),
        ));
    }

    Ok(SeasonalTestResult {
        test: SeasonalMethod::CanovaHansen,
        statistic,
        critical_value: canova_hansen_critical_value(period),
        lags_used: lags,
        period,
        nobs: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsa_core::test_utils::{seasonal_random_walk, seasonal_shift, white_noise};

    #[test]
    fn test_ocsb_critical_value_for_monthly_data() {
        let crit = ocsb_critical_value(12);
        assert!((crit - (-1.803)).abs() < 0.01, "crit = {crit}");
        assert!((ocsb_critical_value(4) - (-1.893)).abs() < 0.01);
    }

    #[test]
    fn test_canova_hansen_table_and_fallback() {
        assert_eq!(canova_hansen_critical_value(12), 2.739_100_7);
        assert_eq!(canova_hansen_critical_value(4), 1.000_781_8);
        let weekly = canova_hansen_critical_value(7);
        assert!(weekly > 1.4 && weekly < 1.8);
        let far = canova_hansen_critical_value(30);
        assert!((far - 0.269 * 30f64.powf(0.928)).abs() < 1e-12);
    }

    #[test]
    fn test_fourier_terms_drop_last_column() {
        let terms = fourier_terms(4, 4);
        assert_eq!(terms.len(), 4);
        assert_eq!(terms[0].len(), 3);
        // t = 1, i = 1: cos(pi/2), sin(pi/2)
        assert!(terms[0][0].abs() < 1e-12);
        assert!((terms[0][1] - 1.0).abs() < 1e-12);
        // i = 2: cos(pi) at t = 1
        assert!((terms[0][2] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ocsb_rejects_seasonal_unit_root_on_noise() {
        let x = white_noise(240, 21);
        let r = ocsb(&x, 12, 3, InformationCriterion::Aic).unwrap();
        assert!(!r.needs_seasonal_difference(), "{r:?}");
        assert!(r.lags_used <= 3);
        assert_eq!(r.period, 12);
    }

    #[test]
    fn test_ocsb_shrinks_lag_search_on_short_samples() {
        let x = white_noise(20, 4);
        // 20 >= 12 + 2*2 + 4，但不足以支持 3 阶
        let r = ocsb(&x, 12, 3, InformationCriterion::Aic).unwrap();
        assert!(r.lags_used <= 2);
        let err = ocsb(&x[..15], 12, 3, InformationCriterion::Aic).unwrap_err();
        assert_eq!(err, StationarityError::InsufficientData { required: 16, got: 15 });
    }

    #[test]
    fn test_ocsb_flags_seasonal_random_walk() {
        let x = seasonal_random_walk(240, 12, 8);
        let r = ocsb(&x, 12, 3, InformationCriterion::Aic).unwrap();
        assert!(r.needs_seasonal_difference(), "{r:?}");
        // 候选阶数 1..=3 共用从 12 + 1 + 3 开始的样本
        assert_eq!(r.nobs, 224);
    }

    #[test]
    fn test_canova_hansen_flags_shifting_seasonal_pattern() {
        let x = seasonal_shift(1200, 12, 8);
        let r = canova_hansen(&x, 12).unwrap();
        assert!(r.needs_seasonal_difference(), "{r:?}");
        // round(12 * 12^(1/4))
        assert_eq!(r.lags_used, 22);
    }

    #[test]
    fn test_canova_hansen_needs_two_cycles() {
        let x = white_noise(28, 1);
        let err = canova_hansen(&x, 12).unwrap_err();
        assert_eq!(err, StationarityError::InsufficientData { required: 29, got: 28 });
    }
}
