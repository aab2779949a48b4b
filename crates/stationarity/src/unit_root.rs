use crate::mackinnon;
use crate::ols::OlsFit;
use crate::prepare::{bartlett_long_run_variance, difference, ensure_length};
use tracing::debug;
use tsa_core::common::num::{ceil_to_usize, floor_to_usize, to_f64};
use tsa_core::stationarity::entity::{InformationCriterion, StationarityTestResult, TestKind};
use tsa_core::stationarity::error::StationarityError;

// 回归中的确定性项个数 (仅常数)
const NTREND: usize = 1;

/// # Summary
/// 构造 ADF 回归 `Δy_t = c + ρ y_{t-1} + Σ γ_i Δy_{t-i} + ε_t`。
///
/// # Logic
/// 行 t 对应差分序列下标 `start..len`，回归元依次为常数、滞后水平值、`lag` 个滞后差分。
/// 自动选阶时所有候选都使用 `start = maxlag`，保证样本相同、信息准则可比。
fn adf_design(x: &[f64], dx: &[f64], lag: usize, start: usize) -> (Vec<f64>, Vec<Vec<f64>>) {
    let mut y = Vec::with_capacity(dx.len().saturating_sub(start));
    let mut rows = Vec::with_capacity(y.capacity());
    for t in start..dx.len() {
        y.push(dx[t]);
        let mut row = Vec::with_capacity(lag + 2);
        row.push(1.0);
        row.push(x[t]);
        row.extend((1..=lag).map(|i| dx[t - i]));
        rows.push(row);
    }
    (y, rows)
}

/// # Summary
/// 增广 Dickey-Fuller 检验 (带常数项)。
///
/// # Logic
/// 1. 最大滞后取 `ceil(12 * (n/100)^(1/4))`，并限制在 `n/2 - 2` 以内。
/// 2. 未指定固定阶数时，在相同样本上对 0..=maxlag 逐一拟合，取信息准则最小者。
/// 3. 以选定阶数在完整可用样本上重新拟合，取滞后水平项的 t 值为统计量。
///
/// # Arguments
/// * `x`: 已去除缺失值的非常数观测。
/// * `n_lags`: 固定滞后阶数，None 表示自动选择。
/// * `ic`: 自动选择时使用的信息准则。
///
/// # Returns
/// 成功返回检验结果；样本过短返回 `InsufficientData`。
pub(crate) fn adf(
    x: &[f64],
    n_lags: Option<usize>,
    ic: InformationCriterion,
) -> Result<StationarityTestResult, StationarityError> {
    let n = x.len();
    let min_len = 2 * (NTREND + 1);
    ensure_length(x, min_len)?;
    let cap = n / 2 - NTREND - 1;

    let dx = difference(x, 1);
    let lag = match n_lags {
        Some(fixed) => {
            if fixed > cap {
                return Err(StationarityError::InsufficientData {
                    required: 2 * (fixed + NTREND + 1),
                    got: n,
                });
            }
            fixed
        }
        None => {
            let maxlag = ceil_to_usize(12.0 * (to_f64(n) / 100.0).powf(0.25)).min(cap);
            select_lag(x, &dx, maxlag, ic)?
        }
    };

    let (y, rows) = adf_design(x, &dx, lag, lag);
    let fit = OlsFit::fit(&y, &rows)?;
    let statistic = fit.t_value(1);
    if !statistic.is_finite() {
        return Err(StationarityError::NumericDegeneracy(
            "ADF regression fits the data exactly".to_string(),
        ));
    }

    Ok(StationarityTestResult {
        test: TestKind::AugmentedDickeyFuller,
        statistic,
        p_value: mackinnon::p_value(statistic),
        lags_used: lag,
        nobs: fit.nobs,
        critical_values: mackinnon::critical_values(fit.nobs),
    })
}

fn select_lag(
    x: &[f64],
    dx: &[f64],
    maxlag: usize,
    ic: InformationCriterion,
) -> Result<usize, StationarityError> {
    let mut best: Option<(usize, f64)> = None;
    for lag in 0..=maxlag {
        let (y, rows) = adf_design(x, dx, lag, maxlag);
        let score = OlsFit::fit(&y, &rows)?.information_criterion(ic);
        if best.is_none_or(|(_, b)| score < b) {
            best = Some((lag, score));
        }
    }
    let lag = best.map_or(0, |(lag, _)| lag);
    debug!("ADF lag selection: {:?} picked {} of max {}", ic, lag, maxlag);
    Ok(lag)
}

/// # Summary
/// Phillips-Perron Z(t) 检验 (带常数项)。
///
/// # Logic
/// 1. 拟合 `y_t = c + ρ y_{t-1} + u_t`。
/// 2. 以 `trunc(4 * (T/100)^(1/4))` 阶 Bartlett 核估计残差长期方差 λ²。
/// 3. `Z(t) = sqrt(γ0/λ²) * t_ρ - (λ² - γ0) / (2λ) * (T * se(ρ) / s)`，
///    其中 `t_ρ = (ρ - 1) / se(ρ)`，`γ0 = SSR/T`，`s² = SSR/(T-k)`。
/// 4. Z(t) 与 DF 的 t 统计量同分布，沿用 MacKinnon p 值与临界值。
pub(crate) fn phillips_perron(x: &[f64]) -> Result<StationarityTestResult, StationarityError> {
    ensure_length(x, 2 * (NTREND + 1))?;
    let y = &x[1..];
    let rows: Vec<Vec<f64>> = x[..x.len() - 1].iter().map(|v| vec![1.0, *v]).collect();
    let fit = OlsFit::fit(y, &rows)?;

    let t_obs = to_f64(fit.nobs);
    let lags = floor_to_usize(4.0 * (t_obs / 100.0).powf(0.25));
    let resid = fit.residuals();
    let gamma0 = fit.ssr / t_obs;
    let lam2 = bartlett_long_run_variance(&resid, lags);
    if !(lam2 > 0.0 && gamma0 > 0.0) {
        return Err(StationarityError::NumericDegeneracy(
            "PP regression residuals have zero variance".to_string(),
        ));
    }
    let lam = lam2.sqrt();
    let s = (fit.ssr / to_f64(fit.nobs - fit.k)).sqrt();
    let se = fit.std_errors[1];
    let t_rho = (fit.params[1] - 1.0) / se;
    let statistic =
        (gamma0 / lam2).sqrt() * t_rho - 0.5 * ((lam2 - gamma0) / lam) * (t_obs * se / s);
    if !statistic.is_finite() {
        return Err(StationarityError::NumericDegeneracy(
            "PP statistic is not finite".to_string(),
        ));
    }

    Ok(StationarityTestResult {
        test: TestKind::PhillipsPerron,
        statistic,
        p_value: mackinnon::p_value(statistic),
        lags_used: lags,
        nobs: fit.nobs,
        critical_values: mackinnon::critical_values(fit.nobs),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsa_core::test_utils::ma_noise;

    fn mean_reverting(n: usize) -> Vec<f64> {
        ma_noise(n, -0.5, 7)
    }

    #[test]
    fn test_design_rows_align_levels_and_lagged_differences() {
        let x = [1.0, 2.0, 4.0, 7.0, 11.0];
        let dx = difference(&x, 1);
        let (y, rows) = adf_design(&x, &dx, 1, 1);
        // dx = [1, 2, 3, 4]
        assert_eq!(y, vec![2.0, 3.0, 4.0]);
        assert_eq!(rows[0], vec![1.0, 2.0, 1.0]);
        // 第 t 行的水平项为 x[t]，对应 dx[t] = x[t+1] - x[t]
        assert_eq!(rows[2], vec![1.0, 7.0, 3.0]);
    }

    #[test]
    fn test_adf_rejects_on_mean_reverting_series() {
        let x = mean_reverting(200);
        let r = adf(&x, None, InformationCriterion::Aic).unwrap();
        assert!(r.p_value < 0.05, "{r:?}");
        assert!(r.lags_used <= 15);
        assert_eq!(r.critical_values.len(), 3);
    }

    #[test]
    fn test_adf_too_short() {
        let err = adf(&[1.0, 2.0, 1.5], None, InformationCriterion::Aic).unwrap_err();
        assert_eq!(err, StationarityError::InsufficientData { required: 4, got: 3 });
    }

    #[test]
    fn test_adf_fixed_lag_beyond_cap() {
        let x = mean_reverting(20);
        // cap = 20/2 - 2 = 8
        let err = adf(&x, Some(9), InformationCriterion::Aic).unwrap_err();
        assert!(matches!(err, StationarityError::InsufficientData { got: 20, .. }));
        let ok = adf(&x, Some(2), InformationCriterion::Aic).unwrap();
        assert_eq!(ok.lags_used, 2);
        assert_eq!(ok.nobs, 17);
    }

    #[test]
    fn test_pp_rejects_on_mean_reverting_series() {
        let x = mean_reverting(200);
        let r = phillips_perron(&x).unwrap();
        assert!(r.p_value < 0.05, "{r:?}");
        assert_eq!(r.nobs, 199);
    }
}
