//! 自相关诊断：ACF、PACF 与 Ljung-Box 白噪声检验。
//!
//! 输出只是数值与置信带，绘图由调用方负责。

use crate::prepare::{ensure_length, lagged_cross_product, mean, observations};
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};
use tsa_core::common::num::to_f64;
use tsa_core::series::entity::TimeSeries;
use tsa_core::stationarity::entity::{CorrelationKind, Correlogram, LjungBoxResult};
use tsa_core::stationarity::error::StationarityError;

/// 双侧置信带的正态分位数 `z_{1 - alpha/2}`。
fn band_quantile(alpha: f64) -> Result<f64, StationarityError> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(StationarityError::InvalidConfig(format!(
            "alpha must lie in (0, 1), got {}",
            alpha
        )));
    }
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| StationarityError::NumericDegeneracy(e.to_string()))?;
    Ok(normal.inverse_cdf(1.0 - alpha / 2.0))
}

/// 有偏样本自相关 (分母为 n)，下标 0..=n_lags。
fn sample_acf(x: &[f64], n_lags: usize) -> Vec<f64> {
    let m = mean(x);
    let centered: Vec<f64> = x.iter().map(|v| v - m).collect();
    let c0 = lagged_cross_product(&centered, 0);
    (0..=n_lags)
        .map(|k| lagged_cross_product(&centered, k) / c0)
        .collect()
}

/// # Summary
/// 样本自相关函数及 Bartlett 置信带。
///
/// # Logic
/// 滞后 k 的置信带半宽为 `z * sqrt((1 + 2 * sum_{j<k} r_j^2) / n)`，
/// 即 MA(k-1) 原假设下的标准误。
///
/// # Returns
/// `n_lags >= n` 返回 `InsufficientData`，常数序列返回 `NumericDegeneracy`。
pub fn acf(series: &TimeSeries, n_lags: usize, alpha: f64) -> Result<Correlogram, StationarityError> {
    let z = band_quantile(alpha)?;
    let x = observations(series)?;
    ensure_length(&x, n_lags + 1)?;
    let n = to_f64(x.len());

    let values = sample_acf(&x, n_lags);
    let mut band = Vec::with_capacity(values.len());
    let mut cumulative = 0.0;
    for (k, r) in values.iter().enumerate() {
        if k == 0 {
            band.push(0.0);
            continue;
        }
        band.push(z * ((1.0 + 2.0 * cumulative) / n).sqrt());
        cumulative += r * r;
    }

    Ok(Correlogram {
        kind: CorrelationKind::Acf,
        alpha,
        values,
        band,
    })
}

/// # Summary
/// 偏自相关函数，Durbin-Levinson 递推。
///
/// # Logic
/// 1. 由样本 ACF 递推每阶 AR 系数，取末项为该阶偏自相关。
/// 2. 置信带为常数 `z / sqrt(n)`。
///
/// # Returns
/// 样本量少于 `2 * (n_lags + 1)` 返回 `InsufficientData`。
pub fn pacf(series: &TimeSeries, n_lags: usize, alpha: f64) -> Result<Correlogram, StationarityError> {
    let z = band_quantile(alpha)?;
    let x = observations(series)?;
    ensure_length(&x, 2 * (n_lags + 1))?;
    let n = to_f64(x.len());
    let r = sample_acf(&x, n_lags);

    let mut values = vec![1.0];
    let mut phi: Vec<f64> = Vec::with_capacity(n_lags);
    for k in 1..=n_lags {
        let num = r[k] - phi.iter().enumerate().map(|(j, p)| p * r[k - 1 - j]).sum::<f64>();
        let den = 1.0 - phi.iter().enumerate().map(|(j, p)| p * r[j + 1]).sum::<f64>();
        if den.abs() < f64::EPSILON {
            return Err(StationarityError::NumericDegeneracy(format!(
                "Durbin-Levinson recursion breaks down at lag {}",
                k
            )));
        }
        let pkk = num / den;
        let prev = phi.clone();
        for (j, p) in phi.iter_mut().enumerate() {
            *p -= pkk * prev[k - 2 - j];
        }
        phi.push(pkk);
        values.push(pkk);
    }

    let width = z / n.sqrt();
    let band = (0..=n_lags).map(|k| if k == 0 { 0.0 } else { width }).collect();
    Ok(Correlogram {
        kind: CorrelationKind::Pacf,
        alpha,
        values,
        band,
    })
}

/// # Summary
/// Ljung-Box 检验，逐个滞后阶给出 Q 统计量与 p 值。
///
/// # Logic
/// `Q_h = n (n + 2) sum_{k=1}^{h} r_k^2 / (n - k)`，p 值取自由度为 h 的卡方上尾概率。
pub fn ljung_box(series: &TimeSeries, n_lags: usize) -> Result<Vec<LjungBoxResult>, StationarityError> {
    let x = observations(series)?;
    ensure_length(&x, n_lags + 1)?;
    let n = to_f64(x.len());
    let r = sample_acf(&x, n_lags);

    let mut out = Vec::with_capacity(n_lags);
    let mut acc = 0.0;
    for (lag, rk) in r.iter().enumerate().skip(1) {
        acc += rk * rk / (n - to_f64(lag));
        let statistic = n * (n + 2.0) * acc;
        let chi2 = ChiSquared::new(to_f64(lag))
            .map_err(|e| StationarityError::NumericDegeneracy(e.to_string()))?;
        out.push(LjungBoxResult {
            lag,
            statistic,
            p_value: 1.0 - chi2.cdf(statistic),
        });
    }
    Ok(out)
}
