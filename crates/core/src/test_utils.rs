//! 测试用的合成序列生成器，仅在 `test-utils` feature 下编译。
//!
//! 所有生成器都使用固定种子，保证测试结果可复现。

use crate::common::num::to_f64;
use crate::series::entity::TimeSeries;
use crate::series::error::SeriesError;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, StandardNormal};

/// 标准正态白噪声。
pub fn white_noise(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| StandardNormal.sample(&mut rng)).collect()
}

/// # Summary
/// MA(1) 噪声 `e_t + theta * e_{t-1}`。
///
/// # Logic
/// `theta` 取负值时得到强均值回复的平稳序列。
pub fn ma_noise(n: usize, theta: f64, seed: u64) -> Vec<f64> {
    let e = white_noise(n + 1, seed);
    e.windows(2).map(|w| w[1] + theta * w[0]).collect()
}

/// 累加求和，把平稳增量变成含单位根的序列。
pub fn integrate(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

/// 带漂移的随机游走，增量为 `drift + MA(1)` 噪声。
pub fn random_walk(n: usize, drift: f64, seed: u64) -> Vec<f64> {
    let steps: Vec<f64> = ma_noise(n, -0.5, seed).iter().map(|e| drift + e).collect();
    integrate(&steps)
}

/// 季节随机游走 `x_t = x_{t-period} + e_t`。
pub fn seasonal_random_walk(n: usize, period: usize, seed: u64) -> Vec<f64> {
    let e = white_noise(n, seed);
    let mut x = vec![0.0; n];
    for t in 0..n {
        x[t] = if t >= period { x[t - period] + e[t] } else { e[t] };
    }
    x
}

/// # Summary
/// 季节形态在样本中点发生变化的序列。
///
/// # Logic
/// `x_t = a_t * cos(2πt/period) + 0.2 * e_t`，前半段 `a_t = 1`，后半段 `a_t = 3`。
/// 季节形态不稳定但没有季节单位根，用于 Canova-Hansen 的备择假设。
pub fn seasonal_shift(n: usize, period: usize, seed: u64) -> Vec<f64> {
    let e = white_noise(n, seed);
    let m = to_f64(period);
    (0..n)
        .map(|t| {
            let amplitude = if t < n / 2 { 1.0 } else { 3.0 };
            let angle = 2.0 * std::f64::consts::PI * to_f64(t + 1) / m;
            amplitude * angle.cos() + 0.2 * e[t]
        })
        .collect()
}

/// 以 2000-01-01 起的日索引包装观测值。
pub fn series_from_values(name: &str, values: Vec<f64>) -> Result<TimeSeries, SeriesError> {
    let start: DateTime<Utc> = NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
        .unwrap_or_default();
    let index = (0..values.len())
        .map(|i| start + Duration::days(i64::try_from(i).unwrap_or(i64::MAX / 86_400_000)))
        .collect();
    TimeSeries::new(name, index, values)
}
