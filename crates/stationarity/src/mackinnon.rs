//! MacKinnon 单位根分布近似，带常数项、单个变量的情形。
//!
//! p 值来自 MacKinnon (1994) 的响应面回归，临界值来自 MacKinnon (2010)。

use statrs::function::erf::erfc;
use std::collections::BTreeMap;
use std::f64::consts::SQRT_2;
use tsa_core::common::num::to_f64;

// 超出该区间时 p 值取边界
const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
// 小 p 与大 p 响应面的分界点
const TAU_STAR: f64 = -1.61;

const SMALL_P: [f64; 3] = [2.1659, 1.4412, 3.8269e-2];
const LARGE_P: [f64; 4] = [1.7339, 9.3202e-1, -1.2745e-1, -1.0368e-2];

// (标签, [c0, c1, c2, c3])，临界值 = c0 + c1/T + c2/T^2 + c3/T^3
const CRITICAL_2010: [(&str, [f64; 4]); 3] = [
    ("1%", [-3.43035, -6.5393, -16.786, -79.433]),
    ("5%", [-2.86154, -2.8903, -4.234, -40.040]),
    ("10%", [-2.56677, -1.5384, -2.809, 0.0]),
];

/// 标准正态分布函数。
pub(crate) fn std_normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

fn polyval(coefs: &[f64], x: f64) -> f64 {
    coefs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// # Summary
/// 单位根检验统计量的渐近 p 值。
///
/// # Logic
/// 1. 统计量超出响应面有效区间时直接返回 0 或 1。
/// 2. 以 `TAU_STAR` 为界选择小 p 或大 p 多项式。
/// 3. 多项式值经标准正态分布函数映射为概率。
pub(crate) fn p_value(stat: f64) -> f64 {
    if stat > TAU_MAX {
        return 1.0;
    }
    if stat < TAU_MIN {
        return 0.0;
    }
    let coefs: &[f64] = if stat <= TAU_STAR { &SMALL_P } else { &LARGE_P };
    std_normal_cdf(polyval(coefs, stat))
}

/// 给定回归样本量下 1%、5%、10% 的有限样本临界值。
pub(crate) fn critical_values(nobs: usize) -> BTreeMap<String, f64> {
    let inv = 1.0 / to_f64(nobs);
    CRITICAL_2010
        .iter()
        .map(|(label, c)| {
            let value = c[0] + c[1] * inv + c[2] * inv.powi(2) + c[3] * inv.powi(3);
            ((*label).to_string(), value)
        })
        .collect()
}
