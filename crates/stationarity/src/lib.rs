//! # `tsa-stationarity` - 平稳性检验实现
//!
//! 实现 `tsa-core` 中的 [`StationarityAnalyzer`](tsa_core::stationarity::port::StationarityAnalyzer) 端口：
//! - 单位根检验：ADF、Phillips-Perron (MacKinnon p 值)
//! - 平稳性原假设检验：KPSS
//! - 季节检验：OCSB、Canova-Hansen
//! - 差分阶数建议与自相关诊断

pub mod analyzer;
pub mod autocorrelation;

mod kpss;
mod mackinnon;
mod ols;
mod prepare;
mod seasonal;
mod unit_root;

pub use analyzer::DefaultAnalyzer;
