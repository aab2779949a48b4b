//! # `tsa-core` - 时间序列平稳性分析核心域
//!
//! 本 crate 只定义实体、错误与端口 (Port)，不包含任何统计检验的具体实现。
//!
//! ## 架构职责
//! - `market`: K 线实体与行情数据源端口
//! - `series`: 带日期索引的时间序列及其变换 (重采样、对数、差分、滚动统计)
//! - `stationarity`: 平稳性检验结果、差分阶数建议与分析器端口
//! - `config`: 显式的分析配置，替代全局可变状态

pub mod common;
pub mod config;

pub mod market {
    pub mod entity;
    pub mod error;
    pub mod port;
}

pub mod series {
    pub mod entity;
    pub mod error;
}

pub mod stationarity {
    pub mod entity;
    pub mod error;
    pub mod port;
}

#[cfg(feature = "test-utils")]
pub mod test_utils;
