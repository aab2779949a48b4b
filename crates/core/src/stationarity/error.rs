use crate::series::error::SeriesError;
use thiserror::Error;

/// # Summary
/// 平稳性分析错误枚举。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - 任何错误都直接返回给调用方，分析器内部不做重试或部分恢复。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StationarityError {
    /// 样本长度不足以支撑所需的滞后阶数
    #[error("Insufficient data: need at least {required} observations, got {got}")]
    InsufficientData { required: usize, got: usize },
    /// 常数序列或奇异回归，检验在数学上无定义
    #[error("Numeric degeneracy: {0}")]
    NumericDegeneracy(String),
    /// 含有无穷值等非法观测
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// 分析配置不合法
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    /// 序列构造或变换失败
    #[error(transparent)]
    Series(#[from] SeriesError),
}
