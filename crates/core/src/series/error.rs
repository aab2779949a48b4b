use thiserror::Error;

/// # Summary
/// 时间序列构造与变换错误，属于进入任何检验之前的输入校验失败。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeriesError {
    /// 索引与观测值数量不一致
    #[error("Length mismatch: {index} timestamps, {values} values")]
    LengthMismatch { index: usize, values: usize },
    /// 时间戳未按升序排列
    #[error("Timestamps not ascending at position {0}")]
    NotAscending(usize),
    /// 出现重复时间戳
    #[error("Duplicate timestamp at position {0}")]
    DuplicateTimestamp(usize),
    /// 滚动窗口必须至少为 1
    #[error("Invalid rolling window: {0}")]
    InvalidWindow(usize),
    /// 差分滞后必须至少为 1
    #[error("Invalid difference lag: {0}")]
    InvalidLag(usize),
}
