use thiserror::Error;

/// # Summary
/// 行情数据源错误枚举，处理文件读取、解析及数据缺失等问题。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
#[derive(Error, Debug)]
pub enum SourceError {
    // 读取缓存文件失败
    #[error("IO error: {0}")]
    Io(String),
    // 数据解析错误，如 JSON 格式不匹配
    #[error("Parse error: {0}")]
    Parse(String),
    // 请求的标的没有缓存数据
    #[error("Data not found for {0}")]
    NotFound(String),
}
