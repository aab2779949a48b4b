use crate::common::Stock;
use crate::market::entity::Candle;
use crate::market::error::SourceError;

/// # Summary
/// 预先下载的历史行情数据源接口。
///
/// # Invariants
/// - 返回的 K 线按时间升序排列。
/// - 下载与缓存格式由实现者决定，核心域不关心。
pub trait PriceSource: Send + Sync {
    /// # Summary
    /// 读取特定证券的全部历史 K 线。
    ///
    /// # Logic
    /// 1. 定位该证券的缓存数据。
    /// 2. 解析为 `Candle` 列表并按时间排序。
    ///
    /// # Arguments
    /// * `stock`: 证券身份。
    ///
    /// # Returns
    /// 成功返回 K 线列表，失败返回 SourceError。
    fn load(&self, stock: &Stock) -> Result<Vec<Candle>, SourceError>;
}
