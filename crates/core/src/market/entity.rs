use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// # Summary
/// 单根 K 线数据实体，记录特定时段内的行情波动。
///
/// # Invariants
/// - `high` 必须大于或等于 `low`, `open`, `close`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    // K 线开始时间
    pub time: DateTime<Utc>,
    // 开盘价
    pub open: f64,
    // 最高价
    pub high: f64,
    // 最低价
    pub low: f64,
    // 收盘价
    pub close: f64,
    // 调整后收盘价 (用于处理分红、拆股等复权情况)
    #[serde(default)]
    pub adj_close: Option<f64>,
    // 成交量
    #[serde(default)]
    pub volume: f64,
}

/// # Summary
/// 构建价格序列时选用的价格字段。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    #[default]
    Close,
    // 缺失时回退到收盘价
    AdjClose,
}

impl Candle {
    /// 按字段取出价格。
    pub fn price(&self, field: PriceField) -> f64 {
        match field {
            PriceField::Close => self.close,
            PriceField::AdjClose => self.adj_close.unwrap_or(self.close),
        }
    }
}
