use chrono::{TimeZone, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tsa_core::common::Stock;
use tsa_core::market::entity::Candle;
use tsa_core::market::error::SourceError;
use tsa_core::market::port::PriceSource;

/// # Summary
/// 读取 `<data_dir>/<SYMBOL>.json` 的本地行情数据源。
///
/// # Invariants
/// - 文件内容为 K 线数组，或原样保存的 Yahoo v8 chart 响应。
/// - 返回的 K 线按时间升序排列。
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    // 缓存文件所在目录
    data_dir: PathBuf,
}

impl JsonFileSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// 某个标的对应的缓存文件路径，代码统一转为大写。
    pub fn path_for(&self, stock: &Stock) -> PathBuf {
        self.data_dir
            .join(format!("{}.json", stock.symbol.to_uppercase()))
    }
}

/// # Summary
/// Yahoo chart 接口响应顶层结构。
#[derive(Deserialize, Debug)]
struct YahooResponse {
    chart: YahooChart,
}

#[derive(Deserialize, Debug)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Deserialize, Debug)]
struct YahooError {
    description: String,
}

#[derive(Deserialize, Debug)]
struct YahooResult {
    timestamp: Vec<i64>,
    indicators: YahooIndicators,
}

#[derive(Deserialize, Debug)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
    // 复权收盘价，部分区间可能缺失
    adjclose: Option<Vec<YahooAdjClose>>,
}

#[derive(Deserialize, Debug)]
struct YahooAdjClose {
    adjclose: Vec<Option<f64>>,
}

#[derive(Deserialize, Debug)]
struct YahooQuote {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

/// 缓存文件支持的两种格式。
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum CachedFile {
    Candles(Vec<Candle>),
    Yahoo(YahooResponse),
}

/// # Summary
/// 将 Yahoo chart 响应展开为 K 线列表。
///
/// # Logic
/// 1. 响应中带错误描述时直接返回 `Parse`。
/// 2. 取第一组报价，按时间戳逐行组装。
/// 3. OHLCV 任一字段缺失的行被跳过 (停牌、半日市)。
fn candles_from_yahoo(resp: YahooResponse, symbol: &str) -> Result<Vec<Candle>, SourceError> {
    if let Some(err) = resp.chart.error {
        return Err(SourceError::Parse(err.description));
    }
    let result = resp
        .chart
        .result
        .and_then(|mut r| r.pop())
        .ok_or_else(|| SourceError::NotFound(symbol.to_string()))?;
    let quote = result
        .indicators
        .quote
        .first()
        .ok_or_else(|| SourceError::Parse("No quote data".into()))?;
    let adj_close_list = result
        .indicators
        .adjclose
        .as_ref()
        .and_then(|v| v.first())
        .map(|v| &v.adjclose);

    let mut candles = Vec::with_capacity(result.timestamp.len());
    let mut skipped = 0usize;
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let row = (
            quote.open.get(i).and_then(|x| *x),
            quote.high.get(i).and_then(|x| *x),
            quote.low.get(i).and_then(|x| *x),
            quote.close.get(i).and_then(|x| *x),
            quote.volume.get(i).and_then(|x| *x),
        );
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = row else {
            skipped += 1;
            continue;
        };
        let time = Utc
            .timestamp_opt(ts, 0)
            .single()
            .ok_or_else(|| SourceError::Parse(format!("invalid timestamp {}", ts)))?;
        candles.push(Candle {
            time,
            open,
            high,
            low,
            close,
            adj_close: adj_close_list.and_then(|list| list.get(i)).and_then(|x| *x),
            volume,
        });
    }
    if skipped > 0 {
        debug!("{}: skipped {} incomplete rows", symbol, skipped);
    }
    Ok(candles)
}

/// 从磁盘读取并解析一个缓存文件。
fn read_cached(path: &Path, symbol: &str) -> Result<Vec<Candle>, SourceError> {
    let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => SourceError::NotFound(symbol.to_string()),
        _ => SourceError::Io(format!("{}: {}", path.display(), e)),
    })?;
    let parsed: CachedFile = serde_json::from_str(&raw)
        .map_err(|e| SourceError::Parse(format!("{}: {}", path.display(), e)))?;
    match parsed {
        CachedFile::Candles(candles) => Ok(candles),
        CachedFile::Yahoo(resp) => candles_from_yahoo(resp, symbol),
    }
}

impl PriceSource for JsonFileSource {
    /// # Summary
    /// 读取标的全部缓存 K 线。
    ///
    /// # Logic
    /// 1. 定位 `<data_dir>/<SYMBOL>.json`，文件不存在时返回 `NotFound`。
    /// 2. 按 K 线数组或 Yahoo 响应解析。
    /// 3. 按时间升序排序后返回。
    fn load(&self, stock: &Stock) -> Result<Vec<Candle>, SourceError> {
        let path = self.path_for(stock);
        let mut candles = read_cached(&path, &stock.symbol)?;
        candles.sort_by_key(|c| c.time);
        info!(
            "Loaded {} candles for {} from {}",
            candles.len(),
            stock.symbol,
            path.display()
        );
        Ok(candles)
    }
}
