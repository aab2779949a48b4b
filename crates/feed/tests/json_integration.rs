use std::fs;
use tsa_core::common::Stock;
use tsa_core::market::entity::PriceField;
use tsa_core::market::error::SourceError;
use tsa_core::market::port::PriceSource;
use tsa_core::series::entity::TimeSeries;
use tsa_feed::json::JsonFileSource;

/// # Summary
/// 读取乱序的 K 线数组文件。
///
/// # Logic
/// 1. 写入两根时间倒序的 K 线，其中一根缺少复权价与成交量。
/// 2. 断言读取结果已按时间排序，缺省字段取默认值。
/// 3. 构建复权收盘价序列，缺失时回退到收盘价。
#[test]
fn test_load_candle_array() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(
        dir.path().join("GOOG.json"),
        r#"[
            {"time": "2020-02-03T00:00:00Z", "open": 2.0, "high": 2.5, "low": 1.5, "close": 2.2},
            {"time": "2020-01-02T00:00:00Z", "open": 1.0, "high": 1.5, "low": 0.5, "close": 1.2,
             "adj_close": 1.1, "volume": 10.0}
        ]"#,
    )?;

    let source = JsonFileSource::new(dir.path());
    let candles = source.load(&Stock::new("goog"))?;
    assert_eq!(candles.len(), 2);
    assert!(candles[0].time < candles[1].time);
    assert_eq!(candles[1].volume, 0.0);

    let series = TimeSeries::from_candles("GOOG", &candles, PriceField::AdjClose)?;
    assert_eq!(series.values(), &[1.1, 2.2]);
    Ok(())
}

#[test]
fn test_missing_file_is_not_found() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let source = JsonFileSource::new(dir.path());
    let err = source.load(&Stock::new("NOPE")).unwrap_err();
    assert!(matches!(err, SourceError::NotFound(symbol) if symbol == "NOPE"));
    Ok(())
}

#[test]
fn test_malformed_file_is_parse_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("BAD.json"), "{ not json")?;
    let source = JsonFileSource::new(dir.path());
    let err = source.load(&Stock::new("BAD")).unwrap_err();
    assert!(matches!(err, SourceError::Parse(_)));
    Ok(())
}

#[test]
fn test_load_saved_chart_response() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(
        dir.path().join("AAPL.json"),
        r#"{"chart": {"result": [{
            "timestamp": [1700086400, 1700000000],
            "indicators": {
                "quote": [{
                    "open": [2.0, 1.0], "high": [2.5, 1.5], "low": [1.5, 0.5],
                    "close": [2.2, 1.2], "volume": [20.0, 10.0]
                }]
            }
        }], "error": null}}"#,
    )?;

    let candles = JsonFileSource::new(dir.path()).load(&Stock::new("aapl"))?;
    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0].close, 1.2);
    assert_eq!(candles[1].adj_close, None);
    Ok(())
}
