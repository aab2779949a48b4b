use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;
use tsa_core::common::TimeFrame;
use tsa_core::config::AppConfig;
use tsa_core::market::entity::Candle;
use tsa_core::series::entity::TimeSeries;
use tsa_core::series::error::SeriesError;
use tsa_core::stationarity::entity::{
    Correlogram, DifferencingRecommendation, LjungBoxResult, StationarityReport,
};
use tsa_core::stationarity::error::StationarityError;
use tsa_core::stationarity::port::StationarityAnalyzer;
use tsa_stationarity::autocorrelation::{acf, ljung_box, pacf};

/// 滚动均值与标准差的取值范围，用于判断均值和方差是否随时间漂移。
#[derive(Debug, Clone, Serialize)]
pub struct RollingSummary {
    pub series: String,
    pub window: usize,
    pub mean_min: f64,
    pub mean_max: f64,
    pub std_min: f64,
    pub std_max: f64,
}

/// 单个序列的自相关诊断。
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub series: String,
    pub acf: Correlogram,
    pub pacf: Correlogram,
    pub ljung_box: Vec<LjungBoxResult>,
}

/// # Summary
/// 一次完整分析输出的报告。
///
/// # Invariants
/// - `tests`、`rolling`、`diagnostics` 都依次对应价格、对数价格、对数一阶差分。
/// - `recommendations` 基于原始价格序列。
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub frame: TimeFrame,
    pub nobs: usize,
    pub tests: Vec<StationarityReport>,
    pub rolling: Vec<RollingSummary>,
    pub diagnostics: Vec<Diagnostics>,
    pub recommendations: Vec<DifferencingRecommendation>,
}

fn finite_range(series: &TimeSeries) -> (f64, f64) {
    series
        .values()
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::NAN, f64::NAN), |(lo, hi), v| (lo.min(*v), hi.max(*v)))
}

fn rolling_summary(series: &TimeSeries, window: usize) -> Result<RollingSummary, SeriesError> {
    let (mean_min, mean_max) = finite_range(&series.rolling_mean(window)?);
    let (std_min, std_max) = finite_range(&series.rolling_std(window)?);
    Ok(RollingSummary {
        series: series.name().to_string(),
        window,
        mean_min,
        mean_max,
        std_min,
        std_max,
    })
}

fn diagnose(
    series: &TimeSeries,
    max_lags: usize,
    alpha: f64,
) -> Result<Diagnostics, StationarityError> {
    // PACF 需要至少 2 * (lags + 1) 个观测
    let usable = series.drop_missing().len();
    let lags = max_lags.min((usable / 2).saturating_sub(1));
    Ok(Diagnostics {
        series: series.name().to_string(),
        acf: acf(series, lags, alpha)?,
        pacf: pacf(series, lags, alpha)?,
        ljung_box: ljung_box(series, lags)?,
    })
}

/// # Summary
/// 从 K 线构建分析报告。
///
/// # Logic
/// 1. 取配置的价格字段建序列，按日期区间切片后重采样。
/// 2. 分别对价格、对数价格、对数一阶差分执行 ADF 与 KPSS。
/// 3. 三个序列各自的滚动均值与标准差范围。
/// 4. 三个序列各自的 ACF、PACF 与 Ljung-Box。
/// 5. 价格序列上汇总全部差分阶数建议。
///
/// # Arguments
/// * `config`: 应用配置。
/// * `candles`: 按时间升序的 K 线。
/// * `analyzer`: 平稳性分析器。
///
/// # Returns
/// 成功返回报告；序列非法或检验失败时返回对应错误。
pub fn build_report(
    config: &AppConfig,
    candles: &[Candle],
    analyzer: &impl StationarityAnalyzer,
) -> Result<AnalysisReport, Box<dyn std::error::Error>> {
    let data = &config.data;
    let prices = TimeSeries::from_candles(data.symbol.as_str(), candles, data.price_field)?
        .between(
            data.start.unwrap_or(NaiveDate::MIN),
            data.end.unwrap_or(NaiveDate::MAX),
        )
        .resample(data.frame);
    info!(
        "{}: {} observations after resampling to {}",
        data.symbol,
        prices.len(),
        data.frame
    );

    let log_prices = prices.ln();
    let log_returns = log_prices.diff(1)?;
    let stages = [&prices, &log_prices, &log_returns];
    let tests = stages
        .iter()
        .map(|s| analyzer.analyze(s))
        .collect::<Result<Vec<_>, _>>()?;
    for t in &tests {
        info!("{}: unit root and stationarity tests {:?}", t.series, t.agreement);
    }

    let window = config.report.rolling_window;
    let rolling = stages
        .iter()
        .map(|s| rolling_summary(s, window))
        .collect::<Result<Vec<_>, _>>()?;

    let alpha = analyzer.significance_level();
    let diagnostics = stages
        .iter()
        .map(|s| diagnose(s, config.report.correlogram_lags, alpha))
        .collect::<Result<Vec<_>, _>>()?;

    let recommendations = analyzer.recommend_all(&prices, config.analysis.seasonal_period)?;
    for r in &recommendations {
        info!("{}: {} recommends order {}", prices.name(), r.method, r.order);
    }

    Ok(AnalysisReport {
        symbol: data.symbol.clone(),
        frame: data.frame,
        nobs: prices.len(),
        tests,
        rolling,
        diagnostics,
        recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use tsa_core::test_utils::random_walk;
    use tsa_stationarity::DefaultAnalyzer;

    fn candles(days: usize) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap();
        random_walk(days, 0.05, 12)
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let close = 100.0 * (v / 50.0).exp();
                Candle {
                    time: start + Duration::days(i64::try_from(i).unwrap()),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    adj_close: None,
                    volume: 0.0,
                }
            })
            .collect()
    }

    #[test]
    fn test_monthly_report_sections() -> anyhow::Result<()> {
        let config = AppConfig::default();
        let analyzer = DefaultAnalyzer::new(config.analysis.clone())?;
        let report = build_report(&config, &candles(2400), &analyzer)
            .map_err(|e| anyhow::anyhow!(e.to_string()))?;

        // 2010-01 至 2016-07 共 79 个月
        assert_eq!(report.nobs, 79);
        assert_eq!(report.tests.len(), 3);
        assert_eq!(report.tests[1].series, "GOOG_log");
        assert_eq!(report.tests[2].series, "GOOG_log_diff");
        assert_eq!(report.tests[2].nobs, 78);
        assert_eq!(report.recommendations.len(), 5);
        let prices = TimeSeries::from_candles("GOOG", &candles(2400), config.data.price_field)?
            .resample(config.data.frame);
        assert_eq!(
            report.recommendations,
            analyzer.recommend_all(&prices, config.analysis.seasonal_period)?
        );

        let names: Vec<&str> = report.diagnostics.iter().map(|d| d.series.as_str()).collect();
        assert_eq!(names, vec!["GOOG", "GOOG_log", "GOOG_log_diff"]);
        // 79 / 2 - 1 = 38 个滞后，加上滞后 0
        assert!(report.diagnostics.iter().all(|d| d.acf.values.len() == 39));
        assert_eq!(report.rolling.len(), 3);
        assert_eq!(report.rolling[1].series, "GOOG_log");
        assert!(report.rolling.iter().all(|r| r.std_min <= r.std_max));
        // 对数差分序列首个值缺失，滚动统计仍有有限值
        assert!(report.rolling[2].mean_min.is_finite());

        let json = serde_json::to_value(&report)?;
        assert_eq!(json["symbol"], "GOOG");
        Ok(())
    }

    #[test]
    fn test_date_range_is_applied() -> anyhow::Result<()> {
        let mut config = AppConfig::default();
        config.data.start = NaiveDate::from_ymd_opt(2012, 1, 1);
        config.data.end = NaiveDate::from_ymd_opt(2015, 12, 31);
        let analyzer = DefaultAnalyzer::new(config.analysis.clone())?;
        let report = build_report(&config, &candles(2400), &analyzer)
            .map_err(|e| anyhow::anyhow!(e.to_string()))?;
        assert_eq!(report.nobs, 48);
        Ok(())
    }
}
