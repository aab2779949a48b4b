use crate::common::TimeFrame;
use crate::market::entity::PriceField;
use crate::stationarity::entity::{HypothesisType, InformationCriterion};
use crate::stationarity::error::StationarityError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 全局应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub analysis: AnalysisConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    // 缓存行情文件所在目录
    pub data_dir: String,
    pub symbol: String,
    pub price_field: PriceField,
    // 闭区间切片，缺省表示不截断
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    // 分析前的重采样周期
    pub frame: TimeFrame,
}

/// # Summary
/// 平稳性分析的显式配置，取代自由格式的关键字参数。
///
/// # Invariants
/// - `significance_level` 位于 (0, 1)。
/// - 差分上限至少为 1，季节周期至少为 2。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    // 固定滞后阶数；None 表示自动选择
    pub n_lags: Option<usize>,
    pub hypothesis_type: HypothesisType,
    pub significance_level: f64,
    pub information_criterion: InformationCriterion,
    // 非季节差分上限
    pub max_differences: usize,
    // 季节差分上限
    pub max_seasonal_differences: usize,
    pub seasonal_period: usize,
    // OCSB 自动选择 AR 阶数的上限
    pub ocsb_max_lag: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    // ACF/PACF 的最大滞后
    pub correlogram_lags: usize,
    pub rolling_window: usize,
    // 日志文件目录，缺省只输出到终端
    pub log_dir: Option<String>,
}

impl AnalysisConfig {
    /// # Summary
    /// 校验配置合法性。
    ///
    /// # Returns
    /// 合法返回 Ok，否则返回 `InvalidConfig`。
    pub fn validate(&self) -> Result<(), StationarityError> {
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(StationarityError::InvalidConfig(format!(
                "significance_level must lie in (0, 1), got {}",
                self.significance_level
            )));
        }
        if self.max_differences == 0 || self.max_seasonal_differences == 0 {
            return Err(StationarityError::InvalidConfig(
                "differencing caps must be at least 1".to_string(),
            ));
        }
        if self.seasonal_period < 2 {
            return Err(StationarityError::InvalidConfig(format!(
                "seasonal_period must be at least 2, got {}",
                self.seasonal_period
            )));
        }
        Ok(())
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            symbol: "GOOG".to_string(),
            price_field: PriceField::Close,
            start: None,
            end: None,
            frame: TimeFrame::Month1,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            n_lags: None,
            hypothesis_type: HypothesisType::LevelStationary,
            significance_level: 0.05,
            information_criterion: InformationCriterion::Aic,
            max_differences: 2,
            max_seasonal_differences: 1,
            seasonal_period: 12,
            ocsb_max_lag: 3,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            correlogram_lags: 40,
            rolling_window: 12,
            log_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.data.data_dir, "data");
        assert_eq!(config.data.frame, TimeFrame::Month1);
        assert_eq!(config.analysis.significance_level, 0.05);
        assert_eq!(config.analysis.max_differences, 2);
        assert_eq!(config.analysis.seasonal_period, 12);
        assert_eq!(config.report.correlogram_lags, 40);
        assert!(config.analysis.validate().is_ok());
    }

    #[test]
    fn test_invalid_analysis_config() {
        let mut config = AnalysisConfig::default();
        config.significance_level = 1.5;
        assert!(matches!(config.validate(), Err(StationarityError::InvalidConfig(_))));

        let mut config = AnalysisConfig::default();
        config.max_differences = 0;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.seasonal_period = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"analysis": {"max_differences": 3}}"#).unwrap();
        assert_eq!(config.analysis.max_differences, 3);
        assert_eq!(config.analysis.significance_level, 0.05);
        assert_eq!(config.data.symbol, "GOOG");
    }
}
