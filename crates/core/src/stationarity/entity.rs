use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// # Summary
/// 平稳性原假设的形式：围绕常数平稳或围绕线性趋势平稳。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HypothesisType {
    #[default]
    LevelStationary,
    TrendStationary,
}

impl FromStr for HypothesisType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "c" | "level" | "level_stationary" => Ok(HypothesisType::LevelStationary),
            "ct" | "trend" | "trend_stationary" => Ok(HypothesisType::TrendStationary),
            _ => Err(format!("Unknown HypothesisType: {}", s)),
        }
    }
}

/// 自动选择滞后阶数时最小化的信息准则。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InformationCriterion {
    #[default]
    Aic,
    Bic,
}

/// # Summary
/// 已执行的检验类型。
///
/// # Invariants
/// - 单位根检验的原假设为非平稳，KPSS 的原假设为平稳，两者极性相反。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    AugmentedDickeyFuller,
    Kpss { hypothesis: HypothesisType },
    PhillipsPerron,
}

impl TestKind {
    /// 原假设是否为"序列平稳"。
    pub fn null_is_stationary(&self) -> bool {
        matches!(self, TestKind::Kpss { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            TestKind::AugmentedDickeyFuller => "adf",
            TestKind::Kpss { .. } => "kpss",
            TestKind::PhillipsPerron => "pp",
        }
    }
}

/// # Summary
/// 单次平稳性检验的结果记录。
///
/// # Invariants
/// - 每次检验调用生成一次，之后不可变。
/// - `critical_values` 的键为置信水平标签，例如 "1%"、"5%"。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationarityTestResult {
    // 检验类型
    pub test: TestKind,
    // 检验统计量
    pub statistic: f64,
    // p 值
    pub p_value: f64,
    // 实际使用的滞后阶数 (KPSS 为带宽)
    pub lags_used: usize,
    // 回归或统计量实际使用的观测数
    pub nobs: usize,
    // 置信水平标签 -> 临界值
    pub critical_values: BTreeMap<String, f64>,
}

impl StationarityTestResult {
    /// 在给定显著性水平下是否拒绝原假设。
    pub fn rejects_null(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }

    /// # Summary
    /// 仅就本检验而言，结果是否指向平稳。
    ///
    /// # Logic
    /// 单位根检验拒绝原假设即平稳；KPSS 不拒绝原假设即平稳。
    pub fn indicates_stationary(&self, alpha: f64) -> bool {
        if self.test.null_is_stationary() {
            !self.rejects_null(alpha)
        } else {
            self.rejects_null(alpha)
        }
    }
}

/// 非季节差分阶数的判定方法。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifferencingMethod {
    // ADF
    UnitRoot,
    // KPSS
    StationarityNull,
    // Phillips-Perron
    PhillipsPerron,
}

impl DifferencingMethod {
    pub const ALL: [DifferencingMethod; 3] = [
        DifferencingMethod::UnitRoot,
        DifferencingMethod::StationarityNull,
        DifferencingMethod::PhillipsPerron,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DifferencingMethod::UnitRoot => "adf",
            DifferencingMethod::StationarityNull => "kpss",
            DifferencingMethod::PhillipsPerron => "pp",
        }
    }
}

impl FromStr for DifferencingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "adf" | "unit_root" => Ok(DifferencingMethod::UnitRoot),
            "kpss" | "stationarity_null" => Ok(DifferencingMethod::StationarityNull),
            "pp" | "phillips_perron" => Ok(DifferencingMethod::PhillipsPerron),
            _ => Err(format!("Unknown DifferencingMethod: {}", s)),
        }
    }
}

/// 季节差分阶数的判定方法。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalMethod {
    // Osborn-Chui-Smith-Birchenhall
    Ocsb,
    // Canova-Hansen
    CanovaHansen,
}

impl SeasonalMethod {
    pub const ALL: [SeasonalMethod; 2] = [SeasonalMethod::Ocsb, SeasonalMethod::CanovaHansen];

    pub fn label(&self) -> &'static str {
        match self {
            SeasonalMethod::Ocsb => "ocsb",
            SeasonalMethod::CanovaHansen => "ch",
        }
    }
}

impl FromStr for SeasonalMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ocsb" => Ok(SeasonalMethod::Ocsb),
            "ch" | "canova_hansen" => Ok(SeasonalMethod::CanovaHansen),
            _ => Err(format!("Unknown SeasonalMethod: {}", s)),
        }
    }
}

/// # Summary
/// 季节性检验结果。季节检验只有单一临界值，没有可查表的 p 值。
///
/// # Invariants
/// - 两种检验都在 `statistic > critical_value` 时指向需要季节差分。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalTestResult {
    pub test: SeasonalMethod,
    pub statistic: f64,
    pub critical_value: f64,
    pub lags_used: usize,
    pub period: usize,
    pub nobs: usize,
}

impl SeasonalTestResult {
    pub fn needs_seasonal_difference(&self) -> bool {
        self.statistic > self.critical_value
    }
}

/// 差分阶数建议，派生结果，不做持久化。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifferencingRecommendation {
    // 判定方法标签，如 "adf"、"ocsb"
    pub method: String,
    // 建议的差分阶数
    pub order: usize,
    // 季节差分的周期，非季节方法为 None
    pub seasonal_period: Option<usize>,
}

/// # Summary
/// 两个互补检验的结论是否一致。
///
/// # Invariants
/// - 只是描述性标签。`Conflicting` 时不做任何裁决，由人工解读两份结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Agreement {
    Stationary,
    NonStationary,
    Conflicting,
}

impl Agreement {
    pub fn classify(
        unit_root: &StationarityTestResult,
        stationarity_null: &StationarityTestResult,
        alpha: f64,
    ) -> Self {
        match (
            unit_root.indicates_stationary(alpha),
            stationarity_null.indicates_stationary(alpha),
        ) {
            (true, true) => Agreement::Stationary,
            (false, false) => Agreement::NonStationary,
            _ => Agreement::Conflicting,
        }
    }
}

/// 同一序列上单位根检验与平稳性原假设检验的并列结果。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationarityReport {
    pub series: String,
    pub nobs: usize,
    pub significance_level: f64,
    pub unit_root: StationarityTestResult,
    pub stationarity_null: StationarityTestResult,
    pub agreement: Agreement,
}

/// 相关图类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationKind {
    Acf,
    Pacf,
}

/// # Summary
/// ACF/PACF 相关图数据，供绘图层直接使用。
///
/// # Invariants
/// - `values[0]` 对应滞后 0，恒为 1。
/// - `band[k]` 为以 0 为中心的置信带半宽，滞后 0 处为 0。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlogram {
    pub kind: CorrelationKind,
    pub alpha: f64,
    pub values: Vec<f64>,
    pub band: Vec<f64>,
}

impl Correlogram {
    /// 超出置信带的滞后阶 (不含滞后 0)。
    pub fn significant_lags(&self) -> Vec<usize> {
        self.values
            .iter()
            .zip(self.band.iter())
            .enumerate()
            .skip(1)
            .filter(|(_, (v, b))| v.abs() > **b)
            .map(|(lag, _)| lag)
            .collect()
    }
}

/// Ljung-Box 白噪声检验在单个滞后阶上的结果。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LjungBoxResult {
    pub lag: usize,
    pub statistic: f64,
    pub p_value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(test: TestKind, p_value: f64) -> StationarityTestResult {
        StationarityTestResult {
            test,
            statistic: 0.0,
            p_value,
            lags_used: 0,
            nobs: 100,
            critical_values: BTreeMap::new(),
        }
    }

    #[test]
    fn test_polarity_of_interpretation() {
        let adf = result(TestKind::AugmentedDickeyFuller, 0.01);
        assert!(adf.indicates_stationary(0.05));

        let kpss = result(
            TestKind::Kpss {
                hypothesis: HypothesisType::LevelStationary,
            },
            0.01,
        );
        assert!(!kpss.indicates_stationary(0.05));
    }

    #[test]
    fn test_disagreement_is_reported_not_resolved() {
        let adf = result(TestKind::AugmentedDickeyFuller, 0.01);
        let kpss = result(
            TestKind::Kpss {
                hypothesis: HypothesisType::LevelStationary,
            },
            0.01,
        );
        assert_eq!(Agreement::classify(&adf, &kpss, 0.05), Agreement::Conflicting);

        let kpss_ok = result(
            TestKind::Kpss {
                hypothesis: HypothesisType::LevelStationary,
            },
            0.1,
        );
        assert_eq!(Agreement::classify(&adf, &kpss_ok, 0.05), Agreement::Stationary);
    }

    #[test]
    fn test_method_labels_parse() {
        for m in DifferencingMethod::ALL {
            assert_eq!(m.label().parse::<DifferencingMethod>(), Ok(m));
        }
        for m in SeasonalMethod::ALL {
            assert_eq!(m.label().parse::<SeasonalMethod>(), Ok(m));
        }
        assert_eq!("ct".parse::<HypothesisType>(), Ok(HypothesisType::TrendStationary));
    }

    #[test]
    fn test_result_serializes_for_reporting() {
        let adf = result(TestKind::AugmentedDickeyFuller, 0.5);
        let json = serde_json::to_value(&adf).unwrap();
        assert_eq!(json["test"], "augmented_dickey_fuller");
        assert_eq!(json["p_value"], 0.5);
    }

    #[test]
    fn test_significant_lags_skip_lag_zero() {
        let c = Correlogram {
            kind: CorrelationKind::Acf,
            alpha: 0.05,
            values: vec![1.0, 0.5, 0.01, -0.4],
            band: vec![0.0, 0.2, 0.2, 0.2],
        };
        assert_eq!(c.significant_lags(), vec![1, 3]);
    }
}
