use crate::series::entity::TimeSeries;
use crate::stationarity::entity::{
    Agreement, DifferencingMethod, DifferencingRecommendation, HypothesisType, SeasonalMethod,
    SeasonalTestResult, StationarityReport, StationarityTestResult,
};
use crate::stationarity::error::StationarityError;

/// # Summary
/// 平稳性分析器行为契约 (Port)。
///
/// # Invariants
/// - 所有方法都是输入序列上的纯函数，同一序列重复调用结果逐位相同。
/// - 序列中的 `NaN` 在检验前被丢弃；常数序列必须显式报错，不得返回无意义的 p 值。
/// - 两个互补检验结论冲突时不做自动裁决。
pub trait StationarityAnalyzer: Send + Sync {
    /// # Summary
    /// 增广 Dickey-Fuller 单位根检验。
    ///
    /// # Logic
    /// 1. 丢弃缺失值并校验长度与方差。
    /// 2. 按信息准则自动选择滞后阶数 (或使用配置的固定阶数)。
    /// 3. 计算 t 统计量、MacKinnon p 值与临界值。
    ///
    /// # Arguments
    /// * `series`: 待检验序列。
    ///
    /// # Returns
    /// 成功返回检验结果；样本过短返回 `InsufficientData`。
    fn unit_root_test(&self, series: &TimeSeries)
    -> Result<StationarityTestResult, StationarityError>;

    /// # Summary
    /// KPSS 平稳性原假设检验。
    ///
    /// # Arguments
    /// * `series`: 待检验序列。
    /// * `hypothesis`: 围绕常数平稳或围绕趋势平稳。
    ///
    /// # Returns
    /// 成功返回检验结果；样本过短返回 `InsufficientData`。
    fn stationarity_null_test(
        &self,
        series: &TimeSeries,
        hypothesis: HypothesisType,
    ) -> Result<StationarityTestResult, StationarityError>;

    /// Phillips-Perron 单位根检验，原假设与 ADF 相同。
    fn phillips_perron_test(
        &self,
        series: &TimeSeries,
    ) -> Result<StationarityTestResult, StationarityError>;

    /// OCSB 季节单位根检验。
    fn ocsb_test(
        &self,
        series: &TimeSeries,
        period: usize,
    ) -> Result<SeasonalTestResult, StationarityError>;

    /// Canova-Hansen 季节稳定性检验。
    fn canova_hansen_test(
        &self,
        series: &TimeSeries,
        period: usize,
    ) -> Result<SeasonalTestResult, StationarityError>;

    /// # Summary
    /// 建议非季节差分阶数。
    ///
    /// # Logic
    /// 1. 对序列执行所选检验。
    /// 2. 未达到平稳判据时做一次一阶差分并重新检验。
    /// 3. 达到判据或差分次数到达上限时停止。
    ///
    /// # Returns
    /// 满足判据时的差分次数，始终不超过配置的上限。
    fn recommend_differencing_order(
        &self,
        series: &TimeSeries,
        method: DifferencingMethod,
    ) -> Result<usize, StationarityError>;

    /// 建议季节差分阶数，循环结构与非季节版本相同，差分滞后为 `period`。
    fn recommend_seasonal_differencing_order(
        &self,
        series: &TimeSeries,
        period: usize,
        method: SeasonalMethod,
    ) -> Result<usize, StationarityError>;

    /// 当前使用的显著性水平。
    fn significance_level(&self) -> f64;

    /// 默认的 KPSS 原假设形式。
    fn hypothesis_type(&self) -> HypothesisType;

    /// # Summary
    /// 在同一序列上并列执行两个互补检验。
    ///
    /// # Logic
    /// 1. 执行 ADF 与 KPSS。
    /// 2. 给出一致性标签，冲突时原样保留两份结果。
    fn analyze(&self, series: &TimeSeries) -> Result<StationarityReport, StationarityError> {
        let unit_root = self.unit_root_test(series)?;
        let stationarity_null = self.stationarity_null_test(series, self.hypothesis_type())?;
        let alpha = self.significance_level();
        Ok(StationarityReport {
            series: series.name().to_string(),
            nobs: series.drop_missing().len(),
            significance_level: alpha,
            agreement: Agreement::classify(&unit_root, &stationarity_null, alpha),
            unit_root,
            stationarity_null,
        })
    }

    /// 依次执行全部非季节与季节方法，汇总差分阶数建议。
    fn recommend_all(
        &self,
        series: &TimeSeries,
        period: usize,
    ) -> Result<Vec<DifferencingRecommendation>, StationarityError> {
        let mut out = Vec::with_capacity(DifferencingMethod::ALL.len() + SeasonalMethod::ALL.len());
        for method in DifferencingMethod::ALL {
            out.push(DifferencingRecommendation {
                method: method.label().to_string(),
                order: self.recommend_differencing_order(series, method)?,
                seasonal_period: None,
            });
        }
        for method in SeasonalMethod::ALL {
            out.push(DifferencingRecommendation {
                method: method.label().to_string(),
                order: self.recommend_seasonal_differencing_order(series, period, method)?,
                seasonal_period: Some(period),
            });
        }
        Ok(out)
    }
}
