use crate::kpss::kpss;
use crate::prepare::{difference, is_constant, observations};
use crate::seasonal::{canova_hansen, ocsb};
use crate::unit_root::{adf, phillips_perron};
use tracing::debug;
use tsa_core::config::AnalysisConfig;
use tsa_core::series::entity::TimeSeries;
use tsa_core::stationarity::entity::{
    DifferencingMethod, HypothesisType, SeasonalMethod, SeasonalTestResult, StationarityTestResult,
};
use tsa_core::stationarity::error::StationarityError;
use tsa_core::stationarity::port::StationarityAnalyzer;

/// # Summary
/// 基于显式配置的平稳性分析器。
///
/// # Invariants
/// - 只持有不可变配置，可在线程间共享。
/// - 配置在构造时校验，之后的调用不再检查。
#[derive(Debug, Clone, Default)]
pub struct DefaultAnalyzer {
    config: AnalysisConfig,
}

impl DefaultAnalyzer {
    /// # Summary
    /// 以给定配置创建分析器。
    ///
    /// # Returns
    /// 配置非法时返回 `InvalidConfig`。
    pub fn new(config: AnalysisConfig) -> Result<Self, StationarityError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    fn run_test(
        &self,
        x: &[f64],
        method: DifferencingMethod,
    ) -> Result<StationarityTestResult, StationarityError> {
        match method {
            DifferencingMethod::UnitRoot => {
                adf(x, self.config.n_lags, self.config.information_criterion)
            }
            DifferencingMethod::StationarityNull => {
                kpss(x, self.config.hypothesis_type, self.config.n_lags)
            }
            DifferencingMethod::PhillipsPerron => phillips_perron(x),
        }
    }

    fn run_seasonal_test(
        &self,
        x: &[f64],
        period: usize,
        method: SeasonalMethod,
    ) -> Result<SeasonalTestResult, StationarityError> {
        match method {
            SeasonalMethod::Ocsb => ocsb(
                x,
                period,
                self.config.ocsb_max_lag,
                self.config.information_criterion,
            ),
            SeasonalMethod::CanovaHansen => canova_hansen(x, period),
        }
    }
}

fn ensure_period(period: usize) -> Result<(), StationarityError> {
    if period < 2 {
        return Err(StationarityError::InvalidConfig(format!(
            "seasonal period must be at least 2, got {}",
            period
        )));
    }
    Ok(())
}

/// # Summary
/// 反复差分直到判据满足或到达上限。
///
/// # Logic
/// 1. 对原序列执行检验，错误直接返回。
/// 2. 判据未满足且未到上限时，差分一次并重新检验。
/// 3. 差分后变成常数说明已完全去除结构，返回当前阶数。
/// 4. 后续迭代样本不足时停止，返回最后一个实际检验过的阶数 `d - 1`。
///
/// `needs_more` 根据检验结果判断是否还需要继续差分。
fn iterate_differencing<R, T, N>(
    x: Vec<f64>,
    lag: usize,
    cap: usize,
    label: &str,
    mut test: T,
    needs_more: N,
) -> Result<usize, StationarityError>
where
    T: FnMut(&[f64]) -> Result<R, StationarityError>,
    N: Fn(&R) -> bool,
{
    let mut current = x;
    let mut dodiff = needs_more(&test(&current)?);
    let mut d = 0;
    while dodiff && d < cap {
        d += 1;
        current = difference(&current, lag);
        if is_constant(&current) {
            debug!("{}: series constant after {} differences", label, d);
            return Ok(d);
        }
        match test(&current) {
            Ok(result) => dodiff = needs_more(&result),
            Err(StationarityError::InsufficientData { required, got }) => {
                // 第 d 阶无法检验，退回最后一个检验过的阶数
                debug!(
                    "{}: order {} cannot be tested, {} observations left but {} required",
                    label, d, got, required
                );
                return Ok(d - 1);
            }
            Err(e) => return Err(e),
        }
        debug!("{}: order {} needs more differencing: {}", label, d, dodiff);
    }
    Ok(d)
}

impl StationarityAnalyzer for DefaultAnalyzer {
    fn unit_root_test(
        &self,
        series: &TimeSeries,
    ) -> Result<StationarityTestResult, StationarityError> {
        let x = observations(series)?;
        self.run_test(&x, DifferencingMethod::UnitRoot)
    }

    fn stationarity_null_test(
        &self,
        series: &TimeSeries,
        hypothesis: HypothesisType,
    ) -> Result<StationarityTestResult, StationarityError> {
        let x = observations(series)?;
        kpss(&x, hypothesis, self.config.n_lags)
    }

    fn phillips_perron_test(
        &self,
        series: &TimeSeries,
    ) -> Result<StationarityTestResult, StationarityError> {
        let x = observations(series)?;
        self.run_test(&x, DifferencingMethod::PhillipsPerron)
    }

    fn ocsb_test(
        &self,
        series: &TimeSeries,
        period: usize,
    ) -> Result<SeasonalTestResult, StationarityError> {
        ensure_period(period)?;
        let x = observations(series)?;
        self.run_seasonal_test(&x, period, SeasonalMethod::Ocsb)
    }

    fn canova_hansen_test(
        &self,
        series: &TimeSeries,
        period: usize,
    ) -> Result<SeasonalTestResult, StationarityError> {
        ensure_period(period)?;
        let x = observations(series)?;
        self.run_seasonal_test(&x, period, SeasonalMethod::CanovaHansen)
    }

    fn recommend_differencing_order(
        &self,
        series: &TimeSeries,
        method: DifferencingMethod,
    ) -> Result<usize, StationarityError> {
        let x = observations(series)?;
        let alpha = self.config.significance_level;
        let d = iterate_differencing(
            x,
            1,
            self.config.max_differences,
            method.label(),
            |v| self.run_test(v, method),
            |r: &StationarityTestResult| !r.indicates_stationary(alpha),
        )?;
        debug!(
            "{} recommends {} differences for {}",
            method.label(),
            d,
            series.name()
        );
        Ok(d)
    }

    fn recommend_seasonal_differencing_order(
        &self,
        series: &TimeSeries,
        period: usize,
        method: SeasonalMethod,
    ) -> Result<usize, StationarityError> {
        ensure_period(period)?;
        let x = observations(series)?;
        let d = iterate_differencing(
            x,
            period,
            self.config.max_seasonal_differences,
            method.label(),
            |v| self.run_seasonal_test(v, period, method),
            SeasonalTestResult::needs_seasonal_difference,
        )?;
        debug!(
            "{} recommends {} seasonal differences at period {} for {}",
            method.label(),
            d,
            period,
            series.name()
        );
        Ok(d)
    }

    fn significance_level(&self) -> f64 {
        self.config.significance_level
    }

    fn hypothesis_type(&self) -> HypothesisType {
        self.config.hypothesis_type
    }
}
