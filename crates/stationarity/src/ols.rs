use nalgebra::{DMatrix, DVector};
use std::f64::consts::PI;
use tsa_core::common::num::to_f64;
use tsa_core::stationarity::entity::InformationCriterion;
use tsa_core::stationarity::error::StationarityError;

const COLLINEARITY_TOL: f64 = 1e-12;

/// # Summary
/// 普通最小二乘拟合结果。
///
/// # Invariants
/// - `nobs > k`，即残差自由度至少为 1。
/// - 设计矩阵满秩，否则构造失败。
#[derive(Debug, Clone)]
pub(crate) struct OlsFit {
    // 回归系数
    pub params: DVector<f64>,
    // 系数标准误
    pub std_errors: DVector<f64>,
    // 残差
    pub resid: DVector<f64>,
    // 残差平方和
    pub ssr: f64,
    pub nobs: usize,
    // 回归元个数 (含常数项)
    pub k: usize,
}

impl OlsFit {
    /// # Summary
    /// 按行构造设计矩阵并拟合。
    ///
    /// # Logic
    /// 1. 检查残差自由度。
    /// 2. 通过 Cholesky 分解求 (X'X)^-1，失败说明设计矩阵奇异。
    /// 3. 计算系数、残差、同方差标准误。
    ///
    /// # Arguments
    /// * `y`: 被解释变量。
    /// * `rows`: 每行一个观测的回归元。
    ///
    /// # Returns
    /// 成功返回拟合结果；自由度不足返回 `InsufficientData`，奇异返回 `NumericDegeneracy`。
    pub fn fit(y: &[f64], rows: &[Vec<f64>]) -> Result<Self, StationarityError> {
        let nobs = y.len();
        let k = rows.first().map_or(0, Vec::len);
        if nobs != rows.len() || k == 0 || rows.iter().any(|r| r.len() != k) {
            return Err(StationarityError::NumericDegeneracy(format!(
                "malformed design matrix: {} targets, {} rows, {} columns",
                nobs,
                rows.len(),
                k
            )));
        }
        if nobs <= k {
            return Err(StationarityError::InsufficientData {
                required: k + 1,
                got: nobs,
            });
        }

        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let x = DMatrix::from_row_slice(nobs, k, &flat);
        let y = DVector::from_column_slice(y);

        let singular =
            || StationarityError::NumericDegeneracy("singular regression design".to_string());
        let xt = x.transpose();
        let xtx = &xt * &x;
        let chol = xtx.clone().cholesky().ok_or_else(singular)?;
        // L_ii^2 / (X'X)_ii 为第 i 列无法被前面各列解释的比例，与列的量纲无关
        let l = chol.l();
        let collinear = (0..k).any(|i| {
            let d = xtx[(i, i)];
            d <= 0.0 || l[(i, i)].powi(2) / d < COLLINEARITY_TOL
        });
        if collinear {
            return Err(singular());
        }
        let xtx_inv = chol.inverse();
        let params = &xtx_inv * (&xt * &y);
        let resid = &y - &x * &params;
        let ssr = resid.dot(&resid);
        let sigma2 = ssr / to_f64(nobs - k);
        let std_errors = DVector::from_iterator(k, (0..k).map(|i| (sigma2 * xtx_inv[(i, i)]).sqrt()));

        Ok(Self {
            params,
            std_errors,
            resid,
            ssr,
            nobs,
            k,
        })
    }

    /// 第 `i` 个系数的 t 值。
    pub fn t_value(&self, i: usize) -> f64 {
        self.params[i] / self.std_errors[i]
    }

    /// 高斯对数似然。
    pub fn llf(&self) -> f64 {
        let n = to_f64(self.nobs);
        -n / 2.0 * ((2.0 * PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    pub fn aic(&self) -> f64 {
        -2.0 * self.llf() + 2.0 * to_f64(self.k)
    }

    pub fn bic(&self) -> f64 {
        -2.0 * self.llf() + to_f64(self.k) * to_f64(self.nobs).ln()
    }

    pub fn information_criterion(&self, ic: InformationCriterion) -> f64 {
        match ic {
            InformationCriterion::Aic => self.aic(),
            InformationCriterion::Bic => self.bic(),
        }
    }

    pub fn residuals(&self) -> Vec<f64> {
        self.resid.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovers_exact_line() {
        // y = 2 + 3x 加上对称扰动
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let noise = [0.1, -0.1, 0.0, 0.1, -0.1];
        let y: Vec<f64> = xs.iter().zip(noise).map(|(x, e)| 2.0 + 3.0 * x + e).collect();
        let rows: Vec<Vec<f64>> = xs.iter().map(|x| vec![1.0, *x]).collect();

        let fit = OlsFit::fit(&y, &rows).unwrap();
        assert!((fit.params[1] - 3.0).abs() < 0.05);
        assert!((fit.params[0] - 2.0).abs() < 0.1);
        assert!(fit.t_value(1) > 10.0);
        assert_eq!(fit.nobs, 5);
        // ln(5) < 2，小样本下 BIC 的惩罚更轻
        assert!(fit.bic() < fit.aic());
    }

    #[test]
    fn test_singular_design_is_degenerate() {
        let rows: Vec<Vec<f64>> = (0..5).map(|i| vec![1.0, 2.0, f64::from(i)]).collect();
        let y = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let err = OlsFit::fit(&y, &rows).unwrap_err();
        assert!(matches!(err, StationarityError::NumericDegeneracy(_)));
    }

    #[test]
    fn test_needs_residual_degrees_of_freedom() {
        let rows = vec![vec![1.0, 0.0], vec![1.0, 1.0]];
        let err = OlsFit::fit(&[1.0, 2.0], &rows).unwrap_err();
        assert_eq!(
            err,
            StationarityError::InsufficientData {
                required: 3,
                got: 2
            }
        );
    }
}
