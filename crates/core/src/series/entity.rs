use crate::common::TimeFrame;
use crate::common::num::to_f64;
use crate::market::entity::{Candle, PriceField};
use crate::series::error::SeriesError;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

/// # Summary
/// 按日期索引的实数时间序列。
///
/// # Invariants
/// - 时间戳严格升序，不存在重复。
/// - 缺失值以 `NaN` 表示，通常出现在差分或滚动运算产生的边缘。
/// - 构造后不可变，所有变换都返回新的序列。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    // 序列名称，供报表与绘图层标注
    name: String,
    // 时间索引
    index: Vec<DateTime<Utc>>,
    // 观测值
    values: Vec<f64>,
}

impl TimeSeries {
    /// # Summary
    /// 校验并创建时间序列。
    ///
    /// # Logic
    /// 1. 检查索引与观测值长度一致。
    /// 2. 逐个检查时间戳严格递增，区分重复与逆序两种错误。
    ///
    /// # Arguments
    /// * `name`: 序列名称。
    /// * `index`: 时间索引。
    /// * `values`: 观测值。
    ///
    /// # Returns
    /// 成功返回序列，失败返回 SeriesError。
    pub fn new(
        name: impl Into<String>,
        index: Vec<DateTime<Utc>>,
        values: Vec<f64>,
    ) -> Result<Self, SeriesError> {
        if index.len() != values.len() {
            return Err(SeriesError::LengthMismatch {
                index: index.len(),
                values: values.len(),
            });
        }
        for (pos, pair) in index.windows(2).enumerate() {
            if pair[1] == pair[0] {
                return Err(SeriesError::DuplicateTimestamp(pos + 1));
            }
            if pair[1] < pair[0] {
                return Err(SeriesError::NotAscending(pos + 1));
            }
        }
        Ok(Self {
            name: name.into(),
            index,
            values,
        })
    }

    /// # Summary
    /// 从 K 线列表构建价格序列。
    ///
    /// # Logic
    /// 1. 按 `field` 提取每根 K 线的价格。
    /// 2. 复用 `new` 的顺序校验，未排序的 K 线会被拒绝。
    pub fn from_candles(
        name: impl Into<String>,
        candles: &[Candle],
        field: PriceField,
    ) -> Result<Self, SeriesError> {
        let index = candles.iter().map(|c| c.time).collect();
        let values = candles.iter().map(|c| c.price(field)).collect();
        Self::new(name, index, values)
    }

    /// 不做校验的内部构造，调用方保证索引仍然有序。
    fn derived(&self, suffix: &str, index: Vec<DateTime<Utc>>, values: Vec<f64>) -> Self {
        Self {
            name: format!("{}{}", self.name, suffix),
            index,
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 返回重命名后的副本。
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn index(&self) -> &[DateTime<Utc>] {
        &self.index
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DateTime<Utc>, &f64)> {
        self.index.iter().zip(self.values.iter())
    }

    /// 去掉全部 `NaN` 观测。
    pub fn drop_missing(&self) -> Self {
        let (index, values) = self
            .iter()
            .filter(|(_, v)| !v.is_nan())
            .map(|(t, v)| (*t, *v))
            .unzip();
        self.derived("", index, values)
    }

    /// 自然对数变换，非正数映射为 `NaN`。
    pub fn ln(&self) -> Self {
        let values = self
            .values
            .iter()
            .map(|v| if *v > 0.0 { v.ln() } else { f64::NAN })
            .collect();
        self.derived("_log", self.index.clone(), values)
    }

    /// # Summary
    /// 按滞后 `lag` 做差分，保留原索引。
    ///
    /// # Logic
    /// 前 `lag` 个位置没有可用的历史值，填充 `NaN`。
    pub fn diff(&self, lag: usize) -> Result<Self, SeriesError> {
        if lag == 0 {
            return Err(SeriesError::InvalidLag(lag));
        }
        let values = (0..self.len())
            .map(|i| {
                if i < lag {
                    f64::NAN
                } else {
                    self.values[i] - self.values[i - lag]
                }
            })
            .collect();
        Ok(self.derived("_diff", self.index.clone(), values))
    }

    /// 尾随窗口均值，窗口未满或含缺失值时为 `NaN`。
    pub fn rolling_mean(&self, window: usize) -> Result<Self, SeriesError> {
        let values = self.rolling(window, |w| w.iter().sum::<f64>() / to_f64(w.len()))?;
        Ok(self.derived("_rolling_mean", self.index.clone(), values))
    }

    /// 尾随窗口样本标准差 (自由度 n - 1)。
    pub fn rolling_std(&self, window: usize) -> Result<Self, SeriesError> {
        let values = self.rolling(window, |w| {
            if w.len() < 2 {
                return f64::NAN;
            }
            let mean = w.iter().sum::<f64>() / to_f64(w.len());
            let ss: f64 = w.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / to_f64(w.len() - 1)).sqrt()
        })?;
        Ok(self.derived("_rolling_std", self.index.clone(), values))
    }

    fn rolling<F>(&self, window: usize, f: F) -> Result<Vec<f64>, SeriesError>
    where
        F: Fn(&[f64]) -> f64,
    {
        if window == 0 {
            return Err(SeriesError::InvalidWindow(window));
        }
        Ok((0..self.len())
            .map(|i| {
                if i + 1 < window {
                    return f64::NAN;
                }
                let w = &self.values[i + 1 - window..=i];
                if w.iter().any(|v| v.is_nan()) {
                    f64::NAN
                } else {
                    f(w)
                }
            })
            .collect())
    }

    /// # Summary
    /// 按日历周期重采样，取每个桶内最后一个有效观测。
    ///
    /// # Logic
    /// 1. 计算每个观测所属桶的结束日。
    /// 2. 由于索引有序，同一个桶的观测是连续的，顺序扫描即可。
    /// 3. 桶内没有有效值时跳过该桶。
    /// 4. 新索引为桶结束日 00:00 UTC。
    pub fn resample(&self, frame: TimeFrame) -> Self {
        let mut index = Vec::new();
        let mut values = Vec::new();
        let mut current: Option<(NaiveDate, Option<f64>)> = None;

        for (t, v) in self.iter() {
            let Some(end) = frame.bucket_end(t.date_naive()) else {
                continue;
            };
            match current {
                Some((bucket, ref mut last)) if bucket == end => {
                    if v.is_finite() {
                        *last = Some(*v);
                    }
                }
                _ => {
                    if let Some((bucket, Some(last))) = current {
                        push_bucket(&mut index, &mut values, bucket, last);
                    }
                    current = Some((end, v.is_finite().then_some(*v)));
                }
            }
        }
        if let Some((bucket, Some(last))) = current {
            push_bucket(&mut index, &mut values, bucket, last);
        }
        self.derived("", index, values)
    }

    /// 按日期闭区间切片。
    pub fn between(&self, from: NaiveDate, to: NaiveDate) -> Self {
        let (index, values) = self
            .iter()
            .filter(|(t, _)| {
                let d = t.date_naive();
                d >= from && d <= to
            })
            .map(|(t, v)| (*t, *v))
            .unzip();
        self.derived("", index, values)
    }

    /// # Summary
    /// 以日历年为界切分训练集与测试集。
    ///
    /// # Returns
    /// `(早于 year 的部分, year 及之后的部分)`。
    pub fn split_at_year(&self, year: i32) -> (Self, Self) {
        let cut = self.index.partition_point(|t| t.year() < year);
        (
            self.derived("_train", self.index[..cut].to_vec(), self.values[..cut].to_vec()),
            self.derived("_test", self.index[cut..].to_vec(), self.values[cut..].to_vec()),
        )
    }
}

fn push_bucket(index: &mut Vec<DateTime<Utc>>, values: &mut Vec<f64>, bucket: NaiveDate, last: f64) {
    if let Some(t) = bucket.and_hms_opt(0, 0, 0) {
        index.push(t.and_utc());
        values.push(last);
    }
}
