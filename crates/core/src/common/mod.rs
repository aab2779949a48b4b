use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub mod num;

/// # Summary
/// 证券标的实体，代表待分析的特定股票或资产。
///
/// # Invariants
/// - `symbol` 必须是合法的交易代码。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stock {
    // 股票代码 (例如: GOOG, 005380)
    pub symbol: String,
    // 交易所代码 (可选，例如: NASDAQ, KS)
    pub exchange: Option<String>,
}

impl Stock {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            exchange: None,
        }
    }
}

/// # Summary
/// 重采样周期枚举，定义日历分桶的跨度。
///
/// # Invariants
/// - 周线以周日为桶的结束日，月线以当月最后一天为结束日。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TimeFrame {
    // 1日
    Day1,
    // 1周
    Week1,
    // 1月
    Month1,
}

impl TimeFrame {
    /// # Summary
    /// 计算给定日期所在日历桶的结束日。
    ///
    /// # Logic
    /// 1. 日线: 日期本身。
    /// 2. 周线: 向后推到最近的周日 (含当天)。
    /// 3. 月线: 下月第一天的前一天。
    ///
    /// # Arguments
    /// * `date`: 观测日期。
    ///
    /// # Returns
    /// 桶结束日；日期溢出时返回 None。
    pub fn bucket_end(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            TimeFrame::Day1 => Some(date),
            TimeFrame::Week1 => {
                let to_sunday = 6 - i64::from(date.weekday().num_days_from_monday());
                date.checked_add_signed(Duration::days(to_sunday))
            }
            TimeFrame::Month1 => {
                let (year, month) = if date.month() == 12 {
                    (date.year() + 1, 1)
                } else {
                    (date.year(), date.month() + 1)
                };
                NaiveDate::from_ymd_opt(year, month, 1).and_then(|d| d.pred_opt())
            }
        }
    }
}

impl FromStr for TimeFrame {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "d" | "1d" | "day1" => Ok(TimeFrame::Day1),
            "w" | "1w" | "week1" => Ok(TimeFrame::Week1),
            "m" | "1mo" | "month1" => Ok(TimeFrame::Month1),
            _ => Err(format!("Unknown TimeFrame: {}", s)),
        }
    }
}

impl std::fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeFrame::Day1 => write!(f, "1d"),
            TimeFrame::Week1 => write!(f, "1w"),
            TimeFrame::Month1 => write!(f, "1mo"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_end_bucket() {
        assert_eq!(
            TimeFrame::Month1.bucket_end(date(2020, 2, 3)),
            Some(date(2020, 2, 29))
        );
        assert_eq!(
            TimeFrame::Month1.bucket_end(date(2021, 12, 31)),
            Some(date(2021, 12, 31))
        );
    }

    #[test]
    fn test_week_end_bucket_is_sunday() {
        // 2021-03-03 是周三
        assert_eq!(
            TimeFrame::Week1.bucket_end(date(2021, 3, 3)),
            Some(date(2021, 3, 7))
        );
        assert_eq!(
            TimeFrame::Week1.bucket_end(date(2021, 3, 7)),
            Some(date(2021, 3, 7))
        );
    }

    #[test]
    fn test_timeframe_parse_roundtrip() {
        for tf in [TimeFrame::Day1, TimeFrame::Week1, TimeFrame::Month1] {
            assert_eq!(tf.to_string().parse::<TimeFrame>(), Ok(tf));
        }
        assert!("2h".parse::<TimeFrame>().is_err());
    }
}
