//! Trailing monthly history per category

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::types::{MonthIndex, WINDOW_LEN};
use crate::error::{Error, Result};
use crate::models::{CategoryMonthTotal, YearMonth};

/// Spending for one calendar month of the window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlySample {
    pub month_index: MonthIndex,
    pub period: YearMonth,
    pub amount: f64,
    pub transaction_count: u32,
}

/// Exactly twelve contiguous monthly samples, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailingSeries {
    samples: Vec<MonthlySample>,
}

impl TrailingSeries {
    pub fn new(samples: Vec<MonthlySample>) -> Result<Self> {
        if samples.len() != WINDOW_LEN {
            return Err(Error::Validation(format!(
                "Trailing series needs {} samples, got {}",
                WINDOW_LEN,
                samples.len()
            )));
        }

        let start = samples[0].period;
        for (i, sample) in samples.iter().enumerate() {
            if sample.month_index.get() != i || sample.period != start.add_months(i as i32) {
                return Err(Error::Validation(format!(
                    "Sample {} ({}) is out of order",
                    i, sample.period
                )));
            }
            if !sample.amount.is_finite() || sample.amount < 0.0 {
                return Err(Error::Validation(format!(
                    "Sample {} has invalid amount {}",
                    sample.period, sample.amount
                )));
            }
        }

        Ok(Self { samples })
    }

    /// Build a series ending at `end` from plain amounts
    pub fn from_amounts(end: YearMonth, amounts: &[f64]) -> Result<Self> {
        if amounts.len() != WINDOW_LEN {
            return Err(Error::Validation(format!(
                "Trailing series needs {} samples, got {}",
                WINDOW_LEN,
                amounts.len()
            )));
        }

        let start = end.add_months(-(WINDOW_LEN as i32 - 1));
        let samples = MonthIndex::all()
            .zip(amounts)
            .map(|(idx, &amount)| MonthlySample {
                month_index: idx,
                period: start.add_months(idx.get() as i32),
                amount,
                transaction_count: u32::from(amount > 0.0),
            })
            .collect();

        Self::new(samples)
    }

    pub fn samples(&self) -> &[MonthlySample] {
        &self.samples
    }

    pub fn amounts(&self) -> [f64; WINDOW_LEN] {
        let mut out = [0.0; WINDOW_LEN];
        for (slot, sample) in out.iter_mut().zip(&self.samples) {
            *slot = sample.amount;
        }
        out
    }

    pub fn start(&self) -> YearMonth {
        self.samples[0].period
    }

    pub fn end(&self) -> YearMonth {
        self.samples[WINDOW_LEN - 1].period
    }

    /// True when every month is zero
    pub fn is_empty(&self) -> bool {
        self.samples.iter().all(|s| s.amount == 0.0)
    }

    pub fn total_transactions(&self) -> u32 {
        self.samples.iter().map(|s| s.transaction_count).sum()
    }

    /// Window slot that falls in the given calendar month (1..=12)
    pub fn slot_for_month(&self, month: u32) -> Option<MonthIndex> {
        self.samples
            .iter()
            .find(|s| s.period.month == month)
            .map(|s| s.month_index)
    }
}

/// Builds trailing windows from grouped ledger totals
pub struct HistorySampler;

impl HistorySampler {
    /// First and last month of the window ending at `as_of`
    pub fn window(as_of: YearMonth) -> (YearMonth, YearMonth) {
        (as_of.add_months(-(WINDOW_LEN as i32 - 1)), as_of)
    }

    /// Inclusive date range covered by the window ending at `as_of`
    pub fn date_range(as_of: YearMonth) -> (NaiveDate, NaiveDate) {
        let (start, end) = Self::window(as_of);
        (start.first_day(), end.last_day())
    }

    /// Zero-filled series for one category
    ///
    /// Totals for other categories or outside the window are ignored.
    pub fn sample(category_id: i64, totals: &[CategoryMonthTotal], as_of: YearMonth) -> TrailingSeries {
        let (start, _) = Self::window(as_of);

        let mut samples: Vec<MonthlySample> = MonthIndex::all()
            .map(|idx| MonthlySample {
                month_index: idx,
                period: start.add_months(idx.get() as i32),
                amount: 0.0,
                transaction_count: 0,
            })
            .collect();

        for total in totals.iter().filter(|t| t.category_id == category_id) {
            let Ok(period) = YearMonth::new(total.year, total.month) else {
                continue;
            };
            if let Some(sample) = samples.iter_mut().find(|s| s.period == period) {
                sample.amount += total.amount.max(0.0);
                sample.transaction_count += total.transaction_count.max(0) as u32;
            }
        }

        TrailingSeries { samples }
    }

    /// Series for every category present in `totals`
    pub fn sample_all(
        totals: &[CategoryMonthTotal],
        as_of: YearMonth,
    ) -> BTreeMap<i64, TrailingSeries> {
        let mut ids: Vec<i64> = totals.iter().map(|t| t.category_id).collect();
        ids.sort_unstable();
        ids.dedup();

        ids.into_iter()
            .map(|id| (id, Self::sample(id, totals, as_of)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(category_id: i64, year: i32, month: u32, amount: f64) -> CategoryMonthTotal {
        CategoryMonthTotal {
            category_id,
            category_name: format!("cat{}", category_id),
            year,
            month,
            amount,
            transaction_count: 2,
        }
    }

    #[test]
    fn test_window_spans_twelve_months() {
        let as_of = YearMonth::new(2024, 3).unwrap();
        let (start, end) = HistorySampler::window(as_of);
        assert_eq!(start, YearMonth::new(2023, 4).unwrap());
        assert_eq!(end, as_of);

        let (from, to) = HistorySampler::date_range(as_of);
        assert_eq!(from, NaiveDate::from_ymd_opt(2023, 4, 1).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
    }

    #[test]
    fn test_sample_zero_fills_and_orders() {
        let as_of = YearMonth::new(2024, 6).unwrap();
        let totals = vec![
            total(1, 2024, 6, 300.0),
            total(1, 2023, 7, 100.0),
            total(2, 2024, 6, 999.0),
            total(1, 2022, 1, 555.0), // outside the window
        ];

        let series = HistorySampler::sample(1, &totals, as_of);
        let amounts = series.amounts();

        assert_eq!(series.samples().len(), 12);
        assert_eq!(series.start(), YearMonth::new(2023, 7).unwrap());
        assert_eq!(amounts[0], 100.0);
        assert_eq!(amounts[11], 300.0);
        assert_eq!(amounts.iter().sum::<f64>(), 400.0);
        assert_eq!(series.total_transactions(), 4);
    }

    #[test]
    fn test_all_zero_series_is_empty() {
        let as_of = YearMonth::new(2024, 6).unwrap();
        let series = HistorySampler::sample(42, &[], as_of);
        assert!(series.is_empty());
        assert_eq!(series.samples().len(), 12);
    }

    #[test]
    fn test_sample_all_groups_by_category() {
        let as_of = YearMonth::new(2024, 1).unwrap();
        let totals = vec![total(3, 2024, 1, 10.0), total(1, 2023, 12, 20.0)];
        let all = HistorySampler::sample_all(&totals, as_of);
        assert_eq!(all.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(all[&1].amounts()[10], 20.0);
    }

    #[test]
    fn test_series_rejects_wrong_length() {
        let end = YearMonth::new(2024, 1).unwrap();
        let err = TrailingSeries::from_amounts(end, &[1.0; 11]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(TrailingSeries::from_amounts(end, &[1.0; 13]).is_err());
    }

    #[test]
    fn test_series_rejects_gaps() {
        let end = YearMonth::new(2024, 1).unwrap();
        let mut samples = TrailingSeries::from_amounts(end, &[1.0; 12])
            .unwrap()
            .samples()
            .to_vec();
        samples[5].period = samples[5].period.add_months(1);
        assert!(TrailingSeries::new(samples).is_err());
    }

    #[test]
    fn test_slot_for_month() {
        let end = YearMonth::new(2024, 3).unwrap();
        let series = TrailingSeries::from_amounts(end, &[1.0; 12]).unwrap();
        // window is 2023-04 ..= 2024-03, so April sits in the oldest slot
        assert_eq!(series.slot_for_month(4).unwrap().get(), 0);
        assert_eq!(series.slot_for_month(3).unwrap().get(), 11);
    }
}
