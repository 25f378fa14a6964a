//! Domain models for Hearth

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A household whose ledger is analysed as one unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Family {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Whether a category collects spending or income
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Expense,
    Income,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }
}

impl std::str::FromStr for CategoryKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "expense" | "expenses" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            _ => Err(format!("Unknown category kind: {}", s)),
        }
    }
}

impl std::fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ledger category (Groceries, Rent, Salary, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub family_id: i64,
    pub name: String,
    pub kind: CategoryKind,
    pub created_at: DateTime<Utc>,
}

/// A ledger transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub family_id: i64,
    pub category_id: i64,
    pub date: NaiveDate,
    /// Always positive; direction comes from the category kind
    pub amount: f64,
    pub description: String,
    /// Hash for deduplication
    pub import_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A new transaction to be recorded (before DB insertion)
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub category_id: i64,
    pub date: NaiveDate,
    pub amount: f64,
    pub description: String,
    pub import_hash: String,
}

/// A monthly budget for one category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub family_id: i64,
    pub category_id: i64,
    pub category_name: String,
    pub year: i32,
    pub month: u32,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

impl Budget {
    pub fn period(&self) -> Result<YearMonth> {
        YearMonth::new(self.year, self.month)
    }
}

/// A persisted budget alert produced by the notifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetAlert {
    pub id: i64,
    pub family_id: i64,
    pub budget_id: i64,
    pub category_id: i64,
    pub year: i32,
    pub month: u32,
    pub level: String,
    pub utilization_rate: f64,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Expense total for one category in one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMonthTotal {
    pub category_id: i64,
    pub category_name: String,
    pub year: i32,
    pub month: u32,
    pub amount: f64,
    pub transaction_count: i64,
}

/// Ledger status counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerStats {
    pub families: i64,
    pub categories: i64,
    pub transactions: i64,
    pub budgets: i64,
    pub budget_alerts: i64,
}

/// A calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

/// Years a [`YearMonth`] may carry
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1..=9999;

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !YEAR_RANGE.contains(&year) {
            return Err(Error::Validation(format!(
                "Year must be between {} and {}, got {}",
                YEAR_RANGE.start(),
                YEAR_RANGE.end(),
                year
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(Error::Validation(format!(
                "Month must be between 1 and 12, got {}",
                month
            )));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Shift by a number of months (negative = backwards)
    pub fn add_months(&self, months: i32) -> Self {
        let zero_based = self.year * 12 + (self.month as i32 - 1) + months;
        Self {
            year: zero_based.div_euclid(12),
            month: zero_based.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        // year and month are validated on construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.add_months(1)
            .first_day()
            .pred_opt()
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for YearMonth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (y, m) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| Error::Validation(format!("Invalid month '{}' (use YYYY-MM)", s)))?;
        let year = y
            .parse()
            .map_err(|_| Error::Validation(format!("Invalid year in '{}'", s)))?;
        let month = m
            .parse()
            .map_err(|_| Error::Validation(format!("Invalid month in '{}'", s)))?;
        Self::new(year, month)
    }
}
