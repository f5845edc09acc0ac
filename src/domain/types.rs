//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during training and serving
//! - embedded in the model artifact JSON
//! - reloaded later and validated against the current build

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AppError;

/// A calendar month at `YYYY-MM` granularity.
///
/// This is the join key and time index for the whole pipeline. Ordering is
/// chronological (year, then month), which matches the lexicographic order of
/// the fixed-width `YYYY-MM` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    /// Calendar month number, 1..=12.
    pub fn month(self) -> u32 {
        self.month
    }

    /// The next calendar month.
    pub fn succ(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The previous calendar month.
    pub fn pred(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Same month, `n` years earlier.
    pub fn minus_years(self, n: i32) -> Self {
        Self {
            year: self.year - n,
            month: self.month,
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::InvalidInput(format!("invalid month '{s}' (expected YYYY-MM)"));
        let (y, m) = s.split_once('-').ok_or_else(invalid)?;
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        Month::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Season label derived from the month key.
///
/// One canonical rule for both training and serving: the calendar-quarter
/// mapping in the Southern-hemisphere convention the model was trained under.
/// Dec–Feb is Summer, Mar–May Autumn, Jun–Aug Winter, Sep–Nov Spring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Summer,
    Autumn,
    Winter,
    Spring,
}

/// Tag recorded in the artifact so a retrained model with a different rule
/// fails loudly at load instead of silently mislabeling months.
pub const SEASON_RULE: &str = "calendar-quarter-south";

impl Season {
    pub const ALL: [Season; 4] = [Season::Summer, Season::Autumn, Season::Winter, Season::Spring];

    pub fn for_month(month: Month) -> Self {
        match month.month() {
            12 | 1 | 2 => Season::Summer,
            3..=5 => Season::Autumn,
            6..=8 => Season::Winter,
            _ => Season::Spring,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
            Season::Winter => "Winter",
            Season::Spring => "Spring",
        }
    }
}

/// One month of world daily-average oil production (thousand barrels/day).
///
/// EIA responses are requested sorted descending by period; deduplication is
/// first-occurrence-wins over order of receipt, so the most recent revision
/// of a month is kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductionRecord {
    pub month: Month,
    pub value: f64,
}

/// One month of Brent FOB price (USD/barrel).
///
/// The upstream series is daily, delivered ascending by date. Bucketing to
/// months plus first-occurrence-wins keeps the first trading day of each
/// month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRecord {
    pub month: Month,
    pub price: f64,
}

/// The canonical training row: one per month present in both source series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub month: Month,
    pub production: f64,
    pub price: f64,
    pub season: Season,
}

/// Fixed feature schema expected by the regressor, in column order.
///
/// Winter is the reference category: all three indicators zero.
pub const FEATURE_COLUMNS: [&str; 4] = [
    "production",
    "season_autumn",
    "season_spring",
    "season_summer",
];

/// One-hot feature vector matching `FEATURE_COLUMNS`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub production: f64,
    pub season_autumn: f64,
    pub season_spring: f64,
    pub season_summer: f64,
}

impl FeatureVector {
    pub fn new(production: f64, season: Season) -> Self {
        Self {
            production,
            season_autumn: if season == Season::Autumn { 1.0 } else { 0.0 },
            season_spring: if season == Season::Spring { 1.0 } else { 0.0 },
            season_summer: if season == Season::Summer { 1.0 } else { 0.0 },
        }
    }

    /// The row in fixed column order.
    pub fn row(&self) -> [f64; 4] {
        [
            self.production,
            self.season_autumn,
            self.season_spring,
            self.season_summer,
        ]
    }
}

/// One predicted month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub month: Month,
    pub season: Season,
    pub production: f64,
    pub price: f64,
}

/// Held-out evaluation metrics over the chronological tail.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub r2: f64,
    pub mae: f64,
    pub rmse: f64,
    pub n_train: usize,
    pub n_test: usize,
}

/// The month range the model was fit on (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainWindow {
    pub start: Month,
    pub end: Month,
}

/// Forest hyperparameters (fixed per run, recorded in the artifact).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    pub trees: usize,
    pub seed: u64,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            trees: 100,
            seed: 42,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

/// A full training run's configuration, derived from CLI flags plus defaults.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Trailing window length in years.
    pub window_years: i32,
    /// Fraction of the window held out as the chronological test tail.
    pub test_fraction: f64,
    /// Forward months forecast after training (at mean window production).
    pub horizon: usize,
    /// Optional acceptance gate: abort before persisting if held-out R² is below.
    pub min_r2: Option<f64>,
    pub params: ForestParams,
    pub artifact: PathBuf,
    /// Optional CSV export of the joined training table.
    pub export: Option<PathBuf>,
}

/// Serving-side input bounds, lifted from the reference UI.
pub const SERVE_MONTH_MIN: Month = Month { year: 2025, month: 1 };
pub const SERVE_MONTH_MAX: Month = Month { year: 2027, month: 12 };
pub const SERVE_PRODUCTION_MIN: f64 = 100_000.0;
pub const SERVE_PRODUCTION_MAX: f64 = 200_000.0;
pub const SERVE_PRODUCTION_STEP: f64 = 1_000.0;

/// Forward months shown per serving request (after the selected month).
pub const SERVE_HORIZON: usize = 5;
