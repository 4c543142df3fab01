use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

use crate::errors::ConfigError;

/// Number of monthly periods in a reporting window
pub const PERIODS: usize = 6;

/// Periods counted as "before cutoff" (months 1-3 of the window)
pub const BEFORE_CUTOFF: Range<usize> = 0..3;

/// Periods counted as "after cutoff" (months 4-6 of the window)
pub const AFTER_CUTOFF: Range<usize> = 3..6;

const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Six consecutive calendar months of sales history.
///
/// The window is identified by its first month. Column labels follow the
/// spreadsheet export convention, e.g. `"Apr, 2025"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SalesWindow {
    /// First calendar month of the window (1 = January).
    pub start_month: u32,
    pub year: i32,
}

impl SalesWindow {
    pub fn new(start_month: u32, year: i32) -> Result<Self, ConfigError> {
        let window = Self { start_month, year };
        window.validate()?;
        Ok(window)
    }

    /// The window must sit inside one calendar year so that the cutoff can be
    /// compared against a bare month number.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=12).contains(&self.start_month) {
            return Err(ConfigError::InvalidWindow {
                message: format!("start month {} is not a calendar month", self.start_month),
            });
        }
        if self.start_month + PERIODS as u32 - 1 > 12 {
            return Err(ConfigError::InvalidWindow {
                message: format!(
                    "window starting at {} crosses into the next year",
                    self.label(0)
                ),
            });
        }
        Ok(())
    }

    /// Calendar month of the given period index.
    pub fn month(&self, period: usize) -> u32 {
        self.start_month + period as u32
    }

    /// Calendar month of the first after-cutoff period.
    pub fn cutoff_month(&self) -> u32 {
        self.month(AFTER_CUTOFF.start)
    }

    /// Column label of a period, e.g. `"Jul, 2025"`.
    pub fn label(&self, period: usize) -> String {
        let idx = (self.month(period) as usize).saturating_sub(1) % 12;
        format!("{}, {}", MONTH_ABBR[idx], self.year)
    }

    pub fn labels(&self) -> Vec<String> {
        (0..PERIODS).map(|p| self.label(p)).collect()
    }
}

impl Default for SalesWindow {
    fn default() -> Self {
        Self {
            start_month: 4,
            year: 2025,
        }
    }
}

impl fmt::Display for SalesWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.label(0), self.label(PERIODS - 1))
    }
}
