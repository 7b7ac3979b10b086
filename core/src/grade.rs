//! Gem grades and denomination arithmetic

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Currency conversion errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyError {
    #[error("invalid value: {0}")]
    InvalidValue(i64),

    #[error("overflow converting {amount} gems at grade {grade:?}")]
    Overflow { grade: Grade, amount: u64 },
}

/// The four gem denominations, lowest to highest.
///
/// Each grade exchanges at 100x the grade below it. Keep the variants in
/// rate order: comparisons, balance display, and the decomposition in
/// [`GemStack::from_base_value`] all rely on it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Grade {
    Low,
    Medium,
    High,
    Supreme,
}

impl Grade {
    /// All grades, lowest first.
    pub const ALL: [Grade; 4] = [Grade::Low, Grade::Medium, Grade::High, Grade::Supreme];

    /// Base units per single gem of this grade.
    pub fn rate(self) -> u64 {
        match self {
            Grade::Low => 1,
            Grade::Medium => 100,
            Grade::High => 10_000,
            Grade::Supreme => 1_000_000,
        }
    }

    /// Human-readable denomination name.
    pub fn label(self) -> &'static str {
        match self {
            Grade::Low => "low gem",
            Grade::Medium => "medium gem",
            Grade::High => "high gem",
            Grade::Supreme => "supreme gem",
        }
    }

    /// Chat color tag for this denomination.
    pub fn color_hex(self) -> &'static str {
        match self {
            Grade::Low => "00FF00",
            Grade::Medium => "0099FF",
            Grade::High => "CC00FF",
            Grade::Supreme => "FFD700",
        }
    }

    /// One-letter abbreviation for compact balance lines.
    pub fn abbrev(self) -> &'static str {
        match self {
            Grade::Low => "L",
            Grade::Medium => "M",
            Grade::High => "H",
            Grade::Supreme => "S",
        }
    }
}

/// A quantity of gems at a single grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GemStack {
    pub grade: Grade,
    pub amount: u64,
}

impl GemStack {
    pub fn new(grade: Grade, amount: u64) -> Self {
        Self { grade, amount }
    }

    /// Convert to the canonical base value.
    pub fn to_base_value(self) -> Result<u64, CurrencyError> {
        self.amount
            .checked_mul(self.grade.rate())
            .ok_or(CurrencyError::Overflow {
                grade: self.grade,
                amount: self.amount,
            })
    }

    /// Collapse a base value to its primary denomination.
    ///
    /// Decomposes greedily through the grades and keeps only the highest
    /// non-zero grade produced; lower remainders are discarded. Callers that
    /// need the full breakdown decompose grade by grade themselves.
    pub fn from_base_value(value: i64) -> Result<GemStack, CurrencyError> {
        if value < 0 {
            return Err(CurrencyError::InvalidValue(value));
        }
        let remaining = value as u64;
        for grade in Grade::ALL.iter().rev() {
            let count = remaining / grade.rate();
            if count > 0 {
                return Ok(GemStack::new(*grade, count));
            }
        }
        Ok(GemStack::new(Grade::Low, 0))
    }
}

impl std::fmt::Display for GemStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount, self.grade.label())
    }
}
