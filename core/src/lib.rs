//! Star Gem Economy Core
//!
//! Implements the denominated currency model:
//! - Four ordered gem grades with powers-of-100 exchange rates
//! - Conversion between graded amounts and the canonical base value
//! - Display metadata (labels, color tags)
//! - Runtime configuration for the economy service

pub mod config;
pub mod grade;

pub use config::{DailyReward, DropChance, EconomyConfig, ShopEntryConfig, StartingBalance};
pub use grade::{CurrencyError, GemStack, Grade};

/// Economic constants
pub mod constants {
    /// Exchange rate step between adjacent gem grades
    pub const GRADE_STEP: u64 = 100;

    /// How long an auction listing stays purchasable, in days
    pub const LISTING_LIFETIME_DAYS: i64 = 7;
}
