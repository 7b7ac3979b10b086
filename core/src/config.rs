//! Runtime configuration for the economy service
//!
//! Read by the core, owned by the host: the daemon deserializes this from a
//! TOML file and hands it to the service at load. Every field has a default
//! so a missing or partial file still yields a working economy.

use crate::grade::Grade;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Caller-side master switch; the core only reports it.
    pub enabled: bool,
    pub starting_balance: StartingBalance,
    pub daily_reward: DailyReward,
    /// Read by the external drop policy, not consumed by the core.
    pub drop_chance: DropChance,
    /// Cadence of the daemon's sweep-and-flush loop, in seconds.
    pub sweep_interval_secs: u64,
    /// Initial shop catalog, used only when no catalog snapshot exists yet.
    pub shop: Vec<ShopEntryConfig>,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            starting_balance: StartingBalance::default(),
            daily_reward: DailyReward::default(),
            drop_chance: DropChance::default(),
            sweep_interval_secs: 600,
            shop: default_shop(),
        }
    }
}

/// Seed granted at the lowest grade when an account is first created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StartingBalance {
    pub enabled: bool,
    pub amount: u64,
}

impl Default for StartingBalance {
    fn default() -> Self {
        Self {
            enabled: true,
            amount: 100,
        }
    }
}

/// Gems deposited per grade by a successful daily claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyReward {
    pub low: u64,
    pub medium: u64,
    pub high: u64,
    pub supreme: u64,
}

impl Default for DailyReward {
    fn default() -> Self {
        Self {
            low: 10,
            medium: 5,
            high: 2,
            supreme: 1,
        }
    }
}

impl DailyReward {
    pub fn amount(&self, grade: Grade) -> u64 {
        match grade {
            Grade::Low => self.low,
            Grade::Medium => self.medium,
            Grade::High => self.high,
            Grade::Supreme => self.supreme,
        }
    }
}

/// Per-grade drop probabilities for the external reward policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DropChance {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub supreme: f64,
}

impl Default for DropChance {
    fn default() -> Self {
        Self {
            low: 0.3,
            medium: 0.15,
            high: 0.05,
            supreme: 0.01,
        }
    }
}

impl DropChance {
    pub fn chance(&self, grade: Grade) -> f64 {
        match grade {
            Grade::Low => self.low,
            Grade::Medium => self.medium,
            Grade::High => self.high,
            Grade::Supreme => self.supreme,
        }
    }
}

/// One configured shop row; live stock and purchase counters belong to the
/// catalog snapshot, not to this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopEntryConfig {
    pub item_id: i32,
    /// `None` means unlimited stock.
    #[serde(default)]
    pub stock: Option<u32>,
    pub price_grade: Grade,
    pub price_amount: u64,
    /// `None` means no per-account cap.
    #[serde(default)]
    pub purchase_limit: Option<u32>,
}

fn default_shop() -> Vec<ShopEntryConfig> {
    vec![
        ShopEntryConfig {
            item_id: 1,
            stock: None,
            price_grade: Grade::Low,
            price_amount: 10,
            purchase_limit: None,
        },
        ShopEntryConfig {
            item_id: 2,
            stock: None,
            price_grade: Grade::Low,
            price_amount: 5,
            purchase_limit: None,
        },
        ShopEntryConfig {
            item_id: 3,
            stock: None,
            price_grade: Grade::Medium,
            price_amount: 3,
            purchase_limit: None,
        },
        ShopEntryConfig {
            item_id: 4,
            stock: Some(10),
            price_grade: Grade::High,
            price_amount: 1,
            purchase_limit: Some(1),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EconomyConfig::default();
        assert!(config.enabled);
        assert!(config.starting_balance.enabled);
        assert_eq!(config.starting_balance.amount, 100);
        assert_eq!(config.daily_reward.amount(Grade::Low), 10);
        assert_eq!(config.daily_reward.amount(Grade::Supreme), 1);
        assert_eq!(config.shop.len(), 4);
    }

    #[test]
    fn test_drop_chances_decrease_with_grade() {
        let chances = DropChance::default();
        assert!(chances.chance(Grade::Low) > chances.chance(Grade::Medium));
        assert!(chances.chance(Grade::Medium) > chances.chance(Grade::High));
        assert!(chances.chance(Grade::High) > chances.chance(Grade::Supreme));
    }
}
