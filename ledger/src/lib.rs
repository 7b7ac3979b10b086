//! Per-account star gem ledger
//!
//! Owns every account balance. Balances are per-grade buckets with no
//! automatic conversion between grades: a withdrawal at one grade never
//! consumes another grade, even when the combined value would cover it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stargem_core::{CurrencyError, DailyReward, Grade, StartingBalance};
use std::collections::{BTreeMap, HashMap};

/// A single account: graded gem buckets plus the daily reward stamp.
///
/// Zero buckets are pruned on write, so every stored quantity is positive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    balances: BTreeMap<Grade, u64>,
    #[serde(default)]
    last_daily_reward: Option<DateTime<Utc>>,
}

impl Account {
    pub fn balance(&self, grade: Grade) -> u64 {
        self.balances.get(&grade).copied().unwrap_or(0)
    }

    pub fn last_daily_reward(&self) -> Option<DateTime<Utc>> {
        self.last_daily_reward
    }

    fn add(&mut self, grade: Grade, amount: u64) {
        *self.balances.entry(grade).or_insert(0) += amount;
    }

    fn remove(&mut self, grade: Grade, amount: u64) -> bool {
        match self.balances.get_mut(&grade) {
            Some(have) if *have >= amount => {
                *have -= amount;
                if *have == 0 {
                    self.balances.remove(&grade);
                }
                true
            }
            _ => false,
        }
    }

    /// Total worth in base units.
    pub fn total_value(&self) -> u64 {
        self.balances
            .iter()
            .map(|(grade, amount)| grade.rate().saturating_mul(*amount))
            .fold(0, u64::saturating_add)
    }

    /// Non-zero buckets, highest grade first.
    pub fn display(&self) -> Vec<(Grade, u64)> {
        self.balances
            .iter()
            .rev()
            .map(|(grade, amount)| (*grade, *amount))
            .collect()
    }
}

/// All accounts, keyed by account id. Accounts are created lazily on first
/// reference and never removed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    accounts: HashMap<String, Account>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an account without provisioning it.
    pub fn get(&self, id: &str) -> Option<&Account> {
        self.accounts.get(id)
    }

    /// Fetch an account, creating it on first reference.
    ///
    /// A new account is seeded with the configured amount at the lowest
    /// grade. This is the one read-shaped call that can mutate; use [`get`]
    /// when provisioning is not wanted.
    ///
    /// [`get`]: Ledger::get
    pub fn get_or_create(&mut self, id: &str, starting: &StartingBalance) -> &Account {
        self.accounts.entry(id.to_string()).or_insert_with(|| {
            let mut account = Account::default();
            if starting.enabled && starting.amount > 0 {
                account.add(Grade::Low, starting.amount);
            }
            account
        })
    }

    /// Add gems to an account bucket. The amount must be positive.
    ///
    /// The account is created bare if absent; starting-balance seeding only
    /// happens through [`get_or_create`](Ledger::get_or_create).
    pub fn deposit(&mut self, id: &str, grade: Grade, amount: u64) -> Result<(), CurrencyError> {
        if amount == 0 {
            return Err(CurrencyError::InvalidValue(0));
        }
        self.accounts.entry(id.to_string()).or_default().add(grade, amount);
        Ok(())
    }

    /// Take gems from a single grade bucket.
    ///
    /// Succeeds only when that bucket alone covers the amount; other grades
    /// are never drawn on. Returns false for an unknown account or an
    /// underfunded bucket, with nothing changed.
    pub fn withdraw(&mut self, id: &str, grade: Grade, amount: u64) -> bool {
        match self.accounts.get_mut(id) {
            Some(account) => account.remove(grade, amount),
            None => false,
        }
    }

    pub fn total_value(&self, id: &str) -> u64 {
        self.get(id).map(Account::total_value).unwrap_or(0)
    }

    pub fn balance_display(&self, id: &str) -> Vec<(Grade, u64)> {
        self.get(id).map(Account::display).unwrap_or_default()
    }

    /// Claim the daily reward, at most once per UTC calendar day.
    ///
    /// On success deposits the configured amount at every grade and stamps
    /// the claim time; returns false if already claimed on `now`'s date.
    pub fn claim_daily_reward(
        &mut self,
        id: &str,
        reward: &DailyReward,
        now: DateTime<Utc>,
    ) -> bool {
        let account = self.accounts.entry(id.to_string()).or_default();
        if let Some(last) = account.last_daily_reward {
            if last.date_naive() >= now.date_naive() {
                return false;
            }
        }
        account.last_daily_reward = Some(now);
        for grade in Grade::ALL {
            let amount = reward.amount(grade);
            if amount > 0 {
                account.add(grade, amount);
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// Display band for a total balance, used by status output.
pub fn wealth_rank(total_value: u64) -> &'static str {
    match total_value {
        v if v > 1_000_000 => "magnate",
        v if v > 100_000 => "wealthy",
        v if v > 10_000 => "comfortable",
        v if v > 1_000 => "getting by",
        _ => "penniless",
    }
}
