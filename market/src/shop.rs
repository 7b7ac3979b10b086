//! Catalog shop: configured entries with stock and per-account caps

use crate::error::{MarketError, Result};
use serde::{Deserialize, Serialize};
use stargem_core::{CurrencyError, GemStack, ShopEntryConfig};
use stargem_ledger::Ledger;
use std::collections::HashMap;

/// One purchasable catalog row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopEntry {
    pub item_id: i32,
    /// Remaining stock; `None` is unlimited.
    pub stock: Option<u32>,
    pub price: GemStack,
    /// Per-account lifetime cap; `None` is unlimited.
    pub purchase_limit: Option<u32>,
    /// Cumulative units bought per account; only tracked for capped entries.
    #[serde(default)]
    purchases: HashMap<String, u32>,
}

impl ShopEntry {
    pub fn new(
        item_id: i32,
        stock: Option<u32>,
        price: GemStack,
        purchase_limit: Option<u32>,
    ) -> Self {
        Self {
            item_id,
            stock,
            price,
            purchase_limit,
            purchases: HashMap::new(),
        }
    }

    fn from_config(config: &ShopEntryConfig) -> Self {
        Self::new(
            config.item_id,
            config.stock,
            GemStack::new(config.price_grade, config.price_amount),
            config.purchase_limit,
        )
    }

    /// Units this account has bought so far.
    pub fn purchased_by(&self, account: &str) -> u32 {
        self.purchases.get(account).copied().unwrap_or(0)
    }

    fn record_purchase(&mut self, account: &str, quantity: u32) {
        if self.purchase_limit.is_some() {
            *self.purchases.entry(account.to_string()).or_insert(0) += quantity;
        }
    }
}

/// Outcome of a successful purchase. Materializing the item for the buyer is
/// the caller's job; the engine only moved the currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub item_id: i32,
    pub quantity: u32,
    pub total_price: GemStack,
}

/// Ordered catalog; entries keep their position so callers can address them
/// by the 1-based number shown in the shop view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopCatalog {
    entries: Vec<ShopEntry>,
}

impl ShopCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh catalog from configured entries.
    pub fn from_config(entries: &[ShopEntryConfig]) -> Self {
        Self {
            entries: entries.iter().map(ShopEntry::from_config).collect(),
        }
    }

    pub fn entries(&self) -> &[ShopEntry] {
        &self.entries
    }

    pub fn push(&mut self, entry: ShopEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Buy `quantity` units of the entry at 1-based `position`.
    ///
    /// Validation runs in full before anything mutates: quantity, position,
    /// stock, per-account cap, then the ledger withdrawal. Only once the
    /// buyer has paid do stock and the purchase counter move, so a failure
    /// at any step leaves everything untouched.
    pub fn purchase(
        &mut self,
        position: usize,
        account: &str,
        quantity: u32,
        ledger: &mut Ledger,
    ) -> Result<Receipt> {
        if quantity == 0 {
            return Err(CurrencyError::InvalidValue(0).into());
        }
        let entry = position
            .checked_sub(1)
            .and_then(|i| self.entries.get_mut(i))
            .ok_or(MarketError::NotFound(position))?;

        if let Some(available) = entry.stock {
            if available < quantity {
                return Err(MarketError::InsufficientStock {
                    requested: quantity,
                    available,
                });
            }
        }
        if let Some(limit) = entry.purchase_limit {
            if entry.purchased_by(account) as u64 + quantity as u64 > limit as u64 {
                return Err(MarketError::PurchaseLimitExceeded { limit });
            }
        }
        let total = entry
            .price
            .amount
            .checked_mul(quantity as u64)
            .ok_or(CurrencyError::Overflow {
                grade: entry.price.grade,
                amount: entry.price.amount,
            })?;
        if !ledger.withdraw(account, entry.price.grade, total) {
            return Err(MarketError::InsufficientFunds {
                grade: entry.price.grade,
                need: total,
            });
        }

        if let Some(stock) = entry.stock.as_mut() {
            *stock -= quantity;
        }
        entry.record_purchase(account, quantity);

        Ok(Receipt {
            item_id: entry.item_id,
            quantity,
            total_price: GemStack::new(entry.price.grade, total),
        })
    }
}
