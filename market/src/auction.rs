//! Fixed-price auction house
//!
//! Listings live for seven days. Expiration is observed lazily from the
//! clock passed in by the caller; nothing runs on a timer inside the house.

use crate::error::{MarketError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use stargem_core::constants::LISTING_LIFETIME_DAYS;
use stargem_core::{CurrencyError, GemStack};
use stargem_ledger::Ledger;
use uuid::Uuid;

/// Item carried by a listing. The engine never inspects it beyond display;
/// the caller takes it from the seller before listing and hands it to the
/// buyer after settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradedItem {
    pub item_id: i32,
    pub stack: u32,
    /// Variant/prefix tag, carried through unchanged.
    pub variant: u8,
}

/// One auction-house offer.
///
/// Lifecycle: active until sold or expired. A sold listing is terminal; an
/// expired unsold listing is removed by [`AuctionHouse::sweep`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: Uuid,
    pub seller: String,
    pub item: TradedItem,
    pub price: GemStack,
    pub listed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub buyer: Option<String>,
    #[serde(default)]
    pub sold: bool,
}

impl Listing {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.sold && !self.is_expired(now)
    }

    /// Time remaining before expiry; negative once expired.
    pub fn time_left(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at - now
    }
}

/// Outcome of a settlement; the caller hands the item to the buyer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub listing_id: Uuid,
    pub item: TradedItem,
    pub seller: String,
    pub price: GemStack,
}

/// All listings, in creation order. Sold listings stay until pruned by an
/// operator; expired unsold ones are dropped by [`sweep`](AuctionHouse::sweep).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuctionHouse {
    listings: Vec<Listing>,
}

impl AuctionHouse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Put an item up for sale for seven days.
    ///
    /// Touches no balances: the caller must already have taken the item from
    /// the seller.
    pub fn list(
        &mut self,
        seller: &str,
        item: TradedItem,
        price: GemStack,
        now: DateTime<Utc>,
    ) -> Result<Listing> {
        if price.amount == 0 {
            return Err(CurrencyError::InvalidValue(0).into());
        }
        let listing = Listing {
            id: Uuid::new_v4(),
            seller: seller.to_string(),
            item,
            price,
            listed_at: now,
            expires_at: now + Duration::days(LISTING_LIFETIME_DAYS),
            buyer: None,
            sold: false,
        };
        self.listings.push(listing.clone());
        Ok(listing)
    }

    /// Listings currently purchasable, in creation order.
    pub fn active(&self, now: DateTime<Utc>) -> Vec<&Listing> {
        self.listings.iter().filter(|l| l.is_active(now)).collect()
    }

    pub fn active_count(&self, now: DateTime<Utc>) -> usize {
        self.listings.iter().filter(|l| l.is_active(now)).count()
    }

    /// Buy the listing at 1-based `position` within the current active view.
    ///
    /// The view is recomputed here: positions shift as listings appear or
    /// expire, so a stale position resolves to `NotFound` and the caller
    /// re-browses. On success the buyer is debited, the listing marked sold
    /// with the buyer recorded, and the seller credited, all before this
    /// returns; the buyer debit is the only step that can fail.
    pub fn settle(
        &mut self,
        position: usize,
        buyer: &str,
        ledger: &mut Ledger,
        now: DateTime<Utc>,
    ) -> Result<Settlement> {
        let index = {
            let active: Vec<usize> = self
                .listings
                .iter()
                .enumerate()
                .filter(|(_, l)| l.is_active(now))
                .map(|(i, _)| i)
                .collect();
            position
                .checked_sub(1)
                .and_then(|p| active.get(p).copied())
                .ok_or(MarketError::NotFound(position))?
        };

        let listing = &self.listings[index];
        if listing.seller == buyer {
            return Err(MarketError::SelfTrade);
        }
        if !ledger.withdraw(buyer, listing.price.grade, listing.price.amount) {
            return Err(MarketError::InsufficientFunds {
                grade: listing.price.grade,
                need: listing.price.amount,
            });
        }

        // The buyer has paid; everything below is infallible (the price
        // amount was validated positive when the listing was created).
        let listing = &mut self.listings[index];
        listing.sold = true;
        listing.buyer = Some(buyer.to_string());
        let seller = listing.seller.clone();
        let price = listing.price;
        ledger.deposit(&seller, price.grade, price.amount)?;

        Ok(Settlement {
            listing_id: self.listings[index].id,
            item: self.listings[index].item.clone(),
            seller,
            price,
        })
    }

    /// Drop expired listings that never sold. Idempotent, safe to call any
    /// time; run it right after loading a snapshot so stale listings are
    /// never shown.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.listings.len();
        self.listings.retain(|l| l.sold || !l.is_expired(now));
        before - self.listings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stargem_core::Grade;

    fn now() -> DateTime<Utc> {
        "2026-08-06T12:00:00Z".parse().unwrap()
    }

    fn sword() -> TradedItem {
        TradedItem {
            item_id: 281,
            stack: 1,
            variant: 81,
        }
    }

    #[test]
    fn test_list_sets_seven_day_expiry() {
        let mut house = AuctionHouse::new();
        let listing = house
            .list("alice", sword(), GemStack::new(Grade::Medium, 5), now())
            .unwrap();

        assert_eq!(listing.expires_at, now() + Duration::days(7));
        assert!(!listing.sold);
        assert!(listing.buyer.is_none());
        assert_eq!(house.active(now()).len(), 1);
    }

    #[test]
    fn test_list_rejects_zero_price() {
        let mut house = AuctionHouse::new();
        let err = house
            .list("alice", sword(), GemStack::new(Grade::Low, 0), now())
            .unwrap_err();
        assert_eq!(err, MarketError::Currency(CurrencyError::InvalidValue(0)));
        assert!(house.is_empty());
    }

    #[test]
    fn test_settle_is_atomic_with_exact_funds() {
        let mut house = AuctionHouse::new();
        let mut ledger = Ledger::new();
        ledger.deposit("bob", Grade::Medium, 5).unwrap();
        house
            .list("alice", sword(), GemStack::new(Grade::Medium, 5), now())
            .unwrap();

        let settlement = house.settle(1, "bob", &mut ledger, now()).unwrap();
        assert_eq!(settlement.seller, "alice");
        assert_eq!(settlement.item, sword());

        // Buyer drained, seller credited by exactly the price
        assert_eq!(ledger.get("bob").unwrap().balance(Grade::Medium), 0);
        assert_eq!(ledger.get("alice").unwrap().balance(Grade::Medium), 5);

        // Listing is terminal and out of the active view
        let listing = &house.listings()[0];
        assert!(listing.sold);
        assert_eq!(listing.buyer.as_deref(), Some("bob"));
        assert!(house.active(now()).is_empty());
    }

    #[test]
    fn test_settle_rejects_self_trade() {
        let mut house = AuctionHouse::new();
        let mut ledger = Ledger::new();
        ledger.deposit("alice", Grade::Medium, 50).unwrap();
        house
            .list("alice", sword(), GemStack::new(Grade::Medium, 5), now())
            .unwrap();

        let err = house.settle(1, "alice", &mut ledger, now()).unwrap_err();
        assert_eq!(err, MarketError::SelfTrade);
        assert_eq!(ledger.get("alice").unwrap().balance(Grade::Medium), 50);
        assert!(!house.listings()[0].sold);
    }

    #[test]
    fn test_settle_insufficient_funds_changes_nothing() {
        let mut house = AuctionHouse::new();
        let mut ledger = Ledger::new();
        ledger.deposit("bob", Grade::Medium, 4).unwrap();
        house
            .list("alice", sword(), GemStack::new(Grade::Medium, 5), now())
            .unwrap();

        let err = house.settle(1, "bob", &mut ledger, now()).unwrap_err();
        assert_eq!(
            err,
            MarketError::InsufficientFunds {
                grade: Grade::Medium,
                need: 5,
            }
        );
        assert_eq!(ledger.get("bob").unwrap().balance(Grade::Medium), 4);
        assert!(ledger.get("alice").is_none());
        assert!(!house.listings()[0].sold);
    }

    #[test]
    fn test_settle_stale_position_is_not_found() {
        let mut house = AuctionHouse::new();
        let mut ledger = Ledger::new();
        ledger.deposit("bob", Grade::Low, 100).unwrap();
        house
            .list("alice", sword(), GemStack::new(Grade::Low, 10), now())
            .unwrap();

        assert_eq!(
            house.settle(2, "bob", &mut ledger, now()).unwrap_err(),
            MarketError::NotFound(2)
        );
        assert_eq!(
            house.settle(0, "bob", &mut ledger, now()).unwrap_err(),
            MarketError::NotFound(0)
        );
    }

    #[test]
    fn test_expired_listing_leaves_active_view() {
        let mut house = AuctionHouse::new();
        house
            .list("alice", sword(), GemStack::new(Grade::Low, 10), now())
            .unwrap();

        let later = now() + Duration::days(7) + Duration::seconds(1);
        assert!(house.active(later).is_empty());

        // An index read from the earlier view no longer resolves
        let mut ledger = Ledger::new();
        ledger.deposit("bob", Grade::Low, 100).unwrap();
        assert_eq!(
            house.settle(1, "bob", &mut ledger, later).unwrap_err(),
            MarketError::NotFound(1)
        );
    }

    #[test]
    fn test_active_positions_shift_after_expiry() {
        let mut house = AuctionHouse::new();
        house
            .list("alice", sword(), GemStack::new(Grade::Low, 10), now())
            .unwrap();
        let second = TradedItem {
            item_id: 500,
            stack: 3,
            variant: 0,
        };
        house
            .list(
                "carol",
                second.clone(),
                GemStack::new(Grade::Low, 2),
                now() + Duration::days(2),
            )
            .unwrap();

        // After the first listing expires, carol's listing is position 1
        let later = now() + Duration::days(7) + Duration::hours(1);
        let mut ledger = Ledger::new();
        ledger.deposit("bob", Grade::Low, 100).unwrap();
        let settlement = house.settle(1, "bob", &mut ledger, later).unwrap();
        assert_eq!(settlement.item, second);
        assert_eq!(settlement.seller, "carol");
    }

    #[test]
    fn test_sweep_removes_only_expired_unsold() {
        let mut house = AuctionHouse::new();
        let mut ledger = Ledger::new();
        ledger.deposit("bob", Grade::Low, 100).unwrap();

        // One listing that will sell, one that expires, one still active
        house
            .list("alice", sword(), GemStack::new(Grade::Low, 10), now())
            .unwrap();
        house.settle(1, "bob", &mut ledger, now()).unwrap();
        house
            .list("alice", sword(), GemStack::new(Grade::Low, 10), now())
            .unwrap();
        house
            .list(
                "alice",
                sword(),
                GemStack::new(Grade::Low, 10),
                now() + Duration::days(5),
            )
            .unwrap();

        let later = now() + Duration::days(7) + Duration::seconds(1);
        assert_eq!(house.sweep(later), 1);
        assert_eq!(house.len(), 2);
        assert!(house.listings().iter().any(|l| l.sold));
        assert_eq!(house.active_count(later), 1);

        // Idempotent
        assert_eq!(house.sweep(later), 0);
    }
}
