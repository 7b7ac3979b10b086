//! Economy service: aggregate ownership, locking, and persistence
//!
//! Ties the ledger, shop catalog, and auction house together behind one
//! service object. Each aggregate sits behind its own mutex; operations that
//! touch a market aggregate and the ledger take the market lock first, then
//! the ledger lock. Snapshots are cloned inside the lock and written to disk
//! after it is released, so no lock is held across I/O.
//!
//! Persistence is best-effort per mutation: when a snapshot write fails the
//! in-memory change stands, the error is returned, and the next successful
//! save of that aggregate repairs the file.

use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use stargem_core::{CurrencyError, EconomyConfig, GemStack, Grade};
use stargem_ledger::Ledger;
use stargem_market::{
    AuctionHouse, Listing, MarketError, Receipt, Settlement, ShopCatalog, ShopEntry, TradedItem,
};
use stargem_storage::{Storage, StorageError};
use thiserror::Error;

/// Snapshot document names under the data directory.
const LEDGER_SNAPSHOT: &str = "ledger";
const SHOP_SNAPSHOT: &str = "shop";
const AUCTION_SNAPSHOT: &str = "auction";

#[derive(Error, Debug)]
pub enum EconomyError {
    #[error(transparent)]
    Market(#[from] MarketError),

    #[error(transparent)]
    Currency(#[from] CurrencyError),

    /// The in-memory mutation already succeeded; only the snapshot write
    /// failed.
    #[error("persistence error: {0}")]
    Persistence(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, EconomyError>;

/// Aggregate counts for status output.
#[derive(Debug, Clone)]
pub struct EconomyStats {
    pub accounts: usize,
    pub shop_entries: usize,
    pub listings: usize,
    pub active_listings: usize,
}

/// The single owner of all economy state.
pub struct EconomyService {
    config: EconomyConfig,
    storage: Storage,
    ledger: Mutex<Ledger>,
    shop: Mutex<ShopCatalog>,
    auction: Mutex<AuctionHouse>,
}

impl EconomyService {
    /// Restore every aggregate from disk.
    ///
    /// Missing snapshots start empty; malformed ones are logged and start
    /// empty too, so the process always comes up. A catalog with no snapshot
    /// yet is seeded from the configured entries, and stale expired listings
    /// are swept before anything is served.
    pub fn load_all(config: EconomyConfig, storage: Storage) -> Self {
        let ledger: Ledger = storage.load_or_default(LEDGER_SNAPSHOT);
        let shop: ShopCatalog = if storage.has_snapshot(SHOP_SNAPSHOT) {
            storage.load_or_default(SHOP_SNAPSHOT)
        } else {
            ShopCatalog::from_config(&config.shop)
        };
        let mut auction: AuctionHouse = storage.load_or_default(AUCTION_SNAPSHOT);

        let removed = auction.sweep(Utc::now());
        if removed > 0 {
            log::info!("swept {removed} expired listings on load");
        }
        log::info!(
            "economy loaded: {} accounts, {} shop entries, {} listings",
            ledger.len(),
            shop.len(),
            auction.len()
        );

        Self {
            config,
            storage,
            ledger: Mutex::new(ledger),
            shop: Mutex::new(shop),
            auction: Mutex::new(auction),
        }
    }

    /// Whether the economy is switched on. Read-only: gating mutating calls
    /// on it is the caller's responsibility.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    pub fn stats(&self) -> EconomyStats {
        let auction = self.auction.lock();
        EconomyStats {
            accounts: self.ledger.lock().len(),
            shop_entries: self.shop.lock().len(),
            listings: auction.len(),
            active_listings: auction.active_count(Utc::now()),
        }
    }

    // ---- ledger ----------------------------------------------------------

    /// Ensure `account` exists, seeding the starting balance on first
    /// reference. Persists only when an account was actually created.
    pub fn get_or_create(&self, account: &str) -> Result<()> {
        let snapshot = {
            let mut ledger = self.ledger.lock();
            if ledger.get(account).is_some() {
                return Ok(());
            }
            ledger.get_or_create(account, &self.config.starting_balance);
            ledger.clone()
        };
        self.persist(LEDGER_SNAPSHOT, &snapshot)
    }

    /// Credit an account, creating it first if needed.
    pub fn deposit(&self, account: &str, grade: Grade, amount: u64) -> Result<()> {
        let snapshot = {
            let mut ledger = self.ledger.lock();
            ledger.get_or_create(account, &self.config.starting_balance);
            ledger.deposit(account, grade, amount)?;
            ledger.clone()
        };
        self.persist(LEDGER_SNAPSHOT, &snapshot)
    }

    /// Strict per-grade withdrawal; other grades are never drawn on.
    pub fn withdraw(&self, account: &str, grade: Grade, amount: u64) -> Result<bool> {
        let (ok, snapshot) = {
            let mut ledger = self.ledger.lock();
            let ok = ledger.withdraw(account, grade, amount);
            (ok, ok.then(|| ledger.clone()))
        };
        if let Some(snapshot) = snapshot {
            self.persist(LEDGER_SNAPSHOT, &snapshot)?;
        }
        Ok(ok)
    }

    pub fn total_value(&self, account: &str) -> u64 {
        self.ledger.lock().total_value(account)
    }

    pub fn balance_display(&self, account: &str) -> Vec<(Grade, u64)> {
        self.ledger.lock().balance_display(account)
    }

    /// Claim the daily reward; false if already claimed today.
    pub fn claim_daily_reward(&self, account: &str) -> Result<bool> {
        let (claimed, snapshot) = {
            let mut ledger = self.ledger.lock();
            ledger.get_or_create(account, &self.config.starting_balance);
            let claimed =
                ledger.claim_daily_reward(account, &self.config.daily_reward, Utc::now());
            (claimed, claimed.then(|| ledger.clone()))
        };
        if let Some(snapshot) = snapshot {
            self.persist(LEDGER_SNAPSHOT, &snapshot)?;
        }
        Ok(claimed)
    }

    // ---- shop ------------------------------------------------------------

    pub fn shop_entries(&self) -> Vec<ShopEntry> {
        self.shop.lock().entries().to_vec()
    }

    /// Buy from the catalog. The receipt tells the caller what to grant.
    pub fn purchase(&self, position: usize, account: &str, quantity: u32) -> Result<Receipt> {
        let (receipt, shop_snapshot, ledger_snapshot) = {
            let mut shop = self.shop.lock();
            let mut ledger = self.ledger.lock();
            ledger.get_or_create(account, &self.config.starting_balance);
            let receipt = shop.purchase(position, account, quantity, &mut ledger)?;
            (receipt, shop.clone(), ledger.clone())
        };
        self.persist(SHOP_SNAPSHOT, &shop_snapshot)?;
        self.persist(LEDGER_SNAPSHOT, &ledger_snapshot)?;
        Ok(receipt)
    }

    // ---- auction ---------------------------------------------------------

    /// List an item the caller has already taken from the seller.
    pub fn list_item(&self, seller: &str, item: TradedItem, price: GemStack) -> Result<Listing> {
        let (listing, snapshot) = {
            let mut auction = self.auction.lock();
            let listing = auction.list(seller, item, price, Utc::now())?;
            (listing, auction.clone())
        };
        self.persist(AUCTION_SNAPSHOT, &snapshot)?;
        Ok(listing)
    }

    /// Listings currently purchasable, in creation order.
    pub fn active_listings(&self) -> Vec<Listing> {
        self.auction
            .lock()
            .active(Utc::now())
            .into_iter()
            .cloned()
            .collect()
    }

    /// Settle the listing at 1-based `position` within the current active
    /// view. The settlement tells the caller what to hand the buyer.
    pub fn settle(&self, position: usize, buyer: &str) -> Result<Settlement> {
        let (settlement, auction_snapshot, ledger_snapshot) = {
            let mut auction = self.auction.lock();
            let mut ledger = self.ledger.lock();
            ledger.get_or_create(buyer, &self.config.starting_balance);
            let settlement = auction.settle(position, buyer, &mut ledger, Utc::now())?;
            (settlement, auction.clone(), ledger.clone())
        };
        self.persist(AUCTION_SNAPSHOT, &auction_snapshot)?;
        self.persist(LEDGER_SNAPSHOT, &ledger_snapshot)?;
        Ok(settlement)
    }

    /// Remove expired unsold listings; safe to call on any cadence.
    pub fn sweep_expired(&self) -> Result<usize> {
        let (removed, snapshot) = {
            let mut auction = self.auction.lock();
            let removed = auction.sweep(Utc::now());
            (removed, (removed > 0).then(|| auction.clone()))
        };
        if let Some(snapshot) = snapshot {
            self.persist(AUCTION_SNAPSHOT, &snapshot)?;
        }
        Ok(removed)
    }

    // ---- lifecycle -------------------------------------------------------

    /// Write every aggregate snapshot.
    pub fn save_all(&self) -> Result<()> {
        let ledger = self.ledger.lock().clone();
        let shop = self.shop.lock().clone();
        let auction = self.auction.lock().clone();
        self.persist(LEDGER_SNAPSHOT, &ledger)?;
        self.persist(SHOP_SNAPSHOT, &shop)?;
        self.persist(AUCTION_SNAPSHOT, &auction)?;
        Ok(())
    }

    /// Final flush before the process exits.
    pub fn shutdown(&self) -> Result<()> {
        log::info!("economy shutting down, flushing snapshots");
        self.save_all()
    }

    fn persist<T: Serialize>(&self, name: &str, snapshot: &T) -> Result<()> {
        self.storage.save(name, snapshot)?;
        Ok(())
    }
}
