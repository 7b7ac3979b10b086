//! Star Gem Marketplace
//!
//! Two trading surfaces over the ledger:
//! - a configured shop with finite stock and per-account purchase caps
//! - a fixed-price auction house with 7-day listings
//!
//! Both validate fully before mutating anything, so a failed operation
//! leaves stock, counters, listings, and balances exactly as they were.

pub mod auction;
pub mod error;
pub mod shop;

pub use auction::{AuctionHouse, Listing, Settlement, TradedItem};
pub use error::{MarketError, Result};
pub use shop::{Receipt, ShopCatalog, ShopEntry};
