//! Flat-file persistence for mvol.
//!
//! Two human-readable text stores hold every persisted value:
//! - the market file: one line per market (`MarketStore`, `MarketTable`)
//! - the ranking file: nine sorted category lines (`RankingIndex`, `RankingBook`)
//!
//! `Ledger` is the single write path for changes spanning both files. It
//! stages the new contents next to their targets and swaps them in behind a
//! commit marker, so an interrupted commit is rolled forward on next open.

pub mod codec;
pub mod error;
mod fsio;
pub mod ledger;
pub mod market_store;
pub mod national;
pub mod ranking;

pub use codec::{decode_market_line, encode_market_line, name_token};
pub use error::{StoreError, StoreResult};
pub use ledger::{Commit, Ledger};
pub use market_store::{MarketStore, MarketTable};
pub use national::load_national;
pub use ranking::{RankingBook, RankingEntry, RankingIndex, RankingList};
