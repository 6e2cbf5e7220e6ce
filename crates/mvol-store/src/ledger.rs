//! Staged two-file commit.
//!
//! A commit runs in three phases:
//! 1. stage: write each new file image to `<target>.staged` and fsync it
//! 2. mark: write the commit marker naming the staged stores
//! 3. apply: rename each staged file over its target, then delete the marker
//!
//! A crash before the marker exists leaves both targets untouched; the
//! orphaned staged files are discarded on next open. A crash after the marker
//! exists is rolled forward on next open. Writers hold `&mut Ledger`, which
//! serializes commits within the process.

use crate::error::StoreResult;
use crate::fsio::{read_if_exists, remove_if_exists, staged_path, write_synced};
use crate::market_store::{MarketStore, MarketTable};
use crate::ranking::{RankingBook, RankingIndex};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const MARKER_FILE: &str = ".mvol-commit";

/// One of the two files a commit can replace, in apply order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Rankings,
    Markets,
}

impl Slot {
    const ALL: [Slot; 2] = [Slot::Rankings, Slot::Markets];

    fn key(self) -> &'static str {
        match self {
            Slot::Rankings => "rankings",
            Slot::Markets => "markets",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }
}

/// New file images for one logical operation. `None` leaves that file alone.
#[derive(Debug, Clone, Default)]
pub struct Commit {
    pub markets: Option<MarketTable>,
    pub rankings: Option<RankingBook>,
}

impl Commit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_markets(mut self, table: MarketTable) -> Self {
        self.markets = Some(table);
        self
    }

    pub fn with_rankings(mut self, book: RankingBook) -> Self {
        self.rankings = Some(book);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_none() && self.rankings.is_none()
    }
}

/// The single write path over the market file and the ranking file.
#[derive(Debug)]
pub struct Ledger {
    markets: MarketStore,
    rankings: RankingIndex,
    marker: PathBuf,
}

impl Ledger {
    /// Open the ledger and finish or discard any interrupted commit.
    ///
    /// The commit marker lives next to the market file.
    pub fn open(markets_path: impl Into<PathBuf>, rankings_path: impl Into<PathBuf>) -> StoreResult<Self> {
        let markets = MarketStore::new(markets_path);
        let rankings = RankingIndex::new(rankings_path);

        let dir = markets.path().parent().unwrap_or_else(|| Path::new(""));
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
        let marker = dir.join(MARKER_FILE);

        let mut ledger = Self {
            markets,
            rankings,
            marker,
        };
        ledger.recover()?;
        Ok(ledger)
    }

    pub fn markets(&self) -> &MarketStore {
        &self.markets
    }

    pub fn rankings(&self) -> &RankingIndex {
        &self.rankings
    }

    pub fn marker_path(&self) -> &Path {
        &self.marker
    }

    fn target(&self, slot: Slot) -> &Path {
        match slot {
            Slot::Rankings => self.rankings.path(),
            Slot::Markets => self.markets.path(),
        }
    }

    /// Stage, mark and apply a commit.
    pub fn commit(&mut self, commit: Commit) -> StoreResult<()> {
        if commit.is_empty() {
            return Ok(());
        }

        // Rankings first so that the ranking file is never behind on apply.
        let mut images: Vec<(Slot, String)> = Vec::with_capacity(2);
        if let Some(book) = &commit.rankings {
            images.push((Slot::Rankings, book.render()));
        }
        if let Some(table) = &commit.markets {
            images.push((Slot::Markets, table.render()));
        }

        // A leftover staged file for a store outside this commit must not be
        // rolled forward with it.
        for slot in Slot::ALL {
            if !images.iter().any(|(s, _)| *s == slot) {
                remove_if_exists(&staged_path(self.target(slot)))?;
            }
        }

        let mut staged: Vec<Slot> = Vec::with_capacity(images.len());
        for (slot, contents) in &images {
            if let Err(e) = write_synced(&staged_path(self.target(*slot)), contents) {
                warn!(store = slot.key(), error = %e, "Staging failed, discarding commit");
                self.discard_staged();
                return Err(e);
            }
            staged.push(*slot);
        }

        let marker: Vec<&str> = staged.iter().map(|s| s.key()).collect();
        if let Err(e) = write_synced(&self.marker, &marker.join("\n")) {
            warn!(error = %e, "Commit marker write failed, discarding commit");
            self.discard_staged();
            if let Err(e) = remove_if_exists(&self.marker) {
                warn!(error = %e, "Failed to remove partial commit marker");
            }
            return Err(e);
        }
        debug!(stores = ?marker, "Commit staged");

        self.apply(&staged)?;
        info!(stores = ?marker, "Commit applied");
        Ok(())
    }

    fn apply(&self, slots: &[Slot]) -> StoreResult<()> {
        for slot in slots {
            let target = self.target(*slot);
            let staged = staged_path(target);
            if staged.exists() {
                std::fs::rename(&staged, target)?;
            }
        }
        remove_if_exists(&self.marker)
    }

    fn discard_staged(&self) {
        for slot in Slot::ALL {
            let target = self.target(slot);
            if let Err(e) = remove_if_exists(&staged_path(target)) {
                warn!(path = %target.display(), error = %e, "Failed to remove staged file");
            }
        }
    }

    /// Roll an interrupted commit forward, or discard orphaned staged files.
    ///
    /// The marker is written only after every staged file is synced, and a
    /// commit clears staged files of stores it does not touch, so whatever is
    /// staged when the marker exists belongs to that commit. A marker cut
    /// short by a crash is still honoured. Returns `true` if a commit was
    /// rolled forward.
    pub fn recover(&mut self) -> StoreResult<bool> {
        let Some(text) = read_if_exists(&self.marker)? else {
            self.discard_staged();
            return Ok(false);
        };

        let listed: Option<Vec<Slot>> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(Slot::from_key)
            .collect();
        if listed.map_or(true, |slots| slots.is_empty()) {
            warn!(marker = %text, "Commit marker incomplete, rolling forward staged files");
        }

        let stores: Vec<&str> = Slot::ALL
            .into_iter()
            .filter(|s| staged_path(self.target(*s)).exists())
            .map(Slot::key)
            .collect();
        self.apply(&Slot::ALL)?;
        info!(stores = ?stores, "Recovered interrupted commit");
        Ok(true)
    }
}
