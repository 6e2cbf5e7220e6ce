//! Ranking index: nine sorted `(market, value)` lists in one flat file.
//!
//! File layout is one line per category, in [`Category::ALL`] order:
//!
//! ```text
//! CV Vacancy Rankings: Austin - 0.0,Boise - 12.5
//! ...
//! ```
//!
//! Every list is kept sorted ascending by value with at most one entry per
//! market. Values that fail to parse sort as `0` and are never an error.

use crate::error::{StoreError, StoreResult};
use crate::fsio::{join_lines, read_if_exists, write_synced};
use mvol_core::{format_value, parse_value, Category, Ordinal};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const ENTRY_SEPARATOR: &str = " - ";

/// One `"<name> - <value>"` entry.
///
/// The value is kept as persisted text so that entries written by hand (or by
/// older tools) survive a rewrite untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingEntry {
    name: String,
    raw_value: String,
}

impl RankingEntry {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            raw_value: format_value(value),
        }
    }

    /// Split on the first `" - "`. Text without a separator is all name.
    pub fn parse(text: &str) -> Self {
        match text.split_once(ENTRY_SEPARATOR) {
            Some((name, value)) => Self {
                name: name.trim().to_string(),
                raw_value: value.trim().to_string(),
            },
            None => Self {
                name: text.trim().to_string(),
                raw_value: String::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }

    /// Numeric value for ordering; unparsable text counts as `0`.
    pub fn value(&self) -> f64 {
        parse_value(&self.raw_value).unwrap_or(0.0)
    }
}

impl fmt::Display for RankingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.raw_value.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}{}{}", self.name, ENTRY_SEPARATOR, self.raw_value)
        }
    }
}

/// One category's entries, sorted ascending by value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankingList {
    entries: Vec<RankingEntry>,
}

impl RankingList {
    /// Parse the comma-separated body of a category line.
    pub fn parse(body: &str) -> Self {
        let entries = body
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(RankingEntry::parse)
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[RankingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Insert or replace `name`'s value, then re-sort the whole list.
    ///
    /// An existing entry keeps its slot before the sort, so ties resolve in
    /// the entry's original order. Later duplicates of `name` are dropped.
    pub fn upsert_and_sort(&mut self, name: &str, value: f64) {
        let entry = RankingEntry::new(name, value);
        match self.entries.iter().position(|e| e.name == name) {
            Some(first) => {
                self.entries[first] = entry;
                let mut index = 0;
                self.entries.retain(|e| {
                    let keep = index <= first || e.name != name;
                    index += 1;
                    keep
                });
            }
            None => self.entries.push(entry),
        }
        self.sort();
    }

    /// Stable ascending sort by numeric value.
    pub fn sort(&mut self) {
        self.entries.sort_by(|a, b| a.value().total_cmp(&b.value()));
    }

    /// Remove every entry for `name`. Returns how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.name != name);
        before - self.entries.len()
    }

    /// 1-based position of `name`, if listed.
    pub fn rank(&self, name: &str) -> Option<Ordinal> {
        self.entries
            .iter()
            .position(|e| e.name == name)
            .map(Ordinal::from_index)
    }

    /// Comma-joined entries with no trailing separator.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// All nine ranking lists, indexed by [`Category::index`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankingBook {
    lists: [RankingList; 9],
}

impl RankingBook {
    /// Parse ranking file text.
    ///
    /// Returns the book plus the categories whose line was absent. Absent
    /// categories are left empty. Unknown lines are ignored.
    pub fn parse(text: &str) -> (Self, Vec<Category>) {
        let mut book = Self::default();
        let mut seen = [false; 9];

        for line in text.lines() {
            let line = line.trim();
            for category in Category::ALL {
                let prefix = format!("{}:", category.label());
                let Some(body) = line.strip_prefix(prefix.as_str()) else {
                    continue;
                };
                let i = category.index();
                if seen[i] {
                    warn!(category = %category, "Duplicate ranking line ignored");
                } else {
                    book.lists[i] = RankingList::parse(body);
                    seen[i] = true;
                }
            }
        }

        let missing = Category::ALL
            .into_iter()
            .filter(|c| !seen[c.index()])
            .collect();
        (book, missing)
    }

    pub fn get(&self, category: Category) -> &RankingList {
        &self.lists[category.index()]
    }

    pub fn get_mut(&mut self, category: Category) -> &mut RankingList {
        &mut self.lists[category.index()]
    }

    /// Lists paired with their category, in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &RankingList)> {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    /// Purge `name` from all nine lists. Returns the number of entries removed.
    pub fn remove_market(&mut self, name: &str) -> usize {
        self.lists.iter_mut().map(|l| l.remove(name)).sum()
    }

    pub fn rank(&self, name: &str, category: Category) -> Option<Ordinal> {
        self.get(category).rank(name)
    }

    /// Nine lines in canonical order. Empty lists render as `"<Label>:"`.
    pub fn render(&self) -> String {
        let lines: Vec<String> = self
            .iter()
            .map(|(category, list)| {
                if list.is_empty() {
                    format!("{}:", category.label())
                } else {
                    format!("{}: {}", category.label(), list.render())
                }
            })
            .collect();
        join_lines(&lines)
    }
}

/// The ranking file on disk.
///
/// `save` rewrites only this file. Changes that must stay in step with the
/// market file go through [`Ledger::commit`](crate::Ledger::commit).
#[derive(Debug, Clone)]
pub struct RankingIndex {
    path: PathBuf,
}

impl RankingIndex {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> StoreResult<(RankingBook, Vec<Category>)> {
        match read_if_exists(&self.path)? {
            Some(text) => Ok(RankingBook::parse(&text)),
            None => Ok((RankingBook::default(), Category::ALL.to_vec())),
        }
    }

    /// Load all nine lists; any missing category makes the whole load fail.
    pub fn load_all(&self) -> StoreResult<RankingBook> {
        self.load_requiring(&Category::ALL)
    }

    /// Load the file, failing if any of `required` has no line.
    pub fn load_requiring(&self, required: &[Category]) -> StoreResult<RankingBook> {
        let (book, missing) = self.read()?;
        let missing: Vec<String> = missing
            .iter()
            .filter(|c| required.contains(c))
            .map(|c| c.label())
            .collect();
        if !missing.is_empty() {
            warn!(path = %self.path.display(), missing = ?missing, "Ranking file incomplete");
            return Err(StoreError::RankingsIncomplete { missing });
        }
        debug!(path = %self.path.display(), "Rankings loaded");
        Ok(book)
    }

    /// Load whatever is present; missing categories start empty.
    pub fn load_tolerant(&self) -> StoreResult<RankingBook> {
        let (book, missing) = self.read()?;
        if !missing.is_empty() {
            debug!(
                path = %self.path.display(),
                missing = missing.len(),
                "Missing ranking categories treated as empty"
            );
        }
        Ok(book)
    }

    /// Full-file rewrite.
    pub fn save(&self, book: &RankingBook) -> StoreResult<()> {
        write_synced(&self.path, &book.render())?;
        info!(path = %self.path.display(), "Rankings saved");
        Ok(())
    }
}
