//! Market store: one flat file, one line per market.
//!
//! Lookup is a linear scan keyed on the leading name token of each line.
//! Lines that fail to decode are kept verbatim on rewrite and skipped on
//! read, so a single corrupt line never takes the rest of the file down.

use crate::codec::{decode_market_line, encode_market_line, name_token};
use crate::error::StoreResult;
use crate::fsio::{join_lines, read_if_exists, write_synced};
use mvol_core::MarketRecord;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// In-memory image of the market file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketTable {
    lines: Vec<String>,
}

impl MarketTable {
    /// Split file text into lines, dropping blank ones.
    pub fn parse(text: &str) -> Self {
        let lines = text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect();
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether any line carries this name, parseable or not.
    pub fn contains(&self, name: &str) -> bool {
        let name = name.trim();
        self.lines.iter().any(|l| name_token(l) == Some(name))
    }

    /// First line with this name that decodes cleanly.
    pub fn find(&self, name: &str) -> Option<MarketRecord> {
        self.position(name).map(|(_, record)| record)
    }

    /// Index and record of the line `find` would return.
    pub fn position(&self, name: &str) -> Option<(usize, MarketRecord)> {
        let name = name.trim();
        for (index, line) in self.lines.iter().enumerate() {
            if name_token(line) != Some(name) {
                continue;
            }
            match decode_market_line(line) {
                Some(record) => return Some((index, record)),
                None => warn!(market = %name, "Skipping malformed market line"),
            }
        }
        None
    }

    /// Every record that decodes, in file order.
    pub fn records(&self) -> Vec<MarketRecord> {
        self.lines
            .iter()
            .filter_map(|line| {
                let record = decode_market_line(line);
                if record.is_none() {
                    warn!(line = %line, "Skipping malformed market line");
                }
                record
            })
            .collect()
    }

    /// Append a freshly encoded line. Uniqueness is the caller's concern.
    pub fn append(&mut self, record: &MarketRecord) {
        self.lines.push(encode_market_line(record));
    }

    /// Replace, in place, the line that `find(&record.name)` reads.
    ///
    /// Malformed lines with the same name are left alone. Returns `false`
    /// (and changes nothing) if no line with that name decodes.
    pub fn replace(&mut self, record: &MarketRecord) -> bool {
        match self.position(&record.name) {
            Some((index, _)) => {
                self.lines[index] = encode_market_line(record);
                true
            }
            None => false,
        }
    }

    /// Drop every line carrying this name. Returns how many were dropped.
    pub fn remove(&mut self, name: &str) -> usize {
        let name = name.trim();
        let before = self.lines.len();
        self.lines.retain(|l| name_token(l) != Some(name));
        before - self.lines.len()
    }

    /// File contents, one line per market with a trailing newline.
    pub fn render(&self) -> String {
        join_lines(&self.lines)
    }
}

/// The market file on disk.
///
/// `add`, `update`, `remove` and `save` rewrite this one file directly.
/// Operations that also touch the ranking file must go through
/// [`Ledger::commit`](crate::Ledger::commit) instead.
#[derive(Debug, Clone)]
pub struct MarketStore {
    path: PathBuf,
}

impl MarketStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole file. A missing file is an empty table.
    pub fn load_table(&self) -> StoreResult<MarketTable> {
        let table = match read_if_exists(&self.path)? {
            Some(text) => MarketTable::parse(&text),
            None => {
                debug!(path = %self.path.display(), "Market file not found, starting empty");
                MarketTable::default()
            }
        };
        Ok(table)
    }

    pub fn find_by_name(&self, name: &str) -> StoreResult<Option<MarketRecord>> {
        Ok(self.load_table()?.find(name))
    }

    pub fn contains(&self, name: &str) -> StoreResult<bool> {
        Ok(self.load_table()?.contains(name))
    }

    /// All parseable records.
    pub fn list(&self) -> StoreResult<Vec<MarketRecord>> {
        Ok(self.load_table()?.records())
    }

    /// Append one market and rewrite the file.
    pub fn add(&self, record: &MarketRecord) -> StoreResult<()> {
        let mut table = self.load_table()?;
        table.append(record);
        self.save(&table)?;
        info!(market = %record.name, "Market appended");
        Ok(())
    }

    /// Replace one market's line and rewrite the file. No-op if absent.
    pub fn update(&self, record: &MarketRecord) -> StoreResult<bool> {
        let mut table = self.load_table()?;
        if !table.replace(record) {
            debug!(market = %record.name, "Update skipped, market not present");
            return Ok(false);
        }
        self.save(&table)?;
        info!(market = %record.name, "Market replaced");
        Ok(true)
    }

    /// Remove every line for a market and rewrite the file.
    pub fn remove(&self, name: &str) -> StoreResult<usize> {
        let mut table = self.load_table()?;
        let removed = table.remove(name);
        self.save(&table)?;
        info!(market = %name, removed, "Market removed");
        Ok(removed)
    }

    /// Full-file rewrite.
    pub fn save(&self, table: &MarketTable) -> StoreResult<()> {
        write_synced(&self.path, &table.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvol_core::MetricStats;
    use tempfile::TempDir;

    fn record(name: &str, sd: f64) -> MarketRecord {
        MarketRecord::new(
            name,
            MetricStats::new(sd, 1.0, 1.0, vec![1.0, 2.0]),
            MetricStats::new(sd, 2.0, 2.0, vec![3.0, 4.0]),
            MetricStats::new(sd, 3.0, 3.0, vec![5.0, 6.0]),
        )
    }

    fn store(dir: &TempDir) -> MarketStore {
        MarketStore::new(dir.path().join("Markets.txt"))
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(store.load_table().unwrap().is_empty());
        assert_eq!(store.find_by_name("Austin").unwrap(), None);
    }

    #[test]
    fn test_add_and_find() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.add(&record("Austin", 0.5)).unwrap();
        store.add(&record("Boise", 0.7)).unwrap();

        assert_eq!(store.find_by_name("Boise").unwrap(), Some(record("Boise", 0.7)));
        assert_eq!(store.find_by_name(" Austin ").unwrap(), Some(record("Austin", 0.5)));
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn test_exact_name_match() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.add(&record("Austin Metro", 0.5)).unwrap();

        assert_eq!(store.find_by_name("Austin").unwrap(), None);
        assert_eq!(store.find_by_name("austin metro").unwrap(), None);
        assert!(store.contains("Austin Metro").unwrap());
    }

    #[test]
    fn test_update_in_place() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.add(&record("Austin", 0.5)).unwrap();
        store.add(&record("Boise", 0.7)).unwrap();

        assert!(store.update(&record("Austin", 9.0)).unwrap());
        let table = store.load_table().unwrap();
        assert_eq!(name_token(&table.lines()[0]), Some("Austin"));
        assert_eq!(table.find("Austin").unwrap().vacancy.std_dev, 9.0);
        assert_eq!(table.find("Boise"), Some(record("Boise", 0.7)));
    }

    #[test]
    fn test_update_missing_is_noop() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.add(&record("Austin", 0.5)).unwrap();
        let before = std::fs::read_to_string(store.path()).unwrap();

        assert!(!store.update(&record("Boise", 1.0)).unwrap());
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn test_remove_all_matching_lines() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.add(&record("Austin", 0.5)).unwrap();
        store.add(&record("Boise", 0.7)).unwrap();
        store.add(&record("Austin", 0.9)).unwrap();

        assert_eq!(store.remove("Austin").unwrap(), 2);
        assert_eq!(store.find_by_name("Austin").unwrap(), None);
        assert!(store.contains("Boise").unwrap());
    }

    #[test]
    fn test_malformed_line_is_skipped() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let good = encode_market_line(&record("Austin", 0.5));
        let bad = good.replace("Cap Rate: 0.5", "Cap Rate: zero");
        std::fs::write(store.path(), format!("{bad}\n\n{good}\n")).unwrap();

        let table = store.load_table().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.find("Austin"), Some(record("Austin", 0.5)));
        assert_eq!(table.records().len(), 1);
    }

    #[test]
    fn test_malformed_only_line_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        std::fs::write(store.path(), "Austin: Standard Deviation of: Vacancy: x |\n").unwrap();

        assert!(store.contains("Austin").unwrap());
        assert_eq!(store.find_by_name("Austin").unwrap(), None);
    }

    #[test]
    fn test_replace_targets_decodable_duplicate() {
        let good = encode_market_line(&record("Austin", 0.5));
        let bad = good.replace("Cap Rate: 0.5", "Cap Rate: zero");
        let mut table = MarketTable::parse(&format!("{bad}\n{good}\n"));

        assert_eq!(table.position("Austin").map(|(i, _)| i), Some(1));
        assert!(table.replace(&record("Austin", 9.0)));
        assert_eq!(table.lines()[0], bad);
        assert_eq!(table.find("Austin").unwrap().vacancy.std_dev, 9.0);
        assert_eq!(table.records().len(), 1);
    }

    #[test]
    fn test_replace_skips_malformed_only_line() {
        let bad = encode_market_line(&record("Austin", 0.5)).replace("Cap Rate: 0.5", "Cap Rate: zero");
        let mut table = MarketTable::parse(&bad);
        assert!(!table.replace(&record("Austin", 9.0)));
        assert_eq!(table.lines()[0], bad);
    }

    #[test]
    fn test_render_trailing_newline() {
        let mut table = MarketTable::default();
        assert_eq!(table.render(), "");
        table.append(&record("Austin", 0.5));
        assert!(table.render().ends_with("|\n"));
    }
}
