//! 1-based rank positions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 1-based position in a ranking list, displayed with its English suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ordinal(pub usize);

impl Ordinal {
    /// Build from a 0-based list index.
    pub fn from_index(index: usize) -> Self {
        Self(index + 1)
    }

    pub fn position(&self) -> usize {
        self.0
    }

    /// `st`, `nd`, `rd` or `th`; 11-13 (mod 100) always take `th`.
    pub fn suffix(&self) -> &'static str {
        let n = self.0;
        if (11..=13).contains(&(n % 100)) {
            return "th";
        }
        match n % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        }
    }
}

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0, self.suffix())
    }
}
