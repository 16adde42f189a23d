//! Append-only, deduplicated odds registry.
//!
//! Wagers vastly outnumber distinct odds settings, so a bet stores an
//! [`OddsIndex`] into its outcome's registry rather than a copy of the odds.
//! Entries are never removed or rewritten: every index ever handed out stays
//! dereferenceable, which is what keeps historical payouts computable.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use super::money::{Line, Odds};

/// 1-based position of a quote in its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OddsIndex(u32);

impl OddsIndex {
    /// Create an index from its 1-based position.
    ///
    /// # Errors
    /// Returns [`LedgerError::InvalidParam`] for zero.
    pub fn new(position: u32) -> Result<Self, LedgerError> {
        if position == 0 {
            return Err(LedgerError::invalid("odds_index", "indices are 1-based"));
        }
        Ok(Self(position))
    }

    /// The 1-based position.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    const fn slot(self) -> usize {
        self.0 as usize - 1
    }
}

impl fmt::Display for OddsIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An odds value together with an optional handicap line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quote {
    pub odds: Odds,
    pub line: Option<Line>,
}

impl Quote {
    /// A plain quote without a line.
    #[must_use]
    pub const fn plain(odds: Odds) -> Self {
        Self { odds, line: None }
    }

    /// A quote for a handicap-style market.
    #[must_use]
    pub const fn with_line(odds: Odds, line: Line) -> Self {
        Self {
            odds,
            line: Some(line),
        }
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} @ {line}", self.odds),
            None => write!(f, "{}", self.odds),
        }
    }
}

/// Result of [`OddsRegistry::set_active`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OddsUpdate {
    /// Index now active.
    pub index: OddsIndex,
    /// Whether the quote was new and appended.
    pub appended: bool,
}

/// Deduplicated quote history for one outcome of one market.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OddsRegistry {
    quotes: Vec<Quote>,
    index_of: HashMap<Quote, OddsIndex>,
    active: Option<OddsIndex>,
}

impl OddsRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from persisted parts.
    ///
    /// # Errors
    /// Returns [`LedgerError::InvalidParam`] if `quotes` holds duplicates or
    /// `active` points past the end.
    pub fn from_parts(quotes: Vec<Quote>, active: Option<OddsIndex>) -> Result<Self, LedgerError> {
        let mut index_of = HashMap::with_capacity(quotes.len());
        for (slot, quote) in quotes.iter().enumerate() {
            let index = OddsIndex(slot as u32 + 1);
            if index_of.insert(*quote, index).is_some() {
                return Err(LedgerError::invalid(
                    "odds_history",
                    format!("duplicate quote {quote}"),
                ));
            }
        }
        if let Some(active) = active {
            if active.slot() >= quotes.len() {
                return Err(LedgerError::invalid(
                    "odds_index",
                    format!("active index {active} past {} entries", quotes.len()),
                ));
            }
        }
        Ok(Self {
            quotes,
            index_of,
            active,
        })
    }

    /// Point new wagers at `quote`, appending it only if never seen before.
    pub fn set_active(&mut self, quote: Quote) -> OddsUpdate {
        if let Some(&index) = self.index_of.get(&quote) {
            self.active = Some(index);
            return OddsUpdate {
                index,
                appended: false,
            };
        }

        self.quotes.push(quote);
        let index = OddsIndex(self.quotes.len() as u32);
        self.index_of.insert(quote, index);
        self.active = Some(index);
        OddsUpdate {
            index,
            appended: true,
        }
    }

    /// Index new wagers lock in, if any odds were set.
    #[must_use]
    pub const fn active_index(&self) -> Option<OddsIndex> {
        self.active
    }

    /// Quote new wagers lock in, if any odds were set.
    #[must_use]
    pub fn current(&self) -> Option<Quote> {
        self.active.and_then(|index| self.get(index))
    }

    /// Dereference an index handed out earlier.
    #[must_use]
    pub fn get(&self, index: OddsIndex) -> Option<Quote> {
        self.quotes.get(index.slot()).copied()
    }

    /// Look up the index of a quote.
    #[must_use]
    pub fn index_of(&self, quote: &Quote) -> Option<OddsIndex> {
        self.index_of.get(quote).copied()
    }

    /// Full deduplicated history in first-seen order.
    #[must_use]
    pub fn history(&self) -> &[Quote] {
        &self.quotes
    }

    /// Number of distinct quotes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// True when no odds were ever set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(raw: u32) -> Quote {
        Quote::plain(Odds::try_new(raw).unwrap())
    }

    #[test]
    fn new_registry_has_no_active_odds() {
        let registry = OddsRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.current().is_none());
        assert!(registry.active_index().is_none());
    }

    #[test]
    fn repeated_value_reuses_index() {
        let mut registry = OddsRegistry::new();

        let first = registry.set_active(quote(20_000));
        let second = registry.set_active(quote(25_000));
        let again = registry.set_active(quote(20_000));

        assert!(first.appended);
        assert!(second.appended);
        assert!(!again.appended);
        assert_eq!(again.index, first.index);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.current(), Some(quote(20_000)));
    }

    #[test]
    fn setting_same_value_twice_is_idempotent() {
        let mut registry = OddsRegistry::new();
        registry.set_active(quote(30_000));
        let before = registry.clone();
        registry.set_active(quote(30_000));
        assert_eq!(registry, before);
    }

    #[test]
    fn old_indices_stay_valid() {
        let mut registry = OddsRegistry::new();
        let old = registry.set_active(quote(20_000)).index;
        for raw in [21_000, 22_000, 23_000, 20_000, 24_000] {
            registry.set_active(quote(raw));
        }
        assert_eq!(registry.get(old), Some(quote(20_000)));
        assert_eq!(registry.current(), Some(quote(24_000)));
    }

    #[test]
    fn line_distinguishes_quotes() {
        let mut registry = OddsRegistry::new();
        let odds = Odds::try_new(19_000).unwrap();
        registry.set_active(Quote::plain(odds));
        registry.set_active(Quote::with_line(odds, Line::new(-150)));
        registry.set_active(Quote::with_line(odds, Line::new(-150)));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.current().and_then(|q| q.line), Some(Line::new(-150)));
    }

    #[test]
    fn indices_are_one_based() {
        let mut registry = OddsRegistry::new();
        assert_eq!(registry.set_active(quote(20_000)).index.value(), 1);
        assert!(OddsIndex::new(0).is_err());
    }

    #[test]
    fn from_parts_rejects_duplicates() {
        let result = OddsRegistry::from_parts(vec![quote(20_000), quote(20_000)], None);
        assert!(matches!(result, Err(LedgerError::InvalidParam { .. })));
    }

    #[test]
    fn from_parts_rebuilds_lookup() {
        let registry = OddsRegistry::from_parts(
            vec![quote(20_000), quote(18_000)],
            Some(OddsIndex::new(2).unwrap()),
        )
        .unwrap();
        assert_eq!(registry.index_of(&quote(20_000)).map(OddsIndex::value), Some(1));
        assert_eq!(registry.current(), Some(quote(18_000)));
    }

    #[test]
    fn from_parts_rejects_dangling_active() {
        let dangling = Some(OddsIndex::new(2).unwrap());
        let result = OddsRegistry::from_parts(vec![quote(20_000)], dangling);
        assert!(result.is_err());
    }
}
