use std::collections::BTreeMap;

use crate::PlayRecord;

/// Play quantity tallied per player count.
///
/// Stored sparse; cells that were never touched are absent until
/// [`Histogram::normalize`] fills every gap below the highest populated
/// player count with zero. Index 0 holds plays with no recorded players.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Histogram {
    cells: BTreeMap<u32, u64>,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a histogram from a dense column where position is player count.
    pub fn from_dense(values: impl IntoIterator<Item = u64>) -> Self {
        let cells = (0u32..).zip(values).collect();
        Self { cells }
    }

    /// `None` means the cell was never set (as opposed to set to zero).
    pub fn get(&self, player_count: u32) -> Option<u64> {
        self.cells.get(&player_count).copied()
    }

    pub fn add(&mut self, player_count: u32, quantity: u64) {
        let cell = self.cells.entry(player_count).or_insert(0);
        *cell = cell.saturating_add(quantity);
    }

    pub fn fold(&mut self, records: &[PlayRecord]) {
        for record in records {
            self.add(record.player_count, record.quantity);
        }
    }

    pub fn normalize(&mut self) {
        if let Some(max) = self.max_index() {
            for index in 0..=max {
                self.cells.entry(index).or_insert(0);
            }
        }
    }

    pub fn is_normalized(&self) -> bool {
        match self.max_index() {
            Some(max) => self.cells.len() as u64 == u64::from(max) + 1,
            None => true,
        }
    }

    pub fn max_index(&self) -> Option<u32> {
        self.cells.keys().next_back().copied()
    }

    /// Dense column from 0 to the highest populated index, gaps as zero.
    pub fn to_dense(&self) -> Vec<u64> {
        match self.max_index() {
            Some(max) => (0..=max).map(|i| self.get(i).unwrap_or(0)).collect(),
            None => Vec::new(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.cells.iter().map(|(k, v)| (*k, *v))
    }

    pub fn total(&self) -> u64 {
        self.cells.values().fold(0u64, |acc, v| acc.saturating_add(*v))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Folds a page of records into `histogram`, returning the updated value.
pub fn fold(mut histogram: Histogram, records: &[PlayRecord]) -> Histogram {
    histogram.fold(records);
    histogram
}

/// Fills every missing cell up to the highest populated index with zero.
pub fn normalize(mut histogram: Histogram) -> Histogram {
    histogram.normalize();
    histogram
}
