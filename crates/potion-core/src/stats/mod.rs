//! Lifetime play statistics for the opponent.
//!
//! This module is composed of:
//! - `table`: probability rows derived from the raw counts for display.
//! - `schema`: the versioned storage layout and load-time reconciliation.
//! - `store`: the key-value store seam and the gateway that persists stats through it.

pub mod schema;
pub mod store;
mod table;

pub use schema::{Anomaly, LoadReport, StorageKeys, TotalRepair};
pub use store::{
    KeyValueStore, MemoryStore, PersistenceError, StatsGateway, StatsRepository, StoreError,
};
pub use table::{ProbabilityRow, ProbabilityTable, percent};

use crate::model::card::CardKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{Level, event};

/// Global and energy-conditioned play counts.
///
/// Energy levels are the opponent's available energy at the moment the card
/// was chosen (bonus included), so a table answers "what did the opponent
/// play when it had N energy".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsState {
    global_play_counts: BTreeMap<CardKind, u64>,
    global_total_plays: u64,
    energy_occurrences: BTreeMap<u32, u64>,
    conditional_play_counts: BTreeMap<u32, BTreeMap<CardKind, u64>>,
}

impl StatsState {
    pub fn new() -> Self {
        Self {
            global_play_counts: zeroed_catalog(),
            global_total_plays: 0,
            energy_occurrences: BTreeMap::new(),
            conditional_play_counts: BTreeMap::new(),
        }
    }

    pub(crate) fn from_parts(
        global_play_counts: BTreeMap<CardKind, u64>,
        global_total_plays: u64,
        energy_occurrences: BTreeMap<u32, u64>,
        conditional_play_counts: BTreeMap<u32, BTreeMap<CardKind, u64>>,
    ) -> Self {
        Self {
            global_play_counts,
            global_total_plays,
            energy_occurrences,
            conditional_play_counts,
        }
    }

    pub fn record_play(&mut self, card: CardKind, energy: u32) {
        *self.global_play_counts.entry(card).or_insert(0) += 1;
        self.global_total_plays += 1;
        *self.energy_occurrences.entry(energy).or_insert(0) += 1;
        *self
            .conditional_play_counts
            .entry(energy)
            .or_default()
            .entry(card)
            .or_insert(0) += 1;

        event!(
            target: "potion_core::stats",
            Level::DEBUG,
            card = %card,
            energy,
            total = self.global_total_plays,
            "recorded play"
        );
    }

    /// Zero every counter. Calling it again changes nothing.
    pub fn reset_all(&mut self) {
        *self = Self::new();
    }

    pub fn global_count(&self, card: CardKind) -> u64 {
        self.global_play_counts.get(&card).copied().unwrap_or(0)
    }

    pub fn global_total(&self) -> u64 {
        self.global_total_plays
    }

    pub fn global_counts(&self) -> &BTreeMap<CardKind, u64> {
        &self.global_play_counts
    }

    pub fn energy_occurrences(&self, energy: u32) -> u64 {
        self.energy_occurrences.get(&energy).copied().unwrap_or(0)
    }

    pub fn all_energy_occurrences(&self) -> &BTreeMap<u32, u64> {
        &self.energy_occurrences
    }

    pub fn conditional_count(&self, energy: u32, card: CardKind) -> u64 {
        self.conditional_play_counts
            .get(&energy)
            .and_then(|counts| counts.get(&card))
            .copied()
            .unwrap_or(0)
    }

    pub fn conditional_counts(&self) -> &BTreeMap<u32, BTreeMap<CardKind, u64>> {
        &self.conditional_play_counts
    }

    /// Energy levels with at least one observed round, ascending.
    pub fn observed_energies(&self) -> impl Iterator<Item = u32> + '_ {
        self.energy_occurrences
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(energy, _)| *energy)
    }

    pub fn global_probability(&self, card: CardKind) -> Option<f64> {
        percent(self.global_count(card), self.global_total_plays)
    }

    pub fn conditional_probability(&self, energy: u32, card: CardKind) -> Option<f64> {
        percent(
            self.conditional_count(energy, card),
            self.energy_occurrences(energy),
        )
    }

    pub fn global_table(&self) -> ProbabilityTable {
        ProbabilityTable::build(self.global_total_plays, true, |card| {
            self.global_count(card)
        })
    }

    /// Only cards actually seen at `energy` get a row.
    pub fn conditional_table(&self, energy: u32) -> ProbabilityTable {
        ProbabilityTable::build(self.energy_occurrences(energy), false, |card| {
            self.conditional_count(energy, card)
        })
    }

    pub fn counts_sum(&self) -> u64 {
        self.global_play_counts.values().sum()
    }

    /// Restore catalog keys and heal the stored total from the per-card counts.
    pub fn reconcile(&mut self) -> Option<TotalRepair> {
        for card in CardKind::ALL {
            self.global_play_counts.entry(card).or_insert(0);
        }

        let sum = self.counts_sum();
        if sum > 0 && sum != self.global_total_plays {
            let repair = TotalRepair {
                stored: self.global_total_plays,
                healed: sum,
            };
            self.global_total_plays = sum;
            return Some(repair);
        }
        None
    }
}

impl Default for StatsState {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn zeroed_catalog() -> BTreeMap<CardKind, u64> {
    CardKind::ALL.iter().map(|card| (*card, 0)).collect()
}
