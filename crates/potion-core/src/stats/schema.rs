use super::{StatsState, zeroed_catalog};
use crate::model::card::CardKind;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use tracing::{Level, event};

/// Bump when the stored layout changes incompatibly; old keys are then
/// simply never read again.
pub const SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_NAMESPACE: &str = "lovePotion";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub global_counts: String,
    pub global_total: String,
    pub conditional_counts: String,
    pub energy_occurrences: String,
}

impl StorageKeys {
    pub fn new(namespace: &str) -> Self {
        Self {
            global_counts: format!("{namespace}_globalCounts_v{SCHEMA_VERSION}"),
            global_total: format!("{namespace}_globalTotal_v{SCHEMA_VERSION}"),
            conditional_counts: format!("{namespace}_conditionalCounts_v{SCHEMA_VERSION}"),
            energy_occurrences: format!("{namespace}_energyOccurrences_v{SCHEMA_VERSION}"),
        }
    }

    pub fn all(&self) -> [&str; 4] {
        [
            self.global_counts.as_str(),
            self.global_total.as_str(),
            self.conditional_counts.as_str(),
            self.energy_occurrences.as_str(),
        ]
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

/// A stored sub-key that could not be used and was replaced by its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anomaly {
    pub key: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotalRepair {
    pub stored: u64,
    pub healed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub stats: StatsState,
    pub anomalies: Vec<Anomaly>,
    pub total_repair: Option<TotalRepair>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty() && self.total_repair.is_none()
    }
}

/// Raw stored strings, one per sub-key; `None` means the key was never written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawStats {
    pub global_counts: Option<String>,
    pub global_total: Option<String>,
    pub conditional_counts: Option<String>,
    pub energy_occurrences: Option<String>,
}

pub fn encode(keys: &StorageKeys, stats: &StatsState) -> Vec<(String, serde_json::Result<String>)> {
    vec![
        (
            keys.global_counts.clone(),
            serde_json::to_string(stats.global_counts()),
        ),
        (keys.global_total.clone(), Ok(stats.global_total().to_string())),
        (
            keys.conditional_counts.clone(),
            serde_json::to_string(stats.conditional_counts()),
        ),
        (
            keys.energy_occurrences.clone(),
            serde_json::to_string(stats.all_energy_occurrences()),
        ),
    ]
}

/// Each sub-key falls back to its default on its own; one bad value never
/// discards the others.
pub fn decode(keys: &StorageKeys, raw: RawStats, mut anomalies: Vec<Anomaly>) -> LoadReport {
    let mut global_counts = parse_json::<BTreeMap<CardKind, u64>>(
        &keys.global_counts,
        raw.global_counts.as_deref(),
        &mut anomalies,
    )
    .unwrap_or_else(zeroed_catalog);

    if let Some(missing) = CardKind::ALL
        .iter()
        .find(|card| !global_counts.contains_key(*card))
    {
        anomalies.push(Anomaly {
            key: keys.global_counts.clone(),
            reason: format!("missing catalog entry '{missing}'"),
        });
        global_counts = zeroed_catalog();
    }

    let global_total = match raw.global_total.as_deref() {
        None => 0,
        Some(text) => match text.trim().parse::<u64>() {
            Ok(total) => total,
            Err(err) => {
                anomalies.push(Anomaly {
                    key: keys.global_total.clone(),
                    reason: format!("not a non-negative integer: {err}"),
                });
                0
            }
        },
    };

    let conditional = parse_json::<BTreeMap<u32, BTreeMap<CardKind, u64>>>(
        &keys.conditional_counts,
        raw.conditional_counts.as_deref(),
        &mut anomalies,
    )
    .unwrap_or_default();

    let occurrences = parse_json::<BTreeMap<u32, u64>>(
        &keys.energy_occurrences,
        raw.energy_occurrences.as_deref(),
        &mut anomalies,
    )
    .unwrap_or_default();

    let mut stats = StatsState::from_parts(global_counts, global_total, occurrences, conditional);
    let total_repair = stats.reconcile();

    for anomaly in &anomalies {
        event!(
            target: "potion_core::stats",
            Level::WARN,
            key = %anomaly.key,
            reason = %anomaly.reason,
            "stored statistics were unusable; using defaults"
        );
    }
    if let Some(repair) = total_repair {
        event!(
            target: "potion_core::stats",
            Level::WARN,
            stored = repair.stored,
            healed = repair.healed,
            "adjusting loaded total plays to match per-card counts"
        );
    }

    LoadReport {
        stats,
        anomalies,
        total_repair,
    }
}

fn parse_json<T: DeserializeOwned>(
    key: &str,
    raw: Option<&str>,
    anomalies: &mut Vec<Anomaly>,
) -> Option<T> {
    let text = raw?;
    match serde_json::from_str::<T>(text) {
        Ok(value) => Some(value),
        Err(err) => {
            anomalies.push(Anomaly {
                key: key.to_string(),
                reason: err.to_string(),
            });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RawStats, StorageKeys, decode, encode};
    use crate::model::card::CardKind;
    use crate::stats::StatsState;

    fn raw_from(keys: &StorageKeys, stats: &StatsState) -> RawStats {
        let mut raw = RawStats::default();
        for (key, value) in encode(keys, stats) {
            let value = Some(value.unwrap());
            if key == keys.global_counts {
                raw.global_counts = value;
            } else if key == keys.global_total {
                raw.global_total = value;
            } else if key == keys.conditional_counts {
                raw.conditional_counts = value;
            } else {
                raw.energy_occurrences = value;
            }
        }
        raw
    }

    #[test]
    fn keys_are_versioned_and_namespaced() {
        let keys = StorageKeys::default();
        assert_eq!(keys.global_counts, "lovePotion_globalCounts_v1");
        assert_eq!(keys.global_total, "lovePotion_globalTotal_v1");
        assert_eq!(keys.conditional_counts, "lovePotion_conditionalCounts_v1");
        assert_eq!(keys.energy_occurrences, "lovePotion_energyOccurrences_v1");
        assert_eq!(StorageKeys::new("test").all()[1], "test_globalTotal_v1");
    }

    #[test]
    fn energy_levels_are_stored_as_string_keys() {
        let keys = StorageKeys::default();
        let mut stats = StatsState::new();
        stats.record_play(CardKind::DeepLove, 3);
        let raw = raw_from(&keys, &stats);
        assert_eq!(raw.energy_occurrences.as_deref(), Some(r#"{"3":1}"#));
        assert_eq!(
            raw.conditional_counts.as_deref(),
            Some(r#"{"3":{"Deep Love":1}}"#)
        );
        assert_eq!(raw.global_total.as_deref(), Some("1"));
    }

    #[test]
    fn missing_keys_load_defaults_without_anomalies() {
        let report = decode(&StorageKeys::default(), RawStats::default(), Vec::new());
        assert!(report.is_clean());
        assert_eq!(report.stats, StatsState::new());
    }

    #[test]
    fn encoded_stats_decode_unchanged() {
        let keys = StorageKeys::default();
        let mut stats = StatsState::new();
        stats.record_play(CardKind::FirstLove, 2);
        stats.record_play(CardKind::MagicBoost, 0);
        stats.record_play(CardKind::IronWall, 3);

        let report = decode(&keys, raw_from(&keys, &stats), Vec::new());
        assert!(report.is_clean());
        assert_eq!(report.stats, stats);
    }

    #[test]
    fn corrupt_sub_keys_fall_back_independently() {
        let keys = StorageKeys::default();
        let mut stats = StatsState::new();
        stats.record_play(CardKind::ColdWall, 1);
        let mut raw = raw_from(&keys, &stats);
        raw.conditional_counts = Some("{not json".to_string());
        raw.energy_occurrences = Some(r#"{"-1": 3}"#.to_string());

        let report = decode(&keys, raw, Vec::new());
        assert_eq!(report.anomalies.len(), 2);
        assert_eq!(report.anomalies[0].key, keys.conditional_counts);
        assert_eq!(report.anomalies[1].key, keys.energy_occurrences);
        assert_eq!(report.stats.global_count(CardKind::ColdWall), 1);
        assert_eq!(report.stats.global_total(), 1);
        assert!(report.stats.conditional_counts().is_empty());
        assert!(report.stats.all_energy_occurrences().is_empty());
    }

    #[test]
    fn global_counts_missing_a_catalog_card_are_rejected() {
        let keys = StorageKeys::default();
        let raw = RawStats {
            global_counts: Some(r#"{"First Love": 4}"#.to_string()),
            global_total: Some("4".to_string()),
            ..RawStats::default()
        };
        let report = decode(&keys, raw, Vec::new());
        assert_eq!(report.anomalies.len(), 1);
        assert!(report.anomalies[0].reason.contains("Deep Love"));
        assert_eq!(report.stats.global_count(CardKind::FirstLove), 0);
        // Counts were reset to zero, so the stored scalar survives.
        assert_eq!(report.stats.global_total(), 4);
    }

    #[test]
    fn unknown_card_names_make_global_counts_corrupt() {
        let keys = StorageKeys::default();
        let raw = RawStats {
            global_counts: Some(
                r#"{"First Love":1,"Deep Love":0,"Cold Wall":0,"Iron Wall":0,"Magic Boost":0,"Love Letter":2}"#
                    .to_string(),
            ),
            ..RawStats::default()
        };
        let report = decode(&keys, raw, Vec::new());
        assert_eq!(report.anomalies.len(), 1);
        assert_eq!(report.stats, StatsState::new());
    }

    #[test]
    fn total_is_healed_from_counts() {
        let keys = StorageKeys::default();
        let mut stats = StatsState::new();
        stats.record_play(CardKind::FirstLove, 2);
        stats.record_play(CardKind::FirstLove, 2);
        let mut raw = raw_from(&keys, &stats);
        raw.global_total = Some("17".to_string());

        let report = decode(&keys, raw, Vec::new());
        assert!(report.anomalies.is_empty());
        let repair = report.total_repair.expect("repair recorded");
        assert_eq!((repair.stored, repair.healed), (17, 2));
        assert_eq!(report.stats.global_total(), 2);
    }

    #[test]
    fn negative_total_is_corrupt() {
        let keys = StorageKeys::default();
        let raw = RawStats {
            global_total: Some("-3".to_string()),
            ..RawStats::default()
        };
        let report = decode(&keys, raw, Vec::new());
        assert_eq!(report.anomalies.len(), 1);
        assert_eq!(report.stats.global_total(), 0);
    }
}
