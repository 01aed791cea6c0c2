use potion_core::game::session::{GameSession, RoundError, RoundResolution, Selection, clear_stats};
use potion_core::model::card::CardKind;
use potion_core::model::energy::affordable;
use potion_core::model::rules::GameRules;
use potion_core::stats::{
    Anomaly, PersistenceError, ProbabilityTable, StatsGateway, StatsState, TotalRepair,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("not enough energy for '{card}': needs {cost}, opponent has {available}")]
    Unaffordable {
        card: CardKind,
        cost: u32,
        available: u32,
    },
    #[error(transparent)]
    Round(#[from] RoundError),
}

/// Binds the current game, the lifetime statistics and where they are saved.
pub struct Tracker<G> {
    session: GameSession,
    stats: StatsState,
    gateway: G,
    load_anomalies: Vec<Anomaly>,
    total_repair: Option<TotalRepair>,
}

impl<G: StatsGateway> Tracker<G> {
    pub fn open(rules: GameRules, mut gateway: G) -> Self {
        let report = gateway.load();
        Self {
            session: GameSession::with_rules(rules),
            stats: report.stats,
            gateway,
            load_anomalies: report.anomalies,
            total_repair: report.total_repair,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn stats(&self) -> &StatsState {
        &self.stats
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn load_anomalies(&self) -> &[Anomaly] {
        &self.load_anomalies
    }

    pub fn total_repair(&self) -> Option<TotalRepair> {
        self.total_repair
    }

    /// Every catalog card with whether the opponent can afford it this round.
    pub fn card_options(&self) -> Vec<(CardKind, bool)> {
        let available = self.session.available_energy();
        CardKind::ALL
            .iter()
            .map(|card| (*card, affordable(available, card.card())))
            .collect()
    }

    pub fn select(&mut self, card: CardKind) -> Result<Selection, TrackerError> {
        if self.session.is_game_over() {
            return Err(RoundError::GameOver.into());
        }
        let available = self.session.available_energy();
        if !affordable(available, card.card()) {
            self.session.clear_selection();
            return Err(TrackerError::Unaffordable {
                card,
                cost: card.card().cost,
                available,
            });
        }
        Ok(self.session.select_card(card)?)
    }

    pub fn answer_attack(&mut self, attacked: bool) -> Result<(), TrackerError> {
        Ok(self.session.supply_attack_flag(attacked)?)
    }

    pub fn confirm(&mut self) -> Result<RoundResolution, TrackerError> {
        Ok(self
            .session
            .confirm_round(&mut self.stats, &mut self.gateway)?)
    }

    pub fn cancel(&mut self) {
        self.session.clear_selection();
    }

    pub fn reset_game(&mut self) {
        self.session.reset();
    }

    /// Irreversible; the caller must have asked the user first.
    pub fn clear_stats(&mut self) -> Result<(), PersistenceError> {
        clear_stats(&mut self.stats, &mut self.gateway)
    }

    /// What the opponent has played before at the energy it holds right now.
    pub fn conditional_now(&self) -> ProbabilityTable {
        self.stats.conditional_table(self.session.available_energy())
    }
}

#[cfg(test)]
mod tests {
    use super::{Tracker, TrackerError};
    use potion_core::game::session::{RoundError, Selection};
    use potion_core::model::card::CardKind;
    use potion_core::model::rules::GameRules;
    use potion_core::stats::{MemoryStore, StatsGateway, StatsRepository, StorageKeys};

    fn tracker() -> Tracker<StatsRepository<MemoryStore>> {
        Tracker::open(GameRules::standard(), StatsRepository::new(MemoryStore::new()))
    }

    #[test]
    fn unaffordable_cards_are_refused_at_selection() {
        let mut tracker = tracker();
        match tracker.select(CardKind::DeepLove) {
            Err(TrackerError::Unaffordable {
                card: CardKind::DeepLove,
                cost: 3,
                available: 2,
            }) => {}
            other => panic!("expected Unaffordable, got {other:?}"),
        }
        assert!(tracker.session().selected().is_none());

        let options = tracker.card_options();
        assert!(options.contains(&(CardKind::MagicBoost, true)));
        assert!(options.contains(&(CardKind::IronWall, true)));
        assert!(options.contains(&(CardKind::DeepLove, false)));
    }

    #[test]
    fn refused_selection_drops_the_earlier_one() {
        let mut tracker = tracker();
        tracker.select(CardKind::IronWall).unwrap();
        tracker.answer_attack(true).unwrap();

        assert!(matches!(
            tracker.select(CardKind::DeepLove),
            Err(TrackerError::Unaffordable { .. })
        ));
        assert!(tracker.session().selected().is_none());
        assert!(matches!(
            tracker.confirm(),
            Err(TrackerError::Round(RoundError::MissingSelection))
        ));
        assert_eq!(tracker.stats().global_total(), 0);
    }

    #[test]
    fn confirmed_rounds_are_saved_through_the_gateway() {
        let mut tracker = tracker();
        tracker.select(CardKind::FirstLove).unwrap();
        let resolution = tracker.confirm().unwrap();
        assert!(resolution.persistence.is_none());

        let keys = StorageKeys::default();
        assert_eq!(
            tracker.gateway().store().raw(&keys.global_total),
            Some("1")
        );
    }

    #[test]
    fn iron_wall_flow_needs_an_answer() {
        let mut tracker = tracker();
        assert_eq!(
            tracker.select(CardKind::IronWall).unwrap(),
            Selection::NeedsAttackFlag
        );
        assert!(matches!(
            tracker.confirm(),
            Err(TrackerError::Round(RoundError::UnresolvedConditionalPrompt))
        ));
        tracker.answer_attack(false).unwrap();
        let resolution = tracker.confirm().unwrap();
        assert_eq!(resolution.damage, 0);
    }

    #[test]
    fn opening_reports_corrupt_stored_data() {
        let keys = StorageKeys::default();
        let mut store = MemoryStore::new();
        store.insert_raw(keys.energy_occurrences.clone(), "oops");
        let tracker = Tracker::open(GameRules::standard(), StatsRepository::new(store));
        assert_eq!(tracker.load_anomalies().len(), 1);
        assert_eq!(tracker.load_anomalies()[0].key, keys.energy_occurrences);
    }

    #[test]
    fn clearing_stats_keeps_the_game_going() {
        let mut tracker = tracker();
        tracker.select(CardKind::MagicBoost).unwrap();
        tracker.confirm().unwrap();
        tracker.clear_stats().unwrap();

        assert_eq!(tracker.stats().global_total(), 0);
        assert_eq!(tracker.session().round(), 2);
        let mut gateway = StatsRepository::new(tracker.gateway().store().clone());
        assert_eq!(gateway.load().stats.global_total(), 0);
    }

    #[test]
    fn conditional_now_follows_available_energy() {
        let mut tracker = tracker();
        tracker.select(CardKind::FirstLove).unwrap();
        tracker.confirm().unwrap();
        tracker.reset_game();

        let table = tracker.conditional_now();
        assert_eq!(table.denominator, 1);
        assert_eq!(table.row(CardKind::FirstLove).map(|r| r.percent), Some(100.0));
    }
}
