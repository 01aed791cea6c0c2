use crate::model::card::CardKind;
use crate::model::damage::AttackFlag;
use crate::model::energy::{EnergyError, available_energy_for_round, energy_after_play};
use crate::model::history::{History, HistoryEntry};
use crate::model::rules::GameRules;
use crate::stats::{PersistenceError, StatsGateway, StatsState};
use thiserror::Error;
use tracing::{Level, event};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    AwaitingSelection,
    /// Iron Wall is selected and the player has not said whether they attacked.
    AwaitingAttackFlag,
    AwaitingConfirmation,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Ready,
    NeedsAttackFlag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RoundError {
    #[error("the game is over; reset to start a new one")]
    GameOver,
    #[error("no card selected")]
    MissingSelection,
    #[error("Iron Wall needs to know whether the player attacked")]
    UnresolvedConditionalPrompt,
    #[error("no attack question is pending")]
    NoPendingPrompt,
    #[error("insufficient energy: {cost} required, {available} available")]
    InsufficientEnergy { available: u32, cost: u32 },
}

impl From<EnergyError> for RoundError {
    fn from(value: EnergyError) -> Self {
        match value {
            EnergyError::Insufficient { available, cost } => {
                RoundError::InsufficientEnergy { available, cost }
            }
        }
    }
}

/// What a confirmed round did.
#[derive(Debug)]
pub struct RoundResolution {
    pub entry: HistoryEntry,
    /// Energy the opponent had to spend this round; the statistics key.
    pub available_energy: u32,
    pub damage: u32,
    pub player_hp: u32,
    pub game_over: bool,
    /// Set when the statistics could not be saved. The round still counts.
    pub persistence: Option<PersistenceError>,
}

/// One game against one opponent. Statistics live outside the session and
/// survive `reset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    rules: GameRules,
    round: u32,
    opponent_energy: u32,
    player_hp: u32,
    selected: Option<CardKind>,
    attack: AttackFlag,
    history: History,
    game_over: bool,
}

impl GameSession {
    pub fn new() -> Self {
        Self::with_rules(GameRules::standard())
    }

    /// A starting HP of 0 is raised to 1.
    pub fn with_rules(rules: GameRules) -> Self {
        let rules = rules.playable();
        Self {
            rules,
            round: 1,
            opponent_energy: rules.starting_energy,
            player_hp: rules.starting_hp,
            selected: None,
            attack: AttackFlag::Unknown,
            history: History::new(),
            game_over: false,
        }
    }

    pub fn rules(&self) -> GameRules {
        self.rules
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// Energy carried into the current round, before any bonus.
    pub fn opponent_energy(&self) -> u32 {
        self.opponent_energy
    }

    pub fn available_energy(&self) -> u32 {
        available_energy_for_round(self.round, self.opponent_energy)
    }

    pub fn player_hp(&self) -> u32 {
        self.player_hp
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn selected(&self) -> Option<CardKind> {
        self.selected
    }

    pub fn attack_flag(&self) -> AttackFlag {
        self.attack
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn phase(&self) -> RoundPhase {
        if self.game_over {
            return RoundPhase::GameOver;
        }
        match self.selected {
            None => RoundPhase::AwaitingSelection,
            Some(card) if card.asks_for_attack() && !self.attack.is_known() => {
                RoundPhase::AwaitingAttackFlag
            }
            Some(_) => RoundPhase::AwaitingConfirmation,
        }
    }

    /// Affordability is checked by the caller before selecting; an
    /// unaffordable card is only caught at confirmation.
    pub fn select_card(&mut self, card: CardKind) -> Result<Selection, RoundError> {
        if self.game_over {
            return Err(RoundError::GameOver);
        }
        self.selected = Some(card);
        self.attack = AttackFlag::Unknown;
        if card.asks_for_attack() {
            Ok(Selection::NeedsAttackFlag)
        } else {
            Ok(Selection::Ready)
        }
    }

    pub fn supply_attack_flag(&mut self, attacked: bool) -> Result<(), RoundError> {
        if self.game_over {
            return Err(RoundError::GameOver);
        }
        match self.selected {
            Some(card) if card.asks_for_attack() => {
                self.attack = AttackFlag::from(attacked);
                Ok(())
            }
            _ => Err(RoundError::NoPendingPrompt),
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.attack = AttackFlag::Unknown;
    }

    pub fn confirm_round<G>(
        &mut self,
        stats: &mut StatsState,
        gateway: &mut G,
    ) -> Result<RoundResolution, RoundError>
    where
        G: StatsGateway + ?Sized,
    {
        if self.game_over {
            return Err(RoundError::GameOver);
        }
        let card = self.selected.ok_or(RoundError::MissingSelection)?;
        if card.asks_for_attack() && !self.attack.is_known() {
            return Err(RoundError::UnresolvedConditionalPrompt);
        }

        let available = self.available_energy();
        let energy_after = match energy_after_play(available, card.card()) {
            Ok(energy) => energy,
            Err(err) => {
                event!(
                    target: "potion_core::round",
                    Level::WARN,
                    round = self.round,
                    card = %card,
                    available,
                    "rejected play the opponent could not afford"
                );
                return Err(err.into());
            }
        };

        let damage = card.damage_taken(self.attack);
        self.player_hp = self.player_hp.saturating_sub(damage);

        let entry = HistoryEntry {
            round: self.round,
            card_played: card,
            energy_after_round: energy_after,
        };
        self.history.push(entry);

        stats.record_play(card, available);
        let persistence = gateway.save(stats).err();
        if let Some(err) = &persistence {
            event!(
                target: "potion_core::round",
                Level::WARN,
                round = self.round,
                error = %err,
                "statistics not saved; continuing"
            );
        }

        self.opponent_energy = energy_after;
        self.round += 1;
        self.clear_selection();
        if self.player_hp == 0 {
            self.game_over = true;
        }

        event!(
            target: "potion_core::round",
            Level::INFO,
            round = entry.round,
            card = %card,
            available,
            energy_after,
            damage,
            player_hp = self.player_hp,
            game_over = self.game_over,
            "round resolved"
        );

        Ok(RoundResolution {
            entry,
            available_energy: available,
            damage,
            player_hp: self.player_hp,
            game_over: self.game_over,
            persistence,
        })
    }

    /// Start a new game with the same rules. Statistics are not touched.
    pub fn reset(&mut self) {
        *self = Self::with_rules(self.rules);
        event!(target: "potion_core::round", Level::INFO, "game reset");
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Wipe all statistics and persist the empty state.
pub fn clear_stats<G>(stats: &mut StatsState, gateway: &mut G) -> Result<(), PersistenceError>
where
    G: StatsGateway + ?Sized,
{
    stats.reset_all();
    event!(target: "potion_core::stats", Level::INFO, "statistics cleared");
    gateway.save(stats)
}
