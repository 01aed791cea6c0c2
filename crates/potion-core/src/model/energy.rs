use crate::model::card::Card;
use crate::model::rules::{BONUS_ENERGY, BONUS_INTERVAL};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EnergyError {
    #[error("insufficient energy: {cost} required, {available} available")]
    Insufficient { available: u32, cost: u32 },
}

pub const fn grants_bonus(round: u32) -> bool {
    round >= BONUS_INTERVAL && round % BONUS_INTERVAL == 0
}

/// Energy the opponent can spend in `round`, given what was carried over
/// from the previous round.
pub const fn available_energy_for_round(round: u32, carried: u32) -> u32 {
    if grants_bonus(round) {
        carried.saturating_add(BONUS_ENERGY)
    } else {
        carried
    }
}

pub const fn affordable(available: u32, card: Card) -> bool {
    card.kind.gains_energy() || available >= card.cost
}

pub fn energy_after_play(available: u32, card: Card) -> Result<u32, EnergyError> {
    if card.kind.gains_energy() {
        return Ok(available.saturating_add(card.gain));
    }
    available
        .checked_sub(card.cost)
        .ok_or(EnergyError::Insufficient {
            available,
            cost: card.cost,
        })
}
