use serde::{Deserialize, Serialize};

pub const STARTING_HP: u32 = 7;
pub const STARTING_ENERGY: u32 = 2;
/// Rounds that are a multiple of this grant the opponent one bonus energy.
pub const BONUS_INTERVAL: u32 = 3;
pub const BONUS_ENERGY: u32 = 1;
/// Extra damage Iron Wall reflects onto a player who attacked into it.
pub const DEFLECTION_DAMAGE: u32 = 1;

/// Starting values for a fresh game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRules {
    pub starting_hp: u32,
    pub starting_energy: u32,
}

impl GameRules {
    pub const fn standard() -> Self {
        Self {
            starting_hp: STARTING_HP,
            starting_energy: STARTING_ENERGY,
        }
    }

    /// Same rules with the starting HP raised to at least 1, so a fresh
    /// game is never over before it begins.
    pub const fn playable(self) -> Self {
        Self {
            starting_hp: if self.starting_hp == 0 { 1 } else { self.starting_hp },
            starting_energy: self.starting_energy,
        }
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::{GameRules, STARTING_ENERGY};

    #[test]
    fn standard_rules_start_at_seven_hp_and_two_energy() {
        let rules = GameRules::default();
        assert_eq!(rules.starting_hp, 7);
        assert_eq!(rules.starting_energy, 2);
    }

    #[test]
    fn playable_raises_zero_hp_only() {
        let zero = GameRules {
            starting_hp: 0,
            starting_energy: STARTING_ENERGY,
        };
        assert_eq!(zero.playable().starting_hp, 1);
        assert_eq!(zero.playable().starting_energy, STARTING_ENERGY);
        assert_eq!(GameRules::standard().playable(), GameRules::standard());
    }
}
