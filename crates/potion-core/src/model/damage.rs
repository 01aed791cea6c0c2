use crate::model::card::CardKind;
use crate::model::rules::DEFLECTION_DAMAGE;
use serde::{Deserialize, Serialize};

/// Whether the player attacked during the round. Only consulted for Iron Wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttackFlag {
    #[default]
    Unknown,
    Attacked,
    Held,
}

impl AttackFlag {
    pub const fn is_known(self) -> bool {
        !matches!(self, AttackFlag::Unknown)
    }

    pub const fn attacked(self) -> bool {
        matches!(self, AttackFlag::Attacked)
    }
}

impl From<bool> for AttackFlag {
    fn from(attacked: bool) -> Self {
        if attacked {
            AttackFlag::Attacked
        } else {
            AttackFlag::Held
        }
    }
}

impl CardKind {
    pub const fn damage_taken(self, flag: AttackFlag) -> u32 {
        let base = self.card().damage;
        if matches!(self, CardKind::IronWall) && flag.attacked() {
            base + DEFLECTION_DAMAGE
        } else {
            base
        }
    }
}

/// Damage dealt to the player by a card named `card_name`. Names outside
/// the catalog deal nothing.
pub fn damage_taken(card_name: &str, player_attacked: bool) -> u32 {
    CardKind::from_name(card_name)
        .map(|kind| kind.damage_taken(AttackFlag::from(player_attacked)))
        .unwrap_or(0)
}
