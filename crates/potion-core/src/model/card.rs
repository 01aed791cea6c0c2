use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every card the opponent can play, in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CardKind {
    #[serde(rename = "First Love")]
    FirstLove = 0,
    #[serde(rename = "Deep Love")]
    DeepLove = 1,
    #[serde(rename = "Cold Wall")]
    ColdWall = 2,
    #[serde(rename = "Iron Wall")]
    IronWall = 3,
    #[serde(rename = "Magic Boost")]
    MagicBoost = 4,
}

/// Immutable catalog entry for a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub kind: CardKind,
    pub cost: u32,
    pub gain: u32,
    pub damage: u32,
}

const CATALOG: [Card; 5] = [
    Card {
        kind: CardKind::FirstLove,
        cost: 1,
        gain: 0,
        damage: 1,
    },
    Card {
        kind: CardKind::DeepLove,
        cost: 3,
        gain: 0,
        damage: 3,
    },
    Card {
        kind: CardKind::ColdWall,
        cost: 1,
        gain: 0,
        damage: 0,
    },
    // Damage comes from deflection only, see `CardKind::damage_taken`.
    Card {
        kind: CardKind::IronWall,
        cost: 2,
        gain: 0,
        damage: 0,
    },
    Card {
        kind: CardKind::MagicBoost,
        cost: 0,
        gain: 2,
        damage: 0,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown card '{0}'")]
pub struct UnknownCard(pub String);

impl CardKind {
    pub const ALL: [CardKind; 5] = [
        CardKind::FirstLove,
        CardKind::DeepLove,
        CardKind::ColdWall,
        CardKind::IronWall,
        CardKind::MagicBoost,
    ];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(CardKind::FirstLove),
            1 => Some(CardKind::DeepLove),
            2 => Some(CardKind::ColdWall),
            3 => Some(CardKind::IronWall),
            4 => Some(CardKind::MagicBoost),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn card(self) -> Card {
        CATALOG[self.index()]
    }

    pub const fn name(self) -> &'static str {
        match self {
            CardKind::FirstLove => "First Love",
            CardKind::DeepLove => "Deep Love",
            CardKind::ColdWall => "Cold Wall",
            CardKind::IronWall => "Iron Wall",
            CardKind::MagicBoost => "Magic Boost",
        }
    }

    /// Exact catalog lookup by display name.
    pub fn from_name(name: &str) -> Result<Self, UnknownCard> {
        CardKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| UnknownCard(name.to_string()))
    }

    /// Only Magic Boost gains energy; every other card spends its cost.
    pub const fn gains_energy(self) -> bool {
        matches!(self, CardKind::MagicBoost)
    }

    pub const fn asks_for_attack(self) -> bool {
        matches!(self, CardKind::IronWall)
    }

    /// Catalog names sorted alphabetically, the order probability tables use.
    pub fn sorted_by_name() -> [CardKind; 5] {
        let mut kinds = CardKind::ALL;
        kinds.sort_by_key(|kind| kind.name());
        kinds
    }
}

/// Lenient parse used by text front-ends: case-insensitive, and `-`/`_`
/// are accepted in place of the space.
impl FromStr for CardKind {
    type Err = UnknownCard;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().replace(['-', '_'], " ").to_ascii_lowercase();
        CardKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().to_ascii_lowercase() == normalized)
            .ok_or_else(|| UnknownCard(value.trim().to_string()))
    }
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Card {
    pub fn lookup(name: &str) -> Result<Self, UnknownCard> {
        CardKind::from_name(name).map(CardKind::card)
    }

    pub const fn name(&self) -> &'static str {
        self.kind.name()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind.gains_energy() {
            write!(f, "{} (+{} energy)", self.name(), self.gain)
        } else {
            write!(f, "{} (cost {})", self.name(), self.cost)
        }
    }
}
