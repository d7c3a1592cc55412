//! Home nations, trading partners, and the declarative bonus tables.
//!
//! All faction-specific rules live in lookup tables keyed by
//! (nation | faction, resource | building kind). Engines resolve a bonus once
//! per computation instead of branching on names.

use serde::{Deserialize, Serialize};

use crate::buildings::BuildingKind;
use crate::resources::ResourceKind;

/// The European power the colony belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nation {
    England,
    France,
    Netherlands,
    Spain,
}

/// A party the colony trades with and holds reputation against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FactionId {
    /// The home market, reached by ship.
    Crown,
    Arawak,
    Cherokee,
    Iroquois,
}

impl FactionId {
    pub const ALL: [FactionId; 4] = [Self::Crown, Self::Arawak, Self::Cherokee, Self::Iroquois];
    pub const NATIVES: [FactionId; 3] = [Self::Arawak, Self::Cherokee, Self::Iroquois];

    pub fn is_native(self) -> bool {
        self != Self::Crown
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Crown => "crown",
            Self::Arawak => "arawak",
            Self::Cherokee => "cherokee",
            Self::Iroquois => "iroquois",
        }
    }

    /// Goods this faction asks for in missions.
    pub fn wanted_goods(self) -> &'static [ResourceKind] {
        match self {
            Self::Crown => &[
                ResourceKind::Food,
                ResourceKind::Wood,
                ResourceKind::Fur,
                ResourceKind::Sugar,
                ResourceKind::Tobacco,
                ResourceKind::Silver,
            ],
            Self::Arawak => &[ResourceKind::Tools, ResourceKind::Cloth],
            Self::Cherokee => &[ResourceKind::Tools, ResourceKind::Iron, ResourceKind::Food],
            Self::Iroquois => &[ResourceKind::Cloth, ResourceKind::Tools, ResourceKind::Wood],
        }
    }
}

/// Production multiplier per (nation, resource). Unlisted pairs are 1.0.
const PRODUCTION_BONUS: &[(Nation, ResourceKind, f64)] = &[
    (Nation::England, ResourceKind::Food, 1.10),
    (Nation::France, ResourceKind::Fur, 1.25),
    (Nation::Netherlands, ResourceKind::Cloth, 1.15),
    (Nation::Spain, ResourceKind::Silver, 1.30),
    (Nation::Spain, ResourceKind::Sugar, 1.10),
];

/// Additive sell-multiplier adjustment per (nation, resource).
const NATION_SELL_BONUS: &[(Nation, ResourceKind, f64)] = &[
    (Nation::Netherlands, ResourceKind::Cloth, 0.10),
    (Nation::Netherlands, ResourceKind::Tobacco, 0.05),
    (Nation::France, ResourceKind::Fur, 0.10),
    (Nation::England, ResourceKind::Wood, 0.05),
];

/// Additive price adjustment per (partner, resource), applied to both the
/// sell and the buy multiplier.
const FACTION_PRICE_EXCEPTION: &[(FactionId, ResourceKind, f64)] = &[
    (FactionId::Crown, ResourceKind::Silver, 0.10),
    (FactionId::Arawak, ResourceKind::Tools, 0.20),
    (FactionId::Cherokee, ResourceKind::Iron, 0.15),
    (FactionId::Iroquois, ResourceKind::Cloth, 0.15),
    (FactionId::Iroquois, ResourceKind::Fur, -0.20),
];

/// Upgrade cost multiplier per (nation, building kind).
const UPGRADE_COST: &[(Nation, BuildingKind, f64)] = &[
    (Nation::England, BuildingKind::House, 0.85),
    (Nation::England, BuildingKind::Settlement, 0.90),
    (Nation::France, BuildingKind::Lumberyard, 0.85),
    (Nation::Spain, BuildingKind::Mine, 0.80),
    (Nation::Netherlands, BuildingKind::Tailor, 0.85),
];

fn lookup<K: PartialEq + Copy, R: PartialEq + Copy>(
    table: &[(K, R, f64)],
    key: K,
    resource: R,
) -> Option<f64> {
    table
        .iter()
        .find(|(k, r, _)| *k == key && *r == resource)
        .map(|(_, _, v)| *v)
}

impl Nation {
    pub fn production_bonus(self, resource: ResourceKind) -> f64 {
        lookup(PRODUCTION_BONUS, self, resource).unwrap_or(1.0)
    }

    pub fn sell_bonus(self, resource: ResourceKind) -> f64 {
        lookup(NATION_SELL_BONUS, self, resource).unwrap_or(0.0)
    }

    pub fn upgrade_cost_multiplier(self, kind: BuildingKind) -> f64 {
        lookup(UPGRADE_COST, self, kind).unwrap_or(1.0)
    }

    /// Multiplier on sailing days; below 1.0 is faster.
    pub fn ship_speed_modifier(self) -> f64 {
        match self {
            Self::Netherlands => 0.8,
            Self::England => 0.9,
            Self::France | Self::Spain => 1.0,
        }
    }
}

pub fn faction_price_exception(faction: FactionId, resource: ResourceKind) -> f64 {
    lookup(FACTION_PRICE_EXCEPTION, faction, resource).unwrap_or(0.0)
}
