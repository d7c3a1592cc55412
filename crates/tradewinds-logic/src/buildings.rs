//! Building kinds, the static building catalog, and the colony's building
//! collection.
//!
//! The catalog is a declarative table: every per-kind number (terrain, costs,
//! build time, worker capacity, housing, production) is read from
//! [`BuildingKind::spec`], never from scattered conditionals.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{Day, MAX_LEVEL};
use crate::map::{Position, Terrain};
use crate::resources::{ResourceBundle, ResourceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BuildingId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    /// Settlement district. Houses colonists and provides building slots.
    Settlement,
    House,
    Farm,
    Fishery,
    Lumberyard,
    Trapper,
    Mine,
    Plantation,
    Blacksmith,
    Tailor,
}

/// What a producing building yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Fixed(ResourceKind),
    /// Resolved to the deposit under the building's cell.
    Deposit,
}

/// Static per-kind rules.
#[derive(Debug, Clone)]
pub struct BuildingSpec {
    pub terrain: &'static [Terrain],
    pub is_district: bool,
    /// Must be placed in one of a settlement cell's slots.
    pub needs_slot: bool,
    pub base_cost: &'static [(ResourceKind, f64)],
    /// Cost to reach level 1 and level 2.
    pub upgrade_costs: [&'static [(ResourceKind, f64)]; MAX_LEVEL as usize],
    pub build_days: Day,
    /// Colonists tied up on site while a job on this kind is in flight.
    pub builders: u32,
    pub max_workers: [u32; MAX_LEVEL as usize + 1],
    pub housing: [u32; MAX_LEVEL as usize + 1],
    /// Per worker per day at level 0.
    pub outputs: &'static [(Output, f64)],
    /// Per worker per day at level 0.
    pub inputs: &'static [(ResourceKind, f64)],
}

/// Production multiplier by level.
pub const LEVEL_RATE: [f64; MAX_LEVEL as usize + 1] = [1.0, 1.25, 1.5];

/// Deposit a mine falls back to when its cell has none.
pub const DEFAULT_MINE_OUTPUT: ResourceKind = ResourceKind::Stone;

const LAND: &[Terrain] = &[
    Terrain::Plains,
    Terrain::Forest,
    Terrain::Hills,
    Terrain::Coast,
];

use ResourceKind as R;

impl BuildingKind {
    pub const ALL: [BuildingKind; 10] = [
        Self::Settlement,
        Self::House,
        Self::Farm,
        Self::Fishery,
        Self::Lumberyard,
        Self::Trapper,
        Self::Mine,
        Self::Plantation,
        Self::Blacksmith,
        Self::Tailor,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Settlement => "settlement",
            Self::House => "house",
            Self::Farm => "farm",
            Self::Fishery => "fishery",
            Self::Lumberyard => "lumberyard",
            Self::Trapper => "trapper",
            Self::Mine => "mine",
            Self::Plantation => "plantation",
            Self::Blacksmith => "blacksmith",
            Self::Tailor => "tailor",
        }
    }

    pub fn spec(self) -> BuildingSpec {
        match self {
            Self::Settlement => BuildingSpec {
                terrain: LAND,
                is_district: true,
                needs_slot: false,
                base_cost: &[(R::Wood, 150.0), (R::Stone, 40.0)],
                upgrade_costs: [
                    &[(R::Wood, 120.0), (R::Stone, 80.0)],
                    &[(R::Wood, 200.0), (R::Stone, 150.0), (R::Tools, 20.0)],
                ],
                build_days: 20,
                builders: 4,
                max_workers: [0, 0, 0],
                housing: [10, 16, 24],
                outputs: &[],
                inputs: &[],
            },
            Self::House => BuildingSpec {
                terrain: LAND,
                is_district: false,
                needs_slot: true,
                base_cost: &[(R::Wood, 60.0)],
                upgrade_costs: [&[(R::Wood, 50.0), (R::Stone, 20.0)], &[(R::Wood, 60.0), (R::Stone, 60.0)]],
                build_days: 8,
                builders: 2,
                max_workers: [0, 0, 0],
                housing: [6, 9, 12],
                outputs: &[],
                inputs: &[],
            },
            Self::Farm => BuildingSpec {
                terrain: &[Terrain::Plains],
                is_district: false,
                needs_slot: false,
                base_cost: &[(R::Wood, 100.0)],
                upgrade_costs: [&[(R::Iron, 50.0)], &[(R::Iron, 80.0), (R::Tools, 20.0)]],
                build_days: 10,
                builders: 2,
                max_workers: [4, 6, 8],
                housing: [0, 0, 0],
                outputs: &[(Output::Fixed(R::Food), 1.5)],
                inputs: &[],
            },
            Self::Fishery => BuildingSpec {
                terrain: &[Terrain::Coast],
                is_district: false,
                needs_slot: false,
                base_cost: &[(R::Wood, 80.0)],
                upgrade_costs: [&[(R::Wood, 60.0), (R::Iron, 20.0)], &[(R::Wood, 80.0), (R::Tools, 20.0)]],
                build_days: 10,
                builders: 2,
                max_workers: [3, 5, 7],
                housing: [0, 0, 0],
                outputs: &[(Output::Fixed(R::Food), 2.0)],
                inputs: &[],
            },
            Self::Lumberyard => BuildingSpec {
                terrain: &[Terrain::Forest],
                is_district: false,
                needs_slot: false,
                base_cost: &[(R::Wood, 40.0)],
                upgrade_costs: [&[(R::Wood, 60.0), (R::Iron, 10.0)], &[(R::Wood, 80.0), (R::Tools, 15.0)]],
                build_days: 6,
                builders: 2,
                max_workers: [4, 6, 8],
                housing: [0, 0, 0],
                outputs: &[(Output::Fixed(R::Wood), 1.2)],
                inputs: &[],
            },
            Self::Trapper => BuildingSpec {
                terrain: &[Terrain::Forest, Terrain::Hills],
                is_district: false,
                needs_slot: false,
                base_cost: &[(R::Wood, 50.0)],
                upgrade_costs: [&[(R::Wood, 60.0), (R::Tools, 5.0)], &[(R::Wood, 80.0), (R::Tools, 15.0)]],
                build_days: 6,
                builders: 1,
                max_workers: [2, 4, 6],
                housing: [0, 0, 0],
                outputs: &[(Output::Fixed(R::Fur), 0.4)],
                inputs: &[],
            },
            Self::Mine => BuildingSpec {
                terrain: &[Terrain::Hills, Terrain::Mountains],
                is_district: false,
                needs_slot: false,
                base_cost: &[(R::Wood, 80.0), (R::Tools, 10.0)],
                upgrade_costs: [&[(R::Wood, 80.0), (R::Tools, 25.0)], &[(R::Stone, 100.0), (R::Tools, 40.0)]],
                build_days: 15,
                builders: 3,
                max_workers: [3, 5, 7],
                housing: [0, 0, 0],
                outputs: &[(Output::Deposit, 0.6)],
                inputs: &[(R::Tools, 0.02)],
            },
            Self::Plantation => BuildingSpec {
                terrain: &[Terrain::Plains, Terrain::Coast],
                is_district: false,
                needs_slot: false,
                base_cost: &[(R::Wood, 90.0)],
                upgrade_costs: [&[(R::Wood, 70.0), (R::Iron, 20.0)], &[(R::Wood, 90.0), (R::Tools, 20.0)]],
                build_days: 12,
                builders: 2,
                max_workers: [4, 6, 8],
                housing: [0, 0, 0],
                outputs: &[(Output::Fixed(R::Sugar), 0.4), (Output::Fixed(R::Tobacco), 0.2)],
                inputs: &[],
            },
            Self::Blacksmith => BuildingSpec {
                terrain: LAND,
                is_district: false,
                needs_slot: true,
                base_cost: &[(R::Wood, 60.0), (R::Stone, 40.0)],
                upgrade_costs: [&[(R::Wood, 40.0), (R::Stone, 60.0)], &[(R::Stone, 80.0), (R::Iron, 40.0)]],
                build_days: 12,
                builders: 2,
                max_workers: [2, 3, 4],
                housing: [0, 0, 0],
                outputs: &[(Output::Fixed(R::Tools), 0.5)],
                inputs: &[(R::Iron, 0.5)],
            },
            Self::Tailor => BuildingSpec {
                terrain: LAND,
                is_district: false,
                needs_slot: true,
                base_cost: &[(R::Wood, 60.0)],
                upgrade_costs: [&[(R::Wood, 50.0), (R::Tools, 10.0)], &[(R::Wood, 60.0), (R::Tools, 25.0)]],
                build_days: 10,
                builders: 2,
                max_workers: [2, 3, 4],
                housing: [0, 0, 0],
                outputs: &[(Output::Fixed(R::Cloth), 0.4)],
                inputs: &[(R::Fur, 0.4)],
            },
        }
    }

    pub fn base_cost(self) -> ResourceBundle {
        self.spec().base_cost.iter().copied().collect()
    }

    /// Cost of the upgrade that reaches `target` (1..=MAX_LEVEL), before
    /// nation modifiers.
    pub fn upgrade_cost(self, target: u8) -> ResourceBundle {
        match target {
            1..=MAX_LEVEL => self.spec().upgrade_costs[target as usize - 1]
                .iter()
                .copied()
                .collect(),
            _ => ResourceBundle::new(),
        }
    }

    /// Days an upgrade to `target` stays in flight.
    pub fn upgrade_days(self, target: u8) -> Day {
        self.spec().build_days * target.max(1) as Day
    }

    pub fn max_workers(self, level: u8) -> u32 {
        self.spec().max_workers[level.min(MAX_LEVEL) as usize]
    }

    pub fn housing(self, level: u8) -> u32 {
        self.spec().housing[level.min(MAX_LEVEL) as usize]
    }

    pub fn is_district(self) -> bool {
        self.spec().is_district
    }

    pub fn needs_slot(self) -> bool {
        self.spec().needs_slot
    }
}

/// Everything needed to create a building once construction completes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildingDraft {
    pub kind: BuildingKind,
    pub position: Position,
    pub deposit: Option<ResourceKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub kind: BuildingKind,
    pub level: u8,
    pub workers: u32,
    pub position: Position,
    pub deposit: Option<ResourceKind>,
}

impl Building {
    pub fn max_workers(&self) -> u32 {
        self.kind.max_workers(self.level)
    }

    pub fn is_district(&self) -> bool {
        self.kind.is_district()
    }

    /// Concrete resource for an output slot.
    pub fn resolve_output(&self, output: Output) -> ResourceKind {
        match output {
            Output::Fixed(kind) => kind,
            Output::Deposit => self.deposit.unwrap_or(DEFAULT_MINE_OUTPUT),
        }
    }

    /// Cost paid for the current level: base cost at level 0, otherwise the
    /// upgrade that reached it.
    pub fn current_level_cost(&self) -> ResourceBundle {
        if self.level == 0 {
            self.kind.base_cost()
        } else {
            self.kind.upgrade_cost(self.level)
        }
    }
}

/// The colony's completed buildings, addressed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildingRoster {
    buildings: BTreeMap<BuildingId, Building>,
    next_id: u32,
}

impl BuildingRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, draft: BuildingDraft) -> BuildingId {
        let id = BuildingId(self.next_id);
        self.next_id += 1;
        self.buildings.insert(
            id,
            Building {
                id,
                kind: draft.kind,
                level: 0,
                workers: 0,
                position: draft.position,
                deposit: draft.deposit,
            },
        );
        id
    }

    pub fn get(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.get(&id)
    }

    pub fn get_mut(&mut self, id: BuildingId) -> Option<&mut Building> {
        self.buildings.get_mut(&id)
    }

    pub fn remove(&mut self, id: BuildingId) -> Option<Building> {
        self.buildings.remove(&id)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Building> {
        self.buildings.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Building> {
        self.buildings.values_mut()
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    pub fn at(&self, pos: Position) -> impl Iterator<Item = &Building> {
        self.buildings.values().filter(move |b| b.position == pos)
    }

    pub fn has_district_at(&self, pos: Position) -> bool {
        self.at(pos).any(|b| b.is_district())
    }

    pub fn housing(&self) -> u32 {
        self.iter().map(|b| b.kind.housing(b.level)).sum()
    }

    pub fn assigned_workers(&self) -> u32 {
        self.iter().map(|b| b.workers).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_consistent() {
        for kind in BuildingKind::ALL {
            let spec = kind.spec();
            assert!(!spec.terrain.is_empty(), "{:?}", kind);
            assert!(!kind.base_cost().is_empty(), "{:?}", kind);
            assert!(spec.build_days > 0);
            // capacity never shrinks with level
            assert!(spec.max_workers.windows(2).all(|w| w[0] <= w[1]));
            assert!(spec.housing.windows(2).all(|w| w[0] <= w[1]));
            // only producers take workers
            if spec.outputs.is_empty() {
                assert_eq!(spec.max_workers, [0, 0, 0], "{:?}", kind);
            }
            assert!(!(spec.is_district && spec.needs_slot));
        }
    }

    #[test]
    fn test_upgrade_cost_bounds() {
        assert!(BuildingKind::Farm.upgrade_cost(0).is_empty());
        assert_eq!(
            BuildingKind::Farm.upgrade_cost(1),
            ResourceBundle::new().with(ResourceKind::Iron, 50.0)
        );
        assert!(BuildingKind::Farm.upgrade_cost(MAX_LEVEL + 1).is_empty());
    }

    #[test]
    fn test_mine_resolves_deposit() {
        let mut roster = BuildingRoster::new();
        let id = roster.insert(BuildingDraft {
            kind: BuildingKind::Mine,
            position: Position::new(0, 0),
            deposit: Some(ResourceKind::Silver),
        });
        let mine = roster.get(id).unwrap();
        assert_eq!(mine.resolve_output(Output::Deposit), ResourceKind::Silver);

        let bare = Building {
            deposit: None,
            ..mine.clone()
        };
        assert_eq!(bare.resolve_output(Output::Deposit), DEFAULT_MINE_OUTPUT);
    }

    #[test]
    fn test_roster_ids_are_not_reused() {
        let mut roster = BuildingRoster::new();
        let draft = BuildingDraft {
            kind: BuildingKind::House,
            position: Position::new(1, 1),
            deposit: None,
        };
        let a = roster.insert(draft);
        roster.remove(a);
        let b = roster.insert(draft);
        assert_ne!(a, b);
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_housing_sums_levels() {
        let mut roster = BuildingRoster::new();
        let pos = Position::new(2, 2);
        let s = roster.insert(BuildingDraft {
            kind: BuildingKind::Settlement,
            position: pos,
            deposit: None,
        });
        roster.insert(BuildingDraft {
            kind: BuildingKind::House,
            position: pos,
            deposit: None,
        });
        assert_eq!(roster.housing(), 16);
        roster.get_mut(s).unwrap().level = 1;
        assert_eq!(roster.housing(), 22);
        assert!(roster.has_district_at(pos));
    }
}
