//! Error taxonomy.
//!
//! [`ValidationError`] rejects an intent before any state is touched.
//! [`StateInconsistency`] signals an orchestration bug found while resolving
//! scheduled transitions; the clock logs it and keeps going.

use thiserror::Error;

use crate::buildings::{BuildingId, BuildingKind};
use crate::construction::JobId;
use crate::factions::FactionId;
use crate::map::{Position, Terrain};
use crate::resources::ResourceKind;
use crate::ships::ShipId;

/// Stable, unlocalized reason code handed to the presentation layer.
pub type ReasonCode = &'static str;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("position {0:?} is outside the map")]
    OutOfBounds(Position),
    #[error("{kind:?} cannot be built on {terrain:?}")]
    TerrainMismatch { kind: BuildingKind, terrain: Terrain },
    #[error("no settlement at {0:?}")]
    NoSettlement(Position),
    #[error("settlement at {0:?} has no free building slot")]
    NoFreeSlot(Position),
    #[error("settlement at {0:?} still holds buildings")]
    SettlementOccupied(Position),
    #[error("cell {0:?} is already built on")]
    CellOccupied(Position),
    #[error("insufficient {resource:?}: missing {missing:.2}")]
    InsufficientResources { resource: ResourceKind, missing: f64 },
    #[error("need {needed} free workers, {available} available")]
    InsufficientWorkers { needed: u32, available: u32 },
    #[error("unknown building {0:?}")]
    UnknownBuilding(BuildingId),
    #[error("unknown construction job {0:?}")]
    UnknownJob(JobId),
    #[error("building {0:?} already has an upgrade in progress")]
    UpgradeInProgress(BuildingId),
    #[error("building {0:?} has no upgrade in progress")]
    NoUpgradeInProgress(BuildingId),
    #[error("building {0:?} is already at max level")]
    MaxLevel(BuildingId),
    #[error("building {building:?} holds at most {max} workers, requested {requested}")]
    WorkerCapacity {
        building: BuildingId,
        requested: u32,
        max: u32,
    },
    #[error("unknown ship {0:?}")]
    UnknownShip(ShipId),
    #[error("ship {0:?} is not in port")]
    ShipNotInPort(ShipId),
    #[error("cargo of {total:.2} exceeds ship capacity {capacity:.2}")]
    CargoOverCapacity { total: f64, capacity: f64 },
    #[error("currency cannot be loaded or traded as goods")]
    MoneyNotGoods,
    #[error("amounts must be non-negative")]
    NegativeAmount,
    #[error("trade exchanges nothing")]
    EmptyTrade,
    #[error("trade would leave {0:?} negative")]
    TradeWouldGoNegative(ResourceKind),
    #[error("{0:?} is not a trading partner for this intent")]
    UnknownFaction(FactionId),
    #[error("no active royal mission")]
    NoRoyalMission,
    #[error("no active mission for {0:?}")]
    NoNativeMission(FactionId),
    #[error("mission has no outstanding requirement")]
    NothingToPay,
    #[error("nothing to deliver")]
    NothingToDeliver,
    #[error("no ship available to carry colonists")]
    NoShipAvailable,
    #[error("count must be positive")]
    ZeroCount,
}

impl ValidationError {
    pub fn code(&self) -> ReasonCode {
        match self {
            Self::OutOfBounds(_) => "out_of_bounds",
            Self::TerrainMismatch { .. } => "terrain_mismatch",
            Self::NoSettlement(_) => "no_settlement",
            Self::NoFreeSlot(_) => "no_free_slot",
            Self::SettlementOccupied(_) => "settlement_occupied",
            Self::CellOccupied(_) => "cell_occupied",
            Self::InsufficientResources { .. } => "insufficient_resources",
            Self::InsufficientWorkers { .. } => "insufficient_workers",
            Self::UnknownBuilding(_) => "unknown_building",
            Self::UnknownJob(_) => "unknown_job",
            Self::UpgradeInProgress(_) => "upgrade_in_progress",
            Self::NoUpgradeInProgress(_) => "no_upgrade_in_progress",
            Self::MaxLevel(_) => "max_level",
            Self::WorkerCapacity { .. } => "worker_capacity",
            Self::UnknownShip(_) => "unknown_ship",
            Self::ShipNotInPort(_) => "ship_not_in_port",
            Self::CargoOverCapacity { .. } => "cargo_over_capacity",
            Self::MoneyNotGoods => "money_not_goods",
            Self::NegativeAmount => "negative_amount",
            Self::EmptyTrade => "empty_trade",
            Self::TradeWouldGoNegative(_) => "trade_would_go_negative",
            Self::UnknownFaction(_) => "unknown_faction",
            Self::NoRoyalMission => "no_royal_mission",
            Self::NoNativeMission(_) => "no_native_mission",
            Self::NothingToPay => "nothing_to_pay",
            Self::NothingToDeliver => "nothing_to_deliver",
            Self::NoShipAvailable => "no_ship_available",
            Self::ZeroCount => "zero_count",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StateInconsistency {
    #[error("upgrade job references missing building {0:?}")]
    UpgradeTargetMissing(BuildingId),
    #[error("upgrade job for {building:?} targets level {target} from level {current}")]
    UpgradeLevelMismatch {
        building: BuildingId,
        current: u8,
        target: u8,
    },
    #[error("ship {ship:?} expected in state {expected}, found {found}")]
    ShipState {
        ship: ShipId,
        expected: &'static str,
        found: &'static str,
    },
    #[error("workforce over-committed: {committed} committed for population {population}")]
    Workforce { committed: u32, population: u32 },
}

impl StateInconsistency {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UpgradeTargetMissing(_) => "upgrade_target_missing",
            Self::UpgradeLevelMismatch { .. } => "upgrade_level_mismatch",
            Self::ShipState { .. } => "ship_state",
            Self::Workforce { .. } => "workforce",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes_are_snake_case() {
        let samples = [
            ValidationError::NoRoyalMission,
            ValidationError::MoneyNotGoods,
            ValidationError::CargoOverCapacity {
                total: 400.0,
                capacity: 300.0,
            },
            ValidationError::UpgradeInProgress(BuildingId(3)),
        ];
        for err in samples {
            let code = err.code();
            assert!(code.chars().all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }

    #[test]
    fn test_display_mentions_amounts() {
        let err = ValidationError::InsufficientResources {
            resource: ResourceKind::Iron,
            missing: 12.5,
        };
        assert!(err.to_string().contains("12.50"));
    }
}
