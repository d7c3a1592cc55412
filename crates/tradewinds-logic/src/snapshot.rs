//! Read-only view of a colony for presentation.

use serde::Serialize;

use crate::buildings::{BuildingId, BuildingKind};
use crate::colony::ColonyState;
use crate::constants::Day;
use crate::construction::{ConstructionJob, UpgradeJob};
use crate::factions::{FactionId, Nation};
use crate::map::Position;
use crate::missions::{NativeMission, RoyalMission};
use crate::production::compute_production;
use crate::resources::ResourceBundle;
use crate::ships::{ShipId, ShipStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingView {
    pub id: BuildingId,
    pub kind: BuildingKind,
    pub level: u8,
    pub workers: u32,
    pub max_workers: u32,
    pub position: Position,
    /// Efficiency against current stock; `None` for non-producers.
    pub efficiency: Option<f64>,
    /// Output per day at that efficiency.
    pub daily_output: ResourceBundle,
    pub upgrading: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipView {
    pub id: ShipId,
    pub status: ShipStatus,
    pub cargo: ResourceBundle,
    pub next_event: Option<Day>,
    pub pending_colonists: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColonySnapshot {
    pub date: Day,
    pub nation: Nation,
    pub population: u32,
    pub housing: u32,
    pub free_workers: u32,
    pub resources: ResourceBundle,
    pub buildings: Vec<BuildingView>,
    pub construction: Vec<ConstructionJob>,
    pub upgrades: Vec<UpgradeJob>,
    pub ships: Vec<ShipView>,
    pub royal_mission: Option<RoyalMission>,
    pub native_missions: Vec<NativeMission>,
    pub reputation: Vec<(FactionId, f64)>,
}

impl ColonySnapshot {
    pub fn capture(state: &ColonyState) -> Self {
        let production = compute_production(&state.buildings, state.nation, state.ledger.stock(), 1);
        let buildings = state
            .buildings
            .iter()
            .map(|b| {
                let output = production.for_building(b.id);
                BuildingView {
                    id: b.id,
                    kind: b.kind,
                    level: b.level,
                    workers: b.workers,
                    max_workers: b.max_workers(),
                    position: b.position,
                    efficiency: output.map(|o| o.efficiency),
                    daily_output: output.map(|o| o.produced.clone()).unwrap_or_default(),
                    upgrading: state.jobs.upgrade_for(b.id).is_some(),
                }
            })
            .collect();

        let ships = state
            .fleet
            .ships()
            .iter()
            .map(|s| ShipView {
                id: s.id,
                status: s.status(),
                cargo: s.cargo().cloned().unwrap_or_default(),
                next_event: s.next_event(),
                pending_colonists: s.pending_colonists,
            })
            .collect();

        Self {
            date: state.date,
            nation: state.nation,
            population: state.population,
            housing: state.housing(),
            free_workers: state.free_workers(),
            resources: state.ledger.stock().clone(),
            buildings,
            construction: state.jobs.construction().to_vec(),
            upgrades: state.jobs.upgrades().cloned().collect(),
            ships,
            royal_mission: state.royal.active.clone(),
            native_missions: state.natives.active().cloned().collect(),
            reputation: state.reputation.iter().map(|(f, e)| (f, e.value)).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
