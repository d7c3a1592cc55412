//! Colony state and the workforce rules that span several components.
//!
//! [`ColonyState`] is the explicit context every engine operation receives.
//! It is plain data: cloning it, serializing it, or building one by hand in a
//! test is all that is needed to exercise any operation in isolation.

use serde::{Deserialize, Serialize};

use crate::buildings::{BuildingDraft, BuildingId, BuildingKind, BuildingRoster};
use crate::config::SimConfig;
use crate::constants::Day;
use crate::construction::JobBoard;
use crate::error::{StateInconsistency, ValidationError};
use crate::events::{EventCode, EventParams, EventSink, Severity};
use crate::factions::Nation;
use crate::map::{ColonyMap, Position};
use crate::missions::{NativeMissions, RoyalMissions};
use crate::reputation::ReputationLedger;
use crate::resources::ResourceLedger;
use crate::ships::Fleet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColonyState {
    pub date: Day,
    pub nation: Nation,
    pub map: ColonyMap,
    pub ledger: ResourceLedger,
    pub population: u32,
    pub buildings: BuildingRoster,
    pub jobs: JobBoard,
    pub fleet: Fleet,
    pub reputation: ReputationLedger,
    pub royal: RoyalMissions,
    pub natives: NativeMissions,
}

impl ColonyState {
    /// Found a colony with a level-0 settlement at `site`.
    pub fn found(config: &SimConfig, map: ColonyMap, site: Position) -> Self {
        let mut buildings = BuildingRoster::new();
        buildings.insert(BuildingDraft {
            kind: BuildingKind::Settlement,
            position: site,
            deposit: None,
        });

        Self {
            date: 0,
            nation: config.nation,
            map,
            ledger: ResourceLedger::new(config.start_resources.clone()),
            population: config.start_population,
            buildings,
            jobs: JobBoard::new(),
            fleet: Fleet::new(config.start_ships, 0),
            reputation: ReputationLedger::new(config.initial_reputation),
            royal: RoyalMissions::new(config.royal_base_difficulty),
            natives: NativeMissions::new(),
        }
    }

    /// Workers assigned to buildings plus workers reserved by jobs.
    pub fn committed_workers(&self) -> u32 {
        self.buildings.assigned_workers() + self.jobs.reserved_workers()
    }

    pub fn free_workers(&self) -> u32 {
        self.population.saturating_sub(self.committed_workers())
    }

    pub fn housing(&self) -> u32 {
        self.buildings.housing()
    }

    pub(crate) fn require_workers(&self, needed: u32) -> Result<(), ValidationError> {
        let available = self.free_workers();
        if available < needed {
            return Err(ValidationError::InsufficientWorkers { needed, available });
        }
        Ok(())
    }

    pub fn check_workforce(&self) -> Result<(), StateInconsistency> {
        let committed = self.committed_workers();
        if committed > self.population {
            return Err(StateInconsistency::Workforce {
                committed,
                population: self.population,
            });
        }
        Ok(())
    }
}

/// Set the number of workers assigned to a building.
pub fn assign_workers(
    state: &mut ColonyState,
    id: BuildingId,
    count: u32,
    events: &mut impl EventSink,
) -> Result<(), ValidationError> {
    let building = state
        .buildings
        .get(id)
        .ok_or(ValidationError::UnknownBuilding(id))?;
    let max = building.max_workers();
    if count > max {
        return Err(ValidationError::WorkerCapacity {
            building: id,
            requested: count,
            max,
        });
    }
    let current = building.workers;
    if count > current {
        state.require_workers(count - current)?;
    }

    if let Some(b) = state.buildings.get_mut(id) {
        b.workers = count;
    }
    events.emit_event(
        EventCode::WorkersAssigned,
        Severity::Info,
        EventParams::new().int("building", id.0).int("workers", count),
    );
    Ok(())
}

/// Release commitments until they fit the population again.
///
/// Idle colonists are lost first (implicitly), then building assignments from
/// the newest building, then job crews from the newest job. Returns how many
/// committed workers were released.
pub fn reconcile_workforce(state: &mut ColonyState) -> u32 {
    let mut excess = state.committed_workers().saturating_sub(state.population);
    let released_total = excess;
    if excess == 0 {
        return 0;
    }

    let ids: Vec<BuildingId> = state.buildings.iter().map(|b| b.id).rev().collect();
    for id in ids {
        if excess == 0 {
            break;
        }
        if let Some(b) = state.buildings.get_mut(id) {
            let cut = b.workers.min(excess);
            b.workers -= cut;
            excess -= cut;
        }
    }
    if excess > 0 {
        excess = state.jobs.shed_workers(excess);
    }
    if excess > 0 {
        log::error!("workforce reconcile left {} workers over-committed", excess);
    }
    released_total - excess
}

/// An 8x8 plains colony founded at (1, 1) with default config.
#[cfg(test)]
pub(crate) fn test_state() -> ColonyState {
    let map = ColonyMap::filled(8, 8, crate::map::Terrain::Plains);
    ColonyState::found(&SimConfig::default(), map, Position::new(1, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;

    fn add_farm(state: &mut ColonyState) -> BuildingId {
        state.buildings.insert(BuildingDraft {
            kind: BuildingKind::Farm,
            position: Position::new(3, 3),
            deposit: None,
        })
    }

    #[test]
    fn test_found_colony() {
        let state = test_state();
        assert_eq!(state.population, 20);
        assert_eq!(state.buildings.len(), 1);
        assert_eq!(state.housing(), 10);
        assert_eq!(state.fleet.ships().len(), 2);
        assert_eq!(state.free_workers(), 20);
    }

    #[test]
    fn test_assign_within_capacity() {
        let mut state = test_state();
        let farm = add_farm(&mut state);
        let mut log = EventLog::new();
        assign_workers(&mut state, farm, 4, &mut log).unwrap();
        assert_eq!(state.committed_workers(), 4);
        assert_eq!(log.count(EventCode::WorkersAssigned), 1);
    }

    #[test]
    fn test_assign_over_capacity_rejected() {
        let mut state = test_state();
        let farm = add_farm(&mut state);
        let err = assign_workers(&mut state, farm, 5, &mut EventLog::new()).unwrap_err();
        assert_eq!(err.code(), "worker_capacity");
        assert_eq!(state.committed_workers(), 0);
    }

    #[test]
    fn test_assign_over_population_rejected() {
        let mut state = test_state();
        state.population = 3;
        let farm = add_farm(&mut state);
        let err = assign_workers(&mut state, farm, 4, &mut EventLog::new()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InsufficientWorkers {
                needed: 4,
                available: 3
            }
        );
    }

    #[test]
    fn test_reassign_counts_current_workers_as_available() {
        let mut state = test_state();
        state.population = 4;
        let farm = add_farm(&mut state);
        let mut log = EventLog::new();
        assign_workers(&mut state, farm, 4, &mut log).unwrap();
        assign_workers(&mut state, farm, 2, &mut log).unwrap();
        assign_workers(&mut state, farm, 4, &mut log).unwrap();
        assert_eq!(state.committed_workers(), 4);
    }

    #[test]
    fn test_reconcile_strips_newest_assignments() {
        let mut state = test_state();
        let a = add_farm(&mut state);
        let b = add_farm(&mut state);
        state.buildings.get_mut(a).unwrap().workers = 4;
        state.buildings.get_mut(b).unwrap().workers = 4;
        state.population = 5;

        assert_eq!(reconcile_workforce(&mut state), 3);
        assert_eq!(state.buildings.get(a).unwrap().workers, 4);
        assert_eq!(state.buildings.get(b).unwrap().workers, 1);
        assert!(state.check_workforce().is_ok());
    }
}
