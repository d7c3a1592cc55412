//! Building production and consumption under workforce and scarcity limits.
//!
//! Computation is pure: [`compute_production`] reads a stock snapshot and
//! returns deltas, and [`apply_production`] commits them. Every building's
//! efficiency is judged against the same pre-tick stock, and all consumption
//! is removed before any production is added, so output made in a window is
//! never consumed in that same window.

use serde::{Deserialize, Serialize};

use crate::buildings::{Building, BuildingId, BuildingRoster, LEVEL_RATE};
use crate::factions::Nation;
use crate::resources::{ResourceBundle, ResourceLedger};

/// Result for one building over the computed window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingOutput {
    pub building: BuildingId,
    /// 0.0..=1.0; zero when unstaffed.
    pub efficiency: f64,
    pub produced: ResourceBundle,
    pub consumed: ResourceBundle,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductionReport {
    pub buildings: Vec<BuildingOutput>,
    pub produced: ResourceBundle,
    /// Requested consumption, before capping at stock.
    pub consumed: ResourceBundle,
}

impl ProductionReport {
    pub fn for_building(&self, id: BuildingId) -> Option<&BuildingOutput> {
        self.buildings.iter().find(|b| b.building == id)
    }
}

/// Production and consumption at full efficiency over `days`.
pub fn rated_flows(building: &Building, nation: Nation, days: u32) -> (ResourceBundle, ResourceBundle) {
    let spec = building.kind.spec();
    let scale = LEVEL_RATE[building.level.min(LEVEL_RATE.len() as u8 - 1) as usize]
        * building.workers as f64
        * days as f64;

    let mut produced = ResourceBundle::new();
    for (output, rate) in spec.outputs {
        let resource = building.resolve_output(*output);
        produced.add(resource, rate * scale * nation.production_bonus(resource));
    }

    let mut consumed = ResourceBundle::new();
    for (resource, rate) in spec.inputs {
        consumed.add(*resource, rate * scale);
    }
    (produced, consumed)
}

/// Fraction of rated output achievable given `stock`.
pub fn efficiency(needs: &ResourceBundle, stock: &ResourceBundle) -> f64 {
    needs
        .iter()
        .map(|(kind, needed)| stock.get(kind) / needed)
        .fold(1.0_f64, f64::min)
        .clamp(0.0, 1.0)
}

pub fn compute_production(
    buildings: &BuildingRoster,
    nation: Nation,
    stock: &ResourceBundle,
    days: u32,
) -> ProductionReport {
    let mut report = ProductionReport::default();

    for building in buildings.iter() {
        if building.is_district() || building.kind.spec().outputs.is_empty() {
            continue;
        }
        if building.workers == 0 {
            report.buildings.push(BuildingOutput {
                building: building.id,
                efficiency: 0.0,
                produced: ResourceBundle::new(),
                consumed: ResourceBundle::new(),
            });
            continue;
        }

        let (rated_out, rated_in) = rated_flows(building, nation, days);
        let eff = efficiency(&rated_in, stock);
        let produced = rated_out.scaled(eff);
        let consumed = rated_in.scaled(eff);

        report.produced.merge(&produced);
        report.consumed.merge(&consumed);
        report.buildings.push(BuildingOutput {
            building: building.id,
            efficiency: eff,
            produced,
            consumed,
        });
    }
    report
}

/// Commit a report: consumption first (capped at stock), then production.
/// Returns what was actually consumed.
pub fn apply_production(ledger: &mut ResourceLedger, report: &ProductionReport) -> ResourceBundle {
    let mut taken = ResourceBundle::new();
    for (kind, amount) in report.consumed.iter() {
        taken.add(kind, ledger.take_up_to(kind, amount));
    }
    ledger.deposit_all(&report.produced);
    taken
}
