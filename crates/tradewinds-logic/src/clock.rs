//! Multi-day advance.
//!
//! Order within one [`advance`] call:
//!
//! | Step | What |
//! |------|------|
//! | 1 | Day loop: overcrowding surcharge, food consumption, starvation days |
//! | 2 | Deaths from starvation, then workforce reconcile |
//! | 3 | Aggregate production for the whole window |
//! | 4 | Date moves forward |
//! | 5 | Royal mission expiry, then a new royal offer |
//! | 6 | Construction and upgrade jobs |
//! | 7 | Ship transitions, then auto-sail |
//! | 8 | Native mission expiry and offers |
//!
//! Production is aggregated over the whole window, not resolved day by day.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::colony::{reconcile_workforce, ColonyState};
use crate::config::SimConfig;
use crate::constants::{Day, EPSILON};
use crate::construction::resolve_jobs;
use crate::error::StateInconsistency;
use crate::events::{EventCode, EventParams, EventSink, Severity};
use crate::missions::{evaluate_native_missions, expire_royal_mission, offer_royal_mission};
use crate::production::{apply_production, compute_production, ProductionReport};
use crate::resources::{ResourceBundle, ResourceKind};
use crate::ships::{auto_sail, resolve_ships};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvanceReport {
    pub days: Day,
    pub food_eaten: f64,
    pub overcrowded_days: u32,
    pub starvation_days: u32,
    pub deaths: u32,
    /// Committed workers released after deaths.
    pub released_workers: u32,
    pub production: ProductionReport,
    /// Consumption actually taken, after capping at stock.
    pub consumed: ResourceBundle,
    pub ships_auto_sailed: usize,
    #[serde(skip)]
    pub inconsistencies: Vec<StateInconsistency>,
}

pub(crate) fn report_inconsistency(err: &StateInconsistency, events: &mut impl EventSink) {
    log::error!("state inconsistency: {}", err);
    events.emit_event(
        EventCode::StateInconsistency,
        Severity::Fatal,
        EventParams::new().name("kind", err.code()),
    );
}

/// Colonists lost after `starvation_days`: each survives independently with
/// probability `survival_base ^ starvation_days`.
pub fn roll_deaths(population: u32, starvation_days: u32, survival_base: f64, rng: &mut impl Rng) -> u32 {
    if starvation_days == 0 || population == 0 {
        return 0;
    }
    let survival = survival_base.clamp(0.0, 1.0).powf(f64::from(starvation_days));
    (0..population).filter(|_| !rng.gen_bool(survival)).count() as u32
}

/// Advance the colony by `days`. Never fails: inconsistencies found while
/// resolving are logged, emitted and collected in the report.
pub fn advance(
    state: &mut ColonyState,
    days: Day,
    config: &SimConfig,
    rng: &mut impl Rng,
    events: &mut impl EventSink,
) -> AdvanceReport {
    // The calendar stops at the last representable day.
    let days = days.min(Day::MAX - state.date);
    let mut report = AdvanceReport {
        days,
        ..AdvanceReport::default()
    };
    if days == 0 {
        return report;
    }

    // Population and housing are fixed until the day loop ends.
    let excess = state.population.saturating_sub(state.housing());
    if excess > 0 {
        report.overcrowded_days = days;
    }
    let need = state.population as f64 * config.food_per_colonist
        + excess as f64 * config.overcrowding_food_surcharge;
    for day in 0..days {
        if need <= 0.0 {
            break;
        }
        if state.ledger.get(ResourceKind::Food) + EPSILON < need {
            report.food_eaten += state.ledger.take_up_to(ResourceKind::Food, need);
            // Stock is empty now, so every remaining day starves too.
            report.starvation_days += days - day;
            break;
        }
        report.food_eaten += state.ledger.take_up_to(ResourceKind::Food, need);
    }
    if report.overcrowded_days > 0 {
        events.emit_event(
            EventCode::Overcrowding,
            Severity::Warning,
            EventParams::new()
                .int("days", report.overcrowded_days)
                .int("excess", excess),
        );
    }
    if report.starvation_days > 0 {
        log::warn!("{} starvation days", report.starvation_days);
        events.emit_event(
            EventCode::Starvation,
            Severity::Critical,
            EventParams::new().int("days", report.starvation_days),
        );
    }

    report.deaths = roll_deaths(
        state.population,
        report.starvation_days,
        config.starvation_survival_base,
        rng,
    );
    if report.deaths > 0 {
        state.population -= report.deaths;
        events.emit_event(
            EventCode::ColonistsDied,
            Severity::Critical,
            EventParams::new()
                .int("deaths", report.deaths)
                .int("population", state.population),
        );
    }
    report.released_workers = reconcile_workforce(state);

    report.production = compute_production(&state.buildings, state.nation, state.ledger.stock(), days);
    report.consumed = apply_production(&mut state.ledger, &report.production);

    state.date += days;

    expire_royal_mission(state, config, events);
    offer_royal_mission(state, config, rng, events);

    report.inconsistencies.extend(resolve_jobs(state, events));
    report.inconsistencies.extend(resolve_ships(state, config, rng, events));
    report.ships_auto_sailed = auto_sail(state, config, events);

    evaluate_native_missions(state, days, config, rng, events);

    if let Err(err) = state.check_workforce() {
        report.inconsistencies.push(err);
    }
    for err in &report.inconsistencies {
        report_inconsistency(err, events);
    }

    log::debug!(
        "advanced {} days to day {}: population {}, deaths {}",
        days,
        state.date,
        state.population,
        report.deaths
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buildings::{BuildingDraft, BuildingKind};
    use crate::colony::test_state;
    use crate::events::EventLog;
    use crate::map::Position;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_zero_days_is_noop() {
        let mut state = test_state();
        let before = state.clone();
        let mut log = EventLog::new();
        advance(&mut state, 0, &SimConfig::default(), &mut StdRng::seed_from_u64(1), &mut log);
        assert_eq!(state, before);
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_no_starvation_no_deaths() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            assert_eq!(roll_deaths(1000, 0, 0.95, &mut rng), 0);
        }
    }

    #[test]
    fn test_ten_starvation_days_kill_about_forty_percent() {
        let mut rng = StdRng::seed_from_u64(99);
        let deaths = roll_deaths(10_000, 10, 0.95, &mut rng);
        // 1 - 0.95^10 ≈ 0.401
        assert!((3_800..4_200).contains(&deaths), "deaths = {}", deaths);
    }

    #[test]
    fn test_food_is_eaten_daily() {
        let mut state = test_state();
        let config = SimConfig::default();
        state.population = 10;
        let report = advance(&mut state, 5, &config, &mut StdRng::seed_from_u64(1), &mut EventLog::new());
        assert_eq!(report.starvation_days, 0);
        assert!((report.food_eaten - 50.0).abs() < 1e-9);
        assert!((state.ledger.get(ResourceKind::Food) - 250.0).abs() < 1e-9);
        assert_eq!(state.date, 5);
    }

    #[test]
    fn test_overcrowding_surcharge() {
        let mut state = test_state();
        let config = SimConfig::default();
        // housing 10, population 20: 20 + 10 * 0.5 per day
        let mut log = EventLog::new();
        let report = advance(&mut state, 2, &config, &mut StdRng::seed_from_u64(1), &mut log);
        assert_eq!(report.overcrowded_days, 2);
        assert!((report.food_eaten - 50.0).abs() < 1e-9);
        assert_eq!(log.count(EventCode::Overcrowding), 1);
    }

    #[test]
    fn test_starvation_never_drives_food_negative() {
        let mut state = test_state();
        let config = SimConfig::default();
        state.ledger.take_up_to(ResourceKind::Food, 1e9);
        state.ledger.deposit(ResourceKind::Food, 15.0);
        let mut log = EventLog::new();
        let report = advance(&mut state, 10, &config, &mut StdRng::seed_from_u64(2), &mut log);
        assert_eq!(report.starvation_days, 10);
        assert_eq!(state.ledger.get(ResourceKind::Food), 0.0);
        assert_eq!(state.population, 20 - report.deaths);
        assert!(state.check_workforce().is_ok());
    }

    #[test]
    fn test_deaths_release_assignments() {
        let mut state = test_state();
        let config = SimConfig {
            starvation_survival_base: 0.0,
            ..SimConfig::default()
        };
        let farm = state.buildings.insert(BuildingDraft {
            kind: BuildingKind::Farm,
            position: Position::new(3, 3),
            deposit: None,
        });
        state.buildings.get_mut(farm).unwrap().workers = 4;
        state.ledger.take_up_to(ResourceKind::Food, 1e9);

        let report = advance(&mut state, 1, &config, &mut StdRng::seed_from_u64(3), &mut EventLog::new());
        assert_eq!(state.population, 0);
        assert_eq!(report.released_workers, 4);
        assert_eq!(state.buildings.get(farm).unwrap().workers, 0);
        assert!(report.inconsistencies.is_empty());
    }

    #[test]
    fn test_production_aggregated_over_window() {
        let mut state = test_state();
        let config = SimConfig::default();
        let farm = state.buildings.insert(BuildingDraft {
            kind: BuildingKind::Farm,
            position: Position::new(3, 3),
            deposit: None,
        });
        state.buildings.get_mut(farm).unwrap().workers = 4;
        state.population = 4;
        let food = state.ledger.get(ResourceKind::Food);

        advance(&mut state, 10, &config, &mut StdRng::seed_from_u64(4), &mut EventLog::new());
        // 1.5 * 4 * 10 * 1.10 produced, 4 * 10 eaten
        let expected = food + 66.0 - 40.0;
        assert!((state.ledger.get(ResourceKind::Food) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_first_advance_offers_royal_mission() {
        let mut state = test_state();
        let mut log = EventLog::new();
        advance(&mut state, 1, &SimConfig::default(), &mut StdRng::seed_from_u64(1), &mut log);
        assert!(state.royal.active.is_some());
        assert_eq!(log.count(EventCode::RoyalMissionOffered), 1);
    }

    #[test]
    fn test_advance_into_log_sink() {
        let mut state = test_state();
        let report = advance(
            &mut state,
            45,
            &SimConfig::default(),
            &mut StdRng::seed_from_u64(3),
            &mut crate::events::LogSink,
        );
        assert_eq!(state.date, 45);
        assert_eq!(report.ships_auto_sailed, 2);
        assert!(report.inconsistencies.is_empty());
    }

    #[test]
    fn test_calendar_saturates_at_last_day() {
        let mut state = test_state();
        state.date = Day::MAX - 5;
        let mut log = EventLog::new();
        let report = advance(&mut state, Day::MAX, &SimConfig::default(), &mut StdRng::seed_from_u64(4), &mut log);
        assert_eq!(report.days, 5);
        assert_eq!(state.date, Day::MAX);

        let again = advance(&mut state, 10, &SimConfig::default(), &mut StdRng::seed_from_u64(4), &mut log);
        assert_eq!(again.days, 0);
        assert_eq!(state.date, Day::MAX);
    }

    #[test]
    fn test_long_famine_kills_everyone_without_panicking() {
        let mut state = test_state();
        state.ledger.take_up_to(ResourceKind::Food, 1e9);
        let report = advance(
            &mut state,
            100_000,
            &SimConfig::default(),
            &mut StdRng::seed_from_u64(6),
            &mut EventLog::new(),
        );
        assert_eq!(report.starvation_days, 100_000);
        assert_eq!(state.population, 0);
    }
}
