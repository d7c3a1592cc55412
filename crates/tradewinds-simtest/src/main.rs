//! Tradewinds Headless Simulation Harness
//!
//! Founds a colony on a fixed test map, drives it through construction,
//! trade, voyages and missions, and checks the colony invariants after
//! every step. Runs entirely in-process: no rendering, no input.
//!
//! Usage:
//!   cargo run -p tradewinds-simtest
//!   cargo run -p tradewinds-simtest -- --days 720 --verbose
//!   cargo run -p tradewinds-simtest -- --config my_profile.json

use tradewinds_logic::buildings::{BuildingId, BuildingKind};
use tradewinds_logic::config::SimConfig;
use tradewinds_logic::constants::{MAX_SHIP_CARGO, REPUTATION_MAX, REPUTATION_MIN};
use tradewinds_logic::engine::Colony;
use tradewinds_logic::events::EventCode;
use tradewinds_logic::factions::FactionId;
use tradewinds_logic::map::{ColonyMap, Position, Terrain};
use tradewinds_logic::resources::{ResourceBundle, ResourceKind};
use tradewinds_logic::ships::{ShipId, ShipStatus};

// ── Default profile (same JSON a frontend ships with) ───────────────────
const DEFAULT_CONFIG_JSON: &str = include_str!("../../../data/colony_config.json");

const SITE: Position = Position::new(5, 5);
const FIELD: Position = Position::new(6, 5);
const WOODS: Position = Position::new(1, 4);
const HILLS: Position = Position::new(9, 9);

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    config_path: Option<String>,
    days: u32,
    verbose: bool,
}

fn parse_args() -> Options {
    let mut opts = Options {
        config_path: None,
        days: 360,
        verbose: false,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--verbose" => opts.verbose = true,
            "--config" => opts.config_path = args.next(),
            "--days" => match args.next().map(|d| d.parse()) {
                Some(Ok(days)) => opts.days = days,
                _ => log::warn!("--days expects a number, keeping {}", opts.days),
            },
            other => log::warn!("ignoring unknown argument {}", other),
        }
    }
    opts
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opts = parse_args();
    println!("=== Tradewinds Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Config profile
    let config = match load_config(&opts, &mut results) {
        Some(c) => c,
        None => {
            summarize(&results, opts.verbose);
            std::process::exit(1);
        }
    };

    // 2. Intent validation on a fresh colony
    results.extend(validate_intents(&config, opts.verbose));

    // 3. Voyage state machine
    results.extend(validate_voyage(&config, opts.verbose));

    // 4. Long run with invariant sweep
    results.extend(validate_long_run(&config, opts.days, opts.verbose));

    // 5. Save / load
    results.extend(validate_persistence(&config, opts.verbose));

    summarize(&results, opts.verbose);
}

fn summarize(results: &[TestResult], verbose: bool) {
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn test_map() -> ColonyMap {
    let mut map = ColonyMap::filled(12, 12, Terrain::Plains);
    for y in 0..12 {
        for x in 0..3 {
            map.set_terrain(Position::new(x, y), Terrain::Forest);
        }
        map.set_terrain(Position::new(y, 11), Terrain::Coast);
    }
    for y in 8..11 {
        for x in 8..11 {
            let pos = Position::new(x, y);
            map.set_terrain(pos, Terrain::Hills);
            map.set_deposit(pos, Some(ResourceKind::Iron));
        }
    }
    map
}

fn new_colony(config: &SimConfig) -> Colony {
    Colony::new(config.clone(), test_map(), SITE).expect("profile validated by load_config")
}

// ── 1. Config ───────────────────────────────────────────────────────────

fn load_config(opts: &Options, results: &mut Vec<TestResult>) -> Option<SimConfig> {
    println!("--- Config Profile ---");
    let (source, json) = match &opts.config_path {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(json) => (path.clone(), json),
            Err(e) => {
                results.push(TestResult {
                    name: "config_read".into(),
                    passed: false,
                    detail: format!("{}: {}", path, e),
                });
                return None;
            }
        },
        None => ("built-in profile".to_string(), DEFAULT_CONFIG_JSON.to_string()),
    };

    let config = match SimConfig::from_json(&json) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult {
                name: "config_parse".into(),
                passed: false,
                detail: format!("{}: {}", source, e),
            });
            return None;
        }
    };

    results.push(TestResult {
        name: "config_parse".into(),
        passed: true,
        detail: format!("{} (seed {}, {:?})", source, config.seed, config.nation),
    });
    let inverted = SimConfig {
        return_travel_min_days: config.return_travel_max_days + 1,
        ..config.clone()
    };
    let rejected = inverted.validate();
    results.push(TestResult {
        name: "config_ranges".into(),
        passed: rejected.is_err(),
        detail: format!("inverted return travel: {:?}", rejected.map_err(|e| e.to_string())),
    });
    Some(config)
}

// ── 2. Intents ──────────────────────────────────────────────────────────

fn validate_intents(config: &SimConfig, _verbose: bool) -> Vec<TestResult> {
    println!("--- Intent Validation ---");
    let mut results = Vec::new();
    let mut colony = new_colony(config);

    let mismatch = colony.start_construction(BuildingKind::Farm, WOODS);
    results.push(TestResult {
        name: "terrain_mismatch_rejected".into(),
        passed: matches!(&mismatch, Err(e) if e.code() == "terrain_mismatch"),
        detail: format!("farm on forest: {:?}", mismatch.map_err(|e| e.code())),
    });

    let before = colony.state.clone();
    let cargo = ResourceBundle::new().with(ResourceKind::Wood, MAX_SHIP_CARGO + 50.0);
    let over = colony.send_ship(ShipId(0), &cargo);
    results.push(TestResult {
        name: "cargo_over_capacity_atomic".into(),
        passed: over.is_err() && colony.state == before,
        detail: format!("{:?}, state unchanged = {}", over.map_err(|e| e.code()), colony.state == before),
    });

    let farm_job = colony.start_construction(BuildingKind::Farm, FIELD);
    let house_job = colony.start_construction(BuildingKind::House, SITE);
    results.push(TestResult {
        name: "construction_started".into(),
        passed: farm_job.is_ok() && house_job.is_ok(),
        detail: format!("{} jobs in flight", colony.state.jobs.construction().len()),
    });

    let stacked = colony.start_construction(BuildingKind::Farm, FIELD);
    let crowded = colony.start_construction(BuildingKind::Farm, SITE);
    results.push(TestResult {
        name: "occupied_cell_rejected".into(),
        passed: matches!(&stacked, Err(e) if e.code() == "cell_occupied")
            && matches!(&crowded, Err(e) if e.code() == "cell_occupied"),
        detail: format!("second farm {:?}, farm in settlement {:?}", stacked.map_err(|e| e.code()), crowded.map_err(|e| e.code())),
    });

    colony.advance(15);
    let farm = colony
        .state
        .buildings
        .iter()
        .find(|b| b.kind == BuildingKind::Farm)
        .map_or(BuildingId(u32::MAX), |b| b.id);
    let first = colony.start_upgrade(farm);
    let second = colony.start_upgrade(farm);
    results.push(TestResult {
        name: "single_upgrade_per_building".into(),
        passed: first.is_ok() && matches!(&second, Err(e) if e.code() == "upgrade_in_progress"),
        detail: format!("first {:?}, second {:?}", first.map_err(|e| e.code()), second.map_err(|e| e.code())),
    });

    let iron = colony.state.ledger.get(ResourceKind::Iron);
    let free = colony.state.free_workers();
    let cancelled = colony.cancel_upgrade(farm);
    results.push(TestResult {
        name: "cancel_upgrade_full_refund".into(),
        passed: cancelled.is_ok()
            && (colony.state.ledger.get(ResourceKind::Iron) - iron - 50.0).abs() < 1e-9
            && colony.state.free_workers() == free + 2,
        detail: format!(
            "iron {:.1} -> {:.1}, free workers {} -> {}",
            iron,
            colony.state.ledger.get(ResourceKind::Iron),
            free,
            colony.state.free_workers()
        ),
    });

    let wood = colony.state.ledger.get(ResourceKind::Wood);
    let demolished = colony.degrade_or_demolish(farm);
    results.push(TestResult {
        name: "demolish_half_refund".into(),
        passed: demolished.is_ok()
            && colony.state.buildings.get(farm).is_none()
            && (colony.state.ledger.get(ResourceKind::Wood) - wood - 50.0).abs() < 1e-9,
        detail: format!("wood {:.1} -> {:.1}", wood, colony.state.ledger.get(ResourceKind::Wood)),
    });

    let trade = colony.execute_trade(
        FactionId::Crown,
        &ResourceBundle::new().with(ResourceKind::Wood, 1.0),
        &ResourceBundle::new(),
    );
    results.push(TestResult {
        name: "crown_trade_rejected".into(),
        passed: trade.is_err(),
        detail: "the Crown is reached by ship only".into(),
    });

    results
}

// ── 3. Voyage ───────────────────────────────────────────────────────────

fn validate_voyage(config: &SimConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Voyage State Machine ---");
    let mut results = Vec::new();
    let mut colony = new_colony(config);

    let cargo = ResourceBundle::new()
        .with(ResourceKind::Wood, 200.0)
        .with(ResourceKind::Stone, 50.0);
    let arrival = match colony.send_ship(ShipId(1), &cargo) {
        Ok(day) => day,
        Err(e) => {
            results.push(TestResult {
                name: "voyage_send".into(),
                passed: false,
                detail: format!("send rejected: {}", e),
            });
            return results;
        }
    };
    let ordered = colony.order_colonists(4);
    results.push(TestResult {
        name: "colonists_board_outbound_ship".into(),
        passed: ordered == Ok(ShipId(1)),
        detail: format!("{:?}", ordered.map_err(|e| e.code())),
    });

    colony.advance(arrival - colony.date());
    let ship = colony.state.fleet.get(ShipId(1));
    let arrived = ship.map(|s| (s.status(), s.cargo().is_none(), s.next_event()));
    results.push(TestResult {
        name: "arrival_enters_dwell".into(),
        passed: arrived == Some((ShipStatus::InForeignPort, true, Some(arrival + 7))),
        detail: format!("{:?}", arrived),
    });

    let state = colony.state.clone();
    colony.advance(1);
    let still = colony.state.fleet.get(ShipId(1)).map(|s| s.status());
    results.push(TestResult {
        name: "resolution_idempotent".into(),
        passed: still == Some(ShipStatus::InForeignPort)
            && colony.events.count(EventCode::ShipArrivedForeign) == 1,
        detail: format!("status after another day: {:?}", still),
    });
    if verbose {
        println!(
            "  money {:.1} -> {:.1}",
            state.ledger.money(),
            colony.state.ledger.money()
        );
    }

    colony.advance(60);
    let home = colony.state.fleet.get(ShipId(1));
    let arrivals = colony.events.count(EventCode::ColonistsArrived);
    results.push(TestResult {
        name: "colonists_delivered".into(),
        passed: home.is_some_and(|s| s.status() == ShipStatus::InPort && s.pending_colonists == 0)
            && arrivals == 1,
        detail: format!(
            "ship {:?}, {} arrival events, population {}",
            home.map(|s| s.status()),
            arrivals,
            colony.state.population
        ),
    });

    results
}

// ── 4. Long run ─────────────────────────────────────────────────────────

fn check_invariants(colony: &Colony) -> Result<(), String> {
    let state = &colony.state;
    if let Some((kind, amount)) = state.ledger.stock().iter().find(|(_, v)| *v < 0.0) {
        return Err(format!("{:?} negative: {}", kind, amount));
    }
    if let Some(b) = state.buildings.iter().find(|b| b.workers > b.max_workers()) {
        return Err(format!("{:?} has {} workers, max {}", b.id, b.workers, b.max_workers()));
    }
    if state.committed_workers() > state.population {
        return Err(format!(
            "{} committed for population {}",
            state.committed_workers(),
            state.population
        ));
    }
    if let Some((faction, e)) = state
        .reputation
        .iter()
        .find(|(_, e)| !(REPUTATION_MIN..=REPUTATION_MAX).contains(&e.value))
    {
        return Err(format!("{:?} reputation {}", faction, e.value));
    }
    if let Some(s) = state
        .fleet
        .ships()
        .iter()
        .find(|s| s.cargo().is_some_and(|c| c.total() > MAX_SHIP_CARGO))
    {
        return Err(format!("{:?} over capacity", s.id));
    }
    Ok(())
}

/// A simple steward: keep producers staffed, ship surplus, answer missions.
fn play_turn(colony: &mut Colony) {
    let ids: Vec<(BuildingId, u32)> = colony
        .state
        .buildings
        .iter()
        .map(|b| (b.id, b.max_workers()))
        .collect();
    for (id, max) in ids {
        let current = colony.state.buildings.get(id).map_or(0, |b| b.workers);
        let want = max.min(current + colony.state.free_workers());
        if want != current {
            let _ = colony.assign_workers(id, want);
        }
    }

    if let Some(outstanding) = colony.state.royal.active.as_ref().map(|m| m.outstanding()) {
        let price = colony
            .state
            .royal
            .active
            .as_ref()
            .map_or(f64::MAX, |m| m.shortfall_price());
        if price < colony.state.ledger.money() * 0.5 {
            let _ = colony.pay_mission_shortfall();
        } else {
            let load: ResourceBundle = outstanding
                .iter()
                .map(|(kind, amount)| (kind, amount.min(colony.state.ledger.get(kind))))
                .collect();
            let carrier = colony
                .state
                .fleet
                .ships()
                .iter()
                .find(|s| s.status() == ShipStatus::InPort)
                .map(|s| s.id);
            if let Some(ship) = carrier {
                if !load.is_empty() && load.total() <= MAX_SHIP_CARGO {
                    let _ = colony.send_ship(ship, &load);
                }
            }
        }
    }

    let natives: Vec<(FactionId, ResourceBundle)> = colony
        .state
        .natives
        .active()
        .map(|m| (m.faction, m.outstanding()))
        .collect();
    for (faction, outstanding) in natives {
        let _ = colony.deliver_native_mission(faction, &outstanding);
    }

    if colony.state.population > colony.state.housing() {
        let _ = colony.start_construction(BuildingKind::House, SITE);
    }
}

fn validate_long_run(config: &SimConfig, days: u32, verbose: bool) -> Vec<TestResult> {
    println!("--- Long Run ({} days) ---", days);
    let mut results = Vec::new();
    let mut colony = new_colony(config);

    let _ = colony.start_construction(BuildingKind::Farm, FIELD);
    let _ = colony.start_construction(BuildingKind::Lumberyard, WOODS);
    let _ = colony.start_construction(BuildingKind::Mine, HILLS);
    let _ = colony.start_construction(BuildingKind::House, SITE);

    let step = 10;
    let mut elapsed = 0;
    let mut violation = None;
    let mut inconsistencies = 0;
    while elapsed < days {
        let span = step.min(days - elapsed);
        play_turn(&mut colony);
        let report = colony.advance(span);
        inconsistencies += report.inconsistencies.len();
        elapsed += span;
        if let Err(e) = check_invariants(&colony) {
            violation = Some(format!("day {}: {}", colony.date(), e));
            break;
        }
        if verbose && elapsed % 90 == 0 {
            println!(
                "  day {:4}: pop {:3}, money {:8.1}, food {:7.1}, buildings {}",
                colony.date(),
                colony.state.population,
                colony.state.ledger.money(),
                colony.state.ledger.get(ResourceKind::Food),
                colony.state.buildings.len()
            );
        }
    }

    if verbose {
        match serde_json::to_string(&colony.snapshot().reputation) {
            Ok(json) => println!("  reputation: {}", json),
            Err(e) => log::warn!("could not render reputation: {}", e),
        }
    }

    results.push(TestResult {
        name: "invariants_hold".into(),
        passed: violation.is_none(),
        detail: violation.unwrap_or_else(|| format!("checked every {} days up to day {}", step, colony.date())),
    });
    results.push(TestResult {
        name: "no_state_inconsistency".into(),
        passed: inconsistencies == 0,
        detail: format!("{} inconsistencies reported", inconsistencies),
    });

    let offered = colony.state.royal.offered;
    let resolved = colony.state.royal.completed + colony.state.royal.expired;
    results.push(TestResult {
        name: "royal_missions_cycle".into(),
        passed: offered >= 1 && resolved + 1 >= offered,
        detail: format!(
            "offered {}, completed {}, expired {}",
            offered, colony.state.royal.completed, colony.state.royal.expired
        ),
    });

    let completions = colony.events.count(EventCode::RoyalMissionCompleted) as u32;
    results.push(TestResult {
        name: "royal_completion_once".into(),
        passed: completions == colony.state.royal.completed,
        detail: format!("{} completion events", completions),
    });

    results
}

// ── 5. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(config: &SimConfig, _verbose: bool) -> Vec<TestResult> {
    println!("--- Save / Load ---");
    let mut results = Vec::new();
    let mut colony = new_colony(config);
    let _ = colony.start_construction(BuildingKind::Farm, FIELD);
    colony.advance(45);

    let mut buf = Vec::new();
    let saved = colony.save(&mut buf);
    let loaded = saved
        .map_err(|e| e.to_string())
        .and_then(|_| Colony::load(buf.as_slice()).map_err(|e| e.to_string()));
    results.push(TestResult {
        name: "save_load_roundtrip".into(),
        passed: matches!(&loaded, Ok(c) if c.state == colony.state),
        detail: format!("{} bytes", buf.len()),
    });

    let json = colony.snapshot().to_json();
    results.push(TestResult {
        name: "snapshot_json".into(),
        passed: json.is_ok(),
        detail: json.map_or_else(|e| e.to_string(), |j| format!("{} bytes", j.len())),
    });

    results
}
