//! Ship logistics.
//!
//! Each ship is a small state machine whose state carries only the data
//! valid in that state:
//!
//! ```text
//! InPort ──send──▶ ToForeignPort ──arrival──▶ InForeignPort ──dwell──▶ Returning ──arrival──▶ InPort
//! ```
//!
//! Cargo exists only while sailing out. It is diverted into the royal
//! mission when loaded and again on arrival, and whatever remains is sold
//! at the Crown market. Ordered colonists ride with the ship until it is
//! back home.
//!
//! Resolution is driven by dates: a ship transitions only when its next
//! event day has been reached, so resolving twice on the same date is a
//! no-op.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::clock::report_inconsistency;
use crate::colony::ColonyState;
use crate::config::SimConfig;
use crate::constants::{Day, DWELL_DAYS, MAX_SHIP_CARGO};
use crate::error::{StateInconsistency, ValidationError};
use crate::events::{EventCode, EventParams, EventSink, Severity};
use crate::missions::divert_to_royal;
use crate::resources::{ResourceBundle, ResourceKind};
use crate::trade::sell_at_market;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShipId(pub u32);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShipState {
    InPort {
        since: Day,
    },
    ToForeignPort {
        departed: Day,
        arrival: Day,
        cargo: ResourceBundle,
    },
    InForeignPort {
        arrived: Day,
        dwell_end: Day,
    },
    Returning {
        departed: Day,
        arrival: Day,
    },
}

/// Data-free view of [`ShipState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipStatus {
    InPort,
    ToForeignPort,
    InForeignPort,
    Returning,
}

impl ShipStatus {
    pub fn name(self) -> &'static str {
        match self {
            Self::InPort => "in_port",
            Self::ToForeignPort => "to_foreign_port",
            Self::InForeignPort => "in_foreign_port",
            Self::Returning => "returning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    pub id: ShipId,
    pub state: ShipState,
    pub pending_colonists: u32,
}

impl Ship {
    pub fn status(&self) -> ShipStatus {
        match self.state {
            ShipState::InPort { .. } => ShipStatus::InPort,
            ShipState::ToForeignPort { .. } => ShipStatus::ToForeignPort,
            ShipState::InForeignPort { .. } => ShipStatus::InForeignPort,
            ShipState::Returning { .. } => ShipStatus::Returning,
        }
    }

    /// Day of the next scheduled transition. Ships in port have none.
    pub fn next_event(&self) -> Option<Day> {
        match self.state {
            ShipState::InPort { .. } => None,
            ShipState::ToForeignPort { arrival, .. } => Some(arrival),
            ShipState::InForeignPort { dwell_end, .. } => Some(dwell_end),
            ShipState::Returning { arrival, .. } => Some(arrival),
        }
    }

    pub fn cargo(&self) -> Option<&ResourceBundle> {
        match &self.state {
            ShipState::ToForeignPort { cargo, .. } => Some(cargo),
            _ => None,
        }
    }

    fn mismatch(&self, expected: ShipStatus) -> StateInconsistency {
        StateInconsistency::ShipState {
            ship: self.id,
            expected: expected.name(),
            found: self.status().name(),
        }
    }

    fn depart(&mut self, now: Day, arrival: Day, cargo: ResourceBundle) -> Result<(), StateInconsistency> {
        if self.status() != ShipStatus::InPort {
            return Err(self.mismatch(ShipStatus::InPort));
        }
        self.state = ShipState::ToForeignPort {
            departed: now,
            arrival,
            cargo,
        };
        Ok(())
    }

    /// Dwell is counted from the scheduled arrival, not the day resolved.
    fn arrive_foreign(&mut self) -> Result<ResourceBundle, StateInconsistency> {
        let ShipState::ToForeignPort { arrival: arrived, .. } = self.state else {
            return Err(self.mismatch(ShipStatus::ToForeignPort));
        };
        let previous = std::mem::replace(
            &mut self.state,
            ShipState::InForeignPort {
                arrived,
                dwell_end: arrived.saturating_add(DWELL_DAYS),
            },
        );
        match previous {
            ShipState::ToForeignPort { cargo, .. } => Ok(cargo),
            _ => Ok(ResourceBundle::new()),
        }
    }

    fn leave_foreign(&mut self, return_days: Day) -> Result<Day, StateInconsistency> {
        let ShipState::InForeignPort { dwell_end, .. } = self.state else {
            return Err(self.mismatch(ShipStatus::InForeignPort));
        };
        let arrival = dwell_end.saturating_add(return_days);
        self.state = ShipState::Returning {
            departed: dwell_end,
            arrival,
        };
        Ok(arrival)
    }

    /// Returns the colonists that disembark.
    fn arrive_home(&mut self) -> Result<u32, StateInconsistency> {
        let ShipState::Returning { arrival, .. } = self.state else {
            return Err(self.mismatch(ShipStatus::Returning));
        };
        self.state = ShipState::InPort { since: arrival };
        Ok(std::mem::take(&mut self.pending_colonists))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fleet {
    ships: Vec<Ship>,
}

impl Fleet {
    /// `count` ships, all in port since `day`.
    pub fn new(count: u32, day: Day) -> Self {
        Self {
            ships: (0..count)
                .map(|i| Ship {
                    id: ShipId(i),
                    state: ShipState::InPort { since: day },
                    pending_colonists: 0,
                })
                .collect(),
        }
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub fn get(&self, id: ShipId) -> Option<&Ship> {
        self.ships.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: ShipId) -> Option<&mut Ship> {
        self.ships.iter_mut().find(|s| s.id == id)
    }

    fn ids(&self) -> Vec<ShipId> {
        self.ships.iter().map(|s| s.id).collect()
    }

    /// Ship that carries newly ordered colonists: the outbound ship arriving
    /// first (lowest id on ties), otherwise the first ship in port.
    pub fn colonist_carrier(&self) -> Option<ShipId> {
        let outbound = self
            .ships
            .iter()
            .filter_map(|s| match s.state {
                ShipState::ToForeignPort { arrival, .. } => Some((arrival, s.id)),
                _ => None,
            })
            .min();
        outbound.map(|(_, id)| id).or_else(|| {
            self.ships
                .iter()
                .find(|s| s.status() == ShipStatus::InPort)
                .map(|s| s.id)
        })
    }
}

/// Days from `now` until a ship carrying `cargo` reaches the foreign port.
pub fn outbound_days(cargo: &ResourceBundle, state: &ColonyState, config: &SimConfig) -> Day {
    let load = if config.load_per_day > 0.0 {
        (cargo.total() / config.load_per_day).ceil() as Day
    } else {
        0
    };
    let travel = (config.outbound_travel_days as f64 * state.nation.ship_speed_modifier()).round() as Day;
    load.saturating_add(travel)
}

fn validate_cargo(cargo: &ResourceBundle) -> Result<(), ValidationError> {
    if cargo.contains_money() {
        return Err(ValidationError::MoneyNotGoods);
    }
    if cargo.has_negative() {
        return Err(ValidationError::NegativeAmount);
    }
    let total = cargo.total();
    if total > MAX_SHIP_CARGO {
        return Err(ValidationError::CargoOverCapacity {
            total,
            capacity: MAX_SHIP_CARGO,
        });
    }
    Ok(())
}

/// Load `cargo` from the stockpile and dispatch an in-port ship.
/// Returns the arrival day abroad.
pub fn send_ship(
    state: &mut ColonyState,
    id: ShipId,
    cargo: &ResourceBundle,
    config: &SimConfig,
    events: &mut impl EventSink,
) -> Result<Day, ValidationError> {
    let ship = state.fleet.get(id).ok_or(ValidationError::UnknownShip(id))?;
    if ship.status() != ShipStatus::InPort {
        return Err(ValidationError::ShipNotInPort(id));
    }
    validate_cargo(cargo)?;
    state.ledger.spend(cargo)?;

    let arrival = state.date.saturating_add(outbound_days(cargo, state, config));
    let mut hold = cargo.clone();
    divert_to_royal(state, &mut hold, config, events);
    dispatch(state, id, arrival, hold, EventCode::ShipDeparted, events);
    Ok(arrival)
}

fn dispatch(
    state: &mut ColonyState,
    id: ShipId,
    arrival: Day,
    cargo: ResourceBundle,
    code: EventCode,
    events: &mut impl EventSink,
) {
    let now = state.date;
    let load = cargo.total();
    let Some(ship) = state.fleet.get_mut(id) else {
        return;
    };
    if let Err(err) = ship.depart(now, arrival, cargo) {
        report_inconsistency(&err, events);
        return;
    }
    log::info!("{:?} sailed with {:.1} cargo, arriving day {}", id, load, arrival);
    events.emit_event(
        code,
        Severity::Info,
        EventParams::new()
            .int("ship", id.0)
            .num("cargo", load)
            .int("arrival", arrival),
    );
}

fn resolve_ship(
    state: &mut ColonyState,
    id: ShipId,
    config: &SimConfig,
    rng: &mut impl Rng,
    events: &mut impl EventSink,
) -> Result<(), StateInconsistency> {
    loop {
        let Some(ship) = state.fleet.get_mut(id) else {
            return Ok(());
        };
        match ship.next_event() {
            Some(day) if day <= state.date => {}
            _ => return Ok(()),
        }

        match ship.status() {
            ShipStatus::ToForeignPort => {
                let mut cargo = ship.arrive_foreign()?;
                events.emit_event(
                    EventCode::ShipArrivedForeign,
                    Severity::Info,
                    EventParams::new().int("ship", id.0),
                );
                divert_to_royal(state, &mut cargo, config, events);
                sell_at_market(state, &cargo, config, events);
            }
            ShipStatus::InForeignPort => {
                let rolled = rng.gen_range(config.return_travel_min_days..=config.return_travel_max_days);
                let days = (rolled as f64 * state.nation.ship_speed_modifier()).round() as Day;
                let arrival = ship.leave_foreign(days)?;
                events.emit_event(
                    EventCode::ShipReturning,
                    Severity::Info,
                    EventParams::new().int("ship", id.0).int("arrival", arrival),
                );
            }
            ShipStatus::Returning => {
                let colonists = ship.arrive_home()?;
                log::info!("{:?} home with {} colonists", id, colonists);
                events.emit_event(
                    EventCode::ShipArrivedHome,
                    Severity::Info,
                    EventParams::new().int("ship", id.0),
                );
                if colonists > 0 {
                    state.population += colonists;
                    events.emit_event(
                        EventCode::ColonistsArrived,
                        Severity::Notice,
                        EventParams::new()
                            .int("ship", id.0)
                            .int("colonists", colonists),
                    );
                }
            }
            ShipStatus::InPort => return Ok(()),
        }
    }
}

/// Run every ship through the transitions whose day has been reached.
pub fn resolve_ships(
    state: &mut ColonyState,
    config: &SimConfig,
    rng: &mut impl Rng,
    events: &mut impl EventSink,
) -> Vec<StateInconsistency> {
    let mut problems = Vec::new();
    for id in state.fleet.ids() {
        if let Err(err) = resolve_ship(state, id, config, rng, events) {
            problems.push(err);
        }
    }
    problems
}

/// Dispatch ships that have idled in port past the timeout, empty.
pub fn auto_sail(state: &mut ColonyState, config: &SimConfig, events: &mut impl EventSink) -> usize {
    let idle: Vec<ShipId> = state
        .fleet
        .ships()
        .iter()
        .filter(|s| matches!(s.state, ShipState::InPort { since } if state.date.saturating_sub(since) >= config.auto_sail_after_days))
        .map(|s| s.id)
        .collect();

    let empty = ResourceBundle::new();
    let arrival = state.date.saturating_add(outbound_days(&empty, state, config));
    for id in &idle {
        dispatch(state, *id, arrival, ResourceBundle::new(), EventCode::ShipAutoSailed, events);
    }
    idle.len()
}

/// Buy colonists from the Crown and attach them to a ship.
pub fn order_colonists(
    state: &mut ColonyState,
    count: u32,
    config: &SimConfig,
    events: &mut impl EventSink,
) -> Result<ShipId, ValidationError> {
    if count == 0 {
        return Err(ValidationError::ZeroCount);
    }
    let id = state
        .fleet
        .colonist_carrier()
        .ok_or(ValidationError::NoShipAvailable)?;
    let price = config.colonist_price * count as f64;
    state
        .ledger
        .spend(&ResourceBundle::new().with(ResourceKind::Money, price))?;

    if let Some(ship) = state.fleet.get_mut(id) {
        ship.pending_colonists += count;
    }
    events.emit_event(
        EventCode::ColonistsOrdered,
        Severity::Info,
        EventParams::new()
            .int("ship", id.0)
            .int("colonists", count)
            .num("price", price),
    );
    Ok(id)
}
