//! Colony engine - main entry point for driving a colony
//!
//! Bundles the colony state with its config, RNG and event log, and exposes
//! every player intent. Each intent re-validates against the current state
//! and either applies fully or returns a [`ValidationError`] with nothing
//! changed.

use std::io::{Read, Write};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::buildings::{BuildingId, BuildingKind};
use crate::clock::{self, AdvanceReport};
use crate::colony::{self, ColonyState};
use crate::config::{ConfigError, SimConfig};
use crate::constants::Day;
use crate::construction::{self, DemolishReport, JobId, UpgradeJob};
use crate::error::ValidationError;
use crate::events::{EventLog, GameEvent};
use crate::factions::FactionId;
use crate::map::{ColonyMap, Position};
use crate::missions::{self, NativeDelivery};
use crate::persistence::{self, PersistenceError};
use crate::resources::ResourceBundle;
use crate::ships::{self, ShipId};
use crate::snapshot::ColonySnapshot;
use crate::trade::{self, TradeReceipt};

pub struct Colony {
    pub state: ColonyState,
    pub config: SimConfig,
    pub events: EventLog,
    rng: StdRng,
}

fn logged<T>(intent: &str, result: Result<T, ValidationError>) -> Result<T, ValidationError> {
    if let Err(err) = &result {
        log::debug!("{} rejected: {} ({})", intent, err, err.code());
    }
    result
}

impl Colony {
    /// Found a new colony with a settlement at `site`.
    pub fn new(config: SimConfig, map: ColonyMap, site: Position) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = ColonyState::found(&config, map, site);
        Self::from_parts(config, state)
    }

    /// Resume from existing state. The RNG is derived from the seed and the
    /// current date.
    pub fn from_parts(config: SimConfig, state: ColonyState) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = StdRng::seed_from_u64(config.seed ^ u64::from(state.date));
        let mut events = EventLog::new();
        events.set_day(state.date);
        Ok(Self {
            state,
            config,
            events,
            rng,
        })
    }

    pub fn date(&self) -> Day {
        self.state.date
    }

    pub fn snapshot(&self) -> ColonySnapshot {
        ColonySnapshot::capture(&self.state)
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    pub fn advance(&mut self, days: Day) -> AdvanceReport {
        self.events.set_day(self.state.date.saturating_add(days));
        clock::advance(&mut self.state, days, &self.config, &mut self.rng, &mut self.events)
    }

    pub fn start_construction(&mut self, kind: BuildingKind, pos: Position) -> Result<JobId, ValidationError> {
        logged(
            "start_construction",
            construction::start_construction(&mut self.state, kind, pos, &mut self.events),
        )
    }

    pub fn cancel_construction(&mut self, job: JobId) -> Result<(), ValidationError> {
        logged(
            "cancel_construction",
            construction::cancel_construction(&mut self.state, job, &mut self.events).map(|_| ()),
        )
    }

    pub fn start_upgrade(&mut self, building: BuildingId) -> Result<(), ValidationError> {
        logged(
            "start_upgrade",
            construction::start_upgrade(&mut self.state, building, &mut self.events),
        )
    }

    pub fn cancel_upgrade(&mut self, building: BuildingId) -> Result<UpgradeJob, ValidationError> {
        logged(
            "cancel_upgrade",
            construction::cancel_upgrade(&mut self.state, building, &mut self.events),
        )
    }

    pub fn degrade_or_demolish(&mut self, building: BuildingId) -> Result<DemolishReport, ValidationError> {
        logged(
            "degrade_or_demolish",
            construction::degrade_or_demolish(&mut self.state, building, &mut self.events),
        )
    }

    pub fn assign_workers(&mut self, building: BuildingId, count: u32) -> Result<(), ValidationError> {
        logged(
            "assign_workers",
            colony::assign_workers(&mut self.state, building, count, &mut self.events),
        )
    }

    pub fn send_ship(&mut self, ship: ShipId, cargo: &ResourceBundle) -> Result<Day, ValidationError> {
        logged(
            "send_ship",
            ships::send_ship(&mut self.state, ship, cargo, &self.config, &mut self.events),
        )
    }

    pub fn order_colonists(&mut self, count: u32) -> Result<ShipId, ValidationError> {
        logged(
            "order_colonists",
            ships::order_colonists(&mut self.state, count, &self.config, &mut self.events),
        )
    }

    pub fn execute_trade(
        &mut self,
        faction: FactionId,
        sell: &ResourceBundle,
        buy: &ResourceBundle,
    ) -> Result<TradeReceipt, ValidationError> {
        logged(
            "execute_trade",
            trade::execute_trade(&mut self.state, faction, sell, buy, &self.config, &mut self.events),
        )
    }

    pub fn pay_mission_shortfall(&mut self) -> Result<f64, ValidationError> {
        logged(
            "pay_mission_shortfall",
            missions::pay_mission_shortfall(&mut self.state, &self.config, &mut self.events),
        )
    }

    pub fn deliver_native_mission(
        &mut self,
        faction: FactionId,
        goods: &ResourceBundle,
    ) -> Result<NativeDelivery, ValidationError> {
        logged(
            "deliver_native_mission",
            missions::deliver_native_mission(&mut self.state, faction, goods, &self.config, &mut self.events),
        )
    }

    pub fn save<W: Write>(&self, writer: W) -> Result<(), PersistenceError> {
        persistence::save_colony(writer, &self.config, &self.state)
    }

    pub fn load<R: Read>(reader: R) -> Result<Self, PersistenceError> {
        let data = persistence::load_colony(reader)?;
        Ok(Self::from_parts(data.config, data.state)?)
    }
}
