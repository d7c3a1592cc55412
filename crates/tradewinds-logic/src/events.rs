//! Structured, unlocalized event emission.
//!
//! The core never formats text for players. Every observable transition is
//! reported as an [`EventCode`] plus typed parameters through an
//! [`EventSink`]; the presentation layer owns wording and translation.

use serde::Serialize;

use crate::constants::Day;

/// How loudly the presentation layer should surface an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Info,
    Notice,
    Warning,
    Critical,
    /// An orchestration bug was detected and logged.
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventCode {
    // Construction
    ConstructionStarted,
    ConstructionCompleted,
    ConstructionCancelled,
    UpgradeStarted,
    UpgradeCompleted,
    UpgradeCancelled,
    UpgradeForfeited,
    BuildingDegraded,
    BuildingDemolished,
    WorkersAssigned,
    // Logistics
    ShipDeparted,
    ShipAutoSailed,
    ShipArrivedForeign,
    ShipReturning,
    ShipArrivedHome,
    CargoSold,
    ColonistsOrdered,
    ColonistsArrived,
    // Trade & reputation
    TradeExecuted,
    ReputationChanged,
    // Missions
    MissionCargoDiverted,
    RoyalMissionOffered,
    RoyalMissionPaid,
    RoyalMissionCompleted,
    RoyalMissionExpired,
    NativeMissionOffered,
    NativeMissionProgress,
    NativeMissionCompleted,
    NativeMissionExpired,
    // Colony
    Overcrowding,
    Starvation,
    ColonistsDied,
    // Diagnostics
    StateInconsistency,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Param {
    Int(i64),
    Num(f64),
    Name(&'static str),
}

/// Ordered key/value parameters of one event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventParams(Vec<(&'static str, Param)>);

impl EventParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn int(mut self, key: &'static str, value: impl Into<i64>) -> Self {
        self.0.push((key, Param::Int(value.into())));
        self
    }

    pub fn num(mut self, key: &'static str, value: f64) -> Self {
        self.0.push((key, Param::Num(value)));
        self
    }

    pub fn name(mut self, key: &'static str, value: &'static str) -> Self {
        self.0.push((key, Param::Name(value)));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Param> {
        self.0.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, Param)> {
        self.0.iter()
    }
}

/// Receiver of simulation events.
pub trait EventSink {
    fn emit_event(&mut self, code: EventCode, severity: Severity, params: EventParams);
}

/// One recorded event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameEvent {
    pub day: Day,
    pub code: EventCode,
    pub severity: Severity,
    pub params: EventParams,
}

/// In-memory sink. Stamps each event with the day set by the clock.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    day: Day,
    events: Vec<GameEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_day(&mut self, day: Day) {
        self.day = day;
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn count(&self, code: EventCode) -> usize {
        self.events.iter().filter(|e| e.code == code).count()
    }

    pub fn last(&self, code: EventCode) -> Option<&GameEvent> {
        self.events.iter().rev().find(|e| e.code == code)
    }
}

impl EventSink for EventLog {
    fn emit_event(&mut self, code: EventCode, severity: Severity, params: EventParams) {
        self.events.push(GameEvent {
            day: self.day,
            code,
            severity,
            params,
        });
    }
}

/// Forwards events to the `log` facade; useful for headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit_event(&mut self, code: EventCode, severity: Severity, params: EventParams) {
        let level = match severity {
            Severity::Info | Severity::Notice => log::Level::Info,
            Severity::Warning => log::Level::Warn,
            Severity::Critical | Severity::Fatal => log::Level::Error,
        };
        log::log!(level, "{:?} {:?}", code, params);
    }
}
