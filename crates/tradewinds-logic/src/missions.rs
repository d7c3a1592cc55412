//! Royal and native missions.
//!
//! The Crown holds a single mission slot. Each new royal mission compounds
//! the previous difficulty by a random growth factor; each success damps
//! that growth a little. Goods shipped abroad are diverted into the active
//! royal mission before anything is sold, and the remaining shortfall can be
//! settled in currency.
//!
//! Every native faction has its own slot, offered at random once the
//! colony is established and the faction's cooldown has passed. Native
//! missions are fulfilled from the colony stockpile, and the reward is
//! larger the earlier they are completed.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::colony::ColonyState;
use crate::config::SimConfig;
use crate::constants::Day;
use crate::error::ValidationError;
use crate::events::{EventCode, EventParams, EventSink, Severity};
use crate::factions::FactionId;
use crate::resources::{ResourceBundle, ResourceKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoyalMission {
    pub required: ResourceBundle,
    pub delivered: ResourceBundle,
    pub difficulty: f64,
    pub offered: Day,
    pub deadline: Day,
}

impl RoyalMission {
    pub fn outstanding(&self) -> ResourceBundle {
        self.required.saturating_sub(&self.delivered)
    }

    pub fn is_fulfilled(&self) -> bool {
        self.outstanding().is_empty()
    }

    /// Currency that settles the remaining requirement.
    pub fn shortfall_price(&self) -> f64 {
        self.outstanding().market_value() * self.difficulty
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoyalMissions {
    pub active: Option<RoyalMission>,
    /// Difficulty of the most recent mission.
    pub difficulty: f64,
    /// Scales the random growth applied to the next mission.
    pub growth_damping: f64,
    /// Earliest day the next mission may be offered.
    pub next_offer: Day,
    pub offered: u32,
    pub completed: u32,
    pub expired: u32,
}

impl RoyalMissions {
    pub fn new(base_difficulty: f64) -> Self {
        Self {
            active: None,
            difficulty: base_difficulty,
            growth_damping: 1.0,
            next_offer: 0,
            offered: 0,
            completed: 0,
            expired: 0,
        }
    }
}

/// Offer a new royal mission if the slot is free and the cooldown has run.
pub fn offer_royal_mission(
    state: &mut ColonyState,
    config: &SimConfig,
    rng: &mut impl Rng,
    events: &mut impl EventSink,
) -> bool {
    let royal = &mut state.royal;
    if royal.active.is_some() || state.date < royal.next_offer {
        return false;
    }

    let difficulty = if royal.offered == 0 {
        royal.difficulty
    } else {
        let growth = rng.gen_range(config.royal_growth_min..=config.royal_growth_max);
        royal.difficulty * (1.0 + growth * royal.growth_damping)
    };
    let amount = (config.royal_base_amount * difficulty).round();
    let required: ResourceBundle = FactionId::Crown
        .wanted_goods()
        .choose_multiple(rng, config.royal_goods_per_mission)
        .map(|kind| (*kind, amount))
        .collect();
    let deadline = state.date.saturating_add(config.royal_deadline_days);

    royal.difficulty = difficulty;
    royal.offered += 1;
    royal.active = Some(RoyalMission {
        required,
        delivered: ResourceBundle::new(),
        difficulty,
        offered: state.date,
        deadline,
    });

    log::info!("royal mission offered, difficulty {:.3}, deadline day {}", difficulty, deadline);
    events.emit_event(
        EventCode::RoyalMissionOffered,
        Severity::Notice,
        EventParams::new()
            .num("difficulty", difficulty)
            .int("deadline", deadline),
    );
    true
}

fn complete_royal_mission(state: &mut ColonyState, config: &SimConfig, events: &mut impl EventSink) {
    let Some(mission) = state.royal.active.take() else {
        return;
    };
    let gained = state.reputation.adjust(
        FactionId::Crown,
        config.royal_reward_per_difficulty * mission.difficulty,
    );
    let royal = &mut state.royal;
    royal.completed += 1;
    royal.growth_damping *= config.royal_growth_decay;
    royal.next_offer = state.date.saturating_add(config.royal_offer_cooldown_days);

    log::info!("royal mission completed, reputation +{:.2}", gained);
    events.emit_event(
        EventCode::RoyalMissionCompleted,
        Severity::Notice,
        EventParams::new()
            .num("difficulty", mission.difficulty)
            .num("reputation", gained),
    );
}

/// Move cargo the active royal mission still needs out of `cargo` and into
/// the mission. Completes the mission when nothing is outstanding.
/// Returns what was diverted.
pub fn divert_to_royal(
    state: &mut ColonyState,
    cargo: &mut ResourceBundle,
    config: &SimConfig,
    events: &mut impl EventSink,
) -> ResourceBundle {
    let Some(mission) = state.royal.active.as_mut() else {
        return ResourceBundle::new();
    };

    let mut diverted = ResourceBundle::new();
    for (kind, needed) in mission.outstanding().iter() {
        let take = cargo.get(kind).min(needed);
        if take > 0.0 {
            cargo.add(kind, -take);
            mission.delivered.add(kind, take);
            diverted.add(kind, take);
        }
    }
    if diverted.is_empty() {
        return diverted;
    }

    let fulfilled = mission.is_fulfilled();
    events.emit_event(
        EventCode::MissionCargoDiverted,
        Severity::Info,
        EventParams::new()
            .name("faction", FactionId::Crown.name())
            .num("amount", diverted.total()),
    );
    if fulfilled {
        complete_royal_mission(state, config, events);
    }
    diverted
}

/// Settle the active royal mission's shortfall in currency.
/// Returns the amount paid.
pub fn pay_mission_shortfall(
    state: &mut ColonyState,
    config: &SimConfig,
    events: &mut impl EventSink,
) -> Result<f64, ValidationError> {
    let mission = state
        .royal
        .active
        .as_ref()
        .ok_or(ValidationError::NoRoyalMission)?;
    if mission.is_fulfilled() {
        return Err(ValidationError::NothingToPay);
    }
    let price = mission.shortfall_price();
    state
        .ledger
        .spend(&ResourceBundle::new().with(ResourceKind::Money, price))?;

    if let Some(mission) = state.royal.active.as_mut() {
        mission.delivered = mission.required.clone();
    }
    events.emit_event(
        EventCode::RoyalMissionPaid,
        Severity::Info,
        EventParams::new().num("paid", price),
    );
    complete_royal_mission(state, config, events);
    Ok(price)
}

/// Clear the royal mission once its deadline has passed.
pub fn expire_royal_mission(state: &mut ColonyState, config: &SimConfig, events: &mut impl EventSink) -> bool {
    let overdue = matches!(&state.royal.active, Some(m) if state.date > m.deadline);
    if !overdue {
        return false;
    }
    let Some(mission) = state.royal.active.take() else {
        return false;
    };
    let lost = state.reputation.adjust(
        FactionId::Crown,
        -config.royal_penalty_per_difficulty * mission.difficulty,
    );
    state.royal.expired += 1;
    state.royal.next_offer = state.date.saturating_add(config.royal_offer_cooldown_days);

    log::warn!("royal mission expired, reputation {:.2}", lost);
    events.emit_event(
        EventCode::RoyalMissionExpired,
        Severity::Warning,
        EventParams::new()
            .num("difficulty", mission.difficulty)
            .num("reputation", lost),
    );
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeMission {
    pub faction: FactionId,
    pub required: ResourceBundle,
    pub delivered: ResourceBundle,
    pub offered: Day,
    pub deadline: Day,
}

impl NativeMission {
    pub fn outstanding(&self) -> ResourceBundle {
        self.required.saturating_sub(&self.delivered)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeMissionSlot {
    pub active: Option<NativeMission>,
    /// Compounds after every offer.
    pub multiplier: f64,
    pub cooldown_until: Day,
    pub completed: u32,
    pub expired: u32,
}

impl Default for NativeMissionSlot {
    fn default() -> Self {
        Self {
            active: None,
            multiplier: 1.0,
            cooldown_until: 0,
            completed: 0,
            expired: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeMissions {
    slots: BTreeMap<FactionId, NativeMissionSlot>,
}

impl Default for NativeMissions {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeMissions {
    pub fn new() -> Self {
        Self {
            slots: FactionId::NATIVES
                .iter()
                .map(|f| (*f, NativeMissionSlot::default()))
                .collect(),
        }
    }

    pub fn slot(&self, faction: FactionId) -> Option<&NativeMissionSlot> {
        self.slots.get(&faction)
    }

    pub fn active(&self) -> impl Iterator<Item = &NativeMission> {
        self.slots.values().filter_map(|s| s.active.as_ref())
    }

    fn slot_mut(&mut self, faction: FactionId) -> Option<&mut NativeMissionSlot> {
        self.slots.get_mut(&faction)
    }
}

/// Days of the window `(today - days, today]` that fall on or after `opens`.
fn eligible_days(today: Day, days: Day, opens: Day) -> Day {
    if today < opens {
        0
    } else {
        days.min(today - opens + 1)
    }
}

/// Expire overdue native missions, then roll new offers for eligible
/// factions. `days` is the length of the window just advanced.
pub fn evaluate_native_missions(
    state: &mut ColonyState,
    days: Day,
    config: &SimConfig,
    rng: &mut impl Rng,
    events: &mut impl EventSink,
) {
    let today = state.date;
    for faction in FactionId::NATIVES {
        let Some(slot) = state.natives.slot_mut(faction) else {
            continue;
        };

        if matches!(&slot.active, Some(m) if today > m.deadline) {
            slot.active = None;
            slot.expired += 1;
            slot.cooldown_until = today.saturating_add(config.native_cooldown_days);
            let lost = state.reputation.adjust(faction, -config.native_penalty);
            log::warn!("{:?} mission expired", faction);
            events.emit_event(
                EventCode::NativeMissionExpired,
                Severity::Warning,
                EventParams::new()
                    .name("faction", faction.name())
                    .num("reputation", lost),
            );
            continue;
        }

        if slot.active.is_some() {
            continue;
        }
        let window = eligible_days(today, days, config.native_start_day.max(slot.cooldown_until));
        if window == 0 {
            continue;
        }
        let chance = 1.0 - (1.0 - config.native_daily_chance.clamp(0.0, 1.0)).powf(f64::from(window));
        if !rng.gen_bool(chance.clamp(0.0, 1.0)) {
            continue;
        }

        let amount = (config.native_base_amount * slot.multiplier).round();
        let wanted = faction.wanted_goods();
        let count = rng.gen_range(1..=wanted.len().min(2));
        let required: ResourceBundle = wanted
            .choose_multiple(rng, count)
            .map(|kind| (*kind, amount))
            .collect();
        let deadline = today.saturating_add(config.native_duration_days);
        slot.multiplier *= config.native_multiplier_growth;
        slot.active = Some(NativeMission {
            faction,
            required,
            delivered: ResourceBundle::new(),
            offered: today,
            deadline,
        });

        log::info!("{:?} mission offered until day {}", faction, deadline);
        events.emit_event(
            EventCode::NativeMissionOffered,
            Severity::Notice,
            EventParams::new()
                .name("faction", faction.name())
                .int("deadline", deadline),
        );
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeDelivery {
    pub accepted: ResourceBundle,
    pub completed: bool,
    pub reputation_gained: f64,
}

/// Deliver goods from the stockpile toward a native mission. Only what the
/// mission still needs is taken.
pub fn deliver_native_mission(
    state: &mut ColonyState,
    faction: FactionId,
    goods: &ResourceBundle,
    config: &SimConfig,
    events: &mut impl EventSink,
) -> Result<NativeDelivery, ValidationError> {
    if !faction.is_native() {
        return Err(ValidationError::UnknownFaction(faction));
    }
    if goods.contains_money() {
        return Err(ValidationError::MoneyNotGoods);
    }
    if goods.has_negative() {
        return Err(ValidationError::NegativeAmount);
    }
    let mission = state
        .natives
        .slot(faction)
        .and_then(|s| s.active.as_ref())
        .ok_or(ValidationError::NoNativeMission(faction))?;

    let outstanding = mission.outstanding();
    let accepted: ResourceBundle = goods
        .iter()
        .map(|(kind, amount)| (kind, amount.min(outstanding.get(kind))))
        .collect();
    if accepted.is_empty() {
        return Err(ValidationError::NothingToDeliver);
    }
    state.ledger.spend(&accepted)?;

    let today = state.date;
    let Some(slot) = state.natives.slot_mut(faction) else {
        return Err(ValidationError::NoNativeMission(faction));
    };
    let Some(mission) = slot.active.as_mut() else {
        return Err(ValidationError::NoNativeMission(faction));
    };
    mission.delivered.merge(&accepted);

    if !mission.outstanding().is_empty() {
        events.emit_event(
            EventCode::NativeMissionProgress,
            Severity::Info,
            EventParams::new()
                .name("faction", faction.name())
                .num("amount", accepted.total()),
        );
        return Ok(NativeDelivery {
            accepted,
            completed: false,
            reputation_gained: 0.0,
        });
    }

    let span = mission.deadline.saturating_sub(mission.offered).max(1);
    let remaining = mission.deadline.saturating_sub(today);
    let reward = config.native_reward_base * (1.0 + remaining as f64 / span as f64);
    slot.active = None;
    slot.completed += 1;
    slot.cooldown_until = today.saturating_add(config.native_cooldown_days);
    let gained = state.reputation.adjust(faction, reward);

    log::info!("{:?} mission completed, reputation +{:.2}", faction, gained);
    events.emit_event(
        EventCode::NativeMissionCompleted,
        Severity::Notice,
        EventParams::new()
            .name("faction", faction.name())
            .num("reputation", gained),
    );
    Ok(NativeDelivery {
        accepted,
        completed: true,
        reputation_gained: gained,
    })
}
