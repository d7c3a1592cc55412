//! Colony economy and logistics simulation for Tradewinds.
//!
//! This crate holds all game logic independent of rendering, text and input.
//! Every operation takes an explicit [`colony::ColonyState`] plus whatever
//! it needs (config, RNG, event sink) and either applies fully or is
//! rejected with a reason code. [`engine::Colony`] bundles those pieces for
//! frontends and the headless harness.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`buildings`] | Building kinds, the static catalog, the building roster |
//! | [`clock`] | Multi-day advance: food, starvation, production, transitions |
//! | [`colony`] | Colony state and workforce rules |
//! | [`config`] | Tunable parameters, loadable from JSON |
//! | [`constants`] | Fixed structural limits (cargo, dwell, slots, levels) |
//! | [`construction`] | Construction and upgrade jobs, cancellation, demolition |
//! | [`engine`] | `Colony` facade exposing every player intent |
//! | [`error`] | Validation errors with reason codes, state inconsistencies |
//! | [`events`] | Structured event codes and sinks |
//! | [`factions`] | Nations, trading partners, declarative bonus tables |
//! | [`map`] | Terrain grid and deposits |
//! | [`missions`] | Royal and native missions |
//! | [`persistence`] | Versioned bincode save/load |
//! | [`production`] | Per-building production under workforce and scarcity |
//! | [`reputation`] | Per-faction reputation and price multipliers |
//! | [`resources`] | Resource kinds, bundles and the colony ledger |
//! | [`ships`] | Ship state machine, voyages, colonist orders |
//! | [`snapshot`] | Read-only view for presentation |
//! | [`trade`] | Native barter and Crown market sales |

pub mod buildings;
pub mod clock;
pub mod colony;
pub mod config;
pub mod constants;
pub mod construction;
pub mod engine;
pub mod error;
pub mod events;
pub mod factions;
pub mod map;
pub mod missions;
pub mod persistence;
pub mod production;
pub mod reputation;
pub mod resources;
pub mod ships;
pub mod snapshot;
pub mod trade;
