//! Fixed rules of the simulation.
//!
//! Unlike [`crate::config::SimConfig`], these values are structural and are
//! never tuned per game: changing them changes the meaning of saved state.

/// Simulation date, counted in whole days since the colony was founded.
pub type Day = u32;

/// Maximum total cargo (summed over all resource kinds) a ship can carry.
pub const MAX_SHIP_CARGO: f64 = 300.0;

/// Days a ship waits at the foreign port before sailing home.
pub const DWELL_DAYS: Day = 7;

/// Non-district buildings allowed in one settlement cell.
pub const MAX_SETTLEMENT_SLOTS: usize = 5;

/// Highest level a building can be upgraded to.
pub const MAX_LEVEL: u8 = 2;

/// Fraction of a level's cost returned when it is degraded or demolished.
pub const DEMOLISH_REFUND: f64 = 0.5;

pub const REPUTATION_MIN: f64 = 0.0;
pub const REPUTATION_MAX: f64 = 100.0;

/// Amounts below this are treated as zero when comparing ledgers.
pub const EPSILON: f64 = 1e-9;

pub mod pricing {
    /// Sell multiplier at reputation 0; rises linearly to 1.0 at reputation 100.
    pub const SELL_AT_ZERO_REP: f64 = 0.5;
    /// Buy multiplier at reputation 0; falls linearly to 1.0 at reputation 100.
    pub const BUY_AT_ZERO_REP: f64 = 2.0;
    /// A trade counts as generous when the partner's margin reaches this
    /// multiple of the value of the goods they provided.
    pub const GENEROUS_MARGIN_RATIO: f64 = 2.0;
}
