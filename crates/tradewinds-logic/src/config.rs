//! Tunable simulation parameters.
//!
//! Every balancing number lives here so that a game (or a test) can load a
//! different profile from JSON without touching code. Structural limits that
//! would change the meaning of saved state live in [`crate::constants`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::Day;
use crate::factions::Nation;
use crate::resources::{ResourceBundle, ResourceKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for the simulation RNG.
    pub seed: u64,
    pub nation: Nation,

    // Founding
    pub start_population: u32,
    pub start_resources: ResourceBundle,
    pub start_ships: u32,
    pub initial_reputation: f64,

    // Food
    pub food_per_colonist: f64,
    /// Extra food per day for each colonist beyond housing capacity.
    pub overcrowding_food_surcharge: f64,
    /// Per-colonist survival chance per starvation day.
    pub starvation_survival_base: f64,

    // Shipping
    pub outbound_travel_days: Day,
    pub return_travel_min_days: Day,
    pub return_travel_max_days: Day,
    /// Cargo units loaded per day before departure.
    pub load_per_day: f64,
    /// Days a ship may sit idle in port before it sails on its own.
    pub auto_sail_after_days: Day,
    pub colonist_price: f64,

    // Reputation
    /// Accumulated trade value that earns one reputation point.
    pub trade_reputation_threshold: f64,

    // Royal missions
    pub royal_base_difficulty: f64,
    pub royal_growth_min: f64,
    pub royal_growth_max: f64,
    /// Factor applied to the growth damping after each success.
    pub royal_growth_decay: f64,
    pub royal_goods_per_mission: usize,
    pub royal_base_amount: f64,
    pub royal_deadline_days: Day,
    pub royal_offer_cooldown_days: Day,
    pub royal_reward_per_difficulty: f64,
    pub royal_penalty_per_difficulty: f64,

    // Native missions
    /// No native mission is offered before this day.
    pub native_start_day: Day,
    pub native_daily_chance: f64,
    pub native_base_amount: f64,
    pub native_duration_days: Day,
    pub native_cooldown_days: Day,
    pub native_multiplier_growth: f64,
    pub native_reward_base: f64,
    pub native_penalty: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            nation: Nation::England,

            start_population: 20,
            start_resources: ResourceBundle::new()
                .with(ResourceKind::Money, 1000.0)
                .with(ResourceKind::Food, 300.0)
                .with(ResourceKind::Wood, 400.0)
                .with(ResourceKind::Stone, 100.0)
                .with(ResourceKind::Tools, 30.0),
            start_ships: 2,
            initial_reputation: 50.0,

            food_per_colonist: 1.0,
            overcrowding_food_surcharge: 0.5,
            starvation_survival_base: 0.95,

            outbound_travel_days: 30,
            return_travel_min_days: 25,
            return_travel_max_days: 40,
            load_per_day: 100.0,
            auto_sail_after_days: 30,
            colonist_price: 60.0,

            trade_reputation_threshold: 1000.0,

            royal_base_difficulty: 1.0,
            royal_growth_min: 0.05,
            royal_growth_max: 0.15,
            royal_growth_decay: 0.9,
            royal_goods_per_mission: 2,
            royal_base_amount: 60.0,
            royal_deadline_days: 365,
            royal_offer_cooldown_days: 30,
            royal_reward_per_difficulty: 5.0,
            royal_penalty_per_difficulty: 10.0,

            native_start_day: 90,
            native_daily_chance: 0.02,
            native_base_amount: 30.0,
            native_duration_days: 180,
            native_cooldown_days: 60,
            native_multiplier_growth: 1.1,
            native_reward_base: 4.0,
            native_penalty: 5.0,
        }
    }
}

/// A profile that would let the simulation draw from an empty range or an
/// impossible probability.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field}: min {min} exceeds max {max}")]
    InvertedRange { field: &'static str, min: f64, max: f64 },
    #[error("{field} must be a probability in [0, 1], got {value}")]
    NotAProbability { field: &'static str, value: f64 },
    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
}

impl ConfigError {
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Json(_) => None,
            Self::InvertedRange { field, .. }
            | Self::NotAProbability { field, .. }
            | Self::Negative { field, .. }
            | Self::NotPositive { field, .. } => Some(field),
        }
    }
}

fn ordered(field: &'static str, min: f64, max: f64) -> Result<(), ConfigError> {
    if min.is_finite() && max.is_finite() && min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvertedRange { field, min, max })
    }
}

fn probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::NotAProbability { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

impl SimConfig {
    /// Parse and validate a profile. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject profiles the clock cannot run. Reports the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ordered(
            "return_travel_days",
            self.return_travel_min_days as f64,
            self.return_travel_max_days as f64,
        )?;
        ordered("royal_growth", self.royal_growth_min, self.royal_growth_max)?;

        probability("starvation_survival_base", self.starvation_survival_base)?;
        probability("native_daily_chance", self.native_daily_chance)?;

        non_negative("load_per_day", self.load_per_day)?;
        non_negative("food_per_colonist", self.food_per_colonist)?;
        non_negative("overcrowding_food_surcharge", self.overcrowding_food_surcharge)?;
        non_negative("colonist_price", self.colonist_price)?;
        non_negative("initial_reputation", self.initial_reputation)?;
        non_negative("royal_growth_decay", self.royal_growth_decay)?;
        non_negative("royal_base_amount", self.royal_base_amount)?;
        non_negative("native_base_amount", self.native_base_amount)?;
        non_negative("native_multiplier_growth", self.native_multiplier_growth)?;
        for (kind, amount) in self.start_resources.iter() {
            non_negative(kind.name(), amount)?;
        }

        positive("royal_base_difficulty", self.royal_base_difficulty)?;
        positive("royal_goods_per_mission", self.royal_goods_per_mission as f64)?;
        positive("trade_reputation_threshold", self.trade_reputation_threshold)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
