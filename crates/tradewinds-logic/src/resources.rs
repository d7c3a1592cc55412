//! Resource kinds, bundles of resources, and the colony's stock ledger.
//!
//! Quantities are `f64` so that fractional production accumulated over many
//! days does not drift through rounding. The ledger never holds a negative
//! amount: every removal is either validated up front ([`ResourceLedger::spend`])
//! or capped at availability ([`ResourceLedger::take_up_to`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::EPSILON;
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Currency. Tracked in the ledger but never shipped or traded as goods.
    Money,
    Food,
    Wood,
    Stone,
    Iron,
    Silver,
    Tools,
    Fur,
    Cloth,
    Sugar,
    Tobacco,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 11] = [
        Self::Money,
        Self::Food,
        Self::Wood,
        Self::Stone,
        Self::Iron,
        Self::Silver,
        Self::Tools,
        Self::Fur,
        Self::Cloth,
        Self::Sugar,
        Self::Tobacco,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Money => "money",
            Self::Food => "food",
            Self::Wood => "wood",
            Self::Stone => "stone",
            Self::Iron => "iron",
            Self::Silver => "silver",
            Self::Tools => "tools",
            Self::Fur => "fur",
            Self::Cloth => "cloth",
            Self::Sugar => "sugar",
            Self::Tobacco => "tobacco",
        }
    }

    /// Market value of one unit at parity, in money.
    pub fn base_price(self) -> f64 {
        match self {
            Self::Money => 1.0,
            Self::Food => 1.0,
            Self::Wood => 1.5,
            Self::Stone => 2.0,
            Self::Iron => 4.0,
            Self::Silver => 12.0,
            Self::Tools => 8.0,
            Self::Fur => 5.0,
            Self::Cloth => 7.0,
            Self::Sugar => 6.0,
            Self::Tobacco => 6.5,
        }
    }

    pub fn is_goods(self) -> bool {
        self != Self::Money
    }
}

/// A mapping resource kind → amount, used for costs, cargo and deliveries.
///
/// Zero entries are dropped so that equality and emptiness checks are exact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceBundle(BTreeMap<ResourceKind, f64>);

impl ResourceBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: ResourceKind, amount: f64) -> Self {
        self.add(kind, amount);
        self
    }

    pub fn get(&self, kind: ResourceKind) -> f64 {
        self.0.get(&kind).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, kind: ResourceKind, amount: f64) {
        if amount > EPSILON {
            self.0.insert(kind, amount);
        } else {
            self.0.remove(&kind);
        }
    }

    pub fn add(&mut self, kind: ResourceKind, amount: f64) {
        let next = self.get(kind) + amount;
        self.set(kind, next);
    }

    pub fn merge(&mut self, other: &ResourceBundle) {
        for (kind, amount) in other.iter() {
            self.add(kind, amount);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all amounts regardless of kind (cargo measure).
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// Market value at parity prices.
    pub fn market_value(&self) -> f64 {
        self.iter().map(|(k, v)| k.base_price() * v).sum()
    }

    pub fn scaled(&self, factor: f64) -> ResourceBundle {
        let mut out = ResourceBundle::new();
        for (kind, amount) in self.iter() {
            out.set(kind, amount * factor);
        }
        out
    }

    pub fn contains_money(&self) -> bool {
        self.get(ResourceKind::Money) > EPSILON
    }

    pub fn has_negative(&self) -> bool {
        self.0.values().any(|v| *v < 0.0 || !v.is_finite())
    }

    /// Per-kind `self - other`, floored at zero.
    pub fn saturating_sub(&self, other: &ResourceBundle) -> ResourceBundle {
        let mut out = ResourceBundle::new();
        for (kind, amount) in self.iter() {
            out.set(kind, (amount - other.get(kind)).max(0.0));
        }
        out
    }
}

impl FromIterator<(ResourceKind, f64)> for ResourceBundle {
    fn from_iter<I: IntoIterator<Item = (ResourceKind, f64)>>(iter: I) -> Self {
        let mut out = ResourceBundle::new();
        for (kind, amount) in iter {
            out.add(kind, amount);
        }
        out
    }
}

/// The colony's stockpile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceLedger {
    stock: ResourceBundle,
}

impl ResourceLedger {
    pub fn new(initial: ResourceBundle) -> Self {
        let mut ledger = Self::default();
        for (kind, amount) in initial.iter() {
            ledger.deposit(kind, amount);
        }
        ledger
    }

    pub fn get(&self, kind: ResourceKind) -> f64 {
        self.stock.get(kind)
    }

    pub fn money(&self) -> f64 {
        self.get(ResourceKind::Money)
    }

    pub fn stock(&self) -> &ResourceBundle {
        &self.stock
    }

    pub fn can_afford(&self, cost: &ResourceBundle) -> bool {
        cost.iter()
            .all(|(kind, amount)| self.get(kind) + EPSILON >= amount)
    }

    /// First resource the ledger is short of, with the missing amount.
    pub fn shortfall(&self, cost: &ResourceBundle) -> Option<(ResourceKind, f64)> {
        cost.iter()
            .find(|(kind, amount)| self.get(*kind) + EPSILON < *amount)
            .map(|(kind, amount)| (kind, amount - self.get(kind)))
    }

    /// Remove `cost` atomically: either every amount is removed or nothing is.
    pub fn spend(&mut self, cost: &ResourceBundle) -> Result<(), ValidationError> {
        if cost.has_negative() {
            return Err(ValidationError::NegativeAmount);
        }
        if let Some((resource, missing)) = self.shortfall(cost) {
            return Err(ValidationError::InsufficientResources { resource, missing });
        }
        for (kind, amount) in cost.iter() {
            let next = (self.get(kind) - amount).max(0.0);
            self.stock.set(kind, next);
        }
        Ok(())
    }

    pub fn deposit(&mut self, kind: ResourceKind, amount: f64) {
        if amount > 0.0 && amount.is_finite() {
            self.stock.add(kind, amount);
        }
    }

    pub fn deposit_all(&mut self, bundle: &ResourceBundle) {
        for (kind, amount) in bundle.iter() {
            self.deposit(kind, amount);
        }
    }

    /// Refund a fraction of a previously spent bundle.
    pub fn refund(&mut self, spent: &ResourceBundle, fraction: f64) {
        for (kind, amount) in spent.iter() {
            self.deposit(kind, amount * fraction);
        }
    }

    /// Remove up to `amount`, returning what was actually taken.
    pub fn take_up_to(&mut self, kind: ResourceKind, amount: f64) -> f64 {
        let available = self.get(kind);
        let taken = amount.max(0.0).min(available);
        self.stock.set(kind, available - taken);
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_drops_zero_entries() {
        let mut b = ResourceBundle::new().with(ResourceKind::Wood, 10.0);
        b.add(ResourceKind::Wood, -10.0);
        assert!(b.is_empty());
    }

    #[test]
    fn test_bundle_total_and_value() {
        let b = ResourceBundle::new()
            .with(ResourceKind::Food, 100.0)
            .with(ResourceKind::Tools, 10.0);
        assert_eq!(b.total(), 110.0);
        assert!((b.market_value() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_spend_is_atomic() {
        let mut ledger = ResourceLedger::new(
            ResourceBundle::new()
                .with(ResourceKind::Wood, 100.0)
                .with(ResourceKind::Stone, 5.0),
        );
        let before = ledger.clone();
        let cost = ResourceBundle::new()
            .with(ResourceKind::Wood, 50.0)
            .with(ResourceKind::Stone, 10.0);
        let err = ledger.spend(&cost).unwrap_err();
        assert_eq!(err.code(), "insufficient_resources");
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_spend_and_refund() {
        let mut ledger = ResourceLedger::new(ResourceBundle::new().with(ResourceKind::Iron, 60.0));
        let cost = ResourceBundle::new().with(ResourceKind::Iron, 50.0);
        ledger.spend(&cost).unwrap();
        assert!((ledger.get(ResourceKind::Iron) - 10.0).abs() < 1e-9);
        ledger.refund(&cost, 0.5);
        assert!((ledger.get(ResourceKind::Iron) - 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_take_up_to_caps_at_stock() {
        let mut ledger = ResourceLedger::new(ResourceBundle::new().with(ResourceKind::Food, 3.0));
        assert_eq!(ledger.take_up_to(ResourceKind::Food, 10.0), 3.0);
        assert_eq!(ledger.get(ResourceKind::Food), 0.0);
        assert_eq!(ledger.take_up_to(ResourceKind::Food, 1.0), 0.0);
    }

    #[test]
    fn test_negative_cost_rejected() {
        let mut ledger = ResourceLedger::default();
        let mut cost = ResourceBundle::new();
        cost.0.insert(ResourceKind::Wood, -5.0);
        assert!(matches!(
            ledger.spend(&cost),
            Err(ValidationError::NegativeAmount)
        ));
    }
}
