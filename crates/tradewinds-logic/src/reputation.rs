//! Per-faction reputation and the prices it implies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{pricing, REPUTATION_MAX, REPUTATION_MIN};
use crate::factions::{faction_price_exception, FactionId, Nation};
use crate::resources::ResourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReputationEntry {
    pub value: f64,
    /// Trade value not yet converted into a reputation point.
    pub trade_accumulator: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationLedger {
    entries: BTreeMap<FactionId, ReputationEntry>,
}

impl ReputationLedger {
    pub fn new(initial: f64) -> Self {
        let value = initial.clamp(REPUTATION_MIN, REPUTATION_MAX);
        Self {
            entries: FactionId::ALL
                .iter()
                .map(|f| {
                    (
                        *f,
                        ReputationEntry {
                            value,
                            trade_accumulator: 0.0,
                        },
                    )
                })
                .collect(),
        }
    }

    pub fn get(&self, faction: FactionId) -> f64 {
        self.entries.get(&faction).map_or(REPUTATION_MIN, |e| e.value)
    }

    pub fn entry(&self, faction: FactionId) -> Option<&ReputationEntry> {
        self.entries.get(&faction)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FactionId, &ReputationEntry)> {
        self.entries.iter().map(|(f, e)| (*f, e))
    }

    fn entry_mut(&mut self, faction: FactionId) -> &mut ReputationEntry {
        self.entries.entry(faction).or_insert(ReputationEntry {
            value: REPUTATION_MIN,
            trade_accumulator: 0.0,
        })
    }

    /// Add `delta`, clamped to the reputation range. Returns the change that
    /// actually applied.
    pub fn adjust(&mut self, faction: FactionId, delta: f64) -> f64 {
        let entry = self.entry_mut(faction);
        let before = entry.value;
        entry.value = (before + delta).clamp(REPUTATION_MIN, REPUTATION_MAX);
        entry.value - before
    }

    /// Accumulate trade value; every full `threshold` earns one point and the
    /// remainder carries over. Returns the points granted.
    pub fn record_trade(&mut self, faction: FactionId, value: f64, threshold: f64) -> u32 {
        if !value.is_finite() || value <= 0.0 || threshold <= 0.0 {
            return 0;
        }
        let entry = self.entry_mut(faction);
        entry.trade_accumulator += value;
        let points = (entry.trade_accumulator / threshold).floor();
        entry.trade_accumulator -= points * threshold;
        let points = points as u32;
        self.adjust(faction, points as f64);
        points
    }
}

/// Fraction of base price a partner pays for goods the colony sells.
///
/// The home nation's export bonus only applies at the Crown market. With a
/// native partner the sell multiplier never exceeds [`buy_multiplier`] for
/// the same resource, so a sell-then-buy round trip cannot gain currency.
pub fn sell_multiplier(reputation: f64, faction: FactionId, nation: Nation, resource: ResourceKind) -> f64 {
    let rep = reputation.clamp(REPUTATION_MIN, REPUTATION_MAX) / REPUTATION_MAX;
    let linear = pricing::SELL_AT_ZERO_REP + (1.0 - pricing::SELL_AT_ZERO_REP) * rep;
    let export_bonus = if faction.is_native() {
        0.0
    } else {
        nation.sell_bonus(resource)
    };
    (linear + faction_price_exception(faction, resource) + export_bonus).max(0.0)
}

/// Multiple of base price the colony pays for goods it buys.
pub fn buy_multiplier(reputation: f64, faction: FactionId, resource: ResourceKind) -> f64 {
    let rep = reputation.clamp(REPUTATION_MIN, REPUTATION_MAX) / REPUTATION_MAX;
    let linear = pricing::BUY_AT_ZERO_REP - (pricing::BUY_AT_ZERO_REP - 1.0) * rep;
    (linear + faction_price_exception(faction, resource)).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjust_clamps() {
        let mut rep = ReputationLedger::new(95.0);
        assert_eq!(rep.adjust(FactionId::Crown, 20.0), 5.0);
        assert_eq!(rep.get(FactionId::Crown), 100.0);
        assert_eq!(rep.adjust(FactionId::Crown, -250.0), -100.0);
        assert_eq!(rep.get(FactionId::Crown), 0.0);
    }

    #[test]
    fn test_trade_threshold_keeps_remainder() {
        let mut rep = ReputationLedger::new(50.0);
        assert_eq!(rep.record_trade(FactionId::Arawak, 600.0, 1000.0), 0);
        assert_eq!(rep.record_trade(FactionId::Arawak, 1900.0, 1000.0), 2);
        assert_eq!(rep.get(FactionId::Arawak), 52.0);
        let acc = rep.entry(FactionId::Arawak).unwrap().trade_accumulator;
        assert!((acc - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_multipliers_converge_to_parity() {
        let r = ResourceKind::Wood;
        let low_sell = sell_multiplier(0.0, FactionId::Cherokee, Nation::France, r);
        let high_sell = sell_multiplier(100.0, FactionId::Cherokee, Nation::France, r);
        assert!((low_sell - 0.5).abs() < 1e-9);
        assert!((high_sell - 1.0).abs() < 1e-9);

        let low_buy = buy_multiplier(0.0, FactionId::Cherokee, r);
        let high_buy = buy_multiplier(100.0, FactionId::Cherokee, r);
        assert!((low_buy - 2.0).abs() < 1e-9);
        assert!((high_buy - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_price_exception_applies() {
        let plain = sell_multiplier(50.0, FactionId::Arawak, Nation::France, ResourceKind::Cloth);
        let tools = sell_multiplier(50.0, FactionId::Arawak, Nation::France, ResourceKind::Tools);
        assert!((tools - plain - 0.20).abs() < 1e-9);
    }

    #[test]
    fn test_export_bonus_only_at_crown_market() {
        let crown = sell_multiplier(100.0, FactionId::Crown, Nation::England, ResourceKind::Wood);
        let native = sell_multiplier(100.0, FactionId::Arawak, Nation::England, ResourceKind::Wood);
        assert!((crown - 1.05).abs() < 1e-9);
        assert!((native - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_native_sell_never_exceeds_buy() {
        let nations = [Nation::England, Nation::France, Nation::Netherlands, Nation::Spain];
        for faction in FactionId::NATIVES {
            for nation in nations {
                for resource in ResourceKind::ALL {
                    for rep in [0.0, 25.0, 50.0, 75.0, 100.0] {
                        let sell = sell_multiplier(rep, faction, nation, resource);
                        let buy = buy_multiplier(rep, faction, resource);
                        assert!(sell <= buy + 1e-12, "{:?} {:?} {:?} at {}", faction, nation, resource, rep);
                    }
                }
            }
        }
    }
}
