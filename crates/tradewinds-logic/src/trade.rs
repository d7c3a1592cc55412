//! Direct barter with native factions and the Crown market that ships sell
//! into.

use serde::{Deserialize, Serialize};

use crate::colony::ColonyState;
use crate::config::SimConfig;
use crate::constants::pricing::GENEROUS_MARGIN_RATIO;
use crate::error::ValidationError;
use crate::events::{EventCode, EventParams, EventSink, Severity};
use crate::factions::FactionId;
use crate::reputation::{buy_multiplier, sell_multiplier};
use crate::resources::{ResourceBundle, ResourceKind};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeReceipt {
    /// Currency received for the goods sold.
    pub sold_value: f64,
    /// Currency paid for the goods bought.
    pub bought_value: f64,
    /// max(sold, bought); what counts toward reputation.
    pub trade_value: f64,
    pub reputation_gained: f64,
}

/// Currency a partner pays for `goods` at current reputation.
pub fn sale_value(state: &ColonyState, faction: FactionId, goods: &ResourceBundle) -> f64 {
    let rep = state.reputation.get(faction);
    goods
        .iter()
        .map(|(kind, amount)| amount * kind.base_price() * sell_multiplier(rep, faction, state.nation, kind))
        .sum()
}

/// Currency a partner charges for `goods` at current reputation.
pub fn purchase_value(state: &ColonyState, faction: FactionId, goods: &ResourceBundle) -> f64 {
    let rep = state.reputation.get(faction);
    goods
        .iter()
        .map(|(kind, amount)| amount * kind.base_price() * buy_multiplier(rep, faction, kind))
        .sum()
}

fn validate_goods(goods: &ResourceBundle) -> Result<(), ValidationError> {
    if goods.contains_money() {
        return Err(ValidationError::MoneyNotGoods);
    }
    if goods.has_negative() {
        return Err(ValidationError::NegativeAmount);
    }
    Ok(())
}

fn grant_trade_reputation(
    state: &mut ColonyState,
    faction: FactionId,
    trade_value: f64,
    bonus: f64,
    config: &SimConfig,
    events: &mut impl EventSink,
) -> f64 {
    let points = state
        .reputation
        .record_trade(faction, trade_value, config.trade_reputation_threshold);
    let gained = points as f64 + state.reputation.adjust(faction, bonus);
    if gained > 0.0 {
        events.emit_event(
            EventCode::ReputationChanged,
            Severity::Info,
            EventParams::new()
                .name("faction", faction.name())
                .num("delta", gained)
                .num("value", state.reputation.get(faction)),
        );
    }
    gained
}

/// Exchange goods with a native faction. Money settles the difference.
pub fn execute_trade(
    state: &mut ColonyState,
    faction: FactionId,
    sell: &ResourceBundle,
    buy: &ResourceBundle,
    config: &SimConfig,
    events: &mut impl EventSink,
) -> Result<TradeReceipt, ValidationError> {
    if !faction.is_native() {
        return Err(ValidationError::UnknownFaction(faction));
    }
    validate_goods(sell)?;
    validate_goods(buy)?;
    if sell.is_empty() && buy.is_empty() {
        return Err(ValidationError::EmptyTrade);
    }
    if let Some((resource, _)) = state.ledger.shortfall(sell) {
        return Err(ValidationError::TradeWouldGoNegative(resource));
    }

    let sold_value = sale_value(state, faction, sell);
    let bought_value = purchase_value(state, faction, buy);
    let net = sold_value - bought_value;
    if state.ledger.money() + net < 0.0 {
        return Err(ValidationError::TradeWouldGoNegative(ResourceKind::Money));
    }

    state.ledger.spend(sell)?;
    if net >= 0.0 {
        state.ledger.deposit(ResourceKind::Money, net);
    } else {
        state.ledger.take_up_to(ResourceKind::Money, -net);
    }
    state.ledger.deposit_all(buy);

    // The partner's margin: goods received below parity plus goods sold
    // above it, judged against what they handed over.
    let provided = buy.market_value();
    let margin = (sell.market_value() - sold_value) + (bought_value - provided);
    let generous = provided > 0.0 && margin >= GENEROUS_MARGIN_RATIO * provided;

    let trade_value = sold_value.max(bought_value);
    let bonus = if generous { 1.0 } else { 0.0 };
    let reputation_gained = grant_trade_reputation(state, faction, trade_value, bonus, config, events);

    log::info!(
        "trade with {:?}: sold {:.1}, bought {:.1}, reputation +{}",
        faction,
        sold_value,
        bought_value,
        reputation_gained
    );
    events.emit_event(
        EventCode::TradeExecuted,
        Severity::Info,
        EventParams::new()
            .name("faction", faction.name())
            .num("sold", sold_value)
            .num("bought", bought_value)
            .num("trade_value", trade_value),
    );

    Ok(TradeReceipt {
        sold_value,
        bought_value,
        trade_value,
        reputation_gained,
    })
}

/// Sell a ship's cargo at the Crown market. Credits currency and counts
/// the sale toward Crown reputation. Returns the currency received.
pub fn sell_at_market(
    state: &mut ColonyState,
    cargo: &ResourceBundle,
    config: &SimConfig,
    events: &mut impl EventSink,
) -> f64 {
    if cargo.is_empty() {
        return 0.0;
    }
    let value = sale_value(state, FactionId::Crown, cargo);
    state.ledger.deposit(ResourceKind::Money, value);
    grant_trade_reputation(state, FactionId::Crown, value, 0.0, config, events);

    events.emit_event(
        EventCode::CargoSold,
        Severity::Info,
        EventParams::new()
            .num("amount", cargo.total())
            .num("value", value),
    );
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colony::test_state;
    use crate::events::EventLog;

    #[test]
    fn test_trade_settles_in_money() {
        let mut state = test_state();
        state.ledger.deposit(ResourceKind::Fur, 10.0);
        let money = state.ledger.money();
        let sell = ResourceBundle::new().with(ResourceKind::Fur, 10.0);
        let buy = ResourceBundle::new().with(ResourceKind::Tools, 5.0);
        let receipt = execute_trade(
            &mut state,
            FactionId::Arawak,
            &sell,
            &buy,
            &SimConfig::default(),
            &mut EventLog::new(),
        )
        .unwrap();

        // fur 5.0 * 0.75, tools 8.0 * (1.5 + 0.2)
        assert!((receipt.sold_value - 37.5).abs() < 1e-9);
        assert!((receipt.bought_value - 68.0).abs() < 1e-9);
        assert!((state.ledger.money() - (money - 30.5)).abs() < 1e-9);
        assert_eq!(state.ledger.get(ResourceKind::Fur), 0.0);
        assert_eq!(receipt.reputation_gained, 0.0);
    }

    #[test]
    fn test_trade_cannot_overdraw() {
        let mut state = test_state();
        let before = state.clone();
        let buy = ResourceBundle::new().with(ResourceKind::Silver, 1000.0);
        let err = execute_trade(
            &mut state,
            FactionId::Iroquois,
            &ResourceBundle::new(),
            &buy,
            &SimConfig::default(),
            &mut EventLog::new(),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::TradeWouldGoNegative(ResourceKind::Money));
        assert_eq!(state, before);
    }

    #[test]
    fn test_crown_is_not_a_barter_partner() {
        let mut state = test_state();
        let err = execute_trade(
            &mut state,
            FactionId::Crown,
            &ResourceBundle::new().with(ResourceKind::Wood, 1.0),
            &ResourceBundle::new(),
            &SimConfig::default(),
            &mut EventLog::new(),
        )
        .unwrap_err();
        assert_eq!(err.code(), "unknown_faction");
    }

    #[test]
    fn test_generous_trade_bonus() {
        let mut state = test_state();
        state.reputation.adjust(FactionId::Arawak, -100.0);
        state.ledger.deposit(ResourceKind::Fur, 100.0);
        let receipt = execute_trade(
            &mut state,
            FactionId::Arawak,
            &ResourceBundle::new().with(ResourceKind::Fur, 100.0),
            &ResourceBundle::new().with(ResourceKind::Wood, 1.0),
            &SimConfig::default(),
            &mut EventLog::new(),
        )
        .unwrap();
        assert_eq!(receipt.reputation_gained, 1.0);
        assert_eq!(state.reputation.get(FactionId::Arawak), 1.0);
    }

    #[test]
    fn test_trade_value_crosses_threshold() {
        let mut state = test_state();
        state.ledger.deposit(ResourceKind::Silver, 200.0);
        let mut log = EventLog::new();
        // 200 silver * 12.0 * 0.75 = 1800 > one threshold
        let receipt = execute_trade(
            &mut state,
            FactionId::Cherokee,
            &ResourceBundle::new().with(ResourceKind::Silver, 200.0),
            &ResourceBundle::new(),
            &SimConfig::default(),
            &mut log,
        )
        .unwrap();
        assert_eq!(receipt.reputation_gained, 1.0);
        assert_eq!(log.count(EventCode::ReputationChanged), 1);
    }

    #[test]
    fn test_round_trip_never_gains_money() {
        for faction in FactionId::NATIVES {
            for rep in [0.0, 50.0, 100.0] {
                let mut state = test_state();
                state.reputation.adjust(faction, rep - state.reputation.get(faction));
                state.ledger.deposit(ResourceKind::Money, 10_000.0);
                let wood = state.ledger.get(ResourceKind::Wood);
                let goods = ResourceBundle::new().with(ResourceKind::Wood, 100.0);
                for _ in 0..10 {
                    let money = state.ledger.money();
                    execute_trade(&mut state, faction, &goods, &goods, &SimConfig::default(), &mut EventLog::new())
                        .unwrap();
                    assert!(state.ledger.money() <= money + 1e-9, "{:?} at {}", faction, rep);
                }
                assert_eq!(state.ledger.get(ResourceKind::Wood), wood);
            }
        }
    }
}
