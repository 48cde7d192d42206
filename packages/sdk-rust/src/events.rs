//! Typed emojicoin events and the decode boundary.
//!
//! Payload structs use the exact field names of the on-chain event JSON.
//! A raw `(type_tag, data)` pair is classified once by [`EventKind`] and
//! decoded into a closed enum; everything downstream matches exhaustively.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::constants::{EMOJICOIN_MODULE_NAME, INITIAL_MARKET_NONCE};
use crate::error::{Error, GroupError, Result};
use crate::state::Reserves;
use crate::types::{as_string, hex_bytes, AccountAddress, Period, Trigger};

// ─── Shared payload pieces ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketMetadata {
    #[serde(with = "as_string")]
    pub market_id: u64,
    pub market_address: AccountAddress,
    #[serde(with = "hex_bytes")]
    pub emoji_bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateMetadata {
    #[serde(with = "as_string")]
    pub market_nonce: u64,
    #[serde(with = "as_string")]
    pub bump_time: u64,
    pub trigger: Trigger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodicStateMetadata {
    #[serde(with = "as_string")]
    pub start_time: u64,
    pub period: Period,
    #[serde(with = "as_string")]
    pub emit_time: u64,
    #[serde(with = "as_string")]
    pub emit_market_nonce: u64,
    pub trigger: Trigger,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativeStats {
    #[serde(with = "as_string")]
    pub base_volume: u128,
    #[serde(with = "as_string")]
    pub quote_volume: u128,
    #[serde(with = "as_string")]
    pub integrator_fees: u128,
    #[serde(with = "as_string")]
    pub pool_fees_base: u128,
    #[serde(with = "as_string")]
    pub pool_fees_quote: u128,
    #[serde(with = "as_string")]
    pub n_swaps: u64,
    #[serde(with = "as_string")]
    pub n_chat_messages: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstantaneousStats {
    #[serde(with = "as_string")]
    pub total_quote_locked: u128,
    #[serde(with = "as_string")]
    pub total_value_locked: u128,
    #[serde(with = "as_string")]
    pub market_cap: u128,
    #[serde(with = "as_string")]
    pub fully_diluted_value: u128,
}

/// The most recent swap as recorded in the market resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastSwap {
    pub is_sell: bool,
    #[serde(with = "as_string")]
    pub avg_execution_price_q64: u128,
    #[serde(with = "as_string")]
    pub base_volume: u128,
    #[serde(with = "as_string")]
    pub quote_volume: u128,
    #[serde(with = "as_string")]
    pub nonce: u64,
    #[serde(with = "as_string")]
    pub time: u64,
}

/// Aggregator-backed counters are emitted wrapped in `{ "value": "..." }`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatorSnapshot {
    #[serde(with = "as_string")]
    pub value: u128,
}

// ─── Event payloads ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapEvent {
    #[serde(with = "as_string")]
    pub market_id: u64,
    #[serde(with = "as_string")]
    pub time: u64,
    #[serde(with = "as_string")]
    pub market_nonce: u64,
    pub swapper: AccountAddress,
    #[serde(with = "as_string")]
    pub input_amount: u128,
    pub is_sell: bool,
    pub integrator: AccountAddress,
    pub integrator_fee_rate_bps: u8,
    #[serde(with = "as_string")]
    pub net_proceeds: u128,
    #[serde(with = "as_string")]
    pub base_volume: u128,
    #[serde(with = "as_string")]
    pub quote_volume: u128,
    #[serde(with = "as_string")]
    pub avg_execution_price_q64: u128,
    #[serde(with = "as_string")]
    pub integrator_fee: u128,
    #[serde(with = "as_string")]
    pub pool_fee: u128,
    pub starts_in_bonding_curve: bool,
    pub results_in_state_transition: bool,
    #[serde(with = "as_string")]
    pub balance_as_fraction_of_circulating_supply_before_q64: u128,
    #[serde(with = "as_string")]
    pub balance_as_fraction_of_circulating_supply_after_q64: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEvent {
    pub market_metadata: MarketMetadata,
    #[serde(with = "as_string")]
    pub emit_time: u64,
    #[serde(with = "as_string")]
    pub emit_market_nonce: u64,
    pub user: AccountAddress,
    pub message: String,
    #[serde(with = "as_string")]
    pub user_emojicoin_balance: u128,
    #[serde(with = "as_string")]
    pub circulating_supply: u128,
    #[serde(with = "as_string")]
    pub balance_as_fraction_of_circulating_supply_q64: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketRegistrationEvent {
    pub market_metadata: MarketMetadata,
    #[serde(with = "as_string")]
    pub time: u64,
    pub registrant: AccountAddress,
    pub integrator: AccountAddress,
    #[serde(with = "as_string")]
    pub integrator_fee: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityEvent {
    #[serde(with = "as_string")]
    pub market_id: u64,
    #[serde(with = "as_string")]
    pub time: u64,
    #[serde(with = "as_string")]
    pub market_nonce: u64,
    pub provider: AccountAddress,
    #[serde(with = "as_string")]
    pub base_amount: u128,
    #[serde(with = "as_string")]
    pub quote_amount: u128,
    #[serde(with = "as_string")]
    pub lp_coin_amount: u128,
    /// `true` for a deposit, `false` for a withdrawal.
    pub liquidity_provided: bool,
    #[serde(with = "as_string")]
    pub base_donation_claim_amount: u128,
    #[serde(with = "as_string")]
    pub quote_donation_claim_amount: u128,
}

/// Snapshot of a market resource at one nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEvent {
    pub market_metadata: MarketMetadata,
    pub state_metadata: StateMetadata,
    pub clamm_virtual_reserves: Reserves,
    pub cpamm_real_reserves: Reserves,
    #[serde(with = "as_string")]
    pub lp_coin_supply: u128,
    pub cumulative_stats: CumulativeStats,
    pub instantaneous_stats: InstantaneousStats,
    pub last_swap: LastSwap,
}

impl StateEvent {
    pub fn in_bonding_curve(&self) -> bool {
        self.lp_coin_supply == 0
    }
}

/// OHLC rollup closed for one resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodicStateEvent {
    pub market_metadata: MarketMetadata,
    pub periodic_state_metadata: PeriodicStateMetadata,
    #[serde(with = "as_string")]
    pub open_price_q64: u128,
    #[serde(with = "as_string")]
    pub high_price_q64: u128,
    #[serde(with = "as_string")]
    pub low_price_q64: u128,
    #[serde(with = "as_string")]
    pub close_price_q64: u128,
    #[serde(with = "as_string")]
    pub volume_base: u128,
    #[serde(with = "as_string")]
    pub volume_quote: u128,
    #[serde(with = "as_string")]
    pub integrator_fees: u128,
    #[serde(with = "as_string")]
    pub pool_fees_base: u128,
    #[serde(with = "as_string")]
    pub pool_fees_quote: u128,
    #[serde(with = "as_string")]
    pub n_swaps: u64,
    #[serde(with = "as_string")]
    pub n_chat_messages: u64,
    pub starts_in_bonding_curve: bool,
    pub ends_in_bonding_curve: bool,
    #[serde(with = "as_string")]
    pub tvl_per_lp_coin_growth_q64: u128,
}

/// Registry-wide snapshot. Not scoped to a market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStateEvent {
    #[serde(with = "as_string")]
    pub emit_time: u64,
    pub registry_nonce: AggregatorSnapshot,
    pub trigger: Trigger,
    pub cumulative_quote_volume: AggregatorSnapshot,
    pub total_quote_locked: AggregatorSnapshot,
    pub total_value_locked: AggregatorSnapshot,
    pub market_cap: AggregatorSnapshot,
    pub fully_diluted_value: AggregatorSnapshot,
    pub cumulative_integrator_fees: AggregatorSnapshot,
    pub cumulative_swaps: AggregatorSnapshot,
    pub cumulative_chat_messages: AggregatorSnapshot,
}

// ─── Grouping key ─────────────────────────────────────────────────────────────

/// `(market_id, market_nonce)`: one market revision within a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarketKey {
    pub market_id: u64,
    pub market_nonce: u64,
}

impl MarketKey {
    pub const fn new(market_id: u64, market_nonce: u64) -> Self {
        Self { market_id, market_nonce }
    }
}

impl fmt::Display for MarketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.market_id, self.market_nonce)
    }
}

// ─── Closed event sets ────────────────────────────────────────────────────────

/// A user action that bumps a market's nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BumpEvent {
    Chat(ChatEvent),
    MarketRegistration(MarketRegistrationEvent),
    Swap(SwapEvent),
    Liquidity(LiquidityEvent),
}

/// Every market-scoped event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainEvent {
    Chat(ChatEvent),
    MarketRegistration(MarketRegistrationEvent),
    Swap(SwapEvent),
    Liquidity(LiquidityEvent),
    State(StateEvent),
    PeriodicState(PeriodicStateEvent),
}

impl DomainEvent {
    pub fn market_key(&self) -> MarketKey {
        match self {
            DomainEvent::Chat(e) => {
                MarketKey::new(e.market_metadata.market_id, e.emit_market_nonce)
            }
            DomainEvent::MarketRegistration(e) => {
                MarketKey::new(e.market_metadata.market_id, INITIAL_MARKET_NONCE)
            }
            DomainEvent::Swap(e) => MarketKey::new(e.market_id, e.market_nonce),
            DomainEvent::Liquidity(e) => MarketKey::new(e.market_id, e.market_nonce),
            DomainEvent::State(e) => {
                MarketKey::new(e.market_metadata.market_id, e.state_metadata.market_nonce)
            }
            DomainEvent::PeriodicState(e) => MarketKey::new(
                e.market_metadata.market_id,
                e.periodic_state_metadata.emit_market_nonce,
            ),
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            DomainEvent::Chat(_) => EventKind::Chat,
            DomainEvent::MarketRegistration(_) => EventKind::MarketRegistration,
            DomainEvent::Swap(_) => EventKind::Swap,
            DomainEvent::Liquidity(_) => EventKind::Liquidity,
            DomainEvent::State(_) => EventKind::State,
            DomainEvent::PeriodicState(_) => EventKind::PeriodicState,
        }
    }
}

/// The `(market_id, market_nonce)` group an event belongs to.
pub fn key_of(event: &DomainEvent) -> MarketKey {
    event.market_key()
}

impl From<BumpEvent> for DomainEvent {
    fn from(event: BumpEvent) -> Self {
        match event {
            BumpEvent::Chat(e) => DomainEvent::Chat(e),
            BumpEvent::MarketRegistration(e) => DomainEvent::MarketRegistration(e),
            BumpEvent::Swap(e) => DomainEvent::Swap(e),
            BumpEvent::Liquidity(e) => DomainEvent::Liquidity(e),
        }
    }
}

/// Anything the emojicoin module emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmojicoinEvent {
    Market(DomainEvent),
    GlobalState(GlobalStateEvent),
}

impl TryFrom<EmojicoinEvent> for DomainEvent {
    type Error = GroupError;

    fn try_from(event: EmojicoinEvent) -> std::result::Result<Self, Self::Error> {
        match event {
            EmojicoinEvent::Market(event) => Ok(event),
            EmojicoinEvent::GlobalState(_) => {
                Err(GroupError::NotMarketScoped(EventKind::GlobalState.name()))
            }
        }
    }
}

// ─── Decode boundary ──────────────────────────────────────────────────────────

/// Event struct name under the emojicoin module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Chat,
    MarketRegistration,
    Swap,
    Liquidity,
    State,
    PeriodicState,
    GlobalState,
}

impl EventKind {
    /// Classify a fully qualified Move type tag such as
    /// `0xc0de::emojicoin_dot_fun::Swap`.
    ///
    /// `Ok(None)` for types outside the emojicoin module. A type inside the
    /// module that is not one of the known events is an error: the schema no
    /// longer matches the deployed contract.
    pub fn from_type_str(type_tag: &str) -> Result<Option<Self>> {
        let mut parts = type_tag.splitn(3, "::");
        let (Some(_address), Some(module), Some(name)) = (parts.next(), parts.next(), parts.next())
        else {
            return Ok(None);
        };
        if module != EMOJICOIN_MODULE_NAME {
            return Ok(None);
        }
        let kind = match name {
            "Chat" => EventKind::Chat,
            "MarketRegistration" => EventKind::MarketRegistration,
            "Swap" => EventKind::Swap,
            "Liquidity" => EventKind::Liquidity,
            "State" => EventKind::State,
            "PeriodicState" => EventKind::PeriodicState,
            "GlobalState" => EventKind::GlobalState,
            _ => {
                return Err(Error::UnknownEvent { type_tag: type_tag.to_string() });
            }
        };
        Ok(Some(kind))
    }

    pub const fn name(self) -> &'static str {
        match self {
            EventKind::Chat => "Chat",
            EventKind::MarketRegistration => "MarketRegistration",
            EventKind::Swap => "Swap",
            EventKind::Liquidity => "Liquidity",
            EventKind::State => "State",
            EventKind::PeriodicState => "PeriodicState",
            EventKind::GlobalState => "GlobalState",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An event as it appears in a transaction: Move type tag plus JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(rename = "type")]
    pub type_tag: String,
    pub data: serde_json::Value,
}

impl EmojicoinEvent {
    /// Decode one raw event. `Ok(None)` means the event is not an emojicoin event.
    pub fn decode(type_tag: &str, data: &serde_json::Value) -> Result<Option<Self>> {
        let Some(kind) = EventKind::from_type_str(type_tag)? else {
            return Ok(None);
        };
        let event = match kind {
            EventKind::Chat => EmojicoinEvent::Market(DomainEvent::Chat(payload(type_tag, data)?)),
            EventKind::MarketRegistration => {
                EmojicoinEvent::Market(DomainEvent::MarketRegistration(payload(type_tag, data)?))
            }
            EventKind::Swap => EmojicoinEvent::Market(DomainEvent::Swap(payload(type_tag, data)?)),
            EventKind::Liquidity => {
                EmojicoinEvent::Market(DomainEvent::Liquidity(payload(type_tag, data)?))
            }
            EventKind::State => EmojicoinEvent::Market(DomainEvent::State(payload(type_tag, data)?)),
            EventKind::PeriodicState => {
                EmojicoinEvent::Market(DomainEvent::PeriodicState(payload(type_tag, data)?))
            }
            EventKind::GlobalState => EmojicoinEvent::GlobalState(payload(type_tag, data)?),
        };
        Ok(Some(event))
    }
}

impl RawEvent {
    pub fn decode(&self) -> Result<Option<EmojicoinEvent>> {
        EmojicoinEvent::decode(&self.type_tag, &self.data)
    }
}

fn payload<T: DeserializeOwned>(type_tag: &str, data: &serde_json::Value) -> Result<T> {
    T::deserialize(data).map_err(|source| Error::Decode {
        event_type: type_tag.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MODULE: &str = "0xc0de::emojicoin_dot_fun";

    fn swap_json() -> serde_json::Value {
        json!({
            "market_id": "7",
            "time": "1700000000000000",
            "market_nonce": "3",
            "swapper": "0xa11ce",
            "input_amount": "100000000",
            "is_sell": false,
            "integrator": "0x1",
            "integrator_fee_rate_bps": 100,
            "net_proceeds": "12097158859510",
            "base_volume": "12097158859510",
            "quote_volume": "99000000",
            "avg_execution_price_q64": "150962245",
            "integrator_fee": "1000000",
            "pool_fee": "0",
            "starts_in_bonding_curve": true,
            "results_in_state_transition": false,
            "balance_as_fraction_of_circulating_supply_before_q64": "0",
            "balance_as_fraction_of_circulating_supply_after_q64": "18446744073709551616"
        })
    }

    #[test]
    fn type_tags_classify_by_module_and_name() {
        assert_eq!(
            EventKind::from_type_str(&format!("{MODULE}::Swap")).unwrap(),
            Some(EventKind::Swap)
        );
        assert_eq!(
            EventKind::from_type_str(&format!("{MODULE}::GlobalState")).unwrap(),
            Some(EventKind::GlobalState)
        );
        assert_eq!(EventKind::from_type_str("0x1::coin::CoinDeposit").unwrap(), None);
        assert_eq!(EventKind::from_type_str("0x1::account").unwrap(), None);
        assert_eq!(
            EventKind::from_type_str("0x1::coin::CoinStore<0xc0de::emojicoin_dot_fun::Swap>")
                .unwrap(),
            None
        );
    }

    #[test]
    fn unknown_emojicoin_event_is_rejected() {
        for name in ["SwapV2", "Unknown", "Swap::Extra"] {
            let type_tag = format!("{MODULE}::{name}");
            let err = EmojicoinEvent::decode(&type_tag, &json!({ "market_id": "7" })).unwrap_err();
            assert!(
                matches!(err, Error::UnknownEvent { type_tag: ref found } if *found == type_tag),
                "{name}: {err}"
            );
        }
    }

    #[test]
    fn decodes_swap_payload() {
        let event = EmojicoinEvent::decode(&format!("{MODULE}::Swap"), &swap_json())
            .unwrap()
            .unwrap();
        let EmojicoinEvent::Market(DomainEvent::Swap(swap)) = &event else {
            panic!("expected swap, got {event:?}");
        };
        assert_eq!(swap.integrator_fee, 1_000_000);
        assert_eq!(swap.swapper, "0xa11ce".parse().unwrap());
        assert_eq!(
            DomainEvent::try_from(event).unwrap().market_key(),
            MarketKey::new(7, 3)
        );
    }

    #[test]
    fn foreign_events_are_skipped() {
        let decoded = EmojicoinEvent::decode("0x1::coin::WithdrawEvent", &json!({})).unwrap();
        assert!(decoded.is_none());
    }

    #[test]
    fn malformed_payload_reports_type() {
        let mut data = swap_json();
        data["market_nonce"] = json!(3);
        let err = EmojicoinEvent::decode(&format!("{MODULE}::Swap"), &data).unwrap_err();
        assert!(matches!(err, Error::Decode { ref event_type, .. } if event_type.ends_with("::Swap")));
    }

    #[test]
    fn global_state_is_not_market_scoped() {
        let data = json!({
            "emit_time": "1",
            "registry_nonce": { "value": "10" },
            "trigger": 2,
            "cumulative_quote_volume": { "value": "0" },
            "total_quote_locked": { "value": "0" },
            "total_value_locked": { "value": "0" },
            "market_cap": { "value": "0" },
            "fully_diluted_value": { "value": "0" },
            "cumulative_integrator_fees": { "value": "0" },
            "cumulative_swaps": { "value": "0" },
            "cumulative_chat_messages": { "value": "0" }
        });
        let event = EmojicoinEvent::decode(&format!("{MODULE}::GlobalState"), &data)
            .unwrap()
            .unwrap();
        assert_eq!(
            DomainEvent::try_from(event),
            Err(GroupError::NotMarketScoped("GlobalState"))
        );
    }

    #[test]
    fn registration_is_always_first_nonce() {
        let event = BumpEvent::MarketRegistration(MarketRegistrationEvent {
            market_metadata: MarketMetadata {
                market_id: 42,
                market_address: AccountAddress::ZERO,
                emoji_bytes: vec![0xf0, 0x9f, 0x90, 0xb8],
            },
            time: 0,
            registrant: AccountAddress::ZERO,
            integrator: AccountAddress::ZERO,
            integrator_fee: 100_000_000,
        });
        assert_eq!(key_of(&event.into()), MarketKey::new(42, INITIAL_MARKET_NONCE));
    }
}
