//! Raw-JSON event fixtures, decoded through the public decode boundary.

#![allow(dead_code)]

use emojicoin_sdk::{DomainEvent, RawEvent, TxnInfo};
use serde_json::{json, Value};

pub const MODULE: &str = "0xface::emojicoin_dot_fun";
pub const TIME: &str = "1700000000000000";

pub fn txn() -> TxnInfo {
    serde_json::from_value(json!({
        "version": "987654321",
        "sender": "0xa11ce",
        "entry_function": "0xface::emojicoin_dot_fun::swap",
        "time": TIME
    }))
    .unwrap()
}

pub fn decode(name: &str, data: Value) -> DomainEvent {
    let raw = RawEvent { type_tag: format!("{MODULE}::{name}"), data };
    DomainEvent::try_from(raw.decode().unwrap().unwrap()).unwrap()
}

fn market_metadata(market_id: u64) -> Value {
    json!({
        "market_id": market_id.to_string(),
        "market_address": format!("0x{market_id:x}beef"),
        "emoji_bytes": "0xf09f90b8"
    })
}

pub fn swap(market_id: u64, nonce: u64) -> DomainEvent {
    decode(
        "Swap",
        json!({
            "market_id": market_id.to_string(),
            "time": TIME,
            "market_nonce": nonce.to_string(),
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
        }),
    )
}

pub fn chat(market_id: u64, nonce: u64) -> DomainEvent {
    decode(
        "Chat",
        json!({
            "market_metadata": market_metadata(market_id),
            "emit_time": TIME,
            "emit_market_nonce": nonce.to_string(),
            "user": "0xb0b",
            "message": "gm",
            "user_emojicoin_balance": "0",
            "circulating_supply": "0",
            "balance_as_fraction_of_circulating_supply_q64": "0"
        }),
    )
}

pub fn liquidity(market_id: u64, nonce: u64, provider: &str) -> DomainEvent {
    decode(
        "Liquidity",
        json!({
            "market_id": market_id.to_string(),
            "time": TIME,
            "market_nonce": nonce.to_string(),
            "provider": provider,
            "base_amount": "1000",
            "quote_amount": "2000",
            "lp_coin_amount": "10",
            "liquidity_provided": true,
            "base_donation_claim_amount": "0",
            "quote_donation_claim_amount": "0"
        }),
    )
}

pub fn registration(market_id: u64) -> DomainEvent {
    decode(
        "MarketRegistration",
        json!({
            "market_metadata": market_metadata(market_id),
            "time": TIME,
            "registrant": "0xca1",
            "integrator": "0x1",
            "integrator_fee": "100000000"
        }),
    )
}

/// `trigger` is the on-chain `u8` discriminant.
pub fn state(market_id: u64, nonce: u64, trigger: u8) -> DomainEvent {
    let zero = "0";
    decode(
        "State",
        json!({
            "market_metadata": market_metadata(market_id),
            "state_metadata": {
                "market_nonce": nonce.to_string(),
                "bump_time": TIME,
                "trigger": trigger
            },
            "clamm_virtual_reserves": { "base": "4887902841140490", "quote": "40099000000" },
            "cpamm_real_reserves": { "base": zero, "quote": zero },
            "lp_coin_supply": zero,
            "cumulative_stats": {
                "base_volume": "12097158859510",
                "quote_volume": "99000000",
                "integrator_fees": "1000000",
                "pool_fees_base": zero,
                "pool_fees_quote": zero,
                "n_swaps": "1",
                "n_chat_messages": zero
            },
            "instantaneous_stats": {
                "total_quote_locked": "99000000",
                "total_value_locked": "198000000",
                "market_cap": "302000000",
                "fully_diluted_value": "4122000000"
            },
            "last_swap": {
                "is_sell": false,
                "avg_execution_price_q64": "150962245",
                "base_volume": "12097158859510",
                "quote_volume": "99000000",
                "nonce": nonce.to_string(),
                "time": TIME
            }
        }),
    )
}

/// `period_micros` is the resolution's duration in microseconds.
pub fn periodic(market_id: u64, nonce: u64, period_micros: u64) -> DomainEvent {
    decode(
        "PeriodicState",
        json!({
            "market_metadata": market_metadata(market_id),
            "periodic_state_metadata": {
                "start_time": "1699999980000000",
                "period": period_micros.to_string(),
                "emit_time": TIME,
                "emit_market_nonce": nonce.to_string(),
                "trigger": 2
            },
            "open_price_q64": "1",
            "high_price_q64": "4",
            "low_price_q64": "1",
            "close_price_q64": "3",
            "volume_base": "10",
            "volume_quote": "20",
            "integrator_fees": "0",
            "pool_fees_base": "0",
            "pool_fees_quote": "0",
            "n_swaps": "2",
            "n_chat_messages": "0",
            "starts_in_bonding_curve": true,
            "ends_in_bonding_curve": true,
            "tvl_per_lp_coin_growth_q64": "18446744073709551616"
        }),
    )
}

/// Durations of the seven periodic resolutions, shortest first.
pub const PERIODS: [u64; 7] = [
    60_000_000,
    300_000_000,
    900_000_000,
    1_800_000_000,
    3_600_000_000,
    14_400_000_000,
    86_400_000_000,
];
