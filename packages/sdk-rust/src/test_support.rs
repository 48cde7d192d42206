//! Event fixtures shared by the unit tests.

use crate::events::*;
use crate::state::Reserves;
use crate::types::{AccountAddress, Period, Trigger, TxnInfo};

pub fn address(tail: u8) -> AccountAddress {
    let mut bytes = [0u8; AccountAddress::LENGTH];
    bytes[AccountAddress::LENGTH - 1] = tail;
    AccountAddress::new(bytes)
}

pub fn txn() -> TxnInfo {
    TxnInfo {
        version: 1_234,
        sender: address(0xaa),
        entry_function: Some("0xc0de::emojicoin_dot_fun::swap".to_string()),
        time: 1_700_000_000_000_000,
    }
}

pub fn metadata(market_id: u64) -> MarketMetadata {
    MarketMetadata {
        market_id,
        market_address: address(market_id as u8),
        emoji_bytes: vec![0xf0, 0x9f, 0x90, 0xb8],
    }
}

pub fn swap(market_id: u64, nonce: u64) -> DomainEvent {
    DomainEvent::Swap(SwapEvent {
        market_id,
        time: 1_700_000_000_000_000,
        market_nonce: nonce,
        swapper: address(0xaa),
        input_amount: 100_000_000,
        is_sell: false,
        integrator: address(1),
        integrator_fee_rate_bps: 100,
        net_proceeds: 12_097_158_859_510,
        base_volume: 12_097_158_859_510,
        quote_volume: 99_000_000,
        avg_execution_price_q64: 150_962_245,
        integrator_fee: 1_000_000,
        pool_fee: 0,
        starts_in_bonding_curve: true,
        results_in_state_transition: false,
        balance_as_fraction_of_circulating_supply_before_q64: 0,
        balance_as_fraction_of_circulating_supply_after_q64: 1 << 64,
    })
}

pub fn chat(market_id: u64, nonce: u64) -> DomainEvent {
    DomainEvent::Chat(ChatEvent {
        market_metadata: metadata(market_id),
        emit_time: 1_700_000_000_000_000,
        emit_market_nonce: nonce,
        user: address(0xbb),
        message: "gm".to_string(),
        user_emojicoin_balance: 0,
        circulating_supply: 0,
        balance_as_fraction_of_circulating_supply_q64: 0,
    })
}

pub fn liquidity(market_id: u64, nonce: u64, provider: u8) -> DomainEvent {
    DomainEvent::Liquidity(LiquidityEvent {
        market_id,
        time: 1_700_000_000_000_000,
        market_nonce: nonce,
        provider: address(provider),
        base_amount: 1_000,
        quote_amount: 2_000,
        lp_coin_amount: nonce as u128 * 10,
        liquidity_provided: true,
        base_donation_claim_amount: 0,
        quote_donation_claim_amount: 0,
    })
}

pub fn registration(market_id: u64) -> DomainEvent {
    DomainEvent::MarketRegistration(MarketRegistrationEvent {
        market_metadata: metadata(market_id),
        time: 1_700_000_000_000_000,
        registrant: address(0xcc),
        integrator: address(1),
        integrator_fee: 100_000_000,
    })
}

pub fn state(market_id: u64, nonce: u64, trigger: Trigger) -> DomainEvent {
    DomainEvent::State(StateEvent {
        market_metadata: metadata(market_id),
        state_metadata: StateMetadata {
            market_nonce: nonce,
            bump_time: 1_700_000_000_000_000,
            trigger,
        },
        clamm_virtual_reserves: Reserves::new(4_887_902_841_140_490, 40_099_000_000),
        cpamm_real_reserves: Reserves::default(),
        lp_coin_supply: 0,
        cumulative_stats: CumulativeStats {
            base_volume: 12_097_158_859_510,
            quote_volume: 99_000_000,
            integrator_fees: 1_000_000,
            n_swaps: 1,
            ..Default::default()
        },
        instantaneous_stats: InstantaneousStats::default(),
        last_swap: LastSwap {
            is_sell: false,
            avg_execution_price_q64: 150_962_245,
            base_volume: 12_097_158_859_510,
            quote_volume: 99_000_000,
            nonce,
            time: 1_700_000_000_000_000,
        },
    })
}

pub fn periodic(market_id: u64, nonce: u64, period: Period) -> DomainEvent {
    DomainEvent::PeriodicState(PeriodicStateEvent {
        market_metadata: metadata(market_id),
        periodic_state_metadata: PeriodicStateMetadata {
            start_time: 1_699_999_980_000_000,
            period,
            emit_time: 1_700_000_000_000_000,
            emit_market_nonce: nonce,
            trigger: Trigger::SwapBuy,
        },
        open_price_q64: 1,
        high_price_q64: 4,
        low_price_q64: 1,
        close_price_q64: 3,
        volume_base: 10,
        volume_quote: 20,
        integrator_fees: 0,
        pool_fees_base: 0,
        pool_fees_quote: 0,
        n_swaps: 2,
        n_chat_messages: 0,
        starts_in_bonding_curve: true,
        ends_in_bonding_curve: true,
        tvl_per_lp_coin_growth_q64: 1 << 64,
    })
}
