//! On-chain market constants.
//!
//! Every value here must equal the contract's constant bit for bit; pricing
//! and state helpers read them from this one table.

use crate::state::Reserves;

// ─── Supply ───────────────────────────────────────────────────────────────────

/// Total base supply minted per market.
pub const EMOJICOIN_SUPPLY: u128 = 4_500_000_000_000_000;
/// Base liquidity seeded into the pool at graduation.
pub const EMOJICOIN_REMAINDER: u128 = 1_000_000_000_000_000;

// ─── Bonding curve (CLAMM) ────────────────────────────────────────────────────

pub const BASE_REAL_FLOOR: u128 = 0;
pub const QUOTE_REAL_FLOOR: u128 = 0;
pub const BASE_REAL_CEILING: u128 = 3_500_000_000_000_000;
pub const QUOTE_REAL_CEILING: u128 = 100_000_000_000;

pub const BASE_VIRTUAL_FLOOR: u128 = 1_400_000_000_000_000;
pub const BASE_VIRTUAL_CEILING: u128 = 4_900_000_000_000_000;
pub const QUOTE_VIRTUAL_FLOOR: u128 = 40_000_000_000;
pub const QUOTE_VIRTUAL_CEILING: u128 = 140_000_000_000;

/// Virtual reserves of a freshly registered market.
pub const INITIAL_VIRTUAL_RESERVES: Reserves = Reserves {
    base: BASE_VIRTUAL_CEILING,
    quote: QUOTE_VIRTUAL_FLOOR,
};
/// Real reserves of a freshly registered market (no pool yet).
pub const INITIAL_REAL_RESERVES: Reserves = Reserves { base: 0, quote: 0 };

/// Quote input that takes a fresh market exactly to graduation, fee-free.
pub const EXACT_TRANSITION_INPUT_AMOUNT: u128 = 100_000_000_000;

/// Market cap at graduation, in quote.
pub const MARKET_CAP: u128 = 450_000_000_000;

// ─── Fees ─────────────────────────────────────────────────────────────────────

/// CPAMM pool fee: 0.25 %
pub const POOL_FEE_RATE_BPS: u8 = 25;

/// Integrator fee applied when the caller does not pass one: 1.00 %
pub const DEFAULT_INTEGRATOR_FEE_RATE_BPS: u8 = 100;

/// Denominator for basis-point math (u128 to avoid up-cast noise)
pub const BASIS_POINTS_PER_UNIT: u128 = 10_000;

// ─── Pool / registry ──────────────────────────────────────────────────────────

/// LP coins minted to the market at graduation.
pub const LP_TOKENS_INITIAL: u128 = 10_000_000_000_000;

/// Nonce a market carries right after registration.
pub const INITIAL_MARKET_NONCE: u64 = 1;

/// Module name every emojicoin event type tag is published under.
pub const EMOJICOIN_MODULE_NAME: &str = "emojicoin_dot_fun";
