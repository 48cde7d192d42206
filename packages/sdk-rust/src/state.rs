//! Market reserve snapshots and the local state transition a swap applies.
//!
//! A market lives in two phases: a bonding curve priced off virtual reserves,
//! then a constant-product pool priced off real reserves. The phase is derived
//! from the LP coin supply, which stays zero until graduation.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{Error, Result};
use crate::events::StateEvent;
use crate::math::{fee_amount, SwapQuote, SwapRequest};
use crate::types::as_string;

// ─── Reserves ─────────────────────────────────────────────────────────────────

/// A `{base, quote}` reserve pair, virtual or real depending on the phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reserves {
    #[serde(with = "as_string")]
    pub base: u128,
    #[serde(with = "as_string")]
    pub quote: u128,
}

impl Reserves {
    pub const fn new(base: u128, quote: u128) -> Self {
        Self { base, quote }
    }
}

/// Reserves the pool is seeded with when the curve is exhausted.
pub const GRADUATION_SEED_RESERVES: Reserves = Reserves {
    base: EMOJICOIN_REMAINDER,
    quote: QUOTE_REAL_CEILING,
};

// ─── Phase ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketPhase {
    InBondingCurve,
    PostGraduation,
}

// ─── Market snapshot ──────────────────────────────────────────────────────────

/// The reserve-bearing part of a market resource, as read from a state event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketState {
    pub clamm_virtual_reserves: Reserves,
    pub cpamm_real_reserves: Reserves,
    #[serde(with = "as_string")]
    pub lp_coin_supply: u128,
}

impl Default for MarketState {
    fn default() -> Self {
        Self::registered()
    }
}

impl From<&StateEvent> for MarketState {
    fn from(event: &StateEvent) -> Self {
        Self {
            clamm_virtual_reserves: event.clamm_virtual_reserves,
            cpamm_real_reserves: event.cpamm_real_reserves,
            lp_coin_supply: event.lp_coin_supply,
        }
    }
}

impl MarketState {
    /// State of a market right after registration.
    pub const fn registered() -> Self {
        Self {
            clamm_virtual_reserves: INITIAL_VIRTUAL_RESERVES,
            cpamm_real_reserves: INITIAL_REAL_RESERVES,
            lp_coin_supply: 0,
        }
    }

    pub fn phase(&self) -> MarketPhase {
        if self.lp_coin_supply == 0 {
            MarketPhase::InBondingCurve
        } else {
            MarketPhase::PostGraduation
        }
    }

    pub fn in_bonding_curve(&self) -> bool {
        self.phase() == MarketPhase::InBondingCurve
    }

    /// Reject snapshots the contract can never produce.
    ///
    /// Pricing treats out-of-range virtual reserves as a defect and panics, so
    /// externally supplied snapshots should pass through here first.
    pub fn validate(&self) -> Result<()> {
        if !self.in_bonding_curve() {
            return Ok(());
        }
        let Reserves { base, quote } = self.clamm_virtual_reserves;
        if !(BASE_VIRTUAL_FLOOR..=BASE_VIRTUAL_CEILING).contains(&base) {
            return Err(Error::InvalidArgument(format!(
                "virtual base reserve {base} outside [{BASE_VIRTUAL_FLOOR}, {BASE_VIRTUAL_CEILING}]"
            )));
        }
        if !(QUOTE_VIRTUAL_FLOOR..=QUOTE_VIRTUAL_CEILING).contains(&quote) {
            return Err(Error::InvalidArgument(format!(
                "virtual quote reserve {quote} outside [{QUOTE_VIRTUAL_FLOOR}, {QUOTE_VIRTUAL_CEILING}]"
            )));
        }
        Ok(())
    }

    /// Base and quote actually held by the market.
    ///
    /// While on the curve the market holds the unsold slice of the curve plus
    /// the graduation remainder, and the quote deposited above the virtual floor.
    pub fn real_reserves(&self) -> Reserves {
        match self.phase() {
            MarketPhase::InBondingCurve => {
                let virt = self.clamm_virtual_reserves;
                Reserves {
                    base: virt.base.saturating_sub(BASE_VIRTUAL_FLOOR) + EMOJICOIN_REMAINDER,
                    quote: virt.quote.saturating_sub(QUOTE_VIRTUAL_FLOOR),
                }
            }
            MarketPhase::PostGraduation => self.cpamm_real_reserves,
        }
    }

    /// Base held outside the market.
    pub fn circulating_supply(&self) -> u128 {
        match self.phase() {
            MarketPhase::InBondingCurve => {
                BASE_VIRTUAL_CEILING.saturating_sub(self.clamm_virtual_reserves.base)
            }
            MarketPhase::PostGraduation => {
                EMOJICOIN_SUPPLY.saturating_sub(self.cpamm_real_reserves.base)
            }
        }
    }

    pub fn swap_request(
        &self,
        is_sell: bool,
        input_amount: u128,
        user_balance: u128,
        integrator_fee_rate_bps: u8,
    ) -> SwapRequest {
        SwapRequest {
            virtual_reserves: self.clamm_virtual_reserves,
            real_reserves: self.cpamm_real_reserves,
            starts_in_bonding_curve: self.in_bonding_curve(),
            is_sell,
            input_amount,
            user_balance,
            integrator_fee_rate_bps,
        }
    }

    /// Apply a priced swap the way the contract mutates the market resource.
    ///
    /// Pool fees stay in the pool; integrator fees leave it. `quote` must be
    /// the result of pricing `request` against this exact state.
    pub fn apply_swap(&mut self, request: &SwapRequest, quote: &SwapQuote) {
        if request.is_sell {
            // Quote leaving the market: everything but the retained pool fee.
            let quote_out = quote.net_proceeds + quote.integrator_fee;
            let reserves = match self.phase() {
                MarketPhase::InBondingCurve => &mut self.clamm_virtual_reserves,
                MarketPhase::PostGraduation => &mut self.cpamm_real_reserves,
            };
            reserves.base += quote.base_volume;
            reserves.quote -= quote_out;
            return;
        }

        match self.phase() {
            MarketPhase::InBondingCurve if quote.results_in_state_transition => {
                let curve_quote = QUOTE_VIRTUAL_CEILING - self.clamm_virtual_reserves.quote;
                let curve_base = self.clamm_virtual_reserves.base - BASE_VIRTUAL_FLOOR;
                let pool_quote_in = quote.quote_volume - curve_quote;
                let pool_base_out = quote.base_volume - curve_base;

                self.clamm_virtual_reserves = Reserves::default();
                self.cpamm_real_reserves = Reserves {
                    base: GRADUATION_SEED_RESERVES.base - pool_base_out,
                    quote: GRADUATION_SEED_RESERVES.quote + pool_quote_in,
                };
                self.lp_coin_supply = LP_TOKENS_INITIAL;
                log::debug!(
                    "market graduated: pool seeded with {} base / {} quote",
                    self.cpamm_real_reserves.base,
                    self.cpamm_real_reserves.quote
                );
            }
            MarketPhase::InBondingCurve => {
                self.clamm_virtual_reserves.base -= quote.base_volume;
                self.clamm_virtual_reserves.quote += quote.quote_volume;
            }
            MarketPhase::PostGraduation => {
                self.cpamm_real_reserves.base -= quote.base_volume;
                self.cpamm_real_reserves.quote += quote.quote_volume;
            }
        }
    }
}

// ─── Graduation ───────────────────────────────────────────────────────────────

/// Smallest buy input whose post-integrator-fee quote volume exhausts the curve.
///
/// Returns 0 once the curve is already at its ceiling.
pub fn exact_transition_input_amount(virtual_quote: u128, integrator_fee_rate_bps: u8) -> u128 {
    let needed = QUOTE_VIRTUAL_CEILING.saturating_sub(virtual_quote);
    if needed == 0 {
        return 0;
    }
    let bps = integrator_fee_rate_bps as u128;
    let keep = BASIS_POINTS_PER_UNIT - bps;
    // ceil(needed × 10_000 / keep) always suffices; floor slack allows at most a
    // couple of smaller inputs to qualify too.
    let mut input = (needed * BASIS_POINTS_PER_UNIT).div_ceil(keep);
    while input > 0 && volume_after_fee(input - 1, integrator_fee_rate_bps) >= needed {
        input -= 1;
    }
    input
}

fn volume_after_fee(input: u128, integrator_fee_rate_bps: u8) -> u128 {
    input - fee_amount(input, integrator_fee_rate_bps)
}
