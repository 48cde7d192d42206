//! Swap pricing.
//!
//! Mirrors the on-chain arithmetic exactly so off-chain estimates match
//! on-chain results. The constant-product output is carried as an exact
//! rational (`quotient + remainder / denominator` over 256-bit intermediates)
//! and only floored where the contract floors it.

use ethnum::U256;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::PricingError;
use crate::state::{Reserves, GRADUATION_SEED_RESERVES};

// ─── Request / result ─────────────────────────────────────────────────────────

/// Inputs for one pricing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    /// Bonding-curve reserves; read while `starts_in_bonding_curve`.
    pub virtual_reserves: Reserves,
    /// Pool reserves; read after graduation.
    pub real_reserves: Reserves,
    pub starts_in_bonding_curve: bool,
    pub is_sell: bool,
    /// Base for a sell, quote for a buy.
    pub input_amount: u128,
    /// Seller's base balance. Ignored for buys.
    pub user_balance: u128,
    pub integrator_fee_rate_bps: u8,
}

/// Full fee and volume breakdown for a hypothetical swap.
///
/// Field semantics follow the on-chain `Swap` event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuote {
    /// Quote received for a sell, base received for a buy.
    pub net_proceeds: u128,
    /// Quote paid to the integrator.
    pub integrator_fee: u128,
    /// Fee retained by the pool: quote on a sell, base on a buy. Zero on the curve.
    pub pool_fee: u128,
    pub base_volume: u128,
    pub quote_volume: u128,
    /// The swap exhausted the bonding curve and graduated the market.
    pub results_in_state_transition: bool,
}

// ─── Exact cpamm output ───────────────────────────────────────────────────────

/// `quotient + remainder / denominator`, never rounded until asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ratio {
    quotient: U256,
    remainder: U256,
    denominator: U256,
}

impl Ratio {
    fn whole(value: u128) -> Self {
        Self {
            quotient: U256::new(value),
            remainder: U256::ZERO,
            denominator: U256::ONE,
        }
    }

    fn floor(&self) -> u128 {
        self.quotient.as_u128()
    }

    /// `floor(self × bps / 10_000)`.
    ///
    /// Divide-first: `floor((q·bps + floor(r·bps / d)) / 10_000)` equals the
    /// floor of the exact product because 10_000 is an integer.
    fn fee(&self, bps: u8) -> u128 {
        let bps = U256::new(bps as u128);
        let fractional = self.remainder * bps / self.denominator;
        ((self.quotient * bps + fractional) / U256::new(BASIS_POINTS_PER_UNIT)).as_u128()
    }
}

/// Constant-product output for `input_amount` traded against `reserves`.
///
/// Selling base yields `input × quote / (input + base)`; buying base yields
/// `input × base / (input + quote)`.
fn cpamm_output(reserves: Reserves, input_amount: u128, is_sell: bool) -> Result<Ratio, PricingError> {
    let (reserve_in, reserve_out) = if is_sell {
        (reserves.base, reserves.quote)
    } else {
        (reserves.quote, reserves.base)
    };
    let input = U256::new(input_amount);
    let denominator = input + U256::new(reserve_in);
    if denominator == U256::ZERO {
        return Err(PricingError::DivideByZero);
    }
    let numerator = input * U256::new(reserve_out);
    Ok(Ratio {
        quotient: numerator / denominator,
        remainder: numerator % denominator,
        denominator,
    })
}

/// `floor(amount × bps / 10_000)`, the fee on a whole-unit principal.
pub fn fee_amount(amount: u128, bps: u8) -> u128 {
    Ratio::whole(amount).fee(bps)
}

/// Subtraction that can only underflow on a snapshot the contract never produces.
fn invariant_sub(lhs: u128, rhs: u128, what: &str) -> u128 {
    match lhs.checked_sub(rhs) {
        Some(diff) => diff,
        None => panic!("swap pricing invariant violated: {what} ({lhs} < {rhs})"),
    }
}

// ─── Simulation ───────────────────────────────────────────────────────────────

/// Price a swap and return the full fee breakdown.
///
/// Fails only with the expected domain errors. Virtual reserves outside the
/// curve range are a defect and panic; see [`crate::state::MarketState::validate`].
pub fn simulate_swap(request: &SwapRequest) -> Result<SwapQuote, PricingError> {
    if request.is_sell {
        simulate_sell(request)
    } else {
        simulate_buy(request)
    }
}

/// Net proceeds of a swap, floored to an integer.
pub fn quote_swap(request: &SwapRequest) -> Result<u128, PricingError> {
    simulate_swap(request).map(|quote| quote.net_proceeds)
}

/// A quote for display purposes: the expected domain errors collapse to an
/// all-zero quote.
pub fn best_effort_quote(request: &SwapRequest) -> SwapQuote {
    match simulate_swap(request) {
        Ok(quote) => quote,
        Err(err @ (PricingError::InsufficientBalance { .. } | PricingError::DivideByZero)) => {
            log::debug!("best-effort quote collapsed to zero: {err}");
            SwapQuote::default()
        }
    }
}

fn simulate_sell(request: &SwapRequest) -> Result<SwapQuote, PricingError> {
    if request.input_amount > request.user_balance {
        return Err(PricingError::InsufficientBalance {
            input: request.input_amount,
            balance: request.user_balance,
        });
    }

    // No pool fee while the market is still on the curve.
    let (amm_out, pool_fee) = if request.starts_in_bonding_curve {
        (cpamm_output(request.virtual_reserves, request.input_amount, true)?, 0)
    } else {
        let amm_out = cpamm_output(request.real_reserves, request.input_amount, true)?;
        (amm_out, amm_out.fee(POOL_FEE_RATE_BPS))
    };
    let integrator_fee = amm_out.fee(request.integrator_fee_rate_bps);

    // Both fees are whole units bounded by the rational output, so the floor
    // of the difference is the floor of the output minus the fees.
    let net_proceeds = invariant_sub(
        amm_out.floor(),
        pool_fee + integrator_fee,
        "sell fees exceed amm output",
    );

    Ok(SwapQuote {
        net_proceeds,
        integrator_fee,
        pool_fee,
        base_volume: request.input_amount,
        quote_volume: net_proceeds,
        results_in_state_transition: false,
    })
}

fn simulate_buy(request: &SwapRequest) -> Result<SwapQuote, PricingError> {
    let integrator_fee = fee_amount(request.input_amount, request.integrator_fee_rate_bps);
    let quote_volume = request.input_amount - integrator_fee;

    let (base_out, pool_fee, results_in_state_transition) = if request.starts_in_bonding_curve {
        let virt = request.virtual_reserves;
        let max_quote_in_curve =
            invariant_sub(QUOTE_VIRTUAL_CEILING, virt.quote, "virtual quote above ceiling");

        if quote_volume < max_quote_in_curve {
            (cpamm_output(virt, quote_volume, false)?.floor(), 0, false)
        } else {
            // Graduation: sweep the rest of the curve, then trade the remainder
            // against the freshly seeded pool.
            let swept = invariant_sub(virt.base, BASE_VIRTUAL_FLOOR, "virtual base below floor");
            let remaining_quote = quote_volume - max_quote_in_curve;
            let (pool_out, pool_fee) = if remaining_quote > 0 {
                let amm_out = cpamm_output(GRADUATION_SEED_RESERVES, remaining_quote, false)?;
                let pool_fee = amm_out.fee(POOL_FEE_RATE_BPS);
                (amm_out.floor() - pool_fee, pool_fee)
            } else {
                (0, 0)
            };
            (swept + pool_out, pool_fee, true)
        }
    } else {
        let amm_out = cpamm_output(request.real_reserves, quote_volume, false)?;
        let pool_fee = amm_out.fee(POOL_FEE_RATE_BPS);
        (amm_out.floor() - pool_fee, pool_fee, false)
    };

    Ok(SwapQuote {
        net_proceeds: base_out,
        integrator_fee,
        pool_fee,
        base_volume: base_out,
        quote_volume,
        results_in_state_transition,
    })
}
