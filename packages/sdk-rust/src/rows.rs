//! Normalized per-market rows derived from completed event groups.
//!
//! The shapes follow what an indexer persists per transaction: one bump row
//! per group, its periodic rollups, and the market's latest state. Fields that
//! only a transaction's write set can provide come in through [`MiscFields`];
//! without them (synthetic or offline generation) defined defaults are used.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GroupError;
use crate::event_groups::{correlate, EventGroup};
use crate::events::*;
use crate::state::Reserves;
use crate::types::{as_string, hex_bytes, AccountAddress, Period, Trigger, TxnInfo};

// ─── Shared row pieces ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionMetadata {
    #[serde(with = "as_string")]
    pub version: u64,
    pub sender: AccountAddress,
    pub entry_function: Option<String>,
    #[serde(with = "as_string")]
    pub time: u64,
    pub timestamp: DateTime<Utc>,
}

impl From<&TxnInfo> for TransactionMetadata {
    fn from(txn: &TxnInfo) -> Self {
        Self {
            version: txn.version,
            sender: txn.sender,
            entry_function: txn.entry_function.clone(),
            time: txn.time,
            timestamp: txn.timestamp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketMetadataRow {
    #[serde(with = "as_string")]
    pub market_id: u64,
    #[serde(with = "as_string")]
    pub market_nonce: u64,
    /// Transaction time, not the bump time.
    #[serde(with = "as_string")]
    pub time: u64,
    pub trigger: Trigger,
    pub market_address: AccountAddress,
    #[serde(with = "hex_bytes")]
    pub emoji_bytes: Vec<u8>,
}

impl MarketMetadataRow {
    pub fn emoji_symbol(&self) -> String {
        String::from_utf8_lossy(&self.emoji_bytes).into_owned()
    }
}

/// Reserves and stats copied out of the group's state event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StateData {
    pub clamm_virtual_reserves: Reserves,
    pub cpamm_real_reserves: Reserves,
    #[serde(with = "as_string")]
    pub lp_coin_supply: u128,
    pub cumulative_stats: CumulativeStats,
    pub instantaneous_stats: InstantaneousStats,
}

impl From<&StateEvent> for StateData {
    fn from(event: &StateEvent) -> Self {
        Self {
            clamm_virtual_reserves: event.clamm_virtual_reserves,
            cpamm_real_reserves: event.cpamm_real_reserves,
            lp_coin_supply: event.lp_coin_supply,
            cumulative_stats: event.cumulative_stats,
            instantaneous_stats: event.instantaneous_stats,
        }
    }
}

// ─── Bump payloads ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatData {
    pub user: AccountAddress,
    pub message: String,
    #[serde(with = "as_string")]
    pub user_emojicoin_balance: u128,
    #[serde(with = "as_string")]
    pub circulating_supply: u128,
    #[serde(with = "as_string")]
    pub balance_as_fraction_of_circulating_supply_q64: u128,
}

impl From<&ChatEvent> for ChatData {
    fn from(e: &ChatEvent) -> Self {
        Self {
            user: e.user,
            message: e.message.clone(),
            user_emojicoin_balance: e.user_emojicoin_balance,
            circulating_supply: e.circulating_supply,
            balance_as_fraction_of_circulating_supply_q64: e
                .balance_as_fraction_of_circulating_supply_q64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarketRegistrationData {
    pub registrant: AccountAddress,
    pub integrator: AccountAddress,
    #[serde(with = "as_string")]
    pub integrator_fee: u128,
}

impl From<&MarketRegistrationEvent> for MarketRegistrationData {
    fn from(e: &MarketRegistrationEvent) -> Self {
        Self {
            registrant: e.registrant,
            integrator: e.integrator,
            integrator_fee: e.integrator_fee,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwapData {
    pub swapper: AccountAddress,
    pub integrator: AccountAddress,
    #[serde(with = "as_string")]
    pub integrator_fee: u128,
    #[serde(with = "as_string")]
    pub input_amount: u128,
    pub is_sell: bool,
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
    pub pool_fee: u128,
    pub starts_in_bonding_curve: bool,
    pub results_in_state_transition: bool,
    #[serde(with = "as_string")]
    pub balance_as_fraction_of_circulating_supply_before_q64: u128,
    #[serde(with = "as_string")]
    pub balance_as_fraction_of_circulating_supply_after_q64: u128,
}

impl From<&SwapEvent> for SwapData {
    fn from(e: &SwapEvent) -> Self {
        Self {
            swapper: e.swapper,
            integrator: e.integrator,
            integrator_fee: e.integrator_fee,
            input_amount: e.input_amount,
            is_sell: e.is_sell,
            integrator_fee_rate_bps: e.integrator_fee_rate_bps,
            net_proceeds: e.net_proceeds,
            base_volume: e.base_volume,
            quote_volume: e.quote_volume,
            avg_execution_price_q64: e.avg_execution_price_q64,
            pool_fee: e.pool_fee,
            starts_in_bonding_curve: e.starts_in_bonding_curve,
            results_in_state_transition: e.results_in_state_transition,
            balance_as_fraction_of_circulating_supply_before_q64: e
                .balance_as_fraction_of_circulating_supply_before_q64,
            balance_as_fraction_of_circulating_supply_after_q64: e
                .balance_as_fraction_of_circulating_supply_after_q64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LiquidityData {
    pub provider: AccountAddress,
    #[serde(with = "as_string")]
    pub base_amount: u128,
    #[serde(with = "as_string")]
    pub quote_amount: u128,
    #[serde(with = "as_string")]
    pub lp_coin_amount: u128,
    pub liquidity_provided: bool,
    #[serde(with = "as_string")]
    pub base_donation_claim_amount: u128,
    #[serde(with = "as_string")]
    pub quote_donation_claim_amount: u128,
}

impl From<&LiquidityEvent> for LiquidityData {
    fn from(e: &LiquidityEvent) -> Self {
        Self {
            provider: e.provider,
            base_amount: e.base_amount,
            quote_amount: e.quote_amount,
            lp_coin_amount: e.lp_coin_amount,
            liquidity_provided: e.liquidity_provided,
            base_donation_claim_amount: e.base_donation_claim_amount,
            quote_donation_claim_amount: e.quote_donation_claim_amount,
        }
    }
}

// ─── Rows ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRow {
    pub transaction: TransactionMetadata,
    pub market: MarketMetadataRow,
    pub state: StateData,
    pub last_swap: LastSwap,
    pub chat: ChatData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketRegistrationRow {
    pub transaction: TransactionMetadata,
    pub market: MarketMetadataRow,
    pub market_registration: MarketRegistrationData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapRow {
    pub transaction: TransactionMetadata,
    pub market: MarketMetadataRow,
    pub state: StateData,
    pub swap: SwapData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiquidityRow {
    pub transaction: TransactionMetadata,
    pub market: MarketMetadataRow,
    pub state: StateData,
    pub last_swap: LastSwap,
    pub liquidity: LiquidityData,
}

/// The row for whichever bump event the group holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BumpRow {
    Chat(ChatRow),
    MarketRegistration(MarketRegistrationRow),
    Swap(SwapRow),
    Liquidity(LiquidityRow),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodicStateRow {
    pub transaction: TransactionMetadata,
    pub market: MarketMetadataRow,
    pub last_swap: LastSwap,
    pub period: Period,
    #[serde(with = "as_string")]
    pub start_time: u64,
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

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketLatestStateRow {
    pub transaction: TransactionMetadata,
    pub market: MarketMetadataRow,
    pub state: StateData,
    pub last_swap: LastSwap,
    pub daily_tvl_per_lp_coin_growth: String,
    pub in_bonding_curve: bool,
    #[serde(with = "as_string")]
    pub volume_in_1m_state_tracker: u128,
}

/// A provider's position in one market after this transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserLiquidityPoolRow {
    pub transaction: TransactionMetadata,
    pub market: MarketMetadataRow,
    pub liquidity: LiquidityData,
    #[serde(with = "as_string")]
    pub lp_coin_balance: u128,
}

// ─── Write-set fields ─────────────────────────────────────────────────────────

/// Latest-state fields read from the transaction's write set, not its events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiscFields {
    /// Decimal string, as stored by the indexer.
    pub daily_tvl_per_lp_coin_growth: String,
    pub in_bonding_curve: bool,
    #[serde(with = "as_string")]
    pub volume_in_1m_state_tracker: u128,
    /// LP coin balance per provider after the transaction.
    #[serde(default)]
    pub lp_coin_balances: BTreeMap<AccountAddress, u128>,
}

impl Default for MiscFields {
    /// Values used when no write set is available.
    fn default() -> Self {
        Self {
            daily_tvl_per_lp_coin_growth: "0".to_string(),
            in_bonding_curve: true,
            volume_in_1m_state_tracker: 0,
            lp_coin_balances: BTreeMap::new(),
        }
    }
}

/// Write-set fields per market id.
pub type WriteSetFields = BTreeMap<u64, MiscFields>;

// ─── Projection ───────────────────────────────────────────────────────────────

/// All rows one event group produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupRows {
    pub market: MarketMetadataRow,
    pub state: StateData,
    pub bump: BumpRow,
    pub periodic_states: Vec<PeriodicStateRow>,
    pub latest_state: MarketLatestStateRow,
    /// Candidate position when the bump is a liquidity event; see [`reduce_user_pools`].
    pub user_pool: Option<UserLiquidityPoolRow>,
}

/// Denormalize one completed group.
///
/// `misc == None` selects the synthetic defaults of [`MiscFields::default`];
/// it is not treated as missing data.
pub fn project_rows(group: &EventGroup, misc: Option<&MiscFields>) -> GroupRows {
    let defaults = MiscFields::default();
    let misc = misc.unwrap_or(&defaults);

    let transaction = TransactionMetadata::from(&group.txn_info);
    let stored = &group.state_event.market_metadata;
    let market = MarketMetadataRow {
        market_id: group.market_id,
        market_nonce: group.market_nonce,
        time: group.txn_info.time,
        trigger: group.state_event.state_metadata.trigger,
        market_address: stored.market_address,
        emoji_bytes: stored.emoji_bytes.clone(),
    };
    let state = StateData::from(&group.state_event);
    let last_swap = group.state_event.last_swap;

    let mut user_pool = None;
    let bump = match &group.bump_event {
        BumpEvent::Chat(e) => BumpRow::Chat(ChatRow {
            transaction: transaction.clone(),
            market: market.clone(),
            state,
            last_swap,
            chat: e.into(),
        }),
        BumpEvent::MarketRegistration(e) => BumpRow::MarketRegistration(MarketRegistrationRow {
            transaction: transaction.clone(),
            market: market.clone(),
            market_registration: e.into(),
        }),
        BumpEvent::Swap(e) => BumpRow::Swap(SwapRow {
            transaction: transaction.clone(),
            market: market.clone(),
            state,
            swap: e.into(),
        }),
        BumpEvent::Liquidity(e) => {
            let liquidity = LiquidityData::from(e);
            user_pool = Some(UserLiquidityPoolRow {
                transaction: transaction.clone(),
                market: market.clone(),
                liquidity,
                lp_coin_balance: misc.lp_coin_balances.get(&e.provider).copied().unwrap_or(0),
            });
            BumpRow::Liquidity(LiquidityRow {
                transaction: transaction.clone(),
                market: market.clone(),
                state,
                last_swap,
                liquidity,
            })
        }
    };

    let periodic_states = group
        .periodic_state_events
        .iter()
        .map(|e| periodic_state_row(&transaction, &market, last_swap, e))
        .collect();

    let latest_state = MarketLatestStateRow {
        transaction,
        market: market.clone(),
        state,
        last_swap,
        daily_tvl_per_lp_coin_growth: misc.daily_tvl_per_lp_coin_growth.clone(),
        in_bonding_curve: misc.in_bonding_curve,
        volume_in_1m_state_tracker: misc.volume_in_1m_state_tracker,
    };

    GroupRows { market, state, bump, periodic_states, latest_state, user_pool }
}

fn periodic_state_row(
    transaction: &TransactionMetadata,
    market: &MarketMetadataRow,
    last_swap: LastSwap,
    e: &PeriodicStateEvent,
) -> PeriodicStateRow {
    PeriodicStateRow {
        transaction: transaction.clone(),
        market: market.clone(),
        last_swap,
        period: e.periodic_state_metadata.period,
        start_time: e.periodic_state_metadata.start_time,
        open_price_q64: e.open_price_q64,
        high_price_q64: e.high_price_q64,
        low_price_q64: e.low_price_q64,
        close_price_q64: e.close_price_q64,
        volume_base: e.volume_base,
        volume_quote: e.volume_quote,
        integrator_fees: e.integrator_fees,
        pool_fees_base: e.pool_fees_base,
        pool_fees_quote: e.pool_fees_quote,
        n_swaps: e.n_swaps,
        n_chat_messages: e.n_chat_messages,
        starts_in_bonding_curve: e.starts_in_bonding_curve,
        ends_in_bonding_curve: e.ends_in_bonding_curve,
        tvl_per_lp_coin_growth_q64: e.tvl_per_lp_coin_growth_q64,
    }
}

/// Keep only the highest-nonce position per `(provider, market_id)`.
///
/// Output is ordered by provider, then market id.
pub fn reduce_user_pools<I>(candidates: I) -> Vec<UserLiquidityPoolRow>
where
    I: IntoIterator<Item = UserLiquidityPoolRow>,
{
    candidates
        .into_iter()
        .fold(BTreeMap::<(AccountAddress, u64), UserLiquidityPoolRow>::new(), |mut latest, row| {
            let key = (row.liquidity.provider, row.market.market_id);
            let newer = latest
                .get(&key)
                .map_or(true, |kept| kept.market.market_nonce < row.market.market_nonce);
            if newer {
                latest.insert(key, row);
            }
            latest
        })
        .into_values()
        .collect()
}

// ─── Transaction ──────────────────────────────────────────────────────────────

/// Every row one transaction produces, bucketed by table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRows {
    pub transaction: TransactionMetadata,
    pub chat_events: Vec<ChatRow>,
    pub liquidity_events: Vec<LiquidityRow>,
    pub market_registration_events: Vec<MarketRegistrationRow>,
    pub periodic_state_events: Vec<PeriodicStateRow>,
    pub swap_events: Vec<SwapRow>,
    pub user_pools: Vec<UserLiquidityPoolRow>,
    pub market_latest_state_events: Vec<MarketLatestStateRow>,
}

impl TransactionRows {
    fn empty(txn_info: &TxnInfo) -> Self {
        Self {
            transaction: txn_info.into(),
            chat_events: Vec::new(),
            liquidity_events: Vec::new(),
            market_registration_events: Vec::new(),
            periodic_state_events: Vec::new(),
            swap_events: Vec::new(),
            user_pools: Vec::new(),
            market_latest_state_events: Vec::new(),
        }
    }
}

/// Correlate a transaction's market events and project every group.
///
/// `write_set == None` runs in synthetic mode; a market missing from the map
/// also gets the defaults.
pub fn process_transaction<I>(
    events: I,
    txn_info: &TxnInfo,
    write_set: Option<&WriteSetFields>,
) -> Result<TransactionRows, GroupError>
where
    I: IntoIterator<Item = DomainEvent>,
{
    let groups = correlate(events, txn_info)?;
    let mut rows = TransactionRows::empty(txn_info);
    let mut pool_candidates = Vec::new();

    for group in &groups {
        let misc = write_set.and_then(|fields| fields.get(&group.market_id));
        let projected = project_rows(group, misc);
        log::debug!(
            "txn {}: projected group {} with {} periodic rows",
            txn_info.version,
            group.key(),
            projected.periodic_states.len()
        );

        match projected.bump {
            BumpRow::Chat(row) => rows.chat_events.push(row),
            BumpRow::MarketRegistration(row) => rows.market_registration_events.push(row),
            BumpRow::Swap(row) => rows.swap_events.push(row),
            BumpRow::Liquidity(row) => rows.liquidity_events.push(row),
        }
        rows.periodic_state_events.extend(projected.periodic_states);
        rows.market_latest_state_events.push(projected.latest_state);
        pool_candidates.extend(projected.user_pool);
    }

    rows.user_pools = reduce_user_pools(pool_candidates);
    Ok(rows)
}
