//! Correlation of one transaction's events into per-market-revision groups.
//!
//! Every bump (chat, registration, swap, liquidity) produces exactly one state
//! snapshot and zero to seven periodic rollups, all sharing the market's new
//! nonce. Events arrive in no particular order; grouping is by
//! `(market_id, market_nonce)` and output order is first sight of each key.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::Serialize;

use crate::error::{GroupError, MissingPart};
use crate::events::{BumpEvent, DomainEvent, MarketKey, MarketMetadata, PeriodicStateEvent, StateEvent};
use crate::types::{Period, TxnInfo};

/// One periodic rollup per resolution at most.
pub const MAX_PERIODIC_STATE_EVENTS: usize = Period::ALL.len();

// ─── Builder ──────────────────────────────────────────────────────────────────

/// A group still accumulating events. Exists only once its first event is seen.
#[derive(Debug, Clone)]
pub struct EventGroupBuilder {
    key: MarketKey,
    bump_event: Option<BumpEvent>,
    state_event: Option<StateEvent>,
    periodic_state_events: Vec<PeriodicStateEvent>,
    txn_info: TxnInfo,
}

impl EventGroupBuilder {
    pub fn from_event(event: DomainEvent, txn_info: TxnInfo) -> Result<Self, GroupError> {
        let mut builder = Self {
            key: event.market_key(),
            bump_event: None,
            state_event: None,
            periodic_state_events: Vec::with_capacity(MAX_PERIODIC_STATE_EVENTS),
            txn_info,
        };
        builder.add_event(event)?;
        Ok(builder)
    }

    pub fn key(&self) -> MarketKey {
        self.key
    }

    /// Store `event` in its slot. On error the builder is left unchanged.
    pub fn add_event(&mut self, event: DomainEvent) -> Result<(), GroupError> {
        let found = event.market_key();
        if found != self.key {
            return Err(GroupError::KeyMismatch { expected: self.key, found });
        }

        match event {
            DomainEvent::Chat(e) => self.set_bump(BumpEvent::Chat(e)),
            DomainEvent::MarketRegistration(e) => self.set_bump(BumpEvent::MarketRegistration(e)),
            DomainEvent::Swap(e) => self.set_bump(BumpEvent::Swap(e)),
            DomainEvent::Liquidity(e) => self.set_bump(BumpEvent::Liquidity(e)),
            DomainEvent::State(e) => {
                if self.state_event.is_some() {
                    return Err(GroupError::DuplicateState(self.key));
                }
                self.state_event = Some(e);
                Ok(())
            }
            DomainEvent::PeriodicState(e) => {
                if self.periodic_state_events.len() >= MAX_PERIODIC_STATE_EVENTS {
                    return Err(GroupError::TooManyPeriodicStates(self.key));
                }
                let period = e.periodic_state_metadata.period;
                if self
                    .periodic_state_events
                    .iter()
                    .any(|p| p.periodic_state_metadata.period == period)
                {
                    return Err(GroupError::DuplicatePeriodicState { key: self.key, period });
                }
                self.periodic_state_events.push(e);
                Ok(())
            }
        }
    }

    fn set_bump(&mut self, event: BumpEvent) -> Result<(), GroupError> {
        if self.bump_event.is_some() {
            return Err(GroupError::DuplicateBump(self.key));
        }
        self.bump_event = Some(event);
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.bump_event.is_some() && self.state_event.is_some()
    }

    /// Freeze the group. Both a bump and a state event are required.
    pub fn build(self) -> Result<EventGroup, GroupError> {
        let key = self.key;
        let bump_event = self
            .bump_event
            .ok_or(GroupError::Incomplete { key, missing: MissingPart::BumpEvent })?;
        let state_event = self
            .state_event
            .ok_or(GroupError::Incomplete { key, missing: MissingPart::StateEvent })?;
        Ok(EventGroup {
            market_id: key.market_id,
            market_nonce: key.market_nonce,
            bump_event,
            state_event,
            periodic_state_events: self.periodic_state_events,
            txn_info: self.txn_info,
        })
    }
}

// ─── Completed group ──────────────────────────────────────────────────────────

/// Everything one market revision emitted within a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventGroup {
    pub market_id: u64,
    pub market_nonce: u64,
    pub bump_event: BumpEvent,
    pub state_event: StateEvent,
    pub periodic_state_events: Vec<PeriodicStateEvent>,
    pub txn_info: TxnInfo,
}

impl EventGroup {
    pub fn key(&self) -> MarketKey {
        MarketKey::new(self.market_id, self.market_nonce)
    }

    pub fn market_metadata(&self) -> &MarketMetadata {
        &self.state_event.market_metadata
    }
}

// ─── Correlation ──────────────────────────────────────────────────────────────

/// Group a transaction's market events by `(market_id, market_nonce)` and
/// build every group.
///
/// Groups come back in order of each key's first appearance. Any cardinality
/// violation or incomplete group fails the whole batch.
pub fn correlate<I>(events: I, txn_info: &TxnInfo) -> Result<Vec<EventGroup>, GroupError>
where
    I: IntoIterator<Item = DomainEvent>,
{
    let mut slots: HashMap<MarketKey, usize> = HashMap::new();
    let mut builders: Vec<EventGroupBuilder> = Vec::new();

    for event in events {
        match slots.entry(event.market_key()) {
            Entry::Occupied(slot) => builders[*slot.get()].add_event(event)?,
            Entry::Vacant(slot) => {
                log::debug!(
                    "txn {}: new event group {} from {} event",
                    txn_info.version,
                    slot.key(),
                    event.kind()
                );
                slot.insert(builders.len());
                builders.push(EventGroupBuilder::from_event(event, txn_info.clone())?);
            }
        }
    }

    builders.into_iter().map(EventGroupBuilder::build).collect()
}
