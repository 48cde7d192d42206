//! Emojicoin Rust SDK
//!
//! Off-chain mirror of the emojicoin market contract: bit-exact swap pricing
//! across the bonding curve and the post-graduation pool, and correlation of
//! one transaction's emitted events into per-market rows.
//!
//! # Quick Start
//!
//! ```rust
//! use emojicoin_sdk::{quote_swap, MarketState};
//!
//! // Buy with 1 APT (1e8 octas) on a freshly registered market, no integrator fee.
//! let market = MarketState::registered();
//! let request = market.swap_request(false, 100_000_000, 0, 0);
//! let base_out = quote_swap(&request)?;
//! assert_eq!(base_out, 12_219_451_371_571);
//! # Ok::<(), emojicoin_sdk::PricingError>(())
//! ```
//!
//! ```rust,no_run
//! use emojicoin_sdk::{process_transaction, DomainEvent, RawEvent, TxnInfo};
//!
//! fn index(raw: &[RawEvent], txn: &TxnInfo) -> emojicoin_sdk::Result<()> {
//!     let mut events = Vec::new();
//!     for event in raw {
//!         if let Some(decoded) = event.decode()? {
//!             events.push(DomainEvent::try_from(decoded)?);
//!         }
//!     }
//!     let rows = process_transaction(events, txn, None)?;
//!     println!("{} swaps, {} chats", rows.swap_events.len(), rows.chat_events.len());
//!     Ok(())
//! }
//! ```
//!
//! # Feature Overview
//!
//! | Item | Description |
//! |--------|-------------|
//! | [`simulate_swap`] | Full fee breakdown for a buy or sell |
//! | [`quote_swap`] | Net proceeds only |
//! | [`best_effort_quote`] | Display quote; expected errors collapse to zero |
//! | [`MarketState`] | Phase, real reserves, circulating supply, local swap application |
//! | [`EmojicoinEvent::decode`] | Type tag + JSON payload to a typed event |
//! | [`correlate`] | Group a transaction's events by `(market_id, market_nonce)` |
//! | [`project_rows`] | Denormalize one group into indexer rows |
//! | [`process_transaction`] | Correlate, project, and de-duplicate liquidity positions |

pub mod constants;
pub mod error;
pub mod event_groups;
pub mod events;
pub mod math;
pub mod rows;
pub mod state;
pub mod types;

#[cfg(test)]
mod test_support;

pub use error::{Error, GroupError, MissingPart, PricingError, Result};
pub use event_groups::{correlate, EventGroup, EventGroupBuilder};
pub use events::{key_of, BumpEvent, DomainEvent, EmojicoinEvent, EventKind, MarketKey, RawEvent};
pub use math::{best_effort_quote, quote_swap, simulate_swap, SwapQuote, SwapRequest};
pub use rows::{process_transaction, project_rows, reduce_user_pools, GroupRows, MiscFields, TransactionRows};
pub use state::{exact_transition_input_amount, MarketPhase, MarketState, Reserves};
pub use types::{AccountAddress, Period, Trigger, TxnInfo};
