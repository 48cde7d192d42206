//! SDK error types.

use std::fmt;

use crate::events::MarketKey;
use crate::types::Period;

/// Expected failures of the pricing engine.
///
/// Anything outside this set is a defect and panics instead of being returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    /// A sell asks for more base than the seller holds.
    #[error("Insufficient balance: input_amount={input} exceeds user balance={balance}")]
    InsufficientBalance { input: u128, balance: u128 },

    /// Zero input traded against an empty reserve side.
    #[error("Division by zero in cpamm output (zero input against an empty reserve)")]
    DivideByZero,
}

/// Which half of a complete event group is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPart {
    BumpEvent,
    StateEvent,
}

impl fmt::Display for MissingPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingPart::BumpEvent => f.write_str("bump event"),
            MissingPart::StateEvent => f.write_str("state event"),
        }
    }
}

/// Failures while grouping one transaction's events by market revision.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GroupError {
    // ── Routing ──────────────────────────────────────────────────────────────
    /// An event was handed to the builder of a different `(market_id, market_nonce)`.
    #[error("Event key {found} does not match group key {expected}")]
    KeyMismatch { expected: MarketKey, found: MarketKey },

    /// The event is not scoped to a single market (e.g. the registry's global state).
    #[error("{0} events are not market scoped and cannot be grouped")]
    NotMarketScoped(&'static str),

    // ── Cardinality ──────────────────────────────────────────────────────────
    #[error("Group {0} already holds a bump event")]
    DuplicateBump(MarketKey),

    #[error("Group {0} already holds a state event")]
    DuplicateState(MarketKey),

    /// All seven resolutions are already present.
    #[error("Group {0} already holds the maximum of 7 periodic state events")]
    TooManyPeriodicStates(MarketKey),

    #[error("Group {key} already holds a periodic state event for {period}")]
    DuplicatePeriodicState { key: MarketKey, period: Period },

    // ── Completion ───────────────────────────────────────────────────────────
    /// `build()` was called before both a bump and a state event arrived.
    #[error("Group {key} is incomplete: missing {missing}")]
    Incomplete { key: MarketKey, missing: MissingPart },
}

/// All errors returned by the emojicoin SDK.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Group(#[from] GroupError),

    // ── Decoding ─────────────────────────────────────────────────────────────
    /// Event payload JSON did not match the shape of its type tag.
    #[error("Failed to decode {event_type} payload: {source}")]
    Decode {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },

    /// A type under the emojicoin module that this SDK does not know.
    #[error("Unrecognized emojicoin event type {type_tag}")]
    UnknownEvent { type_tag: String },

    // ── Validation ───────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience alias so every module can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;
