mod common;

use common::*;
use emojicoin_sdk::rows::BumpRow;
use emojicoin_sdk::{
    correlate, process_transaction, BumpEvent, DomainEvent, EventGroup, EventGroupBuilder,
    GroupError, MarketKey, MissingPart, Period,
};
use proptest::prelude::*;

/// A valid four-group batch: two markets, one of them bumped twice.
fn valid_batch() -> Vec<DomainEvent> {
    let mut events = vec![
        swap(7, 3),
        state(7, 3, 2),
        liquidity(7, 4, "0x1a"),
        state(7, 4, 4),
        chat(9, 2),
        state(9, 2, 6),
        registration(11),
        state(11, 1, 1),
    ];
    events.extend(PERIODS[..3].iter().map(|&p| periodic(7, 3, p)));
    events.extend(PERIODS.iter().map(|&p| periodic(9, 2, p)));
    events
}

/// Groups sorted by key with periodic rollups sorted by resolution.
fn canonical(mut groups: Vec<EventGroup>) -> Vec<EventGroup> {
    for group in &mut groups {
        group
            .periodic_state_events
            .sort_by_key(|e| e.periodic_state_metadata.period);
    }
    groups.sort_by_key(EventGroup::key);
    groups
}

#[test]
fn reversed_swap_and_state_correlate() {
    let groups = correlate(vec![state(7, 3, 2), swap(7, 3)], &txn()).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].key(), MarketKey::new(7, 3));
    assert!(matches!(groups[0].bump_event, BumpEvent::Swap(_)));
}

#[test]
fn eighth_periodic_state_is_rejected() {
    let mut builder = EventGroupBuilder::from_event(swap(7, 3), txn()).unwrap();
    for &p in &PERIODS {
        builder.add_event(periodic(7, 3, p)).unwrap();
    }
    assert_eq!(
        builder.add_event(periodic(7, 3, PERIODS[0])),
        Err(GroupError::TooManyPeriodicStates(MarketKey::new(7, 3)))
    );
}

#[test]
fn batch_projects_into_tables() {
    let rows = process_transaction(valid_batch(), &txn(), None).unwrap();
    assert_eq!(rows.swap_events.len(), 1);
    assert_eq!(rows.liquidity_events.len(), 1);
    assert_eq!(rows.chat_events.len(), 1);
    assert_eq!(rows.market_registration_events.len(), 1);
    assert_eq!(rows.periodic_state_events.len(), 3 + PERIODS.len());
    assert_eq!(rows.market_latest_state_events.len(), 4);
    assert_eq!(rows.user_pools.len(), 1);
    assert_eq!(rows.user_pools[0].market.market_nonce, 4);
    assert_eq!(rows.transaction.sender, txn().sender);
}

#[test]
fn projected_rows_serialize_large_integers_as_strings() {
    let groups = correlate(vec![swap(7, 3), state(7, 3, 2)], &txn()).unwrap();
    let rows = emojicoin_sdk::project_rows(&groups[0], None);
    let BumpRow::Swap(row) = &rows.bump else {
        panic!("expected swap row");
    };
    let json = serde_json::to_value(row).unwrap();
    assert_eq!(json["swap"]["net_proceeds"], "12097158859510");
    assert_eq!(json["market"]["emoji_bytes"], "0xf09f90b8");
    assert_eq!(json["transaction"]["version"], "987654321");
}

proptest! {
    /// Grouping does not depend on arrival order, and every group is complete.
    #[test]
    fn correlation_is_order_independent(events in Just(valid_batch()).prop_shuffle()) {
        let baseline = canonical(correlate(valid_batch(), &txn()).unwrap());
        let shuffled = correlate(events.clone(), &txn()).unwrap();

        // Output order follows first sight of each key.
        let mut first_seen: Vec<MarketKey> = Vec::new();
        for event in &events {
            let key = emojicoin_sdk::key_of(event);
            if !first_seen.contains(&key) {
                first_seen.push(key);
            }
        }
        let keys: Vec<_> = shuffled.iter().map(EventGroup::key).collect();
        prop_assert_eq!(keys, first_seen);
        prop_assert_eq!(canonical(shuffled), baseline);
    }

    /// Dropping any bump or state event makes the whole batch fail.
    #[test]
    fn missing_half_is_never_built(
        events in Just(valid_batch()).prop_shuffle(),
        victim in 0usize..8,
    ) {
        let mut events = events;
        let target = valid_batch().swap_remove(victim);
        let index = events.iter().position(|e| *e == target).unwrap();
        events.remove(index);

        let missing = match target {
            DomainEvent::State(_) => MissingPart::StateEvent,
            _ => MissingPart::BumpEvent,
        };
        let err = correlate(events, &txn()).unwrap_err();
        prop_assert_eq!(err, GroupError::Incomplete { key: emojicoin_sdk::key_of(&target), missing });
    }

    /// A second bump and a second state are each rejected once, whatever the
    /// arrival order. The repeated resolution is rejected as a duplicate while
    /// slots remain, and by the count limit once all seven are filled.
    #[test]
    fn cardinality_is_enforced_in_any_order(
        events in Just({
            let mut events = vec![swap(7, 3), state(7, 3, 2), chat(7, 3), state(7, 3, 6)];
            events.extend(PERIODS.iter().map(|&p| periodic(7, 3, p)));
            events.push(periodic(7, 3, PERIODS[3]));
            events
        }).prop_shuffle()
    ) {
        let key = MarketKey::new(7, 3);
        let repeated_arrives_last = events
            .iter()
            .rev()
            .find_map(|e| match e {
                DomainEvent::PeriodicState(p) => Some(p.periodic_state_metadata.period),
                _ => None,
            })
            .map_or(false, |period| period.as_micros() == PERIODS[3]);

        let mut events = events.into_iter();
        let mut builder = EventGroupBuilder::from_event(events.next().unwrap(), txn()).unwrap();
        let (mut bumps, mut states) = (0, 0);
        let mut periodic_errors = Vec::new();

        for event in events {
            match builder.add_event(event) {
                Ok(()) => {}
                Err(GroupError::DuplicateBump(_)) => bumps += 1,
                Err(GroupError::DuplicateState(_)) => states += 1,
                Err(err @ GroupError::TooManyPeriodicStates(_))
                | Err(err @ GroupError::DuplicatePeriodicState { .. }) => periodic_errors.push(err),
                Err(other) => prop_assert!(false, "unexpected error {other}"),
            }
        }

        let expected = if repeated_arrives_last {
            GroupError::TooManyPeriodicStates(key)
        } else {
            let period = Period::try_from(PERIODS[3]).unwrap();
            GroupError::DuplicatePeriodicState { key, period }
        };
        prop_assert_eq!((bumps, states), (1, 1));
        prop_assert_eq!(periodic_errors, vec![expected]);
        prop_assert!(builder.is_complete());
        prop_assert_eq!(builder.build().unwrap().periodic_state_events.len(), PERIODS.len());
    }
}
