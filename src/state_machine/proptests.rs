//! Property-based tests for the dialogue state machine
//!
//! These tests verify key invariants hold across arbitrary conversations.

use super::*;
use crate::registry::{Category, CharityId, Registry};
use proptest::prelude::*;
use rust_decimal::Decimal;

// ============================================================================
// Test Helpers
// ============================================================================

fn registry() -> Registry {
    Registry::seeded().unwrap()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_phase() -> impl Strategy<Value = Phase> {
    prop_oneof![
        Just(Phase::Idle),
        Just(Phase::Discovery),
        Just(Phase::ConfirmCharity),
        Just(Phase::AwaitAmount),
    ]
}

fn arb_charity_id() -> impl Strategy<Value = CharityId> {
    let ids: Vec<CharityId> = registry().all().iter().map(|r| r.id.clone()).collect();
    proptest::sample::select(ids)
}

/// Any consistent state: a selection is present when the phase needs one
fn arb_state() -> impl Strategy<Value = DialogueState> {
    (arb_phase(), proptest::option::of(arb_charity_id())).prop_flat_map(|(phase, selected)| {
        if phase.requires_selection() && selected.is_none() {
            arb_charity_id()
                .prop_map(move |id| DialogueState::selecting(phase, id))
                .boxed()
        } else {
            Just(DialogueState::new(phase, selected)).boxed()
        }
    })
}

fn arb_keyword() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("hello"),
        Just("reset"),
        Just("urgent"),
        Just("yes"),
        Just("no"),
        Just("tell me more"),
        Just("small"),
        Just("health"),
        Just("panda protection"),
        Just("cancel"),
        Just("42"),
        Just("500"),
        Just("-3"),
        Just("abc"),
    ]
    .prop_map(String::from)
}

fn arb_utterance() -> impl Strategy<Value = String> {
    prop_oneof![
        arb_keyword(),
        "[a-zA-Z0-9 .\\-]{0,30}",
        (arb_keyword(), "[a-z ]{0,10}").prop_map(|(k, noise)| format!("{noise} {k}")),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        4 => arb_utterance().prop_map(Event::user_message),
        1 => arb_charity_id().prop_map(|charity_id| Event::CharitySelected { charity_id }),
    ]
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: selection is present whenever the phase needs it
    #[test]
    fn prop_transitions_keep_selection_consistent(
        events in proptest::collection::vec(arb_event(), 0..25)
    ) {
        let registry = registry();
        let mut state = DialogueState::default();

        for event in events {
            let result = transition(&state, &registry, event).unwrap();
            state = result.new_state;
            prop_assert!(state.is_consistent(), "Inconsistent state: {:?}", state);
        }
    }

    // Invariant 2: emergency words always route to a Health charity
    #[test]
    fn prop_emergency_routes_to_health(
        state in arb_state(),
        word in prop_oneof![Just("urgent"), Just("EMERGENCY"), Just("Disaster")],
        prefix in "[a-z ]{0,12}",
        suffix in "[a-z ]{0,12}",
    ) {
        let registry = registry();
        let text = format!("{prefix}{word}{suffix}");
        let result = transition(&state, &registry, Event::user_message(text)).unwrap();

        prop_assert_eq!(result.new_state.phase, Phase::ConfirmCharity);
        let selected = result.new_state.selected_charity.as_ref().unwrap();
        prop_assert_eq!(registry.get(selected).unwrap().category, Category::Health);
    }

    // Invariant 3: a payment card is only ever issued from AWAIT_AMOUNT,
    // with the tier matching the amount and the phase back to IDLE
    #[test]
    fn prop_payment_cards_are_well_formed(
        state in arb_state(),
        text in arb_utterance(),
    ) {
        let registry = registry();
        let result = transition(&state, &registry, Event::user_message(text)).unwrap();

        if let Some(card) = result.response.payment() {
            prop_assert_eq!(state.phase, Phase::AwaitAmount);
            prop_assert_eq!(result.new_state.phase, Phase::Idle);
            prop_assert_eq!(card.tier, DonationTier::classify(card.amount));
            prop_assert!(card.amount >= Decimal::ZERO);
            prop_assert_eq!(Some(&card.charity.id), state.selected_charity.as_ref());
        }
    }

    // Invariant 4: exact charity names select that charity from discovery phases
    #[test]
    fn prop_exact_name_selects_charity(
        idx in 0usize..50,
        discovering in any::<bool>(),
        upper in any::<bool>(),
    ) {
        let registry = registry();
        let record = &registry.all()[idx];
        let phase = if discovering { Phase::Discovery } else { Phase::Idle };
        let text = if upper { record.name.to_uppercase() } else { record.name.clone() };

        // Names containing a global keyword are owned by the override rules
        let folded = text.to_lowercase();
        prop_assume!(!["urgent", "emergency", "disaster", "hello", "start", "reset", "small", "tiny", "little"]
            .iter()
            .any(|w| folded.contains(w)));

        let result = transition(
            &DialogueState::cleared(phase),
            &registry,
            Event::user_message(text),
        ).unwrap();

        prop_assert_eq!(result.new_state.phase, Phase::ConfirmCharity);
        let selected = registry.get(result.new_state.selected_charity.as_ref().unwrap()).unwrap();
        // Earlier catalog entries may be matched by category first
        prop_assert!(
            selected.id == record.id || folded.contains(&selected.category.as_str().to_lowercase()),
            "selected {} for {}", selected.name, record.name
        );
    }

    // Invariant 5: greetings are idempotent
    #[test]
    fn prop_greeting_idempotent(state in arb_state()) {
        let registry = registry();
        let first = transition(&state, &registry, Event::user_message("hello")).unwrap();
        let second = transition(&first.new_state, &registry, Event::user_message("hello")).unwrap();

        prop_assert_eq!(&first.new_state, &DialogueState::cleared(Phase::Discovery));
        prop_assert_eq!(&second.new_state, &DialogueState::cleared(Phase::Discovery));
    }

    // Invariant 6: unrecognized amounts never leave AWAIT_AMOUNT
    #[test]
    fn prop_bad_amount_keeps_awaiting(
        id in arb_charity_id(),
        text in "[a-jm-z ]{0,20}",
    ) {
        // No digits; override keywords are filtered out below
        let folded = text.to_lowercase();
        prop_assume!(!["urgent", "emergency", "disaster", "hello", "start", "reset"]
            .iter()
            .any(|w| folded.contains(w)));

        let registry = registry();
        let state = DialogueState::selecting(Phase::AwaitAmount, id);
        let result = transition(&state, &registry, Event::user_message(text)).unwrap();

        prop_assert_eq!(result.rule, RuleId::AmountCapture);
        prop_assert_eq!(&result.new_state, &state);
        prop_assert!(result.response.payment().is_none());
    }
}
