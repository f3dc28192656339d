//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> ChatContext {
    ChatContext::new("test-session", "Ana")
}

/// Minimal effect interpreter: the log plus the error slot
#[derive(Debug, Default)]
struct Model {
    phase: ChatPhase,
    log: Vec<Message>,
    error: Option<String>,
    requests: usize,
}

impl Model {
    fn started() -> Self {
        let mut model = Model::default();
        model.apply(Event::SessionStarted).unwrap();
        model
    }

    fn apply(&mut self, event: Event) -> Result<(), TransitionError> {
        let result = transition(&self.phase, &test_context(), event)?;
        self.phase = result.new_state;
        for effect in result.effects {
            match effect {
                Effect::AppendMessage(m) => self.log.push(m),
                Effect::RequestReply { .. } => self.requests += 1,
                Effect::SetError(e) => self.error = e,
                Effect::PublishSnapshot => {}
            }
        }
        Ok(())
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z ]{1,30}",
        Just(String::new()),
        Just("   ".to_string()),
    ]
}

fn arb_errored_state() -> impl Strategy<Value = ChatPhase> {
    "[a-zA-Z ]{1,30}".prop_map(|message| ChatPhase::Errored { message })
}

fn arb_state() -> impl Strategy<Value = ChatPhase> {
    prop_oneof![
        Just(ChatPhase::Greeting),
        Just(ChatPhase::AwaitingInput),
        Just(ChatPhase::Exchanging),
        arb_errored_state(),
        Just(ChatPhase::Qualified),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        Just(Event::SessionStarted),
        arb_text().prop_map(|text| Event::UserSubmit { text }),
        ("[a-zA-Z ]{1,30}", any::<bool>())
            .prop_map(|(reply, qualified)| Event::AssistantReplied { reply, qualified }),
        "[a-zA-Z ]{1,30}".prop_map(|message| Event::GatewayFailed { message }),
        Just(Event::ErrorSurfaced),
    ]
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    // Invariant 1: Qualified is absorbing
    #[test]
    fn prop_qualified_is_terminal(event in arb_event()) {
        let result = transition(&ChatPhase::Qualified, &test_context(), event);
        prop_assert!(result.is_err());
    }

    // Invariant 2: No new exchange while one is in flight
    #[test]
    fn prop_exchanging_rejects_submit(text in arb_text()) {
        let result = transition(&ChatPhase::Exchanging, &test_context(), Event::UserSubmit { text });
        prop_assert_eq!(result.unwrap_err(), TransitionError::ExchangeInFlight);
    }

    // Invariant 3: RequestReply only ever accompanies a move into Exchanging
    #[test]
    fn prop_request_implies_exchanging(state in arb_state(), event in arb_event()) {
        if let Ok(result) = transition(&state, &test_context(), event) {
            let requests = result
                .effects
                .iter()
                .filter(|e| matches!(e, Effect::RequestReply { .. }))
                .count();
            prop_assert!(requests <= 1);
            if requests == 1 {
                prop_assert_eq!(result.new_state, ChatPhase::Exchanging);
            }
        }
    }

    // Invariant 4: Failure never appends a message and never qualifies
    #[test]
    fn prop_failure_keeps_log(message in "[a-zA-Z ]{1,30}") {
        let result = transition(
            &ChatPhase::Exchanging,
            &test_context(),
            Event::GatewayFailed { message },
        ).unwrap();
        prop_assert!(!result.effects.iter().any(|e| matches!(e, Effect::AppendMessage(_))));
        prop_assert!(!result.new_state.is_terminal());
    }

    // Invariant 5: Any event sequence keeps the log alternating and
    // never un-qualifies
    #[test]
    fn prop_log_alternates(events in proptest::collection::vec(arb_event(), 0..40)) {
        let mut model = Model::started();
        let mut was_qualified = false;

        for event in events {
            let before = model.log.len();
            let _ = model.apply(event);

            if was_qualified {
                prop_assert_eq!(model.log.len(), before);
                prop_assert_eq!(&model.phase, &ChatPhase::Qualified);
            }
            was_qualified = model.phase.is_terminal();
        }

        prop_assert_eq!(model.log[0].role, Role::Assistant);
        for pair in model.log.windows(2) {
            // Failures leave a user message without a reply, so two user
            // messages may sit next to each other; two replies never do.
            prop_assert!(!(pair[0].role == Role::Assistant && pair[1].role == Role::Assistant));
        }
        let users = model.log.iter().filter(|m| m.role == Role::User).count();
        prop_assert_eq!(users, model.requests);
    }

    // Invariant 6: Errored is always recoverable by resubmitting
    #[test]
    fn prop_error_always_recoverable(state in arb_errored_state(), text in "[a-zA-Z]{1,30}") {
        let result = transition(&state, &test_context(), Event::UserSubmit { text }).unwrap();
        prop_assert_eq!(result.new_state, ChatPhase::Exchanging);
    }
}
