//! Edge case tests for calcvault-engine
//!
//! These tests cover boundary conditions and unusual input sequences.

use calcvault_engine::event::last_display;
use calcvault_engine::{
    step, AngleMode, BinaryOperator, CalcError, Calculator, CalculatorState, Constant, Error,
    Event, IdClock, Input, KeyValueStore, MemoryAction, MemoryBlobStore, MemoryStore, Note,
    Paren, Snapshot, UnaryFunction, Vault, Workspace, HISTORY_CAPACITY, RECENT_LOG_CAPACITY,
    SNAPSHOT_KEY,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn press_all(calc: &mut Calculator, inputs: impl IntoIterator<Item = Input>) -> Vec<Event> {
    inputs.into_iter().flat_map(|i| calc.apply(i)).collect()
}

fn keys(calc: &mut Calculator, keys: &str) -> Vec<Event> {
    let inputs: Vec<_> = keys
        .chars()
        .map(|k| Input::from_key(&k.to_string()).unwrap())
        .collect();
    press_all(calc, inputs)
}

fn failed(events: &[Event]) -> Option<CalcError> {
    events.iter().find_map(|e| match e {
        Event::Failed { kind } => Some(*kind),
        _ => None,
    })
}

// ============================================================================
// Operand Entry
// ============================================================================

#[test]
fn very_long_operand() {
    let mut calc = Calculator::seeded(0);
    keys(&mut calc, &"9".repeat(300));
    assert_eq!(calc.display().len(), 300);

    let events = calc.apply(Input::function(UnaryFunction::Abs));
    assert_eq!(last_display(&events), Some("1.000000e+300"));
}

#[test]
fn operand_beyond_f64_range_is_invalid() {
    let mut calc = Calculator::seeded(0);
    keys(&mut calc, &"9".repeat(400));
    keys(&mut calc, "+1=");
    assert_eq!(calc.display(), "Error");
}

#[test]
fn decimal_point_first() {
    let mut calc = Calculator::seeded(0);
    keys(&mut calc, ".5");
    assert_eq!(calc.display(), "0.5");
}

#[test]
fn backspace_to_lone_minus() {
    let mut calc = Calculator::seeded(0);
    keys(&mut calc, "5");
    calc.apply(Input::function(UnaryFunction::Negate));
    calc.apply(Input::Backspace);
    assert_eq!(calc.display(), "-");

    // "-" is not a number
    let events = calc.apply(Input::function(UnaryFunction::Square));
    assert_eq!(failed(&events), Some(CalcError::InvalidResult));
}

#[test]
fn backspace_on_error_text_clears_first() {
    let mut calc = Calculator::seeded(0);
    keys(&mut calc, "1/0=");
    calc.apply(Input::Backspace);
    assert_eq!(calc.display(), "0");
}

#[test]
fn invalid_digit_is_ignored() {
    let mut calc = Calculator::seeded(0);
    keys(&mut calc, "4");
    let events = calc.apply(Input::digit(12));
    assert!(events.is_empty());
    assert_eq!(calc.display(), "4");
}

#[test]
fn nested_parentheses_never_evaluate() {
    let mut calc = Calculator::seeded(0);
    press_all(
        &mut calc,
        [
            Input::Paren { paren: Paren::Open },
            Input::Paren { paren: Paren::Open },
            Input::digit(1),
            Input::Paren {
                paren: Paren::Close,
            },
        ],
    );
    assert_eq!(calc.display(), "((1)");
    assert!(calc.state().pending_operator().is_none());
}

// ============================================================================
// Numeric Boundaries
// ============================================================================

#[test]
fn factorial_boundaries() {
    let mut calc = Calculator::seeded(0);
    keys(&mut calc, "170");
    let events = calc.apply(Input::function(UnaryFunction::Factorial));
    assert_eq!(failed(&events), None);
    assert!(calc.display().starts_with("7.257416e+306"));

    calc.apply(Input::Clear);
    keys(&mut calc, "3.7");
    calc.apply(Input::function(UnaryFunction::Factorial));
    assert_eq!(calc.display(), "6");

    calc.apply(Input::Clear);
    keys(&mut calc, "1");
    calc.apply(Input::function(UnaryFunction::Negate));
    let events = calc.apply(Input::function(UnaryFunction::Factorial));
    assert_eq!(failed(&events), Some(CalcError::InvalidInput));
}

#[test]
fn logarithm_domain() {
    let mut calc = Calculator::seeded(0);
    let events = calc.apply(Input::function(UnaryFunction::Ln));
    assert_eq!(failed(&events), Some(CalcError::InvalidResult));

    calc.apply(Input::Clear);
    keys(&mut calc, "8");
    calc.apply(Input::function(UnaryFunction::Log2));
    assert_eq!(calc.display(), "3");
}

#[test]
fn inverse_trig_in_degrees() {
    let mut calc = Calculator::seeded(0).with_angle_mode(AngleMode::Degrees);
    keys(&mut calc, "1");
    calc.apply(Input::function(UnaryFunction::Atan));
    assert_eq!(calc.display(), "45");

    calc.apply(Input::Clear);
    keys(&mut calc, "2");
    let events = calc.apply(Input::function(UnaryFunction::Asin));
    assert_eq!(failed(&events), Some(CalcError::InvalidResult));
}

#[test]
fn tan_of_ninety_degrees_is_huge_not_error() {
    let mut calc = Calculator::seeded(0).with_angle_mode(AngleMode::Degrees);
    keys(&mut calc, "90");
    let events = calc.apply(Input::function(UnaryFunction::Tan));
    assert_eq!(failed(&events), None);
    assert!(calc.display().contains("e+"));
}

#[test]
fn rounding_functions() {
    let mut calc = Calculator::seeded(0);
    keys(&mut calc, "2.5");
    calc.apply(Input::function(UnaryFunction::Round));
    assert_eq!(calc.display(), "3");

    calc.apply(Input::Clear);
    keys(&mut calc, "2.5");
    calc.apply(Input::function(UnaryFunction::Negate));
    calc.apply(Input::function(UnaryFunction::Round));
    assert_eq!(calc.display(), "-2");

    calc.apply(Input::Clear);
    keys(&mut calc, "2.5");
    calc.apply(Input::function(UnaryFunction::Negate));
    calc.apply(Input::function(UnaryFunction::Floor));
    assert_eq!(calc.display(), "-3");
}

#[test]
fn tiny_result_displays_zero() {
    let mut calc = Calculator::seeded(0);
    keys(&mut calc, "1");
    calc.apply(Input::operator(BinaryOperator::Div));
    keys(&mut calc, "100000000000=");
    assert_eq!(calc.display(), "0");
}

#[test]
fn scientific_result_feeds_next_operation() {
    let mut calc = Calculator::seeded(0);
    keys(&mut calc, "300000*500000=");
    assert_eq!(calc.display(), "1.500000e+11");

    keys(&mut calc, "/3=");
    assert_eq!(calc.display(), "5.000000e+10");
    assert_eq!(
        calc.state().recent_log().next(),
        Some("1.500000e+11 ÷ 3 = 5.000000e+10")
    );
}

#[test]
fn mod_with_negative_operand() {
    let mut calc = Calculator::seeded(0);
    keys(&mut calc, "7");
    calc.apply(Input::function(UnaryFunction::Negate));
    calc.apply(Input::operator(BinaryOperator::Mod));
    keys(&mut calc, "3=");
    assert_eq!(calc.display(), "-1");
}

// ============================================================================
// Error Timer
// ============================================================================

#[test]
fn each_error_gets_a_fresh_token() {
    let mut calc = Calculator::seeded(0);
    keys(&mut calc, "1/0=");
    let first = calc.state().pending_reset().unwrap();
    keys(&mut calc, "2/0=");
    let second = calc.state().pending_reset().unwrap();
    assert_ne!(first, second);

    // The first token no longer clears anything
    assert!(calc.apply(Input::ErrorTimeout { token: first }).is_empty());
    assert_eq!(calc.display(), "Error");

    calc.apply(Input::ErrorTimeout { token: second });
    assert_eq!(calc.display(), "0");
}

#[test]
fn timeout_without_error_is_noop() {
    let mut calc = Calculator::seeded(0);
    keys(&mut calc, "12");
    assert!(calc.apply(Input::ErrorTimeout { token: 1 }).is_empty());
    assert_eq!(calc.display(), "12");
}

#[test]
fn memory_recall_during_error_recalls_after_clearing() {
    let mut calc = Calculator::seeded(0);
    keys(&mut calc, "9");
    calc.apply(Input::memory(MemoryAction::Add));
    keys(&mut calc, "1/0=");

    let events = calc.apply(Input::memory(MemoryAction::Recall));
    assert!(matches!(events[0], Event::ResetCancelled { .. }));
    assert_eq!(calc.display(), "9");
}

#[test]
fn angle_toggle_during_error_clears() {
    let mut calc = Calculator::seeded(0);
    keys(&mut calc, "1/0=");
    calc.apply(Input::ToggleAngleMode);
    assert_eq!(calc.display(), "0");
    assert_eq!(calc.state().angle_mode(), AngleMode::Degrees);
}

// ============================================================================
// Pure Transitions
// ============================================================================

#[test]
fn same_state_and_input_give_same_result() {
    let mut state = CalculatorState::new();
    let mut rng = StdRng::seed_from_u64(0);
    for input in [Input::digit(2), Input::operator(BinaryOperator::Pow), Input::digit(8)] {
        state = step(state, input, &mut rng).0;
    }

    let (a, events_a) = step(state.clone(), Input::Calculate, &mut StdRng::seed_from_u64(1));
    let (b, events_b) = step(state, Input::Calculate, &mut StdRng::seed_from_u64(2));
    assert_eq!(a, b);
    assert_eq!(events_a, events_b);
    assert_eq!(a.current_operand(), "256");
}

#[test]
fn seeded_random_is_reproducible() {
    let mut a = Calculator::seeded(99);
    let mut b = Calculator::seeded(99);
    a.apply(Input::function(UnaryFunction::Random));
    b.apply(Input::function(UnaryFunction::Random));
    assert_eq!(a.display(), b.display());
}

#[test]
fn state_serialization_roundtrip() {
    let mut calc = Calculator::seeded(0);
    keys(&mut calc, "12+3");
    calc.apply(Input::Constant {
        constant: Constant::Pi,
    });

    let json = serde_json::to_string(calc.state()).unwrap();
    let restored: CalculatorState = serde_json::from_str(&json).unwrap();
    assert_eq!(&restored, calc.state());
    assert!(json.contains("\"pendingOperator\":\"add\""));
}

#[test]
fn recent_log_keeps_newest() {
    let mut calc = Calculator::seeded(0);
    for i in 1..=12 {
        keys(&mut calc, &format!("{}+0=", i));
    }
    let log: Vec<_> = calc.state().recent_log().collect();
    assert_eq!(log.len(), RECENT_LOG_CAPACITY);
    assert_eq!(log[0], "12 + 0 = 12");
    assert_eq!(log[RECENT_LOG_CAPACITY - 1], "3 + 0 = 3");
}

// ============================================================================
// Workspace
// ============================================================================

#[test]
fn workspace_history_capacity() {
    let mut ws = Workspace::new(Calculator::seeded(0), Vault::new());
    for i in 0..(HISTORY_CAPACITY as u64 + 5) {
        ws.press(Input::digit(1), i);
        ws.press(Input::operator(BinaryOperator::Add), i);
        ws.press(Input::digit(1), i);
        ws.press(Input::Calculate, i);
    }
    assert_eq!(ws.history().len(), HISTORY_CAPACITY);
}

#[test]
fn unicode_note_content() {
    let mut ws = Workspace::default();
    let note = ws.add_note("日本語", "Привет 🎉 Ω≈ç√∫", 1).unwrap().clone();
    assert_eq!(note.title, "日本語");

    let snapshot = Snapshot::from_json(&ws.export_state().to_json().unwrap()).unwrap();
    assert_eq!(snapshot.notes[0], note);
}

#[test]
fn whitespace_only_note_rejected() {
    let mut ws = Workspace::default();
    assert!(matches!(
        ws.add_note("\n\t ", "content", 1),
        Err(Error::EmptyField(_))
    ));
}

#[test]
fn locked_vault_rejects_everything() {
    let mut ws = Workspace::default();
    let mut blobs = MemoryBlobStore::new();
    assert_eq!(
        ws.add_vault_file(&mut blobs, "a", "text/plain", b"x", 1)
            .unwrap_err(),
        Error::VaultLocked
    );
    assert_eq!(
        ws.open_vault_file(&blobs, 1).unwrap_err(),
        Error::VaultLocked
    );
    assert_eq!(
        ws.delete_vault_file(&mut blobs, 1).unwrap_err(),
        Error::VaultLocked
    );
}

#[test]
fn empty_file_in_vault() {
    let mut ws = Workspace::new(Calculator::seeded(0), Vault::new());
    let mut blobs = MemoryBlobStore::new();
    ws.vault_mut().unlock("pw").unwrap();
    let id = ws
        .add_vault_file(&mut blobs, "empty.txt", "text/plain", &[], 1)
        .unwrap()
        .id;
    let opened = ws.open_vault_file(&blobs, id).unwrap();
    assert_eq!(opened.payload, "data:text/plain;base64,");
}

#[test]
fn load_rejects_corrupt_state() {
    let mut store = MemoryStore::new();
    store.put_raw(SNAPSHOT_KEY, "[]".into()).unwrap();

    let mut ws = Workspace::default();
    assert!(matches!(ws.load(&store), Err(Error::InvalidSnapshot(_))));
}

#[test]
fn snapshot_with_many_records() {
    let mut snapshot = Snapshot::new();
    snapshot.notes = (1..=500).rev().map(|i| Note::new(i, "t", "c", i)).collect();
    snapshot.ids = IdClock::starting_after(500);

    let mut ws = Workspace::default();
    ws.import_state(snapshot).unwrap();
    assert_eq!(ws.notes().len(), 500);
    assert_eq!(ws.add_note("new", "one", 1).unwrap().id, 501);
}
