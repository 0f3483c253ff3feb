use bpmf_core::lm::LanguageModel;

use super::*;
use crate::Marking;

fn shift_left() -> KeyEvent {
    KeyEvent::special(key::LEFT).with_shift()
}

fn shift_right() -> KeyEvent {
    KeyEvent::special(key::RIGHT).with_shift()
}

fn marking(state: &InputState) -> &Marking {
    match state {
        InputState::Marking(s) => s,
        other => panic!("expected Marking, got {other:?}"),
    }
}

// --- Entering and moving the marker ---

#[test]
fn test_shift_left_enters_marking() {
    let mut session = make_session();
    type_string(&mut session, "su3cl3");

    let resp = session.handle_key(&shift_left());
    assert!(resp.consumed);
    assert!(!resp.error);
    let m = marking(session.state());
    assert_eq!(m.marked_range, 1..2);
    assert_eq!(m.cursor, 2);
    assert_eq!(m.marker, 1);
    assert_eq!(m.tooltip, "\"好\" length must ≥ 2 for a user phrase.\n//  ㄏㄠˇ");
    // The lattice cursor does not follow the marker.
    assert_eq!(session.compositor().cursor(), 2);
}

#[test]
fn test_marking_existing_phrase() {
    let mut session = make_session();
    type_string(&mut session, "su3cl3");
    session.handle_key(&shift_left());
    session.handle_key(&shift_left());

    let m = marking(session.state());
    assert_eq!(m.marked_range, 0..2);
    assert!(m.target_exists);
    assert!(m.tooltip.starts_with("\"你好\" already exists"));
}

#[test]
fn test_marker_stops_at_edges() {
    let mut session = make_session();
    type_string(&mut session, "su3cl3");
    session.handle_key(&shift_left());
    session.handle_key(&shift_left());

    let resp = session.handle_key(&shift_left());
    assert!(resp.consumed);
    assert!(resp.error);
    assert_eq!(marking(session.state()).marked_range, 0..2);

    let mut session = make_session();
    type_string(&mut session, "su3cl3");
    let resp = session.handle_key(&shift_right());
    assert!(resp.error);
    assert_eq!(inputting(session.state()).cursor, 2);
}

#[test]
fn test_collapsed_range_returns_to_inputting() {
    let mut session = make_session();
    type_string(&mut session, "su3cl3");
    session.handle_key(&shift_left());

    let resp = session.handle_key(&shift_right());
    assert_eq!(names(&resp), ["Inputting"]);
    let state = inputting(session.state());
    assert_eq!(state.buffer, "你好");
    assert_eq!(state.cursor, 2);
}

#[test]
fn test_escape_leaves_marking() {
    let mut session = make_session();
    type_string(&mut session, "su3cl3");
    session.handle_key(&shift_left());

    let resp = press(&mut session, key::ESCAPE);
    assert_eq!(names(&resp), ["Inputting"]);
    assert_eq!(session.readings(), ["ㄋㄧˇ", "ㄏㄠˇ"]);
}

#[test]
fn test_other_key_falls_back_to_inputting() {
    let mut session = make_session();
    type_string(&mut session, "su3cl3");
    session.handle_key(&shift_left());

    let resp = session.handle_key(&KeyEvent::text("g"));
    assert_eq!(names(&resp), ["Inputting", "Inputting"]);
    assert_eq!(inputting(session.state()).buffer, "你好ㄕ");
}

// --- Writing user phrases ---

#[test]
fn test_enter_adds_user_phrase() {
    let lexicon = make_test_lexicon();
    let mut session = InputSession::new(lexicon.clone(), None);
    type_string(&mut session, "cl3a87");
    assert_eq!(inputting(session.state()).buffer, "好嗎");
    session.handle_key(&shift_left());
    session.handle_key(&shift_left());
    assert!(!marking(session.state()).target_exists);

    let resp = press(&mut session, key::ENTER);
    assert!(resp.consumed);
    assert!(!resp.error);
    assert_eq!(
        inputting(session.state()).tooltip,
        "Succeeded in adding / boosting a user phrase."
    );
    assert!(lexicon.user_phrase_exists("ㄏㄠˇ-ㄇㄚ˙", "好嗎"));

    press(&mut session, key::ENTER);
    type_string(&mut session, "cl3a87");
    assert_eq!(inputting(session.state()).buffer, "好嗎");
    assert_eq!(session.compositor().walked().len(), 1);
}

#[test]
fn test_enter_on_short_range_writes_nothing() {
    let lexicon = make_test_lexicon();
    let mut session = InputSession::new(lexicon.clone(), None);
    type_string(&mut session, "su3cl3");
    session.handle_key(&shift_left());

    let resp = press(&mut session, key::ENTER);
    assert!(resp.consumed);
    assert!(!resp.error);
    assert_eq!(names(&resp), ["Marking"]);
    assert_eq!(lexicon.unigrams_for("ㄏㄠˇ")[0].value, "好");
}

#[test]
fn test_backspace_excludes_existing_phrase() {
    let lexicon = make_test_lexicon();
    let mut session = InputSession::new(lexicon.clone(), None);
    type_string(&mut session, "su3cl3");
    session.handle_key(&shift_left());
    session.handle_key(&shift_left());

    let resp = press(&mut session, key::BACKSPACE);
    assert!(resp.consumed);
    assert_eq!(
        inputting(session.state()).tooltip,
        "Succeeded in filtering a user phrase."
    );
    assert!(!lexicon.has_unigrams_for("ㄋㄧˇ-ㄏㄠˇ"));

    press(&mut session, key::ENTER);
    type_string(&mut session, "su3cl3");
    assert_eq!(session.compositor().walked().len(), 2);
}

#[test]
fn test_backspace_on_unfilterable_range_deletes() {
    let mut session = make_session();
    type_string(&mut session, "su3cl3");
    session.handle_key(&shift_left());

    let resp = press(&mut session, key::BACKSPACE);
    assert_eq!(names(&resp), ["Inputting", "Inputting"]);
    assert_eq!(inputting(session.state()).buffer, "你");
}

#[test]
fn test_placeholder_reading_in_tooltip() {
    let mut session = make_session();
    type_string(&mut session, "g4");
    session.handle_key(&KeyEvent::text("<"));
    session.handle_key(&shift_left());
    session.handle_key(&shift_left());

    let m = marking(session.state());
    assert_eq!(m.marked_text(), "是，");
    assert!(m.tooltip.ends_with("//  ㄕˋ ??"));
}
