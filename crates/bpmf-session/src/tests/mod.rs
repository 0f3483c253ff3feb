mod marking;

use std::sync::Arc;

use bpmf_core::lm::Lexicon;

use super::types::key;
use super::{InputSession, InputState, KeyEvent, KeyResponse, SessionConfig};

// Dachen keys for the readings below:
//   你 su3  好 cl3  嗎 a87  馬 a83  是 g4  中 5j/␣  文 jp6  的 2k7  他 w8␣
//   媽 a8␣
const TEST_LEXICON: &str = "\
ㄋㄧˇ 你 -5.0
ㄋㄧˇ 妳 -6.0
ㄏㄠˇ 好 -5.0
ㄏㄠˇ 郝 -7.0
ㄋㄧˇ-ㄏㄠˇ 你好 -4.0
ㄇㄚ˙ 嗎 -4.5
ㄇㄚˇ 馬 -5.0
ㄇㄚ 媽 -5.0
ㄇㄚ-ㄇㄚ 媽媽 -4.0
ㄇㄚ-ㄇㄚ 麻麻 -6.0
ㄕˋ 是 -3.0
ㄕˋ 市 -4.0
ㄕˋ 事 -4.5
ㄓㄨㄥ 中 -4.0
ㄨㄣˊ 文 -4.5
ㄓㄨㄥ-ㄨㄣˊ 中文 -5.0
ㄉㄜ˙ 的 -2.0
ㄊㄚ 他 -3.5
ㄊㄚ 她 -4.0
_punctuation_Standard_< ， -1.0
_punctuation_Standard_> 。 -1.0
_half_punctuation_Standard_< , -1.0
_punctuation_list ， -12.0
_punctuation_list 。 -12.0
_punctuation_list 、 -12.0
_letter_A Ａ -1.0
\\s \\s -1.0
@assoc 中 文 國
@assoc 文 字 化
";

pub(super) fn make_test_lexicon() -> Arc<Lexicon> {
    Arc::new(Lexicon::parse(TEST_LEXICON).unwrap())
}

pub(super) fn make_session() -> InputSession {
    InputSession::new(make_test_lexicon(), None)
}

/// Session with `tweak` applied on top of the default configuration.
pub(super) fn make_session_with(tweak: impl FnOnce(&mut SessionConfig)) -> InputSession {
    let mut config = SessionConfig::default();
    tweak(&mut config);
    InputSession::with_config(make_test_lexicon(), None, config)
}

/// Key event for one character of a key script; space is the Space key.
pub(super) fn key_for(c: char) -> KeyEvent {
    if c == ' ' {
        KeyEvent::special(key::SPACE)
    } else {
        KeyEvent::text(&c.to_string())
    }
}

pub(super) fn type_string(session: &mut InputSession, s: &str) -> Vec<KeyResponse> {
    s.chars().map(|c| session.handle_key(&key_for(c))).collect()
}

pub(super) fn press(session: &mut InputSession, code: u16) -> KeyResponse {
    session.handle_key(&KeyEvent::special(code))
}

pub(super) fn names(resp: &KeyResponse) -> Vec<&'static str> {
    resp.states.iter().map(InputState::name).collect()
}

pub(super) fn inputting(state: &InputState) -> &super::Inputting {
    match state {
        InputState::Inputting(s) => s,
        other => panic!("expected Inputting, got {other:?}"),
    }
}
