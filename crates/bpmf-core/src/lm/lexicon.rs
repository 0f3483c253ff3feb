use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use super::{LanguageModel, Unigram, UserPhrase, USER_PHRASE_SCORE};

#[derive(Debug, thiserror::Error)]
pub enum LexiconError {
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// Phrases written through marking mode. Held in memory only.
#[derive(Debug, Default)]
struct UserPhrases {
    added: HashMap<String, Vec<String>>,
    excluded: HashSet<(String, String)>,
}

/// In-memory language model loaded from plain text.
///
/// Text format, one record per line:
///
/// ```text
/// # comment
/// ㄋㄧˇ 你 -5.2
/// _punctuation_, ， -3.0
/// @assoc 你 們 好
/// ```
///
/// A field spelled `\s` stands for a single space.
#[derive(Debug, Default)]
pub struct Lexicon {
    entries: HashMap<String, Vec<Unigram>>,
    associated: HashMap<String, Vec<String>>,
    user: RwLock<UserPhrases>,
}

fn unescape(field: &str) -> String {
    if field == "\\s" {
        " ".to_string()
    } else {
        field.to_string()
    }
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Result<Self, LexiconError> {
        let mut lexicon = Self::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields[0] == "@assoc" {
                if fields.len() < 3 {
                    return Err(LexiconError::Parse {
                        line: idx + 1,
                        reason: "@assoc needs a key and at least one phrase".to_string(),
                    });
                }
                lexicon.add_associated(
                    &unescape(fields[1]),
                    fields[2..].iter().map(|f| unescape(f)),
                );
                continue;
            }
            let [key, value, score] = fields.as_slice() else {
                return Err(LexiconError::Parse {
                    line: idx + 1,
                    reason: format!("expected `reading value score`, got {} fields", fields.len()),
                });
            };
            let score: f64 = score.parse().map_err(|_| LexiconError::Parse {
                line: idx + 1,
                reason: format!("score `{score}` is not a number"),
            })?;
            lexicon.insert(&unescape(key), &unescape(value), score);
        }
        debug!(keys = lexicon.entries.len(), "lexicon parsed");
        Ok(lexicon)
    }

    pub fn insert(&mut self, key: &str, value: &str, score: f64) {
        let unigrams = self.entries.entry(key.to_string()).or_default();
        match unigrams.iter_mut().find(|u| u.value == value) {
            Some(u) => u.score = u.score.max(score),
            None => unigrams.push(Unigram::new(value, score)),
        }
        unigrams.sort_by(|a, b| b.score.total_cmp(&a.score));
    }

    pub fn add_associated<I, S>(&mut self, key: &str, phrases: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = self.associated.entry(key.to_string()).or_default();
        for p in phrases {
            let p = p.into();
            if !list.contains(&p) {
                list.push(p);
            }
        }
    }

    pub fn key_count(&self) -> usize {
        self.entries.len()
    }
}

impl LanguageModel for Lexicon {
    fn unigrams_for(&self, key: &str) -> Vec<Unigram> {
        let user = self.user.read().unwrap_or_else(PoisonError::into_inner);
        let mut out: Vec<Unigram> = user
            .added
            .get(key)
            .into_iter()
            .flatten()
            .map(|v| Unigram::new(v.as_str(), USER_PHRASE_SCORE))
            .collect();
        for u in self.entries.get(key).into_iter().flatten() {
            if out.iter().any(|o| o.value == u.value) {
                continue;
            }
            out.push(u.clone());
        }
        out.retain(|u| !user.excluded.contains(&(key.to_string(), u.value.clone())));
        out
    }

    fn associated_phrases_for(&self, key: &str) -> Vec<String> {
        self.associated.get(key).cloned().unwrap_or_default()
    }

    fn user_phrase_exists(&self, key: &str, value: &str) -> bool {
        self.unigrams_for(key).iter().any(|u| u.value == value)
    }

    fn write_user_phrase(&self, phrase: &UserPhrase, exclude: bool) -> bool {
        if phrase.key.is_empty() || phrase.value.is_empty() {
            return false;
        }
        let mut guard = self.user.write().unwrap_or_else(PoisonError::into_inner);
        let user = &mut *guard;
        let pair = (phrase.key.clone(), phrase.value.clone());
        let added = user.added.entry(phrase.key.clone()).or_default();
        added.retain(|v| *v != phrase.value);
        if exclude {
            user.excluded.insert(pair);
            debug!(%phrase, "user phrase excluded");
        } else {
            // Most recent write comes first.
            added.insert(0, phrase.value.clone());
            user.excluded.remove(&pair);
            debug!(%phrase, "user phrase written");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# sample
ㄋㄧˇ 你 -5.0
ㄋㄧˇ 妳 -6.0
ㄋㄧˇ 擬 -7.5
_punctuation_, ， -1.0
\\s \\s -2.0
@assoc 你 們 好
";

    #[test]
    fn parse_and_sort() {
        let lex = Lexicon::parse(SAMPLE).unwrap();
        let values: Vec<_> = lex
            .unigrams_for("ㄋㄧˇ")
            .into_iter()
            .map(|u| u.value)
            .collect();
        assert_eq!(values, vec!["你", "妳", "擬"]);
        assert!(lex.has_unigrams_for("_punctuation_,"));
        assert!(lex.has_unigrams_for(" "));
        assert!(!lex.has_unigrams_for("ㄏㄠˇ"));
        assert_eq!(lex.associated_phrases_for("你"), vec!["們", "好"]);
    }

    #[test]
    fn parse_error_reports_line() {
        let err = Lexicon::parse("ㄋㄧˇ 你 -5.0\nbroken line\n").err().unwrap();
        match err {
            LexiconError::Parse { line, .. } => assert_eq!(line, 2),
        }
        assert!(Lexicon::parse("ㄋㄧˇ 你 abc").is_err());
        assert!(Lexicon::parse("@assoc 你").is_err());
    }

    #[test]
    fn user_phrase_added_first() {
        let lex = Lexicon::parse(SAMPLE).unwrap();
        let phrase = UserPhrase {
            key: "ㄋㄧˇ".into(),
            value: "擬".into(),
        };
        assert!(lex.write_user_phrase(&phrase, false));
        let first = &lex.unigrams_for("ㄋㄧˇ")[0];
        assert_eq!(first.value, "擬");
        assert_eq!(first.score, USER_PHRASE_SCORE);
        assert_eq!(lex.unigrams_for("ㄋㄧˇ").len(), 3);
    }

    #[test]
    fn user_phrase_new_key() {
        let lex = Lexicon::new();
        let phrase = UserPhrase {
            key: "ㄋㄧˇ-ㄏㄠˇ".into(),
            value: "你好".into(),
        };
        assert!(!lex.user_phrase_exists(&phrase.key, &phrase.value));
        assert!(lex.write_user_phrase(&phrase, false));
        assert!(lex.user_phrase_exists(&phrase.key, &phrase.value));
    }

    #[test]
    fn exclusion_hides_system_entry() {
        let lex = Lexicon::parse(SAMPLE).unwrap();
        let phrase = UserPhrase {
            key: "ㄋㄧˇ".into(),
            value: "你".into(),
        };
        assert!(lex.write_user_phrase(&phrase, true));
        assert!(!lex.user_phrase_exists("ㄋㄧˇ", "你"));
        assert_eq!(lex.unigrams_for("ㄋㄧˇ")[0].value, "妳");
        // writing again lifts the exclusion
        assert!(lex.write_user_phrase(&phrase, false));
        assert!(lex.user_phrase_exists("ㄋㄧˇ", "你"));
    }

    #[test]
    fn empty_phrase_refused() {
        let lex = Lexicon::new();
        let phrase = UserPhrase {
            key: String::new(),
            value: "你".into(),
        };
        assert!(!lex.write_user_phrase(&phrase, false));
    }
}
