//! Replays a key script through a session and prints what the host would
//! see for every key.

use std::io::Write;
use std::path::Path;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::info;

use bpmf_core::symbols::SymbolNode;
use bpmf_core::user_override::UserOverrideModel;
use bpmf_session::{HeadlessClient, InputSession, InputState};

use super::{load_lexicon, read_file};
use crate::keyscript;
use crate::CliError;

#[derive(Debug, Default)]
pub struct TypeOptions<'a> {
    pub lexicon: Option<&'a Path>,
    pub symbols: Option<&'a Path>,
    /// Override history read before typing and written back after.
    pub history: Option<&'a Path>,
    pub json: bool,
}

#[derive(Serialize)]
struct KeyRecord<'a> {
    key: &'a str,
    consumed: bool,
    error: bool,
    states: &'a [InputState],
}

fn page_text<T: AsRef<str>>(items: &[T], selected: Option<usize>) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            if Some(i) == selected {
                format!("[{}]", item.as_ref())
            } else {
                item.as_ref().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One-line rendering of a state.
pub fn describe(state: &InputState) -> String {
    match state {
        InputState::Deactivated
        | InputState::Empty
        | InputState::EmptyIgnoringPreviousState => state.name().to_string(),
        InputState::Committing { text } => format!("Committing {text:?}"),
        InputState::Inputting(s) => {
            let mut line = format!("Inputting {:?} cursor={}", s.buffer, s.cursor);
            if !s.popped_text.is_empty() {
                line.push_str(&format!(" popped={:?}", s.popped_text));
            }
            if !s.tooltip.is_empty() {
                line.push_str(&format!(" tooltip={:?}", s.tooltip));
            }
            line
        }
        InputState::Marking(s) => format!(
            "Marking {:?} range={}..{} exists={} tooltip={:?}",
            s.buffer, s.marked_range.start, s.marked_range.end, s.target_exists, s.tooltip
        ),
        InputState::ChoosingCandidate(s) => {
            let w = &s.window;
            let page_start = w.page_index() * w.page_size;
            let values: Vec<&str> = w.current_page().iter().map(|c| c.value.as_str()).collect();
            format!(
                "ChoosingCandidate {:?} page {}/{}: {}",
                s.buffer,
                w.page_index() + 1,
                w.page_count(),
                page_text(&values, w.selected.checked_sub(page_start)),
            )
        }
        InputState::AssociatedPhrases(s) => {
            let w = &s.window;
            let page_start = w.page_index() * w.page_size;
            format!(
                "AssociatedPhrases {:?}: {}",
                s.key,
                page_text(w.current_page(), w.selected.checked_sub(page_start)),
            )
        }
        InputState::SymbolTable(s) => {
            let w = &s.window;
            let page_start = w.page_index() * w.page_size;
            format!(
                "SymbolTable {:?} page {}/{}: {}",
                s.title,
                w.page_index() + 1,
                w.page_count(),
                page_text(w.current_page(), w.selected.checked_sub(page_start)),
            )
        }
    }
}

fn open_history(path: Option<&Path>) -> Result<UserOverrideModel, CliError> {
    match path {
        Some(path) => UserOverrideModel::open(path).map_err(|source| CliError::History {
            path: path.to_path_buf(),
            source,
        }),
        None => Ok(UserOverrideModel::from_settings()),
    }
}

pub fn type_script(
    script: &str,
    opts: &TypeOptions<'_>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let keys = keyscript::parse(script)?;
    let lexicon = Arc::new(load_lexicon(opts.lexicon)?);
    let uom = Arc::new(RwLock::new(open_history(opts.history)?));

    let mut session = InputSession::new(lexicon, Some(Arc::clone(&uom)));
    if let Some(path) = opts.symbols {
        session.set_symbol_root(SymbolNode::parse_user_table(&read_file(path)?)?);
    }
    let mut client = HeadlessClient::new(session);

    for key in &keys {
        let resp = client.press(&key.event);
        if opts.json {
            let record = KeyRecord {
                key: &key.label,
                consumed: resp.consumed,
                error: resp.error,
                states: &resp.states,
            };
            writeln!(out, "{}", serde_json::to_string(&record)?)?;
            continue;
        }

        let mut flags = String::new();
        if !resp.consumed {
            flags.push_str(" (passed through)");
        }
        if resp.error {
            flags.push_str(" (beep)");
        }
        writeln!(out, "{}{flags}", key.label)?;
        for state in &resp.states {
            writeln!(out, "  {}", describe(state))?;
        }
    }

    if !opts.json {
        writeln!(out, "---")?;
        writeln!(out, "committed: {}", client.committed())?;
        writeln!(out, "marked: {}", client.marked_text())?;
    }

    if let Some(path) = opts.history {
        let model = uom.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        model.save(path).map_err(|source| CliError::History {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), entries = model.len(), "override history saved");
    }
    Ok(())
}
