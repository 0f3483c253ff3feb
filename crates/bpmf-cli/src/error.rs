use std::io;
use std::path::PathBuf;

use bpmf_core::lm::LexiconError;
use bpmf_core::settings::SettingsError;
use bpmf_core::symbols::SymbolTableError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("override history {path}: {source}")]
    History {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("lexicon {0}")]
    Lexicon(#[from] LexiconError),
    #[error("settings: {0}")]
    Settings(#[from] SettingsError),
    #[error("symbol table {0}")]
    SymbolTable(#[from] SymbolTableError),
    #[error("key script at offset {pos}: {reason}")]
    KeyScript { pos: usize, reason: String },
    #[error("reading `{0}` is not in the lexicon")]
    UnknownReading(String),
    #[error("output: {0}")]
    Output(#[from] io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}
