pub mod config_ops;
pub mod history_ops;
pub mod lattice_ops;
pub mod session_ops;

use std::fs;
use std::path::Path;

use bpmf_core::lm::Lexicon;
use bpmf_core::settings::init_custom;

use crate::CliError;

/// Lexicon used when no `--lexicon` is given.
pub const SAMPLE_LEXICON: &str = include_str!("../../data/sample.lex");

pub(crate) fn read_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Install a settings file as the process-wide settings and return its
/// text. Must run before anything reads the settings.
pub fn read_settings(path: &Path) -> Result<String, CliError> {
    let text = read_file(path)?;
    init_custom(text.clone())?;
    tracing::info!(path = %path.display(), "custom settings installed");
    Ok(text)
}

pub fn load_lexicon(path: Option<&Path>) -> Result<Lexicon, CliError> {
    let lexicon = match path {
        Some(path) => Lexicon::parse(&read_file(path)?)?,
        None => Lexicon::parse(SAMPLE_LEXICON)?,
    };
    tracing::debug!(keys = lexicon.key_count(), "lexicon loaded");
    Ok(lexicon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bpmf_core::lm::LanguageModel;

    #[test]
    fn sample_lexicon_parses() {
        let lexicon = load_lexicon(None).unwrap();
        assert!(lexicon.key_count() > 20);
        assert!(lexicon.has_unigrams_for("ㄋㄧˇ-ㄏㄠˇ"));
        assert!(lexicon.has_unigrams_for("_punctuation_list"));
        assert!(!lexicon.associated_phrases_for("中").is_empty());
    }

    #[test]
    fn missing_lexicon_file() {
        let err = load_lexicon(Some(Path::new("/nonexistent/bpmf.lex"))).unwrap_err();
        assert!(matches!(err, CliError::Read { .. }));
    }
}
