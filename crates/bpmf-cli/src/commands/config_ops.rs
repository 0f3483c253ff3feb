use std::io::Write;
use std::path::Path;

use bpmf_core::settings::{default_toml, parse_settings_toml};

use super::read_file;
use crate::CliError;

/// Print the settings in effect: `custom` when one was installed, the
/// built-in defaults otherwise.
pub fn settings_export(custom: Option<&str>, out: &mut impl Write) -> Result<(), CliError> {
    write!(out, "{}", custom.unwrap_or(default_toml()))?;
    Ok(())
}

pub fn settings_validate(file: &Path, out: &mut impl Write) -> Result<(), CliError> {
    let s = parse_settings_toml(&read_file(file)?)?;
    writeln!(
        out,
        "OK: composition.layout={}, composition.composing_buffer_size={}, candidates.keys={}, user_override.enabled={}",
        s.composition.layout.parser_name(),
        s.composition.composing_buffer_size,
        s.candidates.keys,
        s.user_override.enabled,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exported_defaults_validate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        let mut exported = Vec::new();
        settings_export(None, &mut exported).unwrap();
        std::fs::write(&path, &exported).unwrap();

        let mut out = Vec::new();
        settings_validate(&path, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("OK: composition.layout=Standard"), "{out}");
    }

    #[test]
    fn invalid_settings_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[composition]\nlayout = 3\n").unwrap();

        let err = settings_validate(&path, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CliError::Settings(_)));
    }
}
