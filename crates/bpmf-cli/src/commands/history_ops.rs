use std::io::Write;
use std::path::Path;

use bpmf_core::user_override::UserOverrideModel;

use crate::CliError;

fn open(path: &Path) -> Result<UserOverrideModel, CliError> {
    UserOverrideModel::open(path).map_err(|source| CliError::History {
        path: path.to_path_buf(),
        source,
    })
}

pub fn history_info(path: &Path, out: &mut impl Write) -> Result<(), CliError> {
    let model = open(path)?;
    writeln!(out, "{}", path.display())?;
    writeln!(out, "  entries:  {}", model.len())?;
    writeln!(out, "  capacity: {}", model.capacity())?;
    Ok(())
}

pub fn history_clear(path: &Path, out: &mut impl Write) -> Result<(), CliError> {
    let mut model = open(path)?;
    let removed = model.len();
    model.clear();
    model.save(path).map_err(|source| CliError::History {
        path: path.to_path_buf(),
        source,
    })?;
    writeln!(out, "Cleared {removed} entries")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::session_ops::{type_script, TypeOptions};

    #[test]
    fn info_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.bpuo");
        let opts = TypeOptions {
            history: Some(&path),
            ..Default::default()
        };
        type_script("g4 2{enter}", &opts, &mut Vec::new()).unwrap();

        let mut out = Vec::new();
        history_info(&path, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("entries:  1"));

        let mut out = Vec::new();
        history_clear(&path, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Cleared 1 entries\n");
        assert!(UserOverrideModel::open(&path).unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.bpuo");
        std::fs::write(&path, b"not a history").unwrap();

        let err = history_info(&path, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CliError::History { .. }));
    }
}
