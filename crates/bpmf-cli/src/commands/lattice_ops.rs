use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use bpmf_core::compositor::Compositor;
use bpmf_core::settings::settings;

use super::load_lexicon;
use crate::CliError;

/// Insert `readings` into a fresh lattice and print the best path, or the
/// whole lattice as GraphViz with `dot`.
pub fn walk(
    lexicon: Option<&Path>,
    readings: &[String],
    dot: bool,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let lm = Arc::new(load_lexicon(lexicon)?);
    let mut compositor = Compositor::new(lm, settings().composition.max_span_length);
    for reading in readings {
        if !compositor.insert_reading_at_cursor(reading) {
            return Err(CliError::UnknownReading(reading.clone()));
        }
    }

    if dot {
        write!(out, "{}", compositor.dump_dot())?;
        return Ok(());
    }

    let walked = compositor.walk();
    for node in walked {
        writeln!(
            out,
            "{}..{}\t{}\t{}\t{:.3}",
            node.start,
            node.end(),
            node.key,
            node.value,
            node.score
        )?;
    }
    let text: String = walked.iter().map(|n| n.value.as_str()).collect();
    writeln!(out, "---")?;
    writeln!(out, "{text}")?;
    Ok(())
}
