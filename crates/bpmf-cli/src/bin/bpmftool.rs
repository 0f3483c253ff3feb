use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use bpmf_cli::commands::session_ops::{self, TypeOptions};
use bpmf_cli::commands::{config_ops, history_ops, lattice_ops, read_settings};
use bpmf_cli::trace_init::init_tracing;
use bpmf_cli::CliError;

#[derive(Parser)]
#[command(name = "bpmftool", about = "Bopomofo composition diagnostics")]
struct Cli {
    /// Print debug events to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Write JSON trace lines to bpmftool-trace.jsonl in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    /// Settings TOML to use instead of the built-in defaults
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a key script and print the states emitted for every key
    Type {
        /// Keys to type, e.g. `su3cl3{S-left}{enter}`
        script: String,
        /// Lexicon text file (defaults to the bundled sample)
        #[arg(long)]
        lexicon: Option<PathBuf>,
        /// User symbol table (`Category=symbols` per line)
        #[arg(long)]
        symbols: Option<PathBuf>,
        /// Override history file, loaded before and saved after typing
        #[arg(long)]
        history: Option<PathBuf>,
        /// Output one JSON record per key
        #[arg(long)]
        json: bool,
    },
    /// Walk a reading sequence through the lattice
    Walk {
        /// Readings, e.g. `ㄋㄧˇ ㄏㄠˇ`
        #[arg(required = true)]
        readings: Vec<String>,
        /// Lexicon text file (defaults to the bundled sample)
        #[arg(long)]
        lexicon: Option<PathBuf>,
        /// Print the lattice as GraphViz instead of the best path
        #[arg(long)]
        dot: bool,
    },
    /// Print the settings TOML in effect
    SettingsExport,
    /// Check a settings TOML file
    SettingsValidate {
        /// Settings file
        file: PathBuf,
    },
    /// Inspect or reset an override history file
    History {
        /// History file
        file: PathBuf,
        /// Remove every entry
        #[arg(long)]
        clear: bool,
    },
}

fn run(cli: Cli, out: &mut impl Write) -> Result<(), CliError> {
    let custom = cli.settings.as_deref().map(read_settings).transpose()?;

    match cli.command {
        Command::Type {
            script,
            lexicon,
            symbols,
            history,
            json,
        } => {
            let opts = TypeOptions {
                lexicon: lexicon.as_deref(),
                symbols: symbols.as_deref(),
                history: history.as_deref(),
                json,
            };
            session_ops::type_script(&script, &opts, out)
        }
        Command::Walk {
            readings,
            lexicon,
            dot,
        } => lattice_ops::walk(lexicon.as_deref(), &readings, dot, out),
        Command::SettingsExport => config_ops::settings_export(custom.as_deref(), out),
        Command::SettingsValidate { file } => config_ops::settings_validate(&file, out),
        Command::History { file, clear } => {
            if clear {
                history_ops::history_clear(&file, out)
            } else {
                history_ops::history_info(&file, out)
            }
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let guard = init_tracing(cli.verbose, cli.log_dir.as_deref());

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let result = run(cli, &mut out).and_then(|()| out.flush().map_err(CliError::from));
    drop(guard);
    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
