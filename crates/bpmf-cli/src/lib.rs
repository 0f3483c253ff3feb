//! Diagnostics for the Bopomofo composition engine, behind `bpmftool`.
//!
//! The main use is replaying a key script through a session and printing
//! every state the host would receive.

pub mod commands;
pub mod keyscript;
pub mod trace_init;

mod error;

pub use error::CliError;
