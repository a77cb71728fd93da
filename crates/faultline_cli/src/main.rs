//! `faultline` — instrument an RTL file for simulation-time fault injection.
//!
//! Takes an RTL source file and the design's top module name, rewrites the
//! file in place so every `assign` / `<=` right-hand side can be corrupted
//! through the injected global fault-injection nets, and emits the hierarchy
//! descriptor (`<top>FiSignals.cpp`) the simulation runtime links against.

#![warn(missing_docs)]

mod run;

use std::path::PathBuf;
use std::process;

use clap::Parser;

/// Instrument an RTL file for simulation-time fault injection.
#[derive(Parser, Debug)]
#[command(name = "faultline", version, about)]
pub struct Cli {
    /// The RTL source file, rewritten in place on success.
    pub rtl_file: PathBuf,

    /// Name of the design's top module.
    pub top_module: String,
}

fn main() {
    let cli = Cli::parse();
    match run::run(&cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
