//! The instrumentation pipeline behind the `faultline` binary.

use std::fs;
use std::path::Path;

use faultline_design::{descriptor_file_name, descriptor_source};
use faultline_instrument::{instrument, FaultMode};

use crate::Cli;

/// Runs the pipeline: read the RTL, instrument it in memory, then write the
/// descriptor and the rewritten RTL.
///
/// Nothing is written until the whole instrumentation has succeeded, so a
/// failing run leaves the input file untouched. Returns the process exit
/// code.
pub fn run(args: &Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let source = fs::read(&args.rtl_file)?;
    let out = instrument(source, &args.top_module, FaultMode::Flip)?;

    let descriptor = descriptor_source(&out.design)?;
    let descriptor_path = sibling_path(&args.rtl_file, &descriptor_file_name(&args.top_module));
    fs::write(&descriptor_path, descriptor)?;
    fs::write(&args.rtl_file, &out.rtl)?;

    println!(
        "Instrumented {} assignments across {} modules ({} corruption bits)",
        out.design.total_fi_signals(),
        out.design.len(),
        out.design.total_fi_bits(),
    );
    Ok(0)
}

/// Places `file_name` next to `rtl_file`.
fn sibling_path(rtl_file: &Path, file_name: &str) -> std::path::PathBuf {
    match rtl_file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(file_name),
        _ => std::path::PathBuf::from(file_name),
    }
}
