//! RTL instrumentation passes for the faultline fault injector.
//!
//! [`instrument`] takes raw RTL bytes and a top-module name and produces the
//! instrumented RTL plus the design table the descriptor and the runtime
//! selector are built from. Three walks over the buffer:
//!
//! 1. **Discovery** — register every `module … endmodule` span, collect the
//!    instance adjacency and compute the hierarchy depth.
//! 2. **Corruption** — for every `assign` / `<=` needle, wrap the right-hand
//!    side in a masking expression guarded by `fiEnable`, the assignment
//!    UUID and the global payload bus; record an FI-signal per site.
//! 3. **Surface** — append `fiEnable` (or the global fault-injection ports,
//!    for the top module) to every port list and splice a `.fiEnable(…)`
//!    binding into every instantiation.
//!
//! Each editing pass accumulates byte-offset-keyed edits and rebuilds the
//! buffer once, so offsets stay valid for the duration of a pass.

#![warn(missing_docs)]

pub mod corrupt;
mod decl;
pub mod edit;
pub mod error;
mod surface;

pub use corrupt::FaultMode;
pub use edit::{Edit, EditSet};
pub use error::InstrumentError;

use faultline_design::{hierarchy_depth, DesignTable, UuidAllocator};
use faultline_scan::{next_module, next_needle};

/// The product of a successful instrumentation run.
#[derive(Clone, Debug)]
pub struct Instrumented {
    /// The rewritten RTL buffer.
    pub rtl: Vec<u8>,
    /// The design table: modules, FI-signals, instance references.
    pub design: DesignTable,
}

/// Instruments `source` for fault injection with `top` as the top module.
///
/// On success the returned buffer replaces the input file and the design
/// table feeds the descriptor emitter and the runtime selector. Any error is
/// fatal: the input is left untouched by the caller and no partial output
/// exists.
///
/// A design in which the corruption pass finds no needle at all is returned
/// byte-identical, with an empty-signal table.
pub fn instrument(
    source: Vec<u8>,
    top: &str,
    mode: FaultMode,
) -> Result<Instrumented, InstrumentError> {
    let mut buf = source;

    // Discovery: module names, instance adjacency, hierarchy depth.
    let mut table = DesignTable::new();
    let mut pos = 0;
    while let Some(span) = next_module(&buf, pos)? {
        table.insert(&span.name)?;
        pos = span.body_end;
    }
    table.set_top(top)?;

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); table.len()];
    let mut pos = 0;
    while let Some(span) = next_module(&buf, pos)? {
        let index = table.index_of_required(&span.name)?;
        children[index] = surface::discover_children(&buf, &span, &table);
        pos = span.body_end;
    }
    let depth = hierarchy_depth(&table, &children)?;

    // Corruption pass.
    let mut uuids = UuidAllocator::new();
    let mut edits = EditSet::new();
    let mut pos = 0;
    while let Some(span) = next_module(&buf, pos)? {
        let index = table.index_of_required(&span.name)?;
        let prefix = if table.top_index() == Some(index) {
            String::new()
        } else {
            format!("{top}.")
        };
        let mut cursor = span.body_start;
        while cursor < span.body_end {
            let Some((kind, at)) = next_needle(&buf, cursor, span.body_end) else {
                break;
            };
            corrupt::corrupt_needle(
                &buf,
                &span,
                kind,
                at,
                mode,
                &prefix,
                table.module_mut(index),
                &mut uuids,
                &mut edits,
            )?;
            cursor = at + 1;
        }
        pos = span.body_end;
    }
    buf = edits.apply(&buf)?;

    // Nothing to corrupt anywhere: leave the design untouched.
    if table.total_fi_signals() == 0 {
        return Ok(Instrumented { rtl: buf, design: table });
    }
    let payload_width = table.max_fi_width();

    // Surface pass: ports and instance bindings.
    let mut edits = EditSet::new();
    let mut pos = 0;
    while let Some(span) = next_module(&buf, pos)? {
        let index = table.index_of_required(&span.name)?;
        if table.top_index() == Some(index) {
            surface::add_global_ports(&buf, &span, payload_width, depth, &mut edits)?;
        } else {
            surface::add_enable_port(&buf, &span, &mut edits)?;
        }
        surface::bind_instances(
            &buf, &span, index, &mut table, &mut uuids, &mut edits, top, depth,
        )?;
        pos = span.body_end;
    }
    buf = edits.apply(&buf)?;

    Ok(Instrumented { rtl: buf, design: table })
}
