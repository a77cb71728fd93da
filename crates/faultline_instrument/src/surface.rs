//! Module-surface rewriting: fault-injection ports and instance bindings.

use crate::edit::EditSet;
use crate::error::InstrumentError;
use faultline_design::{DesignTable, InstanceRef, UuidAllocator, TOP_MODULE_UUID};
use faultline_scan::{find, find_outside_comment, inside_comment, ModuleSpan};
use std::fmt::Write;

/// Locates the `);` that closes the module's port list, skipping commented
/// occurrences. Any plain `;` before it means the port list already ended
/// somewhere unexpected.
fn port_list_end(buf: &[u8], span: &ModuleSpan) -> Result<usize, InstrumentError> {
    let io_end = find_outside_comment(buf, span.body_start, span.body_end, b");").ok_or_else(
        || InstrumentError::PortListMissingEnd {
            module: span.name.clone(),
        },
    )?;
    if let Some(semi) = find(buf, span.body_start, io_end, b";") {
        return Err(InstrumentError::StraySemicolonInPorts {
            module: span.name.clone(),
            at: semi,
        });
    }
    Ok(io_end)
}

/// Appends `fiEnable` to a non-top module's port list and declares it.
pub(crate) fn add_enable_port(
    buf: &[u8],
    span: &ModuleSpan,
    edits: &mut EditSet,
) -> Result<(), InstrumentError> {
    let io_end = port_list_end(buf, span)?;
    edits.insert(
        io_end,
        io_end + 2,
        ", fiEnable);\n input fiEnable;\n wire fiEnable;".to_owned(),
    )
}

/// Appends the three global fault-injection ports to the top module and
/// derives its `fiEnable` from the reserved top-instance UUID.
pub(crate) fn add_global_ports(
    buf: &[u8],
    span: &ModuleSpan,
    payload_width: u32,
    depth: u32,
    edits: &mut EditSet,
) -> Result<(), InstrumentError> {
    let io_end = port_list_end(buf, span)?;

    let mut text = String::from(", GlobalFiSignal, GlobalFiNumber, GlobalFiModInstNr);\n");
    text.push_str("input GlobalFiSignal;\n");
    let _ = writeln!(
        text,
        "wire [{}:0] GlobalFiSignal;",
        payload_width.saturating_sub(1)
    );
    text.push_str("input GlobalFiNumber;\n");
    text.push_str("wire [31:0] GlobalFiNumber;\n");
    text.push_str("input GlobalFiModInstNr;\n");
    let _ = writeln!(text, "wire [15:0] GlobalFiModInstNr[{depth}];");
    text.push_str("wire fiEnable;\n");
    text.push_str("assign fiEnable = ");
    for level in 0..depth {
        let _ = write!(text, "({TOP_MODULE_UUID} == GlobalFiModInstNr[{level}])");
        if level + 1 < depth {
            text.push_str(" || ");
        }
    }
    text.push_str(";\n");

    edits.insert(io_end, io_end + 2, text)
}

/// An occurrence of a module name counts as an instantiation when it sits
/// between whitespace and a space and is not commented out.
fn is_instantiation(buf: &[u8], span: &ModuleSpan, at: usize, name_len: usize) -> bool {
    if buf.get(at + name_len) != Some(&b' ') {
        return false;
    }
    if at == 0 || !matches!(buf[at - 1], b' ' | b'\t' | b'\n' | b'\r') {
        return false;
    }
    !inside_comment(buf, at, span.body_start, span.body_end)
}

/// Scans a module span for instantiations of every registered module,
/// returning the child table indices (one entry per occurrence).
///
/// This is the adjacency the hierarchy-depth computation runs on; the
/// binding pass below applies the same predicate so both see the same
/// children.
pub(crate) fn discover_children(buf: &[u8], span: &ModuleSpan, table: &DesignTable) -> Vec<usize> {
    let mut children = Vec::new();
    for (child_idx, module) in table.modules().iter().enumerate() {
        let needle = module.name.as_bytes();
        let mut pos = span.body_start;
        while let Some(at) = find(buf, pos, span.body_end, needle) {
            if is_instantiation(buf, span, at, needle.len()) {
                children.push(child_idx);
                pos = at + needle.len();
            } else {
                pos = at + 1;
            }
        }
    }
    children
}

/// Splices a `.fiEnable(…)` binding into every instantiation inside the
/// current module, minting an instance UUID per occurrence and recording the
/// `(child, uuid)` pair on the current module.
#[allow(clippy::too_many_arguments)]
pub(crate) fn bind_instances(
    buf: &[u8],
    span: &ModuleSpan,
    current: usize,
    table: &mut DesignTable,
    uuids: &mut UuidAllocator,
    edits: &mut EditSet,
    top_name: &str,
    depth: u32,
) -> Result<(), InstrumentError> {
    let is_top = table.top_index() == Some(current);
    let signal = if is_top {
        "GlobalFiModInstNr".to_owned()
    } else {
        format!("{top_name}.GlobalFiModInstNr")
    };
    let names: Vec<String> = table.modules().iter().map(|m| m.name.clone()).collect();

    for (child_idx, child_name) in names.iter().enumerate() {
        let needle = child_name.as_bytes();
        let mut pos = span.body_start;
        while pos < span.body_end {
            let Some(at) = find(buf, pos, span.body_end, needle) else {
                break;
            };
            if !is_instantiation(buf, span, at, needle.len()) {
                pos = at + 1;
                continue;
            }

            let ports_end = find(buf, at, span.body_end, b");").ok_or_else(|| {
                InstrumentError::InstancePortsMissingEnd {
                    child: child_name.clone(),
                }
            })?;
            if find(buf, at, ports_end, b";").is_some() {
                return Err(InstrumentError::StraySemicolonInInstance {
                    child: child_name.clone(),
                });
            }

            // Splice just after the last port, before the closing `)`.
            let mut insert_at = ports_end;
            while insert_at > at && matches!(buf[insert_at - 1], b'\n' | b' ') {
                insert_at -= 1;
            }

            let uuid = uuids.mint();
            let mut binding = String::from(",\n    .fiEnable(fiEnable && (");
            for level in 0..depth {
                let _ = write!(binding, "({uuid} == {signal}[{level}])");
                if level + 1 < depth {
                    binding.push_str(" || ");
                }
            }
            binding.push_str("))");

            edits.insert(insert_at, insert_at, binding)?;
            table.module_mut(current).instances.push(InstanceRef {
                module: child_idx,
                uuid,
            });
            pos = ports_end;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use faultline_scan::next_module;

    fn span_of(src: &[u8]) -> ModuleSpan {
        next_module(src, 0).unwrap().unwrap()
    }

    fn apply(src: &[u8], edits: &EditSet) -> String {
        String::from_utf8(edits.apply(src).unwrap()).unwrap()
    }

    #[test]
    fn enable_port_is_appended() {
        let src = b"module u (\n input clk\n);\nwire q;\nendmodule\n";
        let span = span_of(src);
        let mut edits = EditSet::new();
        add_enable_port(src, &span, &mut edits).unwrap();
        let out = apply(src, &edits);
        assert!(out.contains(", fiEnable);\n input fiEnable;\n wire fiEnable;"));
        assert!(out.starts_with("module u (\n input clk\n, fiEnable);"));
    }

    #[test]
    fn stray_semicolon_in_ports_is_rejected() {
        let src = b"module u (\n input clk;\n input d\n);\nendmodule\n";
        let span = span_of(src);
        let mut edits = EditSet::new();
        assert!(matches!(
            add_enable_port(src, &span, &mut edits),
            Err(InstrumentError::StraySemicolonInPorts { .. })
        ));
    }

    #[test]
    fn missing_port_list_end_is_rejected() {
        let src = b"module u (\n input clk\nendmodule\n";
        let span = span_of(src);
        let mut edits = EditSet::new();
        assert!(matches!(
            add_enable_port(src, &span, &mut edits),
            Err(InstrumentError::PortListMissingEnd { .. })
        ));
    }

    #[test]
    fn global_ports_for_single_level_design() {
        let src = b"module top (\n input clk\n);\nwire q;\nendmodule\n";
        let span = span_of(src);
        let mut edits = EditSet::new();
        add_global_ports(src, &span, 8, 1, &mut edits).unwrap();
        let out = apply(src, &edits);
        assert!(out.contains(", GlobalFiSignal, GlobalFiNumber, GlobalFiModInstNr);\n"));
        assert!(out.contains("wire [7:0] GlobalFiSignal;\n"));
        assert!(out.contains("wire [31:0] GlobalFiNumber;\n"));
        assert!(out.contains("wire [15:0] GlobalFiModInstNr[1];\n"));
        assert!(out.contains("assign fiEnable = (1 == GlobalFiModInstNr[0]);\n"));
    }

    #[test]
    fn global_enable_ors_over_levels() {
        let src = b"module top (\n input clk\n);\nwire q;\nendmodule\n";
        let span = span_of(src);
        let mut edits = EditSet::new();
        add_global_ports(src, &span, 16, 3, &mut edits).unwrap();
        let out = apply(src, &edits);
        assert!(out.contains(
            "assign fiEnable = (1 == GlobalFiModInstNr[0]) || \
(1 == GlobalFiModInstNr[1]) || (1 == GlobalFiModInstNr[2]);\n"
        ));
        assert!(out.contains("wire [15:0] GlobalFiModInstNr[3];\n"));
    }

    #[test]
    fn discovers_instances_with_whitespace_fence() {
        let src = b"module top (\n input clk\n);\n child u0 ( .a(a) );\n\
 childish u1 ( .a(a) );\nendmodule\n";
        let span = span_of(src);
        let mut table = DesignTable::new();
        table.insert("top").unwrap();
        table.insert("child").unwrap();
        let children = discover_children(src, &span, &table);
        // "childish" must not count as an instance of "child"
        assert_eq!(children, vec![1]);
    }

    #[test]
    fn commented_instance_is_ignored() {
        let src = b"module top (\n input clk\n);\n// child u0 ( .a(a) );\n\
 child u1 ( .a(a) );\nendmodule\n";
        let span = span_of(src);
        let mut table = DesignTable::new();
        table.insert("top").unwrap();
        table.insert("child").unwrap();
        let children = discover_children(src, &span, &table);
        assert_eq!(children, vec![1]);
    }

    #[test]
    fn binding_is_spliced_before_closing_paren() {
        let src = b"module top (\n input clk\n);\n child u0 ( .a(a), .b(b) );\nendmodule\n";
        let span = span_of(src);
        let mut table = DesignTable::new();
        table.insert("top").unwrap();
        table.insert("child").unwrap();
        table.set_top("top").unwrap();
        let mut uuids = UuidAllocator::new();
        let mut edits = EditSet::new();
        bind_instances(src, &span, 0, &mut table, &mut uuids, &mut edits, "top", 2).unwrap();
        let out = apply(src, &edits);
        assert!(out.contains(
            " child u0 ( .a(a), .b(b),\n    .fiEnable(fiEnable && \
((2 == GlobalFiModInstNr[0]) || (2 == GlobalFiModInstNr[1]))) );"
        ));
        assert_eq!(
            table.modules()[0].instances,
            vec![InstanceRef { module: 1, uuid: 2 }]
        );
    }

    #[test]
    fn non_top_binding_qualifies_the_selector_bus() {
        let src = b"module mid (\n input clk\n);\n leaf u0 ( .a(a) );\nendmodule\n";
        let span = span_of(src);
        let mut table = DesignTable::new();
        table.insert("top").unwrap();
        table.insert("mid").unwrap();
        table.insert("leaf").unwrap();
        table.set_top("top").unwrap();
        let mut uuids = UuidAllocator::new();
        let mut edits = EditSet::new();
        bind_instances(src, &span, 1, &mut table, &mut uuids, &mut edits, "top", 2).unwrap();
        let out = apply(src, &edits);
        assert!(out.contains("(2 == top.GlobalFiModInstNr[0])"));
        assert_eq!(table.modules()[1].instances.len(), 1);
    }

    #[test]
    fn two_instances_get_distinct_uuids() {
        let src = b"module top (\n input clk\n);\n child u0 ( .a(a) );\n child u1 ( .a(b) );\nendmodule\n";
        let span = span_of(src);
        let mut table = DesignTable::new();
        table.insert("top").unwrap();
        table.insert("child").unwrap();
        table.set_top("top").unwrap();
        let mut uuids = UuidAllocator::new();
        let mut edits = EditSet::new();
        bind_instances(src, &span, 0, &mut table, &mut uuids, &mut edits, "top", 1).unwrap();
        let recorded = &table.modules()[0].instances;
        assert_eq!(recorded.len(), 2);
        assert_ne!(recorded[0].uuid, recorded[1].uuid);
    }

    #[test]
    fn instance_with_stray_semicolon_is_rejected() {
        let src = b"module top (\n input clk\n);\n child u0 ( .a(a;) );\nendmodule\n";
        let span = span_of(src);
        let mut table = DesignTable::new();
        table.insert("top").unwrap();
        table.insert("child").unwrap();
        table.set_top("top").unwrap();
        let mut uuids = UuidAllocator::new();
        let mut edits = EditSet::new();
        assert!(matches!(
            bind_instances(src, &span, 0, &mut table, &mut uuids, &mut edits, "top", 1),
            Err(InstrumentError::StraySemicolonInInstance { .. })
        ));
    }
}
