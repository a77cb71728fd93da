//! Corruption planning: wrapping assignment right-hand sides in
//! fault-injection masking expressions.

use crate::decl::{is_space, skip_spaces, SignalResolver};
use crate::edit::EditSet;
use crate::error::InstrumentError;
use faultline_design::{FiSignal, ModuleRecord, SignalKind, UuidAllocator};
use faultline_scan::{find, inside_comment, ModuleSpan, NeedleKind};

/// How the corruption payload is combined with the original value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaultMode {
    /// OR the payload in: selected bits stick at 1.
    StuckHigh,
    /// AND the negated payload in: selected bits stick at 0.
    StuckLow,
    /// XOR the payload in: selected bits invert.
    Flip,
}

impl FaultMode {
    /// The operator text spliced between the original right-hand side and
    /// the payload expression.
    pub(crate) fn operator(self) -> &'static str {
        match self {
            FaultMode::StuckHigh => " | ",
            FaultMode::StuckLow => " & ~",
            FaultMode::Flip => " ^ ",
        }
    }
}

/// Trims spaces and tabs from both ends of an assignee part.
fn trim_spaces(mut part: &[u8]) -> &[u8] {
    while let Some((&first, rest)) = part.split_first() {
        if !is_space(first) {
            break;
        }
        part = rest;
    }
    while let Some((&last, rest)) = part.split_last() {
        if !is_space(last) {
            break;
        }
        part = rest;
    }
    part
}

/// Plans the corruption of one needle: resolves the assignee, mints the
/// assignment UUID, records the FI-signal on `module`, and registers the
/// right-hand-side edit.
///
/// `prefix` qualifies the global fault-injection nets: empty inside the top
/// module, `<top>.` everywhere else.
#[allow(clippy::too_many_arguments)]
pub(crate) fn corrupt_needle(
    buf: &[u8],
    span: &ModuleSpan,
    kind: NeedleKind,
    needle_at: usize,
    mode: FaultMode,
    prefix: &str,
    module: &mut ModuleRecord,
    uuids: &mut UuidAllocator,
    edits: &mut EditSet,
) -> Result<(), InstrumentError> {
    // Locate the assignee text.
    let raw_start = match kind {
        NeedleKind::BlockingAssign => needle_at + kind.literal().len(),
        NeedleKind::NonBlocking => {
            let mut i = needle_at
                .checked_sub(1)
                .ok_or(InstrumentError::AssigneeNotFound { at: needle_at })?;
            while i > 0 && is_space(buf[i]) {
                i -= 1;
            }
            // The assignee starts after the delimiter that closed the
            // preceding statement.
            loop {
                if matches!(buf[i], b'\n' | b' ' | b')') {
                    break i + 1;
                }
                if i == 0 {
                    break 0;
                }
                i -= 1;
            }
        }
    };
    if raw_start < span.body_start {
        return Err(InstrumentError::AssigneeNotFound { at: needle_at });
    }
    let start = skip_spaces(buf, raw_start);

    let end_marker: &[u8] = match kind {
        NeedleKind::BlockingAssign => b"=",
        NeedleKind::NonBlocking => b"<",
    };
    let marker_at = find(buf, start, span.body_end, end_marker).ok_or(
        InstrumentError::MalformedAssignment {
            at: needle_at,
            reason: "assignee never ends",
        },
    )?;
    let mut end = marker_at;
    while end > start && is_space(buf[end - 1]) {
        end -= 1;
    }
    let assignee = &buf[start..end];
    if assignee.is_empty() {
        return Err(InstrumentError::MalformedAssignment {
            at: needle_at,
            reason: "empty assignee",
        });
    }

    // Split a concatenation into its parts.
    let mut parts: Vec<&[u8]> = Vec::new();
    if assignee.first() == Some(&b'{') {
        let close = find(assignee, 0, assignee.len(), b"}")
            .ok_or(InstrumentError::UnterminatedConcatenation { at: start })?;
        for piece in assignee[1..close].split(|&b| b == b',') {
            parts.push(trim_spaces(piece));
        }
    } else {
        parts.push(assignee);
    }

    // Total corruption width across parts.
    let resolver = SignalResolver::new(buf, span);
    let mut total: u32 = 0;
    for part in &parts {
        total = total.saturating_add(resolver.assignee_width(part)?);
    }

    // The statement must read `… = … ;` with a newline after the semicolon
    // and the `=` outside any comment.
    let equal = find(buf, start, span.body_end, b"=").ok_or(
        InstrumentError::MalformedAssignment {
            at: needle_at,
            reason: "no equal sign",
        },
    )?;
    let semicolon = find(buf, start, span.body_end, b";").ok_or(
        InstrumentError::MalformedAssignment {
            at: needle_at,
            reason: "statement never ends",
        },
    )?;
    let newline = find(buf, start, span.body_end, b"\n").ok_or(
        InstrumentError::MalformedAssignment {
            at: needle_at,
            reason: "no newline after statement",
        },
    )?;
    if semicolon <= equal {
        return Err(InstrumentError::MalformedAssignment {
            at: needle_at,
            reason: "equal sign after semicolon",
        });
    }
    if newline <= semicolon {
        return Err(InstrumentError::MalformedAssignment {
            at: needle_at,
            reason: "newline before semicolon",
        });
    }
    if inside_comment(buf, equal, span.body_start, semicolon) {
        return Err(InstrumentError::EqualsInComment { at: equal });
    }

    let uuid = uuids.mint();
    let mut fi_name = String::from("fi_");
    for part in &parts {
        fi_name.push_str(
            std::str::from_utf8(part).map_err(|_| InstrumentError::NonUtf8Name { at: start })?,
        );
    }

    let rhs_start = equal + 1;
    let rhs = std::str::from_utf8(&buf[rhs_start..semicolon]).map_err(|_| {
        InstrumentError::MalformedAssignment {
            at: needle_at,
            reason: "right-hand side is not valid UTF-8",
        }
    })?;
    let select = if total == 1 {
        "[0]".to_owned()
    } else {
        format!("[{}:0]", total - 1)
    };
    let replacement = format!(
        "({rhs}){}((fiEnable && ({uuid} == {prefix}GlobalFiNumber)) ? \
{prefix}GlobalFiSignal{select} : {{{total}{{1'b0}}}})",
        mode.operator()
    );

    edits.insert(rhs_start, semicolon, replacement)?;
    module.fi_signals.push(FiSignal {
        kind: SignalKind::Wire,
        width: total,
        elem_cnt: 1,
        name: fi_name,
        uuid,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use faultline_design::DesignTable;
    use faultline_scan::{next_module, next_needle};

    fn corrupt_first(src: &[u8], mode: FaultMode, prefix: &str) -> (String, DesignTable) {
        let span = next_module(src, 0).unwrap().unwrap();
        let mut table = DesignTable::new();
        let idx = table.insert(&span.name).unwrap();
        let mut uuids = UuidAllocator::new();
        let mut edits = EditSet::new();
        let (kind, at) = next_needle(src, span.body_start, span.body_end).unwrap();
        corrupt_needle(
            src,
            &span,
            kind,
            at,
            mode,
            prefix,
            table.module_mut(idx),
            &mut uuids,
            &mut edits,
        )
        .unwrap();
        let out = String::from_utf8(edits.apply(src).unwrap()).unwrap();
        (out, table)
    }

    #[test]
    fn flip_wraps_blocking_assign() {
        let src = b"module m (\n input clk\n);\nwire [7:0] x;\nassign x = a + b;\nendmodule\n";
        let (out, table) = corrupt_first(src, FaultMode::Flip, "");
        assert!(out.contains(
            "assign x =( a + b) ^ ((fiEnable && (2 == GlobalFiNumber)) ? \
GlobalFiSignal[7:0] : {8{1'b0}});"
        ));
        let sig = &table.modules()[0].fi_signals[0];
        assert_eq!(sig.name, "fi_x");
        assert_eq!(sig.width, 8);
        assert_eq!(sig.uuid, 2);
        assert_eq!(sig.kind, SignalKind::Wire);
        assert_eq!(sig.elem_cnt, 1);
    }

    #[test]
    fn stuck_high_uses_or() {
        let src = b"module m (\n input clk\n);\nwire q;\nassign q = d;\nendmodule\n";
        let (out, _) = corrupt_first(src, FaultMode::StuckHigh, "");
        assert!(out.contains(
            "assign q =( d) | ((fiEnable && (2 == GlobalFiNumber)) ? \
GlobalFiSignal[0] : {1{1'b0}});"
        ));
    }

    #[test]
    fn stuck_low_uses_and_not() {
        let src = b"module m (\n input clk\n);\nwire q;\nassign q = d;\nendmodule\n";
        let (out, _) = corrupt_first(src, FaultMode::StuckLow, "");
        assert!(out.contains("( d) & ~((fiEnable"));
    }

    #[test]
    fn non_blocking_assign_is_wrapped() {
        let src =
            b"module m (\n input clk\n);\nreg [3:0] q;\nalways @(posedge clk)\n q <= d;\nendmodule\n";
        let (out, table) = corrupt_first(src, FaultMode::Flip, "");
        assert!(out.contains(
            "q <=( d) ^ ((fiEnable && (2 == GlobalFiNumber)) ? \
GlobalFiSignal[3:0] : {4{1'b0}});"
        ));
        assert_eq!(table.modules()[0].fi_signals[0].name, "fi_q");
        assert_eq!(table.modules()[0].fi_signals[0].width, 4);
    }

    #[test]
    fn non_top_prefix_qualifies_globals() {
        let src = b"module u (\n input clk\n);\nwire [7:0] x;\nassign x = a;\nendmodule\n";
        let (out, _) = corrupt_first(src, FaultMode::Flip, "top.");
        assert!(out.contains("(2 == top.GlobalFiNumber)"));
        assert!(out.contains("top.GlobalFiSignal[7:0]"));
    }

    #[test]
    fn scalar_select_uses_bit_zero() {
        let src = b"module m (\n input clk\n);\nreg [3:0] r;\nassign r[1] = y;\nendmodule\n";
        let (out, table) = corrupt_first(src, FaultMode::Flip, "");
        assert!(out.contains("GlobalFiSignal[0] : {1{1'b0}}"));
        let sig = &table.modules()[0].fi_signals[0];
        assert_eq!(sig.name, "fi_r[1]");
        assert_eq!(sig.width, 1);
    }

    #[test]
    fn concatenation_sums_widths() {
        let src = b"module m (\n input clk\n);\nwire [4:0] hi;\nwire [3:0] lo;\n\
assign {hi, lo[2:0]} = z;\nendmodule\n";
        let (out, table) = corrupt_first(src, FaultMode::Flip, "");
        let sig = &table.modules()[0].fi_signals[0];
        assert_eq!(sig.width, 8);
        assert_eq!(sig.name, "fi_hilo[2:0]");
        assert!(out.contains("GlobalFiSignal[7:0] : {8{1'b0}}"));
    }

    #[test]
    fn needle_with_commented_equal_is_rejected() {
        // The commented `=` makes the assignee unresolvable, so the run
        // fails before the edit is planned.
        let src = b"module m (\n input clk\n);\nwire q;\nassign q /* = broken */ ;\nendmodule\n";
        let span = next_module(src, 0).unwrap().unwrap();
        let mut table = DesignTable::new();
        let idx = table.insert("m").unwrap();
        let mut uuids = UuidAllocator::new();
        let mut edits = EditSet::new();
        let (kind, at) = next_needle(src, span.body_start, span.body_end).unwrap();
        let result = corrupt_needle(
            src,
            &span,
            kind,
            at,
            FaultMode::Flip,
            "",
            table.module_mut(idx),
            &mut uuids,
            &mut edits,
        );
        assert!(result.is_err());
        assert!(edits.is_empty());
    }

    #[test]
    fn statement_without_semicolon_is_rejected() {
        let src = b"module m (\n input clk\n);\nwire q;\nassign q = d\nendmodule\n";
        let span = next_module(src, 0).unwrap().unwrap();
        let mut table = DesignTable::new();
        let idx = table.insert("m").unwrap();
        let mut uuids = UuidAllocator::new();
        let mut edits = EditSet::new();
        let (kind, at) = next_needle(src, span.body_start, span.body_end).unwrap();
        let err = corrupt_needle(
            src,
            &span,
            kind,
            at,
            FaultMode::Flip,
            "",
            table.module_mut(idx),
            &mut uuids,
            &mut edits,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            InstrumentError::MalformedAssignment { .. } | InstrumentError::EqualsInComment { .. }
        ));
    }

    #[test]
    fn undeclared_assignee_is_rejected() {
        let src = b"module m (\n input clk\n);\nassign ghost = 1;\nendmodule\n";
        let span = next_module(src, 0).unwrap().unwrap();
        let mut table = DesignTable::new();
        let idx = table.insert("m").unwrap();
        let mut uuids = UuidAllocator::new();
        let mut edits = EditSet::new();
        let (kind, at) = next_needle(src, span.body_start, span.body_end).unwrap();
        let err = corrupt_needle(
            src,
            &span,
            kind,
            at,
            FaultMode::Flip,
            "",
            table.module_mut(idx),
            &mut uuids,
            &mut edits,
        )
        .unwrap_err();
        assert!(matches!(err, InstrumentError::SignalNotFound { .. }));
    }

    #[test]
    fn trim_spaces_both_ends() {
        assert_eq!(trim_spaces(b"  a b\t"), b"a b");
        assert_eq!(trim_spaces(b"x"), b"x");
        assert_eq!(trim_spaces(b" \t "), b"");
    }
}
