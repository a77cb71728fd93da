//! Locating `module … endmodule` spans.

use crate::comment::inside_comment;
use crate::error::ScanError;
use crate::search::{find, rfind};

/// Maximum accepted length of a module (or signal) name, in bytes.
pub const MAX_NAME_LEN: usize = 200;

const MODULE_KW: &[u8] = b"module ";
const ENDMODULE_KW: &[u8] = b"endmodule";

/// One located module declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleSpan {
    /// The module name, surrounding whitespace stripped.
    pub name: String,
    /// Byte offset just after the name (at or before the `#` / `(`).
    pub body_start: usize,
    /// Byte offset just after the closing `endmodule`.
    pub body_end: usize,
}

/// Finds the next module declaration at or after `from`.
///
/// A module is the literal `module ` followed by the module name, which ends
/// at whichever of `#` or `(` comes first; space, newline and carriage
/// return are stripped from both ends of the name. Keywords inside comments
/// are stepped over. Returns `Ok(None)` once no further module exists.
pub fn next_module(buf: &[u8], from: usize) -> Result<Option<ModuleSpan>, ScanError> {
    let hi = buf.len();
    let mut search_from = from;

    loop {
        let Some(kw_at) = find(buf, search_from, hi, MODULE_KW) else {
            return Ok(None);
        };
        let after_kw = kw_at + MODULE_KW.len();

        let hash = find(buf, after_kw, hi, b"#");
        let paren = find(buf, after_kw, hi, b"(");
        let terminator = match (hash, paren) {
            (Some(h), Some(p)) => h.min(p),
            (Some(h), None) => h,
            (None, Some(p)) => p,
            (None, None) => return Err(ScanError::UnterminatedModuleName { at: kw_at }),
        };

        let mut name_start = after_kw;
        while name_start < terminator && buf[name_start] == b' ' {
            name_start += 1;
        }
        let mut name_end = terminator;
        while name_end > name_start && matches!(buf[name_end - 1], b' ' | b'\n' | b'\r') {
            name_end -= 1;
        }

        if inside_comment(buf, name_start, search_from, hi) {
            search_from = name_start;
            continue;
        }

        if name_end == name_start {
            return Err(ScanError::EmptyModuleName { at: kw_at });
        }
        if name_end - name_start > MAX_NAME_LEN {
            let shown = String::from_utf8_lossy(&buf[name_start..name_start + MAX_NAME_LEN]);
            return Err(ScanError::ModuleNameTooLong {
                at: name_start,
                name: shown.into_owned(),
            });
        }

        let name = std::str::from_utf8(&buf[name_start..name_end])
            .map_err(|_| ScanError::NonUtf8Name { at: name_start })?
            .to_owned();
        let body_start = name_end;

        let Some(end_at) = find(buf, body_start, hi, ENDMODULE_KW) else {
            return Err(ScanError::MissingEndmodule { module: name });
        };
        let body_end = end_at + ENDMODULE_KW.len();

        // A second declaration between the name and `endmodule` is fatal;
        // commented mentions are not declarations.
        let mut nested_hi = end_at;
        while let Some(at) = rfind(buf, body_start, nested_hi, MODULE_KW) {
            if !inside_comment(buf, at, body_start, body_end) {
                return Err(ScanError::NestedModule { module: name });
            }
            nested_hi = at;
        }

        return Ok(Some(ModuleSpan {
            name,
            body_start,
            body_end,
        }));
    }
}
