//! Comment position queries.

use crate::search::find;

/// The two recognized block-comment syntaxes: Verilog attributes `(* … *)`
/// and C-style `/* … */`. The pairs are searched independently; genuinely
/// nested comments are unsupported.
const BLOCK_COMMENTS: [(&[u8], &[u8]); 2] = [(b"(*", b"*)"), (b"/*", b"*/")];

/// Returns `true` if `pos` lies inside a comment within the window `[lo, hi)`.
///
/// Block comments: for each syntax, if a closing marker exists after `pos`
/// inside the window and no opening marker occurs between `pos` and that
/// closer, then `pos` is inside a block that opened earlier. Line comments:
/// walking backwards from `pos`, a `//` encountered before a newline means
/// `pos` sits in the commented tail of its line.
pub fn inside_comment(buf: &[u8], pos: usize, lo: usize, hi: usize) -> bool {
    for (open, close) in BLOCK_COMMENTS {
        if let Some(close_at) = find(buf, pos, hi, close) {
            if find(buf, pos, close_at, open).is_none() {
                return true;
            }
        }
    }

    let mut i = pos.min(buf.len().saturating_sub(1));
    while i > lo {
        if buf[i] == b'\n' {
            break;
        }
        if buf[i] == b'/' && buf[i - 1] == b'/' {
            return true;
        }
        i -= 1;
    }

    false
}
