//! Locating injection sites ("needles") inside a module body.

use crate::comment::inside_comment;
use crate::search::find;

/// The two kinds of corruptible assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NeedleKind {
    /// A continuous assignment introduced by `assign `.
    BlockingAssign,
    /// A non-blocking assignment, recognized by its `<=` operator.
    NonBlocking,
}

impl NeedleKind {
    /// Both kinds, in the order they are probed.
    pub const ALL: [NeedleKind; 2] = [NeedleKind::BlockingAssign, NeedleKind::NonBlocking];

    /// The literal text that marks this needle.
    pub fn literal(self) -> &'static [u8] {
        match self {
            NeedleKind::BlockingAssign => b"assign ",
            NeedleKind::NonBlocking => b"<=",
        }
    }
}

/// Finds the leftmost needle in `[lo, hi)` that is not inside a comment.
///
/// When the leftmost hit turns out to be commented, the search resumes one
/// byte past it.
pub fn next_needle(buf: &[u8], lo: usize, hi: usize) -> Option<(NeedleKind, usize)> {
    let mut from = lo;
    loop {
        let mut leftmost: Option<(NeedleKind, usize)> = None;
        for kind in NeedleKind::ALL {
            if let Some(at) = find(buf, from, hi, kind.literal()) {
                if leftmost.map_or(true, |(_, best)| at < best) {
                    leftmost = Some((kind, at));
                }
            }
        }
        let (kind, at) = leftmost?;
        if inside_comment(buf, at, from, hi) {
            from = at + 1;
            continue;
        }
        return Some((kind, at));
    }
}
