//! Signal declaration resolution inside one module span.
//!
//! Given an identifier that appears as an assignment target, the resolver
//! finds its declaration, derives kind, bit width and array element count,
//! and computes the width of bit- and array-selects. It works by literal
//! search, like the rest of the tool: an occurrence of the identifier
//! qualifies as the declaration when the nearest preceding kind keyword has
//! no `;` between itself and the identifier.

use crate::error::{shown_name, InstrumentError};
use faultline_design::SignalKind;
use faultline_scan::{find, inside_comment, rfind, ModuleSpan, MAX_NAME_LEN};

/// A parsed signal declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SignalDecl {
    pub kind: SignalKind,
    pub width: u32,
    pub elem_cnt: u32,
    pub name: String,
}

/// Spaces and horizontal tabs, the only whitespace the declaration grammar
/// tolerates inside a statement.
pub(crate) fn is_space(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// First offset at or after `pos` that is not a space or tab.
pub(crate) fn skip_spaces(buf: &[u8], mut pos: usize) -> usize {
    while pos < buf.len() && is_space(buf[pos]) {
        pos += 1;
    }
    pos
}

/// A parsed `[…]` select: a single index or a `high:low` range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Select {
    Index(i64),
    Range(i64, i64),
}

impl Select {
    /// Width of this select when read as a slice: one element for a single
    /// index, `|high − low| + 1` for a range.
    pub(crate) fn slice_extent(&self) -> u32 {
        match *self {
            Select::Index(_) => 1,
            Select::Range(high, low) => range_extent(high, low),
        }
    }
}

fn range_extent(high: i64, low: i64) -> u32 {
    let extent = high.abs_diff(low).saturating_add(1);
    u32::try_from(extent).unwrap_or(u32::MAX)
}

/// Parses an integer the way `strtol` would: leading ASCII whitespace, an
/// optional sign, then decimal digits. Returns the value and the offset of
/// the first unconsumed byte.
fn parse_int(buf: &[u8], from: usize, hi: usize) -> Option<(i64, usize)> {
    let mut i = from;
    while i < hi && buf[i].is_ascii_whitespace() {
        i += 1;
    }
    let mut negative = false;
    if i < hi && (buf[i] == b'+' || buf[i] == b'-') {
        negative = buf[i] == b'-';
        i += 1;
    }
    let digits_start = i;
    let mut value: i64 = 0;
    while i < hi && buf[i].is_ascii_digit() {
        value = value
            .saturating_mul(10)
            .saturating_add(i64::from(buf[i] - b'0'));
        i += 1;
    }
    if i == digits_start {
        return None;
    }
    Some((if negative { -value } else { value }, i))
}

/// Parses a `[…]` select starting at `at` (which must hold the `[`).
/// Returns the select and the offset of the closing `]`.
pub(crate) fn parse_select(
    buf: &[u8],
    at: usize,
    hi: usize,
) -> Result<(Select, usize), InstrumentError> {
    if buf.get(at) != Some(&b'[') {
        return Err(InstrumentError::RangeSyntax {
            at,
            expected: "`[`",
        });
    }
    let (high, after_high) = parse_int(buf, at + 1, hi).ok_or(InstrumentError::RangeSyntax {
        at: at + 1,
        expected: "a number",
    })?;
    match buf.get(after_high) {
        Some(&b']') => Ok((Select::Index(high), after_high)),
        Some(&b':') => {
            let (low, after_low) =
                parse_int(buf, after_high + 1, hi).ok_or(InstrumentError::RangeSyntax {
                    at: after_high + 1,
                    expected: "a number",
                })?;
            if buf.get(after_low) != Some(&b']') {
                return Err(InstrumentError::RangeSyntax {
                    at: after_low,
                    expected: "`]`",
                });
            }
            Ok((Select::Range(high, low), after_low))
        }
        _ => Err(InstrumentError::RangeSyntax {
            at: after_high,
            expected: "`:` or `]`",
        }),
    }
}

/// Resolves signal declarations within one module span.
pub(crate) struct SignalResolver<'a> {
    buf: &'a [u8],
    span: &'a ModuleSpan,
}

impl<'a> SignalResolver<'a> {
    pub(crate) fn new(buf: &'a [u8], span: &'a ModuleSpan) -> Self {
        Self { buf, span }
    }

    /// Total corruption width contributed by one assignee part: the slice
    /// width for a sub-signal select, otherwise declared width times element
    /// count.
    pub(crate) fn assignee_width(&self, part: &[u8]) -> Result<u32, InstrumentError> {
        if part.len() > MAX_NAME_LEN {
            return Err(InstrumentError::SignalNameTooLong {
                name: shown_name(part),
            });
        }
        let is_sub = if part.first() == Some(&b'\\') {
            // An escaped identifier may contain `[`; an actual select is
            // separated from the name by a space.
            find(part, 0, part.len(), b" [").is_some()
        } else {
            find(part, 0, part.len(), b"[").is_some()
        };
        if is_sub {
            self.sub_signal_width(part)
        } else {
            let decl = self.parse_declaration(self.declaration_of(part)?)?;
            Ok(decl.width.saturating_mul(decl.elem_cnt))
        }
    }

    /// Finds the declaration of `name`, returning the offset of its kind
    /// keyword.
    ///
    /// Occurrences are scanned from the end of the module's port list; a
    /// `wire`/`reg` declaration wins outright, an `input`/`output` one is
    /// kept as fallback (a port without an explicit net type defaults to
    /// `wire`).
    fn declaration_of(&self, name: &[u8]) -> Result<usize, InstrumentError> {
        let (buf, span) = (self.buf, self.span);
        let port_end = find(buf, span.body_start, span.body_end, b")").ok_or_else(|| {
            InstrumentError::PortListMissingEnd {
                module: span.name.clone(),
            }
        })?;

        let mut scan = port_end;
        let mut io_fallback: Option<usize> = None;
        while let Some(occurrence) = find(buf, scan, span.body_end, name) {
            if !inside_comment(buf, occurrence, span.body_start, span.body_end) {
                if let Some((kind, kind_at)) = self.kind_before(occurrence) {
                    let semi_between = matches!(
                        find(buf, kind_at, span.body_end, b";"),
                        Some(s) if s <= occurrence
                    );
                    if !semi_between {
                        match kind {
                            SignalKind::Wire | SignalKind::Reg => return Ok(kind_at),
                            SignalKind::Input | SignalKind::Output => {
                                io_fallback = Some(kind_at);
                            }
                        }
                    }
                }
            }
            scan = occurrence + 1;
        }

        io_fallback.ok_or_else(|| InstrumentError::SignalNotFound {
            name: shown_name(name),
        })
    }

    /// The nearest kind keyword strictly before `at` within the module.
    fn kind_before(&self, at: usize) -> Option<(SignalKind, usize)> {
        let mut nearest: Option<(SignalKind, usize)> = None;
        for kind in SignalKind::ALL {
            if let Some(pos) = rfind(
                self.buf,
                self.span.body_start,
                at,
                kind.keyword().as_bytes(),
            ) {
                if nearest.map_or(true, |(_, best)| pos > best) {
                    nearest = Some((kind, pos));
                }
            }
        }
        nearest
    }

    /// Parses the declaration whose kind keyword starts at (or just after)
    /// `decl_start`: kind, optional `[hi:lo]` width, name, optional array
    /// suffix.
    fn parse_declaration(&self, decl_start: usize) -> Result<SignalDecl, InstrumentError> {
        let (buf, hi) = (self.buf, self.span.body_end);

        let mut first: Option<(SignalKind, usize)> = None;
        for kind in SignalKind::ALL {
            if let Some(at) = find(buf, decl_start, hi, kind.keyword().as_bytes()) {
                if first.map_or(true, |(_, best)| at < best) {
                    first = Some((kind, at));
                }
            }
        }
        let (kind, kind_at) = first.ok_or(InstrumentError::NoSignalKind { at: decl_start })?;

        let mut cursor = skip_spaces(buf, kind_at + kind.keyword().len());
        let width = if buf.get(cursor) == Some(&b'[') {
            let (select, close) = parse_select(buf, cursor, hi)?;
            let width = match select {
                Select::Range(high, low) => range_extent(high, low),
                Select::Index(_) => {
                    return Err(InstrumentError::RangeSyntax {
                        at: cursor,
                        expected: "`:`",
                    })
                }
            };
            cursor = skip_spaces(buf, close + 1);
            width
        } else {
            1
        };

        let semi = find(buf, cursor, hi, b";");
        let space = find(buf, cursor, hi, b" ");
        let name_end = match (semi, space) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => return Err(InstrumentError::UnterminatedDeclaration { at: cursor }),
        };
        let name = std::str::from_utf8(&buf[cursor..name_end])
            .map_err(|_| InstrumentError::NonUtf8Name { at: cursor })?
            .to_owned();

        let mut elem_cnt = 1;
        if let (Some(bracket), Some(semi_at)) = (find(buf, name_end, hi, b"["), semi) {
            if bracket < semi_at {
                let (select, _) = parse_select(buf, bracket, hi)?;
                elem_cnt = match select {
                    Select::Index(n) => {
                        if n <= 0 {
                            return Err(InstrumentError::InvalidArraySize { at: bracket });
                        }
                        u32::try_from(n).unwrap_or(u32::MAX)
                    }
                    Select::Range(high, low) => range_extent(high, low),
                };
            }
        }

        Ok(SignalDecl {
            kind,
            width,
            elem_cnt,
            name,
        })
    }

    /// Width of a `name[a:b]` / `name[i]` select against its declaration.
    ///
    /// When the declared signal is an array the bracket selects whole
    /// elements (`slice × width` bits); otherwise it is a bit slice. Either
    /// way the select must fit the declared dimension.
    fn sub_signal_width(&self, sub: &[u8]) -> Result<u32, InstrumentError> {
        let bracket = if sub.first() == Some(&b'\\') {
            find(sub, 0, sub.len(), b" [").map(|p| p + 1)
        } else {
            find(sub, 0, sub.len(), b"[")
        }
        .ok_or_else(|| InstrumentError::SubSignalMissingBracket {
            name: shown_name(sub),
        })?;

        let decl_at = self.declaration_of(&sub[..bracket])?;
        let decl = self.parse_declaration(decl_at)?;

        let (select, _) = parse_select(sub, bracket, sub.len())?;
        let slice = select.slice_extent();

        if decl.elem_cnt > 1 {
            if slice > decl.elem_cnt {
                return Err(InstrumentError::SliceTooWide {
                    name: decl.name,
                    slice,
                    declared: decl.elem_cnt,
                });
            }
            Ok(slice.saturating_mul(decl.width))
        } else {
            if slice > decl.width {
                return Err(InstrumentError::SliceTooWide {
                    name: decl.name,
                    slice,
                    declared: decl.width,
                });
            }
            Ok(slice)
        }
    }
}
