//! Error type for the instrumentation passes.

use faultline_design::DesignError;
use faultline_scan::{ScanError, MAX_NAME_LEN};

/// Errors raised while instrumenting an RTL buffer.
///
/// Every variant is fatal to the run; the caller writes no output after
/// seeing one.
#[derive(Debug, thiserror::Error)]
pub enum InstrumentError {
    /// A module scanning error.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// A design-table error (duplicate module, unknown top, cycle, …).
    #[error(transparent)]
    Design(#[from] DesignError),

    /// No qualifying declaration exists for a signal.
    #[error("could not find declaration of signal `{name}`")]
    SignalNotFound {
        /// The signal looked for, truncated to 200 bytes.
        name: String,
    },

    /// A declaration contains none of the four kind keywords.
    #[error("no signal kind keyword in declaration at byte {at}")]
    NoSignalKind {
        /// Byte offset of the declaration.
        at: usize,
    },

    /// A module's port list has no closing `)`.
    #[error("port list of module `{module}` never ends")]
    PortListMissingEnd {
        /// The module whose ports never close.
        module: String,
    },

    /// A `[…]` range or index failed to parse.
    #[error("malformed range at byte {at}: expected {expected}")]
    RangeSyntax {
        /// Byte offset of the failure.
        at: usize,
        /// What the parser needed to see.
        expected: &'static str,
    },

    /// An array declaration has a non-positive element count.
    #[error("array size at byte {at} must be positive")]
    InvalidArraySize {
        /// Byte offset of the array suffix.
        at: usize,
    },

    /// A declaration's signal name never terminates.
    #[error("declaration name at byte {at} never ends")]
    UnterminatedDeclaration {
        /// Byte offset where the name starts.
        at: usize,
    },

    /// A sub-signal select was expected but no bracket was found.
    #[error("no `[` in sub-signal `{name}`")]
    SubSignalMissingBracket {
        /// The sub-signal text, truncated to 200 bytes.
        name: String,
    },

    /// A select is wider than the corresponding declared dimension.
    #[error("select of {slice} on `{name}` exceeds the declared {declared}")]
    SliceTooWide {
        /// The declared signal.
        name: String,
        /// The width or element count the select asked for.
        slice: u32,
        /// The declared width or element count.
        declared: u32,
    },

    /// A signal name exceeds the 200-byte cap.
    #[error("signal name `{name}` is longer than 200 bytes")]
    SignalNameTooLong {
        /// The name, truncated to 200 bytes.
        name: String,
    },

    /// An extracted identifier is not valid UTF-8.
    #[error("identifier at byte {at} is not valid UTF-8")]
    NonUtf8Name {
        /// Byte offset of the identifier.
        at: usize,
    },

    /// The assignee of a needle could not be located.
    #[error("could not locate the assignee of the needle at byte {at}")]
    AssigneeNotFound {
        /// Byte offset of the needle.
        at: usize,
    },

    /// A `{…}` concatenation assignee has no closing brace.
    #[error("concatenation at byte {at} never closes")]
    UnterminatedConcatenation {
        /// Byte offset of the opening brace.
        at: usize,
    },

    /// An assignment statement is structurally unusable.
    #[error("malformed assignment at byte {at}: {reason}")]
    MalformedAssignment {
        /// Byte offset of the needle.
        at: usize,
        /// What exactly is wrong.
        reason: &'static str,
    },

    /// The `=` of an assignment lies inside a comment.
    #[error("equal sign at byte {at} is inside a comment")]
    EqualsInComment {
        /// Byte offset of the `=`.
        at: usize,
    },

    /// A `;` appears before the `);` that closes a module port list.
    #[error("unexpected `;` at byte {at} in port list of module `{module}`")]
    StraySemicolonInPorts {
        /// The module whose port list is malformed.
        module: String,
        /// Byte offset of the stray semicolon.
        at: usize,
    },

    /// An instantiation's port list has no closing `);`.
    #[error("port list of an instance of `{child}` never ends")]
    InstancePortsMissingEnd {
        /// The instantiated module.
        child: String,
    },

    /// A `;` appears inside an instantiation's port list.
    #[error("unexpected `;` in the port list of an instance of `{child}`")]
    StraySemicolonInInstance {
        /// The instantiated module.
        child: String,
    },

    /// Two edits share the same start offset.
    #[error("an edit at byte {at} already exists")]
    DuplicateEdit {
        /// The contested start offset.
        at: usize,
    },

    /// An edit starts before the previous edit ends.
    #[error("edit at byte {at} overlaps the previous edit")]
    OverlappingEdit {
        /// Start offset of the offending edit.
        at: usize,
    },

    /// An edit is internally inconsistent or does not fit the buffer.
    #[error("invalid edit at byte {at}: {reason}")]
    InvalidEdit {
        /// Start offset of the offending edit.
        at: usize,
        /// What exactly is wrong.
        reason: &'static str,
    },
}

/// Renders raw identifier bytes for an error message, truncated to the
/// 200-byte name cap.
pub(crate) fn shown_name(bytes: &[u8]) -> String {
    let cut = bytes.len().min(MAX_NAME_LEN);
    String::from_utf8_lossy(&bytes[..cut]).into_owned()
}
