//! Signal kinds and fault-injection signal records.

use serde::{Deserialize, Serialize};

/// The declaration kind of an RTL signal.
///
/// Ports declared `input`/`output` without an explicit net type default to
/// `wire`; the resolver still records them with their port kind so the
/// descriptor preserves what the source said.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    /// A `wire` net.
    Wire,
    /// A `reg` variable.
    Reg,
    /// An `input` port.
    Input,
    /// An `output` port.
    Output,
}

impl SignalKind {
    /// All kinds, in declaration-keyword precedence order.
    pub const ALL: [SignalKind; 4] = [
        SignalKind::Wire,
        SignalKind::Reg,
        SignalKind::Input,
        SignalKind::Output,
    ];

    /// The RTL spelling of this kind (`wire`, `reg`, `input`, `output`).
    pub fn keyword(self) -> &'static str {
        match self {
            SignalKind::Wire => "wire",
            SignalKind::Reg => "reg",
            SignalKind::Input => "input",
            SignalKind::Output => "output",
        }
    }

    /// The spelling used in the emitted hierarchy descriptor.
    pub fn descriptor_name(self) -> &'static str {
        match self {
            SignalKind::Wire => "SIGNAL_TYPE_WIRE",
            SignalKind::Reg => "SIGNAL_TYPE_REG",
            SignalKind::Input => "SIGNAL_TYPE_INPUT",
            SignalKind::Output => "SIGNAL_TYPE_OUTPUT",
        }
    }
}

/// One corruptible assignment site.
///
/// Created by the corruption planner for every instrumented `assign` or
/// non-blocking assignment; the width covers the whole assignee (summed over
/// concatenation parts).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiSignal {
    /// The declaration kind (always [`SignalKind::Wire`] for planner-minted signals).
    pub kind: SignalKind,
    /// Total width of the assignee in bits.
    pub width: u32,
    /// Array element count; 1 for scalars.
    pub elem_cnt: u32,
    /// The synthetic signal name, `fi_` followed by the assignee names.
    pub name: String,
    /// The process-unique assignment identifier.
    pub uuid: u32,
}
