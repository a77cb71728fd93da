//! Weighted random corruption-bit selection over an instrumented design.
//!
//! The [`FaultSelector`] walks the design table the instrumenter emitted and
//! draws one bit uniformly across every fault-injection signal reachable
//! from the top module, weighting each assignment by its width and each
//! instance subtree by its total bit count. The result names the instance
//! chain from the top module down, the assignment UUID to drive onto
//! `GlobalFiNumber`, and the width of the selected signal.
//!
//! The selector is re-entrant but not thread-safe by contract: simulator
//! threads each hold their own instance. The PRNG is supplied by the caller,
//! who also seeds it.

#![warn(missing_docs)]

pub mod error;

pub use error::SelectError;

use faultline_design::{DesignTable, TOP_MODULE_UUID};
use rand::Rng;

/// One uniformly selected corruption target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    /// Instance UUIDs from the top module (always `[1, …]`) down to the
    /// module holding the selected signal. These drive
    /// `GlobalFiModInstNr[level]`.
    pub instance_chain: Vec<u32>,
    /// UUID of the selected assignment, for `GlobalFiNumber`.
    pub assignment_uuid: u32,
    /// Width of the selected signal in bits.
    pub width: u32,
}

/// Uniform random selector over the corruption bits of a design table.
pub struct FaultSelector<'a> {
    table: &'a DesignTable,
    bits: Vec<u64>,
    total: u64,
}

impl<'a> FaultSelector<'a> {
    /// Builds a selector, memoizing the reachable corruption bits of every
    /// module under the top.
    ///
    /// Fails on a table without a top module, with dangling or cyclic
    /// instance references, or with zero reachable bits.
    pub fn new(table: &'a DesignTable) -> Result<Self, SelectError> {
        let top = table.top_index().ok_or(SelectError::NoTopModule)?;
        let mut memo: Vec<Option<u64>> = vec![None; table.len()];
        let mut on_path = vec![false; table.len()];
        let total = bits_of(table, top, &mut memo, &mut on_path)?;
        if total == 0 {
            return Err(SelectError::ZeroReachableBits);
        }
        let bits = memo.into_iter().map(|b| b.unwrap_or(0)).collect();
        Ok(Self { table, bits, total })
    }

    /// Total corruption bits reachable from the top module.
    pub fn total_bits(&self) -> u64 {
        self.total
    }

    /// Corruption bits reachable from the module at `index` (0 for modules
    /// the top never instantiates).
    pub fn module_bits(&self, index: usize) -> u64 {
        self.bits.get(index).copied().unwrap_or(0)
    }

    /// Draws one corruption bit uniformly and resolves it to an instance
    /// chain, assignment UUID and signal width.
    pub fn random_fi(&self, rng: &mut impl Rng) -> Result<Selection, SelectError> {
        let top = self.table.top_index().ok_or(SelectError::NoTopModule)?;
        let mut remaining = rng.gen_range(0..self.total);
        let mut index = top;
        let mut chain = vec![TOP_MODULE_UUID];

        'descend: loop {
            let module = &self.table.modules()[index];

            let mut cumulative = 0u64;
            for signal in &module.fi_signals {
                cumulative += u64::from(signal.width);
                if remaining < cumulative {
                    return Ok(Selection {
                        instance_chain: chain,
                        assignment_uuid: signal.uuid,
                        width: signal.width,
                    });
                }
            }

            for instance in &module.instances {
                let child_bits = self.module_bits(instance.module);
                if remaining < cumulative + child_bits {
                    chain.push(instance.uuid);
                    remaining -= cumulative;
                    index = instance.module;
                    continue 'descend;
                }
                cumulative += child_bits;
            }

            return Err(SelectError::InconsistentTable {
                module: module.name.clone(),
            });
        }
    }
}

/// Reachable corruption bits of one module: its own signal widths plus the
/// bits of every instantiated child, memoized per table index.
fn bits_of(
    table: &DesignTable,
    index: usize,
    memo: &mut Vec<Option<u64>>,
    on_path: &mut Vec<bool>,
) -> Result<u64, SelectError> {
    if let Some(bits) = memo[index] {
        return Ok(bits);
    }
    if on_path[index] {
        return Err(SelectError::CyclicHierarchy {
            module: table.modules()[index].name.clone(),
        });
    }
    on_path[index] = true;

    let module = &table.modules()[index];
    let mut total: u64 = module
        .fi_signals
        .iter()
        .map(|s| u64::from(s.width))
        .sum();
    for instance in &module.instances {
        if instance.module >= table.len() {
            return Err(SelectError::UnknownChild {
                module: module.name.clone(),
                index: instance.module,
            });
        }
        total += bits_of(table, instance.module, memo, on_path)?;
    }

    on_path[index] = false;
    memo[index] = Some(total);
    Ok(total)
}
