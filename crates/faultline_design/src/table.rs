//! The insertion-ordered module table.
//!
//! Modules are registered in discovery order; a module's position in the
//! table is its index in the emitted descriptor, and instance references
//! point at children by that index.

use crate::error::DesignError;
use crate::signal::FiSignal;
use serde::{Deserialize, Serialize};

/// A reference from one module to an instantiation of another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRef {
    /// Table index of the instantiated module.
    pub module: usize,
    /// The instance's process-unique identifier.
    pub uuid: u32,
}

/// One module of the instrumented design.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRecord {
    /// The module name as written in the RTL.
    pub name: String,
    /// Fault-injection signals minted inside this module, in textual order.
    pub fi_signals: Vec<FiSignal>,
    /// Child instantiations, in the order the surface pass found them.
    pub instances: Vec<InstanceRef>,
}

impl ModuleRecord {
    fn new(name: String) -> Self {
        Self {
            name,
            fi_signals: Vec::new(),
            instances: Vec::new(),
        }
    }
}

/// All modules of a design, in discovery order, plus the top-module index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignTable {
    modules: Vec<ModuleRecord>,
    top: Option<usize>,
}

impl DesignTable {
    /// Creates an empty table with no top module.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module, returning its table index.
    ///
    /// Duplicate names are rejected; two `module` declarations with the same
    /// name cannot be told apart by the instance scanner.
    pub fn insert(&mut self, name: &str) -> Result<usize, DesignError> {
        if self.index_of(name).is_some() {
            return Err(DesignError::DuplicateModule { name: name.into() });
        }
        self.modules.push(ModuleRecord::new(name.into()));
        Ok(self.modules.len() - 1)
    }

    /// Returns the table index of the named module, if registered.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.modules.iter().position(|m| m.name == name)
    }

    /// Like [`index_of`](Self::index_of) but failing with
    /// [`DesignError::UnknownModule`].
    pub fn index_of_required(&self, name: &str) -> Result<usize, DesignError> {
        self.index_of(name)
            .ok_or_else(|| DesignError::UnknownModule { name: name.into() })
    }

    /// Marks the named module as the design's top module.
    pub fn set_top(&mut self, name: &str) -> Result<usize, DesignError> {
        let index = self.index_of_required(name)?;
        self.top = Some(index);
        Ok(index)
    }

    /// The table index of the top module, if set.
    pub fn top_index(&self) -> Option<usize> {
        self.top
    }

    /// All module records in table order.
    pub fn modules(&self) -> &[ModuleRecord] {
        &self.modules
    }

    /// Mutable access to one module record.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range; indices come from
    /// [`insert`](Self::insert) / [`index_of`](Self::index_of) against this
    /// same table.
    pub fn module_mut(&mut self, index: usize) -> &mut ModuleRecord {
        &mut self.modules[index]
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether no modules have been registered.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Total number of fault-injection signals across all modules.
    pub fn total_fi_signals(&self) -> usize {
        self.modules.iter().map(|m| m.fi_signals.len()).sum()
    }

    /// Sum of all fault-injection signal widths across all modules.
    pub fn total_fi_bits(&self) -> u64 {
        self.modules
            .iter()
            .flat_map(|m| &m.fi_signals)
            .map(|s| u64::from(s.width))
            .sum()
    }

    /// The widest fault-injection signal in the design, or 0 if there is none.
    pub fn max_fi_width(&self) -> u32 {
        self.modules
            .iter()
            .flat_map(|m| &m.fi_signals)
            .map(|s| s.width)
            .max()
            .unwrap_or(0)
    }
}
