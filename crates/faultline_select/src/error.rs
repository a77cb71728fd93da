//! Error type for the runtime selector.

/// Errors raised while building or querying a
/// [`FaultSelector`](crate::FaultSelector).
#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    /// The design table has no top module.
    #[error("design table has no top module")]
    NoTopModule,

    /// An instance references a table index that does not exist.
    #[error("module `{module}` instantiates unknown module index {index}")]
    UnknownChild {
        /// The instantiating module.
        module: String,
        /// The out-of-range table index.
        index: usize,
    },

    /// The instance graph contains a cycle, so the bit count diverges.
    #[error("cyclic instantiation through module `{module}`")]
    CyclicHierarchy {
        /// A module on the cycle.
        module: String,
    },

    /// The design has no corruption bits to select from.
    #[error("design has no fault-injection signals")]
    ZeroReachableBits,

    /// The walk ran off the end of a module's signals and instances.
    ///
    /// Cannot happen for a table that passed construction; reported instead
    /// of panicking if the table was mutated behind the selector's back.
    #[error("selection walk exhausted module `{module}`")]
    InconsistentTable {
        /// The module whose accounting went wrong.
        module: String,
    },
}
