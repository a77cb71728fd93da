//! Error type for design-table construction and traversal.

/// Errors that can occur while building or walking the design table.
#[derive(Debug, thiserror::Error)]
pub enum DesignError {
    /// A module with the same name was already registered.
    #[error("module `{name}` declared more than once")]
    DuplicateModule {
        /// The offending module name.
        name: String,
    },

    /// A module name was looked up but never registered.
    #[error("unknown module `{name}`")]
    UnknownModule {
        /// The name that failed to resolve.
        name: String,
    },

    /// An instance references a table index that does not exist.
    #[error("module `{module}` instantiates unknown module index {index}")]
    UnknownChild {
        /// The instantiating module.
        module: String,
        /// The out-of-range table index.
        index: usize,
    },

    /// The instance graph contains a cycle, so the hierarchy depth diverges.
    #[error("cyclic instantiation through module `{module}`")]
    CyclicHierarchy {
        /// A module on the cycle.
        module: String,
    },

    /// An operation that needs the top module ran before it was set.
    #[error("no top module set for the design")]
    NoTopModule,
}
