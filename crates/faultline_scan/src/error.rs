//! Error type for RTL text scanning.

/// Errors raised while scanning RTL text for modules.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// A `module` keyword is not followed by `#` or `(`.
    #[error("module name starting at byte {at} never terminates")]
    UnterminatedModuleName {
        /// Byte offset of the `module` keyword.
        at: usize,
    },

    /// A `module` keyword is immediately followed by its name terminator.
    #[error("empty module name at byte {at}")]
    EmptyModuleName {
        /// Byte offset of the `module` keyword.
        at: usize,
    },

    /// A module name exceeds the 200-byte cap.
    #[error("module name `{name}` at byte {at} is longer than 200 bytes")]
    ModuleNameTooLong {
        /// Byte offset of the name.
        at: usize,
        /// The name, truncated to 200 bytes.
        name: String,
    },

    /// A module name is not valid UTF-8.
    #[error("module name at byte {at} is not valid UTF-8")]
    NonUtf8Name {
        /// Byte offset of the name.
        at: usize,
    },

    /// A module declaration has no matching `endmodule`.
    #[error("module `{module}` has no endmodule")]
    MissingEndmodule {
        /// The unterminated module.
        module: String,
    },

    /// Another `module` keyword appears between a module's name and its
    /// `endmodule`.
    #[error("nested module declaration inside `{module}`")]
    NestedModule {
        /// The enclosing module.
        module: String,
    },
}
