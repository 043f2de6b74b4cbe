//! Compile error taxonomy.
//!
//! Every failure is detected at compile time and attributed to the
//! operation (and where applicable the identifier or argument) that caused
//! it. The compiler never guesses a fallback formula or signature match.

use thiserror::Error;

/// Errors produced while building the IR.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A formula references an identifier that maps to no argument, derived
    /// property, or return value of the operation.
    #[error("operation '{op}': formula references '{reference}', which is not an argument, property, or return value")]
    UnresolvedReference { op: String, reference: String },

    /// A derivative's declared argument names are inconsistent with the
    /// operation's argument list.
    #[error("operation '{op}': derivative target '{name}' is invalid: {reason}")]
    FormulaArgumentMismatch {
        op: String,
        name: String,
        reason: String,
    },

    /// Two captures with the same name disagree on expression or type.
    #[error("operation '{op}': saved variable '{name}' captured with conflicting expression or type")]
    SavedVariableConflict { op: String, name: String },

    /// A specification names an operation absent from the signature catalog.
    #[error("no signature in the catalog matches operation '{name}'")]
    UnmatchedOperation { name: String },

    /// The output-differentiability vector does not line up with the
    /// signature's return slots.
    #[error("operation '{op}': output differentiability lists {got} outputs, but the signature declares {expected}")]
    OutputDifferentiabilityMismatch {
        op: String,
        expected: usize,
        got: usize,
    },
}

pub type CompileResult<T> = Result<T, CompileError>;
