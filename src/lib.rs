//! Gradspec: a derivative-specification compiler.
//!
//! Gradspec ingests declarative backward-formula records for numeric
//! operations, cross-references them against each operation's type
//! signature, and produces a validated intermediate representation that a
//! downstream generator renders into backward-pass source code.
//!
//! # Architecture
//!
//! - **schema**: operation signatures and the signature catalog (input)
//! - **spec**: derivative specification records (input)
//! - **ir**: the compiled output: `Variable`, `Derivative`,
//!   `DifferentiabilityInfo`
//! - **formula**: token-aware formula scanning and rewriting
//! - **resolve**: saved-variable resolution against a signature
//! - **derivative** / **info**: the builders assembling the IR
//! - **compile**: the whole-catalog driver
//!
//! Textual parsing of the specification source and rendering of the IR are
//! owned by the surrounding tooling; this crate only builds and validates
//! the IR in between.
//!
//! # Feature Flags
//!
//! - `parallel`: enable [`compile::compile_parallel`], a rayon-backed
//!   driver with a deterministic merge.

// ============================================================================
// Core Modules
// ============================================================================

pub mod compile;
pub mod derivative;
pub mod error;
pub mod formula;
pub mod info;
pub mod ir;
pub mod resolve;
pub mod schema;
pub mod spec;

// ============================================================================
// Re-exports
// ============================================================================

pub use compile::compile;
pub use error::{CompileError, CompileResult};
pub use info::build_differentiability_info;
pub use ir::{Derivative, DifferentiabilityInfo, Variable};
pub use schema::{Argument, OpSignature, Return, SignatureCatalog, ValueType};
pub use spec::{DerivativeSpec, FormulaGroup, NON_DIFFERENTIABLE};

#[cfg(feature = "parallel")]
pub use compile::compile_parallel;

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module with commonly used types and entry points.
pub mod prelude {
    pub use crate::compile::compile;
    pub use crate::error::{CompileError, CompileResult};
    pub use crate::ir::{Derivative, DifferentiabilityInfo, Variable};
    pub use crate::schema::{Argument, OpSignature, Return, SignatureCatalog, ValueType};
    pub use crate::spec::{DerivativeSpec, FormulaGroup};
}

// ============================================================================
// Tests
// ============================================================================
