//! The compiled intermediate representation.
//!
//! All three records are immutable once built: they are produced once per
//! compilation run and handed to the code emitter as-is.

use crate::schema::{Argument, OpSignature, ValueType};

/// A value captured at operation-call time for use in a backward formula.
///
/// A variable can be a derived property of an argument or return value
/// rather than the value itself, e.g. saving `other.scalar_type()` instead
/// of the whole `other` tensor. Derived variables carry a suffixed name
/// (`other_scalar_type`) so formulas can reference them as plain
/// identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    /// Formula-visible name, unique within the owning derivative's saved
    /// sets.
    pub name: String,
    /// Type of the captured value.
    pub ty: ValueType,
    /// Expression evaluated against the live call to produce the value,
    /// e.g. `other` or `other.scalar_type()`.
    pub expr: String,
}

impl Variable {
    pub fn new(name: impl Into<String>, ty: ValueType, expr: impl Into<String>) -> Self {
        Variable {
            name: name.into(),
            ty,
            expr: expr.into(),
        }
    }
}

/// One gradient-computation rule: a formula and the arguments it covers.
///
/// The formula text has already been rewritten so that every captured value
/// is referenced through its [`Variable::name`]; only runtime-only symbols
/// (the incoming gradient) remain as raw references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derivative {
    /// Rewritten formula text.
    pub formula: String,
    /// Argument names this formula supplies gradients for, in authoring
    /// order. Never empty.
    pub var_names: Vec<String>,
    /// Captured input-argument values the formula references.
    pub saved_inputs: Vec<Variable>,
    /// Captured return values the formula references.
    pub saved_outputs: Vec<Variable>,
}

/// The per-operation aggregate handed to the code emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifferentiabilityInfo {
    /// Base name declared by the specification.
    pub name: String,
    /// The matched operation signature.
    pub func: OpSignature,
    /// Name of the generated gradient function. `None` exactly when
    /// `args_with_derivatives` is empty: such operations need no generated
    /// backward function.
    pub op: Option<String>,
    /// Derivative rules in authoring order.
    pub derivatives: Vec<Derivative>,
    /// Union of every derivative's `saved_inputs`, deduplicated by name.
    pub all_saved_inputs: Vec<Variable>,
    /// Union of every derivative's `saved_outputs`, deduplicated by name.
    pub all_saved_outputs: Vec<Variable>,
    /// Arguments covered by at least one derivative, in signature order,
    /// never in formula authoring order.
    pub args_with_derivatives: Vec<Argument>,
    /// Arguments explicitly marked non-differentiable by the specification.
    pub non_differentiable_arg_names: Vec<String>,
    /// Per-return differentiability flags, passed through verbatim when the
    /// specification supplies them. Absence means all outputs are
    /// differentiable.
    pub output_differentiability: Option<Vec<bool>>,
}

impl DifferentiabilityInfo {
    /// Whether compiling this operation produced any gradient function.
    pub fn has_derivatives(&self) -> bool {
        !self.args_with_derivatives.is_empty()
    }
}
