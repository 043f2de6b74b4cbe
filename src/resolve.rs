//! Saved variable resolution.
//!
//! Classifies a formula reference against the owning operation's signature
//! and materializes the [`Variable`] that must be captured at call time.
//! Resolution is a pure function of (reference, signature): resolving the
//! same reference twice yields identical records.

use crate::error::{CompileError, CompileResult};
use crate::formula::Reference;
use crate::ir::Variable;
use crate::schema::{OpSignature, ValueType};

/// Property methods that can be saved on their own instead of the whole
/// base value, with the type of the narrowed capture.
pub const PROPERTY_TYPES: &[(&str, ValueType)] = &[
    ("scalar_type", ValueType::ScalarType),
    ("sizes", ValueType::Shape),
    ("strides", ValueType::Shape),
    ("device", ValueType::Device),
    ("options", ValueType::TensorOptions),
    ("dim", ValueType::Int),
    ("numel", ValueType::Int),
];

fn property_type(method: &str) -> Option<ValueType> {
    PROPERTY_TYPES
        .iter()
        .find(|(name, _)| *name == method)
        .map(|(_, ty)| *ty)
}

/// Where a captured value comes from, deciding which saved set it joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Input,
    Output,
}

/// A resolved capture: the variable to save and how to rewrite the
/// reference that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCapture {
    pub variable: Variable,
    pub origin: Origin,
    /// When set, only the base identifier participates in rewriting; the
    /// trailing access text stays in the formula and evaluates against the
    /// captured base value.
    pub base_only: bool,
}

/// Resolve one scanned reference against the operation's signature.
///
/// The base identifier must name an argument or a return value; anything
/// else is an unresolved-reference error carrying the operation name and
/// the offending text. A property chain is captured as a narrowed variable
/// only when every segment is a known property method; otherwise the base
/// value is captured whole.
pub fn resolve_reference(
    signature: &OpSignature,
    reference: &Reference,
) -> CompileResult<ResolvedCapture> {
    let (base_ty, origin) = if let Some(argument) = signature.argument(&reference.base) {
        (argument.ty, Origin::Input)
    } else if let Some(ret) = signature.return_by_ref_name(&reference.base) {
        (ret.ty, Origin::Output)
    } else {
        return Err(CompileError::UnresolvedReference {
            op: signature.qualified_name(),
            reference: reference.access_text(),
        });
    };

    if reference.is_property() {
        let narrowed: Option<ValueType> = reference
            .methods
            .iter()
            .try_fold(base_ty, |_, method| property_type(method));
        if let Some(ty) = narrowed {
            return Ok(ResolvedCapture {
                variable: Variable::new(reference.capture_name(), ty, reference.access_text()),
                origin,
                base_only: false,
            });
        }
    }

    Ok(ResolvedCapture {
        variable: Variable::new(&reference.base, base_ty, &reference.base),
        origin,
        base_only: true,
    })
}
