//! Derivative construction.
//!
//! Turns one formula group into a [`Derivative`]: validates the targeted
//! argument names, resolves every capturable reference in the formula,
//! partitions the captures into saved inputs and saved outputs, and
//! rewrites the formula text to use the capture names.

use indexmap::IndexMap;
use log::trace;

use crate::error::{CompileError, CompileResult};
use crate::formula;
use crate::ir::{Derivative, Variable};
use crate::resolve::{resolve_reference, Origin, ResolvedCapture};
use crate::schema::OpSignature;
use crate::spec::FormulaGroup;

/// Build a [`Derivative`] from one formula group.
///
/// Fails when the group targets a name that is not one of the operation's
/// arguments, or names no argument at all; resolution failures inside the
/// formula propagate with the operation name attached.
pub fn build_derivative(
    signature: &OpSignature,
    group: &FormulaGroup,
) -> CompileResult<Derivative> {
    let op = signature.qualified_name();

    if group.var_names.is_empty() {
        return Err(CompileError::FormulaArgumentMismatch {
            op,
            name: String::new(),
            reason: "formula group names no arguments".to_string(),
        });
    }
    for var_name in &group.var_names {
        if signature.argument(var_name).is_none() {
            return Err(CompileError::FormulaArgumentMismatch {
                op,
                name: var_name.clone(),
                reason: "not an argument of the operation".to_string(),
            });
        }
    }

    // Resolve every capturable reference, keyed by capture name so repeated
    // references reuse one variable. Two spellings flattening to the same
    // name with a different capture is a conflict, not a silent merge.
    let mut captures: IndexMap<String, ResolvedCapture> = IndexMap::new();
    let mut replacements = Vec::new();
    for reference in formula::scan(&group.formula) {
        let capture = resolve_reference(signature, &reference)?;
        let name = capture.variable.name.clone();
        let span = if capture.base_only {
            reference.base_span.clone()
        } else {
            reference.span.clone()
        };
        match captures.get(&name) {
            Some(existing) if *existing != capture => {
                return Err(CompileError::SavedVariableConflict { op, name });
            }
            Some(_) => {}
            None => {
                trace!("{}: saving {} as {}", op, capture.variable.expr, name);
                captures.insert(name.clone(), capture);
            }
        }
        replacements.push((span, name));
    }

    let rewritten = formula::rewrite(&group.formula, &replacements);

    let mut saved_inputs: Vec<Variable> = Vec::new();
    let mut saved_outputs: Vec<Variable> = Vec::new();
    for capture in captures.values() {
        match capture.origin {
            Origin::Input => saved_inputs.push(capture.variable.clone()),
            Origin::Output => saved_outputs.push(capture.variable.clone()),
        }
    }

    Ok(Derivative {
        formula: rewritten,
        var_names: group.var_names.clone(),
        saved_inputs,
        saved_outputs,
    })
}
