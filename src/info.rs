//! Differentiability info assembly.
//!
//! The top-level builder: matches one specification record against the
//! signature catalog, builds its derivatives, and assembles the
//! per-operation [`DifferentiabilityInfo`] the code emitter consumes.

use indexmap::{IndexMap, IndexSet};
use log::debug;

use crate::derivative::build_derivative;
use crate::error::{CompileError, CompileResult};
use crate::ir::{Derivative, DifferentiabilityInfo, Variable};
use crate::schema::{Argument, SignatureCatalog};
use crate::spec::DerivativeSpec;

/// Name of the generated gradient function: capitalized base name,
/// capitalized overload when present, then `Backward`.
fn backward_fn_name(spec: &DerivativeSpec) -> String {
    let mut name = capitalize(&spec.name);
    if let Some(overload) = &spec.overload {
        name.push_str(&capitalize(overload));
    }
    name.push_str("Backward");
    name
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Merge one derivative's saved variables into the operation-wide union,
/// deduplicating by name. A name collision with a differing expression or
/// type means two formulas disagree on what to capture.
fn merge_saved(
    union: &mut IndexMap<String, Variable>,
    saved: &[Variable],
    op: &str,
) -> CompileResult<()> {
    for variable in saved {
        match union.get(&variable.name) {
            Some(existing) if existing != variable => {
                return Err(CompileError::SavedVariableConflict {
                    op: op.to_string(),
                    name: variable.name.clone(),
                });
            }
            Some(_) => {}
            None => {
                union.insert(variable.name.clone(), variable.clone());
            }
        }
    }
    Ok(())
}

/// Build the [`DifferentiabilityInfo`] for one specification record.
pub fn build_differentiability_info(
    spec: &DerivativeSpec,
    catalog: &SignatureCatalog,
) -> CompileResult<DifferentiabilityInfo> {
    let signature = catalog
        .get(&spec.name, spec.overload.as_deref())
        .ok_or_else(|| CompileError::UnmatchedOperation {
            name: spec.qualified_name(),
        })?;
    let op = spec.qualified_name();
    debug!("building differentiability info for '{}'", op);

    if let Some(flags) = &spec.output_differentiability {
        if flags.len() != signature.returns.len() {
            return Err(CompileError::OutputDifferentiabilityMismatch {
                op,
                expected: signature.returns.len(),
                got: flags.len(),
            });
        }
    }

    // Partition formula groups. Each argument may be claimed by at most one
    // group, sentinel or not.
    let mut claimed: IndexSet<String> = IndexSet::new();
    let mut non_differentiable_arg_names: Vec<String> = Vec::new();
    let mut derivatives: Vec<Derivative> = Vec::new();
    for group in &spec.formulas {
        for var_name in &group.var_names {
            if signature.argument(var_name).is_none() {
                return Err(CompileError::FormulaArgumentMismatch {
                    op,
                    name: var_name.clone(),
                    reason: "not an argument of the operation".to_string(),
                });
            }
            if !claimed.insert(var_name.clone()) {
                return Err(CompileError::FormulaArgumentMismatch {
                    op,
                    name: var_name.clone(),
                    reason: "named by more than one formula group".to_string(),
                });
            }
        }
        if group.is_non_differentiable() {
            non_differentiable_arg_names.extend(group.var_names.iter().cloned());
        } else {
            derivatives.push(build_derivative(signature, group)?);
        }
    }

    // Differentiable arguments, re-sorted into signature order regardless
    // of how the formulas were authored.
    let covered: IndexSet<&str> = derivatives
        .iter()
        .flat_map(|d| d.var_names.iter().map(String::as_str))
        .collect();
    let args_with_derivatives: Vec<Argument> = signature
        .arguments
        .iter()
        .filter(|argument| covered.contains(argument.name.as_str()))
        .cloned()
        .collect();

    // An operation with no differentiable arguments needs no generated
    // backward function.
    let op_fn = if args_with_derivatives.is_empty() {
        None
    } else {
        Some(backward_fn_name(spec))
    };

    let mut all_saved_inputs: IndexMap<String, Variable> = IndexMap::new();
    let mut all_saved_outputs: IndexMap<String, Variable> = IndexMap::new();
    for derivative in &derivatives {
        merge_saved(&mut all_saved_inputs, &derivative.saved_inputs, &op)?;
        merge_saved(&mut all_saved_outputs, &derivative.saved_outputs, &op)?;
    }

    Ok(DifferentiabilityInfo {
        name: spec.name.clone(),
        func: signature.clone(),
        op: op_fn,
        derivatives,
        all_saved_inputs: all_saved_inputs.into_values().collect(),
        all_saved_outputs: all_saved_outputs.into_values().collect(),
        args_with_derivatives,
        non_differentiable_arg_names,
        output_differentiability: spec.output_differentiability.clone(),
    })
}
