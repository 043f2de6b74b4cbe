//! Whole-catalog compilation.
//!
//! Per-operation builds are independent: no derivative formula may
//! reference another operation's saved variables, so the driver is a plain
//! map over the specification records. Output order always follows
//! specification declaration order. Any failure aborts the run: a
//! partially valid IR must never reach the code emitter.

use log::debug;

use crate::error::CompileResult;
use crate::info::build_differentiability_info;
use crate::ir::DifferentiabilityInfo;
use crate::schema::SignatureCatalog;
use crate::spec::DerivativeSpec;

/// Compile every specification record against the catalog, sequentially.
pub fn compile(
    specs: &[DerivativeSpec],
    catalog: &SignatureCatalog,
) -> CompileResult<Vec<DifferentiabilityInfo>> {
    debug!(
        "compiling {} derivative specifications against {} signatures",
        specs.len(),
        catalog.len()
    );
    specs
        .iter()
        .map(|spec| build_differentiability_info(spec, catalog))
        .collect()
}

/// Compile with a rayon worker pool. Results are merged back into
/// specification declaration order, so the output is identical to
/// [`compile`].
#[cfg(feature = "parallel")]
pub fn compile_parallel(
    specs: &[DerivativeSpec],
    catalog: &SignatureCatalog,
) -> CompileResult<Vec<DifferentiabilityInfo>> {
    use rayon::prelude::*;

    debug!(
        "compiling {} derivative specifications in parallel",
        specs.len()
    );
    specs
        .par_iter()
        .map(|spec| build_differentiability_info(spec, catalog))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Argument, OpSignature, Return, ValueType};
    use crate::spec::FormulaGroup;

    fn catalog() -> SignatureCatalog {
        ["add", "mul", "div"]
            .into_iter()
            .map(|name| {
                OpSignature::new(
                    name,
                    vec![
                        Argument::new("self", ValueType::Tensor),
                        Argument::new("other", ValueType::Tensor),
                    ],
                    vec![Return::unnamed(ValueType::Tensor)],
                )
            })
            .collect()
    }

    fn specs() -> Vec<DerivativeSpec> {
        vec![
            DerivativeSpec::new("div", vec![FormulaGroup::new(vec!["self"], "grad / other")]),
            DerivativeSpec::new("add", vec![FormulaGroup::new(vec!["self"], "grad")]),
            DerivativeSpec::new("mul", vec![FormulaGroup::new(vec!["self"], "grad * other")]),
        ]
    }

    #[test]
    fn test_output_preserves_declaration_order() {
        let infos = compile(&specs(), &catalog()).unwrap();
        let names: Vec<&str> = infos.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["div", "add", "mul"]);
    }

    #[test]
    fn test_one_bad_spec_aborts_the_run() {
        let mut specs = specs();
        specs.push(DerivativeSpec::new("matmul", vec![]));
        assert!(compile(&specs, &catalog()).is_err());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        assert_eq!(
            compile_parallel(&specs(), &catalog()).unwrap(),
            compile(&specs(), &catalog()).unwrap()
        );
    }
}
