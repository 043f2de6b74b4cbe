//! Derivative specification records.
//!
//! One record per operation (or operation family), pre-parsed from whatever
//! declarative source format the surrounding tooling uses. The compiler
//! consumes these as plain data.

/// Sentinel formula marking its target arguments as explicitly
/// non-differentiable instead of supplying a gradient expression.
pub const NON_DIFFERENTIABLE: &str = "non_differentiable";

/// One (argument names, formula) pair: the formula computes gradient
/// contributions for every argument it names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaGroup {
    pub var_names: Vec<String>,
    pub formula: String,
}

impl FormulaGroup {
    pub fn new<S: Into<String>>(var_names: Vec<S>, formula: impl Into<String>) -> Self {
        FormulaGroup {
            var_names: var_names.into_iter().map(Into::into).collect(),
            formula: formula.into(),
        }
    }

    /// Whether this group is the non-differentiable marker rather than a
    /// gradient formula.
    pub fn is_non_differentiable(&self) -> bool {
        self.formula.trim() == NON_DIFFERENTIABLE
    }
}

/// The full specification record for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivativeSpec {
    /// Base name of the operation family.
    pub name: String,
    /// Overload discriminator, when the family has several signatures.
    pub overload: Option<String>,
    /// Formula groups in authoring order, including sentinel groups.
    pub formulas: Vec<FormulaGroup>,
    /// Per-return differentiability flags, when the author supplied them.
    pub output_differentiability: Option<Vec<bool>>,
}

impl DerivativeSpec {
    pub fn new(name: impl Into<String>, formulas: Vec<FormulaGroup>) -> Self {
        DerivativeSpec {
            name: name.into(),
            overload: None,
            formulas,
            output_differentiability: None,
        }
    }

    pub fn with_overload(mut self, overload: impl Into<String>) -> Self {
        self.overload = Some(overload.into());
        self
    }

    pub fn with_output_differentiability(mut self, flags: Vec<bool>) -> Self {
        self.output_differentiability = Some(flags);
        self
    }

    /// Name under which the signature catalog is queried.
    pub fn qualified_name(&self) -> String {
        match &self.overload {
            Some(overload) => format!("{}.{}", self.name, overload),
            None => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_differentiable_sentinel() {
        let group = FormulaGroup::new(vec!["weight"], "non_differentiable");
        assert!(group.is_non_differentiable());

        let group = FormulaGroup::new(vec!["self"], "grad * 2");
        assert!(!group.is_non_differentiable());
    }

    #[test]
    fn test_qualified_name() {
        let spec = DerivativeSpec::new("mul", vec![]);
        assert_eq!(spec.qualified_name(), "mul");
        assert_eq!(
            spec.with_overload("Scalar").qualified_name(),
            "mul.Scalar"
        );
    }
}
