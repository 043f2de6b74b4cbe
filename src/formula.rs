//! Token-aware formula scanning and rewriting.
//!
//! Formulas are expression text in the target language. This module finds
//! the value references inside them (plain identifiers and property-access
//! chains like `other.scalar_type()`) and rewrites them by whole-token
//! substitution. Naive substring replacement would corrupt unrelated text
//! that happens to contain the same characters, so every replacement is
//! anchored to a scanned token span.

use std::ops::Range;

/// Runtime-only symbols that are never captured: the incoming gradient and
/// its per-output forms are only available when the backward function runs.
pub const GRAD_SYMBOLS: &[&str] = &["grad", "grads", "grad_input_mask"];

/// Expression-language literals, not value references.
const LITERALS: &[&str] = &["true", "false"];

/// A candidate value reference found in formula text.
///
/// `methods` is the trailing chain of empty-parens calls the scanner could
/// attach to the base identifier; it is empty for a plain reference. Spans
/// are byte ranges into the scanned formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub base: String,
    pub methods: Vec<String>,
    /// Span of the whole chain.
    pub span: Range<usize>,
    /// Span of the base identifier alone.
    pub base_span: Range<usize>,
}

impl Reference {
    /// Whether the reference carries a property chain.
    pub fn is_property(&self) -> bool {
        !self.methods.is_empty()
    }

    /// Flattened capture name: base plus `_method` per chain segment, e.g.
    /// `other.scalar_type()` -> `other_scalar_type`.
    pub fn capture_name(&self) -> String {
        let mut name = self.base.clone();
        for method in &self.methods {
            name.push('_');
            name.push_str(method);
        }
        name
    }

    /// The original access text, e.g. `other.scalar_type()`.
    pub fn access_text(&self) -> String {
        let mut text = self.base.clone();
        for method in &self.methods {
            text.push('.');
            text.push_str(method);
            text.push_str("()");
        }
        text
    }
}

fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}

fn is_ident_continue(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Parse one `.method()` segment starting at `pos`, returning the method
/// name and the position past the closing paren.
fn method_segment(formula: &str, pos: usize) -> Option<(&str, usize)> {
    let bytes = formula.as_bytes();
    if bytes.get(pos) != Some(&b'.') {
        return None;
    }
    let start = pos + 1;
    if !bytes.get(start).copied().is_some_and(is_ident_start) {
        return None;
    }
    let mut end = start;
    while end < bytes.len() && is_ident_continue(bytes[end]) {
        end += 1;
    }
    if bytes.get(end) != Some(&b'(') || bytes.get(end + 1) != Some(&b')') {
        return None;
    }
    Some((&formula[start..end], end + 2))
}

/// Scan formula text for candidate value references.
///
/// Skipped outright, never reported:
/// - call heads: an identifier immediately followed by `(`;
/// - namespace-qualified segments: an identifier immediately followed by or
///   preceded by `::`;
/// - member positions: an identifier immediately preceded by `.` (chains
///   are consumed from their base instead);
/// - literals and the runtime gradient symbols.
pub fn scan(formula: &str) -> Vec<Reference> {
    let bytes = formula.as_bytes();
    let mut references = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if !is_ident_start(bytes[i]) || (i > 0 && is_ident_continue(bytes[i - 1])) {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && is_ident_continue(bytes[i]) {
            i += 1;
        }
        let ident = &formula[start..i];

        let after_namespace = start >= 2 && bytes[start - 1] == b':' && bytes[start - 2] == b':';
        if after_namespace || (start > 0 && bytes[start - 1] == b'.') {
            continue;
        }
        let before_namespace = bytes.get(i) == Some(&b':') && bytes.get(i + 1) == Some(&b':');
        if before_namespace || bytes.get(i) == Some(&b'(') {
            continue;
        }
        if LITERALS.contains(&ident) || GRAD_SYMBOLS.contains(&ident) {
            continue;
        }

        let base_span = start..i;
        let mut methods = Vec::new();
        while let Some((method, segment_end)) = method_segment(formula, i) {
            methods.push(method.to_string());
            i = segment_end;
        }
        references.push(Reference {
            base: ident.to_string(),
            methods,
            span: start..i,
            base_span,
        });
    }

    references
}

/// Splice replacement text over the given spans. Spans must be sorted by
/// start and non-overlapping, which the scanner guarantees for its output.
pub fn rewrite(formula: &str, replacements: &[(Range<usize>, String)]) -> String {
    let mut out = String::with_capacity(formula.len());
    let mut cursor = 0;
    for (span, text) in replacements {
        out.push_str(&formula[cursor..span.start]);
        out.push_str(text);
        cursor = span.end;
    }
    out.push_str(&formula[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bases(formula: &str) -> Vec<String> {
        scan(formula).into_iter().map(|r| r.base).collect()
    }

    #[test]
    fn test_plain_identifiers() {
        assert_eq!(bases("self + other"), vec!["self", "other"]);
    }

    #[test]
    fn test_call_heads_are_skipped() {
        // `mul_backward` is a function name, not a value reference.
        assert_eq!(bases("mul_backward(grad, self)"), vec!["self"]);
    }

    #[test]
    fn test_grad_symbols_are_skipped() {
        assert_eq!(bases("grad * self"), vec!["self"]);
        assert_eq!(bases("grads[0] + grads[1]"), Vec::<String>::new());
        assert_eq!(bases("grad_input_mask"), Vec::<String>::new());
    }

    #[test]
    fn test_literals_and_namespaces_are_skipped() {
        assert_eq!(bases("at::zeros(self)"), vec!["self"]);
        assert_eq!(bases("cond ? true : false"), vec!["cond"]);
    }

    #[test]
    fn test_property_chain() {
        let refs = scan("other.scalar_type()");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].base, "other");
        assert_eq!(refs[0].methods, vec!["scalar_type"]);
        assert_eq!(refs[0].capture_name(), "other_scalar_type");
        assert_eq!(refs[0].access_text(), "other.scalar_type()");
    }

    #[test]
    fn test_nested_chain() {
        let refs = scan("x.options().device()");
        assert_eq!(refs[0].capture_name(), "x_options_device");
    }

    #[test]
    fn test_method_with_arguments_stops_the_chain() {
        // `.size(0)` is not an empty-parens segment, so only `self` is the
        // candidate and the trailing call text is left to the rewriter.
        let refs = scan("self.size(0)");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].base, "self");
        assert!(refs[0].methods.is_empty());
        assert_eq!(refs[0].span, refs[0].base_span);
    }

    #[test]
    fn test_numeric_suffixes_are_not_identifiers() {
        assert_eq!(bases("self * 2.5f + 1e10"), vec!["self"]);
    }

    #[test]
    fn test_rewrite_is_span_anchored() {
        let formula = "f(other.scalar_type(), others)";
        let refs = scan(formula);
        let replacements: Vec<_> = refs
            .iter()
            .map(|r| (r.span.clone(), r.capture_name()))
            .collect();
        assert_eq!(
            rewrite(formula, &replacements),
            "f(other_scalar_type, others)"
        );
    }

    #[test]
    fn test_rewrite_without_replacements_is_identity() {
        assert_eq!(rewrite("grad * 2", &[]), "grad * 2");
    }
}
