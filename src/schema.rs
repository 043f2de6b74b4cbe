//! Operation signature model.
//!
//! The signature catalog is an input to the compiler: a pre-validated
//! registry mapping each operation (name plus optional overload) to its
//! ordered argument and return lists. The compiler only reads it; it never
//! checks the catalog's internal consistency beyond keying.

use std::fmt;

use rustc_hash::FxHashMap;

/// Type of a signature slot or captured value, spelled in the target
/// expression language by its `Display` impl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Tensor,
    TensorList,
    Scalar,
    ScalarType,
    Shape,
    Device,
    TensorOptions,
    Int,
    Float,
    Bool,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Tensor => write!(f, "Tensor"),
            ValueType::TensorList => write!(f, "TensorList"),
            ValueType::Scalar => write!(f, "Scalar"),
            ValueType::ScalarType => write!(f, "ScalarType"),
            ValueType::Shape => write!(f, "Shape"),
            ValueType::Device => write!(f, "Device"),
            ValueType::TensorOptions => write!(f, "TensorOptions"),
            ValueType::Int => write!(f, "int"),
            ValueType::Float => write!(f, "float"),
            ValueType::Bool => write!(f, "bool"),
        }
    }
}

/// A named, typed operation argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub name: String,
    pub ty: ValueType,
}

impl Argument {
    pub fn new(name: impl Into<String>, ty: ValueType) -> Self {
        Argument {
            name: name.into(),
            ty,
        }
    }
}

/// A return slot. The name is optional; unnamed slots are referenced in
/// formulas through [`OpSignature::return_ref_name`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Return {
    pub name: Option<String>,
    pub ty: ValueType,
}

impl Return {
    pub fn named(name: impl Into<String>, ty: ValueType) -> Self {
        Return {
            name: Some(name.into()),
            ty,
        }
    }

    pub fn unnamed(ty: ValueType) -> Self {
        Return { name: None, ty }
    }
}

/// The typed signature of one numeric operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpSignature {
    pub name: String,
    pub overload: Option<String>,
    pub arguments: Vec<Argument>,
    pub returns: Vec<Return>,
}

impl OpSignature {
    pub fn new(name: impl Into<String>, arguments: Vec<Argument>, returns: Vec<Return>) -> Self {
        OpSignature {
            name: name.into(),
            overload: None,
            arguments,
            returns,
        }
    }

    pub fn with_overload(mut self, overload: impl Into<String>) -> Self {
        self.overload = Some(overload.into());
        self
    }

    /// Catalog key: `name` or `name.overload`.
    pub fn qualified_name(&self) -> String {
        match &self.overload {
            Some(overload) => format!("{}.{}", self.name, overload),
            None => self.name.clone(),
        }
    }

    /// Look up an argument by name.
    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|a| a.name == name)
    }

    /// The name under which formulas reference return slot `index`: the
    /// declared name if present, `result` for a sole unnamed return, and
    /// `resultN` for unnamed slot N of a multi-return.
    pub fn return_ref_name(&self, index: usize) -> String {
        match self.returns[index].name.as_deref() {
            Some(name) => name.to_string(),
            None if self.returns.len() == 1 => "result".to_string(),
            None => format!("result{}", index),
        }
    }

    /// Find the return slot a formula identifier refers to.
    pub fn return_by_ref_name(&self, name: &str) -> Option<&Return> {
        (0..self.returns.len())
            .find(|&i| self.return_ref_name(i) == name)
            .map(|i| &self.returns[i])
    }
}

/// Registry of operation signatures, keyed by qualified name.
#[derive(Debug, Default)]
pub struct SignatureCatalog {
    signatures: FxHashMap<String, OpSignature>,
}

impl SignatureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a signature, replacing any previous entry under the same
    /// qualified name.
    pub fn insert(&mut self, signature: OpSignature) {
        self.signatures
            .insert(signature.qualified_name(), signature);
    }

    /// Look up the signature for `name` with an optional overload.
    pub fn get(&self, name: &str, overload: Option<&str>) -> Option<&OpSignature> {
        let key = match overload {
            Some(overload) => format!("{}.{}", name, overload),
            None => name.to_string(),
        };
        self.signatures.get(&key)
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

impl FromIterator<OpSignature> for SignatureCatalog {
    fn from_iter<I: IntoIterator<Item = OpSignature>>(iter: I) -> Self {
        let mut catalog = SignatureCatalog::new();
        for signature in iter {
            catalog.insert(signature);
        }
        catalog
    }
}
