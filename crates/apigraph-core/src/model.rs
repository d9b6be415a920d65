//! Entities of the API model.
//!
//! Entities reference each other only by id (see [`crate::id`]); there are no
//! embedded object pointers. The registries in [`crate::api::Api`] own every
//! entity and provide id -> entity lookup.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{AbstractType, LiteralValue};

// ============================================================================
// Modules and imports
// ============================================================================

/// `import a.b [as c]` or `from a import b [as c]`, recorded as the
/// fully qualified imported name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedImport {
    pub qualified_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// `from a import *`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WildcardImport {
    pub module_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    /// The last dotted component of the module name.
    pub name: String,
    pub docstring: String,
    pub qualified_imports: Vec<QualifiedImport>,
    pub wildcard_imports: Vec<WildcardImport>,
    pub classes: Vec<String>,
    pub functions: Vec<String>,
    pub enums: Vec<String>,
}

// ============================================================================
// Classes
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variance {
    #[default]
    Invariant,
    Covariant,
    Contravariant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeParameter {
    pub name: String,
    pub variance: Variance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound: Option<AbstractType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassDocstring {
    pub description: String,
    pub full_docstring: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub id: String,
    pub name: String,
    pub qualified_name: String,
    /// Qualified names of the direct base classes, in declaration order.
    pub superclasses: Vec<String>,
    pub is_public: bool,
    /// True for subclasses of `BaseException`; the stub generator skips them.
    pub is_exception: bool,
    pub docstring: ClassDocstring,
    /// Id of the `__init__` function, if the class declares one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constructor: Option<String>,
    /// Full docstring of the constructor, kept for providers that document
    /// parameters on `__init__` instead of on the class.
    pub constructor_full_docstring: String,
    pub attributes: Vec<String>,
    pub methods: Vec<String>,
    pub classes: Vec<String>,
    pub type_parameters: Vec<TypeParameter>,
    /// Ids of the aggregator modules that reexport this class.
    pub reexported_by: Vec<String>,
}

// ============================================================================
// Functions, parameters and results
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionDocstring {
    pub description: String,
    pub full_docstring: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub id: String,
    pub name: String,
    pub qualified_name: String,
    pub is_public: bool,
    pub is_static: bool,
    pub is_class_method: bool,
    pub is_property: bool,
    pub docstring: FunctionDocstring,
    pub parameters: Vec<String>,
    pub results: Vec<String>,
    /// Free type variables of the signature.
    pub type_var_types: BTreeSet<AbstractType>,
    pub reexported_by: Vec<String>,
}

/// How an argument is bound to a parameter.
///
/// The declaration order is the only legal order within one parameter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParameterAssignment {
    /// The implicit receiver (`self` / `cls`).
    Implicit,
    PositionOnly,
    PositionOrName,
    /// `*args`
    PositionalVararg,
    NameOnly,
    /// `**kwargs`
    NamedVararg,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterDocstring {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<AbstractType>,
    pub default_value: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub id: String,
    pub name: String,
    pub is_optional: bool,
    /// Present only for literal initializers; `Some(LiteralValue::None)` is
    /// an explicit `None` default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<LiteralValue>,
    pub assigned_by: ParameterAssignment,
    pub docstring: ParameterDocstring,
    /// `None` when the type could not be determined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<AbstractType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultDocstring {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<AbstractType>,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResult {
    pub id: String,
    pub name: String,
    pub ty: AbstractType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<ResultDocstring>,
}

// ============================================================================
// Attributes
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeDocstring {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<AbstractType>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: String,
    pub name: String,
    pub is_public: bool,
    /// True for class-body assignments, false for `self.x = ...` in `__init__`.
    pub is_static: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<AbstractType>,
    pub docstring: AttributeDocstring,
}

// ============================================================================
// Enums
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enum {
    pub id: String,
    pub name: String,
    pub qualified_name: String,
    pub is_public: bool,
    pub docstring: ClassDocstring,
    pub instances: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumInstance {
    pub id: String,
    pub name: String,
}
