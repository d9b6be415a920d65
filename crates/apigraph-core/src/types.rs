//! The abstract type algebra.
//!
//! Every type in the API model is one [`AbstractType`]. The set of variants
//! is closed, and every variant is structurally comparable, hashable and
//! ordered by content. Downstream consumers rely on this to deduplicate
//! literal sets, recognize `T | None` shapes and sort unions.
//!
//! # Canonical forms
//!
//! The constructors [`AbstractType::union`], [`AbstractType::set`] and
//! [`AbstractType::literal`] sort and deduplicate their members, so two
//! unions with the same members in a different order compare and hash
//! equal. `List` and `Tuple` keep their declaration order.
//!
//! # Serialization
//!
//! Types serialize as internally tagged JSON objects (`{"kind": "named", ...}`).

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Qualified name of the `None` type.
pub const NONE_QNAME: &str = "builtins.None";

/// Qualified name of `typing.Any`.
pub const ANY_QNAME: &str = "typing.Any";

// ============================================================================
// Scalar values
// ============================================================================

/// A float compared by total order.
///
/// Plain `f64` is neither `Eq` nor `Hash`; this wrapper makes literal values
/// and boundaries usable as set members.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FloatValue(pub f64);

impl PartialEq for FloatValue {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for FloatValue {}

impl PartialOrd for FloatValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for FloatValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for FloatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// A literal value: the payload of `Literal[...]` types and of parameter defaults.
///
/// Serialized untagged: `true`, `1`, `1.5`, `"text"`, `null`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Bool(bool),
    Int(i64),
    Float(FloatValue),
    Str(String),
    /// The explicit `None` sentinel.
    None,
}

impl LiteralValue {
    /// The builtin type a value of this literal has.
    pub fn builtin_type(&self) -> AbstractType {
        match self {
            LiteralValue::Bool(_) => AbstractType::builtin("bool"),
            LiteralValue::Int(_) => AbstractType::builtin("int"),
            LiteralValue::Float(_) => AbstractType::builtin("float"),
            LiteralValue::Str(_) => AbstractType::builtin("str"),
            LiteralValue::None => AbstractType::none(),
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Bool(true) => write!(f, "True"),
            LiteralValue::Bool(false) => write!(f, "False"),
            LiteralValue::Int(i) => write!(f, "{}", i),
            LiteralValue::Float(v) => write!(f, "{}", v),
            LiteralValue::Str(s) => write!(f, "{:?}", s),
            LiteralValue::None => write!(f, "None"),
        }
    }
}

/// Numeric base of a docstring-mined [`AbstractType::Boundary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryBase {
    Int,
    Float,
}

impl BoundaryBase {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoundaryBase::Int => "int",
            BoundaryBase::Float => "float",
        }
    }
}

// ============================================================================
// AbstractType
// ============================================================================

/// A structural type in the API model.
///
/// `Enum` and `Boundary` are constraint types mined from docstrings; the
/// type translator never produces them from code types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AbstractType {
    /// The type could not be determined.
    Unknown,
    /// A plain named type (`int`, `pkg.mod.Class`).
    Named { name: String, qname: String },
    /// A generic instance of a user type (`Mapping[str, int]`).
    NamedSequence {
        name: String,
        qname: String,
        types: Vec<AbstractType>,
    },
    /// A set of admissible string values (`{'a', 'b'}` in a docstring).
    Enum { values: BTreeSet<String> },
    /// A numeric range (`in the range [0, 1)` in a docstring).
    Boundary {
        base: BoundaryBase,
        min: Option<FloatValue>,
        min_inclusive: bool,
        max: Option<FloatValue>,
        max_inclusive: bool,
    },
    List { types: Vec<AbstractType> },
    Set { types: Vec<AbstractType> },
    Tuple { types: Vec<AbstractType> },
    Union { types: Vec<AbstractType> },
    Dict {
        key: Box<AbstractType>,
        value: Box<AbstractType>,
    },
    Callable {
        parameter_types: Vec<AbstractType>,
        return_type: Box<AbstractType>,
    },
    Literal { literals: Vec<LiteralValue> },
    Final { inner: Box<AbstractType> },
    TypeVar {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        upper_bound: Option<Box<AbstractType>>,
    },
}

impl AbstractType {
    /// Create a named type.
    pub fn named(name: impl Into<String>, qname: impl Into<String>) -> Self {
        AbstractType::Named {
            name: name.into(),
            qname: qname.into(),
        }
    }

    /// Create a named builtin type (`int` -> `builtins.int`).
    pub fn builtin(name: &str) -> Self {
        AbstractType::named(name, format!("builtins.{}", name))
    }

    /// The `None` type.
    pub fn none() -> Self {
        AbstractType::named("None", NONE_QNAME)
    }

    /// The explicit `Any` type.
    pub fn any() -> Self {
        AbstractType::named("Any", ANY_QNAME)
    }

    /// Create a generic instance of a user type.
    pub fn named_sequence(
        name: impl Into<String>,
        qname: impl Into<String>,
        types: Vec<AbstractType>,
    ) -> Self {
        AbstractType::NamedSequence {
            name: name.into(),
            qname: qname.into(),
            types,
        }
    }

    /// Create a union. Nested unions are flattened and members deduplicated.
    ///
    /// A single member collapses to that member; no members yield `Unknown`.
    pub fn union(types: impl IntoIterator<Item = AbstractType>) -> Self {
        let mut members = BTreeSet::new();
        for ty in types {
            match ty {
                AbstractType::Union { types } => members.extend(types),
                other => {
                    members.insert(other);
                }
            }
        }
        let mut iter = members.into_iter();
        match (iter.next(), iter.next()) {
            (None, _) => AbstractType::Unknown,
            (Some(only), None) => only,
            (Some(first), Some(second)) => {
                let mut types = vec![first, second];
                types.extend(iter);
                AbstractType::Union { types }
            }
        }
    }

    /// Create a list type over the given element types, in declaration order.
    pub fn list(types: impl IntoIterator<Item = AbstractType>) -> Self {
        AbstractType::List {
            types: types.into_iter().collect(),
        }
    }

    /// Create a set type over the given element types.
    pub fn set(types: impl IntoIterator<Item = AbstractType>) -> Self {
        AbstractType::Set {
            types: canonical(types),
        }
    }

    /// Create a tuple type. Positional order is kept.
    pub fn tuple(types: Vec<AbstractType>) -> Self {
        AbstractType::Tuple { types }
    }

    pub fn dict(key: AbstractType, value: AbstractType) -> Self {
        AbstractType::Dict {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn callable(parameter_types: Vec<AbstractType>, return_type: AbstractType) -> Self {
        AbstractType::Callable {
            parameter_types,
            return_type: Box::new(return_type),
        }
    }

    /// Create a literal type; duplicate values collapse.
    pub fn literal(literals: impl IntoIterator<Item = LiteralValue>) -> Self {
        let literals: BTreeSet<LiteralValue> = literals.into_iter().collect();
        AbstractType::Literal {
            literals: literals.into_iter().collect(),
        }
    }

    pub fn final_of(inner: AbstractType) -> Self {
        AbstractType::Final {
            inner: Box::new(inner),
        }
    }

    pub fn type_var(name: impl Into<String>, upper_bound: Option<AbstractType>) -> Self {
        AbstractType::TypeVar {
            name: name.into(),
            upper_bound: upper_bound.map(Box::new),
        }
    }

    /// Create a docstring-mined value set.
    pub fn enum_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AbstractType::Enum {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// True for the `None` type.
    pub fn is_none(&self) -> bool {
        matches!(self, AbstractType::Named { qname, .. } if qname == NONE_QNAME)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, AbstractType::Unknown)
    }

    /// For a `T | None` shape, return `T` (or the union of the non-`None` members).
    ///
    /// Returns `None` if this is not a union containing `None`.
    pub fn split_optional(&self) -> Option<AbstractType> {
        match self {
            AbstractType::Union { types } if types.iter().any(AbstractType::is_none) => Some(
                AbstractType::union(types.iter().filter(|t| !t.is_none()).cloned()),
            ),
            _ => None,
        }
    }

    /// Collect every type variable appearing in this type (including nested ones).
    pub fn collect_type_vars(&self, out: &mut BTreeSet<AbstractType>) {
        match self {
            AbstractType::TypeVar { upper_bound, .. } => {
                out.insert(self.clone());
                if let Some(bound) = upper_bound {
                    bound.collect_type_vars(out);
                }
            }
            AbstractType::NamedSequence { types, .. }
            | AbstractType::List { types }
            | AbstractType::Set { types }
            | AbstractType::Tuple { types }
            | AbstractType::Union { types } => {
                for ty in types {
                    ty.collect_type_vars(out);
                }
            }
            AbstractType::Dict { key, value } => {
                key.collect_type_vars(out);
                value.collect_type_vars(out);
            }
            AbstractType::Callable {
                parameter_types,
                return_type,
            } => {
                for ty in parameter_types {
                    ty.collect_type_vars(out);
                }
                return_type.collect_type_vars(out);
            }
            AbstractType::Final { inner } => inner.collect_type_vars(out),
            AbstractType::Unknown
            | AbstractType::Named { .. }
            | AbstractType::Enum { .. }
            | AbstractType::Boundary { .. }
            | AbstractType::Literal { .. } => {}
        }
    }
}

fn canonical(types: impl IntoIterator<Item = AbstractType>) -> Vec<AbstractType> {
    let set: BTreeSet<AbstractType> = types.into_iter().collect();
    set.into_iter().collect()
}

fn join(f: &mut fmt::Formatter<'_>, types: &[AbstractType], sep: &str) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", ty)?;
    }
    Ok(())
}

impl fmt::Display for AbstractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbstractType::Unknown => write!(f, "Unknown"),
            AbstractType::Named { name, .. } => write!(f, "{}", name),
            AbstractType::NamedSequence { name, types, .. } => {
                write!(f, "{}[", name)?;
                join(f, types, ", ")?;
                write!(f, "]")
            }
            AbstractType::Enum { values } => {
                let quoted: Vec<String> = values.iter().map(|v| format!("{:?}", v)).collect();
                write!(f, "{{{}}}", quoted.join(", "))
            }
            AbstractType::Boundary {
                base,
                min,
                min_inclusive,
                max,
                max_inclusive,
            } => {
                let open = if *min_inclusive { '[' } else { '(' };
                let close = if *max_inclusive { ']' } else { ')' };
                let min = min.map_or_else(|| "-inf".to_string(), |v| v.to_string());
                let max = max.map_or_else(|| "inf".to_string(), |v| v.to_string());
                write!(f, "{} in {}{}, {}{}", base.as_str(), open, min, max, close)
            }
            AbstractType::List { types } => {
                write!(f, "list[")?;
                join(f, types, " | ")?;
                write!(f, "]")
            }
            AbstractType::Set { types } => {
                write!(f, "set[")?;
                join(f, types, " | ")?;
                write!(f, "]")
            }
            AbstractType::Tuple { types } => {
                write!(f, "tuple[")?;
                join(f, types, ", ")?;
                write!(f, "]")
            }
            AbstractType::Union { types } => join(f, types, " | "),
            AbstractType::Dict { key, value } => write!(f, "dict[{}, {}]", key, value),
            AbstractType::Callable {
                parameter_types,
                return_type,
            } => {
                write!(f, "Callable[[")?;
                join(f, parameter_types, ", ")?;
                write!(f, "], {}]", return_type)
            }
            AbstractType::Literal { literals } => {
                let rendered: Vec<String> = literals.iter().map(|l| l.to_string()).collect();
                write!(f, "Literal[{}]", rendered.join(", "))
            }
            AbstractType::Final { inner } => write!(f, "Final[{}]", inner),
            AbstractType::TypeVar { name, .. } => write!(f, "{}", name),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(ty: &AbstractType) -> u64 {
        let mut hasher = DefaultHasher::new();
        ty.hash(&mut hasher);
        hasher.finish()
    }

    mod canonical_forms {
        use super::*;

        #[test]
        fn union_is_order_insensitive() {
            let a = AbstractType::union(vec![AbstractType::builtin("int"), AbstractType::none()]);
            let b = AbstractType::union(vec![AbstractType::none(), AbstractType::builtin("int")]);
            assert_eq!(a, b);
            assert_eq!(hash_of(&a), hash_of(&b));
        }

        #[test]
        fn union_flattens_and_dedups() {
            let inner = AbstractType::union(vec![
                AbstractType::builtin("int"),
                AbstractType::builtin("str"),
            ]);
            let outer = AbstractType::union(vec![inner, AbstractType::builtin("int")]);
            match outer {
                AbstractType::Union { types } => assert_eq!(types.len(), 2),
                other => panic!("expected union, got {:?}", other),
            }
        }

        #[test]
        fn single_member_union_collapses() {
            let ty = AbstractType::union(vec![
                AbstractType::builtin("int"),
                AbstractType::builtin("int"),
            ]);
            assert_eq!(ty, AbstractType::builtin("int"));
        }

        #[test]
        fn empty_union_is_unknown() {
            assert!(AbstractType::union(Vec::new()).is_unknown());
        }

        #[test]
        fn tuple_keeps_order() {
            let int = AbstractType::builtin("int");
            let str = AbstractType::builtin("str");
            let a = AbstractType::tuple(vec![int.clone(), str.clone()]);
            let b = AbstractType::tuple(vec![str, int]);
            assert_ne!(a, b);
        }

        #[test]
        fn list_keeps_declaration_order() {
            let int = AbstractType::builtin("int");
            let str = AbstractType::builtin("str");
            let ty = AbstractType::list(vec![str.clone(), int.clone()]);
            match &ty {
                AbstractType::List { types } => assert_eq!(types, &vec![str.clone(), int.clone()]),
                other => panic!("expected list, got {:?}", other),
            }
            assert_ne!(ty, AbstractType::list(vec![int, str]));
        }

        #[test]
        fn set_is_order_insensitive() {
            let int = AbstractType::builtin("int");
            let str = AbstractType::builtin("str");
            assert_eq!(
                AbstractType::set(vec![str.clone(), int.clone(), str.clone()]),
                AbstractType::set(vec![int, str])
            );
        }

        #[test]
        fn literal_dedups_values() {
            let ty = AbstractType::literal(vec![
                LiteralValue::Str("a".to_string()),
                LiteralValue::Str("a".to_string()),
                LiteralValue::Int(1),
            ]);
            match ty {
                AbstractType::Literal { literals } => assert_eq!(literals.len(), 2),
                other => panic!("expected literal, got {:?}", other),
            }
        }
    }

    mod optional_shapes {
        use super::*;

        #[test]
        fn split_optional_returns_inner() {
            let ty = AbstractType::union(vec![AbstractType::builtin("str"), AbstractType::none()]);
            assert_eq!(ty.split_optional(), Some(AbstractType::builtin("str")));
        }

        #[test]
        fn split_optional_rejects_plain_types() {
            assert_eq!(AbstractType::builtin("str").split_optional(), None);
        }
    }

    mod type_vars {
        use super::*;

        #[test]
        fn collects_nested_type_vars() {
            let t = AbstractType::type_var("T", None);
            let ty = AbstractType::dict(
                AbstractType::builtin("str"),
                AbstractType::list(vec![t.clone()]),
            );
            let mut out = BTreeSet::new();
            ty.collect_type_vars(&mut out);
            assert_eq!(out.into_iter().collect::<Vec<_>>(), vec![t]);
        }
    }

    mod serialization {
        use super::*;

        #[test]
        fn named_type_json_shape() {
            let json = serde_json::to_value(AbstractType::builtin("int")).unwrap();
            assert_eq!(
                json,
                serde_json::json!({"kind": "named", "name": "int", "qname": "builtins.int"})
            );
        }

        #[test]
        fn nested_type_reparses_equal() {
            let ty = AbstractType::callable(
                vec![AbstractType::literal(vec![
                    LiteralValue::Float(FloatValue(0.5)),
                    LiteralValue::Bool(true),
                    LiteralValue::None,
                ])],
                AbstractType::final_of(AbstractType::type_var(
                    "T",
                    Some(AbstractType::builtin("int")),
                )),
            );
            let text = serde_json::to_string(&ty).unwrap();
            let back: AbstractType = serde_json::from_str(&text).unwrap();
            assert_eq!(back, ty);
            assert_eq!(hash_of(&back), hash_of(&ty));
        }
    }

    mod display {
        use super::*;

        #[test]
        fn renders_python_like_text() {
            let ty = AbstractType::dict(
                AbstractType::builtin("str"),
                AbstractType::union(vec![AbstractType::builtin("int"), AbstractType::none()]),
            );
            assert_eq!(ty.to_string(), "dict[str, None | int]");
        }

        #[test]
        fn renders_boundary() {
            let ty = AbstractType::Boundary {
                base: BoundaryBase::Float,
                min: Some(FloatValue(0.0)),
                min_inclusive: true,
                max: None,
                max_inclusive: false,
            };
            assert_eq!(ty.to_string(), "float in [0.0, inf)");
        }
    }
}
