//! Typed program tree nodes.
//!
//! One [`SourceFile`] per analyzed module, as emitted by the semantic
//! analyzer. Names are already resolved to fully qualified names and every
//! typed node carries its resolved [`SemType`]. A few nodes also carry the
//! pre-resolution ("unanalyzed") annotation, for the cases where resolution
//! discards information.

use serde::{Deserialize, Serialize};

use apigraph_core::model::Variance;
use apigraph_core::types::{AbstractType, LiteralValue};

// ============================================================================
// Files and statements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Package-relative path with `/` separators (`pkg/sub/__init__.py`).
    pub path: String,
    /// Dotted module name (`pkg.sub`).
    pub fullname: String,
    #[serde(default)]
    pub docstring: Option<String>,
    #[serde(default)]
    pub body: Vec<Statement>,
}

impl SourceFile {
    /// True for package entry points (`__init__.py` / `__init__.pyi`).
    pub fn is_aggregator(&self) -> bool {
        let file_name = self.path.rsplit('/').next().unwrap_or(&self.path);
        file_name == "__init__.py" || file_name == "__init__.pyi"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Statement {
    ClassDef(ClassDef),
    FuncDef(FuncDef),
    Assignment(Assignment),
    Import(Import),
    ImportFrom(ImportFrom),
    ImportAll(ImportAll),
    Return(Return),
    If(Block),
    For(Block),
    While(Block),
    Try(Try),
    With(Block),
    Expression(ExpressionStatement),
    Pass,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    pub fullname: String,
    /// Fully qualified names of the direct bases.
    #[serde(default)]
    pub bases: Vec<String>,
    /// The analyzer's linearization, including the class itself.
    #[serde(default)]
    pub mro: Vec<String>,
    #[serde(default)]
    pub type_vars: Vec<TypeVarDef>,
    #[serde(default)]
    pub decorators: Vec<String>,
    #[serde(default)]
    pub docstring: Option<String>,
    #[serde(default)]
    pub body: Vec<Statement>,
    #[serde(default)]
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeVarDef {
    pub name: String,
    #[serde(default)]
    pub variance: Variance,
    #[serde(default)]
    pub upper_bound: Option<SemType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncDef {
    pub name: String,
    pub fullname: String,
    #[serde(default)]
    pub arguments: Vec<Argument>,
    /// Resolved return annotation; absent for unannotated functions.
    #[serde(default)]
    pub ret_type: Option<SemType>,
    #[serde(default)]
    pub unanalyzed_ret_type: Option<SemType>,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_class: bool,
    #[serde(default)]
    pub is_property: bool,
    #[serde(default)]
    pub decorators: Vec<String>,
    #[serde(default)]
    pub docstring: Option<String>,
    #[serde(default)]
    pub body: Vec<Statement>,
    #[serde(default)]
    pub line: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgKind {
    /// Positional, required.
    Pos,
    /// Positional with a default.
    Opt,
    /// `*args`
    Star,
    /// Keyword-only, required.
    Named,
    /// Keyword-only with a default.
    NamedOpt,
    /// `**kwargs`
    Star2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    pub kind: ArgKind,
    #[serde(default)]
    pub pos_only: bool,
    #[serde(default)]
    pub is_self: bool,
    #[serde(default)]
    pub is_cls: bool,
    #[serde(default, rename = "type")]
    pub ty: Option<SemType>,
    #[serde(default)]
    pub unanalyzed_type: Option<SemType>,
    #[serde(default)]
    pub initializer: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Targets; several for chained assignment (`a = b = 1`).
    pub lvalues: Vec<Expression>,
    /// Absent for declarations without a value (`x: int`).
    #[serde(default)]
    pub rvalue: Option<Expression>,
    #[serde(default, rename = "type")]
    pub ty: Option<SemType>,
    #[serde(default)]
    pub unanalyzed_type: Option<SemType>,
    #[serde(default)]
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedName {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
}

/// `import a.b [as c]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    pub ids: Vec<ImportedName>,
}

/// `from [.]*module import name [as alias]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFrom {
    #[serde(default)]
    pub module: String,
    #[serde(default)]
    pub relative: u32,
    pub names: Vec<ImportedName>,
}

/// `from [.]*module import *`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportAll {
    #[serde(default)]
    pub module: String,
    #[serde(default)]
    pub relative: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Return {
    #[serde(default)]
    pub expr: Option<Expression>,
}

/// Body of `if`, `for`, `while` and `with` statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub body: Vec<Statement>,
    #[serde(default)]
    pub orelse: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Try {
    #[serde(default)]
    pub body: Vec<Statement>,
    #[serde(default)]
    pub handlers: Vec<Block>,
    #[serde(default)]
    pub orelse: Vec<Statement>,
    #[serde(default)]
    pub finally_body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionStatement {
    pub expr: Expression,
}

// ============================================================================
// Expressions
// ============================================================================

/// Expression nodes. `True`, `False` and `None` are `Name` expressions.
///
/// Non-literal nodes may carry the analyzer's inferred `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "expr", rename_all = "snake_case")]
pub enum Expression {
    Name {
        name: String,
        #[serde(default)]
        fullname: Option<String>,
        #[serde(default, rename = "type")]
        ty: Option<SemType>,
    },
    /// `value.name`
    Member {
        value: Box<Expression>,
        name: String,
        #[serde(default, rename = "type")]
        ty: Option<SemType>,
    },
    Str {
        value: String,
    },
    /// Integers of any size; only those that fit an `i64` are literals.
    Int {
        value: serde_json::Number,
    },
    Float {
        value: f64,
    },
    Tuple {
        items: Vec<Expression>,
    },
    List {
        items: Vec<Expression>,
    },
    Call {
        callee: Box<Expression>,
        #[serde(default, rename = "type")]
        ty: Option<SemType>,
    },
    /// Binary operator, including the boolean `and`/`or`.
    Op {
        op: String,
        left: Box<Expression>,
        right: Box<Expression>,
        #[serde(default, rename = "type")]
        ty: Option<SemType>,
    },
    Comparison {
        #[serde(default)]
        operators: Vec<String>,
    },
    Unary {
        op: String,
        operand: Box<Expression>,
        #[serde(default, rename = "type")]
        ty: Option<SemType>,
    },
    Conditional {
        if_expr: Box<Expression>,
        else_expr: Box<Expression>,
        #[serde(default, rename = "type")]
        ty: Option<SemType>,
    },
    Other {
        #[serde(default, rename = "type")]
        ty: Option<SemType>,
    },
}

impl Expression {
    /// The literal value of this expression, if it is one of the capturable shapes.
    ///
    /// Negated numbers count as literals; every other expression does not.
    pub fn literal_value(&self) -> Option<LiteralValue> {
        match self {
            Expression::Str { value } => Some(LiteralValue::Str(value.clone())),
            Expression::Int { value } => value.as_i64().map(LiteralValue::Int),
            Expression::Float { value } => Some(LiteralValue::Float(
                apigraph_core::types::FloatValue(*value),
            )),
            Expression::Name { name, .. } => match name.as_str() {
                "True" => Some(LiteralValue::Bool(true)),
                "False" => Some(LiteralValue::Bool(false)),
                "None" => Some(LiteralValue::None),
                _ => None,
            },
            Expression::Unary { op, operand, .. } if op == "-" => match operand.literal_value()? {
                LiteralValue::Int(i) => i.checked_neg().map(LiteralValue::Int),
                LiteralValue::Float(f) => Some(LiteralValue::Float(
                    apigraph_core::types::FloatValue(-f.0),
                )),
                _ => None,
            },
            _ => None,
        }
    }

    /// The builtin type of a literal-shaped expression, including integers
    /// too large to capture as a value.
    pub fn literal_type(&self) -> Option<AbstractType> {
        if let Some(literal) = self.literal_value() {
            return Some(literal.builtin_type());
        }
        match self {
            Expression::Int { .. } => Some(AbstractType::builtin("int")),
            Expression::Unary { op, operand, .. } if op == "-" => match operand.as_ref() {
                Expression::Int { .. } => Some(AbstractType::builtin("int")),
                _ => None,
            },
            _ => None,
        }
    }

    /// The type the analyzer inferred for this expression, when it recorded one.
    pub fn analyzed_type(&self) -> Option<&SemType> {
        match self {
            Expression::Name { ty, .. }
            | Expression::Member { ty, .. }
            | Expression::Call { ty, .. }
            | Expression::Op { ty, .. }
            | Expression::Unary { ty, .. }
            | Expression::Conditional { ty, .. }
            | Expression::Other { ty } => ty.as_ref(),
            _ => None,
        }
    }
}

// ============================================================================
// Semantic types
// ============================================================================

/// Why the analyzer produced an `Any`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeOfAny {
    Explicit,
    Unannotated,
    FromAnotherAny,
    FromUnimportedType,
    FromOmittedGenerics,
    FromError,
    Special,
    ImplementationArtifact,
}

impl TypeOfAny {
    /// True when the `Any` says nothing about the program; callers should
    /// fall back to inference instead of recording it.
    pub fn is_uninformative(&self) -> bool {
        matches!(
            self,
            TypeOfAny::Unannotated
                | TypeOfAny::FromAnotherAny
                | TypeOfAny::FromError
                | TypeOfAny::ImplementationArtifact
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SemType {
    Any {
        type_of_any: TypeOfAny,
        /// Fully qualified name of the missing import, for `from_unimported_type`.
        #[serde(default)]
        missing_import_name: Option<String>,
    },
    #[serde(rename = "none")]
    NoneType,
    Instance {
        fullname: String,
        #[serde(default)]
        args: Vec<SemType>,
    },
    Union {
        items: Vec<SemType>,
    },
    Tuple {
        items: Vec<SemType>,
    },
    Callable {
        #[serde(default)]
        arg_types: Vec<SemType>,
        ret_type: Box<SemType>,
    },
    Literal {
        value: LiteralValue,
    },
    TypeVar {
        name: String,
        #[serde(default)]
        fullname: String,
        #[serde(default)]
        upper_bound: Option<Box<SemType>>,
    },
    /// Pre-resolution annotation text (`list[str, int]` before resolution).
    Unbound {
        name: String,
        #[serde(default)]
        args: Vec<SemType>,
    },
    /// `type[X]`
    TypeType {
        item: Box<SemType>,
    },
    Uninhabited,
    Other {
        #[serde(default)]
        description: String,
    },
}

impl SemType {
    /// True for an `Any` that carries no information.
    pub fn is_uninformative_any(&self) -> bool {
        matches!(self, SemType::Any { type_of_any, .. } if type_of_any.is_uninformative())
    }
}
