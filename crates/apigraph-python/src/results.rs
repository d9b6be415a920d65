//! Result lists, from the return annotation or by inference over the body.
//!
//! Annotated functions get one result per slot of a tuple annotation (one
//! result otherwise, none for `-> None`). Functions without a usable
//! annotation get their results inferred from the reachable `return`
//! statements, each typed by its shape or by the analyzer's expression type.
//! Tuple shapes are transposed into positional columns, columns shorter
//! than the widest shape are padded with `None`, and each column collapses
//! to one type or a union.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use apigraph_core::id::child_id;
use apigraph_core::model::{FunctionResult, ResultDocstring};
use apigraph_core::types::AbstractType;

use crate::docstrings::DocstringProvider;
use crate::nodes::{ClassDef, Expression, FuncDef, Return, SemType};
use crate::translate::TypeTranslator;
use crate::visitor::{walk_body, VisitResult, Visitor};

/// Build the results of `function`, whose id is `function_id`.
///
/// `owner` is the class a method belongs to; `return self` resolves to it.
pub fn build_results(
    function: &FuncDef,
    function_id: &str,
    owner: Option<&ClassDef>,
    translator: &TypeTranslator<'_>,
    provider: &dyn DocstringProvider,
    type_vars: &mut BTreeSet<AbstractType>,
) -> Vec<FunctionResult> {
    let declared = provider.result_docstrings(function);

    let annotated = function.ret_type.as_ref().and_then(|ty| {
        translator.translate_declared(ty, function.unanalyzed_ret_type.as_ref(), type_vars)
    });
    let slots = match annotated {
        Some(ty) => annotated_slots(ty, function.ret_type.as_ref()),
        None => infer_slots(function, owner, translator, type_vars),
    };

    name_results(function_id, slots, &declared)
}

fn annotated_slots(ty: AbstractType, sem: Option<&SemType>) -> Vec<AbstractType> {
    if matches!(sem, Some(SemType::NoneType)) || ty.is_none() {
        return Vec::new();
    }
    match ty {
        AbstractType::Tuple { types } if !types.is_empty() => types,
        other => vec![other],
    }
}

// ============================================================================
// Inference
// ============================================================================

/// Collects the `return` statements of one function body, skipping nested
/// functions and classes.
#[derive(Default)]
struct ReturnCollector<'a> {
    returns: Vec<&'a Return>,
}

impl<'a> Visitor<'a> for ReturnCollector<'a> {
    fn visit_return_stmt(&mut self, node: &'a Return) -> VisitResult {
        self.returns.push(node);
        VisitResult::Continue
    }

    fn visit_func_def(&mut self, _node: &'a FuncDef) -> VisitResult {
        VisitResult::SkipChildren
    }

    fn visit_class_def(&mut self, _node: &'a ClassDef) -> VisitResult {
        VisitResult::SkipChildren
    }
}

/// The type of a returned expression, or `None` when neither its shape nor
/// the analyzer says anything about it.
pub(crate) fn expression_type(
    expr: &Expression,
    owner: Option<&ClassDef>,
    translator: &TypeTranslator<'_>,
    type_vars: &mut BTreeSet<AbstractType>,
) -> Option<AbstractType> {
    if let Some(ty) = expr.literal_type() {
        return Some(ty);
    }
    let structural = match expr {
        Expression::Name { name, .. } if name == "self" => {
            owner.map(|class| AbstractType::named(class.name.clone(), class.fullname.clone()))
        }
        Expression::Tuple { items } => {
            let types = items
                .iter()
                .map(|item| {
                    expression_type(item, owner, translator, type_vars)
                        .unwrap_or(AbstractType::Unknown)
                })
                .collect();
            Some(AbstractType::tuple(types))
        }
        Expression::List { items } => items
            .iter()
            .map(|item| expression_type(item, owner, translator, type_vars))
            .collect::<Option<Vec<_>>>()
            .map(|types| {
                if types.is_empty() {
                    AbstractType::list(Vec::new())
                } else {
                    AbstractType::list([AbstractType::union(types)])
                }
            }),
        Expression::Op { op, .. } if op == "and" || op == "or" => {
            Some(AbstractType::builtin("bool"))
        }
        Expression::Comparison { .. } => Some(AbstractType::builtin("bool")),
        Expression::Unary { op, .. } if op == "not" => Some(AbstractType::builtin("bool")),
        _ => None,
    };
    structural.or_else(|| {
        let ty = expr.analyzed_type()?;
        translator
            .translate_declared(ty, None, type_vars)
            .filter(|translated| !translated.is_unknown())
    })
}

/// Infer result slots from the body's `return` statements.
///
/// Returns whose type cannot be determined are left out; with none left
/// there are no results.
pub fn infer_slots(
    function: &FuncDef,
    owner: Option<&ClassDef>,
    translator: &TypeTranslator<'_>,
    type_vars: &mut BTreeSet<AbstractType>,
) -> Vec<AbstractType> {
    let mut collector = ReturnCollector::default();
    walk_body(&mut collector, &function.body);

    let mut shapes: BTreeSet<AbstractType> = BTreeSet::new();
    for ret in &collector.returns {
        let shape = match &ret.expr {
            None => Some(AbstractType::none()),
            Some(expr) => expression_type(expr, owner, translator, type_vars),
        };
        match shape {
            Some(shape) => {
                shapes.insert(shape);
            }
            None => debug!(function = %function.fullname, "return type not inferable, skipped"),
        }
    }

    if shapes.iter().all(AbstractType::is_none) {
        return Vec::new();
    }

    if !shapes.iter().any(|s| matches!(s, AbstractType::Tuple { .. })) {
        return vec![AbstractType::union(shapes)];
    }

    let rows: Vec<Vec<AbstractType>> = shapes
        .into_iter()
        .map(|shape| match shape {
            AbstractType::Tuple { types } => types,
            other => vec![other],
        })
        .collect();
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);

    (0..width)
        .map(|column| {
            let mut members: Vec<AbstractType> = Vec::new();
            for row in &rows {
                match row.get(column) {
                    Some(ty) => members.push(ty.clone()),
                    None => members.push(AbstractType::none()),
                }
            }
            AbstractType::union(members)
        })
        .collect()
}

// ============================================================================
// Naming
// ============================================================================

/// Name the slots: a lone declared name for a lone slot, else a declared
/// result of the same type, else `result_N` (counting generated names only).
fn name_results(
    function_id: &str,
    slots: Vec<AbstractType>,
    declared: &[ResultDocstring],
) -> Vec<FunctionResult> {
    if let ([only], [doc]) = (slots.as_slice(), declared) {
        if !doc.name.is_empty() {
            return vec![FunctionResult {
                id: child_id(function_id, &doc.name),
                name: doc.name.clone(),
                ty: only.clone(),
                docstring: Some(doc.clone()),
            }];
        }
    }

    let aligned = declared.len() == slots.len();
    let mut used_docs: HashSet<usize> = HashSet::new();
    let mut names: HashSet<String> = HashSet::new();
    let mut generated = 0;
    let mut results = Vec::with_capacity(slots.len());

    for (position, ty) in slots.into_iter().enumerate() {
        let matched = declared.iter().enumerate().find(|(i, doc)| {
            !used_docs.contains(i)
                && !doc.name.is_empty()
                && !names.contains(&doc.name)
                && doc.ty.as_ref() == Some(&ty)
        });
        let (name, docstring) = match matched {
            Some((i, doc)) => {
                used_docs.insert(i);
                (doc.name.clone(), Some(doc.clone()))
            }
            None => {
                let name = loop {
                    generated += 1;
                    let candidate = format!("result_{}", generated);
                    if !names.contains(&candidate) {
                        break candidate;
                    }
                };
                let docstring = aligned.then(|| declared[position].clone());
                (name, docstring)
            }
        };
        names.insert(name.clone());
        results.push(FunctionResult {
            id: child_id(function_id, &name),
            name,
            ty,
            docstring,
        });
    }
    results
}

// ============================================================================
// Tests
// ============================================================================
