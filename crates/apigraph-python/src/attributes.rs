//! Attributes and enum instances from assignment statements.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use apigraph_core::id::child_id;
use apigraph_core::model::{Attribute, EnumInstance};
use apigraph_core::types::AbstractType;

use crate::docstrings::DocstringProvider;
use crate::nodes::{Assignment, ClassDef, Expression};
use crate::translate::TypeTranslator;
use crate::visibility::{Container, VisibilityResolver};

/// One name bound by an assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Target<'a> {
    pub name: &'a str,
    /// The matching part of the right-hand side, when it can be paired.
    pub value: Option<&'a Expression>,
    /// False for names bound by destructuring.
    pub whole: bool,
}

/// The names an assignment binds.
///
/// With `receiver` set (`self` inside `__init__`), only `receiver.x` member
/// targets count; otherwise only plain names do. Tuple and list targets are
/// destructured, pairing each element with the matching element of a tuple
/// or list value of the same length.
pub fn assignment_targets<'a>(
    assignment: &'a Assignment,
    receiver: Option<&str>,
) -> Vec<Target<'a>> {
    let mut targets = Vec::new();
    for lvalue in &assignment.lvalues {
        collect_targets(lvalue, assignment.rvalue.as_ref(), receiver, true, &mut targets);
    }
    targets
}

fn collect_targets<'a>(
    lvalue: &'a Expression,
    value: Option<&'a Expression>,
    receiver: Option<&str>,
    whole: bool,
    out: &mut Vec<Target<'a>>,
) {
    match (lvalue, receiver) {
        (Expression::Name { name, .. }, None) => out.push(Target { name, value, whole }),
        (Expression::Member { value: base, name, .. }, Some(receiver)) => {
            if matches!(base.as_ref(), Expression::Name { name: bound, .. } if bound == receiver) {
                out.push(Target { name, value, whole });
            }
        }
        (Expression::Tuple { items } | Expression::List { items }, _) => {
            let values = match value {
                Some(Expression::Tuple { items: values } | Expression::List { items: values })
                    if values.len() == items.len() =>
                {
                    Some(values)
                }
                _ => None,
            };
            for (i, item) in items.iter().enumerate() {
                let paired = values.and_then(|v| v.get(i));
                collect_targets(item, paired, receiver, false, out);
            }
        }
        _ => {}
    }
}

/// Everything attribute construction needs from the owning class.
pub struct AttributeContext<'c, 'i> {
    pub class_id: &'c str,
    pub class: &'c ClassDef,
    pub class_is_public: bool,
    /// `Some("self")` for constructor assignments, `None` for the class body.
    pub receiver: Option<&'c str>,
    pub translator: &'c TypeTranslator<'i>,
    pub provider: &'c dyn DocstringProvider,
    pub visibility: &'c VisibilityResolver<'i>,
}

impl AttributeContext<'_, '_> {
    /// Attributes bound by `assignment`, skipping names already in `seen`.
    pub fn build(
        &self,
        assignment: &Assignment,
        seen: &mut HashSet<String>,
        type_vars: &mut BTreeSet<AbstractType>,
    ) -> Vec<Attribute> {
        let mut attributes = Vec::new();
        for target in assignment_targets(assignment, self.receiver) {
            if !seen.insert(target.name.to_string()) {
                debug!(
                    class = %self.class.fullname,
                    attribute = target.name,
                    "attribute already recorded"
                );
                continue;
            }
            let declared = if target.whole {
                assignment.ty.as_ref().and_then(|ty| {
                    self.translator
                        .translate_declared(ty, assignment.unanalyzed_type.as_ref(), type_vars)
                })
            } else {
                None
            };
            let ty = declared.or_else(|| target.value.and_then(Expression::literal_type));
            let qname = format!("{}.{}", self.class.fullname, target.name);
            attributes.push(Attribute {
                id: child_id(self.class_id, target.name),
                name: target.name.to_string(),
                is_public: self.visibility.is_public(
                    target.name,
                    &qname,
                    Container::Class {
                        is_public: self.class_is_public,
                    },
                ),
                is_static: self.receiver.is_none(),
                ty,
                docstring: self.provider.attribute_docstring(self.class, target.name),
            });
        }
        attributes
    }
}

/// Enum instances bound by a class-body assignment of an enum.
pub fn build_enum_instances(
    assignment: &Assignment,
    enum_id: &str,
    seen: &mut HashSet<String>,
) -> Vec<EnumInstance> {
    assignment_targets(assignment, None)
        .into_iter()
        .filter(|target| seen.insert(target.name.to_string()))
        .map(|target| EnumInstance {
            id: child_id(enum_id, target.name),
            name: target.name.to_string(),
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
