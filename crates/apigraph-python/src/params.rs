//! Parameter lists.

use std::collections::BTreeSet;

use tracing::warn;

use apigraph_core::id::child_id;
use apigraph_core::model::{Parameter, ParameterAssignment};
use apigraph_core::types::AbstractType;

use crate::docstrings::DocstringProvider;
use crate::nodes::{ArgKind, Argument, ClassDef, FuncDef};
use crate::translate::TypeTranslator;

/// How a formal is bound at call sites.
pub fn assignment_kind(argument: &Argument) -> ParameterAssignment {
    if argument.is_self || argument.is_cls {
        return ParameterAssignment::Implicit;
    }
    match argument.kind {
        ArgKind::Star => ParameterAssignment::PositionalVararg,
        ArgKind::Star2 => ParameterAssignment::NamedVararg,
        ArgKind::Named | ArgKind::NamedOpt => ParameterAssignment::NameOnly,
        ArgKind::Pos | ArgKind::Opt if argument.pos_only => ParameterAssignment::PositionOnly,
        ArgKind::Pos | ArgKind::Opt => ParameterAssignment::PositionOrName,
    }
}

/// Build the parameters of `function`, whose id is `function_id`.
///
/// The type comes from the annotation unless it is an uninformative `Any`,
/// then from the literal default. Type variables in annotations are added to
/// `type_vars`.
pub fn build_parameters(
    function: &FuncDef,
    function_id: &str,
    class: Option<&ClassDef>,
    translator: &TypeTranslator<'_>,
    provider: &dyn DocstringProvider,
    type_vars: &mut BTreeSet<AbstractType>,
) -> Vec<Parameter> {
    let mut parameters = Vec::with_capacity(function.arguments.len());
    let mut previous = ParameterAssignment::Implicit;

    for argument in &function.arguments {
        let assigned_by = assignment_kind(argument);
        if assigned_by < previous {
            warn!(
                function = %function.fullname,
                parameter = %argument.name,
                "parameter kinds out of order"
            );
        }
        previous = previous.max(assigned_by);

        let default_value = argument.initializer.as_ref().and_then(|e| e.literal_value());
        let declared = argument.ty.as_ref().and_then(|ty| {
            translator.translate_declared(ty, argument.unanalyzed_type.as_ref(), type_vars)
        });
        let ty = declared.or_else(|| default_value.as_ref().map(|v| v.builtin_type()));

        parameters.push(Parameter {
            id: child_id(function_id, &argument.name),
            name: argument.name.clone(),
            is_optional: argument.initializer.is_some(),
            default_value,
            assigned_by,
            docstring: provider.parameter_docstring(function, class, &argument.name),
            ty,
        });
    }
    parameters
}

// ============================================================================
// Tests
// ============================================================================
