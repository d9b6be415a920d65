//! Translation of semantic types into the abstract type algebra.
//!
//! [`TypeTranslator::translate`] is a pure function of its inputs: the same
//! semantic type always yields an equal (and equally hashed) [`AbstractType`].
//! Anything it cannot match becomes `Unknown` and is logged at `warn`.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use apigraph_core::types::AbstractType;

use crate::index::AliasIndex;
use crate::nodes::{SemType, TypeOfAny};

const OBJECT: &str = "builtins.object";

/// Unbound (pre-resolution) names that map to builtins without alias lookup.
fn builtin_for_unbound(name: &str) -> Option<&'static str> {
    Some(match name {
        "int" => "int",
        "float" => "float",
        "str" => "str",
        "bool" => "bool",
        "bytes" => "bytes",
        "complex" => "complex",
        "object" => "object",
        "list" | "List" | "typing.List" => "list",
        "set" | "Set" | "typing.Set" => "set",
        "frozenset" | "FrozenSet" | "typing.FrozenSet" => "frozenset",
        "tuple" | "Tuple" | "typing.Tuple" => "tuple",
        "dict" | "Dict" | "typing.Dict" => "dict",
        "None" => "None",
        _ => return None,
    })
}

fn last_component(qname: &str) -> &str {
    qname.rsplit('.').next().unwrap_or(qname)
}

/// Translates semantic types seen from one module.
pub struct TypeTranslator<'i> {
    aliases: &'i AliasIndex,
    module: &'i str,
}

impl<'i> TypeTranslator<'i> {
    pub fn new(aliases: &'i AliasIndex, module: &'i str) -> Self {
        TypeTranslator { aliases, module }
    }

    /// Translate a declared type (annotation) of a parameter, result or attribute.
    ///
    /// Returns `None` for an `Any` that carries no information, so the caller
    /// can fall back to inference. Type variables met on the way are added to
    /// `type_vars`.
    pub fn translate_declared(
        &self,
        ty: &SemType,
        unanalyzed: Option<&SemType>,
        type_vars: &mut BTreeSet<AbstractType>,
    ) -> Option<AbstractType> {
        if ty.is_uninformative_any() {
            return None;
        }
        Some(self.translate(ty, unanalyzed, type_vars))
    }

    pub fn translate(
        &self,
        ty: &SemType,
        unanalyzed: Option<&SemType>,
        type_vars: &mut BTreeSet<AbstractType>,
    ) -> AbstractType {
        match ty {
            SemType::Any {
                type_of_any,
                missing_import_name,
            } => self.translate_any(*type_of_any, missing_import_name.as_deref()),
            SemType::NoneType => AbstractType::none(),
            SemType::Instance { fullname, args } => {
                self.translate_instance(fullname, args, unanalyzed, type_vars)
            }
            SemType::Union { items } => {
                let members: Vec<AbstractType> = items
                    .iter()
                    .map(|item| self.translate(item, None, type_vars))
                    .collect();
                merge_literals(members)
            }
            SemType::Tuple { items } => AbstractType::tuple(self.translate_all(items, type_vars)),
            SemType::Callable { arg_types, ret_type } => AbstractType::callable(
                self.translate_all(arg_types, type_vars),
                self.translate(ret_type, None, type_vars),
            ),
            SemType::Literal { value } => AbstractType::literal([value.clone()]),
            SemType::TypeVar {
                name,
                fullname,
                upper_bound,
            } => self.translate_type_var(name, fullname, upper_bound.as_deref(), type_vars),
            SemType::Unbound { name, args } => self.translate_unbound(name, args, type_vars),
            SemType::TypeType { item } => AbstractType::named_sequence(
                "type",
                "builtins.type",
                vec![self.translate(item, None, type_vars)],
            ),
            SemType::Uninhabited => AbstractType::named("NoReturn", "typing.NoReturn"),
            SemType::Other { description } => {
                warn!(
                    module = self.module,
                    description = %description,
                    "untranslatable type, using Unknown"
                );
                AbstractType::Unknown
            }
        }
    }

    fn translate_all(
        &self,
        items: &[SemType],
        type_vars: &mut BTreeSet<AbstractType>,
    ) -> Vec<AbstractType> {
        items
            .iter()
            .map(|item| self.translate(item, None, type_vars))
            .collect()
    }

    fn translate_any(
        &self,
        type_of_any: TypeOfAny,
        missing_import_name: Option<&str>,
    ) -> AbstractType {
        match (type_of_any, missing_import_name) {
            (TypeOfAny::FromUnimportedType, Some(name)) => self.resolve_missing_import(name),
            (kind, _) if kind.is_uninformative() => AbstractType::Unknown,
            _ => AbstractType::any(),
        }
    }

    /// Follow the import that produced an unresolved `Any` back to a named type.
    fn resolve_missing_import(&self, name: &str) -> AbstractType {
        let leaf = last_component(name);
        let qname = self
            .aliases
            .resolve(leaf, self.module)
            .or_else(|| self.aliases.resolve(name, self.module))
            .unwrap_or(name);
        debug!(name, qname, "resolved unimported type");
        AbstractType::named(last_component(qname), qname)
    }

    fn translate_instance(
        &self,
        fullname: &str,
        args: &[SemType],
        unanalyzed: Option<&SemType>,
        type_vars: &mut BTreeSet<AbstractType>,
    ) -> AbstractType {
        match fullname {
            "builtins.list" | "builtins.set" | "builtins.frozenset" => {
                // A malformed `list[A, B]` resolves to a one-argument list;
                // the unanalyzed form still has every argument.
                let elements = match unanalyzed {
                    Some(SemType::Unbound { args: raw, .. }) if raw.len() > args.len() => raw
                        .iter()
                        .map(|arg| self.translate(arg, None, type_vars))
                        .collect(),
                    _ => self.translate_all(args, type_vars),
                };
                if fullname == "builtins.list" {
                    AbstractType::list(elements)
                } else {
                    AbstractType::set(elements)
                }
            }
            "builtins.tuple" => AbstractType::tuple(self.translate_all(args, type_vars)),
            "builtins.dict" => {
                let mut args = self.translate_all(args, type_vars).into_iter();
                let key = args.next().unwrap_or(AbstractType::Unknown);
                let value = args.next().unwrap_or(AbstractType::Unknown);
                AbstractType::dict(key, value)
            }
            "typing.Final" => {
                let inner = self.translate_all(args, type_vars);
                AbstractType::final_of(AbstractType::union(inner))
            }
            _ if args.is_empty() => AbstractType::named(last_component(fullname), fullname),
            _ => AbstractType::named_sequence(
                last_component(fullname),
                fullname,
                self.translate_all(args, type_vars),
            ),
        }
    }

    fn translate_type_var(
        &self,
        name: &str,
        fullname: &str,
        upper_bound: Option<&SemType>,
        type_vars: &mut BTreeSet<AbstractType>,
    ) -> AbstractType {
        let bound = upper_bound
            .filter(|b| !matches!(b, SemType::Instance { fullname, .. } if fullname == OBJECT));
        if name == "Self" || fullname.ends_with(".Self") {
            return match bound {
                Some(bound) => self.translate(bound, None, type_vars),
                None => AbstractType::Unknown,
            };
        }
        let bound = bound.map(|b| self.translate(b, None, type_vars));
        let type_var = AbstractType::type_var(name, bound);
        type_vars.insert(type_var.clone());
        type_var
    }

    fn translate_unbound(
        &self,
        name: &str,
        args: &[SemType],
        type_vars: &mut BTreeSet<AbstractType>,
    ) -> AbstractType {
        let elements = self.translate_all(args, type_vars);
        match builtin_for_unbound(name) {
            Some("None") => AbstractType::none(),
            Some("list") => AbstractType::list(elements),
            Some("set") | Some("frozenset") => AbstractType::set(elements),
            Some("tuple") => AbstractType::tuple(elements),
            Some("dict") => {
                let mut elements = elements.into_iter();
                AbstractType::dict(
                    elements.next().unwrap_or(AbstractType::Unknown),
                    elements.next().unwrap_or(AbstractType::Unknown),
                )
            }
            Some(builtin) => AbstractType::builtin(builtin),
            None => {
                let qname = self.aliases.resolve(name, self.module).unwrap_or(name);
                if elements.is_empty() {
                    AbstractType::named(last_component(qname), qname)
                } else {
                    AbstractType::named_sequence(last_component(qname), qname, elements)
                }
            }
        }
    }
}

/// Union members that are all literals collapse into one `Literal`.
fn merge_literals(members: Vec<AbstractType>) -> AbstractType {
    if !members.is_empty() && members.iter().all(|m| matches!(m, AbstractType::Literal { .. })) {
        let literals = members.into_iter().flat_map(|m| match m {
            AbstractType::Literal { literals } => literals,
            _ => Vec::new(),
        });
        return AbstractType::literal(literals);
    }
    AbstractType::union(members)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{instance, sem_type};
    use apigraph_core::types::LiteralValue;
    use serde_json::json;

    fn translate(value: serde_json::Value) -> AbstractType {
        let aliases = AliasIndex::default();
        let translator = TypeTranslator::new(&aliases, "pkg.mod");
        translator.translate(&sem_type(value), None, &mut BTreeSet::new())
    }

    mod builtins {
        use super::*;

        #[test]
        fn scalars_map_to_named() {
            assert_eq!(translate(instance("builtins.int")), AbstractType::builtin("int"));
            assert_eq!(translate(json!({"kind": "none"})), AbstractType::none());
        }

        #[test]
        fn containers_recurse() {
            let ty = translate(json!({
                "kind": "instance", "fullname": "builtins.dict",
                "args": [instance("builtins.str"),
                         {"kind": "instance", "fullname": "builtins.list",
                          "args": [instance("builtins.int")]}]
            }));
            assert_eq!(
                ty,
                AbstractType::dict(
                    AbstractType::builtin("str"),
                    AbstractType::list(vec![AbstractType::builtin("int")])
                )
            );
        }

        #[test]
        fn user_generics_become_named_sequences() {
            let ty = translate(json!({
                "kind": "instance", "fullname": "pkg.box.Box", "args": [instance("builtins.int")]
            }));
            assert_eq!(
                ty,
                AbstractType::named_sequence(
                    "Box",
                    "pkg.box.Box",
                    vec![AbstractType::builtin("int")]
                )
            );
            assert_eq!(
                translate(instance("pkg.box.Box")),
                AbstractType::named("Box", "pkg.box.Box")
            );
        }
    }

    mod special_cases {
        use super::*;

        #[test]
        fn malformed_list_uses_unanalyzed_arguments() {
            let aliases = AliasIndex::default();
            let translator = TypeTranslator::new(&aliases, "pkg.mod");
            let resolved = sem_type(json!({
                "kind": "instance", "fullname": "builtins.list", "args": [instance("builtins.str")]
            }));
            let raw = sem_type(json!({
                "kind": "unbound", "name": "list",
                "args": [{"kind": "unbound", "name": "str"}, {"kind": "unbound", "name": "int"}]
            }));
            let ty = translator.translate(&resolved, Some(&raw), &mut BTreeSet::new());
            assert_eq!(
                ty,
                AbstractType::list(vec![AbstractType::builtin("str"), AbstractType::builtin("int")])
            );
        }

        #[test]
        fn self_collapses_to_bound() {
            let ty = translate(json!({
                "kind": "type_var", "name": "Self", "fullname": "typing.Self",
                "upper_bound": instance("pkg.mod.Node")
            }));
            assert_eq!(ty, AbstractType::named("Node", "pkg.mod.Node"));
        }

        #[test]
        fn object_bound_means_no_bound_and_is_collected() {
            let aliases = AliasIndex::default();
            let translator = TypeTranslator::new(&aliases, "pkg.mod");
            let mut vars = BTreeSet::new();
            let ty = translator.translate(
                &sem_type(json!({
                    "kind": "type_var", "name": "T", "fullname": "pkg.mod.T",
                    "upper_bound": instance("builtins.object")
                })),
                None,
                &mut vars,
            );
            assert_eq!(ty, AbstractType::type_var("T", None));
            assert!(vars.contains(&ty));
        }

        #[test]
        fn literal_unions_merge() {
            let ty = translate(json!({
                "kind": "union",
                "items": [{"kind": "literal", "value": "a"}, {"kind": "literal", "value": "b"}]
            }));
            assert_eq!(
                ty,
                AbstractType::literal(vec![
                    LiteralValue::Str("a".to_string()),
                    LiteralValue::Str("b".to_string())
                ])
            );
        }

        #[test]
        fn final_wraps_argument() {
            let ty = translate(json!({
                "kind": "instance", "fullname": "typing.Final", "args": [instance("builtins.int")]
            }));
            assert_eq!(ty, AbstractType::final_of(AbstractType::builtin("int")));
        }

        #[test]
        fn unknown_shapes_fall_back() {
            assert!(translate(json!({"kind": "other", "description": "ParamSpec"})).is_unknown());
        }
    }

    mod any_disambiguation {
        use super::*;

        #[test]
        fn uninformative_any_is_skipped_for_declarations() {
            let aliases = AliasIndex::default();
            let translator = TypeTranslator::new(&aliases, "pkg.mod");
            let any = sem_type(json!({"kind": "any", "type_of_any": "unannotated"}));
            assert_eq!(translator.translate_declared(&any, None, &mut BTreeSet::new()), None);
        }

        #[test]
        fn explicit_any_is_named() {
            assert_eq!(
                translate(json!({"kind": "any", "type_of_any": "explicit"})),
                AbstractType::any()
            );
        }

        #[test]
        fn unimported_type_follows_alias() {
            let mut aliases = AliasIndex::default();
            aliases.insert("Frame", "dataframes.core.Frame");
            let translator = TypeTranslator::new(&aliases, "pkg.mod");
            let ty = translator.translate(
                &sem_type(json!({
                    "kind": "any", "type_of_any": "from_unimported_type",
                    "missing_import_name": "dataframes.Frame"
                })),
                None,
                &mut BTreeSet::new(),
            );
            assert_eq!(ty, AbstractType::named("Frame", "dataframes.core.Frame"));
        }
    }

    #[test]
    fn translation_is_repeatable_and_reparses() {
        let value = json!({
            "kind": "callable",
            "arg_types": [{"kind": "union", "items": [instance("builtins.int"), {"kind": "none"}]}],
            "ret_type": {"kind": "tuple",
                         "items": [instance("builtins.str"), instance("builtins.bool")]}
        });
        let first = translate(value.clone());
        let second = translate(value);
        assert_eq!(first, second);
        let text = serde_json::to_string(&first).unwrap();
        let back: AbstractType = serde_json::from_str(&text).unwrap();
        assert_eq!(back, first);
    }
}
