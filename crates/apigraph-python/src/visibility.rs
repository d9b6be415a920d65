//! Visibility of declarations.
//!
//! A declaration's publicity combines three facts:
//!
//! 1. Naming convention: a leading low line marks internal, except dunder names.
//! 2. Containment: a member of an internal parent is internal. A constructor
//!    is public exactly when its class is.
//! 3. Reexport override: a module-level declaration becomes public when an
//!    aggregator reexports it under a non-internal name, or reexports its
//!    whole module (or `module.*`) and the declaration's own name is not
//!    internal.
//!
//! The override is evaluated first, so it can flip a declaration that rules
//! 1 and 2 would otherwise hide.

use crate::index::PackageIndex;

/// True for names marked internal by convention (`_x`, `__x`), false for dunders.
pub fn is_internal_name(name: &str) -> bool {
    if is_dunder(name) {
        return false;
    }
    name.starts_with('_')
}

fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

/// True if any dotted component of the module name is internal.
pub fn is_internal_module(fullname: &str) -> bool {
    fullname.split('.').any(is_internal_name)
}

/// How a declaration is nested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container<'a> {
    /// Directly in a module.
    Module { fullname: &'a str },
    /// Inside a class (or enum) with the given publicity.
    Class { is_public: bool },
}

pub struct VisibilityResolver<'i> {
    index: &'i PackageIndex,
}

impl<'i> VisibilityResolver<'i> {
    pub fn new(index: &'i PackageIndex) -> Self {
        VisibilityResolver { index }
    }

    /// Publicity of a declaration named `name` with qualified name `qname`.
    pub fn is_public(&self, name: &str, qname: &str, container: Container<'_>) -> bool {
        match container {
            Container::Class { is_public } => is_public && !is_internal_name(name),
            Container::Module { fullname } => {
                if self.reexported_publicly(name, qname) {
                    return true;
                }
                !is_internal_name(name) && !is_internal_module(fullname)
            }
        }
    }

    /// A constructor follows its class.
    pub fn constructor_is_public(&self, class_is_public: bool) -> bool {
        class_is_public
    }

    /// The reexport override.
    pub fn reexported_publicly(&self, name: &str, qname: &str) -> bool {
        self.index.reexports().query(qname).into_iter().any(|entry| {
            if entry.is_exact(qname) {
                let exported_as = entry.alias.as_deref().unwrap_or(name);
                !is_internal_name(exported_as)
            } else {
                !is_internal_name(name)
            }
        })
    }

    /// Aggregator modules reexporting `qname`.
    pub fn reexported_by(&self, qname: &str) -> Vec<String> {
        self.index.reexported_by(qname)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{scan_file, FileScan};
    use crate::test_helpers::source_file;
    use serde_json::json;

    fn index() -> PackageIndex {
        let files = [
            source_file(json!({
                "path": "pkg/__init__.py",
                "fullname": "pkg",
                "body": [
                    {"node": "import_from", "module": "_impl", "relative": 1,
                     "names": [{"name": "_Hidden", "alias": "Shown"},
                               {"name": "_StillHidden"},
                               {"name": "Plain"}]},
                    {"node": "import_all", "module": "_star", "relative": 1}
                ]
            })),
        ];
        let scans: Vec<FileScan> = files.iter().map(scan_file).collect();
        PackageIndex::build(&scans)
    }

    mod naming {
        use super::*;

        #[test]
        fn convention() {
            assert!(is_internal_name("_private"));
            assert!(is_internal_name("__mangled"));
            assert!(!is_internal_name("__init__"));
            assert!(!is_internal_name("public"));
        }

        #[test]
        fn module_components() {
            assert!(is_internal_module("pkg._impl"));
            assert!(is_internal_module("_pkg.api"));
            assert!(!is_internal_module("pkg.__main__"));
            assert!(!is_internal_module("pkg.api"));
        }
    }

    mod resolution {
        use super::*;

        #[test]
        fn alias_reexport_makes_internal_symbol_public() {
            let index = index();
            let resolver = VisibilityResolver::new(&index);
            let module = Container::Module { fullname: "pkg._impl" };
            assert!(resolver.is_public("_Hidden", "pkg._impl._Hidden", module));
            assert_eq!(resolver.reexported_by("pkg._impl._Hidden"), vec!["pkg/__init__"]);
        }

        #[test]
        fn reexport_under_internal_name_stays_internal() {
            let index = index();
            let resolver = VisibilityResolver::new(&index);
            let module = Container::Module { fullname: "pkg._impl" };
            assert!(!resolver.is_public("_StillHidden", "pkg._impl._StillHidden", module));
        }

        #[test]
        fn public_name_in_internal_module_needs_reexport() {
            let index = index();
            let resolver = VisibilityResolver::new(&index);
            let module = Container::Module { fullname: "pkg._impl" };
            assert!(resolver.is_public("Plain", "pkg._impl.Plain", module));
            assert!(!resolver.is_public("Other", "pkg._impl.Other", module));
        }

        #[test]
        fn wildcard_reexport_keeps_internal_members_internal() {
            let index = index();
            let resolver = VisibilityResolver::new(&index);
            let module = Container::Module { fullname: "pkg._star" };
            assert!(resolver.is_public("Api", "pkg._star.Api", module));
            assert!(!resolver.is_public("_helper", "pkg._star._helper", module));
        }

        #[test]
        fn containment() {
            let index = index();
            let resolver = VisibilityResolver::new(&index);
            let private_class = Container::Class { is_public: false };
            let public_class = Container::Class { is_public: true };
            assert!(!resolver.is_public("run", "m._C.run", private_class));
            assert!(resolver.is_public("__len__", "m.C.__len__", public_class));
            assert!(!resolver.is_public("_step", "m.C._step", public_class));
            assert!(resolver.constructor_is_public(true));
            assert!(!resolver.constructor_is_public(false));
        }
    }
}
