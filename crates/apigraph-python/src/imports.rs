//! Import records and relative-import resolution.
//!
//! Phase 0 of the pipeline only needs the imports of each file, so
//! [`scan_imports`] collects them with a small visitor that never descends
//! into classes or functions.

use apigraph_core::model::{QualifiedImport, WildcardImport};

use crate::nodes::{ClassDef, FuncDef, Import, ImportAll, ImportFrom, SourceFile};
use crate::visitor::{walk_source_file, VisitResult, Visitor};

/// What an import statement binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImportKind {
    /// `import a.b [as c]`
    Module,
    /// `from a import b [as c]`; `b` may itself be a module.
    Symbol,
    /// `from a import *`
    Wildcard,
}

/// One imported name, resolved to its absolute origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImportRecord {
    pub kind: ImportKind,
    /// Absolute dotted origin: the module for `Module`/`Wildcard`, the symbol for `Symbol`.
    pub origin: String,
    /// The module path as written, without leading dots (`_impl` for `from ._impl import X`).
    pub written_module: String,
    /// The imported name as written (`X`), empty for `Module`/`Wildcard`.
    pub name: String,
    pub alias: Option<String>,
    /// Leading dots of a `from` import.
    pub relative: u32,
}

impl ImportRecord {
    /// The name this import binds in the importing module.
    pub fn bound_name(&self) -> &str {
        if let Some(alias) = &self.alias {
            return alias;
        }
        match self.kind {
            ImportKind::Symbol => &self.name,
            ImportKind::Module => self.origin.split('.').next().unwrap_or(&self.origin),
            ImportKind::Wildcard => "*",
        }
    }

    /// The origin as written in the source (relative part kept, dots dropped).
    pub fn written_key(&self) -> String {
        match self.kind {
            ImportKind::Module => self.origin.clone(),
            ImportKind::Wildcard => format!("{}.*", self.written_module),
            ImportKind::Symbol if self.written_module.is_empty() => self.name.clone(),
            ImportKind::Symbol => format!("{}.{}", self.written_module, self.name),
        }
    }

    /// The absolute key: `origin`, or `origin.*` for wildcards.
    pub fn resolved_key(&self) -> String {
        match self.kind {
            ImportKind::Wildcard => format!("{}.*", self.origin),
            _ => self.origin.clone(),
        }
    }
}

/// Resolve `from <dots><module> import ...` against the importing module.
///
/// For an aggregator (`pkg/__init__.py`), one dot means the package itself;
/// for a plain module, one dot means its parent package.
pub fn resolve_relative(
    importer: &str,
    is_aggregator: bool,
    relative: u32,
    module: &str,
) -> String {
    if relative == 0 {
        return module.to_string();
    }
    let mut parts: Vec<&str> = importer.split('.').filter(|p| !p.is_empty()).collect();
    let drop = (if is_aggregator { relative - 1 } else { relative }) as usize;
    parts.truncate(parts.len().saturating_sub(drop));
    if !module.is_empty() {
        parts.push(module);
    }
    parts.join(".")
}

// ============================================================================
// Import scanning
// ============================================================================

/// All imports of one file, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportScan {
    pub records: Vec<ImportRecord>,
}

impl ImportScan {
    pub fn qualified_imports(&self) -> Vec<QualifiedImport> {
        self.records
            .iter()
            .filter(|r| r.kind != ImportKind::Wildcard)
            .map(|r| QualifiedImport {
                qualified_name: r.origin.clone(),
                alias: r.alias.clone(),
            })
            .collect()
    }

    pub fn wildcard_imports(&self) -> Vec<WildcardImport> {
        self.records
            .iter()
            .filter(|r| r.kind == ImportKind::Wildcard)
            .map(|r| WildcardImport {
                module_name: r.origin.clone(),
            })
            .collect()
    }
}

struct ImportCollector<'f> {
    importer: &'f str,
    is_aggregator: bool,
    records: Vec<ImportRecord>,
}

impl<'a> Visitor<'a> for ImportCollector<'_> {
    fn visit_class_def(&mut self, _node: &'a ClassDef) -> VisitResult {
        VisitResult::SkipChildren
    }

    fn visit_func_def(&mut self, _node: &'a FuncDef) -> VisitResult {
        VisitResult::SkipChildren
    }

    fn visit_import(&mut self, node: &'a Import) -> VisitResult {
        for id in &node.ids {
            self.records.push(ImportRecord {
                kind: ImportKind::Module,
                origin: id.name.clone(),
                written_module: id.name.clone(),
                name: String::new(),
                alias: id.alias.clone(),
                relative: 0,
            });
        }
        VisitResult::Continue
    }

    fn visit_import_from(&mut self, node: &'a ImportFrom) -> VisitResult {
        let base = resolve_relative(self.importer, self.is_aggregator, node.relative, &node.module);
        for imported in &node.names {
            let origin = if base.is_empty() {
                imported.name.clone()
            } else {
                format!("{}.{}", base, imported.name)
            };
            self.records.push(ImportRecord {
                kind: ImportKind::Symbol,
                origin,
                written_module: node.module.clone(),
                name: imported.name.clone(),
                alias: imported.alias.clone(),
                relative: node.relative,
            });
        }
        VisitResult::Continue
    }

    fn visit_import_all(&mut self, node: &'a ImportAll) -> VisitResult {
        self.records.push(ImportRecord {
            kind: ImportKind::Wildcard,
            origin: resolve_relative(
                self.importer,
                self.is_aggregator,
                node.relative,
                &node.module,
            ),
            written_module: node.module.clone(),
            name: String::new(),
            alias: None,
            relative: node.relative,
        });
        VisitResult::Continue
    }
}

/// Collect the module-scope imports of a file, including those nested in
/// `if`/`try`/`with` blocks (e.g. `if TYPE_CHECKING:`).
pub fn scan_imports(file: &SourceFile) -> ImportScan {
    let mut collector = ImportCollector {
        importer: &file.fullname,
        is_aggregator: file.is_aggregator(),
        records: Vec::new(),
    };
    walk_source_file(&mut collector, file);
    ImportScan {
        records: collector.records,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::source_file;
    use serde_json::json;

    mod relative {
        use super::*;

        #[test]
        fn aggregator_resolves_one_dot_to_itself() {
            assert_eq!(resolve_relative("pkg.sub", true, 1, "_impl"), "pkg.sub._impl");
            assert_eq!(resolve_relative("pkg.sub", true, 2, "other"), "pkg.other");
        }

        #[test]
        fn module_resolves_one_dot_to_parent() {
            assert_eq!(resolve_relative("pkg.sub.mod", false, 1, "sibling"), "pkg.sub.sibling");
            assert_eq!(resolve_relative("pkg.sub.mod", false, 1, ""), "pkg.sub");
        }

        #[test]
        fn absolute_is_unchanged() {
            assert_eq!(resolve_relative("pkg.mod", false, 0, "os.path"), "os.path");
        }
    }

    mod scanning {
        use super::*;

        fn aggregator() -> SourceFile {
            source_file(json!({
                "path": "pkg/__init__.py",
                "fullname": "pkg",
                "body": [
                    {"node": "import", "ids": [{"name": "os.path"}]},
                    {"node": "import_from", "module": "_impl", "relative": 1,
                     "names": [{"name": "_Hidden", "alias": "Shown"}]},
                    {"node": "if", "body": [
                        {"node": "import_all", "module": "_extra", "relative": 1}
                    ]},
                    {"node": "func_def", "name": "f", "fullname": "pkg.f", "body": [
                        {"node": "import", "ids": [{"name": "json"}]}
                    ]}
                ]
            }))
        }

        #[test]
        fn collects_module_scope_imports_only() {
            let scan = scan_imports(&aggregator());
            let origins: Vec<&str> = scan.records.iter().map(|r| r.origin.as_str()).collect();
            assert_eq!(origins, vec!["os.path", "pkg._impl._Hidden", "pkg._extra"]);
        }

        #[test]
        fn keys_and_bound_names() {
            let scan = scan_imports(&aggregator());
            let symbol = &scan.records[1];
            assert_eq!(symbol.bound_name(), "Shown");
            assert_eq!(symbol.written_key(), "_impl._Hidden");
            assert_eq!(symbol.resolved_key(), "pkg._impl._Hidden");

            let wildcard = &scan.records[2];
            assert_eq!(wildcard.written_key(), "_extra.*");
            assert_eq!(wildcard.resolved_key(), "pkg._extra.*");

            assert_eq!(scan.records[0].bound_name(), "os");
        }

        #[test]
        fn module_records_split_by_kind() {
            let scan = scan_imports(&aggregator());
            assert_eq!(scan.qualified_imports().len(), 2);
            assert_eq!(
                scan.wildcard_imports(),
                vec![WildcardImport {
                    module_name: "pkg._extra".to_string()
                }]
            );
        }
    }
}
