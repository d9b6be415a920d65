//! Package-wide reexport and alias index.
//!
//! Built once in Phase 0 from the imports of every file, then frozen and
//! shared read-only by all Phase 1 walks:
//!
//! - [`ReexportIndex`]: import key -> aggregator modules performing that import.
//!   Keys are fully qualified names, whole-module names and `module.*`
//!   wildcard keys, recorded both as written and as resolved.
//! - [`AliasIndex`]: bound name -> candidate qualified names, used to resolve
//!   names the analyzer could not.

use std::collections::{BTreeSet, HashMap};

use tracing::trace;

use apigraph_core::id::module_id_from_path;

use crate::imports::{scan_imports, ImportKind, ImportRecord, ImportScan};
use crate::nodes::{SourceFile, Statement};

// ============================================================================
// Reexport index
// ============================================================================

/// One aggregator import of a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReexportEntry {
    /// Id of the aggregator module performing the import.
    pub module_id: String,
    /// Absolute origin of the imported name.
    pub origin: String,
    pub alias: Option<String>,
    pub kind: ImportKind,
}

impl ReexportEntry {
    /// True if this entry actually denotes `qname` (or a container of it),
    /// rather than a different symbol that shares a key by suffix.
    fn denotes(&self, qname: &str) -> bool {
        match self.kind {
            ImportKind::Wildcard => parent_name(qname) == Some(self.origin.as_str()),
            ImportKind::Module | ImportKind::Symbol => {
                self.origin == qname
                    || (qname.starts_with(&self.origin)
                        && qname[self.origin.len()..].starts_with('.'))
            }
        }
    }

    /// True if the entry reexports exactly `qname` (not a module containing it).
    pub fn is_exact(&self, qname: &str) -> bool {
        self.kind == ImportKind::Symbol && self.origin == qname
    }
}

fn parent_name(qname: &str) -> Option<&str> {
    qname.rfind('.').map(|idx| &qname[..idx])
}

#[derive(Debug, Clone, Default)]
pub struct ReexportIndex {
    entries: HashMap<String, Vec<ReexportEntry>>,
}

impl ReexportIndex {
    /// Record one import of an aggregator module under its written and resolved keys.
    pub fn insert(&mut self, module_id: &str, record: &ImportRecord) {
        let entry = ReexportEntry {
            module_id: module_id.to_string(),
            origin: record.origin.clone(),
            alias: record.alias.clone(),
            kind: record.kind,
        };
        let written = record.written_key();
        let resolved = record.resolved_key();
        if written != resolved {
            self.push(written, entry.clone());
        }
        self.push(resolved, entry);
    }

    fn push(&mut self, key: String, entry: ReexportEntry) {
        let slot = self.entries.entry(key).or_default();
        if !slot.contains(&entry) {
            slot.push(entry);
        }
    }

    pub fn merge(&mut self, other: ReexportIndex) {
        for (key, entries) in other.entries {
            for entry in entries {
                self.push(key.clone(), entry);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All aggregator imports that reexport `qname`, sorted.
    ///
    /// Probes every forward prefix of the dotted path (a containing module was
    /// reexported), every backward suffix (reexported by its own leaf name,
    /// or by a relatively written path), and the wildcard key of each
    /// suffix's parent. Hits that denote a different origin are discarded.
    pub fn query(&self, qname: &str) -> Vec<&ReexportEntry> {
        let parts: Vec<&str> = qname.split('.').collect();
        let n = parts.len();
        let mut keys: Vec<String> = Vec::with_capacity(n * 3);
        for i in 1..=n {
            keys.push(parts[..i].join("."));
        }
        for i in 0..n {
            keys.push(parts[i..].join("."));
            if i + 1 < n {
                keys.push(format!("{}.*", parts[i..n - 1].join(".")));
            }
        }

        let mut hits: BTreeSet<&ReexportEntry> = BTreeSet::new();
        for key in &keys {
            if let Some(entries) = self.entries.get(key) {
                for entry in entries {
                    if entry.denotes(qname) {
                        hits.insert(entry);
                    } else {
                        trace!(key = %key, origin = %entry.origin, qname, "discarded suffix match");
                    }
                }
            }
        }
        hits.into_iter().collect()
    }
}

// ============================================================================
// Alias index
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct AliasIndex {
    candidates: HashMap<String, BTreeSet<String>>,
}

impl AliasIndex {
    pub fn insert(&mut self, name: impl Into<String>, qname: impl Into<String>) {
        self.candidates
            .entry(name.into())
            .or_default()
            .insert(qname.into());
    }

    pub fn merge(&mut self, other: AliasIndex) {
        for (name, qnames) in other.candidates {
            self.candidates.entry(name).or_default().extend(qnames);
        }
    }

    /// Resolve `name` as seen from `current_module`.
    ///
    /// With several candidates, the one sharing the longest dotted prefix with
    /// `current_module` wins; ties go to the lexicographically smallest.
    pub fn resolve(&self, name: &str, current_module: &str) -> Option<&str> {
        let candidates = self.candidates.get(name)?;
        let mut best: Option<(&str, usize)> = None;
        for candidate in candidates {
            let shared = shared_prefix_len(candidate, current_module);
            if best.is_none_or(|(_, len)| shared > len) {
                best = Some((candidate.as_str(), shared));
            }
        }
        if candidates.len() > 1 {
            trace!(name, current_module, chosen = ?best.map(|b| b.0), "ambiguous alias");
        }
        best.map(|(qname, _)| qname)
    }
}

fn shared_prefix_len(a: &str, b: &str) -> usize {
    a.split('.')
        .zip(b.split('.'))
        .take_while(|(x, y)| x == y)
        .count()
}

// ============================================================================
// Phase 0 scan
// ============================================================================

/// What Phase 0 learns from one file.
#[derive(Debug, Clone)]
pub struct FileScan {
    pub module_id: String,
    pub fullname: String,
    pub is_aggregator: bool,
    pub imports: ImportScan,
    /// Module-scope class names -> qualified names.
    pub classes: Vec<(String, String)>,
}

pub fn scan_file(file: &SourceFile) -> FileScan {
    let mut classes = Vec::new();
    collect_classes(&file.body, &mut classes);
    FileScan {
        module_id: module_id_from_path(&file.path),
        fullname: file.fullname.clone(),
        is_aggregator: file.is_aggregator(),
        imports: scan_imports(file),
        classes,
    }
}

fn collect_classes(body: &[Statement], out: &mut Vec<(String, String)>) {
    for stmt in body {
        match stmt {
            Statement::ClassDef(class) => out.push((class.name.clone(), class.fullname.clone())),
            Statement::If(block) | Statement::With(block) => {
                collect_classes(&block.body, out);
                collect_classes(&block.orelse, out);
            }
            Statement::Try(t) => {
                collect_classes(&t.body, out);
                for handler in &t.handlers {
                    collect_classes(&handler.body, out);
                }
                collect_classes(&t.orelse, out);
            }
            _ => {}
        }
    }
}

// ============================================================================
// Builder and frozen index
// ============================================================================

/// Mutable index, filled during Phase 0.
#[derive(Debug, Default)]
pub struct PackageIndexBuilder {
    reexports: ReexportIndex,
    aliases: AliasIndex,
}

impl PackageIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one file's scan into the index. Only aggregators contribute reexports.
    pub fn add_scan(&mut self, scan: &FileScan) {
        for record in &scan.imports.records {
            if scan.is_aggregator {
                self.reexports.insert(&scan.module_id, record);
            }
            if record.kind != ImportKind::Wildcard {
                self.aliases.insert(record.bound_name(), record.origin.clone());
            }
        }
        for (name, qname) in &scan.classes {
            self.aliases.insert(name.clone(), qname.clone());
        }
    }

    pub fn merge(&mut self, other: PackageIndexBuilder) {
        self.reexports.merge(other.reexports);
        self.aliases.merge(other.aliases);
    }

    /// End Phase 0. The frozen index has no mutators.
    pub fn freeze(self) -> PackageIndex {
        PackageIndex {
            reexports: self.reexports,
            aliases: self.aliases,
        }
    }
}

/// Read-only index shared by all Phase 1 walks.
#[derive(Debug, Default)]
pub struct PackageIndex {
    reexports: ReexportIndex,
    aliases: AliasIndex,
}

impl PackageIndex {
    pub fn build(scans: &[FileScan]) -> PackageIndex {
        let mut builder = PackageIndexBuilder::new();
        for scan in scans {
            builder.add_scan(scan);
        }
        builder.freeze()
    }

    pub fn reexports(&self) -> &ReexportIndex {
        &self.reexports
    }

    pub fn aliases(&self) -> &AliasIndex {
        &self.aliases
    }

    /// Ids of the aggregator modules reexporting `qname`, sorted and deduplicated.
    pub fn reexported_by(&self, qname: &str) -> Vec<String> {
        let ids: BTreeSet<&str> = self
            .reexports
            .query(qname)
            .into_iter()
            .map(|e| e.module_id.as_str())
            .collect();
        ids.into_iter().map(str::to_string).collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
