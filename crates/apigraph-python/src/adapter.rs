// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Declaration-stack adapter: turns one typed tree into an [`Api`] fragment.
//!
//! The walker in [`crate::visitor`] calls paired `visit_*` / `leave_*` hooks.
//! The adapter keeps an explicit stack of in-progress declarations:
//!
//! - `visit_*` pushes a partial declaration (a [`Frame`]).
//! - `leave_*` pops it, finishes it, registers it and attaches its id to the
//!   new top of the stack (its parent).
//!
//! # Attachment
//!
//! | Child      | Module        | Class                     | Enum      |
//! |------------|---------------|---------------------------|-----------|
//! | class      | `classes`     | `classes`                 | skipped   |
//! | enum       | `enums`       | the module's `enums`      | skipped   |
//! | function   | `functions`   | `methods` / `constructor` | skipped   |
//! | assignment | nothing       | `attributes`              | instances |
//!
//! Assignments inside `__init__` that bind `self.x` become attributes of the
//! enclosing class. Declarations nested inside functions are skipped, and so
//! is any declaration whose id is already taken in the file (first
//! definition wins).
//!
//! # Errors
//!
//! Popping a frame of the wrong kind, an assignment whose parent is another
//! assignment, or a stack that is not empty after the module is popped all
//! mean the walker and the adapter disagree. Those are [`AdapterError`]s and
//! abort the file. Everything else (untranslatable types, missing
//! docstrings) degrades to `Unknown` or empty fields.
//!
//! An adapter is single-use: [`Adapter::run`] creates one per file.

use std::collections::{BTreeSet, HashSet};

use thiserror::Error;
use tracing::{debug, trace};

use apigraph_core::api::Api;
use apigraph_core::id::{child_id, module_id_from_path};
use apigraph_core::model::{Class, Enum, Function, Module, TypeParameter};

use crate::attributes::{build_enum_instances, AttributeContext};
use crate::docstrings::{clean, DocstringProvider};
use crate::imports::scan_imports;
use crate::index::PackageIndex;
use crate::nodes::{Assignment, ClassDef, FuncDef, SemType, SourceFile, Statement};
use crate::params::build_parameters;
use crate::results::build_results;
use crate::translate::TypeTranslator;
use crate::visibility::{Container, VisibilityResolver};
use crate::visitor::{walk_source_file, VisitResult, Visitor};

// ============================================================================
// Errors
// ============================================================================

/// Fatal desynchronization between the walker and the adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error("declaration stack underflow")]
    StackUnderflow,

    #[error("expected a {expected} frame on leave, found {found}")]
    UnexpectedFrame {
        expected: &'static str,
        found: &'static str,
    },

    #[error("assignment frame has an invalid parent: {parent}")]
    InvalidAssignmentParent { parent: &'static str },

    #[error("{remaining} frame(s) still open after leaving the module")]
    UnbalancedStack { remaining: usize },
}

pub type AdapterResult<T> = Result<T, AdapterError>;

// ============================================================================
// Frames
// ============================================================================

const ENUM_BASES: &[&str] = &[
    "enum.Enum",
    "enum.IntEnum",
    "enum.StrEnum",
    "enum.Flag",
    "enum.IntFlag",
];

const EXCEPTION_ROOT: &str = "builtins.BaseException";

fn has_ancestor(node: &ClassDef, candidates: &[&str]) -> bool {
    node.mro
        .iter()
        .chain(node.bases.iter())
        .any(|name| candidates.contains(&name.as_str()))
}

fn is_enum(node: &ClassDef) -> bool {
    has_ancestor(node, ENUM_BASES)
}

fn is_object(ty: &SemType) -> bool {
    matches!(ty, SemType::Instance { fullname, .. } if fullname == "builtins.object")
}

struct ModuleFrame {
    module: Module,
}

struct ClassFrame<'a> {
    class: Class,
    node: &'a ClassDef,
    attribute_names: HashSet<String>,
}

struct FunctionFrame<'a> {
    id: String,
    node: &'a FuncDef,
    is_public: bool,
    /// Reexports only apply to module-level functions.
    module_level: bool,
}

struct EnumFrame<'a> {
    enum_: Enum,
    node: &'a ClassDef,
    instance_names: HashSet<String>,
}

struct AssignmentFrame<'a> {
    node: &'a Assignment,
}

/// One in-progress declaration.
enum Frame<'a> {
    Module(ModuleFrame),
    Class(ClassFrame<'a>),
    Function(FunctionFrame<'a>),
    Enum(EnumFrame<'a>),
    Assignments(AssignmentFrame<'a>),
}

impl Frame<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Frame::Module(_) => "module",
            Frame::Class(_) => "class",
            Frame::Function(_) => "function",
            Frame::Enum(_) => "enum",
            Frame::Assignments(_) => "assignments",
        }
    }

    fn id(&self) -> &str {
        match self {
            Frame::Module(f) => &f.module.id,
            Frame::Class(f) => &f.class.id,
            Frame::Function(f) => &f.id,
            Frame::Enum(f) => &f.enum_.id,
            Frame::Assignments(_) => "",
        }
    }
}

// ============================================================================
// Adapter
// ============================================================================

pub struct Adapter<'a> {
    file: &'a SourceFile,
    visibility: VisibilityResolver<'a>,
    translator: TypeTranslator<'a>,
    provider: &'a dyn DocstringProvider,
    stack: Vec<Frame<'a>>,
    api: Api,
    seen_ids: HashSet<String>,
    /// Declarations being skipped with their subtree.
    suppressed: usize,
    error: Option<AdapterError>,
}

impl<'a> Adapter<'a> {
    pub fn new(
        file: &'a SourceFile,
        index: &'a PackageIndex,
        provider: &'a dyn DocstringProvider,
    ) -> Self {
        Adapter {
            file,
            visibility: VisibilityResolver::new(index),
            translator: TypeTranslator::new(index.aliases(), &file.fullname),
            provider,
            stack: Vec::new(),
            api: Api::default(),
            seen_ids: HashSet::new(),
            suppressed: 0,
            error: None,
        }
    }

    /// Walk `file` and return its entities.
    pub fn run(
        file: &'a SourceFile,
        index: &'a PackageIndex,
        provider: &'a dyn DocstringProvider,
    ) -> AdapterResult<Api> {
        let mut adapter = Adapter::new(file, index, provider);
        walk_source_file(&mut adapter, file);
        adapter.finish()
    }

    fn finish(self) -> AdapterResult<Api> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if !self.stack.is_empty() {
            return Err(AdapterError::UnbalancedStack {
                remaining: self.stack.len(),
            });
        }
        Ok(self.api)
    }

    fn fail(&mut self, error: AdapterError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn flow(&self) -> VisitResult {
        if self.error.is_some() {
            VisitResult::Stop
        } else {
            VisitResult::Continue
        }
    }

    fn pop(&mut self) -> AdapterResult<Frame<'a>> {
        self.stack.pop().ok_or(AdapterError::StackUnderflow)
    }

    fn top(&self) -> AdapterResult<&Frame<'a>> {
        self.stack.last().ok_or(AdapterError::StackUnderflow)
    }

    fn module_frame(&mut self) -> AdapterResult<&mut ModuleFrame> {
        match self.stack.first_mut() {
            Some(Frame::Module(frame)) => Ok(frame),
            Some(other) => Err(AdapterError::UnexpectedFrame {
                expected: "module",
                found: other.kind(),
            }),
            None => Err(AdapterError::StackUnderflow),
        }
    }

    /// Publicity of a declaration pushed onto the current top.
    fn container_visibility(&self, name: &str, qname: &str) -> AdapterResult<bool> {
        let container = match self.top()? {
            Frame::Module(_) => Container::Module {
                fullname: &self.file.fullname,
            },
            Frame::Class(frame) => Container::Class {
                is_public: frame.class.is_public,
            },
            Frame::Enum(frame) => Container::Class {
                is_public: frame.enum_.is_public,
            },
            Frame::Function(_) | Frame::Assignments(_) => return Ok(false),
        };
        Ok(self.visibility.is_public(name, qname, container))
    }

    /// Claim `id` for a new declaration under the current top, or decide to
    /// skip it.
    fn claim(&mut self, name: &str) -> Option<String> {
        let parent = match self.stack.last() {
            Some(frame @ (Frame::Module(_) | Frame::Class(_))) => frame,
            Some(frame) => {
                trace!(parent = frame.kind(), name, "skipping nested declaration");
                return None;
            }
            None => return None,
        };
        let id = child_id(parent.id(), name);
        if !self.seen_ids.insert(id.clone()) {
            debug!(id = %id, "duplicate declaration, keeping the first");
            return None;
        }
        Some(id)
    }

    // ------------------------------------------------------------------------
    // Leave handlers
    // ------------------------------------------------------------------------

    fn finish_module(&mut self) -> AdapterResult<()> {
        let frame = self.pop()?;
        let Frame::Module(frame) = frame else {
            return Err(AdapterError::UnexpectedFrame {
                expected: "module",
                found: frame.kind(),
            });
        };
        if !self.stack.is_empty() {
            return Err(AdapterError::UnbalancedStack {
                remaining: self.stack.len(),
            });
        }
        self.api.add_module(frame.module);
        Ok(())
    }

    fn finish_class(&mut self) -> AdapterResult<()> {
        let frame = self.pop()?;
        match frame {
            Frame::Class(frame) => {
                let id = frame.class.id.clone();
                match self.stack.last_mut() {
                    Some(Frame::Module(parent)) => parent.module.classes.push(id),
                    Some(Frame::Class(parent)) => parent.class.classes.push(id),
                    Some(other) => {
                        return Err(AdapterError::UnexpectedFrame {
                            expected: "module or class",
                            found: other.kind(),
                        })
                    }
                    None => return Err(AdapterError::StackUnderflow),
                }
                self.api.add_class(frame.class);
                Ok(())
            }
            Frame::Enum(frame) => {
                let id = frame.enum_.id.clone();
                self.module_frame()?.module.enums.push(id);
                self.api.add_enum(frame.enum_);
                Ok(())
            }
            other => Err(AdapterError::UnexpectedFrame {
                expected: "class",
                found: other.kind(),
            }),
        }
    }

    fn finish_function(&mut self) -> AdapterResult<()> {
        let frame = self.pop()?;
        let Frame::Function(frame) = frame else {
            return Err(AdapterError::UnexpectedFrame {
                expected: "function",
                found: frame.kind(),
            });
        };
        let node = frame.node;
        let owner = match self.top()? {
            Frame::Class(parent) => Some(parent.node),
            Frame::Module(_) => None,
            other => {
                return Err(AdapterError::UnexpectedFrame {
                    expected: "module or class",
                    found: other.kind(),
                })
            }
        };

        let mut type_vars = BTreeSet::new();
        let parameters = build_parameters(
            node,
            &frame.id,
            owner,
            &self.translator,
            self.provider,
            &mut type_vars,
        );
        let results = build_results(
            node,
            &frame.id,
            owner,
            &self.translator,
            self.provider,
            &mut type_vars,
        );

        let docstring = self.provider.function_docstring(node);
        let function = Function {
            id: frame.id.clone(),
            name: node.name.clone(),
            qualified_name: node.fullname.clone(),
            is_public: frame.is_public,
            is_static: node.is_static,
            is_class_method: node.is_class,
            is_property: node.is_property,
            docstring,
            parameters: parameters.iter().map(|p| p.id.clone()).collect(),
            results: results.iter().map(|r| r.id.clone()).collect(),
            type_var_types: type_vars,
            reexported_by: if frame.module_level {
                self.visibility.reexported_by(&node.fullname)
            } else {
                Vec::new()
            },
        };

        match self.stack.last_mut() {
            Some(Frame::Module(parent)) => parent.module.functions.push(frame.id),
            Some(Frame::Class(parent)) if node.name == "__init__" => {
                parent.class.constructor = Some(frame.id);
                parent.class.constructor_full_docstring = function.docstring.full_docstring.clone();
            }
            Some(Frame::Class(parent)) => parent.class.methods.push(frame.id),
            _ => return Err(AdapterError::StackUnderflow),
        }

        for parameter in parameters {
            self.api.add_parameter(parameter);
        }
        for result in results {
            self.api.add_result(result);
        }
        self.api.add_function(function);
        Ok(())
    }

    fn finish_assignment(&mut self) -> AdapterResult<()> {
        let frame = self.pop()?;
        let Frame::Assignments(frame) = frame else {
            return Err(AdapterError::UnexpectedFrame {
                expected: "assignments",
                found: frame.kind(),
            });
        };
        let assignment = frame.node;
        let mut type_vars = BTreeSet::new();

        let Adapter {
            stack,
            api,
            translator,
            provider,
            visibility,
            ..
        } = self;

        let Some((top, below)) = stack.split_last_mut() else {
            return Err(AdapterError::StackUnderflow);
        };
        match top {
            Frame::Module(_) => {}
            Frame::Class(class_frame) => {
                let context = AttributeContext {
                    class_id: &class_frame.class.id,
                    class: class_frame.node,
                    class_is_public: class_frame.class.is_public,
                    receiver: None,
                    translator,
                    provider: *provider,
                    visibility,
                };
                let attributes =
                    context.build(assignment, &mut class_frame.attribute_names, &mut type_vars);
                for attribute in attributes {
                    class_frame.class.attributes.push(attribute.id.clone());
                    api.add_attribute(attribute);
                }
            }
            Frame::Enum(enum_frame) => {
                let instances = build_enum_instances(
                    assignment,
                    &enum_frame.enum_.id,
                    &mut enum_frame.instance_names,
                );
                for instance in instances {
                    enum_frame.enum_.instances.push(instance.id.clone());
                    api.add_enum_instance(instance);
                }
            }
            Frame::Function(function_frame) => {
                let receiver = function_frame
                    .node
                    .arguments
                    .first()
                    .filter(|arg| arg.is_self)
                    .map(|arg| arg.name.as_str());
                let is_constructor = function_frame.node.name == "__init__";
                let Some(receiver) = receiver.filter(|_| is_constructor) else {
                    return Ok(());
                };
                let Some(Frame::Class(class_frame)) = below.last_mut() else {
                    return Ok(());
                };
                let context = AttributeContext {
                    class_id: &class_frame.class.id,
                    class: class_frame.node,
                    class_is_public: class_frame.class.is_public,
                    receiver: Some(receiver),
                    translator,
                    provider: *provider,
                    visibility,
                };
                let attributes =
                    context.build(assignment, &mut class_frame.attribute_names, &mut type_vars);
                for attribute in attributes {
                    class_frame.class.attributes.push(attribute.id.clone());
                    api.add_attribute(attribute);
                }
            }
            Frame::Assignments(_) => {
                return Err(AdapterError::InvalidAssignmentParent {
                    parent: "assignments",
                })
            }
        }
        Ok(())
    }

    fn type_parameters(&self, node: &ClassDef) -> Vec<TypeParameter> {
        let mut ignored = BTreeSet::new();
        node.type_vars
            .iter()
            .map(|tv| TypeParameter {
                name: tv.name.clone(),
                variance: tv.variance,
                bound: tv
                    .upper_bound
                    .as_ref()
                    .filter(|b| !is_object(b))
                    .map(|b| self.translator.translate(b, None, &mut ignored)),
            })
            .collect()
    }
}

impl<'a> Visitor<'a> for Adapter<'a> {
    fn visit_source_file(&mut self, node: &'a SourceFile) -> VisitResult {
        if !self.stack.is_empty() {
            self.fail(AdapterError::UnbalancedStack {
                remaining: self.stack.len(),
            });
            return VisitResult::Stop;
        }
        let imports = scan_imports(node);
        let id = module_id_from_path(&node.path);
        self.seen_ids.insert(id.clone());
        let name = node.fullname.rsplit('.').next().unwrap_or(&node.fullname);
        self.stack.push(Frame::Module(ModuleFrame {
            module: Module {
                id,
                name: name.to_string(),
                docstring: node.docstring.as_deref().map(clean).unwrap_or_default(),
                qualified_imports: imports.qualified_imports(),
                wildcard_imports: imports.wildcard_imports(),
                classes: Vec::new(),
                functions: Vec::new(),
                enums: Vec::new(),
            },
        }));
        VisitResult::Continue
    }

    fn leave_source_file(&mut self, _node: &'a SourceFile) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.finish_module() {
            self.fail(error);
        }
    }

    fn visit_statement(&mut self, _node: &'a Statement) -> VisitResult {
        self.flow()
    }

    fn visit_class_def(&mut self, node: &'a ClassDef) -> VisitResult {
        let enum_parent = matches!(self.stack.last(), Some(Frame::Enum(_)));
        let id = if enum_parent { None } else { self.claim(&node.name) };
        let Some(id) = id else {
            self.suppressed += 1;
            return VisitResult::SkipChildren;
        };
        let is_public = match self.container_visibility(&node.name, &node.fullname) {
            Ok(is_public) => is_public,
            Err(error) => {
                self.fail(error);
                return VisitResult::Stop;
            }
        };
        let module_level = matches!(self.stack.last(), Some(Frame::Module(_)));
        let reexported_by = if module_level {
            self.visibility.reexported_by(&node.fullname)
        } else {
            Vec::new()
        };

        let frame = if is_enum(node) {
            let docstring = self.provider.class_docstring(node);
            Frame::Enum(EnumFrame {
                enum_: Enum {
                    id,
                    name: node.name.clone(),
                    qualified_name: node.fullname.clone(),
                    is_public,
                    docstring,
                    instances: Vec::new(),
                },
                node,
                instance_names: HashSet::new(),
            })
        } else {
            Frame::Class(ClassFrame {
                class: Class {
                    id,
                    name: node.name.clone(),
                    qualified_name: node.fullname.clone(),
                    superclasses: node.bases.clone(),
                    is_public,
                    is_exception: has_ancestor(node, &[EXCEPTION_ROOT]),
                    docstring: self.provider.class_docstring(node),
                    constructor: None,
                    constructor_full_docstring: String::new(),
                    attributes: Vec::new(),
                    methods: Vec::new(),
                    classes: Vec::new(),
                    type_parameters: self.type_parameters(node),
                    reexported_by,
                },
                node,
                attribute_names: HashSet::new(),
            })
        };
        self.stack.push(frame);
        VisitResult::Continue
    }

    fn leave_class_def(&mut self, _node: &'a ClassDef) {
        if self.suppressed > 0 {
            self.suppressed -= 1;
            return;
        }
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.finish_class() {
            self.fail(error);
        }
    }

    fn visit_func_def(&mut self, node: &'a FuncDef) -> VisitResult {
        let Some(id) = self.claim(&node.name) else {
            self.suppressed += 1;
            return VisitResult::SkipChildren;
        };
        let (is_public, module_level) = match self.stack.last() {
            Some(Frame::Class(parent)) if node.name == "__init__" => {
                (self.visibility.constructor_is_public(parent.class.is_public), false)
            }
            Some(Frame::Class(parent)) => (
                self.visibility.is_public(
                    &node.name,
                    &node.fullname,
                    Container::Class {
                        is_public: parent.class.is_public,
                    },
                ),
                false,
            ),
            _ => match self.container_visibility(&node.name, &node.fullname) {
                Ok(is_public) => (is_public, true),
                Err(error) => {
                    self.fail(error);
                    return VisitResult::Stop;
                }
            },
        };
        self.stack.push(Frame::Function(FunctionFrame {
            id,
            node,
            is_public,
            module_level,
        }));
        VisitResult::Continue
    }

    fn leave_func_def(&mut self, _node: &'a FuncDef) {
        if self.suppressed > 0 {
            self.suppressed -= 1;
            return;
        }
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.finish_function() {
            self.fail(error);
        }
    }

    fn visit_assignment(&mut self, node: &'a Assignment) -> VisitResult {
        if self.error.is_some() {
            return VisitResult::Stop;
        }
        self.stack.push(Frame::Assignments(AssignmentFrame { node }));
        VisitResult::Continue
    }

    fn leave_assignment(&mut self, _node: &'a Assignment) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.finish_assignment() {
            self.fail(error);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docstrings::{GoogleProvider, PlainTextProvider};
    use crate::index::scan_file;
    use crate::test_helpers::{instance, source_file};
    use serde_json::{json, Value};

    fn run_one(value: Value) -> Api {
        let file = source_file(value);
        let index = PackageIndex::build(&[scan_file(&file)]);
        Adapter::run(&file, &index, &PlainTextProvider)
            .unwrap_or_else(|e| panic!("adapter failed: {}", e))
    }

    fn name(n: &str) -> Value {
        json!({"expr": "name", "name": n})
    }

    mod assembly {
        use super::*;

        #[test]
        fn module_class_and_members() {
            let api = run_one(json!({
                "path": "pkg/shapes.py",
                "fullname": "pkg.shapes",
                "docstring": "Shapes.",
                "body": [
                    {"node": "import", "ids": [{"name": "math"}]},
                    {"node": "class_def", "name": "Circle", "fullname": "pkg.shapes.Circle",
                     "bases": ["builtins.object"],
                     "body": [
                        {"node": "assignment", "lvalues": [name("sides")],
                         "rvalue": {"expr": "int", "value": 0}},
                        {"node": "func_def", "name": "__init__",
                         "fullname": "pkg.shapes.Circle.__init__",
                         "arguments": [
                            {"name": "self", "kind": "pos", "is_self": true},
                            {"name": "radius", "kind": "pos", "type": instance("builtins.float")}
                         ],
                         "ret_type": {"kind": "none"},
                         "body": [
                            {"node": "assignment",
                             "lvalues": [
                                 {"expr": "member", "name": "radius", "value": name("self")}
                             ],
                             "rvalue": name("radius")}
                         ]},
                        {"node": "func_def", "name": "area", "fullname": "pkg.shapes.Circle.area",
                         "arguments": [{"name": "self", "kind": "pos", "is_self": true}],
                         "ret_type": instance("builtins.float")}
                     ]},
                    {"node": "func_def", "name": "unit", "fullname": "pkg.shapes.unit"}
                ]
            }));

            let module = &api.modules["pkg/shapes"];
            assert_eq!(module.name, "shapes");
            assert_eq!(module.docstring, "Shapes.");
            assert_eq!(module.classes, vec!["pkg/shapes/Circle"]);
            assert_eq!(module.functions, vec!["pkg/shapes/unit"]);
            assert_eq!(module.qualified_imports.len(), 1);

            let circle = &api.classes["pkg/shapes/Circle"];
            assert!(circle.is_public);
            assert_eq!(circle.constructor.as_deref(), Some("pkg/shapes/Circle/__init__"));
            assert_eq!(circle.methods, vec!["pkg/shapes/Circle/area"]);
            assert_eq!(
                circle.attributes,
                vec!["pkg/shapes/Circle/sides", "pkg/shapes/Circle/radius"]
            );
            assert!(api.attributes["pkg/shapes/Circle/sides"].is_static);
            assert!(!api.attributes["pkg/shapes/Circle/radius"].is_static);

            let init = &api.functions["pkg/shapes/Circle/__init__"];
            assert_eq!(
                init.parameters,
                vec!["pkg/shapes/Circle/__init__/self", "pkg/shapes/Circle/__init__/radius"]
            );
            assert!(init.results.is_empty());
            assert_eq!(api.functions["pkg/shapes/Circle/area"].results.len(), 1);
        }

        #[test]
        fn enums_exceptions_and_nesting() {
            let api = run_one(json!({
                "path": "m.py",
                "fullname": "m",
                "body": [
                    {"node": "class_def", "name": "Color", "fullname": "m.Color",
                     "bases": ["enum.Enum"],
                     "body": [
                        {"node": "assignment", "lvalues": [name("RED")],
                         "rvalue": {"expr": "int", "value": 1}},
                        {"node": "func_def", "name": "describe", "fullname": "m.Color.describe"}
                     ]},
                    {"node": "class_def", "name": "Failure", "fullname": "m.Failure",
                     "bases": ["builtins.Exception"],
                     "mro": ["m.Failure", "builtins.Exception",
                             "builtins.BaseException", "builtins.object"]},
                    {"node": "class_def", "name": "Outer", "fullname": "m.Outer",
                     "body": [
                        {"node": "class_def", "name": "Mode", "fullname": "m.Outer.Mode",
                         "bases": ["enum.IntEnum"]},
                        {"node": "class_def", "name": "Inner", "fullname": "m.Outer.Inner"}
                     ]},
                    {"node": "func_def", "name": "make", "fullname": "m.make",
                     "body": [{"node": "class_def", "name": "Local", "fullname": "m.make.Local"}]}
                ]
            }));

            let module = &api.modules["m"];
            assert_eq!(module.enums, vec!["m/Color", "m/Outer/Mode"]);
            assert_eq!(api.enums["m/Color"].instances, vec!["m/Color/RED"]);
            assert!(!api.functions.contains_key("m/Color/describe"));
            assert!(api.classes["m/Failure"].is_exception);
            assert_eq!(api.classes["m/Outer"].classes, vec!["m/Outer/Inner"]);
            assert!(!api.classes.contains_key("m/make/Local"));
        }

        #[test]
        fn duplicate_definitions_keep_the_first() {
            let api = run_one(json!({
                "path": "m.py",
                "fullname": "m",
                "body": [
                    {"node": "func_def", "name": "f", "fullname": "m.f",
                     "arguments": [{"name": "a", "kind": "pos"}]},
                    {"node": "func_def", "name": "f", "fullname": "m.f",
                     "arguments": [{"name": "b", "kind": "pos"}]}
                ]
            }));
            assert_eq!(api.modules["m"].functions, vec!["m/f"]);
            assert_eq!(api.functions["m/f"].parameters, vec!["m/f/a"]);
            assert!(!api.parameters.contains_key("m/f/b"));
        }
    }

    mod visibility {
        use super::*;

        #[test]
        fn containment_and_constructor() {
            let api = run_one(json!({
                "path": "m.py",
                "fullname": "m",
                "body": [
                    {"node": "class_def", "name": "_Private", "fullname": "m._Private",
                     "body": [
                        {"node": "func_def", "name": "__init__", "fullname": "m._Private.__init__"},
                        {"node": "func_def", "name": "run", "fullname": "m._Private.run"}
                     ]},
                    {"node": "class_def", "name": "Public", "fullname": "m.Public",
                     "body": [
                        {"node": "func_def", "name": "__init__", "fullname": "m.Public.__init__"},
                        {"node": "func_def", "name": "_step", "fullname": "m.Public._step"}
                     ]}
                ]
            }));
            assert!(!api.classes["m/_Private"].is_public);
            assert!(!api.functions["m/_Private/__init__"].is_public);
            assert!(!api.functions["m/_Private/run"].is_public);
            assert!(api.functions["m/Public/__init__"].is_public);
            assert!(!api.functions["m/Public/_step"].is_public);
        }
    }

    mod docstrings {
        use super::*;

        #[test]
        fn constructor_docstring_is_kept_on_the_class() {
            let file = source_file(json!({
                "path": "m.py",
                "fullname": "m",
                "body": [{"node": "class_def", "name": "C", "fullname": "m.C",
                          "docstring": "A thing.",
                          "body": [{"node": "func_def", "name": "__init__",
                                    "fullname": "m.C.__init__",
                                    "docstring": "Build it.\n\nArgs:\n    n (int): Count.\n"}]}]
            }));
            let index = PackageIndex::build(&[scan_file(&file)]);
            let api =
                Adapter::run(&file, &index, &GoogleProvider).unwrap_or_else(|e| panic!("{}", e));
            let class = &api.classes["m/C"];
            assert_eq!(class.docstring.description, "A thing.");
            assert_eq!(class.constructor_full_docstring, "Build it.\n\nArgs:\n    n (int): Count.");
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn assignment_under_assignment_is_fatal() {
            let file = source_file(json!({"path": "m.py", "fullname": "m", "body": []}));
            let assignment: Assignment = serde_json::from_value(json!({"lvalues": [name("x")]}))
                .unwrap_or_else(|e| panic!("{}", e));
            let pass = Statement::Pass;
            let index = PackageIndex::default();
            let mut adapter = Adapter::new(&file, &index, &PlainTextProvider);
            adapter.visit_source_file(&file);
            adapter.visit_assignment(&assignment);
            adapter.visit_assignment(&assignment);
            adapter.leave_assignment(&assignment);
            assert_eq!(
                adapter.error,
                Some(AdapterError::InvalidAssignmentParent { parent: "assignments" })
            );
            assert_eq!(adapter.visit_statement(&pass), VisitResult::Stop);
        }

        #[test]
        fn leaving_without_a_frame_is_fatal() {
            let file = source_file(json!({"path": "m.py", "fullname": "m", "body": []}));
            let func: FuncDef = serde_json::from_value(json!({"name": "f", "fullname": "m.f"}))
                .unwrap_or_else(|e| panic!("{}", e));
            let index = PackageIndex::default();
            let mut adapter = Adapter::new(&file, &index, &PlainTextProvider);
            adapter.leave_func_def(&func);
            assert_eq!(adapter.finish(), Err(AdapterError::StackUnderflow));
        }

        #[test]
        fn wrong_frame_kind_is_fatal() {
            let file = source_file(json!({"path": "m.py", "fullname": "m", "body": []}));
            let func: FuncDef = serde_json::from_value(json!({"name": "f", "fullname": "m.f"}))
                .unwrap_or_else(|e| panic!("{}", e));
            let index = PackageIndex::default();
            let mut adapter = Adapter::new(&file, &index, &PlainTextProvider);
            adapter.visit_source_file(&file);
            adapter.leave_func_def(&func);
            assert_eq!(
                adapter.finish(),
                Err(AdapterError::UnexpectedFrame {
                    expected: "function",
                    found: "module",
                })
            );
        }
    }
}
