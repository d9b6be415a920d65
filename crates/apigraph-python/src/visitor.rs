// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitor trait and walk functions for typed program trees.
//!
//! - **Pre-order**: `visit_*` is called before descending into children
//! - **Post-order**: `leave_*` is called after all children have been visited
//! - **Source order**: children are visited top-to-bottom
//!
//! # Control Flow
//!
//! - `VisitResult::Continue` - traverse into children
//! - `VisitResult::SkipChildren` - skip children but still call `leave_*`
//! - `VisitResult::Stop` - halt traversal immediately (no `leave_*` called)
//!
//! Visitors receive `&'a` references into the tree, so they may keep nodes
//! on their own stacks for the duration of the walk.

use crate::nodes::{
    Assignment, Block, ClassDef, FuncDef, Import, ImportAll, ImportFrom, Return, SourceFile,
    Statement, Try,
};

/// Result of visiting a node - controls traversal behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum VisitResult {
    /// Continue traversal into children.
    #[default]
    Continue,
    /// Skip children, continue with siblings. `leave_*` is still called.
    SkipChildren,
    /// Stop traversal entirely.
    Stop,
}

/// Generates `visit_*` / `leave_*` pairs with no-op defaults.
macro_rules! visitor_methods {
    (
        $(
            $(#[$meta:meta])*
            $base_name:ident : $node_type:ty
        ),* $(,)?
    ) => {
        paste::paste! {
            $(
                $(#[$meta])*
                #[doc = concat!("Visit a [`", stringify!($node_type), "`] node.")]
                #[allow(unused_variables)]
                fn [<visit_ $base_name>](&mut self, node: &'a $node_type) -> VisitResult {
                    VisitResult::Continue
                }

                $(#[$meta])*
                #[doc = concat!("Leave a [`", stringify!($node_type), "`] node.")]
                #[allow(unused_variables)]
                fn [<leave_ $base_name>](&mut self, node: &'a $node_type) {}
            )*
        }
    };
}

/// Immutable visitor over a typed program tree.
///
/// ```ignore
/// struct ReturnCounter(usize);
///
/// impl<'a> Visitor<'a> for ReturnCounter {
///     fn visit_return_stmt(&mut self, _node: &'a Return) -> VisitResult {
///         self.0 += 1;
///         VisitResult::Continue
///     }
/// }
/// ```
pub trait Visitor<'a> {
    visitor_methods! {
        source_file: SourceFile,
        statement: Statement,
        class_def: ClassDef,
        func_def: FuncDef,
        assignment: Assignment,
        import: Import,
        import_from: ImportFrom,
        import_all: ImportAll,
        return_stmt: Return,
        block: Block,
        try_stmt: Try,
    }
}

// ============================================================================
// Walk functions
// ============================================================================

macro_rules! walk_children {
    ($visitor:expr, $stmts:expr) => {
        for stmt in $stmts {
            if walk_statement($visitor, stmt) == VisitResult::Stop {
                return VisitResult::Stop;
            }
        }
    };
}

/// Walk a [`SourceFile`]: `visit_source_file`, each statement, `leave_source_file`.
pub fn walk_source_file<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a SourceFile) -> VisitResult {
    match visitor.visit_source_file(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            walk_children!(visitor, &node.body);
        }
    }
    visitor.leave_source_file(node);
    VisitResult::Continue
}

/// Walk a list of statements without an enclosing file.
pub fn walk_body<'a, V: Visitor<'a>>(visitor: &mut V, body: &'a [Statement]) -> VisitResult {
    walk_children!(visitor, body);
    VisitResult::Continue
}

/// Walk a [`Statement`], dispatching on its kind.
pub fn walk_statement<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a Statement) -> VisitResult {
    match visitor.visit_statement(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            let inner = match node {
                Statement::ClassDef(c) => walk_class_def(visitor, c),
                Statement::FuncDef(f) => walk_func_def(visitor, f),
                Statement::Assignment(a) => {
                    walk_leaf(visitor, a, V::visit_assignment, V::leave_assignment)
                }
                Statement::Import(i) => walk_leaf(visitor, i, V::visit_import, V::leave_import),
                Statement::ImportFrom(i) => {
                    walk_leaf(visitor, i, V::visit_import_from, V::leave_import_from)
                }
                Statement::ImportAll(i) => {
                    walk_leaf(visitor, i, V::visit_import_all, V::leave_import_all)
                }
                Statement::Return(r) => {
                    walk_leaf(visitor, r, V::visit_return_stmt, V::leave_return_stmt)
                }
                Statement::If(b) | Statement::For(b) | Statement::While(b) | Statement::With(b) => {
                    walk_block(visitor, b)
                }
                Statement::Try(t) => walk_try(visitor, t),
                Statement::Expression(_) | Statement::Pass | Statement::Other => {
                    VisitResult::Continue
                }
            };
            if inner == VisitResult::Stop {
                return VisitResult::Stop;
            }
        }
    }
    visitor.leave_statement(node);
    VisitResult::Continue
}

/// Walk a node with no statement children.
fn walk_leaf<'a, V, N>(
    visitor: &mut V,
    node: &'a N,
    visit: fn(&mut V, &'a N) -> VisitResult,
    leave: fn(&mut V, &'a N),
) -> VisitResult
where
    V: Visitor<'a>,
{
    if visit(visitor, node) == VisitResult::Stop {
        return VisitResult::Stop;
    }
    leave(visitor, node);
    VisitResult::Continue
}

pub fn walk_class_def<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a ClassDef) -> VisitResult {
    match visitor.visit_class_def(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            walk_children!(visitor, &node.body);
        }
    }
    visitor.leave_class_def(node);
    VisitResult::Continue
}

pub fn walk_func_def<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a FuncDef) -> VisitResult {
    match visitor.visit_func_def(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            walk_children!(visitor, &node.body);
        }
    }
    visitor.leave_func_def(node);
    VisitResult::Continue
}

/// Walk a [`Block`]: `body`, then `orelse`.
pub fn walk_block<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a Block) -> VisitResult {
    match visitor.visit_block(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            walk_children!(visitor, &node.body);
            walk_children!(visitor, &node.orelse);
        }
    }
    visitor.leave_block(node);
    VisitResult::Continue
}

/// Walk a [`Try`]: `body`, each handler, `orelse`, `finally_body`.
pub fn walk_try<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a Try) -> VisitResult {
    match visitor.visit_try_stmt(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            walk_children!(visitor, &node.body);
            for handler in &node.handlers {
                if walk_block(visitor, handler) == VisitResult::Stop {
                    return VisitResult::Stop;
                }
            }
            walk_children!(visitor, &node.orelse);
            walk_children!(visitor, &node.finally_body);
        }
    }
    visitor.leave_try_stmt(node);
    VisitResult::Continue
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::source_file;
    use serde_json::json;

    #[derive(Default)]
    struct EventLog {
        events: Vec<String>,
        skip_functions: bool,
        stop_at_return: bool,
    }

    impl<'a> Visitor<'a> for EventLog {
        fn visit_class_def(&mut self, node: &'a ClassDef) -> VisitResult {
            self.events.push(format!("enter class {}", node.name));
            VisitResult::Continue
        }

        fn leave_class_def(&mut self, node: &'a ClassDef) {
            self.events.push(format!("leave class {}", node.name));
        }

        fn visit_func_def(&mut self, node: &'a FuncDef) -> VisitResult {
            self.events.push(format!("enter def {}", node.name));
            if self.skip_functions {
                VisitResult::SkipChildren
            } else {
                VisitResult::Continue
            }
        }

        fn leave_func_def(&mut self, node: &'a FuncDef) {
            self.events.push(format!("leave def {}", node.name));
        }

        fn visit_return_stmt(&mut self, _node: &'a Return) -> VisitResult {
            self.events.push("return".to_string());
            if self.stop_at_return {
                VisitResult::Stop
            } else {
                VisitResult::Continue
            }
        }
    }

    fn sample() -> SourceFile {
        source_file(json!({
            "path": "m.py",
            "fullname": "m",
            "body": [
                {"node": "class_def", "name": "C", "fullname": "m.C", "body": [
                    {"node": "func_def", "name": "f", "fullname": "m.C.f", "body": [
                        {"node": "if", "body": [{"node": "return"}], "orelse": []}
                    ]}
                ]},
                {"node": "func_def", "name": "g", "fullname": "m.g", "body": []}
            ]
        }))
    }

    #[test]
    fn enter_and_leave_are_paired_in_order() {
        let file = sample();
        let mut log = EventLog::default();
        walk_source_file(&mut log, &file);
        assert_eq!(
            log.events,
            vec![
                "enter class C",
                "enter def f",
                "return",
                "leave def f",
                "leave class C",
                "enter def g",
                "leave def g",
            ]
        );
    }

    #[test]
    fn skip_children_still_leaves() {
        let file = sample();
        let mut log = EventLog {
            skip_functions: true,
            ..Default::default()
        };
        walk_source_file(&mut log, &file);
        assert!(!log.events.contains(&"return".to_string()));
        assert!(log.events.contains(&"leave def f".to_string()));
    }

    #[test]
    fn stop_halts_everything() {
        let file = sample();
        let mut log = EventLog {
            stop_at_return: true,
            ..Default::default()
        };
        assert_eq!(walk_source_file(&mut log, &file), VisitResult::Stop);
        assert_eq!(log.events.last().map(String::as_str), Some("return"));
        assert!(!log.events.contains(&"leave def f".to_string()));
    }
}
