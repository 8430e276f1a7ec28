//! Identifier bookkeeping shared by the collector and the filter.
//!
//! - which names a pattern binds
//! - which names an expression (or block) reads
//! - which names a lambda binds for itself
//! - which `var` loop variables are hoisted to a function scope
//! - which loop-control variables are visible at a point of the traversal

use std::collections::BTreeSet;

use swc_ecma_ast::{
    ArrowExpr, BindingIdent, BlockStmt, Class, ClassDecl, Expr, FnDecl, ForHead, ForInStmt,
    ForOfStmt, ForStmt, Function, ObjectPatProp, Pat, Prop, VarDecl, VarDeclKind, VarDeclOrExpr,
};
use swc_ecma_visit::{Visit, VisitWith};

/// Extract all identifier names from a pattern (handles destructuring).
/// Supports: simple ident, object destructuring, array destructuring,
/// default values, rest patterns, and renamed destructuring.
pub fn binding_names(pat: &Pat) -> Vec<String> {
    match pat {
        Pat::Ident(ident) => vec![ident.id.sym.to_string()],
        Pat::Object(obj) => obj
            .props
            .iter()
            .flat_map(|prop| match prop {
                ObjectPatProp::KeyValue(kv) => binding_names(&kv.value),
                ObjectPatProp::Assign(assign) => vec![assign.key.sym.to_string()],
                ObjectPatProp::Rest(rest) => binding_names(&rest.arg),
            })
            .collect(),
        Pat::Array(arr) => arr.elems.iter().flatten().flat_map(binding_names).collect(),
        Pat::Assign(assign) => binding_names(&assign.left),
        Pat::Rest(rest) => binding_names(&rest.arg),
        _ => vec![],
    }
}

/// Names declared by a `var`/`let`/`const` list.
pub fn declared_names(decl: &VarDecl) -> Vec<String> {
    decl.decls
        .iter()
        .flat_map(|declarator| binding_names(&declarator.name))
        .collect()
}

/// Whether a parameter pattern carries a type annotation.
///
/// A parameter with a default value gets its type from the default, so it
/// counts as typed as well.
pub fn is_typed_param(pat: &Pat) -> bool {
    match pat {
        Pat::Ident(ident) => ident.type_ann.is_some(),
        Pat::Array(arr) => arr.type_ann.is_some(),
        Pat::Object(obj) => obj.type_ann.is_some(),
        Pat::Rest(rest) => rest.type_ann.is_some(),
        Pat::Assign(_) => true,
        _ => false,
    }
}

// ============================================================
// Lambda locals
// ============================================================

/// Every name bound inside a subtree: pattern bindings, parameters of
/// nested functions, function and class declarations.
#[derive(Default)]
struct BoundNames {
    names: Vec<String>,
}

impl BoundNames {
    fn push(&mut self, name: String) {
        if !self.names.contains(&name) {
            self.names.push(name);
        }
    }
}

impl Visit for BoundNames {
    fn visit_binding_ident(&mut self, node: &BindingIdent) {
        self.push(node.id.sym.to_string());
    }

    fn visit_fn_decl(&mut self, node: &FnDecl) {
        self.push(node.ident.sym.to_string());
        node.visit_children_with(self);
    }

    fn visit_class_decl(&mut self, node: &ClassDecl) {
        self.push(node.ident.sym.to_string());
        node.visit_children_with(self);
    }
}

/// Names an arrow function binds for itself: its parameters and everything
/// declared in its body. None of them exist outside the arrow.
pub fn arrow_locals(arrow: &ArrowExpr) -> Vec<String> {
    let mut bound = BoundNames::default();
    arrow.params.visit_with(&mut bound);
    arrow.body.visit_with(&mut bound);
    bound.names
}

/// Like [`arrow_locals`], for a function expression.
pub fn function_locals(function: &Function) -> Vec<String> {
    let mut bound = BoundNames::default();
    function.params.visit_with(&mut bound);
    function.body.visit_with(&mut bound);
    bound.names
}

// ============================================================
// Identifier reads
// ============================================================

/// Collects the identifiers an AST fragment reads.
///
/// Member names (`a.b` → `b`) and binding sites are not reads; object
/// shorthand properties (`{ a }`) are. Inside a nested lambda, names the
/// lambda binds itself are not reads of the outer scope.
#[derive(Default)]
pub struct IdentifierReads {
    names: BTreeSet<String>,
    bound: Vec<Vec<String>>,
}

impl IdentifierReads {
    pub fn into_names(self) -> BTreeSet<String> {
        self.names
    }

    fn read(&mut self, name: String) {
        if !self.bound.iter().any(|scope| scope.contains(&name)) {
            self.names.insert(name);
        }
    }

    fn with_bound(&mut self, names: Vec<String>, visit: impl FnOnce(&mut Self)) {
        self.bound.push(names);
        visit(self);
        self.bound.pop();
    }
}

impl Visit for IdentifierReads {
    fn visit_expr(&mut self, expr: &Expr) {
        if let Expr::Ident(ident) = expr {
            self.read(ident.sym.to_string());
            return;
        }
        expr.visit_children_with(self);
    }

    fn visit_prop(&mut self, prop: &Prop) {
        if let Prop::Shorthand(ident) = prop {
            self.read(ident.sym.to_string());
            return;
        }
        prop.visit_children_with(self);
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr) {
        self.with_bound(arrow_locals(node), |this| node.visit_children_with(this));
    }

    fn visit_function(&mut self, node: &Function) {
        self.with_bound(function_locals(node), |this| node.visit_children_with(this));
    }
}

/// Identifiers read anywhere inside `node`.
pub fn read_identifiers<N>(node: &N) -> BTreeSet<String>
where
    N: VisitWith<IdentifierReads>,
{
    let mut reads = IdentifierReads::default();
    node.visit_with(&mut reads);
    reads.into_names()
}

// ============================================================
// Function-scoped loop variables
// ============================================================

/// Finds `var` declarations in `for`/`for-in`/`for-of` heads of one function
/// scope. Nested functions, arrows and classes are separate scopes.
#[derive(Default)]
struct VarLoopVariables {
    names: Vec<String>,
}

impl VarLoopVariables {
    fn record(&mut self, decl: &VarDecl) {
        if decl.kind == VarDeclKind::Var {
            self.names.extend(declared_names(decl));
        }
    }
}

impl Visit for VarLoopVariables {
    fn visit_for_stmt(&mut self, node: &ForStmt) {
        if let Some(VarDeclOrExpr::VarDecl(decl)) = &node.init {
            self.record(decl);
        }
        node.visit_children_with(self);
    }

    fn visit_for_in_stmt(&mut self, node: &ForInStmt) {
        if let ForHead::VarDecl(decl) = &node.left {
            self.record(decl);
        }
        node.visit_children_with(self);
    }

    fn visit_for_of_stmt(&mut self, node: &ForOfStmt) {
        if let ForHead::VarDecl(decl) = &node.left {
            self.record(decl);
        }
        node.visit_children_with(self);
    }

    fn visit_function(&mut self, _: &Function) {}

    fn visit_arrow_expr(&mut self, _: &ArrowExpr) {}

    fn visit_class(&mut self, _: &Class) {}
}

/// `var` loop variables hoisted to the scope of the function owning `block`.
pub fn function_scoped_loop_variables(block: &BlockStmt) -> Vec<String> {
    let mut finder = VarLoopVariables::default();
    block.visit_with(&mut finder);
    finder.names
}

// ============================================================
// Loop scopes
// ============================================================

#[derive(Debug, Clone)]
enum LoopScope {
    /// Loop-control variables entering scope.
    Loop(Vec<String>),
    /// Names rebound by an inner lambda's parameters.
    Shadow(Vec<String>),
}

/// Stack of loop-control variable scopes, innermost last.
///
/// ```ignore
/// for (let i = 0; i < n; i++) {   // push Loop([i])
///     rows.map((i) => i.id);       // push Shadow([i]): i is a parameter here
/// }
/// ```
#[derive(Debug, Default, Clone)]
pub struct LoopScopes {
    stack: Vec<LoopScope>,
}

impl LoopScopes {
    pub fn enter_loop(&mut self, names: Vec<String>) {
        self.stack.push(LoopScope::Loop(names));
    }

    pub fn enter_shadow(&mut self, names: Vec<String>) {
        self.stack.push(LoopScope::Shadow(names));
    }

    pub fn exit(&mut self) {
        self.stack.pop();
    }

    /// Loop-control variables visible at the current point, in declaration order.
    pub fn visible(&self) -> Vec<String> {
        let mut visible: Vec<String> = Vec::new();
        for scope in &self.stack {
            match scope {
                LoopScope::Loop(names) => {
                    for name in names {
                        if !visible.contains(name) {
                            visible.push(name.clone());
                        }
                    }
                }
                LoopScope::Shadow(names) => visible.retain(|name| !names.contains(name)),
            }
        }
        visible
    }
}
