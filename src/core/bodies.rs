//! Declaration body discovery.
//!
//! A body is the unit the driver analyzes: every function declaration, class
//! member with code, and module-level variable initializer of a module.
//! Bodies are listed in pre-order, so an outer function precedes the
//! functions declared inside it.

use std::fmt;

use serde::Serialize;
use swc_common::{Span, Spanned};
use swc_ecma_ast::{
    ClassDecl, ClassExpr, ClassMethod, ClassProp, Constructor, Decl, DefaultDecl, ExportDecl,
    ExportDefaultDecl, FnDecl, MethodKind, Module, ModuleDecl, ModuleItem, PrivateMethod,
    PrivateProp, StaticBlock, Stmt, VarDecl,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::core::bindings::binding_names;
use crate::core::parsers::ParsedSource;

/// What kind of declaration owns a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BodyKind {
    Function,
    Method,
    Getter,
    Setter,
    Constructor,
    PropertyInitializer,
    StaticBlock,
    VariableInitializer,
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BodyKind::Function => "function",
            BodyKind::Method => "method",
            BodyKind::Getter => "getter",
            BodyKind::Setter => "setter",
            BodyKind::Constructor => "constructor",
            BodyKind::PropertyInitializer => "property initializer",
            BodyKind::StaticBlock => "static block",
            BodyKind::VariableInitializer => "variable initializer",
        };
        f.write_str(label)
    }
}

/// Identity of a declaration body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BodyId {
    /// `render`, `Store.reset`, `Store.constructor`, `config`, ...
    pub name: String,
    pub kind: BodyKind,
    /// Byte offset of the declaration, 0 when its span is unmappable.
    pub offset: usize,
    /// 1-indexed line of the declaration, 0 when its span is unmappable.
    pub line: usize,
    /// Span of the declaration node the collector activates on.
    #[serde(skip)]
    pub span: Span,
}

/// Enumerate every declaration body of a module in pre-order.
pub fn find_bodies(source: &ParsedSource) -> Vec<BodyId> {
    let mut finder = BodyFinder {
        source,
        class_stack: Vec::new(),
        bodies: Vec::new(),
    };
    source.module.visit_with(&mut finder);
    finder.bodies
}

struct BodyFinder<'a> {
    source: &'a ParsedSource,
    class_stack: Vec<String>,
    bodies: Vec<BodyId>,
}

impl BodyFinder<'_> {
    fn push(&mut self, name: String, kind: BodyKind, span: Span) {
        let (offset, line) = match self.source.source_range(span) {
            Some((offset, _)) => (offset, self.source.line_number(offset)),
            None => (0, 0),
        };
        self.bodies.push(BodyId {
            name,
            kind,
            offset,
            line,
            span,
        });
    }

    fn member_name(&self, member: &str) -> String {
        match self.class_stack.last() {
            Some(class_name) => format!("{class_name}.{member}"),
            None => member.to_string(),
        }
    }

    fn key_text(&self, key: &impl Spanned) -> String {
        self.source
            .text(key.span())
            .unwrap_or("<computed>")
            .to_string()
    }

    fn record_module_vars(&mut self, decl: &VarDecl) {
        for declarator in &decl.decls {
            if declarator.init.is_none() {
                continue;
            }
            let names = binding_names(&declarator.name);
            let name = if names.is_empty() {
                "<pattern>".to_string()
            } else {
                names.join(", ")
            };
            self.push(name, BodyKind::VariableInitializer, declarator.span);
        }
    }

    fn with_class(&mut self, name: String, visit: impl FnOnce(&mut Self)) {
        self.class_stack.push(name);
        visit(self);
        self.class_stack.pop();
    }
}

impl Visit for BodyFinder<'_> {
    fn visit_module(&mut self, module: &Module) {
        for item in &module.body {
            match item {
                ModuleItem::Stmt(Stmt::Decl(Decl::Var(decl)))
                | ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(ExportDecl {
                    decl: Decl::Var(decl),
                    ..
                })) => self.record_module_vars(decl),
                _ => {}
            }
            item.visit_with(self);
        }
    }

    fn visit_fn_decl(&mut self, node: &FnDecl) {
        if node.function.body.is_some() {
            self.push(
                node.ident.sym.to_string(),
                BodyKind::Function,
                node.function.span,
            );
        }
        node.visit_children_with(self);
    }

    fn visit_export_default_decl(&mut self, node: &ExportDefaultDecl) {
        if let DefaultDecl::Fn(fn_expr) = &node.decl
            && fn_expr.function.body.is_some()
        {
            let name = fn_expr
                .ident
                .as_ref()
                .map_or_else(|| "default".to_string(), |ident| ident.sym.to_string());
            self.push(name, BodyKind::Function, fn_expr.function.span);
        }
        node.visit_children_with(self);
    }

    fn visit_class_decl(&mut self, node: &ClassDecl) {
        self.with_class(node.ident.sym.to_string(), |this| {
            node.class.visit_with(this)
        });
    }

    fn visit_class_expr(&mut self, node: &ClassExpr) {
        let name = node
            .ident
            .as_ref()
            .map_or_else(|| "<anonymous>".to_string(), |ident| ident.sym.to_string());
        self.with_class(name, |this| node.class.visit_with(this));
    }

    fn visit_constructor(&mut self, node: &Constructor) {
        if node.body.is_some() {
            let name = self.member_name("constructor");
            self.push(name, BodyKind::Constructor, node.span);
        }
        node.visit_children_with(self);
    }

    fn visit_class_method(&mut self, node: &ClassMethod) {
        if node.function.body.is_some() {
            let name = self.member_name(&self.key_text(&node.key));
            self.push(name, method_kind(node.kind), node.function.span);
        }
        node.visit_children_with(self);
    }

    fn visit_private_method(&mut self, node: &PrivateMethod) {
        if node.function.body.is_some() {
            let name = self.member_name(&format!("#{}", node.key.name));
            self.push(name, method_kind(node.kind), node.function.span);
        }
        node.visit_children_with(self);
    }

    fn visit_class_prop(&mut self, node: &ClassProp) {
        if node.value.is_some() {
            let name = self.member_name(&self.key_text(&node.key));
            self.push(name, BodyKind::PropertyInitializer, node.span);
        }
        node.visit_children_with(self);
    }

    fn visit_private_prop(&mut self, node: &PrivateProp) {
        if node.value.is_some() {
            let name = self.member_name(&format!("#{}", node.key.name));
            self.push(name, BodyKind::PropertyInitializer, node.span);
        }
        node.visit_children_with(self);
    }

    fn visit_static_block(&mut self, node: &StaticBlock) {
        let name = self.member_name("static");
        self.push(name, BodyKind::StaticBlock, node.span);
        node.visit_children_with(self);
    }
}

fn method_kind(kind: MethodKind) -> BodyKind {
    match kind {
        MethodKind::Method => BodyKind::Method,
        MethodKind::Getter => BodyKind::Getter,
        MethodKind::Setter => BodyKind::Setter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parsers::parse_snippet;
    use pretty_assertions::assert_eq;

    fn bodies(code: &str) -> Vec<(String, BodyKind, usize)> {
        let parsed = parse_snippet(code, "test.ts").unwrap();
        find_bodies(&parsed)
            .into_iter()
            .map(|body| (body.name, body.kind, body.line))
            .collect()
    }

    #[test]
    fn test_functions_in_pre_order() {
        let found = bodies(
            "function outer() {\n  function inner() {}\n}\nexport function api() {}\nexport default function () {}\n",
        );
        assert_eq!(
            found,
            vec![
                ("outer".to_string(), BodyKind::Function, 1),
                ("inner".to_string(), BodyKind::Function, 2),
                ("api".to_string(), BodyKind::Function, 4),
                ("default".to_string(), BodyKind::Function, 5),
            ]
        );
    }

    #[test]
    fn test_class_members() {
        let found = bodies(
            r#"class Store extends Base {
  count = this.load();
  #cache = new Map();
  label: string;
  static { Store.init(); }
  constructor() { super(); }
  get size() { return 1; }
  set size(v) {}
  reset(): void {}
  #flush() {}
  abstract_like(): void;
}"#,
        );
        let names: Vec<(&str, BodyKind)> = found
            .iter()
            .map(|(name, kind, _)| (name.as_str(), *kind))
            .collect();
        assert_eq!(
            names,
            vec![
                ("Store.count", BodyKind::PropertyInitializer),
                ("Store.#cache", BodyKind::PropertyInitializer),
                ("Store.static", BodyKind::StaticBlock),
                ("Store.constructor", BodyKind::Constructor),
                ("Store.size", BodyKind::Getter),
                ("Store.size", BodyKind::Setter),
                ("Store.reset", BodyKind::Method),
                ("Store.#flush", BodyKind::Method),
            ]
        );
    }

    #[test]
    fn test_module_level_initializers() {
        let found = bodies(
            "const config = load();\nexport const { a, b } = pick();\nlet pending;\nfunction f() { const local = 1; }\n",
        );
        let names: Vec<&str> = found.iter().map(|(name, _, _)| name.as_str()).collect();
        assert_eq!(names, vec!["config", "a, b", "f"]);
        assert_eq!(found[0].1, BodyKind::VariableInitializer);
    }
}
