//! Per-module symbol table.
//!
//! Resolves call targets to the return kind their declaration announces, so
//! the r-value check can tell `log(x)` (declared `: void`) from `size(x)`.
//! Resolution is name based and best-effort: ambiguous or unknown targets
//! resolve to nothing and the caller falls back to `Valueness::Inferred`.

use std::collections::HashMap;

use swc_ecma_ast::{
    ArrowExpr, ClassDecl, ClassExpr, ClassMember, Expr, FnDecl, Function, Module, Pat,
    TsKeywordTypeKind, TsType, TsTypeAnn, VarDeclarator,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::core::parsers::ParsedSource;

/// Declared return kind of a function or method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    /// Annotated `void`, `never` or `undefined`.
    Void,
    /// Annotated with any other type, or `async`/generator.
    Value,
    /// No annotation; the return type is inferred.
    Unannotated,
}

impl ReturnKind {
    fn of(return_type: Option<&TsTypeAnn>, is_async: bool, is_generator: bool) -> Self {
        if is_async || is_generator {
            return ReturnKind::Value;
        }
        match return_type.map(|ann| &*ann.type_ann) {
            Some(TsType::TsKeywordType(keyword))
                if matches!(
                    keyword.kind,
                    TsKeywordTypeKind::TsVoidKeyword
                        | TsKeywordTypeKind::TsNeverKeyword
                        | TsKeywordTypeKind::TsUndefinedKeyword
                ) =>
            {
                ReturnKind::Void
            }
            Some(_) => ReturnKind::Value,
            None => ReturnKind::Unannotated,
        }
    }

    fn of_function(function: &Function) -> Self {
        Self::of(
            function.return_type.as_deref(),
            function.is_async,
            function.is_generator,
        )
    }

    fn of_arrow(arrow: &ArrowExpr) -> Self {
        Self::of(arrow.return_type.as_deref(), arrow.is_async, arrow.is_generator)
    }
}

/// What a call expression targets, as far as syntax tells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallTarget {
    /// `f(...)`
    Function(String),
    /// `this.m(...)`
    ThisMethod(String),
    /// `console.log(...)` and friends.
    Console,
    /// Any other callee.
    Unknown,
}

/// Function and method return kinds declared in one module.
#[derive(Debug, Default)]
pub struct SymbolTable {
    functions: HashMap<String, ReturnKind>,
    methods: HashMap<(String, String), ReturnKind>,
}

impl SymbolTable {
    pub fn build(source: &ParsedSource) -> Self {
        Self::from_module(&source.module)
    }

    pub fn from_module(module: &Module) -> Self {
        let mut collector = SymbolCollector::default();
        module.visit_with(&mut collector);
        collector.table
    }

    pub fn function(&self, name: &str) -> Option<ReturnKind> {
        self.functions.get(name).copied()
    }

    pub fn method(&self, class_name: &str, method: &str) -> Option<ReturnKind> {
        self.methods
            .get(&(class_name.to_string(), method.to_string()))
            .copied()
    }

    /// Return kind of a call target, `None` when it cannot be resolved.
    pub fn resolve(&self, target: &CallTarget, class_name: Option<&str>) -> Option<ReturnKind> {
        match target {
            CallTarget::Console => Some(ReturnKind::Void),
            CallTarget::Function(name) => self.function(name),
            CallTarget::ThisMethod(name) => class_name.and_then(|class| self.method(class, name)),
            CallTarget::Unknown => None,
        }
    }

    /// Declarations sharing a name with different return kinds (overloads,
    /// shadowing in nested scopes) are ambiguous and degrade to `Unannotated`.
    fn insert_function(&mut self, name: String, kind: ReturnKind) {
        merge(self.functions.entry(name).or_insert(kind), kind);
    }

    fn insert_method(&mut self, class_name: String, method: String, kind: ReturnKind) {
        merge(self.methods.entry((class_name, method)).or_insert(kind), kind);
    }
}

fn merge(existing: &mut ReturnKind, kind: ReturnKind) {
    if *existing != kind {
        *existing = ReturnKind::Unannotated;
    }
}

#[derive(Default)]
struct SymbolCollector {
    table: SymbolTable,
    class_stack: Vec<Option<String>>,
}

impl SymbolCollector {
    fn record_class_members(&mut self, members: &[ClassMember]) {
        let Some(Some(class_name)) = self.class_stack.last().cloned() else {
            return;
        };
        for member in members {
            match member {
                ClassMember::Method(method) => {
                    if let Some(name) = method.key.as_ident() {
                        self.table.insert_method(
                            class_name.clone(),
                            name.sym.to_string(),
                            ReturnKind::of_function(&method.function),
                        );
                    }
                }
                ClassMember::PrivateMethod(method) => {
                    self.table.insert_method(
                        class_name.clone(),
                        format!("#{}", method.key.name),
                        ReturnKind::of_function(&method.function),
                    );
                }
                _ => {}
            }
        }
    }
}

impl Visit for SymbolCollector {
    fn visit_fn_decl(&mut self, node: &FnDecl) {
        self.table
            .insert_function(node.ident.sym.to_string(), ReturnKind::of_function(&node.function));
        node.visit_children_with(self);
    }

    fn visit_var_declarator(&mut self, node: &VarDeclarator) {
        if let (Pat::Ident(name), Some(init)) = (&node.name, &node.init) {
            let kind = match &**init {
                Expr::Arrow(arrow) => Some(ReturnKind::of_arrow(arrow)),
                Expr::Fn(fn_expr) => Some(ReturnKind::of_function(&fn_expr.function)),
                _ => None,
            };
            if let Some(kind) = kind {
                self.table.insert_function(name.id.sym.to_string(), kind);
            }
        }
        node.visit_children_with(self);
    }

    fn visit_class_decl(&mut self, node: &ClassDecl) {
        self.class_stack.push(Some(node.ident.sym.to_string()));
        self.record_class_members(&node.class.body);
        node.class.visit_with(self);
        self.class_stack.pop();
    }

    fn visit_class_expr(&mut self, node: &ClassExpr) {
        self.class_stack
            .push(node.ident.as_ref().map(|ident| ident.sym.to_string()));
        self.record_class_members(&node.class.body);
        node.class.visit_with(self);
        self.class_stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parsers::parse_snippet;

    fn table(code: &str) -> SymbolTable {
        SymbolTable::build(&parse_snippet(code, "test.ts").unwrap())
    }

    #[test]
    fn test_function_return_kinds() {
        let table = table(
            r#"
            function log(msg: string): void {}
            function fail(): never { throw new Error(); }
            function size(): number { return 1; }
            function guess() { return 1; }
            async function load(): Promise<void> {}
            const notify = (msg: string): undefined => undefined;
            const compute = function (): string { return ""; };
            "#,
        );

        assert_eq!(table.function("log"), Some(ReturnKind::Void));
        assert_eq!(table.function("fail"), Some(ReturnKind::Void));
        assert_eq!(table.function("size"), Some(ReturnKind::Value));
        assert_eq!(table.function("guess"), Some(ReturnKind::Unannotated));
        assert_eq!(table.function("load"), Some(ReturnKind::Value));
        assert_eq!(table.function("notify"), Some(ReturnKind::Void));
        assert_eq!(table.function("compute"), Some(ReturnKind::Value));
        assert_eq!(table.function("missing"), None);
    }

    #[test]
    fn test_method_return_kinds() {
        let table = table(
            r#"
            class Store {
                reset(): void {}
                count(): number { return 0; }
                #flush(): void {}
            }
            "#,
        );

        assert_eq!(table.method("Store", "reset"), Some(ReturnKind::Void));
        assert_eq!(table.method("Store", "count"), Some(ReturnKind::Value));
        assert_eq!(table.method("Store", "#flush"), Some(ReturnKind::Void));
        assert_eq!(table.method("Other", "reset"), None);
    }

    #[test]
    fn test_conflicting_declarations_are_ambiguous() {
        let table = table(
            r#"
            function pick(a: string): void;
            function pick(a: number): number;
            function pick(a: any): any { return a; }
            "#,
        );
        assert_eq!(table.function("pick"), Some(ReturnKind::Unannotated));
    }

    #[test]
    fn test_resolve_targets() {
        let table = table("class A { stop(): void {} }\nfunction go(): void {}");

        assert_eq!(table.resolve(&CallTarget::Console, None), Some(ReturnKind::Void));
        assert_eq!(
            table.resolve(&CallTarget::Function("go".into()), None),
            Some(ReturnKind::Void)
        );
        assert_eq!(
            table.resolve(&CallTarget::ThisMethod("stop".into()), Some("A")),
            Some(ReturnKind::Void)
        );
        assert_eq!(table.resolve(&CallTarget::ThisMethod("stop".into()), None), None);
        assert_eq!(table.resolve(&CallTarget::Unknown, Some("A")), None);
    }
}
