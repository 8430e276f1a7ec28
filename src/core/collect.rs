//! Occurrence collection.
//!
//! One pre-order walk over a declaration body records every eligible
//! expression with its exact source text, location, and a snapshot of the
//! ancestor facts the filter needs. The walk starts at the module root and
//! stays silent until it reaches the body's declaration node; nested
//! function declarations and classes are separate bodies and are skipped.
//!
//! The same walk answers selection queries: instead of recording eligible
//! expressions it returns the one node whose range equals the selection.

use std::collections::{BTreeSet, HashSet};

use swc_common::{Span, Spanned};
use swc_ecma_ast::{
    ArrowExpr, BindingIdent, BlockStmt, BlockStmtOrExpr, Callee, CatchClause, Class, ClassDecl,
    ClassExpr, ClassMember, ClassProp, Constructor, Decorator, Expr, ExprStmt, FnDecl, ForHead,
    ForInStmt, ForOfStmt, ForStmt, Function, GetterProp, Lit, MemberExpr, MemberProp,
    ModuleItem, OptChainBase, ParamOrTsParamProp, Pat, PrivateProp, SetterProp,
    SimpleAssignTarget, StaticBlock, Stmt, SuperProp, SuperPropExpr, TsParamPropParam, UnaryOp,
    UsingDecl, VarDecl, VarDeclOrExpr, VarDeclarator,
};
use swc_ecma_visit::{Visit, VisitWith};
use tracing::debug;

use crate::core::bindings::{
    LoopScopes, arrow_locals, binding_names, declared_names, function_locals,
    function_scoped_loop_variables, is_typed_param, read_identifiers,
};
use crate::core::bodies::{BodyId, BodyKind};
use crate::core::classify::{ExprKind, kind_of};
use crate::core::conflict::ExceptionRegion;
use crate::core::driver::AnalysisConfig;
use crate::core::naming::name_hint;
use crate::core::parsers::ParsedSource;
use crate::core::symbols::CallTarget;

// ============================================================
// Occurrences
// ============================================================

/// A located instance of a node inside one body.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence<'a> {
    /// Exact source text, borrowed from the parsed file.
    pub text: &'a str,
    pub kind: ExprKind,
    pub offset: usize,
    pub length: usize,
    pub line: usize,
    pub column: usize,
    pub node: SyntaxNode,
    pub context: OccurrenceContext,
}

/// The node an occurrence stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxNode {
    Expression(ExpressionFacts),
    /// Trailing segment of a member access: `b` in `a.b`.
    MemberName,
    /// Declaration-site identifier: `x` in `const x = 1`.
    Binding,
    /// A `var`/`let`/`const`/`using` declaration or one of its declarators.
    Declaration { resource: bool },
}

/// What the filter and the name suggester need to know about an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionFacts {
    pub shape: ExprShape,
    pub value: ValueForm,
    /// Identifiers the expression reads, sorted.
    pub reads: Vec<String>,
    pub name_hint: Option<String>,
}

/// Syntactic shape of the node itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprShape {
    Null,
    Array,
    Assignment,
    Identifier,
    Other,
}

impl ExprShape {
    fn of(expr: &Expr) -> Self {
        match expr {
            Expr::Lit(Lit::Null(_)) => ExprShape::Null,
            Expr::Array(_) => ExprShape::Array,
            Expr::Assign(_) => ExprShape::Assignment,
            Expr::Ident(_) => ExprShape::Identifier,
            _ => ExprShape::Other,
        }
    }
}

/// How the value of an expression is produced, looking through
/// parentheses, type assertions and comma sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueForm {
    Plain,
    /// `void expr`
    Void,
    /// `super(...)`
    SuperCall,
    Call(CallTarget),
}

impl ValueForm {
    fn of(expr: &Expr) -> Self {
        match expr {
            Expr::Paren(paren) => Self::of(&paren.expr),
            Expr::TsAs(inner) => Self::of(&inner.expr),
            Expr::TsNonNull(inner) => Self::of(&inner.expr),
            Expr::TsSatisfies(inner) => Self::of(&inner.expr),
            Expr::TsTypeAssertion(inner) => Self::of(&inner.expr),
            Expr::TsConstAssertion(inner) => Self::of(&inner.expr),
            Expr::Seq(seq) => seq
                .exprs
                .last()
                .map_or(ValueForm::Plain, |last| Self::of(last)),
            Expr::Unary(unary) if unary.op == UnaryOp::Void => ValueForm::Void,
            Expr::Call(call) => match &call.callee {
                Callee::Super(_) => ValueForm::SuperCall,
                Callee::Expr(callee) => ValueForm::Call(call_target(callee)),
                Callee::Import(_) => ValueForm::Plain,
            },
            Expr::OptChain(chain) => match &*chain.base {
                OptChainBase::Call(call) => ValueForm::Call(call_target(&call.callee)),
                OptChainBase::Member(_) => ValueForm::Plain,
            },
            _ => ValueForm::Plain,
        }
    }
}

fn call_target(callee: &Expr) -> CallTarget {
    match callee {
        Expr::Ident(ident) => CallTarget::Function(ident.sym.to_string()),
        Expr::Member(member) => match (&*member.obj, &member.prop) {
            (Expr::This(_), MemberProp::Ident(name)) => {
                CallTarget::ThisMethod(name.sym.to_string())
            }
            (Expr::This(_), MemberProp::PrivateName(name)) => {
                CallTarget::ThisMethod(format!("#{}", name.name))
            }
            (Expr::Ident(object), _) if object.sym.as_str() == "console" => CallTarget::Console,
            _ => CallTarget::Unknown,
        },
        _ => CallTarget::Unknown,
    }
}

fn expression_node(expr: &Expr) -> SyntaxNode {
    SyntaxNode::Expression(ExpressionFacts {
        shape: ExprShape::of(expr),
        value: ValueForm::of(expr),
        reads: read_identifiers(expr).into_iter().collect(),
        name_hint: name_hint(expr),
    })
}

// ============================================================
// Context snapshot
// ============================================================

/// Relationship of a node to its syntactic parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The whole expression of an expression statement.
    Statement,
    /// Directly inside parentheses.
    Parenthesized,
    /// Direct argument of a call or `new`.
    Argument,
    /// Initializer of a type-annotated variable or property.
    TypedInitializer,
    /// Callee of a call or tag of a tagged template.
    Callee,
    /// Written to: `++`/`--` operand, `delete` operand, assignment target.
    LValue,
    /// Anything else.
    Nested,
}

/// Nearest enclosing body of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enclosing {
    Declaration(BodyKind),
    Lambda { resolved: bool },
}

/// Immutable snapshot of ancestor facts, taken when a node is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceContext {
    pub role: Role,
    /// `None` for decorators, parameters and computed keys of the declaration.
    pub enclosing: Option<Enclosing>,
    pub in_decorator: bool,
    pub in_super_arguments: bool,
    /// Inside a `for (init; test; update)` initializer or updater.
    pub in_loop_control: bool,
    pub in_resource_declaration: bool,
    /// Loop-control variables visible here, shadowing applied.
    pub loop_variables: Vec<String>,
    /// Names bound by the enclosing lambdas of the body, sorted.
    pub lambda_locals: Vec<String>,
    pub class_name: Option<String>,
}

/// Mutable flags of the walk, saved and restored around each subtree.
#[derive(Debug, Clone)]
struct Frame {
    role: Role,
    enclosing: Option<Enclosing>,
    in_decorator: bool,
    in_super_arguments: bool,
    in_loop_control: bool,
    in_resource_declaration: bool,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            role: Role::Nested,
            enclosing: None,
            in_decorator: false,
            in_super_arguments: false,
            in_loop_control: false,
            in_resource_declaration: false,
        }
    }
}

// ============================================================
// Collector
// ============================================================

/// Everything one collection walk learns about a body.
#[derive(Debug, Default)]
pub struct BodyScan<'a> {
    pub occurrences: Vec<Occurrence<'a>>,
    pub regions: Vec<ExceptionRegion>,
    /// Every name declared in the body, for name suggestion.
    pub declared_names: HashSet<String>,
}

/// Entry point for collection and selection over one parsed file.
pub struct OccurrenceCollector<'a> {
    source: &'a ParsedSource,
    config: &'a AnalysisConfig,
}

impl<'a> OccurrenceCollector<'a> {
    pub fn new(source: &'a ParsedSource, config: &'a AnalysisConfig) -> Self {
        Self { source, config }
    }

    /// Record every enabled eligible expression of `body`, outer before inner.
    pub fn collect(&self, body: &BodyId) -> BodyScan<'a> {
        let mut walker = Walker::new(self.source, self.config, body, Mode::Collect);
        self.source.module.visit_with(&mut walker);
        walker.scan
    }

    /// The node of `body` whose range is exactly `offset..offset + length`.
    ///
    /// When several nodes share the range the outermost one wins.
    pub fn select(&self, body: &BodyId, offset: usize, length: usize) -> Option<Occurrence<'a>> {
        let mut walker = Walker::new(
            self.source,
            self.config,
            body,
            Mode::Select { offset, length },
        );
        self.source.module.visit_with(&mut walker);
        walker.scan.occurrences.into_iter().next()
    }
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Collect,
    Select { offset: usize, length: usize },
}

struct Walker<'a> {
    source: &'a ParsedSource,
    config: &'a AnalysisConfig,
    mode: Mode,
    target: Span,
    target_kind: BodyKind,
    active: bool,
    finished: bool,
    frame: Frame,
    loop_scopes: LoopScopes,
    lambda_scopes: Vec<Vec<String>>,
    class_stack: Vec<Option<String>>,
    scan: BodyScan<'a>,
}

impl<'a> Walker<'a> {
    fn new(
        source: &'a ParsedSource,
        config: &'a AnalysisConfig,
        body: &BodyId,
        mode: Mode,
    ) -> Self {
        Self {
            source,
            config,
            mode,
            target: body.span,
            target_kind: body.kind,
            active: false,
            finished: false,
            frame: Frame::default(),
            loop_scopes: LoopScopes::default(),
            lambda_scopes: Vec::new(),
            class_stack: Vec::new(),
            scan: BodyScan::default(),
        }
    }

    fn is_target(&self, span: Span) -> bool {
        !self.active && !self.finished && span == self.target
    }

    /// Outside the body, subtrees that cannot contain it are skipped.
    fn is_outside(&self, span: Span) -> bool {
        !self.active
            && (self.finished || span.lo > self.target.lo || span.hi < self.target.hi)
    }

    fn activate(&mut self, visit: impl FnOnce(&mut Self)) {
        self.active = true;
        visit(self);
        self.active = false;
        self.finished = true;
    }

    fn scoped(&mut self, update: impl FnOnce(&mut Frame), visit: impl FnOnce(&mut Self)) {
        let saved = self.frame.clone();
        update(&mut self.frame);
        visit(self);
        self.frame = saved;
    }

    fn declare(&mut self, names: impl IntoIterator<Item = String>) {
        if self.active {
            self.scan.declared_names.extend(names);
        }
    }

    fn snapshot(&self) -> OccurrenceContext {
        OccurrenceContext {
            role: self.frame.role,
            enclosing: self.frame.enclosing,
            in_decorator: self.frame.in_decorator,
            in_super_arguments: self.frame.in_super_arguments,
            in_loop_control: self.frame.in_loop_control,
            in_resource_declaration: self.frame.in_resource_declaration,
            loop_variables: self.loop_scopes.visible(),
            lambda_locals: self
                .lambda_scopes
                .iter()
                .flatten()
                .cloned()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            class_name: self.class_stack.last().cloned().flatten(),
        }
    }

    fn record(&mut self, span: Span, kind: ExprKind, node: impl FnOnce() -> SyntaxNode) {
        if !self.active {
            return;
        }
        let Some((offset, length)) = self.source.source_range(span) else {
            debug!(file = %self.source.file_path, "skipping node with unmappable span");
            return;
        };
        match self.mode {
            Mode::Collect => {
                if !kind.is_eligible() || !self.config.is_enabled(kind) {
                    return;
                }
            }
            Mode::Select {
                offset: wanted_offset,
                length: wanted_length,
            } => {
                if offset != wanted_offset
                    || length != wanted_length
                    || !self.scan.occurrences.is_empty()
                {
                    return;
                }
            }
        }
        let source: &'a ParsedSource = self.source;
        let Some(text) = source.code().get(offset..offset + length) else {
            return;
        };
        let (line, column) = source.position(offset);
        let occurrence = Occurrence {
            text,
            kind,
            offset,
            length,
            line,
            column,
            node: node(),
            context: self.snapshot(),
        };
        self.scan.occurrences.push(occurrence);
    }

    // --------------------------------------------------------
    // Bodies and lambdas
    // --------------------------------------------------------

    /// Walk a declaration's body with the declaration as enclosing body.
    fn enter_body(
        &mut self,
        kind: BodyKind,
        block: Option<&BlockStmt>,
        visit: impl FnOnce(&mut Self),
    ) {
        let hoisted = block.map(function_scoped_loop_variables).unwrap_or_default();
        self.loop_scopes.enter_loop(hoisted);
        self.scoped(
            |frame| {
                frame.enclosing = Some(Enclosing::Declaration(kind));
                frame.role = Role::Nested;
            },
            visit,
        );
        self.loop_scopes.exit();
    }

    /// Walk a lambda body. Parameters shadow outer loop variables and,
    /// with the lambda's own declarations, become lambda locals; the lambda
    /// runs later, so loop-control and `super(...)` positions of the
    /// surrounding code do not apply inside.
    fn enter_lambda(
        &mut self,
        params: Vec<String>,
        locals: Vec<String>,
        block: Option<&BlockStmt>,
        resolved: bool,
        visit: impl FnOnce(&mut Self),
    ) {
        self.declare(params.iter().cloned());
        self.loop_scopes.enter_shadow(params);
        self.lambda_scopes.push(locals);
        let hoisted = block.map(function_scoped_loop_variables).unwrap_or_default();
        self.loop_scopes.enter_loop(hoisted);
        self.scoped(
            |frame| {
                frame.enclosing = Some(Enclosing::Lambda { resolved });
                frame.role = Role::Nested;
                frame.in_super_arguments = false;
                frame.in_loop_control = false;
                frame.in_resource_declaration = false;
            },
            visit,
        );
        self.lambda_scopes.pop();
        self.loop_scopes.exit();
        self.loop_scopes.exit();
    }

    fn lambda_resolved(&self, contextual: bool, mut params: impl Iterator<Item = bool>) -> bool {
        !self.source.dialect.is_typescript() || contextual || params.all(|typed| typed)
    }

    fn walk_arrow(&mut self, arrow: &ArrowExpr, contextual: bool) {
        let resolved = self.lambda_resolved(contextual, arrow.params.iter().map(is_typed_param));
        self.scoped(|frame| frame.role = Role::Nested, |this| arrow.params.visit_with(this));
        let params = arrow.params.iter().flat_map(binding_names).collect();
        let block = match &*arrow.body {
            BlockStmtOrExpr::BlockStmt(block) => Some(block),
            BlockStmtOrExpr::Expr(_) => None,
        };
        let locals = arrow_locals(arrow);
        self.enter_lambda(params, locals, block, resolved, |this| {
            arrow.body.visit_with(this)
        });
    }

    fn walk_lambda_function(&mut self, function: &Function, contextual: bool) {
        let resolved = self.lambda_resolved(
            contextual,
            function.params.iter().map(|param| is_typed_param(&param.pat)),
        );
        self.scoped(|frame| frame.role = Role::Nested, |this| function.params.visit_with(this));
        let params = function
            .params
            .iter()
            .flat_map(|param| binding_names(&param.pat))
            .collect();
        let locals = function_locals(function);
        self.enter_lambda(params, locals, function.body.as_ref(), resolved, |this| {
            function.body.visit_with(this)
        });
    }

    /// Decorators, parameters and body of a function-like declaration.
    fn walk_declaration_function(&mut self, function: &Function, kind: BodyKind) {
        self.scoped(
            |frame| frame.enclosing = None,
            |this| {
                function.decorators.visit_with(this);
                function.params.visit_with(this);
            },
        );
        self.declare(
            function
                .params
                .iter()
                .flat_map(|param| binding_names(&param.pat)),
        );
        self.enter_body(kind, function.body.as_ref(), |this| {
            function.body.visit_with(this)
        });
    }

    fn walk_call_parts(
        &mut self,
        callee: Option<&Expr>,
        args: &impl VisitWith<Self>,
        chaining: bool,
    ) {
        if let Some(callee) = callee {
            self.scoped(|frame| frame.role = Role::Callee, |this| callee.visit_with(this));
        }
        self.scoped(
            |frame| {
                frame.role = Role::Argument;
                frame.in_super_arguments |= chaining;
            },
            |this| args.visit_with(this),
        );
    }

    fn walk_declarator(&mut self, node: &VarDeclarator) {
        let resource = self.frame.in_resource_declaration;
        self.record(node.span, ExprKind::Other, || SyntaxNode::Declaration { resource });
        self.declare(binding_names(&node.name));
        self.scoped(|frame| frame.role = Role::Nested, |this| node.name.visit_with(this));
        let typed = matches!(&node.name, Pat::Ident(ident) if ident.type_ann.is_some());
        self.scoped(
            |frame| {
                frame.role = if typed {
                    Role::TypedInitializer
                } else {
                    Role::Nested
                }
            },
            |this| node.init.visit_with(this),
        );
    }

    fn walk_loop_head(&mut self, head: &ForHead, right: &Expr, body: &Stmt) {
        let names = match head {
            ForHead::VarDecl(decl) => declared_names(decl),
            ForHead::UsingDecl(decl) => decl
                .decls
                .iter()
                .flat_map(|declarator| binding_names(&declarator.name))
                .collect(),
            ForHead::Pat(_) => Vec::new(),
        };
        self.scoped(|frame| frame.role = Role::Nested, |this| right.visit_with(this));
        self.loop_scopes.enter_loop(names);
        self.scoped(|frame| frame.role = Role::Nested, |this| {
            head.visit_with(this);
            body.visit_with(this);
        });
        self.loop_scopes.exit();
    }

    fn with_class(&mut self, name: Option<String>, visit: impl FnOnce(&mut Self)) {
        self.class_stack.push(name);
        visit(self);
        self.class_stack.pop();
    }
}

impl Visit for Walker<'_> {
    fn visit_module_item(&mut self, node: &ModuleItem) {
        if self.is_outside(node.span()) {
            return;
        }
        node.visit_children_with(self);
    }

    fn visit_class_member(&mut self, node: &ClassMember) {
        if self.is_outside(node.span()) {
            return;
        }
        node.visit_children_with(self);
    }

    fn visit_stmt(&mut self, node: &Stmt) {
        if self.is_outside(node.span()) {
            return;
        }
        self.scoped(|frame| frame.role = Role::Nested, |this| node.visit_children_with(this));
    }

    fn visit_expr_stmt(&mut self, node: &ExprStmt) {
        self.scoped(|frame| frame.role = Role::Statement, |this| node.expr.visit_with(this));
    }

    fn visit_expr(&mut self, expr: &Expr) {
        if self.is_outside(expr.span()) {
            return;
        }
        if !self.active {
            expr.visit_children_with(self);
            return;
        }

        self.record(expr.span(), kind_of(expr), || expression_node(expr));

        let contextual = matches!(self.frame.role, Role::Argument | Role::TypedInitializer);
        match expr {
            Expr::Call(call) => {
                let callee = match &call.callee {
                    Callee::Expr(callee) => Some(&**callee),
                    Callee::Super(_) | Callee::Import(_) => None,
                };
                let chaining = matches!(call.callee, Callee::Super(_));
                self.walk_call_parts(callee, &call.args, chaining);
            }
            Expr::OptChain(chain) => match &*chain.base {
                OptChainBase::Call(call) => {
                    self.walk_call_parts(Some(&*call.callee), &call.args, false)
                }
                OptChainBase::Member(member) => {
                    self.scoped(|frame| frame.role = Role::Nested, |this| member.visit_with(this))
                }
            },
            Expr::New(new) => {
                self.scoped(|frame| frame.role = Role::Nested, |this| new.callee.visit_with(this));
                self.scoped(|frame| frame.role = Role::Argument, |this| new.args.visit_with(this));
            }
            Expr::TaggedTpl(tagged) => {
                self.scoped(|frame| frame.role = Role::Callee, |this| tagged.tag.visit_with(this));
                self.scoped(|frame| frame.role = Role::Nested, |this| tagged.tpl.visit_with(this));
            }
            Expr::Paren(paren) => {
                self.scoped(
                    |frame| frame.role = Role::Parenthesized,
                    |this| paren.expr.visit_with(this),
                );
            }
            Expr::Update(update) => {
                self.scoped(|frame| frame.role = Role::LValue, |this| update.arg.visit_with(this));
            }
            Expr::Unary(unary) if unary.op == UnaryOp::Delete => {
                self.scoped(|frame| frame.role = Role::LValue, |this| unary.arg.visit_with(this));
            }
            Expr::Arrow(arrow) => self.walk_arrow(arrow, contextual),
            Expr::Fn(fn_expr) => self.walk_lambda_function(&fn_expr.function, contextual),
            Expr::Class(class_expr) => {
                self.declare(class_expr.ident.iter().map(|ident| ident.sym.to_string()));
            }
            _ => {
                self.scoped(
                    |frame| frame.role = Role::Nested,
                    |this| expr.visit_children_with(this),
                );
            }
        }
    }

    fn visit_member_expr(&mut self, node: &MemberExpr) {
        if !self.active {
            node.visit_children_with(self);
            return;
        }
        self.scoped(|frame| frame.role = Role::Nested, |this| node.obj.visit_with(this));
        match &node.prop {
            MemberProp::Ident(name) => {
                self.record(name.span, ExprKind::Other, || SyntaxNode::MemberName)
            }
            MemberProp::PrivateName(name) => {
                self.record(name.span, ExprKind::Other, || SyntaxNode::MemberName)
            }
            MemberProp::Computed(computed) => {
                self.scoped(|frame| frame.role = Role::Nested, |this| computed.visit_with(this))
            }
        }
    }

    fn visit_super_prop_expr(&mut self, node: &SuperPropExpr) {
        if !self.active {
            return;
        }
        match &node.prop {
            SuperProp::Ident(name) => {
                self.record(name.span, ExprKind::Other, || SyntaxNode::MemberName)
            }
            SuperProp::Computed(computed) => {
                self.scoped(|frame| frame.role = Role::Nested, |this| computed.visit_with(this))
            }
        }
    }

    fn visit_simple_assign_target(&mut self, node: &SimpleAssignTarget) {
        self.scoped(|frame| frame.role = Role::LValue, |this| node.visit_children_with(this));
    }

    fn visit_pat(&mut self, node: &Pat) {
        match node {
            Pat::Expr(expr) => {
                self.scoped(|frame| frame.role = Role::LValue, |this| expr.visit_with(this))
            }
            _ => self.scoped(
                |frame| frame.role = Role::Nested,
                |this| node.visit_children_with(this),
            ),
        }
    }

    fn visit_binding_ident(&mut self, node: &BindingIdent) {
        self.record(node.id.span, ExprKind::Other, || SyntaxNode::Binding);
    }

    fn visit_decorator(&mut self, node: &Decorator) {
        self.scoped(|frame| frame.in_decorator = true, |this| node.visit_children_with(this));
    }

    // --------------------------------------------------------
    // Declarations
    // --------------------------------------------------------

    fn visit_var_decl(&mut self, node: &VarDecl) {
        let resource = self.frame.in_resource_declaration;
        self.record(node.span, ExprKind::Other, || SyntaxNode::Declaration { resource });
        node.visit_children_with(self);
    }

    fn visit_using_decl(&mut self, node: &UsingDecl) {
        self.record(node.span, ExprKind::Other, || SyntaxNode::Declaration { resource: true });
        self.scoped(
            |frame| frame.in_resource_declaration = true,
            |this| node.visit_children_with(this),
        );
    }

    fn visit_var_declarator(&mut self, node: &VarDeclarator) {
        if self.is_target(node.span) {
            let kind = self.target_kind;
            self.activate(|this| {
                this.enter_body(kind, None, |inner| inner.walk_declarator(node));
            });
            return;
        }
        if self.is_outside(node.span) {
            return;
        }
        self.walk_declarator(node);
    }

    fn visit_fn_decl(&mut self, node: &FnDecl) {
        if self.active {
            self.declare([node.ident.sym.to_string()]);
            return;
        }
        node.visit_children_with(self);
    }

    fn visit_function(&mut self, node: &Function) {
        if self.is_target(node.span) {
            let kind = self.target_kind;
            self.activate(|this| this.walk_declaration_function(node, kind));
            return;
        }
        if self.active {
            // Object-literal methods.
            self.walk_lambda_function(node, false);
            return;
        }
        if !self.is_outside(node.span) {
            node.visit_children_with(self);
        }
    }

    fn visit_getter_prop(&mut self, node: &GetterProp) {
        if !self.active {
            node.visit_children_with(self);
            return;
        }
        self.scoped(|frame| frame.role = Role::Nested, |this| node.key.visit_with(this));
        self.enter_lambda(Vec::new(), node.body.as_ref(), true, |this| {
            node.body.visit_with(this)
        });
    }

    fn visit_setter_prop(&mut self, node: &SetterProp) {
        if !self.active {
            node.visit_children_with(self);
            return;
        }
        let resolved = self.lambda_resolved(false, std::iter::once(is_typed_param(&node.param)));
        self.scoped(|frame| frame.role = Role::Nested, |this| {
            node.key.visit_with(this);
            node.param.visit_with(this);
        });
        self.enter_lambda(binding_names(&node.param), node.body.as_ref(), resolved, |this| {
            node.body.visit_with(this)
        });
    }

    // --------------------------------------------------------
    // Classes
    // --------------------------------------------------------

    fn visit_class(&mut self, node: &Class) {
        if !self.active {
            node.visit_children_with(self);
        }
    }

    fn visit_class_decl(&mut self, node: &ClassDecl) {
        if self.active {
            self.declare([node.ident.sym.to_string()]);
            return;
        }
        self.with_class(Some(node.ident.sym.to_string()), |this| {
            node.class.visit_with(this)
        });
    }

    fn visit_class_expr(&mut self, node: &ClassExpr) {
        if self.active {
            return;
        }
        let name = node.ident.as_ref().map(|ident| ident.sym.to_string());
        self.with_class(name, |this| node.class.visit_with(this));
    }

    fn visit_constructor(&mut self, node: &Constructor) {
        if !self.is_target(node.span) {
            if !self.is_outside(node.span) {
                node.visit_children_with(self);
            }
            return;
        }
        self.activate(|this| {
            this.scoped(|frame| frame.enclosing = None, |inner| node.params.visit_with(inner));
            for param in &node.params {
                let names = match param {
                    ParamOrTsParamProp::Param(param) => binding_names(&param.pat),
                    ParamOrTsParamProp::TsParamProp(prop) => match &prop.param {
                        TsParamPropParam::Ident(ident) => vec![ident.id.sym.to_string()],
                        TsParamPropParam::Assign(assign) => binding_names(&assign.left),
                    },
                };
                this.declare(names);
            }
            this.enter_body(BodyKind::Constructor, node.body.as_ref(), |inner| {
                node.body.visit_with(inner)
            });
        });
    }

    fn visit_class_prop(&mut self, node: &ClassProp) {
        if !self.is_target(node.span) {
            if !self.is_outside(node.span) {
                node.visit_children_with(self);
            }
            return;
        }
        let role = if node.type_ann.is_some() {
            Role::TypedInitializer
        } else {
            Role::Nested
        };
        self.activate(|this| {
            this.scoped(
                |frame| frame.enclosing = None,
                |inner| {
                    node.decorators.visit_with(inner);
                    node.key.visit_with(inner);
                },
            );
            this.enter_body(BodyKind::PropertyInitializer, None, |inner| {
                inner.scoped(|frame| frame.role = role, |value| node.value.visit_with(value))
            });
        });
    }

    fn visit_private_prop(&mut self, node: &PrivateProp) {
        if !self.is_target(node.span) {
            if !self.is_outside(node.span) {
                node.visit_children_with(self);
            }
            return;
        }
        let role = if node.type_ann.is_some() {
            Role::TypedInitializer
        } else {
            Role::Nested
        };
        self.activate(|this| {
            this.scoped(
                |frame| frame.enclosing = None,
                |inner| node.decorators.visit_with(inner),
            );
            this.enter_body(BodyKind::PropertyInitializer, None, |inner| {
                inner.scoped(|frame| frame.role = role, |value| node.value.visit_with(value))
            });
        });
    }

    fn visit_static_block(&mut self, node: &StaticBlock) {
        if !self.is_target(node.span) {
            if !self.is_outside(node.span) {
                node.visit_children_with(self);
            }
            return;
        }
        self.activate(|this| {
            this.enter_body(BodyKind::StaticBlock, Some(&node.body), |inner| {
                node.body.visit_with(inner)
            });
        });
    }

    // --------------------------------------------------------
    // Loops and exception handling
    // --------------------------------------------------------

    fn visit_for_stmt(&mut self, node: &ForStmt) {
        if !self.active {
            node.visit_children_with(self);
            return;
        }
        let names = match &node.init {
            Some(VarDeclOrExpr::VarDecl(decl)) => declared_names(decl),
            _ => Vec::new(),
        };
        self.loop_scopes.enter_loop(names);
        self.scoped(
            |frame| {
                frame.role = Role::Nested;
                frame.in_loop_control = true;
            },
            |this| node.init.visit_with(this),
        );
        self.scoped(|frame| frame.role = Role::Nested, |this| node.test.visit_with(this));
        self.scoped(
            |frame| {
                frame.role = Role::Nested;
                frame.in_loop_control = true;
            },
            |this| node.update.visit_with(this),
        );
        node.body.visit_with(self);
        self.loop_scopes.exit();
    }

    fn visit_for_in_stmt(&mut self, node: &ForInStmt) {
        if !self.active {
            node.visit_children_with(self);
            return;
        }
        self.walk_loop_head(&node.left, &node.right, &node.body);
    }

    fn visit_for_of_stmt(&mut self, node: &ForOfStmt) {
        if !self.active {
            node.visit_children_with(self);
            return;
        }
        self.walk_loop_head(&node.left, &node.right, &node.body);
    }

    fn visit_catch_clause(&mut self, node: &CatchClause) {
        if self.active {
            if let Some((offset, _)) = self.source.source_range(node.span) {
                self.scan.regions.push(ExceptionRegion {
                    offset,
                    readers: read_identifiers(&node.body).into_iter().collect(),
                });
            }
            if let Some(param) = &node.param {
                self.declare(binding_names(param));
            }
        }
        node.visit_children_with(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bodies::find_bodies;
    use crate::core::parsers::parse_snippet;
    use pretty_assertions::assert_eq;

    fn scan_first_body(code: &str, file: &str) -> (Vec<(String, Role, usize)>, usize) {
        let parsed = parse_snippet(code, file).unwrap();
        let config = AnalysisConfig::default();
        let body = find_bodies(&parsed).into_iter().next().unwrap();
        let scan = OccurrenceCollector::new(&parsed, &config).collect(&body);
        let texts = scan
            .occurrences
            .iter()
            .map(|o| (o.text.to_string(), o.context.role, o.line))
            .collect();
        (texts, scan.regions.len())
    }

    fn texts(code: &str) -> Vec<String> {
        scan_first_body(code, "test.js")
            .0
            .into_iter()
            .map(|(text, _, _)| text)
            .collect()
    }

    #[test]
    fn test_collects_outer_before_inner() {
        assert_eq!(
            texts("function f() {\n  foo(a.get(1), a.get(1));\n}"),
            vec!["foo(a.get(1), a.get(1))", "a.get(1)", "a.get", "a.get(1)", "a.get"]
        );
    }

    #[test]
    fn test_roles() {
        let (found, _) = scan_first_body(
            "function f() {\n  a.b();\n  x = (c.d);\n  e.f++;\n  g(h.i);\n}",
            "test.js",
        );
        let roles: Vec<(&str, Role)> = found
            .iter()
            .map(|(text, role, _)| (text.as_str(), *role))
            .collect();
        assert_eq!(
            roles,
            vec![
                ("a.b()", Role::Statement),
                ("a.b", Role::Callee),
                ("c.d", Role::Parenthesized),
                ("e.f", Role::LValue),
                ("g(h.i)", Role::Statement),
                ("h.i", Role::Argument),
            ]
        );
    }

    #[test]
    fn test_skips_nested_declarations() {
        let code = r#"
            function outer() {
                a.b();
                function inner() { c.d(); }
                class Local { m() { e.f(); } }
                const g = () => h.i();
            }
        "#;
        assert_eq!(texts(code), vec!["a.b()", "a.b", "h.i()", "h.i"]);
    }

    #[test]
    fn test_disabled_kinds_are_not_recorded() {
        let parsed = parse_snippet("function f() { a.b(c[0]); }", "test.js").unwrap();
        let config = AnalysisConfig::new(10, [ExprKind::IndexAccess]).unwrap();
        let body = find_bodies(&parsed).remove(0);
        let scan = OccurrenceCollector::new(&parsed, &config).collect(&body);
        let found: Vec<&str> = scan.occurrences.iter().map(|o| o.text).collect();
        assert_eq!(found, vec!["c[0]"]);
    }

    #[test]
    fn test_records_catch_regions_and_declared_names() {
        let parsed = parse_snippet(
            "function f(p) {\n  let x = 1;\n  try { a.b(); } catch (err) { log(x); }\n  for (let i = 0; i < 2; i++) {}\n}",
            "test.js",
        )
        .unwrap();
        let config = AnalysisConfig::default();
        let body = find_bodies(&parsed).remove(0);
        let scan = OccurrenceCollector::new(&parsed, &config).collect(&body);

        assert_eq!(scan.regions.len(), 1);
        let mut readers: Vec<&String> = scan.regions[0].readers.iter().collect();
        readers.sort();
        assert_eq!(readers, vec!["log", "x"]);
        for name in ["p", "x", "err", "i"] {
            assert!(scan.declared_names.contains(name), "missing {name}");
        }
    }

    #[test]
    fn test_loop_variables_in_context() {
        let parsed = parse_snippet(
            "function f(xs) {\n  for (const x of xs) {\n    a[x];\n    xs.map((x) => b[x]);\n  }\n}",
            "test.js",
        )
        .unwrap();
        let config = AnalysisConfig::default();
        let body = find_bodies(&parsed).remove(0);
        let scan = OccurrenceCollector::new(&parsed, &config).collect(&body);
        let by_text = |text: &str| {
            scan.occurrences
                .iter()
                .find(|o| o.text == text)
                .map(|o| o.context.loop_variables.clone())
                .unwrap()
        };
        assert_eq!(by_text("a[x]"), vec!["x"]);
        assert!(by_text("b[x]").is_empty());
    }

    #[test]
    fn test_var_loop_variables_cover_the_function() {
        let parsed = parse_snippet(
            "function f() {\n  a[i];\n  for (var i = 0; i < 2; i++) {}\n}",
            "test.js",
        )
        .unwrap();
        let config = AnalysisConfig::default();
        let body = find_bodies(&parsed).remove(0);
        let scan = OccurrenceCollector::new(&parsed, &config).collect(&body);
        assert_eq!(scan.occurrences[0].text, "a[i]");
        assert_eq!(scan.occurrences[0].context.loop_variables, vec!["i"]);
    }

    #[test]
    fn test_lambda_locals_in_context() {
        let parsed = parse_snippet(
            "function f(xs) {\n  a.b;\n  xs.map((x) => { const y = x; return c[y] + ((z) => z.w)(x); });\n}",
            "test.js",
        )
        .unwrap();
        let config = AnalysisConfig::default();
        let body = find_bodies(&parsed).remove(0);
        let scan = OccurrenceCollector::new(&parsed, &config).collect(&body);
        let by_text = |text: &str| {
            scan.occurrences
                .iter()
                .find(|o| o.text == text)
                .map(|o| o.context.lambda_locals.clone())
                .unwrap()
        };
        assert!(by_text("a.b").is_empty());
        assert_eq!(by_text("c[y]"), vec!["x", "y", "z"]);
        assert_eq!(by_text("z.w"), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_select_member_name_and_binding() {
        let code = "function f() {\n  const value = a.b;\n}";
        let parsed = parse_snippet(code, "test.js").unwrap();
        let config = AnalysisConfig::default();
        let body = find_bodies(&parsed).remove(0);
        let collector = OccurrenceCollector::new(&parsed, &config);

        let member_offset = code.find("a.b").unwrap();
        let selected = collector.select(&body, member_offset + 2, 1).unwrap();
        assert_eq!(selected.node, SyntaxNode::MemberName);

        let binding_offset = code.find("value").unwrap();
        let selected = collector.select(&body, binding_offset, 5).unwrap();
        assert_eq!(selected.node, SyntaxNode::Binding);

        let whole = collector.select(&body, member_offset, 3).unwrap();
        assert_eq!(whole.kind, ExprKind::QualifiedName);
        assert_eq!(whole.text, "a.b");

        assert!(collector.select(&body, member_offset, 2).is_none());
    }

    #[test]
    fn test_context_of_decorator_and_super_arguments() {
        let code = r#"
            class A extends B {
                constructor(@Inject(tokens.a) svc) {
                    super(cfg.get());
                }
            }
        "#;
        let parsed = parse_snippet(code, "test.ts").unwrap();
        let config = AnalysisConfig::default();
        let body = find_bodies(&parsed)
            .into_iter()
            .find(|body| body.kind == BodyKind::Constructor)
            .unwrap();
        let scan = OccurrenceCollector::new(&parsed, &config).collect(&body);

        let decorated = scan.occurrences.iter().find(|o| o.text == "tokens.a").unwrap();
        assert!(decorated.context.in_decorator);
        assert_eq!(decorated.context.enclosing, None);

        let chained = scan.occurrences.iter().find(|o| o.text == "cfg.get()").unwrap();
        assert!(chained.context.in_super_arguments);
        assert_eq!(
            chained.context.enclosing,
            Some(Enclosing::Declaration(BodyKind::Constructor))
        );
        assert_eq!(chained.context.class_name.as_deref(), Some("A"));
    }
}
