//! Extraction safety rules.
//!
//! Each rule is an independent, total predicate over one occurrence. An
//! occurrence is extractable only if every rule passes; a failing rule is an
//! exclusion with a reason, never an error.

use std::fmt;

use enum_dispatch::enum_dispatch;
use tracing::trace;

use crate::core::collect::{Enclosing, ExprShape, Occurrence, Role, SyntaxNode, ValueForm};
use crate::core::symbols::{ReturnKind, SymbolTable};

/// Why an occurrence cannot be extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    DeclarationName,
    NullLiteral,
    ArrayInitializer,
    AssignmentTarget,
    MethodSelector,
    ConstructorChaining,
    DecoratorArgument,
    NoEnclosingBody,
    UnresolvedLambda,
    NestedAssignment,
    MemberName,
    ResourceDeclaration,
    NotAValue,
    LoopControl,
    LoopVariable(String),
    LambdaLocal(String),
    /// No node matches a selection exactly.
    NoNodeSelected,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::DeclarationName => write!(f, "is the name of a declaration"),
            SkipReason::NullLiteral => write!(f, "is a `null` literal"),
            SkipReason::ArrayInitializer => write!(f, "is an array literal"),
            SkipReason::AssignmentTarget => write!(f, "is written to"),
            SkipReason::MethodSelector => {
                write!(f, "is called as a method and would lose its `this`")
            }
            SkipReason::ConstructorChaining => write!(f, "is an argument of `super(...)`"),
            SkipReason::DecoratorArgument => write!(f, "is inside a decorator"),
            SkipReason::NoEnclosingBody => write!(f, "is outside any function body"),
            SkipReason::UnresolvedLambda => {
                write!(f, "is inside a lambda whose parameter types are unknown")
            }
            SkipReason::NestedAssignment => write!(f, "is an assignment used as a value"),
            SkipReason::MemberName => write!(f, "is a member name"),
            SkipReason::ResourceDeclaration => write!(f, "is a `using` declaration"),
            SkipReason::NotAValue => write!(f, "does not produce a value"),
            SkipReason::LoopControl => write!(f, "is part of a `for` initializer or update"),
            SkipReason::LoopVariable(name) => {
                write!(f, "reads loop variable `{}` which changes every iteration", name)
            }
            SkipReason::LambdaLocal(name) => {
                write!(f, "reads `{}` which only exists inside an enclosing lambda", name)
            }
            SkipReason::NoNodeSelected => write!(f, "does not match a single node"),
        }
    }
}

/// Whether a node produces a value usable as an initializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Valueness {
    Value,
    /// Not provably a value; accepted.
    Inferred,
    NonValue,
}

/// Valueness of an occurrence, resolving calls through the symbol table.
pub fn valueness(occurrence: &Occurrence<'_>, symbols: &SymbolTable) -> Valueness {
    let SyntaxNode::Expression(facts) = &occurrence.node else {
        return Valueness::NonValue;
    };
    match &facts.value {
        ValueForm::Plain => Valueness::Value,
        ValueForm::Void | ValueForm::SuperCall => Valueness::NonValue,
        ValueForm::Call(target) => {
            match symbols.resolve(target, occurrence.context.class_name.as_deref()) {
                Some(ReturnKind::Void) => Valueness::NonValue,
                Some(ReturnKind::Value) => Valueness::Value,
                Some(ReturnKind::Unannotated) | None => Valueness::Inferred,
            }
        }
    }
}

// ============================================================
// Rules
// ============================================================

/// A single extraction safety rule.
#[enum_dispatch]
pub trait ExtractionRule {
    /// Rule name, for diagnostics.
    fn name(&self) -> &'static str;

    fn check(&self, occurrence: &Occurrence<'_>, symbols: &SymbolTable) -> Result<(), SkipReason>;
}

#[enum_dispatch(ExtractionRule)]
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    StandaloneFragment(StandaloneFragment),
    ConstructorChaining(ConstructorChaining),
    EnclosingBody(EnclosingBody),
    AssignmentContext(AssignmentContext),
    IdentifierRole(IdentifierRole),
    ResourceDeclaration(ResourceDeclaration),
    RValue(RValue),
    LoopControl(LoopControl),
    LoopVariable(LoopVariable),
    LambdaLocal(LambdaLocal),
}

/// All rules, in evaluation order.
pub const RULES: [Rule; 10] = [
    Rule::StandaloneFragment(StandaloneFragment),
    Rule::ConstructorChaining(ConstructorChaining),
    Rule::EnclosingBody(EnclosingBody),
    Rule::AssignmentContext(AssignmentContext),
    Rule::IdentifierRole(IdentifierRole),
    Rule::ResourceDeclaration(ResourceDeclaration),
    Rule::RValue(RValue),
    Rule::LoopControl(LoopControl),
    Rule::LoopVariable(LoopVariable),
    Rule::LambdaLocal(LambdaLocal),
];

fn shape(occurrence: &Occurrence<'_>) -> Option<ExprShape> {
    match &occurrence.node {
        SyntaxNode::Expression(facts) => Some(facts.shape),
        _ => None,
    }
}

/// The node stands on its own as an expression: not a declaration name, not
/// `null`, not an array literal, not written to, not a method selector.
#[derive(Debug, Clone, Copy)]
pub struct StandaloneFragment;

impl ExtractionRule for StandaloneFragment {
    fn name(&self) -> &'static str {
        "standalone-fragment"
    }

    fn check(&self, occurrence: &Occurrence<'_>, _: &SymbolTable) -> Result<(), SkipReason> {
        if matches!(occurrence.node, SyntaxNode::Binding) {
            return Err(SkipReason::DeclarationName);
        }
        match shape(occurrence) {
            Some(ExprShape::Null) => return Err(SkipReason::NullLiteral),
            Some(ExprShape::Array) => return Err(SkipReason::ArrayInitializer),
            _ => {}
        }
        match occurrence.context.role {
            Role::LValue => Err(SkipReason::AssignmentTarget),
            Role::Callee if occurrence.kind.is_member_access() => Err(SkipReason::MethodSelector),
            _ => Ok(()),
        }
    }
}

/// Nothing may be evaluated ahead of `super(...)` in a derived constructor.
#[derive(Debug, Clone, Copy)]
pub struct ConstructorChaining;

impl ExtractionRule for ConstructorChaining {
    fn name(&self) -> &'static str {
        "constructor-chaining"
    }

    fn check(&self, occurrence: &Occurrence<'_>, _: &SymbolTable) -> Result<(), SkipReason> {
        if occurrence.context.in_super_arguments {
            Err(SkipReason::ConstructorChaining)
        } else {
            Ok(())
        }
    }
}

/// There is a body to declare the variable in.
#[derive(Debug, Clone, Copy)]
pub struct EnclosingBody;

impl ExtractionRule for EnclosingBody {
    fn name(&self) -> &'static str {
        "enclosing-body"
    }

    fn check(&self, occurrence: &Occurrence<'_>, _: &SymbolTable) -> Result<(), SkipReason> {
        if occurrence.context.in_decorator {
            return Err(SkipReason::DecoratorArgument);
        }
        match occurrence.context.enclosing {
            None => Err(SkipReason::NoEnclosingBody),
            Some(Enclosing::Lambda { resolved: false }) => Err(SkipReason::UnresolvedLambda),
            Some(Enclosing::Lambda { resolved: true }) | Some(Enclosing::Declaration(_)) => Ok(()),
        }
    }
}

/// Assignments are extractable only as whole statements or in parentheses.
#[derive(Debug, Clone, Copy)]
pub struct AssignmentContext;

impl ExtractionRule for AssignmentContext {
    fn name(&self) -> &'static str {
        "assignment-context"
    }

    fn check(&self, occurrence: &Occurrence<'_>, _: &SymbolTable) -> Result<(), SkipReason> {
        let is_assignment = shape(occurrence) == Some(ExprShape::Assignment);
        let standalone = matches!(
            occurrence.context.role,
            Role::Statement | Role::Parenthesized
        );
        if is_assignment && !standalone {
            Err(SkipReason::NestedAssignment)
        } else {
            Ok(())
        }
    }
}

/// Identifiers qualify only as plain reads.
#[derive(Debug, Clone, Copy)]
pub struct IdentifierRole;

impl ExtractionRule for IdentifierRole {
    fn name(&self) -> &'static str {
        "identifier-role"
    }

    fn check(&self, occurrence: &Occurrence<'_>, _: &SymbolTable) -> Result<(), SkipReason> {
        match occurrence.node {
            SyntaxNode::Binding => Err(SkipReason::DeclarationName),
            SyntaxNode::MemberName => Err(SkipReason::MemberName),
            _ => Ok(()),
        }
    }
}

/// `using` declarations own a resource and cannot move.
#[derive(Debug, Clone, Copy)]
pub struct ResourceDeclaration;

impl ExtractionRule for ResourceDeclaration {
    fn name(&self) -> &'static str {
        "resource-declaration"
    }

    fn check(&self, occurrence: &Occurrence<'_>, _: &SymbolTable) -> Result<(), SkipReason> {
        match occurrence.node {
            SyntaxNode::Declaration { resource }
                if resource || occurrence.context.in_resource_declaration =>
            {
                Err(SkipReason::ResourceDeclaration)
            }
            _ => Ok(()),
        }
    }
}

/// The node yields a value; only definite non-values are rejected.
#[derive(Debug, Clone, Copy)]
pub struct RValue;

impl ExtractionRule for RValue {
    fn name(&self) -> &'static str {
        "r-value"
    }

    fn check(&self, occurrence: &Occurrence<'_>, symbols: &SymbolTable) -> Result<(), SkipReason> {
        match valueness(occurrence, symbols) {
            Valueness::NonValue => Err(SkipReason::NotAValue),
            Valueness::Value | Valueness::Inferred => Ok(()),
        }
    }
}

/// `for` initializers and updaters run on their own schedule.
#[derive(Debug, Clone, Copy)]
pub struct LoopControl;

impl ExtractionRule for LoopControl {
    fn name(&self) -> &'static str {
        "loop-control"
    }

    fn check(&self, occurrence: &Occurrence<'_>, _: &SymbolTable) -> Result<(), SkipReason> {
        if occurrence.context.in_loop_control {
            Err(SkipReason::LoopControl)
        } else {
            Ok(())
        }
    }
}

/// Reading a loop-control variable ties the value to one iteration.
#[derive(Debug, Clone, Copy)]
pub struct LoopVariable;

impl ExtractionRule for LoopVariable {
    fn name(&self) -> &'static str {
        "loop-variable"
    }

    fn check(&self, occurrence: &Occurrence<'_>, _: &SymbolTable) -> Result<(), SkipReason> {
        let SyntaxNode::Expression(facts) = &occurrence.node else {
            return Ok(());
        };
        match occurrence
            .context
            .loop_variables
            .iter()
            .find(|name| facts.reads.contains(name))
        {
            Some(name) => Err(SkipReason::LoopVariable(name.clone())),
            None => Ok(()),
        }
    }
}

/// A lambda's parameters and locals are rebound on every call and do not
/// exist at the body level the variable would be declared in.
#[derive(Debug, Clone, Copy)]
pub struct LambdaLocal;

impl ExtractionRule for LambdaLocal {
    fn name(&self) -> &'static str {
        "lambda-local"
    }

    fn check(&self, occurrence: &Occurrence<'_>, _: &SymbolTable) -> Result<(), SkipReason> {
        let SyntaxNode::Expression(facts) = &occurrence.node else {
            return Ok(());
        };
        match occurrence
            .context
            .lambda_locals
            .iter()
            .find(|name| facts.reads.contains(name))
        {
            Some(name) => Err(SkipReason::LambdaLocal(name.clone())),
            None => Ok(()),
        }
    }
}

// ============================================================
// CandidateFilter
// ============================================================

/// Applies every rule to an occurrence.
pub struct CandidateFilter<'s> {
    symbols: &'s SymbolTable,
}

impl<'s> CandidateFilter<'s> {
    pub fn new(symbols: &'s SymbolTable) -> Self {
        Self { symbols }
    }

    pub fn is_extractable(&self, occurrence: &Occurrence<'_>) -> bool {
        RULES.iter().all(|rule| match rule.check(occurrence, self.symbols) {
            Ok(()) => true,
            Err(reason) => {
                trace!(
                    rule = rule.name(),
                    text = occurrence.text,
                    line = occurrence.line,
                    %reason,
                    "occurrence rejected"
                );
                false
            }
        })
    }

    /// Every failing rule's reason, in rule order.
    pub fn rejections(&self, occurrence: &Occurrence<'_>) -> Vec<SkipReason> {
        RULES
            .iter()
            .filter_map(|rule| rule.check(occurrence, self.symbols).err())
            .collect()
    }
}
