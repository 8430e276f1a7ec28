//! Node classification.
//!
//! Decides which expression shapes are extraction candidates at all. The
//! answer depends only on the node itself; context-sensitive exclusions live
//! in `crate::core::filter`.

use std::fmt;

use serde::{Deserialize, Serialize};
use swc_ecma_ast::{Callee, Expr, MemberExpr, MemberProp, OptChainBase, SuperProp};

/// Kind of an expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExprKind {
    /// `f(x)`, `a.b(x)`, `a?.b(x)`
    Call,
    /// `this.x`, `f().x`, `this.#x`, `super.x`, `a?.b`
    FieldAccess,
    /// A member chain made only of identifiers: `a.b`, `Math.PI`
    QualifiedName,
    /// `a[i]`, `super[k]`, `a?.[i]`
    IndexAccess,
    /// Anything else.
    Other,
}

impl ExprKind {
    /// The four kinds the collector may record.
    pub const ELIGIBLE: [ExprKind; 4] = [
        ExprKind::Call,
        ExprKind::FieldAccess,
        ExprKind::QualifiedName,
        ExprKind::IndexAccess,
    ];

    pub fn is_eligible(self) -> bool {
        !matches!(self, ExprKind::Other)
    }

    /// Member-style kinds lose their `this` binding when hoisted out of callee position.
    pub fn is_member_access(self) -> bool {
        matches!(
            self,
            ExprKind::FieldAccess | ExprKind::QualifiedName | ExprKind::IndexAccess
        )
    }
}

impl fmt::Display for ExprKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprKind::Call => write!(f, "call"),
            ExprKind::FieldAccess => write!(f, "field access"),
            ExprKind::QualifiedName => write!(f, "qualified name"),
            ExprKind::IndexAccess => write!(f, "index access"),
            ExprKind::Other => write!(f, "expression"),
        }
    }
}

/// Result of classifying an expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Eligible(ExprKind),
    Ineligible,
}

impl Classification {
    pub fn kind(&self) -> Option<ExprKind> {
        match self {
            Classification::Eligible(kind) => Some(*kind),
            Classification::Ineligible => None,
        }
    }
}

/// Classify an expression node.
///
/// `super(...)` and `import(...)` are calls syntactically but neither can be
/// hoisted: the first must stay a constructor statement, the second is a
/// module load.
pub fn classify(expr: &Expr) -> Classification {
    let kind = match expr {
        Expr::Call(call) => match &call.callee {
            Callee::Expr(_) => ExprKind::Call,
            Callee::Super(_) | Callee::Import(_) => return Classification::Ineligible,
        },
        Expr::Member(member) => member_kind(member),
        Expr::SuperProp(super_prop) => match &super_prop.prop {
            SuperProp::Ident(_) => ExprKind::FieldAccess,
            SuperProp::Computed(_) => ExprKind::IndexAccess,
        },
        Expr::OptChain(chain) => match &*chain.base {
            OptChainBase::Call(_) => ExprKind::Call,
            OptChainBase::Member(member) if member.prop.is_computed() => ExprKind::IndexAccess,
            OptChainBase::Member(_) => ExprKind::FieldAccess,
        },
        _ => return Classification::Ineligible,
    };
    Classification::Eligible(kind)
}

/// Kind of any expression, `Other` for ineligible ones.
pub fn kind_of(expr: &Expr) -> ExprKind {
    classify(expr).kind().unwrap_or(ExprKind::Other)
}

fn member_kind(member: &MemberExpr) -> ExprKind {
    match &member.prop {
        MemberProp::Computed(_) => ExprKind::IndexAccess,
        MemberProp::Ident(_) if is_qualified_name(&member.obj) => ExprKind::QualifiedName,
        _ => ExprKind::FieldAccess,
    }
}

fn is_qualified_name(expr: &Expr) -> bool {
    match expr {
        Expr::Ident(_) => true,
        Expr::Member(member) => {
            matches!(member.prop, MemberProp::Ident(_)) && is_qualified_name(&member.obj)
        }
        _ => false,
    }
}
