//! Variable name suggestions.
//!
//! - [`name_hint`]: the word an expression is "about" (`a.getName()` → `getName`)
//! - [`UniqueNameGenerator`]: turns a hint into a usable, non-clashing name

use std::collections::HashSet;

use swc_ecma_ast::{Callee, Expr, MemberExpr, MemberProp, OptChainBase, SuperProp};

/// Name used when an expression offers nothing better.
pub const DEFAULT_NAME: &str = "value";

/// Words that cannot name a local variable, or would shadow something
/// every JavaScript reader expects to be global.
const RESERVED_WORDS: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false", "finally",
    "for", "function", "if", "implements", "import", "in", "Infinity", "instanceof",
    "interface", "let", "NaN", "new", "null", "package", "private", "protected", "public",
    "return", "static", "super", "switch", "this", "throw", "true", "try", "typeof",
    "undefined", "var", "void", "while", "with", "yield",
];

pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// The last call or member name of an expression.
///
/// Index accesses name the indexed value with an `Item` suffix
/// (`rows[i]` → `rowsItem`).
pub fn name_hint(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Ident(ident) => Some(ident.sym.to_string()),
        Expr::Paren(paren) => name_hint(&paren.expr),
        Expr::Call(call) => match &call.callee {
            Callee::Expr(callee) => name_hint(callee),
            Callee::Super(_) | Callee::Import(_) => None,
        },
        Expr::Member(member) => member_hint(member),
        Expr::SuperProp(super_prop) => match &super_prop.prop {
            SuperProp::Ident(name) => Some(name.sym.to_string()),
            SuperProp::Computed(_) => None,
        },
        Expr::OptChain(chain) => match &*chain.base {
            OptChainBase::Call(call) => name_hint(&call.callee),
            OptChainBase::Member(member) => member_hint(member),
        },
        _ => None,
    }
}

fn member_hint(member: &MemberExpr) -> Option<String> {
    match &member.prop {
        MemberProp::Ident(name) => Some(name.sym.to_string()),
        MemberProp::PrivateName(name) => Some(name.name.to_string()),
        MemberProp::Computed(_) => name_hint(&member.obj).map(|base| format!("{base}Item")),
    }
}

/// Turn a hint into a camelCase identifier that is not a reserved word.
pub fn base_name(hint: Option<&str>) -> String {
    let Some(hint) = hint else {
        return DEFAULT_NAME.to_string();
    };
    let name = to_lower_camel(&sanitize(strip_accessor_prefix(hint)));
    if name.is_empty() {
        DEFAULT_NAME.to_string()
    } else if is_reserved_word(&name) {
        format!("{name}Value")
    } else {
        name
    }
}

/// `getName` → `Name`, `isOpen` → `Open`; `island` stays `island`.
fn strip_accessor_prefix(hint: &str) -> &str {
    for prefix in ["get", "is", "has"] {
        if let Some(rest) = hint.strip_prefix(prefix)
            && rest.starts_with(|c: char| c.is_ascii_uppercase())
        {
            return rest;
        }
    }
    hint
}

fn sanitize(name: &str) -> String {
    let trimmed = name.trim_start_matches(|c: char| c.is_ascii_digit());
    trimmed
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
        .collect()
}

/// `Name` → `name`, `MAX_SIZE` → `maxSize`, `PI` → `pi`.
fn to_lower_camel(name: &str) -> String {
    if !name.chars().any(|c| c.is_ascii_lowercase()) {
        let mut parts = name.split('_').filter(|part| !part.is_empty());
        let mut result = parts.next().unwrap_or_default().to_ascii_lowercase();
        for part in parts {
            let lower = part.to_ascii_lowercase();
            let mut chars = lower.chars();
            if let Some(first) = chars.next() {
                result.push(first.to_ascii_uppercase());
                result.extend(chars);
            }
        }
        return result;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

// ============================================================
// UniqueNameGenerator
// ============================================================

/// Generates names that do not collide with names declared in a body.
///
/// Only declarations are avoided. A name that is read but never declared in
/// the body (a global, a closure variable) is still offered; whether using
/// it is safe is decided by the conflict check.
pub struct UniqueNameGenerator<'a> {
    used_names: &'a HashSet<String>,
}

impl<'a> UniqueNameGenerator<'a> {
    pub fn new(used_names: &'a HashSet<String>) -> Self {
        Self { used_names }
    }

    /// `base` if free, otherwise `base2`, `base3`, ...
    pub fn generate(&self, base: &str) -> String {
        if !self.is_in_use(base) {
            return base.to_string();
        }
        (2..)
            .map(|i| format!("{base}{i}"))
            .find(|candidate| !self.is_in_use(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    pub fn is_in_use(&self, name: &str) -> bool {
        self.used_names.contains(name)
    }
}

/// Suggested variable name for an expression with the given hint.
pub fn suggest_name(hint: Option<&str>, declared: &HashSet<String>) -> String {
    UniqueNameGenerator::new(declared).generate(&base_name(hint))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parsers::parse_snippet;
    use swc_ecma_ast::{ModuleItem, Stmt};

    fn hint(code: &str) -> Option<String> {
        let parsed = parse_snippet(code, "test.ts").unwrap();
        let Some(ModuleItem::Stmt(Stmt::Expr(stmt))) = parsed.module.body.first() else {
            panic!("expected an expression statement");
        };
        name_hint(&stmt.expr)
    }

    fn suggest(code: &str) -> String {
        suggest_name(hint(code).as_deref(), &HashSet::new())
    }

    #[test]
    fn test_hints() {
        assert_eq!(hint("a.getName();").as_deref(), Some("getName"));
        assert_eq!(hint("this.items.length;").as_deref(), Some("length"));
        assert_eq!(hint("rows[i];").as_deref(), Some("rowsItem"));
        assert_eq!(hint("this.#cache;").as_deref(), Some("cache"));
        assert_eq!(hint("a?.b?.size();").as_deref(), Some("size"));
        assert_eq!(hint("foo()[0];").as_deref(), Some("fooItem"));
        assert_eq!(hint("(a + b);"), None);
    }

    #[test]
    fn test_suggestions() {
        assert_eq!(suggest("a.getName();"), "name");
        assert_eq!(suggest("user.isActive();"), "active");
        assert_eq!(suggest("island.size;"), "size");
        assert_eq!(suggest("Math.PI;"), "pi");
        assert_eq!(suggest("config.MAX_SIZE;"), "maxSize");
        assert_eq!(suggest("a.default;"), "defaultValue");
        assert_eq!(suggest("x + 1;"), "value");
    }

    #[test]
    fn test_unique_name_with_conflict() {
        let declared: HashSet<String> = ["name", "name2"].iter().map(|s| s.to_string()).collect();
        assert_eq!(suggest_name(Some("getName"), &declared), "name3");
        assert_eq!(suggest_name(Some("size"), &declared), "size");
    }

    #[test]
    fn test_reserved_words() {
        assert!(is_reserved_word("class"));
        assert!(!is_reserved_word("klass"));
    }
}
