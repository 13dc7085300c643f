//! Grammar types
//!
//! This module defines the in-memory representation of parsed grammars: a
//! flat expression arena referenced by index, plus the named rules in
//! source order. Grammars are immutable once built and can be shared
//! freely across concurrent parses.

use crate::char_class::CharClass;
use crate::parser::Parser;
use crate::result::{MatchResult, ParseError};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of an expression in a grammar's arena
pub type ExprId = usize;

/// Expression forms that make up a grammar
///
/// Composite forms hold indices into the grammar's expression arena
/// instead of boxed children, which keeps grammars cheaply clonable and
/// drops without deep recursion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    /// Match a fixed string exactly
    Literal {
        /// The text to match
        text: String,
    },

    /// Match one code point inside a character class
    Class {
        /// The set of accepted code points
        class: CharClass,
    },

    /// Match any single code point
    Dot,

    /// Match the rule with the given name
    ///
    /// Resolution is lazy: the name is looked up when the reference is
    /// evaluated, and an unresolved name is a hard error at match time.
    Reference {
        /// Name of the referenced rule
        name: String,
    },

    /// Match each child in order; any failure fails the whole
    Sequence {
        /// Indices of the children, at least one
        exprs: Vec<ExprId>,
    },

    /// Ordered alternatives; the first to succeed wins
    Choice {
        /// Indices of the alternatives, at least two
        exprs: Vec<ExprId>,
    },

    /// Match the child if possible, otherwise consume nothing
    Optional {
        /// Index of the child
        expr: ExprId,
    },

    /// Match the child zero or more times, greedily
    Star {
        /// Index of the child
        expr: ExprId,
    },

    /// Match the child one or more times, greedily
    Plus {
        /// Index of the child
        expr: ExprId,
    },

    /// Succeed iff the child would match here; consumes nothing
    AndPredicate {
        /// Index of the child
        expr: ExprId,
    },

    /// Succeed iff the child would fail here; consumes nothing
    NotPredicate {
        /// Index of the child
        expr: ExprId,
    },
}

/// A named rule: an identifier bound to an expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// The rule's identifier, unique within its grammar
    pub name: String,
    /// Index of the rule's expression in the arena
    pub expr: ExprId,
}

/// A complete grammar
///
/// Rules keep their source definition order; the first rule is the default
/// start. The grammar is immutable after construction, so one instance can
/// back any number of concurrent [`Grammar::parse`] calls, each of which
/// owns its own memoization cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grammar {
    pub(crate) exprs: Vec<Expr>,
    pub(crate) rules: Vec<Rule>,
    pub(crate) index: HashMap<String, usize>,
}

impl Grammar {
    /// Get an expression by index
    #[inline]
    pub fn expr(&self, id: ExprId) -> Option<&Expr> {
        self.exprs.get(id)
    }

    /// Total expression count
    #[inline]
    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    /// The rules in source definition order
    #[inline]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Look up a rule's position by name
    #[inline]
    pub fn rule_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Look up a rule by name
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rule_index(name).map(|i| &self.rules[i])
    }

    /// Name of the default starting rule (the first one defined)
    pub fn start_rule(&self) -> Option<&str> {
        self.rules.first().map(|rule| rule.name.as_str())
    }

    /// Attempt to match `starting_rule` against a prefix of `input`
    ///
    /// Returns [`MatchResult::Match`] with the consumed span on success,
    /// [`MatchResult::Mismatch`] with the furthest position reached
    /// otherwise. A missing starting rule or a dangling rule reference is
    /// an [`ParseError::UnknownRule`] error, not a mismatch.
    pub fn parse(&self, input: &str, starting_rule: &str) -> Result<MatchResult, ParseError> {
        Parser::new(self, input).parse(starting_rule)
    }

    /// [`Grammar::parse`] starting from the first-defined rule
    pub fn parse_default(&self, input: &str) -> Result<MatchResult, ParseError> {
        match self.rules.first() {
            Some(rule) => self.parse(input, &rule.name),
            None => Err(ParseError::UnknownRule {
                name: String::new(),
            }),
        }
    }

    /// Serialize to JSON
    #[inline]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON
    #[inline]
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    fn fmt_expr(&self, f: &mut fmt::Formatter<'_>, id: ExprId, min_level: u8) -> fmt::Result {
        let Some(expr) = self.exprs.get(id) else {
            return f.write_str("?");
        };

        let level = match expr {
            Expr::Choice { .. } => 0,
            Expr::Sequence { .. } => 1,
            Expr::AndPredicate { .. } | Expr::NotPredicate { .. } => 2,
            Expr::Optional { .. } | Expr::Star { .. } | Expr::Plus { .. } => 3,
            _ => 4,
        };
        if level < min_level {
            f.write_str("(")?;
            self.fmt_expr(f, id, 0)?;
            return f.write_str(")");
        }

        match expr {
            Expr::Literal { text } => {
                f.write_str("'")?;
                for c in text.chars() {
                    write_literal_char(f, c)?;
                }
                f.write_str("'")
            }
            Expr::Class { class } => write!(f, "{class}"),
            Expr::Dot => f.write_str("."),
            Expr::Reference { name } => f.write_str(name),
            Expr::Sequence { exprs } => {
                for (i, &child) in exprs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    self.fmt_expr(f, child, 2)?;
                }
                Ok(())
            }
            Expr::Choice { exprs } => {
                for (i, &child) in exprs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" / ")?;
                    }
                    self.fmt_expr(f, child, 1)?;
                }
                Ok(())
            }
            Expr::Optional { expr } => {
                self.fmt_expr(f, *expr, 4)?;
                f.write_str("?")
            }
            Expr::Star { expr } => {
                self.fmt_expr(f, *expr, 4)?;
                f.write_str("*")
            }
            Expr::Plus { expr } => {
                self.fmt_expr(f, *expr, 4)?;
                f.write_str("+")
            }
            Expr::AndPredicate { expr } => {
                f.write_str("&")?;
                self.fmt_expr(f, *expr, 3)
            }
            Expr::NotPredicate { expr } => {
                f.write_str("!")?;
                self.fmt_expr(f, *expr, 3)
            }
        }
    }
}

/// Escape a code point for use inside a single-quoted literal
fn write_literal_char(f: &mut fmt::Formatter<'_>, c: char) -> fmt::Result {
    match c {
        '\n' => f.write_str("\\n"),
        '\r' => f.write_str("\\r"),
        '\t' => f.write_str("\\t"),
        '\'' => f.write_str("\\'"),
        '\\' => f.write_str("\\\\"),
        c if (c as u32) < 0x20 => write!(f, "\\{:03o}", c as u32),
        c => write!(f, "{c}"),
    }
}

impl fmt::Display for Grammar {
    /// PEG notation, one `name <- expression` definition per line
    ///
    /// The output parses back to an equal grammar.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            write!(f, "{} <- ", rule.name)?;
            self.fmt_expr(f, rule.expr, 0)?;
            f.write_str("\n")?;
        }
        Ok(())
    }
}

impl PartialEq for Grammar {
    /// Structural equality: same rule names in the same order, bound to
    /// structurally equal expressions
    ///
    /// Arena layout is ignored, so a hand-built grammar and its re-parsed
    /// printout compare equal.
    fn eq(&self, other: &Self) -> bool {
        self.rules.len() == other.rules.len()
            && self
                .rules
                .iter()
                .zip(&other.rules)
                .all(|(a, b)| a.name == b.name && expr_eq(self, a.expr, other, b.expr))
    }
}

impl Eq for Grammar {}

fn expr_eq(ga: &Grammar, a: ExprId, gb: &Grammar, b: ExprId) -> bool {
    let (Some(ea), Some(eb)) = (ga.exprs.get(a), gb.exprs.get(b)) else {
        return false;
    };
    match (ea, eb) {
        (Expr::Literal { text: ta }, Expr::Literal { text: tb }) => ta == tb,
        (Expr::Class { class: ca }, Expr::Class { class: cb }) => ca == cb,
        (Expr::Dot, Expr::Dot) => true,
        (Expr::Reference { name: na }, Expr::Reference { name: nb }) => na == nb,
        (Expr::Sequence { exprs: xa }, Expr::Sequence { exprs: xb })
        | (Expr::Choice { exprs: xa }, Expr::Choice { exprs: xb }) => {
            xa.len() == xb.len()
                && xa
                    .iter()
                    .zip(xb)
                    .all(|(&ca, &cb)| expr_eq(ga, ca, gb, cb))
        }
        (Expr::Optional { expr: xa }, Expr::Optional { expr: xb })
        | (Expr::Star { expr: xa }, Expr::Star { expr: xb })
        | (Expr::Plus { expr: xa }, Expr::Plus { expr: xb })
        | (Expr::AndPredicate { expr: xa }, Expr::AndPredicate { expr: xb })
        | (Expr::NotPredicate { expr: xa }, Expr::NotPredicate { expr: xb }) => {
            expr_eq(ga, *xa, gb, *xb)
        }
        _ => false,
    }
}
