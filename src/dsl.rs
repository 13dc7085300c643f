//! Grammar-building DSL
//!
//! A small combinator layer for defining grammars directly in Rust. The
//! hard-coded meta-grammar is assembled with it, and it is the natural way
//! to build grammars in tests or in code that does not start from PEG
//! source text.
//!
//! # Example
//!
//! ```rust
//! use pegrat::dsl::{lit, ref_, seq, star, GrammarBuilder};
//!
//! let grammar = GrammarBuilder::new()
//!     .rule("greeting", seq((lit("hello"), star(ref_("space")), lit("world"))))
//!     .rule("space", lit(" "))
//!     .build().unwrap();
//! ```

use crate::char_class::{CharClass, CharRange};
use crate::grammar::{Expr, ExprId, Grammar, Rule};
use crate::result::ParseError;
use hashbrown::HashMap;

/// Parslet trait - implemented by all grammar combinators
pub trait Parslet {
    /// Add this combinator's expression to the builder, returning its index
    fn build(self, builder: &mut GrammarBuilder) -> ExprId;
}

/// Builder for [`Grammar`] values
///
/// Rules keep insertion order; the first rule defined becomes the default
/// start. Rule names are unique: defining a name twice is a
/// [`ParseError::DuplicateRule`], reported immediately by [`define`]
/// (or, for [`rule`] chains, remembered and reported by [`build`]).
///
/// [`define`]: GrammarBuilder::define
/// [`rule`]: GrammarBuilder::rule
/// [`build`]: GrammarBuilder::build
#[derive(Default)]
pub struct GrammarBuilder {
    exprs: Vec<Expr>,
    rules: Vec<Rule>,
    index: HashMap<String, usize>,
    duplicate: Option<String>,
}

impl GrammarBuilder {
    /// Create a new grammar builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule to the grammar
    ///
    /// A duplicate name is remembered and surfaces as the error from
    /// [`build`](GrammarBuilder::build), so chains stay ergonomic.
    pub fn rule(mut self, name: &str, parslet: impl Parslet) -> Self {
        let expr = parslet.build(&mut self);
        let _ = self.define(name, expr);
        self
    }

    /// Add an expression directly and return its index
    pub fn add_expr(&mut self, expr: Expr) -> ExprId {
        let id = self.exprs.len();
        self.exprs.push(expr);
        id
    }

    /// Bind `name` to an already-added expression
    ///
    /// Fails with [`ParseError::DuplicateRule`] if `name` is already
    /// defined; the earlier definition is kept.
    pub fn define(&mut self, name: &str, expr: ExprId) -> Result<(), ParseError> {
        if self.index.contains_key(name) {
            if self.duplicate.is_none() {
                self.duplicate = Some(name.to_string());
            }
            return Err(ParseError::DuplicateRule {
                name: name.to_string(),
            });
        }
        self.index.insert(name.to_string(), self.rules.len());
        self.rules.push(Rule {
            name: name.to_string(),
            expr,
        });
        Ok(())
    }

    /// Number of expressions added so far
    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    /// Build the final grammar
    ///
    /// Fails with [`ParseError::DuplicateRule`] if any name was defined
    /// more than once.
    pub fn build(self) -> Result<Grammar, ParseError> {
        if let Some(name) = self.duplicate {
            return Err(ParseError::DuplicateRule { name });
        }
        Ok(Grammar {
            exprs: self.exprs,
            rules: self.rules,
            index: self.index,
        })
    }
}

/// A heterogeneous list of parslets, as accepted by [`seq`] and [`choice`]
///
/// Implemented for tuples up to arity 8 and for `Vec<P>`.
pub trait ParsletList {
    /// Build every element, returning the expression indices in order
    fn build_all(self, builder: &mut GrammarBuilder) -> Vec<ExprId>;
}

macro_rules! impl_parslet_list {
    ($($p:ident),+) => {
        impl<$($p: Parslet),+> ParsletList for ($($p,)+) {
            #[allow(non_snake_case)]
            fn build_all(self, builder: &mut GrammarBuilder) -> Vec<ExprId> {
                let ($($p,)+) = self;
                vec![$($p.build(builder)),+]
            }
        }
    };
}

impl_parslet_list!(A);
impl_parslet_list!(A, B);
impl_parslet_list!(A, B, C);
impl_parslet_list!(A, B, C, D);
impl_parslet_list!(A, B, C, D, E);
impl_parslet_list!(A, B, C, D, E, F);
impl_parslet_list!(A, B, C, D, E, F, G);
impl_parslet_list!(A, B, C, D, E, F, G, H);

impl<P: Parslet> ParsletList for Vec<P> {
    fn build_all(self, builder: &mut GrammarBuilder) -> Vec<ExprId> {
        self.into_iter().map(|p| p.build(builder)).collect()
    }
}

/// Match a literal string
#[derive(Clone, Copy)]
pub struct Lit<'a>(pub &'a str);

impl Parslet for Lit<'_> {
    fn build(self, builder: &mut GrammarBuilder) -> ExprId {
        builder.add_expr(Expr::Literal {
            text: self.0.to_string(),
        })
    }
}

/// Match one code point in a character class
#[derive(Clone)]
pub struct ClassOf(pub CharClass);

impl Parslet for ClassOf {
    fn build(self, builder: &mut GrammarBuilder) -> ExprId {
        builder.add_expr(Expr::Class { class: self.0 })
    }
}

/// Match any single code point
#[derive(Clone, Copy, Default)]
pub struct AnyChar;

impl Parslet for AnyChar {
    fn build(self, builder: &mut GrammarBuilder) -> ExprId {
        builder.add_expr(Expr::Dot)
    }
}

/// A by-name reference to a rule
///
/// Nothing is resolved at build time, so references may point at rules
/// defined later (or, for a dangling name, fail at match time).
#[derive(Clone, Copy)]
pub struct RuleRef<'a>(pub &'a str);

impl Parslet for RuleRef<'_> {
    fn build(self, builder: &mut GrammarBuilder) -> ExprId {
        builder.add_expr(Expr::Reference {
            name: self.0.to_string(),
        })
    }
}

/// Sequence of parslets
pub struct Seq<L>(pub L);

impl<L: ParsletList> Parslet for Seq<L> {
    fn build(self, builder: &mut GrammarBuilder) -> ExprId {
        let exprs = self.0.build_all(builder);
        builder.add_expr(Expr::Sequence { exprs })
    }
}

/// Ordered choice of parslets
pub struct Alt<L>(pub L);

impl<L: ParsletList> Parslet for Alt<L> {
    fn build(self, builder: &mut GrammarBuilder) -> ExprId {
        let exprs = self.0.build_all(builder);
        builder.add_expr(Expr::Choice { exprs })
    }
}

/// Zero-or-one wrapper
#[derive(Clone, Copy)]
pub struct Opt<P>(pub P);

impl<P: Parslet> Parslet for Opt<P> {
    fn build(self, builder: &mut GrammarBuilder) -> ExprId {
        let expr = self.0.build(builder);
        builder.add_expr(Expr::Optional { expr })
    }
}

/// Zero-or-more wrapper
#[derive(Clone, Copy)]
pub struct Star<P>(pub P);

impl<P: Parslet> Parslet for Star<P> {
    fn build(self, builder: &mut GrammarBuilder) -> ExprId {
        let expr = self.0.build(builder);
        builder.add_expr(Expr::Star { expr })
    }
}

/// One-or-more wrapper
#[derive(Clone, Copy)]
pub struct Plus<P>(pub P);

impl<P: Parslet> Parslet for Plus<P> {
    fn build(self, builder: &mut GrammarBuilder) -> ExprId {
        let expr = self.0.build(builder);
        builder.add_expr(Expr::Plus { expr })
    }
}

/// Positive lookahead wrapper
#[derive(Clone, Copy)]
pub struct And<P>(pub P);

impl<P: Parslet> Parslet for And<P> {
    fn build(self, builder: &mut GrammarBuilder) -> ExprId {
        let expr = self.0.build(builder);
        builder.add_expr(Expr::AndPredicate { expr })
    }
}

/// Negative lookahead wrapper
#[derive(Clone, Copy)]
pub struct Not<P>(pub P);

impl<P: Parslet> Parslet for Not<P> {
    fn build(self, builder: &mut GrammarBuilder) -> ExprId {
        let expr = self.0.build(builder);
        builder.add_expr(Expr::NotPredicate { expr })
    }
}

/// A type-erased parslet, for heterogeneous `Vec`s
pub struct Dynamic(Box<dyn DynParslet>);

/// Object-safe companion of [`Parslet`]
pub trait DynParslet {
    /// Build the boxed parslet into the grammar
    fn build_boxed(self: Box<Self>, builder: &mut GrammarBuilder) -> ExprId;
}

impl<P: Parslet + 'static> DynParslet for P {
    fn build_boxed(self: Box<Self>, builder: &mut GrammarBuilder) -> ExprId {
        (*self).build(builder)
    }
}

impl Parslet for Dynamic {
    fn build(self, builder: &mut GrammarBuilder) -> ExprId {
        self.0.build_boxed(builder)
    }
}

/// Convert any parslet to a type-erased one
pub fn dynamic<P: Parslet + 'static>(p: P) -> Dynamic {
    Dynamic(Box::new(p))
}

/// Match a literal string
pub fn lit(text: &str) -> Lit<'_> {
    Lit(text)
}

/// Match one code point from the given ranges
pub fn class_(ranges: impl IntoIterator<Item = CharRange>) -> ClassOf {
    ClassOf(CharClass::new(ranges))
}

/// Match one of the given code points
pub fn one_of(chars: impl IntoIterator<Item = char>) -> ClassOf {
    ClassOf(CharClass::of_chars(chars))
}

/// Match any single code point
pub fn dot() -> AnyChar {
    AnyChar
}

/// Reference the rule named `name`
pub fn ref_(name: &str) -> RuleRef<'_> {
    RuleRef(name)
}

/// Match the parts in order
pub fn seq<L: ParsletList>(parts: L) -> Seq<L> {
    Seq(parts)
}

/// Try the alternatives in order, committing to the first match
pub fn choice<L: ParsletList>(alternatives: L) -> Alt<L> {
    Alt(alternatives)
}

/// Match `p` if possible, otherwise consume nothing
pub fn opt<P: Parslet>(p: P) -> Opt<P> {
    Opt(p)
}

/// Match `p` zero or more times
pub fn star<P: Parslet>(p: P) -> Star<P> {
    Star(p)
}

/// Match `p` one or more times
pub fn plus<P: Parslet>(p: P) -> Plus<P> {
    Plus(p)
}

/// Succeed iff `p` would match, without consuming
pub fn and_<P: Parslet>(p: P) -> And<P> {
    And(p)
}

/// Succeed iff `p` would fail, without consuming
pub fn not_<P: Parslet>(p: P) -> Not<P> {
    Not(p)
}
