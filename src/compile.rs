//! Compiling PEG source text into grammars
//!
//! [`parse_grammar`] runs the meta-grammar over the text, then walks the
//! resulting rule-level match tree and builds expression nodes: an
//! identifier not binding a definition becomes a reference, literals and
//! classes are unescaped, suffixes and prefixes map onto their expression
//! forms, and one-element sequences and one-alternative choices collapse
//! into their contents.

use crate::char_class::{CharClass, CharRange};
use crate::dsl::GrammarBuilder;
use crate::grammar::{Expr, ExprId, Grammar};
use crate::meta::meta_grammar;
use crate::parser::{Parser, TreeOutcome};
use crate::result::{MatchNode, NodeId, ParseError};

/// Parse PEG source text into a [`Grammar`]
///
/// The first definition in the text becomes the default start. Fails with
/// [`ParseError::GrammarSyntax`] when the text is not PEG notation; the
/// error carries the furthest offset the meta-grammar reached, which is
/// where the text stops making sense.
///
/// # Example
///
/// ```rust
/// use pegrat::{is_mismatch, parse_grammar};
///
/// let grammar = parse_grammar("Greeting <- 'hello' ' '* 'world'\n").unwrap();
/// let result = grammar.parse("hello world", "Greeting").unwrap();
/// assert!(!is_mismatch(&result));
/// ```
pub fn parse_grammar(text: &str) -> Result<Grammar, ParseError> {
    parse_grammar_with(text, meta_grammar())
}

/// [`parse_grammar`] against a caller-supplied parser grammar
///
/// `peg` must define the meta-grammar's rule set (at least structurally:
/// same rule names playing the same roles). The obvious candidate beyond
/// [`meta_grammar`](crate::meta_grammar) itself is a grammar obtained by
/// parsing [`PEG_GRAMMAR`](crate::PEG_GRAMMAR), which is how the
/// self-hosting property is exercised.
pub fn parse_grammar_with(text: &str, peg: &Grammar) -> Result<Grammar, ParseError> {
    let mut parser = Parser::new(peg, text);
    match parser.tree_parse("Grammar")? {
        TreeOutcome::Matched { root, end } if end == text.len() => {
            let compiler = Compiler {
                parser: &parser,
                meta: peg,
                text,
                out: GrammarBuilder::new(),
            };
            compiler.compile(root)
        }
        TreeOutcome::Matched { .. } => Err(ParseError::GrammarSyntax {
            furthest: parser.furthest(),
        }),
        TreeOutcome::Mismatched { furthest } => Err(ParseError::GrammarSyntax { furthest }),
    }
}

/// Walks a meta-grammar match tree and emits grammar expressions
struct Compiler<'p, 'a> {
    parser: &'p Parser<'a>,
    meta: &'p Grammar,
    text: &'p str,
    out: GrammarBuilder,
}

impl<'p, 'a> Compiler<'p, 'a> {
    fn compile(mut self, root: NodeId) -> Result<Grammar, ParseError> {
        let grammar_node = self.node(root);
        for definition in self.children_named(grammar_node, "Definition") {
            self.compile_definition(definition)?;
        }
        self.out.build()
    }

    fn node(&self, id: NodeId) -> &'p MatchNode {
        let parser = self.parser;
        parser.node(id)
    }

    fn rule_name(&self, node: &MatchNode) -> &'p str {
        let meta = self.meta;
        &meta.rules()[node.rule as usize].name
    }

    fn span(&self, node: &MatchNode) -> &'p str {
        let text = self.text;
        &text[node.start as usize..node.end as usize]
    }

    fn children_named(&self, node: &'p MatchNode, name: &str) -> Vec<&'p MatchNode> {
        node.children
            .iter()
            .map(|&id| self.node(id))
            .filter(|child| self.rule_name(child) == name)
            .collect()
    }

    fn child_named(&self, node: &'p MatchNode, name: &str) -> Option<&'p MatchNode> {
        self.children_named(node, name).into_iter().next()
    }

    /// `Definition <- Identifier LEFTARROW Expression`
    ///
    /// A name defined earlier in the same grammar is a
    /// [`ParseError::DuplicateRule`].
    fn compile_definition(&mut self, node: &'p MatchNode) -> Result<(), ParseError> {
        let Some(identifier) = self.child_named(node, "Identifier") else {
            return Ok(());
        };
        let Some(expression) = self.child_named(node, "Expression") else {
            return Ok(());
        };
        let name = self.identifier_text(identifier).to_string();
        let expr = self.compile_expression(expression);
        self.out.define(&name, expr)
    }

    /// `Expression <- Sequence (SLASH Sequence)*`
    ///
    /// A choice of one sequence is that sequence.
    fn compile_expression(&mut self, node: &'p MatchNode) -> ExprId {
        let sequences = self.children_named(node, "Sequence");
        let exprs: Vec<ExprId> = sequences
            .into_iter()
            .map(|sequence| self.compile_sequence(sequence))
            .collect();

        match exprs.len() {
            1 => exprs[0],
            _ => self.out.add_expr(Expr::Choice { exprs }),
        }
    }

    /// `Sequence <- Prefix*`
    ///
    /// A sequence of one prefix is that prefix; an empty sequence matches
    /// the empty string, which the empty literal expresses.
    fn compile_sequence(&mut self, node: &'p MatchNode) -> ExprId {
        let prefixes = self.children_named(node, "Prefix");
        let exprs: Vec<ExprId> = prefixes
            .into_iter()
            .map(|prefix| self.compile_prefix(prefix))
            .collect();

        match exprs.len() {
            0 => self.out.add_expr(Expr::Literal {
                text: String::new(),
            }),
            1 => exprs[0],
            _ => self.out.add_expr(Expr::Sequence { exprs }),
        }
    }

    /// `Prefix <- (AND / NOT)? Suffix`
    fn compile_prefix(&mut self, node: &'p MatchNode) -> ExprId {
        let Some(suffix) = self.child_named(node, "Suffix") else {
            return self.out.add_expr(Expr::Literal {
                text: String::new(),
            });
        };
        let expr = self.compile_suffix(suffix);

        if self.child_named(node, "AND").is_some() {
            self.out.add_expr(Expr::AndPredicate { expr })
        } else if self.child_named(node, "NOT").is_some() {
            self.out.add_expr(Expr::NotPredicate { expr })
        } else {
            expr
        }
    }

    /// `Suffix <- Primary (QUESTION / STAR / PLUS)?`
    fn compile_suffix(&mut self, node: &'p MatchNode) -> ExprId {
        let Some(primary) = self.child_named(node, "Primary") else {
            return self.out.add_expr(Expr::Literal {
                text: String::new(),
            });
        };
        let expr = self.compile_primary(primary);

        if self.child_named(node, "QUESTION").is_some() {
            self.out.add_expr(Expr::Optional { expr })
        } else if self.child_named(node, "STAR").is_some() {
            self.out.add_expr(Expr::Star { expr })
        } else if self.child_named(node, "PLUS").is_some() {
            self.out.add_expr(Expr::Plus { expr })
        } else {
            expr
        }
    }

    /// `Primary <- Identifier !LEFTARROW / OPEN Expression CLOSE
    ///           / Literal / Class / DOT`
    fn compile_primary(&mut self, node: &'p MatchNode) -> ExprId {
        if let Some(identifier) = self.child_named(node, "Identifier") {
            let name = self.identifier_text(identifier).to_string();
            return self.out.add_expr(Expr::Reference { name });
        }
        if let Some(expression) = self.child_named(node, "Expression") {
            return self.compile_expression(expression);
        }
        if let Some(literal) = self.child_named(node, "Literal") {
            return self.compile_literal(literal);
        }
        if let Some(class) = self.child_named(node, "Class") {
            return self.compile_class(class);
        }
        self.out.add_expr(Expr::Dot)
    }

    /// `Literal <- ['] (!['] Char)* ['] Spacing / ...`
    fn compile_literal(&mut self, node: &'p MatchNode) -> ExprId {
        let text: String = self
            .children_named(node, "Char")
            .into_iter()
            .map(|ch| self.decode_char(ch))
            .collect();
        self.out.add_expr(Expr::Literal { text })
    }

    /// `Class <- '[' (!']' Range)* ']' Spacing`
    fn compile_class(&mut self, node: &'p MatchNode) -> ExprId {
        let ranges: Vec<CharRange> = self
            .children_named(node, "Range")
            .into_iter()
            .map(|range| self.decode_range(range))
            .collect();
        self.out.add_expr(Expr::Class {
            class: CharClass::new(ranges),
        })
    }

    /// `Range <- Char '-' Char / Char`
    fn decode_range(&self, node: &'p MatchNode) -> CharRange {
        let chars = self.children_named(node, "Char");
        match chars.as_slice() {
            &[lo, hi] => CharRange::new(self.decode_char(lo), self.decode_char(hi)),
            &[single] => CharRange::single(self.decode_char(single)),
            _ => CharRange::single('\u{0}'),
        }
    }

    /// Decode one `Char` occurrence: an escape sequence or a bare code
    /// point
    fn decode_char(&self, node: &'p MatchNode) -> char {
        let s = self.span(node);
        let Some(rest) = s.strip_prefix('\\') else {
            return s.chars().next().unwrap_or('\u{0}');
        };

        match rest.chars().next() {
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some(c @ ('\'' | '"' | '[' | ']' | '\\')) => c,
            Some(c) if c.is_ascii_digit() => {
                let value = rest
                    .chars()
                    .fold(0u32, |acc, d| acc * 8 + d.to_digit(8).unwrap_or(0));
                (value as u8) as char
            }
            _ => '\u{0}',
        }
    }

    /// The identifier's text: the node span minus the trailing `Spacing`
    fn identifier_text(&self, node: &'p MatchNode) -> &'p str {
        let end = self
            .child_named(node, "Spacing")
            .map(|spacing| spacing.start as usize)
            .unwrap_or(node.end as usize);
        let text = self.text;
        &text[node.start as usize..end]
    }
}
