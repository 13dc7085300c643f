//! The PEG recognizer
//!
//! Evaluates a grammar expression against an input position and reports
//! how far it consumed. Ordered choice commits to the first matching
//! alternative, repetition is greedy, and predicates look ahead without
//! consuming. Rule applications are memoized in a packrat cache scoped to
//! one top-level parse, which both gives the linear-time guarantee and
//! cuts off left recursion: the cache entry is seeded with a failure on
//! rule entry, so a rule re-entering itself at the same position fails
//! that branch instead of recursing forever.

use crate::cache::{CacheEntry, PackratCache};
use crate::grammar::{Expr, ExprId, Grammar};
use crate::result::{MatchNode, MatchResult, NodeId, ParseError};

/// Logging macros - no-op when the logging feature is disabled
#[cfg(not(feature = "logging"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

/// Logging macros - use log crate when the logging feature is enabled
#[cfg(feature = "logging")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

/// Why an evaluation stopped without producing a match
enum Halt {
    /// The expression does not match here; a normal outcome
    Mismatch,
    /// A hard error that aborts the whole parse
    Error(ParseError),
}

/// A successful evaluation: the end position and the rule applications
/// contributed to the enclosing rule's tree node
struct Step {
    end: usize,
    children: Vec<NodeId>,
}

type EvalResult = Result<Step, Halt>;

/// Result of a tree-building parse, consumed by grammar compilation
pub(crate) enum TreeOutcome {
    /// The starting rule matched `input[0..end]`
    Matched {
        /// Root node of the rule-level match tree
        root: NodeId,
        /// End of the consumed span
        end: usize,
    },
    /// No match at position 0
    Mismatched {
        /// Furthest position reached
        furthest: usize,
    },
}

/// One parse attempt of one input against one grammar
///
/// The parser owns the per-invocation state: the packrat cache, the
/// furthest-position counter and the match-tree arena. The grammar is
/// borrowed immutably, so any number of parsers over the same grammar can
/// run concurrently.
pub struct Parser<'a> {
    grammar: &'a Grammar,
    input: &'a str,
    cache: PackratCache,
    nodes: Vec<MatchNode>,
    furthest: usize,
}

impl<'a> Parser<'a> {
    /// Create a parser for one run of `grammar` over `input`
    pub fn new(grammar: &'a Grammar, input: &'a str) -> Self {
        Self {
            grammar,
            input,
            cache: PackratCache::for_input(input.len(), grammar.rules().len()),
            nodes: Vec::new(),
            furthest: 0,
        }
    }

    /// Match `starting_rule` against a prefix of the input
    ///
    /// Greedy: returns the span the rule consumed, which is the largest
    /// prefix reachable under PEG's committed-choice semantics. A missing
    /// starting rule or dangling reference is an
    /// [`ParseError::UnknownRule`].
    pub fn parse(&mut self, starting_rule: &str) -> Result<MatchResult, ParseError> {
        match self.tree_parse(starting_rule)? {
            TreeOutcome::Matched { end, .. } => Ok(MatchResult::Match { start: 0, end }),
            TreeOutcome::Mismatched { furthest } => Ok(MatchResult::Mismatch { furthest }),
        }
    }

    /// Furthest byte offset the recognizer has consulted so far
    ///
    /// Monotone over the whole invocation; never reset when an alternative
    /// fails.
    pub fn furthest(&self) -> usize {
        self.furthest
    }

    /// Parse and keep the rule-level match tree
    pub(crate) fn tree_parse(&mut self, starting_rule: &str) -> Result<TreeOutcome, ParseError> {
        let rule = self
            .grammar
            .rule_index(starting_rule)
            .ok_or_else(|| ParseError::UnknownRule {
                name: starting_rule.to_string(),
            })?;

        log_debug!(
            "starting parse: rule={} input_len={}",
            starting_rule,
            self.input.len()
        );

        let outcome = match self.apply_rule(rule, 0) {
            Ok(step) => Ok(TreeOutcome::Matched {
                root: step.children[0],
                end: step.end,
            }),
            Err(Halt::Mismatch) => Ok(TreeOutcome::Mismatched {
                furthest: self.furthest,
            }),
            Err(Halt::Error(e)) => Err(e),
        };

        log_debug!(
            "parse finished: cache hit_rate={:.2}",
            self.cache.stats().2
        );

        outcome
    }

    /// Access a node of the match tree
    pub(crate) fn node(&self, id: NodeId) -> &MatchNode {
        &self.nodes[id as usize]
    }

    /// Memoization statistics for the run so far: (hits, misses, hit rate)
    pub fn cache_stats(&self) -> (u64, u64, f64) {
        self.cache.stats()
    }

    /// Approximate heap footprint of the run's cache and match tree
    pub fn memory_usage(&self) -> usize {
        self.cache.memory_usage() + self.nodes.capacity() * std::mem::size_of::<MatchNode>()
    }

    /// Apply the rule at `rule` to position `pos`, memoized
    fn apply_rule(&mut self, rule: usize, pos: usize) -> EvalResult {
        self.advance_furthest(pos);

        if let Some(entry) = self.cache.get(pos as u32, rule as u16) {
            return if entry.success() {
                Ok(Step {
                    end: entry.end_pos as usize,
                    children: vec![entry.node()],
                })
            } else {
                Err(Halt::Mismatch)
            };
        }

        // Seed with failure before evaluating: re-entry at the same
        // position (left recursion) hits the seed and fails that branch.
        self.cache.insert(CacheEntry::failed(pos as u32, rule as u16));

        let expr = self.grammar.rules()[rule].expr;
        let step = self.eval(expr, pos)?;

        let node = self.nodes.len() as NodeId;
        self.nodes.push(MatchNode {
            rule: rule as u16,
            start: pos as u32,
            end: step.end as u32,
            children: step.children,
        });
        self.cache.update(CacheEntry::matched(
            pos as u32,
            rule as u16,
            step.end as u32,
            node,
        ));

        Ok(Step {
            end: step.end,
            children: vec![node],
        })
    }

    /// Evaluate the expression at `id` against position `pos`
    fn eval(&mut self, id: ExprId, pos: usize) -> EvalResult {
        let grammar = self.grammar;
        match &grammar.exprs[id] {
            Expr::Literal { text } => self.eval_literal(text, pos),
            Expr::Class { class } => {
                let matched = self.input[pos..]
                    .chars()
                    .next()
                    .filter(|&c| class.contains(c));
                self.eval_one_char(matched, pos)
            }
            Expr::Dot => {
                let matched = self.input[pos..].chars().next();
                self.eval_one_char(matched, pos)
            }
            Expr::Reference { name } => match grammar.rule_index(name) {
                Some(rule) => self.apply_rule(rule, pos),
                None => Err(Halt::Error(ParseError::UnknownRule { name: name.clone() })),
            },
            Expr::Sequence { exprs } => self.eval_sequence(exprs, pos),
            Expr::Choice { exprs } => self.eval_choice(exprs, pos),
            Expr::Optional { expr } => match self.eval(*expr, pos) {
                Ok(step) => Ok(step),
                Err(Halt::Mismatch) => Ok(Step {
                    end: pos,
                    children: Vec::new(),
                }),
                Err(halt) => Err(halt),
            },
            Expr::Star { expr } => self.eval_repeat(*expr, pos, 0),
            Expr::Plus { expr } => self.eval_repeat(*expr, pos, 1),
            Expr::AndPredicate { expr } => match self.eval(*expr, pos) {
                // Predicates consume nothing and contribute no tree nodes
                Ok(_) => Ok(Step {
                    end: pos,
                    children: Vec::new(),
                }),
                Err(halt) => Err(halt),
            },
            Expr::NotPredicate { expr } => match self.eval(*expr, pos) {
                Ok(_) => Err(Halt::Mismatch),
                Err(Halt::Mismatch) => Ok(Step {
                    end: pos,
                    children: Vec::new(),
                }),
                Err(halt) => Err(halt),
            },
        }
    }

    /// Compare `text` code point by code point at `pos`
    ///
    /// The furthest counter records how much of the literal matched, so a
    /// partial prefix match is visible in mismatch diagnostics.
    fn eval_literal(&mut self, text: &str, pos: usize) -> EvalResult {
        let mut end = pos;
        let mut actual = self.input[pos..].chars();

        for want in text.chars() {
            match actual.next() {
                Some(got) if got == want => end += got.len_utf8(),
                _ => {
                    self.advance_furthest(end);
                    return Err(Halt::Mismatch);
                }
            }
        }

        self.advance_furthest(end);
        Ok(Step {
            end,
            children: Vec::new(),
        })
    }

    /// Shared tail of the single-code-point forms (class, dot)
    fn eval_one_char(&mut self, matched: Option<char>, pos: usize) -> EvalResult {
        match matched {
            Some(c) => {
                let end = pos + c.len_utf8();
                self.advance_furthest(end);
                Ok(Step {
                    end,
                    children: Vec::new(),
                })
            }
            None => {
                self.advance_furthest(pos);
                Err(Halt::Mismatch)
            }
        }
    }

    fn eval_sequence(&mut self, exprs: &[ExprId], pos: usize) -> EvalResult {
        let mut children = Vec::new();
        let mut cur = pos;

        for &child in exprs {
            let step = self.eval(child, cur)?;
            children.extend(step.children);
            cur = step.end;
        }

        Ok(Step {
            end: cur,
            children,
        })
    }

    fn eval_choice(&mut self, exprs: &[ExprId], pos: usize) -> EvalResult {
        for &alternative in exprs {
            match self.eval(alternative, pos) {
                Ok(step) => return Ok(step),
                Err(Halt::Mismatch) => {}
                Err(halt) => return Err(halt),
            }
        }
        Err(Halt::Mismatch)
    }

    /// Greedy repetition; `min` is 0 for star, 1 for plus
    fn eval_repeat(&mut self, expr: ExprId, pos: usize, min: usize) -> EvalResult {
        let mut children = Vec::new();
        let mut cur = pos;
        let mut count = 0usize;

        loop {
            match self.eval(expr, cur) {
                Ok(step) => {
                    let advanced = step.end > cur;
                    children.extend(step.children);
                    cur = step.end;
                    count += 1;
                    // Loop guard: a successful iteration that does not
                    // advance still counts, then the repetition ends.
                    if !advanced {
                        break;
                    }
                }
                Err(Halt::Mismatch) => break,
                Err(halt) => return Err(halt),
            }
        }

        if count < min {
            return Err(Halt::Mismatch);
        }
        Ok(Step {
            end: cur,
            children,
        })
    }

    #[inline]
    fn advance_furthest(&mut self, pos: usize) {
        if pos > self.furthest {
            self.furthest = pos;
        }
    }
}
