//! Batch parsing across inputs
//!
//! A [`Grammar`](crate::Grammar) is immutable after construction and every
//! parse owns its own cache and furthest counter, so one grammar can serve
//! any number of inputs concurrently. This module parses a batch of inputs
//! against a shared grammar: with the `parallel` feature the batch runs on
//! rayon's work-stealing pool, without it the same function runs the batch
//! sequentially.

use crate::grammar::Grammar;
use crate::result::{MatchResult, ParseError};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Parse multiple inputs against one grammar in parallel
///
/// Results come back in input order. Each input gets an independent parse;
/// a mismatch or unknown-rule error on one input does not affect the
/// others.
///
/// # Example
///
/// ```rust
/// use pegrat::{parse_batch_parallel, parse_grammar};
///
/// let grammar = parse_grammar("S <- 'a'+\n").unwrap();
/// let results = parse_batch_parallel(&grammar, &["a", "aaa", "b"], "S");
///
/// assert_eq!(results.len(), 3);
/// assert_eq!(results[1].as_ref().unwrap().end(), Some(3));
/// assert!(results[2].as_ref().unwrap().is_mismatch());
/// ```
#[cfg(feature = "parallel")]
pub fn parse_batch_parallel(
    grammar: &Grammar,
    inputs: &[&str],
    starting_rule: &str,
) -> Vec<Result<MatchResult, ParseError>> {
    inputs
        .par_iter()
        .map(|input| grammar.parse(input, starting_rule))
        .collect()
}

/// Sequential fallback when the `parallel` feature is disabled
///
/// Same signature and result order as the parallel version.
#[cfg(not(feature = "parallel"))]
pub fn parse_batch_parallel(
    grammar: &Grammar,
    inputs: &[&str],
    starting_rule: &str,
) -> Vec<Result<MatchResult, ParseError>> {
    inputs
        .iter()
        .map(|input| grammar.parse(input, starting_rule))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_grammar;

    #[test]
    fn test_batch_matches_sequential() {
        let grammar = parse_grammar("S <- [a-z]+ '!'\n").unwrap();
        let inputs = ["hi!", "nope", "ok!", ""];

        let parallel = parse_batch_parallel(&grammar, &inputs, "S");
        let sequential: Vec<_> = inputs.iter().map(|i| grammar.parse(i, "S")).collect();

        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_batch_preserves_order() {
        let grammar = parse_grammar("S <- 'x'*\n").unwrap();
        let inputs = ["", "x", "xx", "xxx"];

        let results = parse_batch_parallel(&grammar, &inputs, "S");
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.as_ref().unwrap().end(), Some(i));
        }
    }

    #[test]
    fn test_batch_surfaces_unknown_rule_per_input() {
        let grammar = parse_grammar("S <- 'a'\n").unwrap();
        let results = parse_batch_parallel(&grammar, &["a"], "T");
        assert!(results[0].is_err());
    }
}
