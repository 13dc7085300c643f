//! End-to-end recognizer tests
//!
//! Grammars arrive as PEG source text and run against concrete inputs,
//! covering the ordered-choice, repetition and predicate semantics plus
//! mismatch reporting.

use pegrat::{is_mismatch, parse_grammar, MatchResult, ParseError};

fn matched(end: usize) -> MatchResult {
    MatchResult::Match { start: 0, end }
}

fn mismatch_at(furthest: usize) -> MatchResult {
    MatchResult::Mismatch { furthest }
}

// ============================================================================
// Literal Matching
// ============================================================================

#[test]
fn test_literal_prefix_match() {
    let grammar = parse_grammar("S <- \"ab\"\n").unwrap();

    assert_eq!(grammar.parse("ab", "S").unwrap(), matched(2));
    assert_eq!(grammar.parse("ac", "S").unwrap(), mismatch_at(1));
}

#[test]
fn test_match_is_prefix_only() {
    let grammar = parse_grammar("S <- 'ab'\n").unwrap();

    // Trailing input is not an error for the recognizer; the span stops
    // where the rule stops.
    assert_eq!(grammar.parse("abxyz", "S").unwrap(), matched(2));
}

#[test]
fn test_unicode_literals_and_spans() {
    let grammar = parse_grammar("S <- 'héllo' .\n").unwrap();

    // Spans are byte offsets; 'é' is two bytes, '語' is three.
    assert_eq!(grammar.parse("héllo語", "S").unwrap(), matched(9));
}

// ============================================================================
// Repetition
// ============================================================================

#[test]
fn test_star_zero_or_more() {
    let grammar = parse_grammar("S <- \"a\"*\n").unwrap();

    assert_eq!(grammar.parse("aaa", "S").unwrap(), matched(3));
    assert_eq!(grammar.parse("", "S").unwrap(), matched(0));
}

#[test]
fn test_plus_and_optional() {
    let grammar = parse_grammar("S <- 'a'+ 'b'?\n").unwrap();

    assert_eq!(grammar.parse("aab", "S").unwrap(), matched(3));
    assert_eq!(grammar.parse("a", "S").unwrap(), matched(1));
    assert!(is_mismatch(&grammar.parse("b", "S").unwrap()));
}

#[test]
fn test_repetition_is_greedy() {
    // 'a'* eats all the 'a's; the trailing 'a' can never match.
    let grammar = parse_grammar("S <- 'a'* 'a'\n").unwrap();

    assert!(is_mismatch(&grammar.parse("aaaa", "S").unwrap()));
}

#[test]
fn test_star_of_nullable_terminates() {
    let grammar = parse_grammar("S <- ('a'?)*\n").unwrap();

    assert_eq!(grammar.parse("aa", "S").unwrap(), matched(2));
    assert_eq!(grammar.parse("bb", "S").unwrap(), matched(0));
}

// ============================================================================
// Ordered Choice
// ============================================================================

#[test]
fn test_ordered_choice() {
    let grammar = parse_grammar("S <- \"a\" / \"b\"\n").unwrap();

    assert_eq!(grammar.parse("b", "S").unwrap(), matched(1));
    assert_eq!(grammar.parse("c", "S").unwrap(), mismatch_at(0));
}

#[test]
fn test_choice_commitment() {
    // Once 'a' matches, 'ab' is never tried, so the sequence fails on 'c'.
    let grammar = parse_grammar("S <- ('a' / 'ab') 'c'\n").unwrap();

    assert_eq!(grammar.parse("ac", "S").unwrap(), matched(2));
    assert!(is_mismatch(&grammar.parse("abc", "S").unwrap()));
}

// ============================================================================
// Predicates
// ============================================================================

#[test]
fn test_not_predicate() {
    let grammar = parse_grammar("S <- !\"a\" .\n").unwrap();

    assert_eq!(grammar.parse("b", "S").unwrap(), matched(1));
    assert!(is_mismatch(&grammar.parse("a", "S").unwrap()));
}

#[test]
fn test_and_predicate_consumes_nothing() {
    let grammar = parse_grammar("S <- &'ab' 'a'\n").unwrap();

    // The lookahead sees "ab" but only 'a' is consumed.
    assert_eq!(grammar.parse("ab", "S").unwrap(), matched(1));
    assert!(is_mismatch(&grammar.parse("ax", "S").unwrap()));
}

#[test]
fn test_until_idiom() {
    // Comment-like scan: consume everything up to the terminator.
    let grammar = parse_grammar("S <- (!';' .)* ';'\n").unwrap();

    assert_eq!(grammar.parse("abc;", "S").unwrap(), matched(4));
    assert!(is_mismatch(&grammar.parse("abc", "S").unwrap()));
}

// ============================================================================
// Rule References and Recursion
// ============================================================================

#[test]
fn test_right_recursion() {
    let grammar = parse_grammar("S <- A\nA <- \"x\" A / \"x\"\n").unwrap();

    assert_eq!(grammar.parse("xxx", "S").unwrap(), matched(3));
    assert_eq!(grammar.parse("x", "S").unwrap(), matched(1));
}

#[test]
fn test_left_recursive_branch_fails_quietly() {
    // PEG defines the left-recursive alternative as non-matching; the
    // engine must not hang or overflow.
    let grammar = parse_grammar("A <- A 'x' / 'y'\n").unwrap();

    assert_eq!(grammar.parse("y", "A").unwrap(), matched(1));
    assert_eq!(grammar.parse("yxx", "A").unwrap(), matched(1));
    assert!(is_mismatch(&grammar.parse("x", "A").unwrap()));
}

#[test]
fn test_unknown_starting_rule_is_error() {
    let grammar = parse_grammar("S <- 'a'\n").unwrap();

    assert_eq!(
        grammar.parse("a", "Nope"),
        Err(ParseError::UnknownRule {
            name: "Nope".to_string()
        })
    );
}

#[test]
fn test_dangling_reference_is_error() {
    let grammar = parse_grammar("S <- Missing\n").unwrap();

    assert_eq!(
        grammar.parse("a", "S"),
        Err(ParseError::UnknownRule {
            name: "Missing".to_string()
        })
    );
}

#[test]
fn test_parse_default_uses_first_rule() {
    let grammar = parse_grammar("First <- 'a'\nSecond <- 'b'\n").unwrap();

    assert_eq!(grammar.parse_default("a").unwrap(), matched(1));
    assert!(is_mismatch(&grammar.parse_default("b").unwrap()));
}

// ============================================================================
// Furthest-Position Diagnostics
// ============================================================================

#[test]
fn test_furthest_survives_alternative_failure() {
    // The first alternative gets to offset 3 before dying; the second
    // fails at 0 and must not shrink the counter.
    let grammar = parse_grammar("S <- 'abc' 'd' / 'z'\n").unwrap();

    assert_eq!(grammar.parse("abcx", "S").unwrap(), mismatch_at(3));
}

#[test]
fn test_furthest_bounded_by_input_len() {
    let grammar = parse_grammar("S <- 'abcdef'\n").unwrap();

    match grammar.parse("abc", "S").unwrap() {
        MatchResult::Mismatch { furthest } => assert_eq!(furthest, 3),
        other => panic!("expected mismatch, got {other:?}"),
    }
}

// ============================================================================
// Determinism and Sharing
// ============================================================================

#[test]
fn test_repeated_parses_are_equal() {
    let grammar = parse_grammar("S <- ('ab' / .)*\n").unwrap();
    let input = "abxab!";

    let first = grammar.parse(input, "S").unwrap();
    for _ in 0..5 {
        assert_eq!(grammar.parse(input, "S").unwrap(), first);
    }
}

#[test]
fn test_grammar_shared_across_threads() {
    let grammar = parse_grammar("S <- [a-z]+\n").unwrap();

    std::thread::scope(|scope| {
        for input in ["abc", "zzz", "q"] {
            let grammar = &grammar;
            scope.spawn(move || {
                assert_eq!(grammar.parse(input, "S").unwrap().end(), Some(input.len()));
            });
        }
    });
}

#[test]
fn test_parallel_batch_parity() {
    use pegrat::parse_batch_parallel;

    let grammar = parse_grammar("S <- 'a'+ 'b'\n").unwrap();
    let inputs = ["ab", "aab", "ba", ""];

    let batch = parse_batch_parallel(&grammar, &inputs, "S");
    for (input, result) in inputs.iter().zip(batch) {
        assert_eq!(result, grammar.parse(input, "S"));
    }
}
