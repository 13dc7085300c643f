//! Pegrat - Runtime PEG Engine
//!
//! A parsing-expression-grammar engine in the style of Ford's original
//! formulation. It provides:
//! - A grammar model with arena-indexed expressions
//! - A self-hosting meta-grammar: PEG source text is parsed by a PEG
//! - A packrat recognizer with ordered choice, greedy repetition and
//!   syntactic predicates
//! - Mismatch reporting with the furthest position reached
//! - A combinator DSL for building grammars directly in Rust
//! - Optional parallel batch parsing
//!
//! ## Quick Start
//!
//! ```rust
//! use pegrat::{is_mismatch, parse_grammar};
//!
//! let grammar = parse_grammar(
//!     "Sum    <- Number ('+' Number)*\n\
//!      Number <- [0-9]+\n",
//! )
//! .unwrap();
//!
//! let result = grammar.parse("1+20+3", "Sum").unwrap();
//! assert!(!is_mismatch(&result));
//! assert_eq!(result.end(), Some(6));
//!
//! let result = grammar.parse("+", "Sum").unwrap();
//! assert!(is_mismatch(&result));
//! ```
//!
//! ## Using the DSL
//!
//! ```rust
//! use pegrat::dsl::{class_, plus, GrammarBuilder};
//! use pegrat::CharRange;
//!
//! let grammar = GrammarBuilder::new()
//!     .rule("word", plus(class_([CharRange::new('a', 'z')])))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(grammar.parse("hello!", "word").unwrap().end(), Some(5));
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel` (default) - batch parsing across threads via `rayon`;
//!   without it `parse_batch_parallel` runs the batch sequentially
//! - `logging` - debug logging through the `log` crate

// Lint configuration for production quality
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all)]

pub mod char_class;
pub mod compile;
pub mod dsl;
pub mod grammar;
pub mod meta;
pub mod parser;
pub mod result;

mod cache;

pub mod parallel;

// ============================================================================
// Core Types
// ============================================================================

pub use char_class::{CharClass, CharRange};
pub use grammar::{Expr, ExprId, Grammar, Rule};
pub use parser::Parser;

// ============================================================================
// Façade
// ============================================================================

pub use compile::{parse_grammar, parse_grammar_with};
pub use result::{is_mismatch, MatchResult, ParseError};

// ============================================================================
// Meta-grammar
// ============================================================================

pub use meta::{meta_grammar, PEG_GRAMMAR};

// ============================================================================
// Parallel Parsing
// ============================================================================

pub use parallel::parse_batch_parallel;
