//! The PEG meta-grammar
//!
//! A hard-coded grammar whose language is PEG notation itself. Parsing a
//! user grammar means running the recognizer with this grammar over the
//! user's text and translating the resulting match tree (see
//! [`crate::compile`]).
//!
//! [`PEG_GRAMMAR`] is the same grammar as text. Feeding it through
//! [`parse_grammar`](crate::parse_grammar) must reproduce
//! [`meta_grammar`] exactly, and the result must in turn parse
//! `PEG_GRAMMAR` in full; that self-hosting loop is the engine's
//! strongest end-to-end check.

use crate::char_class::CharRange;
use crate::dsl::{
    choice, class_, dot, lit, not_, one_of, opt, plus, ref_, seq, star, GrammarBuilder,
};
use crate::grammar::Grammar;
use crate::result::ParseError;
use std::sync::OnceLock;

/// The meta-grammar in PEG notation
///
/// Same rules, same order, as [`meta_grammar`] builds in code.
pub const PEG_GRAMMAR: &str = r#"# Hierarchical syntax
Grammar    <- Spacing Definition+ EndOfFile
Definition <- Identifier LEFTARROW Expression
Expression <- Sequence (SLASH Sequence)*
Sequence   <- Prefix*
Prefix     <- (AND / NOT)? Suffix
Suffix     <- Primary (QUESTION / STAR / PLUS)?
Primary    <- Identifier !LEFTARROW
            / OPEN Expression CLOSE
            / Literal
            / Class
            / DOT

# Lexical syntax
Identifier <- IdentStart IdentCont* Spacing
IdentStart <- [a-zA-Z_]
IdentCont  <- IdentStart / [0-9]
Literal    <- ['] (!['] Char)* ['] Spacing
            / ["] (!["] Char)* ["] Spacing
Class      <- '[' (!']' Range)* ']' Spacing
Range      <- Char '-' Char / Char
Char       <- '\\' [nrt'"\[\]\\]
            / '\\' [0-2][0-7][0-7]
            / '\\' [0-7][0-7]?
            / !'\\' .
LEFTARROW  <- '<-' Spacing
SLASH      <- '/' Spacing
AND        <- '&' Spacing
NOT        <- '!' Spacing
QUESTION   <- '?' Spacing
STAR       <- '*' Spacing
PLUS       <- '+' Spacing
OPEN       <- '(' Spacing
CLOSE      <- ')' Spacing
DOT        <- '.' Spacing
Spacing    <- (Space / Comment)*
Comment    <- '#' (!EndOfLine .)* EndOfLine
EndOfLine  <- '\r\n' / '\n' / '\r'
Space      <- ' ' / '\t' / EndOfLine
EndOfFile  <- !.
"#;

static META: OnceLock<Grammar> = OnceLock::new();

/// The hard-coded meta-grammar
///
/// Built once; the returned grammar is immutable and shared.
pub fn meta_grammar() -> &'static Grammar {
    META.get_or_init(|| build().expect("meta-grammar definitions are unique"))
}

fn build() -> Result<Grammar, ParseError> {
    let ident_start = || {
        class_([
            CharRange::new('a', 'z'),
            CharRange::new('A', 'Z'),
            CharRange::single('_'),
        ])
    };
    let octal_lead = || class_([CharRange::new('0', '2')]);
    let octal_digit = || class_([CharRange::new('0', '7')]);
    let quote = || one_of(['\'']);
    let dquote = || one_of(['"']);

    GrammarBuilder::new()
        .rule(
            "Grammar",
            seq((ref_("Spacing"), plus(ref_("Definition")), ref_("EndOfFile"))),
        )
        .rule(
            "Definition",
            seq((ref_("Identifier"), ref_("LEFTARROW"), ref_("Expression"))),
        )
        .rule(
            "Expression",
            seq((
                ref_("Sequence"),
                star(seq((ref_("SLASH"), ref_("Sequence")))),
            )),
        )
        .rule("Sequence", star(ref_("Prefix")))
        .rule(
            "Prefix",
            seq((opt(choice((ref_("AND"), ref_("NOT")))), ref_("Suffix"))),
        )
        .rule(
            "Suffix",
            seq((
                ref_("Primary"),
                opt(choice((ref_("QUESTION"), ref_("STAR"), ref_("PLUS")))),
            )),
        )
        .rule(
            "Primary",
            choice((
                seq((ref_("Identifier"), not_(ref_("LEFTARROW")))),
                seq((ref_("OPEN"), ref_("Expression"), ref_("CLOSE"))),
                ref_("Literal"),
                ref_("Class"),
                ref_("DOT"),
            )),
        )
        .rule(
            "Identifier",
            seq((ref_("IdentStart"), star(ref_("IdentCont")), ref_("Spacing"))),
        )
        .rule("IdentStart", ident_start())
        .rule(
            "IdentCont",
            choice((ref_("IdentStart"), class_([CharRange::new('0', '9')]))),
        )
        .rule(
            "Literal",
            choice((
                seq((
                    quote(),
                    star(seq((not_(quote()), ref_("Char")))),
                    quote(),
                    ref_("Spacing"),
                )),
                seq((
                    dquote(),
                    star(seq((not_(dquote()), ref_("Char")))),
                    dquote(),
                    ref_("Spacing"),
                )),
            )),
        )
        .rule(
            "Class",
            seq((
                lit("["),
                star(seq((not_(lit("]")), ref_("Range")))),
                lit("]"),
                ref_("Spacing"),
            )),
        )
        .rule(
            "Range",
            choice((
                seq((ref_("Char"), lit("-"), ref_("Char"))),
                ref_("Char"),
            )),
        )
        .rule(
            "Char",
            choice((
                seq((
                    lit("\\"),
                    one_of(['n', 'r', 't', '\'', '"', '[', ']', '\\']),
                )),
                seq((lit("\\"), octal_lead(), octal_digit(), octal_digit())),
                seq((lit("\\"), octal_digit(), opt(octal_digit()))),
                seq((not_(lit("\\")), dot())),
            )),
        )
        .rule("LEFTARROW", seq((lit("<-"), ref_("Spacing"))))
        .rule("SLASH", seq((lit("/"), ref_("Spacing"))))
        .rule("AND", seq((lit("&"), ref_("Spacing"))))
        .rule("NOT", seq((lit("!"), ref_("Spacing"))))
        .rule("QUESTION", seq((lit("?"), ref_("Spacing"))))
        .rule("STAR", seq((lit("*"), ref_("Spacing"))))
        .rule("PLUS", seq((lit("+"), ref_("Spacing"))))
        .rule("OPEN", seq((lit("("), ref_("Spacing"))))
        .rule("CLOSE", seq((lit(")"), ref_("Spacing"))))
        .rule("DOT", seq((lit("."), ref_("Spacing"))))
        .rule("Spacing", star(choice((ref_("Space"), ref_("Comment")))))
        .rule(
            "Comment",
            seq((
                lit("#"),
                star(seq((not_(ref_("EndOfLine")), dot()))),
                ref_("EndOfLine"),
            )),
        )
        .rule(
            "EndOfLine",
            choice((lit("\r\n"), lit("\n"), lit("\r"))),
        )
        .rule("Space", choice((lit(" "), lit("\t"), ref_("EndOfLine"))))
        .rule("EndOfFile", not_(dot()))
        .build()
}
