use std::num::ParseIntError;

use miette::{miette, LabeledSpan, Report, Severity};

use crate::{lexer::Token, span::Span};

// Lexer errors

pub fn lex_unclosed_str(span: Span, src: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "lex::str_lit",
        help = "make sure to close string literals with a \" character on the same line.",
        labels = vec![LabeledSpan::at(span, "incorrect literal")],
        "Encountered an unterminated string literal.",
    )
    .with_source_code(src.to_owned())
}

pub fn lex_invalid_lit(span: Span, src: &str, e: ParseIntError) -> Report {
    miette!(
        severity = Severity::Error,
        code = "lex::bad_lit",
        help = "literals are decimal like -12, hex like 0x1f or binary like 0b101, within 64 bits",
        labels = vec![LabeledSpan::at(span, "incorrect literal")],
        "Encountered an invalid literal: {e}",
    )
    .with_source_code(src.to_owned())
}

pub fn lex_unknown(span: Span, src: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "lex::unknown",
        help = "comments start with ; and operands are separated by spaces or commas",
        labels = vec![LabeledSpan::at(span, "unknown token")],
        "Encountered an unknown token",
    )
    .with_source_code(src.to_owned())
}

// Parser errors

pub fn parse_duplicate_label(span: Span, src: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "parse::duplicate_label",
        help = "labels can only be defined once per file",
        labels = vec![LabeledSpan::at(span, "duplicate label")],
        "Duplicate label"
    )
    .with_source_code(src.to_owned())
}

pub fn parse_unknown_instr(span: Span, src: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "parse::unknown_instruction",
        help = "check the list of available instructions in the documentation",
        labels = vec![LabeledSpan::at(span, "unknown instruction")],
        "Unknown instruction `{}`",
        &src[span.as_range()]
    )
    .with_source_code(src.to_owned())
}

pub fn parse_generic_unexpected(src: &str, expected: &str, found: &Token) -> Report {
    if found.kind == crate::lexer::TokenKind::Eof {
        return parse_eof(src);
    }
    miette!(
        severity = Severity::Error,
        code = "parse::unexpected_token",
        help = "check the operands for this instruction",
        labels = vec![LabeledSpan::at(found.span, "unexpected token")],
        "Expected {expected}, found {}",
        found.kind
    )
    .with_source_code(src.to_owned())
}

pub fn parse_bad_register(span: Span, src: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "parse::bad_register",
        help = "registers are named x0 through x31",
        labels = vec![LabeledSpan::at(span, "invalid register")],
        "Invalid register `{}`",
        &src[span.as_range()]
    )
    .with_source_code(src.to_owned())
}

pub fn parse_bad_base(span: Span, src: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "parse::bad_base",
        help = "print accepts d (decimal), x (hex), b (binary) or s (string)",
        labels = vec![LabeledSpan::at(span, "invalid base")],
        "Invalid print base `{}`",
        &src[span.as_range()]
    )
    .with_source_code(src.to_owned())
}

pub fn parse_eof(src: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "parse::unexpected_eof",
        help = "you may be missing operands in your last statement",
        labels = vec![LabeledSpan::at_offset(src.len().saturating_sub(1), "unexpected end")],
        "Unexpected end of file",
    )
    .with_source_code(src.to_owned())
}
