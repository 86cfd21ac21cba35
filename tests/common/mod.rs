#![allow(dead_code)]

use zhlex::{Error, format, parse_str};

/// Collapse whitespace runs and drop spaces next to parentheses, so that
/// expected dumps can be written across several lines.
pub fn normalize(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.replace("( ", "(").replace(" )", ")")
}

/// Parse `input` and compare its canonical dump with `expected`
/// after normalization.
pub fn assert_ast(input: &str, expected: &str) {
    let program = parse_str(input).unwrap_or_else(|e| {
        panic!("parse failed: {e}\n--- input ---\n{input}");
    });
    let output = format(&program);
    assert_eq!(
        normalize(&output),
        normalize(expected),
        "AST mismatch\n--- input ---\n{input}"
    );
}

/// Parse `input`, expecting it to fail.
pub fn parse_error(input: &str) -> Error {
    match parse_str(input) {
        Ok(program) => panic!("expected error, got {}", format(&program)),
        Err(e) => e,
    }
}
