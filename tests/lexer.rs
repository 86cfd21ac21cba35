//! Lexer behaviour through the public API.

use zhlex::{IndentFamily, Keyword, LexErrorKind, Lexer, Lexicon, TokenKind, tokenize};

fn chars(input: &str) -> Vec<char> {
    input.chars().collect()
}

// -----------------------------------------------------------
// Basic lexer behaviour.
// -----------------------------------------------------------

#[test]
fn lex_empty_input() {
    let tokens = tokenize("").expect("tokenize");
    assert!(tokens.is_empty());
}

#[test]
fn lex_only_whitespace() {
    let tokens = tokenize("   \t  \n\n\u{3000}  ").expect("tokenize");
    assert!(tokens.is_empty());
}

#[test]
fn comments_are_tokens() {
    let tokens = tokenize("注：第一\n注12：第二\n// 第三\n").expect("tokenize");
    assert_eq!(tokens.len(), 3);
    assert!(tokens.iter().all(|t| t.kind == TokenKind::Comment));
    assert_eq!(tokens[0].text, "第一");
    assert_eq!(tokens[1].text, "第二");
    assert_eq!(tokens[2].text, " 第三");
}

#[test]
fn multiline_comment_spans_lines() {
    let tokens = tokenize("注：「一\n二」令A为1").expect("tokenize");
    assert_eq!(tokens[0].kind, TokenKind::Comment);
    assert_eq!(tokens[0].text, "一\n二");
    assert_eq!(tokens[0].span.line, 1);
    assert_eq!(tokens[0].span.end_line, 2);
    assert_eq!(tokens[1].kind, TokenKind::Keyword(Keyword::Declare));
    assert_eq!(tokens[1].span.line, 2);
}

#[test]
fn spans_are_code_point_offsets() {
    let tokens = tokenize("令甲乙为「丙」").expect("tokenize");
    let spans: Vec<_> = tokens.iter().map(|t| (t.span.start, t.span.end)).collect();
    assert_eq!(spans, vec![(0, 1), (1, 3), (3, 4), (4, 7)]);
}

#[test]
fn fullwidth_and_ascii_punctuation_agree() {
    let full: Vec<_> = tokenize("（f：1，2）")
        .expect("tokenize")
        .iter()
        .map(|t| t.kind)
        .collect();
    let ascii: Vec<_> = tokenize("(f: 1, 2)")
        .expect("tokenize")
        .iter()
        .map(|t| t.kind)
        .collect();
    assert_eq!(full, ascii);
}

#[test]
fn ascii_comma_between_digits_groups() {
    let tokens = tokenize("1,000").expect("tokenize");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].text, "1000");

    let tokens = tokenize("1, 2").expect("tokenize");
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[1].kind, TokenKind::Comma);
}

#[test]
fn longest_keyword_wins() {
    let tokens = tokenize("A不大于B").expect("tokenize");
    assert_eq!(tokens[1].kind, TokenKind::Keyword(Keyword::LessEqual));
    assert_eq!(tokens[1].text, "不大于");

    let tokens = tokenize("结束循环").expect("tokenize");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Keyword(Keyword::Break));
}

#[test]
fn shared_lead_falls_back_to_identifier() {
    let tokens = tokenize("如意").expect("tokenize");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].text, "如意");
}

#[test]
fn unterminated_string_keeps_content() {
    let tokens = tokenize("「未完\n待续").expect("tokenize");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].text, "未完\n待续");
}

// -----------------------------------------------------------
// Lexer errors.
// -----------------------------------------------------------

#[test]
fn invalid_character_offset() {
    let err = tokenize("令A为1\n令B为$").unwrap_err();
    assert_eq!(err.kind, LexErrorKind::InvalidChar('$'));
    assert_eq!(err.offset, 8);
    assert_eq!(err.kind.code(), 0x2101);
}

#[test]
fn indent_family_error() {
    let err = tokenize("A\n\tB\n    C").unwrap_err();
    assert_eq!(
        err.kind,
        LexErrorKind::IndentFamily {
            expected: IndentFamily::Tab,
            found: IndentFamily::Space,
        }
    );
    assert_eq!(err.kind.code(), 0x2103);
}

#[test]
fn indent_count_error() {
    let err = tokenize("A\n   B").unwrap_err();
    assert_eq!(err.kind, LexErrorKind::IndentCount(3));
    assert_eq!(err.kind.code(), 0x2104);
}

#[test]
fn quote_nesting_overflow() {
    let input = "「".repeat(300);
    let err = tokenize(&input).unwrap_err();
    assert_eq!(err.kind, LexErrorKind::QuoteNestingOverflow);
    assert_eq!(err.offset, 255);
}

// -----------------------------------------------------------
// Line index.
// -----------------------------------------------------------

#[test]
fn line_index_records_depths() {
    let source = chars("A\n    B\n\n        C\nD");
    let lexicon = Lexicon::standard();
    let mut lexer = Lexer::new(&source, &lexicon);
    while !lexer.next_token().expect("token").is_eof() {}
    let lines = lexer.into_line_index();

    let depths: Vec<_> = lines.lines().iter().map(|l| l.indent_depth).collect();
    assert_eq!(depths, vec![0, 1, 0, 2, 0]);
    assert_eq!(lines.family(), Some(IndentFamily::Space));
    assert_eq!(lines.get(4).map(|l| l.content_start), Some(17));
}

#[test]
fn tab_depth_is_tab_count() {
    let source = chars("A\n\t\tB");
    let lexicon = Lexicon::standard();
    let mut lexer = Lexer::new(&source, &lexicon);
    while !lexer.next_token().expect("token").is_eof() {}
    assert_eq!(lexer.line_index().depth(2), 2);
    assert_eq!(lexer.line_index().family(), Some(IndentFamily::Tab));
}

#[test]
fn eof_repeats() {
    let source = chars("A");
    let lexicon = Lexicon::standard();
    let mut lexer = Lexer::new(&source, &lexicon);
    assert_eq!(lexer.next_token().expect("token").kind, TokenKind::Identifier);
    assert!(lexer.next_token().expect("token").is_eof());
    assert!(lexer.next_token().expect("token").is_eof());
    assert_eq!(lexer.line_index().len(), 1);
}
