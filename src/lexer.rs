use std::fmt;

use crate::lexicon::Lexicon;
use crate::line_index::{IndentFamily, LineIndex, LineInfo};
use crate::stream::CharStream;
use crate::token::{Span, Token, TokenKind};

/// Glyph that introduces a `注：...` comment.
pub(crate) const COMMENT_LEAD: char = '注';

const MAX_QUOTE_NESTING: usize = 255;
const SPACES_PER_INDENT: usize = 4;

/// Paired quote glyphs; each family nests independently.
const QUOTE_PAIRS: [(char, char); 5] = [
    ('「', '」'),
    ('『', '』'),
    ('“', '”'),
    ('‘', '’'),
    ('《', '》'),
];

const OPERATOR_GLYPHS: [char; 9] = ['=', '＝', '!', '<', '>', '+', '-', '*', '/'];

/// Classifies a lexer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// Code point that cannot appear here.
    InvalidChar(char),
    /// Input ended in the middle of a number literal.
    UnexpectedEnd,
    /// Indent run uses a different glyph than the file's first indent.
    IndentFamily {
        expected: IndentFamily,
        found: IndentFamily,
    },
    /// Space indent that is not a multiple of four.
    IndentCount(usize),
    /// Same-family quotes nested too deeply.
    QuoteNestingOverflow,
}

impl LexErrorKind {
    /// Error-class code.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::InvalidChar(_) => 0x2101,
            Self::UnexpectedEnd => 0x2102,
            Self::IndentFamily { .. } => 0x2103,
            Self::IndentCount(_) => 0x2104,
            Self::QuoteNestingOverflow => 0x2105,
        }
    }
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChar(ch) => write!(f, "invalid character '{ch}'"),
            Self::UnexpectedEnd => write!(f, "unexpected end of input"),
            Self::IndentFamily { expected, found } => {
                write!(
                    f,
                    "inconsistent indentation, \
                     expected {expected} indent but found {found}"
                )
            }
            Self::IndentCount(count) => {
                write!(
                    f,
                    "indentation of {count} spaces is not a multiple of {SPACES_PER_INDENT}"
                )
            }
            Self::QuoteNestingOverflow => {
                write!(f, "quotes nested deeper than {MAX_QUOTE_NESTING} levels")
            }
        }
    }
}

/// Error produced during lexing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at offset {offset}")]
pub struct LexError {
    pub kind: LexErrorKind,
    /// Code-point offset of the offending glyph.
    pub offset: usize,
}

/// Tokenize a source string into every token it contains, comments
/// included and the final end-of-input token excluded.
///
/// # Errors
///
/// Returns `LexError` on invalid characters, malformed numbers,
/// or inconsistent indentation.
#[tracing::instrument(skip_all, fields(source_len = input.len()))]
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let chars: Vec<char> = input.chars().collect();
    let lexicon = Lexicon::standard();
    Lexer::new(&chars, &lexicon).tokenize()
}

/// On-demand tokenizer over a decoded source.
///
/// Tracks line numbers and records each line's indentation in a
/// [`LineIndex`] as line breaks are crossed.
pub struct Lexer<'a> {
    stream: CharStream<'a>,
    lexicon: &'a Lexicon,
    lines: LineIndex,
    line: usize,
    at_line_start: bool,
    finished: bool,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub const fn new(source: &'a [char], lexicon: &'a Lexicon) -> Self {
        Self {
            stream: CharStream::new(source),
            lexicon,
            lines: LineIndex::new(),
            line: 1,
            at_line_start: true,
            finished: false,
        }
    }

    #[must_use]
    pub const fn line_index(&self) -> &LineIndex {
        &self.lines
    }

    #[must_use]
    pub fn into_line_index(self) -> LineIndex {
        self.lines
    }

    /// Drain the lexer, keeping comments and dropping the EOF token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            if token.is_eof() {
                break;
            }
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Produce the next token.
    ///
    /// Once input is exhausted every call returns an EOF token.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        loop {
            if self.at_line_start {
                self.at_line_start = false;
                self.scan_indent()?;
            }

            let Some(ch) = self.stream.current() else {
                return Ok(self.eof_token());
            };

            match ch {
                '\r' | '\n' => {
                    self.consume_line_break(None);
                    self.at_line_start = true;
                }
                c if is_inline_space(c) => {
                    self.stream.next();
                }
                _ => return self.scan_token(ch),
            }
        }
    }

    fn eof_token(&mut self) -> Token {
        let pos = self.stream.pos();
        if !self.finished {
            self.finished = true;
            self.lines.close_line(pos);
        }
        Token {
            kind: TokenKind::Eof,
            text: String::new(),
            span: Span {
                start: pos,
                end: pos,
                line: self.line,
                end_line: self.line,
            },
        }
    }

    const fn error(kind: LexErrorKind, offset: usize) -> LexError {
        LexError { kind, offset }
    }

    fn make_token(&self, kind: TokenKind, text: String, start: usize, line: usize) -> Token {
        Token {
            kind,
            text,
            span: Span {
                start,
                end: self.stream.pos(),
                line,
                end_line: self.line,
            },
        }
    }

    /// Consume a CR, LF, CR LF or LF CR sequence and close the line.
    ///
    /// When `buf` is given the raw break glyphs are appended to it.
    fn consume_line_break(&mut self, mut buf: Option<&mut String>) {
        let Some(first) = self.stream.current() else {
            return;
        };
        if let Some(buf) = buf.as_mut() {
            buf.push(first);
        }
        let paired = self
            .stream
            .next()
            .filter(|c| matches!(c, '\r' | '\n') && *c != first);
        if let Some(second) = paired {
            if let Some(buf) = buf {
                buf.push(second);
            }
            self.stream.next();
        }
        self.lines.close_line(self.stream.pos());
        self.line += 1;
    }

    fn scan_indent(&mut self) -> Result<(), LexError> {
        let line_start = self.stream.pos();
        let mut run: Vec<(char, usize)> = Vec::new();
        while let Some(c @ (' ' | '\t')) = self.stream.current() {
            run.push((c, self.stream.pos()));
            self.stream.next();
        }
        let content_start = self.stream.pos();

        // Whitespace-only lines carry no indentation.
        if matches!(self.stream.current(), None | Some('\r' | '\n')) {
            self.lines.open_line(LineInfo::blank(content_start));
            return Ok(());
        }

        let Some(&(first, _)) = run.first() else {
            self.lines.open_line(LineInfo::blank(content_start));
            return Ok(());
        };

        let expected = self
            .lines
            .family()
            .unwrap_or_else(|| IndentFamily::of(first));
        if let Some(&(glyph, offset)) = run
            .iter()
            .find(|(c, _)| IndentFamily::of(*c) != expected)
        {
            return Err(Self::error(
                LexErrorKind::IndentFamily {
                    expected,
                    found: IndentFamily::of(glyph),
                },
                offset,
            ));
        }
        if self.lines.family().is_none() {
            tracing::debug!(family = %expected, line = self.line, "indent family fixed");
            self.lines.fix_family(expected);
        }

        let count = run.len();
        let depth = match expected {
            IndentFamily::Space => {
                if count % SPACES_PER_INDENT != 0 {
                    return Err(Self::error(LexErrorKind::IndentCount(count), line_start));
                }
                count / SPACES_PER_INDENT
            }
            IndentFamily::Tab => count,
            IndentFamily::None => 0,
        };
        self.lines.open_line(LineInfo {
            indent_depth: depth,
            indent_family: expected,
            content_start,
        });
        Ok(())
    }

    fn scan_token(&mut self, ch: char) -> Result<Token, LexError> {
        if let Some(close) = quote_close(ch) {
            return self.scan_string(ch, close);
        }
        if self.at_comment() {
            return self.scan_comment();
        }
        if ch.is_ascii_digit()
            || (matches!(ch, '+' | '-') && self.stream.peek().is_some_and(|c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }
        if let Some(kind) = punctuation(ch) {
            let start = self.stream.pos();
            self.stream.next();
            return Ok(self.make_token(kind, ch.to_string(), start, self.line));
        }
        if let Some(token) = self.scan_operator(ch)? {
            return Ok(token);
        }
        if let Some((keyword, len)) = self.lexicon.match_at(&self.stream) {
            let start = self.stream.pos();
            for _ in 0..len {
                self.stream.next();
            }
            let text = self.stream.slice(start, self.stream.pos());
            tracing::trace!(%keyword, offset = start, "keyword");
            return Ok(self.make_token(TokenKind::Keyword(keyword), text, start, self.line));
        }
        if is_ident_start(ch) {
            return Ok(self.scan_identifier());
        }
        Err(Self::error(
            LexErrorKind::InvalidChar(ch),
            self.stream.pos(),
        ))
    }

    /// `注` + digits + colon, or `//`.
    fn at_comment(&self) -> bool {
        match self.stream.current() {
            Some('/') => self.stream.peek() == Some('/'),
            Some(COMMENT_LEAD) => {
                let mut n = 1;
                while self.stream.peek_at(n).is_some_and(|c| c.is_ascii_digit()) {
                    n += 1;
                }
                matches!(self.stream.peek_at(n), Some('：' | ':'))
            }
            _ => false,
        }
    }

    fn scan_comment(&mut self) -> Result<Token, LexError> {
        let start = self.stream.pos();
        let line = self.line;

        if self.stream.current() == Some('/') {
            self.stream.next();
            self.stream.next();
        } else {
            // lead, comment id, colon
            while !matches!(self.stream.next(), Some('：' | ':') | None) {}
            self.stream.next();
        }

        let quote = self
            .stream
            .current()
            .and_then(|open| quote_close(open).map(|close| (open, close)));
        let text = match quote {
            Some((open, close)) => self.scan_quoted(open, close)?,
            None => {
                let mut text = String::new();
                while let Some(c) = self.stream.current() {
                    if matches!(c, '\r' | '\n') {
                        break;
                    }
                    text.push(c);
                    self.stream.next();
                }
                text
            }
        };

        Ok(self.make_token(TokenKind::Comment, text, start, line))
    }

    fn scan_string(&mut self, open: char, close: char) -> Result<Token, LexError> {
        let start = self.stream.pos();
        let line = self.line;
        let text = self.scan_quoted(open, close)?;
        Ok(self.make_token(TokenKind::String, text, start, line))
    }

    /// Scan from an opening quote to its matching close.
    ///
    /// Only `open`/`close` affect the nesting depth; other quote glyphs and
    /// line breaks are kept verbatim. Hitting EOF returns what was scanned.
    fn scan_quoted(&mut self, open: char, close: char) -> Result<String, LexError> {
        let mut text = String::new();
        let mut depth = 1usize;
        self.stream.next();

        while let Some(c) = self.stream.current() {
            if c == close {
                depth -= 1;
                self.stream.next();
                if depth == 0 {
                    return Ok(text);
                }
                text.push(c);
            } else if c == open {
                depth += 1;
                if depth > MAX_QUOTE_NESTING {
                    return Err(Self::error(
                        LexErrorKind::QuoteNestingOverflow,
                        self.stream.pos(),
                    ));
                }
                text.push(c);
                self.stream.next();
            } else if matches!(c, '\r' | '\n') {
                self.consume_line_break(Some(&mut text));
            } else {
                text.push(c);
                self.stream.next();
            }
        }

        Ok(text)
    }

    fn scan_number(&mut self) -> Result<Token, LexError> {
        let start = self.stream.pos();
        let mut text = String::new();

        if let Some(sign @ ('+' | '-')) = self.stream.current() {
            text.push(sign);
            self.stream.next();
        }
        self.require_digits(&mut text)?;

        // Grouping separators between digit runs are dropped.
        while self.stream.current() == Some(',')
            && self.stream.peek().is_some_and(|c| c.is_ascii_digit())
        {
            self.stream.next();
            self.require_digits(&mut text)?;
        }

        if self.stream.current() == Some('.') {
            text.push('.');
            self.stream.next();
            self.require_digits(&mut text)?;
        }

        match self.stream.current() {
            Some(marker @ ('e' | 'E')) => {
                text.push(marker);
                self.stream.next();
                self.scan_exponent(&mut text)?;
            }
            Some('×')
                if self.stream.peek() == Some('1')
                    && self.stream.peek2() == Some('0')
                    && self.stream.peek3() == Some('^') =>
            {
                text.push_str("×10^");
                for _ in 0..4 {
                    self.stream.next();
                }
                self.scan_exponent(&mut text)?;
            }
            _ => {}
        }

        Ok(self.make_token(TokenKind::Number, text, start, self.line))
    }

    fn scan_exponent(&mut self, text: &mut String) -> Result<(), LexError> {
        if let Some(sign @ ('+' | '-')) = self.stream.current() {
            text.push(sign);
            self.stream.next();
        }
        self.require_digits(text)
    }

    /// Consume one or more ASCII digits.
    fn require_digits(&mut self, text: &mut String) -> Result<(), LexError> {
        match self.stream.current() {
            Some(c) if c.is_ascii_digit() => {}
            Some(c) => {
                return Err(Self::error(
                    LexErrorKind::InvalidChar(c),
                    self.stream.pos(),
                ));
            }
            None => {
                return Err(Self::error(
                    LexErrorKind::UnexpectedEnd,
                    self.stream.pos(),
                ));
            }
        }
        while let Some(c) = self.stream.current() {
            if !c.is_ascii_digit() {
                break;
            }
            text.push(c);
            self.stream.next();
        }
        Ok(())
    }

    /// Operators. Returns `None` when an arithmetic glyph is not followed
    /// by a separator, so it can be lexed as part of an identifier.
    fn scan_operator(&mut self, ch: char) -> Result<Option<Token>, LexError> {
        let followed_by_eq = self.stream.peek() == Some('=');
        let (kind, len) = match ch {
            '=' if followed_by_eq => (TokenKind::Equal, 2),
            '=' | '＝' => (TokenKind::Assign, 1),
            '!' if followed_by_eq => (TokenKind::NotEqual, 2),
            '!' => {
                return Err(Self::error(
                    LexErrorKind::InvalidChar(ch),
                    self.stream.pos(),
                ));
            }
            '<' if followed_by_eq => (TokenKind::LessEqual, 2),
            '<' => (TokenKind::Less, 1),
            '>' if followed_by_eq => (TokenKind::GreaterEqual, 2),
            '>' => (TokenKind::Greater, 1),
            '+' | '-' | '*' | '/' if is_separator(self.stream.peek()) => {
                let kind = match ch {
                    '+' => TokenKind::Plus,
                    '-' => TokenKind::Minus,
                    '*' => TokenKind::Star,
                    _ => TokenKind::Slash,
                };
                (kind, 1)
            }
            _ => return Ok(None),
        };

        let start = self.stream.pos();
        for _ in 0..len {
            self.stream.next();
        }
        let text = self.stream.slice(start, self.stream.pos());
        Ok(Some(self.make_token(kind, text, start, self.line)))
    }

    /// Identifier run; stops before anything that would lex as a keyword
    /// or a comment.
    fn scan_identifier(&mut self) -> Token {
        let start = self.stream.pos();
        self.stream.next();
        while let Some(c) = self.stream.current() {
            if !is_ident_continue(c)
                || self.at_comment()
                || self.lexicon.match_at(&self.stream).is_some()
            {
                break;
            }
            self.stream.next();
        }
        let text = self.stream.slice(start, self.stream.pos());
        self.make_token(TokenKind::Identifier, text, start, self.line)
    }
}

fn quote_close(open: char) -> Option<char> {
    QUOTE_PAIRS
        .iter()
        .find(|(o, _)| *o == open)
        .map(|(_, close)| *close)
}

fn is_quote(ch: char) -> bool {
    QUOTE_PAIRS.iter().any(|(o, c)| *o == ch || *c == ch)
}

const fn punctuation(ch: char) -> Option<TokenKind> {
    let kind = match ch {
        '：' | ':' => TokenKind::Colon,
        '；' | ';' => TokenKind::Semicolon,
        '，' | ',' => TokenKind::Comma,
        '、' => TokenKind::PauseComma,
        '？' | '?' => TokenKind::QuestionMark,
        '（' | '(' => TokenKind::LeftParen,
        '）' | ')' => TokenKind::RightParen,
        '【' | '[' => TokenKind::LeftBracket,
        '】' | ']' => TokenKind::RightBracket,
        '{' => TokenKind::LeftBrace,
        '}' => TokenKind::RightBrace,
        '#' => TokenKind::Hash,
        '&' => TokenKind::RefMark,
        _ => return None,
    };
    Some(kind)
}

const fn is_inline_space(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\u{3000}')
}

/// Glyphs that end an arithmetic-operator candidate: whitespace,
/// punctuation, quotes, or end of input.
fn is_separator(ch: Option<char>) -> bool {
    ch.is_none_or(|c| c.is_whitespace() || punctuation(c).is_some() || is_quote(c))
}

/// Glyphs that have a fixed lexical role and so can never lead a keyword.
pub(crate) fn is_reserved_glyph(ch: char) -> bool {
    ch.is_ascii_digit()
        || ch.is_whitespace()
        || punctuation(ch).is_some()
        || is_quote(ch)
        || OPERATOR_GLYPHS.contains(&ch)
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || matches!(ch, '_' | '+' | '-' | '*' | '/')
}

fn is_ident_continue(ch: char) -> bool {
    is_ident_start(ch) || ch.is_ascii_digit()
}
