use crate::lexicon::Keyword;

/// Source location of a token, in code-point offsets.
///
/// `start..end` covers the raw source text, quotes and grouping separators
/// included. Lines are 1-based; `end_line` differs from `line` only for
/// strings and comments that contain line breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub end_line: usize,
}

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// End of input.
    Eof,
    /// Comment (`注：...`, `//...`); never reaches the parser.
    Comment,
    Identifier,
    /// Number literal; text has grouping commas removed.
    Number,
    /// String literal; text is the content between the outer quotes.
    String,
    Keyword(Keyword),
    /// `：` or `:`.
    Colon,
    /// `；` or `;`, the explicit statement separator.
    Semicolon,
    /// `，` or `,`.
    Comma,
    /// `、`.
    PauseComma,
    /// `？` or `?`.
    QuestionMark,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    /// `#`.
    Hash,
    /// `&`.
    RefMark,
    /// `=` or `＝`.
    Assign,
    /// `==`.
    Equal,
    /// `!=`.
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Plus,
    Minus,
    Star,
    Slash,
}

impl TokenKind {
    /// Tokens after which a line break does not end a statement.
    #[must_use]
    pub const fn continues_line(self) -> bool {
        matches!(
            self,
            Self::Comma
                | Self::PauseComma
                | Self::Colon
                | Self::LeftParen
                | Self::LeftBracket
                | Self::LeftBrace
        )
    }

    /// Tokens that never start a new statement after a line break.
    #[must_use]
    pub const fn closes_group(self) -> bool {
        matches!(
            self,
            Self::RightParen | Self::RightBracket | Self::RightBrace | Self::Eof
        )
    }

    #[must_use]
    pub const fn is_keyword(self, keyword: Keyword) -> bool {
        matches!(self, Self::Keyword(k) if k as u8 == keyword as u8)
    }
}

/// A single token with its kind, text, and source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}
