//! Lexer and parser for an indentation-sensitive language written with
//! multi-glyph Chinese keywords.
//!
//! Source text goes through a keyword-aware [`Lexer`] that records each
//! line's indentation in a [`LineIndex`], then a recursive-descent parser
//! builds a [`Program`]. Blocks come from indentation alone and line
//! breaks end statements unless an expression is still open.
//!
//! # Quick start
//!
//! ```
//! use zhlex::{format, parse_str};
//!
//! let program = parse_str("令A为1").unwrap();
//! assert_eq!(
//!     format(&program),
//!     "$PG(stmts[]=($VD(groups[]=($VG(vars[]=($ID(A)) const=(false) expr=($NUM(1)))))))"
//! );
//! ```
//!
//! ## Custom keyword tables
//!
//! ```
//! use zhlex::{Keyword, Lexicon, parse_with};
//!
//! let lexicon = Lexicon::new([("设", Keyword::Declare), ("为", Keyword::LogicYes)]).unwrap();
//! let source: Vec<char> = "设A为1".chars().collect();
//! let program = parse_with(&source, &lexicon).unwrap();
//! assert_eq!(program.stmts.len(), 1);
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ast;
pub mod formatter;
pub mod lexer;
pub mod lexicon;
pub mod line_index;
pub mod parser;
pub mod stream;
pub mod token;

pub use ast::{Block, Expr, ExprKind, Program, Stmt, StmtKind};
pub use formatter::format;
pub use lexer::{LexError, LexErrorKind, Lexer, tokenize};
pub use lexicon::{Keyword, Lexicon, LexiconError};
pub use line_index::{IndentFamily, LineIndex, LineInfo};
pub use parser::{ParseError, ParseErrorKind, parse, parse_with};
pub use token::{Span, Token, TokenKind};

/// Unified error type covering both lexing and parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A lexer or indentation error.
    #[error("{0}")]
    Lex(#[from] LexError),
    /// A parser error.
    #[error("{0}")]
    Parse(#[from] ParseError),
}

impl Error {
    /// Error-class code: `0x21xx` for lexical and indentation errors,
    /// `0x22xx` for syntax errors.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::Lex(e) => e.kind.code(),
            Self::Parse(e) => e.kind.code(),
        }
    }

    /// Code-point offset into the source.
    #[must_use]
    pub const fn offset(&self) -> usize {
        match self {
            Self::Lex(e) => e.offset,
            Self::Parse(e) => e.offset,
        }
    }
}

/// Decode and parse a source string in one step.
pub fn parse_str(input: &str) -> Result<Program, Error> {
    let source: Vec<char> = input.chars().collect();
    parse(&source)
}
