//! Keyword lexicon and longest-match keyword recognition.

use std::collections::HashMap;
use std::fmt;

use crate::lexer::{COMMENT_LEAD, is_reserved_glyph};
use crate::stream::CharStream;

/// Longest keyword literal, in code points.
pub const MAX_KEYWORD_LEN: usize = 4;

/// Every keyword the grammar knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Declare,
    LogicYes,
    AssignConst,
    ObjNew,
    Cond,
    CondElse,
    CondOther,
    WhileLoop,
    VarOne,
    Iterate,
    FuncDecl,
    ParamClaim,
    Return,
    Import,
    ClassDefine,
    Constructor,
    Getter,
    This,
    Dot,
    Yield,
    Break,
    Continue,
    And,
    Or,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

/// The standard keyword table.
pub const STANDARD_KEYWORDS: &[(&str, Keyword)] = &[
    ("令", Keyword::Declare),
    ("为", Keyword::LogicYes),
    ("恒为", Keyword::AssignConst),
    ("成为", Keyword::ObjNew),
    ("如果", Keyword::Cond),
    ("再如", Keyword::CondElse),
    ("否则", Keyword::CondOther),
    ("每当", Keyword::WhileLoop),
    ("以", Keyword::VarOne),
    ("遍历", Keyword::Iterate),
    ("如何", Keyword::FuncDecl),
    ("已知", Keyword::ParamClaim),
    ("返回", Keyword::Return),
    ("导入", Keyword::Import),
    ("定义", Keyword::ClassDefine),
    ("是为", Keyword::Constructor),
    ("何为", Keyword::Getter),
    ("其", Keyword::This),
    ("之", Keyword::Dot),
    ("得到", Keyword::Yield),
    ("结束循环", Keyword::Break),
    ("继续循环", Keyword::Continue),
    ("且", Keyword::And),
    ("或", Keyword::Or),
    ("等于", Keyword::Equal),
    ("不等于", Keyword::NotEqual),
    ("小于", Keyword::Less),
    ("不大于", Keyword::LessEqual),
    ("大于", Keyword::Greater),
    ("不小于", Keyword::GreaterEqual),
];

impl Keyword {
    /// Literal spelling in the standard lexicon.
    #[must_use]
    pub fn literal(self) -> &'static str {
        STANDARD_KEYWORDS
            .iter()
            .find(|(_, kw)| *kw == self)
            .map_or("", |(lit, _)| lit)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.literal())
    }
}

/// Why a keyword table was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexiconError {
    #[error("empty keyword literal")]
    Empty,
    #[error("keyword '{0}' is longer than {MAX_KEYWORD_LEN} code points")]
    TooLong(String),
    #[error("keyword '{0}' is defined more than once")]
    Duplicate(String),
    #[error("keyword '{0}' starts with a reserved glyph")]
    ReservedLead(String),
}

#[derive(Debug, Clone)]
struct Entry {
    glyphs: Vec<char>,
    keyword: Keyword,
}

/// Immutable keyword table, grouped by lead glyph.
///
/// Within a group, entries are kept longest-first so that matching can stop
/// at the first literal whose glyphs are all confirmed.
#[derive(Debug, Clone)]
pub struct Lexicon {
    by_lead: HashMap<char, Vec<Entry>>,
}

impl Lexicon {
    /// Build and validate a lexicon from `(literal, keyword)` pairs.
    pub fn new<'s, I>(entries: I) -> Result<Self, LexiconError>
    where
        I: IntoIterator<Item = (&'s str, Keyword)>,
    {
        let lexicon = Self::build(entries);
        lexicon.validate()?;
        Ok(lexicon)
    }

    /// The lexicon described by [`STANDARD_KEYWORDS`].
    #[must_use]
    pub fn standard() -> Self {
        Self::build(STANDARD_KEYWORDS.iter().copied())
    }

    fn build<'s, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'s str, Keyword)>,
    {
        let mut by_lead: HashMap<char, Vec<Entry>> = HashMap::new();
        for (literal, keyword) in entries {
            let glyphs: Vec<char> = literal.chars().collect();
            // Empty literals have no lead; keep them under NUL so
            // validation can report them.
            let lead = glyphs.first().copied().unwrap_or('\0');
            by_lead
                .entry(lead)
                .or_default()
                .push(Entry { glyphs, keyword });
        }
        for group in by_lead.values_mut() {
            group.sort_by(|a, b| b.glyphs.len().cmp(&a.glyphs.len()));
        }
        Self { by_lead }
    }

    /// Check that longest-match over this table is unambiguous.
    pub fn validate(&self) -> Result<(), LexiconError> {
        for (lead, group) in &self.by_lead {
            for (i, entry) in group.iter().enumerate() {
                let literal: String = entry.glyphs.iter().collect();
                if entry.glyphs.is_empty() {
                    return Err(LexiconError::Empty);
                }
                if entry.glyphs.len() > MAX_KEYWORD_LEN {
                    return Err(LexiconError::TooLong(literal));
                }
                if is_reserved_glyph(*lead) || *lead == COMMENT_LEAD {
                    return Err(LexiconError::ReservedLead(literal));
                }
                if group[i + 1..].iter().any(|e| e.glyphs == entry.glyphs) {
                    return Err(LexiconError::Duplicate(literal));
                }
            }
        }
        Ok(())
    }

    /// Whether any keyword starts with `ch`.
    #[must_use]
    pub fn is_lead(&self, ch: char) -> bool {
        self.by_lead.contains_key(&ch)
    }

    /// Match a keyword starting at the stream's current glyph.
    ///
    /// Does not move the cursor; returns the keyword and its length in code
    /// points so the caller can consume it.
    #[must_use]
    pub fn match_at(&self, stream: &CharStream<'_>) -> Option<(Keyword, usize)> {
        let group = self.by_lead.get(&stream.current()?)?;
        group
            .iter()
            .find(|entry| {
                entry.glyphs[1..]
                    .iter()
                    .enumerate()
                    .all(|(i, &glyph)| lookahead(stream, i + 1) == Some(glyph))
            })
            .map(|entry| (entry.keyword, entry.glyphs.len()))
    }

    /// All `(literal, keyword)` pairs, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = (String, Keyword)> + '_ {
        self.by_lead
            .values()
            .flatten()
            .map(|e| (e.glyphs.iter().collect(), e.keyword))
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::standard()
    }
}

fn lookahead(stream: &CharStream<'_>, n: usize) -> Option<char> {
    match n {
        1 => stream.peek(),
        2 => stream.peek2(),
        3 => stream.peek3(),
        _ => None,
    }
}
