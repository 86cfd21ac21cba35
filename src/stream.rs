//! Forward-only cursor over a fully decoded source.

/// Cursor over an immutable code-point buffer.
///
/// The cursor always sits on a code point (the "current" one) or past the
/// end, in which case every accessor returns `None`.
#[derive(Debug, Clone)]
pub struct CharStream<'a> {
    chars: &'a [char],
    pos: usize,
}

impl<'a> CharStream<'a> {
    #[must_use]
    pub const fn new(chars: &'a [char]) -> Self {
        Self { chars, pos: 0 }
    }

    /// Offset of the current code point.
    #[must_use]
    pub const fn pos(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Advance the cursor and return the code point now under it.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<char> {
        if self.pos < self.chars.len() {
            self.pos += 1;
        }
        self.current()
    }

    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.peek_at(1)
    }

    #[must_use]
    pub fn peek2(&self) -> Option<char> {
        self.peek_at(2)
    }

    #[must_use]
    pub fn peek3(&self) -> Option<char> {
        self.peek_at(3)
    }

    /// Look `n` code points ahead of the cursor without moving it.
    pub(crate) fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).copied()
    }

    /// Source text between two offsets.
    pub(crate) fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.chars.len());
        self.chars[start.min(end)..end].iter().collect()
    }
}
