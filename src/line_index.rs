//! Per-line indentation records.

use std::fmt;

/// Whitespace glyph used for indentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentFamily {
    None,
    Tab,
    Space,
}

impl IndentFamily {
    pub(crate) const fn of(ch: char) -> Self {
        match ch {
            '\t' => Self::Tab,
            ' ' => Self::Space,
            _ => Self::None,
        }
    }
}

impl fmt::Display for IndentFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Tab => write!(f, "tab"),
            Self::Space => write!(f, "space"),
        }
    }
}

/// Indentation facts about one source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineInfo {
    pub indent_depth: usize,
    pub indent_family: IndentFamily,
    /// Offset of the first code point after the indent run.
    pub content_start: usize,
}

impl LineInfo {
    pub(crate) const fn blank(content_start: usize) -> Self {
        Self {
            indent_depth: 0,
            indent_family: IndentFamily::None,
            content_start,
        }
    }
}

/// Append-only table of lines, built while lexing.
///
/// Line numbers are 1-based. The line currently being lexed is "open" and
/// visible through [`LineIndex::get`]; it is moved into the closed table when
/// its line break (or EOF) is consumed and never revised afterwards.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    closed: Vec<LineInfo>,
    open: Option<LineInfo>,
    family: Option<IndentFamily>,
}

impl LineIndex {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            closed: Vec::new(),
            open: None,
            family: None,
        }
    }

    /// Indent family fixed by the first indented line, if any.
    #[must_use]
    pub const fn family(&self) -> Option<IndentFamily> {
        self.family
    }

    pub(crate) fn fix_family(&mut self, family: IndentFamily) {
        self.family = Some(family);
    }

    pub(crate) fn open_line(&mut self, info: LineInfo) {
        self.open = Some(info);
    }

    /// Close the open line. Closing with no open line records a blank one.
    pub(crate) fn close_line(&mut self, offset: usize) {
        let info = self.open.take().unwrap_or_else(|| LineInfo::blank(offset));
        self.closed.push(info);
    }

    #[must_use]
    pub fn get(&self, line: usize) -> Option<&LineInfo> {
        let idx = line.checked_sub(1)?;
        self.closed.get(idx).or_else(|| {
            if idx == self.closed.len() {
                self.open.as_ref()
            } else {
                None
            }
        })
    }

    /// Indent depth of `line`; unknown lines count as depth 0.
    #[must_use]
    pub fn depth(&self, line: usize) -> usize {
        self.get(line).map_or(0, |info| info.indent_depth)
    }

    /// Closed lines, in order.
    #[must_use]
    pub fn lines(&self) -> &[LineInfo] {
        &self.closed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.closed.len() + usize::from(self.open.is_some())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(depth: usize, family: IndentFamily, start: usize) -> LineInfo {
        LineInfo {
            indent_depth: depth,
            indent_family: family,
            content_start: start,
        }
    }

    #[test]
    fn open_line_is_visible() {
        let mut index = LineIndex::new();
        index.open_line(info(0, IndentFamily::None, 0));
        index.close_line(3);
        index.open_line(info(1, IndentFamily::Space, 8));
        assert_eq!(index.len(), 2);
        assert_eq!(index.depth(1), 0);
        assert_eq!(index.depth(2), 1);
        assert_eq!(index.lines().len(), 1);
    }

    #[test]
    fn close_without_open_is_blank() {
        let mut index = LineIndex::new();
        index.close_line(5);
        assert_eq!(index.get(1), Some(&LineInfo::blank(5)));
    }

    #[test]
    fn unknown_lines() {
        let index = LineIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.get(0), None);
        assert_eq!(index.depth(7), 0);
    }
}
