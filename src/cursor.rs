//! Line cursor over an in-memory document with one-character lookahead.

/// Yields `\n`-separated lines and tracks the 1-based number of the last one read.
#[derive(Debug, Clone)]
pub struct LineCursor<'a> {
    rest: &'a str,
    line_number: usize,
}

impl<'a> LineCursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            rest: text,
            line_number: 0,
        }
    }

    /// First character of the next line; `None` at end of input.
    pub fn peek_char(&self) -> Option<char> {
        self.rest.chars().next()
    }

    /// Whether the next line is empty or whitespace only.
    pub fn at_blank_line(&self) -> bool {
        if self.rest.is_empty() {
            return false;
        }
        let line = match self.rest.find('\n') {
            Some(end) => &self.rest[..end],
            None => self.rest,
        };
        line.trim().is_empty()
    }

    /// Next line without its terminator (`\n` or `\r\n`).
    pub fn next_line(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        let (line, rest) = match self.rest.find('\n') {
            Some(end) => (&self.rest[..end], &self.rest[end + 1..]),
            None => (self.rest, ""),
        };
        self.rest = rest;
        self.line_number += 1;
        Some(line.strip_suffix('\r').unwrap_or(line))
    }

    /// Number of the line most recently returned by [`next_line`](Self::next_line).
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn is_eof(&self) -> bool {
        self.rest.is_empty()
    }
}
