//! Byte cursor over a single line.
//!
//! Readers save `pos()` before trying a grammar and `reset()` to it when the
//! grammar does not match, which is how every rollback in the parser works.

use crate::chars::is_whitespace;
use crate::error::{ParseContext, ParseError, Result};

pub(crate) struct Cursor<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    /// Column of `src[0]` in the enclosing line, for error locations.
    offset: usize,
    /// Column of each byte of `src` and of its end, when `src` was decoded
    /// from escaped text. Empty when the bytes are contiguous.
    columns: &'a [usize],
    ctx: &'a ParseContext,
}

impl<'a> Cursor<'a> {
    pub fn new(src: &'a str, ctx: &'a ParseContext) -> Self {
        Self::with_offset(src, ctx, 0)
    }

    pub fn with_offset(src: &'a str, ctx: &'a ParseContext, offset: usize) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            offset,
            columns: &[],
            ctx,
        }
    }

    /// A cursor over decoded text, locating errors through `columns`.
    pub fn with_columns(src: &'a str, ctx: &'a ParseContext, columns: &'a [usize]) -> Self {
        Self {
            columns,
            ..Self::new(src, ctx)
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn reset(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub fn peek(&self) -> Option<u8> {
        self.byte_at(self.pos)
    }

    /// Byte at an absolute position, `None` past the end.
    pub fn byte_at(&self, pos: usize) -> Option<u8> {
        self.bytes.get(pos).copied()
    }

    pub fn bump(&mut self) {
        if self.pos < self.bytes.len() {
            self.pos += 1;
        }
    }

    pub fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if is_whitespace(c)) {
            self.pos += 1;
        }
    }

    /// Advance over the longest run of bytes matching `pred`, returning its
    /// length.
    pub fn skip_while(&mut self, pred: impl Fn(u8) -> bool) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if pred(c)) {
            self.pos += 1;
        }
        self.pos - start
    }

    /// Text between two positions. Token boundaries always fall on ASCII
    /// bytes, so they are valid char boundaries.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.src[start..end]
    }

    pub fn rest(&self) -> &'a str {
        &self.src[self.pos.min(self.src.len())..]
    }

    /// Run a reader, rewinding to the current position unless it matches.
    pub fn attempt<T>(
        &mut self,
        read: impl FnOnce(&mut Self) -> Result<Option<T>>,
    ) -> Result<Option<T>> {
        let start = self.pos;
        let result = read(self);
        if !matches!(result, Ok(Some(_))) {
            self.pos = start;
        }
        result
    }

    /// Attach the current position to an error.
    pub fn error(&self, err: ParseError) -> ParseError {
        self.error_at(err, self.pos)
    }

    pub fn error_at(&self, err: ParseError, pos: usize) -> ParseError {
        let col = self.columns.get(pos).copied().unwrap_or(self.offset + pos);
        err.with_location(self.ctx, col)
    }
}
