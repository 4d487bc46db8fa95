//! Offset and line queries over a [`RopeSlice`].
//!
//! Every query is total: offsets past the end of the text are clamped and
//! characters outside of `[0, len)` read as [`NUL`].

use ropey::RopeSlice;

use crate::{
  chars::{
    NUL,
    char_is_blank,
  },
  line_ending::get_line_ending,
};

pub trait TextExt {
  /// The character at `offset`, or [`NUL`] when `offset >= len`.
  fn char_at_or_nul(&self, offset: usize) -> char;
  /// The character before `offset`, or [`NUL`] at the start of the text.
  fn char_before_or_nul(&self, offset: usize) -> char;
  fn line_count(&self) -> usize;
  fn line_of(&self, offset: usize) -> usize;
  fn line_start(&self, line: usize) -> usize;
  /// End of the line content, excluding its line ending.
  fn line_end(&self, line: usize) -> usize;
  fn column_of(&self, offset: usize) -> usize;
  /// Offset for a logical position, with the column clamped to the line.
  fn offset_of(&self, line: usize, column: usize) -> usize;
  /// Number of blanks starting at `start`, stopping before `end`.
  fn count_blanks(&self, start: usize, end: usize) -> usize;
  /// Number of blanks ending at `end`, stopping at `start`.
  fn count_blanks_reversed(&self, start: usize, end: usize) -> usize;
  fn to_text(&self, start: usize, end: usize) -> String;
}

impl TextExt for RopeSlice<'_> {
  #[inline]
  fn char_at_or_nul(&self, offset: usize) -> char {
    self.get_char(offset).unwrap_or(NUL)
  }

  #[inline]
  fn char_before_or_nul(&self, offset: usize) -> char {
    match offset.checked_sub(1) {
      Some(prev) => self.char_at_or_nul(prev),
      None => NUL,
    }
  }

  fn line_count(&self) -> usize {
    self.len_lines()
  }

  fn line_of(&self, offset: usize) -> usize {
    self.char_to_line(offset.min(self.len_chars()))
  }

  fn line_start(&self, line: usize) -> usize {
    self.line_to_char(line.min(self.len_lines() - 1))
  }

  fn line_end(&self, line: usize) -> usize {
    let line = line.min(self.len_lines() - 1);
    let end = self.line_to_char(line + 1);
    end - get_line_ending(self.line(line)).map_or(0, |le| le.len_chars())
  }

  fn column_of(&self, offset: usize) -> usize {
    let offset = offset.min(self.len_chars());
    offset - self.line_start(self.line_of(offset))
  }

  fn offset_of(&self, line: usize, column: usize) -> usize {
    let start = self.line_start(line);
    start + column.min(self.line_end(line) - start)
  }

  fn count_blanks(&self, start: usize, end: usize) -> usize {
    let end = end.min(self.len_chars());
    if start >= end {
      return 0;
    }
    self
      .slice(start..end)
      .chars()
      .take_while(|&ch| char_is_blank(ch))
      .count()
  }

  fn count_blanks_reversed(&self, start: usize, end: usize) -> usize {
    let end = end.min(self.len_chars());
    if start >= end {
      return 0;
    }
    let slice = self.slice(start..end);
    slice
      .chars_at(slice.len_chars())
      .reversed()
      .take_while(|&ch| char_is_blank(ch))
      .count()
  }

  fn to_text(&self, start: usize, end: usize) -> String {
    let end = end.min(self.len_chars());
    let start = start.min(end);
    self.slice(start..end).to_string()
  }
}

#[cfg(test)]
mod test {
  use ropey::Rope;

  use super::*;

  #[test]
  fn sentinel_outside_text() {
    let text = Rope::from("ab");
    let text = text.slice(..);
    assert_eq!(text.char_before_or_nul(0), NUL);
    assert_eq!(text.char_at_or_nul(1), 'b');
    assert_eq!(text.char_at_or_nul(2), NUL);
    assert_eq!(text.char_at_or_nul(99), NUL);
  }

  #[test]
  fn lines() {
    let text = Rope::from("one\r\ntwo\nthree");
    let text = text.slice(..);
    assert_eq!(text.line_count(), 3);
    assert_eq!(text.line_of(4), 0);
    assert_eq!(text.line_of(5), 1);
    assert_eq!(text.line_start(1), 5);
    assert_eq!(text.line_end(0), 3);
    assert_eq!(text.line_end(1), 8);
    assert_eq!(text.line_end(2), 14);
    assert_eq!(text.column_of(7), 2);
    assert_eq!(text.offset_of(1, 99), 8);
    assert_eq!(text.line_of(99), 2);
  }

  #[test]
  fn trailing_newline_opens_an_empty_line() {
    let text = Rope::from("abc\n");
    let text = text.slice(..);
    assert_eq!(text.line_count(), 2);
    assert_eq!(text.line_start(1), 4);
    assert_eq!(text.line_end(1), 4);
  }

  #[test]
  fn blanks() {
    let text = Rope::from("  \tab \t\n");
    let text = text.slice(..);
    assert_eq!(text.count_blanks(0, 7), 3);
    assert_eq!(text.count_blanks_reversed(0, 7), 2);
    assert_eq!(text.count_blanks(3, 7), 0);
    assert_eq!(text.count_blanks(5, 5), 0);
  }
}
