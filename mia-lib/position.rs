use mia_core::text::TextExt;
use ropey::RopeSlice;

/// A logical `(line, column)` point in a text buffer, 0-indexed.
///
/// The column may lie past the end of its line; it is clamped only when
/// converted back to an offset.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
  pub line:   usize,
  pub column: usize,
}

impl Position {
  pub const fn new(line: usize, column: usize) -> Self {
    Self { line, column }
  }

  pub fn from_offset(text: RopeSlice, offset: usize) -> Self {
    let offset = offset.min(text.len_chars());
    Self::new(text.line_of(offset), text.column_of(offset))
  }

  /// Position of the end of the text.
  pub fn end_of_text(text: RopeSlice) -> Self {
    Self::from_offset(text, text.len_chars())
  }

  pub fn to_offset(self, text: RopeSlice) -> usize {
    text.offset_of(self.line, self.column)
  }

  #[must_use]
  pub const fn on_line(self, line: usize) -> Self {
    Self::new(line, self.column)
  }

  #[must_use]
  pub const fn at_column(self, column: usize) -> Self {
    Self::new(self.line, column)
  }

  #[must_use]
  pub const fn at_start_of_line(self) -> Self {
    self.at_column(0)
  }

  /// End of a line selection ending at this position: the start of the
  /// next line unless the position is already at column 0. On the last line
  /// this is the end of the text.
  #[must_use]
  pub fn at_end_of_line(self, text: RopeSlice) -> Self {
    let end = Self::end_of_text(text);
    if self.line < end.line {
      Self::new(self.line + usize::from(self.column > 0), 0)
    } else {
      end
    }
  }

  /// Start of the next line, or the end of the text on the last line.
  #[must_use]
  pub fn at_end_of_next_line(self, text: RopeSlice) -> Self {
    let end = Self::end_of_text(text);
    if self.line < end.line {
      Self::new(self.line + 1, 0)
    } else {
      end
    }
  }
}

impl From<(usize, usize)> for Position {
  fn from(value: (usize, usize)) -> Self {
    Position::new(value.0, value.1)
  }
}
