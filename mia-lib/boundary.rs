//! Next/previous boundary scans.
//!
//! A scan walks from the caret toward a bound computed once per call from
//! the requested line stops, and stops at the first offset matching a
//! requested word stop. Collapsed fold regions are crossed in one step
//! unless a fold stop is requested.
//!
//! ```ignore
//! let request = ScanRequest::new(Direction::Forward, BoundaryFlags::START_OF_WORD)
//!   .camel(true);
//! assert_eq!(scan_boundary(Rope::from("fooBar").slice(..), 0, &request), 3);
//! ```

use bitflags::bitflags;
use mia_core::{
  classify::{
    WordTypePolicy,
    is_whitespace,
    is_word_type_end,
    is_word_type_start,
  },
  text::TextExt,
};
use ropey::RopeSlice;
use tracing::trace;

use crate::{
  host::{
    CaretModel,
    FoldingModel,
    LexemeModel,
    NoFolds,
    NoLexemes,
  },
  movement::Direction,
  selection::{
    CursorId,
    Range,
  },
};

bitflags! {
  /// Where a scan may stop.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
  pub struct BoundaryFlags: u16 {
    const START_OF_WORD            = 1 << 0;
    const END_OF_WORD              = 1 << 1;
    const START_OF_TRAILING_BLANKS = 1 << 2;
    const END_OF_LEADING_BLANKS    = 1 << 3;
    const START_OF_LINE            = 1 << 4;
    const END_OF_LINE              = 1 << 5;
    const START_OF_FOLDING_REGION  = 1 << 6;
    const END_OF_FOLDING_REGION    = 1 << 7;
    /// Never leave the caret's line.
    const SINGLE_LINE              = 1 << 8;
    /// Like `SINGLE_LINE`, but only while there are several carets.
    const MULTI_CARET_SINGLE_LINE  = 1 << 9;

    /// Flags that can end a scan on their own.
    const STOPS = Self::START_OF_WORD.bits()
      | Self::END_OF_WORD.bits()
      | Self::START_OF_TRAILING_BLANKS.bits()
      | Self::END_OF_LEADING_BLANKS.bits()
      | Self::START_OF_LINE.bits()
      | Self::END_OF_LINE.bits()
      | Self::START_OF_FOLDING_REGION.bits()
      | Self::END_OF_FOLDING_REGION.bits()
      | Self::SINGLE_LINE.bits();
  }
}

/// One boundary scan, built per action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRequest {
  pub direction: Direction,
  pub flags:     BoundaryFlags,
  pub word_type: WordTypePolicy,
  pub camel:     bool,
}

impl ScanRequest {
  pub fn new(direction: Direction, flags: BoundaryFlags) -> Self {
    Self {
      direction,
      flags,
      word_type: WordTypePolicy::default(),
      camel: false,
    }
  }

  #[must_use]
  pub fn word_type(mut self, word_type: WordTypePolicy) -> Self {
    self.word_type = word_type;
    self
  }

  #[must_use]
  pub fn camel(mut self, camel: bool) -> Self {
    self.camel = camel;
    self
  }

  #[must_use]
  pub fn reversed(mut self) -> Self {
    self.direction = self.direction.reverse();
    self
  }
}

/// Scans over one text with the host's fold and lexeme oracles.
pub struct Scanner<'a> {
  text:        RopeSlice<'a>,
  folds:       &'a dyn FoldingModel,
  lexemes:     &'a dyn LexemeModel,
  multi_caret: bool,
}

impl<'a> Scanner<'a> {
  pub fn new(text: RopeSlice<'a>) -> Self {
    Self {
      text,
      folds: &NoFolds,
      lexemes: &NoLexemes,
      multi_caret: false,
    }
  }

  #[must_use]
  pub fn with_folds(mut self, folds: &'a dyn FoldingModel) -> Self {
    self.folds = folds;
    self
  }

  #[must_use]
  pub fn with_lexemes(mut self, lexemes: &'a dyn LexemeModel) -> Self {
    self.lexemes = lexemes;
    self
  }

  #[must_use]
  pub fn multi_caret(mut self, multi_caret: bool) -> Self {
    self.multi_caret = multi_caret;
    self
  }

  /// Boundary offset for `request`, or `offset` (clamped to the text) when
  /// there is nothing to move to.
  pub fn scan(&self, offset: usize, request: &ScanRequest) -> usize {
    let offset = offset.min(self.text.len_chars());
    if !request.flags.intersects(BoundaryFlags::STOPS) {
      return offset;
    }
    let found = match request.direction {
      Direction::Forward => self.scan_forward(offset, request),
      Direction::Backward => self.scan_backward(offset, request),
    };
    trace!(offset, ?found, ?request, "boundary scan");
    found.unwrap_or(offset)
  }

  fn single_line(&self, flags: BoundaryFlags) -> bool {
    flags.contains(BoundaryFlags::SINGLE_LINE)
      || flags.contains(BoundaryFlags::MULTI_CARET_SINGLE_LINE) && self.multi_caret
  }

  fn is_start(&self, request: &ScanRequest, offset: usize) -> bool {
    is_word_type_start(request.word_type, self.text, offset, request.camel)
      || request.word_type == WordTypePolicy::Ide
        && !is_whitespace(self.text, offset)
        && self.lexemes.is_lexeme_boundary(offset)
  }

  fn is_end(&self, request: &ScanRequest, offset: usize) -> bool {
    is_word_type_end(request.word_type, self.text, offset, request.camel)
      || request.word_type == WordTypePolicy::Ide
        && offset
          .checked_sub(1)
          .is_some_and(|prev| !is_whitespace(self.text, prev))
        && self.lexemes.is_lexeme_boundary(offset)
  }

  fn is_word_stop(&self, request: &ScanRequest, offset: usize) -> bool {
    let flags = request.flags;
    flags.contains(BoundaryFlags::START_OF_WORD) && self.is_start(request, offset)
      || flags.contains(BoundaryFlags::END_OF_WORD) && self.is_end(request, offset)
  }

  fn scan_forward(&self, offset: usize, request: &ScanRequest) -> Option<usize> {
    let text = self.text;
    let flags = request.flags;
    if offset == text.len_chars() {
      return None;
    }

    let line = text.line_of(offset);
    let last_line = text.line_of(text.len_chars());
    let single_line = self.single_line(flags);

    let mut line_stop = None;
    if flags.intersects(BoundaryFlags::START_OF_TRAILING_BLANKS | BoundaryFlags::END_OF_LINE) {
      let line_start = text.line_start(line);
      let line_end = text.line_end(line);
      let last_non_blank = line_end - text.count_blanks_reversed(line_start, line_end);
      if flags.contains(BoundaryFlags::START_OF_TRAILING_BLANKS) && offset < last_non_blank {
        line_stop = Some(last_non_blank);
      } else if flags.contains(BoundaryFlags::END_OF_LINE) && (offset < line_end || single_line) {
        line_stop = Some(line_end);
      }
    }

    let max_line = if line_stop.is_some() || single_line {
      line
    } else {
      (line + 1).min(last_line)
    };
    let (max_offset, bound_is_stop) = match line_stop {
      Some(stop) => (stop, true),
      None if flags.contains(BoundaryFlags::START_OF_LINE) && line < max_line => {
        (text.line_start(max_line), true)
      },
      None => (text.line_end(max_line), false),
    };

    let mut new_offset = offset + 1;
    if new_offset > max_offset {
      return None;
    }

    if let Some(fold) = self.folds.collapsed_region_at(offset) {
      new_offset = fold.end;
      if flags.contains(BoundaryFlags::END_OF_FOLDING_REGION) {
        return Some(new_offset);
      }
    }

    while new_offset < max_offset {
      if let Some(fold) = self.folds.collapsed_region_at(new_offset) {
        if flags.contains(BoundaryFlags::START_OF_FOLDING_REGION) {
          return Some(fold.start);
        }
        new_offset = fold.end;
        if flags.contains(BoundaryFlags::END_OF_FOLDING_REGION) {
          return Some(new_offset);
        }
        continue;
      }
      if self.is_word_stop(request, new_offset) {
        return Some(new_offset);
      }
      new_offset += 1;
    }

    if new_offset > max_offset || bound_is_stop || self.is_word_stop(request, max_offset) {
      Some(new_offset)
    } else {
      None
    }
  }

  fn scan_backward(&self, offset: usize, request: &ScanRequest) -> Option<usize> {
    let text = self.text;
    let flags = request.flags;
    if offset == 0 {
      return None;
    }

    let line = text.line_of(offset);
    let line_start = text.line_start(line);
    let line_end = text.line_end(line);
    let column = offset - line_start;
    let single_line = self.single_line(flags);

    let mut line_stop = None;
    if flags.contains(BoundaryFlags::START_OF_TRAILING_BLANKS) {
      let last_non_blank = line_end - text.count_blanks_reversed(line_start, line_end);
      if offset > last_non_blank {
        line_stop = Some(last_non_blank);
      }
    }
    if line_stop.is_none()
      && flags.intersects(BoundaryFlags::END_OF_LEADING_BLANKS | BoundaryFlags::START_OF_LINE)
    {
      let first_non_blank = text.count_blanks(line_start, line_end);
      if flags.contains(BoundaryFlags::END_OF_LEADING_BLANKS) && column > first_non_blank {
        line_stop = Some(line_start + first_non_blank);
      } else if flags.contains(BoundaryFlags::START_OF_LINE) && (column != 0 || single_line) {
        line_stop = Some(line_start);
      }
    }

    let min_line = if line == 0 || line_stop.is_some() || single_line {
      line
    } else {
      line - 1
    };
    let (min_offset, bound_is_stop) = match line_stop {
      Some(stop) => (stop, true),
      None if flags.contains(BoundaryFlags::END_OF_LINE) && line > min_line => {
        (text.line_end(min_line), true)
      },
      None => (text.line_start(min_line), false),
    };

    let mut new_offset = offset - 1;
    if new_offset < min_offset {
      return None;
    }

    if let Some(fold) = self.folds.collapsed_region_at(offset - 1) {
      new_offset = fold.start;
      if flags.contains(BoundaryFlags::START_OF_FOLDING_REGION) {
        return Some(new_offset);
      }
    }

    while new_offset > min_offset {
      // walking backward a fold is reached at its end
      if let Some(fold) = self.folds.collapsed_region_at(new_offset - 1) {
        if flags.contains(BoundaryFlags::END_OF_FOLDING_REGION) {
          return Some(fold.end);
        }
        new_offset = fold.start;
        if flags.contains(BoundaryFlags::START_OF_FOLDING_REGION) {
          return Some(new_offset);
        }
        continue;
      }
      if self.is_word_stop(request, new_offset) {
        return Some(new_offset);
      }
      new_offset -= 1;
    }

    if new_offset < min_offset || bound_is_stop || self.is_word_stop(request, min_offset) {
      Some(new_offset)
    } else {
      None
    }
  }
}

/// Scans `text` with no folds and no lexer.
pub fn scan_boundary(text: RopeSlice, offset: usize, request: &ScanRequest) -> usize {
  Scanner::new(text).scan(offset, request)
}

/// Moves `caret` to the boundary found by `request`, extending the selection
/// from its lead end when `with_selection` is set and dropping it otherwise.
///
/// Returns `false`, leaving the caret untouched, when the scan finds
/// nothing.
pub fn move_caret_to_boundary(
  editor: &mut dyn CaretModel,
  caret: CursorId,
  request: &ScanRequest,
  with_selection: bool,
) -> bool {
  let offset = editor.offset(caret);
  let lead = editor.lead_selection_offset(caret);
  let target = Scanner::new(editor.text())
    .with_folds(editor.folding_model())
    .with_lexemes(editor.lexeme_model())
    .multi_caret(editor.caret_count() > 1)
    .scan(offset, request);
  if target == offset {
    return false;
  }

  editor.move_to_offset(caret, target);
  if with_selection {
    editor.set_selection(caret, Range::new(lead, target));
  } else {
    editor.remove_selection(caret);
  }
  true
}

#[cfg(test)]
mod test {
  use quickcheck::quickcheck;
  use ropey::Rope;

  use super::*;
  use crate::host::{
    FoldRegion,
    FoldRegions,
    LexemeBoundaries,
    MemoryEditor,
  };

  fn forward(flags: BoundaryFlags) -> ScanRequest {
    ScanRequest::new(Direction::Forward, flags)
  }

  fn backward(flags: BoundaryFlags) -> ScanRequest {
    ScanRequest::new(Direction::Backward, flags)
  }

  /// Every stop reached by repeating the scan from `offset`.
  fn walk(text: &str, offset: usize, request: &ScanRequest) -> Vec<usize> {
    let rope = Rope::from(text);
    let text = rope.slice(..);
    let mut stops = Vec::new();
    let mut pos = offset;
    loop {
      let next = scan_boundary(text, pos, request);
      if next == pos {
        break stops;
      }
      stops.push(next);
      pos = next;
    }
  }

  #[test]
  fn no_flags_is_a_no_op() {
    let rope = Rope::from("foo bar");
    let text = rope.slice(..);
    assert_eq!(scan_boundary(text, 2, &forward(BoundaryFlags::empty())), 2);
    assert_eq!(
      scan_boundary(text, 2, &forward(BoundaryFlags::MULTI_CARET_SINGLE_LINE)),
      2
    );
  }

  #[test]
  fn camel_hump_starts() {
    let rope = Rope::from("fooBar");
    let text = rope.slice(..);
    let request = forward(BoundaryFlags::START_OF_WORD).camel(true);
    assert_eq!(scan_boundary(text, 0, &request), 3);
    // without humps the next start is the punctuation run at the end
    let request = forward(BoundaryFlags::START_OF_WORD);
    assert_eq!(scan_boundary(text, 0, &request), 6);
  }

  #[test]
  fn word_starts_and_ends_forward() {
    let text = "foo bar(baz)";
    assert_eq!(walk(text, 0, &forward(BoundaryFlags::START_OF_WORD)), vec![4, 7, 8, 11]);
    assert_eq!(walk(text, 0, &forward(BoundaryFlags::END_OF_WORD)), vec![3, 7, 8, 11]);
  }

  #[test]
  fn word_starts_backward() {
    let text = "foo bar(baz)";
    assert_eq!(walk(text, 12, &backward(BoundaryFlags::START_OF_WORD)), vec![11, 8, 7, 4, 0]);
  }

  #[test]
  fn last_word_end_is_found_at_the_bound() {
    let rope = Rope::from("foo bar");
    let text = rope.slice(..);
    assert_eq!(scan_boundary(text, 4, &forward(BoundaryFlags::END_OF_WORD)), 7);
    assert_eq!(scan_boundary(text, 7, &forward(BoundaryFlags::END_OF_WORD)), 7);
  }

  #[test]
  fn nothing_found_keeps_offset() {
    let rope = Rope::from("foo   ");
    let text = rope.slice(..);
    let request =
      forward(BoundaryFlags::START_OF_WORD).word_type(WordTypePolicy::Identifier);
    assert_eq!(scan_boundary(text, 3, &request), 3);
    assert_eq!(scan_boundary(text, scan_boundary(text, 3, &request), &request), 3);
  }

  #[test]
  fn line_stops_forward() {
    let text = "  foo  \n  bar";
    let flags = BoundaryFlags::START_OF_WORD
      | BoundaryFlags::START_OF_TRAILING_BLANKS
      | BoundaryFlags::END_OF_LINE
      | BoundaryFlags::START_OF_LINE;
    // word start, trailing blanks, line end, next line start, word start
    assert_eq!(walk(text, 0, &forward(flags)), vec![2, 5, 7, 8, 10, 13]);
  }

  #[test]
  fn line_stops_backward() {
    let text = "  foo  \n  bar  ";
    let flags = BoundaryFlags::START_OF_WORD
      | BoundaryFlags::START_OF_TRAILING_BLANKS
      | BoundaryFlags::END_OF_LEADING_BLANKS
      | BoundaryFlags::START_OF_LINE
      | BoundaryFlags::END_OF_LINE;
    assert_eq!(walk(text, 15, &backward(flags)), vec![13, 10, 8, 7, 5, 2, 0]);
  }

  #[test]
  fn single_line_never_leaves_the_line() {
    let rope = Rope::from("foo\nbar");
    let text = rope.slice(..);
    let request = forward(BoundaryFlags::START_OF_WORD | BoundaryFlags::SINGLE_LINE);
    assert_eq!(scan_boundary(text, 1, &request), 1);
    let request = backward(BoundaryFlags::START_OF_WORD | BoundaryFlags::SINGLE_LINE);
    assert_eq!(scan_boundary(text, 5, &request), 4);
    assert_eq!(scan_boundary(text, 4, &request), 4);
  }

  #[test]
  fn multi_caret_single_line() {
    let rope = Rope::from("foo\nbar");
    let text = rope.slice(..);
    let request =
      forward(BoundaryFlags::START_OF_WORD | BoundaryFlags::MULTI_CARET_SINGLE_LINE);
    assert_eq!(Scanner::new(text).scan(1, &request), 4);
    assert_eq!(Scanner::new(text).multi_caret(true).scan(1, &request), 1);
  }

  #[test]
  fn collapsed_folds_are_opaque() {
    let rope = Rope::from("abcd efgh ijkl mnop");
    let text = rope.slice(..);
    let folds: FoldRegions = [FoldRegion::new(5, 10)].into_iter().collect();
    let request = forward(BoundaryFlags::END_OF_WORD);

    assert_eq!(Scanner::new(text).scan(4, &request), 9);
    // the end of `efgh` is folded away, the next end is after `ijkl`
    assert_eq!(Scanner::new(text).with_folds(&folds).scan(4, &request), 14);
    let request = forward(BoundaryFlags::END_OF_WORD | BoundaryFlags::END_OF_FOLDING_REGION);
    assert_eq!(Scanner::new(text).with_folds(&folds).scan(4, &request), 10);

    let request = forward(BoundaryFlags::END_OF_WORD | BoundaryFlags::START_OF_FOLDING_REGION);
    assert_eq!(Scanner::new(text).with_folds(&folds).scan(4, &request), 5);

    // starting inside the fold jumps to its end first
    let request = forward(BoundaryFlags::START_OF_WORD | BoundaryFlags::END_OF_FOLDING_REGION);
    assert_eq!(Scanner::new(text).with_folds(&folds).scan(6, &request), 10);

    let request = backward(BoundaryFlags::START_OF_WORD);
    assert_eq!(Scanner::new(text).with_folds(&folds).scan(10, &request), 5);
    let request = backward(BoundaryFlags::START_OF_WORD | BoundaryFlags::START_OF_FOLDING_REGION);
    assert_eq!(Scanner::new(text).with_folds(&folds).scan(10, &request), 5);
  }

  #[test]
  fn fold_stops_without_words_inside() {
    let rope = Rope::from("a    b");
    let text = rope.slice(..);
    let folds: FoldRegions = [FoldRegion::new(1, 5)].into_iter().collect();
    let scanner = Scanner::new(text).with_folds(&folds);

    let request = forward(BoundaryFlags::START_OF_WORD);
    assert_eq!(scanner.scan(0, &request), 5);
    let request = forward(BoundaryFlags::START_OF_WORD | BoundaryFlags::START_OF_FOLDING_REGION);
    assert_eq!(scanner.scan(0, &request), 1);

    let request = backward(BoundaryFlags::START_OF_WORD);
    assert_eq!(scanner.scan(5, &request), 0);
    let request = backward(BoundaryFlags::START_OF_WORD | BoundaryFlags::START_OF_FOLDING_REGION);
    assert_eq!(scanner.scan(5, &request), 1);
    // reached during the walk rather than at the caret
    assert_eq!(scanner.scan(6, &request), 1);
    assert_eq!(scanner.scan(6, &backward(BoundaryFlags::START_OF_WORD)), 0);
  }

  #[test]
  fn backward_end_of_fold() {
    let rope = Rope::from("a    bc");
    let text = rope.slice(..);
    let folds: FoldRegions = [FoldRegion::new(1, 5)].into_iter().collect();
    let scanner = Scanner::new(text).with_folds(&folds);

    let request = backward(BoundaryFlags::END_OF_WORD);
    assert_eq!(scanner.scan(7, &request), 1);
    let request = backward(BoundaryFlags::END_OF_WORD | BoundaryFlags::END_OF_FOLDING_REGION);
    assert_eq!(scanner.scan(7, &request), 5);
    // starting right after the fold does not stop at its end
    assert_eq!(scanner.scan(5, &request), 1);
  }

  #[test]
  fn ide_policy_uses_lexemes() {
    let rope = Rope::from("a+-b");
    let text = rope.slice(..);
    let lexemes = LexemeBoundaries(vec![1, 2, 3]);

    // without lexemes "+-" is one punctuation run
    let request = forward(BoundaryFlags::START_OF_WORD).word_type(WordTypePolicy::Ide);
    assert_eq!(Scanner::new(text).scan(0, &request), 1);
    assert_eq!(Scanner::new(text).scan(1, &request), 3);
    assert_eq!(Scanner::new(text).with_lexemes(&lexemes).scan(1, &request), 2);

    let request = forward(BoundaryFlags::END_OF_WORD).word_type(WordTypePolicy::Ide);
    assert_eq!(Scanner::new(text).scan(1, &request), 3);
    assert_eq!(Scanner::new(text).with_lexemes(&lexemes).scan(1, &request), 2);
  }

  #[test]
  fn space_delimited_words() {
    let text = "a.b(c) d";
    let request =
      forward(BoundaryFlags::START_OF_WORD).word_type(WordTypePolicy::SpaceDelimited);
    assert_eq!(walk(text, 0, &request), vec![7]);
  }

  #[test]
  fn moving_the_caret() {
    let mut editor = MemoryEditor::new("foo bar baz");
    let caret = editor.primary_caret();
    let request = forward(BoundaryFlags::START_OF_WORD);
    assert!(move_caret_to_boundary(&mut editor, caret, &request, true));
    assert_eq!(editor.offset(caret), 4);
    assert_eq!(editor.selection(caret), Range::new(0, 4));

    assert!(move_caret_to_boundary(&mut editor, caret, &request, true));
    assert_eq!(editor.selection(caret), Range::new(0, 8));

    assert!(move_caret_to_boundary(&mut editor, caret, &request.reversed(), false));
    assert_eq!(editor.offset(caret), 4);
    assert!(!editor.has_selection(caret));

    editor.move_to_offset(caret, 11);
    assert!(!move_caret_to_boundary(&mut editor, caret, &request, false));
    assert_eq!(editor.offset(caret), 11);
  }

  quickcheck! {
    fn scan_stays_in_text(text: String, offset: usize, back: bool, bits: u16, camel: bool) -> bool {
      let rope = Rope::from(text.as_str());
      let text = rope.slice(..);
      let direction = if back { Direction::Backward } else { Direction::Forward };
      let request = ScanRequest::new(direction, BoundaryFlags::from_bits_truncate(bits)).camel(camel);
      let offset = offset % (text.len_chars() + 1);
      let found = scan_boundary(text, offset, &request);
      found <= text.len_chars()
        && match direction {
          Direction::Forward => found >= offset,
          Direction::Backward => found <= offset,
        }
    }
  }
}
