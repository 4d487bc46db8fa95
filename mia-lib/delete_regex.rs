//! Deleting the text a regular expression matches next to a caret.
//!
//! Forward deletes only match starting at the caret, backward deletes only
//! match ending at it. With humps enabled the deleted range is cut at the
//! nearest camel hump so `fooBar` loses `Bar` or `foo` instead of the whole
//! identifier.

use std::ops::Range;

use mia_core::{
  classify::{
    is_hump_bound_word,
    is_identifier,
  },
  text::TextExt,
};
use regex_automata::{
  Anchored,
  Input,
  meta::Regex,
};
use ropey::{
  Rope,
  RopeSlice,
};
use serde::Deserialize;
use tracing::trace;

use crate::{
  movement::Direction,
  pattern::{
    PatternError,
    Result,
  },
};

/// When deletes stop at camel humps.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HumpsMode {
  #[default]
  None,
  Humps,
  /// Follow the editor's camel words setting.
  Follow,
  /// The opposite of the editor's camel words setting.
  Invert,
}

impl HumpsMode {
  pub fn is_humps(self, camel: bool) -> bool {
    match self {
      Self::None => false,
      Self::Humps => true,
      Self::Follow => camel,
      Self::Invert => !camel,
    }
  }
}

#[derive(Debug, Clone)]
pub struct RegexDelete {
  pattern:                String,
  regex:                  Regex,
  direction:              Direction,
  humps:                  HumpsMode,
  line_bound:             bool,
  multi_caret_line_bound: bool,
}

impl RegexDelete {
  pub fn new(pattern: &str, direction: Direction) -> Result<Self> {
    let anchored = match direction {
      Direction::Forward => format!("(?:{pattern})"),
      Direction::Backward => format!("(?:{pattern})$"),
    };
    let regex = Regex::new(&anchored).map_err(|err| PatternError::Delete {
      pattern: pattern.to_owned(),
      source:  Box::new(err),
    })?;
    Ok(Self {
      pattern: pattern.to_owned(),
      regex,
      direction,
      humps: HumpsMode::None,
      line_bound: false,
      multi_caret_line_bound: false,
    })
  }

  #[must_use]
  pub fn humps(mut self, humps: HumpsMode) -> Self {
    self.humps = humps;
    self
  }

  /// Keeps single caret deletes on the caret's line.
  #[must_use]
  pub fn line_bound(mut self, line_bound: bool) -> Self {
    self.line_bound = line_bound;
    self
  }

  /// Keeps deletes on the caret's line while there are several carets.
  #[must_use]
  pub fn multi_caret_line_bound(mut self, line_bound: bool) -> Self {
    self.multi_caret_line_bound = line_bound;
    self
  }

  pub fn pattern(&self) -> &str {
    &self.pattern
  }

  pub fn direction(&self) -> Direction {
    self.direction
  }

  fn is_line_bound(&self, multi_caret: bool) -> bool {
    if multi_caret {
      self.multi_caret_line_bound
    } else {
      self.line_bound
    }
  }

  /// Range to delete for a caret at `caret`, if the pattern matches a non
  /// empty run next to it.
  pub fn find(
    &self,
    text: RopeSlice,
    caret: usize,
    multi_caret: bool,
    camel: bool,
  ) -> Option<Range<usize>> {
    let caret = caret.min(text.len_chars());
    let line = text.line_of(caret);
    let line_bound = self.is_line_bound(multi_caret);

    let matched = match self.direction {
      Direction::Forward => {
        let high = if line_bound {
          text.line_end(line)
        } else {
          text.len_chars()
        };
        let hay = text.to_string();
        let input = Input::new(&hay)
          .range(text.char_to_byte(caret)..text.char_to_byte(high))
          .anchored(Anchored::Yes);
        self.regex.find(input)?
      },
      Direction::Backward => {
        let low = if line_bound { text.line_start(line) } else { 0 };
        let hay = text.slice(..caret).to_string();
        let input = Input::new(&hay).range(text.char_to_byte(low)..hay.len());
        self.regex.find(input)?
      },
    };

    let mut start = text.byte_to_char(matched.start());
    let mut end = text.byte_to_char(matched.end());
    if end <= start {
      return None;
    }

    if self.humps.is_humps(camel) {
      match self.direction {
        Direction::Backward if is_identifier(text, end - 1) => {
          if let Some(hump) = (start..end)
            .rev()
            .find(|&hump| is_hump_bound_word(text, hump, true))
          {
            start = hump;
          }
        },
        Direction::Forward if is_identifier(text, start) => {
          if let Some(hump) =
            (start + 2..end).find(|&hump| is_hump_bound_word(text, hump, true))
          {
            end = hump;
          }
        },
        _ => {},
      }
    }

    trace!(pattern = %self.pattern, start, end, "regex delete range");
    (end > start).then_some(start..end)
  }

  /// Deletes the range [`find`](Self::find) reports and returns it.
  pub fn apply(
    &self,
    rope: &mut Rope,
    caret: usize,
    multi_caret: bool,
    camel: bool,
  ) -> Option<Range<usize>> {
    let range = self.find(rope.slice(..), caret, multi_caret, camel)?;
    rope.remove(range.clone());
    Some(range)
  }
}

#[cfg(test)]
mod test {
  use super::*;

  fn find(pattern: &str, direction: Direction, text: &str, caret: usize) -> Option<Range<usize>> {
    let rope = Rope::from(text);
    RegexDelete::new(pattern, direction)
      .unwrap()
      .find(rope.slice(..), caret, false, false)
  }

  #[test]
  fn forward_matches_start_at_caret() {
    assert_eq!(find(r"\s+", Direction::Forward, "foo   bar", 3), Some(3..6));
    assert_eq!(find(r"\s+", Direction::Forward, "foo   bar", 2), None);
  }

  #[test]
  fn backward_matches_end_at_caret() {
    assert_eq!(find(r"\s+", Direction::Backward, "foo   bar", 6), Some(3..6));
    assert_eq!(find(r"\s+", Direction::Backward, "foo   bar", 7), None);
    assert_eq!(find(r"\w+", Direction::Backward, "foo bar", 0), None);
  }

  #[test]
  fn line_bound_stops_at_line() {
    let rope = Rope::from("foo  \n  bar");
    let text = rope.slice(..);
    let forward = RegexDelete::new(r"\s+", Direction::Forward).unwrap();
    assert_eq!(forward.find(text, 3, false, false), Some(3..8));
    let forward = forward.line_bound(true);
    assert_eq!(forward.find(text, 3, false, false), Some(3..5));
    // the multi caret setting is separate
    assert_eq!(forward.find(text, 3, true, false), Some(3..8));

    let backward = RegexDelete::new(r"\s+", Direction::Backward)
      .unwrap()
      .multi_caret_line_bound(true);
    assert_eq!(backward.find(text, 8, false, false), Some(3..8));
    assert_eq!(backward.find(text, 8, true, false), Some(6..8));
  }

  #[test]
  fn humps_cut_the_match() {
    let rope = Rope::from("fooBarBaz");
    let text = rope.slice(..);
    let backward = RegexDelete::new(r"\w+", Direction::Backward)
      .unwrap()
      .humps(HumpsMode::Humps);
    assert_eq!(backward.find(text, 9, false, false), Some(6..9));
    let forward = RegexDelete::new(r"\w+", Direction::Forward)
      .unwrap()
      .humps(HumpsMode::Humps);
    assert_eq!(forward.find(text, 0, false, false), Some(0..3));
    assert_eq!(forward.find(text, 3, false, false), Some(3..6));
  }

  #[test]
  fn forward_humps_skip_the_first_character() {
    let rope = Rope::from("aBc");
    let text = rope.slice(..);
    let forward = RegexDelete::new(r"\w+", Direction::Forward)
      .unwrap()
      .humps(HumpsMode::Humps);
    assert_eq!(forward.find(text, 0, false, false), Some(0..3));
    let backward = RegexDelete::new(r"\w+", Direction::Backward)
      .unwrap()
      .humps(HumpsMode::Humps);
    assert_eq!(backward.find(text, 3, false, false), Some(1..3));
  }

  #[test]
  fn humps_follow_camel_setting() {
    assert!(!HumpsMode::None.is_humps(true));
    assert!(HumpsMode::Humps.is_humps(false));
    assert!(HumpsMode::Follow.is_humps(true));
    assert!(!HumpsMode::Follow.is_humps(false));
    assert!(HumpsMode::Invert.is_humps(false));

    let rope = Rope::from("fooBar");
    let delete = RegexDelete::new(r"\w+", Direction::Backward)
      .unwrap()
      .humps(HumpsMode::Follow);
    assert_eq!(delete.find(rope.slice(..), 6, false, false), Some(0..6));
    assert_eq!(delete.find(rope.slice(..), 6, false, true), Some(3..6));
  }

  #[test]
  fn apply_removes_the_range() {
    let mut rope = Rope::from("let  value");
    let delete = RegexDelete::new(r"\s+", Direction::Forward).unwrap();
    assert_eq!(delete.apply(&mut rope, 3, false, false), Some(3..5));
    assert_eq!(rope, "letvalue");
    assert_eq!(delete.apply(&mut rope, 3, false, false), None);
  }

  #[test]
  fn multibyte_offsets_are_chars() {
    assert_eq!(find(r"é+", Direction::Forward, "aééb", 1), Some(1..3));
    assert_eq!(find(r"é+", Direction::Backward, "aééb", 3), Some(1..3));
  }

  #[test]
  fn bad_pattern_is_an_error() {
    let err = RegexDelete::new("(", Direction::Forward).unwrap_err();
    assert_eq!(err.pattern(), "(");
  }
}
