//! Locating words around an offset.
//!
//! Each search returns the offset it was given when nothing qualifies, so a
//! caller can compare before and after to detect a no-op.

use std::ops::Range;

use ropey::RopeSlice;

use crate::{
  classify::{
    WordTypePolicy,
    is_identifier,
    is_whitespace_middle,
    is_word_end,
    is_word_start,
    is_word_type,
    is_word_type_end,
    is_word_type_start,
  },
  text::TextExt,
};

/// How a word search is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordQuery {
  pub policy:           WordTypePolicy,
  pub camel:            bool,
  /// Give up as soon as the search leaves the word it started in.
  pub stop_if_non_word: bool,
}

impl WordQuery {
  pub const fn new(policy: WordTypePolicy, camel: bool, stop_if_non_word: bool) -> Self {
    Self {
      policy,
      camel,
      stop_if_non_word,
    }
  }

  /// Whole identifiers, stopping at the first non-identifier character.
  pub const fn identifier() -> Self {
    Self::new(WordTypePolicy::Identifier, false, true)
  }
}

pub fn next_word_start(text: RopeSlice, offset: usize, query: WordQuery) -> usize {
  let len = text.len_chars();
  let mut pos = offset;
  loop {
    if is_word_type_start(query.policy, text, pos, query.camel) {
      return pos;
    }
    if query.stop_if_non_word && !is_word_type(query.policy, text, pos) {
      break;
    }
    pos += 1;
    if pos >= len {
      break;
    }
  }
  offset
}

pub fn previous_word_start(text: RopeSlice, offset: usize, query: WordQuery) -> usize {
  let mut pos = offset;
  loop {
    if is_word_type_start(query.policy, text, pos, query.camel) {
      return pos;
    }
    if query.stop_if_non_word
      && !is_word_type_end(query.policy, text, pos, false)
      && !is_word_type(query.policy, text, pos)
    {
      break;
    }
    match pos.checked_sub(1) {
      Some(prev) => pos = prev,
      None => break,
    }
  }
  offset
}

pub fn next_word_end(text: RopeSlice, offset: usize, query: WordQuery) -> usize {
  let len = text.len_chars();
  let mut pos = offset;
  loop {
    if is_word_type_end(query.policy, text, pos, query.camel) {
      return pos;
    }
    if query.stop_if_non_word && !is_word_type(query.policy, text, pos) {
      break;
    }
    pos += 1;
    if pos > len {
      break;
    }
  }
  offset
}

pub fn previous_word_end(text: RopeSlice, offset: usize, query: WordQuery) -> usize {
  let mut pos = offset;
  loop {
    if is_word_type_end(query.policy, text, pos, query.camel) {
      return pos;
    }
    if query.stop_if_non_word && !is_word_type(query.policy, text, pos) {
      break;
    }
    match pos.checked_sub(1) {
      Some(prev) => pos = prev,
      None => break,
    }
  }
  offset
}

fn outside_of_word(text: RopeSlice, offset: usize, policy: WordTypePolicy, at_start: bool) -> bool {
  match policy {
    WordTypePolicy::SpaceDelimited => is_whitespace_middle(text, offset),
    _ => {
      let bound = if at_start {
        is_word_end(text, offset, false)
      } else {
        is_word_start(text, offset, false)
      };
      !is_identifier(text, offset) && !bound
    },
  }
}

/// Start of the word containing `offset`, or `offset` itself when it is not
/// inside or at the end of a word.
pub fn word_start_at(text: RopeSlice, offset: usize, query: WordQuery) -> usize {
  if outside_of_word(text, offset, query.policy, true) {
    offset
  } else {
    previous_word_start(text, offset, query)
  }
}

/// End of the word containing `offset`, or `offset` itself when it is not
/// inside or at the start of a word.
pub fn word_end_at(text: RopeSlice, offset: usize, query: WordQuery) -> usize {
  if outside_of_word(text, offset, query.policy, false) {
    offset
  } else {
    next_word_end(text, offset, query)
  }
}

/// Expands `start..end` to the words touching it.
///
/// The offsets are clamped to the text and reordered if needed. With
/// `stop_if_non_word` the result is trimmed to word characters but never
/// shrinks past the requested range.
pub fn word_range_at(text: RopeSlice, start: usize, end: usize, query: WordQuery) -> Range<usize> {
  let end = end.min(text.len_chars());
  let start = start.min(end);

  let mut word_start = word_start_at(text, start, query);
  let mut word_end = word_end_at(text, word_start.max(end), query);

  while word_start < word_end && !is_word_type(query.policy, text, word_start) {
    word_start += 1;
  }
  while word_start < word_end && !is_word_type(query.policy, text, word_end - 1) {
    word_end -= 1;
  }
  if query.stop_if_non_word {
    word_start = word_start.min(end);
    word_end = word_end.max(start);
  }

  if word_start > word_end {
    start..end
  } else {
    word_start..word_end
  }
}

pub fn word_at(text: RopeSlice, start: usize, end: usize, query: WordQuery) -> String {
  let range = word_range_at(text, start, end, query);
  text.to_text(range.start, range.end)
}
