//! The word being pasted, with the text around it.
//!
//! An [`InsertedRangeContext`] is built over the text after an insertion and
//! the inserted range. It keeps a copy of the inserted word that the case
//! preservation rules edit step by step; the document itself is not touched.

use mia_core::{
  case_convention::{
    LetterCase,
    Separator,
    Separators,
    to_lower_case,
    to_upper_case,
  },
  chars::char_is_identifier,
  classify::{
    is_hump_bound_identifier,
    is_hump_bound_identifier_chars,
    is_identifier,
    is_identifier_end,
    is_identifier_start,
    is_word_end,
    is_word_start,
  },
  text::TextExt,
  word_range::{
    WordQuery,
    word_range_at,
  },
  word_study::{
    CharClass,
    WordStudy,
  },
};
use ropey::RopeSlice;

use crate::prefix::PrefixMatcher;

/// Case change applied to part of the word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseMap {
  Upper,
  Lower,
}

impl CaseMap {
  pub fn apply(self, text: &str) -> String {
    match self {
      Self::Upper => to_upper_case(text.chars()).to_string(),
      Self::Lower => to_lower_case(text.chars()).to_string(),
    }
  }

  fn apply_char(self, ch: char) -> String {
    let mut buf = [0; 4];
    self.apply(ch.encode_utf8(&mut buf))
  }
}

/// Byte index of the `chars`-th character, clamped to the end.
fn byte_index(word: &str, chars: usize) -> usize {
  word.char_indices().nth(chars).map_or(word.len(), |(idx, _)| idx)
}

#[derive(Debug, Clone)]
pub struct InsertedRangeContext<'a> {
  text:                       RopeSlice<'a>,
  pub before_offset:          usize,
  pub after_offset:           usize,
  pub expanded_before_offset: usize,
  pub expanded_after_offset:  usize,
  pub inserted:               String,
  /// Identifier characters joined to the start of the insertion.
  pub expanded_prefix:        String,
  /// Identifier characters joined to the end of the insertion.
  pub expanded_suffix:        String,
  /// Character before the insertion, a space at the start of the text.
  pub char_before:            char,
  /// Character after the insertion, a space at the end of the text.
  pub char_after:             char,
  pub is_word_start_at_start: bool,
  pub is_word_end_at_end:     bool,
  separators:                 Separators,
  word:                       String,
  study:                      WordStudy,
  caret_delta:                isize,
  prefix_removed:             bool,
}

impl<'a> InsertedRangeContext<'a> {
  pub fn new(text: RopeSlice<'a>, before_offset: usize, after_offset: usize) -> Self {
    Self::with_separators(text, before_offset, after_offset, Separators::UNDERSCORE)
  }

  /// Offsets are clamped to the text and `before_offset` to
  /// `after_offset`.
  pub fn with_separators(
    text: RopeSlice<'a>,
    before_offset: usize,
    after_offset: usize,
    separators: Separators,
  ) -> Self {
    let len = text.len_chars();
    let after_offset = after_offset.min(len);
    let before_offset = before_offset.min(after_offset);

    let expanded = word_range_at(text, before_offset, after_offset, WordQuery::identifier());
    let expanded_prefix = if expanded.start > before_offset {
      String::new()
    } else {
      text.to_text(expanded.start, before_offset)
    };
    let expanded_suffix = if expanded.end < after_offset {
      String::new()
    } else {
      text.to_text(after_offset, expanded.end)
    };

    let inserted = text.to_text(before_offset, after_offset);
    let char_before = if before_offset > 0 {
      text.char(before_offset - 1)
    } else {
      ' '
    };
    let char_after = if after_offset < len {
      text.char(after_offset)
    } else {
      ' '
    };

    Self {
      text,
      before_offset,
      after_offset,
      expanded_before_offset: expanded.start,
      expanded_after_offset: expanded.end,
      expanded_prefix,
      expanded_suffix,
      char_before,
      char_after,
      is_word_start_at_start: is_word_start(text, before_offset, false),
      is_word_end_at_end: is_word_end(text, after_offset, false),
      separators,
      study: WordStudy::with_separators(inserted.as_str(), separators),
      word: inserted.clone(),
      inserted,
      caret_delta: 0,
      prefix_removed: false,
    }
  }

  pub fn text(&self) -> RopeSlice<'a> {
    self.text
  }

  pub fn text_len(&self) -> usize {
    self.text.len_chars()
  }

  pub fn caret_delta(&self) -> isize {
    self.caret_delta
  }

  pub fn set_caret_delta(&mut self, caret_delta: isize) {
    self.caret_delta = caret_delta;
  }

  /// Change in length of the insertion, caret adjustment included.
  pub fn cumulative_caret_delta(&self) -> isize {
    self.inserted.chars().count() as isize - self.word_len() as isize - self.caret_delta
  }

  pub fn is_prefix_removed(&self) -> bool {
    self.prefix_removed
  }

  pub fn set_prefix_removed(&mut self, prefix_removed: bool) {
    self.prefix_removed = prefix_removed;
  }

  pub fn word(&self) -> &str {
    &self.word
  }

  pub fn word_len(&self) -> usize {
    self.word.chars().count()
  }

  pub fn study(&self) -> &WordStudy {
    &self.study
  }

  pub fn separators(&self) -> Separators {
    self.separators
  }

  pub fn char_at_start(&self) -> char {
    self.word.chars().next().unwrap_or(self.char_after)
  }

  pub fn char_at_end(&self) -> char {
    self.word.chars().next_back().unwrap_or(self.char_after)
  }

  /// Characters `start..end` of the word.
  pub fn range(&self, start: usize, end: usize) -> &str {
    let start = byte_index(&self.word, start);
    let end = byte_index(&self.word, end).max(start);
    &self.word[start..end]
  }

  pub fn prefix(&self, count: usize) -> &str {
    self.range(0, count)
  }

  pub fn suffix(&self, count: usize) -> &str {
    let len = self.word_len();
    self.range(len - count.min(len), len)
  }

  pub fn set_word(&mut self, word: impl Into<String>) -> &mut Self {
    self.word = word.into();
    self.study = WordStudy::with_separators(self.word.as_str(), self.separators);
    self
  }

  pub fn replace(&mut self, start: usize, end: usize, text: &str) -> &mut Self {
    let start = byte_index(&self.word, start);
    let end = byte_index(&self.word, end).max(start);
    let mut word = String::with_capacity(self.word.len() + text.len());
    word.push_str(&self.word[..start]);
    word.push_str(text);
    word.push_str(&self.word[end..]);
    self.set_word(word)
  }

  pub fn replace_with(&mut self, start: usize, end: usize, map: CaseMap) -> &mut Self {
    let mapped = map.apply(self.range(start, end));
    self.replace(start, end, &mapped)
  }

  pub fn delete(&mut self, start: usize, end: usize) -> &mut Self {
    self.replace(start, end, "")
  }

  pub fn delete_prefix(&mut self, count: usize) -> &mut Self {
    self.delete(0, count)
  }

  pub fn delete_suffix(&mut self, count: usize) -> &mut Self {
    let len = self.word_len();
    self.delete(len - count.min(len), len)
  }

  pub fn prefix_with(&mut self, text: &str) -> &mut Self {
    self.replace(0, 0, text)
  }

  pub fn suffix_with(&mut self, text: &str) -> &mut Self {
    let len = self.word_len();
    self.replace(len, len, text)
  }

  pub fn replace_prefix(&mut self, count: usize, text: &str) -> &mut Self {
    self.replace(0, count, text)
  }

  pub fn replace_suffix(&mut self, count: usize, text: &str) -> &mut Self {
    let len = self.word_len();
    self.replace(len - count.min(len), len, text)
  }

  pub fn prefix_to_upper_case(&mut self, count: usize) -> &mut Self {
    self.replace_with(0, count, CaseMap::Upper)
  }

  pub fn prefix_to_lower_case(&mut self, count: usize) -> &mut Self {
    self.replace_with(0, count, CaseMap::Lower)
  }

  pub fn suffix_to_upper_case(&mut self, count: usize) -> &mut Self {
    let len = self.word_len();
    self.replace_with(len - count.min(len), len, CaseMap::Upper)
  }

  pub fn suffix_to_lower_case(&mut self, count: usize) -> &mut Self {
    let len = self.word_len();
    self.replace_with(len - count.min(len), len, CaseMap::Lower)
  }

  pub fn to_upper_case(&mut self, start: usize, end: usize) -> &mut Self {
    self.replace_with(start, end, CaseMap::Upper)
  }

  pub fn to_lower_case(&mut self, start: usize, end: usize) -> &mut Self {
    self.replace_with(start, end, CaseMap::Lower)
  }

  /// Appends up to `count` characters that follow the insertion in the text.
  pub fn suffix_with_from_after(&mut self, count: usize, map: Option<CaseMap>) -> &mut Self {
    let end = (self.after_offset + count).min(self.text_len());
    let taken = self.text.to_text(self.after_offset, end);
    match map {
      Some(map) => self.suffix_with(&map.apply(&taken)),
      None => self.suffix_with(&taken),
    }
  }

  /// Prepends up to `count` characters that precede the insertion.
  pub fn prefix_with_from_before(&mut self, count: usize, map: Option<CaseMap>) -> &mut Self {
    let start = self.before_offset.saturating_sub(count);
    let taken = self.text.to_text(start, self.before_offset);
    match map {
      Some(map) => self.prefix_with(&map.apply(&taken)),
      None => self.prefix_with(&taken),
    }
  }

  /// Strips `prefix` when the word is longer than it.
  pub fn remove_prefix(&mut self, prefix: &str) -> bool {
    if !prefix.is_empty() && self.word.len() > prefix.len() && self.word.starts_with(prefix) {
      let rest = self.word[prefix.len()..].to_owned();
      self.set_word(rest);
      true
    } else {
      false
    }
  }

  pub fn remove_suffix(&mut self, suffix: &str) -> bool {
    if !suffix.is_empty() && self.word.ends_with(suffix) {
      let rest = self.word[..self.word.len() - suffix.len()].to_owned();
      self.set_word(rest);
      true
    } else {
      false
    }
  }

  /// Strips `prefix` unless a prefix was already removed.
  pub fn remove_prefix_once(&mut self, prefix: &str) -> bool {
    if self.prefix_removed {
      return false;
    }
    self.prefix_removed = self.remove_prefix(prefix);
    self.prefix_removed
  }

  /// Strips the prefix `matcher` finds unless a prefix was already removed.
  pub fn remove_prefixes_once(&mut self, matcher: &PrefixMatcher) -> bool {
    if self.prefix_removed {
      return false;
    }
    match self.matched_prefix(matcher) {
      Some(prefix) => self.remove_prefix_once(&prefix),
      None => false,
    }
  }

  pub fn matched_prefix(&self, matcher: &PrefixMatcher) -> Option<String> {
    matcher.matched(&self.word).map(str::to_owned)
  }

  /// Gives the word `prefix`, replacing a different matched prefix. A word
  /// that already carries `prefix` is left alone.
  pub fn add_prefix_or_replace_mismatched_prefix(
    &mut self,
    matcher: &PrefixMatcher,
    prefix: &str,
  ) -> bool {
    if prefix.is_empty() {
      return false;
    }
    match self.matched_prefix(matcher) {
      None => {
        self.prefix_with_camel_case(prefix);
        true
      },
      Some(matched) if matched != prefix => {
        self.remove_prefix(&matched);
        self.prefix_with_camel_case(prefix);
        true
      },
      Some(_) => false,
    }
  }

  /// Prepends `prefix`, capitalising the word to start a new hump.
  pub fn prefix_with_camel_case(&mut self, prefix: &str) -> &mut Self {
    if !self.study.first(CharClass::UPPER) {
      self.prefix_to_upper_case(1);
    }
    self.prefix_with(prefix)
  }

  /// Makes the word join its neighbours with exactly one `separator` on
  /// each side, unless it already sits at a word boundary there.
  pub fn fix_separators(&mut self, separator: Separator) -> &mut Self {
    let sep = separator.as_char();
    if self.char_before == sep && self.char_at_start() == sep {
      self.delete_prefix(1);
    } else if !self.is_word_start_at_start && self.char_before != sep && self.char_at_start() != sep
    {
      self.prefix_with(sep.encode_utf8(&mut [0; 4]));
    }
    if self.char_after == sep && self.char_at_end() == sep {
      self.delete_suffix(1);
    } else if !self.is_word_end_at_end && self.char_after != sep && self.char_at_end() != sep {
      self.suffix_with(sep.encode_utf8(&mut [0; 4]));
    }
    self
  }

  pub fn fix_snake_case(&mut self) -> &mut Self {
    self.fix_separators(Separator::Underscore)
  }

  /// Whether the insertion would start a hump, with the first character
  /// mapped through `map` when given.
  pub fn is_hump_bound_identifier_at_start(&self, map: Option<CaseMap>) -> bool {
    let start = self.char_at_start();
    match map {
      Some(map) => {
        map
          .apply_char(start)
          .chars()
          .next()
          .is_some_and(|start| is_hump_bound_identifier_chars(self.char_before, start, true))
      },
      None => is_hump_bound_identifier_chars(self.char_before, start, true),
    }
  }

  /// Whether the insertion would end a hump, with the following character
  /// mapped through `map` when given.
  pub fn is_hump_bound_identifier_at_end(&self, map: Option<CaseMap>) -> bool {
    let end = self.char_at_end();
    match map {
      Some(map) => {
        map
          .apply_char(self.char_after)
          .chars()
          .next()
          .is_some_and(|after| is_hump_bound_identifier_chars(end, after, false))
      },
      None => is_hump_bound_identifier_chars(end, self.char_after, false),
    }
  }

  pub fn has_no_lower_case_after_prefix(&self, count: usize) -> bool {
    self.word_len() > count && self.study.has_no_lower_case()
  }

  pub fn has_no_upper_case_after_prefix(&self, count: usize) -> bool {
    self.word_len() > count && self.study.has_no_upper_case()
  }

  pub fn has_no_lower_case(&self) -> bool {
    self.study.has_no_lower_case()
  }

  pub fn has_no_upper_case(&self) -> bool {
    self.study.has_no_upper_case()
  }

  pub fn has_upper_case(&self) -> bool {
    self.study.has_upper_case()
  }

  pub fn has_lower_case(&self) -> bool {
    self.study.has_lower_case()
  }

  pub fn has_separator(&self, separator: Separator) -> bool {
    self.word.contains(separator.as_char())
  }

  pub fn has_underscore(&self) -> bool {
    self.has_separator(Separator::Underscore)
  }

  pub fn is_equals_inserted(&self) -> bool {
    self.word == self.inserted
  }

  pub fn is_empty(&self) -> bool {
    self.word.is_empty()
  }

  pub fn is_identifier_before(&self) -> bool {
    self.before_offset > 0 && is_identifier(self.text, self.before_offset - 1)
  }

  pub fn is_identifier_after(&self) -> bool {
    self.after_offset < self.text_len() && is_identifier(self.text, self.after_offset)
  }

  pub fn is_identifier_at_start(&self) -> bool {
    !self.is_empty() && char_is_identifier(self.char_at_start())
  }

  pub fn is_identifier_at_end(&self) -> bool {
    !self.is_empty() && char_is_identifier(self.char_at_end())
  }

  pub fn is_identifier_start_before(&self, camel: bool) -> bool {
    is_identifier_start(self.text, self.before_offset, camel)
  }

  pub fn is_identifier_end_before(&self, camel: bool) -> bool {
    is_identifier_end(self.text, self.before_offset, camel)
  }

  pub fn is_identifier_start_after(&self, camel: bool) -> bool {
    is_identifier_start(self.text, self.after_offset, camel)
  }

  pub fn is_identifier_end_after(&self, camel: bool) -> bool {
    is_identifier_end(self.text, self.after_offset, camel)
  }

  pub fn is_identifier_bound_before(&self, start: bool) -> bool {
    is_hump_bound_identifier(self.text, self.before_offset, start)
  }

  pub fn is_identifier_bound_after(&self, start: bool) -> bool {
    is_hump_bound_identifier(self.text, self.after_offset, start)
  }

  pub fn is_lower_case_before(&self) -> bool {
    self.char_before.is_lowercase()
  }

  pub fn is_lower_case_at_start(&self) -> bool {
    self.char_at_start().is_lowercase()
  }

  pub fn is_lower_case_at_end(&self) -> bool {
    self.char_at_end().is_lowercase()
  }

  pub fn is_lower_case_after(&self) -> bool {
    self.char_after.is_lowercase()
  }

  pub fn is_upper_case_before(&self) -> bool {
    self.char_before.is_uppercase()
  }

  pub fn is_upper_case_at_start(&self) -> bool {
    self.char_at_start().is_uppercase()
  }

  pub fn is_upper_case_at_end(&self) -> bool {
    self.char_at_end().is_uppercase()
  }

  pub fn is_upper_case_after(&self) -> bool {
    self.char_after.is_uppercase()
  }

  pub fn is_alphabetic_before(&self) -> bool {
    self.char_before.is_alphabetic()
  }

  pub fn is_alphabetic_at_start(&self) -> bool {
    self.char_at_start().is_alphabetic()
  }

  pub fn is_alphabetic_at_end(&self) -> bool {
    self.char_at_end().is_alphabetic()
  }

  pub fn is_alphabetic_after(&self) -> bool {
    self.char_after.is_alphabetic()
  }

  pub fn is_camel_case(&self) -> bool {
    self.study.is_camel_case()
  }

  pub fn is_pascal_case(&self) -> bool {
    self.study.is_pascal_case()
  }

  pub fn is_snake_case(&self) -> bool {
    self.study.is_snake_case()
  }

  pub fn is_screaming_snake_case(&self) -> bool {
    self.study.is_screaming_snake_case()
  }

  /// Nothing joins the insertion to the text around it.
  pub fn is_isolated(&self) -> bool {
    self.expanded_prefix.is_empty() && self.expanded_suffix.is_empty()
  }

  /// Study of the word together with the identifier text it joins.
  pub fn expanded_study(&self) -> WordStudy {
    let mut expanded = String::with_capacity(
      self.expanded_prefix.len() + self.word.len() + self.expanded_suffix.len(),
    );
    expanded.push_str(&self.expanded_prefix);
    expanded.push_str(&self.word);
    expanded.push_str(&self.expanded_suffix);
    WordStudy::with_separators(expanded, self.separators)
  }

  pub fn is_expanded_camel_case(&self) -> bool {
    self.expanded_study().is_camel_case()
  }

  pub fn is_expanded_pascal_case(&self) -> bool {
    self.expanded_study().is_pascal_case()
  }

  pub fn is_expanded_snake_case(&self) -> bool {
    self.expanded_study().is_snake_case()
  }

  pub fn is_expanded_screaming_snake_case(&self) -> bool {
    self.expanded_study().is_screaming_snake_case()
  }

  pub fn can_be_camel_case(&self) -> bool {
    self.study.can_be_camel_case()
  }

  pub fn can_be_pascal_case(&self) -> bool {
    self.study.can_be_pascal_case()
  }

  pub fn can_be_snake_case(&self) -> bool {
    self.study.can_be_snake_case()
  }

  pub fn can_be_screaming_snake_case(&self) -> bool {
    self.study.can_be_screaming_snake_case()
  }

  pub fn can_be_expanded_camel_case(&self) -> bool {
    self.expanded_study().can_be_camel_case()
  }

  pub fn make_camel_case(&mut self) -> &mut Self {
    let word = self.study.make_camel_case();
    self.set_word(word.as_str())
  }

  pub fn make_pascal_case(&mut self) -> &mut Self {
    let word = self.study.make_pascal_case();
    self.set_word(word.as_str())
  }

  pub fn make_separated(
    &mut self,
    separator: Separator,
    letters: LetterCase,
  ) -> &mut Self {
    let word = self.study.make_separated(separator, letters);
    self.set_word(word.as_str());
    self.fix_separators(separator)
  }

  pub fn make_snake_case(&mut self) -> &mut Self {
    let word = self.study.make_snake_case();
    self.set_word(word.as_str());
    self.fix_snake_case()
  }

  pub fn make_screaming_snake_case(&mut self) -> &mut Self {
    let word = self.study.make_screaming_snake_case();
    self.set_word(word.as_str());
    self.fix_snake_case()
  }
}
