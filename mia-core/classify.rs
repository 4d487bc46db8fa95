//! Word, identifier and hump boundary predicates.
//!
//! A boundary sits *between* `offset - 1` and `offset`. All predicates are
//! total over `[0, len]`: the character before the text and the one at
//! `len` read as [`NUL`](crate::chars::NUL), which is neither whitespace nor
//! an identifier character.
//!
//! The word-type policies share one rule set, which differs only in whether
//! whitespace transitions count and which hump predicate splits an
//! identifier in camel mode.

use ropey::RopeSlice;
use serde::Deserialize;

use crate::{
  chars::{
    char_is_identifier,
    char_is_letter_or_digit,
    char_is_lower_or_digit,
    char_is_whitespace,
  },
  text::TextExt,
};

/// Which characters make up a "word" when looking for boundaries.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WordTypePolicy {
  /// Words are runs of non-whitespace.
  SpaceDelimited,
  /// Word rules of the host editor, plus lexeme boundaries when available.
  Ide,
  /// Identifier runs, punctuation runs, and whitespace transitions.
  #[default]
  Mia,
  /// Identifier characters only; whitespace transitions never match.
  Identifier,
}

impl WordTypePolicy {
  /// Resolves the legacy flag triple, strongest first.
  pub fn from_legacy_flags(identifier: bool, ide: bool, space_delimited: bool) -> Self {
    if identifier {
      Self::Identifier
    } else if ide {
      Self::Ide
    } else if space_delimited {
      Self::SpaceDelimited
    } else {
      Self::Mia
    }
  }
}

#[derive(Debug, Clone, Copy)]
struct Neighbours {
  prev: char,
  cur:  char,
  next: char,
}

impl Neighbours {
  #[inline]
  fn at(text: RopeSlice, offset: usize) -> Self {
    Self {
      prev: text.char_before_or_nul(offset),
      cur:  text.char_at_or_nul(offset),
      next: text.char_at_or_nul(offset + 1),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hump {
  Word,
  Identifier,
}

#[derive(Debug, Clone, Copy)]
struct Rules {
  whitespace: bool,
  hump:       Hump,
}

impl Rules {
  const IDENTIFIER: Rules = Rules {
    whitespace: false,
    hump:       Hump::Identifier,
  };
  const MIA: Rules = Rules {
    whitespace: true,
    hump:       Hump::Word,
  };

  fn is_hump_start(self, text: RopeSlice, offset: usize) -> bool {
    match self.hump {
      Hump::Word => is_hump_bound_word(text, offset, true),
      Hump::Identifier => is_hump_bound_identifier(text, offset, true),
    }
  }

  fn is_start(self, text: RopeSlice, offset: usize, camel: bool) -> bool {
    let Neighbours { prev, cur, .. } = Neighbours::at(text, offset);
    let prev_id = char_is_identifier(prev);
    let cur_id = char_is_identifier(cur);

    if !prev_id && cur_id {
      return true;
    }
    if camel && prev_id && cur_id && self.is_hump_start(text, offset) {
      return true;
    }

    self.whitespace
      && (char_is_whitespace(prev) || prev_id)
      && !char_is_whitespace(cur)
      && !cur_id
  }

  fn is_end(self, text: RopeSlice, offset: usize, camel: bool) -> bool {
    let Neighbours { prev, cur, next } = Neighbours::at(text, offset);
    let prev_id = char_is_identifier(prev);
    let cur_id = char_is_identifier(cur);

    if prev_id && !cur_id {
      return true;
    }
    if camel
      && prev_id
      && (prev.is_lowercase() && cur.is_uppercase()
        || prev != '_' && cur == '_'
        || prev.is_uppercase() && cur.is_uppercase() && next.is_lowercase())
    {
      return true;
    }

    self.whitespace
      && !char_is_whitespace(prev)
      && !prev_id
      && (char_is_whitespace(cur) || cur_id)
  }
}

#[inline]
pub fn is_identifier(text: RopeSlice, offset: usize) -> bool {
  char_is_identifier(text.char_at_or_nul(offset))
}

#[inline]
pub fn is_whitespace(text: RopeSlice, offset: usize) -> bool {
  char_is_whitespace(text.char_at_or_nul(offset))
}

pub fn is_whitespace_start(text: RopeSlice, offset: usize) -> bool {
  !char_is_whitespace(text.char_before_or_nul(offset)) && is_whitespace(text, offset)
}

pub fn is_whitespace_end(text: RopeSlice, offset: usize) -> bool {
  char_is_whitespace(text.char_before_or_nul(offset)) && !is_whitespace(text, offset)
}

pub fn is_whitespace_middle(text: RopeSlice, offset: usize) -> bool {
  char_is_whitespace(text.char_before_or_nul(offset)) && is_whitespace(text, offset)
}

pub fn is_word_start(text: RopeSlice, offset: usize, camel: bool) -> bool {
  Rules::MIA.is_start(text, offset, camel)
}

pub fn is_word_end(text: RopeSlice, offset: usize, camel: bool) -> bool {
  Rules::MIA.is_end(text, offset, camel)
}

pub fn is_identifier_start(text: RopeSlice, offset: usize, camel: bool) -> bool {
  Rules::IDENTIFIER.is_start(text, offset, camel)
}

pub fn is_identifier_end(text: RopeSlice, offset: usize, camel: bool) -> bool {
  Rules::IDENTIFIER.is_end(text, offset, camel)
}

/// Host word rules over the text alone. They agree with the MIA rules since a
/// hump is only tested between two identifier characters; lexeme boundaries
/// are layered on top by the boundary scanner when the host provides them.
pub fn is_ide_word_start(text: RopeSlice, offset: usize, camel: bool) -> bool {
  Rules::MIA.is_start(text, offset, camel)
}

pub fn is_ide_word_end(text: RopeSlice, offset: usize, camel: bool) -> bool {
  Rules::MIA.is_end(text, offset, camel)
}

/// Camel/snake hump boundary, including the `ABc` rule that puts the last
/// capital of a run with the following word.
///
/// `start` selects between a boundary that begins a hump and one that ends
/// it. At offset `0` a hump always starts, at `len` one always ends.
pub fn is_hump_bound_word(text: RopeSlice, offset: usize, start: bool) -> bool {
  if offset == 0 {
    return start;
  } else if offset >= text.len_chars() {
    return !start;
  }

  let Neighbours { prev, cur, next } = Neighbours::at(text, offset);
  is_hump_bound_word_chars(prev, cur, next, start)
}

/// [`is_hump_bound_word`] between `prev` and `cur`, with `next` following
/// `cur`.
#[inline]
pub fn is_hump_bound_word_chars(prev: char, cur: char, next: char, start: bool) -> bool {
  is_hump_bound_identifier_chars(prev, cur, start)
    || prev.is_uppercase() && cur.is_uppercase() && next.is_lowercase()
}

/// Like [`is_hump_bound_word`] without the capital run rule.
pub fn is_hump_bound_identifier(text: RopeSlice, offset: usize, start: bool) -> bool {
  if offset == 0 {
    return start;
  } else if offset >= text.len_chars() {
    return !start;
  }

  let Neighbours { prev, cur, .. } = Neighbours::at(text, offset);
  is_hump_bound_identifier_chars(prev, cur, start)
}

#[inline]
pub fn is_hump_bound_identifier_chars(prev: char, cur: char, start: bool) -> bool {
  char_is_lower_or_digit(prev) && cur.is_uppercase()
    || start && prev == '_' && cur != '_'
    || !start && prev != '_' && cur == '_'
    || start && prev == '$' && char_is_letter_or_digit(cur)
    || !start && char_is_letter_or_digit(prev) && cur == '$'
}

pub fn is_snake_case_bound(text: RopeSlice, offset: usize, start: bool) -> bool {
  if offset == 0 {
    return start;
  } else if offset >= text.len_chars() {
    return !start;
  }

  let prev = text.char_before_or_nul(offset);
  let cur = text.char_at_or_nul(offset);
  if start {
    prev == '_' && cur != '_' && char_is_letter_or_digit(cur)
  } else {
    prev != '_' && cur == '_' && char_is_letter_or_digit(prev)
  }
}

/// Whether the character at `offset` belongs to a word of `policy`.
pub fn is_word_type(policy: WordTypePolicy, text: RopeSlice, offset: usize) -> bool {
  match policy {
    WordTypePolicy::SpaceDelimited => {
      offset < text.len_chars() && !is_whitespace(text, offset)
    },
    WordTypePolicy::Ide | WordTypePolicy::Mia | WordTypePolicy::Identifier => {
      is_identifier(text, offset)
    },
  }
}

pub fn is_word_type_start(
  policy: WordTypePolicy,
  text: RopeSlice,
  offset: usize,
  camel: bool,
) -> bool {
  match policy {
    WordTypePolicy::SpaceDelimited => is_whitespace_end(text, offset),
    WordTypePolicy::Ide => is_ide_word_start(text, offset, camel),
    WordTypePolicy::Mia => is_word_start(text, offset, camel),
    WordTypePolicy::Identifier => is_identifier_start(text, offset, camel),
  }
}

pub fn is_word_type_end(
  policy: WordTypePolicy,
  text: RopeSlice,
  offset: usize,
  camel: bool,
) -> bool {
  match policy {
    WordTypePolicy::SpaceDelimited => is_whitespace_start(text, offset),
    WordTypePolicy::Ide => is_ide_word_end(text, offset, camel),
    WordTypePolicy::Mia => is_word_end(text, offset, camel),
    WordTypePolicy::Identifier => is_identifier_end(text, offset, camel),
  }
}

#[cfg(test)]
mod test {
  use quickcheck::quickcheck;
  use ropey::Rope;

  use super::*;

  fn starts(policy: WordTypePolicy, text: &str, camel: bool) -> Vec<usize> {
    let rope = Rope::from(text);
    let text = rope.slice(..);
    (0..=text.len_chars())
      .filter(|&i| is_word_type_start(policy, text, i, camel))
      .collect()
  }

  fn ends(policy: WordTypePolicy, text: &str, camel: bool) -> Vec<usize> {
    let rope = Rope::from(text);
    let text = rope.slice(..);
    (0..=text.len_chars())
      .filter(|&i| is_word_type_end(policy, text, i, camel))
      .collect()
  }

  #[test]
  fn hump_bound_before_capital() {
    let rope = Rope::from("fooBar");
    let text = rope.slice(..);
    assert!(is_hump_bound_word(text, 3, true));
    assert!(is_hump_bound_word(text, 3, false));
    assert!(!is_hump_bound_word(text, 2, true));
  }

  #[test]
  fn hump_bound_at_text_edges() {
    let rope = Rope::from("abc");
    let text = rope.slice(..);
    assert!(is_hump_bound_word(text, 0, true));
    assert!(!is_hump_bound_word(text, 0, false));
    assert!(is_hump_bound_word(text, 3, false));
    assert!(!is_hump_bound_word(text, 3, true));
    assert!(is_hump_bound_identifier(text, 0, true));
  }

  #[test]
  fn capital_run_joins_following_word() {
    let rope = Rope::from("HTMLParser");
    let text = rope.slice(..);
    // boundary before the `P` of `Parser`
    assert!(is_hump_bound_word(text, 4, true));
    assert!(!is_hump_bound_identifier(text, 4, true));
    assert!(!is_hump_bound_word(text, 3, true));
    assert!(is_hump_bound_word_chars('L', 'P', 'a', true));
    assert!(!is_hump_bound_identifier_chars('L', 'P', true));
    assert!(is_hump_bound_identifier_chars('2', 'N', true));
  }

  #[test]
  fn underscore_and_dollar_humps() {
    let rope = Rope::from("ab_cd$ef");
    let text = rope.slice(..);
    assert!(is_hump_bound_word(text, 2, false));
    assert!(!is_hump_bound_word(text, 2, true));
    assert!(is_hump_bound_word(text, 3, true));
    assert!(!is_hump_bound_word(text, 3, false));
    assert!(is_hump_bound_word(text, 5, false));
    assert!(is_hump_bound_word(text, 6, true));
  }

  #[test]
  fn snake_case_bound() {
    let rope = Rope::from("ab_cd");
    let text = rope.slice(..);
    assert!(is_snake_case_bound(text, 2, false));
    assert!(is_snake_case_bound(text, 3, true));
    assert!(!is_snake_case_bound(text, 1, true));
  }

  #[test]
  fn mia_words() {
    assert_eq!(starts(WordTypePolicy::Mia, "ab (cd)", false), vec![0, 3, 4, 6]);
    // a word end is reported before an identifier that opens the text
    assert_eq!(ends(WordTypePolicy::Mia, "ab (cd)", false), vec![0, 2, 4, 6]);
  }

  #[test]
  fn identifier_ignores_punctuation() {
    assert_eq!(starts(WordTypePolicy::Identifier, "ab (cd)", false), vec![0, 4]);
    assert_eq!(ends(WordTypePolicy::Identifier, "ab (cd)", false), vec![2, 6]);
  }

  #[test]
  fn camel_splits_identifiers() {
    assert_eq!(starts(WordTypePolicy::Identifier, "fooBar baz", true), vec![0, 3, 7]);
    assert_eq!(ends(WordTypePolicy::Identifier, "fooBar baz", true), vec![3, 6, 10]);
    assert_eq!(starts(WordTypePolicy::Identifier, "fooBar baz", false), vec![0, 7]);
  }

  #[test]
  fn space_delimited() {
    assert_eq!(starts(WordTypePolicy::SpaceDelimited, "a.b c-d", false), vec![4]);
    assert_eq!(ends(WordTypePolicy::SpaceDelimited, "a.b c-d", false), vec![3]);
  }

  #[test]
  fn ide_rules_match_word_rules_on_plain_text() {
    let text = "let _fooBar = HTMLParser::new(x, y);";
    assert_eq!(starts(WordTypePolicy::Ide, text, true), starts(WordTypePolicy::Mia, text, true));
    assert_eq!(ends(WordTypePolicy::Ide, text, false), ends(WordTypePolicy::Mia, text, false));
  }

  #[test]
  fn legacy_flags_priority() {
    assert_eq!(WordTypePolicy::from_legacy_flags(true, true, true), WordTypePolicy::Identifier);
    assert_eq!(WordTypePolicy::from_legacy_flags(false, true, true), WordTypePolicy::Ide);
    assert_eq!(WordTypePolicy::from_legacy_flags(false, false, true), WordTypePolicy::SpaceDelimited);
    assert_eq!(WordTypePolicy::from_legacy_flags(false, false, false), WordTypePolicy::Mia);
  }

  quickcheck! {
    fn predicates_are_total(text: String, offset: usize, camel: bool) -> bool {
      let rope = Rope::from(text.as_str());
      let text = rope.slice(..);
      let offset = offset % (text.len_chars() + 2);
      for policy in [
        WordTypePolicy::SpaceDelimited,
        WordTypePolicy::Ide,
        WordTypePolicy::Mia,
        WordTypePolicy::Identifier,
      ] {
        is_word_type_start(policy, text, offset, camel);
        is_word_type_end(policy, text, offset, camel);
        is_word_type(policy, text, offset);
      }
      is_hump_bound_word(text, offset, true);
      is_hump_bound_identifier(text, offset, false);
      is_snake_case_bound(text, offset, true);
      true
    }
  }
}
