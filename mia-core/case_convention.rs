use bitflags::bitflags;
use serde::Deserialize;

use crate::{
  Tendril,
  chars::{
    NUL,
    char_is_letter_or_digit,
  },
  classify::is_hump_bound_word_chars,
};

/// Character joining the parts of a separated identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Separator {
  Underscore,
  Dash,
  Dot,
  Slash,
}

impl Separator {
  pub const ALL: [Separator; 4] = [
    Separator::Underscore,
    Separator::Dash,
    Separator::Dot,
    Separator::Slash,
  ];

  #[inline]
  pub const fn as_char(self) -> char {
    match self {
      Self::Underscore => '_',
      Self::Dash => '-',
      Self::Dot => '.',
      Self::Slash => '/',
    }
  }

  #[inline]
  pub const fn from_char(ch: char) -> Option<Separator> {
    match ch {
      '_' => Some(Self::Underscore),
      '-' => Some(Self::Dash),
      '.' => Some(Self::Dot),
      '/' => Some(Self::Slash),
      _ => None,
    }
  }

  #[inline]
  pub const fn flag(self) -> Separators {
    match self {
      Self::Underscore => Separators::UNDERSCORE,
      Self::Dash => Separators::DASH,
      Self::Dot => Separators::DOT,
      Self::Slash => Separators::SLASH,
    }
  }
}

bitflags! {
  /// Separators recognised inside a word.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
  pub struct Separators: u8 {
    const UNDERSCORE = 1 << 0;
    const DASH       = 1 << 1;
    const DOT        = 1 << 2;
    const SLASH      = 1 << 3;
  }
}

impl Default for Separators {
  fn default() -> Self {
    Self::UNDERSCORE
  }
}

impl Separators {
  #[inline]
  pub fn matches(self, ch: char) -> bool {
    Separator::from_char(ch).is_some_and(|sep| self.contains(sep.flag()))
  }

  /// Recognised separators, underscore first.
  pub fn separators(self) -> impl Iterator<Item = Separator> {
    Separator::ALL
      .into_iter()
      .filter(move |sep| self.contains(sep.flag()))
  }
}

impl From<Separator> for Separators {
  fn from(sep: Separator) -> Self {
    sep.flag()
  }
}

/// Letter casing of a separated identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LetterCase {
  Lower,
  Upper,
  Mixed,
}

pub fn to_upper_case(text: impl Iterator<Item = char>) -> Tendril {
  let mut res = Tendril::new();
  to_upper_case_with(text, &mut res);
  res
}

pub fn to_upper_case_with(text: impl Iterator<Item = char>, buf: &mut Tendril) {
  text.for_each(|c| buf.extend(c.to_uppercase()));
}

pub fn to_lower_case(text: impl Iterator<Item = char>) -> Tendril {
  let mut res = Tendril::new();
  to_lower_case_with(text, &mut res);
  res
}

pub fn to_lower_case_with(text: impl Iterator<Item = char>, buf: &mut Tendril) {
  text.for_each(|c| buf.extend(c.to_lowercase()));
}

/// Inserts `sep` at every hump between two letters or digits and replaces
/// every `recognised` separator with `sep`. Letter case is kept.
pub fn to_mixed_separated_case(
  text: impl Iterator<Item = char>,
  sep: Separator,
  recognised: Separators,
) -> Tendril {
  let mut res = Tendril::new();
  to_mixed_separated_case_with(text, &mut res, sep, recognised);
  res
}

pub fn to_mixed_separated_case_with(
  text: impl Iterator<Item = char>,
  buf: &mut Tendril,
  sep: Separator,
  recognised: Separators,
) {
  let mut text = text.peekable();
  let mut prev = NUL;
  while let Some(c) = text.next() {
    if recognised.matches(c) {
      buf.push(sep.as_char());
      prev = NUL;
      continue;
    }
    let next = text.peek().copied().unwrap_or(NUL);
    if char_is_letter_or_digit(prev)
      && char_is_letter_or_digit(c)
      && is_hump_bound_word_chars(prev, c, next, true)
    {
      buf.push(sep.as_char());
    }
    buf.push(c);
    prev = c;
  }
}

pub fn to_separated_case(
  text: impl Iterator<Item = char>,
  sep: Separator,
  letters: LetterCase,
  recognised: Separators,
) -> Tendril {
  let mut res = Tendril::new();
  to_separated_case_with(text, &mut res, sep, letters, recognised);
  res
}

pub fn to_separated_case_with(
  text: impl Iterator<Item = char>,
  buf: &mut Tendril,
  sep: Separator,
  letters: LetterCase,
  recognised: Separators,
) {
  match letters {
    LetterCase::Mixed => to_mixed_separated_case_with(text, buf, sep, recognised),
    LetterCase::Upper => {
      let mixed = to_mixed_separated_case(text, sep, recognised);
      to_upper_case_with(mixed.chars(), buf);
    },
    LetterCase::Lower => {
      let mixed = to_mixed_separated_case(text, sep, recognised);
      to_lower_case_with(mixed.chars(), buf);
    },
  }
}

/// Drops `recognised` separators, uppercasing the character after each one
/// and lowercasing everything else.
pub fn join_separated_case(text: impl Iterator<Item = char>, recognised: Separators) -> Tendril {
  let mut res = Tendril::new();
  join_separated_case_with(text, &mut res, recognised);
  res
}

pub fn join_separated_case_with(
  text: impl Iterator<Item = char>,
  buf: &mut Tendril,
  recognised: Separators,
) {
  text.fold(false, |to_upper, c| {
    if recognised.matches(c) {
      return true;
    }
    if to_upper {
      buf.extend(c.to_uppercase());
    } else {
      buf.extend(c.to_lowercase());
    }
    false
  });
}

/// Changes only the first character of `text` with `map`.
pub fn map_first_char(text: &str, map: impl FnOnce(char) -> Tendril) -> Tendril {
  let mut chars = text.chars();
  let mut res = Tendril::new();
  if let Some(first) = chars.next() {
    res.push_str(&map(first));
    res.extend(chars);
  }
  res
}
