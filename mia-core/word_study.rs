//! Case style analysis of a single word.
//!
//! A [`WordStudy`] folds every character of a word into a [`CharClass`] set
//! and keeps the classes of the first, second and last characters apart.
//! Style predicates are expressed as set tests over those classes.

use bitflags::bitflags;
use unicode_general_category::{
  GeneralCategory,
  get_general_category,
};

use crate::{
  Tendril,
  case_convention::{
    LetterCase,
    Separator,
    Separators,
    join_separated_case,
    map_first_char,
    to_lower_case,
    to_lower_case_with,
    to_separated_case,
    to_upper_case,
  },
  chars::char_is_digit,
};

bitflags! {
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
  pub struct CharClass: u16 {
    const EMPTY       = 0x0001;
    const NUL         = 0x0002;
    const CTRL        = 0x0004;
    const SPACE       = 0x0008;
    const DIGITS      = 0x0010;
    const SYMBOLS     = 0x0020;
    const UPPER       = 0x0040;
    const LOWER       = 0x0080;
    const UNDER       = 0x0100;
    const DOT         = 0x0200;
    const DASH        = 0x0400;
    const SLASH       = 0x0800;
    const OTHER       = 0x1000;
    const NOT_DEFINED = 0x2000;

    const LETTER       = Self::LOWER.bits() | Self::UPPER.bits();
    const ALPHANUMERIC = Self::LETTER.bits() | Self::DIGITS.bits();
  }
}

impl CharClass {
  pub fn of_char(ch: char) -> CharClass {
    match ch {
      '\0' => Self::NUL,
      ch if (ch as u32) < 0x20 => Self::CTRL,
      ' ' => Self::SPACE,
      '_' => Self::UNDER,
      '.' => Self::DOT,
      '-' => Self::DASH,
      '/' => Self::SLASH,
      ch if ch.is_lowercase() => Self::LOWER,
      ch if ch.is_uppercase() => Self::UPPER,
      ch if char_is_digit(ch) => Self::DIGITS,
      ch if ch.is_ascii() => Self::SYMBOLS,
      ch if get_general_category(ch) == GeneralCategory::Unassigned => Self::NOT_DEFINED,
      _ => Self::OTHER,
    }
  }

  /// Union of the classes of every character, [`CharClass::EMPTY`] for an
  /// empty word.
  pub fn of_word(word: &str) -> CharClass {
    if word.is_empty() {
      return Self::EMPTY;
    }
    word
      .chars()
      .fold(CharClass::empty(), |acc, ch| acc | Self::of_char(ch))
  }

  #[inline]
  pub fn of_separator(sep: Separator) -> CharClass {
    match sep {
      Separator::Underscore => Self::UNDER,
      Separator::Dash => Self::DASH,
      Separator::Dot => Self::DOT,
      Separator::Slash => Self::SLASH,
    }
  }

  pub fn of_separators(seps: Separators) -> CharClass {
    seps
      .separators()
      .fold(CharClass::empty(), |acc, sep| acc | Self::of_separator(sep))
  }

  #[inline]
  pub fn has(self, flags: CharClass) -> bool {
    self.intersects(flags)
  }

  #[inline]
  pub fn has_none(self, flags: CharClass) -> bool {
    !self.intersects(flags)
  }

  #[inline]
  pub fn only(self, flags: CharClass) -> bool {
    (self - flags).is_empty()
  }

  #[inline]
  pub fn just(self, flags: CharClass) -> bool {
    self == flags
  }

  #[inline]
  pub fn has_all(self, flags: CharClass) -> bool {
    self.contains(flags)
  }

  /// Present and nothing but `flags`.
  #[inline]
  pub fn is(self, flags: CharClass) -> bool {
    self.has(flags) && self.only(flags)
  }
}

/// Classification of a word's naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseStyle {
  /// `properCamelCase`
  Camel,
  /// `PascalCase`
  Pascal,
  /// `snake_case`, `SCREAMING_SNAKE`, `Mixed_Snake` and the dash, dot and
  /// slash variants.
  Separated {
    separator: Separator,
    letters:   LetterCase,
  },
  Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordStudy {
  word:       String,
  separators: Separators,
  flags:      CharClass,
  first:      CharClass,
  second:     CharClass,
  last:       CharClass,
}

impl WordStudy {
  /// Studies `word` with only `_` recognised as a separator.
  pub fn new(word: impl Into<String>) -> Self {
    Self::with_separators(word, Separators::UNDERSCORE)
  }

  pub fn with_separators(word: impl Into<String>, separators: Separators) -> Self {
    let word = word.into();
    let mut chars = word.chars();
    let first = chars.next().map_or(CharClass::EMPTY, CharClass::of_char);
    let second = chars.next().map_or(CharClass::EMPTY, CharClass::of_char);
    let last = word.chars().last().map_or(CharClass::EMPTY, CharClass::of_char);
    let flags = CharClass::of_word(&word);

    Self {
      word,
      separators: separators | Separators::UNDERSCORE,
      flags,
      first,
      second,
      last,
    }
  }

  #[inline]
  pub fn word(&self) -> &str {
    &self.word
  }

  #[inline]
  pub fn flags(&self) -> CharClass {
    self.flags
  }

  #[inline]
  pub fn separators(&self) -> Separators {
    self.separators
  }

  #[inline]
  pub fn has(&self, flags: CharClass) -> bool {
    self.flags.has(flags)
  }

  #[inline]
  pub fn not(&self, flags: CharClass) -> bool {
    self.flags.has_none(flags)
  }

  #[inline]
  pub fn only(&self, flags: CharClass) -> bool {
    self.flags.only(flags)
  }

  #[inline]
  pub fn just(&self, flags: CharClass) -> bool {
    self.flags.just(flags)
  }

  #[inline]
  pub fn all(&self, flags: CharClass) -> bool {
    self.flags.has_all(flags)
  }

  #[inline]
  pub fn first(&self, flags: CharClass) -> bool {
    self.first.is(flags)
  }

  #[inline]
  pub fn second(&self, flags: CharClass) -> bool {
    self.second.is(flags)
  }

  #[inline]
  pub fn last(&self, flags: CharClass) -> bool {
    self.last.is(flags)
  }

  fn separator_classes(&self) -> CharClass {
    CharClass::of_separators(self.separators)
  }

  pub fn is_separated(&self, sep: Separator, letters: LetterCase) -> bool {
    let sep = CharClass::of_separator(sep);
    match letters {
      LetterCase::Mixed => {
        self.only(sep | CharClass::ALPHANUMERIC)
          && self.all(sep | CharClass::LETTER)
          && self.first(CharClass::LETTER)
      },
      LetterCase::Upper => {
        self.only(sep | CharClass::UPPER | CharClass::DIGITS)
          && self.all(sep | CharClass::UPPER)
          && self.first(sep | CharClass::UPPER)
      },
      LetterCase::Lower => {
        self.only(sep | CharClass::LOWER | CharClass::DIGITS)
          && self.all(sep | CharClass::LOWER)
          && self.first(sep | CharClass::LOWER)
      },
    }
  }

  pub fn is_mixed_snake_case(&self) -> bool {
    self.is_separated(Separator::Underscore, LetterCase::Mixed)
  }

  pub fn is_screaming_snake_case(&self) -> bool {
    self.is_separated(Separator::Underscore, LetterCase::Upper)
  }

  pub fn is_snake_case(&self) -> bool {
    self.is_separated(Separator::Underscore, LetterCase::Lower)
  }

  pub fn is_camel_case(&self) -> bool {
    self.only(CharClass::ALPHANUMERIC) && self.all(CharClass::LETTER) && self.first(CharClass::LETTER)
  }

  pub fn is_proper_camel_case(&self) -> bool {
    self.is_camel_case() && self.first(CharClass::LOWER)
  }

  pub fn is_pascal_case(&self) -> bool {
    self.is_camel_case() && self.first(CharClass::UPPER) && self.second(CharClass::LOWER)
  }

  pub fn has_no_upper_case(&self) -> bool {
    self.not(CharClass::UPPER | CharClass::EMPTY)
  }

  pub fn has_no_lower_case(&self) -> bool {
    self.not(CharClass::LOWER | CharClass::EMPTY)
  }

  pub fn has_upper_case(&self) -> bool {
    self.has(CharClass::UPPER)
  }

  pub fn has_lower_case(&self) -> bool {
    self.has(CharClass::LOWER)
  }

  pub fn is_lower_case(&self) -> bool {
    self.just(CharClass::LOWER)
  }

  pub fn is_upper_case(&self) -> bool {
    self.just(CharClass::UPPER)
  }

  pub fn style(&self) -> CaseStyle {
    if self.is_proper_camel_case() {
      return CaseStyle::Camel;
    }
    if self.is_pascal_case() {
      return CaseStyle::Pascal;
    }
    for separator in self.separators.separators() {
      for letters in [LetterCase::Upper, LetterCase::Lower, LetterCase::Mixed] {
        if self.is_separated(separator, letters) {
          return CaseStyle::Separated { separator, letters };
        }
      }
    }
    CaseStyle::Other
  }

  pub fn make_separated(&self, sep: Separator, letters: LetterCase) -> Tendril {
    to_separated_case(self.word.chars(), sep, letters, self.separators)
  }

  pub fn make_mixed_snake_case(&self) -> Tendril {
    self.make_separated(Separator::Underscore, LetterCase::Mixed)
  }

  pub fn make_screaming_snake_case(&self) -> Tendril {
    self.make_separated(Separator::Underscore, LetterCase::Upper)
  }

  pub fn make_snake_case(&self) -> Tendril {
    self.make_separated(Separator::Underscore, LetterCase::Lower)
  }

  /// Joins separated words. An all-capitals word keeps its first letter
  /// and lowercases the rest; anything else is left alone.
  pub fn make_camel_case(&self) -> Tendril {
    if self.has(self.separator_classes()) {
      join_separated_case(self.word.chars(), self.separators)
    } else if self.only(CharClass::UPPER | CharClass::DIGITS) && self.first(CharClass::UPPER) {
      let mut chars = self.word.chars();
      let mut res = Tendril::new();
      res.extend(chars.next());
      to_lower_case_with(chars, &mut res);
      res
    } else {
      self.word.as_str().into()
    }
  }

  pub fn make_proper_camel_case(&self) -> Tendril {
    map_first_char(&self.make_camel_case(), |c| to_lower_case(std::iter::once(c)))
  }

  pub fn make_pascal_case(&self) -> Tendril {
    map_first_char(&self.make_camel_case(), |c| to_upper_case(std::iter::once(c)))
  }

  fn can_be(&self, made: Tendril, is: impl FnOnce(&WordStudy) -> bool) -> bool {
    let seps = self.separator_classes();
    if self.only(seps | CharClass::ALPHANUMERIC)
      && self.has(CharClass::LETTER)
      && self.first(seps | CharClass::LETTER)
    {
      made.as_str() != self.word && is(&WordStudy::with_separators(made.as_str(), self.separators))
    } else {
      false
    }
  }

  pub fn can_be_separated(&self, sep: Separator, letters: LetterCase) -> bool {
    self.can_be(self.make_separated(sep, letters), |made| made.is_separated(sep, letters))
  }

  pub fn can_be_mixed_snake_case(&self) -> bool {
    self.can_be_separated(Separator::Underscore, LetterCase::Mixed)
  }

  pub fn can_be_screaming_snake_case(&self) -> bool {
    self.can_be_separated(Separator::Underscore, LetterCase::Upper)
  }

  pub fn can_be_snake_case(&self) -> bool {
    self.can_be_separated(Separator::Underscore, LetterCase::Lower)
  }

  pub fn can_be_camel_case(&self) -> bool {
    self.can_be(self.make_camel_case(), WordStudy::is_camel_case)
  }

  pub fn can_be_proper_camel_case(&self) -> bool {
    self.can_be(self.make_proper_camel_case(), WordStudy::is_proper_camel_case)
  }

  pub fn can_be_pascal_case(&self) -> bool {
    self.can_be(self.make_pascal_case(), WordStudy::is_pascal_case)
  }

  pub fn convert(&self, style: CaseStyle) -> Tendril {
    match style {
      CaseStyle::Camel => self.make_proper_camel_case(),
      CaseStyle::Pascal => self.make_pascal_case(),
      CaseStyle::Separated { separator, letters } => self.make_separated(separator, letters),
      CaseStyle::Other => self.word.as_str().into(),
    }
  }
}

/// Classifies `word`, trying each of `separators` for the separated styles.
pub fn classify(word: &str, separators: Separators) -> CaseStyle {
  WordStudy::with_separators(word, separators).style()
}

/// Converts `word` to `style`, treating every separator as a word break.
pub fn convert_case(word: &str, style: CaseStyle) -> Tendril {
  WordStudy::with_separators(word, Separators::all()).convert(style)
}
