use unicode_general_category::{
  GeneralCategory,
  get_general_category,
};

use crate::line_ending::LineEnding;

/// Stand-in for the character before offset `0` and at offset `len`.
pub const NUL: char = '\0';

#[inline]
pub fn char_is_line_ending(ch: char) -> bool {
  LineEnding::from_char(ch).is_some()
}

/// Whitespace in the sense used by word boundaries: line terminators, tab,
/// the information separators and every Unicode space separator except the
/// no-break spaces.
#[inline]
pub fn char_is_whitespace(ch: char) -> bool {
  match ch {
    '\u{0009}'..='\u{000D}' | '\u{001C}'..='\u{001F}' => true,

    // No-break Space, Figure Space, Narrow No-break Space
    '\u{00A0}' | '\u{2007}' | '\u{202F}' => false,

    ch => {
      matches!(
        get_general_category(ch),
        GeneralCategory::SpaceSeparator
          | GeneralCategory::LineSeparator
          | GeneralCategory::ParagraphSeparator
      )
    },
  }
}

/// Space or tab, the only characters counted as leading/trailing blanks.
#[inline]
pub fn char_is_blank(ch: char) -> bool {
  ch == ' ' || ch == '\t'
}

/// Characters that may appear inside a language identifier.
#[inline]
pub fn char_is_identifier(ch: char) -> bool {
  if ch == NUL {
    return false;
  }
  if ch.is_alphanumeric() || ch == '_' || ch == '$' {
    return true;
  }

  matches!(
    get_general_category(ch),
    GeneralCategory::CurrencySymbol
      | GeneralCategory::ConnectorPunctuation
      | GeneralCategory::NonspacingMark
      | GeneralCategory::SpacingMark
      | GeneralCategory::LetterNumber
  )
}

#[inline]
pub fn char_is_digit(ch: char) -> bool {
  ch.is_ascii_digit() || get_general_category(ch) == GeneralCategory::DecimalNumber
}

#[inline]
pub fn char_is_letter_or_digit(ch: char) -> bool {
  ch.is_alphabetic() || char_is_digit(ch)
}

#[inline]
pub fn char_is_lower_or_digit(ch: char) -> bool {
  ch.is_lowercase() || char_is_digit(ch)
}
