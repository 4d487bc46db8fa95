//! Keeping the naming convention of the destination when pasting a word.
//!
//! Preservation is split in two: [`CaseFormatPreserver::study_format_before`]
//! looks at the identifier around the caret before the paste, and
//! [`CaseFormatPreserver::preserve_format_after`] reworks the pasted word
//! once it is in the document.

use std::ops::Range;

use mia_core::{
  case_convention::{
    LetterCase,
    Separator,
    Separators,
  },
  text::TextExt,
  word_range::{
    WordQuery,
    next_word_end,
    previous_word_start,
  },
  word_study::{
    CharClass,
    WordStudy,
  },
};
use ropey::RopeSlice;
use serde::Deserialize;
use tracing::debug;

use crate::{
  inserted_range::{
    CaseMap,
    InsertedRangeContext,
  },
  prefix::PrefixMatcher,
  selection,
};

/// Which conventions a paste may convert to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct PreserveOptions {
  pub camel_case:           bool,
  pub snake_case:           bool,
  pub screaming_snake_case: bool,
  pub dash_case:            bool,
  pub dot_case:             bool,
  pub slash_case:           bool,
  /// Give the pasted word the prefix the replaced word had.
  pub add_prefix:           bool,
}

impl PreserveOptions {
  pub const fn all() -> Self {
    Self {
      camel_case:           true,
      snake_case:           true,
      screaming_snake_case: true,
      dash_case:            true,
      dot_case:             true,
      slash_case:           true,
      add_prefix:           true,
    }
  }

  pub fn any_case(&self) -> bool {
    self.camel_case
      || self.snake_case
      || self.screaming_snake_case
      || self.dash_case
      || self.dot_case
      || self.slash_case
  }

  /// Separators recognised inside words. `_` always is.
  pub fn separators(&self) -> Separators {
    let mut separators = Separators::UNDERSCORE;
    separators.set(Separators::DASH, self.dash_case);
    separators.set(Separators::DOT, self.dot_case);
    separators.set(Separators::SLASH, self.slash_case);
    separators
  }

  fn allows(&self, separator: Separator, letters: LetterCase) -> bool {
    match (separator, letters) {
      (Separator::Underscore, LetterCase::Upper) => self.screaming_snake_case,
      (Separator::Underscore, _) => self.snake_case,
      (Separator::Dash, _) => self.dash_case,
      (Separator::Dot, _) => self.dot_case,
      (Separator::Slash, _) => self.slash_case,
    }
  }
}

/// Convention of the destination word.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetCase {
  #[default]
  Keep,
  Camel,
  Pascal,
  Separated {
    separator: Separator,
    letters:   LetterCase,
  },
}

/// A replacement produced by [`CaseFormatPreserver::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreservedEdit {
  /// Range of the text to replace, in characters.
  pub range: Range<usize>,
  pub word:  String,
  /// Caret offset after the replacement.
  pub caret: usize,
}

/// What was learned about the destination before a paste.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CaseFormatPreserver {
  target:               TargetCase,
  start_was_lower_case: bool,
  start_was_upper_case: bool,
  start_was_on_bound:   bool,
  end_was_on_bound:     bool,
  had_start_of_word:    bool,
  start_of_word_prefix: String,
  had_selection:        bool,
}

/// A selection of whole lines.
fn is_line_selection(text: RopeSlice, selection: &selection::Range) -> bool {
  let (start, end) = (selection.from(), selection.to());
  (start == 0 || text.char_at_or_nul(start - 1) == '\n') && text.char_at_or_nul(end - 1) == '\n'
}

fn target_case(study: &WordStudy, separators: Separators) -> TargetCase {
  let upper = separators
    .separators()
    .find(|&sep| study.is_separated(sep, LetterCase::Upper))
    .or_else(|| {
      (study.only(CharClass::UPPER | CharClass::DIGITS | CharClass::UNDER)
        && study.has_upper_case())
      .then_some(Separator::Underscore)
    });
  if let Some(separator) = upper {
    return TargetCase::Separated {
      separator,
      letters: LetterCase::Upper,
    };
  }

  if let Some(separator) = separators
    .separators()
    .find(|&sep| study.is_separated(sep, LetterCase::Lower))
  {
    return TargetCase::Separated {
      separator,
      letters: LetterCase::Lower,
    };
  }

  if study.is_pascal_case() {
    TargetCase::Pascal
  } else if study.is_camel_case()
    || study.flags().is(CharClass::LOWER | CharClass::DIGITS) && study.first(CharClass::LOWER)
  {
    TargetCase::Camel
  } else {
    TargetCase::Keep
  }
}

impl CaseFormatPreserver {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn clear(&mut self) {
    *self = Self::default();
  }

  pub fn target(&self) -> TargetCase {
    self.target
  }

  pub fn had_selection(&self) -> bool {
    self.had_selection
  }

  pub fn start_of_word_prefix(&self) -> &str {
    &self.start_of_word_prefix
  }

  /// Studies the text a paste at `offset` will replace: the selection, or
  /// nothing. A selection of whole lines is treated as no selection.
  pub fn study_format_before(
    &mut self,
    text: RopeSlice,
    offset: usize,
    selection: selection::Range,
    matcher: &PrefixMatcher,
    separators: Separators,
  ) {
    self.clear();

    let mut before = offset;
    let mut after = offset;
    if !selection.is_empty() && !is_line_selection(text, &selection) {
      before = selection.from();
      after = selection.to();
      self.had_selection = true;
    }

    let query = WordQuery::identifier();
    let expanded_before = previous_word_start(text, before, query);
    let expanded_after = next_word_end(text, after, query);
    let expanded =
      InsertedRangeContext::with_separators(text, expanded_before, expanded_after, separators);
    let replaced = InsertedRangeContext::with_separators(text, before, after, separators);

    if replaced.is_empty() {
      self.had_start_of_word = replaced.is_word_start_at_start;
    } else {
      self.had_start_of_word = replaced.is_identifier_start_before(false);
      if self.had_start_of_word {
        self.start_of_word_prefix = replaced.matched_prefix(matcher).unwrap_or_default();
      }
    }

    self.target = target_case(expanded.study(), separators);
    if !matches!(self.target, TargetCase::Separated { .. }) {
      // bounds matter for words that are not fully camel case too
      let identifier_start = replaced.is_identifier_start_before(true);
      let identifier_end = replaced.is_identifier_end_before(true);
      let letters_only = replaced.study().only(
        CharClass::LOWER | CharClass::UPPER | CharClass::UNDER | CharClass::EMPTY,
      );
      self.start_was_lower_case =
        identifier_start && replaced.is_lower_case_at_start() && letters_only;
      self.start_was_upper_case =
        identifier_start && replaced.is_upper_case_at_start() && letters_only;
      self.start_was_on_bound = identifier_start || identifier_end;
      self.end_was_on_bound =
        replaced.is_identifier_start_after(true) || replaced.is_identifier_end_after(true);
    }

    debug!(
      target = ?self.target,
      had_selection = self.had_selection,
      had_start_of_word = self.had_start_of_word,
      prefix = %self.start_of_word_prefix,
      "studied paste destination"
    );
  }

  /// Reworks the word pasted at `range` of `text` to match what was studied.
  ///
  /// Returns `None` when the paste spans lines, as those are never
  /// reformatted. A word pasted away from other identifier characters is
  /// reformatted only when it replaced a selection.
  pub fn preserve_format_after<'a>(
    &self,
    text: RopeSlice<'a>,
    range: Range<usize>,
    options: &PreserveOptions,
    matcher: &PrefixMatcher,
  ) -> Option<InsertedRangeContext<'a>> {
    let end = range.end.min(text.len_chars());
    let start = range.start.min(end);
    if text.slice(start..end).chars().any(|ch| ch == '\n') {
      return None;
    }

    let separators = options.separators();
    let mut word = InsertedRangeContext::with_separators(text, start, end, separators);
    let mut caret_delta = 0;

    if !word.is_isolated() || self.had_selection {
      if let Some(matched) = word.matched_prefix(matcher)
        && !(self.had_start_of_word && self.start_of_word_prefix == matched)
        && word.study().only(CharClass::ALPHANUMERIC)
      {
        word.remove_prefixes_once(matcher);
      }

      let word_chars =
        CharClass::ALPHANUMERIC | CharClass::UNDER | CharClass::of_separators(separators);
      if word.study().only(word_chars) && options.any_case() {
        match self.target {
          TargetCase::Separated { separator, letters } if options.allows(separator, letters) => {
            word.remove_prefixes_once(matcher);
            word.make_separated(separator, letters);
          },
          _ if options.camel_case => {
            caret_delta = self.preserve_camel_case(&mut word, options, matcher);
          },
          _ => {},
        }
      }
    }

    word.set_caret_delta(caret_delta);
    debug!(
      inserted = %word.inserted,
      word = %word.word(),
      caret_delta,
      "preserved paste format"
    );
    Some(word)
  }

  fn preserve_camel_case(
    &self,
    word: &mut InsertedRangeContext,
    options: &PreserveOptions,
    matcher: &PrefixMatcher,
  ) -> isize {
    let separators = CharClass::of_separators(word.separators());
    // a leading or trailing separator is meant to join the word to its
    // neighbours and is kept as is
    let fragment = word.study().first(separators) || word.study().last(separators);
    match self.target {
      TargetCase::Pascal if !fragment && word.can_be_pascal_case() => {
        word.make_pascal_case();
      },
      TargetCase::Camel if !fragment && word.can_be_camel_case() => {
        word.make_camel_case();
      },
      _ => {},
    }

    if options.add_prefix
      && self.had_start_of_word
      && word.add_prefix_or_replace_mismatched_prefix(matcher, &self.start_of_word_prefix)
    {
      // prefix added or replaced
    } else if self.start_was_upper_case && word.is_lower_case_at_start() {
      word.remove_prefixes_once(matcher);
      word.prefix_to_upper_case(1);
    } else if self.start_was_lower_case
      && word.is_upper_case_at_start()
      && !word.has_no_lower_case_after_prefix(1)
    {
      word.prefix_to_lower_case(1);
    } else if self.start_was_on_bound && word.is_alphabetic_at_start() {
      // change case so the word starts a hump
      if word.is_lower_case_at_start()
        && word.is_hump_bound_identifier_at_start(Some(CaseMap::Upper))
        && !word.is_hump_bound_identifier_at_start(None)
      {
        word.prefix_to_upper_case(1);
      } else if word.is_upper_case_at_start()
        && word.is_hump_bound_identifier_at_start(Some(CaseMap::Lower))
        && !word.is_hump_bound_identifier_at_start(None)
      {
        word.prefix_to_lower_case(1);
      }
    }

    if (self.end_was_on_bound || word.is_expanded_camel_case())
      && word.is_alphabetic_after()
      && word.is_lower_case_after()
      && word.is_hump_bound_identifier_at_end(Some(CaseMap::Upper))
      && !word.is_hump_bound_identifier_at_end(None)
    {
      // the character after the paste starts a new hump
      word.suffix_with_from_after(1, Some(CaseMap::Upper));
      return -1;
    }
    0
  }

  /// Runs [`Self::preserve_format_after`] and returns the edit to make, if
  /// the word changed.
  pub fn apply(
    &self,
    text: RopeSlice,
    range: Range<usize>,
    options: &PreserveOptions,
    matcher: &PrefixMatcher,
  ) -> Option<PreservedEdit> {
    let word = self.preserve_format_after(text, range, options, matcher)?;
    if word.is_equals_inserted() {
      return None;
    }
    let start = word.before_offset;
    let end = word.after_offset.saturating_add_signed(-word.caret_delta());
    let caret = (start + word.word_len()).saturating_add_signed(word.caret_delta());
    Some(PreservedEdit {
      range: start..end,
      word: word.word().to_owned(),
      caret,
    })
  }
}

#[cfg(test)]
mod test {
  use ropey::Rope;

  use super::*;
  use crate::prefix::PrefixPatternType;

  /// Pastes `pasted` into `template`, where `|` marks the caret and `[`,
  /// `]` the selection, and returns the text with the preserved word.
  fn preserved(
    template: &str,
    pasted: &str,
    options: &PreserveOptions,
    matcher: &PrefixMatcher,
  ) -> String {
    let mut text = String::new();
    let (mut caret, mut start, mut end) = (None, None, None);
    for ch in template.chars() {
      let offset = text.chars().count();
      match ch {
        '|' => caret = Some(offset),
        '[' => start = Some(offset),
        ']' => end = Some(offset),
        _ => text.push(ch),
      }
    }
    let caret = caret.unwrap();
    let (start, end) = (start.unwrap_or(caret), end.unwrap_or(caret));

    let rope = Rope::from(text.as_str());
    let mut preserver = CaseFormatPreserver::new();
    let selection = if caret == start {
      selection::Range::new(end, start)
    } else {
      selection::Range::new(start, end)
    };
    preserver.study_format_before(rope.slice(..), caret, selection, matcher, options.separators());

    let mut edited = Rope::from(text.as_str());
    edited.remove(start..end);
    edited.insert(start, pasted);
    let pasted_len = pasted.chars().count();
    match preserver.apply(edited.slice(..), start..start + pasted_len, options, matcher) {
      Some(edit) => {
        edited.remove(edit.range);
        edited.insert(start, &edit.word);
        edited.to_string()
      },
      None => edited.to_string(),
    }
  }

  fn check(matcher: &PrefixMatcher) {
    let all = PreserveOptions::all();
    let cases = [
      ("   int |\n", "myName", "   int myName\n"),
      ("   int | abc\n", "myName", "   int myName abc\n"),
      ("   int |abc\n", "myName", "   int nameAbc\n"),
      ("   int a|bc\n", "myName", "   int aNameBc\n"),
      ("   int abc|\n", "myName", "   int abcName\n"),
      ("   int [abc]|\n", "myName", "   int name\n"),
      ("   int |[abc]\n", "myName", "   int name\n"),
      ("   int [abcDef]|\n", "myNameAnd", "   int nameAnd\n"),
      ("   int abc |\n", "myName", "   int abc myName\n"),
      ("   int [new WordStudy]|(\n", "WordStudy.of", "   int WordStudy.of(\n"),
      ("  [int]| WordStudy(\n", "myCaret", "  caret WordStudy(\n"),
      ("[WORK_PLAY]|(\n", "myWordStudy", "WORD_STUDY(\n"),
      ("[work_play]|(\n", "myWordStudy", "word_study(\n"),
      (
        "static [void]| duplicateLine\n",
        "Couple<Integer> ",
        "static Couple<Integer>  duplicateLine\n",
      ),
      ("  [Class]| myManager;\n", "myManager", "  Manager myManager;\n"),
      (
        "  private boolean myRemovePrefixOnPasteType = [false]|;\n",
        "myRemovePrefixOnPasteType",
        "  private boolean myRemovePrefixOnPasteType = removePrefixOnPasteType;\n",
      ),
      ("FLAGS[_SOME_NAME]|\n", "myClassMemberName", "FLAGS_CLASS_MEMBER_NAME\n"),
      ("flags[_some_name]|\n", "myClassMemberName", "flags_class_member_name\n"),
      ("[myClassMemberName]|\n", "myClassMemberName", "myClassMemberName\n"),
      ("boolean [myClassMemberName]|\n", "disableGifImages", "boolean myDisableGifImages\n"),
      ("boolean [ourClassMemberName]|\n", "disableGifImages", "boolean ourDisableGifImages\n"),
      (
        "editor.putUserData([LAST_PASTED_CLIPBOARD_CONTEXT]|, clipboardCaretContent)\n",
        "LastPastedClipboardCarets",
        "editor.putUserData(LAST_PASTED_CLIPBOARD_CARETS, clipboardCaretContent)\n",
      ),
      (
        "editor.putUserData(|[LAST_PASTED_CLIPBOARD_CONTEXT], clipboardCaretContent)\n",
        "LastPastedClipboardCarets",
        "editor.putUserData(LAST_PASTED_CLIPBOARD_CARETS, clipboardCaretContent)\n",
      ),
      ("       [CamelCase]|\n", "myLastSelectionMarker", "       LastSelectionMarker\n"),
      ("editor.[getTestString]|()\n", "myReplacement", "editor.getReplacement()\n"),
      ("editor.|appendIf()\n", "test_", "editor.test_appendIf()\n"),
      ("appendIf|()\n", "_test", "appendIf_test()\n"),
      (" |appendIf()\n", "test_", " test_appendIf()\n"),
      ("|appendIf()\n", "test_", "test_appendIf()\n"),
      ("appendIf| \n", "_test", "appendIf_test \n"),
      ("[sorted]|\n", "FLAT", "flat\n"),
      ("[SORTED]|\n", "flat", "FLAT\n"),
      ("[SCREAMING_SNAKE]|\n", "dash-case-name", "DASH_CASE_NAME\n"),
      ("[dash-case-name]|\n", "SCREAMING_SNAKE", "screaming-snake\n"),
    ];
    for (template, pasted, expected) in cases {
      assert_eq!(
        preserved(template, pasted, &all, matcher),
        expected,
        "{template:?} <- {pasted:?}"
      );
    }
  }

  #[test]
  fn camel_prefixes() {
    check(&PrefixMatcher::new(PrefixPatternType::Camel, "my|our|is|get|set").unwrap());
  }

  #[test]
  fn regex_prefixes() {
    let pattern = "^(?:my|our|is|get|set)(?=[A-Z])";
    check(&PrefixMatcher::new(PrefixPatternType::Regex, pattern).unwrap());
  }

  #[test]
  fn nothing_to_preserve() {
    let none = PreserveOptions::default();
    let matcher = PrefixMatcher::never();
    assert_eq!(preserved("   int [abc]|\n", "myName", &none, &matcher), "   int myName\n");
  }

  #[test]
  fn whole_lines_are_not_studied() {
    let rope = Rope::from("FOO_BAR\nnext\n");
    let mut preserver = CaseFormatPreserver::new();
    preserver.study_format_before(
      rope.slice(..),
      8,
      selection::Range::new(0, 8),
      &PrefixMatcher::never(),
      Separators::UNDERSCORE,
    );
    assert!(!preserver.had_selection());
    // the word at the caret is studied instead
    assert_eq!(preserver.target(), TargetCase::Camel);
  }

  #[test]
  fn multi_line_paste_is_left_alone() {
    let rope = Rope::from("someName\nother");
    let preserver = CaseFormatPreserver {
      target: TargetCase::Separated {
        separator: Separator::Underscore,
        letters:   LetterCase::Lower,
      },
      had_selection: true,
      ..CaseFormatPreserver::default()
    };
    let options = PreserveOptions::all();
    let never = PrefixMatcher::never();
    assert!(
      preserver
        .preserve_format_after(rope.slice(..), 0..14, &options, &never)
        .is_none()
    );
    assert!(preserver.apply(rope.slice(..), 0..8, &options, &never).is_some());
  }

  #[test]
  fn caret_follows_the_changed_hump() {
    let rope = Rope::from("   int abc\n");
    let matcher = PrefixMatcher::new(PrefixPatternType::Camel, "my").unwrap();
    let mut preserver = CaseFormatPreserver::new();
    preserver.study_format_before(
      rope.slice(..),
      7,
      selection::Range::point(7),
      &matcher,
      Separators::UNDERSCORE,
    );

    let edited = Rope::from("   int myNameabc\n");
    let options = PreserveOptions::all();
    let edit = preserver.apply(edited.slice(..), 7..13, &options, &matcher).unwrap();
    assert_eq!(edit, PreservedEdit {
      range: 7..14,
      word:  "nameA".to_owned(),
      caret: 11,
    });
  }
}
