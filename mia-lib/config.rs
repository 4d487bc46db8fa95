//! User settings, read from a global and a workspace `mia.toml`.
//!
//! ```toml
//! [words]
//! camel = true
//! word-bounds = ["start-of-word", "end-of-word", "start-of-line"]
//!
//! [paste.preserve]
//! camel-case = true
//! snake-case = true
//!
//! [line-selection]
//! mouse-modifier = "ctrl-line"
//! ```

use std::{
  fs,
  io,
  path::Path,
  time::Duration,
};

use mia_core::classify::WordTypePolicy;
use serde::Deserialize;
use thiserror::Error;
use toml::Value;

use crate::{
  boundary::{
    BoundaryFlags,
    ScanRequest,
  },
  case_preserve::PreserveOptions,
  delete_regex::{
    HumpsMode,
    RegexDelete,
  },
  movement::Direction,
  pattern,
  prefix::{
    PrefixMatcher,
    PrefixPatternType,
  },
};

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
  #[error("failed to read config: {0}")]
  Io(#[from] io::Error),
  #[error("bad config: {0}")]
  BadConfig(#[from] toml::de::Error),
}

/// Tables nested deeper than this are replaced instead of merged.
const MERGE_DEPTH: usize = 3;

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct MiaConfig {
  pub words:          WordsConfig,
  pub paste:          PasteConfig,
  pub line_selection: LineSelectionConfig,
  pub delete:         DeleteConfig,
  pub scheduler:      SchedulerConfig,
}

impl MiaConfig {
  pub fn from_toml(text: &str) -> Result<Self> {
    Ok(toml::from_str(text)?)
  }

  /// Merges a global and a workspace document, the workspace winning.
  ///
  /// A document that could not be read is skipped, a document that could not
  /// be parsed is an error. With neither available the defaults are used.
  pub fn load(global: Result<String>, local: Result<String>) -> Result<Self> {
    let parse = |text: Result<String>| -> Result<Option<Value>> {
      match text {
        Ok(text) => Ok(Some(toml::from_str(&text)?)),
        Err(ConfigError::Io(_)) => Ok(None),
        Err(err) => Err(err),
      }
    };

    let merged = match (parse(global)?, parse(local)?) {
      (None, None) => return Ok(Self::default()),
      (Some(value), None) | (None, Some(value)) => value,
      (Some(global), Some(local)) => merge_toml_values(global, local, MERGE_DEPTH),
    };
    Ok(merged.try_into()?)
  }

  pub fn load_files(global: &Path, local: &Path) -> Result<Self> {
    let read = |path: &Path| fs::read_to_string(path).map_err(ConfigError::from);
    Self::load(read(global), read(local))
  }
}

/// Merges `right` into `left`, recursing into tables up to `merge_depth`
/// levels. Everything else is taken from `right`.
pub fn merge_toml_values(left: Value, right: Value, merge_depth: usize) -> Value {
  match (left, right) {
    (Value::Table(mut left_map), Value::Table(right_map)) if merge_depth > 0 => {
      for (name, rvalue) in right_map {
        let merged = match left_map.remove(&name) {
          Some(lvalue) => merge_toml_values(lvalue, rvalue, merge_depth - 1),
          None => rvalue,
        };
        left_map.insert(name, merged);
      }
      Value::Table(left_map)
    },
    (_, value) => value,
  }
}

/// A place a word motion may stop, as named in the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Boundary {
  StartOfWord,
  EndOfWord,
  StartOfTrailingBlanks,
  EndOfLeadingBlanks,
  StartOfLine,
  EndOfLine,
  StartOfFoldingRegion,
  EndOfFoldingRegion,
  SingleLine,
  MultiCaretSingleLine,
}

impl Boundary {
  pub const fn flag(self) -> BoundaryFlags {
    match self {
      Self::StartOfWord => BoundaryFlags::START_OF_WORD,
      Self::EndOfWord => BoundaryFlags::END_OF_WORD,
      Self::StartOfTrailingBlanks => BoundaryFlags::START_OF_TRAILING_BLANKS,
      Self::EndOfLeadingBlanks => BoundaryFlags::END_OF_LEADING_BLANKS,
      Self::StartOfLine => BoundaryFlags::START_OF_LINE,
      Self::EndOfLine => BoundaryFlags::END_OF_LINE,
      Self::StartOfFoldingRegion => BoundaryFlags::START_OF_FOLDING_REGION,
      Self::EndOfFoldingRegion => BoundaryFlags::END_OF_FOLDING_REGION,
      Self::SingleLine => BoundaryFlags::SINGLE_LINE,
      Self::MultiCaretSingleLine => BoundaryFlags::MULTI_CARET_SINGLE_LINE,
    }
  }

  pub fn flags<'a>(bounds: impl IntoIterator<Item = &'a Boundary>) -> BoundaryFlags {
    bounds
      .into_iter()
      .fold(BoundaryFlags::empty(), |flags, bound| flags | bound.flag())
  }
}

const LINE_BOUNDS: [Boundary; 5] = [
  Boundary::StartOfLine,
  Boundary::EndOfLine,
  Boundary::StartOfTrailingBlanks,
  Boundary::EndOfLeadingBlanks,
  Boundary::MultiCaretSingleLine,
];

fn with_line_bounds(word_bounds: &[Boundary]) -> Vec<Boundary> {
  word_bounds.iter().chain(LINE_BOUNDS.iter()).copied().collect()
}

/// Which of the configured word motions to build a scan for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordMotion {
  Word,
  WordStart,
  WordEnd,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct WordsConfig {
  pub word_type:         WordTypePolicy,
  pub camel:             bool,
  pub word_bounds:       Vec<Boundary>,
  pub word_start_bounds: Vec<Boundary>,
  pub word_end_bounds:   Vec<Boundary>,
}

impl Default for WordsConfig {
  fn default() -> Self {
    Self {
      word_type:         WordTypePolicy::Mia,
      camel:             true,
      word_bounds:       with_line_bounds(&[Boundary::StartOfWord, Boundary::EndOfWord]),
      word_start_bounds: with_line_bounds(&[Boundary::StartOfWord]),
      word_end_bounds:   with_line_bounds(&[Boundary::EndOfWord]),
    }
  }
}

impl WordsConfig {
  pub fn flags(&self, motion: WordMotion) -> BoundaryFlags {
    match motion {
      WordMotion::Word => Boundary::flags(&self.word_bounds),
      WordMotion::WordStart => Boundary::flags(&self.word_start_bounds),
      WordMotion::WordEnd => Boundary::flags(&self.word_end_bounds),
    }
  }

  pub fn request(&self, motion: WordMotion, direction: Direction) -> ScanRequest {
    ScanRequest::new(direction, self.flags(motion))
      .word_type(self.word_type)
      .camel(self.camel)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct PasteConfig {
  pub preserve:    PreserveOptions,
  /// `|` separated prefixes, or a single regex for the regex pattern type.
  pub prefixes:    String,
  pub prefix_type: PrefixPatternType,
}

impl Default for PasteConfig {
  fn default() -> Self {
    Self {
      preserve:    PreserveOptions::default(),
      prefixes:    "my|our|is|get|set".to_owned(),
      prefix_type: PrefixPatternType::Camel,
    }
  }
}

impl PasteConfig {
  /// The configured prefixes. A bad regex never matches.
  pub fn prefix_matcher(&self) -> PrefixMatcher {
    PrefixMatcher::new_or_never(self.prefix_type, &self.prefixes)
  }
}

/// What holding Ctrl means while selecting with the mouse.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MouseModifier {
  /// Ctrl selects characters, plain drags select lines.
  #[default]
  CtrlChar,
  /// Ctrl selects lines, plain drags select characters.
  CtrlLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct LineSelectionConfig {
  pub enabled:              bool,
  /// Keep the caret on the last selected line instead of after it.
  pub caret_in_selection:   bool,
  pub mouse_line_selection: bool,
  pub mouse_modifier:       MouseModifier,
  pub left_right_movement:  bool,
  pub up_down_selection:    bool,
  pub up_down_movement:     bool,
  pub delete_operations:    bool,
}

impl Default for LineSelectionConfig {
  fn default() -> Self {
    Self {
      enabled:              true,
      caret_in_selection:   true,
      mouse_line_selection: true,
      mouse_modifier:       MouseModifier::CtrlChar,
      left_right_movement:  true,
      up_down_selection:    true,
      up_down_movement:     true,
      delete_operations:    true,
    }
  }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct DeleteConfig {
  pub line_bound:             bool,
  pub multi_caret_line_bound: bool,
  pub humps_mode:             HumpsMode,
}

impl DeleteConfig {
  pub fn regex_delete(&self, pattern: &str, direction: Direction) -> pattern::Result<RegexDelete> {
    Ok(
      RegexDelete::new(pattern, direction)?
        .humps(self.humps_mode)
        .line_bound(self.line_bound)
        .multi_caret_line_bound(self.multi_caret_line_bound),
    )
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct SchedulerConfig {
  /// Milliseconds per scheduler tick.
  pub resolution: u64,
}

impl Default for SchedulerConfig {
  fn default() -> Self {
    Self { resolution: 25 }
  }
}

impl SchedulerConfig {
  pub fn resolution(&self) -> Duration {
    Duration::from_millis(self.resolution.max(1))
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn defaults() {
    let config = MiaConfig::default();
    assert!(config.words.camel);
    assert_eq!(config.words.word_type, WordTypePolicy::Mia);
    assert!(config.line_selection.enabled);
    assert_eq!(config.line_selection.mouse_modifier, MouseModifier::CtrlChar);
    assert_eq!(config.delete.humps_mode, HumpsMode::None);
    assert_eq!(config.scheduler.resolution(), Duration::from_millis(25));
    assert_eq!(config.paste.prefix_matcher().matched("myName"), Some("my"));
  }

  #[test]
  fn word_motion_flags() {
    let words = WordsConfig::default();
    let line = BoundaryFlags::START_OF_LINE
      | BoundaryFlags::END_OF_LINE
      | BoundaryFlags::START_OF_TRAILING_BLANKS
      | BoundaryFlags::END_OF_LEADING_BLANKS
      | BoundaryFlags::MULTI_CARET_SINGLE_LINE;
    assert_eq!(
      words.flags(WordMotion::Word),
      line | BoundaryFlags::START_OF_WORD | BoundaryFlags::END_OF_WORD
    );
    assert_eq!(words.flags(WordMotion::WordStart), line | BoundaryFlags::START_OF_WORD);
    assert_eq!(words.flags(WordMotion::WordEnd), line | BoundaryFlags::END_OF_WORD);

    let request = words.request(WordMotion::WordEnd, Direction::Backward);
    assert_eq!(request.direction, Direction::Backward);
    assert!(request.camel);
    assert_eq!(request.word_type, WordTypePolicy::Mia);
  }

  #[test]
  fn parse_sections() {
    let config = MiaConfig::from_toml(
      r#"
      [words]
      word-type = "space-delimited"
      word-bounds = ["start-of-word", "single-line"]

      [paste]
      prefixes = "the|an"
      prefix-type = "any"

      [paste.preserve]
      snake-case = true

      [line-selection]
      mouse-modifier = "ctrl-line"

      [delete]
      humps-mode = "follow"

      [scheduler]
      resolution = 10
      "#,
    )
    .unwrap();

    assert_eq!(config.words.word_type, WordTypePolicy::SpaceDelimited);
    assert_eq!(
      config.words.flags(WordMotion::Word),
      BoundaryFlags::START_OF_WORD | BoundaryFlags::SINGLE_LINE
    );
    assert!(config.words.camel);
    assert!(config.paste.preserve.snake_case);
    assert!(!config.paste.preserve.camel_case);
    assert_eq!(config.paste.prefix_matcher().matched("thereby"), Some("the"));
    assert_eq!(config.line_selection.mouse_modifier, MouseModifier::CtrlLine);
    assert!(config.line_selection.enabled);
    assert_eq!(config.delete.humps_mode, HumpsMode::Follow);
    assert_eq!(config.scheduler.resolution(), Duration::from_millis(10));
  }

  #[test]
  fn unknown_fields_are_rejected() {
    let err = MiaConfig::from_toml("[words]\ncamel-words = false\n").unwrap_err();
    assert!(matches!(err, ConfigError::BadConfig(_)));
  }

  #[test]
  fn local_overrides_global() {
    let global = "[words]\ncamel = false\nword-type = \"ide\"\n\n[delete]\nline-bound = true\n";
    let local = "[words]\ncamel = true\n";
    let config = MiaConfig::load(Ok(global.to_owned()), Ok(local.to_owned())).unwrap();
    assert!(config.words.camel);
    assert_eq!(config.words.word_type, WordTypePolicy::Ide);
    assert!(config.delete.line_bound);
  }

  #[test]
  fn missing_files_fall_back() {
    let missing = || Err(ConfigError::Io(io::Error::from(io::ErrorKind::NotFound)));
    assert_eq!(MiaConfig::load(missing(), missing()).unwrap(), MiaConfig::default());

    let config = MiaConfig::load(missing(), Ok("[scheduler]\nresolution = 5\n".into())).unwrap();
    assert_eq!(config.scheduler.resolution, 5);

    let bad = MiaConfig::load(Ok("[words".into()), missing());
    assert!(matches!(bad, Err(ConfigError::BadConfig(_))));
  }

  #[test]
  fn merge_replaces_below_depth() {
    let left: Value = toml::from_str("[a.b]\nx = 1\ny = 2\n").unwrap();
    let right: Value = toml::from_str("[a.b]\nx = 3\n").unwrap();
    let merged = merge_toml_values(left.clone(), right.clone(), 3);
    assert_eq!(merged["a"]["b"]["x"].as_integer(), Some(3));
    assert_eq!(merged["a"]["b"]["y"].as_integer(), Some(2));

    let replaced = merge_toml_values(left, right, 1);
    assert!(replaced["a"]["b"].get("y").is_none());
  }

  #[test]
  fn delete_settings_apply() {
    let delete = DeleteConfig {
      line_bound: true,
      humps_mode: HumpsMode::Humps,
      ..DeleteConfig::default()
    };
    let rope = ropey::Rope::from("fooBar\n  x");
    let regex = delete.regex_delete(r"\w+", Direction::Backward).unwrap();
    assert_eq!(regex.find(rope.slice(..), 6, false, false), Some(3..6));
    assert!(delete.regex_delete("[", Direction::Forward).is_err());
  }
}
