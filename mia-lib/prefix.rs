//! Identifier prefixes such as `my` or `get` that paste can strip or add.

use fancy_regex::Regex;
use serde::Deserialize;
use tracing::warn;

use crate::pattern::{
  PatternError,
  Result,
};

/// Delimiter between prefixes in a prefix list.
pub const PREFIX_DELIMITER: char = '|';

/// How a prefix list is matched against a word.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrefixPatternType {
  /// The word starts with the prefix and is longer than it.
  Any,
  /// As [`Self::Any`], and the prefix is followed by an uppercase letter.
  #[default]
  Camel,
  /// The list is a single regular expression. Its match at the start of
  /// the word is the prefix.
  Regex,
}

#[derive(Debug, Clone)]
enum Matcher {
  Literal {
    prefixes: Vec<String>,
    camel:    bool,
  },
  Regex(Regex),
  Never,
}

/// Compiled prefix list.
#[derive(Debug, Clone)]
pub struct PrefixMatcher {
  matcher: Matcher,
}

impl Default for PrefixMatcher {
  fn default() -> Self {
    Self::never()
  }
}

impl PrefixMatcher {
  /// Builds a matcher from `text`, a `|` separated prefix list or, for
  /// [`PrefixPatternType::Regex`], a regular expression.
  pub fn new(pattern_type: PrefixPatternType, text: &str) -> Result<Self> {
    let matcher = match pattern_type {
      PrefixPatternType::Any | PrefixPatternType::Camel => {
        Matcher::Literal {
          prefixes: split_prefixes(text),
          camel:    pattern_type == PrefixPatternType::Camel,
        }
      },
      PrefixPatternType::Regex if text.is_empty() => Matcher::Never,
      PrefixPatternType::Regex => {
        let regex = Regex::new(text).map_err(|err| {
          PatternError::Prefix {
            pattern: text.to_owned(),
            source:  Box::new(err),
          }
        })?;
        Matcher::Regex(regex)
      },
    };
    Ok(Self { matcher })
  }

  /// Like [`Self::new`], but a pattern that does not compile is logged and
  /// yields a matcher that never matches.
  pub fn new_or_never(pattern_type: PrefixPatternType, text: &str) -> Self {
    Self::new(pattern_type, text).unwrap_or_else(|err| {
      warn!("{err}; prefixes will not match");
      Self::never()
    })
  }

  pub fn from_prefixes<I, S>(pattern_type: PrefixPatternType, prefixes: I) -> Result<Self>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let text = prefixes
      .into_iter()
      .map(|prefix| prefix.as_ref().to_owned())
      .collect::<Vec<_>>()
      .join("|");
    Self::new(pattern_type, &text)
  }

  pub const fn never() -> Self {
    Self {
      matcher: Matcher::Never,
    }
  }

  /// The prefix `word` starts with, if any.
  pub fn matched<'w>(&self, word: &'w str) -> Option<&'w str> {
    match &self.matcher {
      Matcher::Literal { prefixes, camel } => {
        prefixes.iter().find_map(|prefix| {
          let rest = word.strip_prefix(prefix.as_str())?;
          let next = rest.chars().next()?;
          (!*camel || next.is_uppercase()).then(|| &word[..prefix.len()])
        })
      },
      Matcher::Regex(regex) => {
        match regex.find(word) {
          Ok(Some(found)) if found.start() == 0 && found.end() > 0 => Some(found.as_str()),
          Ok(_) => None,
          Err(err) => {
            warn!(%word, "prefix pattern failed: {err}");
            None
          },
        }
      },
      Matcher::Never => None,
    }
  }

  pub fn is_match(&self, word: &str) -> bool {
    self.matched(word).is_some()
  }
}

fn split_prefixes(text: &str) -> Vec<String> {
  text
    .split(PREFIX_DELIMITER)
    .map(str::trim)
    .filter(|prefix| !prefix.is_empty())
    .map(str::to_owned)
    .collect()
}
