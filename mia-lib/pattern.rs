use thiserror::Error;

pub type Result<T> = std::result::Result<T, PatternError>;

/// A user supplied regular expression that could not be compiled.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PatternError {
  #[error("invalid prefix pattern `{pattern}`: {source}")]
  Prefix {
    pattern: String,
    #[source]
    source:  Box<fancy_regex::Error>,
  },
  #[error("invalid delete pattern `{pattern}`: {source}")]
  Delete {
    pattern: String,
    #[source]
    source:  Box<regex_automata::meta::BuildError>,
  },
}

impl PatternError {
  pub fn pattern(&self) -> &str {
    match self {
      Self::Prefix { pattern, .. } | Self::Delete { pattern, .. } => pattern,
    }
  }
}
