//! Direction of caret movement and boundary scans.
//!
//! ```ignore
//! use mia_lib::{movement::Direction, selection::Range};
//!
//! let range = Range::new(5, 10);
//! assert_eq!(range.direction(), Direction::Forward);
//!
//! let backward = range.with_direction(Direction::Backward);
//! assert_eq!(backward.anchor, 10);
//! assert_eq!(backward.head, 5);
//! ```

use serde::Deserialize;

/// The direction of caret movement or selection extension.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
  /// Toward the end of the document (increasing offsets).
  Forward,
  /// Toward the start of the document (decreasing offsets).
  Backward,
}

impl Direction {
  #[inline]
  #[must_use]
  pub fn reverse(self) -> Self {
    match self {
      Self::Forward => Self::Backward,
      Self::Backward => Self::Forward,
    }
  }
}
