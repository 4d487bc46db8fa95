use ropey::RopeSlice;

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum LineEnding {
  /// CarriageReturn followed by LineFeed.
  Crlf,

  /// U+000A -- LineFeed
  LF,

  /// U+000B -- VerticalTab
  VT,

  /// U+000C -- FormFeed
  FF,

  /// U+000D -- CarriageReturn
  CR,

  /// U+0085 -- NextLine
  Nel,

  /// U+2028 -- Line Separator
  LS,

  /// U+2029 -- ParagraphSeparator
  PS,
}

impl LineEnding {
  #[inline]
  pub const fn len_chars(&self) -> usize {
    match self {
      Self::Crlf => 2,
      _ => 1,
    }
  }

  #[inline]
  pub const fn from_char(ch: char) -> Option<LineEnding> {
    match ch {
      '\u{000A}' => Some(LineEnding::LF),
      '\u{000B}' => Some(LineEnding::VT),
      '\u{000C}' => Some(LineEnding::FF),
      '\u{000D}' => Some(LineEnding::CR),
      '\u{0085}' => Some(LineEnding::Nel),
      '\u{2028}' => Some(LineEnding::LS),
      '\u{2029}' => Some(LineEnding::PS),
      // Not a line ending
      _ => None,
    }
  }
}

/// Returns the line ending that terminates `line`, if any.
pub fn get_line_ending(line: RopeSlice) -> Option<LineEnding> {
  let len = line.len_chars();
  let last = line.get_char(len.checked_sub(1)?)?;
  if last == '\n' && len >= 2 && line.get_char(len - 2) == Some('\r') {
    return Some(LineEnding::Crlf);
  }
  LineEnding::from_char(last)
}

/// Normalizes every line ending in `text` to `\n`.
pub fn normalize_line_endings(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  let mut chars = text.chars().peekable();
  while let Some(ch) = chars.next() {
    match ch {
      '\r' => {
        if chars.peek() == Some(&'\n') {
          chars.next();
        }
        out.push('\n');
      },
      '\n' | '\u{0085}' | '\u{2028}' | '\u{2029}' => out.push('\n'),
      ch => out.push(ch),
    }
  }
  out
}

#[cfg(test)]
mod test {
  use ropey::Rope;

  use super::*;

  #[test]
  fn line_endings_of_lines() {
    let text = Rope::from("a\r\nb\nc\rd");
    let slice = text.slice(..);
    assert_eq!(get_line_ending(slice.line(0)), Some(LineEnding::Crlf));
    assert_eq!(get_line_ending(slice.line(1)), Some(LineEnding::LF));
    assert_eq!(get_line_ending(slice.line(2)), Some(LineEnding::CR));
    assert_eq!(get_line_ending(slice.line(3)), None);
  }

  #[test]
  fn normalize() {
    assert_eq!(normalize_line_endings("a\r\nb\rc\nd"), "a\nb\nc\nd");
    assert_eq!(normalize_line_endings("\r\r\n"), "\n\n");
    assert_eq!(normalize_line_endings("plain"), "plain");
  }
}
