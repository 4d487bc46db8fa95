//! Clipboard contents split per caret.
//!
//! A copy with several carets puts every caret's text into the clipboard
//! along with the range each one occupies. [`ClipboardCaretContent`] splits
//! that back into segments, and knows whether each segment is a run of whole
//! lines, a multi line fragment or plain characters, which is what the paste
//! and duplicate actions need.

use std::ops::Range;

use tracing::trace;

use crate::selection;

const SEPARATOR: char = '\n';

/// Text as it travels through the clipboard: the full text plus the char
/// range each caret contributed. No ranges means one caret.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClipboardTransfer {
  pub text:   String,
  pub carets: Vec<Range<usize>>,
}

impl ClipboardTransfer {
  pub fn new(text: impl Into<String>) -> Self {
    Self {
      text:   text.into(),
      carets: Vec::new(),
    }
  }

  pub fn with_carets(text: impl Into<String>, carets: Vec<Range<usize>>) -> Self {
    Self {
      text: text.into(),
      carets,
    }
  }

  /// The text each caret contributed.
  fn segments(&self) -> Vec<String> {
    if self.carets.is_empty() {
      return vec![self.text.clone()];
    }
    let len = self.text.chars().count();
    self
      .carets
      .iter()
      .map(|range| {
        let end = range.end.min(len);
        let start = range.start.min(end);
        self.text.chars().skip(start).take(end - start).collect()
      })
      .collect()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
  /// No line break inside.
  Char,
  /// Spans lines but does not end with a line break.
  CharLine,
  /// Ends with a line break.
  FullLine,
}

impl SegmentKind {
  pub fn of(text: &str) -> Self {
    if text.ends_with(SEPARATOR) {
      Self::FullLine
    } else if text.contains(SEPARATOR) {
      Self::CharLine
    } else {
      Self::Char
    }
  }
}

/// `\r\n` and lone `\r` become `\n`.
pub fn normalize_line_separators(text: &str) -> String {
  text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Lines in `text`, not counting an empty line after a final break.
pub fn line_count(text: &str) -> usize {
  if text.is_empty() {
    return 0;
  }
  let breaks = text.matches(SEPARATOR).count();
  if text.ends_with(SEPARATOR) {
    breaks
  } else {
    breaks + 1
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardCaretContent {
  texts:      Vec<String>,
  kinds:      Vec<SegmentKind>,
  ranges:     Vec<Range<usize>>,
  line_count: usize,
}

impl ClipboardCaretContent {
  pub fn study(transfer: &ClipboardTransfer) -> Self {
    let texts: Vec<String> = transfer
      .segments()
      .iter()
      .map(|segment| normalize_line_separators(segment))
      .collect();

    let mut offset = 0;
    let ranges = texts
      .iter()
      .map(|text| {
        let start = offset;
        offset += text.chars().count();
        start..offset
      })
      .collect();

    let content = Self {
      kinds: texts.iter().map(|text| SegmentKind::of(text)).collect(),
      texts,
      ranges,
      line_count: line_count(&normalize_line_separators(&transfer.text)),
    };
    trace!(
      carets = content.caret_count(),
      lines = content.line_count,
      "studied clipboard"
    );
    content
  }

  pub fn caret_count(&self) -> usize {
    self.texts.len()
  }

  pub fn line_count(&self) -> usize {
    self.line_count
  }

  pub fn texts(&self) -> &[String] {
    &self.texts
  }

  pub fn text(&self, index: usize) -> Option<&str> {
    self.texts.get(index).map(String::as_str)
  }

  pub fn kind(&self, index: usize) -> Option<SegmentKind> {
    self.kinds.get(index).copied()
  }

  /// Char range of each segment in the normalised text.
  pub fn ranges(&self) -> &[Range<usize>] {
    &self.ranges
  }

  pub fn is_full_line(&self, index: usize) -> bool {
    self.kind(index) == Some(SegmentKind::FullLine)
  }

  pub fn is_char_line(&self, index: usize) -> bool {
    self.kind(index) == Some(SegmentKind::CharLine)
  }

  pub fn has_full_lines(&self) -> bool {
    self.kinds.contains(&SegmentKind::FullLine)
  }

  pub fn has_char_lines(&self) -> bool {
    self.kinds.contains(&SegmentKind::CharLine)
  }

  /// Where each segment will land when pasted at `carets`, given as caret
  /// offset and selection in caret order. Selections are replaced, so each
  /// one shifts the carets after it.
  pub fn paste_ranges(
    &self,
    carets: impl IntoIterator<Item = (usize, selection::Range)>,
  ) -> Vec<Range<usize>> {
    let mut shift = 0isize;
    carets
      .into_iter()
      .zip(&self.texts)
      .map(|((offset, selection), text)| {
        let (start, end) = (selection.from(), selection.to());
        let offset = if offset > start && start != end {
          if offset <= end { start } else { offset - (end - start) }
        } else {
          offset
        };
        let len = text.chars().count();
        let pasted = offset.saturating_add_signed(shift);
        shift += len as isize - (end - start) as isize;
        pasted..pasted + len
      })
      .collect()
  }
}

/// Joins several clipboard entries into one, one caret per segment.
///
/// With `merge_carets` runs of plain character segments collapse into a
/// single caret, one segment per line, and multi line fragments gain a line
/// break when any entry holds whole lines.
pub fn merge(contents: &[ClipboardTransfer], merge_carets: bool) -> ClipboardTransfer {
  let studied: Vec<ClipboardCaretContent> =
    contents.iter().map(ClipboardCaretContent::study).collect();

  let merge_char_lines = merge_carets && studied.iter().any(|c| c.has_full_lines());
  let merge_chars =
    merge_carets && studied.iter().any(|c| c.has_full_lines() || c.has_char_lines());

  let mut merged = Merged::default();
  for content in &studied {
    let mut pending: Option<usize> = None;
    for (i, text) in content.texts.iter().enumerate() {
      match content.kinds[i] {
        SegmentKind::FullLine => {
          if let Some(first) = pending.take() {
            merged.push_chars(&content.texts[first..i], first == 0, merge_char_lines);
          }
          merged.push(text);
        },
        SegmentKind::CharLine => {
          if let Some(first) = pending.take() {
            merged.push_chars(&content.texts[first..i], first == 0, merge_char_lines);
          }
          let end = merged.push(text);
          merged.push_separator();
          if merge_char_lines {
            merged.extend_last(end + 1);
          }
        },
        SegmentKind::Char if merge_chars => {
          pending.get_or_insert(i);
        },
        SegmentKind::Char => {
          merged.push(text);
          merged.push_separator();
        },
      }
    }
    if let Some(first) = pending.take() {
      merged.push_chars(&content.texts[first..], first == 0, merge_char_lines);
    }
  }

  ClipboardTransfer::with_carets(merged.text, merged.carets)
}

#[derive(Debug, Default)]
struct Merged {
  text:   String,
  len:    usize,
  carets: Vec<Range<usize>>,
}

impl Merged {
  /// Appends `text` as its own caret and returns the new length.
  fn push(&mut self, text: &str) -> usize {
    let start = self.len;
    self.text.push_str(text);
    self.len += text.chars().count();
    self.carets.push(start..self.len);
    self.len
  }

  fn push_separator(&mut self) {
    self.text.push(SEPARATOR);
    self.len += 1;
  }

  fn extend_last(&mut self, end: usize) {
    if let Some(last) = self.carets.last_mut() {
      last.end = end;
    }
  }

  /// Appends character segments as one caret, one segment per line.
  fn push_chars(&mut self, texts: &[String], at_start: bool, line_end: bool) {
    if texts.is_empty() {
      return;
    }
    let start = self.len;
    for (i, text) in texts.iter().enumerate() {
      if i > 0 || !at_start {
        self.push_separator();
      }
      self.text.push_str(text);
      self.len += text.chars().count();
    }
    if line_end {
      self.push_separator();
    }
    self.carets.push(start..self.len);
  }
}

/// One clipboard entry per segment. Segments that are not whole lines get a
/// trailing line break outside their caret range.
pub fn split(content: &ClipboardTransfer) -> Vec<ClipboardTransfer> {
  let studied = ClipboardCaretContent::study(content);
  studied
    .texts
    .iter()
    .zip(&studied.kinds)
    .map(|(text, kind)| {
      let len = text.chars().count();
      match kind {
        SegmentKind::FullLine => ClipboardTransfer::with_carets(text.clone(), vec![0..len]),
        SegmentKind::CharLine | SegmentKind::Char => {
          ClipboardTransfer::with_carets(format!("{text}{SEPARATOR}"), vec![0..len])
        },
      }
    })
    .collect()
}
