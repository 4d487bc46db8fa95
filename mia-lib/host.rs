//! Collaborators supplied by the host editor.
//!
//! The host owns the document, the carets and the fold state. The rest of
//! the crate only talks to it through the traits here, so any editor can be
//! plugged in. [`MemoryEditor`] is a plain in-memory implementation.

use std::rc::Rc;

use mia_core::text::TextExt;
use ropey::{
  Rope,
  RopeSlice,
};
use smallvec::SmallVec;

use crate::{
  position::Position,
  selection::{
    CursorId,
    Range,
  },
};

/// A collapsed fold covering `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FoldRegion {
  pub start: usize,
  pub end:   usize,
}

impl FoldRegion {
  pub fn new(start: usize, end: usize) -> Self {
    Self {
      start: start.min(end),
      end:   start.max(end),
    }
  }

  #[inline]
  pub fn contains(&self, offset: usize) -> bool {
    self.start <= offset && offset < self.end
  }
}

pub trait FoldingModel {
  /// The collapsed region containing `offset`, if any.
  fn collapsed_region_at(&self, offset: usize) -> Option<FoldRegion>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoFolds;

impl FoldingModel for NoFolds {
  fn collapsed_region_at(&self, _offset: usize) -> Option<FoldRegion> {
    None
  }
}

/// Collapsed regions kept sorted by start offset.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FoldRegions {
  regions: Vec<FoldRegion>,
}

impl FoldRegions {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn collapse(&mut self, region: FoldRegion) {
    let idx = self.regions.partition_point(|r| r.start < region.start);
    self.regions.insert(idx, region);
  }

  pub fn expand_all(&mut self) {
    self.regions.clear();
  }

  pub fn regions(&self) -> &[FoldRegion] {
    &self.regions
  }
}

impl FromIterator<FoldRegion> for FoldRegions {
  fn from_iter<T: IntoIterator<Item = FoldRegion>>(iter: T) -> Self {
    let mut folds = Self::new();
    iter.into_iter().for_each(|region| folds.collapse(region));
    folds
  }
}

impl FoldingModel for FoldRegions {
  fn collapsed_region_at(&self, offset: usize) -> Option<FoldRegion> {
    // Outermost region wins when regions nest.
    let idx = self.regions.partition_point(|r| r.start <= offset);
    self.regions[..idx]
      .iter()
      .filter(|r| r.contains(offset))
      .max_by_key(|r| r.end - r.start)
      .copied()
  }
}

/// Token boundaries reported by the host's lexer.
pub trait LexemeModel {
  fn is_lexeme_boundary(&self, offset: usize) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoLexemes;

impl LexemeModel for NoLexemes {
  fn is_lexeme_boundary(&self, _offset: usize) -> bool {
    false
  }
}

/// Lexeme boundaries as a sorted list of offsets.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LexemeBoundaries(pub Vec<usize>);

impl LexemeModel for LexemeBoundaries {
  fn is_lexeme_boundary(&self, offset: usize) -> bool {
    self.0.binary_search(&offset).is_ok()
  }
}

/// Notifications the host delivers while carets change.
///
/// They are delivered synchronously, possibly from inside a call the
/// listener itself made into the [`CaretModel`].
pub trait CaretListener {
  fn caret_position_changed(&self, editor: &mut dyn CaretModel, caret: CursorId);
  fn caret_removed(&self, _caret: CursorId) {}
}

/// The host's carets and selections.
///
/// A selection's `anchor` is the lead end that stays put while it is
/// extended. The caret offset is tracked separately: for line selections it
/// usually sits inside the selection rather than on one of its ends.
pub trait CaretModel {
  fn text(&self) -> RopeSlice<'_>;
  /// All carets in document order.
  fn carets(&self) -> SmallVec<[CursorId; 4]>;
  fn primary_caret(&self) -> CursorId;
  fn offset(&self, caret: CursorId) -> usize;
  fn selection(&self, caret: CursorId) -> Range;
  fn set_selection(&mut self, caret: CursorId, selection: Range);
  /// Moves the caret, keeping its selection.
  fn move_to_offset(&mut self, caret: CursorId, offset: usize);

  fn folding_model(&self) -> &dyn FoldingModel {
    &NoFolds
  }

  fn lexeme_model(&self) -> &dyn LexemeModel {
    &NoLexemes
  }

  fn caret_count(&self) -> usize {
    self.carets().len()
  }

  fn has_selection(&self, caret: CursorId) -> bool {
    !self.selection(caret).is_empty()
  }

  /// The fixed end of the selection, or the caret offset without one.
  fn lead_selection_offset(&self, caret: CursorId) -> usize {
    let selection = self.selection(caret);
    if selection.is_empty() {
      self.offset(caret)
    } else {
      selection.anchor
    }
  }

  fn remove_selection(&mut self, caret: CursorId) {
    let offset = self.offset(caret);
    self.set_selection(caret, Range::point(offset));
  }

  fn position(&self, caret: CursorId) -> Position {
    Position::from_offset(self.text(), self.offset(caret))
  }

  fn move_to_position(&mut self, caret: CursorId, pos: Position) {
    let offset = pos.to_offset(self.text());
    self.move_to_offset(caret, offset);
  }
}

#[derive(Debug, Clone, Copy)]
struct CaretState {
  id:        CursorId,
  offset:    usize,
  selection: Range,
}

/// In-memory [`CaretModel`] over a [`Rope`].
pub struct MemoryEditor {
  text:     Rope,
  carets:   SmallVec<[CaretState; 4]>,
  primary:  CursorId,
  folds:    FoldRegions,
  lexemes:  LexemeBoundaries,
  listener: Option<Rc<dyn CaretListener>>,
}

impl MemoryEditor {
  /// A single caret at offset 0.
  pub fn new(text: &str) -> Self {
    let primary = CursorId::fresh();
    Self {
      text: Rope::from(text),
      carets: SmallVec::from_elem(
        CaretState {
          id:        primary,
          offset:    0,
          selection: Range::point(0),
        },
        1,
      ),
      primary,
      folds: FoldRegions::new(),
      lexemes: LexemeBoundaries::default(),
      listener: None,
    }
  }

  pub fn set_listener(&mut self, listener: Rc<dyn CaretListener>) {
    self.listener = Some(listener);
  }

  pub fn folds_mut(&mut self) -> &mut FoldRegions {
    &mut self.folds
  }

  pub fn set_lexeme_boundaries(&mut self, boundaries: Vec<usize>) {
    let mut boundaries = boundaries;
    boundaries.sort_unstable();
    self.lexemes = LexemeBoundaries(boundaries);
  }

  pub fn add_caret(&mut self, offset: usize) -> CursorId {
    let id = CursorId::fresh();
    let offset = offset.min(self.text.len_chars());
    self.carets.push(CaretState {
      id,
      offset,
      selection: Range::point(offset),
    });
    id
  }

  /// Removes a secondary caret. The primary caret cannot be removed.
  pub fn remove_caret(&mut self, caret: CursorId) -> bool {
    if caret == self.primary {
      return false;
    }
    let before = self.carets.len();
    self.carets.retain(|state| state.id != caret);
    let removed = self.carets.len() != before;
    if removed && let Some(listener) = self.listener.clone() {
      listener.caret_removed(caret);
    }
    removed
  }

  pub fn selected_text(&self, caret: CursorId) -> String {
    let selection = self.selection(caret);
    self.text.slice(..).to_text(selection.from(), selection.to())
  }

  fn state(&self, caret: CursorId) -> Option<&CaretState> {
    self.carets.iter().find(|state| state.id == caret)
  }

  fn state_mut(&mut self, caret: CursorId) -> Option<&mut CaretState> {
    self.carets.iter_mut().find(|state| state.id == caret)
  }
}

impl CaretModel for MemoryEditor {
  fn text(&self) -> RopeSlice<'_> {
    self.text.slice(..)
  }

  fn carets(&self) -> SmallVec<[CursorId; 4]> {
    let mut carets: SmallVec<[(usize, CursorId); 4]> =
      self.carets.iter().map(|state| (state.offset, state.id)).collect();
    carets.sort_unstable();
    carets.into_iter().map(|(_, id)| id).collect()
  }

  fn primary_caret(&self) -> CursorId {
    self.primary
  }

  fn offset(&self, caret: CursorId) -> usize {
    self.state(caret).map_or(0, |state| state.offset)
  }

  fn selection(&self, caret: CursorId) -> Range {
    self
      .state(caret)
      .map_or(Range::point(0), |state| state.selection)
  }

  fn set_selection(&mut self, caret: CursorId, selection: Range) {
    let selection = selection.clamp(self.text.len_chars());
    if let Some(state) = self.state_mut(caret) {
      state.selection = selection;
    }
  }

  fn move_to_offset(&mut self, caret: CursorId, offset: usize) {
    let offset = offset.min(self.text.len_chars());
    let moved = match self.state_mut(caret) {
      Some(state) if state.offset != offset => {
        state.offset = offset;
        true
      },
      _ => false,
    };
    if moved && let Some(listener) = self.listener.clone() {
      listener.caret_position_changed(self, caret);
    }
  }

  fn folding_model(&self) -> &dyn FoldingModel {
    &self.folds
  }

  fn lexeme_model(&self) -> &dyn LexemeModel {
    &self.lexemes
  }
}

#[cfg(test)]
mod test {
  use std::cell::RefCell;

  use super::*;

  #[test]
  fn test_collapsed_region_at() {
    let folds: FoldRegions = [FoldRegion::new(5, 10), FoldRegion::new(2, 20), FoldRegion::new(30, 32)]
      .into_iter()
      .collect();
    assert_eq!(folds.collapsed_region_at(1), None);
    assert_eq!(folds.collapsed_region_at(6), Some(FoldRegion::new(2, 20)));
    assert_eq!(folds.collapsed_region_at(30), Some(FoldRegion::new(30, 32)));
    assert_eq!(folds.collapsed_region_at(32), None);
  }

  #[test]
  fn test_carets_in_document_order() {
    let mut editor = MemoryEditor::new("hello world");
    let primary = editor.primary_caret();
    editor.move_to_offset(primary, 8);
    let second = editor.add_caret(3);
    assert_eq!(editor.carets().as_slice(), &[second, primary]);
    assert!(!editor.remove_caret(primary));
    assert!(editor.remove_caret(second));
    assert_eq!(editor.caret_count(), 1);
  }

  #[test]
  fn test_selection_and_lead() {
    let mut editor = MemoryEditor::new("hello world");
    let caret = editor.primary_caret();
    editor.move_to_offset(caret, 2);
    assert_eq!(editor.lead_selection_offset(caret), 2);
    editor.set_selection(caret, Range::new(7, 2));
    assert!(editor.has_selection(caret));
    assert_eq!(editor.lead_selection_offset(caret), 7);
    assert_eq!(editor.selected_text(caret), "llo w");
    editor.move_to_position(caret, Position::new(0, 99));
    assert_eq!(editor.offset(caret), 11);
    assert_eq!(editor.selection(caret), Range::new(7, 2));
  }

  struct Recorder(RefCell<Vec<usize>>);

  impl CaretListener for Recorder {
    fn caret_position_changed(&self, editor: &mut dyn CaretModel, caret: CursorId) {
      self.0.borrow_mut().push(editor.offset(caret));
    }
  }

  #[test]
  fn listener_sees_moves() {
    let recorder = Rc::new(Recorder(RefCell::new(Vec::new())));
    let mut editor = MemoryEditor::new("abc");
    editor.set_listener(recorder.clone());
    let caret = editor.primary_caret();
    editor.move_to_offset(caret, 2);
    editor.move_to_offset(caret, 2);
    editor.move_to_offset(caret, 10);
    assert_eq!(*recorder.0.borrow(), vec![2, 3]);
  }
}
