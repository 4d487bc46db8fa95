//! Line selection mode.
//!
//! A line selection is an ordinary selection whose ends sit at line starts,
//! together with the offset it was anchored at before being snapped to whole
//! lines. The [`LineSelectionManager`] tracks that state per caret and turns
//! a line selection back into a character selection as soon as the caret is
//! moved by anything other than the manager itself.

use std::{
  cell::{
    Cell,
    RefCell,
  },
  collections::HashMap,
};

use smallvec::SmallVec;
use tracing::debug;

use crate::{
  config::{
    LineSelectionConfig,
    MouseModifier,
  },
  host::{
    CaretListener,
    CaretModel,
  },
  position::Position,
  reentry::ReEntryGuard,
  selection::{
    CursorId,
    Range,
  },
};

/// Per-caret line selection state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LineSelectionState {
  /// Offset the selection grows from, before snapping to lines.
  pub anchor_offset: usize,
  pub is_line:       bool,
}

/// A line selection to apply to one caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSelection {
  pub start:           Position,
  pub end:             Position,
  /// Where the caret goes.
  pub caret:           Position,
  pub start_is_anchor: bool,
}

/// Host actions that need their selections adjusted around them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorAction {
  /// Left/right caret movement without selection.
  MoveLeftRight,
  /// Character, word or line-end movement extending the selection.
  CharMovementWithSelection,
  /// Up/down and page movement extending the selection.
  LineMovementWithSelection,
  /// Up/down and page movement without selection.
  LineMovement,
  /// Backspace, delete and cut.
  Delete,
  Paste,
  Undo,
}

type CaretColumns = SmallVec<[(CursorId, usize); 4]>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum AfterKind {
  ToLineRestoreColumns(CaretColumns),
  RestoreColumns(CaretColumns),
  RestoreColumnsAtLineStart(CaretColumns),
  MakeLineIfLooksIt,
}

/// Work left for after an action, returned by
/// [`LineSelectionManager::before_action`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct AfterAction {
  kind: AfterKind,
}

fn column_of(columns: &CaretColumns, caret: CursorId) -> Option<usize> {
  columns
    .iter()
    .find(|(id, _)| *id == caret)
    .map(|&(_, column)| column)
}

fn directed(start: usize, end: usize, start_is_anchor: bool) -> Range {
  if start_is_anchor {
    Range::new(start, end)
  } else {
    Range::new(end, start)
  }
}

/// Line selection state for the carets of one editor.
///
/// Register it with the host as a [`CaretListener`] so it sees caret moves.
/// Every caret or selection change it makes itself is done under its
/// [`ReEntryGuard`] and ignored when the host reports it back.
#[derive(Debug, Default)]
pub struct LineSelectionManager {
  config:        Cell<LineSelectionConfig>,
  primary_state: Cell<LineSelectionState>,
  states:        RefCell<HashMap<CursorId, LineSelectionState>>,
  mouse_anchor:  Cell<Option<usize>>,
  guard:         ReEntryGuard,
}

impl LineSelectionManager {
  pub fn new(config: LineSelectionConfig) -> Self {
    Self {
      config: Cell::new(config),
      ..Self::default()
    }
  }

  pub fn config(&self) -> LineSelectionConfig {
    self.config.get()
  }

  /// Applies new settings. Line selections are turned back into character
  /// selections first so no caret is left in a mode that no longer applies.
  pub fn set_config(&self, editor: &mut dyn CaretModel, config: LineSelectionConfig) {
    for caret in editor.carets() {
      if self.selection_state_if_exists(editor, caret).is_some_and(|s| s.is_line) {
        self.adjust_line_selection_to_character_selection(editor, caret, false);
      }
    }
    self.config.set(config);
  }

  /// State of `caret`, created on first use.
  pub fn selection_state(&self, editor: &dyn CaretModel, caret: CursorId) -> LineSelectionState {
    if caret == editor.primary_caret() {
      self.primary_state.get()
    } else {
      *self
        .states
        .borrow_mut()
        .entry(caret)
        .or_insert_with(|| LineSelectionState {
          anchor_offset: editor.lead_selection_offset(caret),
          is_line:       false,
        })
    }
  }

  pub fn selection_state_if_exists(
    &self,
    editor: &dyn CaretModel,
    caret: CursorId,
  ) -> Option<LineSelectionState> {
    if caret == editor.primary_caret() {
      Some(self.primary_state.get())
    } else {
      self.states.borrow().get(&caret).copied()
    }
  }

  pub fn set_selection_state(
    &self,
    editor: &dyn CaretModel,
    caret: CursorId,
    state: LineSelectionState,
  ) {
    if caret == editor.primary_caret() {
      self.primary_state.set(state);
    } else {
      self.states.borrow_mut().insert(caret, state);
    }
  }

  pub fn reset_selection_state(&self, editor: &dyn CaretModel, caret: CursorId) {
    if caret == editor.primary_caret() {
      self.primary_state.set(LineSelectionState::default());
    } else {
      self.states.borrow_mut().remove(&caret);
    }
  }

  pub fn guard<R>(&self, f: impl FnOnce() -> R) -> R {
    self.guard.guard(f)
  }

  pub fn if_unguarded(&self, f: impl FnOnce(), on_exit: Option<Box<dyn FnOnce()>>) -> bool {
    self.guard.if_unguarded(f, on_exit)
  }

  pub fn is_unguarded(&self) -> bool {
    self.guard.is_unguarded()
  }

  /// Selects whole lines for `caret` and marks it as a line selection
  /// anchored at `anchor_offset`.
  pub fn set_line_selection(
    &self,
    editor: &mut dyn CaretModel,
    caret: CursorId,
    selection: LineSelection,
    anchor_offset: usize,
  ) {
    let _scope = self.guard.enter();
    if selection.start == selection.end {
      editor.move_to_position(caret, selection.caret);
      let offset = editor.offset(caret);
      editor.set_selection(caret, Range::point(offset));
    } else {
      let text = editor.text();
      let start = selection.start.to_offset(text);
      let end = selection.end.to_offset(text);
      editor.set_selection(caret, directed(start, end, selection.start_is_anchor));
      editor.move_to_position(caret, selection.caret);
    }
    debug!(?caret, ?selection, anchor_offset, "line selection");
    self.set_selection_state(editor, caret, LineSelectionState {
      anchor_offset,
      is_line: true,
    });
  }

  /// Turns a line selection back into a character selection between its
  /// anchor and the caret. With `is_move_only` the selection is dropped and
  /// the anchor follows the caret.
  pub fn adjust_line_selection_to_character_selection(
    &self,
    editor: &mut dyn CaretModel,
    caret: CursorId,
    is_move_only: bool,
  ) {
    let _scope = self.guard.enter();
    let mut state = self.selection_state(editor, caret);
    let offset = editor.offset(caret);

    if is_move_only {
      editor.set_selection(caret, Range::point(offset));
      state.anchor_offset = offset;
    } else if state.is_line {
      editor.set_selection(caret, Range::new(state.anchor_offset, offset));
      debug!(?caret, anchor = state.anchor_offset, offset, "line selection to characters");
    }
    state.is_line = false;
    self.set_selection_state(editor, caret, state);
  }

  /// Grows a character selection to the lines it touches.
  ///
  /// A selection within one line is left alone unless `always_line` is set,
  /// in which case even a bare caret selects its line.
  pub fn adjust_character_selection_to_line_selection(
    &self,
    editor: &mut dyn CaretModel,
    caret: CursorId,
    always_line: bool,
  ) {
    let has_selection = editor.has_selection(caret);
    if !has_selection && !always_line {
      return;
    }
    let mut state = self.selection_state(editor, caret);
    if state.is_line {
      return;
    }

    let _scope = self.guard.enter();
    let text = editor.text();
    let selection = editor.selection(caret);
    let start = Position::from_offset(text, selection.from());
    let end = Position::from_offset(text, selection.to());

    if start.line == end.line && !always_line {
      state.is_line = false;
      self.set_selection_state(editor, caret, state);
      return;
    }

    let pos = editor.position(caret);
    let new_start = start.at_start_of_line();
    let new_end = if has_selection {
      end.at_end_of_line(text)
    } else {
      end.at_end_of_next_line(text)
    };
    let last_line = if new_end.column == 0 {
      new_end.line.saturating_sub(1).max(new_start.line)
    } else {
      new_end.line
    };

    let anchor_offset = editor.lead_selection_offset(caret);
    let start_is_anchor = anchor_offset <= editor.offset(caret);
    let caret_in_selection = self.config().caret_in_selection;
    let new_pos = match (start_is_anchor, caret_in_selection) {
      (true, true) => pos.on_line(last_line),
      (true, false) => pos.on_line(new_end.line),
      (false, true) => pos.on_line(new_start.line),
      (false, false) => pos.on_line(new_start.line.saturating_sub(1)),
    };

    self.set_line_selection(
      editor,
      caret,
      LineSelection {
        start: new_start,
        end: new_end,
        caret: new_pos,
        start_is_anchor,
      },
      anchor_offset,
    );
  }

  fn is_controlled_select(&self, ctrl: bool) -> bool {
    ctrl ^ (self.config().mouse_modifier == MouseModifier::CtrlLine)
  }

  fn mouse_enabled(&self) -> bool {
    let config = self.config();
    config.enabled && config.mouse_line_selection
  }

  /// A mouse press starts a new selection; a stale one is collapsed to its
  /// start so the host does not extend it.
  pub fn mouse_pressed(&self, editor: &mut dyn CaretModel) {
    if !self.mouse_enabled() || self.mouse_anchor.get().is_some() {
      return;
    }
    let caret = editor.primary_caret();
    if editor.has_selection(caret) {
      let start = editor.selection(caret).from();
      editor.move_to_offset(caret, start);
    }
  }

  /// The first drag records the anchor, later ones reshape the selection.
  pub fn mouse_dragged(&self, editor: &mut dyn CaretModel, ctrl: bool) {
    if !self.mouse_enabled() {
      return;
    }
    let caret = editor.primary_caret();
    match self.mouse_anchor.get() {
      None => self.mouse_anchor.set(Some(editor.lead_selection_offset(caret))),
      Some(anchor) => {
        self.adjust_mouse_selection(editor, anchor, self.is_controlled_select(ctrl), false)
      },
    }
  }

  pub fn mouse_released(&self, editor: &mut dyn CaretModel, ctrl: bool) {
    if let Some(anchor) = self.mouse_anchor.get()
      && self.mouse_enabled()
      && editor.has_selection(editor.primary_caret())
    {
      self.adjust_mouse_selection(editor, anchor, self.is_controlled_select(ctrl), true);
    }
    self.mouse_anchor.set(None);
  }

  pub fn mouse_anchor(&self) -> Option<usize> {
    self.mouse_anchor.get()
  }

  /// Shapes the primary caret's selection between `mouse_anchor` and the
  /// caret: characters within a line or with `always_char`, whole lines
  /// otherwise. The final adjustment also places the caret inside or
  /// outside the selection.
  pub fn adjust_mouse_selection(
    &self,
    editor: &mut dyn CaretModel,
    mouse_anchor: usize,
    always_char: bool,
    final_adjustment: bool,
  ) {
    let caret = editor.primary_caret();
    let offset = editor.offset(caret);
    let text = editor.text();
    let pos = Position::from_offset(text, offset);

    let start_is_anchor = mouse_anchor <= offset;
    let start = Position::from_offset(text, mouse_anchor.min(offset));
    let end = Position::from_offset(text, mouse_anchor.max(offset));
    // the anchor's line is always selected
    let mut new_start = start.at_start_of_line().to_offset(text);
    let mut new_end = if start_is_anchor {
      end.at_start_of_line()
    } else {
      end.at_end_of_line(text)
    }
    .to_offset(text);

    let mut state = self.selection_state(editor, caret);
    state.anchor_offset = mouse_anchor;

    let _scope = self.guard.enter();
    if start.line == end.line || always_char {
      editor.set_selection(caret, Range::new(mouse_anchor, offset));
      editor.move_to_position(caret, pos);
      state.is_line = false;
    } else if editor.has_selection(caret) {
      if final_adjustment {
        let caret_in_selection = self.config().caret_in_selection;
        let new_pos = match (start_is_anchor, caret_in_selection) {
          (true, true) => pos.on_line(end.line.saturating_sub(1)),
          (true, false) => pos.on_line(end.line),
          (false, true) => pos.on_line(start.line),
          (false, false) => pos.on_line(start.line.saturating_sub(1)),
        };
        editor.move_to_position(caret, new_pos);
        state.is_line = true;

        // the caret's end of the selection follows where the caret landed
        let placed = editor.position(caret);
        let free_line = if start_is_anchor { end.line } else { start.line };
        let line = if placed.line < free_line {
          placed.line + 1
        } else {
          placed.line
        };
        let bound = Position::new(line, 0).to_offset(editor.text());
        if start_is_anchor {
          new_end = bound;
        } else {
          new_start = bound;
        }
      }
      editor.set_selection(caret, directed(new_start, new_end, start_is_anchor));
    }
    debug!(?caret, mouse_anchor, offset, is_line = state.is_line, "mouse selection");
    self.set_selection_state(editor, caret, state);
  }

  /// Before character or word movement that extends the selection: line
  /// selections become character selections.
  pub fn before_char_movement(&self, editor: &mut dyn CaretModel) {
    let _scope = self.guard.enter();
    if !editor.carets().iter().any(|&caret| editor.has_selection(caret)) {
      return;
    }
    for caret in editor.carets() {
      if self.is_line_caret(editor, caret) {
        self.adjust_line_selection_to_character_selection(editor, caret, false);
      }
    }
  }

  /// Before plain left/right movement: line selections are dropped.
  pub fn before_plain_movement(&self, editor: &mut dyn CaretModel) {
    if !self.config().left_right_movement {
      return;
    }
    let _scope = self.guard.enter();
    for caret in editor.carets() {
      if self.is_line_caret(editor, caret) {
        self.adjust_line_selection_to_character_selection(editor, caret, true);
      }
    }
  }

  /// After undo: a selection starting and ending at line starts is taken to
  /// be a line selection.
  pub fn after_undo(&self, editor: &mut dyn CaretModel) {
    let _scope = self.guard.enter();
    for caret in editor.carets() {
      let selection = editor.selection(caret);
      if selection.is_empty() {
        continue;
      }
      let text = editor.text();
      let start = Position::from_offset(text, selection.from());
      let end = Position::from_offset(text, selection.to());
      if start.column == 0 && end.column == 0 {
        let mut state = self.selection_state(editor, caret);
        state.is_line = true;
        self.set_selection_state(editor, caret, state);
      }
    }
  }

  fn is_line_caret(&self, editor: &dyn CaretModel, caret: CursorId) -> bool {
    editor.has_selection(caret)
      && self
        .selection_state_if_exists(editor, caret)
        .is_some_and(|state| state.is_line)
  }

  fn caret_columns(&self, editor: &dyn CaretModel, only_line: bool) -> CaretColumns {
    editor
      .carets()
      .into_iter()
      .filter(|&caret| !only_line || self.is_line_caret(editor, caret))
      .map(|caret| (caret, editor.position(caret).column))
      .collect()
  }

  /// Prepares the carets for `action` and returns what is left to do once
  /// the host has run it.
  pub fn before_action(
    &self,
    editor: &mut dyn CaretModel,
    action: EditorAction,
  ) -> Option<AfterAction> {
    let config = self.config();
    if !config.enabled {
      return None;
    }

    let _scope = self.guard.enter();
    let kind = match action {
      EditorAction::MoveLeftRight => {
        self.before_plain_movement(editor);
        return None;
      },
      EditorAction::CharMovementWithSelection => {
        self.before_char_movement(editor);
        return None;
      },
      EditorAction::LineMovementWithSelection if config.up_down_selection => {
        let columns = self.caret_columns(editor, false);
        for caret in editor.carets() {
          if self.is_line_caret(editor, caret) {
            self.adjust_line_selection_to_character_selection(editor, caret, false);
          }
        }
        AfterKind::ToLineRestoreColumns(columns)
      },
      EditorAction::Delete if config.delete_operations => {
        let columns = self.caret_columns(editor, true);
        if columns.is_empty() {
          return None;
        }
        AfterKind::RestoreColumns(columns)
      },
      EditorAction::LineMovement if config.up_down_movement => {
        AfterKind::RestoreColumns(self.caret_columns(editor, false))
      },
      EditorAction::Paste => {
        let columns = self.caret_columns(editor, false);
        for caret in editor.carets() {
          if self.is_line_caret(editor, caret) {
            let start = editor.selection(caret).from();
            editor.move_to_offset(caret, start);
          }
        }
        AfterKind::RestoreColumnsAtLineStart(columns)
      },
      EditorAction::Undo => AfterKind::MakeLineIfLooksIt,
      EditorAction::LineMovementWithSelection
      | EditorAction::Delete
      | EditorAction::LineMovement => return None,
    };
    Some(AfterAction { kind })
  }

  /// Finishes the work prepared by [`Self::before_action`].
  pub fn after_action(&self, editor: &mut dyn CaretModel, after: AfterAction) {
    if !self.config().enabled {
      return;
    }

    let _scope = self.guard.enter();
    match after.kind {
      AfterKind::ToLineRestoreColumns(columns) => {
        for caret in editor.carets() {
          if editor.has_selection(caret) {
            self.adjust_character_selection_to_line_selection(editor, caret, false);
          }
          if let Some(column) = column_of(&columns, caret) {
            let line = editor.position(caret).line;
            editor.move_to_position(caret, Position::new(line, column));
          }
        }
      },
      AfterKind::RestoreColumns(columns) => {
        for caret in editor.carets() {
          if let Some(column) = column_of(&columns, caret) {
            let line = editor.position(caret).line;
            editor.move_to_position(caret, Position::new(line, column));
          }
        }
      },
      AfterKind::RestoreColumnsAtLineStart(columns) => {
        for caret in editor.carets() {
          let pos = editor.position(caret);
          if pos.column == 0
            && let Some(column) = column_of(&columns, caret)
          {
            editor.move_to_position(caret, pos.at_column(column));
          }
        }
      },
      AfterKind::MakeLineIfLooksIt => self.after_undo(editor),
    }
  }
}

impl CaretListener for LineSelectionManager {
  fn caret_position_changed(&self, editor: &mut dyn CaretModel, caret: CursorId) {
    if !self.config().enabled || self.mouse_anchor.get().is_some() {
      return;
    }
    self.guard.if_unguarded(
      || {
        let is_move_only = !editor.has_selection(caret);
        self.adjust_line_selection_to_character_selection(editor, caret, is_move_only);
      },
      None,
    );
  }

  fn caret_removed(&self, caret: CursorId) {
    self.states.borrow_mut().remove(&caret);
  }
}
