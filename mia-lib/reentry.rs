//! Single-threaded re-entrancy guard.
//!
//! Listener code that mutates the carets it is listening to would otherwise
//! be called back for its own mutations. Wrapping those mutations in a
//! [`ReEntryGuard`] scope lets the listener recognise and skip them.
//!
//! ```ignore
//! let guard = ReEntryGuard::new();
//! {
//!   let _scope = guard.enter();
//!   assert!(!guard.is_unguarded());
//!   guard.on_exit(|| println!("flushed"));
//! }
//! // "flushed" has been printed.
//! ```

use std::{
  cell::{
    Cell,
    RefCell,
  },
  fmt,
  rc::Rc,
};

use tracing::trace;

type Callback = Box<dyn FnOnce()>;

#[derive(Default)]
struct GuardState {
  depth:   Cell<usize>,
  on_exit: RefCell<Vec<Callback>>,
}

/// Counting guard. Clones share the same counter.
#[derive(Clone, Default)]
pub struct ReEntryGuard {
  state: Rc<GuardState>,
}

impl fmt::Debug for ReEntryGuard {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ReEntryGuard")
      .field("depth", &self.state.depth.get())
      .field("on_exit", &self.state.on_exit.borrow().len())
      .finish()
  }
}

/// Scope returned by [`ReEntryGuard::enter`]. Leaving the outermost scope
/// runs the queued on-exit callbacks.
#[must_use = "the guard is released as soon as the scope is dropped"]
pub struct GuardScope {
  state: Rc<GuardState>,
}

impl Drop for GuardScope {
  fn drop(&mut self) {
    let depth = self.state.depth.get().saturating_sub(1);
    self.state.depth.set(depth);
    if depth == 0 {
      flush(&self.state);
    }
  }
}

/// Holds the guard without flushing on release.
struct Hold<'a>(&'a Cell<usize>);

impl<'a> Hold<'a> {
  fn new(depth: &'a Cell<usize>) -> Self {
    depth.set(depth.get() + 1);
    Self(depth)
  }
}

impl Drop for Hold<'_> {
  fn drop(&mut self) {
    self.0.set(self.0.get().saturating_sub(1));
  }
}

fn flush(state: &GuardState) {
  loop {
    // Callbacks may queue more callbacks; the borrow is released before
    // running them.
    let pending = std::mem::take(&mut *state.on_exit.borrow_mut());
    if pending.is_empty() {
      break;
    }
    trace!(count = pending.len(), "running guard exit callbacks");
    pending.into_iter().for_each(|callback| callback());
  }
}

impl ReEntryGuard {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn enter(&self) -> GuardScope {
    self.state.depth.set(self.state.depth.get() + 1);
    GuardScope {
      state: Rc::clone(&self.state),
    }
  }

  #[inline]
  pub fn is_unguarded(&self) -> bool {
    self.state.depth.get() == 0
  }

  #[inline]
  pub fn depth(&self) -> usize {
    self.state.depth.get()
  }

  /// Runs `f` with the guard held.
  pub fn guard<R>(&self, f: impl FnOnce() -> R) -> R {
    let _scope = self.enter();
    f()
  }

  /// Runs `f` with the guard held if nobody holds it yet. Otherwise queues
  /// `on_exit`, if given, to run when the guard is released.
  ///
  /// Returns whether `f` ran. Leaving this call never flushes the queue.
  pub fn if_unguarded(&self, f: impl FnOnce(), on_exit: Option<Box<dyn FnOnce()>>) -> bool {
    if self.is_unguarded() {
      let _hold = Hold::new(&self.state.depth);
      f();
      true
    } else {
      if let Some(callback) = on_exit {
        self.state.on_exit.borrow_mut().push(callback);
      }
      false
    }
  }

  /// Queues `f` to run when the guard is released, or runs it right away
  /// when unguarded.
  pub fn on_exit(&self, f: impl FnOnce() + 'static) {
    if self.is_unguarded() {
      f();
    } else {
      self.state.on_exit.borrow_mut().push(Box::new(f));
    }
  }
}
