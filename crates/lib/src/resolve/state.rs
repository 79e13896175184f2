//! Process-wide import state.
//!
//! `visited` records directories whose definition finished evaluating and
//! only ever grows. `active` is the chain of directories currently being
//! evaluated and exists purely for cycle detection.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::trace;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ImportState {
  visited: BTreeSet<PathBuf>,
  active: Vec<PathBuf>,
}

/// Outcome of entering a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
  /// The directory is already the innermost one being evaluated: a unit is
  /// referencing a sibling from the same definition.
  SameDirectory,
  Pushed,
}

/// Entering the directory would close a loop. `chain` is the active stack
/// from the bottom up, followed by the directory that repeats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleDetected {
  pub chain: Vec<PathBuf>,
}

impl ImportState {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_visited(&self, directory: &Path) -> bool {
    self.visited.contains(directory)
  }

  pub fn mark_visited(&mut self, directory: &Path) {
    self.visited.insert(directory.to_path_buf());
  }

  pub fn visited(&self) -> &BTreeSet<PathBuf> {
    &self.visited
  }

  pub fn active(&self) -> &[PathBuf] {
    &self.active
  }

  pub fn top(&self) -> Option<&Path> {
    self.active.last().map(PathBuf::as_path)
  }

  /// Check `directory` against the active chain, then push it.
  ///
  /// The check always happens before the push, so a directory is on the
  /// stack at most once.
  pub fn enter(&mut self, directory: &Path) -> Result<Entry, CycleDetected> {
    if self.top() == Some(directory) {
      return Ok(Entry::SameDirectory);
    }
    if self.active.iter().any(|d| d == directory) {
      let mut chain = self.active.clone();
      chain.push(directory.to_path_buf());
      return Err(CycleDetected { chain });
    }
    trace!(directory = %directory.display(), depth = self.active.len(), "entering");
    self.active.push(directory.to_path_buf());
    Ok(Entry::Pushed)
  }

  pub fn leave(&mut self, directory: &Path) {
    if let Some(pos) = self.active.iter().rposition(|d| d == directory) {
      self.active.remove(pos);
    }
  }
}

/// Marks a directory as being evaluated for as long as the guard lives.
///
/// Dropping the guard pops the directory, including when evaluation bails
/// out with an error.
#[derive(Debug)]
pub struct ActiveGuard<'a> {
  state: &'a RefCell<ImportState>,
  directory: PathBuf,
}

impl<'a> ActiveGuard<'a> {
  /// Enter `directory`. Yields `None` for a same-directory reference, which
  /// must not push or pop anything.
  pub fn enter(state: &'a RefCell<ImportState>, directory: &Path) -> Result<Option<Self>, CycleDetected> {
    match state.borrow_mut().enter(directory)? {
      Entry::SameDirectory => Ok(None),
      Entry::Pushed => Ok(Some(Self {
        state,
        directory: directory.to_path_buf(),
      })),
    }
  }
}

impl Drop for ActiveGuard<'_> {
  fn drop(&mut self) {
    if let Ok(mut state) = self.state.try_borrow_mut() {
      state.leave(&self.directory);
    }
  }
}
