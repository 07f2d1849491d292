//! Linear undo/redo over an immutable state value.
//!
//! The split between live updates and recorded checkpoints is what keeps
//! interactive dragging smooth: every pointer move replaces the live value,
//! while a single checkpoint lands on gesture release.

/// Generic undo/redo container.
///
/// The initial state always occupies checkpoint slot zero and is never
/// poppable. Any recorded mutation clears the redo stack (linear history).
#[derive(Debug, Clone)]
pub struct History<T: Clone> {
    live: T,
    checkpoints: Vec<T>,
    redo_stack: Vec<T>,
}

impl<T: Clone> History<T> {
    /// Create a history seeded with the initial state.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            live: initial.clone(),
            checkpoints: vec![initial],
            redo_stack: Vec::new(),
        }
    }

    /// The current live state.
    #[must_use]
    pub fn current(&self) -> &T {
        &self.live
    }

    /// Replace the live state. When `record` is true the new value becomes a
    /// checkpoint and the redo stack is cleared; otherwise only the live
    /// value changes (continuous gesture feedback).
    pub fn set(&mut self, value: T, record: bool) {
        if record {
            self.redo_stack.clear();
            self.checkpoints.push(value.clone());
        }
        self.live = value;
    }

    /// Apply a function of the previous live state. Same recording rules as
    /// [`History::set`].
    pub fn update<F>(&mut self, f: F, record: bool)
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.live);
        self.set(next, record);
    }

    /// Record the current live state as a checkpoint without changing it.
    /// Used to reconcile a gesture's live updates into exactly one undo step.
    pub fn commit(&mut self) {
        self.redo_stack.clear();
        self.checkpoints.push(self.live.clone());
    }

    /// Step back one checkpoint. No-op when only the initial state remains.
    pub fn undo(&mut self) {
        if self.checkpoints.len() > 1 {
            if let Some(current) = self.checkpoints.pop() {
                self.redo_stack.push(current);
            }
            if let Some(top) = self.checkpoints.last() {
                self.live = top.clone();
            }
        }
    }

    /// Reapply the most recently undone checkpoint. No-op when the redo
    /// stack is empty.
    pub fn redo(&mut self) {
        if let Some(next) = self.redo_stack.pop() {
            self.live = next.clone();
            self.checkpoints.push(next);
        }
    }

    /// Whether an undo step is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.checkpoints.len() > 1
    }

    /// Whether a redo step is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_not_undoable() {
        let mut history = History::new(vec![1]);
        assert!(!history.can_undo());
        history.undo();
        assert_eq!(history.current(), &vec![1]);
    }

    #[test]
    fn test_undo_restores_pre_mutation_state() {
        let mut history = History::new(vec![1]);
        history.set(vec![1, 2], true);
        history.set(vec![1, 2, 3], true);
        history.undo();
        assert_eq!(history.current(), &vec![1, 2]);
        history.undo();
        assert_eq!(history.current(), &vec![1]);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_redo_is_inverse_of_undo() {
        let mut history = History::new(1);
        history.set(2, true);
        history.undo();
        assert_eq!(*history.current(), 1);
        history.redo();
        assert_eq!(*history.current(), 2);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_new_checkpoint_clears_redo() {
        let mut history = History::new(1);
        history.set(2, true);
        history.undo();
        assert!(history.can_redo());
        history.set(3, true);
        assert!(!history.can_redo());
        assert_eq!(*history.current(), 3);
    }

    #[test]
    fn test_unrecorded_set_leaves_checkpoints_alone() {
        let mut history = History::new(1);
        history.set(2, false);
        assert_eq!(*history.current(), 2);
        assert!(!history.can_undo());
        history.undo();
        // Nothing to undo; live value stays.
        assert_eq!(*history.current(), 2);
    }

    #[test]
    fn test_commit_records_live_value_once() {
        let mut history = History::new(1);
        history.set(5, false);
        history.set(9, false);
        history.commit();
        assert!(history.can_undo());
        history.undo();
        assert_eq!(*history.current(), 1);
        history.redo();
        assert_eq!(*history.current(), 9);
    }

    #[test]
    fn test_update_closure() {
        let mut history = History::new(10);
        history.update(|v| v + 1, true);
        assert_eq!(*history.current(), 11);
        history.undo();
        assert_eq!(*history.current(), 10);
    }
}
