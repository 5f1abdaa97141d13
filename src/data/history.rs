use super::model::{Row, Snapshot};

// ---------------------------------------------------------------------------
// ChangeHistory – whole-snapshot undo / redo
// ---------------------------------------------------------------------------

/// Two stacks of row snapshots. Only rows are tracked; column names and
/// types are deliberately not part of a snapshot.
#[derive(Debug, Clone, Default)]
pub struct ChangeHistory {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    /// Maximum number of undo entries kept. `None` = unbounded.
    limit: Option<usize>,
}

impl ChangeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Capture `current` before a mutation and invalidate the redo branch.
    pub fn record(&mut self, current: &[Row]) {
        self.undo_stack.push(current.to_vec());
        self.redo_stack.clear();
        self.enforce_limit();
    }

    /// Restore the previous snapshot into `current`. Returns `false` (and
    /// leaves `current` untouched) when there is nothing to undo.
    pub fn undo(&mut self, current: &mut Vec<Row>) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            return false;
        };
        self.redo_stack.push(std::mem::replace(current, previous));
        true
    }

    pub fn redo(&mut self, current: &mut Vec<Row>) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push(std::mem::replace(current, next));
        self.enforce_limit();
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    fn enforce_limit(&mut self) {
        if let Some(limit) = self.limit {
            if self.undo_stack.len() > limit {
                let excess = self.undo_stack.len() - limit;
                self.undo_stack.drain(0..excess);
            }
        }
    }
}
