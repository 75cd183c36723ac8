use serde::{Deserialize, Serialize};

use crate::graph::CommitRef;

/// Unbounded LIFO stack of commit handles. One backs undo, one backs redo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryStack {
    entries: Vec<CommitRef>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, commit: CommitRef) {
        self.entries.push(commit);
    }

    pub fn pop(&mut self) -> Option<CommitRef> {
        self.entries.pop()
    }

    pub fn peek(&self) -> Option<CommitRef> {
        self.entries.last().copied()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fileset::FileSet;
    use crate::graph::CommitGraph;

    fn handles(n: usize) -> Vec<CommitRef> {
        let mut graph = CommitGraph::new();
        (0..n)
            .map(|i| graph.attach(None, &format!("c{}", i), "t", FileSet::new()))
            .collect()
    }

    #[test]
    fn test_pops_in_lifo_order() {
        let refs = handles(3);
        let mut stack = HistoryStack::new();
        for &r in &refs {
            stack.push(r);
        }

        assert_eq!(stack.len(), 3);
        assert_eq!(stack.pop(), Some(refs[2]));
        assert_eq!(stack.pop(), Some(refs[1]));
        assert_eq!(stack.pop(), Some(refs[0]));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn test_peek_does_not_remove() {
        let refs = handles(1);
        let mut stack = HistoryStack::new();
        stack.push(refs[0]);

        assert_eq!(stack.peek(), Some(refs[0]));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_clear_empties() {
        let refs = handles(2);
        let mut stack = HistoryStack::new();
        stack.push(refs[0]);
        stack.push(refs[1]);
        stack.clear();

        assert!(stack.is_empty());
        assert_eq!(stack.peek(), None);
    }
}
