use serde::{Deserialize, Serialize};

use crate::digest::Digest;
use crate::fileset::FileSet;

/// Handle to a commit inside a [`CommitGraph`] arena.
///
/// Handles are minted by the graph that owns the commit. Commits are never
/// removed, so a handle stays valid for the life of its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitRef(usize);

/// One snapshot node in the commit graph.
///
/// Immutable after construction except for `children`, which grows as new
/// commits attach underneath.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub id: Digest,
    pub message: String,
    pub timestamp: String,
    pub parent: Option<CommitRef>,
    pub children: Vec<CommitRef>,
    pub snapshot: FileSet,
}

/// Arena holding every commit ever created in a repository.
///
/// Parent and child links are handles into the arena rather than owning
/// pointers, so the graph is a single flat allocation and traversal never
/// recurses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommitGraph {
    commits: Vec<Commit>,
}

impl CommitGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a commit under `parent` and return its handle.
    ///
    /// The id is the digest of message, timestamp, and the snapshot contents
    /// concatenated in file order. Every commit kind (plain, merge, revert)
    /// gets its id from this same formula.
    pub fn attach(
        &mut self,
        parent: Option<CommitRef>,
        message: &str,
        timestamp: &str,
        snapshot: FileSet,
    ) -> CommitRef {
        let mut raw = String::from(message);
        raw.push_str(timestamp);
        for entry in snapshot.iter() {
            raw.push_str(&entry.content);
        }
        let id = Digest::from_content(&raw);

        let handle = CommitRef(self.commits.len());
        self.commits.push(Commit {
            id,
            message: message.to_string(),
            timestamp: timestamp.to_string(),
            parent,
            children: Vec::new(),
            snapshot,
        });
        if let Some(parent) = parent {
            self.commits[parent.0].children.push(handle);
        }
        handle
    }

    pub fn get(&self, commit: CommitRef) -> &Commit {
        &self.commits[commit.0]
    }

    /// Walk the parent chain from `start` until a commit with `id` turns up.
    pub fn find_ancestor(&self, start: CommitRef, id: &str) -> Option<CommitRef> {
        let mut cursor = Some(start);
        while let Some(handle) = cursor {
            let commit = self.get(handle);
            if commit.id.as_str() == id {
                return Some(handle);
            }
            cursor = commit.parent;
        }
        None
    }

    /// Depth-first search of the subtree under `root`: a node is visited
    /// before its children, children in insertion order. Reaches commits
    /// that live on other branches.
    pub fn find_anywhere(&self, root: CommitRef, id: &str) -> Option<CommitRef> {
        let mut pending = vec![root];
        while let Some(handle) = pending.pop() {
            let commit = self.get(handle);
            if commit.id.as_str() == id {
                return Some(handle);
            }
            for &child in commit.children.iter().rev() {
                pending.push(child);
            }
        }
        None
    }

    /// Commits from `head` back to the root, most recent first.
    pub fn ancestors(&self, head: Option<CommitRef>) -> Vec<CommitRef> {
        let mut chain = Vec::new();
        let mut cursor = head;
        while let Some(handle) = cursor {
            chain.push(handle);
            cursor = self.get(handle).parent;
        }
        chain
    }

    /// Length of the parent chain from `head`, inclusive.
    pub fn depth(&self, head: Option<CommitRef>) -> usize {
        let mut count = 0;
        let mut cursor = head;
        while let Some(handle) = cursor {
            count += 1;
            cursor = self.get(handle).parent;
        }
        count
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(pairs: &[(&str, &str)]) -> FileSet {
        let mut set = FileSet::new();
        for (name, content) in pairs {
            set.upsert(name, content);
        }
        set
    }

    #[test]
    fn test_attach_wires_parent_and_children() {
        let mut graph = CommitGraph::new();
        let root = graph.attach(None, "first", "t1", snapshot(&[("a", "1")]));
        let child = graph.attach(Some(root), "second", "t2", snapshot(&[("a", "2")]));

        assert_eq!(graph.get(root).parent, None);
        assert_eq!(graph.get(root).children, vec![child]);
        assert_eq!(graph.get(child).parent, Some(root));
        assert!(graph.get(child).children.is_empty());
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_id_covers_message_timestamp_and_contents() {
        let mut graph = CommitGraph::new();
        let a = graph.attach(None, "msg", "t1", snapshot(&[("a", "1")]));
        let b = graph.attach(None, "msg", "t1", snapshot(&[("a", "1")]));
        let c = graph.attach(None, "msg", "t2", snapshot(&[("a", "1")]));
        let d = graph.attach(None, "msg", "t1", snapshot(&[("a", "2")]));

        assert_eq!(graph.get(a).id, graph.get(b).id);
        assert_ne!(graph.get(a).id, graph.get(c).id);
        assert_ne!(graph.get(a).id, graph.get(d).id);
    }

    #[test]
    fn test_find_ancestor_only_walks_parents() {
        let mut graph = CommitGraph::new();
        let root = graph.attach(None, "root", "t1", snapshot(&[("a", "1")]));
        let main_head = graph.attach(Some(root), "main work", "t2", snapshot(&[("a", "2")]));
        let side = graph.attach(Some(root), "side work", "t3", snapshot(&[("b", "1")]));

        let root_id = graph.get(root).id.clone();
        let side_id = graph.get(side).id.clone();

        assert_eq!(graph.find_ancestor(main_head, root_id.as_str()), Some(root));
        assert_eq!(graph.find_ancestor(main_head, side_id.as_str()), None);
    }

    #[test]
    fn test_find_anywhere_reaches_other_subtrees() {
        let mut graph = CommitGraph::new();
        let root = graph.attach(None, "root", "t1", snapshot(&[("a", "1")]));
        let _main_head = graph.attach(Some(root), "main work", "t2", snapshot(&[("a", "2")]));
        let side = graph.attach(Some(root), "side work", "t3", snapshot(&[("b", "1")]));

        let side_id = graph.get(side).id.clone();
        assert_eq!(graph.find_anywhere(root, side_id.as_str()), Some(side));
        assert_eq!(graph.find_anywhere(root, "ffffffff"), None);
    }

    #[test]
    fn test_find_anywhere_visits_preorder() {
        // Two commits with identical inputs share an id; the first in
        // pre-order wins.
        let mut graph = CommitGraph::new();
        let root = graph.attach(None, "root", "t1", snapshot(&[("a", "1")]));
        let left = graph.attach(Some(root), "dup", "t2", snapshot(&[("x", "x")]));
        let _under_left = graph.attach(Some(left), "dup", "t2", snapshot(&[("x", "x")]));
        let dup_id = graph.get(left).id.clone();

        assert_eq!(graph.find_anywhere(root, dup_id.as_str()), Some(left));
    }

    #[test]
    fn test_ancestors_most_recent_first() {
        let mut graph = CommitGraph::new();
        let c1 = graph.attach(None, "one", "t1", snapshot(&[("a", "1")]));
        let c2 = graph.attach(Some(c1), "two", "t2", snapshot(&[("a", "2")]));
        let c3 = graph.attach(Some(c2), "three", "t3", snapshot(&[("a", "3")]));

        assert_eq!(graph.ancestors(Some(c3)), vec![c3, c2, c1]);
        assert_eq!(graph.ancestors(None), Vec::<CommitRef>::new());
        assert_eq!(graph.depth(Some(c3)), 3);
        assert_eq!(graph.depth(None), 0);
    }
}
