use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::branch::{Branch, BranchDirectory};
use crate::clock::{format_timestamp, Clock, SystemClock};
use crate::digest::Digest;
use crate::error::RepoError;
use crate::fileset::{FileEntry, FileSet};
use crate::graph::{CommitGraph, CommitRef};
use crate::stack::HistoryStack;

/// Branch created by `init`.
pub const DEFAULT_BRANCH: &str = "main";

/// Receipt for a committed snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitReceipt {
    pub id: Digest,
    pub branch: String,
    pub file_count: usize,
}

/// One commit as reported by `log`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitSummary {
    pub id: Digest,
    pub message: String,
    pub timestamp: String,
    pub parent: Option<Digest>,
    pub children: Vec<Digest>,
    pub files: Vec<FileEntry>,
    pub file_count: usize,
}

/// Active branch history, most recent commit first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPage {
    pub branch: String,
    pub total: usize,
    pub commits: Vec<CommitSummary>,
}

/// File name plus the digest of its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDigest {
    pub name: String,
    pub hash: Digest,
}

/// Working tree report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub branch: String,
    pub staged: Vec<FileDigest>,
    pub working: Vec<FileDigest>,
    pub undo_count: usize,
    pub redo_count: usize,
}

/// Comparison of a working file against the active branch head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileDiff {
    /// The branch has no commits to compare against.
    New {
        working_hash: Digest,
        working_content: String,
    },
    /// Present in the working set but absent from the head snapshot.
    Added {
        working_hash: Digest,
        working_content: String,
    },
    Unchanged {
        hash: Digest,
    },
    Modified {
        committed_hash: Digest,
        working_hash: Digest,
        committed_content: String,
        working_content: String,
    },
}

/// Branch listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchInfo {
    pub name: String,
    pub head: Option<Digest>,
    pub active: bool,
}

/// Result of switching branches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutOutput {
    pub branch: String,
    pub head: Option<Digest>,
    pub file_count: usize,
}

/// Result of folding a source branch into the active branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeOutput {
    pub id: Digest,
    pub source: String,
    pub target: String,
    pub file_count: usize,
    pub message: String,
}

/// Result of undoing the most recent history-changing operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoOutput {
    pub undone: Digest,
    /// New head after the undo; `None` when history became empty.
    pub restored: Option<Digest>,
}

/// Result of re-applying an undone operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedoOutput {
    pub restored: Digest,
    pub message: String,
}

/// Result of reverting to an earlier commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevertOutput {
    pub target: Digest,
    pub new_commit: Digest,
    pub file_count: usize,
}

/// A single version-controlled repository.
///
/// Aggregates the working and staging file sets, the commit graph, the
/// branch table, and the undo/redo stacks. Every mutating operation checks
/// its preconditions before touching any state, so a returned error means
/// nothing changed.
///
/// A repository is not safe for concurrent mutation; callers exposing one to
/// concurrent traffic must serialize access.
#[derive(Debug, Serialize, Deserialize)]
pub struct Repository {
    working: FileSet,
    staging: FileSet,
    graph: CommitGraph,
    branches: BranchDirectory,
    undo: HistoryStack,
    redo: HistoryStack,
    root: Option<CommitRef>,
    initialized: bool,
    #[serde(skip, default = "crate::clock::default_clock")]
    clock: Arc<dyn Clock>,
}

impl Repository {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Repository stamping commit timestamps from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Repository {
            working: FileSet::new(),
            staging: FileSet::new(),
            graph: CommitGraph::new(),
            branches: BranchDirectory::new(),
            undo: HistoryStack::new(),
            redo: HistoryStack::new(),
            root: None,
            initialized: false,
            clock,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Create the default branch and mark the repository initialized.
    pub fn init(&mut self) -> Result<(), RepoError> {
        if self.initialized {
            return Err(RepoError::AlreadyInitialized);
        }
        self.branches.create(DEFAULT_BRANCH, None)?;
        self.initialized = true;
        tracing::debug!("initialized repository on branch {}", DEFAULT_BRANCH);
        Ok(())
    }

    /// Stage a file into both the staging area and the working set,
    /// returning the digest of its content. Re-staging a name overwrites.
    pub fn add(&mut self, filename: &str, content: &str) -> Result<Digest, RepoError> {
        self.ensure_initialized()?;
        self.staging.upsert(filename, content);
        self.working.upsert(filename, content);
        Ok(Digest::from_content(content))
    }

    /// Commit the staged files as a snapshot on the active branch.
    pub fn commit(&mut self, message: &str) -> Result<CommitReceipt, RepoError> {
        self.ensure_initialized()?;
        if self.staging.is_empty() {
            return Err(RepoError::NothingToCommit);
        }

        let (branch, parent) = {
            let active = self.active_branch()?;
            (active.name.clone(), active.head)
        };
        let timestamp = format_timestamp(self.clock.now());
        let snapshot = self.staging.clone();
        let file_count = snapshot.len();

        let commit = self.graph.attach(parent, message, &timestamp, snapshot);
        if self.root.is_none() {
            self.root = Some(commit);
        }
        self.set_active_head(Some(commit))?;
        self.undo.push(commit);
        self.redo.clear();
        self.staging.clear();

        let id = self.graph.get(commit).id.clone();
        tracing::debug!("committed {} on {} ({} file(s))", id, branch, file_count);
        Ok(CommitReceipt {
            id,
            branch,
            file_count,
        })
    }

    /// History of the active branch, most recent commit first. A branch with
    /// no commits yields an empty page, not an error.
    pub fn log(&self) -> Result<HistoryPage, RepoError> {
        let active = self.active_branch()?;
        let branch = active.name.clone();
        let chain = self.graph.ancestors(active.head);
        let commits = chain.iter().map(|&handle| self.summarize(handle)).collect();
        Ok(HistoryPage {
            branch,
            total: chain.len(),
            commits,
        })
    }

    pub fn status(&self) -> Result<StatusReport, RepoError> {
        let branch = self.active_branch()?.name.clone();
        Ok(StatusReport {
            branch,
            staged: file_digests(&self.staging),
            working: file_digests(&self.working),
            undo_count: self.undo.len(),
            redo_count: self.redo.len(),
        })
    }

    /// Compare a working file against the active branch's head snapshot.
    pub fn diff(&self, filename: &str) -> Result<FileDiff, RepoError> {
        let head = self.active_branch()?.head;
        let working = self
            .working
            .get(filename)
            .ok_or_else(|| RepoError::FileNotInWorkingSet(filename.to_string()))?;
        let working_hash = Digest::from_content(working);

        let Some(head) = head else {
            return Ok(FileDiff::New {
                working_hash,
                working_content: working.to_string(),
            });
        };

        match self.graph.get(head).snapshot.get(filename) {
            None => Ok(FileDiff::Added {
                working_hash,
                working_content: working.to_string(),
            }),
            Some(committed) => {
                let committed_hash = Digest::from_content(committed);
                if committed_hash == working_hash {
                    Ok(FileDiff::Unchanged { hash: working_hash })
                } else {
                    Ok(FileDiff::Modified {
                        committed_hash,
                        working_hash,
                        committed_content: committed.to_string(),
                        working_content: working.to_string(),
                    })
                }
            }
        }
    }

    /// Create a branch pointing at the active branch's current head.
    pub fn branch_create(&mut self, name: &str) -> Result<(), RepoError> {
        let head = self.active_branch()?.head;
        self.branches.create(name, head)
    }

    /// Switch branches. The working set is replaced by the new head's
    /// snapshot (or emptied for an unborn branch) and staged work is
    /// discarded.
    pub fn checkout(&mut self, name: &str) -> Result<CheckoutOutput, RepoError> {
        self.ensure_initialized()?;
        self.branches.switch_to(name)?;
        let head = self.active_branch()?.head;
        self.working = match head {
            Some(handle) => self.graph.get(handle).snapshot.clone(),
            None => FileSet::new(),
        };
        self.staging.clear();
        Ok(CheckoutOutput {
            branch: name.to_string(),
            head: head.map(|handle| self.graph.get(handle).id.clone()),
            file_count: self.working.len(),
        })
    }

    pub fn branch_list(&self) -> Result<Vec<BranchInfo>, RepoError> {
        self.ensure_initialized()?;
        let active = self.branches.active_name();
        Ok(self
            .branches
            .iter()
            .map(|branch| BranchInfo {
                name: branch.name.clone(),
                head: branch.head.map(|handle| self.graph.get(handle).id.clone()),
                active: active == Some(branch.name.as_str()),
            })
            .collect())
    }

    pub fn branch_delete(&mut self, name: &str) -> Result<(), RepoError> {
        self.ensure_initialized()?;
        self.branches.delete(name)
    }

    /// Fold the source branch's head snapshot into the active branch as a
    /// new commit. On a name conflict the source content wins; files unique
    /// to the active branch are kept. The new commit records only the active
    /// branch's previous head as parent.
    pub fn merge(&mut self, source: &str) -> Result<MergeOutput, RepoError> {
        let (target, target_head) = {
            let active = self.active_branch()?;
            (active.name.clone(), active.head)
        };
        let source_head = {
            let branch = self
                .branches
                .find(source)
                .ok_or_else(|| RepoError::BranchNotFound(source.to_string()))?;
            if branch.name == target {
                return Err(RepoError::CannotMergeSelf);
            }
            branch
                .head
                .ok_or_else(|| RepoError::SourceHasNoCommits(source.to_string()))?
        };

        let mut folded = match target_head {
            Some(handle) => self.graph.get(handle).snapshot.clone(),
            None => FileSet::new(),
        };
        for entry in self.graph.get(source_head).snapshot.iter() {
            folded.upsert(&entry.name, &entry.content);
        }

        let timestamp = format_timestamp(self.clock.now());
        let message = format!("Merge branch '{}' into {}", source, target);
        let file_count = folded.len();

        let commit = self.graph.attach(target_head, &message, &timestamp, folded);
        if self.root.is_none() {
            self.root = Some(commit);
        }
        self.set_active_head(Some(commit))?;
        self.working = self.graph.get(commit).snapshot.clone();
        self.staging.clear();
        self.undo.push(commit);
        self.redo.clear();

        let id = self.graph.get(commit).id.clone();
        tracing::debug!("merged {} into {} as {}", source, target, id);
        Ok(MergeOutput {
            id,
            source: source.to_string(),
            target,
            file_count,
            message,
        })
    }

    /// Undo the most recent history-changing operation: the active branch
    /// head moves to the popped commit's parent.
    ///
    /// The undo and redo stacks are repository-wide. After a branch switch
    /// the popped commit may belong to another branch, and the head still
    /// moves to that commit's parent.
    pub fn undo(&mut self) -> Result<UndoOutput, RepoError> {
        self.ensure_initialized()?;
        let undone = self.undo.pop().ok_or(RepoError::NothingToUndo)?;
        self.redo.push(undone);

        if self.active_branch()?.head != Some(undone) {
            tracing::warn!(
                "undo popped commit {} which is not the active branch head",
                self.graph.get(undone).id
            );
        }

        let parent = self.graph.get(undone).parent;
        self.set_active_head(parent)?;
        self.working = match parent {
            Some(handle) => self.graph.get(handle).snapshot.clone(),
            None => FileSet::new(),
        };
        Ok(UndoOutput {
            undone: self.graph.get(undone).id.clone(),
            restored: parent.map(|handle| self.graph.get(handle).id.clone()),
        })
    }

    /// Re-apply the most recently undone operation.
    pub fn redo(&mut self) -> Result<RedoOutput, RepoError> {
        self.ensure_initialized()?;
        let commit = self.redo.pop().ok_or(RepoError::NothingToRedo)?;
        self.undo.push(commit);
        self.set_active_head(Some(commit))?;
        self.working = self.graph.get(commit).snapshot.clone();

        let restored = self.graph.get(commit);
        Ok(RedoOutput {
            restored: restored.id.clone(),
            message: restored.message.clone(),
        })
    }

    /// Restore an earlier commit's snapshot by appending a new commit.
    ///
    /// The target is looked up in the active branch's own history first,
    /// then anywhere in the graph. History is never rewritten: the new
    /// commit is a child of the current head carrying the target's snapshot.
    /// Both the working and staging sets become copies of that snapshot.
    pub fn revert(&mut self, commit_id: &str) -> Result<RevertOutput, RepoError> {
        self.ensure_initialized()?;
        let head = self
            .active_branch()?
            .head
            .ok_or(RepoError::NoCommitsToRevert)?;

        let target = self
            .graph
            .find_ancestor(head, commit_id)
            .or_else(|| {
                self.root
                    .and_then(|root| self.graph.find_anywhere(root, commit_id))
            })
            .ok_or_else(|| RepoError::CommitNotFound(commit_id.to_string()))?;

        let snapshot = self.graph.get(target).snapshot.clone();
        self.working = snapshot.clone();
        self.staging = snapshot.clone();

        let timestamp = format_timestamp(self.clock.now());
        let message = format!("Revert to {}", commit_id);
        let commit = self.graph.attach(Some(head), &message, &timestamp, snapshot);
        self.set_active_head(Some(commit))?;
        self.undo.push(commit);
        self.redo.clear();

        Ok(RevertOutput {
            target: self.graph.get(target).id.clone(),
            new_commit: self.graph.get(commit).id.clone(),
            file_count: self.working.len(),
        })
    }

    /// Discard all state, returning to the pre-`init` state. The clock is
    /// kept.
    pub fn reset(&mut self) {
        let clock = Arc::clone(&self.clock);
        *self = Repository::with_clock(clock);
    }

    fn ensure_initialized(&self) -> Result<(), RepoError> {
        if self.initialized {
            Ok(())
        } else {
            Err(RepoError::NotInitialized)
        }
    }

    fn active_branch(&self) -> Result<&Branch, RepoError> {
        self.ensure_initialized()?;
        self.branches.active().ok_or(RepoError::NotInitialized)
    }

    fn set_active_head(&mut self, head: Option<CommitRef>) -> Result<(), RepoError> {
        let active = self
            .branches
            .active_mut()
            .ok_or(RepoError::NotInitialized)?;
        active.head = head;
        Ok(())
    }

    fn summarize(&self, handle: CommitRef) -> CommitSummary {
        let commit = self.graph.get(handle);
        CommitSummary {
            id: commit.id.clone(),
            message: commit.message.clone(),
            timestamp: commit.timestamp.clone(),
            parent: commit.parent.map(|p| self.graph.get(p).id.clone()),
            children: commit
                .children
                .iter()
                .map(|&c| self.graph.get(c).id.clone())
                .collect(),
            files: commit.snapshot.iter().cloned().collect(),
            file_count: commit.snapshot.len(),
        }
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

fn file_digests(set: &FileSet) -> Vec<FileDigest> {
    set.iter()
        .map(|entry| FileDigest {
            name: entry.name.clone(),
            hash: Digest::from_content(&entry.content),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{TimeZone, Utc};

    fn repo() -> Repository {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 8, 24, 12, 0, 0).unwrap());
        let mut repo = Repository::with_clock(Arc::new(clock));
        repo.init().unwrap();
        repo
    }

    #[test]
    fn test_init_twice_fails() {
        let mut repo = repo();
        assert_eq!(repo.init(), Err(RepoError::AlreadyInitialized));
        assert!(repo.is_initialized());
    }

    #[test]
    fn test_operations_require_init() {
        let mut repo = Repository::new();
        assert_eq!(repo.add("a.txt", "hello"), Err(RepoError::NotInitialized));
        assert_eq!(repo.commit("msg"), Err(RepoError::NotInitialized));
        assert_eq!(repo.log(), Err(RepoError::NotInitialized));
        assert_eq!(repo.status(), Err(RepoError::NotInitialized));
        assert_eq!(repo.undo(), Err(RepoError::NotInitialized));
    }

    #[test]
    fn test_add_returns_content_digest() {
        let mut repo = repo();
        let digest = repo.add("a.txt", "hello").unwrap();
        assert_eq!(digest, Digest::from_content("hello"));
        assert_eq!(digest.as_str().len(), 8);
    }

    #[test]
    fn test_restaging_overwrites_without_duplicating() {
        let mut repo = repo();
        repo.add("a.txt", "hello").unwrap();
        repo.add("a.txt", "world").unwrap();

        let status = repo.status().unwrap();
        assert_eq!(status.staged.len(), 1);
        assert_eq!(status.staged[0].name, "a.txt");
        assert_eq!(status.staged[0].hash, Digest::from_content("world"));
    }

    #[test]
    fn test_commit_clears_staging_and_pushes_undo() {
        let mut repo = repo();
        repo.add("a.txt", "hello").unwrap();
        let receipt = repo.commit("first").unwrap();

        assert_eq!(receipt.branch, "main");
        assert_eq!(receipt.file_count, 1);

        let status = repo.status().unwrap();
        assert!(status.staged.is_empty());
        assert_eq!(status.working.len(), 1);
        assert_eq!(status.undo_count, 1);
        assert_eq!(status.redo_count, 0);
    }

    #[test]
    fn test_commit_with_empty_staging_fails() {
        let mut repo = repo();
        assert_eq!(repo.commit("nope"), Err(RepoError::NothingToCommit));
    }

    #[test]
    fn test_log_walks_parent_chain_most_recent_first() {
        let mut repo = repo();
        repo.add("a.txt", "1").unwrap();
        let c1 = repo.commit("first").unwrap();
        repo.add("a.txt", "2").unwrap();
        let c2 = repo.commit("second").unwrap();

        let page = repo.log().unwrap();
        assert_eq!(page.branch, "main");
        assert_eq!(page.total, 2);
        assert_eq!(page.commits[0].id, c2.id);
        assert_eq!(page.commits[0].parent, Some(c1.id.clone()));
        assert_eq!(page.commits[1].id, c1.id);
        assert_eq!(page.commits[1].children, vec![c2.id]);
    }

    #[test]
    fn test_log_on_unborn_branch_is_empty() {
        let repo = repo();
        let page = repo.log().unwrap();
        assert_eq!(page.total, 0);
        assert!(page.commits.is_empty());
    }

    #[test]
    fn test_diff_reports_each_state() {
        let mut repo = repo();
        assert_eq!(
            repo.diff("a.txt"),
            Err(RepoError::FileNotInWorkingSet("a.txt".to_string()))
        );

        repo.add("a.txt", "hello").unwrap();
        assert!(matches!(repo.diff("a.txt").unwrap(), FileDiff::New { .. }));

        repo.commit("first").unwrap();
        assert!(matches!(
            repo.diff("a.txt").unwrap(),
            FileDiff::Unchanged { .. }
        ));

        repo.add("b.txt", "fresh").unwrap();
        assert!(matches!(repo.diff("b.txt").unwrap(), FileDiff::Added { .. }));

        repo.add("a.txt", "changed").unwrap();
        match repo.diff("a.txt").unwrap() {
            FileDiff::Modified {
                committed_content,
                working_content,
                committed_hash,
                working_hash,
            } => {
                assert_eq!(committed_content, "hello");
                assert_eq!(working_content, "changed");
                assert_ne!(committed_hash, working_hash);
            }
            other => panic!("expected modified, got {:?}", other),
        }
    }

    #[test]
    fn test_checkout_restores_snapshot_and_discards_staged_work() {
        let mut repo = repo();
        repo.add("a.txt", "hello").unwrap();
        repo.commit("first").unwrap();
        repo.branch_create("feature").unwrap();

        repo.add("pending.txt", "uncommitted").unwrap();
        let out = repo.checkout("feature").unwrap();

        assert_eq!(out.branch, "feature");
        assert_eq!(out.file_count, 1);
        assert!(out.head.is_some());

        let status = repo.status().unwrap();
        assert!(status.staged.is_empty());
        assert_eq!(status.working.len(), 1);
        assert_eq!(status.working[0].name, "a.txt");
    }

    #[test]
    fn test_checkout_unborn_branch_empties_working_set() {
        let mut repo = repo();
        repo.branch_create("empty").unwrap();
        repo.add("a.txt", "hello").unwrap();
        repo.commit("first").unwrap();

        let out = repo.checkout("empty").unwrap();
        assert_eq!(out.head, None);
        assert_eq!(out.file_count, 0);
        assert!(repo.status().unwrap().working.is_empty());
    }

    #[test]
    fn test_branch_list_flags_active() {
        let mut repo = repo();
        repo.add("a.txt", "hello").unwrap();
        let receipt = repo.commit("first").unwrap();
        repo.branch_create("feature").unwrap();

        let branches = repo.branch_list().unwrap();
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0].name, "main");
        assert!(branches[0].active);
        assert_eq!(branches[0].head, Some(receipt.id.clone()));
        assert_eq!(branches[1].name, "feature");
        assert!(!branches[1].active);
        assert_eq!(branches[1].head, Some(receipt.id));
    }

    #[test]
    fn test_branch_delete_guards_active() {
        let mut repo = repo();
        repo.branch_create("feature").unwrap();
        assert_eq!(
            repo.branch_delete("main"),
            Err(RepoError::CannotDeleteActive("main".to_string()))
        );
        repo.branch_delete("feature").unwrap();
        assert_eq!(repo.branch_list().unwrap().len(), 1);
    }

    #[test]
    fn test_merge_folds_source_over_target() {
        let mut repo = repo();
        repo.add("a.txt", "base").unwrap();
        repo.add("keep.txt", "target only").unwrap();
        repo.commit("base").unwrap();

        repo.branch_create("feature").unwrap();
        repo.checkout("feature").unwrap();
        repo.add("a.txt", "from feature").unwrap();
        repo.add("b.txt", "new in feature").unwrap();
        repo.commit("feature work").unwrap();

        repo.checkout("main").unwrap();
        let out = repo.merge("feature").unwrap();

        assert_eq!(out.source, "feature");
        assert_eq!(out.target, "main");
        assert_eq!(out.file_count, 3);
        assert_eq!(out.message, "Merge branch 'feature' into main");

        let status = repo.status().unwrap();
        let working: Vec<&str> = status.working.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(working, vec!["a.txt", "keep.txt", "b.txt"]);

        // Source content wins the name conflict.
        assert!(matches!(
            repo.diff("a.txt").unwrap(),
            FileDiff::Unchanged { .. }
        ));
        let page = repo.log().unwrap();
        assert_eq!(page.commits[0].files[0].content, "from feature");
    }

    #[test]
    fn test_merge_failures_leave_state_untouched() {
        let mut repo = repo();
        repo.add("a.txt", "base").unwrap();
        repo.commit("base").unwrap();
        repo.branch_create("empty").unwrap();
        let before = repo.status().unwrap();

        assert_eq!(
            repo.merge("ghost"),
            Err(RepoError::BranchNotFound("ghost".to_string()))
        );
        assert_eq!(repo.merge("main"), Err(RepoError::CannotMergeSelf));
        assert_eq!(
            repo.merge("empty"),
            Err(RepoError::SourceHasNoCommits("empty".to_string()))
        );

        let after = repo.status().unwrap();
        assert_eq!(before.undo_count, after.undo_count);
        assert_eq!(before.redo_count, after.redo_count);
        assert_eq!(repo.log().unwrap().total, 1);
    }

    #[test]
    fn test_undo_then_redo_restores_head_and_working_set() {
        let mut repo = repo();
        repo.add("a.txt", "1").unwrap();
        let c1 = repo.commit("first").unwrap();
        repo.add("a.txt", "2").unwrap();
        let c2 = repo.commit("second").unwrap();

        let undo = repo.undo().unwrap();
        assert_eq!(undo.undone, c2.id);
        assert_eq!(undo.restored, Some(c1.id.clone()));
        let status = repo.status().unwrap();
        assert_eq!(status.working[0].hash, Digest::from_content("1"));
        assert_eq!(repo.log().unwrap().total, 1);

        let redo = repo.redo().unwrap();
        assert_eq!(redo.restored, c2.id);
        assert_eq!(redo.message, "second");
        let status = repo.status().unwrap();
        assert_eq!(status.working[0].hash, Digest::from_content("2"));
        assert_eq!(repo.log().unwrap().total, 2);
    }

    #[test]
    fn test_undo_root_commit_empties_history() {
        let mut repo = repo();
        repo.add("a.txt", "1").unwrap();
        repo.commit("first").unwrap();

        let undo = repo.undo().unwrap();
        assert_eq!(undo.restored, None);
        assert_eq!(repo.log().unwrap().total, 0);
        assert!(repo.status().unwrap().working.is_empty());
    }

    #[test]
    fn test_undo_redo_empty_stacks_fail() {
        let mut repo = repo();
        assert_eq!(repo.undo(), Err(RepoError::NothingToUndo));
        assert_eq!(repo.redo(), Err(RepoError::NothingToRedo));
    }

    #[test]
    fn test_commit_clears_redo() {
        let mut repo = repo();
        repo.add("a.txt", "1").unwrap();
        repo.commit("first").unwrap();
        repo.undo().unwrap();
        assert_eq!(repo.status().unwrap().redo_count, 1);

        repo.add("b.txt", "fresh").unwrap();
        repo.commit("new direction").unwrap();
        assert_eq!(repo.status().unwrap().redo_count, 0);
        assert_eq!(repo.redo(), Err(RepoError::NothingToRedo));
    }

    #[test]
    fn test_revert_appends_instead_of_rewriting() {
        let mut repo = repo();
        repo.add("a.txt", "1").unwrap();
        let c1 = repo.commit("first").unwrap();
        repo.add("a.txt", "2").unwrap();
        let c2 = repo.commit("second").unwrap();

        let out = repo.revert(c1.id.as_str()).unwrap();
        assert_eq!(out.target, c1.id);
        assert_eq!(out.file_count, 1);

        let page = repo.log().unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.commits[0].id, out.new_commit);
        assert_eq!(page.commits[0].message, format!("Revert to {}", c1.id));
        assert_eq!(page.commits[0].parent, Some(c2.id.clone()));
        assert_eq!(page.commits[0].files[0].content, "1");
        // The reverted-to commit is untouched.
        assert_eq!(page.commits[2].id, c1.id);
        assert_eq!(page.commits[2].files[0].content, "1");
        // Working and staging both hold the restored snapshot.
        let status = repo.status().unwrap();
        assert_eq!(status.working[0].hash, Digest::from_content("1"));
        assert_eq!(status.staged.len(), 1);
        assert_eq!(status.staged[0].hash, Digest::from_content("1"));
    }

    #[test]
    fn test_revert_finds_commits_on_other_branches() {
        let mut repo = repo();
        repo.add("a.txt", "base").unwrap();
        repo.commit("base").unwrap();
        repo.branch_create("feature").unwrap();
        repo.checkout("feature").unwrap();
        repo.add("b.txt", "side").unwrap();
        let side = repo.commit("side work").unwrap();

        repo.checkout("main").unwrap();
        let out = repo.revert(side.id.as_str()).unwrap();
        assert_eq!(out.target, side.id);

        // The side commit snapshotted only what was staged on feature.
        let status = repo.status().unwrap();
        let names: Vec<&str> = status.working.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["b.txt"]);
        assert_eq!(out.file_count, 1);
    }

    #[test]
    fn test_revert_errors() {
        let mut repo = repo();
        assert_eq!(repo.revert("deadbeef"), Err(RepoError::NoCommitsToRevert));

        repo.add("a.txt", "1").unwrap();
        repo.commit("first").unwrap();
        assert_eq!(
            repo.revert("deadbeef"),
            Err(RepoError::CommitNotFound("deadbeef".to_string()))
        );
    }

    #[test]
    fn test_reset_returns_to_uninitialized() {
        let mut repo = repo();
        repo.add("a.txt", "1").unwrap();
        repo.commit("first").unwrap();

        repo.reset();
        assert!(!repo.is_initialized());
        assert_eq!(repo.status(), Err(RepoError::NotInitialized));
        repo.init().unwrap();
        assert_eq!(repo.log().unwrap().total, 0);
    }
}
