//! Strata Core Library
//!
//! In-memory version control engine:
//! - Content digests (polynomial rolling hash)
//! - Ordered file sets (staging area, working set, snapshots)
//! - Commit graph arena with iterative traversal
//! - Branch directory with a single active branch
//! - Undo/redo history stacks
//! - Repository operations (commit, log, diff, merge, undo, revert, ...)
//! - Multi-repository registry with one active repository

pub mod branch;
pub mod clock;
pub mod digest;
pub mod error;
pub mod fileset;
pub mod graph;
pub mod registry;
pub mod repo;
pub mod stack;

pub use branch::{Branch, BranchDirectory};
pub use clock::{format_timestamp, Clock, FixedClock, SystemClock, TIMESTAMP_FORMAT};
pub use digest::Digest;
pub use error::{RegistryError, RepoError};
pub use fileset::{FileEntry, FileSet};
pub use graph::{Commit, CommitGraph, CommitRef};
pub use registry::{RepositoryInfo, RepositoryRegistry};
pub use repo::{
    BranchInfo, CheckoutOutput, CommitReceipt, CommitSummary, FileDiff, FileDigest, HistoryPage,
    MergeOutput, RedoOutput, Repository, RevertOutput, StatusReport, UndoOutput, DEFAULT_BRANCH,
};
