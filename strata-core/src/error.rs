use thiserror::Error;

/// Everything a repository operation can fail with.
///
/// All variants are expected, recoverable conditions; no operation mutates
/// state before its checks pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoError {
    #[error("repository not initialized")]
    NotInitialized,

    #[error("repository already initialized")]
    AlreadyInitialized,

    #[error("nothing to commit")]
    NothingToCommit,

    #[error("file '{0}' not in working set")]
    FileNotInWorkingSet(String),

    #[error("branch '{0}' already exists")]
    BranchAlreadyExists(String),

    #[error("branch '{0}' not found")]
    BranchNotFound(String),

    #[error("cannot delete active branch '{0}'")]
    CannotDeleteActive(String),

    #[error("cannot merge branch into itself")]
    CannotMergeSelf,

    #[error("branch '{0}' has no commits")]
    SourceHasNoCommits(String),

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,

    #[error("no commits to revert")]
    NoCommitsToRevert,

    #[error("commit '{0}' not found")]
    CommitNotFound(String),
}

/// Failures at the multi-repository level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("repository '{0}' already exists")]
    RepositoryAlreadyExists(String),

    #[error("repository '{0}' not found")]
    RepositoryNotFound(String),

    #[error("cannot delete active repository '{0}'")]
    CannotDeleteActiveRepository(String),

    #[error("no repository selected")]
    NoActiveRepository,
}
