use serde::{Deserialize, Serialize};

use crate::error::RepoError;
use crate::graph::CommitRef;

/// A named pointer into the commit graph. `head` stays `None` until the
/// first commit lands on the branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub head: Option<CommitRef>,
}

/// Insertion-ordered branch table.
///
/// Exactly one branch is active once any branch exists; the first branch
/// ever created becomes active automatically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BranchDirectory {
    branches: Vec<Branch>,
    active: Option<usize>,
}

impl BranchDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a branch pointing at `head`.
    pub fn create(&mut self, name: &str, head: Option<CommitRef>) -> Result<(), RepoError> {
        if self.find(name).is_some() {
            return Err(RepoError::BranchAlreadyExists(name.to_string()));
        }
        self.branches.push(Branch {
            name: name.to_string(),
            head,
        });
        if self.active.is_none() {
            self.active = Some(self.branches.len() - 1);
        }
        Ok(())
    }

    /// Make `name` the active branch. Switching has no effect on any
    /// working or staged state; that is the caller's concern.
    pub fn switch_to(&mut self, name: &str) -> Result<(), RepoError> {
        match self.branches.iter().position(|b| b.name == name) {
            Some(index) => {
                self.active = Some(index);
                Ok(())
            }
            None => Err(RepoError::BranchNotFound(name.to_string())),
        }
    }

    /// Remove a branch, preserving the order of the rest. The active branch
    /// cannot be removed.
    pub fn delete(&mut self, name: &str) -> Result<(), RepoError> {
        if self.active_name() == Some(name) {
            return Err(RepoError::CannotDeleteActive(name.to_string()));
        }
        let index = self
            .branches
            .iter()
            .position(|b| b.name == name)
            .ok_or_else(|| RepoError::BranchNotFound(name.to_string()))?;
        self.branches.remove(index);
        if let Some(active) = self.active {
            if active > index {
                self.active = Some(active - 1);
            }
        }
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.name == name)
    }

    pub fn active(&self) -> Option<&Branch> {
        self.active.and_then(|index| self.branches.get(index))
    }

    pub fn active_mut(&mut self) -> Option<&mut Branch> {
        match self.active {
            Some(index) => self.branches.get_mut(index),
            None => None,
        }
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active().map(|b| b.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Branch> {
        self.branches.iter()
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }
}
