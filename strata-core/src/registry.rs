use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::clock::{default_clock, Clock};
use crate::error::RegistryError;
use crate::repo::Repository;

/// Registry listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct RegistryEntry {
    name: String,
    repository: Repository,
}

/// Insertion-ordered collection of named repositories with at most one
/// active.
///
/// Creating a repository switches to it; the active repository cannot be
/// deleted. Repositories never share state, so operating on one cannot
/// affect another.
#[derive(Debug, Serialize, Deserialize)]
pub struct RepositoryRegistry {
    entries: Vec<RegistryEntry>,
    active: Option<usize>,
    #[serde(skip, default = "crate::clock::default_clock")]
    clock: Arc<dyn Clock>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::with_clock(default_clock())
    }

    /// Registry whose repositories stamp commits from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        RepositoryRegistry {
            entries: Vec::new(),
            active: None,
            clock,
        }
    }

    /// Create a repository and make it the active one.
    pub fn create(&mut self, name: &str) -> Result<(), RegistryError> {
        if self.entries.iter().any(|entry| entry.name == name) {
            return Err(RegistryError::RepositoryAlreadyExists(name.to_string()));
        }
        self.entries.push(RegistryEntry {
            name: name.to_string(),
            repository: Repository::with_clock(Arc::clone(&self.clock)),
        });
        self.active = Some(self.entries.len() - 1);
        tracing::debug!("created repository {}", name);
        Ok(())
    }

    pub fn switch_to(&mut self, name: &str) -> Result<(), RegistryError> {
        match self.entries.iter().position(|entry| entry.name == name) {
            Some(index) => {
                self.active = Some(index);
                Ok(())
            }
            None => Err(RegistryError::RepositoryNotFound(name.to_string())),
        }
    }

    /// Delete a repository, preserving the order of the rest. The active
    /// repository cannot be deleted.
    pub fn delete(&mut self, name: &str) -> Result<(), RegistryError> {
        if self.active_name() == Some(name) {
            return Err(RegistryError::CannotDeleteActiveRepository(
                name.to_string(),
            ));
        }
        let index = self
            .entries
            .iter()
            .position(|entry| entry.name == name)
            .ok_or_else(|| RegistryError::RepositoryNotFound(name.to_string()))?;
        self.entries.remove(index);
        if let Some(active) = self.active {
            if active > index {
                self.active = Some(active - 1);
            }
        }
        Ok(())
    }

    pub fn list(&self) -> Vec<RepositoryInfo> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| RepositoryInfo {
                name: entry.name.clone(),
                active: Some(index) == self.active,
            })
            .collect()
    }

    pub fn active(&self) -> Result<&Repository, RegistryError> {
        self.active
            .and_then(|index| self.entries.get(index))
            .map(|entry| &entry.repository)
            .ok_or(RegistryError::NoActiveRepository)
    }

    pub fn active_mut(&mut self) -> Result<&mut Repository, RegistryError> {
        match self.active {
            Some(index) => self
                .entries
                .get_mut(index)
                .map(|entry| &mut entry.repository)
                .ok_or(RegistryError::NoActiveRepository),
            None => Err(RegistryError::NoActiveRepository),
        }
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active
            .and_then(|index| self.entries.get(index))
            .map(|entry| entry.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RepositoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_switches_to_new_repository() {
        let mut registry = RepositoryRegistry::new();
        registry.create("alpha").unwrap();
        registry.create("beta").unwrap();

        assert_eq!(registry.active_name(), Some("beta"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = RepositoryRegistry::new();
        registry.create("alpha").unwrap();
        assert_eq!(
            registry.create("alpha"),
            Err(RegistryError::RepositoryAlreadyExists("alpha".to_string()))
        );
    }

    #[test]
    fn test_switch_to_unknown_fails() {
        let mut registry = RepositoryRegistry::new();
        registry.create("alpha").unwrap();
        assert_eq!(
            registry.switch_to("ghost"),
            Err(RegistryError::RepositoryNotFound("ghost".to_string()))
        );
        assert_eq!(registry.active_name(), Some("alpha"));
    }

    #[test]
    fn test_delete_active_forbidden() {
        let mut registry = RepositoryRegistry::new();
        registry.create("alpha").unwrap();
        assert_eq!(
            registry.delete("alpha"),
            Err(RegistryError::CannotDeleteActiveRepository(
                "alpha".to_string()
            ))
        );
    }

    #[test]
    fn test_delete_before_active_keeps_active_pointing_right() {
        let mut registry = RepositoryRegistry::new();
        registry.create("a").unwrap();
        registry.create("b").unwrap();
        registry.create("c").unwrap();

        registry.delete("a").unwrap();

        assert_eq!(registry.active_name(), Some("c"));
        let names: Vec<String> = registry.list().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn test_active_on_empty_registry_fails() {
        let registry = RepositoryRegistry::new();
        assert!(matches!(
            registry.active(),
            Err(RegistryError::NoActiveRepository)
        ));
    }

    #[test]
    fn test_repositories_are_isolated() {
        let mut registry = RepositoryRegistry::new();
        registry.create("alpha").unwrap();
        registry.active_mut().unwrap().init().unwrap();
        registry
            .active_mut()
            .unwrap()
            .add("a.txt", "alpha data")
            .unwrap();
        registry.active_mut().unwrap().commit("in alpha").unwrap();

        registry.create("beta").unwrap();
        registry.active_mut().unwrap().init().unwrap();

        assert_eq!(registry.active().unwrap().log().unwrap().total, 0);
        assert_eq!(
            registry.active().unwrap().status().unwrap().undo_count,
            0
        );

        registry.switch_to("alpha").unwrap();
        assert_eq!(registry.active().unwrap().log().unwrap().total, 1);
        assert_eq!(
            registry.active().unwrap().status().unwrap().undo_count,
            1
        );
    }

    #[test]
    fn test_serde_round_trip_preserves_state() {
        let mut registry = RepositoryRegistry::new();
        registry.create("alpha").unwrap();
        registry.active_mut().unwrap().init().unwrap();
        registry
            .active_mut()
            .unwrap()
            .add("a.txt", "hello")
            .unwrap();
        registry.active_mut().unwrap().commit("first").unwrap();
        registry.create("beta").unwrap();

        let json = serde_json::to_string(&registry).unwrap();
        let mut loaded: RepositoryRegistry = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded.active_name(), Some("beta"));
        loaded.switch_to("alpha").unwrap();
        let page = loaded.active().unwrap().log().unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.commits[0].message, "first");
        assert_eq!(loaded.active().unwrap().status().unwrap().undo_count, 1);
    }

    #[test]
    fn test_list_flags_active() {
        let mut registry = RepositoryRegistry::new();
        registry.create("alpha").unwrap();
        registry.create("beta").unwrap();
        registry.switch_to("alpha").unwrap();

        let listing = registry.list();
        assert_eq!(
            listing,
            vec![
                RepositoryInfo {
                    name: "alpha".to_string(),
                    active: true
                },
                RepositoryInfo {
                    name: "beta".to_string(),
                    active: false
                },
            ]
        );
    }
}
