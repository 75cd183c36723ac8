use serde::{Deserialize, Serialize};

/// A named file and its full content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub content: String,
}

/// Ordered, name-keyed collection of files.
///
/// Backs the staging area, the working set, and commit snapshots. Names are
/// unique within a set; insertion order is preserved for display. `clone`
/// yields a fully independent copy with no shared backing storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSet {
    entries: Vec<FileEntry>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, or overwrite its content if the name is already present.
    /// Overwriting keeps the entry at its original position.
    pub fn upsert(&mut self, name: &str, content: &str) {
        for entry in &mut self.entries {
            if entry.name == name {
                entry.content = content.to_string();
                return;
            }
        }
        self.entries.push(FileEntry {
            name: name.to_string(),
            content: content.to_string(),
        });
    }

    /// Remove a file by name. Removing an absent name is a no-op.
    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|entry| entry.name != name);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.content.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
