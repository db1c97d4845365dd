use std::{
    collections::HashSet,
    io,
    path::{Path, PathBuf},
};

use tokio::sync::Mutex;

/// Authors who asked not to be tracked, persisted as a JSON array of ids.
///
/// All mutation happens under one lock, and the file is rewritten before
/// the mutating call returns, so an acknowledged opt-out survives a crash.
pub struct OptOutStore {
    path: PathBuf,
    set: Mutex<HashSet<u64>>,
}

#[derive(Debug, thiserror::Error)]
pub enum OptOutError {
    #[error("failed to access the opt-out file: {0}")]
    Io(#[from] io::Error),
    #[error("the opt-out file is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

impl OptOutStore {
    /// Load the set from `path`. A missing file is an empty set, not an
    /// error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OptOutError> {
        let path = path.as_ref().to_path_buf();
        let set = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str::<Vec<u64>>(&text)?
                .into_iter()
                .collect(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(OptOutStore {
            path,
            set: Mutex::new(set),
        })
    }

    pub async fn contains(&self, author_id: u64) -> bool {
        self.set.lock().await.contains(&author_id)
    }

    /// Add an author to the set and persist it. Returns `false` without
    /// touching the file if they were already in it.
    pub async fn add(&self, author_id: u64) -> Result<bool, OptOutError> {
        let mut set = self.set.lock().await;
        if !set.insert(author_id) {
            return Ok(false);
        }
        Self::persist(&self.path, &set)?;
        Ok(true)
    }

    /// Remove an author from the set and persist it. Returns `false`
    /// without touching the file if they weren't in it.
    pub async fn remove(&self, author_id: u64) -> Result<bool, OptOutError> {
        let mut set = self.set.lock().await;
        if !set.remove(&author_id) {
            return Ok(false);
        }
        Self::persist(&self.path, &set)?;
        Ok(true)
    }

    fn persist(path: &Path, set: &HashSet<u64>) -> Result<(), OptOutError> {
        let mut ids: Vec<u64> = set.iter().copied().collect();
        // Stable file contents regardless of hash order.
        ids.sort_unstable();
        std::fs::write(path, serde_json::to_vec(&ids)?)?;
        Ok(())
    }
}
