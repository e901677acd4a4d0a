//! Quiz history persistence.
//!
//! History is a flat JSON array of quizzes, oldest first. Every mutation
//! rewrites the whole file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use recap_core::defaults::{APP_DIR, HISTORY_FILE};
use recap_core::{Error, HistoryStore, Quiz, Result};

/// History store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct JsonHistoryStore {
    path: PathBuf,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location: <data_dir>/recap/history.json
    pub fn default_location() -> Self {
        let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from(".local/share"));
        path.push(APP_DIR);
        path.push(HISTORY_FILE);
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl HistoryStore for JsonHistoryStore {
    async fn load(&self) -> Result<Vec<Quiz>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("History file not found at {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let quizzes: Vec<Quiz> = serde_json::from_str(&content)?;
        info!(count = quizzes.len(), "Loaded history from {}", self.path.display());
        Ok(quizzes)
    }

    async fn save(&self, quizzes: &[Quiz]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_vec_pretty(quizzes)?;
        tokio::fs::write(&self.path, content).await?;
        debug!(count = quizzes.len(), "Saved history to {}", self.path.display());
        Ok(())
    }
}

/// In-memory quiz list that re-persists through its store on every change.
pub struct History<S: HistoryStore> {
    store: S,
    quizzes: Vec<Quiz>,
}

impl<S: HistoryStore> History<S> {
    /// Load the stored list.
    pub async fn load(store: S) -> Result<Self> {
        let quizzes = store.load().await?;
        Ok(Self { store, quizzes })
    }

    /// Append a quiz and persist.
    pub async fn append(&mut self, quiz: Quiz) -> Result<()> {
        self.quizzes.push(quiz);
        self.store.save(&self.quizzes).await
    }

    /// Remove the quiz at `index` and persist.
    pub async fn remove(&mut self, index: usize) -> Result<Quiz> {
        if index >= self.quizzes.len() {
            return Err(Error::NotFound(format!(
                "No history entry at index {} (len {})",
                index,
                self.quizzes.len()
            )));
        }
        let removed = self.quizzes.remove(index);
        self.store.save(&self.quizzes).await?;
        Ok(removed)
    }

    /// Drop every quiz and persist.
    pub async fn clear(&mut self) -> Result<()> {
        self.quizzes.clear();
        self.store.save(&self.quizzes).await
    }

    pub fn get(&self, index: usize) -> Option<&Quiz> {
        self.quizzes.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Quiz> {
        self.quizzes.iter()
    }

    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
