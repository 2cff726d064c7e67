//! Session Storage for desktop hosts

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::SessionStorage,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// In-process session storage
///
/// Values live as long as the process, which matches a browser tab's
/// `sessionStorage` lifetime for a desktop window.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.lock().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        self.items.lock().await.remove(key);
        Ok(())
    }
}

/// File-backed session storage
///
/// Keeps every key in one JSON object on disk so a restarted app resumes
/// the previous session. The whole file is rewritten on each change.
#[derive(Debug)]
pub struct FileSessionStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionStorage {
    /// Storage under the platform data directory
    /// (`<data_dir>/session-gate/session.json`).
    pub fn new() -> Result<Self> {
        let data_dir = dirs::data_dir().ok_or_else(|| {
            BridgeError::NotAvailable("Could not determine data directory".to_string())
        })?;

        Ok(Self::with_path(data_dir.join("session-gate").join("session.json")))
    }

    /// Storage at an explicit file path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<HashMap<String, String>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(BridgeError::Io(e)),
        };

        if contents.trim().is_empty() {
            return Ok(HashMap::new());
        }

        serde_json::from_str(&contents).map_err(|e| {
            warn!(path = ?self.path, "Session file is corrupt: {}", e);
            BridgeError::Storage(format!("Corrupt session file: {}", e))
        })
    }

    async fn save(&self, items: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(BridgeError::Io)?;
        }

        let contents = serde_json::to_string(items)
            .map_err(|e| BridgeError::Storage(format!("Failed to encode session file: {}", e)))?;

        tokio::fs::write(&self.path, contents)
            .await
            .map_err(BridgeError::Io)?;

        debug!(path = ?self.path, keys = items.len(), "Session file written");
        Ok(())
    }
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut items = self.load().await.unwrap_or_default();
        items.insert(key.to_string(), value.to_string());
        self.save(&items).await
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut items = match self.load().await {
            Ok(items) => items,
            // Unreadable file: drop it entirely so the credential is gone.
            Err(BridgeError::Storage(_)) => {
                return match tokio::fs::remove_file(&self.path).await {
                    Ok(()) => Ok(()),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                    Err(e) => Err(BridgeError::Io(e)),
                };
            }
            Err(e) => return Err(e),
        };

        if items.remove(key).is_some() {
            self.save(&items).await?;
        }
        Ok(())
    }
}
