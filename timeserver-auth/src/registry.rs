//! API key registry
//!
//! Maps an opaque API key to the identity record of its holder. The file
//! backend keeps one JSON document per key, so operations on different keys
//! never contend:
//!
//! ```text
//! <root>/api-keys/<hex(api key)>.json
//! ```

use crate::error::{AuthError, AuthResult};
use crate::identity::Identity;
use crate::role::Role;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};

const COLLECTION: &str = "api-keys";
const RECORD_EXTENSION: &str = "json";

/// Identity record stored for an API key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    /// The API key itself
    pub id: String,
    pub user: String,
    pub role: Role,
}

impl KeyInfo {
    pub fn new(id: impl Into<String>, user: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            user: user.into(),
            role,
        }
    }

    /// Check the record invariants: non-empty key and user, granted role
    pub fn validate(&self) -> AuthResult<()> {
        if self.id.is_empty() {
            return Err(AuthError::Invalid {
                field: "id",
                message: "API key must be set".to_string(),
            });
        }
        if self.user.is_empty() {
            return Err(AuthError::Invalid {
                field: "user",
                message: "user must be set".to_string(),
            });
        }
        if self.role == Role::Unknown {
            return Err(AuthError::UnknownRole(self.role.to_string()));
        }
        Ok(())
    }

    pub fn identity(&self) -> Identity {
        Identity {
            api_key: Some(self.id.clone()),
            user: self.user.clone(),
            role: self.role,
        }
    }
}

/// Storage-independent registry operations
#[async_trait]
pub trait KeyRegistry: Send + Sync {
    /// Insert or overwrite the record for `api_key`
    async fn add(&self, api_key: &str, info: &KeyInfo) -> AuthResult<()>;

    /// Record for `api_key`, `None` if the key is not registered
    async fn get(&self, api_key: &str) -> AuthResult<Option<KeyInfo>>;

    /// Every stored record, in no particular order
    async fn all(&self) -> AuthResult<Vec<KeyInfo>>;

    /// Remove `api_key`; `false` if it was not registered
    async fn delete(&self, api_key: &str) -> AuthResult<bool>;
}

/// File name stem for an API key: lowercase hex of its UTF-8 bytes
pub fn resource_name(api_key: &str) -> String {
    hex::encode(api_key.as_bytes())
}

/// Registry keeping one JSON file per key
#[derive(Debug, Clone)]
pub struct FileKeyRegistry {
    collection: PathBuf,
}

impl FileKeyRegistry {
    /// Open the registry below `root`, creating the directories as needed
    pub async fn open<P: AsRef<Path>>(root: P) -> AuthResult<Self> {
        let collection = root.as_ref().join(COLLECTION);
        tokio::fs::create_dir_all(&collection).await?;

        info!("API key store opened at: {}", collection.display());
        Ok(Self { collection })
    }

    fn record_path(&self, api_key: &str) -> PathBuf {
        self.collection
            .join(format!("{}.{}", resource_name(api_key), RECORD_EXTENSION))
    }
}

#[async_trait]
impl KeyRegistry for FileKeyRegistry {
    async fn add(&self, api_key: &str, info: &KeyInfo) -> AuthResult<()> {
        let path = self.record_path(api_key);
        let data = serde_json::to_vec_pretty(info)?;

        // Write beside the target and rename so readers never see a partial record.
        let tmp = path.with_extension(format!("{:016x}.tmp", rand::random::<u64>()));
        tokio::fs::write(&tmp, data).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        debug!("Stored API key for user: {}", info.user);
        Ok(())
    }

    async fn get(&self, api_key: &str) -> AuthResult<Option<KeyInfo>> {
        let path = self.record_path(api_key);
        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&data)
            .map(Some)
            .map_err(|source| AuthError::CorruptRecord {
                resource: path.display().to_string(),
                source,
            })
    }

    async fn all(&self) -> AuthResult<Vec<KeyInfo>> {
        let mut entries = tokio::fs::read_dir(&self.collection).await?;
        let mut keys = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let data = match tokio::fs::read(&path).await {
                Ok(data) => data,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!("API key record vanished during listing: {}", path.display());
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            let info = serde_json::from_slice(&data).map_err(|source| {
                AuthError::CorruptRecord {
                    resource: path.display().to_string(),
                    source,
                }
            })?;
            keys.push(info);
        }

        Ok(keys)
    }

    async fn delete(&self, api_key: &str) -> AuthResult<bool> {
        match tokio::fs::remove_file(self.record_path(api_key)).await {
            Ok(()) => {
                info!("Deleted API key record: {}", resource_name(api_key));
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory registry
#[derive(Debug, Default)]
pub struct MemoryKeyRegistry {
    keys: RwLock<HashMap<String, KeyInfo>>,
}

impl MemoryKeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyRegistry for MemoryKeyRegistry {
    async fn add(&self, api_key: &str, info: &KeyInfo) -> AuthResult<()> {
        self.keys
            .write()
            .await
            .insert(api_key.to_string(), info.clone());
        Ok(())
    }

    async fn get(&self, api_key: &str) -> AuthResult<Option<KeyInfo>> {
        Ok(self.keys.read().await.get(api_key).cloned())
    }

    async fn all(&self) -> AuthResult<Vec<KeyInfo>> {
        Ok(self.keys.read().await.values().cloned().collect())
    }

    async fn delete(&self, api_key: &str) -> AuthResult<bool> {
        Ok(self.keys.write().await.remove(api_key).is_some())
    }
}
