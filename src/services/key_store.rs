//! API Key 本地存储 - 业务能力层
//!
//! 只负责"保存/读取/删除一个密钥"，存放在单个 TOML 文件的固定槽位中。

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info};

use crate::error::StoreError;

/// 固定槽位名
pub const KEY_SLOT: &str = "gensoal_api_key";

#[derive(Debug, Default, Serialize, Deserialize)]
struct KeyFile {
    #[serde(rename = "gensoal_api_key", skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
}

/// API Key 存储
///
/// 文件不存在或槽位为空都视为"未保存"，由调用方回退到环境变量中的默认密钥。
#[derive(Debug, Clone)]
pub struct KeyStore {
    path: PathBuf,
}

impl KeyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取已保存的密钥
    pub async fn load(&self) -> Result<Option<String>, StoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("密钥文件不存在: {}", self.path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.display().to_string(),
                    source,
                })
            }
        };

        let file: KeyFile = toml::from_str(&content).map_err(|source| StoreError::Parse {
            path: self.path.display().to_string(),
            source,
        })?;

        Ok(file
            .api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty()))
    }

    /// 保存密钥（覆盖旧值），空字符串会被拒绝
    pub async fn save(&self, key: &str) -> Result<(), StoreError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }

        let content = toml::to_string(&KeyFile {
            api_key: Some(key.to_string()),
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|source| StoreError::Write {
                path: parent.display().to_string(),
                source,
            })?;
        }

        fs::write(&self.path, content).await.map_err(|source| StoreError::Write {
            path: self.path.display().to_string(),
            source,
        })?;

        info!("🔑 API Key 已保存到 {}", self.path.display());
        Ok(())
    }

    /// 删除已保存的密钥
    pub async fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                info!("🗑️ 已删除本地 API Key");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Write {
                path: self.path.display().to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, KeyStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path().join("gensoal.toml"));
        (dir, store)
    }

    #[tokio::test]
    async fn test_load_missing_file_is_none() {
        let (_dir, store) = temp_store();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_overwrites_and_clear_removes() {
        let (_dir, store) = temp_store();
        store.save("AIzaSy-first").await.unwrap();
        store.save("  AIzaSy-second ").await.unwrap();
        assert_eq!(store.load().await.unwrap().as_deref(), Some("AIzaSy-second"));

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains(KEY_SLOT));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
        // 重复删除不报错
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_save_rejects_empty_key() {
        let (_dir, store) = temp_store();
        assert!(matches!(store.save("   ").await, Err(StoreError::EmptyKey)));
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_blank_slot_is_none() {
        let (_dir, store) = temp_store();
        std::fs::write(store.path(), "gensoal_api_key = \"  \"\n").unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_parse_error() {
        let (_dir, store) = temp_store();
        std::fs::write(store.path(), "gensoal_api_key = [").unwrap();
        assert!(matches!(store.load().await, Err(StoreError::Parse { .. })));
    }
}
