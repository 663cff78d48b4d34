pub mod mime;
pub mod naming;
pub mod paths;
mod store;

pub use paths::PathResolver;
pub use store::AttachmentStore;

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Traversal or malformed filename attempted. Security-relevant: the
    /// store logs every occurrence at `warn` before returning it.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("read error: {0}")]
    Read(String),
}

// -- Configuration --

/// Configuration for the attachment store.
pub struct StoreConfig {
    /// Storage root directory. When `None`, falls back to
    /// `$XDG_DATA_HOME/nodekeep/attachments` (or `~/.local/share/...`).
    pub data_dir: Option<String>,
}

impl StoreConfig {
    /// Build from environment variables (`NODEKEEP_DATA_DIR`).
    pub fn from_env() -> Self {
        Self {
            data_dir: std::env::var("NODEKEEP_DATA_DIR").ok(),
        }
    }

    pub fn storage_root(&self) -> PathBuf {
        self.data_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir)
    }
}

fn default_data_dir() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local/share")
    } else {
        PathBuf::from(".")
    };
    base.join("nodekeep").join("attachments")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_data_dir_wins() {
        let config = StoreConfig {
            data_dir: Some("/tmp/attachments".into()),
        };
        assert_eq!(config.storage_root(), PathBuf::from("/tmp/attachments"));
    }

    // Mutates global env vars; subtests run sequentially in one test to
    // avoid races with parallel test execution.
    #[test]
    fn default_root_fallback_order() {
        use std::sync::Mutex;
        static ENV_LOCK: Mutex<()> = Mutex::new(());
        let _guard = ENV_LOCK.lock().unwrap();

        let saved_xdg = std::env::var_os("XDG_DATA_HOME");

        std::env::set_var("XDG_DATA_HOME", "/data");
        let config = StoreConfig { data_dir: None };
        assert_eq!(
            config.storage_root(),
            PathBuf::from("/data/nodekeep/attachments")
        );

        std::env::remove_var("XDG_DATA_HOME");
        if std::env::var_os("HOME").is_some() {
            let root = StoreConfig { data_dir: None }.storage_root();
            assert!(root.ends_with("nodekeep/attachments"));
        }

        match saved_xdg {
            Some(v) => std::env::set_var("XDG_DATA_HOME", v),
            None => std::env::remove_var("XDG_DATA_HOME"),
        }
    }
}
