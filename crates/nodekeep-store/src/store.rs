use std::collections::HashSet;
use std::path::Path;

use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use nodekeep_core::{Attachment, DownloadMeta};

use crate::paths::PathResolver;
use crate::{mime, naming, StoreConfig, StoreError};

/// Stateless façade over one node-per-directory attachment tree.
///
/// The directory listing is the source of truth; there is no registry to
/// keep consistent. Operations are plain sequences of filesystem calls and
/// carry no locking: concurrent callers racing on the same name are caught
/// by exclusive-create rather than silently overwriting each other.
pub struct AttachmentStore {
    resolver: PathResolver,
}

impl AttachmentStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        Self::open(&config.storage_root())
    }

    /// Open a store rooted at `root`, creating the directory if absent.
    pub fn open(root: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(root)
            .map_err(|e| StoreError::Write(format!("create root {}: {e}", root.display())))?;
        Ok(Self {
            resolver: PathResolver::new(root)?,
        })
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Attachments currently stored for a node, sorted by filename. A node
    /// with no directory yet has no attachments.
    pub async fn list(&self, node_id: &str) -> Result<Vec<Attachment>, StoreError> {
        let dir = self.resolver.node_dir(node_id)?;
        let mut attachments = Vec::new();
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(attachments),
            Err(e) => return Err(StoreError::Read(format!("list {}: {e}", dir.display()))),
        };
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::Read(format!("list {}: {e}", dir.display())))?
        {
            let meta = entry
                .metadata()
                .await
                .map_err(|e| StoreError::Read(format!("stat {:?}: {e}", entry.file_name())))?;
            if !meta.is_file() {
                continue;
            }
            attachments.push(Attachment {
                node_id: node_id.to_string(),
                filename: entry.file_name().to_string_lossy().to_string(),
                size_bytes: meta.len(),
            });
        }
        attachments.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(attachments)
    }

    /// Store an upload under a collision-free name, creating the node
    /// directory on first use. The returned attachment carries the
    /// allocated name, which may differ from `desired_name`.
    pub async fn create(
        &self,
        node_id: &str,
        desired_name: &str,
        content: Bytes,
    ) -> Result<Attachment, StoreError> {
        // Validate the requested name before touching the directory.
        self.resolver.resolve(node_id, desired_name)?;

        let dir = self.resolver.node_dir(node_id)?;
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::Write(format!("mkdir {}: {e}", dir.display())))?;

        let existing = self.filenames(node_id).await?;
        let filename = naming::allocate(desired_name, &existing);
        let path = self.resolver.resolve(node_id, &filename)?;

        // Exclusive create: if another upload won the race for this name
        // since the listing above, fail instead of overwriting its bytes.
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| StoreError::Write(format!("create {}: {e}", path.display())))?;
        file.write_all(&content)
            .await
            .map_err(|e| StoreError::Write(format!("write {}: {e}", path.display())))?;
        file.flush()
            .await
            .map_err(|e| StoreError::Write(format!("write {}: {e}", path.display())))?;

        debug!(node_id, filename = %filename, size = content.len(), "stored attachment");
        Ok(Attachment {
            node_id: node_id.to_string(),
            filename,
            size_bytes: content.len() as u64,
        })
    }

    /// Rename an attachment in place. The destination is caller-supplied
    /// and is validated independently of the source; an occupied
    /// destination is a `Conflict` and is never overwritten.
    pub async fn rename(
        &self,
        node_id: &str,
        current_name: &str,
        new_name: &str,
    ) -> Result<Attachment, StoreError> {
        let source = self.resolver.resolve(node_id, current_name)?;
        let destination = self.resolver.resolve(node_id, new_name)?;

        if file_exists(&destination).await? {
            return Err(StoreError::Conflict(format!(
                "{node_id}/{new_name} already exists"
            )));
        }
        let size_bytes = match tokio::fs::metadata(&source).await {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(format!("{node_id}/{current_name}")))
            }
            Err(e) => return Err(StoreError::Read(format!("stat {}: {e}", source.display()))),
        };
        tokio::fs::rename(&source, &destination)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    StoreError::NotFound(format!("{node_id}/{current_name}"))
                }
                _ => StoreError::Write(format!("rename {}: {e}", source.display())),
            })?;

        debug!(node_id, current_name, new_name, "renamed attachment");
        Ok(Attachment {
            node_id: node_id.to_string(),
            filename: new_name.to_string(),
            size_bytes,
        })
    }

    /// Read an attachment's bytes plus the download decision for it.
    pub async fn read(
        &self,
        node_id: &str,
        filename: &str,
    ) -> Result<(Bytes, DownloadMeta), StoreError> {
        let path = self.resolver.resolve(node_id, filename)?;
        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(format!("{node_id}/{filename}")))
            }
            Err(e) => return Err(StoreError::Read(format!("read {}: {e}", path.display()))),
        };
        let (content_type, disposition) = mime::detect(filename);
        let meta = DownloadMeta {
            filename: filename.to_string(),
            size_bytes: data.len() as u64,
            content_type,
            disposition,
        };
        Ok((Bytes::from(data), meta))
    }

    /// Remove an attachment. Deleting a name that is not present reports
    /// `NotFound` rather than success.
    pub async fn delete(&self, node_id: &str, filename: &str) -> Result<(), StoreError> {
        let path = self.resolver.resolve(node_id, filename)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(node_id, filename, "deleted attachment");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(format!("{node_id}/{filename}")))
            }
            Err(e) => Err(StoreError::Read(format!("delete {}: {e}", path.display()))),
        }
    }

    /// Snapshot of the filenames currently stored for a node.
    async fn filenames(&self, node_id: &str) -> Result<HashSet<String>, StoreError> {
        Ok(self
            .list(node_id)
            .await?
            .into_iter()
            .map(|a| a.filename)
            .collect())
    }
}

async fn file_exists(path: &Path) -> Result<bool, StoreError> {
    match tokio::fs::try_exists(path).await {
        Ok(exists) => Ok(exists),
        Err(e) => Err(StoreError::Read(format!("exists {}: {e}", path.display()))),
    }
}
