//! `ObjectStore` backed by a capability-scoped directory.
//!
//! All access goes through a `cap_std::fs::Dir` opened on the storage root,
//! so object paths cannot escape it. Writes land in a temporary sibling and
//! are renamed into place, leaving either the old object or the new one.

use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{ObjectStore, ObjectStoreError};

/// Stores objects as files below a root directory.
#[derive(Clone)]
pub struct FilesystemObjectStore {
    root: Arc<Dir>,
}

impl FilesystemObjectStore {
    /// Open (creating if needed) the storage root.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError::Io`] when the directory cannot be created
    /// or opened.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, ObjectStoreError> {
        let root = root.as_ref();
        Dir::create_ambient_dir_all(root, ambient_authority())
            .map_err(|err| io_error(root, &err))?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())
            .map_err(|err| io_error(root, &err))?;
        Ok(Self {
            root: Arc::new(dir),
        })
    }

    async fn with_root<T, F>(&self, operation: F) -> Result<T, ObjectStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> Result<T, ObjectStoreError> + Send + 'static,
    {
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || operation(&root))
            .await
            .map_err(|err| ObjectStoreError::io(format!("storage task failed: {err}")))?
    }
}

fn io_error(path: &Path, error: &io::Error) -> ObjectStoreError {
    ObjectStoreError::io(format!("{}: {error}", path.display()))
}

/// Accept only non-empty relative paths made of plain components.
fn validated(path: &str) -> Result<PathBuf, ObjectStoreError> {
    let candidate = Path::new(path);
    let plain = !path.is_empty()
        && candidate
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if plain {
        Ok(candidate.to_path_buf())
    } else {
        Err(ObjectStoreError::invalid_path(path))
    }
}

fn write_atomically(root: &Dir, path: &Path, bytes: &[u8]) -> Result<(), ObjectStoreError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        root.create_dir_all(parent)
            .map_err(|err| io_error(parent, &err))?;
    }
    let file_name = path
        .file_name()
        .ok_or_else(|| ObjectStoreError::invalid_path(path.display().to_string()))?;
    let staged = path.with_file_name(format!(
        ".{}.{}.tmp",
        file_name.to_string_lossy(),
        Uuid::new_v4().simple()
    ));

    if let Err(err) = root.write(&staged, bytes) {
        return Err(io_error(&staged, &err));
    }
    if let Err(err) = root.rename(&staged, root, path) {
        if let Err(cleanup) = root.remove_file(&staged) {
            debug!(path = %staged.display(), error = %cleanup, "failed to remove staged object");
        }
        return Err(io_error(path, &err));
    }
    Ok(())
}

#[async_trait]
impl ObjectStore for FilesystemObjectStore {
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<(), ObjectStoreError> {
        let relative = validated(path)?;
        let bytes = bytes.to_vec();
        self.with_root(move |root| write_atomically(root, &relative, &bytes))
            .await
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, ObjectStoreError> {
        let relative = validated(path)?;
        let requested = path.to_owned();
        self.with_root(move |root| match root.read(&relative) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(ObjectStoreError::not_found(requested))
            }
            Err(err) => Err(io_error(&relative, &err)),
        })
        .await
    }

    async fn delete(&self, path: &str) -> Result<(), ObjectStoreError> {
        let relative = validated(path)?;
        self.with_root(move |root| match root.remove_file(&relative) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(&relative, &err)),
        })
        .await
    }
}
