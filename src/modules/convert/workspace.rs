use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::api::error;

const INPUT_DIR: &str = "input";
const OUTPUT_DIR: &str = "output";

/// Hands out per-request scratch directories under a single root.
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
}

impl WorkspaceManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create `<root>/<uuid>` with `input/` and `output/` inside.
    pub async fn acquire(&self) -> Result<Workspace, error::SystemError> {
        tokio::fs::create_dir_all(&self.root).await?;

        let id = Uuid::new_v4();
        let path = self.root.join(id.simple().to_string());
        tokio::fs::create_dir(&path).await?;

        // From here on the guard owns the directory, even if the subdirs fail.
        let workspace = Workspace { id, path, released: false };
        tokio::fs::create_dir(workspace.input_dir()).await?;
        tokio::fs::create_dir(workspace.output_dir()).await?;

        log::debug!("Workspace {} acquired at {}", id, workspace.path.display());
        Ok(workspace)
    }
}

/// A scratch directory owned by one request. Removed on `release` or, failing that, on drop.
#[derive(Debug)]
pub struct Workspace {
    id: Uuid,
    path: PathBuf,
    released: bool,
}

impl Workspace {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn input_dir(&self) -> PathBuf {
        self.path.join(INPUT_DIR)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.path.join(OUTPUT_DIR)
    }

    /// Converter profile directory for one invocation.
    pub fn profile_dir(&self, index: usize) -> PathBuf {
        self.path.join(format!("profile-{}", index))
    }

    /// Recursively delete the directory. Absence is not an error.
    pub async fn release(mut self) -> Result<(), error::SystemError> {
        self.released = true;
        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => {
                log::debug!("Workspace {} released", self.id);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => log::debug!("Workspace {} removed on drop", self.id),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => log::error!("Failed to remove workspace {}: {}", self.path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn test_acquire_creates_unique_dirs() {
        let root = tempfile::tempdir().unwrap();
        let manager = WorkspaceManager::new(root.path());

        let a = manager.acquire().await.unwrap();
        let b = manager.acquire().await.unwrap();

        assert_ne!(a.path(), b.path());
        assert!(a.input_dir().is_dir());
        assert!(a.output_dir().is_dir());
        assert!(a.path().starts_with(root.path()));
    }

    #[actix_web::test]
    async fn test_release_removes_everything() {
        let root = tempfile::tempdir().unwrap();
        let manager = WorkspaceManager::new(root.path());
        let ws = manager.acquire().await.unwrap();
        let path = ws.path().to_path_buf();
        tokio::fs::write(ws.input_dir().join("a.docx"), b"data").await.unwrap();

        ws.release().await.unwrap();
        assert!(!path.exists());
    }

    #[actix_web::test]
    async fn test_release_tolerates_missing_dir() {
        let root = tempfile::tempdir().unwrap();
        let manager = WorkspaceManager::new(root.path());
        let ws = manager.acquire().await.unwrap();
        std::fs::remove_dir_all(ws.path()).unwrap();

        assert!(ws.release().await.is_ok());
    }

    #[actix_web::test]
    async fn test_drop_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let manager = WorkspaceManager::new(root.path());
        let path = {
            let ws = manager.acquire().await.unwrap();
            ws.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[actix_web::test]
    async fn test_acquire_fails_on_unwritable_root() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let manager = WorkspaceManager::new(&blocker);
        assert!(matches!(manager.acquire().await, Err(error::SystemError::Io(_))));
    }
}
