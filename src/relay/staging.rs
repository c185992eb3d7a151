// Staging area - per-request workspaces for collaborator output
//
// Every download gets its own directory below the staging root. The workspace
// is removed when its guard is released, so a request never leaves files
// behind, whatever path it exits through.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::errors::RelayError;

/// Root staging directory shared by all requests
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a fresh workspace (and the root, if absent)
    pub async fn workspace(&self) -> Result<StagingWorkspace, RelayError> {
        if !self.root.exists() {
            tracing::info!("Creating staging directory {}", self.root.display());
        }
        let dir = self.root.join(Uuid::new_v4().to_string());
        tokio::fs::create_dir_all(&dir).await?;
        // yt-dlp and the python bridge run with other working directories
        let dir = tokio::fs::canonicalize(&dir).await.unwrap_or(dir);
        Ok(StagingWorkspace { dir: Some(dir) })
    }
}

/// One request's workspace; removed on release, or on drop as a fallback
#[derive(Debug)]
pub struct StagingWorkspace {
    dir: Option<PathBuf>,
}

impl StagingWorkspace {
    pub fn path(&self) -> &Path {
        self.dir.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Remove the workspace now. Returns false if removal failed; it is then
    /// retried on drop.
    pub async fn release(&mut self) -> bool {
        let Some(dir) = self.dir.clone() else {
            return true;
        };
        let removed = match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {
                tracing::info!("Cleaning up: removed {}", dir.display());
                true
            }
            Err(e) if e.kind() == ErrorKind::NotFound => true,
            Err(e) => {
                tracing::warn!("Failed to remove staging workspace {}: {}", dir.display(), e);
                false
            }
        };
        if removed {
            self.dir = None;
        }
        removed
    }
}

impl Drop for StagingWorkspace {
    // Early-return paths that never reached `release`; drop cannot await
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => tracing::info!("Cleaning up: removed {}", dir.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!("Failed to remove staging workspace {}: {}", dir.display(), e)
            }
        }
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case(extension))
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

/// Locate the collaborator's output file.
///
/// Reported paths are preferred; the directory scan (extension + identifier
/// substring, first match in listing order) is the last resort.
pub async fn locate_output(
    dir: &Path,
    reported: &[PathBuf],
    extension: &str,
    identifier: &str,
) -> Option<PathBuf> {
    for path in reported.iter().filter(|p| has_extension(p, extension)) {
        if is_file(path).await {
            return Some(path.clone());
        }
    }

    let mut entries = tokio::fs::read_dir(dir).await.ok()?;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        let named = path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(false, |n| n.contains(identifier));
        if named && has_extension(&path, extension) && is_file(&path).await {
            return Some(path);
        }
    }
    None
}

/// A staged file ready to stream. Owns its workspace.
#[derive(Debug)]
pub struct DownloadedFile {
    pub local_path: PathBuf,
    pub suggested_name: String,
    pub size_bytes: u64,
    workspace: StagingWorkspace,
}

impl DownloadedFile {
    /// Verify `path` exists and is non-empty, taking ownership of the workspace.
    /// On failure the workspace is removed before the error is returned.
    pub async fn verify(
        mut workspace: StagingWorkspace,
        path: Option<PathBuf>,
        suggested_name: String,
    ) -> Result<Self, RelayError> {
        let size_bytes = match &path {
            Some(p) => match tokio::fs::metadata(p).await {
                Ok(meta) if meta.is_file() && meta.len() > 0 => Some(meta.len()),
                _ => None,
            },
            None => None,
        };

        match (path, size_bytes) {
            (Some(path), Some(size_bytes)) => {
                tracing::info!("Staged file {} ({} bytes)", path.display(), size_bytes);
                Ok(Self {
                    local_path: path,
                    suggested_name,
                    size_bytes,
                    workspace,
                })
            }
            (path, _) => {
                let missing = path.unwrap_or_else(|| workspace.path().to_path_buf());
                tracing::error!("File not found or empty at {}", missing.display());
                workspace.release().await;
                Err(RelayError::FileNotProduced(missing.display().to_string()))
            }
        }
    }

    /// Open for streaming and delete the staged copy right away. The open
    /// handle keeps the data readable where the platform allows it; otherwise
    /// deletion happens when the returned guard is dropped.
    pub async fn open(mut self) -> Result<(tokio::fs::File, StagingWorkspace), RelayError> {
        let file = tokio::fs::File::open(&self.local_path).await?;
        self.workspace.release().await;
        Ok((file, self.workspace))
    }
}
