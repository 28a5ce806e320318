//! Per-job output directories and their cleanup.

use crate::{Error, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use vodforge_common::JobId;
use vodforge_media::hls::master_manifest_name;

/// Directory that holds everything one job produces.
///
/// Layout under `<media_root>/<job_id>/`:
///
/// - `video-<job_id>.<ext>` the uploaded source, until the job finishes
/// - `<preset>.m3u8` and `<preset>_NNN.ts` per rendition
/// - `index.m3u8` the master manifest, written last
///
/// The directory name is the job id, so concurrent jobs never share paths.
///
/// ```no_run
/// use vodforge_av::JobWorkspace;
/// use vodforge_common::JobId;
///
/// # async fn example() -> vodforge_av::Result<()> {
/// let workspace = JobWorkspace::create("public".as_ref(), JobId::new()).await?;
/// let source = workspace.source_path(Some("mp4"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct JobWorkspace {
    job_id: JobId,
    dir: PathBuf,
}

impl JobWorkspace {
    /// Create `<media_root>/<job_id>/`. Fails if it already exists.
    pub async fn create(media_root: &Path, job_id: JobId) -> Result<Self> {
        tokio::fs::create_dir_all(media_root).await.map_err(|e| {
            Error::Workspace(format!(
                "failed to create media root {}: {e}",
                media_root.display()
            ))
        })?;

        let dir = media_root.join(job_id.to_string());
        tokio::fs::create_dir(&dir).await.map_err(|e| {
            Error::Workspace(format!("failed to create {}: {e}", dir.display()))
        })?;

        tracing::debug!(job_id = %job_id, dir = %dir.display(), "created job workspace");
        Ok(Self { job_id, dir })
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the uploaded source is stored: `video-<job_id>[.<ext>]`.
    ///
    /// `ext` comes from the client's file name, so anything that is not a
    /// short alphanumeric token is dropped.
    pub fn source_path(&self, ext: Option<&str>) -> PathBuf {
        let name = match ext.and_then(sanitize_extension) {
            Some(ext) => format!("video-{}.{ext}", self.job_id),
            None => format!("video-{}", self.job_id),
        };
        self.dir.join(name)
    }

    /// Path of the master manifest, `index.m3u8`.
    pub fn master_manifest_path(&self) -> PathBuf {
        self.dir.join(master_manifest_name())
    }
}

fn sanitize_extension(ext: &str) -> Option<String> {
    let ext = ext.trim_start_matches('.');
    let ok = !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric());
    ok.then(|| ext.to_ascii_lowercase())
}

/// A path the cleanup manager could not remove.
#[derive(Debug, thiserror::Error)]
#[error("failed to remove {}: {source}", path.display())]
pub struct CleanupError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Remove a file, treating "already gone" as success.
///
/// Returns whether this call removed it.
pub async fn remove_file_idempotent(path: &Path) -> std::result::Result<bool, CleanupError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(source) => Err(CleanupError {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Remove a job's output directory and its source file.
///
/// Failures are logged at `warn` and returned for inspection; they are never
/// turned into errors, so cleanup cannot hide the failure that triggered it.
pub async fn cleanup(output_dir: &Path, source: &Path) -> Vec<CleanupError> {
    let mut failures = Vec::new();

    match tokio::fs::remove_dir_all(output_dir).await {
        Ok(()) => tracing::debug!(dir = %output_dir.display(), "removed job directory"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(source) => failures.push(CleanupError {
            path: output_dir.to_path_buf(),
            source,
        }),
    }

    // Usually inside output_dir and already gone.
    if let Err(e) = remove_file_idempotent(source).await {
        failures.push(e);
    }

    for failure in &failures {
        tracing::warn!(error = %failure, "cleanup failed");
    }
    failures
}

/// Removes a job's directory and source when dropped, unless disarmed.
///
/// Covers the window between allocating a workspace and handing it to the
/// pipeline, where the owning future can be dropped at any await point.
#[derive(Debug)]
pub struct CleanupGuard {
    dir: PathBuf,
    source: PathBuf,
    armed: bool,
}

impl CleanupGuard {
    pub fn new(workspace: &JobWorkspace, source: &Path) -> Self {
        Self {
            dir: workspace.dir().to_path_buf(),
            source: source.to_path_buf(),
            armed: true,
        }
    }

    /// Ownership of the materials has moved on; dropping does nothing.
    pub fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        tracing::debug!(dir = %self.dir.display(), "abandoned job workspace, removing");
        if let Err(e) = std::fs::remove_dir_all(&self.dir) {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!(dir = %self.dir.display(), error = %e, "cleanup failed");
            }
        }
        if let Err(e) = std::fs::remove_file(&self.source) {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!(path = %self.source.display(), error = %e, "cleanup failed");
            }
        }
    }
}
