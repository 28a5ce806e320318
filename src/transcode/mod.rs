//! Transcoding pipeline.
//!
//! [`Transcoder::upload_and_transcode`] takes a source already written into a
//! job workspace and runs it through probe, ladder selection, one encoding
//! session, master manifest synthesis and registration. Any fault after the
//! workspace exists removes it again, so a failed job leaves nothing behind.

mod error;
mod job;

pub use error::TranscodeError;
pub use job::{EncodingJob, InvalidTransition, JobStatus};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use vodforge_av::{
    encode, inspect, workspace, EncodeOutcome, EncodeSettings, EncodingEngine, JobWorkspace,
    Prober,
};
use vodforge_common::JobId;
use vodforge_db::{pool, queries::videos, DbPool, VideoRecord};
use vodforge_media::{hls, ladder, Catalog};

/// A job that made it all the way to a registered video.
#[derive(Debug, Clone)]
pub struct Published {
    pub job_id: JobId,
    pub master_manifest_path: PathBuf,
    pub record: VideoRecord,
}

/// Runs jobs, at most `max_concurrent_jobs` at a time.
pub struct Transcoder {
    catalog: Catalog,
    settings: EncodeSettings,
    media_root: PathBuf,
    prober: Arc<dyn Prober>,
    engine: Arc<dyn EncodingEngine>,
    db: DbPool,
    permits: Semaphore,
}

impl Transcoder {
    pub fn new(
        catalog: Catalog,
        settings: EncodeSettings,
        media_root: PathBuf,
        prober: Arc<dyn Prober>,
        engine: Arc<dyn EncodingEngine>,
        db: DbPool,
        max_concurrent_jobs: usize,
    ) -> Self {
        Self {
            catalog,
            settings,
            media_root,
            prober,
            engine,
            db,
            permits: Semaphore::new(max_concurrent_jobs.max(1)),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn media_root(&self) -> &Path {
        &self.media_root
    }

    /// Jobs that could start right now without waiting.
    pub fn available_slots(&self) -> usize {
        self.permits.available_permits()
    }

    /// Create a fresh workspace for an incoming upload.
    pub async fn allocate(&self) -> vodforge_av::Result<JobWorkspace> {
        JobWorkspace::create(&self.media_root, JobId::new()).await
    }

    /// Run a job on its own task.
    ///
    /// The job outlives the caller: dropping the handle detaches it, and it
    /// still runs to publication or to failure and cleanup.
    pub fn spawn(
        self: &Arc<Self>,
        workspace: JobWorkspace,
        source: PathBuf,
        title: Option<String>,
    ) -> JoinHandle<Result<Published, TranscodeError>> {
        let transcoder = Arc::clone(self);
        tokio::spawn(async move {
            transcoder
                .upload_and_transcode(workspace, source, title)
                .await
        })
    }

    /// Run one job to a published video or a typed failure.
    ///
    /// `source` must be fully written. On any failure the workspace and the
    /// source are removed; on success only the source is.
    pub async fn upload_and_transcode(
        &self,
        workspace: JobWorkspace,
        source: PathBuf,
        title: Option<String>,
    ) -> Result<Published, TranscodeError> {
        let mut job = EncodingJob::new(workspace.job_id(), source, workspace.dir().to_path_buf());
        tracing::info!(job_id = %job.job_id, source = %job.source_path.display(), "job received");

        let title = match validate(&job.source_path, title) {
            Ok(title) => title,
            Err(e) => return Err(self.fail(&mut job, e).await),
        };

        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                let err = TranscodeError::Encode("transcoder is shut down".to_string());
                return Err(self.fail(&mut job, err).await);
            }
        };

        // Held for the whole job and released on drop, whatever the outcome.
        let conn = match pool::get_conn(&self.db) {
            Ok(conn) => conn,
            Err(e) => {
                let err = TranscodeError::Persistence(e.to_string());
                return Err(self.fail(&mut job, err).await);
            }
        };

        let profile = match inspect(self.prober.as_ref(), &job.source_path).await {
            Ok(profile) => profile,
            Err(e) => return Err(self.fail(&mut job, e.into()).await),
        };
        step(&mut job, JobStatus::Probed);

        job.ladder = ladder::select(&self.catalog, &profile);
        step(&mut job, JobStatus::LadderSelected);
        tracing::info!(
            job_id = %job.job_id,
            width = profile.width,
            height = profile.height,
            ladder = ?job.ladder.names(),
            "ladder selected"
        );

        if job.ladder.is_empty() {
            step(&mut job, JobStatus::Rejected);
            workspace::cleanup(&job.output_dir, &job.source_path).await;
            return Err(TranscodeError::EmptyLadder {
                width: profile.width,
                height: profile.height,
            });
        }

        let session = encode::build(&job.source_path, &job.output_dir, &job.ladder, &self.settings);
        step(&mut job, JobStatus::Encoding);

        let outcome = match self.engine.run(&session).await {
            // Trust the disk, not the engine.
            EncodeOutcome::Completed => session.outcome_from_disk(),
            outcome => outcome,
        };

        match outcome {
            EncodeOutcome::Completed => {}
            EncodeOutcome::Failed { message } => {
                return Err(self.fail(&mut job, TranscodeError::Encode(message)).await);
            }
            EncodeOutcome::Partial { completed, failed } => {
                let err = TranscodeError::Encode(format!(
                    "{} of {} renditions missing: {}",
                    failed.len(),
                    completed.len() + failed.len(),
                    failed.join(", ")
                ));
                return Err(self.fail(&mut job, err).await);
            }
        }

        let master_path = workspace.master_manifest_path();
        if let Err(e) = tokio::fs::write(&master_path, hls::synthesize(&job.ladder)).await {
            let err = TranscodeError::Encode(format!("failed to write master manifest: {e}"));
            return Err(self.fail(&mut job, err).await);
        }
        step(&mut job, JobStatus::Completed);

        let master_str = master_path.to_string_lossy();
        let record = match videos::insert_video(&conn, &title, &master_str) {
            Ok(record) => record,
            Err(e) => {
                let err = TranscodeError::Persistence(e.to_string());
                return Err(self.fail(&mut job, err).await);
            }
        };
        drop(conn);
        step(&mut job, JobStatus::Persisted);

        if let Err(e) = workspace::remove_file_idempotent(&job.source_path).await {
            tracing::warn!(job_id = %job.job_id, error = %e, "failed to remove source after publish");
        }

        tracing::info!(
            job_id = %job.job_id,
            video_id = record.id,
            renditions = job.ladder.len(),
            "job published"
        );

        Ok(Published {
            job_id: job.job_id,
            master_manifest_path: master_path,
            record,
        })
    }

    /// Mark the job failed, clean up its materials and hand back `err`.
    async fn fail(&self, job: &mut EncodingJob, err: TranscodeError) -> TranscodeError {
        if err.is_rejection() {
            tracing::info!(job_id = %job.job_id, error = %err, "job rejected");
        } else {
            tracing::error!(job_id = %job.job_id, status = %job.status(), error = %err, "job failed");
        }

        step(job, JobStatus::Failed);
        workspace::cleanup(&job.output_dir, &job.source_path).await;
        step(job, JobStatus::CleanedUp);
        err
    }
}

fn step(job: &mut EncodingJob, next: JobStatus) {
    if let Err(e) = job.advance(next) {
        tracing::error!(error = %e, "job state machine violated");
    }
}

fn validate(source: &Path, title: Option<String>) -> Result<String, TranscodeError> {
    if !source.is_file() {
        return Err(TranscodeError::Validation("Please upload a file".to_string()));
    }

    let title = match title {
        Some(title) => title.trim().to_string(),
        None => source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };
    if title.is_empty() {
        return Err(TranscodeError::Validation("Title must not be empty".to_string()));
    }
    Ok(title)
}
