//! Job lifecycle.
//!
//! ```text
//! Received -> Probed -> LadderSelected -> Encoding -> Completed -> Persisted
//!    |           |            |   \           |           |
//!    +-----------+------------+----\----------+-----------+--> Failed -> CleanedUp
//!                                   \
//!                                    +-> Rejected   (empty ladder)
//! ```

use std::fmt;
use std::path::PathBuf;
use vodforge_common::JobId;
use vodforge_media::Ladder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Received,
    Probed,
    LadderSelected,
    Encoding,
    Completed,
    Persisted,
    Failed,
    CleanedUp,
    Rejected,
}

impl JobStatus {
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, next),
            (Received, Probed)
                | (Probed, LadderSelected)
                | (LadderSelected, Encoding)
                | (LadderSelected, Rejected)
                | (Encoding, Completed)
                | (Completed, Persisted)
                | (Received | Probed | LadderSelected | Encoding | Completed, Failed)
                | (Failed, CleanedUp)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Persisted | Self::CleanedUp | Self::Rejected)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Probed => "probed",
            Self::LadderSelected => "ladder_selected",
            Self::Encoding => "encoding",
            Self::Completed => "completed",
            Self::Persisted => "persisted",
            Self::Failed => "failed",
            Self::CleanedUp => "cleaned_up",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("job {job_id}: illegal transition {from} -> {to}")]
pub struct InvalidTransition {
    pub job_id: JobId,
    pub from: JobStatus,
    pub to: JobStatus,
}

/// One upload being turned into a published video. Owned by a single
/// pipeline run and never shared.
#[derive(Debug)]
pub struct EncodingJob {
    pub job_id: JobId,
    pub source_path: PathBuf,
    pub output_dir: PathBuf,
    pub ladder: Ladder,
    status: JobStatus,
    history: Vec<JobStatus>,
}

impl EncodingJob {
    pub fn new(job_id: JobId, source_path: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            job_id,
            source_path,
            output_dir,
            ladder: Ladder::default(),
            status: JobStatus::Received,
            history: vec![JobStatus::Received],
        }
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Every status the job has been in, oldest first.
    pub fn history(&self) -> &[JobStatus] {
        &self.history
    }

    pub fn advance(&mut self, next: JobStatus) -> Result<(), InvalidTransition> {
        if !self.status.can_transition_to(next) {
            return Err(InvalidTransition {
                job_id: self.job_id,
                from: self.status,
                to: next,
            });
        }
        tracing::info!(job_id = %self.job_id, from = %self.status, to = %next, "job transition");
        self.status = next;
        self.history.push(next);
        Ok(())
    }
}
