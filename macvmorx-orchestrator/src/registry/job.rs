//! Job registry
//!
//! Tracks every CI job the orchestrator has seen. Terminal states freeze a
//! record but never delete it.

use dashmap::DashMap;
use macvmorx_core::domain::job::JobStatus;

/// In-memory table of tracked CI jobs, keyed by the provider's job id
#[derive(Default)]
pub struct JobRegistry {
    jobs: DashMap<i64, JobStatus>,
}

impl JobRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new job or replaces an existing record
    pub fn add(&self, job: JobStatus) {
        tracing::info!("Job {} added with status: {}", job.job_id, job.status);
        self.jobs.insert(job.job_id, job);
    }

    /// Applies an in-place mutation under exclusive access to the record
    ///
    /// Unknown job ids are an ordering anomaly (e.g. a heartbeat observing a
    /// VM for a job the webhook never announced), not an error: warn and
    /// no-op.
    pub fn update<F>(&self, job_id: i64, mutate: F)
    where
        F: FnOnce(&mut JobStatus),
    {
        match self.jobs.get_mut(&job_id) {
            Some(mut entry) => {
                mutate(&mut entry);
                tracing::debug!("Job {} updated to status: {}", job_id, entry.status);
            }
            None => {
                tracing::warn!("Attempted to update non-existent job with id: {}", job_id);
            }
        }
    }

    /// Returns a snapshot of one job
    pub fn get(&self, job_id: i64) -> Option<JobStatus> {
        self.jobs.get(&job_id).map(|entry| entry.clone())
    }

    /// Returns point-in-time snapshots of all jobs
    pub fn list(&self) -> Vec<JobStatus> {
        self.jobs.iter().map(|entry| entry.clone()).collect()
    }
}
