//! Job create/read/update/delete helpers.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{ActorId, Job, JobStatus, JobUpdate};
use crate::errors::{LedgerError, LedgerResult, StoreError, ValidationError};
use crate::storage::RecordStore;

/// Fields supplied when opening a job.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: JobStatus,
}

pub struct JobService;

impl JobService {
    pub fn create(
        store: &dyn RecordStore,
        actor: Option<&ActorId>,
        new_job: NewJob,
    ) -> LedgerResult<Job> {
        let name = required_name(&new_job.name)?;
        let owner = actor.ok_or(LedgerError::Unauthenticated)?;
        let mut job = Job::new(owner.clone(), name, new_job.start_date, new_job.status)
            .with_description(new_job.description);
        job.end_date = new_job.end_date;

        let job = store.insert_job(job)?;
        tracing::info!(job = %job.id, name = %job.name, "job created");
        Ok(job)
    }

    pub fn update(store: &dyn RecordStore, id: Uuid, mut update: JobUpdate) -> LedgerResult<Job> {
        if let Some(name) = update.name.take() {
            update.name = Some(required_name(&name)?);
        }
        let mut job = store
            .job(id)?
            .ok_or_else(|| StoreError::NotFound(format!("job {}", id)))?;
        job.apply(update);
        let job = store.update_job(job)?;
        tracing::info!(job = %job.id, "job updated");
        Ok(job)
    }

    /// Deletes the job; the store removes its companies and transactions.
    pub fn remove(store: &dyn RecordStore, id: Uuid) -> LedgerResult<()> {
        store.delete_job(id)?;
        tracing::info!(job = %id, "job deleted");
        Ok(())
    }

    pub fn get(store: &dyn RecordStore, id: Uuid) -> LedgerResult<Option<Job>> {
        Ok(store.job(id)?)
    }

    /// Every job, newest first.
    pub fn list(store: &dyn RecordStore) -> LedgerResult<Vec<Job>> {
        let mut jobs = store.list_jobs()?;
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs)
    }
}

pub(crate) fn required_name(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(ValidationError::EmptyName)
    } else {
        Ok(trimmed.to_string())
    }
}
