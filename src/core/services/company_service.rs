//! Company create/read/rename/delete helpers.

use uuid::Uuid;

use super::job_service::required_name;
use crate::domain::{ActorId, Company, CompanyType};
use crate::errors::{LedgerError, LedgerResult, StoreError};
use crate::storage::RecordStore;

pub struct CompanyService;

impl CompanyService {
    /// Adds a company to `job_id`. The type cannot be changed afterwards.
    pub fn create(
        store: &dyn RecordStore,
        actor: Option<&ActorId>,
        job_id: Uuid,
        name: &str,
        kind: CompanyType,
    ) -> LedgerResult<Company> {
        let name = required_name(name)?;
        let owner = actor.ok_or(LedgerError::Unauthenticated)?;
        if store.job(job_id)?.is_none() {
            return Err(StoreError::NotFound(format!("job {}", job_id)).into());
        }
        let company = store.insert_company(Company::new(job_id, owner.clone(), name, kind))?;
        tracing::info!(
            company = %company.id,
            job = %job_id,
            kind = company.kind.label(),
            "company created"
        );
        Ok(company)
    }

    pub fn rename(store: &dyn RecordStore, id: Uuid, name: &str) -> LedgerResult<Company> {
        let name = required_name(name)?;
        let mut company = store
            .company(id)?
            .ok_or_else(|| StoreError::NotFound(format!("company {}", id)))?;
        company.rename(name);
        Ok(store.update_company(company)?)
    }

    /// Deletes the company; the store removes every transaction it is the
    /// target or actor of.
    pub fn remove(store: &dyn RecordStore, id: Uuid) -> LedgerResult<()> {
        store.delete_company(id)?;
        tracing::info!(company = %id, "company deleted");
        Ok(())
    }

    pub fn get(store: &dyn RecordStore, id: Uuid) -> LedgerResult<Option<Company>> {
        Ok(store.company(id)?)
    }

    /// Companies of a job, newest first.
    pub fn list_for_job(store: &dyn RecordStore, job_id: Uuid) -> LedgerResult<Vec<Company>> {
        let mut companies = store.list_companies(job_id)?;
        companies.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(companies)
    }
}
