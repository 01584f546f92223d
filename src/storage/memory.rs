use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use crate::domain::{Company, Job, Transaction};
use crate::errors::StoreError;

use super::{LedgerSnapshot, RecordStore, Result, TransactionScope};

/// Process-local store. Supports atomic multi-row inserts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<LedgerSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        Self {
            inner: RwLock::new(snapshot),
        }
    }

    /// Copy of every record currently held.
    pub fn snapshot(&self) -> Result<LedgerSnapshot> {
        Ok(self.read()?.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, LedgerSnapshot>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, LedgerSnapshot>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }
}

impl RecordStore for MemoryStore {
    fn list_jobs(&self) -> Result<Vec<Job>> {
        Ok(self.read()?.jobs.clone())
    }

    fn job(&self, id: Uuid) -> Result<Option<Job>> {
        Ok(self.read()?.job(id).cloned())
    }

    fn insert_job(&self, job: Job) -> Result<Job> {
        self.write()?.insert_job(job)
    }

    fn update_job(&self, job: Job) -> Result<Job> {
        self.write()?.update_job(job)
    }

    fn delete_job(&self, id: Uuid) -> Result<()> {
        self.write()?.delete_job(id)
    }

    fn list_companies(&self, job_id: Uuid) -> Result<Vec<Company>> {
        Ok(self.read()?.companies_for(job_id))
    }

    fn list_all_companies(&self) -> Result<Vec<Company>> {
        Ok(self.read()?.companies.clone())
    }

    fn company(&self, id: Uuid) -> Result<Option<Company>> {
        Ok(self.read()?.company(id).cloned())
    }

    fn insert_company(&self, company: Company) -> Result<Company> {
        self.write()?.insert_company(company)
    }

    fn update_company(&self, company: Company) -> Result<Company> {
        self.write()?.update_company(company)
    }

    fn delete_company(&self, id: Uuid) -> Result<()> {
        self.write()?.delete_company(id)
    }

    fn list_transactions(&self, scope: TransactionScope) -> Result<Vec<Transaction>> {
        Ok(self.read()?.transactions_in(scope))
    }

    fn insert_transaction(&self, transaction: Transaction) -> Result<Transaction> {
        self.write()?.insert_transaction(transaction)
    }

    fn delete_transaction(&self, id: Uuid) -> Result<()> {
        self.write()?.delete_transaction(id)
    }

    fn insert_transactions(&self, transactions: Vec<Transaction>) -> Result<Vec<Transaction>> {
        self.write()?.insert_transactions(transactions)
    }
}
