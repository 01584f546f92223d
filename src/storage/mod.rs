//! Record store contract consumed by the query façade, plus two backends.
//!
//! Stores own persistence, cascade deletes and access scoping. The engine
//! only reads complete record sets and inserts new rows through this trait.

pub mod json_backend;
pub mod memory;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::transaction::MAX_AMOUNT;
use crate::domain::{Company, Job, Transaction};
use crate::errors::StoreError;

pub use json_backend::JsonStore;
pub use memory::MemoryStore;

pub type Result<T> = std::result::Result<T, StoreError>;

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Which transactions a listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionScope {
    All,
    Job(Uuid),
    /// Transactions where the company is the target or the acting party.
    Company(Uuid),
}

impl TransactionScope {
    pub fn matches(&self, txn: &Transaction) -> bool {
        match self {
            TransactionScope::All => true,
            TransactionScope::Job(job_id) => txn.job_id == *job_id,
            TransactionScope::Company(company_id) => txn.involves(*company_id),
        }
    }
}

/// Abstraction over persistence backends holding jobs, companies and
/// transactions. Listings return complete sets with no pagination.
pub trait RecordStore: Send + Sync {
    fn list_jobs(&self) -> Result<Vec<Job>>;
    fn job(&self, id: Uuid) -> Result<Option<Job>>;
    fn insert_job(&self, job: Job) -> Result<Job>;
    fn update_job(&self, job: Job) -> Result<Job>;
    /// Removes the job together with its companies and transactions.
    fn delete_job(&self, id: Uuid) -> Result<()>;

    fn list_companies(&self, job_id: Uuid) -> Result<Vec<Company>>;
    fn list_all_companies(&self) -> Result<Vec<Company>>;
    fn company(&self, id: Uuid) -> Result<Option<Company>>;
    fn insert_company(&self, company: Company) -> Result<Company>;
    fn update_company(&self, company: Company) -> Result<Company>;
    /// Removes the company and every transaction it is the target or actor of.
    fn delete_company(&self, id: Uuid) -> Result<()>;

    fn list_transactions(&self, scope: TransactionScope) -> Result<Vec<Transaction>>;
    fn insert_transaction(&self, transaction: Transaction) -> Result<Transaction>;
    fn delete_transaction(&self, id: Uuid) -> Result<()>;

    /// Inserts every row or none. Backends without multi-row atomicity keep
    /// the default, which reports the operation as unsupported.
    fn insert_transactions(&self, _transactions: Vec<Transaction>) -> Result<Vec<Transaction>> {
        Err(StoreError::Unsupported("atomic multi-row insert"))
    }
}

/// Complete record set shared by the bundled backends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerSnapshot {
    #[serde(default = "LedgerSnapshot::schema_version_default")]
    pub schema_version: u32,
    #[serde(default)]
    pub jobs: Vec<Job>,
    #[serde(default)]
    pub companies: Vec<Company>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Default for LedgerSnapshot {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            jobs: Vec::new(),
            companies: Vec::new(),
            transactions: Vec::new(),
        }
    }
}

impl LedgerSnapshot {
    fn schema_version_default() -> u32 {
        CURRENT_SCHEMA_VERSION
    }

    pub fn job(&self, id: Uuid) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id == id)
    }

    pub fn company(&self, id: Uuid) -> Option<&Company> {
        self.companies.iter().find(|company| company.id == id)
    }

    pub fn companies_for(&self, job_id: Uuid) -> Vec<Company> {
        self.companies
            .iter()
            .filter(|company| company.job_id == job_id)
            .cloned()
            .collect()
    }

    pub fn transactions_in(&self, scope: TransactionScope) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|txn| scope.matches(txn))
            .cloned()
            .collect()
    }

    pub fn insert_job(&mut self, job: Job) -> Result<Job> {
        if self.job(job.id).is_some() {
            return Err(StoreError::Backend(format!("job {} already exists", job.id)));
        }
        self.jobs.push(job.clone());
        Ok(job)
    }

    pub fn update_job(&mut self, job: Job) -> Result<Job> {
        let slot = self
            .jobs
            .iter_mut()
            .find(|existing| existing.id == job.id)
            .ok_or_else(|| StoreError::NotFound(format!("job {}", job.id)))?;
        *slot = job.clone();
        Ok(job)
    }

    pub fn delete_job(&mut self, id: Uuid) -> Result<()> {
        if self.job(id).is_none() {
            return Err(StoreError::NotFound(format!("job {}", id)));
        }
        self.jobs.retain(|job| job.id != id);
        self.companies.retain(|company| company.job_id != id);
        self.transactions.retain(|txn| txn.job_id != id);
        Ok(())
    }

    pub fn insert_company(&mut self, company: Company) -> Result<Company> {
        if self.company(company.id).is_some() {
            return Err(StoreError::Backend(format!(
                "company {} already exists",
                company.id
            )));
        }
        self.companies.push(company.clone());
        Ok(company)
    }

    pub fn update_company(&mut self, company: Company) -> Result<Company> {
        let slot = self
            .companies
            .iter_mut()
            .find(|existing| existing.id == company.id)
            .ok_or_else(|| StoreError::NotFound(format!("company {}", company.id)))?;
        *slot = company.clone();
        Ok(company)
    }

    pub fn delete_company(&mut self, id: Uuid) -> Result<()> {
        if self.company(id).is_none() {
            return Err(StoreError::NotFound(format!("company {}", id)));
        }
        self.companies.retain(|company| company.id != id);
        self.transactions.retain(|txn| !txn.involves(id));
        Ok(())
    }

    /// Rejects rows whose amounts fall outside `0..=MAX_AMOUNT`, so totals
    /// computed over the snapshot cannot overflow.
    pub fn check_transaction(txn: &Transaction) -> Result<()> {
        if txn.amounts_in_range() {
            Ok(())
        } else {
            Err(StoreError::InvalidRecord(format!(
                "transaction {} has an amount outside 0..={}",
                txn.id, MAX_AMOUNT
            )))
        }
    }

    /// Checks every stored transaction with [`LedgerSnapshot::check_transaction`].
    pub fn verify(&self) -> Result<()> {
        self.transactions.iter().try_for_each(Self::check_transaction)
    }

    pub fn insert_transaction(&mut self, transaction: Transaction) -> Result<Transaction> {
        Self::check_transaction(&transaction)?;
        if self.transactions.iter().any(|txn| txn.id == transaction.id) {
            return Err(StoreError::Backend(format!(
                "transaction {} already exists",
                transaction.id
            )));
        }
        self.transactions.push(transaction.clone());
        Ok(transaction)
    }

    /// All-or-nothing insert: every row is checked before any is added.
    pub fn insert_transactions(&mut self, batch: Vec<Transaction>) -> Result<Vec<Transaction>> {
        for (idx, txn) in batch.iter().enumerate() {
            Self::check_transaction(txn)?;
            let duplicate = self.transactions.iter().any(|existing| existing.id == txn.id)
                || batch.iter().skip(idx + 1).any(|other| other.id == txn.id);
            if duplicate {
                return Err(StoreError::Backend(format!(
                    "transaction {} already exists",
                    txn.id
                )));
            }
        }
        self.transactions.extend(batch.iter().cloned());
        Ok(batch)
    }

    pub fn delete_transaction(&mut self, id: Uuid) -> Result<()> {
        let before = self.transactions.len();
        self.transactions.retain(|txn| txn.id != id);
        if self.transactions.len() == before {
            return Err(StoreError::NotFound(format!("transaction {}", id)));
        }
        Ok(())
    }
}
