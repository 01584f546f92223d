use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use uuid::Uuid;

use crate::config::Config;
use crate::core::utils::{ensure_dir, write_atomic};
use crate::domain::{Company, Job, Transaction};
use crate::errors::StoreError;

use super::{LedgerSnapshot, RecordStore, Result, TransactionScope, CURRENT_SCHEMA_VERSION};

/// Stores every record in a single JSON document. Each write reloads the
/// document, applies the change and atomically replaces the file, so a
/// multi-row insert either lands completely or not at all.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Opens the store configured by `config`, relative to `base`.
    pub fn from_config(config: &Config, base: &Path) -> Result<Self> {
        Self::new(config.store_path(base))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the current document; a missing file is an empty ledger. A
    /// transaction that cannot be read, such as one tagged outside the known
    /// tag set, or one carrying an out-of-range amount, fails the whole load
    /// with [`StoreError::InvalidRecord`] naming that row.
    pub fn load(&self) -> Result<LedgerSnapshot> {
        if !self.path.exists() {
            return Ok(LedgerSnapshot::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let snapshot: LedgerSnapshot = match serde_json::from_str(&data) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                return Err(self
                    .unreadable_transaction(&data)
                    .unwrap_or(StoreError::Serde(err)))
            }
        };
        if snapshot.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(StoreError::Backend(format!(
                "ledger file `{}` is from a newer schema version ({})",
                self.path.display(),
                snapshot.schema_version
            )));
        }
        snapshot.verify()?;
        Ok(snapshot)
    }

    fn unreadable_transaction(&self, data: &str) -> Option<StoreError> {
        let document: serde_json::Value = serde_json::from_str(data).ok()?;
        let rows = document.get("transactions")?.as_array()?;
        rows.iter().enumerate().find_map(|(idx, row)| {
            let err = serde_json::from_value::<Transaction>(row.clone()).err()?;
            let id = row
                .get("id")
                .and_then(|id| id.as_str())
                .map_or_else(|| format!("#{}", idx), str::to_string);
            tracing::warn!(path = %self.path.display(), transaction = %id, "unreadable ledger row");
            Some(StoreError::InvalidRecord(format!(
                "ledger file `{}`: transaction {} is unreadable: {}",
                self.path.display(),
                id,
                err
            )))
        })
    }

    fn save(&self, snapshot: &LedgerSnapshot) -> Result<()> {
        let json = serde_json::to_string_pretty(snapshot)?;
        write_atomic(&self.path, &json)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::Backend("json store lock poisoned".into()))
    }

    /// Applies `change` to a fresh copy of the document and persists it only
    /// when the change succeeds.
    fn mutate<T, F>(&self, change: F) -> Result<T>
    where
        F: FnOnce(&mut LedgerSnapshot) -> Result<T>,
    {
        let _guard = self.lock()?;
        let mut snapshot = self.load()?;
        let value = change(&mut snapshot)?;
        snapshot.schema_version = CURRENT_SCHEMA_VERSION;
        self.save(&snapshot)?;
        tracing::trace!(path = %self.path.display(), "ledger file written");
        Ok(value)
    }
}

impl RecordStore for JsonStore {
    fn list_jobs(&self) -> Result<Vec<Job>> {
        Ok(self.load()?.jobs)
    }

    fn job(&self, id: Uuid) -> Result<Option<Job>> {
        Ok(self.load()?.job(id).cloned())
    }

    fn insert_job(&self, job: Job) -> Result<Job> {
        self.mutate(|snapshot| snapshot.insert_job(job))
    }

    fn update_job(&self, job: Job) -> Result<Job> {
        self.mutate(|snapshot| snapshot.update_job(job))
    }

    fn delete_job(&self, id: Uuid) -> Result<()> {
        self.mutate(|snapshot| snapshot.delete_job(id))
    }

    fn list_companies(&self, job_id: Uuid) -> Result<Vec<Company>> {
        Ok(self.load()?.companies_for(job_id))
    }

    fn list_all_companies(&self) -> Result<Vec<Company>> {
        Ok(self.load()?.companies)
    }

    fn company(&self, id: Uuid) -> Result<Option<Company>> {
        Ok(self.load()?.company(id).cloned())
    }

    fn insert_company(&self, company: Company) -> Result<Company> {
        self.mutate(|snapshot| snapshot.insert_company(company))
    }

    fn update_company(&self, company: Company) -> Result<Company> {
        self.mutate(|snapshot| snapshot.update_company(company))
    }

    fn delete_company(&self, id: Uuid) -> Result<()> {
        self.mutate(|snapshot| snapshot.delete_company(id))
    }

    fn list_transactions(&self, scope: TransactionScope) -> Result<Vec<Transaction>> {
        Ok(self.load()?.transactions_in(scope))
    }

    fn insert_transaction(&self, transaction: Transaction) -> Result<Transaction> {
        self.mutate(|snapshot| snapshot.insert_transaction(transaction))
    }

    fn delete_transaction(&self, id: Uuid) -> Result<()> {
        self.mutate(|snapshot| snapshot.delete_transaction(id))
    }

    fn insert_transactions(&self, transactions: Vec<Transaction>) -> Result<Vec<Transaction>> {
        self.mutate(|snapshot| snapshot.insert_transactions(transactions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::utils::tmp_path;
    use crate::domain::{ActorId, CompanyType, JobStatus};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn sample_job() -> Job {
        Job::new(
            ActorId::new("owner"),
            "Tower",
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            JobStatus::Active,
        )
    }

    #[test]
    fn records_survive_reopening() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let job = sample_job();
        let company = Company::new(job.id, ActorId::new("owner"), "Crew", CompanyType::Employee);
        {
            let store = JsonStore::new(&path).unwrap();
            store.insert_job(job.clone()).unwrap();
            store.insert_company(company.clone()).unwrap();
        }

        let reopened = JsonStore::new(&path).unwrap();
        assert_eq!(reopened.job(job.id).unwrap(), Some(job.clone()));
        assert_eq!(reopened.list_companies(job.id).unwrap(), vec![company]);
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn failed_change_leaves_file_untouched() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("ledger.json")).unwrap();
        let job = sample_job();
        store.insert_job(job.clone()).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        let err = store.insert_job(job).expect_err("duplicate job must fail");
        assert!(matches!(err, StoreError::Backend(_)));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn newer_schema_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, r#"{ "schema_version": 99 }"#).unwrap();
        let store = JsonStore::new(&path).unwrap();
        assert!(matches!(store.list_jobs(), Err(StoreError::Backend(_))));
    }

    fn write_row(path: &std::path::Path, row: serde_json::Value) {
        let document = serde_json::json!({ "schema_version": 1, "transactions": [row] });
        fs::write(path, document.to_string()).unwrap();
    }

    fn stored_row(id: &str, income: serde_json::Value, tag: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "job_id": Uuid::new_v4(),
            "company_id": Uuid::new_v4(),
            "user_id": "owner",
            "date": "2024-06-02",
            "income": income,
            "expense": 0,
            "tag": tag,
            "created_at": "2024-06-02T00:00:00Z",
            "updated_at": "2024-06-02T00:00:00Z"
        })
    }

    #[test]
    fn unknown_tag_is_reported_with_its_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let id = "7a1d2c3b-4e5f-4a6b-8c7d-9e0f1a2b3c4d";
        write_row(&path, stored_row(id, serde_json::json!(10), "Bonus"));

        let store = JsonStore::new(&path).unwrap();
        match store.list_jobs() {
            Err(StoreError::InvalidRecord(message)) => {
                assert!(message.contains(id), "unexpected: {message}");
                assert!(message.contains("Bonus"), "unexpected: {message}");
            }
            other => panic!("expected an invalid record error, got {other:?}"),
        }
    }

    #[test]
    fn oversized_stored_amount_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let id = "0c9b8a7d-6e5f-4d3c-8b2a-1f0e9d8c7b6a";
        write_row(
            &path,
            stored_row(id, serde_json::json!("50000000000000000000000000000"), "Gelir"),
        );

        let store = JsonStore::new(&path).unwrap();
        match store.list_transactions(TransactionScope::All) {
            Err(StoreError::InvalidRecord(message)) => assert!(message.contains(id)),
            other => panic!("expected an invalid record error, got {other:?}"),
        }
    }

    #[test]
    fn amounts_are_written_as_numbers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let id = "3b4c5d6e-7f80-4a1b-9c2d-3e4f5a6b7c8d";
        write_row(&path, stored_row(id, serde_json::json!(150.25), "Gelir"));

        let store = JsonStore::new(&path).unwrap();
        let row = store.list_transactions(TransactionScope::All).unwrap().remove(0);
        store.delete_transaction(row.id).unwrap();
        store.insert_transaction(row).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["transactions"][0]["income"], 150.25);
        assert_eq!(written["transactions"][0]["expense"], 0.0);
    }

    #[test]
    fn missing_file_reads_as_empty_ledger() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("nested").join("ledger.json")).unwrap();
        assert!(store.list_jobs().unwrap().is_empty());
        assert!(store
            .list_transactions(TransactionScope::All)
            .unwrap()
            .is_empty());
    }
}
