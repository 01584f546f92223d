#![allow(dead_code)]

use std::sync::Mutex;

use chrono::NaiveDate;
use job_ledger::{
    config::ConfigManager,
    core::{services::NewJob, JobLedger, TransactionForm, TransactionIntent},
    domain::{ActorId, Company, CompanyType, Job, JobStatus},
    storage::{JsonStore, MemoryStore},
};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a signed-in ledger over a JSON store in a unique directory.
pub fn setup_json_env() -> (JobLedger, ConfigManager) {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let config_manager =
        ConfigManager::with_base_dir(base.clone()).expect("create config manager for temp dir");
    let config = config_manager.load().expect("load default config");
    let store = JsonStore::from_config(&config, &base).expect("create json store");
    let ledger = JobLedger::new(Box::new(store)).with_actor(actor());

    (ledger, config_manager)
}

pub fn memory_ledger() -> JobLedger {
    JobLedger::new(Box::new(MemoryStore::new())).with_actor(actor())
}

pub fn actor() -> ActorId {
    ActorId::new("site-manager")
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).expect("valid day")
}

pub fn open_job(ledger: &JobLedger, name: &str) -> Job {
    ledger
        .create_job(NewJob {
            name: name.into(),
            description: String::new(),
            start_date: day(1),
            end_date: None,
            status: JobStatus::Active,
        })
        .expect("create job")
}

/// A job with one employer and one employee.
pub fn job_with_parties(ledger: &JobLedger, name: &str) -> (Job, Company, Company) {
    let job = open_job(ledger, name);
    let employer = ledger
        .create_company(job.id, "Contractor", CompanyType::Employer)
        .expect("create employer");
    let employee = ledger
        .create_company(job.id, "Electrician", CompanyType::Employee)
        .expect("create employee");
    (job, employer, employee)
}

pub fn form(job: &Job, intent: TransactionIntent, amount: Decimal, date: NaiveDate) -> TransactionForm {
    TransactionForm {
        job_id: job.id,
        intent,
        amount,
        description: "site work".into(),
        date,
    }
}

pub fn receivable(employee: &Company) -> TransactionIntent {
    TransactionIntent::EmployeeReceivable {
        employee_id: Some(employee.id),
    }
}

pub fn income(employer: &Company) -> TransactionIntent {
    TransactionIntent::EmployerIncome {
        employer_id: Some(employer.id),
    }
}

pub fn expense(employer: &Company) -> TransactionIntent {
    TransactionIntent::EmployerExpense {
        employer_id: Some(employer.id),
    }
}

pub fn payment(employer: &Company, employee: &Company) -> TransactionIntent {
    TransactionIntent::PaymentToEmployee {
        employer_id: Some(employer.id),
        employee_id: Some(employee.id),
    }
}
