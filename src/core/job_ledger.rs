use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::core::services::{
    CompanyService, JobService, NewJob, PaymentPair, PaymentRequest, SummaryService,
    TransactionRequest, TransactionService,
};
use crate::domain::transaction::{normalize_description, validate_amount};
use crate::domain::{
    ActorId, Company, CompanyStats, CompanyType, Displayable, Job, JobStats, JobUpdate,
    OverallStats, Transaction, WithStats,
};
use crate::errors::{LedgerResult, StoreError, ValidationError};
use crate::storage::{RecordStore, TransactionScope};

/// What the user asked to record, with the companies picked for it.
/// `None` means nothing was selected.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionIntent {
    EmployeeReceivable {
        employee_id: Option<Uuid>,
    },
    EmployerIncome {
        employer_id: Option<Uuid>,
    },
    EmployerExpense {
        employer_id: Option<Uuid>,
    },
    PaymentToEmployee {
        employer_id: Option<Uuid>,
        employee_id: Option<Uuid>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionForm {
    pub job_id: Uuid,
    pub intent: TransactionIntent,
    pub amount: Decimal,
    pub description: String,
    pub date: NaiveDate,
}

/// Rows written for one intent.
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Single(Transaction),
    Payment(PaymentPair),
}

/// Name and type of a company referenced by a transaction.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PartyRef {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CompanyType,
}

impl From<&Company> for PartyRef {
    fn from(company: &Company) -> Self {
        Self {
            id: company.id,
            name: company.name.clone(),
            kind: company.kind,
        }
    }
}

/// A transaction with its target and acting companies resolved. Either
/// side is `None` when the referenced company no longer exists.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TransactionView {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub company: Option<PartyRef>,
    pub performed_by: Option<PartyRef>,
}

/// Façade that owns the store and the signed-in actor, and answers every
/// read with records bundled with their computed statistics.
pub struct JobLedger {
    store: Box<dyn RecordStore>,
    actor: Option<ActorId>,
}

impl JobLedger {
    pub fn new(store: Box<dyn RecordStore>) -> Self {
        Self { store, actor: None }
    }

    pub fn with_actor(mut self, actor: ActorId) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn sign_in(&mut self, actor: ActorId) {
        tracing::debug!(actor = %actor, "actor signed in");
        self.actor = Some(actor);
    }

    pub fn sign_out(&mut self) {
        self.actor = None;
    }

    pub fn actor(&self) -> Option<&ActorId> {
        self.actor.as_ref()
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    // Jobs

    pub fn create_job(&self, new_job: NewJob) -> LedgerResult<Job> {
        JobService::create(self.store(), self.actor(), new_job)
    }

    pub fn update_job(&self, id: Uuid, update: JobUpdate) -> LedgerResult<Job> {
        JobService::update(self.store(), id, update)
    }

    pub fn delete_job(&self, id: Uuid) -> LedgerResult<()> {
        JobService::remove(self.store(), id)
    }

    pub fn job(&self, id: Uuid) -> LedgerResult<Option<Job>> {
        JobService::get(self.store(), id)
    }

    /// Every job, newest first, with its statistics.
    pub fn jobs_with_stats(&self) -> LedgerResult<Vec<WithStats<Job, JobStats>>> {
        let jobs = JobService::list(self.store())?;
        let companies = self.store.list_all_companies()?;
        let transactions = self.store.list_transactions(TransactionScope::All)?;
        Ok(jobs
            .into_iter()
            .map(|job| {
                let stats = SummaryService::job_stats(job.id, &transactions, &companies);
                WithStats::new(job, stats)
            })
            .collect())
    }

    /// Statistics of one job. A job without companies or transactions
    /// yields zeroes.
    pub fn job_stats(&self, job_id: Uuid) -> LedgerResult<JobStats> {
        let companies = self.store.list_companies(job_id)?;
        let transactions = self.store.list_transactions(TransactionScope::Job(job_id))?;
        Ok(SummaryService::job_stats(job_id, &transactions, &companies))
    }

    pub fn overall_stats(&self) -> LedgerResult<OverallStats> {
        let jobs = self.store.list_jobs()?;
        let companies = self.store.list_all_companies()?;
        let transactions = self.store.list_transactions(TransactionScope::All)?;
        Ok(SummaryService::overall_stats(&jobs, &companies, &transactions))
    }

    // Companies

    pub fn create_company(
        &self,
        job_id: Uuid,
        name: &str,
        kind: CompanyType,
    ) -> LedgerResult<Company> {
        CompanyService::create(self.store(), self.actor(), job_id, name, kind)
    }

    pub fn rename_company(&self, id: Uuid, name: &str) -> LedgerResult<Company> {
        CompanyService::rename(self.store(), id, name)
    }

    pub fn delete_company(&self, id: Uuid) -> LedgerResult<()> {
        CompanyService::remove(self.store(), id)
    }

    pub fn company(&self, id: Uuid) -> LedgerResult<Option<Company>> {
        CompanyService::get(self.store(), id)
    }

    /// Companies of a job, newest first, with their statistics.
    pub fn job_companies(
        &self,
        job_id: Uuid,
    ) -> LedgerResult<Vec<WithStats<Company, CompanyStats>>> {
        let companies = CompanyService::list_for_job(self.store(), job_id)?;
        let transactions = self.store.list_transactions(TransactionScope::Job(job_id))?;
        Ok(companies
            .into_iter()
            .map(|company| {
                let stats = SummaryService::company_stats(&company, &transactions);
                WithStats::new(company, stats)
            })
            .collect())
    }

    pub fn company_with_stats(
        &self,
        id: Uuid,
    ) -> LedgerResult<Option<WithStats<Company, CompanyStats>>> {
        let Some(company) = self.store.company(id)? else {
            return Ok(None);
        };
        let transactions = self.store.list_transactions(TransactionScope::Company(id))?;
        let stats = SummaryService::company_stats(&company, &transactions);
        Ok(Some(WithStats::new(company, stats)))
    }

    // Transactions

    /// Transactions of a job, most recent date first.
    pub fn job_transactions(&self, job_id: Uuid) -> LedgerResult<Vec<TransactionView>> {
        let companies = self.store.list_companies(job_id)?;
        let transactions = self.store.list_transactions(TransactionScope::Job(job_id))?;
        Ok(resolve_views(transactions, &companies))
    }

    /// Transactions the company is the target or the actor of, most recent
    /// date first.
    pub fn company_transactions(&self, company_id: Uuid) -> LedgerResult<Vec<TransactionView>> {
        let company = self
            .store
            .company(company_id)?
            .ok_or_else(|| StoreError::NotFound(format!("company {}", company_id)))?;
        let companies = self.store.list_companies(company.job_id)?;
        let transactions = self
            .store
            .list_transactions(TransactionScope::Company(company_id))?;
        Ok(resolve_views(transactions, &companies))
    }

    /// Validates the form, checks the selected companies belong to the job
    /// with the expected roles, then records the intent.
    pub fn record(&self, form: TransactionForm) -> LedgerResult<Recorded> {
        validate_amount(form.amount)?;
        normalize_description(&form.description)?;
        let companies = self.store.list_companies(form.job_id)?;
        let store = self.store();
        let actor = self.actor();

        let single = |company_id: Uuid| TransactionRequest {
            job_id: form.job_id,
            company_id,
            amount: form.amount,
            description: form.description.clone(),
            date: form.date,
        };

        match &form.intent {
            TransactionIntent::EmployeeReceivable { employee_id } => {
                let employee = select(&companies, *employee_id, CompanyType::Employee)?;
                TransactionService::record_receivable(store, actor, &single(employee.id))
                    .map(Recorded::Single)
            }
            TransactionIntent::EmployerIncome { employer_id } => {
                let employer = select(&companies, *employer_id, CompanyType::Employer)?;
                TransactionService::record_employer_income(store, actor, &single(employer.id))
                    .map(Recorded::Single)
            }
            TransactionIntent::EmployerExpense { employer_id } => {
                let employer = select(&companies, *employer_id, CompanyType::Employer)?;
                TransactionService::record_employer_expense(store, actor, &single(employer.id))
                    .map(Recorded::Single)
            }
            TransactionIntent::PaymentToEmployee {
                employer_id,
                employee_id,
            } => {
                let employer = select(&companies, *employer_id, CompanyType::Employer)?;
                let employee = select(&companies, *employee_id, CompanyType::Employee)?;
                let request = PaymentRequest {
                    job_id: form.job_id,
                    employer_id: employer.id,
                    employee_id: employee.id,
                    amount: form.amount,
                    description: form.description.clone(),
                    date: form.date,
                };
                TransactionService::record_payment_to_employee(store, actor, &request)
                    .map(Recorded::Payment)
            }
        }
    }

    /// Removes the stored half of a partially recorded payment.
    pub fn compensate(&self, orphan: &Transaction) -> LedgerResult<()> {
        TransactionService::compensate(self.store(), orphan)
    }

    pub fn delete_transaction(&self, id: Uuid) -> LedgerResult<()> {
        TransactionService::remove(self.store(), id)
    }
}

fn select(
    companies: &[Company],
    selected: Option<Uuid>,
    expected: CompanyType,
) -> Result<&Company, ValidationError> {
    let role = match expected {
        CompanyType::Employer => "employer",
        CompanyType::Employee => "employee",
    };
    let id = selected.ok_or(ValidationError::MissingSelection(role))?;
    let company = companies
        .iter()
        .find(|company| company.id == id)
        .ok_or(ValidationError::MissingSelection(role))?;
    if company.kind != expected {
        return Err(ValidationError::RoleMismatch {
            company: id,
            expected,
        });
    }
    tracing::debug!(company = %company.display_label(), role, "company selected");
    Ok(company)
}

fn resolve_views(mut transactions: Vec<Transaction>, companies: &[Company]) -> Vec<TransactionView> {
    transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
    let party = |id: Uuid| {
        companies
            .iter()
            .find(|company| company.id == id)
            .map(PartyRef::from)
    };
    transactions
        .into_iter()
        .map(|transaction| TransactionView {
            company: party(transaction.company_id),
            performed_by: transaction.performed_by_id.and_then(party),
            transaction,
        })
        .collect()
}
