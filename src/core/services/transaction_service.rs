//! Builds and records transactions for the four user-facing intents.
//!
//! Callers must resolve the selected companies before calling in here: the
//! receivable target must be an employee, income/expense targets must be
//! employers, and a payment needs an employer and an employee. Types are not
//! re-checked at this level.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::transaction::{normalize_description, validate_amount};
use crate::domain::{ActorId, Transaction, TransactionTag};
use crate::errors::{LedgerError, LedgerResult, StoreError};
use crate::storage::RecordStore;

/// Input of the single-row intents.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRequest {
    pub job_id: Uuid,
    pub company_id: Uuid,
    pub amount: Decimal,
    pub description: String,
    pub date: NaiveDate,
}

/// Input of a payment from an employer to an employee.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub job_id: Uuid,
    pub employer_id: Uuid,
    pub employee_id: Uuid,
    pub amount: Decimal,
    pub description: String,
    pub date: NaiveDate,
}

/// Both halves of a payment. They share date, description and amount.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentPair {
    /// Recorded against the employee, income side.
    pub receiver: Transaction,
    /// Recorded against the employer, expense side.
    pub payer: Transaction,
}

pub struct TransactionService;

impl TransactionService {
    /// Amount owed to an employee for work performed.
    pub fn build_receivable(
        actor: Option<&ActorId>,
        request: &TransactionRequest,
    ) -> LedgerResult<Transaction> {
        Self::build_single(actor, request, TransactionTag::Receivable)
    }

    pub fn build_employer_income(
        actor: Option<&ActorId>,
        request: &TransactionRequest,
    ) -> LedgerResult<Transaction> {
        Self::build_single(actor, request, TransactionTag::Income)
    }

    pub fn build_employer_expense(
        actor: Option<&ActorId>,
        request: &TransactionRequest,
    ) -> LedgerResult<Transaction> {
        Self::build_single(actor, request, TransactionTag::EmployerExpense)
    }

    /// Builds the linked pair for a payment. The employer is the acting
    /// party on both rows.
    pub fn build_payment(
        actor: Option<&ActorId>,
        request: &PaymentRequest,
    ) -> LedgerResult<PaymentPair> {
        let amount = validate_amount(request.amount)?;
        let description = normalize_description(&request.description)?;
        let owner = actor.ok_or(LedgerError::Unauthenticated)?;

        let receiver = Transaction::new(
            request.job_id,
            request.employee_id,
            request.employer_id,
            owner.clone(),
            TransactionTag::PaymentReceived,
            amount,
            description.clone(),
            request.date,
        );
        let payer = Transaction::new(
            request.job_id,
            request.employer_id,
            request.employer_id,
            owner.clone(),
            TransactionTag::PaymentMade,
            amount,
            description,
            request.date,
        );
        Ok(PaymentPair { receiver, payer })
    }

    pub fn record_receivable(
        store: &dyn RecordStore,
        actor: Option<&ActorId>,
        request: &TransactionRequest,
    ) -> LedgerResult<Transaction> {
        Self::insert(store, Self::build_receivable(actor, request)?)
    }

    pub fn record_employer_income(
        store: &dyn RecordStore,
        actor: Option<&ActorId>,
        request: &TransactionRequest,
    ) -> LedgerResult<Transaction> {
        Self::insert(store, Self::build_employer_income(actor, request)?)
    }

    pub fn record_employer_expense(
        store: &dyn RecordStore,
        actor: Option<&ActorId>,
        request: &TransactionRequest,
    ) -> LedgerResult<Transaction> {
        Self::insert(store, Self::build_employer_expense(actor, request)?)
    }

    /// Records both halves of a payment.
    ///
    /// Stores offering an atomic multi-row insert get both rows in one write.
    /// Otherwise the receiving half is inserted first; if the paying half then
    /// fails, the error is [`LedgerError::PartialLedgerInconsistency`] carrying
    /// the stored half, which the caller can remove with
    /// [`TransactionService::compensate`].
    pub fn record_payment_to_employee(
        store: &dyn RecordStore,
        actor: Option<&ActorId>,
        request: &PaymentRequest,
    ) -> LedgerResult<PaymentPair> {
        let pair = Self::build_payment(actor, request)?;

        match store.insert_transactions(vec![pair.receiver.clone(), pair.payer.clone()]) {
            Ok(rows) => {
                let mut rows = rows.into_iter();
                let (Some(receiver), Some(payer)) = (rows.next(), rows.next()) else {
                    return Err(StoreError::Backend(
                        "batch insert returned fewer rows than written".into(),
                    )
                    .into());
                };
                tracing::info!(
                    receiver = %receiver.id,
                    payer = %payer.id,
                    amount = %receiver.income,
                    "payment recorded"
                );
                Ok(PaymentPair { receiver, payer })
            }
            Err(StoreError::Unsupported(_)) => Self::record_payment_in_steps(store, pair),
            Err(err) => Err(err.into()),
        }
    }

    fn record_payment_in_steps(
        store: &dyn RecordStore,
        pair: PaymentPair,
    ) -> LedgerResult<PaymentPair> {
        let receiver = store.insert_transaction(pair.receiver)?;
        match store.insert_transaction(pair.payer) {
            Ok(payer) => {
                tracing::info!(
                    receiver = %receiver.id,
                    payer = %payer.id,
                    amount = %receiver.income,
                    "payment recorded in two steps"
                );
                Ok(PaymentPair { receiver, payer })
            }
            Err(source) => {
                tracing::error!(
                    orphan = %receiver.id,
                    error = %source,
                    "payer half of payment failed after receiver half was stored"
                );
                Err(LedgerError::PartialLedgerInconsistency {
                    orphan: Box::new(receiver),
                    source,
                })
            }
        }
    }

    /// Removes the stored half of a partially recorded payment.
    pub fn compensate(store: &dyn RecordStore, orphan: &Transaction) -> LedgerResult<()> {
        store.delete_transaction(orphan.id)?;
        tracing::warn!(orphan = %orphan.id, "orphaned payment half removed");
        Ok(())
    }

    pub fn remove(store: &dyn RecordStore, id: Uuid) -> LedgerResult<()> {
        store.delete_transaction(id)?;
        tracing::info!(transaction = %id, "transaction deleted");
        Ok(())
    }

    fn build_single(
        actor: Option<&ActorId>,
        request: &TransactionRequest,
        tag: TransactionTag,
    ) -> LedgerResult<Transaction> {
        let amount = validate_amount(request.amount)?;
        let description = normalize_description(&request.description)?;
        let owner = actor.ok_or(LedgerError::Unauthenticated)?;
        Ok(Transaction::new(
            request.job_id,
            request.company_id,
            request.company_id,
            owner.clone(),
            tag,
            amount,
            description,
            request.date,
        ))
    }

    fn insert(store: &dyn RecordStore, transaction: Transaction) -> LedgerResult<Transaction> {
        let stored = store.insert_transaction(transaction)?;
        tracing::info!(
            transaction = %stored.id,
            tag = %stored.tag,
            company = %stored.company_id,
            "transaction recorded"
        );
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::domain::{Company, Job};
    use crate::errors::ValidationError;
    use crate::storage::{MemoryStore, TransactionScope};
    use rust_decimal_macros::dec;

    /// Store without batch support whose n-th single insert fails.
    struct FlakyStore {
        inner: MemoryStore,
        fail_on: usize,
        inserts: AtomicUsize,
    }

    impl FlakyStore {
        fn failing_on(fail_on: usize) -> Self {
            Self {
                inner: MemoryStore::new(),
                fail_on,
                inserts: AtomicUsize::new(0),
            }
        }
    }

    impl RecordStore for FlakyStore {
        fn list_jobs(&self) -> crate::storage::Result<Vec<Job>> {
            self.inner.list_jobs()
        }
        fn job(&self, id: Uuid) -> crate::storage::Result<Option<Job>> {
            self.inner.job(id)
        }
        fn insert_job(&self, job: Job) -> crate::storage::Result<Job> {
            self.inner.insert_job(job)
        }
        fn update_job(&self, job: Job) -> crate::storage::Result<Job> {
            self.inner.update_job(job)
        }
        fn delete_job(&self, id: Uuid) -> crate::storage::Result<()> {
            self.inner.delete_job(id)
        }
        fn list_companies(&self, job_id: Uuid) -> crate::storage::Result<Vec<Company>> {
            self.inner.list_companies(job_id)
        }
        fn list_all_companies(&self) -> crate::storage::Result<Vec<Company>> {
            self.inner.list_all_companies()
        }
        fn company(&self, id: Uuid) -> crate::storage::Result<Option<Company>> {
            self.inner.company(id)
        }
        fn insert_company(&self, company: Company) -> crate::storage::Result<Company> {
            self.inner.insert_company(company)
        }
        fn update_company(&self, company: Company) -> crate::storage::Result<Company> {
            self.inner.update_company(company)
        }
        fn delete_company(&self, id: Uuid) -> crate::storage::Result<()> {
            self.inner.delete_company(id)
        }
        fn list_transactions(
            &self,
            scope: TransactionScope,
        ) -> crate::storage::Result<Vec<Transaction>> {
            self.inner.list_transactions(scope)
        }
        fn insert_transaction(&self, txn: Transaction) -> crate::storage::Result<Transaction> {
            let attempt = self.inserts.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt == self.fail_on {
                return Err(StoreError::Backend("connection reset".into()));
            }
            self.inner.insert_transaction(txn)
        }
        fn delete_transaction(&self, id: Uuid) -> crate::storage::Result<()> {
            self.inner.delete_transaction(id)
        }
    }

    fn owner() -> ActorId {
        ActorId::new("owner-1")
    }

    fn single_request(amount: Decimal, description: &str) -> TransactionRequest {
        TransactionRequest {
            job_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            amount,
            description: description.into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    fn payment_request() -> PaymentRequest {
        PaymentRequest {
            job_id: Uuid::new_v4(),
            employer_id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            amount: dec!(100),
            description: "d".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    #[test]
    fn single_intents_target_and_act_as_the_selected_company() {
        let request = single_request(dec!(42), "  weekly work ");
        let actor = owner();

        let receivable = TransactionService::build_receivable(Some(&actor), &request).unwrap();
        assert_eq!(receivable.tag, TransactionTag::Receivable);
        assert_eq!(receivable.company_id, request.company_id);
        assert_eq!(receivable.performed_by_id, Some(request.company_id));
        assert_eq!(receivable.income, dec!(42));
        assert_eq!(receivable.expense, Decimal::ZERO);
        assert_eq!(receivable.description, "weekly work");
        assert_eq!(receivable.user_id, actor);

        let income = TransactionService::build_employer_income(Some(&actor), &request).unwrap();
        assert_eq!(income.tag, TransactionTag::Income);
        assert_eq!(income.income, dec!(42));

        let expense = TransactionService::build_employer_expense(Some(&actor), &request).unwrap();
        assert_eq!(expense.tag, TransactionTag::EmployerExpense);
        assert_eq!(expense.expense, dec!(42));
        assert_eq!(expense.income, Decimal::ZERO);
    }

    #[test]
    fn invalid_input_is_rejected_before_writing() {
        let store = MemoryStore::new();
        let actor = owner();

        let err = TransactionService::record_receivable(
            &store,
            Some(&actor),
            &single_request(Decimal::ZERO, "work"),
        )
        .expect_err("zero amount must fail");
        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::InvalidAmount)
        ));

        let err = TransactionService::record_employer_income(
            &store,
            Some(&actor),
            &single_request(dec!(5), "   "),
        )
        .expect_err("blank description must fail");
        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::EmptyDescription)
        ));

        assert!(store
            .list_transactions(TransactionScope::All)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn writes_require_an_actor() {
        let store = MemoryStore::new();
        let err =
            TransactionService::record_employer_expense(&store, None, &single_request(dec!(5), "x"))
                .expect_err("anonymous write must fail");
        assert!(matches!(err, LedgerError::Unauthenticated));

        let err = TransactionService::record_payment_to_employee(&store, None, &payment_request())
            .expect_err("anonymous payment must fail");
        assert!(matches!(err, LedgerError::Unauthenticated));
    }

    #[test]
    fn payment_produces_a_matching_pair() {
        let store = MemoryStore::new();
        let request = payment_request();
        let pair =
            TransactionService::record_payment_to_employee(&store, Some(&owner()), &request)
                .unwrap();

        assert_eq!(pair.receiver.company_id, request.employee_id);
        assert_eq!(pair.receiver.performed_by_id, Some(request.employer_id));
        assert_eq!(pair.receiver.tag, TransactionTag::PaymentReceived);
        assert_eq!(pair.receiver.income, dec!(100));

        assert_eq!(pair.payer.company_id, request.employer_id);
        assert_eq!(pair.payer.performed_by_id, Some(request.employer_id));
        assert_eq!(pair.payer.tag, TransactionTag::PaymentMade);
        assert_eq!(pair.payer.expense, dec!(100));

        assert_eq!(pair.receiver.date, pair.payer.date);
        assert_eq!(pair.receiver.description, pair.payer.description);

        let stored = store.list_transactions(TransactionScope::All).unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[test]
    fn payment_falls_back_to_two_inserts_without_batch_support() {
        let store = FlakyStore::failing_on(usize::MAX);
        let pair =
            TransactionService::record_payment_to_employee(&store, Some(&owner()), &payment_request())
                .unwrap();
        let stored = store.list_transactions(TransactionScope::All).unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.contains(&pair.receiver));
        assert!(stored.contains(&pair.payer));
    }

    #[test]
    fn failure_of_first_half_is_a_clean_store_error() {
        let store = FlakyStore::failing_on(1);
        let err =
            TransactionService::record_payment_to_employee(&store, Some(&owner()), &payment_request())
                .expect_err("first insert fails");
        assert!(matches!(err, LedgerError::Store(StoreError::Backend(_))));
        assert!(store
            .list_transactions(TransactionScope::All)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn failure_of_second_half_reports_the_orphan() {
        let store = FlakyStore::failing_on(2);
        let request = payment_request();
        let err = TransactionService::record_payment_to_employee(&store, Some(&owner()), &request)
            .expect_err("second insert fails");

        let LedgerError::PartialLedgerInconsistency { orphan, source } = err else {
            panic!("expected partial inconsistency, got {err:?}");
        };
        assert_eq!(orphan.company_id, request.employee_id);
        assert_eq!(orphan.tag, TransactionTag::PaymentReceived);
        assert!(source.to_string().contains("connection reset"));

        let stored = store.list_transactions(TransactionScope::All).unwrap();
        assert_eq!(stored, vec![(*orphan).clone()]);

        TransactionService::compensate(&store, &orphan).unwrap();
        assert!(store
            .list_transactions(TransactionScope::All)
            .unwrap()
            .is_empty());
    }
}
