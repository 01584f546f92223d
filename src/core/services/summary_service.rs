//! Folds transactions into company, job and overall statistics.
//!
//! Every function here is a pure reduction over the records it is given.
//! Amounts are exact decimals, so the result does not depend on the order
//! of the input.

use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::classification::{classify, Bucket};
use crate::domain::{
    BalanceStatus, Company, CompanyStats, CompanyType, EmployeeStats, EmployerStats, Job,
    JobStats, JobStatus, OverallStats, Transaction,
};

pub struct SummaryService;

impl SummaryService {
    /// Statistics of `company`, computed from the transactions recorded
    /// against it. Rows targeting other companies are ignored.
    pub fn company_stats(company: &Company, transactions: &[Transaction]) -> CompanyStats {
        let mut totals = Totals::default();
        for txn in transactions.iter().filter(|txn| txn.company_id == company.id) {
            totals.absorb(classify(company.kind, txn.tag), txn);
        }

        match company.kind {
            CompanyType::Employee => {
                let receivable = totals.to_be_paid - totals.paid;
                CompanyStats::Employee(EmployeeStats {
                    total_receivable: totals.to_be_paid,
                    payments_made: totals.paid,
                    receivable,
                    status: employee_status(receivable),
                })
            }
            CompanyType::Employer => {
                let receivable = totals.employer_expense - totals.income;
                CompanyStats::Employer(EmployerStats {
                    employer_income: totals.income,
                    employer_expense: totals.employer_expense,
                    receivable,
                    status: employer_status(receivable),
                })
            }
        }
    }

    /// Job-wide totals. Employee receivables count as expense when recorded,
    /// on top of being tracked in `total_to_be_paid`.
    pub fn job_stats(job_id: Uuid, transactions: &[Transaction], companies: &[Company]) -> JobStats {
        let kinds = company_kinds(companies);
        let totals = Totals::fold(
            transactions.iter().filter(|txn| txn.job_id == job_id),
            &kinds,
        );
        tracing::debug!(%job_id, transactions = transactions.len(), "job statistics computed");

        JobStats {
            total_income: totals.income,
            total_expense: totals.expense(),
            net_balance: totals.income - totals.expense(),
            total_to_be_paid: totals.to_be_paid,
            total_paid: totals.paid,
            total_remaining: totals.to_be_paid - totals.paid,
        }
    }

    /// Totals across every job plus job counts by status.
    pub fn overall_stats(
        jobs: &[Job],
        companies: &[Company],
        transactions: &[Transaction],
    ) -> OverallStats {
        let kinds = company_kinds(companies);
        let totals = Totals::fold(transactions.iter(), &kinds);
        let count = |status: JobStatus| jobs.iter().filter(|job| job.status == status).count();
        tracing::debug!(
            jobs = jobs.len(),
            transactions = transactions.len(),
            "overall statistics computed"
        );

        OverallStats {
            total_income: totals.income,
            total_expense: totals.expense(),
            net_balance: totals.income - totals.expense(),
            total_jobs: jobs.len(),
            active_jobs: count(JobStatus::Active),
            completed_jobs: count(JobStatus::Completed),
            paused_jobs: count(JobStatus::Paused),
        }
    }
}

/// Running sums, one per bucket.
#[derive(Debug, Default)]
struct Totals {
    income: Decimal,
    employer_expense: Decimal,
    to_be_paid: Decimal,
    paid: Decimal,
}

impl Totals {
    fn fold<'a>(
        transactions: impl Iterator<Item = &'a Transaction>,
        kinds: &HashMap<Uuid, CompanyType>,
    ) -> Self {
        let mut totals = Totals::default();
        let mut dangling = 0usize;
        for txn in transactions {
            match kinds.get(&txn.company_id) {
                Some(kind) => totals.absorb(classify(*kind, txn.tag), txn),
                None => dangling += 1,
            }
        }
        if dangling > 0 {
            tracing::debug!(dangling, "skipped transactions with unknown target company");
        }
        totals
    }

    fn absorb(&mut self, bucket: Bucket, txn: &Transaction) {
        let amount = bucket.amount(txn);
        match bucket {
            Bucket::Income => self.income += amount,
            Bucket::Expense => self.employer_expense += amount,
            Bucket::Receivable => self.to_be_paid += amount,
            Bucket::PayableReducing => self.paid += amount,
            Bucket::Ignored => {}
        }
    }

    /// Aggregate expense: employer spending plus accrued employee receivables.
    fn expense(&self) -> Decimal {
        self.employer_expense + self.to_be_paid
    }
}

fn company_kinds(companies: &[Company]) -> HashMap<Uuid, CompanyType> {
    companies
        .iter()
        .map(|company| (company.id, company.kind))
        .collect()
}

fn employee_status(receivable: Decimal) -> BalanceStatus {
    if receivable > Decimal::ZERO {
        BalanceStatus::Creditor
    } else if receivable < Decimal::ZERO {
        BalanceStatus::Overpaid
    } else {
        BalanceStatus::Balanced
    }
}

fn employer_status(receivable: Decimal) -> BalanceStatus {
    if receivable > Decimal::ZERO {
        BalanceStatus::Creditor
    } else if receivable < Decimal::ZERO {
        BalanceStatus::Debtor
    } else {
        BalanceStatus::Balanced
    }
}
