//! Statistics shapes handed to presentation and export collaborators.
//!
//! Field names serialize in camelCase to match what downstream consumers
//! already read (`totalReceivable`, `employerExpense`, `netBalance`, ...).
//! Amounts serialize as JSON numbers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Qualitative reading of a company's net position.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BalanceStatus {
    #[default]
    Balanced,
    /// Employees: still owed money. Employers: spent more than they took in.
    Creditor,
    /// Employer took in more than it spent.
    Debtor,
    /// Employee was paid more than it was owed.
    Overpaid,
}

impl BalanceStatus {
    pub fn label(self) -> &'static str {
        match self {
            BalanceStatus::Balanced => "Dengede",
            BalanceStatus::Creditor => "Alacaklı",
            BalanceStatus::Debtor => "Borçlu",
            BalanceStatus::Overpaid => "Fazla Ödendi",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeStats {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_receivable: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub payments_made: Decimal,
    /// `total_receivable - payments_made`
    #[serde(with = "rust_decimal::serde::float")]
    pub receivable: Decimal,
    pub status: BalanceStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmployerStats {
    #[serde(with = "rust_decimal::serde::float")]
    pub employer_income: Decimal,
    /// Direct employer expenses plus payments made to employees. Consumers
    /// read the combined figure under this name.
    #[serde(with = "rust_decimal::serde::float")]
    pub employer_expense: Decimal,
    /// `employer_expense - employer_income`
    #[serde(with = "rust_decimal::serde::float")]
    pub receivable: Decimal,
    pub status: BalanceStatus,
}

/// Per-company figures; the variant follows the company's type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CompanyStats {
    Employee(EmployeeStats),
    Employer(EmployerStats),
}

impl CompanyStats {
    pub fn receivable(&self) -> Decimal {
        match self {
            CompanyStats::Employee(stats) => stats.receivable,
            CompanyStats::Employer(stats) => stats.receivable,
        }
    }

    pub fn status(&self) -> BalanceStatus {
        match self {
            CompanyStats::Employee(stats) => stats.status,
            CompanyStats::Employer(stats) => stats.status,
        }
    }

    pub fn as_employee(&self) -> Option<&EmployeeStats> {
        match self {
            CompanyStats::Employee(stats) => Some(stats),
            CompanyStats::Employer(_) => None,
        }
    }

    pub fn as_employer(&self) -> Option<&EmployerStats> {
        match self {
            CompanyStats::Employer(stats) => Some(stats),
            CompanyStats::Employee(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JobStats {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_income: Decimal,
    /// Employer expenses plus employee receivables, counted when recorded.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_expense: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_to_be_paid: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_paid: Decimal,
    /// `total_to_be_paid - total_paid`
    #[serde(with = "rust_decimal::serde::float")]
    pub total_remaining: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_expense: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_balance: Decimal,
    pub total_jobs: usize,
    pub active_jobs: usize,
    pub completed_jobs: usize,
    pub paused_jobs: usize,
}

/// An entity bundled with the statistics computed for it. Both halves are
/// flattened into one object when serialized.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WithStats<E, S> {
    #[serde(flatten)]
    pub entity: E,
    #[serde(flatten)]
    pub stats: S,
}

impl<E, S> WithStats<E, S> {
    pub fn new(entity: E, stats: S) -> Self {
        Self { entity, stats }
    }
}
