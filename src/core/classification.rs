//! Maps a transaction to the figure it feeds, given the type of the company
//! it is recorded against.
//!
//! | Company  | Tag                                        | Bucket            |
//! |----------|--------------------------------------------|-------------------|
//! | Employer | Income, Collection, EarnedPaymentReceived  | `Income`          |
//! | Employer | EmployerExpense, PaymentMade               | `Expense`         |
//! | Employee | Receivable                                 | `Receivable`      |
//! | Employee | PaymentReceived                            | `PayableReducing` |
//! | any      | anything else                              | `Ignored`         |
//!
//! Employer tags never reach employee figures and vice versa.

use rust_decimal::Decimal;

use crate::domain::{CompanyType, Transaction, TransactionTag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// Employer income, read from the income column.
    Income,
    /// Employer expense, read from the expense column.
    Expense,
    /// Amount owed to an employee, read from the income column.
    Receivable,
    /// Payment received by an employee, read from the income column.
    PayableReducing,
    Ignored,
}

impl Bucket {
    /// Amount this bucket takes from `txn`.
    pub fn amount(self, txn: &Transaction) -> Decimal {
        match self {
            Bucket::Income | Bucket::Receivable | Bucket::PayableReducing => txn.income,
            Bucket::Expense => txn.expense,
            Bucket::Ignored => Decimal::ZERO,
        }
    }
}

pub fn classify(kind: CompanyType, tag: TransactionTag) -> Bucket {
    match kind {
        CompanyType::Employer => match tag {
            TransactionTag::Income
            | TransactionTag::Collection
            | TransactionTag::EarnedPaymentReceived => Bucket::Income,
            TransactionTag::EmployerExpense | TransactionTag::PaymentMade => Bucket::Expense,
            TransactionTag::Receivable | TransactionTag::PaymentReceived => Bucket::Ignored,
        },
        CompanyType::Employee => match tag {
            TransactionTag::Receivable => Bucket::Receivable,
            TransactionTag::PaymentReceived => Bucket::PayableReducing,
            TransactionTag::Income
            | TransactionTag::Collection
            | TransactionTag::EarnedPaymentReceived
            | TransactionTag::EmployerExpense
            | TransactionTag::PaymentMade => Bucket::Ignored,
        },
    }
}
