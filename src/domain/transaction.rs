use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{ActorId, Displayable, Identifiable};
use crate::errors::ValidationError;

/// A dated financial event recorded against `company_id` and caused by
/// `performed_by_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub job_id: Uuid,
    pub company_id: Uuid,
    /// Absent on rows written before the acting party was tracked.
    #[serde(default)]
    pub performed_by_id: Option<Uuid>,
    pub user_id: ActorId,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub income: Decimal,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub expense: Decimal,
    /// Stored values must belong to the closed tag set; a file holding any
    /// other label is rejected when loaded.
    #[serde(alias = "note")]
    pub tag: TransactionTag,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Builds a single-sided transaction; the side is taken from the tag.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        job_id: Uuid,
        company_id: Uuid,
        performed_by_id: Uuid,
        owner: ActorId,
        tag: TransactionTag,
        amount: Decimal,
        description: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        let (income, expense) = match tag.side() {
            Side::Income => (amount, Decimal::ZERO),
            Side::Expense => (Decimal::ZERO, amount),
        };
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            job_id,
            company_id,
            performed_by_id: Some(performed_by_id),
            user_id: owner,
            date,
            description: description.into(),
            income,
            expense,
            tag,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether both amount columns lie in `0..=MAX_AMOUNT`. Rows built from
    /// validated input always do; rows read from elsewhere may not.
    pub fn amounts_in_range(&self) -> bool {
        let range = Decimal::ZERO..=MAX_AMOUNT;
        range.contains(&self.income) && range.contains(&self.expense)
    }

    /// Whether the transaction involves `company` as target or actor.
    pub fn involves(&self, company: Uuid) -> bool {
        self.company_id == company || self.performed_by_id == Some(company)
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for Transaction {
    fn display_label(&self) -> String {
        format!("txn:{} [{}] {}", self.id, self.tag, self.date)
    }
}

/// Which amount column a tag writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Income,
    Expense,
}

/// Closed vocabulary of transaction kinds. Serialized with the labels the
/// store has always used.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionTag {
    /// Money owed to an employee for work performed.
    #[serde(rename = "Alacak", alias = "Receivable")]
    Receivable,
    #[serde(rename = "Gelir", alias = "Income")]
    Income,
    #[serde(rename = "Tahsilat", alias = "Collection")]
    Collection,
    #[serde(rename = "Hakediş Alındı", alias = "EarnedPaymentReceived")]
    EarnedPaymentReceived,
    #[serde(rename = "İşveren Harcaması", alias = "EmployerExpense")]
    EmployerExpense,
    /// Employer side of a payment to an employee.
    #[serde(rename = "Ödeme Yapıldı", alias = "PaymentMade")]
    PaymentMade,
    /// Employee side of a payment from an employer.
    #[serde(rename = "Ödeme Alındı", alias = "PaymentReceived")]
    PaymentReceived,
}

impl TransactionTag {
    pub const ALL: [TransactionTag; 7] = [
        TransactionTag::Receivable,
        TransactionTag::Income,
        TransactionTag::Collection,
        TransactionTag::EarnedPaymentReceived,
        TransactionTag::EmployerExpense,
        TransactionTag::PaymentMade,
        TransactionTag::PaymentReceived,
    ];

    pub fn side(self) -> Side {
        match self {
            TransactionTag::Receivable
            | TransactionTag::Income
            | TransactionTag::Collection
            | TransactionTag::EarnedPaymentReceived
            | TransactionTag::PaymentReceived => Side::Income,
            TransactionTag::EmployerExpense | TransactionTag::PaymentMade => Side::Expense,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TransactionTag::Receivable => "Alacak",
            TransactionTag::Income => "Gelir",
            TransactionTag::Collection => "Tahsilat",
            TransactionTag::EarnedPaymentReceived => "Hakediş Alındı",
            TransactionTag::EmployerExpense => "İşveren Harcaması",
            TransactionTag::PaymentMade => "Ödeme Yapıldı",
            TransactionTag::PaymentReceived => "Ödeme Alındı",
        }
    }
}

impl fmt::Display for TransactionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transaction tag `{0}`")]
pub struct UnknownTag(pub String);

impl FromStr for TransactionTag {
    type Err = UnknownTag;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        TransactionTag::ALL
            .into_iter()
            .find(|tag| tag.label() == raw || format!("{:?}", tag) == raw)
            .ok_or_else(|| UnknownTag(raw.to_string()))
    }
}

/// Largest amount a single transaction may carry: 1 000 000 000 000.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Decimal places accepted on a user-entered amount.
pub const MAX_AMOUNT_SCALE: u32 = 2;

/// Parses a user-entered amount. Anything non-numeric, zero or negative is
/// rejected.
pub fn parse_amount(raw: &str) -> Result<Decimal, ValidationError> {
    let amount = Decimal::from_str(raw.trim()).map_err(|_| ValidationError::InvalidAmount)?;
    validate_amount(amount)
}

/// Accepts amounts in `(0, MAX_AMOUNT]` with at most two decimals, which
/// keeps every statistic far inside the range `Decimal` can sum.
pub fn validate_amount(amount: Decimal) -> Result<Decimal, ValidationError> {
    if amount > Decimal::ZERO
        && amount <= MAX_AMOUNT
        && amount.normalize().scale() <= MAX_AMOUNT_SCALE
    {
        Ok(amount)
    } else {
        Err(ValidationError::InvalidAmount)
    }
}

/// Trims `raw`, rejecting descriptions that are blank.
pub fn normalize_description(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(ValidationError::EmptyDescription)
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn expense_tags_fill_the_expense_column() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let company = Uuid::new_v4();
        let txn = Transaction::new(
            Uuid::new_v4(),
            company,
            company,
            ActorId::new("owner"),
            TransactionTag::EmployerExpense,
            dec!(75.50),
            "fuel",
            date,
        );
        assert_eq!(txn.expense, dec!(75.50));
        assert_eq!(txn.income, Decimal::ZERO);
        assert!(txn.involves(company));
    }

    #[test]
    fn tags_parse_from_stored_and_english_names() {
        assert_eq!(
            "Hakediş Alındı".parse::<TransactionTag>().unwrap(),
            TransactionTag::EarnedPaymentReceived
        );
        assert_eq!(
            "PaymentMade".parse::<TransactionTag>().unwrap(),
            TransactionTag::PaymentMade
        );
        assert!("Bonus".parse::<TransactionTag>().is_err());
    }

    #[test]
    fn legacy_note_field_is_read_as_tag() {
        let json = r#"{
            "id": "6f1c7f4e-8e0c-4a4f-9a57-4f8b4b0c2a11",
            "job_id": "0b0d9b7e-3f0a-4c47-8d8c-2f3a4b5c6d7e",
            "company_id": "1c2d3e4f-5a6b-4c7d-8e9f-0a1b2c3d4e5f",
            "performed_by_id": null,
            "user_id": "owner",
            "date": "2024-02-10",
            "description": "advance",
            "income": 150.25,
            "expense": 0,
            "note": "Ödeme Alındı",
            "created_at": "2024-02-10T08:00:00Z",
            "updated_at": "2024-02-10T08:00:00Z"
        }"#;
        let txn: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(txn.tag, TransactionTag::PaymentReceived);
        assert_eq!(txn.income, dec!(150.25));
        assert_eq!(txn.performed_by_id, None);
    }

    #[test]
    fn amount_parsing_rejects_non_positive_and_garbage() {
        assert_eq!(parse_amount(" 12.5 ").unwrap(), dec!(12.5));
        assert_eq!(parse_amount("0"), Err(ValidationError::InvalidAmount));
        assert_eq!(parse_amount("-3"), Err(ValidationError::InvalidAmount));
        assert_eq!(parse_amount("abc"), Err(ValidationError::InvalidAmount));
        assert_eq!(parse_amount(""), Err(ValidationError::InvalidAmount));
    }

    #[test]
    fn amounts_are_capped_in_size_and_precision() {
        assert_eq!(MAX_AMOUNT, dec!(1000000000000));
        assert_eq!(parse_amount("1000000000000").unwrap(), MAX_AMOUNT);
        assert_eq!(parse_amount("19.90").unwrap(), dec!(19.9));
        assert_eq!(parse_amount("7.500").unwrap(), dec!(7.5));
        assert_eq!(
            parse_amount("50000000000000000000000000000"),
            Err(ValidationError::InvalidAmount)
        );
        assert_eq!(
            parse_amount("1000000000000.01"),
            Err(ValidationError::InvalidAmount)
        );
        assert_eq!(parse_amount("0.001"), Err(ValidationError::InvalidAmount));
        assert_eq!(
            validate_amount(Decimal::MAX),
            Err(ValidationError::InvalidAmount)
        );
    }

    #[test]
    fn amount_columns_serialize_as_numbers() {
        let txn = Transaction::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            ActorId::new("owner"),
            TransactionTag::Income,
            dec!(12.5),
            "invoice",
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        );
        assert!(txn.amounts_in_range());
        let value = serde_json::to_value(&txn).unwrap();
        assert_eq!(value["income"], 12.5);
        assert_eq!(value["expense"], 0.0);
        let back: Transaction = serde_json::from_value(value).unwrap();
        assert_eq!(back.income, dec!(12.5));
    }

    #[test]
    fn descriptions_are_trimmed() {
        assert_eq!(normalize_description("  rent ").unwrap(), "rent");
        assert_eq!(
            normalize_description(" \t "),
            Err(ValidationError::EmptyDescription)
        );
    }
}
