pub mod classification;
pub mod job_ledger;
pub mod services;
pub mod utils;

pub use classification::{classify, Bucket};
pub use job_ledger::{
    JobLedger, PartyRef, Recorded, TransactionForm, TransactionIntent, TransactionView,
};
