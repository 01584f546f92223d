pub mod company_service;
pub mod job_service;
pub mod summary_service;
pub mod transaction_service;

pub use company_service::CompanyService;
pub use job_service::{JobService, NewJob};
pub use summary_service::SummaryService;
pub use transaction_service::{PaymentPair, PaymentRequest, TransactionRequest, TransactionService};
