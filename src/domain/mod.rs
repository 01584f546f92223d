pub mod common;
pub mod company;
pub mod job;
pub mod summary;
pub mod transaction;

pub use common::{ActorId, Displayable, Identifiable, NamedEntity};
pub use company::{Company, CompanyType};
pub use job::{Job, JobStatus, JobUpdate};
pub use summary::{
    BalanceStatus, CompanyStats, EmployeeStats, EmployerStats, JobStats, OverallStats, WithStats,
};
pub use transaction::{Side, Transaction, TransactionTag};
