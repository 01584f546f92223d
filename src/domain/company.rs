use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{ActorId, Displayable, Identifiable, NamedEntity};

/// A party taking part in a job. The type is fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Company {
    pub id: Uuid,
    pub job_id: Uuid,
    pub user_id: ActorId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CompanyType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    pub fn new(job_id: Uuid, owner: ActorId, name: impl Into<String>, kind: CompanyType) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            job_id,
            user_id: owner,
            name: name.into(),
            kind,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.updated_at = Utc::now();
    }

    pub fn is_employer(&self) -> bool {
        self.kind == CompanyType::Employer
    }

    pub fn is_employee(&self) -> bool {
        self.kind == CompanyType::Employee
    }
}

impl Identifiable for Company {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Company {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Company {
    fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.kind.label())
    }
}

/// Role a company plays within its job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CompanyType {
    /// Pays for the work; carries income and expense.
    #[serde(rename = "İşveren", alias = "Employer")]
    Employer,
    /// Is owed for the work and gets paid.
    #[serde(rename = "Çalışan", alias = "Employee")]
    Employee,
}

impl CompanyType {
    pub fn label(self) -> &'static str {
        match self {
            CompanyType::Employer => "İşveren",
            CompanyType::Employee => "Çalışan",
        }
    }
}
