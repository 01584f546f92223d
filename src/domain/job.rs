use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{ActorId, Displayable, Identifiable, NamedEntity};

/// A project or engagement scoping a set of companies and transactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: Uuid,
    pub user_id: ActorId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(
        owner: ActorId,
        name: impl Into<String>,
        start_date: NaiveDate,
        status: JobStatus,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: owner,
            name: name.into(),
            description: String::new(),
            start_date,
            end_date: None,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Applies the editable fields of `update`, leaving identity, ownership
    /// and creation time untouched.
    pub fn apply(&mut self, update: JobUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(start_date) = update.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = update.end_date {
            self.end_date = end_date;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
    }
}

impl Identifiable for Job {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Job {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Job {
    fn display_label(&self) -> String {
        format!("{} [{}]", self.name, self.status.label())
    }
}

/// Partial edit of a job. `end_date: Some(None)` clears the end date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<Option<NaiveDate>>,
    pub status: Option<JobStatus>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum JobStatus {
    #[serde(rename = "Aktif", alias = "Active")]
    Active,
    #[serde(rename = "Tamamlandı", alias = "Completed")]
    Completed,
    #[serde(rename = "Duraklatıldı", alias = "Paused")]
    Paused,
}

impl JobStatus {
    /// Label used by stored records.
    pub fn label(self) -> &'static str {
        match self {
            JobStatus::Active => "Aktif",
            JobStatus::Completed => "Tamamlandı",
            JobStatus::Paused => "Duraklatıldı",
        }
    }
}
