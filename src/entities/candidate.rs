//! Candidate applications reviewed on the admin dashboard

use crate::core::{Entity, FieldValue, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Review state of an application
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateStatus {
    #[default]
    Pending,
    Shortlisted,
    Rejected,
}

impl CandidateStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CandidateStatus::Pending => "pending",
            CandidateStatus::Shortlisted => "shortlisted",
            CandidateStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CandidateStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CandidateStatus::Pending),
            "shortlisted" => Ok(CandidateStatus::Shortlisted),
            "rejected" => Ok(CandidateStatus::Rejected),
            other => Err(format!("unknown candidate status '{}'", other)),
        }
    }
}

/// How well a candidate's match score fits the posting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    Strong,
    Good,
    Fair,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub position: String,
    pub resume_url: String,
    pub status: CandidateStatus,
    /// Percentage, 0..=100
    pub match_score: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Candidate {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        position: impl Into<String>,
        resume_url: impl Into<String>,
        match_score: u8,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            position: position.into(),
            resume_url: resume_url.into(),
            status: CandidateStatus::Pending,
            match_score: match_score.min(100),
            created_at: now,
            updated_at: now,
        }
    }

    /// Move the application to a new review state
    pub fn set_status(&mut self, status: CandidateStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    pub fn match_tier(&self) -> MatchTier {
        match self.match_score {
            85.. => MatchTier::Strong,
            70..=84 => MatchTier::Good,
            _ => MatchTier::Fair,
        }
    }
}

impl Record for Candidate {
    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.as_str().into()),
            "email" => Some(self.email.as_str().into()),
            "position" => Some(self.position.as_str().into()),
            "resume_url" => Some(self.resume_url.as_str().into()),
            "status" => Some(self.status.as_str().into()),
            "match_score" => Some(FieldValue::Integer(self.match_score.into())),
            "created_at" => Some(self.created_at.into()),
            "updated_at" => Some(self.updated_at.into()),
            _ => None,
        }
    }
}

impl Entity for Candidate {
    fn resource_name() -> &'static str {
        "candidates"
    }

    fn resource_name_singular() -> &'static str {
        "candidate"
    }

    fn searchable_fields() -> &'static [&'static str] {
        &["name", "email", "position"]
    }

    fn sortable_fields() -> &'static [&'static str] {
        &["name", "match_score", "status", "created_at"]
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Body of a status change request
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatusUpdate {
    pub status: CandidateStatus,
}
