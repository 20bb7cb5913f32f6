//! Job postings published on the public job board

use crate::core::{Entity, FieldValue, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub experience: String,
    pub education: String,
    pub skills: String,
    pub deadline: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobPosting {
    /// A posting accepts applications until its deadline passes
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.deadline > now
    }

    /// Whole days left before the deadline, rounded up; zero or less once closed
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        const DAY_MS: i64 = 24 * 60 * 60 * 1000;
        let ms = (self.deadline - now).num_milliseconds();
        ms.div_euclid(DAY_MS) + i64::from(ms.rem_euclid(DAY_MS) != 0)
    }

    /// Replace the editable fields from a validated form
    pub fn apply(&mut self, form: JobForm) -> Result<(), validator::ValidationErrors> {
        let form = form.normalized();
        form.validate()?;
        if let Some(deadline) = form.deadline {
            self.deadline = deadline;
        }
        self.title = form.title;
        self.description = form.description;
        self.experience = form.experience;
        self.education = form.education;
        self.skills = form.skills;
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl Record for JobPosting {
    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(self.id.into()),
            "title" => Some(self.title.as_str().into()),
            "description" => Some(self.description.as_str().into()),
            "experience" => Some(self.experience.as_str().into()),
            "education" => Some(self.education.as_str().into()),
            "skills" => Some(self.skills.as_str().into()),
            "deadline" => Some(self.deadline.into()),
            "created_at" => Some(self.created_at.into()),
            "updated_at" => Some(self.updated_at.into()),
            _ => None,
        }
    }
}

impl Entity for JobPosting {
    fn resource_name() -> &'static str {
        "jobs"
    }

    fn resource_name_singular() -> &'static str {
        "job"
    }

    fn searchable_fields() -> &'static [&'static str] {
        &["title", "description", "skills"]
    }

    fn sortable_fields() -> &'static [&'static str] {
        &["title", "deadline", "created_at"]
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

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("Please fill all fields including requirements".into()));
    }
    Ok(())
}

/// Create/edit form for a posting
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct JobForm {
    #[validate(custom(function = "not_blank"))]
    pub title: String,

    #[validate(custom(function = "not_blank"))]
    pub description: String,

    #[validate(custom(function = "not_blank"))]
    pub experience: String,

    #[validate(custom(function = "not_blank"))]
    pub education: String,

    #[validate(custom(function = "not_blank"))]
    pub skills: String,

    #[validate(required(message = "Please pick an application deadline"))]
    pub deadline: Option<DateTime<Utc>>,
}

impl JobForm {
    fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            experience: self.experience.trim().to_string(),
            education: self.education.trim().to_string(),
            skills: self.skills.trim().to_string(),
            deadline: self.deadline,
        }
    }

    /// Validate and build a new posting
    pub fn into_posting(self) -> Result<JobPosting, validator::ValidationErrors> {
        let now = Utc::now();
        let mut posting = JobPosting {
            id: Uuid::new_v4(),
            title: String::new(),
            description: String::new(),
            experience: String::new(),
            education: String::new(),
            skills: String::new(),
            deadline: now,
            created_at: now,
            updated_at: now,
        };
        posting.apply(self)?;
        posting.updated_at = posting.created_at;
        Ok(posting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn form(deadline: Option<DateTime<Utc>>) -> JobForm {
        JobForm {
            title: " Backend Developer ".to_string(),
            description: "Build APIs".to_string(),
            experience: "2+ years".to_string(),
            education: "BS Computer Science".to_string(),
            skills: "Rust, SQL".to_string(),
            deadline,
        }
    }

    #[test]
    fn test_form_into_posting() {
        let deadline = Utc::now() + Duration::days(10);
        let posting = form(Some(deadline)).into_posting().unwrap();
        assert_eq!(posting.title, "Backend Developer");
        assert_eq!(posting.deadline, deadline);
        assert_eq!(posting.created_at, posting.updated_at);
    }

    #[test]
    fn test_form_requires_deadline_and_fields() {
        let mut incomplete = form(None);
        incomplete.skills = "   ".to_string();
        let errors = incomplete.into_posting().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("deadline"));
        assert!(fields.contains_key("skills"));
        assert!(!fields.contains_key("title"));
    }

    #[test]
    fn test_open_and_days_remaining() {
        let now = Utc::now();
        let posting = form(Some(now + Duration::hours(30))).into_posting().unwrap();
        assert!(posting.is_open(now));
        assert_eq!(posting.days_remaining(now), 2);

        let exact = form(Some(now + Duration::days(3))).into_posting().unwrap();
        assert_eq!(exact.days_remaining(now), 3);

        let closed = form(Some(now - Duration::hours(1))).into_posting().unwrap();
        assert!(!closed.is_open(now));
        assert_eq!(closed.days_remaining(now), 0);
    }

    #[test]
    fn test_apply_updates_fields() {
        let mut posting = form(Some(Utc::now() + Duration::days(5))).into_posting().unwrap();
        let mut edit = form(None);
        edit.title = "Senior Backend Developer".to_string();
        assert!(posting.apply(edit).is_err());

        let mut edit = form(Some(Utc::now() + Duration::days(7)));
        edit.title = "Senior Backend Developer".to_string();
        posting.apply(edit).unwrap();
        assert_eq!(posting.title, "Senior Backend Developer");
    }
}
