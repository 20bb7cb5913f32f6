//! Feedback messages left through the contact form

use crate::core::{Entity, FieldValue, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
}

impl Feedback {
    pub fn new(name: impl Into<String>, email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            message: message.into(),
            submitted_at: Utc::now(),
        }
    }
}

impl Record for Feedback {
    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.as_str().into()),
            "email" => Some(self.email.as_str().into()),
            "message" => Some(self.message.as_str().into()),
            "submitted_at" => Some(self.submitted_at.into()),
            _ => None,
        }
    }
}

impl Entity for Feedback {
    fn resource_name() -> &'static str {
        "feedback"
    }

    fn resource_name_singular() -> &'static str {
        "feedback"
    }

    fn searchable_fields() -> &'static [&'static str] {
        &["name", "email", "message"]
    }

    fn sortable_fields() -> &'static [&'static str] {
        &["name", "email", "submitted_at"]
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}

/// Contact form submission
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct ContactForm {
    #[validate(length(min = 1, message = "Please enter your name"))]
    pub name: String,

    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Please write a message"))]
    pub message: String,
}

impl ContactForm {
    /// Trim every field, validate, and turn the submission into feedback
    pub fn into_feedback(self) -> Result<Feedback, validator::ValidationErrors> {
        let form = ContactForm {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            message: self.message.trim().to_string(),
        };
        form.validate()?;
        Ok(Feedback::new(form.name, form.email, form.message))
    }
}
