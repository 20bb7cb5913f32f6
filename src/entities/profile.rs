//! Personal details a user keeps on their dashboard
//!
//! One profile per account, keyed by the account id. A user who never saved
//! one sees an empty profile with no `updated_at`.

use crate::core::{Entity, FieldValue, Record};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub phone: String,
    pub location: String,
    pub summary: String,
    pub skills: String,
    pub education: String,
    pub experience: String,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            phone: String::new(),
            location: String::new(),
            summary: String::new(),
            skills: String::new(),
            education: String::new(),
            experience: String::new(),
            updated_at: None,
        }
    }
}

impl Record for UserProfile {
    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "user_id" => Some(self.user_id.into()),
            "phone" => Some(self.phone.as_str().into()),
            "location" => Some(self.location.as_str().into()),
            "summary" => Some(self.summary.as_str().into()),
            "skills" => Some(self.skills.as_str().into()),
            "education" => Some(self.education.as_str().into()),
            "experience" => Some(self.experience.as_str().into()),
            "updated_at" => Some(self.updated_at.into()),
            _ => None,
        }
    }
}

impl Entity for UserProfile {
    fn resource_name() -> &'static str {
        "profiles"
    }

    fn resource_name_singular() -> &'static str {
        "profile"
    }

    fn searchable_fields() -> &'static [&'static str] {
        &["location", "summary", "skills"]
    }

    fn sortable_fields() -> &'static [&'static str] {
        &["location", "updated_at"]
    }

    fn id(&self) -> Uuid {
        self.user_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(DateTime::UNIX_EPOCH)
    }
}

fn phone_number(value: &str) -> Result<(), ValidationError> {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    let phone = PHONE.get_or_init(|| Regex::new(r"^\+?[0-9][0-9 ()-]{5,19}$").unwrap());

    if !value.is_empty() && !phone.is_match(value) {
        return Err(ValidationError::new("phone").with_message("Please enter a valid phone number".into()));
    }
    Ok(())
}

/// Edit form for the caller's own profile; every field may be left blank
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct ProfileForm {
    #[validate(custom(function = "phone_number"))]
    pub phone: String,

    #[validate(length(max = 100, message = "Location is too long"))]
    pub location: String,

    #[validate(length(max = 2000, message = "Summary is too long"))]
    pub summary: String,

    #[validate(length(max = 1000, message = "Skills are too long"))]
    pub skills: String,

    #[validate(length(max = 2000, message = "Education is too long"))]
    pub education: String,

    #[validate(length(max = 2000, message = "Experience is too long"))]
    pub experience: String,
}

impl ProfileForm {
    /// Trim, validate and stamp the profile for `user_id`
    pub fn into_profile(self, user_id: Uuid, at: DateTime<Utc>) -> Result<UserProfile, validator::ValidationErrors> {
        let form = ProfileForm {
            phone: self.phone.trim().to_string(),
            location: self.location.trim().to_string(),
            summary: self.summary.trim().to_string(),
            skills: self.skills.trim().to_string(),
            education: self.education.trim().to_string(),
            experience: self.experience.trim().to_string(),
        };
        form.validate()?;

        Ok(UserProfile {
            user_id,
            phone: form.phone,
            location: form.location,
            summary: form.summary,
            skills: form.skills,
            education: form.education,
            experience: form.experience,
            updated_at: Some(at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_form_is_valid() {
        let user_id = Uuid::new_v4();
        let at = Utc::now();
        let profile = ProfileForm::default().into_profile(user_id, at).unwrap();

        assert_eq!(profile.id(), user_id);
        assert_eq!(profile.updated_at, Some(at));
        assert!(profile.phone.is_empty());
    }

    #[test]
    fn test_form_trims_and_checks_phone() {
        let form = ProfileForm {
            phone: " +92 300 1234567 ".to_string(),
            location: " Lahore ".to_string(),
            ..ProfileForm::default()
        };
        let profile = form.into_profile(Uuid::new_v4(), Utc::now()).unwrap();
        assert_eq!(profile.phone, "+92 300 1234567");
        assert_eq!(profile.location, "Lahore");

        let form = ProfileForm {
            phone: "call me".to_string(),
            summary: "x".repeat(2001),
            ..ProfileForm::default()
        };
        let errors = form.into_profile(Uuid::new_v4(), Utc::now()).unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("phone"));
        assert!(fields.contains_key("summary"));
        assert!(!fields.contains_key("location"));
    }

    #[test]
    fn test_empty_profile_has_no_timestamp() {
        let profile = UserProfile::empty(Uuid::new_v4());
        assert_eq!(profile.updated_at, None);
        assert_eq!(profile.field_value("updated_at"), Some(FieldValue::Null));
    }
}
