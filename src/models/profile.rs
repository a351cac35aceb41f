// src/models/profile.rs

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use validator::Validate;

use crate::controller::Draft;
use crate::error::{FieldErrors, field_errors};

/// DTO for the evaluator editing their own account.
/// Password fields are only sent when a new password is given.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileDraft {
    #[validate(length(min = 1, max = 255, message = "The name is required."))]
    pub name: String,

    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,

    #[serde(skip_serializing)]
    pub current_password: String,

    #[serde(skip_serializing)]
    pub password: String,

    #[serde(skip_serializing)]
    pub password_confirmation: String,
}

impl Draft for ProfileDraft {
    fn check(&self) -> Result<(), FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => field_errors(&e),
        };

        if !self.password.is_empty() {
            let mut push = |field: &str, msg: &str| {
                errors
                    .entry(field.to_string())
                    .or_default()
                    .push(msg.to_string());
            };
            if self.password.chars().count() < 8 {
                push("password", "The password must be at least 8 characters.");
            }
            if self.password != self.password_confirmation {
                push("password_confirmation", "The password confirmation does not match.");
            }
            if self.current_password.is_empty() {
                push("current_password", "Enter your current password to change it.");
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    fn payload(&self) -> Value {
        let mut body = json!({
            "name": self.name.trim(),
            "email": self.email.trim(),
        });
        if !self.password.is_empty() {
            if let Some(map) = body.as_object_mut() {
                map.insert("current_password".to_string(), json!(self.current_password));
                map.insert("password".to_string(), json!(self.password));
                map.insert(
                    "password_confirmation".to_string(),
                    json!(self.password_confirmation),
                );
            }
        }
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ProfileDraft {
        ProfileDraft {
            name: "Dana Reyes".to_string(),
            email: "dana@example.edu".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn name_and_email_only() {
        let d = draft();
        assert!(d.check().is_ok());
        assert!(d.payload().get("password").is_none());
    }

    #[test]
    fn password_change_rules() {
        let mut d = draft();
        d.password = "short".to_string();
        d.password_confirmation = "other".to_string();
        let errors = d.check().unwrap_err();
        assert!(errors.contains_key("password"));
        assert!(errors.contains_key("password_confirmation"));
        assert!(errors.contains_key("current_password"));

        d.password = "longenough".to_string();
        d.password_confirmation = "longenough".to_string();
        d.current_password = "old-secret".to_string();
        assert!(d.check().is_ok());
        assert_eq!(d.payload()["password"], "longenough");
    }

    #[test]
    fn invalid_email_is_rejected() {
        let mut d = draft();
        d.email = "not-an-email".to_string();
        assert!(d.check().unwrap_err().contains_key("email"));
    }
}
