//! Login payload validation
//!
//! Shape-checks a login payload before any directory lookup happens. Errors
//! are keyed by field so the boundary can render them per input.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw login payload as received from the boundary.
///
/// `bio` is accepted for wire compatibility but carries no meaning here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl LoginPayload {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
            bio: None,
        }
    }
}

/// Validated credentials. Transient: never persisted, never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Individual validation error for a specific field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// The field that failed validation
    pub field: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for programmatic handling
    pub code: String,
}

impl ValidationError {
    pub fn new(
        field: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Collection of validation errors, keyed by field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
pub struct ValidationErrors {
    pub errors: HashMap<String, Vec<ValidationError>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.entry(error.field.clone()).or_default().push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of fields with errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn has_field_errors(&self, field: &str) -> bool {
        self.errors.get(field).is_some_and(|e| !e.is_empty())
    }

    pub fn get_field_errors(&self, field: &str) -> Option<&Vec<ValidationError>> {
        self.errors.get(field)
    }

    /// JSON body for a 400 response
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": "validation_failed",
                "message": "Validation failed",
                "fields": self.errors,
            }
        })
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            write!(f, "No validation errors")
        } else {
            write!(f, "Validation failed for {} field(s):", self.errors.len())?;
            for (field, field_errors) in &self.errors {
                for error in field_errors {
                    write!(f, "\n  {}: {}", field, error.message)?;
                }
            }
            Ok(())
        }
    }
}

/// Shape constraints on a login payload.
///
/// Pure and deterministic; all violated constraints are reported, not just
/// the first.
#[derive(Debug, Clone)]
pub struct CredentialValidator {
    username_min: usize,
    username_max: usize,
    password_min: usize,
}

impl Default for CredentialValidator {
    fn default() -> Self {
        Self {
            username_min: 3,
            username_max: 30,
            password_min: 6,
        }
    }
}

impl CredentialValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self, payload: &LoginPayload) -> Result<Credentials, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let username = match payload.username.as_deref() {
            None | Some("") => {
                errors.add(ValidationError::new(
                    "username",
                    "Username is required",
                    "required",
                ));
                None
            }
            Some(username) => {
                if !username.chars().all(|c| c.is_ascii_alphanumeric()) {
                    errors.add(ValidationError::new(
                        "username",
                        "Username must only contain alphanumeric characters",
                        "alphanum",
                    ));
                }
                let length = username.chars().count();
                if length < self.username_min {
                    errors.add(ValidationError::new(
                        "username",
                        format!(
                            "Username must be at least {} characters long",
                            self.username_min
                        ),
                        "min_length",
                    ));
                } else if length > self.username_max {
                    errors.add(ValidationError::new(
                        "username",
                        format!(
                            "Username must be at most {} characters long",
                            self.username_max
                        ),
                        "max_length",
                    ));
                }
                Some(username)
            }
        };

        let password = match payload.password.as_deref() {
            None | Some("") => {
                errors.add(ValidationError::new(
                    "password",
                    "Password is required",
                    "required",
                ));
                None
            }
            Some(password) => {
                if password.chars().count() < self.password_min {
                    errors.add(ValidationError::new(
                        "password",
                        format!(
                            "Password must be at least {} characters long",
                            self.password_min
                        ),
                        "min_length",
                    ));
                }
                Some(password)
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Credentials {
            username: username.unwrap_or_default().to_string(),
            password: password.unwrap_or_default().to_string(),
        })
    }
}
