//! Local form models validated before any request is sent.

use crate::models::{CreateTaskRequest, LoginRequest, RegisterRequest};
use crate::utils::time::parse_due_date;
use chrono::{Local, TimeZone};

/// Minimum accepted password length at registration
pub const MIN_PASSWORD_LEN: usize = 6;

/// A form failed local validation; the message is shown as-is
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Registration form including the UI-level password confirmation
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    /// Check the form and produce the request body.
    ///
    /// Checks run in a fixed order: required fields, confirmation, length.
    pub fn validate(&self) -> Result<RegisterRequest, ValidationError> {
        if self.username.is_empty()
            || self.email.is_empty()
            || self.password.is_empty()
            || self.confirm_password.is_empty()
        {
            return Err(ValidationError::new("Please fill in all fields"));
        }

        if self.password != self.confirm_password {
            return Err(ValidationError::new("Passwords do not match"));
        }

        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::new(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters long"
            )));
        }

        Ok(RegisterRequest {
            username: self.username.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
        })
    }
}

/// Login form
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginRequest, ValidationError> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(ValidationError::new("Please fill in all fields"));
        }

        Ok(LoginRequest {
            email: self.email.clone(),
            password: self.password.clone(),
        })
    }
}

/// New-task form. `due` is the raw user input, empty meaning "no due date".
#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    pub title: String,
    pub due: String,
}

impl TaskForm {
    pub fn new(title: impl Into<String>, due: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            due: due.into(),
        }
    }

    /// Validate using the local timezone for inputs without an offset
    pub fn validate(&self) -> Result<CreateTaskRequest, ValidationError> {
        self.validate_in(&Local)
    }

    /// Validate, interpreting offset-less due dates in `tz`
    pub fn validate_in<Tz: TimeZone>(&self, tz: &Tz) -> Result<CreateTaskRequest, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::new("Task title cannot be empty"));
        }

        let due = self.due.trim();
        let due_date = if due.is_empty() {
            None
        } else {
            Some(parse_due_date(due, tz).ok_or_else(|| {
                ValidationError::new(format!(
                    "Invalid due date '{due}', expected YYYY-MM-DD or YYYY-MM-DDTHH:MM"
                ))
            })?)
        };

        Ok(CreateTaskRequest {
            title: title.to_string(),
            due_date,
        })
    }
}
