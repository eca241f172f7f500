//! Validated input forms.
//!
//! Each user-facing operation has an explicit form struct and a closed set
//! of validation error kinds; nothing here inspects fields at runtime.
//! Length caps mirror the persisted schema.

use crate::model::{FeedbackType, QueryType, RunType};
use std::fmt;
use std::path::PathBuf;

const SHORT_MAX: usize = 128;
const LONG_MAX: usize = 1024;
const PASSWORD_MIN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    Required,
    TooLong(usize),
    TooShort(usize),
    InvalidCharacters,
    InvalidUrl,
    InvalidEmail,
    FileMissing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub kind: ValidationErrorKind,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValidationErrorKind::Required => write!(f, "{}: required", self.field),
            ValidationErrorKind::TooLong(max) => {
                write!(f, "{}: longer than {} characters", self.field, max)
            }
            ValidationErrorKind::TooShort(min) => {
                write!(f, "{}: shorter than {} characters", self.field, min)
            }
            ValidationErrorKind::InvalidCharacters => {
                write!(f, "{}: contains invalid characters", self.field)
            }
            ValidationErrorKind::InvalidUrl => write!(f, "{}: not a valid http(s) URL", self.field),
            ValidationErrorKind::InvalidEmail => {
                write!(f, "{}: not a valid email address", self.field)
            }
            ValidationErrorKind::FileMissing => write!(f, "{}: file does not exist", self.field),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub username: String,
    pub password: String,
    pub email: String,
    pub display_name: String,
    pub organisation: String,
    pub website: String,
}

#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub username: String,
    pub password: String,
    pub email: String,
    pub display_name: String,
    pub organisation: String,
    pub website: String,
}

pub fn validate_registration(
    form: &RegistrationForm,
) -> Result<ValidRegistration, Vec<FieldError>> {
    let mut errors = Vec::new();

    required("username", &form.username, &mut errors);
    capped("username", &form.username, SHORT_MAX, &mut errors);
    if !form.username.is_empty()
        && !form
            .username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        errors.push(FieldError {
            field: "username",
            kind: ValidationErrorKind::InvalidCharacters,
        });
    }

    if form.password.chars().count() < PASSWORD_MIN {
        errors.push(FieldError {
            field: "password",
            kind: ValidationErrorKind::TooShort(PASSWORD_MIN),
        });
    }

    if !form.email.is_empty() && !email_shape_ok(&form.email) {
        errors.push(FieldError {
            field: "email",
            kind: ValidationErrorKind::InvalidEmail,
        });
    }
    capped("email", &form.email, SHORT_MAX, &mut errors);
    capped("display_name", &form.display_name, SHORT_MAX, &mut errors);
    capped("organisation", &form.organisation, SHORT_MAX, &mut errors);
    capped("website", &form.website, LONG_MAX, &mut errors);
    if !form.website.is_empty() && !http_url_ok(&form.website) {
        errors.push(FieldError {
            field: "website",
            kind: ValidationErrorKind::InvalidUrl,
        });
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(ValidRegistration {
        username: form.username.clone(),
        password: form.password.clone(),
        email: form.email.clone(),
        display_name: form.display_name.clone(),
        organisation: form.organisation.clone(),
        website: form.website.clone(),
    })
}

#[derive(Debug, Clone)]
pub struct RunForm {
    pub name: String,
    pub description: String,
    pub run_type: RunType,
    pub query_type: QueryType,
    pub feedback_type: FeedbackType,
    pub results_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ValidRun {
    pub name: String,
    pub description: String,
    pub run_type: RunType,
    pub query_type: QueryType,
    pub feedback_type: FeedbackType,
    pub results_file: PathBuf,
}

pub fn validate_run(form: &RunForm) -> Result<ValidRun, Vec<FieldError>> {
    let mut errors = Vec::new();

    required("name", &form.name, &mut errors);
    capped("name", &form.name, SHORT_MAX, &mut errors);
    capped("description", &form.description, LONG_MAX, &mut errors);
    if !form.results_file.is_file() {
        errors.push(FieldError {
            field: "results_file",
            kind: ValidationErrorKind::FileMissing,
        });
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(ValidRun {
        name: form.name.clone(),
        description: form.description.clone(),
        run_type: form.run_type,
        query_type: form.query_type,
        feedback_type: form.feedback_type,
        results_file: form.results_file.clone(),
    })
}

fn required(field: &'static str, value: &str, errors: &mut Vec<FieldError>) {
    if value.trim().is_empty() {
        errors.push(FieldError {
            field,
            kind: ValidationErrorKind::Required,
        });
    }
}

fn capped(field: &'static str, value: &str, max: usize, errors: &mut Vec<FieldError>) {
    if value.chars().count() > max {
        errors.push(FieldError {
            field,
            kind: ValidationErrorKind::TooLong(max),
        });
    }
}

fn email_shape_ok(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

fn http_url_ok(raw: &str) -> bool {
    match url::Url::parse(raw) {
        Ok(u) => matches!(u.scheme(), "http" | "https") && u.has_host(),
        Err(_) => false,
    }
}
