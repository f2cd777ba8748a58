//! Client-side validation of request DTOs.
//!
//! Each DTO validates itself and reports every failing field at once, so a
//! form can show all problems in one pass. Validation never touches the
//! network; resource clients run it before issuing create/update requests.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::{TaskCreate, TaskUpdate, UserCreate, UserUpdate};

pub const TITLE_MIN_LEN: usize = 3;
pub const USERNAME_MIN_LEN: usize = 3;
pub const PASSWORD_MIN_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$")
        .expect("email regex is valid")
});

/// A single failing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every field error produced by one validation pass. Never empty when
/// returned as an `Err`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Messages for one field, in the order they were added.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.errors
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed")?;
        for (i, e) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{} {}", e.field, e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn check_title(errors: &mut ValidationErrors, title: &str) {
    let title = title.trim();
    if title.is_empty() {
        errors.add("title", "is required");
    } else if title.chars().count() < TITLE_MIN_LEN {
        errors.add("title", format!("must be at least {TITLE_MIN_LEN} characters"));
    }
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if email.trim().is_empty() {
        errors.add("email", "is required");
    } else if !is_valid_email(email) {
        errors.add("email", "must be a valid email address");
    }
}

fn check_username(errors: &mut ValidationErrors, username: &str) {
    let username = username.trim();
    if username.is_empty() {
        errors.add("username", "is required");
    } else if username.chars().count() < USERNAME_MIN_LEN {
        errors.add("username", format!("must be at least {USERNAME_MIN_LEN} characters"));
    }
}

fn check_password(errors: &mut ValidationErrors, password: &str) {
    if password.is_empty() {
        errors.add("password", "is required");
    } else if password.chars().count() < PASSWORD_MIN_LEN {
        errors.add("password", format!("must be at least {PASSWORD_MIN_LEN} characters"));
    }
}

impl Validate for TaskCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_title(&mut errors, &self.title);
        if self.owner_id <= 0 {
            errors.add("owner_id", "is required");
        }
        errors.into_result()
    }
}

impl Validate for TaskUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(title) = &self.title {
            check_title(&mut errors, title);
        }
        errors.into_result()
    }
}

impl Validate for UserCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_email(&mut errors, &self.email);
        check_username(&mut errors, &self.username);
        check_password(&mut errors, &self.password);
        errors.into_result()
    }
}

impl Validate for UserUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(email) = &self.email {
            check_email(&mut errors, email);
        }
        if let Some(username) = &self.username {
            check_username(&mut errors, username);
        }
        if let Some(password) = &self.password {
            check_password(&mut errors, password);
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_create() -> UserCreate {
        UserCreate {
            email: "alice@example.com".to_string(),
            username: "alice".to_string(),
            password: "hunter22".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn valid_task_create_passes() {
        let dto = TaskCreate {
            title: "Write spec".to_string(),
            owner_id: 1,
            ..Default::default()
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn task_create_reports_every_field() {
        let dto = TaskCreate {
            title: "  ".to_string(),
            owner_id: 0,
            ..Default::default()
        };
        let errors = dto.validate().unwrap_err();
        assert_eq!(errors.errors().len(), 2);
        assert!(errors.has_field("title"));
        assert!(errors.has_field("owner_id"));
        assert_eq!(errors.for_field("title").collect::<Vec<_>>(), vec!["is required"]);
    }

    #[test]
    fn short_title_is_rejected() {
        let dto = TaskCreate {
            title: "ab".to_string(),
            owner_id: 1,
            ..Default::default()
        };
        let errors = dto.validate().unwrap_err();
        assert_eq!(
            errors.for_field("title").collect::<Vec<_>>(),
            vec!["must be at least 3 characters"]
        );
    }

    #[test]
    fn empty_task_update_is_valid() {
        assert!(TaskUpdate::default().validate().is_ok());
    }

    #[test]
    fn task_update_checks_present_title() {
        let dto = TaskUpdate {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(dto.validate().unwrap_err().has_field("title"));
    }

    #[test]
    fn valid_user_create_passes() {
        assert!(user_create().validate().is_ok());
    }

    #[test]
    fn user_create_rejects_bad_email_short_username_and_password() {
        let dto = UserCreate {
            email: "not-an-email".to_string(),
            username: "al".to_string(),
            password: "123".to_string(),
            ..Default::default()
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.has_field("email"));
        assert!(errors.has_field("username"));
        assert!(errors.has_field("password"));
    }

    #[test]
    fn user_update_without_password_is_valid() {
        let dto = UserUpdate {
            full_name: Some(Some("Alice A.".to_string())),
            ..Default::default()
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn user_update_checks_present_password() {
        let dto = UserUpdate {
            password: Some("abc".to_string()),
            ..Default::default()
        };
        assert!(dto.validate().unwrap_err().has_field("password"));
    }

    #[test]
    fn username_length_ignores_surrounding_whitespace() {
        let dto = UserCreate {
            username: "  al  ".to_string(),
            ..user_create()
        };
        let errors = dto.validate().unwrap_err();
        assert_eq!(
            errors.for_field("username").collect::<Vec<_>>(),
            vec!["must be at least 3 characters"]
        );

        let dto = UserCreate {
            username: " bob ".to_string(),
            ..user_create()
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn email_syntax() {
        assert!(is_valid_email("a.b+c@sub.example.org"));
        assert!(is_valid_email("root@localhost"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("space in@example.com"));
    }

    #[test]
    fn display_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("title", "is required");
        errors.add("owner_id", "is required");
        assert_eq!(errors.to_string(), "validation failed: title is required; owner_id is required");
    }
}
