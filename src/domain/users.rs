use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::models::{new_record_id, ApprovalStatus, Role, User};
use crate::errors::{AppError, ValidationError};

/// Sign-up form as submitted
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub password_confirmation: String,
}

/// `firstname.lastname`, lowercase, inner whitespace dropped
pub fn username_for(first_name: &str, last_name: &str) -> String {
    format!("{}.{}", squash(first_name), squash(last_name))
}

fn squash(part: &str) -> String {
    part.split_whitespace().collect::<String>().to_lowercase()
}

pub fn find_by_username<'a>(users: &'a [User], username: &str) -> Option<&'a User> {
    users
        .iter()
        .find(|user| user.username.eq_ignore_ascii_case(username.trim()))
}

pub struct Registrar {
    cost: u32,
}

impl Default for Registrar {
    fn default() -> Self {
        Self::new()
    }
}

impl Registrar {
    pub fn new() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }

    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    /// Build the new account. The very first account is approved and admin,
    /// everyone after starts as a pending scout.
    pub fn register(&self, form: &RegistrationForm, existing: &[User], now: DateTime<Utc>) -> Result<User, AppError> {
        validate_form(form)?;

        let username = username_for(&form.first_name, &form.last_name);
        if find_by_username(existing, &username).is_some() {
            return Err(ValidationError::DuplicateUsername(username).into());
        }

        let (role, status) = if existing.is_empty() {
            (Role::Admin, ApprovalStatus::Approved)
        } else {
            (Role::Scout, ApprovalStatus::Pending)
        };

        let password_hash = bcrypt::hash(&form.password, self.cost).context("Failed to hash password")?;

        Ok(User {
            id: new_record_id(),
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            username,
            password_hash,
            role,
            status,
            created_at: now,
        })
    }
}

fn validate_form(form: &RegistrationForm) -> Result<(), ValidationError> {
    if form.first_name.trim().is_empty() {
        return Err(ValidationError::MissingField("firstName"));
    }
    if form.last_name.trim().is_empty() {
        return Err(ValidationError::MissingField("lastName"));
    }
    if form.password.is_empty() {
        return Err(ValidationError::MissingField("password"));
    }
    if form.password != form.password_confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// Check credentials against the known accounts; pending accounts cannot sign in
pub fn authenticate(users: &[User], username: &str, password: &str) -> Result<User, ValidationError> {
    let user = find_by_username(users, username).ok_or(ValidationError::InvalidCredentials)?;

    let valid = bcrypt::verify(password, &user.password_hash).unwrap_or(false);
    if !valid {
        return Err(ValidationError::InvalidCredentials);
    }
    if user.status == ApprovalStatus::Pending {
        return Err(ValidationError::PendingApproval(user.username.clone()));
    }
    Ok(user.clone())
}

pub fn approve(mut user: User) -> User {
    user.status = ApprovalStatus::Approved;
    user
}

pub fn set_role(mut user: User, role: Role) -> User {
    user.role = role;
    user
}
