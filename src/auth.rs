//! Mock sign in, sign up and profile editing
//!
//! No credentials are checked anywhere: a form that validates signs the user
//! in, and the resulting [`UserRecord`] is stored in the [`UserSession`].

use garde::Validate;
use rustrict::CensorStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    constants::account::{DEMO_PASSWORD, MAX_NAME_LENGTH, MIN_PASSWORD_LENGTH},
    user::{self, Role, Store, UserRecord, UserSession},
};

type ValidationResult = garde::Result;

/// Name given to users signing in through [`login`]
const SIGNED_IN_NAME: &str = "John Doe";

/// Errors returned by the account operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The form failed validation
    #[error("invalid form: {0}")]
    Invalid(String),
    /// A password reset was requested without an email
    #[error("an email address is required to reset the password")]
    EmailRequired,
    /// The user session could not be written
    #[error(transparent)]
    Session(#[from] user::Error),
}

impl From<garde::Report> for Error {
    fn from(report: garde::Report) -> Self {
        Self::Invalid(report.to_string())
    }
}

/// Rejects names that are blank or inappropriate
fn appropriate_name(value: &str) -> ValidationResult {
    let name = rustrict::trim_whitespace(value);
    if name.is_empty() {
        Err(garde::Error::new("name cannot be blank"))
    } else if name.is_inappropriate() {
        Err(garde::Error::new("name is inappropriate"))
    } else {
        Ok(())
    }
}

fn accepted(value: bool) -> ValidationResult {
    if value {
        Ok(())
    } else {
        Err(garde::Error::new("the terms and conditions must be accepted"))
    }
}

/// Sign in form
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LoginForm {
    /// Email address
    #[garde(email)]
    pub email: String,
    /// Password, only checked for presence
    #[garde(length(min = 1))]
    pub password: String,
    /// Remember me checkbox
    #[garde(skip)]
    pub remember_me: bool,
}

/// Sign up form
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RegistrationForm {
    /// Full name
    #[garde(
        length(chars, min = 1, max = MAX_NAME_LENGTH),
        custom(|v, _| appropriate_name(v))
    )]
    pub full_name: String,
    /// Email address
    #[garde(email)]
    pub email: String,
    /// Password
    #[garde(length(chars, min = MIN_PASSWORD_LENGTH))]
    pub password: String,
    /// Password typed a second time
    #[garde(matches(password))]
    pub confirm_password: String,
    /// Selected role
    #[garde(required)]
    pub role: Option<Role>,
    /// Terms and conditions checkbox
    #[garde(custom(|v: &bool, _: &()| accepted(*v)))]
    pub agree_to_terms: bool,
}

/// Profile edit form
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProfileForm {
    /// Display name
    #[garde(
        length(chars, min = 1, max = MAX_NAME_LENGTH),
        custom(|v, _| appropriate_name(v))
    )]
    pub name: String,
    /// Email address
    #[garde(email)]
    pub email: String,
    /// Role
    #[garde(skip)]
    pub role: Role,
}

impl From<&UserRecord> for ProfileForm {
    fn from(user: &UserRecord) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// One-click demo accounts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DemoAccount {
    /// Demo student
    Student,
    /// Demo teacher
    Teacher,
    /// Demo administrator
    Admin,
}

impl DemoAccount {
    /// Every demo account, in display order
    pub const ALL: [Self; 3] = [Self::Student, Self::Teacher, Self::Admin];

    /// Short label of the account
    pub fn label(self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Teacher => "Teacher",
            Self::Admin => "Admin",
        }
    }

    /// Email address of the account
    pub fn email(self) -> &'static str {
        match self {
            Self::Student => "student@school.edu",
            Self::Teacher => "teacher@school.edu",
            Self::Admin => "admin@school.edu",
        }
    }

    /// Role the account signs in with
    pub fn role(self) -> Role {
        match self {
            Self::Student => Role::Student,
            Self::Teacher => Role::Teacher,
            Self::Admin => Role::Admin,
        }
    }

    /// The pre-filled sign in form
    pub fn form(self) -> LoginForm {
        LoginForm {
            email: self.email().to_owned(),
            password: DEMO_PASSWORD.to_owned(),
            remember_me: false,
        }
    }
}

/// Signs in with `form`
///
/// # Errors
///
/// Returns [`Error::Invalid`] when the email or password is missing, and
/// [`Error::Session`] when the user cannot be stored.
pub fn login<S: Store>(
    session: &mut UserSession<S>,
    form: &LoginForm,
) -> Result<UserRecord, Error> {
    form.validate()?;

    let user = UserRecord {
        name: SIGNED_IN_NAME.to_owned(),
        email: form.email.clone(),
        role: Role::Student,
    };
    session.set(&user)?;
    tracing::info!(email = %user.email, "signed in");

    Ok(user)
}

/// Signs in as one of the demo accounts
///
/// # Errors
///
/// Returns [`Error::Session`] when the user cannot be stored.
pub fn demo_login<S: Store>(
    session: &mut UserSession<S>,
    account: DemoAccount,
) -> Result<UserRecord, Error> {
    account.form().validate()?;

    let user = UserRecord {
        name: format!("Demo {}", account.label()),
        email: account.email().to_owned(),
        role: account.role(),
    };
    session.set(&user)?;
    tracing::info!(account = account.label(), "signed in with demo account");

    Ok(user)
}

/// Creates an account from `form` and signs it in
///
/// # Errors
///
/// Returns [`Error::Invalid`] when a field is missing or malformed, the
/// passwords differ, the password is too short, the name is inappropriate
/// or the terms are not accepted. Returns [`Error::Session`] when the user
/// cannot be stored.
pub fn register<S: Store>(
    session: &mut UserSession<S>,
    form: &RegistrationForm,
) -> Result<UserRecord, Error> {
    form.validate()?;

    let user = UserRecord {
        name: rustrict::trim_whitespace(&form.full_name).to_owned(),
        email: form.email.clone(),
        role: form.role.unwrap_or_default(),
    };
    session.set(&user)?;
    tracing::info!(email = %user.email, role = %user.role, "account created");

    Ok(user)
}

/// Requests a password reset for `email`
///
/// Nothing is sent; the request is only logged.
///
/// # Errors
///
/// Returns [`Error::EmailRequired`] if `email` is blank.
pub fn forgot_password(email: &str) -> Result<(), Error> {
    let email = email.trim();
    if email.is_empty() {
        return Err(Error::EmailRequired);
    }
    tracing::info!(%email, "password reset requested");
    Ok(())
}

/// Replaces the stored user with the edited profile
///
/// # Errors
///
/// Returns [`Error::Invalid`] when the form does not validate and
/// [`Error::Session`] when the user cannot be stored.
pub fn update_profile<S: Store>(
    session: &mut UserSession<S>,
    form: &ProfileForm,
) -> Result<UserRecord, Error> {
    form.validate()?;

    let user = UserRecord {
        name: rustrict::trim_whitespace(&form.name).to_owned(),
        email: form.email.clone(),
        role: form.role,
    };
    session.set(&user)?;
    tracing::info!(email = %user.email, "profile updated");

    Ok(user)
}

/// Signs out
pub fn logout<S: Store>(session: &mut UserSession<S>) {
    session.clear();
    tracing::info!("signed out");
}
