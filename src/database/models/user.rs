use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::validation::{self, FieldErrors, Validate};

/// Minimum accepted password length at registration
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// bcrypt only reads this many bytes of input.
pub const MAX_PASSWORD_BYTES: usize = crate::auth::password::MAX_PASSWORD_BYTES;

/// Stored user identity. The hash never leaves the process.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// `{email, password}` body shared by registration and login
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Login only checks presence; format rules would leak which emails can exist.
    pub fn validate_login(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        validation::required(&mut errors, "email", &self.email);
        validation::required(&mut errors, "password", &self.password);
        errors.into_result()
    }
}

impl Validate for Credentials {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        validation::email(&mut errors, "email", &self.email);
        validation::min_length(&mut errors, "password", &self.password, MIN_PASSWORD_LENGTH);
        validation::max_bytes(&mut errors, "password", &self.password, MAX_PASSWORD_BYTES);
        errors.into_result()
    }
}
