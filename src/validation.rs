//! Structural checks applied to request bodies before they reach a store.

use std::collections::HashMap;

/// Field name -> human-readable violation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the first violation recorded for a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sorted field names, for messages.
    pub fn fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        fields.sort_unstable();
        fields
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn into_map(self) -> HashMap<String, String> {
        self.0
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), FieldErrors>;
}

pub fn required(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, "This field is required");
    }
}

pub fn min_length(errors: &mut FieldErrors, field: &str, value: &str, min: usize) {
    if value.is_empty() {
        errors.add(field, "This field is required");
    } else if value.chars().count() < min {
        errors.add(field, format!("Must be at least {} characters", min));
    }
}

/// Upper bound in bytes, not characters.
pub fn max_bytes(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    if value.len() > max {
        errors.add(field, format!("Must be at most {} bytes", max));
    }
}

pub fn non_negative(errors: &mut FieldErrors, field: &str, value: i64) {
    if value < 0 {
        errors.add(field, "Must be greater than or equal to 0");
    }
}

pub fn email(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, "This field is required");
    } else if !is_email_shaped(value) {
        errors.add(field, "Invalid email format");
    }
}

/// `local@domain.tld` with no whitespace and a dotted domain.
pub fn is_email_shaped(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}
