use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::validation::{self, FieldErrors, Validate};

/// Product row joined with its category's name (empty when uncategorised)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub quantity: i32,
    pub category_id: Option<Uuid>,
    pub category_name: String,
}

/// Body for create and full-replace update
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductInput {
    pub name: String,
    pub sku: String,
    pub quantity: i32,
    pub category_id: Option<Uuid>,
}

impl Validate for ProductInput {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        validation::required(&mut errors, "name", &self.name);
        validation::required(&mut errors, "sku", &self.sku);
        validation::non_negative(&mut errors, "quantity", i64::from(self.quantity));
        errors.into_result()
    }
}
