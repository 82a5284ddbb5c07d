use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{
    Category, Customer, NewCategory, NewCustomer, Product, ProductInput, User,
};

/// Typed outcome of a store operation
#[derive(Debug, Error)]
pub enum StoreError {
    /// The addressed entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A uniqueness or restrict constraint refused the write.
    #[error("{0}")]
    Conflict(String),

    /// A foreign key in the payload points at nothing.
    #[error("{0} does not reference an existing record")]
    InvalidReference(&'static str),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persists user identities; email is unique.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// `Conflict` when the email is already registered.
    async fn create_user(&self, email: &str, password_hash: &str) -> StoreResult<User>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<User>;
}

/// Products, categories and customers.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn create_product(&self, input: &ProductInput) -> StoreResult<Product>;

    /// Rows in storage order, each joined with its category name.
    async fn list_products(&self) -> StoreResult<Vec<Product>>;

    async fn get_product(&self, id: Uuid) -> StoreResult<Product>;

    /// Full replace of name, sku, quantity and category.
    async fn update_product(&self, id: Uuid, input: &ProductInput) -> StoreResult<Product>;

    async fn delete_product(&self, id: Uuid) -> StoreResult<()>;

    async fn create_category(&self, input: &NewCategory) -> StoreResult<Category>;

    async fn list_categories(&self) -> StoreResult<Vec<Category>>;

    /// `Conflict` while any product still references the category.
    async fn delete_category(&self, id: Uuid) -> StoreResult<()>;

    async fn create_customer(&self, input: &NewCustomer) -> StoreResult<Customer>;

    async fn list_customers(&self) -> StoreResult<Vec<Customer>>;

    /// Cheap round trip used by the health endpoint.
    async fn ping(&self) -> StoreResult<()>;
}
