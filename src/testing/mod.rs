// In-memory stand-in for `PgStore`, used by the router tests.
//
// Constraint behaviour mirrors the PostgreSQL schema: unique emails and SKUs,
// a restricting foreign key from products to categories.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::{PasswordHasher, TokenService};
use crate::database::models::{
    Category, Customer, NewCategory, NewCustomer, Product, ProductInput, User,
};
use crate::database::{CatalogStore, CredentialStore, StoreError, StoreResult};

pub const TEST_SECRET: &str = "test-secret";

#[derive(Debug, Clone)]
struct ProductRow {
    id: Uuid,
    name: String,
    sku: String,
    quantity: i32,
    category_id: Option<Uuid>,
}

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    categories: Vec<Category>,
    products: Vec<ProductRow>,
    customers: Vec<Customer>,
}

impl Tables {
    fn join(&self, row: &ProductRow) -> Product {
        let category_name = row
            .category_id
            .and_then(|id| self.categories.iter().find(|c| c.id == id))
            .map(|c| c.name.clone())
            .unwrap_or_default();

        Product {
            id: row.id,
            name: row.name.clone(),
            sku: row.sku.clone(),
            quantity: row.quantity,
            category_id: row.category_id,
            category_name,
        }
    }

    fn check_category(&self, category_id: Option<Uuid>) -> StoreResult<()> {
        match category_id {
            Some(id) if !self.categories.iter().any(|c| c.id == id) => {
                Err(StoreError::InvalidReference("category_id"))
            }
            _ => Ok(()),
        }
    }

    fn sku_taken(&self, sku: &str, except: Option<Uuid>) -> bool {
        self.products
            .iter()
            .any(|p| p.sku == sku && Some(p.id) != except)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    unavailable: std::sync::atomic::AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `ping` fail, as a lost database connection would.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable
            .store(unavailable, std::sync::atomic::Ordering::SeqCst);
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == email) {
            return Err(StoreError::Conflict("Email is already registered".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<User> {
        let tables = self.tables.read().await;
        tables
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::NotFound("User"))
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn create_product(&self, input: &ProductInput) -> StoreResult<Product> {
        let mut tables = self.tables.write().await;
        if tables.sku_taken(&input.sku, None) {
            return Err(StoreError::Conflict("SKU already exists".to_string()));
        }
        tables.check_category(input.category_id)?;

        let row = ProductRow {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            sku: input.sku.clone(),
            quantity: input.quantity,
            category_id: input.category_id,
        };
        let product = tables.join(&row);
        tables.products.push(row);
        Ok(product)
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let tables = self.tables.read().await;
        Ok(tables.products.iter().map(|row| tables.join(row)).collect())
    }

    async fn get_product(&self, id: Uuid) -> StoreResult<Product> {
        let tables = self.tables.read().await;
        tables
            .products
            .iter()
            .find(|p| p.id == id)
            .map(|row| tables.join(row))
            .ok_or(StoreError::NotFound("Product"))
    }

    async fn update_product(&self, id: Uuid, input: &ProductInput) -> StoreResult<Product> {
        let mut tables = self.tables.write().await;
        let index = tables
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or(StoreError::NotFound("Product"))?;
        if tables.sku_taken(&input.sku, Some(id)) {
            return Err(StoreError::Conflict("SKU already exists".to_string()));
        }
        tables.check_category(input.category_id)?;

        let row = &mut tables.products[index];
        row.name = input.name.clone();
        row.sku = input.sku.clone();
        row.quantity = input.quantity;
        row.category_id = input.category_id;

        let row = tables.products[index].clone();
        Ok(tables.join(&row))
    }

    async fn delete_product(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let before = tables.products.len();
        tables.products.retain(|p| p.id != id);
        if tables.products.len() == before {
            return Err(StoreError::NotFound("Product"));
        }
        Ok(())
    }

    async fn create_category(&self, input: &NewCategory) -> StoreResult<Category> {
        let mut tables = self.tables.write().await;
        let category = Category {
            id: Uuid::new_v4(),
            name: input.name.clone(),
        };
        tables.categories.push(category.clone());
        Ok(category)
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(self.tables.read().await.categories.clone())
    }

    async fn delete_category(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.products.iter().any(|p| p.category_id == Some(id)) {
            return Err(StoreError::Conflict(
                "Category is still referenced by products".to_string(),
            ));
        }

        let before = tables.categories.len();
        tables.categories.retain(|c| c.id != id);
        if tables.categories.len() == before {
            return Err(StoreError::NotFound("Category"));
        }
        Ok(())
    }

    async fn create_customer(&self, input: &NewCustomer) -> StoreResult<Customer> {
        let mut tables = self.tables.write().await;
        if tables.customers.iter().any(|c| c.email == input.email) {
            return Err(StoreError::Conflict(
                "Customer email already exists".to_string(),
            ));
        }

        let customer = Customer {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
        };
        tables.customers.push(customer.clone());
        Ok(customer)
    }

    async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        Ok(self.tables.read().await.customers.clone())
    }

    async fn ping(&self) -> StoreResult<()> {
        if self.unavailable.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

/// State wired to a fresh `MemoryStore`, a fixed secret and the cheapest bcrypt cost.
pub fn test_state() -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(
        store.clone(),
        store.clone(),
        TokenService::new(TEST_SECRET, Duration::hours(24)),
        PasswordHasher::new(4).expect("bcrypt cost 4 is valid"),
    );
    (state, store)
}

/// A bearer token for a user that was never registered; the gate only checks the signature.
pub fn bearer(state: &AppState) -> String {
    let token = state
        .tokens
        .issue_at(Uuid::new_v4(), "tester@example.com", Utc::now())
        .expect("token issues");
    format!("Bearer {}", token)
}
