use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::database::models::{
    Category, Customer, NewCategory, NewCustomer, Product, ProductInput, User,
};
use crate::database::repository::{CatalogStore, CredentialStore, StoreError, StoreResult};

/// Shape shared by every product read so `category_name` is always joined.
const PRODUCT_PROJECTION: &str = "p.id, p.name, p.sku, p.quantity, p.category_id, \
     COALESCE(c.name, '') AS category_name";

/// PostgreSQL-backed implementation of both store traits
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translate constraint violations into typed outcomes.
fn classify(err: sqlx::Error, conflict: &str, reference: &'static str) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return StoreError::Conflict(conflict.to_string());
        }
        if db_err.is_foreign_key_violation() {
            return StoreError::InvalidReference(reference);
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> StoreResult<User> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, password_hash)
             VALUES ($1, $2, $3)
             RETURNING id, email, password_hash",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, "Email is already registered", "email"))?;

        debug!("Created user {}", user.id);
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<User> {
        sqlx::query_as::<_, User>("SELECT id, email, password_hash FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("User"))
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn create_product(&self, input: &ProductInput) -> StoreResult<Product> {
        let sql = format!(
            "WITH p AS (
                INSERT INTO products (id, name, sku, quantity, category_id)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
             )
             SELECT {} FROM p LEFT JOIN categories c ON c.id = p.category_id",
            PRODUCT_PROJECTION
        );

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(Uuid::new_v4())
            .bind(&input.name)
            .bind(&input.sku)
            .bind(input.quantity)
            .bind(input.category_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(e, "SKU already exists", "category_id"))?;

        debug!("Created product {} ({})", product.id, product.sku);
        Ok(product)
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products p LEFT JOIN categories c ON c.id = p.category_id",
            PRODUCT_PROJECTION
        );
        Ok(sqlx::query_as::<_, Product>(&sql).fetch_all(&self.pool).await?)
    }

    async fn get_product(&self, id: Uuid) -> StoreResult<Product> {
        let sql = format!(
            "SELECT {} FROM products p LEFT JOIN categories c ON c.id = p.category_id
             WHERE p.id = $1",
            PRODUCT_PROJECTION
        );
        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("Product"))
    }

    async fn update_product(&self, id: Uuid, input: &ProductInput) -> StoreResult<Product> {
        let sql = format!(
            "WITH p AS (
                UPDATE products
                SET name = $2, sku = $3, quantity = $4, category_id = $5
                WHERE id = $1
                RETURNING *
             )
             SELECT {} FROM p LEFT JOIN categories c ON c.id = p.category_id",
            PRODUCT_PROJECTION
        );

        let updated = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(&input.name)
            .bind(&input.sku)
            .bind(input.quantity)
            .bind(input.category_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify(e, "SKU already exists", "category_id"))?;

        // No returned row means no row matched the id.
        updated.ok_or(StoreError::NotFound("Product"))
    }

    async fn delete_product(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Product"));
        }
        debug!("Deleted product {}", id);
        Ok(())
    }

    async fn create_category(&self, input: &NewCategory) -> StoreResult<Category> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, name) VALUES ($1, $2) RETURNING id, name",
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .fetch_one(&self.pool)
        .await?;

        debug!("Created category {}", category.id);
        Ok(category)
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(sqlx::query_as::<_, Category>("SELECT id, name FROM categories")
            .fetch_all(&self.pool)
            .await?)
    }

    async fn delete_category(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match classify(e, "", "category_id") {
                // ON DELETE RESTRICT fired: products still point here
                StoreError::InvalidReference(_) => {
                    StoreError::Conflict("Category is still referenced by products".to_string())
                }
                other => other,
            })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Category"));
        }
        debug!("Deleted category {}", id);
        Ok(())
    }

    async fn create_customer(&self, input: &NewCustomer) -> StoreResult<Customer> {
        let customer = sqlx::query_as::<_, Customer>(
            "INSERT INTO customers (id, name, email, phone)
             VALUES ($1, $2, $3, $4)
             RETURNING id, name, email, phone",
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, "Customer email already exists", "email"))?;

        debug!("Created customer {}", customer.id);
        Ok(customer)
    }

    async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        Ok(
            sqlx::query_as::<_, Customer>("SELECT id, name, email, phone FROM customers")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
