// Handlers grouped by resource. Which routes are public and which sit
// behind the bearer gate is decided in `app::routes`, not here.

pub mod categories;
pub mod customers;
pub mod products;
pub mod system;
pub mod users;

use uuid::Uuid;

use crate::error::ApiError;

/// Ids that are not UUIDs cannot name a stored entity, so they are absent.
pub(crate) fn parse_id(raw: &str, entity: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(format!("{} not found", entity)))
}
