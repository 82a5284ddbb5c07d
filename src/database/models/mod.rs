pub mod category;
pub mod customer;
pub mod product;
pub mod user;

pub use category::{Category, NewCategory};
pub use customer::{Customer, NewCustomer};
pub use product::{Product, ProductInput};
pub use user::{Credentials, User};
