pub mod checkout_sessions;
pub mod merchants;
pub mod products;

pub use checkout_sessions::Entity as CheckoutSessions;
pub use merchants::Entity as Merchants;
pub use products::Entity as Products;
