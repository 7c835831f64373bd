pub mod checkout;
pub mod merchants;
pub mod products;
pub mod ucp;
