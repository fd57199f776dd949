pub mod edit;
pub mod products;
