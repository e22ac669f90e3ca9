pub mod crm;
pub mod envelope;
pub mod inventory;
pub mod query;
pub mod sales;
