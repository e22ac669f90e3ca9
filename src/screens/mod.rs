pub mod contacts;
pub mod inventory;

pub use inventory::{InventoryActions, InventoryScreen, InventoryStats};
