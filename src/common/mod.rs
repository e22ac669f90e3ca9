pub mod error;
pub mod notification;
