pub mod apartment_manager;
pub mod error;
