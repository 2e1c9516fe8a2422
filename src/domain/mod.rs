pub mod access;
pub mod apartment;
pub mod sheets;
