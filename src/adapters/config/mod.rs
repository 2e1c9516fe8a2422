pub mod access_config;
pub mod app_config;
pub mod sheets_config;
