pub mod auth;
pub mod http_client;
pub mod retry;
pub mod sheets_record_store;
pub mod spreadsheet_manager;
pub mod spreadsheet_read;
pub mod spreadsheet_write;
pub mod value_range_factory;
pub mod value_rows;
pub mod worksheet_backend;
