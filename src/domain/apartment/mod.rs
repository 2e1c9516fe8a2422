pub mod apartment_name;
pub mod configuration;
pub mod record_codec;
pub mod record_row;
