use config::Config;
use error_stack::{Result, ResultExt};
use thiserror::Error;

use super::{access_config::AccessConfig, sheets_config::SpreadsheetConfig};

pub const DEFAULT_CONFIG_PATH: &str = "Config";
pub const ENV_PREFIX: &str = "HVS";

#[derive(serde::Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub sheets: SpreadsheetConfig,
    #[serde(default)]
    pub access: AccessConfig,
}

/// Just the access section, for runs that never talk to the spreadsheet.
#[derive(serde::Deserialize, Debug, Default)]
struct AccessOnly {
    #[serde(default)]
    access: AccessConfig,
}

#[derive(Error, Debug)]
pub enum AppConfigError {
    #[error("Failed to read config file '{0}'")]
    Read(String),
    #[error("Invalid configuration at field '{0}'")]
    InvalidField(String),
}

impl AppConfig {
    /// Reads `Config.{toml,yaml,json}` (or the file named by `CONFIG_PATH`), overridden by
    /// `HVS__SECTION__KEY` environment variables.
    pub fn load() -> Result<Self, AppConfigError> {
        deserialize(read_sources(true)?)
    }

    /// Access settings only. The config file is optional here and the `sheets` section is
    /// ignored.
    pub fn load_access() -> Result<AccessConfig, AppConfigError> {
        let access_only: AccessOnly = deserialize(read_sources(false)?)?;
        Ok(access_only.access)
    }
}

fn read_sources(file_required: bool) -> Result<Config, AppConfigError> {
    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    Config::builder()
        .add_source(config::File::with_name(&config_path).required(file_required))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()
        .change_context_lazy(|| AppConfigError::Read(config_path.clone()))
}

fn deserialize<T: serde::de::DeserializeOwned>(config: Config) -> Result<T, AppConfigError> {
    serde_path_to_error::deserialize(config).map_err(|error| {
        let path = error.path().to_string();
        error_stack::report!(error.into_inner())
            .change_context(AppConfigError::InvalidField(path))
            .attach_printable("Make sure all required fields are present in the configuration file.")
    })
}
