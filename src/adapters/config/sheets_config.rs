pub const DEFAULT_WORKSHEET_TITLE: &str = "Housing Viability Data";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct SpreadsheetConfig {
    /// Path to the service account key JSON.
    pub priv_key: Box<str>,
    pub spreadsheet_id: Box<str>,
    #[serde(default = "default_worksheet_title")]
    pub worksheet_title: Box<str>,
    /// Who the operator should share a freshly created worksheet with.
    #[serde(default)]
    pub owner_email: Option<Box<str>>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_worksheet_title() -> Box<str> {
    DEFAULT_WORKSHEET_TITLE.into()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
