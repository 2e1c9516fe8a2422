use crate::domain::access::access_guard::DEFAULT_MIN_MUTATION_INTERVAL_SECS;

#[derive(serde::Deserialize, Clone)]
pub struct AccessConfig {
    #[serde(default)]
    pub storage_password: Option<Box<str>>,
    #[serde(default = "default_min_mutation_interval_secs")]
    pub min_mutation_interval_secs: u64,
}

impl std::fmt::Debug for AccessConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessConfig")
            .field(
                "storage_password",
                &self.storage_password.as_ref().map(|_| "<redacted>"),
            )
            .field("min_mutation_interval_secs", &self.min_mutation_interval_secs)
            .finish()
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            storage_password: None,
            min_mutation_interval_secs: DEFAULT_MIN_MUTATION_INTERVAL_SECS,
        }
    }
}

fn default_min_mutation_interval_secs() -> u64 {
    DEFAULT_MIN_MUTATION_INTERVAL_SECS
}
