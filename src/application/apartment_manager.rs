use std::sync::Arc;

use chrono::{DateTime, Utc};
use error_stack::{report, Report, ResultExt};
use tokio::sync::Mutex;
use tracing::instrument;

use crate::domain::access::{access_guard::AccessGuard, clock::Clock};
use crate::domain::apartment::{
    apartment_name::ApartmentName,
    configuration::Configuration,
    record_codec::{self, CodecError},
    record_row::RecordRow,
};
use crate::ports::record_store::{position_of, RecordStore, RecordStoreError};

use super::error::ApartmentError;

pub type Result<T> = error_stack::Result<T, ApartmentError>;

/// Most records the store holds at once.
pub const MAX_RECORDS: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct ApartmentSummary {
    pub name: String,
    pub saved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ApartmentListing {
    pub apartments: Vec<ApartmentSummary>,
    /// Rows that carried data but could not be read as a record.
    pub skipped: usize,
}

/// Saves, loads, lists and deletes named apartment configurations. Reads are open; every
/// mutation goes through the access guard first.
pub struct ApartmentManager {
    store: Arc<dyn RecordStore>,
    guard: Mutex<AccessGuard>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ApartmentManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApartmentManager")
            .field("store", &"<RecordStore>")
            .finish()
    }
}

impl ApartmentManager {
    pub fn new(store: Arc<dyn RecordStore>, guard: AccessGuard, clock: Arc<dyn Clock>) -> Self {
        if !guard.is_password_configured() {
            tracing::warn!("No storage password configured, saving and deleting are disabled");
        }

        Self {
            store,
            guard: Mutex::new(guard),
            clock,
        }
    }

    /// A configuration holding every field's default.
    pub fn new_configuration(&self) -> Configuration {
        Configuration::default()
    }

    /// Stores `configuration` under `name`, replacing a record with the same name. Returns the
    /// timestamp written with the record.
    #[instrument(skip(self, configuration, password))]
    pub async fn save(
        &self,
        name: &str,
        configuration: &Configuration,
        password: &str,
    ) -> Result<DateTime<Utc>> {
        logged("save", self.try_save(name, configuration, password).await)
    }

    async fn try_save(
        &self,
        name: &str,
        configuration: &Configuration,
        password: &str,
    ) -> Result<DateTime<Utc>> {
        let name = self.admit_mutation(name, password).await?;

        self.store
            .ensure_store()
            .await
            .map_err(store_failure)?;
        let rows = self.store.list_rows().await.map_err(store_failure)?;

        let exists = position_of(&rows, name.as_str()).is_some();
        let stored = rows.iter().filter(|row| row.name().is_some()).count();
        if !exists && stored >= MAX_RECORDS {
            return Err(report!(ApartmentError::CapacityExceeded))
                .attach_printable_lazy(|| format!("{} records stored", stored));
        }

        let saved_at = self.clock.now();
        let row = record_codec::encode(configuration, &name, saved_at);
        if exists {
            self.store
                .update_row(name.as_str(), row)
                .await
                .map_err(store_failure)?;
        } else {
            self.store.append_row(row).await.map_err(store_failure)?;
        }

        tracing::info!(%name, updated = exists, "Saved apartment");
        Ok(saved_at)
    }

    /// Every readable record in storage order.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<ApartmentListing> {
        logged("list", self.try_list().await)
    }

    async fn try_list(&self) -> Result<ApartmentListing> {
        let rows = self.store.list_rows().await.map_err(store_failure)?;

        let mut listing = ApartmentListing::default();
        for (position, row) in rows.iter().enumerate() {
            if is_blank(row) {
                continue;
            }
            match record_codec::decode_record(row) {
                // Only names that load and delete accept are listed.
                Ok(record) if ApartmentName::parse(&record.name).is_ok() => {
                    listing.apartments.push(ApartmentSummary {
                        name: record.name,
                        saved_at: record.saved_at,
                    })
                }
                Ok(_) => {
                    tracing::warn!(position, "Skipping record row with an invalid name");
                    listing.skipped += 1;
                }
                Err(CodecError::MalformedRecord) => {
                    tracing::warn!(position, "Skipping unreadable record row");
                    listing.skipped += 1;
                }
            }
        }

        Ok(listing)
    }

    #[instrument(skip(self))]
    pub async fn load(&self, name: &str) -> Result<Configuration> {
        logged("load", self.try_load(name).await)
    }

    async fn try_load(&self, name: &str) -> Result<Configuration> {
        let name = parse_name(name)?;
        let rows = self.store.list_rows().await.map_err(store_failure)?;

        let row = position_of(&rows, name.as_str())
            .map(|position| &rows[position])
            .ok_or_else(|| report!(ApartmentError::NotFound))
            .attach_printable_lazy(|| format!("No record named '{}'", name))?;

        record_codec::decode(row).change_context(ApartmentError::MalformedRecord)
    }

    #[instrument(skip(self, password))]
    pub async fn delete(&self, name: &str, password: &str) -> Result<()> {
        logged("delete", self.try_delete(name, password).await)
    }

    async fn try_delete(&self, name: &str, password: &str) -> Result<()> {
        let name = self.admit_mutation(name, password).await?;

        self.store
            .delete_row(name.as_str())
            .await
            .map_err(store_failure)?;

        tracing::info!(%name, "Deleted apartment");
        Ok(())
    }

    /// Flips the kill-switch and returns the new state. The lock itself never blocks this, so a
    /// locked store can always be unlocked with the right password.
    #[instrument(skip(self, password))]
    pub async fn toggle_lock(&self, password: &str) -> Result<bool> {
        let mut guard = self.guard.lock().await;
        if !guard.check_password(password) {
            return logged("toggle_lock", Err(report!(ApartmentError::Unauthorized)));
        }

        let locked = guard.toggle_lock();
        tracing::info!(locked, "Toggled storage lock");
        Ok(locked)
    }

    pub async fn is_locked(&self) -> bool {
        self.guard.lock().await.is_locked()
    }

    /// Password and lock first, then the name, then the rate limit. Only a mutation that gets
    /// past all three spends the rate-limit budget.
    async fn admit_mutation(&self, name: &str, password: &str) -> Result<ApartmentName> {
        let mut guard = self.guard.lock().await;

        if !guard.authorize(password) {
            let reason = if guard.is_locked() {
                "Storage is locked"
            } else {
                "Password rejected"
            };
            return Err(report!(ApartmentError::Unauthorized)).attach_printable(reason);
        }

        let name = parse_name(name)?;

        if !guard.allow_mutation(self.clock.now()) {
            return Err(report!(ApartmentError::RateLimited));
        }

        Ok(name)
    }
}

fn parse_name(name: &str) -> Result<ApartmentName> {
    ApartmentName::parse(name).map_err(|error| report!(ApartmentError::InvalidName(error)))
}

fn is_blank(row: &RecordRow) -> bool {
    row.cells().iter().all(|cell| cell.trim().is_empty())
}

fn store_failure(report: Report<RecordStoreError>) -> Report<ApartmentError> {
    let context = match report.current_context() {
        RecordStoreError::NotFound => ApartmentError::NotFound,
        RecordStoreError::BackendUnavailable => ApartmentError::BackendUnavailable,
    };
    report.change_context(context)
}

fn logged<T>(operation: &str, result: Result<T>) -> Result<T> {
    if let Err(report) = &result {
        match report.current_context() {
            ApartmentError::BackendUnavailable | ApartmentError::MalformedRecord => {
                tracing::error!(operation, "{:?}", report)
            }
            _ => tracing::warn!(operation, "{:?}", report),
        }
    }
    result
}
