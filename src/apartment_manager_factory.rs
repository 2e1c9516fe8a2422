use std::sync::Arc;
use std::time::Duration;

use housing_viability::{
    adapters::{
        config::{access_config::AccessConfig, app_config::AppConfig},
        memory::in_memory_record_store::InMemoryRecordStore,
        sheets::{
            sheets_record_store::SheetsRecordStore, spreadsheet_manager::SpreadsheetManager,
        },
    },
    application::apartment_manager::ApartmentManager,
    domain::access::{access_guard::AccessGuard, clock::SystemClock},
    ports::record_store::RecordStore,
};

pub struct ApartmentManagerFactory;

impl ApartmentManagerFactory {
    /// Wires the manager to the spreadsheet, or to a process-local table when `in_memory`.
    pub async fn create(
        in_memory: bool,
    ) -> Result<Arc<ApartmentManager>, Box<dyn std::error::Error>> {
        let (store, access): (Arc<dyn RecordStore>, AccessConfig) = if in_memory {
            let access = AppConfig::load_access().map_err(|report| format!("{:?}", report))?;
            (Arc::new(InMemoryRecordStore::new()), access)
        } else {
            let config = AppConfig::load().map_err(|report| format!("{:?}", report))?;
            let worksheet_title = config.sheets.worksheet_title.to_string();
            let owner_email = config.sheets.owner_email.as_deref().map(str::to_owned);
            let spreadsheet_manager = Arc::new(
                SpreadsheetManager::new(config.sheets)
                    .await
                    .map_err(|report| format!("{:?}", report))?,
            );
            (
                Arc::new(SheetsRecordStore::new(
                    spreadsheet_manager,
                    worksheet_title,
                    owner_email,
                )),
                config.access,
            )
        };

        let guard = AccessGuard::new(
            access.storage_password.as_deref(),
            Duration::from_secs(access.min_mutation_interval_secs),
        );

        Ok(Arc::new(ApartmentManager::new(
            store,
            guard,
            Arc::new(SystemClock),
        )))
    }
}
