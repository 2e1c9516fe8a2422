use error_stack::{Result, ResultExt};
use google_sheets4::hyper;
use google_sheets4::oauth2::{self, authenticator::Authenticator};
use thiserror::Error;

use super::http_client::HttpsConnector;
use crate::adapters::config::sheets_config::SpreadsheetConfig;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Could not read service account key")]
    ReadServiceAccountKey,
    #[error("Could not create an authenticator")]
    BuildAuthenticator,
}

pub async fn auth(
    config: &SpreadsheetConfig,
    client: hyper::Client<HttpsConnector>,
) -> Result<Authenticator<HttpsConnector>, AuthError> {
    let priv_key_path = config.priv_key.as_ref();
    let secret: oauth2::ServiceAccountKey = oauth2::read_service_account_key(priv_key_path)
        .await
        .change_context(AuthError::ReadServiceAccountKey)
        .attach_printable_lazy(|| {
            format!("Service account private key expected at '{}'", priv_key_path)
        })?;

    oauth2::ServiceAccountAuthenticator::with_client(secret, client)
        .build()
        .await
        .change_context(AuthError::BuildAuthenticator)
}
