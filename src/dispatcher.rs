use std::sync::Arc;

use chrono::Utc;
use tracing::Instrument;

use crate::{
    assertion::{sign_assertion, ServiceAccountCredential},
    config::Config,
    database::{SupabaseUserStore, UserStore},
    error::{DispatchError, DispatchResult},
    fcm::FcmClient,
    model::SendNotificationRequest,
};

/// Looks up a user's device, authenticates as the service account and sends
/// the status notification. Every step awaits the previous one and the first
/// failure ends the dispatch.
pub struct NotificationDispatcher {
    store: Arc<dyn UserStore>,
    fcm: FcmClient,
    credential: ServiceAccountCredential,
}

impl NotificationDispatcher {
    pub fn new(
        store: Arc<dyn UserStore>,
        fcm: FcmClient,
        credential: ServiceAccountCredential,
    ) -> Self {
        NotificationDispatcher {
            store,
            fcm,
            credential,
        }
    }

    pub fn from_config(config: Config) -> Self {
        let client = reqwest::Client::new();
        let store = SupabaseUserStore::new(
            client.clone(),
            &config.store_url,
            &config.store_service_key,
        );
        let fcm = FcmClient::new(
            client,
            &config.oauth_token_url,
            &config.fcm_api_url,
            &config.credential.project_id,
        );

        NotificationDispatcher::new(Arc::new(store), fcm, config.credential)
    }

    /// Parses a raw request body and dispatches it.
    pub async fn dispatch_body(&self, body: &[u8]) -> DispatchResult<()> {
        let request: SendNotificationRequest = serde_json::from_slice(body).map_err(|error| {
            DispatchError::validation(format!("invalid request body: {}", error))
        })?;

        self.dispatch(request).await
    }

    pub async fn dispatch(&self, request: SendNotificationRequest) -> DispatchResult<()> {
        let user_id = match request.user_id {
            Some(user_id) if !user_id.is_empty() => user_id,
            _ => return Err(DispatchError::validation("userId missing")),
        };

        let span = tracing::info_span!("dispatch", %user_id);
        self.dispatch_to(&user_id).instrument(span).await
    }

    async fn dispatch_to(&self, user_id: &str) -> DispatchResult<()> {
        let device_token = self
            .store
            .fetch_device_token(user_id)
            .await?
            .ok_or_else(|| DispatchError::validation("device token not found"))?;
        tracing::debug!("Device token fetched.");

        let issued_at = Utc::now().timestamp();
        let assertion = sign_assertion(&self.credential, self.fcm.token_url(), issued_at)?;
        tracing::debug!(%issued_at, "Assertion signed.");

        let access_token = self.fcm.exchange_assertion(&assertion).await?;
        tracing::debug!("Access token obtained.");

        self.fcm.send(&access_token, &device_token).await?;
        tracing::info!("Notification sent.");

        Ok(())
    }
}
