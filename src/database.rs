use async_trait::async_trait;
use reqwest::header::ACCEPT;

use crate::{
    error::{DispatchError, DispatchResult},
    model::{UserRecord, DEVICE_TOKEN_FIELD, USERS_COLLECTION},
};

/// Makes PostgREST answer with exactly one object, or fail with 406 when zero
/// or several rows match.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Returns the push token of exactly one user, `None` when the record has
    /// no usable token.
    async fn fetch_device_token(&self, user_id: &str) -> DispatchResult<Option<String>>;
}

pub struct SupabaseUserStore {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl SupabaseUserStore {
    pub fn new(client: reqwest::Client, base_url: &str, service_key: &str) -> Self {
        SupabaseUserStore {
            client,
            base_url: base_url.to_string(),
            service_key: service_key.to_string(),
        }
    }

    fn users_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, USERS_COLLECTION)
    }
}

#[async_trait]
impl UserStore for SupabaseUserStore {
    async fn fetch_device_token(&self, user_id: &str) -> DispatchResult<Option<String>> {
        let response = self
            .client
            .get(self.users_url())
            .query(&[
                ("id", format!("eq.{}", user_id)),
                ("select", DEVICE_TOKEN_FIELD.to_string()),
            ])
            .header("apikey", self.service_key.as_str())
            .bearer_auth(&self.service_key)
            .header(ACCEPT, SINGLE_OBJECT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error = response.text().await.unwrap_or_default();
            tracing::warn!(%status, %error, "User lookup rejected.");

            return Err(DispatchError::upstream(format!(
                "user lookup failed ({}): {}",
                status, error
            )));
        }

        let record: UserRecord = response.json().await?;

        Ok(record.fcm_token.filter(|token| !token.is_empty()))
    }
}
