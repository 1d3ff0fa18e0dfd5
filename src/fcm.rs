use crate::{
    error::{DispatchError, DispatchResult},
    model::{FcmSendRequest, TokenRequest, TokenResponse},
};

pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Talks to the Google OAuth token endpoint and the FCM v1 send API.
pub struct FcmClient {
    client: reqwest::Client,
    token_url: String,
    api_url: String,
    project_id: String,
}

impl FcmClient {
    pub fn new(client: reqwest::Client, token_url: &str, api_url: &str, project_id: &str) -> Self {
        FcmClient {
            client,
            token_url: token_url.to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
        }
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.api_url, self.project_id
        )
    }

    /// Trades a signed assertion for a bearer token. A response without
    /// `access_token` is a failure whatever its status.
    pub async fn exchange_assertion(&self, assertion: &str) -> DispatchResult<String> {
        let form = TokenRequest {
            grant_type: JWT_BEARER_GRANT,
            assertion,
        };

        let response = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let token: TokenResponse = match response.json().await {
            Ok(token) => token,
            Err(error) => {
                tracing::warn!(%status, ?error, "Token endpoint returned no JSON.");
                TokenResponse { access_token: None }
            }
        };

        match token.access_token {
            Some(access_token) if !access_token.is_empty() => Ok(access_token),
            _ => {
                tracing::warn!(%status, "Token endpoint returned no access token.");
                Err(DispatchError::upstream("OAuth token not obtained"))
            }
        }
    }

    pub async fn send(&self, access_token: &str, device_token: &str) -> DispatchResult<()> {
        let response = self
            .client
            .post(self.send_url())
            .bearer_auth(access_token)
            .json(&FcmSendRequest::status_update(device_token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error = response.text().await.unwrap_or_default();

            return Err(DispatchError::upstream(format!("FCM v1 error: {}", error)));
        }

        tracing::debug!(%status, "FCM accepted message.");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NOTIFICATION_BODY, NOTIFICATION_TITLE};
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, body_string_contains, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn client(server: &MockServer) -> FcmClient {
        FcmClient::new(
            reqwest::Client::new(),
            &format!("{}/token", server.uri()),
            &server.uri(),
            "demo-project",
        )
    }

    #[tokio::test]
    async fn exchange_posts_jwt_bearer_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains(
                "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
            ))
            .and(body_string_contains("assertion=signed.jwt.value"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "ya29.token",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = client(&server)
            .exchange_assertion("signed.jwt.value")
            .await
            .unwrap();

        assert_eq!(token, "ya29.token");
    }

    #[tokio::test]
    async fn exchange_without_access_token_fails() {
        let responses = [
            ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid_grant" })),
            ResponseTemplate::new(200).set_body_json(json!({ "token_type": "Bearer" })),
            ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"),
        ];

        for response in responses {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(response)
                .mount(&server)
                .await;

            let error = client(&server)
                .exchange_assertion("signed.jwt.value")
                .await
                .unwrap_err();

            assert!(matches!(error, DispatchError::Upstream(_)));
            assert_eq!(error.to_string(), "OAuth token not obtained");
        }
    }

    #[tokio::test]
    async fn send_posts_fixed_notification_with_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/projects/demo-project/messages:send"))
            .and(header("authorization", "Bearer ya29.token"))
            .and(body_json(json!({
                "message": {
                    "token": "device-abc",
                    "notification": {
                        "title": NOTIFICATION_TITLE,
                        "body": NOTIFICATION_BODY
                    }
                }
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "name": "projects/demo-project/messages/1" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        client(&server).send("ya29.token", "device-abc").await.unwrap();
    }

    #[tokio::test]
    async fn send_failure_carries_response_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(404).set_body_string("Requested entity was not found."),
            )
            .mount(&server)
            .await;

        let error = client(&server)
            .send("ya29.token", "stale-device")
            .await
            .unwrap_err();

        assert!(matches!(error, DispatchError::Upstream(_)));
        assert!(error
            .to_string()
            .contains("Requested entity was not found."));
    }
}
