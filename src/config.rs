use clap::Args;

use crate::{
    assertion::ServiceAccountCredential,
    error::{DispatchError, DispatchResult},
};

pub const DEFAULT_OAUTH_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_FCM_API_URL: &str = "https://fcm.googleapis.com";

/// Raw settings as they arrive from flags or the environment. Everything the
/// dispatcher needs is optional here so that a missing value is reported as a
/// configuration error with the variable name, instead of a clap usage error.
#[derive(Args)]
pub struct ConfigArgs {
    #[clap(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    #[clap(long, env = "SUPABASE_SERVICE_ROLE_KEY", hide_env_values = true)]
    pub supabase_service_role_key: Option<String>,

    #[clap(long, env = "FIREBASE_CLIENT_EMAIL")]
    pub firebase_client_email: Option<String>,

    #[clap(long, env = "FIREBASE_PRIVATE_KEY", hide_env_values = true)]
    pub firebase_private_key: Option<String>,

    #[clap(long, env = "FIREBASE_PROJECT_ID")]
    pub firebase_project_id: Option<String>,

    #[clap(long, env = "OAUTH_TOKEN_URL", default_value = DEFAULT_OAUTH_TOKEN_URL)]
    pub oauth_token_url: String,

    #[clap(long, env = "FCM_API_URL", default_value = DEFAULT_FCM_API_URL)]
    pub fcm_api_url: String,
}

pub struct Config {
    pub store_url: String,
    pub store_service_key: String,
    pub credential: ServiceAccountCredential,
    pub oauth_token_url: String,
    pub fcm_api_url: String,
}

impl Config {
    pub fn from_args(args: ConfigArgs) -> DispatchResult<Self> {
        let store_url = required(args.supabase_url, "SUPABASE_URL")?;
        let store_service_key =
            required(args.supabase_service_role_key, "SUPABASE_SERVICE_ROLE_KEY")?;
        let client_email = required(args.firebase_client_email, "FIREBASE_CLIENT_EMAIL")?;
        let private_key = required(args.firebase_private_key, "FIREBASE_PRIVATE_KEY")?;
        let project_id = required(args.firebase_project_id, "FIREBASE_PROJECT_ID")?;

        let private_key = decode_private_key(&private_key);
        let credential =
            ServiceAccountCredential::from_pem(client_email, &private_key, project_id)?;

        Ok(Config {
            store_url: store_url.trim_end_matches('/').to_string(),
            store_service_key,
            credential,
            oauth_token_url: args.oauth_token_url,
            fcm_api_url: args.fcm_api_url.trim_end_matches('/').to_string(),
        })
    }
}

fn required(value: Option<String>, name: &str) -> DispatchResult<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(DispatchError::configuration(format!("{} is not set", name))),
    }
}

/// Environment variables cannot hold real newlines in most hosting consoles,
/// so PEM keys are stored with literal `\n` sequences.
pub fn decode_private_key(raw: &str) -> String {
    raw.replace("\\n", "\n")
}
