use axum::response::{IntoResponse, Response};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::error::DispatchResult;

const LOG_MODULES: &[&str] = &["send_notification"];

pub fn init_logging() {
    let mut env_filter = EnvFilter::try_from_default_env().unwrap_or_default();

    for module in LOG_MODULES {
        env_filter = env_filter.add_directive(
            format!("{}=info", module)
                .parse()
                .expect("Could not parse logging directive"),
        );
    }

    if std::env::var("LOG_JSON").is_ok() {
        let subscriber = Registry::default()
            .with(tracing_stackdriver::layer())
            .with(env_filter);

        tracing::subscriber::set_global_default(subscriber)
            .expect("Could not set up global logger");
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

pub type WebResult<T> = std::result::Result<T, Response>;

pub trait LogError<T> {
    fn log_error_bad_request(self) -> WebResult<T>;
}

impl<T> LogError<T> for DispatchResult<T> {
    fn log_error_bad_request(self) -> WebResult<T> {
        match self {
            Ok(v) => Ok(v),
            Err(error) => {
                tracing::error!(kind = error.kind(), ?error, "Error: {}", error);

                Err(error.into_response())
            }
        }
    }
}
