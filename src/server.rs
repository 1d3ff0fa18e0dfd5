use std::{net::SocketAddr, sync::Arc};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, Method},
    routing::{get, MethodRouter},
    Json, Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::{
    dispatcher::NotificationDispatcher,
    error::{DispatchError, DispatchResult},
    logging::{LogError, WebResult},
    model::SendSuccess,
};

const CORS_ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

type SharedDispatcher = Arc<NotificationDispatcher>;

async fn status() -> &'static str {
    "ok"
}

async fn preflight() -> &'static str {
    "ok"
}

async fn send_notification(
    State(dispatcher): State<SharedDispatcher>,
    body: Bytes,
) -> WebResult<Json<SendSuccess>> {
    dispatcher.dispatch_body(&body).await.log_error_bad_request()?;

    Ok(Json(SendSuccess { success: true }))
}

async fn unsupported_method(method: Method) -> WebResult<()> {
    let result: DispatchResult<()> = Err(DispatchError::validation(format!(
        "method {} not supported",
        method
    )));

    result.log_error_bad_request()
}

/// The function answers on every path, like the hosted handler it replaces.
pub fn router(dispatcher: SharedDispatcher) -> Router {
    let handler: MethodRouter<SharedDispatcher> = get(status)
        .post(send_notification)
        .options(preflight)
        .fallback(unsupported_method);

    Router::new()
        .route("/", handler.clone())
        .route("/*path", handler)
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        ))
        .with_state(dispatcher)
}

pub async fn serve(port: Option<u16>, dispatcher: NotificationDispatcher) -> anyhow::Result<()> {
    let port: u16 = if let Some(port) = port {
        port
    } else if let Ok(port) = std::env::var("PORT") {
        port.parse()?
    } else {
        8080
    };

    let app = router(Arc::new(dispatcher));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);
    tracing::warn!("Callers are not authenticated; restrict access at the ingress.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped.");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!(?error, "Could not listen for Ctrl-C.");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                tracing::error!(?error, "Could not listen for SIGTERM.");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C, shutting down."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down."),
    }
}
