use std::sync::Arc;

use anyhow::Context;
use axum::{routing::post, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod audit;
mod bind;
mod config;
mod db;
mod ebs_client;
mod ebs_fields;
mod err_responses;
mod masking;
mod mock_switch;
mod pipeline;
mod validation;

use audit::AuditWriter;
use config::Config;
use ebs_client::{EbsClient, HttpEbsClient};

#[derive(Clone)]
pub struct AppState {
    pub ebs: Arc<dyn EbsClient>,
    pub audit: AuditWriter,
}

async fn test_route() -> Json<Value> {
    Json(json!({ "message": true }))
}

pub fn router(state: AppState) -> Router {
    pipeline::router()
        .route("/test", post(test_route))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,ebs_gateway=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "unable to listen for the shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.json_logs);

    let pool = db::connect(&config.database_url)
        .await
        .with_context(|| format!("opening database {}", config.database_url))?;
    let recorded = db::transactions::count(&pool).await?;
    tracing::info!(recorded, "transaction store ready");
    let (audit, audit_task) = AuditWriter::spawn(pool);

    if config.ebs_target.is_mock() {
        let listener = TcpListener::bind(config.mock_addr)
            .await
            .with_context(|| format!("binding mock switch on {}", config.mock_addr))?;
        tracing::info!(addr = %config.mock_addr, "mock EBS switch listening");
        tokio::spawn(async move {
            if let Err(err) =
                axum::serve(listener, mock_switch::router(mock_switch::MockSwitch::default())).await
            {
                tracing::error!(error = %err, "mock EBS switch stopped");
            }
        });
    }

    let ebs = HttpEbsClient::new(
        config.ebs_target.clone(),
        config.ebs_timeout,
        config.ebs_api_key.clone(),
        config.accept_invalid_certs,
    )
    .context("building the EBS HTTP client")?;
    tracing::info!(
        target_url = ebs.target().base_url(),
        mock = ebs.target().is_mock(),
        "EBS target selected"
    );

    let state = AppState {
        ebs: Arc::new(ebs),
        audit,
    };

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "gateway listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router and its writer clones are gone; wait for queued records.
    audit_task.await?;
    tracing::info!("gateway stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::db::memory_pool;

    async fn state() -> AppState {
        let (audit, _task) = AuditWriter::spawn(memory_pool().await);
        let ebs = HttpEbsClient::new(
            ebs_client::EbsTarget::Mock("http://127.0.0.1:9/".into()),
            std::time::Duration::from_secs(1),
            None,
            false,
        )
        .unwrap();
        AppState {
            ebs: Arc::new(ebs),
            audit,
        }
    }

    #[tokio::test]
    async fn test_route_answers_true() {
        let response = router(state().await)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "message": true }));
    }

    #[tokio::test]
    async fn operations_only_accept_post() {
        let response = router(state().await)
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/isAlive")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
