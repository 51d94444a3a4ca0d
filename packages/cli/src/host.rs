// ABOUTME: Native host: builds bindings from HostConfig and serves the worker over HTTP
// ABOUTME: Optionally exposes the local scheduled-event trigger route

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{Query, State},
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use edgeapi_bindings::{EnvValue, MemoryKv, ProcessEnv, SqliteDatabase, WorkersAi};
use edgeapi_settings::names;
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::config::HostConfig;
use crate::worker::{ScheduledEvent, Worker};

/// Local trigger for cron handlers, same path as the edge runtime's dev server
pub const SCHEDULED_TEST_PATH: &str = "/cdn-cgi/handler/scheduled";

/// Cron pattern used by the trigger route when none is given
pub const DEFAULT_TEST_CRON: &str = "* * * * *";

/// Build the process environment with the bindings the config enables
pub async fn build_env(config: &HostConfig) -> anyhow::Result<ProcessEnv> {
    let mut env = ProcessEnv::new();

    if config.kv_enabled {
        env = env.with_binding(names::KV, EnvValue::Kv(Arc::new(MemoryKv::new())));
    }

    if let Some(url) = config.database_url.as_deref() {
        let db = SqliteDatabase::connect(url)
            .await
            .context("Failed to open DATABASE_URL")?;
        env = env.with_binding(names::DB, EnvValue::Database(Arc::new(db)));
    }

    match (config.cf_account_id.as_deref(), config.cf_api_token.as_ref()) {
        (Some(account_id), Some(token)) => {
            let ai = WorkersAi::new(account_id, token.expose());
            env = env.with_binding(names::AI, EnvValue::Ai(Arc::new(ai)));
        }
        (Some(_), None) | (None, Some(_)) => {
            warn!("AI binding needs both CF_ACCOUNT_ID and CF_API_TOKEN; leaving it unset");
        }
        (None, None) => {}
    }

    let mut bindings: Vec<&str> = env.binding_names().collect();
    bindings.sort_unstable();
    info!(bindings = ?bindings, "Host bindings ready");

    Ok(env)
}

pub fn cors_layer(config: &HostConfig) -> anyhow::Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    if config.cors_origin.trim() == "*" {
        return Ok(cors.allow_origin(Any));
    }

    let origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .context("Invalid CORS_ORIGIN")?;
    Ok(cors.allow_origin(origin))
}

#[derive(Debug, Deserialize)]
pub struct ScheduledQuery {
    pub cron: Option<String>,
}

async fn trigger_scheduled(
    State(worker): State<Arc<Worker>>,
    Query(query): Query<ScheduledQuery>,
) -> &'static str {
    let cron = query
        .cron
        .filter(|cron| !cron.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TEST_CRON.to_string());

    worker.scheduled(&ScheduledEvent::now(cron)).await;
    "Ran scheduled event"
}

/// Full host application: worker routes, optional trigger route and CORS
pub fn build_app(
    worker: Arc<Worker>,
    config: &HostConfig,
    test_scheduled: bool,
) -> anyhow::Result<Router> {
    let mut app = worker.router();

    if test_scheduled {
        let trigger = Router::new()
            .route(SCHEDULED_TEST_PATH, get(trigger_scheduled))
            .with_state(worker);
        app = app.merge(trigger);
    }

    Ok(app.layer(cors_layer(config)?))
}

/// Serve the worker until Ctrl+C or SIGTERM
pub async fn serve(config: HostConfig, test_scheduled: bool) -> anyhow::Result<()> {
    let env = build_env(&config).await?;
    let worker = Arc::new(Worker::new(Arc::new(env)));
    let app = build_app(worker, &config, test_scheduled)?;

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(
        addr = %addr,
        cors_origin = %config.cors_origin,
        test_scheduled,
        "Worker listening"
    );
    if test_scheduled {
        info!("Trigger cron handlers with: curl \"http://{}{}?cron=*+*+*+*+*\"", addr, SCHEDULED_TEST_PATH);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Fire a single scheduled event and return
pub async fn run_scheduled(config: HostConfig, cron: &str) -> anyhow::Result<()> {
    let env = build_env(&config).await?;
    let worker = Worker::new(Arc::new(env));
    worker.scheduled(&ScheduledEvent::now(cron)).await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C signal, shutting down gracefully"),
            Err(e) => warn!("Failed to install Ctrl+C handler: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                info!("Received terminate signal, shutting down gracefully");
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
