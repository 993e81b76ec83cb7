//! Millionaire Bot binary entrypoint wiring configuration, storage, question sources and HTTP.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use millionaire_bot::{
    config::{AppConfig, StorageConfig},
    dao::{
        question_source::{QuestionSource, StaticQuestionSource},
        user_store::{FileStateStore, MemoryStateStore, StateStore},
    },
    routes,
    services::question_resolver::QuestionResolver,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();

    let questions = build_resolver(&config).context("building question sources")?;
    let store = build_store(&config.storage)
        .await
        .context("opening user state store")?;
    let app_state = AppState::new(questions, store);

    let app = build_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Remote API first when enabled, then the built-in question list.
fn build_resolver(config: &AppConfig) -> anyhow::Result<QuestionResolver> {
    let mut sources: Vec<Arc<dyn QuestionSource>> = Vec::new();

    match &config.remote_questions {
        #[cfg(feature = "remote-questions")]
        Some(remote) => {
            use millionaire_bot::dao::question_source::RemoteQuestionSource;

            let source = RemoteQuestionSource::new(remote.endpoint.clone(), remote.timeout)?;
            info!(endpoint = %remote.endpoint, timeout = ?remote.timeout, "remote questions enabled");
            sources.push(Arc::new(source));
        }
        #[cfg(not(feature = "remote-questions"))]
        Some(_) => warn!("remote questions configured but the `remote-questions` feature is disabled"),
        None => info!("remote questions disabled"),
    }

    sources.push(Arc::new(StaticQuestionSource::builtin()?));

    let resolver = QuestionResolver::new(sources)?;
    info!(sources = ?resolver.source_names(), "question resolver ready");
    Ok(resolver)
}

/// Resolve the configured backend into a concrete store, loading any saved state.
async fn build_store(config: &StorageConfig) -> anyhow::Result<Arc<dyn StateStore>> {
    match config {
        StorageConfig::None => {
            warn!("no storage configured; player state will be lost on restart");
            Ok(Arc::new(MemoryStateStore::new()))
        }
        StorageConfig::File { path } => {
            let store = FileStateStore::open_file(path.clone())
                .await
                .with_context(|| format!("loading `{}`", path.display()))?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "redis-store")]
        StorageConfig::Redis { url, key } => {
            use millionaire_bot::dao::user_store::redis::{RedisConfig, RedisStateStore};

            let mut redis_config = RedisConfig::new(url.clone());
            if let Some(key) = key {
                redis_config = redis_config.with_key(key.clone());
            }
            let store = RedisStateStore::connect(redis_config).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "redis-store"))]
        StorageConfig::Redis { .. } => {
            anyhow::bail!("Redis storage configured but the `redis-store` feature is disabled")
        }
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
