/*
 * Responsibility
 * - Config読み込み → 依存生成 (AuthService / ResourceStore) → Router 組み立て
 * - Middleware の適用 (access → HTTP 共通 → CORS)
 * - tracing / panic hook の初期化と axum::serve() での起動
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::{API_PREFIX, Config},
    middleware,
    repos::{MemoryResourceStore, PgResourceStore, ResourceStore},
    services::auth::build_auth_service,
    state::AppState,
};

fn init_tracing() {
    // RUST_LOG が優先。例: RUST_LOG=info,workflow_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development では即死させて気付けるようにする
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let auth = build_auth_service(config);

    let store: Arc<dyn ResourceStore> = match &config.database_url {
        Some(url) => {
            let db = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await?;
            Arc::new(PgResourceStore::new(db))
        }
        None => {
            tracing::warn!("DATABASE_URL is not set; using the in-memory resource store");
            Arc::new(MemoryResourceStore::new())
        }
    };
    tracing::info!(backend = store.backend_name(), "resource store ready");

    Ok(AppState::new(auth, store))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let v2 = middleware::auth::access::apply(api::v2::routes(state.clone()), state.clone());

    let router = Router::new().nest(API_PREFIX, v2).with_state(state);

    let router = middleware::http::apply(router, config);
    middleware::cors::apply(router, config)
}
