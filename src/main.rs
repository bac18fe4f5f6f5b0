//! # Libris 웹 서버 진입점
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. 문서 저장소 준비 (SQLite 또는 메모리)
//! 4. 컬렉션 스키마 등록
//! 5. 서비스 조립과 API 라우터 설정
//! 6. HTTP 서버 시작

mod config;
mod error;
mod models;
mod routes;
mod services;
mod store;
#[cfg(test)]
mod testing;

use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::get, // HTTP 메서드별 라우팅 함수
    Router,
};
use config::Config;
use models::CollectionSchema;
use routes::*;
use sqlx::sqlite::SqlitePoolOptions;
use store::{DocumentStore, MemoryStore, SqliteStore};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer, // HTTP 요청/응답 로깅 미들웨어
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // RUST_LOG 환경변수로 로그 레벨을 제어합니다.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "libris=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting Libris server on {}:{}", config.host, config.port);

    let store = open_store(&config).await?;

    match &config.history_collection {
        Some(history) => tracing::info!(history = %history, "version history enabled"),
        None => tracing::warn!("HISTORY_COLLECTION not set, version history disabled"),
    }

    let state = build_state(
        store,
        Collections {
            contents: config.contents_collection.clone(),
            prompts: config.prompts_collection.clone(),
        },
        config.history_collection.clone(),
        config.ollama_tunnel_url.clone(),
    );

    // 같은 경로에 여러 HTTP 메서드를 체이닝합니다.
    let api_routes = Router::new()
        .route(
            "/contents",
            get(list_contents).post(create_content).put(update_content),
        )
        .route(
            "/categories",
            get(list_categories)
                .post(add_category)
                .put(rename_category)
                .delete(delete_category),
        )
        .route("/history", get(get_history).post(restore_version))
        .route("/config", get(client_config))
        .route("/health", get(health_check))
        .with_state(state);

    // 개발 환경에서는 Any(모두 허용)로 설정합니다.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// 설정에 맞는 저장소를 열고 컬렉션을 등록합니다.
///
/// 이미 있는 컬렉션의 카테고리 목록은 바꾸지 않습니다.
async fn open_store(config: &Config) -> Result<Arc<dyn DocumentStore>> {
    let collections = [&config.contents_collection, &config.prompts_collection];

    if config.uses_memory_store() {
        tracing::warn!("Using in-memory document store, data is lost on restart");
        let store = MemoryStore::new();
        for name in collections {
            store
                .ensure_collection(name, CollectionSchema::standard())
                .await;
        }
        if let Some(history) = &config.history_collection {
            store.ensure_history(history).await;
        }
        return Ok(Arc::new(store));
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    let store = SqliteStore::new(pool);
    let schema = CollectionSchema::standard();
    for name in collections {
        store.ensure_collection(name, &schema).await?;
    }
    if let Some(history) = &config.history_collection {
        store.ensure_history(history).await?;
    }

    Ok(Arc::new(store))
}
