//! # 헬스체크(Health Check) 핸들러
//!
//! 서버가 정상적으로 동작하는지 확인하는 엔드포인트입니다.
//!
//! ## 엔드포인트
//! - `GET /api/health` → `{ "status": "ok", "version": "<패키지 버전>" }`
//!
//! 저장소를 호출하지 않으므로 저장소 장애와 무관하게 항상 200입니다.

use axum::Json;
use serde_json::{json, Value};

/// `GET /health`: 서버 상태를 확인합니다.
///
/// `env!("CARGO_PKG_VERSION")`은 컴파일 시점에 Cargo.toml의 버전으로 치환됩니다.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
