//! # 클라이언트 설정 핸들러
//!
//! - `GET /api/config` → `{ "ollamaTunnelUrl": ... }`
//!
//! 값이 설정되지 않았으면 `null`입니다.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use super::contents::AppState;

pub async fn client_config(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "ollamaTunnelUrl": state.ollama_tunnel_url }))
}
