//! # 콘텐츠 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET  /api/contents`                → 콘텐츠 목록 (`sortOrder` 오름차순)
//! - `POST /api/contents`                → 새 콘텐츠 생성
//! - `PUT  /api/contents`                → 콘텐츠 수정 (`skipHistory`로 버전 기록 생략)
//! - `PUT  /api/contents?action=reorder` → 여러 항목의 정렬 순서 변경
//!
//! 같은 `PUT` 경로를 쿼리로 나누기 때문에 본문은 `ApiJson<Value>`로 받은 뒤
//! 분기에 맞는 구조체로 다시 파싱합니다.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::extract::ApiJson;
use crate::{
    error::AppError,
    models::*,
    services::{CategoryRegistry, ContentService, VersionLedger},
};

/// 카테고리 요청의 `db` 선택자가 가리킬 수 있는 컬렉션들
#[derive(Debug, Clone)]
pub struct Collections {
    pub contents: String,
    pub prompts: String,
}

impl Collections {
    /// `db=prompts`이면 프롬프트 컬렉션, 그 외에는 콘텐츠 컬렉션
    pub fn resolve(&self, db: Option<&str>) -> &str {
        match db {
            Some("prompts") => &self.prompts,
            _ => &self.contents,
        }
    }
}

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// 서비스들은 내부에 `Arc<dyn DocumentStore>`를 들고 있어 clone 비용이 작습니다.
#[derive(Clone)]
pub struct AppState {
    pub contents: ContentService,
    pub categories: CategoryRegistry,
    pub ledger: VersionLedger,
    pub collections: Collections,
    /// 클라이언트에 그대로 전달하는 터널 URL
    pub ollama_tunnel_url: Option<String>,
}

/// 본문을 요청 구조체로 파싱합니다. 실패하면 400.
pub(crate) fn parse_body<T: DeserializeOwned>(body: Value) -> Result<T, AppError> {
    serde_json::from_value(body)
        .map_err(|err| AppError::Validation(format!("Invalid request body: {err}")))
}

/// `GET /contents`
pub async fn list_contents(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let items = state.contents.list().await?;
    Ok(Json(json!({ "items": items })))
}

/// `POST /contents`: 생성 성공 시 `201 Created`
pub async fn create_content(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateContentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let id = state.contents.create(req).await?;
    Ok((StatusCode::CREATED, Json(json!({ "ok": true, "id": id }))))
}

/// `PUT /contents` 또는 `PUT /contents?action=reorder`
pub async fn update_content(
    State(state): State<AppState>,
    Query(query): Query<ContentsQuery>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<Value>, AppError> {
    if query.action.as_deref() == Some("reorder") {
        let req: ReorderRequest = parse_body(body)?;
        let updated = state.contents.reorder(&req.items).await?;
        return Ok(Json(json!({ "ok": true, "updated": updated })));
    }

    let req: UpdateContentRequest = parse_body(body)?;
    let outcome = state.contents.update(req).await?;
    Ok(Json(json!({
        "ok": true,
        "id": outcome.id,
        "versionNumber": outcome.version_number,
    })))
}
