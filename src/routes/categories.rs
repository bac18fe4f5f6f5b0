//! # 카테고리 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET    /api/categories?db=`  → 카테고리 목록과 사용 횟수
//! - `POST   /api/categories`      → 카테고리 추가
//! - `PUT    /api/categories`      → 이름 변경 (항목 마이그레이션 포함)
//! - `DELETE /api/categories`      → 삭제. `force` 없이 호출하면 사용 개수만 알려줍니다.
//!
//! `db=prompts`를 주면 프롬프트 컬렉션의 카테고리를 다룹니다.
//! 선택자는 모든 메서드에서 쿼리 문자열과 본문 양쪽으로 받습니다 (쿼리 우선).

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};

use super::{contents::AppState, extract::ApiJson};
use crate::{error::AppError, models::*};

pub async fn list_categories(
    State(state): State<AppState>,
    Query(selector): Query<CollectionSelector>,
) -> Result<Json<Value>, AppError> {
    let collection = state.collections.resolve(selector.db.as_deref());
    let categories = state.categories.list(collection).await?;
    Ok(Json(json!({ "categories": categories })))
}

pub async fn add_category(
    State(state): State<AppState>,
    Query(selector): Query<CollectionSelector>,
    ApiJson(req): ApiJson<AddCategoryRequest>,
) -> Result<Json<Value>, AppError> {
    let collection = target(&state, selector, req.db.as_deref());
    let category = state
        .categories
        .add(collection, req.name.as_deref())
        .await?;
    Ok(Json(json!({ "ok": true, "category": category })))
}

pub async fn rename_category(
    State(state): State<AppState>,
    Query(selector): Query<CollectionSelector>,
    ApiJson(req): ApiJson<RenameCategoryRequest>,
) -> Result<Json<Value>, AppError> {
    let collection = target(&state, selector, req.db.as_deref());
    let updated_count = state
        .categories
        .rename(
            collection,
            req.old_name.as_deref(),
            req.new_name.as_deref(),
        )
        .await?;
    Ok(Json(json!({ "ok": true, "updatedCount": updated_count })))
}

/// 사용 중인 카테고리는 `force: true`가 있어야 삭제됩니다.
pub async fn delete_category(
    State(state): State<AppState>,
    Query(selector): Query<CollectionSelector>,
    ApiJson(req): ApiJson<DeleteCategoryRequest>,
) -> Result<Json<Value>, AppError> {
    let collection = target(&state, selector, req.db.as_deref());
    let outcome = state
        .categories
        .delete(collection, req.name.as_deref(), req.force)
        .await?;

    let body = match outcome {
        DeleteOutcome::Blocked { count } => json!({ "canDelete": false, "count": count }),
        DeleteOutcome::Deleted { migrated_count } => {
            json!({ "ok": true, "migratedCount": migrated_count })
        }
    };
    Ok(Json(body))
}

/// 쿼리의 `db`가 본문의 `db`보다 우선합니다.
fn target<'a>(
    state: &'a AppState,
    selector: CollectionSelector,
    body_db: Option<&str>,
) -> &'a str {
    let db = selector.db.as_deref().or(body_db);
    state.collections.resolve(db)
}
