//! # 버전 히스토리 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET  /api/history?contentId=` → 항목의 스냅샷 목록 (최신순)
//! - `POST /api/history`            → 특정 버전으로 복원
//!
//! 히스토리 컬렉션이 설정되지 않았을 때 조회는 에러 대신 빈 목록과
//! `notConfigured: true`를 돌려줍니다. 복원은 400으로 거부됩니다.

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};

use super::{contents::AppState, extract::ApiJson};
use crate::{error::AppError, models::*, services::VersionLedger};

pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Value>, AppError> {
    let content_id = query
        .content_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation("Missing contentId".to_string()))?;

    let history = state.ledger.get_history(&content_id).await?;
    if !history.configured {
        return Ok(Json(json!({
            "versions": [],
            "notConfigured": true,
            "hint": VersionLedger::not_configured_hint(),
        })));
    }

    Ok(Json(json!({ "versions": history.versions })))
}

pub async fn restore_version(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RestoreRequest>,
) -> Result<Json<Value>, AppError> {
    let (Some(content_id), Some(version_number)) =
        (req.content_id.filter(|id| !id.is_empty()), req.version_number)
    else {
        return Err(AppError::Validation(
            "Missing contentId or versionNumber".to_string(),
        ));
    };

    let new_version_number = state
        .ledger
        .restore_version(state.contents.collection(), &content_id, version_number)
        .await?;

    Ok(Json(json!({
        "ok": true,
        "message": format!("Restored to version {version_number}"),
        "newVersionNumber": new_version_number,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{app_state, memory_store, seed_item};

    fn query(content_id: &str) -> Query<HistoryQuery> {
        Query(HistoryQuery {
            content_id: Some(content_id.to_string()),
        })
    }

    #[tokio::test]
    async fn edit_then_restore_round_trip() {
        let store = memory_store().await;
        let state = app_state(&store, Some("history"));
        let id = seed_item(&store, "Note", "A", "General").await;

        let update: UpdateContentRequest =
            serde_json::from_value(json!({ "id": id, "content": "B" })).unwrap();
        state.contents.update(update).await.unwrap();

        let Json(body) = get_history(State(state.clone()), query(&id)).await.unwrap();
        assert_eq!(body["versions"][0]["versionNumber"], 0);
        assert_eq!(body["versions"][0]["content"], "A");

        let req = RestoreRequest {
            content_id: Some(id.clone()),
            version_number: Some(0),
        };
        let Json(body) = restore_version(State(state.clone()), ApiJson(req))
            .await
            .unwrap();
        assert_eq!(body["message"], "Restored to version 0");
        assert_eq!(body["newVersionNumber"], 2);

        let Json(body) = get_history(State(state), query(&id)).await.unwrap();
        assert_eq!(body["versions"].as_array().unwrap().len(), 2);
        assert_eq!(body["versions"][0]["content"], "B");
    }

    #[tokio::test]
    async fn unconfigured_history_is_reported_not_failed() {
        let store = memory_store().await;
        let state = app_state(&store, None);

        let Json(body) = get_history(State(state.clone()), query("x")).await.unwrap();
        assert_eq!(body["versions"], json!([]));
        assert_eq!(body["notConfigured"], true);

        let req = RestoreRequest {
            content_id: Some("x".to_string()),
            version_number: Some(0),
        };
        let err = restore_version(State(state), ApiJson(req)).await.unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }

    #[tokio::test]
    async fn missing_parameters_are_rejected() {
        let state = app_state(&memory_store().await, Some("history"));

        let err = get_history(State(state.clone()), Query(HistoryQuery::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let req = RestoreRequest {
            content_id: Some("x".to_string()),
            version_number: None,
        };
        let err = restore_version(State(state), ApiJson(req)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
