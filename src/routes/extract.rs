//! # 요청 본문 추출기
//!
//! `axum::Json`을 그대로 감싸되, 거부(rejection)를 `AppError`로 바꿔
//! 모든 에러 응답이 `{ "error": ..., "hint"?: ... }` 모양을 갖게 합니다.
//!
//! ```ignore
//! pub async fn add_category(ApiJson(req): ApiJson<AddCategoryRequest>) -> ...
//! ```

use axum::extract::FromRequest;

use crate::error::AppError;

/// JSON 본문 추출기. 실패하면 `AppError::Validation` (HTTP 400)
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
