//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//! Rust에서는 예외(exception) 대신 `Result<T, E>` 타입으로 에러를 처리합니다.
//!
//! 이 모듈의 핵심:
//! - `AppError` 열거형(enum): 모든 에러 종류를 하나의 타입으로 통합
//! - `From<StoreError>` 구현: 저장소 에러를 분류하여 `AppError`로 변환
//! - `IntoResponse` 구현: 에러를 `{ "error": ..., "hint"?: ... }` HTTP 응답으로 자동 변환
//!
//! ## 에러 분류
//! | 종류 | 언제 | HTTP |
//! |------|------|------|
//! | `Configuration` | 컬렉션/스키마가 없거나 설정이 잘못됨 | 500 (히스토리 미설정은 400) |
//! | `Validation` | 비었거나 너무 긴 입력 (저장소 호출 전에 거부) | 400 |
//! | `Conflict` | 중복 이름, 보호된 "General" 대상 (변경 전에 거부) | 400 |
//! | `NotFound` | 없는 id, 카테고리, 버전 | 404 |
//! | `Upstream` | 저장소 호출이 도중에 실패 (보상 없이 중단) | 500 |

use axum::{
    extract::rejection::JsonRejection, // JSON 본문 추출 실패
    http::StatusCode,                   // HTTP 상태 코드 (200, 404, 500 등)
    response::{IntoResponse, Response}, // Axum의 응답 변환 트레이트
    Json,                               // JSON 응답 래퍼
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 핸들러에서 `Result<T, AppError>`를 반환하면,
/// Axum이 자동으로 `IntoResponse`를 호출하여 HTTP 응답으로 변환합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 설정 문제. `hint`에 해결 방법을 담아 그대로 클라이언트에 보여줍니다.
    /// 재시도해도 해결되지 않습니다.
    #[error("{message}")]
    Configuration {
        message: String,
        hint: String,
        status: StatusCode,
    },

    /// 잘못된 입력 (HTTP 400)
    #[error("{0}")]
    Validation(String),

    /// 중복 이름 또는 보호된 카테고리 (HTTP 400)
    #[error("{0}")]
    Conflict(String),

    /// 요청한 리소스를 찾을 수 없음 (HTTP 404)
    #[error("{0}")]
    NotFound(String),

    /// 저장소 호출 실패 (HTTP 500)
    /// 여러 단계 작업이 중간에 실패해도 이미 적용된 단계는 되돌리지 않습니다.
    #[error("{0}")]
    Upstream(StoreError),
}

impl AppError {
    /// 서버 설정 문제 (HTTP 500)
    pub fn configuration(message: impl Into<String>, hint: impl Into<String>) -> Self {
        AppError::Configuration {
            message: message.into(),
            hint: hint.into(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 선택 기능이 꺼져 있어 요청을 처리할 수 없음 (HTTP 400)
    pub fn not_configured(message: impl Into<String>, hint: impl Into<String>) -> Self {
        AppError::Configuration {
            message: message.into(),
            hint: hint.into(),
            status: StatusCode::BAD_REQUEST,
        }
    }
}

// 저장소 에러를 의미에 맞는 분류로 옮깁니다.
// 컬렉션이 없다는 것은 대부분 환경변수 설정 문제이므로 Configuration으로 올립니다.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::CollectionNotFound(ref name) => AppError::configuration(
                err.to_string(),
                format!(
                    "Create the '{name}' collection or point CONTENTS_COLLECTION / \
                     PROMPTS_COLLECTION / HISTORY_COLLECTION at an existing one."
                ),
            ),
            StoreError::ItemNotFound(id) => AppError::NotFound(format!("Content '{id}' not found")),
            other => AppError::Upstream(other),
        }
    }
}

// 본문이 JSON이 아니거나, 타입이 맞지 않거나, Content-Type이 빠진 경우.
// axum 기본 응답(415/422, 일반 텍스트) 대신 400 + `{ "error": ... }`로 통일합니다.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 응답 본문: `{ "error": "...", "hint": "..." }` (`hint`는 있을 때만)
    fn into_response(self) -> Response {
        let (status, message, hint) = match self {
            AppError::Configuration {
                message,
                hint,
                status,
            } => {
                tracing::error!(%message, "configuration error");
                (status, message, Some(hint))
            }
            AppError::Validation(msg) | AppError::Conflict(msg) => {
                (StatusCode::BAD_REQUEST, msg, None)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::Upstream(err) => {
                // 저장소 메시지를 그대로 전달합니다
                tracing::error!(error = %err, "document store call failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), None)
            }
        };

        let body = match hint {
            Some(hint) => json!({ "error": message, "hint": hint }),
            None => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_collection_becomes_configuration_error() {
        let err: AppError = StoreError::CollectionNotFound("history".to_string()).into();
        match err {
            AppError::Configuration { hint, status, .. } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert!(hint.contains("history"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn status_codes_follow_error_kind() {
        let cases = [
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Conflict("x".into()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                AppError::Upstream(StoreError::Unavailable("down".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AppError::not_configured("x", "y"), StatusCode::BAD_REQUEST),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
