//! # 서비스 계층 (비즈니스 로직)
//!
//! 라우트 핸들러와 문서 저장소 사이에서 규칙을 지키는 모듈들입니다.
//!
//! 각 하위 모듈:
//! - `ledger`: 버전 원장. 변경 전 스냅샷 기록, 버전 번호 증가, 히스토리 조회, 복원
//! - `categories`: 카테고리 레지스트리. 사용 횟수 집계, 추가/이름변경/삭제(마이그레이션)
//! - `contents`: 콘텐츠 목록/생성/수정/정렬. 수정 시 원장을 먼저 호출
//! - `validation`: 여러 서비스가 공유하는 입력 검증
//!
//! 저장소에는 트랜잭션이 없으므로 여러 단계 작업은 **정해진 순서**로 실행되고,
//! 중간에 실패하면 그 지점에서 멈춥니다 (되돌리기 없음).

pub mod categories;
pub mod contents;
pub mod ledger;
pub mod validation;

pub use categories::CategoryRegistry;
pub use contents::ContentService;
pub use ledger::VersionLedger;

use chrono::{SecondsFormat, Utc};
use std::future::Future;

use crate::error::AppError;
use crate::store::StoreError;

/// 현재 시각 (RFC 3339, 밀리초, UTC `Z`)
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// 오늘 날짜 (`YYYY-MM-DD`)
pub fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

/// 서로 독립적인 항목별 쓰기를 동시에 실행하고 모두 끝날 때까지 기다립니다.
///
/// 하나라도 실패하면 첫 번째 에러를 반환합니다. 이미 성공한 쓰기는 그대로 남습니다.
/// 같은 요청을 다시 보내면 남은 항목만 실제로 바뀌므로 재시도로 수렴합니다.
pub(crate) async fn apply_all<F>(updates: Vec<F>) -> Result<usize, AppError>
where
    F: Future<Output = Result<(), StoreError>>,
{
    let total = updates.len();
    let results = futures::future::join_all(updates).await;

    let mut applied = 0;
    let mut first_error = None;
    for result in results {
        match result {
            Ok(()) => applied += 1,
            Err(err) if first_error.is_none() => first_error = Some(err),
            Err(_) => {}
        }
    }

    match first_error {
        Some(err) => {
            tracing::error!(
                applied,
                failed = total - applied,
                error = %err,
                "bulk update partially applied"
            );
            Err(err.into())
        }
        None => Ok(applied),
    }
}
