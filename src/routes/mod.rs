//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들을 모아둔 모듈입니다.
//! Axum에서 핸들러는 HTTP 요청을 받아 응답을 반환하는 async 함수입니다.
//!
//! 각 하위 모듈:
//! - `contents`: 콘텐츠 목록/생성/수정/정렬, 공유 상태(`AppState`)
//! - `categories`: 카테고리 목록/추가/이름변경/삭제
//! - `history`: 버전 히스토리 조회와 복원
//! - `config`: 클라이언트용 설정값
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `extract`: 에러를 `AppError`로 돌려주는 JSON 본문 추출기

pub mod categories;
pub mod config;
pub mod contents;
pub mod extract;
pub mod health;
pub mod history;

// 각 모듈의 핸들러 함수들을 재공개하여
// main.rs에서 `routes::list_contents`처럼 바로 접근 가능하게 합니다.
pub use categories::*;
pub use config::*;
pub use contents::*;
pub use health::*;
pub use history::*;

use std::sync::Arc;

use crate::services::{CategoryRegistry, ContentService, VersionLedger};
use crate::store::DocumentStore;

/// 하나의 저장소 위에 서비스들을 조립합니다.
///
/// 원장은 콘텐츠 서비스와 히스토리 라우트가 같은 인스턴스를 공유합니다.
pub fn build_state(
    store: Arc<dyn DocumentStore>,
    collections: Collections,
    history: Option<String>,
    ollama_tunnel_url: Option<String>,
) -> AppState {
    let ledger = VersionLedger::new(store.clone(), history);
    AppState {
        contents: ContentService::new(
            store.clone(),
            collections.contents.clone(),
            ledger.clone(),
        ),
        categories: CategoryRegistry::new(store),
        ledger,
        collections,
        ollama_tunnel_url,
    }
}
