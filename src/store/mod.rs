//! # 문서 저장소 어댑터 계층 (Document Store Adapter)
//!
//! 콘텐츠 항목, 컬렉션 스키마, 버전 스냅샷을 보관하는 외부 저장소와의 경계입니다.
//! 서비스 계층(services/)은 이 모듈의 `DocumentStore` 트레이트만 알고,
//! 실제 구현은 `AppState`를 만들 때 `Arc<dyn DocumentStore>`로 주입됩니다.
//!
//! 저장소가 보장하는 것은 **호출 하나 단위의 원자성**뿐입니다.
//! 여러 항목에 걸친 트랜잭션, 잠금, 집계 쿼리(COUNT 등)는 없다고 가정하고
//! 서비스 계층을 작성합니다.
//!
//! 각 하위 모듈:
//! - `memory`: 프로세스 메모리에 보관하는 구현 (테스트와 로컬 실행용)
//! - `sqlite`: sqlx + SQLite 위에 구현한 영속 저장소

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    CategoryOption, CollectionSchema, Field, ItemFields, ItemRecord, NewSnapshot, VersionSnapshot,
};

/// 저장소 호출 실패
#[derive(Debug, Error)]
pub enum StoreError {
    /// 컬렉션(또는 히스토리 컬렉션)이 존재하지 않음. 대부분 설정 문제입니다.
    #[error("collection '{0}' does not exist")]
    CollectionNotFound(String),

    #[error("item '{0}' does not exist")]
    ItemNotFound(String),

    /// 스키마에 없는 필드나 선택형이 아닌 필드에 옵션을 쓰려 함
    #[error("field '{field}' cannot hold options in collection '{collection}'")]
    InvalidField { collection: String, field: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 저장된 JSON 값(태그, 첨부파일)을 해석할 수 없음
    #[error("malformed stored value: {0}")]
    Decode(#[from] serde_json::Error),

    /// 장애 주입용 (테스트 전용 저장소 래퍼가 사용)
    #[cfg(test)]
    #[error("{0}")]
    Unavailable(String),
}

/// 항목 조회 필터. 텍스트 필드의 정확한(대소문자 구분) 일치만 지원합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemFilter {
    Equals(Field, String),
}

impl ItemFilter {
    pub fn category(name: impl Into<String>) -> Self {
        ItemFilter::Equals(Field::Category, name.into())
    }

    pub fn matches(&self, fields: &ItemFields) -> bool {
        match self {
            ItemFilter::Equals(field, value) => fields.text(*field) == Some(value.as_str()),
        }
    }
}

/// 문서 저장소가 제공하는 연산
///
/// 모든 메서드는 서로 독립적인 호출입니다. 호출 사이의 일관성은
/// 호출하는 쪽(서비스 계층)이 순서로 관리합니다.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 컬렉션의 스키마(필드와 선택 옵션)를 조회합니다.
    async fn retrieve_schema(&self, collection: &str) -> Result<CollectionSchema, StoreError>;

    /// 컬렉션의 항목을 조회합니다. `filter`가 없으면 전체를 반환합니다.
    /// 반환 순서는 생성 순서입니다.
    async fn query_items(
        &self,
        collection: &str,
        filter: Option<&ItemFilter>,
    ) -> Result<Vec<ItemRecord>, StoreError>;

    async fn get_item(&self, collection: &str, id: &str)
        -> Result<Option<ItemRecord>, StoreError>;

    /// 새 항목을 만들고 저장소가 부여한 id를 반환합니다.
    async fn create_item(&self, collection: &str, fields: &ItemFields)
        -> Result<String, StoreError>;

    /// `fields`에서 `Some`인 필드만 덮어씁니다. 항목이 없으면 `ItemNotFound`.
    async fn update_item(
        &self,
        collection: &str,
        id: &str,
        fields: &ItemFields,
    ) -> Result<(), StoreError>;

    /// 선택형 필드의 옵션 목록 전체를 교체합니다.
    async fn update_schema_options(
        &self,
        collection: &str,
        field: &str,
        options: &[CategoryOption],
    ) -> Result<(), StoreError>;

    /// 히스토리 컬렉션에 스냅샷을 추가하고 id를 반환합니다.
    async fn create_snapshot(
        &self,
        history: &str,
        snapshot: &NewSnapshot,
    ) -> Result<String, StoreError>;

    /// 특정 항목의 스냅샷을 조회합니다. 정렬은 보장하지 않습니다.
    async fn query_snapshots(
        &self,
        history: &str,
        content_id: &str,
        version_number: Option<i64>,
    ) -> Result<Vec<VersionSnapshot>, StoreError>;
}
