//! 테스트 공용 도우미
//!
//! - `memory_store()`: 표준 스키마의 `contents`, `prompts` 컬렉션과 `history`가 준비된 저장소
//! - `seed_item()`: 항목 하나 생성
//! - `app_state()`: 위 저장소를 쓰는 핸들러 상태
//! - `FaultyStore`: 특정 호출을 실패시키는 래퍼

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::models::{
    CategoryOption, CollectionSchema, ItemFields, ItemRecord, NewSnapshot, VersionSnapshot,
};
use crate::routes::{self, AppState, Collections};
use crate::store::{DocumentStore, ItemFilter, MemoryStore, StoreError};

pub async fn memory_store() -> MemoryStore {
    let store = MemoryStore::new();
    store
        .ensure_collection("contents", CollectionSchema::standard())
        .await;
    store
        .ensure_collection("prompts", CollectionSchema::standard())
        .await;
    store.ensure_history("history").await;
    store
}

pub async fn seed_item(store: &MemoryStore, title: &str, content: &str, category: &str) -> String {
    store
        .create_item(
            "contents",
            &ItemFields {
                title: Some(title.to_string()),
                content: Some(content.to_string()),
                formatted: Some(String::new()),
                category: Some(category.to_string()),
                ..ItemFields::default()
            },
        )
        .await
        .unwrap()
}

pub fn app_state(store: &MemoryStore, history: Option<&str>) -> AppState {
    routes::build_state(
        Arc::new(store.clone()),
        Collections {
            contents: "contents".to_string(),
            prompts: "prompts".to_string(),
        },
        history.map(str::to_string),
        None,
    )
}

pub async fn add_option(store: &MemoryStore, collection: &str, name: &str) {
    let schema = store.retrieve_schema(collection).await.unwrap();
    let mut options = schema.select_options("Category").unwrap().to_vec();
    options.push(CategoryOption::new(name));
    store
        .update_schema_options(collection, "Category", &options)
        .await
        .unwrap();
}

/// 스냅샷 쓰기, 항목 쓰기, 스키마 쓰기를 골라서 실패시킵니다.
#[derive(Clone)]
pub struct FaultyStore {
    inner: MemoryStore,
    snapshots: Arc<AtomicBool>,
    item_updates: Arc<AtomicBool>,
    schema_updates: Arc<AtomicBool>,
}

impl FaultyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            snapshots: Arc::default(),
            item_updates: Arc::default(),
            schema_updates: Arc::default(),
        }
    }

    pub fn fail_snapshots(&self, fail: bool) {
        self.snapshots.store(fail, Ordering::SeqCst);
    }

    pub fn fail_item_updates(&self, fail: bool) {
        self.item_updates.store(fail, Ordering::SeqCst);
    }

    pub fn fail_schema_updates(&self, fail: bool) {
        self.schema_updates.store(fail, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool, what: &str) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("{what} rejected")));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FaultyStore {
    async fn retrieve_schema(&self, collection: &str) -> Result<CollectionSchema, StoreError> {
        self.inner.retrieve_schema(collection).await
    }

    async fn query_items(
        &self,
        collection: &str,
        filter: Option<&ItemFilter>,
    ) -> Result<Vec<ItemRecord>, StoreError> {
        self.inner.query_items(collection, filter).await
    }

    async fn get_item(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<ItemRecord>, StoreError> {
        self.inner.get_item(collection, id).await
    }

    async fn create_item(
        &self,
        collection: &str,
        fields: &ItemFields,
    ) -> Result<String, StoreError> {
        self.inner.create_item(collection, fields).await
    }

    async fn update_item(
        &self,
        collection: &str,
        id: &str,
        fields: &ItemFields,
    ) -> Result<(), StoreError> {
        Self::check(&self.item_updates, "item update")?;
        self.inner.update_item(collection, id, fields).await
    }

    async fn update_schema_options(
        &self,
        collection: &str,
        field: &str,
        options: &[CategoryOption],
    ) -> Result<(), StoreError> {
        Self::check(&self.schema_updates, "schema update")?;
        self.inner
            .update_schema_options(collection, field, options)
            .await
    }

    async fn create_snapshot(
        &self,
        history: &str,
        snapshot: &NewSnapshot,
    ) -> Result<String, StoreError> {
        Self::check(&self.snapshots, "snapshot write")?;
        self.inner.create_snapshot(history, snapshot).await
    }

    async fn query_snapshots(
        &self,
        history: &str,
        content_id: &str,
        version_number: Option<i64>,
    ) -> Result<Vec<VersionSnapshot>, StoreError> {
        self.inner
            .query_snapshots(history, content_id, version_number)
            .await
    }
}
