//! 프로세스 메모리 안에 보관하는 `DocumentStore` 구현
//!
//! 테스트와 `DATABASE_URL=memory` 로컬 실행에 사용합니다.
//! 재시작하면 모든 데이터가 사라집니다.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{DocumentStore, ItemFilter, StoreError};
use crate::models::{
    CategoryOption, CollectionSchema, FieldKind, ItemFields, ItemRecord, NewSnapshot,
    VersionSnapshot,
};

#[derive(Debug, Default)]
struct MemoryCollection {
    schema: CollectionSchema,
    // 생성 순서를 유지하기 위해 Vec로 보관
    items: Vec<ItemRecord>,
}

#[derive(Debug, Default)]
struct MemoryState {
    collections: HashMap<String, MemoryCollection>,
    histories: HashMap<String, Vec<VersionSnapshot>>,
}

/// `Arc<RwLock<...>>`로 감싸 clone해도 같은 데이터를 가리킵니다.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 컬렉션을 주어진 스키마로 등록합니다. 이미 있으면 그대로 둡니다.
    pub async fn ensure_collection(&self, name: &str, schema: CollectionSchema) {
        let mut state = self.state.write().await;
        state
            .collections
            .entry(name.to_string())
            .or_insert_with(|| MemoryCollection {
                schema,
                items: Vec::new(),
            });
    }

    /// 히스토리 컬렉션을 등록합니다.
    pub async fn ensure_history(&self, name: &str) {
        let mut state = self.state.write().await;
        state.histories.entry(name.to_string()).or_default();
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn retrieve_schema(&self, collection: &str) -> Result<CollectionSchema, StoreError> {
        let state = self.state.read().await;
        state
            .collections
            .get(collection)
            .map(|c| c.schema.clone())
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))
    }

    async fn query_items(
        &self,
        collection: &str,
        filter: Option<&ItemFilter>,
    ) -> Result<Vec<ItemRecord>, StoreError> {
        let state = self.state.read().await;
        let coll = state
            .collections
            .get(collection)
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?;

        Ok(coll
            .items
            .iter()
            .filter(|item| filter.map_or(true, |f| f.matches(&item.fields)))
            .cloned()
            .collect())
    }

    async fn get_item(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<ItemRecord>, StoreError> {
        let state = self.state.read().await;
        let coll = state
            .collections
            .get(collection)
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?;
        Ok(coll.items.iter().find(|item| item.id == id).cloned())
    }

    async fn create_item(
        &self,
        collection: &str,
        fields: &ItemFields,
    ) -> Result<String, StoreError> {
        let mut state = self.state.write().await;
        let coll = state
            .collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?;

        let id = uuid::Uuid::now_v7().to_string();
        coll.items.push(ItemRecord {
            id: id.clone(),
            fields: fields.clone(),
        });
        Ok(id)
    }

    async fn update_item(
        &self,
        collection: &str,
        id: &str,
        fields: &ItemFields,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let coll = state
            .collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?;
        let item = coll
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| StoreError::ItemNotFound(id.to_string()))?;

        item.fields.merge(fields);
        Ok(())
    }

    async fn update_schema_options(
        &self,
        collection: &str,
        field: &str,
        options: &[CategoryOption],
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let coll = state
            .collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?;

        match coll.schema.fields.get_mut(field) {
            Some(schema)
                if matches!(schema.kind, FieldKind::Select | FieldKind::MultiSelect) =>
            {
                schema.options = options.to_vec();
                Ok(())
            }
            _ => Err(StoreError::InvalidField {
                collection: collection.to_string(),
                field: field.to_string(),
            }),
        }
    }

    async fn create_snapshot(
        &self,
        history: &str,
        snapshot: &NewSnapshot,
    ) -> Result<String, StoreError> {
        let mut state = self.state.write().await;
        let entries = state
            .histories
            .get_mut(history)
            .ok_or_else(|| StoreError::CollectionNotFound(history.to_string()))?;

        let id = uuid::Uuid::now_v7().to_string();
        entries.push(snapshot.clone().into_snapshot(id.clone()));
        Ok(id)
    }

    async fn query_snapshots(
        &self,
        history: &str,
        content_id: &str,
        version_number: Option<i64>,
    ) -> Result<Vec<VersionSnapshot>, StoreError> {
        let state = self.state.read().await;
        let entries = state
            .histories
            .get(history)
            .ok_or_else(|| StoreError::CollectionNotFound(history.to_string()))?;

        Ok(entries
            .iter()
            .filter(|s| s.content_id == content_id)
            .filter(|s| version_number.map_or(true, |v| s.version_number == v))
            .cloned()
            .collect())
    }
}
