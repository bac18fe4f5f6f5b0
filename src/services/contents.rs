//! # 콘텐츠 서비스
//!
//! 콘텐츠 목록/생성/수정/정렬 요청을 처리합니다.
//! 수정은 항상 버전 원장을 거쳐 저장소에 쓰입니다.
//!
//! 모든 작업은 시작할 때 스키마를 한 번 조회해 `Capabilities`를 만들고,
//! 읽기와 쓰기 양쪽에서 그 집합을 기준으로 필드를 다룹니다.

use std::sync::Arc;

use crate::error::AppError;
use crate::models::{
    dedup_tags, normalize_attachments, Capabilities, ContentItem, CreateContentRequest, Field,
    ItemFields, ReorderEntry, UpdateContentRequest, DEFAULT_CATEGORY,
};
use crate::store::DocumentStore;

use super::ledger::VersionLedger;
use super::{apply_all, today};

/// 수정 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub id: String,
    /// 수정 후 항목의 버전 번호. 히스토리를 건너뛰었으면 기존 번호 그대로입니다.
    pub version_number: i64,
}

#[derive(Clone)]
pub struct ContentService {
    store: Arc<dyn DocumentStore>,
    collection: String,
    ledger: VersionLedger,
}

impl ContentService {
    pub fn new(store: Arc<dyn DocumentStore>, collection: String, ledger: VersionLedger) -> Self {
        Self {
            store,
            collection,
            ledger,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    async fn capabilities(&self) -> Result<Capabilities, AppError> {
        let schema = self.store.retrieve_schema(&self.collection).await?;
        Ok(Capabilities::from_schema(&schema))
    }

    /// 전체 항목을 `sort_order` 오름차순으로 반환합니다 (같으면 생성 순서).
    pub async fn list(&self) -> Result<Vec<ContentItem>, AppError> {
        let caps = self.capabilities().await?;
        let mut items: Vec<ContentItem> = self
            .store
            .query_items(&self.collection, None)
            .await?
            .into_iter()
            .map(|record| ContentItem::from_record(record, &caps))
            .collect();

        // sort_by_key는 안정 정렬입니다
        items.sort_by_key(|item| item.sort_order);
        Ok(items)
    }

    /// 새 항목을 만들고 id를 반환합니다.
    pub async fn create(&self, req: CreateContentRequest) -> Result<String, AppError> {
        let caps = self.capabilities().await?;
        if !caps.has(Field::Title) {
            return Err(AppError::Validation(
                "No 'Title' property in database. Create a Title column named exactly 'Title'."
                    .to_string(),
            ));
        }

        // 서식 본문이 비었으면 본문으로 대신합니다
        let formatted = if req.formatted_content.is_empty() {
            req.content.clone()
        } else {
            req.formatted_content.clone()
        };
        let category = req
            .category
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        let tags = dedup_tags(&req.tags);
        let attachments = normalize_attachments(&req.attachments);

        let fields = ItemFields {
            title: Some(req.title),
            content: Some(req.content).filter(|c| !c.is_empty()),
            formatted: Some(formatted).filter(|f| !f.is_empty()),
            category: Some(category),
            folder: Some(req.folder).filter(|f| !f.is_empty()).map(Some),
            tags: Some(tags).filter(|t| !t.is_empty()),
            created: Some(req.date_created.unwrap_or_else(today)).filter(|d| !d.is_empty()),
            use_count: Some(req.use_count.unwrap_or(0).max(0)),
            attachments: Some(attachments).filter(|a| !a.is_empty()),
            version_count: Some(0),
            ..ItemFields::default()
        }
        .masked(&caps);

        let id = self.store.create_item(&self.collection, &fields).await?;
        tracing::info!(collection = %self.collection, id = %id, "content created");
        Ok(id)
    }

    /// 항목을 수정합니다.
    ///
    /// `skip_history`가 `false`이면 원장이 스냅샷을 먼저 남기고 버전을 올립니다.
    /// `true`이면 필드만 쓰고 버전은 그대로 둡니다.
    pub async fn update(&self, req: UpdateContentRequest) -> Result<UpdateOutcome, AppError> {
        let id = req
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::Validation("Missing 'id' in request body".to_string()))?;

        let caps = self.capabilities().await?;
        let record = self
            .store
            .get_item(&self.collection, &id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Content '{id}' not found")))?;
        let current = ContentItem::from_record(record, &caps);
        let patch = req.to_fields();

        let version_number = if req.skip_history {
            self.store
                .update_item(&self.collection, &id, &patch.masked(&caps))
                .await?;
            current.version_count
        } else {
            self.ledger
                .update_with_history(&self.collection, &current, patch, &caps)
                .await?
        };

        tracing::debug!(
            id = %id,
            version_number,
            skip_history = req.skip_history,
            "content updated"
        );
        Ok(UpdateOutcome { id, version_number })
    }

    /// 여러 항목의 `SortOrder`를 동시에 씁니다. 갱신한 항목 수를 반환합니다.
    pub async fn reorder(&self, entries: &[ReorderEntry]) -> Result<usize, AppError> {
        if entries.is_empty() {
            return Err(AppError::Validation(
                "Missing 'items' array in request body".to_string(),
            ));
        }

        let caps = self.capabilities().await?;
        if !caps.has(Field::SortOrder) {
            return Err(AppError::configuration(
                "No 'SortOrder' property in database",
                "Add a number column named exactly 'SortOrder' to enable manual ordering.",
            ));
        }

        let patches: Vec<(String, ItemFields)> = entries
            .iter()
            .map(|entry| {
                let patch = ItemFields {
                    sort_order: Some(entry.sort_order),
                    ..ItemFields::default()
                };
                (entry.id.clone(), patch)
            })
            .collect();
        let updates: Vec<_> = patches
            .iter()
            .map(|(id, patch)| self.store.update_item(&self.collection, id, patch))
            .collect();

        apply_all(updates).await
    }
}
