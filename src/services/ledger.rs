//! # 버전 원장 (Version Ledger)
//!
//! 콘텐츠 항목이 바뀌기 **직전** 상태를 스냅샷으로 남기고,
//! 항목의 `VersionCount`를 정확히 1씩 올립니다.
//!
//! ## 순서 규칙
//! 1. 현재 상태로 스냅샷 기록 (`version_number` = 현재 `VersionCount`)
//! 2. 항목에 새 필드 + `VersionCount + 1` + `LastModified` 쓰기
//!
//! 저장소에 트랜잭션이 없으므로 두 단계는 원자적이지 않습니다.
//! - 일반 수정: 1단계 실패는 경고 로그만 남기고 2단계를 진행합니다 (히스토리는 최선 노력).
//! - 복원: 1단계 실패 시 복원 자체를 중단합니다. 복원은 항상 다시 되돌릴 수 있어야 합니다.
//!   1단계 성공 후 2단계가 실패하면 "복원되지 않은 복원 전 스냅샷"이 원장에 남습니다.
//!   롤백이나 2단계 커밋은 하지 않습니다.

use std::sync::Arc;

use crate::error::AppError;
use crate::models::{Capabilities, ContentItem, ItemFields, NewSnapshot, VersionSnapshot};
use crate::store::DocumentStore;

use super::timestamp_now;

const HISTORY_HINT: &str = "Version history requires a history collection. \
     Set HISTORY_COLLECTION in environment variables and restart the server.";

/// 히스토리 조회 결과
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    /// `version_number` 내림차순 (최신이 먼저)
    pub versions: Vec<VersionSnapshot>,
    /// 히스토리 컬렉션이 설정되지 않았으면 `false`. 에러가 아닙니다.
    pub configured: bool,
}

#[derive(Clone)]
pub struct VersionLedger {
    store: Arc<dyn DocumentStore>,
    /// 히스토리 컬렉션 이름. `None`이면 히스토리 기능이 꺼져 있습니다.
    history: Option<String>,
}

impl VersionLedger {
    pub fn new(store: Arc<dyn DocumentStore>, history: Option<String>) -> Self {
        Self { store, history }
    }

    pub fn not_configured_hint() -> &'static str {
        HISTORY_HINT
    }

    /// 항목의 현재 제목/본문/서식 본문을 스냅샷으로 저장합니다.
    ///
    /// 스냅샷 번호는 항목의 현재 `version_count`입니다.
    /// 히스토리가 꺼져 있으면 아무것도 하지 않고 `Ok(None)`을 반환합니다.
    pub async fn record_snapshot(
        &self,
        item: &ContentItem,
        change_note: Option<String>,
    ) -> Result<Option<String>, AppError> {
        let Some(history) = self.history.as_deref() else {
            return Ok(None);
        };

        let snapshot = NewSnapshot {
            content_id: item.id.clone(),
            version_number: item.version_count,
            title: item.title.clone(),
            content: item.content.clone(),
            formatted_content: item.formatted_content.clone(),
            created_at: timestamp_now(),
            change_note,
        };

        let id = self.store.create_snapshot(history, &snapshot).await?;
        tracing::debug!(
            content_id = %item.id,
            version_number = item.version_count,
            snapshot_id = %id,
            "history snapshot recorded"
        );
        Ok(Some(id))
    }

    /// 패치를 쓰고 버전을 1 올립니다. 새 버전 번호를 반환합니다.
    ///
    /// `record_snapshot`이 먼저 호출되었다고 가정합니다.
    /// 스키마에 없는 필드(`VersionCount` 포함)는 쓰지 않습니다.
    pub async fn apply_update(
        &self,
        collection: &str,
        item: &ContentItem,
        mut patch: ItemFields,
        caps: &Capabilities,
    ) -> Result<i64, AppError> {
        let new_version = item.version_count + 1;
        patch.version_count = Some(new_version);
        patch.last_modified = Some(timestamp_now());

        self.store
            .update_item(collection, &item.id, &patch.masked(caps))
            .await?;

        Ok(new_version)
    }

    /// 일반 수정: 스냅샷(실패 허용) → 패치 적용
    pub async fn update_with_history(
        &self,
        collection: &str,
        item: &ContentItem,
        patch: ItemFields,
        caps: &Capabilities,
    ) -> Result<i64, AppError> {
        if let Err(err) = self.record_snapshot(item, None).await {
            // 히스토리는 최선 노력(best-effort)입니다. 편집은 계속 진행합니다.
            tracing::warn!(
                content_id = %item.id,
                version_number = item.version_count,
                error = %err,
                "failed to save history snapshot, continuing with update"
            );
        }

        self.apply_update(collection, item, patch, caps).await
    }

    /// 항목의 모든 스냅샷을 최신순으로 반환합니다.
    ///
    /// 스냅샷이 없거나 히스토리가 꺼져 있으면 빈 목록입니다.
    pub async fn get_history(&self, content_id: &str) -> Result<History, AppError> {
        let Some(history) = self.history.as_deref() else {
            return Ok(History {
                versions: Vec::new(),
                configured: false,
            });
        };

        let mut versions = self
            .store
            .query_snapshots(history, content_id, None)
            .await?;
        versions.sort_by(|a, b| {
            b.version_number
                .cmp(&a.version_number)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        Ok(History {
            versions,
            configured: true,
        })
    }

    /// 항목을 `version_number` 시점의 제목/본문/서식 본문으로 되돌립니다.
    ///
    /// 순서:
    /// 1. 대상 스냅샷 조회 (없으면 NotFound, 아무것도 바뀌지 않음)
    /// 2. 항목의 현재 상태 조회
    /// 3. 현재 상태를 "Before restore to version N" 스냅샷으로 기록 (실패 시 중단)
    /// 4. 스냅샷의 필드로 덮어쓰고 버전 증가
    ///
    /// 새 버전 번호를 반환합니다.
    pub async fn restore_version(
        &self,
        collection: &str,
        content_id: &str,
        version_number: i64,
    ) -> Result<i64, AppError> {
        // ── 0단계: 히스토리 설정 확인 ──
        let history = self.history.as_deref().ok_or_else(|| {
            AppError::not_configured("Version history not configured", HISTORY_HINT)
        })?;

        // ── 1단계: 대상 스냅샷 조회 ──
        // 같은 번호가 여럿이면(동시 수정) 가장 나중에 기록된 것을 씁니다.
        let target = self
            .store
            .query_snapshots(history, content_id, Some(version_number))
            .await?
            .into_iter()
            .max_by(|a, b| a.created_at.cmp(&b.created_at))
            .ok_or_else(|| AppError::NotFound("Version not found".to_string()))?;

        // ── 2단계: 스키마와 항목의 현재 상태 조회 ──
        let caps = Capabilities::from_schema(&self.store.retrieve_schema(collection).await?);
        let record = self
            .store
            .get_item(collection, content_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Content '{content_id}' not found")))?;
        let current = ContentItem::from_record(record, &caps);

        // ── 3단계: 현재 상태를 스냅샷으로 기록 ──
        // 일반 수정과 달리 실패하면 `?`로 즉시 중단합니다.
        self.record_snapshot(
            &current,
            Some(format!("Before restore to version {version_number}")),
        )
        .await?;

        // ── 4단계: 스냅샷의 제목/본문/서식 본문으로 덮어쓰고 버전 증가 ──
        let patch = ItemFields {
            title: Some(target.title),
            content: Some(target.content),
            formatted: Some(target.formatted_content),
            ..ItemFields::default()
        };
        let new_version = self.apply_update(collection, &current, patch, &caps).await?;

        tracing::info!(
            content_id,
            restored_from = version_number,
            new_version,
            "content restored"
        );
        Ok(new_version)
    }
}
