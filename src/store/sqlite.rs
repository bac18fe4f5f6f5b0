//! # SQLite 문서 저장소
//!
//! sqlx로 구현한 `DocumentStore`입니다.
//! 테이블 구조는 `migrations/` 폴더의 SQL 파일에 정의되어 있습니다.
//!
//! ## 테이블 구조
//! - `collections`: 콘텐츠/히스토리 컬렉션 목록
//! - `schema_fields`, `schema_options`: 컬렉션 스키마 (필드 타입, 선택 옵션)
//! - `items`: 콘텐츠 항목 (tags, attachments는 JSON 문자열)
//! - `snapshots`: 버전 스냅샷
//!
//! 트레이트의 각 메서드는 독립적인 호출입니다. 트랜잭션은 `update_schema_options`
//! 한 호출 안에서만 사용하고, 여러 호출에 걸쳐 열지 않습니다.

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::{DocumentStore, ItemFilter, StoreError};
use crate::models::{
    Attachment, CategoryOption, CollectionSchema, Field, FieldKind, FieldSchema, ItemFields,
    ItemRecord, NewSnapshot, VersionSnapshot,
};

/// `SqlitePool`은 내부적으로 Arc를 사용하므로 clone해도 같은 풀을 공유합니다.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

/// `items` 테이블 한 행
#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: String,
    title: Option<String>,
    content: Option<String>,
    formatted: Option<String>,
    category: Option<String>,
    folder: Option<String>,
    tags: Option<String>,
    created: Option<String>,
    last_used: Option<String>,
    use_count: Option<i64>,
    attachments: Option<String>,
    sort_order: Option<i64>,
    version_count: Option<i64>,
    last_modified: Option<String>,
}

impl TryFrom<ItemRow> for ItemRecord {
    type Error = StoreError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        // JSON 문자열 컬럼 → Vec. NULL이면 None
        let tags = row
            .tags
            .as_deref()
            .map(serde_json::from_str::<Vec<String>>)
            .transpose()?;
        let attachments = row
            .attachments
            .as_deref()
            .map(serde_json::from_str::<Vec<Attachment>>)
            .transpose()?;

        Ok(ItemRecord {
            id: row.id,
            fields: ItemFields {
                title: row.title,
                content: row.content,
                formatted: row.formatted,
                category: row.category,
                folder: row.folder.map(Some),
                tags,
                created: row.created,
                last_used: row.last_used,
                use_count: row.use_count,
                attachments,
                sort_order: row.sort_order,
                version_count: row.version_count,
                last_modified: row.last_modified,
            },
        })
    }
}

const ITEM_COLUMNS: &str = "id, title, content, formatted, category, folder, tags, created, \
     last_used, use_count, attachments, sort_order, version_count, last_modified";

/// 필터에 쓸 수 있는 텍스트 필드 → 컬럼 이름
fn text_column(field: Field) -> Option<&'static str> {
    match field {
        Field::Title => Some("title"),
        Field::Content => Some("content"),
        Field::Formatted => Some("formatted"),
        Field::Category => Some("category"),
        Field::Folder => Some("folder"),
        Field::Created => Some("created"),
        Field::LastUsed => Some("last_used"),
        Field::LastModified => Some("last_modified"),
        _ => None,
    }
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 컬렉션이 없으면 만들고, 스키마에 선언된 필드 중 빠진 것을 추가합니다.
    ///
    /// 선택형 필드의 옵션은 해당 필드에 옵션이 하나도 없을 때만 채웁니다.
    /// 이미 운영 중인 컬렉션의 카테고리 목록은 건드리지 않습니다.
    pub async fn ensure_collection(
        &self,
        name: &str,
        schema: &CollectionSchema,
    ) -> Result<(), StoreError> {
        sqlx::query("INSERT OR IGNORE INTO collections (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        for (field_name, field) in &schema.fields {
            sqlx::query("INSERT OR IGNORE INTO schema_fields (collection, name, kind) VALUES (?, ?, ?)")
                .bind(name)
                .bind(field_name)
                .bind(field.kind.as_str())
                .execute(&self.pool)
                .await?;

            if field.options.is_empty() {
                continue;
            }

            let existing: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM schema_options WHERE collection = ? AND field = ?",
            )
            .bind(name)
            .bind(field_name)
            .fetch_one(&self.pool)
            .await?;

            if existing == 0 {
                for (position, option) in field.options.iter().enumerate() {
                    sqlx::query(
                        "INSERT INTO schema_options (collection, field, position, name, color) VALUES (?, ?, ?, ?, ?)",
                    )
                    .bind(name)
                    .bind(field_name)
                    .bind(position as i64)
                    .bind(&option.name)
                    .bind(&option.color)
                    .execute(&self.pool)
                    .await?;
                }
            }
        }

        tracing::debug!(collection = name, "collection schema ensured");
        Ok(())
    }

    /// 히스토리 컬렉션을 등록합니다. 스냅샷은 고정된 테이블에 저장되므로 스키마는 없습니다.
    pub async fn ensure_history(&self, name: &str) -> Result<(), StoreError> {
        sqlx::query("INSERT OR IGNORE INTO collections (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn require_collection(&self, name: &str) -> Result<(), StoreError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM collections WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        match found {
            Some(_) => Ok(()),
            None => Err(StoreError::CollectionNotFound(name.to_string())),
        }
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn retrieve_schema(&self, collection: &str) -> Result<CollectionSchema, StoreError> {
        self.require_collection(collection).await?;

        let fields: Vec<(String, String)> =
            sqlx::query_as("SELECT name, kind FROM schema_fields WHERE collection = ?")
                .bind(collection)
                .fetch_all(&self.pool)
                .await?;

        let mut schema = CollectionSchema::default();
        for (name, kind) in fields {
            match FieldKind::parse(&kind) {
                Some(kind) => {
                    schema.fields.insert(name, FieldSchema::new(kind));
                }
                None => tracing::warn!(collection, field = %name, kind = %kind, "unknown field kind, skipping"),
            }
        }

        let options: Vec<(String, String, String)> = sqlx::query_as(
            r#"
            SELECT field, name, color
            FROM schema_options
            WHERE collection = ?
            ORDER BY field, position
            "#,
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        for (field, name, color) in options {
            if let Some(schema_field) = schema.fields.get_mut(&field) {
                schema_field.options.push(CategoryOption { name, color });
            }
        }

        Ok(schema)
    }

    async fn query_items(
        &self,
        collection: &str,
        filter: Option<&ItemFilter>,
    ) -> Result<Vec<ItemRecord>, StoreError> {
        self.require_collection(collection).await?;

        let mut query = QueryBuilder::<Sqlite>::new("SELECT ");
        query.push(ITEM_COLUMNS);
        query.push(" FROM items WHERE collection = ");
        query.push_bind(collection);

        if let Some(ItemFilter::Equals(field, value)) = filter {
            let column = text_column(*field).ok_or_else(|| StoreError::InvalidField {
                collection: collection.to_string(),
                field: field.property().to_string(),
            })?;
            query.push(" AND ");
            query.push(column);
            query.push(" = ");
            query.push_bind(value.as_str());
        }

        // rowid는 삽입 순서대로 증가합니다
        query.push(" ORDER BY rowid");

        let rows = query
            .build_query_as::<ItemRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ItemRecord::try_from).collect()
    }

    async fn get_item(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<ItemRecord>, StoreError> {
        self.require_collection(collection).await?;

        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE collection = ? AND id = ?");
        let row = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ItemRecord::try_from).transpose()
    }

    async fn create_item(
        &self,
        collection: &str,
        fields: &ItemFields,
    ) -> Result<String, StoreError> {
        self.require_collection(collection).await?;

        let id = uuid::Uuid::now_v7().to_string();
        let tags = fields.tags.as_ref().map(serde_json::to_string).transpose()?;
        let attachments = fields
            .attachments
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO items (
                id, collection, title, content, formatted, category, folder, tags, created,
                last_used, use_count, attachments, sort_order, version_count, last_modified
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(collection)
        .bind(&fields.title)
        .bind(&fields.content)
        .bind(&fields.formatted)
        .bind(&fields.category)
        .bind(fields.folder.clone().flatten())
        .bind(tags)
        .bind(&fields.created)
        .bind(&fields.last_used)
        .bind(fields.use_count)
        .bind(attachments)
        .bind(fields.sort_order)
        .bind(fields.version_count)
        .bind(&fields.last_modified)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update_item(
        &self,
        collection: &str,
        id: &str,
        fields: &ItemFields,
    ) -> Result<(), StoreError> {
        self.require_collection(collection).await?;

        // 바인딩할 JSON 문자열은 쿼리 빌더보다 오래 살아 있어야 합니다
        let tags = fields.tags.as_ref().map(serde_json::to_string).transpose()?;
        let attachments = fields
            .attachments
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        // ── 동적 쿼리 구성 ──
        // Some인 필드만 SET 절에 포함합니다.
        let mut query = QueryBuilder::<Sqlite>::new("UPDATE items SET ");
        let mut assigned = 0;
        {
            let mut set = query.separated(", ");
            if let Some(title) = &fields.title {
                set.push("title = ").push_bind_unseparated(title.as_str());
                assigned += 1;
            }
            if let Some(content) = &fields.content {
                set.push("content = ").push_bind_unseparated(content.as_str());
                assigned += 1;
            }
            if let Some(formatted) = &fields.formatted {
                set.push("formatted = ").push_bind_unseparated(formatted.as_str());
                assigned += 1;
            }
            if let Some(category) = &fields.category {
                set.push("category = ").push_bind_unseparated(category.as_str());
                assigned += 1;
            }
            if let Some(folder) = &fields.folder {
                // Some(None)은 NULL로 폴더를 비웁니다
                set.push("folder = ").push_bind_unseparated(folder.as_deref());
                assigned += 1;
            }
            if let Some(tags) = &tags {
                set.push("tags = ").push_bind_unseparated(tags.as_str());
                assigned += 1;
            }
            if let Some(created) = &fields.created {
                set.push("created = ").push_bind_unseparated(created.as_str());
                assigned += 1;
            }
            if let Some(last_used) = &fields.last_used {
                set.push("last_used = ").push_bind_unseparated(last_used.as_str());
                assigned += 1;
            }
            if let Some(use_count) = fields.use_count {
                set.push("use_count = ").push_bind_unseparated(use_count);
                assigned += 1;
            }
            if let Some(attachments) = &attachments {
                set.push("attachments = ").push_bind_unseparated(attachments.as_str());
                assigned += 1;
            }
            if let Some(sort_order) = fields.sort_order {
                set.push("sort_order = ").push_bind_unseparated(sort_order);
                assigned += 1;
            }
            if let Some(version_count) = fields.version_count {
                set.push("version_count = ").push_bind_unseparated(version_count);
                assigned += 1;
            }
            if let Some(last_modified) = &fields.last_modified {
                set.push("last_modified = ").push_bind_unseparated(last_modified.as_str());
                assigned += 1;
            }
        }

        // 바꿀 필드가 없으면 존재 여부만 확인합니다
        if assigned == 0 {
            return match self.get_item(collection, id).await? {
                Some(_) => Ok(()),
                None => Err(StoreError::ItemNotFound(id.to_string())),
            };
        }

        query.push(" WHERE collection = ");
        query.push_bind(collection);
        query.push(" AND id = ");
        query.push_bind(id);

        let result = query.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::ItemNotFound(id.to_string()));
        }

        Ok(())
    }

    async fn update_schema_options(
        &self,
        collection: &str,
        field: &str,
        options: &[CategoryOption],
    ) -> Result<(), StoreError> {
        self.require_collection(collection).await?;

        let kind: Option<String> =
            sqlx::query_scalar("SELECT kind FROM schema_fields WHERE collection = ? AND name = ?")
                .bind(collection)
                .bind(field)
                .fetch_optional(&self.pool)
                .await?;

        let selectable = matches!(
            kind.as_deref().and_then(FieldKind::parse),
            Some(FieldKind::Select | FieldKind::MultiSelect)
        );
        if !selectable {
            return Err(StoreError::InvalidField {
                collection: collection.to_string(),
                field: field.to_string(),
            });
        }

        // 삭제 + 재삽입
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM schema_options WHERE collection = ? AND field = ?")
            .bind(collection)
            .bind(field)
            .execute(&mut *tx)
            .await?;

        for (position, option) in options.iter().enumerate() {
            sqlx::query(
                "INSERT INTO schema_options (collection, field, position, name, color) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(collection)
            .bind(field)
            .bind(position as i64)
            .bind(&option.name)
            .bind(&option.color)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn create_snapshot(
        &self,
        history: &str,
        snapshot: &NewSnapshot,
    ) -> Result<String, StoreError> {
        self.require_collection(history).await?;

        let id = uuid::Uuid::now_v7().to_string();
        sqlx::query(
            r#"
            INSERT INTO snapshots (
                id, collection, content_id, version_number, title, content,
                formatted_content, created_at, change_note
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(history)
        .bind(&snapshot.content_id)
        .bind(snapshot.version_number)
        .bind(&snapshot.title)
        .bind(&snapshot.content)
        .bind(&snapshot.formatted_content)
        .bind(&snapshot.created_at)
        .bind(&snapshot.change_note)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn query_snapshots(
        &self,
        history: &str,
        content_id: &str,
        version_number: Option<i64>,
    ) -> Result<Vec<VersionSnapshot>, StoreError> {
        self.require_collection(history).await?;

        let snapshots = sqlx::query_as::<_, VersionSnapshot>(
            r#"
            SELECT id, content_id, version_number, title, content, formatted_content,
                   created_at, change_note
            FROM snapshots
            WHERE collection = ? AND content_id = ?
            AND (? IS NULL OR version_number = ?)
            "#,
        )
        .bind(history)
        .bind(content_id)
        .bind(version_number)
        .bind(version_number)
        .fetch_all(&self.pool)
        .await?;

        Ok(snapshots)
    }
}
