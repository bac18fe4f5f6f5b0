//! # 콘텐츠 항목 모델
//!
//! 저장소에서 읽어 온 원시 레코드(`ItemRecord`)와 API로 내보내는 완성된
//! 항목(`ContentItem`)을 구분합니다. 저장소의 레코드는 스키마에 없는 필드를
//! 가질 수 없으므로 모든 필드가 `Option`이고, `ContentItem`은 빠진 값을
//! 기본값으로 채운 모습입니다.

use serde::{Deserialize, Deserializer, Serialize};

use super::schema::{Capabilities, Field};

/// 고아가 된 항목이 옮겨 가는, 삭제/이름변경이 불가능한 카테고리
pub const DEFAULT_CATEGORY: &str = "General";

/// `SortOrder`가 없는 항목의 정렬 값. 목록의 맨 뒤로 갑니다.
pub const DEFAULT_SORT_ORDER: i64 = 9999;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub url: String,
}

/// 저장소에 쓰거나 읽는 필드 묶음
///
/// `None`은 "이 필드를 건드리지 않음"(쓰기) 또는 "값 없음"(읽기)을 뜻합니다.
/// `folder`만 이중 `Option`입니다: `Some(None)`은 폴더를 비우라는 의미입니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemFields {
    pub title: Option<String>,
    pub content: Option<String>,
    pub formatted: Option<String>,
    pub category: Option<String>,
    pub folder: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub created: Option<String>,
    pub last_used: Option<String>,
    pub use_count: Option<i64>,
    pub attachments: Option<Vec<Attachment>>,
    pub sort_order: Option<i64>,
    pub version_count: Option<i64>,
    pub last_modified: Option<String>,
}

impl ItemFields {
    /// 스키마에 없는 필드를 모두 `None`으로 지웁니다.
    ///
    /// 저장소에 쓰기 직전에 항상 거쳐야 합니다.
    pub fn masked(mut self, caps: &Capabilities) -> Self {
        if !caps.has(Field::Title) {
            self.title = None;
        }
        if !caps.has(Field::Content) {
            self.content = None;
        }
        if !caps.has(Field::Formatted) {
            self.formatted = None;
        }
        if !caps.has(Field::Category) {
            self.category = None;
        }
        if !caps.has(Field::Folder) {
            self.folder = None;
        }
        if !caps.has(Field::Tags) {
            self.tags = None;
        }
        if !caps.has(Field::Created) {
            self.created = None;
        }
        if !caps.has(Field::LastUsed) {
            self.last_used = None;
        }
        if !caps.has(Field::UseCount) {
            self.use_count = None;
        }
        if !caps.has(Field::Attachments) {
            self.attachments = None;
        }
        if !caps.has(Field::SortOrder) {
            self.sort_order = None;
        }
        if !caps.has(Field::VersionCount) {
            self.version_count = None;
        }
        if !caps.has(Field::LastModified) {
            self.last_modified = None;
        }
        self
    }

    /// 텍스트형 필드의 현재 값. 필터의 정확 일치 비교에 사용합니다.
    pub fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::Title => self.title.as_deref(),
            Field::Content => self.content.as_deref(),
            Field::Formatted => self.formatted.as_deref(),
            Field::Category => self.category.as_deref(),
            Field::Folder => self.folder.as_ref().and_then(|f| f.as_deref()),
            Field::Created => self.created.as_deref(),
            Field::LastUsed => self.last_used.as_deref(),
            Field::LastModified => self.last_modified.as_deref(),
            _ => None,
        }
    }

    /// 새 값으로 덮어씁니다. `other`에서 `Some`인 필드만 반영됩니다.
    pub fn merge(&mut self, other: &ItemFields) {
        macro_rules! take {
            ($($name:ident),*) => {
                $(if other.$name.is_some() {
                    self.$name = other.$name.clone();
                })*
            };
        }
        take!(
            title,
            content,
            formatted,
            category,
            folder,
            tags,
            created,
            last_used,
            use_count,
            attachments,
            sort_order,
            version_count,
            last_modified
        );
    }
}

/// 저장소가 돌려주는 원시 레코드
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    pub id: String,
    pub fields: ItemFields,
}

/// API로 내보내는 콘텐츠 항목
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub formatted_content: String,
    pub category: String,
    pub folder: String,
    pub tags: Vec<String>,
    pub date_created: String,
    pub last_used: String,
    pub use_count: i64,
    pub attachments: Vec<Attachment>,
    pub sort_order: i64,
    pub version_count: i64,
    pub last_modified: String,
}

impl ContentItem {
    /// 레코드를 스키마 기준으로 해석합니다.
    ///
    /// 스키마에 없는 필드는 기본값이 됩니다. `Category` 필드 자체가 없으면
    /// 모든 항목이 "General"에 속한 것으로 봅니다.
    pub fn from_record(record: ItemRecord, caps: &Capabilities) -> Self {
        let ItemRecord { id, fields: f } = record;
        let text = |field: Field, value: Option<String>| {
            if caps.has(field) {
                value.unwrap_or_default()
            } else {
                String::new()
            }
        };

        Self {
            title: text(Field::Title, f.title),
            content: text(Field::Content, f.content),
            formatted_content: text(Field::Formatted, f.formatted),
            category: if caps.has(Field::Category) {
                f.category.unwrap_or_default()
            } else {
                DEFAULT_CATEGORY.to_string()
            },
            folder: text(Field::Folder, f.folder.flatten()),
            tags: f.tags.filter(|_| caps.has(Field::Tags)).unwrap_or_default(),
            date_created: text(Field::Created, f.created),
            last_used: text(Field::LastUsed, f.last_used),
            use_count: f
                .use_count
                .filter(|_| caps.has(Field::UseCount))
                .unwrap_or(0),
            attachments: f
                .attachments
                .filter(|_| caps.has(Field::Attachments))
                .unwrap_or_default(),
            sort_order: f
                .sort_order
                .filter(|_| caps.has(Field::SortOrder))
                .unwrap_or(DEFAULT_SORT_ORDER),
            version_count: f
                .version_count
                .filter(|_| caps.has(Field::VersionCount))
                .unwrap_or(0),
            last_modified: text(Field::LastModified, f.last_modified),
            id,
        }
    }
}

/// 클라이언트가 보내는 첨부파일. 이름이나 URL이 빠질 수 있습니다.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttachmentInput {
    pub name: Option<String>,
    pub url: Option<String>,
}

/// URL이 없는 첨부파일은 버리고, 이름이 없으면 "attachment"를 붙입니다.
pub fn normalize_attachments(inputs: &[AttachmentInput]) -> Vec<Attachment> {
    inputs
        .iter()
        .filter_map(|a| {
            let url = a.url.as_deref().filter(|u| !u.is_empty())?;
            let name = a
                .name
                .as_deref()
                .filter(|n| !n.is_empty())
                .unwrap_or("attachment");
            Some(Attachment {
                name: name.to_string(),
                url: url.to_string(),
            })
        })
        .collect()
}

/// 태그는 집합이므로 처음 나온 순서를 유지하며 중복을 제거합니다.
pub fn dedup_tags(tags: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.iter()
        .filter(|t| seen.insert(t.as_str()))
        .cloned()
        .collect()
}

/// `POST /api/contents` 본문
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateContentRequest {
    pub title: String,
    pub content: String,
    pub formatted_content: String,
    pub category: Option<String>,
    pub folder: String,
    pub tags: Vec<String>,
    pub date_created: Option<String>,
    pub use_count: Option<i64>,
    pub attachments: Vec<AttachmentInput>,
}

/// `PUT /api/contents` 본문
///
/// 빠진 필드는 변경하지 않습니다.
/// `folder`: 누락 = 변경 안 함, `null` 또는 `""` = 폴더 비우기, 문자열 = 폴더 지정
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContentRequest {
    pub id: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub formatted_content: Option<String>,
    pub category: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub folder: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub attachments: Option<Vec<AttachmentInput>>,
    #[serde(default)]
    pub skip_history: bool,
}

impl UpdateContentRequest {
    /// 요청을 저장소 쓰기용 필드 묶음으로 바꿉니다. 빈 카테고리는 무시합니다.
    pub fn to_fields(&self) -> ItemFields {
        ItemFields {
            title: self.title.clone(),
            content: self.content.clone(),
            formatted: self.formatted_content.clone(),
            category: self.category.clone().filter(|c| !c.is_empty()),
            folder: self
                .folder
                .as_ref()
                .map(|f| f.clone().filter(|name| !name.is_empty())),
            tags: self.tags.as_deref().map(dedup_tags),
            attachments: self.attachments.as_deref().map(normalize_attachments),
            ..ItemFields::default()
        }
    }
}

/// `null`을 `Some(None)`으로 받기 위한 역직렬화 함수
///
/// 필드가 아예 없으면 `#[serde(default)]`에 의해 `None`이 됩니다.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// `?action=reorder` 쿼리
#[derive(Debug, Default, Deserialize)]
pub struct ContentsQuery {
    pub action: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderEntry {
    pub id: String,
    pub sort_order: i64,
}

/// `PUT /api/contents?action=reorder` 본문
#[derive(Debug, Default, Deserialize)]
pub struct ReorderRequest {
    #[serde(default)]
    pub items: Vec<ReorderEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schema::{CollectionSchema, FieldKind, FieldSchema};

    fn record(fields: ItemFields) -> ItemRecord {
        ItemRecord {
            id: "item-1".to_string(),
            fields,
        }
    }

    #[test]
    fn missing_category_field_reads_as_general() {
        let mut schema = CollectionSchema::default();
        schema
            .fields
            .insert("Title".to_string(), FieldSchema::new(FieldKind::Title));
        let caps = Capabilities::from_schema(&schema);

        let item = ContentItem::from_record(
            record(ItemFields {
                title: Some("Hello".to_string()),
                category: Some("Leads".to_string()),
                ..ItemFields::default()
            }),
            &caps,
        );

        assert_eq!(item.title, "Hello");
        assert_eq!(item.category, "General");
        assert_eq!(item.sort_order, DEFAULT_SORT_ORDER);
        assert_eq!(item.version_count, 0);
    }

    #[test]
    fn masked_drops_undeclared_fields() {
        let caps: Capabilities = [Field::Title, Field::Content].into_iter().collect();
        let fields = ItemFields {
            title: Some("t".to_string()),
            content: Some("c".to_string()),
            formatted: Some("f".to_string()),
            version_count: Some(3),
            ..ItemFields::default()
        }
        .masked(&caps);

        assert_eq!(fields.title.as_deref(), Some("t"));
        assert_eq!(fields.content.as_deref(), Some("c"));
        assert!(fields.formatted.is_none());
        assert!(fields.version_count.is_none());
    }

    #[test]
    fn update_request_distinguishes_missing_and_null_folder() {
        let missing: UpdateContentRequest = serde_json::from_str(r#"{"id":"a"}"#).unwrap();
        assert_eq!(missing.to_fields().folder, None);

        let null: UpdateContentRequest =
            serde_json::from_str(r#"{"id":"a","folder":null}"#).unwrap();
        assert_eq!(null.to_fields().folder, Some(None));

        let empty: UpdateContentRequest =
            serde_json::from_str(r#"{"id":"a","folder":""}"#).unwrap();
        assert_eq!(empty.to_fields().folder, Some(None));

        let named: UpdateContentRequest =
            serde_json::from_str(r#"{"id":"a","folder":"Work","skipHistory":true}"#).unwrap();
        assert_eq!(named.to_fields().folder, Some(Some("Work".to_string())));
        assert!(named.skip_history);
    }

    #[test]
    fn update_request_ignores_empty_category() {
        let req: UpdateContentRequest =
            serde_json::from_str(r#"{"id":"a","category":""}"#).unwrap();
        assert_eq!(req.to_fields().category, None);
    }

    #[test]
    fn attachments_without_url_are_dropped() {
        let inputs = vec![
            AttachmentInput {
                name: None,
                url: Some("https://example.com/a.png".to_string()),
            },
            AttachmentInput {
                name: Some("no-url".to_string()),
                url: None,
            },
        ];
        let attachments = normalize_attachments(&inputs);
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].name, "attachment");
    }

    #[test]
    fn merge_overwrites_only_present_fields() {
        let mut base = ItemFields {
            title: Some("old".to_string()),
            content: Some("body".to_string()),
            ..ItemFields::default()
        };
        base.merge(&ItemFields {
            title: Some("new".to_string()),
            folder: Some(None),
            ..ItemFields::default()
        });
        assert_eq!(base.title.as_deref(), Some("new"));
        assert_eq!(base.content.as_deref(), Some("body"));
        assert_eq!(base.folder, Some(None));
    }
}
