//! # 컬렉션 스키마 모델
//!
//! 문서 저장소는 컬렉션마다 "어떤 필드가 있고, 각 필드가 어떤 타입인지"를
//! 스키마로 보관합니다. 선택형(select) 필드는 허용되는 옵션 목록도 함께 가집니다.
//! 카테고리 레지스트리는 바로 이 `Category` 필드의 옵션 목록입니다.
//!
//! ## 구조체 역할
//! - `FieldKind`: 필드 타입 (제목, 서식 텍스트, 선택, 다중 선택, 날짜, 숫자, 파일)
//! - `FieldSchema`: 필드 하나의 타입과 (선택형이면) 옵션 목록
//! - `CollectionSchema`: 필드 이름 → `FieldSchema` 맵
//! - `Field`: 이 시스템이 읽고 쓰는 알려진 필드들
//! - `Capabilities`: 스키마에 실제로 존재하는 `Field` 집합
//!
//! `Capabilities`는 작업마다 스키마 조회 결과로 **한 번** 계산되어
//! 필드 매핑 코드에 인자로 전달됩니다. 필드 존재 여부를 여기저기서
//! 따로 검사하지 않기 위한 구조입니다.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::category::CategoryOption;
use super::content::DEFAULT_CATEGORY;

/// 스키마 필드의 타입
///
/// 저장소에 문자열로 저장되므로 `as_str()` / `parse()`로 상호 변환합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Title,
    RichText,
    Select,
    MultiSelect,
    Date,
    Number,
    Files,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Title => "title",
            FieldKind::RichText => "rich_text",
            FieldKind::Select => "select",
            FieldKind::MultiSelect => "multi_select",
            FieldKind::Date => "date",
            FieldKind::Number => "number",
            FieldKind::Files => "files",
        }
    }

    /// 저장된 문자열을 `FieldKind`로 변환합니다. 모르는 값이면 `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "title" => Some(FieldKind::Title),
            "rich_text" => Some(FieldKind::RichText),
            "select" => Some(FieldKind::Select),
            "multi_select" => Some(FieldKind::MultiSelect),
            "date" => Some(FieldKind::Date),
            "number" => Some(FieldKind::Number),
            "files" => Some(FieldKind::Files),
            _ => None,
        }
    }
}

/// 필드 하나의 스키마 정의
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub kind: FieldKind,
    /// 선택형(select / multi_select) 필드의 옵션 목록. 다른 타입이면 비어 있습니다.
    #[serde(default)]
    pub options: Vec<CategoryOption>,
}

impl FieldSchema {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            options: Vec::new(),
        }
    }
}

/// 컬렉션 하나의 전체 스키마
///
/// `BTreeMap`을 사용해 필드 순서가 항상 이름순으로 고정됩니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionSchema {
    pub fields: BTreeMap<String, FieldSchema>,
}

impl CollectionSchema {
    /// 새로 만든 컬렉션에 선언하는 표준 필드 구성입니다.
    ///
    /// `Category` 필드에는 항상 존재해야 하는 "General" 옵션이 들어갑니다.
    pub fn standard() -> Self {
        let mut fields = BTreeMap::new();
        for field in Field::ALL {
            let mut schema = FieldSchema::new(field.kind());
            if field == Field::Category {
                schema.options.push(CategoryOption::new(DEFAULT_CATEGORY));
            }
            fields.insert(field.property().to_string(), schema);
        }
        Self { fields }
    }

    /// 선택형 필드의 옵션 목록을 반환합니다.
    ///
    /// 필드가 없거나 `select` 타입이 아니면 `None`입니다.
    /// 카테고리 레지스트리는 `None`을 "카테고리 기능 없음"으로 취급합니다.
    pub fn select_options(&self, name: &str) -> Option<&[CategoryOption]> {
        self.fields
            .get(name)
            .filter(|f| f.kind == FieldKind::Select)
            .map(|f| f.options.as_slice())
    }
}

/// 이 시스템이 알고 있는 콘텐츠 필드
///
/// 각 변형(variant)은 저장소 스키마의 프로퍼티 이름과 1:1로 대응합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Title,
    Content,
    Formatted,
    Category,
    Folder,
    Tags,
    Created,
    LastUsed,
    UseCount,
    Attachments,
    SortOrder,
    VersionCount,
    LastModified,
}

impl Field {
    pub const ALL: [Field; 13] = [
        Field::Title,
        Field::Content,
        Field::Formatted,
        Field::Category,
        Field::Folder,
        Field::Tags,
        Field::Created,
        Field::LastUsed,
        Field::UseCount,
        Field::Attachments,
        Field::SortOrder,
        Field::VersionCount,
        Field::LastModified,
    ];

    /// 저장소 스키마에서 쓰는 프로퍼티 이름
    pub fn property(&self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Content => "Content",
            Field::Formatted => "Formatted",
            Field::Category => "Category",
            Field::Folder => "Folder",
            Field::Tags => "Tags",
            Field::Created => "Created",
            Field::LastUsed => "LastUsed",
            Field::UseCount => "UseCount",
            Field::Attachments => "Attachments",
            Field::SortOrder => "SortOrder",
            Field::VersionCount => "VersionCount",
            Field::LastModified => "LastModified",
        }
    }

    /// 표준 스키마에서 이 필드가 갖는 타입
    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Title => FieldKind::Title,
            Field::Content | Field::Formatted => FieldKind::RichText,
            Field::Category | Field::Folder => FieldKind::Select,
            Field::Tags => FieldKind::MultiSelect,
            Field::Created | Field::LastUsed | Field::LastModified => FieldKind::Date,
            Field::UseCount | Field::SortOrder | Field::VersionCount => FieldKind::Number,
            Field::Attachments => FieldKind::Files,
        }
    }
}

/// 스키마에 존재하는 필드 집합
///
/// 작업 시작 시 `Capabilities::from_schema()`로 한 번 계산하고,
/// 읽기(`ContentItem::from_record`)와 쓰기(`ItemFields::masked`) 양쪽에 넘깁니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    fields: BTreeSet<Field>,
}

impl Capabilities {
    pub fn from_schema(schema: &CollectionSchema) -> Self {
        let fields = Field::ALL
            .into_iter()
            .filter(|f| schema.fields.contains_key(f.property()))
            .collect();
        Self { fields }
    }

    /// 모든 필드를 가진 집합. 표준 스키마와 같습니다.
    #[cfg(test)]
    pub fn all() -> Self {
        Self {
            fields: Field::ALL.into_iter().collect(),
        }
    }

    pub fn has(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }
}

impl FromIterator<Field> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
