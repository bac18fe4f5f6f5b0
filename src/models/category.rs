//! # 카테고리 모델 정의
//!
//! 카테고리는 컬렉션 스키마의 `Category` 선택형 필드에 등록된 옵션입니다.
//! 각 콘텐츠 항목은 카테고리를 외래키가 아닌 **문자열 값**으로 참조합니다.
//!
//! ## 구조체 역할
//! - `CategoryOption`: 스키마에 저장된 옵션 (이름 + 색상)
//! - `CategoryUsage`: 옵션 + 사용 횟수 (조회 시점에 전체 스캔으로 계산, 저장하지 않음)
//! - `DeleteOutcome`: 삭제 요청의 결과 (차단됨 / 삭제됨)
//! - `CollectionSelector`, `AddCategoryRequest`, `RenameCategoryRequest`,
//!   `DeleteCategoryRequest`: 클라이언트가 보내는 쿼리/본문

use serde::{Deserialize, Serialize};

/// 새 옵션에 붙는 기본 색상
pub const DEFAULT_COLOR: &str = "default";

/// 카테고리 이름의 최대 길이 (문자 수 기준)
pub const MAX_CATEGORY_NAME_LEN: usize = 100;

/// 스키마에 등록된 카테고리 옵션
///
/// `color`는 표시용 속성이라 로직에서는 해석하지 않고 그대로 보존합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOption {
    pub name: String,
    pub color: String,
}

impl CategoryOption {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: DEFAULT_COLOR.to_string(),
        }
    }
}

/// 카테고리 목록 응답의 한 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryUsage {
    pub name: String,
    pub color: String,
    /// 이 이름을 정확히(대소문자 구분) 가진 항목 수
    pub count: usize,
}

/// `delete` 호출의 결과
///
/// 사용 중인 카테고리를 `force` 없이 삭제하면 `Blocked`가 반환되고
/// 항목과 스키마 모두 변경되지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// 아무것도 변경하지 않음. 클라이언트는 `count`를 보여준 뒤 `force: true`로 다시 호출해야 합니다.
    Blocked { count: usize },
    /// 항목을 "General"로 옮기고 옵션을 제거함
    Deleted { migrated_count: usize },
}

/// 어느 컬렉션을 대상으로 할지 고르는 선택자 (`?db=prompts`)
#[derive(Debug, Default, Deserialize)]
pub struct CollectionSelector {
    pub db: Option<String>,
}

/// `POST /api/categories` 본문
#[derive(Debug, Default, Deserialize)]
pub struct AddCategoryRequest {
    pub name: Option<String>,
    pub db: Option<String>,
}

/// `PUT /api/categories` 본문
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameCategoryRequest {
    pub old_name: Option<String>,
    pub new_name: Option<String>,
    pub db: Option<String>,
}

/// `DELETE /api/categories` 본문
///
/// `force`가 빠지면 `false`로 취급되어 사용 개수 조회만 수행합니다.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteCategoryRequest {
    pub name: Option<String>,
    #[serde(default)]
    pub force: bool,
    pub db: Option<String>,
}
