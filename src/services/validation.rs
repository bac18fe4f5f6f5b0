//! 카테고리 이름 검증
//!
//! 검증은 저장소를 호출하기 전에 끝나야 합니다.

use crate::error::AppError;
use crate::models::{CategoryOption, DEFAULT_CATEGORY, MAX_CATEGORY_NAME_LEN};

/// 입력을 다듬습니다. 없으면 빈 문자열입니다.
pub fn trimmed(raw: Option<&str>) -> String {
    raw.unwrap_or_default().trim().to_string()
}

/// 길이 제한은 바이트가 아닌 문자 수로 셉니다.
pub fn check_name_length(name: &str) -> Result<(), AppError> {
    if name.chars().count() > MAX_CATEGORY_NAME_LEN {
        return Err(AppError::Validation(format!(
            "Category name too long (max {MAX_CATEGORY_NAME_LEN} characters)"
        )));
    }
    Ok(())
}

/// 대소문자를 무시한 이름 비교
pub fn same_label(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// "General"은 이름을 바꾸거나 삭제할 수 없습니다.
pub fn is_protected(name: &str) -> bool {
    name == DEFAULT_CATEGORY
}

/// `except`를 제외한 옵션 중 대소문자 무시로 같은 이름이 있는지
pub fn find_duplicate<'a>(
    options: &'a [CategoryOption],
    name: &str,
    except: Option<&str>,
) -> Option<&'a CategoryOption> {
    options
        .iter()
        .filter(|opt| except.map_or(true, |skip| opt.name != skip))
        .find(|opt| same_label(&opt.name, name))
}
