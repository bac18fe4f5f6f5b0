//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! 각 하위 모듈은 특정 도메인의 데이터 타입을 담당합니다:
//! - `category`: 카테고리 옵션과 카테고리 요청/결과
//! - `content`: 콘텐츠 항목, 저장소 레코드, 콘텐츠 요청
//! - `schema`: 컬렉션 스키마와 필드 존재 집합(Capabilities)
//! - `version`: 버전 스냅샷과 히스토리 요청
//!
//! `pub use X::*;`로 하위 모듈의 공개 항목을 재공개(re-export)하여
//! `crate::models::ContentItem`처럼 짧게 접근할 수 있게 합니다.

pub mod category;
pub mod content;
pub mod schema;
pub mod version;

pub use category::*;
pub use content::*;
pub use schema::*;
pub use version::*;
