//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로. `memory`이면 메모리 저장소 사용
//! - `CONTENTS_COLLECTION`: 콘텐츠 컬렉션 이름 (기본값: `contents`)
//! - `PROMPTS_COLLECTION`: 프롬프트 컬렉션 이름 (기본값: `prompts`)
//! - `HISTORY_COLLECTION`: 히스토리 컬렉션 이름. 비어 있으면 히스토리 기능 꺼짐
//! - `OLLAMA_TUNNEL_URL`: 클라이언트에 전달할 터널 URL
//! - `HOST`: 서버 바인딩 주소
//! - `PORT`: 서버 포트 번호

use std::env;

/// 메모리 저장소를 고르는 `DATABASE_URL` 값
pub const MEMORY_DATABASE: &str = "memory";

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후,
/// 애플리케이션 전체에서 공유됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 경로 (예: "sqlite:data/libris.db?mode=rwc")
    pub database_url: String,
    pub contents_collection: String,
    pub prompts_collection: String,
    /// `None`이면 스냅샷을 남기지 않고, 복원 요청은 400으로 거부됩니다.
    pub history_collection: Option<String>,
    pub ollama_tunnel_url: Option<String>,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 3000)
    pub port: u16,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`은 필수이며, 없으면 에러가 발생합니다.
    /// 나머지 설정은 기본값이 있어 환경변수가 없어도 동작합니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?, // 필수: 없으면 에러
            contents_collection: env::var("CONTENTS_COLLECTION")
                .unwrap_or_else(|_| "contents".to_string()),
            prompts_collection: env::var("PROMPTS_COLLECTION")
                .unwrap_or_else(|_| "prompts".to_string()),
            history_collection: optional("HISTORY_COLLECTION"),
            ollama_tunnel_url: optional("OLLAMA_TUNNEL_URL"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000), // 파싱 실패 시 기본값
        })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_DATABASE
    }
}

/// 값이 없거나 공백뿐이면 `None`
fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
