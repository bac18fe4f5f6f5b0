use serde::{Deserialize, Serialize};

/// 변경 직전 항목의 제목/본문/서식 본문 전체 사본
///
/// `version_number`는 이 스냅샷을 만든 변경이 일어나기 **전**의
/// `versionCount` 값입니다. 한 번 만들어지면 수정되거나 삭제되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VersionSnapshot {
    pub id: String,
    pub content_id: String,
    pub version_number: i64,
    pub title: String,
    pub content: String,
    pub formatted_content: String,
    pub created_at: String,
    pub change_note: Option<String>,
}

/// 저장소에 추가할 스냅샷 (id는 저장소가 부여)
#[derive(Debug, Clone, PartialEq)]
pub struct NewSnapshot {
    pub content_id: String,
    pub version_number: i64,
    pub title: String,
    pub content: String,
    pub formatted_content: String,
    pub created_at: String,
    pub change_note: Option<String>,
}

impl NewSnapshot {
    pub fn into_snapshot(self, id: String) -> VersionSnapshot {
        VersionSnapshot {
            id,
            content_id: self.content_id,
            version_number: self.version_number,
            title: self.title,
            content: self.content,
            formatted_content: self.formatted_content,
            created_at: self.created_at,
            change_note: self.change_note,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub content_id: Option<String>,
}

/// `POST /api/history` 본문
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreRequest {
    pub content_id: Option<String>,
    pub version_number: Option<i64>,
}
