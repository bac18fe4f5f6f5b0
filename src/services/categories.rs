//! # 카테고리 레지스트리
//!
//! 카테고리 목록은 컬렉션 스키마의 `Category` 선택형 필드 옵션으로 저장되고,
//! 각 항목은 카테고리를 문자열 값으로 가집니다. 두 곳을 어긋나지 않게 유지하는
//! 것이 이 모듈의 역할입니다.
//!
//! ## 작업 순서
//! - 이름 변경: 항목 마이그레이션 → 스키마 옵션 이름 변경.
//!   스키마 쓰기가 실패하면 항목이 스키마에 아직 없는 이름을 갖게 됩니다.
//!   항목은 외래키가 아닌 문자열로 참조하므로 이 상태에서도 항목은 정상 동작합니다.
//! - 삭제: 사용 개수 조회 → 사용 중이고 `force`가 아니면 차단 →
//!   항목을 "General"로 마이그레이션 → 스키마에서 옵션 제거.
//!
//! 사용 횟수는 저장하지 않고 매번 컬렉션 전체를 스캔해 셉니다 (항목 수에 비례하는 비용).
//! 캐시하지 않습니다.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::{
    CategoryOption, CategoryUsage, CollectionSchema, DeleteOutcome, Field, ItemFields,
    DEFAULT_CATEGORY,
};
use crate::store::{DocumentStore, ItemFilter};

use super::apply_all;
use super::validation::{check_name_length, find_duplicate, is_protected, trimmed};

/// 스키마에서 카테고리 옵션을 담는 필드 이름
const CATEGORY_FIELD: &str = "Category";

#[derive(Clone)]
pub struct CategoryRegistry {
    store: Arc<dyn DocumentStore>,
}

impl CategoryRegistry {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// 옵션 목록을 읽습니다. `Category` 필드가 없거나 선택형이 아니면 Validation 에러.
    async fn options(&self, collection: &str) -> Result<Vec<CategoryOption>, AppError> {
        let schema = self.store.retrieve_schema(collection).await?;
        category_options(&schema)
            .map(<[CategoryOption]>::to_vec)
            .ok_or_else(|| {
                AppError::Validation("Category property not found or invalid type".to_string())
            })
    }

    /// `name` 카테고리를 가진 모든 항목의 id
    async fn items_in(&self, collection: &str, name: &str) -> Result<Vec<String>, AppError> {
        let items = self
            .store
            .query_items(collection, Some(&ItemFilter::category(name)))
            .await?;
        Ok(items.into_iter().map(|item| item.id).collect())
    }

    /// 항목들의 카테고리를 `target`으로 바꿉니다. 동시에 실행하고 모두 기다립니다.
    async fn migrate(
        &self,
        collection: &str,
        ids: &[String],
        target: &str,
    ) -> Result<usize, AppError> {
        let patch = ItemFields {
            category: Some(target.to_string()),
            ..ItemFields::default()
        };
        let updates: Vec<_> = ids
            .iter()
            .map(|id| self.store.update_item(collection, id, &patch))
            .collect();
        apply_all(updates).await
    }

    /// 각 옵션과 사용 횟수를 반환합니다.
    ///
    /// 스캔은 한 번만 하고, 이름을 정확히(대소문자 구분) 비교합니다.
    pub async fn list(&self, collection: &str) -> Result<Vec<CategoryUsage>, AppError> {
        let schema = self.store.retrieve_schema(collection).await?;
        let Some(options) = category_options(&schema) else {
            return Ok(Vec::new());
        };

        let items = self.store.query_items(collection, None).await?;
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for item in &items {
            if let Some(name) = item.fields.text(Field::Category).filter(|n| !n.is_empty()) {
                *counts.entry(name).or_default() += 1;
            }
        }

        Ok(options
            .iter()
            .map(|opt| CategoryUsage {
                name: opt.name.clone(),
                color: opt.color.clone(),
                count: counts.get(opt.name.as_str()).copied().unwrap_or(0),
            })
            .collect())
    }

    /// 새 카테고리를 옵션 목록 끝에 추가합니다.
    pub async fn add(&self, collection: &str, raw_name: Option<&str>) -> Result<CategoryOption, AppError> {
        let name = trimmed(raw_name);
        if name.is_empty() {
            return Err(AppError::Validation("Category name is required".to_string()));
        }
        check_name_length(&name)?;

        let mut options = self.options(collection).await?;
        if find_duplicate(&options, &name, None).is_some() {
            return Err(AppError::Conflict("Category already exists".to_string()));
        }

        let option = CategoryOption::new(name);
        options.push(option.clone());
        self.store
            .update_schema_options(collection, CATEGORY_FIELD, &options)
            .await?;

        tracing::info!(collection, category = %option.name, "category added");
        Ok(option)
    }

    /// 카테고리 이름을 바꾸고, 마이그레이션한 항목 수를 반환합니다.
    pub async fn rename(
        &self,
        collection: &str,
        raw_old: Option<&str>,
        raw_new: Option<&str>,
    ) -> Result<usize, AppError> {
        // ── 1단계: 입력 검증 (저장소 호출 전) ──
        let old_name = trimmed(raw_old);
        let new_name = trimmed(raw_new);

        if old_name.is_empty() || new_name.is_empty() {
            return Err(AppError::Validation(
                "Both oldName and newName are required".to_string(),
            ));
        }
        if is_protected(&old_name) {
            return Err(AppError::Conflict(format!(
                "Cannot rename the default \"{DEFAULT_CATEGORY}\" category"
            )));
        }
        check_name_length(&new_name)?;

        // ── 2단계: 현재 옵션 조회와 중복 확인 ──
        // 자기 자신(old_name)과의 대소문자 차이는 중복으로 보지 않습니다.
        let options = self.options(collection).await?;
        if find_duplicate(&options, &new_name, Some(&old_name)).is_some() {
            return Err(AppError::Conflict(
                "A category with the new name already exists".to_string(),
            ));
        }
        if !options.iter().any(|opt| opt.name == old_name) {
            tracing::warn!(
                collection,
                category = %old_name,
                "renaming a category that is not in the schema, only items will change"
            );
        }

        // ── 3단계: 항목 마이그레이션 ──
        // 항목을 먼저 옮깁니다. 여기서 실패하면 스키마는 아직 옛 이름 그대로입니다.
        let ids = self.items_in(collection, &old_name).await?;
        let updated = self.migrate(collection, &ids, &new_name).await?;

        // ── 4단계: 스키마 옵션 이름 변경 (색상 유지) ──
        let renamed: Vec<CategoryOption> = options
            .into_iter()
            .map(|opt| {
                if opt.name == old_name {
                    CategoryOption {
                        name: new_name.clone(),
                        ..opt
                    }
                } else {
                    opt
                }
            })
            .collect();
        if let Err(err) = self
            .store
            .update_schema_options(collection, CATEGORY_FIELD, &renamed)
            .await
        {
            tracing::error!(
                collection,
                from = %old_name,
                to = %new_name,
                migrated = updated,
                error = %err,
                "items migrated but schema rename failed"
            );
            return Err(err.into());
        }

        tracing::info!(collection, from = %old_name, to = %new_name, updated, "category renamed");
        Ok(updated)
    }

    /// 카테고리를 삭제합니다.
    ///
    /// 사용 중(`count > 0`)이고 `force`가 `false`이면 아무것도 바꾸지 않고
    /// `Blocked { count }`를 반환합니다. 클라이언트는 개수를 보여준 뒤
    /// `force = true`로 다시 호출해야 합니다.
    pub async fn delete(
        &self,
        collection: &str,
        raw_name: Option<&str>,
        force: bool,
    ) -> Result<DeleteOutcome, AppError> {
        // ── 1단계: 입력 검증 ──
        let name = trimmed(raw_name);
        if name.is_empty() {
            return Err(AppError::Validation("Category name is required".to_string()));
        }
        if is_protected(&name) {
            return Err(AppError::Conflict(format!(
                "Cannot delete the default \"{DEFAULT_CATEGORY}\" category"
            )));
        }

        // ── 2단계: 옵션 존재 확인 ──
        let options = self.options(collection).await?;
        if !options.iter().any(|opt| opt.name == name) {
            return Err(AppError::NotFound("Category not found".to_string()));
        }

        // ── 3단계: 사용 개수 조회 ──
        // force가 없으면 여기서 끝나며 아무것도 바뀌지 않습니다.
        let ids = self.items_in(collection, &name).await?;
        if !ids.is_empty() && !force {
            tracing::debug!(collection, category = %name, count = ids.len(), "category delete blocked");
            return Ok(DeleteOutcome::Blocked { count: ids.len() });
        }

        // ── 4단계: 항목을 "General"로 마이그레이션 ──
        let migrated_count = self.migrate(collection, &ids, DEFAULT_CATEGORY).await?;

        // ── 5단계: 스키마에서 옵션 제거 ──
        // 마이그레이션이 실패했다면 이 단계에 오지 않으므로 옵션은 남아 있습니다.
        let remaining: Vec<CategoryOption> =
            options.into_iter().filter(|opt| opt.name != name).collect();
        self.store
            .update_schema_options(collection, CATEGORY_FIELD, &remaining)
            .await?;

        tracing::info!(collection, category = %name, migrated_count, "category deleted");
        Ok(DeleteOutcome::Deleted { migrated_count })
    }
}

fn category_options(schema: &CollectionSchema) -> Option<&[CategoryOption]> {
    schema.select_options(CATEGORY_FIELD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Capabilities, ContentItem};
    use crate::store::MemoryStore;
    use crate::testing::{add_option, memory_store, seed_item, FaultyStore};

    async fn setup() -> (MemoryStore, CategoryRegistry) {
        let store = memory_store().await;
        let registry = CategoryRegistry::new(Arc::new(store.clone()));
        (store, registry)
    }

    async fn category_of(store: &MemoryStore, id: &str) -> String {
        let record = store.get_item("contents", id).await.unwrap().unwrap();
        ContentItem::from_record(record, &Capabilities::all()).category
    }

    async fn names(registry: &CategoryRegistry) -> Vec<String> {
        registry
            .list("contents")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect()
    }

    #[tokio::test]
    async fn list_counts_exact_matches() {
        let (store, registry) = setup().await;
        add_option(&store, "contents", "Leads").await;
        seed_item(&store, "a", "", "Leads").await;
        seed_item(&store, "b", "", "Leads").await;
        seed_item(&store, "c", "", "leads").await;
        seed_item(&store, "d", "", "General").await;

        let usage = registry.list("contents").await.unwrap();
        assert_eq!(
            usage,
            vec![
                CategoryUsage {
                    name: "General".into(),
                    color: "default".into(),
                    count: 1
                },
                CategoryUsage {
                    name: "Leads".into(),
                    color: "default".into(),
                    count: 2
                },
            ]
        );
    }

    #[tokio::test]
    async fn list_is_empty_without_category_field() {
        let store = MemoryStore::new();
        store
            .ensure_collection("bare", CollectionSchema::default())
            .await;
        let registry = CategoryRegistry::new(Arc::new(store));
        assert!(registry.list("bare").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_rejects_case_insensitive_duplicates() {
        let (_store, registry) = setup().await;
        registry.add("contents", Some("leads")).await.unwrap();

        let err = registry.add("contents", Some("Leads")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(names(&registry).await, vec!["General", "leads"]);
    }

    #[tokio::test]
    async fn add_validates_before_touching_the_store() {
        let (_store, registry) = setup().await;
        assert!(matches!(
            registry.add("contents", Some("   ")).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            registry.add("contents", None).await,
            Err(AppError::Validation(_))
        ));
        let long = "x".repeat(101);
        assert!(matches!(
            registry.add("contents", Some(&long)).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn add_trims_and_uses_default_color() {
        let (_store, registry) = setup().await;
        let option = registry.add("contents", Some("  Ideas ")).await.unwrap();
        assert_eq!(option, CategoryOption::new("Ideas"));
    }

    #[tokio::test]
    async fn rename_migrates_items_then_schema() {
        let (store, registry) = setup().await;
        add_option(&store, "contents", "Leads").await;
        let x = seed_item(&store, "X", "", "Leads").await;
        let other = seed_item(&store, "Y", "", "General").await;

        let updated = registry
            .rename("contents", Some("Leads"), Some("Prospects"))
            .await
            .unwrap();

        assert_eq!(updated, 1);
        assert_eq!(category_of(&store, &x).await, "Prospects");
        assert_eq!(category_of(&store, &other).await, "General");
        assert_eq!(names(&registry).await, vec!["General", "Prospects"]);

        let leftovers = store
            .query_items("contents", Some(&ItemFilter::category("Leads")))
            .await
            .unwrap();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn rename_rejects_protected_and_duplicate_names() {
        let (store, registry) = setup().await;
        add_option(&store, "contents", "Leads").await;
        add_option(&store, "contents", "Prospects").await;

        let err = registry
            .rename("contents", Some("General"), Some("Other"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = registry
            .rename("contents", Some("Leads"), Some("prospects"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = registry
            .rename("contents", Some("Leads"), Some(""))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn rename_allows_case_change_of_itself() {
        let (store, registry) = setup().await;
        add_option(&store, "contents", "leads").await;
        seed_item(&store, "X", "", "leads").await;

        let updated = registry
            .rename("contents", Some("leads"), Some("Leads"))
            .await
            .unwrap();
        assert_eq!(updated, 1);
        assert_eq!(names(&registry).await, vec!["General", "Leads"]);
    }

    #[tokio::test]
    async fn rename_schema_failure_leaves_items_migrated() {
        let store = memory_store().await;
        add_option(&store, "contents", "Leads").await;
        let x = seed_item(&store, "X", "", "Leads").await;

        let faulty = FaultyStore::new(store.clone());
        faulty.fail_schema_updates(true);
        let registry = CategoryRegistry::new(Arc::new(faulty));

        let err = registry
            .rename("contents", Some("Leads"), Some("Prospects"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));

        // 항목은 새 이름, 스키마는 옛 이름
        assert_eq!(category_of(&store, &x).await, "Prospects");
        let schema = store.retrieve_schema("contents").await.unwrap();
        assert!(category_options(&schema)
            .unwrap()
            .iter()
            .any(|o| o.name == "Leads"));
    }

    #[tokio::test]
    async fn delete_reports_usage_then_force_migrates() {
        let (store, registry) = setup().await;
        add_option(&store, "contents", "Prospects").await;
        let x = seed_item(&store, "X", "", "Prospects").await;

        let blocked = registry
            .delete("contents", Some("Prospects"), false)
            .await
            .unwrap();
        assert_eq!(blocked, DeleteOutcome::Blocked { count: 1 });
        assert_eq!(category_of(&store, &x).await, "Prospects");
        assert_eq!(names(&registry).await, vec!["General", "Prospects"]);

        let forced = registry
            .delete("contents", Some("Prospects"), true)
            .await
            .unwrap();
        assert_eq!(forced, DeleteOutcome::Deleted { migrated_count: 1 });
        assert_eq!(category_of(&store, &x).await, "General");
        assert_eq!(names(&registry).await, vec!["General"]);
    }

    #[tokio::test]
    async fn delete_unused_category_without_force() {
        let (store, registry) = setup().await;
        add_option(&store, "contents", "Empty").await;

        let outcome = registry
            .delete("contents", Some("Empty"), false)
            .await
            .unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted { migrated_count: 0 });
        assert_eq!(names(&registry).await, vec!["General"]);
    }

    #[tokio::test]
    async fn delete_rejects_general_and_unknown_names() {
        let (_store, registry) = setup().await;

        let err = registry
            .delete("contents", Some("General"), true)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = registry
            .delete("contents", Some("Missing"), true)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn failed_migration_keeps_the_option() {
        let store = memory_store().await;
        add_option(&store, "contents", "Prospects").await;
        seed_item(&store, "X", "", "Prospects").await;

        let faulty = FaultyStore::new(store.clone());
        faulty.fail_item_updates(true);
        let registry = CategoryRegistry::new(Arc::new(faulty));

        assert!(registry
            .delete("contents", Some("Prospects"), true)
            .await
            .is_err());
        let schema = store.retrieve_schema("contents").await.unwrap();
        assert_eq!(category_options(&schema).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn collections_are_independent() {
        let (_store, registry) = setup().await;
        registry.add("prompts", Some("Leads")).await.unwrap();

        assert_eq!(names(&registry).await, vec!["General"]);
        let prompts: Vec<_> = registry
            .list("prompts")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(prompts, vec!["General", "Leads"]);
    }
}
