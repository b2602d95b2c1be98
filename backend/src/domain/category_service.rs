use super::ids::unique_short_id;
use super::session::SessionContext;
use super::validation::require_text;
use crate::errors::{DomainError, DomainResult};
use crate::storage::{RecordStore, Snapshot, TableRepository, Version};
use shared::{Category, TransactionType};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

/// Offered when no categories have been configured at all
pub const FALLBACK_CATEGORY: &str = "General";
/// Offered when categories exist, but none for the requested type
pub const OTHER_CATEGORY: &str = "Other";

/// Transaction categories. A soft reference: removing one leaves existing
/// transactions untouched.
#[derive(Clone)]
pub struct CategoryService {
    categories: TableRepository<Category>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            categories: TableRepository::new(store),
        }
    }

    pub async fn list(&self) -> DomainResult<Snapshot<Category>> {
        Ok(self.categories.snapshot().await?)
    }

    /// Categories of one type, with the version of the whole table
    pub async fn list_for_type(&self, category_type: TransactionType) -> DomainResult<Snapshot<Category>> {
        let snapshot = self.categories.snapshot().await?;
        Ok(Snapshot {
            records: snapshot
                .records
                .into_iter()
                .filter(|c| c.category_type == category_type)
                .collect(),
            version: snapshot.version,
        })
    }

    /// Names for an entry form; never empty
    pub async fn names_for(&self, category_type: TransactionType) -> DomainResult<Vec<String>> {
        let all = self.categories.list_or_empty().await?;
        if all.is_empty() {
            return Ok(vec![FALLBACK_CATEGORY.to_string()]);
        }
        let names: Vec<String> = all
            .into_iter()
            .filter(|c| c.category_type == category_type)
            .map(|c| c.name)
            .collect();
        if names.is_empty() {
            Ok(vec![OTHER_CATEGORY.to_string()])
        } else {
            Ok(names)
        }
    }

    /// Replace the category list.
    ///
    /// With `scope` set, only categories of that type are replaced and the
    /// others are written back as stored, so a list filtered by type can be
    /// saved as shown.
    pub async fn replace_all(
        &self,
        ctx: &SessionContext,
        categories: Vec<Category>,
        expected: Option<Version>,
        scope: Option<TransactionType>,
    ) -> DomainResult<Version> {
        ctx.require_admin("edit categories")?;
        let base = self.categories.edit_snapshot().await?;
        base.check_base(expected)?;

        let in_scope = |c: &Category| scope.map_or(true, |kind| c.category_type == kind);
        let kept_ids: HashSet<&str> = base
            .records
            .iter()
            .filter(|c| !in_scope(*c))
            .map(|c| c.id.as_str())
            .collect();
        let mut taken: HashSet<String> = base
            .records
            .iter()
            .map(|c| c.id.clone())
            .chain(categories.iter().map(|c| c.id.trim().to_string()))
            .filter(|id| !id.is_empty())
            .collect();

        let mut normalized = Vec::with_capacity(categories.len());
        for category in categories {
            let mut id = category.id.trim().to_string();
            if kept_ids.contains(id.as_str()) {
                return Err(DomainError::Validation(format!(
                    "category id '{id}' belongs to another type"
                )));
            }
            if id.is_empty() {
                id = unique_short_id(taken.iter().map(String::as_str));
                taken.insert(id.clone());
            }
            normalized.push(Category {
                id,
                name: require_text("name", &category.name)?,
                category_type: category.category_type,
            });
        }

        let mut records = Vec::with_capacity(base.records.len() + normalized.len());
        for category in &base.records {
            if !in_scope(category) {
                records.push(category.clone());
            } else if !normalized.is_empty() {
                records.append(&mut normalized);
            }
        }
        records.append(&mut normalized);

        let version = self.categories.save_edits(&base, &records).await?;
        info!(count = records.len(), scope = ?scope, version = %version, by = %ctx.username, "categories replaced");
        Ok(version)
    }
}
