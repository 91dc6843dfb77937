use std::collections::BTreeSet;

use tracing::debug;

use crate::error::ApiResult;
use crate::models::ResourceKind;
use crate::resolve::{resolve, Catalog};

/// Tag additions and removals requested for one document, as id-or-name
/// references.
#[derive(Debug, Clone, Default)]
pub struct TagEdit {
    pub add: Vec<String>,
    pub remove: Vec<String>,
}

impl TagEdit {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }

    pub async fn apply<C>(&self, catalog: &C, current: &BTreeSet<i64>) -> ApiResult<BTreeSet<i64>>
    where
        C: Catalog + ?Sized,
    {
        reconcile_tags(catalog, current, &self.add, &self.remove).await
    }
}

/// Computes a document's new tag set. Adds are applied before removes, so
/// a tag named in both ends up absent. A removal naming a tag that does
/// not exist is skipped.
pub async fn reconcile_tags<C>(
    catalog: &C,
    current: &BTreeSet<i64>,
    add: &[String],
    remove: &[String],
) -> ApiResult<BTreeSet<i64>>
where
    C: Catalog + ?Sized,
{
    let mut tags = current.clone();

    for token in add {
        tags.insert(resolve(catalog, ResourceKind::Tag, token).await?);
    }

    for token in remove {
        match resolve(catalog, ResourceKind::Tag, token).await {
            Ok(id) => {
                tags.remove(&id);
            }
            Err(err) if err.is_not_found() => {
                debug!(tag = %token, "tag to remove does not exist; skipping");
            }
            Err(err) => return Err(err),
        }
    }

    Ok(tags)
}
