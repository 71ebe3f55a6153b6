//! Grouping of matched recipes by result item, plus search and pagination.

use ahash::AHashMap;
use craftdex_common::ItemId;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, ItemRef};
use crate::index::RecipeIndex;
use crate::shape::{Grid, NormalizedShape};

/// Every matching recipe shape for one result item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchGroup {
    /// Item the recipes produce.
    pub result_item_id: ItemId,
    /// Internal name of the result.
    pub name: String,
    /// Display name of the result.
    pub display_name: String,
    /// Rendered 3x3 layouts, in catalog order.
    pub shapes: Vec<Grid<ItemRef>>,
}

impl MatchGroup {
    fn new(result: ItemRef) -> Self {
        Self {
            result_item_id: result.id,
            name: result.name,
            display_name: result.display_name,
            shapes: Vec::new(),
        }
    }

    /// Case-insensitive substring match on the result's names.
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn matches_search(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.name.to_lowercase().contains(needle)
            || self.display_name.to_lowercase().contains(needle)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Offset to request for the next page.
    pub next_offset: usize,
    /// Whether more items remain past this page.
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Slice `offset..offset + limit` out of an already filtered list.
    pub fn slice<I>(filtered: I, offset: usize, limit: usize) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut total = 0;
        let mut items = Vec::new();
        for (pos, item) in filtered.into_iter().enumerate() {
            total = pos + 1;
            if pos >= offset && items.len() < limit {
                items.push(item);
            }
        }

        Self {
            next_offset: offset + items.len(),
            has_more: offset.saturating_add(limit) < total,
            items,
        }
    }
}

/// Scan the whole index for recipes containing `query` and merge them into
/// one group per result item, in first-seen order.
#[must_use]
pub fn aggregate(
    index: &RecipeIndex,
    catalog: &Catalog,
    query: &NormalizedShape,
) -> Vec<MatchGroup> {
    let mut groups: Vec<MatchGroup> = Vec::new();
    let mut positions: AHashMap<ItemId, usize> = AHashMap::new();

    for entry in index.matching(query) {
        let Some(raw) = catalog.recipes().get(entry.recipe) else {
            continue;
        };

        let pos = *positions.entry(entry.result_item_id).or_insert_with(|| {
            groups.push(MatchGroup::new(catalog.item_ref(entry.result_item_id)));
            groups.len() - 1
        });
        groups[pos].shapes.push(catalog.render(&raw.shape));
    }

    groups
}

/// Apply the search filter and pagination to a full group list.
#[must_use]
pub fn filter_and_paginate(
    groups: &[MatchGroup],
    search: &str,
    offset: usize,
    limit: usize,
) -> Page<MatchGroup> {
    let needle = search.trim().to_lowercase();
    Page::slice(
        groups
            .iter()
            .filter(|group| group.matches_search(&needle))
            .cloned(),
        offset,
        limit,
    )
}
