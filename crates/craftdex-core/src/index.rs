//! Precomputed recipe shape index.
//!
//! Every catalog recipe is normalized exactly once, when the index is built.
//! The index is a flat list in catalog order; grouping by result item happens
//! at query time.

use craftdex_common::ItemId;
use tracing::info;

use crate::catalog::RawRecipe;
use crate::matcher::contains;
use crate::shape::{normalize, NormalizedShape};

/// One normalized recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Item the recipe produces.
    pub result_item_id: ItemId,
    /// Trimmed recipe shape.
    pub normalized_shape: NormalizedShape,
    /// Position of the source recipe in the catalog.
    pub recipe: usize,
}

/// Read-only list of normalized recipe shapes.
#[derive(Debug, Default)]
pub struct RecipeIndex {
    entries: Vec<IndexEntry>,
}

impl RecipeIndex {
    /// Normalize every recipe once.
    #[must_use]
    pub fn build(recipes: &[RawRecipe]) -> Self {
        let entries: Vec<IndexEntry> = recipes
            .iter()
            .enumerate()
            .map(|(recipe, raw)| IndexEntry {
                result_item_id: raw.result_item_id,
                normalized_shape: normalize(&raw.shape),
                recipe,
            })
            .collect();

        info!("Recipe index built with {} entries", entries.len());
        Self { entries }
    }

    /// All entries in catalog order.
    #[must_use]
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Entries whose recipe shape contains `query`.
    ///
    /// The recipe shape is the containing matrix and the query is the
    /// pattern, so a partial query matches any larger recipe it fits into.
    pub fn matching<'a>(
        &'a self,
        query: &'a NormalizedShape,
    ) -> impl Iterator<Item = &'a IndexEntry> + 'a {
        self.entries
            .iter()
            .filter(move |entry| contains(&entry.normalized_shape, query))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
