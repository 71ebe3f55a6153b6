//! Item and recipe catalog.
//!
//! This module provides:
//! - Item references and full item definitions
//! - Raw shaped recipes keyed by result item
//! - The immutable `Catalog` snapshot with lookup by id and name
//! - Rendering of raw id grids into grids of item references

use ahash::AHashMap;
use craftdex_common::{CraftdexError, CraftdexResult, ItemId};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::shape::Grid;

// ============================================================================
// Items
// ============================================================================

/// Minimal item reference returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRef {
    /// Item identifier.
    pub id: ItemId,
    /// Internal name (e.g. `oak_planks`).
    pub name: String,
    /// Human readable name.
    pub display_name: String,
}

impl ItemRef {
    /// Create a new item reference.
    #[must_use]
    pub fn new(id: ItemId, name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            display_name: display_name.into(),
        }
    }

    /// Reference rendered for an empty grid slot.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(ItemId::EMPTY, "empty", "")
    }

    /// Placeholder for an id missing from the catalog.
    #[must_use]
    pub fn unknown(id: ItemId) -> Self {
        Self::new(id, "unknown", "Unknown Item")
    }

    /// Case-insensitive substring match against `name` and `display_name`.
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn matches_search(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.name.to_lowercase().contains(needle)
            || self.display_name.to_lowercase().contains(needle)
    }
}

/// Full catalog entry for an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDef {
    /// Identity and names.
    #[serde(flatten)]
    pub item: ItemRef,
    /// Creative-menu category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Item description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Item tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Maximum stack size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_size: Option<u32>,
}

impl ItemDef {
    /// Create an item definition with no extra metadata.
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            item: ItemRef::new(ItemId::new(id), name, display_name),
            category: None,
            description: None,
            tags: Vec::new(),
            stack_size: None,
        }
    }

    /// Item identifier.
    #[must_use]
    pub const fn id(&self) -> ItemId {
        self.item.id
    }
}

/// Summary of the item id space, derived once from the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsMeta {
    /// Number of items.
    pub count: usize,
    /// Smallest item id (0 for an empty catalog).
    pub min_id: u32,
    /// Largest item id (0 for an empty catalog).
    pub max_id: u32,
}

// ============================================================================
// Recipes
// ============================================================================

/// A shaped recipe as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecipe {
    /// Item produced.
    pub result_item_id: ItemId,
    /// Quantity produced.
    pub result_count: u32,
    /// Ingredient layout.
    pub shape: Grid<ItemId>,
}

impl RawRecipe {
    /// Create a recipe from a result and a 3x3 layout.
    #[must_use]
    pub const fn new(result_item_id: ItemId, result_count: u32, shape: Grid<ItemId>) -> Self {
        Self {
            result_item_id,
            result_count,
            shape,
        }
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Immutable snapshot of every item and recipe, built once at startup.
#[derive(Debug, Default)]
pub struct Catalog {
    /// Items by ID.
    items: AHashMap<ItemId, ItemDef>,
    /// Item IDs by lowercase name.
    by_name: AHashMap<String, ItemId>,
    /// Item IDs in ascending order.
    sorted_ids: Vec<ItemId>,
    /// All recipes in load order.
    recipes: Vec<RawRecipe>,
    /// Recipe positions by result item.
    by_result: AHashMap<ItemId, Vec<usize>>,
    meta: ItemsMeta,
}

impl Catalog {
    /// Build a catalog. Duplicate item ids are rejected.
    pub fn new(items: Vec<ItemDef>, recipes: Vec<RawRecipe>) -> CraftdexResult<Self> {
        let mut catalog = Self::default();

        for item in items {
            let id = item.id();
            if catalog.items.contains_key(&id) {
                return Err(CraftdexError::Catalog(format!("duplicate item id {id}")));
            }
            catalog.by_name.insert(item.item.name.to_lowercase(), id);
            catalog.items.insert(id, item);
        }

        catalog.sorted_ids = catalog.items.keys().copied().collect();
        catalog.sorted_ids.sort_unstable();

        for (pos, recipe) in recipes.iter().enumerate() {
            catalog
                .by_result
                .entry(recipe.result_item_id)
                .or_default()
                .push(pos);
        }
        catalog.recipes = recipes;

        catalog.meta = ItemsMeta {
            count: catalog.sorted_ids.len(),
            min_id: catalog.sorted_ids.first().map_or(0, |id| id.raw()),
            max_id: catalog.sorted_ids.last().map_or(0, |id| id.raw()),
        };

        info!(
            "Catalog built: {} items, {} recipes",
            catalog.items.len(),
            catalog.recipes.len()
        );
        Ok(catalog)
    }

    /// Get an item by ID.
    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&ItemDef> {
        self.items.get(&id)
    }

    /// Get an item by name (case-insensitive).
    #[must_use]
    pub fn item_by_name(&self, name: &str) -> Option<&ItemDef> {
        self.by_name
            .get(&name.to_lowercase())
            .and_then(|id| self.items.get(id))
    }

    /// Reference for a grid cell or result id.
    ///
    /// Empty slots render as `ItemRef::empty()`, unknown ids as
    /// `ItemRef::unknown()`.
    #[must_use]
    pub fn item_ref(&self, id: ItemId) -> ItemRef {
        if id.is_empty() {
            return ItemRef::empty();
        }
        self.items
            .get(&id)
            .map_or_else(|| ItemRef::unknown(id), |def| def.item.clone())
    }

    /// Render a raw id grid into item references.
    #[must_use]
    pub fn render(&self, grid: &Grid<ItemId>) -> Grid<ItemRef> {
        grid.map(|&id| self.item_ref(id))
    }

    /// All recipes in load order.
    #[must_use]
    pub fn recipes(&self) -> &[RawRecipe] {
        &self.recipes
    }

    /// Recipes producing `id`, in load order.
    pub fn recipes_for(&self, id: ItemId) -> impl Iterator<Item = &RawRecipe> {
        self.by_result
            .get(&id)
            .into_iter()
            .flatten()
            .map(|&pos| &self.recipes[pos])
    }

    /// Items in ascending id order.
    pub fn items_sorted(&self) -> impl Iterator<Item = &ItemDef> {
        self.sorted_ids.iter().filter_map(|id| self.items.get(id))
    }

    /// Item count and id range.
    #[must_use]
    pub const fn meta(&self) -> ItemsMeta {
        self.meta
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the catalog has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(result: u32, cells: [u32; 9]) -> RawRecipe {
        RawRecipe::new(
            ItemId::new(result),
            1,
            Grid::from_flat(&cells).expect("nine cells"),
        )
    }

    fn test_catalog() -> Catalog {
        Catalog::new(
            vec![
                ItemDef::new(7, "stick", "Stick"),
                ItemDef::new(3, "oak_planks", "Oak Planks"),
                ItemDef::new(12, "crafting_table", "Crafting Table"),
            ],
            vec![
                recipe(7, [3, 0, 0, 3, 0, 0, 0, 0, 0]),
                recipe(12, [3, 3, 0, 3, 3, 0, 0, 0, 0]),
                recipe(7, [0, 3, 0, 0, 3, 0, 0, 0, 0]),
            ],
        )
        .expect("valid catalog")
    }

    #[test]
    fn test_lookup_by_id_and_name() {
        let catalog = test_catalog();
        assert_eq!(
            catalog.item(ItemId::new(3)).map(|i| i.item.name.as_str()),
            Some("oak_planks")
        );
        assert_eq!(
            catalog.item_by_name("STICK").map(ItemDef::id),
            Some(ItemId::new(7))
        );
        assert!(catalog.item(ItemId::new(99)).is_none());
    }

    #[test]
    fn test_meta() {
        let meta = test_catalog().meta();
        assert_eq!(meta, ItemsMeta { count: 3, min_id: 3, max_id: 12 });
        assert_eq!(Catalog::default().meta(), ItemsMeta::default());
    }

    #[test]
    fn test_duplicate_item_rejected() {
        let result = Catalog::new(
            vec![ItemDef::new(1, "a", "A"), ItemDef::new(1, "b", "B")],
            Vec::new(),
        );
        assert!(matches!(result, Err(CraftdexError::Catalog(_))));
    }

    #[test]
    fn test_recipes_for_keeps_load_order() {
        let catalog = test_catalog();
        let sticks: Vec<_> = catalog.recipes_for(ItemId::new(7)).collect();
        assert_eq!(sticks.len(), 2);
        assert_eq!(sticks[0].shape.to_flat()[0], 3);
        assert_eq!(catalog.recipes_for(ItemId::new(3)).count(), 0);
    }

    #[test]
    fn test_render_fills_empty_and_unknown() {
        let catalog = test_catalog();
        let grid = Grid::from_flat(&[3, 0, 42]).expect("one row");
        let rendered = catalog.render(&grid);
        let first_row = &rendered.rows()[0];
        assert_eq!(first_row[0].display_name, "Oak Planks");
        assert_eq!(first_row[1], ItemRef::empty());
        assert_eq!(first_row[2], ItemRef::unknown(ItemId::new(42)));
    }

    #[test]
    fn test_items_sorted() {
        let catalog = test_catalog();
        let ids: Vec<u32> = catalog.items_sorted().map(|i| i.id().raw()).collect();
        assert_eq!(ids, vec![3, 7, 12]);
    }

    #[test]
    fn test_item_def_json_shape() {
        let json = serde_json::to_value(ItemDef::new(1, "stone", "Stone")).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"id": 1, "name": "stone", "displayName": "Stone"})
        );
    }
}
