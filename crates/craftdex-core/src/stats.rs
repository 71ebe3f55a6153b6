//! Catalog-wide recipe statistics, computed once when the service is built.

use ahash::{AHashMap, AHashSet};
use craftdex_common::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::{Catalog, ItemRef};

/// An item paired with a count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCount {
    /// The item.
    pub item: ItemRef,
    /// How many times it was counted.
    pub count: usize,
}

/// Usage statistics over every recipe in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    /// Ingredients by the number of recipes using them.
    pub most_used_items: Vec<ItemCount>,
    /// Result items by the number of recipes producing them.
    pub items_with_most_recipes: Vec<ItemCount>,
    /// Result item name to the distinct ingredients across its recipes.
    pub graph: BTreeMap<String, Vec<ItemRef>>,
}

impl CatalogStats {
    /// Walk every recipe once.
    ///
    /// An ingredient counts once per recipe no matter how many slots it
    /// fills. Ingredients missing from the catalog are ignored.
    #[must_use]
    pub fn compute(catalog: &Catalog) -> Self {
        let mut used: AHashMap<ItemId, usize> = AHashMap::new();
        let mut produced: AHashMap<ItemId, usize> = AHashMap::new();
        let mut graph: BTreeMap<String, Vec<ItemRef>> = BTreeMap::new();

        for recipe in catalog.recipes() {
            *produced.entry(recipe.result_item_id).or_default() += 1;
            let result_name = catalog
                .item(recipe.result_item_id)
                .map(|def| def.item.name.as_str());

            let mut seen = AHashSet::new();
            for &id in recipe.shape.iter() {
                if id.is_empty() || catalog.item(id).is_none() || !seen.insert(id) {
                    continue;
                }
                *used.entry(id).or_default() += 1;

                // Unknown results get no graph node.
                let Some(name) = result_name else {
                    continue;
                };
                let ingredients = graph.entry(name.to_string()).or_default();
                if !ingredients.iter().any(|item| item.id == id) {
                    ingredients.push(catalog.item_ref(id));
                }
            }
        }

        Self {
            most_used_items: ranked(catalog, used),
            items_with_most_recipes: ranked(catalog, produced),
            graph,
        }
    }
}

/// Sort by count descending, then id ascending.
fn ranked(catalog: &Catalog, counts: AHashMap<ItemId, usize>) -> Vec<ItemCount> {
    let mut counts: Vec<(ItemId, usize)> = counts.into_iter().collect();
    counts.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    counts
        .into_iter()
        .map(|(id, count)| ItemCount {
            item: catalog.item_ref(id),
            count,
        })
        .collect()
}
