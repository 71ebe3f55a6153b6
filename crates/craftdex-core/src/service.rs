//! Query facade over the catalog, recipe index, caches, and brewing rules.
//!
//! The catalog, index, and resolver are built once and only read afterwards.
//! The two caches are the only mutable state; each sits behind its own lock
//! and is never held while the index is scanned.

use craftdex_common::{CraftdexResult, ItemId};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::aggregate::{aggregate, filter_and_paginate, MatchGroup, Page};
use crate::cache::{CacheKey, CacheStats, LruCache};
use crate::catalog::{Catalog, ItemDef, ItemRef, ItemsMeta};
use crate::config::ServiceConfig;
use crate::index::RecipeIndex;
use crate::potion::{PotionFilter, PotionInstance, PotionRuleResolver};
use crate::shape::{normalize, Grid, NormalizedShape};
use crate::stats::CatalogStats;

/// Process-wide query service.
#[derive(Debug)]
pub struct CraftdexService {
    config: ServiceConfig,
    catalog: Catalog,
    index: RecipeIndex,
    brewing: PotionRuleResolver,
    stats: CatalogStats,
    /// Full group lists by canonical query shape.
    query_cache: Mutex<LruCache<CacheKey, Vec<MatchGroup>>>,
    /// Matching item ids by lowercase search term.
    items_cache: Mutex<LruCache<String, Vec<ItemId>>>,
    index_scans: AtomicU64,
}

impl CraftdexService {
    /// Build the recipe index and statistics for a catalog snapshot.
    #[must_use]
    pub fn new(catalog: Catalog, brewing: PotionRuleResolver, mut config: ServiceConfig) -> Self {
        config.validate();

        let index = RecipeIndex::build(catalog.recipes());
        let stats = CatalogStats::compute(&catalog);

        info!(
            "Service ready: {} items, {} indexed recipes, {} brewing rules",
            catalog.len(),
            index.len(),
            brewing.rules().len()
        );

        Self {
            query_cache: Mutex::new(LruCache::new(config.query_cache_capacity)),
            items_cache: Mutex::new(LruCache::new(config.items_cache_capacity)),
            config,
            catalog,
            index,
            brewing,
            stats,
            index_scans: AtomicU64::new(0),
        }
    }

    /// Find every recipe the partial grid could belong to.
    ///
    /// `grid` is a flat, row-major list of item ids. A limit of 0 selects the
    /// configured default page size.
    pub fn match_crafting(
        &self,
        grid: Option<&[u32]>,
        search: &str,
        offset: usize,
        limit: usize,
    ) -> CraftdexResult<Page<MatchGroup>> {
        let grid = Grid::from_flat(grid.unwrap_or_default())?;
        Ok(self.match_grid(&grid, search, offset, limit))
    }

    /// `match_crafting` for an already validated grid.
    #[must_use]
    pub fn match_grid(
        &self,
        grid: &Grid<ItemId>,
        search: &str,
        offset: usize,
        limit: usize,
    ) -> Page<MatchGroup> {
        let groups = self.groups_for(&normalize(grid));
        filter_and_paginate(&groups, search, offset, self.config.page_limit(limit))
    }

    fn groups_for(&self, shape: &NormalizedShape) -> Arc<Vec<MatchGroup>> {
        let key = CacheKey::from(shape);
        if let Some(groups) = self.query_cache.lock().get(&key) {
            return groups;
        }

        self.index_scans.fetch_add(1, Ordering::Relaxed);
        let groups = aggregate(&self.index, &self.catalog, shape);
        debug!("Query {} matched {} result items", key.as_str(), groups.len());

        self.query_cache.lock().put(key, groups)
    }

    /// Look up an item by id.
    #[must_use]
    pub fn lookup_item(&self, id: ItemId) -> Option<ItemRef> {
        self.catalog.item(id).map(|def| def.item.clone())
    }

    /// Look up an item by name (case-insensitive).
    #[must_use]
    pub fn lookup_item_by_name(&self, name: &str) -> Option<ItemRef> {
        self.catalog.item_by_name(name).map(|def| def.item.clone())
    }

    /// Item count and id range.
    #[must_use]
    pub fn items_meta(&self) -> ItemsMeta {
        self.catalog.meta()
    }

    /// Page through items whose name contains `search`, in id order.
    #[must_use]
    pub fn search_items(&self, search: &str, offset: usize, limit: usize) -> Page<ItemDef> {
        let needle = search.trim().to_lowercase();
        let ids = self.items_matching(needle);
        Page::slice(
            ids.iter().filter_map(|&id| self.catalog.item(id)).cloned(),
            offset,
            self.config.page_limit(limit),
        )
    }

    fn items_matching(&self, needle: String) -> Arc<Vec<ItemId>> {
        if let Some(ids) = self.items_cache.lock().get(&needle) {
            return ids;
        }

        let ids: Vec<ItemId> = self
            .catalog
            .items_sorted()
            .filter(|def| def.item.matches_search(&needle))
            .map(ItemDef::id)
            .collect();

        self.items_cache.lock().put(needle, ids)
    }

    /// Rendered layouts of every recipe producing `id`.
    #[must_use]
    pub fn recipes_for_item(&self, id: ItemId) -> Vec<Grid<ItemRef>> {
        self.catalog
            .recipes_for(id)
            .map(|recipe| self.catalog.render(&recipe.shape))
            .collect()
    }

    /// Resolve a partial brewing query.
    pub fn resolve_potion(
        &self,
        ingredient: Option<&str>,
        query: &PotionFilter,
    ) -> CraftdexResult<Vec<PotionInstance>> {
        self.brewing.resolve(ingredient, query)
    }

    /// Distinct brewing ingredients.
    #[must_use]
    pub fn potion_ingredients(&self) -> Vec<&str> {
        self.brewing.ingredients()
    }

    /// Recipe statistics computed at startup.
    #[must_use]
    pub const fn stats(&self) -> &CatalogStats {
        &self.stats
    }

    /// The catalog snapshot.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// How many times the full index has been scanned.
    #[must_use]
    pub fn index_scans(&self) -> u64 {
        self.index_scans.load(Ordering::Relaxed)
    }

    /// Crafting query cache counters.
    #[must_use]
    pub fn query_cache_stats(&self) -> CacheStats {
        self.query_cache.lock().stats()
    }

    /// Item search cache counters.
    #[must_use]
    pub fn items_cache_stats(&self) -> CacheStats {
        self.items_cache.lock().stats()
    }
}
