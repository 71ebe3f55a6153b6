//! Catalog snapshot loading.
//!
//! This module provides:
//! - The on-disk JSON layout of a catalog snapshot
//! - Recipe entry validation and conversion into 3x3 grids
//! - Schema version checks
//! - Assembly of the immutable catalog and brewing table

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ahash::AHashSet;
use craftdex_common::{CraftdexError, ItemId, SchemaVersion};
use craftdex_core::{
    BrewingRule, Catalog, CraftdexService, Grid, ItemDef, Potion, PotionRuleResolver, RawRecipe,
    ServiceConfig, GRID_SIZE,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during catalog loading.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    /// File not found.
    #[error("Catalog file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read file.
    #[error("Failed to read catalog file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse JSON.
    #[error("Failed to parse catalog JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Validation error.
    #[error("Catalog validation error: {0}")]
    ValidationError(String),

    /// Duplicate item ID.
    #[error("Duplicate item ID: {0}")]
    DuplicateId(u32),

    /// Snapshot written by an incompatible schema.
    #[error("Schema version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// Version this build reads
        expected: SchemaVersion,
        /// Version found in the file
        actual: String,
    },

    /// Rejected while assembling the catalog.
    #[error(transparent)]
    Core(#[from] CraftdexError),
}

/// Result type for catalog loading operations.
pub type CatalogLoadResult<T> = Result<T, CatalogLoadError>;

/// Result item of a recipe entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeResult {
    /// Item type ID produced.
    pub id: u32,
    /// Quantity produced.
    #[serde(default = "default_count")]
    pub count: u32,
}

const fn default_count() -> u32 {
    1
}

/// A recipe as stored in the snapshot.
///
/// Shaped recipes carry `inShape`; flat `ingredients` lists are folded into
/// rows of three.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeEntry {
    /// Output item and quantity.
    pub result: RecipeResult,
    /// Ingredient rows, at most 3x3.
    #[serde(default)]
    pub in_shape: Option<Vec<Vec<u32>>>,
    /// Row-major ingredient list.
    #[serde(default)]
    pub ingredients: Option<Vec<u32>>,
}

impl RecipeEntry {
    /// Validates the entry and converts it into a raw recipe.
    pub fn to_raw_recipe(&self) -> CatalogLoadResult<RawRecipe> {
        if self.result.count == 0 {
            return Err(CatalogLoadError::ValidationError(format!(
                "Recipe for {} has zero output count",
                self.result.id
            )));
        }

        let rows: Vec<Vec<u32>> = match (&self.ingredients, &self.in_shape) {
            (Some(ingredients), _) if !ingredients.is_empty() => {
                if ingredients.len() % GRID_SIZE != 0 {
                    return Err(CatalogLoadError::ValidationError(format!(
                        "Recipe for {} has {} ingredients, not a multiple of {GRID_SIZE}",
                        self.result.id,
                        ingredients.len()
                    )));
                }
                ingredients.chunks(GRID_SIZE).map(<[u32]>::to_vec).collect()
            },
            (_, Some(rows)) => rows.clone(),
            _ => Vec::new(),
        };

        let shape = Grid::from_rows(&rows).map_err(|e| {
            CatalogLoadError::ValidationError(format!("Recipe for {}: {e}", self.result.id))
        })?;

        Ok(RawRecipe::new(
            ItemId::new(self.result.id),
            self.result.count,
            shape,
        ))
    }
}

/// On-disk catalog snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFile {
    /// File format version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Item definitions.
    #[serde(default)]
    pub items: Vec<ItemDef>,
    /// Recipes keyed by result item ID.
    #[serde(default)]
    pub recipes: BTreeMap<u32, Vec<RecipeEntry>>,
    /// Potion definitions.
    #[serde(default)]
    pub potions: Vec<Potion>,
    /// Brewing rules in evaluation order.
    #[serde(default)]
    pub brewing_rules: Vec<BrewingRule>,
}

fn default_version() -> String {
    SchemaVersion::CATALOG.to_string()
}

/// Statistics for a catalog load.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CatalogLoadStats {
    /// Number of items loaded.
    pub items_loaded: u32,
    /// Number of recipes loaded.
    pub recipes_loaded: u32,
    /// Number of recipe entries skipped as invalid.
    pub validation_errors: u32,
}

/// A loaded, validated snapshot ready to back a service.
#[derive(Debug)]
pub struct CatalogSnapshot {
    /// Items and recipes.
    pub catalog: Catalog,
    /// Potions and brewing rules.
    pub brewing: PotionRuleResolver,
    /// Load statistics.
    pub stats: CatalogLoadStats,
}

impl CatalogSnapshot {
    /// Build the query service over this snapshot.
    #[must_use]
    pub fn into_service(self, config: ServiceConfig) -> CraftdexService {
        CraftdexService::new(self.catalog, self.brewing, config)
    }
}

/// Loads a catalog snapshot from a JSON file.
pub fn load_catalog(path: &Path) -> CatalogLoadResult<CatalogSnapshot> {
    if !path.exists() {
        return Err(CatalogLoadError::NotFound(path.to_path_buf()));
    }

    debug!("Loading catalog file: {:?}", path);
    let content = fs::read_to_string(path)?;
    let snapshot = parse_catalog(&content)?;

    info!(
        "Loaded {} items and {} recipes from {:?}",
        snapshot.stats.items_loaded, snapshot.stats.recipes_loaded, path
    );
    Ok(snapshot)
}

/// Parses and validates a catalog snapshot.
///
/// Invalid recipe entries are skipped with a warning; duplicate item IDs and
/// incompatible versions fail the whole load.
pub fn parse_catalog(content: &str) -> CatalogLoadResult<CatalogSnapshot> {
    let file: CatalogFile = serde_json::from_str(content)?;

    let version = SchemaVersion::parse(&file.version);
    if !version.is_some_and(|v| SchemaVersion::CATALOG.can_read(&v)) {
        return Err(CatalogLoadError::VersionMismatch {
            expected: SchemaVersion::CATALOG,
            actual: file.version,
        });
    }

    let mut stats = CatalogLoadStats::default();

    let mut seen = AHashSet::with_capacity(file.items.len());
    for item in &file.items {
        if !seen.insert(item.id()) {
            return Err(CatalogLoadError::DuplicateId(item.id().raw()));
        }
    }
    stats.items_loaded = file.items.len() as u32;

    let mut recipes = Vec::new();
    for (key, entries) in &file.recipes {
        for entry in entries {
            if entry.result.id != *key {
                warn!(
                    "Recipe listed under {} produces {}, using the result id",
                    key, entry.result.id
                );
            }
            match entry.to_raw_recipe() {
                Ok(recipe) => recipes.push(recipe),
                Err(e) => {
                    warn!("Invalid recipe entry: {}", e);
                    stats.validation_errors += 1;
                },
            }
        }
    }
    stats.recipes_loaded = recipes.len() as u32;

    let catalog = Catalog::new(file.items, recipes)?;
    let brewing = PotionRuleResolver::new(file.potions, file.brewing_rules)?;

    Ok(CatalogSnapshot {
        catalog,
        brewing,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"{
        "version": "1.0.0",
        "items": [
            {"id": 1, "name": "oak_planks", "displayName": "Oak Planks", "stackSize": 64},
            {"id": 2, "name": "stick", "displayName": "Stick"},
            {"id": 5, "name": "ladder", "displayName": "Ladder"}
        ],
        "recipes": {
            "5": [{"result": {"id": 5, "count": 3}, "inShape": [[2, 0, 2], [2, 2, 2], [2, 0, 2]]}],
            "2": [
                {"result": {"id": 2, "count": 4}, "inShape": [[1], [1]]},
                {"result": {"id": 2, "count": 4}, "ingredients": [1, 0, 0, 1, 0, 0]}
            ]
        },
        "potions": [
            {"id": "water", "name": "water", "type": "base"},
            {"id": "awkward", "name": "awkward", "displayName": "Awkward Potion", "type": "base"}
        ],
        "brewingRules": [
            {
                "ingredientId": "nether_wart",
                "input": {"name": "water"},
                "output": {"name": "awkward"},
                "type": "create_base"
            }
        ]
    }"#;

    #[test]
    fn test_parse_sample() {
        let snapshot = parse_catalog(SAMPLE).expect("valid catalog");
        assert_eq!(snapshot.stats.items_loaded, 3);
        assert_eq!(snapshot.stats.recipes_loaded, 3);
        assert_eq!(snapshot.stats.validation_errors, 0);

        // Keys load in ascending numeric order.
        let results: Vec<u32> = snapshot
            .catalog
            .recipes()
            .iter()
            .map(|r| r.result_item_id.raw())
            .collect();
        assert_eq!(results, vec![2, 2, 5]);

        assert_eq!(
            snapshot.catalog.item(ItemId::new(1)).and_then(|i| i.stack_size),
            Some(64)
        );
        assert_eq!(snapshot.brewing.rules().len(), 1);
    }

    #[test]
    fn test_ingredients_fold_into_rows() {
        let snapshot = parse_catalog(SAMPLE).expect("valid catalog");
        let folded = &snapshot.catalog.recipes()[1];
        assert_eq!(folded.shape.to_flat(), [1, 0, 0, 1, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_invalid_recipe_skipped() {
        let content = r#"{
            "items": [{"id": 1, "name": "a", "displayName": "A"}],
            "recipes": {
                "1": [
                    {"result": {"id": 1, "count": 0}, "inShape": [[1]]},
                    {"result": {"id": 1}, "ingredients": [1, 1]},
                    {"result": {"id": 1}, "inShape": [[1, 1, 1, 1]]},
                    {"result": {"id": 1}, "inShape": [[1]]}
                ]
            }
        }"#;
        let snapshot = parse_catalog(content).expect("loads the valid entry");
        assert_eq!(snapshot.stats.recipes_loaded, 1);
        assert_eq!(snapshot.stats.validation_errors, 3);
        assert_eq!(snapshot.catalog.recipes()[0].result_count, 1);
    }

    #[test]
    fn test_duplicate_item_id() {
        let content = r#"{"items": [
            {"id": 1, "name": "a", "displayName": "A"},
            {"id": 1, "name": "b", "displayName": "B"}
        ]}"#;
        assert!(matches!(
            parse_catalog(content),
            Err(CatalogLoadError::DuplicateId(1))
        ));
    }

    #[test]
    fn test_version_mismatch() {
        let content = r#"{"version": "2.0.0"}"#;
        assert!(matches!(
            parse_catalog(content),
            Err(CatalogLoadError::VersionMismatch { .. })
        ));
        assert!(parse_catalog(r#"{"version": "1.3.0"}"#).is_ok());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            parse_catalog("{not json"),
            Err(CatalogLoadError::ParseError(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(SAMPLE.as_bytes()).expect("write sample");

        let snapshot = load_catalog(file.path()).expect("valid catalog");
        let service = snapshot.into_service(ServiceConfig::default());
        let page = service
            .match_crafting(Some(&[0, 0, 0, 0, 2, 0, 0, 2, 0]), "", 0, 10)
            .expect("valid grid");
        assert_eq!(page.items[0].display_name, "Ladder");
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            load_catalog(Path::new("/nonexistent/catalog.json")),
            Err(CatalogLoadError::NotFound(_))
        ));
    }
}
