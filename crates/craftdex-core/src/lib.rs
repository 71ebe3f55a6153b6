//! # Craftdex Core
//!
//! Recipe lookup engine for Craftdex.
//!
//! This crate answers "which recipes could this partial grid belong to?" and
//! "what can this brewing step produce?":
//! - Shape normalization of 3x3 crafting grids
//! - Wildcard submatrix containment
//! - A recipe index built once from the catalog
//! - Grouping of matches by result item, with search and pagination
//! - Bounded caching of results by canonical query shape
//! - Potion brewing rule resolution
//! - Catalog statistics

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod aggregate;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod index;
pub mod matcher;
pub mod potion;
pub mod service;
pub mod shape;
pub mod stats;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::aggregate::*;
    pub use crate::cache::*;
    pub use crate::catalog::*;
    pub use crate::config::*;
    pub use crate::index::*;
    pub use crate::matcher::*;
    pub use crate::potion::*;
    pub use crate::service::*;
    pub use crate::shape::*;
    pub use crate::stats::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use craftdex_common::ItemId;

    #[test]
    fn test_normalize_then_contains() {
        let recipe = normalize(&Grid::from_flat(&[0, 3, 3, 0, 3, 3, 0, 0, 0]).expect("nine"));
        let query = normalize(&Grid::from_flat(&[3, 3, 0, 0, 0, 0, 0, 0, 0]).expect("nine"));
        assert!(contains(&recipe, &query));
        assert!(!contains(&query, &recipe));
    }

    #[test]
    fn test_catalog_to_service() {
        let catalog = Catalog::new(
            vec![ItemDef::new(3, "oak_planks", "Oak Planks")],
            vec![RawRecipe::new(
                ItemId::new(3),
                4,
                Grid::from_flat(&[3, 0, 0]).expect("one row"),
            )],
        )
        .expect("valid catalog");
        let service = CraftdexService::new(
            catalog,
            PotionRuleResolver::default(),
            ServiceConfig::default(),
        );
        let page = service
            .match_crafting(Some(&[0, 0, 0, 0, 3, 0, 0, 0, 0]), "", 0, 5)
            .expect("valid grid");
        assert_eq!(page.items.len(), 1);
    }
}
