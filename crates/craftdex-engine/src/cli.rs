//! Command-line interface.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use craftdex_common::ItemId;
use craftdex_core::{CraftdexService, PotionFilter, PotionForm, PotionVariant};
use serde_json::{json, Value};
use tracing::info;

use crate::catalog_loader::load_catalog;
use crate::config::EngineConfig;

/// Recipe lookup over a catalog snapshot.
#[derive(Debug, Parser)]
#[command(name = "craftdex", version, about)]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Catalog snapshot, overriding `catalog_path` from the config
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// What to run
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Resolve configuration, load the catalog, and run the command.
    pub fn run(self) -> Result<Value> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load_from(path),
            None => EngineConfig::load(),
        };
        if let Some(catalog) = self.catalog {
            config.catalog_path = catalog;
        }
        config.validate();

        if matches!(self.command, Command::InitConfig) {
            let path = self.config.unwrap_or_else(EngineConfig::config_path);
            config
                .save_to(&path)
                .with_context(|| format!("writing config to {}", path.display()))?;
            return Ok(json!({ "configPath": path }));
        }

        let snapshot = load_catalog(&config.catalog_path).with_context(|| {
            format!("loading catalog from {}", config.catalog_path.display())
        })?;
        info!(
            "Catalog ready: {} recipes loaded, {} skipped",
            snapshot.stats.recipes_loaded, snapshot.stats.validation_errors
        );
        let service = snapshot.into_service(config.service);

        self.command.execute(&service)
    }
}

/// Queries the binary can answer.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Find recipes a partial 3x3 grid could belong to
    Match {
        /// Row-major item ids, 3, 6 or 9 of them
        #[arg(long, value_delimiter = ',', required = true)]
        grid: Vec<u32>,
        /// Filter on result name
        #[arg(long, default_value = "")]
        search: String,
        /// Result groups to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Page size (0 = configured default)
        #[arg(long, default_value_t = 0)]
        limit: usize,
    },
    /// Look up an item by id or name
    Item {
        /// Numeric id or item name
        key: String,
    },
    /// Item count and id range
    Meta,
    /// Page through items
    Items {
        /// Filter on item name
        #[arg(long, default_value = "")]
        search: String,
        /// Items to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Page size (0 = configured default)
        #[arg(long, default_value_t = 0)]
        limit: usize,
    },
    /// Every recipe layout producing an item
    Recipes {
        /// Result item id
        id: u32,
    },
    /// Resolve a partial brewing query
    Potion {
        /// Brewing ingredient
        #[arg(long)]
        ingredient: Option<String>,
        /// Input potion name
        #[arg(long)]
        name: Option<String>,
        /// Input potion form
        #[arg(long)]
        form: Option<PotionForm>,
        /// Input potion variant
        #[arg(long)]
        variant: Option<PotionVariant>,
    },
    /// Catalog-wide recipe statistics
    Stats,
    /// Write the effective configuration to the config file
    InitConfig,
}

impl Command {
    /// Run against the service and return the JSON response.
    pub fn execute(&self, service: &CraftdexService) -> Result<Value> {
        let value = match self {
            Self::Match {
                grid,
                search,
                offset,
                limit,
            } => serde_json::to_value(service.match_crafting(
                Some(grid.as_slice()),
                search,
                *offset,
                *limit,
            )?)?,
            Self::Item { key } => {
                let item = match key.parse::<u32>() {
                    Ok(id) => service.lookup_item(ItemId::new(id)),
                    Err(_) => service.lookup_item_by_name(key),
                };
                serde_json::to_value(item)?
            },
            Self::Meta => serde_json::to_value(service.items_meta())?,
            Self::Items {
                search,
                offset,
                limit,
            } => serde_json::to_value(service.search_items(search, *offset, *limit))?,
            Self::Recipes { id } => {
                json!({ "recipes": service.recipes_for_item(ItemId::new(*id)) })
            },
            Self::Potion {
                ingredient,
                name,
                form,
                variant,
            } => {
                let query = PotionFilter {
                    name: name.clone(),
                    form: *form,
                    variant: *variant,
                };
                let potions = service.resolve_potion(ingredient.as_deref(), &query)?;
                json!({ "potions": potions })
            },
            Self::Stats => serde_json::to_value(service.stats())?,
            Self::InitConfig => bail!("init-config does not query the catalog"),
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    const CATALOG: &str = r#"{
        "items": [
            {"id": 1, "name": "oak_planks", "displayName": "Oak Planks"},
            {"id": 2, "name": "stick", "displayName": "Stick"}
        ],
        "recipes": {"2": [{"result": {"id": 2, "count": 4}, "inShape": [[1], [1]]}]}
    }"#;

    fn run(args: &[&str]) -> Result<Value> {
        let mut argv = vec!["craftdex"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv)?.run()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_match() {
        let cli = Cli::try_parse_from([
            "craftdex", "match", "--grid", "0,2,0,0,2,0", "--limit", "5",
        ])
        .expect("valid args");
        match cli.command {
            Command::Match { grid, limit, .. } => {
                assert_eq!(grid, vec![0, 2, 0, 0, 2, 0]);
                assert_eq!(limit, 5);
            },
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_potion() {
        let cli = Cli::try_parse_from([
            "craftdex",
            "--catalog",
            "snapshot.json",
            "potion",
            "--ingredient",
            "redstone",
            "--form",
            "splash",
        ])
        .expect("valid args");
        assert_eq!(cli.catalog, Some(PathBuf::from("snapshot.json")));
        match cli.command {
            Command::Potion {
                ingredient, form, ..
            } => {
                assert_eq!(ingredient.as_deref(), Some("redstone"));
                assert_eq!(form, Some(PotionForm::Splash));
            },
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_reject_unknown_form() {
        assert!(Cli::try_parse_from(["craftdex", "potion", "--form", "fizzy"]).is_err());
    }

    #[test]
    fn test_match_requires_grid() {
        assert!(Cli::try_parse_from(["craftdex", "match"]).is_err());
    }

    #[test]
    fn test_init_config_writes_effective_config() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("craftdex.toml");
        let config_arg = config_path.to_string_lossy().into_owned();

        let out = run(&["--config", &config_arg, "--catalog", "snapshot.json", "init-config"])
            .expect("config written");
        assert_eq!(out["configPath"], config_arg.as_str());

        let written = EngineConfig::load_from(&config_path);
        assert_eq!(written.catalog_path, PathBuf::from("snapshot.json"));
        assert_eq!(written.service, EngineConfig::default().service);
    }

    #[test]
    fn test_run_queries_loaded_catalog() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let catalog_path = temp_dir.path().join("catalog.json");
        std::fs::write(&catalog_path, CATALOG).expect("write catalog");
        let config_arg = temp_dir.path().join("missing.toml").to_string_lossy().into_owned();
        let catalog_arg = catalog_path.to_string_lossy().into_owned();

        let base = ["--config", config_arg.as_str(), "--catalog", catalog_arg.as_str()];

        let meta = run(&[&base[..], &["meta"]].concat()).expect("meta");
        assert_eq!(meta["count"], 2);
        assert_eq!(meta["maxId"], 2);

        let page = run(&[&base[..], &["match", "--grid", "0,1,0"]].concat()).expect("match");
        assert_eq!(page["items"][0]["displayName"], "Stick");
    }

    #[test]
    fn test_run_reports_missing_catalog() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_arg = temp_dir.path().join("missing.toml").to_string_lossy().into_owned();
        let catalog_arg = temp_dir.path().join("none.json").to_string_lossy().into_owned();

        let err = run(&["--config", &config_arg, "--catalog", &catalog_arg, "meta"])
            .expect_err("no catalog on disk");
        assert!(err.to_string().contains("loading catalog"));
    }
}
