//! Seed the catalog from a YAML file.
//!
//! Seeding is idempotent: products are keyed by name and existing ones are
//! skipped. It only destroys data when asked to with `--reset`.
//!
//! # File format
//!
//! ```yaml
//! - name: Stoneground Oat Flour
//!   description: Wholegrain flour milled from rolled oats.
//!   price: 4.50
//!   image: /images/oat-flour.jpg
//!   category: Pantry
//!   pricing_tiers:
//!     - { label: "1 bag", quantity: 1, price: 4.50 }
//!     - { label: "3 bags", quantity: 3, price: 12.00 }
//! ```
//!
//! `pricing_tiers` may also be a JSON string, the format used by catalog
//! exports. A tier list that does not parse or validate is dropped with a
//! warning and the product is sold at its base price only.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, warn};

use harbor_core::pricing::{parse_tiers, validate_tiers};
use harbor_core::{Category, PricingTier, TierError};
use harbor_storefront::db::{self, ProductRepository};
use harbor_storefront::models::NewProduct;

use super::database_url;

/// Catalog shipped with the CLI.
pub const DEFAULT_CATALOG_FILE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/seed/catalog.yaml");

/// One catalog entry as written in the seed file.
#[derive(Debug, Deserialize)]
struct SeedProduct {
    name: String,
    #[serde(default)]
    description: String,
    price: Decimal,
    image: Option<String>,
    category: Category,
    #[serde(default)]
    pricing_tiers: Option<SeedTiers>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SeedTiers {
    Listed(Vec<PricingTier>),
    Serialized(String),
}

impl SeedTiers {
    fn parse(self) -> Result<Vec<PricingTier>, TierError> {
        match self {
            Self::Listed(tiers) => {
                validate_tiers(&tiers)?;
                Ok(tiers)
            }
            Self::Serialized(raw) => parse_tiers(&raw),
        }
    }
}

impl SeedProduct {
    /// Check the entry, failing closed on bad tiers.
    fn into_new_product(self) -> Result<NewProduct, String> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err("product name cannot be empty".to_string());
        }
        if self.price <= Decimal::ZERO {
            return Err(format!("{name}: price must be positive"));
        }

        let pricing_tiers = match self.pricing_tiers.map(SeedTiers::parse).transpose() {
            Ok(tiers) => tiers.unwrap_or_default(),
            Err(e) => {
                warn!(product = %name, error = %e, "Ignoring invalid pricing tiers");
                Vec::new()
            }
        };

        Ok(NewProduct {
            name,
            description: self.description.trim().to_string(),
            price: self.price,
            image: self.image.filter(|i| !i.trim().is_empty()),
            category: self.category,
            pricing_tiers,
        })
    }
}

/// Outcome of a seeding run.
#[derive(Debug, Default)]
pub struct SeedResult {
    pub removed: u64,
    pub inserted: usize,
    pub skipped: usize,
}

/// Parse and check a catalog file's contents.
fn parse_catalog(content: &str) -> Result<Vec<NewProduct>, Box<dyn std::error::Error>> {
    let entries: Vec<SeedProduct> = serde_yaml::from_str(content)?;
    let mut products = Vec::with_capacity(entries.len());
    let mut errors = Vec::new();
    for entry in entries {
        match entry.into_new_product() {
            Ok(product) => products.push(product),
            Err(e) => errors.push(e),
        }
    }

    if !errors.is_empty() {
        for err in &errors {
            tracing::error!("  - {err}");
        }
        return Err(format!("{} invalid catalog entries", errors.len()).into());
    }
    Ok(products)
}

/// Seed catalog products from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the catalog YAML file
/// * `reset` - If true, delete all products, orders and reviews first
///
/// # Errors
///
/// Returns an error if the database URL is missing, the file cannot be read
/// or has invalid entries, or a database operation fails.
pub async fn catalog(file_path: &str, reset: bool) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = database_url()?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog from file");

    // Read and validate before connecting to the database
    let content = tokio::fs::read_to_string(path).await?;
    let products = parse_catalog(&content)?;
    info!(products = products.len(), "Catalog validated");

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let repo = ProductRepository::new(&pool);
    let mut result = SeedResult::default();

    if reset {
        result.removed = repo.delete_all().await?;
        warn!(removed = result.removed, "Existing catalog, orders and reviews deleted");
    }

    for product in &products {
        match repo.insert_if_absent(product).await? {
            Some(id) => {
                info!(product_id = %id, name = %product.name, "Inserted product");
                result.inserted += 1;
            }
            None => result.skipped += 1,
        }
    }

    info!("Seeding complete!");
    info!("  Products removed: {}", result.removed);
    info!("  Products inserted: {}", result.inserted);
    info!("  Products skipped (already exist): {}", result.skipped);

    Ok(())
}
