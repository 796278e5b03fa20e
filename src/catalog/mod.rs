pub mod filter;
pub mod types;

pub use filter::{published, visible, CategoryFilter, PriceRange};
pub use types::{Product, ProductFields};

use color_eyre::{eyre::eyre, Result};

const SEED_PRODUCTS: &str = include_str!("../../assets/seed_products.json");

/// The initial catalog a reset restores.
pub fn seed_products() -> Result<Vec<ProductFields>> {
  serde_json::from_str(SEED_PRODUCTS).map_err(|e| eyre!("Failed to parse bundled catalog: {}", e))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::record::RecordFields;

  #[test]
  fn test_seed_catalog_is_valid() {
    let seeds = seed_products().unwrap();
    assert_eq!(seeds.len(), 22);
    assert!(seeds.iter().all(|f| f.validate().is_ok()));
    assert!(seeds.iter().any(|f| f.price_num == Some(0)));
  }
}
