//! Pure filtering of a loaded collection for display.

use crate::record::Record;

use super::types::{Product, CATEGORIES};

/// Label of the "everything" choice in both filters
pub const ALL_LABEL: &str = "Все";

/// Category filter: a sentinel that matches everything, or an exact name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
  #[default]
  All,
  Exact(String),
}

impl CategoryFilter {
  /// Parse user input; "Все" and "all" (any case) select everything.
  pub fn parse(input: &str) -> Self {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed == ALL_LABEL || trimmed.eq_ignore_ascii_case("all") {
      CategoryFilter::All
    } else {
      CategoryFilter::Exact(trimmed.to_string())
    }
  }

  pub fn matches(&self, category: &str) -> bool {
    match self {
      CategoryFilter::All => true,
      CategoryFilter::Exact(name) => name == category,
    }
  }

  pub fn label(&self) -> &str {
    match self {
      CategoryFilter::All => ALL_LABEL,
      CategoryFilter::Exact(name) => name,
    }
  }

  /// Next choice in UI order: All, then each known category, then All again.
  pub fn next(&self) -> Self {
    let position = match self {
      CategoryFilter::All => None,
      CategoryFilter::Exact(name) => CATEGORIES.iter().position(|c| c == name),
    };
    match position {
      None if *self == CategoryFilter::All => CategoryFilter::Exact(CATEGORIES[0].to_string()),
      Some(i) if i + 1 < CATEGORIES.len() => CategoryFilter::Exact(CATEGORIES[i + 1].to_string()),
      _ => CategoryFilter::All,
    }
  }
}

/// Half-open price interval `[min, max)`; `max: None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
  pub label: &'static str,
  pub min: u32,
  pub max: Option<u32>,
  /// Matches records without a numeric price too
  pub any: bool,
}

pub const PRICE_RANGES: &[PriceRange] = &[
  PriceRange {
    label: ALL_LABEL,
    min: 0,
    max: None,
    any: true,
  },
  PriceRange {
    label: "До 2 000 ₽",
    min: 0,
    max: Some(2000),
    any: false,
  },
  PriceRange {
    label: "2 000 - 5 000 ₽",
    min: 2000,
    max: Some(5000),
    any: false,
  },
  PriceRange {
    label: "5 000 - 10 000 ₽",
    min: 5000,
    max: Some(10000),
    any: false,
  },
  PriceRange {
    label: "Более 10 000 ₽",
    min: 10000,
    max: None,
    any: false,
  },
];

impl Default for PriceRange {
  fn default() -> Self {
    PRICE_RANGES[0]
  }
}

impl PriceRange {
  /// Look a range up by its exact label or by its position in `PRICE_RANGES`.
  pub fn find(input: &str) -> Option<PriceRange> {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("all") {
      return Some(PRICE_RANGES[0]);
    }
    PRICE_RANGES
      .iter()
      .find(|r| r.label == trimmed)
      .copied()
      .or_else(|| trimmed.parse::<usize>().ok().and_then(|i| PRICE_RANGES.get(i).copied()))
  }

  pub fn contains(&self, price_num: Option<u32>) -> bool {
    match price_num {
      None => self.any,
      Some(price) => price >= self.min && self.max.map_or(true, |max| price < max),
    }
  }

  pub fn next(&self) -> PriceRange {
    let position = PRICE_RANGES.iter().position(|r| r == self).unwrap_or(0);
    PRICE_RANGES[(position + 1) % PRICE_RANGES.len()]
  }
}

/// Records a visitor may see: unavailable ones only for admins. Order is kept.
pub fn published<R: Record>(records: &[R], is_admin: bool) -> Vec<&R> {
  records
    .iter()
    .filter(|r| is_admin || r.is_available())
    .collect()
}

/// Products matching both filters, in collection order.
pub fn visible<'a>(
  products: &'a [Product],
  category: &CategoryFilter,
  price: &PriceRange,
  is_admin: bool,
) -> Vec<&'a Product> {
  products
    .iter()
    .filter(|p| is_admin || p.available)
    .filter(|p| category.matches(&p.category))
    .filter(|p| price.contains(p.price_num))
    .collect()
}
