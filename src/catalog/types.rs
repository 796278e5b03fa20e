use serde::{Deserialize, Serialize};

use crate::cache::Cacheable;
use crate::error::ValidationError;
use crate::record::{default_true, empty_if_none, non_blank, require, Record, RecordFields};

/// Categories offered when creating or filtering products
pub const CATEGORIES: &[&str] = &[
  "Вазы",
  "Шкатулки",
  "Конфетницы",
  "Подсвечники",
  "Пепельницы",
  "Декор",
];

/// Category preselected for new products
pub const DEFAULT_CATEGORY: &str = "Вазы";

/// A catalog item as the products endpoint lists it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
  pub id: u64,
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
  /// Display price, e.g. "2 500 ₽" or "По запросу"
  #[serde(rename = "price", default)]
  pub price_text: String,
  #[serde(rename = "priceNum", default)]
  pub price_num: Option<u32>,
  #[serde(default)]
  pub category: String,
  #[serde(rename = "image", default)]
  pub image_url: Option<String>,
  #[serde(default = "default_true")]
  pub available: bool,
}

/// What a buyer is told about the price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Price {
  Fixed(u32),
  /// Numeric price 0: ask the workshop
  OnRequest,
  /// The source sent no numeric price at all
  Unavailable,
}

impl Product {
  pub fn price(&self) -> Price {
    match self.price_num {
      Some(0) => Price::OnRequest,
      Some(amount) => Price::Fixed(amount),
      None => Price::Unavailable,
    }
  }

  /// Price as shown to buyers
  pub fn price_label(&self) -> String {
    match self.price() {
      Price::Fixed(amount) if self.price_text.trim().is_empty() => format!("{} ₽", amount),
      Price::Fixed(_) => self.price_text.clone(),
      Price::OnRequest => "По запросу".to_string(),
      Price::Unavailable => "—".to_string(),
    }
  }
}

/// Product form, in the shape the products endpoint accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFields {
  pub name: String,
  #[serde(default, serialize_with = "empty_if_none")]
  pub description: Option<String>,
  pub price_text: String,
  /// Numeric price; `None` is sent as null and stays unset
  #[serde(default)]
  pub price_num: Option<u32>,
  pub category: String,
  #[serde(default, serialize_with = "empty_if_none")]
  pub image_url: Option<String>,
  #[serde(default = "default_true")]
  pub is_available: bool,
}

impl Default for ProductFields {
  fn default() -> Self {
    Self {
      name: String::new(),
      description: None,
      price_text: String::new(),
      price_num: Some(0),
      category: DEFAULT_CATEGORY.to_string(),
      image_url: None,
      is_available: true,
    }
  }
}

impl RecordFields for ProductFields {
  fn validate(&self) -> Result<(), ValidationError> {
    require(&self.name, "name")?;
    require(&self.price_text, "price text")?;
    require(&self.category, "category")
  }

  fn set_available(&mut self, available: bool) {
    self.is_available = available;
  }
}

impl Cacheable for Product {
  fn collection_key() -> &'static str {
    "products_cache"
  }

  fn entity_type() -> &'static str {
    "product"
  }
}

impl Record for Product {
  type Fields = ProductFields;

  fn id(&self) -> u64 {
    self.id
  }

  fn is_available(&self) -> bool {
    self.available
  }

  fn fields(&self) -> ProductFields {
    ProductFields {
      name: self.name.clone(),
      description: self.description.clone(),
      price_text: self.price_text.clone(),
      price_num: self.price_num,
      category: self.category.clone(),
      image_url: self.image_url.clone(),
      is_available: self.available,
    }
  }

  fn label(&self) -> &str {
    &self.name
  }

  fn from_fields(id: u64, fields: ProductFields) -> Self {
    Self {
      id,
      name: fields.name.trim().to_string(),
      description: non_blank(fields.description),
      price_text: fields.price_text.trim().to_string(),
      price_num: fields.price_num,
      category: fields.category.trim().to_string(),
      image_url: non_blank(fields.image_url),
      available: fields.is_available,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn product(price_num: Option<u32>) -> Product {
    Product {
      id: 1,
      name: "Ваза из берёзы №92".into(),
      description: None,
      price_text: "3 000 ₽".into(),
      price_num,
      category: "Вазы".into(),
      image_url: None,
      available: true,
    }
  }

  #[test]
  fn test_price_tri_state() {
    assert_eq!(product(Some(3000)).price(), Price::Fixed(3000));
    assert_eq!(product(Some(0)).price(), Price::OnRequest);
    assert_eq!(product(None).price(), Price::Unavailable);
  }

  #[test]
  fn test_price_label() {
    assert_eq!(product(Some(3000)).price_label(), "3 000 ₽");
    assert_eq!(product(Some(0)).price_label(), "По запросу");
    assert_eq!(product(None).price_label(), "—");

    let mut bare = product(Some(1200));
    bare.price_text.clear();
    assert_eq!(bare.price_label(), "1200 ₽");
  }

  #[test]
  fn test_deserialize_list_item() {
    let json = r#"{"id":7,"name":"Шкатулка","description":null,"price":"1 500 ₽",
      "priceNum":1500,"category":"Шкатулки","image":"https://cdn/x.jpg","available":false}"#;
    let p: Product = serde_json::from_str(json).unwrap();
    assert_eq!(p.id, 7);
    assert_eq!(p.price_num, Some(1500));
    assert_eq!(p.image_url.as_deref(), Some("https://cdn/x.jpg"));
    assert!(!p.available);
  }

  #[test]
  fn test_fields_serialize_in_payload_shape() {
    let fields = product(Some(3000)).fields();
    let value = serde_json::to_value(&fields).unwrap();
    assert_eq!(value["price_text"], "3 000 ₽");
    assert_eq!(value["price_num"], 3000);
    assert_eq!(value["description"], "");
    assert_eq!(value["image_url"], "");
    assert_eq!(value["is_available"], true);
  }

  #[test]
  fn test_missing_price_survives_resubmission() {
    let fields = product(None).fields();
    assert_eq!(fields.price_num, None);
    assert!(serde_json::to_value(&fields).unwrap()["price_num"].is_null());
    assert_eq!(Product::from_fields(1, fields).price(), Price::Unavailable);
  }

  #[test]
  fn test_validate_requires_name_price_category() {
    let mut fields = ProductFields {
      name: "Ваза".into(),
      price_text: "2 000 ₽".into(),
      ..Default::default()
    };
    assert!(fields.validate().is_ok());

    fields.price_text = " ".into();
    assert_eq!(fields.validate(), Err(ValidationError::Empty("price text")));

    fields.price_text = "2 000 ₽".into();
    fields.name.clear();
    assert_eq!(fields.validate(), Err(ValidationError::Empty("name")));
  }

  #[test]
  fn test_from_fields_drops_blank_optionals() {
    let fields = ProductFields {
      name: " Подсвечник ".into(),
      description: Some("  ".into()),
      price_text: "1 000 ₽".into(),
      price_num: Some(1000),
      category: "Подсвечники".into(),
      image_url: None,
      is_available: false,
    };
    let p = Product::from_fields(3, fields);
    assert_eq!(p.name, "Подсвечник");
    assert_eq!(p.description, None);
    assert!(!p.available);
  }
}
