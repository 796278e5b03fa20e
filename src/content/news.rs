use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::Cacheable;
use crate::error::ValidationError;
use crate::record::{default_true, empty_if_none, non_blank, require, Record, RecordFields};

/// A news post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
  pub id: u64,
  pub title: String,
  #[serde(default)]
  pub content: String,
  #[serde(default)]
  pub image_url: Option<String>,
  #[serde(default)]
  pub created_at: Option<NaiveDateTime>,
  #[serde(default)]
  pub updated_at: Option<NaiveDateTime>,
  #[serde(default = "default_true")]
  pub is_published: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsFields {
  pub title: String,
  pub content: String,
  #[serde(default, serialize_with = "empty_if_none")]
  pub image_url: Option<String>,
  #[serde(default = "default_true")]
  pub is_published: bool,
}

impl RecordFields for NewsFields {
  fn validate(&self) -> Result<(), ValidationError> {
    require(&self.title, "title")?;
    require(&self.content, "content")
  }

  fn set_available(&mut self, available: bool) {
    self.is_published = available;
  }
}

impl Cacheable for NewsItem {
  fn collection_key() -> &'static str {
    "news_cache"
  }

  fn entity_type() -> &'static str {
    "news"
  }
}

impl Record for NewsItem {
  type Fields = NewsFields;

  fn id(&self) -> u64 {
    self.id
  }

  fn is_available(&self) -> bool {
    self.is_published
  }

  fn fields(&self) -> NewsFields {
    NewsFields {
      title: self.title.clone(),
      content: self.content.clone(),
      image_url: self.image_url.clone(),
      is_published: self.is_published,
    }
  }

  fn label(&self) -> &str {
    &self.title
  }

  fn from_fields(id: u64, fields: NewsFields) -> Self {
    let now = Utc::now().naive_utc();
    Self {
      id,
      title: fields.title.trim().to_string(),
      content: fields.content.trim().to_string(),
      image_url: non_blank(fields.image_url),
      created_at: Some(now),
      updated_at: Some(now),
      is_published: fields.is_published,
    }
  }

  fn with_fields(&self, fields: NewsFields) -> Self {
    Self {
      created_at: self.created_at,
      ..Self::from_fields(self.id, fields)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_deserialize_with_naive_timestamps() {
    let json = r#"{"id":1,"title":"Выставка","content":"Ждём всех","image_url":null,
      "created_at":"2024-10-19T10:13:44.123456","updated_at":null,"is_published":true}"#;
    let item: NewsItem = serde_json::from_str(json).unwrap();
    assert_eq!(item.title, "Выставка");
    assert!(item.created_at.is_some());
    assert!(item.updated_at.is_none());
  }

  #[test]
  fn test_validate_requires_title_and_content() {
    let fields = NewsFields {
      title: "Новость".into(),
      content: "".into(),
      image_url: None,
      is_published: true,
    };
    assert_eq!(fields.validate(), Err(ValidationError::Empty("content")));
  }

  #[test]
  fn test_with_fields_keeps_created_at() {
    let original = NewsItem::from_fields(
      4,
      NewsFields {
        title: "a".into(),
        content: "b".into(),
        image_url: None,
        is_published: true,
      },
    );
    let mut fields = original.fields();
    fields.set_available(false);
    let updated = original.with_fields(fields);
    assert_eq!(updated.created_at, original.created_at);
    assert!(!updated.is_published);
    assert_eq!(updated.id, 4);
  }
}
