use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::Cacheable;
use crate::error::ValidationError;
use crate::record::{default_true, empty_if_none, non_blank, require, Record, RecordFields};

/// A gallery video (usually an external link)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoItem {
  pub id: u64,
  pub title: String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub video_url: String,
  #[serde(default)]
  pub thumbnail_url: Option<String>,
  #[serde(default)]
  pub created_at: Option<NaiveDateTime>,
  #[serde(default)]
  pub updated_at: Option<NaiveDateTime>,
  #[serde(default = "default_true")]
  pub is_published: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoFields {
  pub title: String,
  #[serde(default, serialize_with = "empty_if_none")]
  pub description: Option<String>,
  pub video_url: String,
  #[serde(default, serialize_with = "empty_if_none")]
  pub thumbnail_url: Option<String>,
  #[serde(default = "default_true")]
  pub is_published: bool,
}

impl RecordFields for VideoFields {
  fn validate(&self) -> Result<(), ValidationError> {
    require(&self.title, "title")?;
    require(&self.video_url, "video url")
  }

  fn set_available(&mut self, available: bool) {
    self.is_published = available;
  }
}

impl Cacheable for VideoItem {
  fn collection_key() -> &'static str {
    "videos_cache"
  }

  fn entity_type() -> &'static str {
    "video"
  }
}

impl Record for VideoItem {
  type Fields = VideoFields;

  fn id(&self) -> u64 {
    self.id
  }

  fn is_available(&self) -> bool {
    self.is_published
  }

  fn fields(&self) -> VideoFields {
    VideoFields {
      title: self.title.clone(),
      description: self.description.clone(),
      video_url: self.video_url.clone(),
      thumbnail_url: self.thumbnail_url.clone(),
      is_published: self.is_published,
    }
  }

  fn label(&self) -> &str {
    &self.title
  }

  fn from_fields(id: u64, fields: VideoFields) -> Self {
    let now = Utc::now().naive_utc();
    Self {
      id,
      title: fields.title.trim().to_string(),
      description: non_blank(fields.description),
      video_url: fields.video_url.trim().to_string(),
      thumbnail_url: non_blank(fields.thumbnail_url),
      created_at: Some(now),
      updated_at: Some(now),
      is_published: fields.is_published,
    }
  }

  fn with_fields(&self, fields: VideoFields) -> Self {
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
  fn test_validate_requires_video_url() {
    let fields = VideoFields {
      title: "Токарка".into(),
      description: None,
      video_url: " ".into(),
      thumbnail_url: None,
      is_published: true,
    };
    assert_eq!(fields.validate(), Err(ValidationError::Empty("video url")));
  }

  #[test]
  fn test_payload_sends_empty_optionals() {
    let fields = VideoFields {
      title: "Токарка".into(),
      description: None,
      video_url: "https://example.com/v".into(),
      thumbnail_url: None,
      is_published: false,
    };
    let value = serde_json::to_value(&fields).unwrap();
    assert_eq!(value["description"], "");
    assert_eq!(value["thumbnail_url"], "");
    assert_eq!(value["is_published"], false);
  }
}
