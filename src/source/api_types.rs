//! Serde types for endpoint responses that are not records themselves.

use serde::{Deserialize, Serialize};

/// Body of a successful catalog reset
#[derive(Debug, Deserialize)]
pub struct ApiResetResponse {
  #[serde(default)]
  pub message: Option<String>,
  #[serde(default)]
  pub count: Option<u64>,
}

impl ApiResetResponse {
  pub fn summary(self) -> String {
    match (self.message, self.count) {
      (Some(message), _) => message,
      (None, Some(count)) => format!("Catalog reset: {} records loaded", count),
      (None, None) => "Catalog reset".to_string(),
    }
  }
}

#[derive(Debug, Serialize)]
pub struct ApiUploadRequest<'a> {
  /// `data:<mime>;base64,<payload>`
  pub image: &'a str,
  pub filename: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ApiUploadResponse {
  pub url: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_reset_summary_prefers_server_message() {
    let body: ApiResetResponse = serde_json::from_str(
      r#"{"success":true,"message":"База обновлена. Загружено 22 товаров","count":22}"#,
    )
    .unwrap();
    assert_eq!(body.summary(), "База обновлена. Загружено 22 товаров");
  }

  #[test]
  fn test_reset_summary_falls_back_to_count() {
    let body: ApiResetResponse = serde_json::from_str(r#"{"count":3}"#).unwrap();
    assert_eq!(body.summary(), "Catalog reset: 3 records loaded");
  }
}
