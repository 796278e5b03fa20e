use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use std::path::Path;
use tracing::info;
use url::Url;

use crate::error::UploadError;

use super::api_types::{ApiUploadRequest, ApiUploadResponse};
use super::http::format_reqwest_error;

/// Largest accepted image
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Sends product photos to the image endpoint and hands back their URL.
#[derive(Clone)]
pub struct ImageUploader {
  client: Client,
  endpoint: Url,
}

impl ImageUploader {
  pub fn new(client: Client, endpoint: Url) -> Self {
    Self { client, endpoint }
  }

  /// Upload the image at `path`; the returned URL is an opaque image reference.
  pub async fn upload(&self, path: &Path) -> Result<String, UploadError> {
    let (filename, mime, bytes) = read_image(path).await?;

    let image = data_url(mime, &bytes);
    let response = self
      .client
      .post(self.endpoint.clone())
      .json(&ApiUploadRequest {
        image: &image,
        filename: &filename,
      })
      .send()
      .await
      .map_err(|e| UploadError::Transport(format_reqwest_error(&e)))?;

    let status = response.status();
    if !status.is_success() {
      return Err(UploadError::Rejected {
        status: status.as_u16(),
      });
    }

    let body: ApiUploadResponse = response
      .json()
      .await
      .map_err(|e| UploadError::Decode(format_reqwest_error(&e)))?;

    info!(file = %filename, url = %body.url, "image uploaded");
    Ok(body.url)
  }
}

/// Load an image from disk, rejecting non-images and oversized files
/// before any bytes are read.
async fn read_image(path: &Path) -> Result<(String, &'static str, Vec<u8>), UploadError> {
  let filename = path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| "image.jpg".to_string());

  let mime = image_mime(&filename).ok_or_else(|| UploadError::NotAnImage(filename.clone()))?;

  let io_error = |source| UploadError::Io {
    path: path.display().to_string(),
    source,
  };
  let size = tokio::fs::metadata(path).await.map_err(io_error)?.len();
  if size > MAX_IMAGE_BYTES {
    return Err(UploadError::TooLarge {
      size,
      max: MAX_IMAGE_BYTES,
    });
  }
  let bytes = tokio::fs::read(path).await.map_err(io_error)?;

  Ok((filename, mime, bytes))
}

/// Content type for an image file name, by extension.
fn image_mime(filename: &str) -> Option<&'static str> {
  let (_, ext) = filename.rsplit_once('.')?;
  match ext.to_ascii_lowercase().as_str() {
    "jpg" | "jpeg" => Some("image/jpeg"),
    "png" => Some("image/png"),
    "gif" => Some("image/gif"),
    "webp" => Some("image/webp"),
    _ => None,
  }
}

fn data_url(mime: &str, bytes: &[u8]) -> String {
  format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_image_mime_by_extension() {
    assert_eq!(image_mime("vase.JPG"), Some("image/jpeg"));
    assert_eq!(image_mime("box.webp"), Some("image/webp"));
    assert_eq!(image_mime("notes.txt"), None);
    assert_eq!(image_mime("noext"), None);
  }

  #[test]
  fn test_data_url() {
    assert_eq!(data_url("image/png", b"hi"), "data:image/png;base64,aGk=");
  }

  #[tokio::test]
  async fn test_rejects_non_image_before_reading() {
    let err = read_image(Path::new("/nonexistent/readme.md")).await;
    assert!(matches!(err, Err(UploadError::NotAnImage(name)) if name == "readme.md"));
  }

  #[tokio::test]
  async fn test_rejects_oversized_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huge.png");
    let file = std::fs::File::create(&path).unwrap();
    file.set_len(MAX_IMAGE_BYTES + 1).unwrap();

    let err = read_image(&path).await;
    assert!(matches!(err, Err(UploadError::TooLarge { .. })));
  }

  #[tokio::test]
  async fn test_reads_small_image() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vase.png");
    std::fs::write(&path, b"png").unwrap();

    let (filename, mime, bytes) = read_image(&path).await.unwrap();
    assert_eq!(filename, "vase.png");
    assert_eq!(mime, "image/png");
    assert_eq!(bytes, b"png");
  }
}
