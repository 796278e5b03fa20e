use async_trait::async_trait;
use reqwest::{Client, Response};
use std::error::Error as StdError;
use std::marker::PhantomData;
use tracing::debug;
use url::Url;

use crate::error::{FetchError, MutationError};
use crate::record::Record;

use super::api_types::ApiResetResponse;
use super::RemoteSource;

/// Header carrying the reset secret
const ADMIN_SECRET_HEADER: &str = "X-Admin-Secret";

/// Collection endpoint reached over HTTP.
///
/// `GET` lists, `POST` creates, `PUT ?id=` updates and `DELETE ?id=` deletes,
/// all on the same base URL.
pub struct HttpSource<R> {
  client: Client,
  endpoint: Url,
  reset_endpoint: Option<Url>,
  _record: PhantomData<fn() -> R>,
}

impl<R> Clone for HttpSource<R> {
  fn clone(&self) -> Self {
    Self {
      client: self.client.clone(),
      endpoint: self.endpoint.clone(),
      reset_endpoint: self.reset_endpoint.clone(),
      _record: PhantomData,
    }
  }
}

impl<R: Record> HttpSource<R> {
  pub fn new(client: Client, endpoint: Url) -> Self {
    Self {
      client,
      endpoint,
      reset_endpoint: None,
      _record: PhantomData,
    }
  }

  /// Enable the reset capability against `endpoint`.
  pub fn with_reset_endpoint(mut self, endpoint: Url) -> Self {
    self.reset_endpoint = Some(endpoint);
    self
  }

  fn record_url(&self, id: u64) -> Url {
    record_url(&self.endpoint, id)
  }
}

/// Address a single record: the base URL plus `id=<n>`, keeping any
/// existing query (e.g. `?type=news`).
fn record_url(endpoint: &Url, id: u64) -> Url {
  let mut url = endpoint.clone();
  url.query_pairs_mut().append_pair("id", &id.to_string());
  url
}

/// Keep chained causes so DNS/TLS/socket failures stay visible.
pub(crate) fn format_reqwest_error(err: &reqwest::Error) -> String {
  let mut message = err.to_string();
  let mut source = err.source();

  while let Some(cause) = source {
    let cause_msg = cause.to_string();
    if !cause_msg.is_empty() && !message.contains(&cause_msg) {
      message.push_str(": ");
      message.push_str(&cause_msg);
    }
    source = cause.source();
  }

  message
}

/// Map a non-success status to a mutation error. 404 on an addressed
/// record means it is gone; everything else is a uniform rejection.
fn rejected(status: u16, id: Option<u64>) -> MutationError {
  match (status, id) {
    (404, Some(id)) => MutationError::NotFound { id },
    _ => MutationError::Rejected { status },
  }
}

fn check_mutation(response: Response, id: Option<u64>) -> Result<Response, MutationError> {
  let status = response.status();
  if status.is_success() {
    Ok(response)
  } else {
    Err(rejected(status.as_u16(), id))
  }
}

#[async_trait]
impl<R: Record> RemoteSource<R> for HttpSource<R> {
  async fn list(&self) -> Result<Vec<R>, FetchError> {
    debug!(entity = R::entity_type(), url = %self.endpoint, "listing");

    let response = self
      .client
      .get(self.endpoint.clone())
      .send()
      .await
      .map_err(|e| FetchError::Transport(format_reqwest_error(&e)))?;

    let status = response.status();
    if !status.is_success() {
      return Err(FetchError::Status {
        status: status.as_u16(),
      });
    }

    response
      .json::<Vec<R>>()
      .await
      .map_err(|e| FetchError::Decode(format_reqwest_error(&e)))
  }

  async fn create(&self, fields: &R::Fields) -> Result<R, MutationError> {
    let response = self
      .client
      .post(self.endpoint.clone())
      .json(fields)
      .send()
      .await
      .map_err(|e| MutationError::Transport(format_reqwest_error(&e)))?;

    check_mutation(response, None)?
      .json::<R>()
      .await
      .map_err(|e| MutationError::Decode(format_reqwest_error(&e)))
  }

  async fn update(&self, id: u64, fields: &R::Fields) -> Result<(), MutationError> {
    let response = self
      .client
      .put(self.record_url(id))
      .json(fields)
      .send()
      .await
      .map_err(|e| MutationError::Transport(format_reqwest_error(&e)))?;

    check_mutation(response, Some(id))?;
    Ok(())
  }

  async fn delete(&self, id: u64) -> Result<(), MutationError> {
    let response = self
      .client
      .delete(self.record_url(id))
      .send()
      .await
      .map_err(|e| MutationError::Transport(format_reqwest_error(&e)))?;

    check_mutation(response, Some(id))?;
    Ok(())
  }

  async fn reset(&self, secret: &str) -> Result<String, MutationError> {
    let endpoint = self
      .reset_endpoint
      .clone()
      .ok_or(MutationError::Unsupported("reset"))?;

    let response = self
      .client
      .post(endpoint)
      .header(ADMIN_SECRET_HEADER, secret)
      .send()
      .await
      .map_err(|e| MutationError::Transport(format_reqwest_error(&e)))?;

    let status = response.status().as_u16();
    if status == 403 {
      return Err(MutationError::Forbidden);
    }

    let body: ApiResetResponse = check_mutation(response, None)?
      .json()
      .await
      .map_err(|e| MutationError::Decode(format_reqwest_error(&e)))?;

    Ok(body.summary())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::{Product, ProductFields};
  use std::sync::{Arc, Mutex};
  use tokio::io::{AsyncReadExt, AsyncWriteExt};
  use tokio::net::{TcpListener, TcpStream};

  type Requests = Arc<Mutex<Vec<String>>>;

  /// Read one request: headers plus a `Content-Length` body.
  async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
      let n = stream.read(&mut chunk).await.unwrap();
      if n == 0 {
        break;
      }
      buf.extend_from_slice(&chunk[..n]);

      let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
        continue;
      };
      let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
      let body_len = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
      if buf.len() >= end + 4 + body_len {
        break;
      }
    }
    String::from_utf8_lossy(&buf).into_owned()
  }

  /// Answer one connection per canned `(status, body)` and record what was sent.
  async fn serve(responses: Vec<(u16, &'static str)>) -> (Url, Requests) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests: Requests = Arc::new(Mutex::new(Vec::new()));
    let seen = requests.clone();

    tokio::spawn(async move {
      for (status, body) in responses {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        seen.lock().unwrap().push(request);
        let response = format!(
          "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
          status,
          body.len(),
          body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
      }
    });

    let url = Url::parse(&format!("http://{}/products", addr)).unwrap();
    (url, requests)
  }

  fn client() -> Client {
    Client::builder().no_proxy().build().unwrap()
  }

  #[tokio::test]
  async fn test_list_decodes_wire_products() {
    let body = r#"[
      {"id":2,"name":"Шкатулка","description":"","price":"1 500 ₽","priceNum":1500,
       "category":"Шкатулки","image":"https://cdn.example.dev/box.jpg","available":false},
      {"id":1,"name":"Ваза","description":null,"price":"","priceNum":null,
       "category":"Вазы","image":null,"available":true}
    ]"#;
    let (url, requests) = serve(vec![(200, body)]).await;
    let source = HttpSource::<Product>::new(client(), url);

    let products = source.list().await.unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].id, 2);
    assert_eq!(products[0].price_num, Some(1500));
    assert_eq!(products[0].image_url.as_deref(), Some("https://cdn.example.dev/box.jpg"));
    assert!(!products[0].available);
    assert_eq!(products[1].price_num, None);
    assert!(requests.lock().unwrap()[0].starts_with("GET /products HTTP/1.1"));
  }

  #[tokio::test]
  async fn test_list_error_status() {
    let (url, _) = serve(vec![(502, "{}")]).await;
    let source = HttpSource::<Product>::new(client(), url);

    assert_eq!(source.list().await.unwrap_err(), FetchError::Status { status: 502 });
  }

  #[tokio::test]
  async fn test_update_and_delete_address_record_by_id() {
    let (url, requests) = serve(vec![(200, "{}"), (404, r#"{"error":"not found"}"#)]).await;
    let source = HttpSource::<Product>::new(client(), url);
    let fields = ProductFields {
      name: "Ваза".into(),
      price_text: "По запросу".into(),
      price_num: None,
      is_available: false,
      ..Default::default()
    };

    source.update(5, &fields).await.unwrap();
    let err = source.delete(6).await.unwrap_err();

    assert_eq!(err, MutationError::NotFound { id: 6 });
    let requests = requests.lock().unwrap();
    assert!(requests[0].starts_with("PUT /products?id=5 HTTP/1.1"));
    assert!(requests[0].contains(r#""price_num":null"#));
    assert!(requests[0].contains(r#""is_available":false"#));
    assert!(requests[1].starts_with("DELETE /products?id=6 HTTP/1.1"));
  }

  #[tokio::test]
  async fn test_reset_sends_secret_and_maps_forbidden() {
    let ok = r#"{"success":true,"message":"Загружено 22 товаров","count":22}"#;
    let (url, requests) = serve(vec![(403, r#"{"error":"Forbidden"}"#), (200, ok)]).await;
    let reset_url = url.join("/reset-products").unwrap();
    let source = HttpSource::<Product>::new(client(), url).with_reset_endpoint(reset_url);

    assert_eq!(source.reset("guess").await.unwrap_err(), MutationError::Forbidden);
    assert_eq!(source.reset("s3cret").await.unwrap(), "Загружено 22 товаров");

    let requests = requests.lock().unwrap();
    assert!(requests[0].starts_with("POST /reset-products HTTP/1.1"));
    assert!(requests[0].to_lowercase().contains("x-admin-secret: guess"));
    assert!(requests[1].to_lowercase().contains("x-admin-secret: s3cret"));
  }

  #[tokio::test]
  async fn test_reset_without_endpoint_is_unsupported() {
    let url = Url::parse("http://127.0.0.1:9/products").unwrap();
    let source = HttpSource::<Product>::new(client(), url);

    assert_eq!(source.reset("s3cret").await.unwrap_err(), MutationError::Unsupported("reset"));
  }

  #[test]
  fn test_record_url_appends_id() {
    let base = Url::parse("https://functions.example.dev/products").unwrap();
    assert_eq!(
      record_url(&base, 42).as_str(),
      "https://functions.example.dev/products?id=42"
    );
  }

  #[test]
  fn test_record_url_keeps_existing_query() {
    let base = Url::parse("https://functions.example.dev/content?type=news").unwrap();
    assert_eq!(
      record_url(&base, 7).as_str(),
      "https://functions.example.dev/content?type=news&id=7"
    );
  }

  #[test]
  fn test_404_on_addressed_record_is_not_found() {
    assert_eq!(rejected(404, Some(9)), MutationError::NotFound { id: 9 });
  }

  #[test]
  fn test_other_statuses_are_uniform_rejections() {
    assert_eq!(rejected(404, None), MutationError::Rejected { status: 404 });
    assert_eq!(rejected(400, Some(1)), MutationError::Rejected { status: 400 });
    assert_eq!(rejected(500, Some(1)), MutationError::Rejected { status: 500 });
  }
}
