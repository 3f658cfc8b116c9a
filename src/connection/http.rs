use super::{CollectionBackend, Endpoints, ListScope, UpdateShape};
use crate::core::{Identity, PortalError, Record, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Thin JSON-over-HTTP client rooted at one service base URL.
#[derive(Debug, Clone)]
pub struct RestClient {
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl RestClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            timeout,
            http: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            self.base_url.clone()
        } else if trimmed.starts_with('/') {
            format!("{}{}", self.base_url, trimmed)
        } else {
            format!("{}/{}", self.base_url, trimmed)
        }
    }

    pub async fn get_json<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .http
            .get(self.endpoint(path))
            .timeout(self.timeout)
            .send()
            .await?;
        decode_json_response(response).await
    }

    /// GET returning the raw body text (some user-service checks answer in
    /// plain text).
    pub async fn get_text(&self, path: &str) -> Result<String> {
        let response = self
            .http
            .get(self.endpoint(path))
            .timeout(self.timeout)
            .send()
            .await?;
        read_success_body(response).await
    }

    pub async fn post_json<Req, Res>(&self, path: &str, payload: &Req) -> Result<Res>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.endpoint(path))
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await?;
        decode_json_response(response).await
    }

    /// POST whose response body is irrelevant beyond its status.
    pub async fn post_unit<Req>(&self, path: &str, payload: &Req) -> Result<()>
    where
        Req: Serialize + ?Sized,
    {
        let response = self
            .http
            .post(self.endpoint(path))
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await?;
        read_success_body(response).await.map(|_| ())
    }

    pub async fn put_json<Req>(&self, path: &str, payload: &Req) -> Result<()>
    where
        Req: Serialize + ?Sized,
    {
        let response = self
            .http
            .put(self.endpoint(path))
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await?;
        read_success_body(response).await.map(|_| ())
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.endpoint(path))
            .timeout(self.timeout)
            .send()
            .await?;
        read_success_body(response).await.map(|_| ())
    }
}

/// REST collection resource reached over HTTP
///
/// # Examples
///
/// ```ignore
/// let visitors = HttpCollection::new("http://localhost:8084/communityhub/user/visitors", timeout)?;
/// let rows = visitors.list(&ListScope::Owner("42".into())).await?;
/// ```
#[derive(Debug, Clone)]
pub struct HttpCollection {
    client: RestClient,
    endpoints: Endpoints,
    update_shape: UpdateShape,
}

impl HttpCollection {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: RestClient::new(base_url, timeout)?,
            endpoints: Endpoints::default(),
            update_shape: UpdateShape::default(),
        })
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_update_shape(mut self, shape: UpdateShape) -> Self {
        self.update_shape = shape;
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn client(&self) -> &RestClient {
        &self.client
    }
}

#[async_trait]
impl CollectionBackend for HttpCollection {
    async fn list(&self, scope: &ListScope) -> Result<Vec<Record>> {
        let rows: Vec<Value> = self.client.get_json(&self.endpoints.list_path(scope)).await?;
        rows.into_iter()
            .map(|row| {
                Record::from_json(row)
                    .ok_or_else(|| PortalError::Decode("collection item is not an object".to_string()))
            })
            .collect()
    }

    async fn create(&self, body: Record) -> Result<Record> {
        let created: Value = self.client.post_json(&self.endpoints.create, &body).await?;
        Record::from_json(created)
            .ok_or_else(|| PortalError::Decode("create response is not an object".to_string()))
    }

    async fn update(&self, identity: &Identity, value: Value) -> Result<()> {
        let body = self.update_shape.body(identity, value);
        self.client.put_json(&self.endpoints.update, &body).await
    }

    async fn delete(&self, identity: &Identity) -> Result<()> {
        self.client.delete(&self.endpoints.delete_path(identity)).await
    }
}

pub fn format_http_error(status: u16, body: &[u8]) -> PortalError {
    let text = String::from_utf8_lossy(body).trim().to_string();
    let body = if text.is_empty() { "<empty>".to_string() } else { text };
    PortalError::Network { status, body }
}

fn normalize_base_url(base_url: &str) -> Result<String> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err(PortalError::Config("service base URL is empty".to_string()));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

async fn read_success_body(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|err| PortalError::Transport(err.to_string()))?;

    if !status.is_success() {
        return Err(format_http_error(status.as_u16(), &bytes));
    }

    Ok(String::from_utf8_lossy(&bytes).to_string())
}

async fn decode_json_response<T>(response: reqwest::Response) -> Result<T>
where
    T: DeserializeOwned,
{
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|err| PortalError::Transport(err.to_string()))?;

    if !status.is_success() {
        return Err(format_http_error(status.as_u16(), &bytes));
    }

    serde_json::from_slice::<T>(&bytes).map_err(|err| PortalError::Decode(err.to_string()))
}
