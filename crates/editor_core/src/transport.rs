//! Shared request-dispatch layer: every content call goes through [`ApiClient`],
//! which owns the HTTP client, resolves paths against the base URL and attaches
//! the session credentials.

use std::time::Duration;

use reqwest::{multipart, Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use shared::{error::ApiError, protocol::ImageUploadResponse};
use tracing::{debug, warn};
use url::Url;

use crate::{error::ClientError, upload::ImageUpload};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const UPLOAD_PATH: &str = "website/upload-image/";

/// Session material issued by the authentication service. Read-only once the
/// client is built.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub bearer_token: Option<String>,
    pub csrf_token: Option<String>,
    pub operator: Option<String>,
}

pub struct ApiClient {
    http: Client,
    base_url: Url,
    credentials: Credentials,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let base_url = normalize_base_url(base_url)?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|source| ClientError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                source,
            })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send::<(), T>(Method::GET, path, None).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PUT, path, Some(body)).await
    }

    /// DELETE; the (usually empty) response body is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let url = self.endpoint(path)?;
        debug!(method = "DELETE", %url, "dispatching content request");
        self.execute(self.request(Method::DELETE, url), path)
            .await
            .map(|_| ())
    }

    pub async fn upload_image(&self, upload: &ImageUpload) -> Result<String, ClientError> {
        let url = self.endpoint(UPLOAD_PATH)?;
        debug!(
            method = "POST",
            %url,
            filename = %upload.filename,
            size = upload.bytes.len(),
            "uploading image"
        );

        let mut part = multipart::Part::bytes(upload.bytes.clone()).file_name(upload.filename.clone());
        if let Some(mime_type) = &upload.mime_type {
            part = part.mime_str(mime_type)?;
        }
        let form = multipart::Form::new().part("image", part);

        let body = self
            .execute(self.request(Method::POST, url).multipart(form), UPLOAD_PATH)
            .await?;
        let response: ImageUploadResponse = decode(UPLOAD_PATH, &body)?;
        Ok(response.image_url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let unsafe_method = !matches!(method, Method::GET | Method::HEAD | Method::OPTIONS);
        let mut request = self.http.request(method, url);
        if let Some(token) = &self.credentials.bearer_token {
            request = request.bearer_auth(token);
        }
        if unsafe_method {
            if let Some(csrf) = &self.credentials.csrf_token {
                request = request.header(CSRF_HEADER, csrf);
            }
        }
        request
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        debug!(method = %method, %url, "dispatching content request");
        let mut request = self.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let bytes = self.execute(request, path).await?;
        decode(path, &bytes)
    }

    async fn execute(&self, request: RequestBuilder, path: &str) -> Result<Vec<u8>, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            let err = ApiError::from_response(status.as_u16(), &body);
            warn!(path, status = status.as_u16(), detail = ?err.detail, "content request rejected");
            return Err(err.into());
        }
        Ok(body.to_vec())
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: &[u8]) -> Result<T, ClientError> {
    serde_json::from_slice(body).map_err(|source| ClientError::Decode {
        path: path.to_string(),
        source,
    })
}

/// `Url::join` drops the last segment unless the base ends with `/`.
pub fn normalize_base_url(raw: &str) -> Result<Url, ClientError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&with_slash).map_err(|source| ClientError::InvalidUrl {
        url: trimmed.to_string(),
        source,
    })
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
