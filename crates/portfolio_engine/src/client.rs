use std::sync::{Arc, RwLock};

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::settings::BackendSettings;
use crate::{FailureKind, RemoteError};

/// Shared HTTP plumbing for the table, storage and auth endpoints.
///
/// Holds the access token of the signed-in user, if any; requests fall back
/// to the anon key when nobody is signed in.
#[derive(Debug)]
pub struct BackendClient {
    settings: BackendSettings,
    base: Url,
    http: reqwest::Client,
    access_token: RwLock<Option<String>>,
}

impl BackendClient {
    pub fn new(settings: BackendSettings) -> Result<Arc<Self>, RemoteError> {
        let mut base = Url::parse(&settings.base_url)
            .map_err(|err| RemoteError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .default_headers(default_headers(&settings.anon_key)?)
            .build()
            .map_err(|err| RemoteError::new(FailureKind::Network, err.to_string()))?;

        Ok(Arc::new(Self {
            settings,
            base,
            http,
            access_token: RwLock::new(None),
        }))
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    pub fn set_access_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.access_token.write() {
            *guard = token;
        }
    }

    pub fn has_access_token(&self) -> bool {
        self.access_token
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Resolves `path` (no leading slash) against the backend root.
    pub fn endpoint(&self, path: &str) -> Result<Url, RemoteError> {
        self.base
            .join(path)
            .map_err(|err| RemoteError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let bearer = self
            .access_token
            .read()
            .ok()
            .and_then(|guard| guard.clone())
            .unwrap_or_else(|| self.settings.anon_key.clone());
        self.http
            .request(method, url)
            .header(AUTHORIZATION, format!("Bearer {bearer}"))
    }

    pub async fn send(&self, request: RequestBuilder) -> Result<Response, RemoteError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(RemoteError::new(
            FailureKind::HttpStatus(status.as_u16()),
            error_message(&body).unwrap_or_else(|| status.to_string()),
        ))
    }

    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, RemoteError> {
        let response = self.send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| RemoteError::new(FailureKind::Decode, err.to_string()))
    }
}

fn default_headers(anon_key: &str) -> Result<HeaderMap, RemoteError> {
    let mut headers = HeaderMap::new();
    let key = HeaderValue::from_str(anon_key)
        .map_err(|err| RemoteError::new(FailureKind::NotConfigured, err.to_string()))?;
    headers.insert("apikey", key);
    Ok(headers)
}

/// Pulls the human-readable part out of an error body from any of the backend services.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "msg", "error_description", "error"]
        .iter()
        .find_map(|field| value.get(field).and_then(|v| v.as_str()))
        .map(ToOwned::to_owned)
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        return RemoteError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return RemoteError::new(FailureKind::Decode, err.to_string());
    }
    RemoteError::new(FailureKind::Network, err.to_string())
}
