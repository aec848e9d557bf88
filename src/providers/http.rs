// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared HTTP plumbing for the provider API clients.
//!
//! Requests are sent exactly once. Rate limiting and retries are left to the
//! caller's environment; a failed request surfaces as a [`ProviderError`]
//! carrying the HTTP status and response body.

use crate::constants::HTTP_REQUEST_TIMEOUT_SECS;
use crate::dns_errors::ProviderError;
use crate::metrics::record_provider_error;
use reqwest::{Client as HttpClient, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

/// How requests authenticate against the provider API.
#[derive(Clone)]
pub(crate) enum ApiAuth {
    /// Token sent in a custom header
    Header { name: &'static str, token: String },
    /// `Authorization: Bearer <token>`
    Bearer(String),
}

impl std::fmt::Debug for ApiAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Header { name, .. } => write!(f, "Header({name}: <redacted>)"),
            Self::Bearer(_) => f.write_str("Bearer(<redacted>)"),
        }
    }
}

/// Minimal JSON API client bound to one base URL.
#[derive(Debug, Clone)]
pub(crate) struct ApiClient {
    provider: &'static str,
    http: HttpClient,
    base_url: String,
    auth: ApiAuth,
}

/// Normalize an API base URL: add a scheme if missing and drop trailing slashes.
pub(crate) fn build_api_url(server: &str) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        server.trim_end_matches('/').to_string()
    } else {
        format!("https://{}", server.trim_end_matches('/'))
    }
}

impl ApiClient {
    pub(crate) fn new(
        provider: &'static str,
        base_url: &str,
        auth: ApiAuth,
    ) -> Result<Self, ProviderError> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                ProviderError::other(provider, format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            provider,
            http,
            base_url: build_api_url(base_url),
            auth,
        })
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&format!("{}{path}", self.base_url)).map_err(|e| {
            ProviderError::other(self.provider, format!("Invalid API URL for {path}: {e}"))
        })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Send a request and return the raw response body.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] if the request cannot be sent or the API
    /// answers with a non-success status.
    pub(crate) async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<String, ProviderError> {
        let url = self.url(path, query)?;

        debug!(
            provider = self.provider,
            method = %method,
            url = %url,
            has_body = body.is_some(),
            "HTTP API request"
        );

        let mut request = self.http.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        request = match &self.auth {
            ApiAuth::Header { name, token } => request.header(*name, token),
            ApiAuth::Bearer(token) => request.bearer_auth(token),
        };

        let response = request.send().await.map_err(|e| {
            let err = ProviderError::connection(self.provider, e);
            record_provider_error(self.provider, err.reason());
            err
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            ProviderError::other(self.provider, format!("Failed to read response body: {e}"))
        })?;

        if !status.is_success() {
            error!(
                provider = self.provider,
                method = %method,
                url = %url,
                status = %status,
                error = %text,
                "HTTP API request failed"
            );
            let err = ProviderError::from_status(self.provider, status.as_u16(), &text);
            record_provider_error(self.provider, err.reason());
            return Err(err);
        }

        debug!(
            provider = self.provider,
            method = %method,
            url = %url,
            status = %status,
            response_len = text.len(),
            "HTTP API request successful"
        );

        Ok(text)
    }

    /// Send a request and decode the JSON response body.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::send`], plus a decoding failure.
    pub(crate) async fn send_json<R, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<R, ProviderError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let text = self.send(method, path, query, body).await?;
        serde_json::from_str(&text).map_err(|e| {
            ProviderError::other(
                self.provider,
                format!("Failed to decode response from {path}: {e}"),
            )
        })
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod http_tests;
