//! Compliance store backed by the Jamf Classic API.
//!
//! GETs `<base>/JSSResource/computers/serialnumber/<serial>` and PUTs the
//! counter attribute back to the same URL. Requests use basic auth with
//! certificate validation left on.

use anyhow::Context;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, StatusCode};
use url::Url;

use crate::config::ApiSettings;
use crate::error::StoreError;
use crate::types::{DeviceIdentity, SnoozeCount};

use super::{ComplianceStore, xml};

const XML_MEDIA_TYPE: &str = "application/xml";
const RESOURCE_ROOT: &str = "JSSResource";

/// HTTP client for the per-device computer record.
pub struct JamfStore {
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    settings: ApiSettings,
}

impl JamfStore {
    pub fn new(settings: ApiSettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("enforcer/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        // Requests are driven synchronously from the engine.
        let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

        Ok(Self {
            client,
            runtime,
            settings,
        })
    }

    async fn get_record(&self, url: &Url) -> Result<String, StoreError> {
        let response = self
            .send_with_retries("GET", url, || {
                self.client
                    .get(url.clone())
                    .basic_auth(&self.settings.username, Some(&self.settings.password))
                    .header(ACCEPT, XML_MEDIA_TYPE)
            })
            .await?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            StoreError::Unavailable(format!("failed to read response from {}: {}", url, e))
        })?;
        tracing::debug!(%url, %status, "Computer record response");

        if status != StatusCode::OK {
            return Err(StoreError::Unavailable(format!(
                "HTTP {} from {}",
                status, url
            )));
        }
        Ok(body)
    }

    async fn put_record(&self, url: &Url, body: String) -> Result<(), StoreError> {
        let response = self
            .send_with_retries("PUT", url, || {
                self.client
                    .put(url.clone())
                    .basic_auth(&self.settings.username, Some(&self.settings.password))
                    .header(ACCEPT, XML_MEDIA_TYPE)
                    .header(CONTENT_TYPE, XML_MEDIA_TYPE)
                    .body(body.clone())
            })
            .await?;

        let status = response.status();
        tracing::debug!(%url, %status, "Computer record update response");
        match status {
            StatusCode::OK | StatusCode::CREATED => Ok(()),
            other => Err(StoreError::Unavailable(format!(
                "HTTP {} from {}",
                other, url
            ))),
        }
    }

    /// Send a request, retrying after timeouts and connection failures.
    /// Responses of any status are returned as-is.
    async fn send_with_retries<F>(
        &self,
        method: &str,
        url: &Url,
        build: F,
    ) -> Result<Response, StoreError>
    where
        F: Fn() -> RequestBuilder,
    {
        let attempts = self.settings.retries.saturating_add(1);
        let mut attempt = 1;
        loop {
            match build().send().await {
                Ok(response) => return Ok(response),
                Err(err) if is_transient(&err) && attempt < attempts => {
                    tracing::warn!(
                        %url,
                        attempt,
                        attempts,
                        "{} failed ({}), retrying",
                        method,
                        err
                    );
                    attempt += 1;
                }
                Err(err) => {
                    return Err(StoreError::Unavailable(format!(
                        "{} {} failed after {} attempt(s): {}",
                        method, url, attempt, err
                    )));
                }
            }
        }
    }
}

impl ComplianceStore for JamfStore {
    fn fetch(&self, device: &DeviceIdentity) -> Result<SnoozeCount, StoreError> {
        let url = record_url(&self.settings.base_url, device);
        let document = self.runtime.block_on(self.get_record(&url))?;
        xml::decode_counter(&document, &self.settings.attribute.name)
    }

    fn store(&self, device: &DeviceIdentity, count: SnoozeCount) -> Result<(), StoreError> {
        let url = record_url(&self.settings.base_url, device);
        let body = xml::encode_counter(&self.settings.attribute, count);
        self.runtime.block_on(self.put_record(&url, body))
    }
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

/// URL of the computer record for `device`.
///
/// Accepts a base URL with or without the trailing `JSSResource` segment.
pub fn record_url(base: &Url, device: &DeviceIdentity) -> Url {
    let has_root = base
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .is_some_and(|last| last == RESOURCE_ROOT);

    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty();
        if !has_root {
            segments.push(RESOURCE_ROOT);
        }
        segments.extend(["computers", "serialnumber", device.as_str()]);
    }
    url
}
