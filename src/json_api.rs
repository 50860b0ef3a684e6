use anyhow::{Context, Result, bail};
use log::debug;
use reqwest::header::{ACCEPT, COOKIE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Thin JSON client bound to a single API base url
#[derive(Clone)]
pub struct JsonApi {
    client: Client,
    base: Url,
}

impl JsonApi {
    /// Unauthenticated client, used for the ticket exchange
    pub fn new(base: Url, allow_invalid_certs: bool) -> Result<Self> {
        Self::with_headers(base, allow_invalid_certs, Self::default_headers()?)
    }

    /// Client which sends `cookie` with every request
    pub fn cookie(base: Url, cookie: &str, allow_invalid_certs: bool) -> Result<Self> {
        let mut headers = Self::default_headers()?;
        let mut value: HeaderValue = cookie.parse().context("Invalid cookie value")?;
        value.set_sensitive(true);
        headers.insert(COOKIE, value);
        Self::with_headers(base, allow_invalid_certs, headers)
    }

    fn default_headers() -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, "pve-disk-map/1.0".parse()?);
        headers.insert(ACCEPT, "application/json; charset=utf-8".parse()?);
        Ok(headers)
    }

    fn with_headers(base: Url, allow_invalid_certs: bool, headers: HeaderMap) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(allow_invalid_certs)
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, base })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!(">> GET {}", path);
        let rsp = self
            .client
            .get(self.base.join(path)?)
            .send()
            .await
            .with_context(|| format!("Failed to send request GET {}", path))?;
        Self::parse(Method::GET, path, rsp, false).await
    }

    /// POST `body` url-encoded, as the ticket endpoint expects
    ///
    /// The response body is never logged since it carries the session ticket
    pub async fn post_form<T: DeserializeOwned, R: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &R,
    ) -> Result<T> {
        debug!(">> POST {}", path);
        let rsp = self
            .client
            .post(self.base.join(path)?)
            .form(body)
            .send()
            .await
            .with_context(|| format!("Failed to send request POST {}", path))?;
        Self::parse(Method::POST, path, rsp, true).await
    }

    async fn parse<T: DeserializeOwned>(
        method: Method,
        path: &str,
        rsp: reqwest::Response,
        sensitive: bool,
    ) -> Result<T> {
        let status = rsp.status();
        let text = rsp.text().await?;
        #[cfg(debug_assertions)]
        debug!("<< {}", loggable_body(&text, sensitive));
        if status.is_success() {
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse JSON from {} {}", method, path))
        } else {
            bail!("{} {}: {}: {}", method, path, status, &text);
        }
    }
}

#[cfg(any(debug_assertions, test))]
fn loggable_body(text: &str, sensitive: bool) -> &str {
    if sensitive { "<redacted>" } else { text }
}
