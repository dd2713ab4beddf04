use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};

/// Header Socrata reads application tokens from.
pub const APP_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-app-token");

/// An [`HttpClient`] wrapper that sends a Socrata application token.
///
/// Requests without a token are throttled more aggressively by the open-data
/// portal but still succeed, so the token is optional and the wrapper passes
/// requests through untouched when it is `None`.
pub struct AppToken<C> {
    pub inner: C,
    pub token: Option<HeaderValue>,
}

impl<C> AppToken<C> {
    /// Wraps `inner`, sending `token` on every request when given.
    ///
    /// # Errors
    ///
    /// Returns an error if the token contains characters not allowed in a header.
    pub fn new(inner: C, token: Option<&str>) -> anyhow::Result<Self> {
        let token = token
            .map(HeaderValue::from_str)
            .transpose()
            .map_err(|e| anyhow::anyhow!("invalid app token: {e}"))?;
        Ok(Self { inner, token })
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for AppToken<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        if let Some(token) = &self.token {
            req.headers_mut().insert(APP_TOKEN_HEADER, token.clone());
        }
        self.inner.execute(req).await
    }
}
