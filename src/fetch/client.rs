use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes prepared requests; wrappers such as [`super::AppToken`] decorate
/// a request before handing it to the inner client.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
