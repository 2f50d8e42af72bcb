//! Networking traits.

use futures::future::BoxFuture;
use url::Url;

use crate::client::{ApiRequest, ApiResponse};
use crate::error::ClientError;

/// The raw "perform a request, get a response" primitive.
///
/// The executor resolves the URL and owns retry policy; a transport only
/// moves one request over the wire. Any HTTP status is a successful exchange
/// at this level. Returns a boxed future so the trait stays dyn-compatible
/// (`Arc<dyn Transport>`).
pub trait Transport: Send + Sync {
    fn send(&self, url: Url, request: ApiRequest) -> BoxFuture<'_, Result<ApiResponse, ClientError>>;

    /// Short name for logs.
    fn name(&self) -> &str {
        "transport"
    }
}
