//! `load_feed`: one page of the user's feed.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::Deserialize;

use crate::capabilities::{Endpoint, invoke};
use crate::client::{ApiClient, ApiRequest, ApiResponse};
use crate::error::ClientError;
use crate::features::feed::{FeedItem, FeedPage, FeedQuery, LoadFeed};

pub const FEED_PATH: &str = "feed";

#[derive(Deserialize)]
struct FeedReply {
    #[serde(default)]
    items: Vec<FeedItemReply>,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Deserialize)]
struct FeedItemReply {
    id: String,
    title: String,
    #[serde(default)]
    body: Option<String>,
}

impl From<FeedItemReply> for FeedItem {
    fn from(reply: FeedItemReply) -> Self {
        Self {
            id: reply.id,
            title: reply.title,
            body: reply.body,
        }
    }
}

/// `GET feed?limit=N[&cursor=C]`.
pub struct FeedEndpoint;

impl Endpoint for FeedEndpoint {
    const NAME: &'static str = "load_feed";

    type Input = FeedQuery;
    type Output = FeedPage;

    fn request(input: FeedQuery) -> Result<ApiRequest, ClientError> {
        if input.limit == 0 {
            return Err(ClientError::Encode("feed page limit must be positive".into()));
        }
        let mut request = ApiRequest::get(FEED_PATH).query("limit", input.limit.to_string());
        if let Some(cursor) = input.cursor {
            request = request.query("cursor", cursor);
        }
        Ok(request)
    }

    fn decode(response: ApiResponse) -> Result<FeedPage, ClientError> {
        let reply: FeedReply = response.json()?;
        Ok(FeedPage {
            items: reply.items.into_iter().map(FeedItem::from).collect(),
            // An empty cursor means the same as none.
            next_cursor: reply.next_cursor.filter(|c| !c.is_empty()),
        })
    }
}

/// Adds `load_feed` to [`ApiClient`].
pub trait FeedApi {
    fn load_feed(&self, query: FeedQuery) -> impl Future<Output = Result<FeedPage, ClientError>> + Send;
}

impl FeedApi for ApiClient {
    fn load_feed(&self, query: FeedQuery) -> impl Future<Output = Result<FeedPage, ClientError>> + Send {
        invoke::<FeedEndpoint>(self, query)
    }
}

/// [`LoadFeed`] backed by the shared executor.
#[derive(Debug, Clone)]
pub struct RemoteFeed {
    client: Arc<ApiClient>,
}

impl RemoteFeed {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

impl LoadFeed for RemoteFeed {
    fn load_feed(&self, query: FeedQuery) -> BoxFuture<'_, Result<FeedPage, ClientError>> {
        Box::pin(FeedApi::load_feed(self.client.as_ref(), query))
    }
}
