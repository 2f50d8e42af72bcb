//! Feed feature.

use std::sync::Arc;

use futures::future::BoxFuture;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::ClientError;

/// Default page size requested by the feed screen.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub cursor: Option<String>,
    pub limit: u32,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            cursor: None,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub id: String,
    pub title: String,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedPage {
    pub items: Vec<FeedItem>,
    pub next_cursor: Option<String>,
}

/// What the feed screen needs: one page of items per query.
pub trait LoadFeed: Send + Sync {
    fn load_feed(&self, query: FeedQuery) -> BoxFuture<'_, Result<FeedPage, ClientError>>;
}

#[derive(Debug, Default)]
struct FeedState {
    items: Vec<FeedItem>,
    next_cursor: Option<String>,
    last_error: Option<String>,
}

/// Feed screen controller.
pub struct FeedController {
    load_feed: Arc<dyn LoadFeed>,
    page_size: u32,
    state: Mutex<FeedState>,
}

impl FeedController {
    pub fn new(load_feed: Arc<dyn LoadFeed>) -> Self {
        Self::with_page_size(load_feed, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(load_feed: Arc<dyn LoadFeed>, page_size: u32) -> Self {
        Self {
            load_feed,
            page_size,
            state: Mutex::new(FeedState::default()),
        }
    }

    /// Load the first page, replacing whatever is shown.
    pub async fn view_did_load(&self) {
        let query = FeedQuery {
            cursor: None,
            limit: self.page_size,
        };
        match self.load_feed.load_feed(query).await {
            Ok(page) => {
                let mut state = self.state.lock();
                state.items = page.items;
                state.next_cursor = page.next_cursor;
                state.last_error = None;
            }
            Err(e) => self.state.lock().last_error = Some(e.to_string()),
        }
    }

    /// Append the next page. Returns `false` when there is nothing more to load
    /// or the request failed.
    pub async fn load_more(&self) -> bool {
        let Some(cursor) = self.state.lock().next_cursor.clone() else {
            debug!("Feed exhausted");
            return false;
        };
        let query = FeedQuery {
            cursor: Some(cursor),
            limit: self.page_size,
        };
        match self.load_feed.load_feed(query).await {
            Ok(page) => {
                let mut state = self.state.lock();
                state.items.extend(page.items);
                state.next_cursor = page.next_cursor;
                state.last_error = None;
                true
            }
            Err(e) => {
                self.state.lock().last_error = Some(e.to_string());
                false
            }
        }
    }

    pub fn items(&self) -> Vec<FeedItem> {
        self.state.lock().items.clone()
    }

    pub fn next_cursor(&self) -> Option<String> {
        self.state.lock().next_cursor.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.lock().last_error.clone()
    }
}
