//! Substitutes for tests: a scripted transport and canned contract
//! implementations.
//!
//! Nothing here touches global state. Install a substitute by handing it to
//! the consumer, binding it in a [`crate::wiring::Registry`], or by putting an
//! executor built on [`RecordingTransport`] into a [`crate::holder::Holder`].

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::BoxFuture;
use parking_lot::Mutex;
use serde::Serialize;
use url::Url;

use crate::client::{ApiClient, ApiRequest, ApiResponse};
use crate::error::ClientError;
use crate::features::feed::{FeedPage, FeedQuery, LoadFeed};
use crate::features::login::{Authenticate, Credentials, LoggedInUser};
use crate::features::upload::{UploadData, UploadFile, UploadReceipt};
use crate::net::Transport;

/// Base URL used by [`test_client`].
pub const TEST_BASE_URL: &str = "http://switchboard.test/";

/// Executor over `transport` with no retries.
pub fn test_client(transport: Arc<dyn Transport>) -> ApiClient {
    let base = Url::parse(TEST_BASE_URL).expect("test base URL is valid");
    ApiClient::with_transport(base, transport)
}

/// A 200 response carrying `value` as JSON.
///
/// Panics if `value` cannot be serialized.
pub fn json_response<T: Serialize + ?Sized>(value: &T) -> ApiResponse {
    let body = serde_json::to_vec(value).expect("test response body serializes to JSON");
    ApiResponse::new(200, body).with_header("content-type", "application/json")
}

// ---------------------------------------------------------------------------
// RecordingTransport
// ---------------------------------------------------------------------------

/// Transport that replays queued outcomes and records every request.
///
/// When the queue is empty the fallback response is returned, or a
/// [`ClientError::Transport`] if none is set.
#[derive(Default)]
pub struct RecordingTransport {
    queue: Mutex<VecDeque<Result<ApiResponse, ClientError>>>,
    fallback: Mutex<Option<ApiResponse>>,
    requests: Mutex<Vec<(Url, ApiRequest)>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every request with `response` once the queue is drained.
    pub fn with_fallback(response: ApiResponse) -> Self {
        let transport = Self::new();
        *transport.fallback.lock() = Some(response);
        transport
    }

    pub fn push_response(&self, response: ApiResponse) {
        self.queue.lock().push_back(Ok(response));
    }

    pub fn push_error(&self, error: ClientError) {
        self.queue.lock().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<(Url, ApiRequest)> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<(Url, ApiRequest)> {
        self.requests.lock().last().cloned()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, url: Url, request: ApiRequest) -> BoxFuture<'_, Result<ApiResponse, ClientError>> {
        self.requests.lock().push((url, request));
        let outcome = match self.queue.lock().pop_front() {
            Some(outcome) => outcome,
            None => self
                .fallback
                .lock()
                .clone()
                .ok_or_else(|| ClientError::Transport("no scripted response left".into())),
        };
        Box::pin(std::future::ready(outcome))
    }

    fn name(&self) -> &str {
        "recording"
    }
}

// ---------------------------------------------------------------------------
// Canned
// ---------------------------------------------------------------------------

/// Contract substitute that always produces the same outcome and counts calls.
pub struct Canned<T> {
    outcome: Result<T, String>,
    calls: AtomicUsize,
}

impl<T: Clone> Canned<T> {
    pub fn ok(value: T) -> Self {
        Self {
            outcome: Ok(value),
            calls: AtomicUsize::new(0),
        }
    }

    /// Every call fails with [`ClientError::Transport`] carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next(&self) -> Result<T, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Ok(value) => Ok(value.clone()),
            Err(message) => Err(ClientError::Transport(message.clone())),
        }
    }
}

impl Authenticate for Canned<LoggedInUser> {
    fn login(&self, _credentials: Credentials) -> BoxFuture<'_, Result<LoggedInUser, ClientError>> {
        Box::pin(std::future::ready(self.next()))
    }
}

impl LoadFeed for Canned<FeedPage> {
    fn load_feed(&self, _query: FeedQuery) -> BoxFuture<'_, Result<FeedPage, ClientError>> {
        Box::pin(std::future::ready(self.next()))
    }
}

impl UploadFile for Canned<UploadReceipt> {
    fn upload(&self, _data: UploadData) -> BoxFuture<'_, Result<UploadReceipt, ClientError>> {
        Box::pin(std::future::ready(self.next()))
    }
}
