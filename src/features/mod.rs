//! Feature modules: the consumers of the shared client.
//!
//! Each feature declares the narrow contract it needs (one operation, one
//! trait) next to its controller. Controllers hold `Arc<dyn Contract>` values
//! handed to them at assembly time and never name the executor.

pub mod feed;
pub mod login;
pub mod upload;

use std::future::Future;

use tracing::warn;

use crate::error::ClientError;

pub use feed::{FeedController, FeedItem, FeedPage, FeedQuery, LoadFeed};
pub use login::{Authenticate, Credentials, LoggedInUser, LoginController, LoginState};
pub use upload::{AvatarController, UploadData, UploadFile, UploadReceipt};

/// Callback receiving the outcome of a contract invocation.
pub type Completion<T> = Box<dyn FnOnce(Result<T, ClientError>) + Send + 'static>;

/// Run `operation` on the current tokio runtime and hand its result to
/// `completion`.
///
/// Returns immediately. Without a runtime the completion is called right away
/// with [`ClientError::NoRuntime`].
pub fn spawn_with_completion<T, F>(operation: F, completion: Completion<T>)
where
    T: Send + 'static,
    F: Future<Output = Result<T, ClientError>> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                completion(operation.await);
            });
        }
        Err(_) => {
            warn!("No tokio runtime on this thread; failing the request");
            completion(Err(ClientError::NoRuntime));
        }
    }
}
