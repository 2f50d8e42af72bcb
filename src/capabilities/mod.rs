//! Capability modules.
//!
//! A capability is one named operation on the shared [`ApiClient`]: an
//! [`Endpoint`] describing how to build the request and decode the response,
//! an extension trait that attaches the operation to `ApiClient`, and a small
//! `Remote*` type that satisfies the consumer contract using the executor.
//!
//! Capabilities are independent of each other. Adding one means adding a
//! module here and a binding in [`crate::wiring`]; nothing else changes.

pub mod feed;
pub mod login;
pub mod upload;

use tracing::{debug, instrument, warn};

use crate::client::{ApiClient, ApiRequest, ApiResponse};
use crate::error::ClientError;

pub use feed::{FeedApi, FeedEndpoint, RemoteFeed};
pub use login::{LoginApi, LoginEndpoint, RemoteLogin};
pub use upload::{RemoteUpload, UploadApi, UploadEndpoint};

/// Request/response mapping for one capability.
pub trait Endpoint {
    /// Capability name used in logs.
    const NAME: &'static str;

    type Input: Send;
    type Output;

    fn request(input: Self::Input) -> Result<ApiRequest, ClientError>;

    fn decode(response: ApiResponse) -> Result<Self::Output, ClientError>;
}

/// Run endpoint `E` on `client`. The only path from a capability to
/// [`ApiClient::execute`].
#[instrument(skip_all, fields(capability = E::NAME))]
pub async fn invoke<E: Endpoint>(client: &ApiClient, input: E::Input) -> Result<E::Output, ClientError> {
    let request = E::request(input)?;
    let response = client.execute(request).await?;
    match E::decode(response) {
        Ok(output) => {
            debug!("Capability completed");
            Ok(output)
        }
        Err(e) => {
            warn!(error = %e, "Failed to decode capability response");
            Err(e)
        }
    }
}
