//! `upload`: store raw bytes under a file name.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::Deserialize;

use crate::capabilities::{Endpoint, invoke};
use crate::client::{ApiClient, ApiRequest, ApiResponse};
use crate::error::ClientError;
use crate::features::upload::{UploadData, UploadFile, UploadReceipt};

pub const UPLOADS_PATH: &str = "uploads";

#[derive(Deserialize)]
struct UploadReply {
    id: String,
    size: u64,
    #[serde(default)]
    url: Option<String>,
}

/// `POST uploads/{name}` with the raw bytes as body.
pub struct UploadEndpoint;

impl Endpoint for UploadEndpoint {
    const NAME: &'static str = "upload";

    type Input = UploadData;
    type Output = UploadReceipt;

    fn request(input: UploadData) -> Result<ApiRequest, ClientError> {
        let name = input.name.trim();
        if name.is_empty() || name.contains(['/', '\\', '?', '#', '%']) || name == "." || name == ".." {
            return Err(ClientError::Encode(format!("invalid upload name '{}'", input.name)));
        }
        Ok(ApiRequest::post(format!("{UPLOADS_PATH}/{name}"))
            .header("content-type", input.content_type)
            .body(input.bytes))
    }

    fn decode(response: ApiResponse) -> Result<UploadReceipt, ClientError> {
        let reply: UploadReply = response.json()?;
        Ok(UploadReceipt {
            id: reply.id,
            size: reply.size,
            url: reply.url,
        })
    }
}

/// Adds `upload` to [`ApiClient`].
pub trait UploadApi {
    fn upload(&self, data: UploadData) -> impl Future<Output = Result<UploadReceipt, ClientError>> + Send;
}

impl UploadApi for ApiClient {
    fn upload(&self, data: UploadData) -> impl Future<Output = Result<UploadReceipt, ClientError>> + Send {
        invoke::<UploadEndpoint>(self, data)
    }
}

/// [`UploadFile`] backed by the shared executor.
#[derive(Debug, Clone)]
pub struct RemoteUpload {
    client: Arc<ApiClient>,
}

impl RemoteUpload {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

impl UploadFile for RemoteUpload {
    fn upload(&self, data: UploadData) -> BoxFuture<'_, Result<UploadReceipt, ClientError>> {
        Box::pin(UploadApi::upload(self.client.as_ref(), data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingTransport, json_response, test_client};

    fn data(name: &str) -> UploadData {
        UploadData {
            name: name.into(),
            content_type: "image/png".into(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    #[test]
    fn test_request_shape() {
        let req = UploadEndpoint::request(data("avatar.png")).unwrap();
        assert_eq!(req.path, "uploads/avatar.png");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "image/png".to_string())]
        );
        assert_eq!(req.body.as_deref(), Some([0x89, b'P', b'N', b'G'].as_slice()));
        assert!(!req.is_idempotent());
    }

    #[test]
    fn test_rejects_path_like_names() {
        for bad in ["", "  ", "../etc", "a/b", "..", "x?y", "%2e%2e", "%2E.", "a%2fb"] {
            let err = UploadEndpoint::request(data(bad)).unwrap_err();
            assert!(matches!(err, ClientError::Encode(_)), "name {bad:?}");
        }
    }

    #[tokio::test]
    async fn test_encoded_dot_segments_never_leave_uploads() {
        let transport = Arc::new(RecordingTransport::new());
        let client = test_client(transport.clone());

        let err = client.upload(data("%2e%2e")).await.unwrap_err();
        assert!(matches!(err, ClientError::Encode(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_through_executor() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_response(json_response(
            &serde_json::json!({"id": "up-9", "size": 4, "url": "https://cdn.example.test/up-9"}),
        ));
        let client = test_client(transport.clone());

        let receipt = client.upload(data("avatar.png")).await.unwrap();
        assert_eq!(receipt.id, "up-9");
        assert_eq!(receipt.size, 4);

        let (url, request) = transport.last_request().unwrap();
        assert_eq!(url.path(), "/uploads/avatar.png");
        assert_eq!(request.body.map(|b| b.len()), Some(4));
    }
}
