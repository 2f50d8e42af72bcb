//! `login`: exchange credentials for the signed-in user.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::capabilities::{Endpoint, invoke};
use crate::client::{ApiClient, ApiRequest, ApiResponse};
use crate::error::ClientError;
use crate::features::login::{Authenticate, Credentials, LoggedInUser};

pub const LOGIN_PATH: &str = "auth/login";

#[derive(Serialize)]
struct LoginBody<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginReply {
    id: String,
    #[serde(default)]
    name: Option<String>,
}

/// `POST auth/login`.
pub struct LoginEndpoint;

impl Endpoint for LoginEndpoint {
    const NAME: &'static str = "login";

    type Input = Credentials;
    type Output = LoggedInUser;

    fn request(input: Credentials) -> Result<ApiRequest, ClientError> {
        ApiRequest::post(LOGIN_PATH).json(&LoginBody {
            username: &input.username,
            password: &input.password,
        })
    }

    fn decode(response: ApiResponse) -> Result<LoggedInUser, ClientError> {
        let reply: LoginReply = response.json()?;
        if reply.id.is_empty() {
            return Err(ClientError::Decode("login reply has an empty user id".into()));
        }
        Ok(LoggedInUser {
            id: reply.id,
            name: reply.name,
        })
    }
}

/// Adds `login` to [`ApiClient`].
pub trait LoginApi {
    fn login(
        &self,
        credentials: Credentials,
    ) -> impl Future<Output = Result<LoggedInUser, ClientError>> + Send;
}

impl LoginApi for ApiClient {
    fn login(
        &self,
        credentials: Credentials,
    ) -> impl Future<Output = Result<LoggedInUser, ClientError>> + Send {
        invoke::<LoginEndpoint>(self, credentials)
    }
}

/// [`Authenticate`] backed by the shared executor.
#[derive(Debug, Clone)]
pub struct RemoteLogin {
    client: Arc<ApiClient>,
}

impl RemoteLogin {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

impl Authenticate for RemoteLogin {
    fn login(&self, credentials: Credentials) -> BoxFuture<'_, Result<LoggedInUser, ClientError>> {
        Box::pin(LoginApi::login(self.client.as_ref(), credentials))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingTransport, json_response, test_client};

    #[test]
    fn test_request_shape() {
        let req = LoginEndpoint::request(Credentials::new("ada", "s3cret")).unwrap();
        assert_eq!(req.method, reqwest::Method::POST);
        assert_eq!(req.path, "auth/login");
        let body: serde_json::Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"username": "ada", "password": "s3cret"}));
    }

    #[test]
    fn test_decode_ignores_extra_reply_fields() {
        let user = LoginEndpoint::decode(json_response(
            &serde_json::json!({"id": "u1", "name": "Ada", "token": "t0k"}),
        ))
        .unwrap();
        assert_eq!(user, LoggedInUser { id: "u1".into(), name: Some("Ada".into()) });
    }

    #[test]
    fn test_decode_rejects_empty_id() {
        let err = LoginEndpoint::decode(json_response(&serde_json::json!({"id": ""})))
            .unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn test_login_through_executor() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_response(json_response(
            &serde_json::json!({"id": "u1", "name": "Ada"}),
        ));
        let client = test_client(transport.clone());

        let user = client.login(Credentials::new("ada", "pw")).await.unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.name.as_deref(), Some("Ada"));

        let (url, request) = transport.last_request().unwrap();
        assert_eq!(url.path(), "/auth/login");
        assert_eq!(request.method, reqwest::Method::POST);
    }

    #[tokio::test]
    async fn test_remote_login_contract_maps_failures() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_response(ApiResponse::new(401, "bad credentials"));
        let contract: Arc<dyn Authenticate> =
            Arc::new(RemoteLogin::new(Arc::new(test_client(transport))));

        let err = contract.login(Credentials::new("ada", "wrong")).await.unwrap_err();
        assert_eq!(err.status(), Some(401));
    }
}
