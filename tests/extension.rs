//! Extending the executor and swapping contract implementations without
//! touching consumers.

use std::future::Future;
use std::sync::Arc;

use serde_json::json;

use switchboard::capabilities::{Endpoint, LoginApi, RemoteFeed, RemoteLogin, invoke};
use switchboard::features::{
    Authenticate, Credentials, FeedController, FeedPage, LoadFeed, LoggedInUser, LoginController,
    LoginState,
};
use switchboard::testing::{Canned, RecordingTransport, json_response, test_client};
use switchboard::wiring::{self, Assemble};
use switchboard::{ApiClient, ApiRequest, ApiResponse, ClientError, Holder, Registry};

// A capability defined entirely outside the crate: nothing in `switchboard`
// had to change for `ApiClient` to gain `health`.

struct HealthEndpoint;

impl Endpoint for HealthEndpoint {
    const NAME: &'static str = "health";

    type Input = ();
    type Output = bool;

    fn request(_input: ()) -> Result<ApiRequest, ClientError> {
        Ok(ApiRequest::get("health"))
    }

    fn decode(response: ApiResponse) -> Result<bool, ClientError> {
        Ok(response.text().trim() == "ok")
    }
}

trait HealthApi {
    fn health(&self) -> impl Future<Output = Result<bool, ClientError>> + Send;
}

impl HealthApi for ApiClient {
    fn health(&self) -> impl Future<Output = Result<bool, ClientError>> + Send {
        invoke::<HealthEndpoint>(self, ())
    }
}

fn login_reply() -> ApiResponse {
    json_response(&json!({"id": "u1", "name": "Ada"}))
}

#[tokio::test]
async fn adding_a_capability_leaves_login_unchanged() {
    let transport = Arc::new(RecordingTransport::new());
    let client = Arc::new(test_client(transport.clone()));

    transport.push_response(login_reply());
    let before = client.login(Credentials::new("ada", "pw")).await.unwrap();
    let (before_url, before_request) = transport.last_request().unwrap();

    // Use the freshly added capability on the same shared executor.
    transport.push_response(ApiResponse::new(200, "ok"));
    assert!(client.health().await.unwrap());

    transport.push_response(login_reply());
    let after = client.login(Credentials::new("ada", "pw")).await.unwrap();
    let (after_url, after_request) = transport.last_request().unwrap();

    assert_eq!(before, after);
    assert_eq!(before_url, after_url);
    assert_eq!(before_request, after_request);
}

#[tokio::test]
async fn binding_load_feed_later_does_not_disturb_login_consumer() {
    let transport = Arc::new(RecordingTransport::new());
    let client = Arc::new(test_client(transport.clone()));

    let mut registry = Registry::new();
    registry.bind::<dyn Authenticate>(Arc::new(RemoteLogin::new(Arc::clone(&client))));
    let login = LoginController::assemble(&registry).unwrap();

    transport.push_response(login_reply());
    let first = login.did_tap_login(Credentials::new("ada", "pw")).await;

    // The feed capability arrives after login is in use.
    registry.bind::<dyn LoadFeed>(Arc::new(RemoteFeed::new(Arc::clone(&client))));
    let feed = FeedController::assemble(&registry).unwrap();
    transport.push_response(json_response(&json!({"items": [{"id": "1", "title": "t"}]})));
    feed.view_did_load().await;
    assert_eq!(feed.items().len(), 1);

    transport.push_response(login_reply());
    let second = login.did_tap_login(Credentials::new("ada", "pw")).await;
    assert_eq!(first, second);
    assert_eq!(
        second,
        LoginState::LoggedIn(LoggedInUser {
            id: "u1".into(),
            name: Some("Ada".into()),
        })
    );
}

#[tokio::test]
async fn every_consumer_of_a_substituted_contract_sees_the_fixed_value() {
    // The executor would fail every request; the substitute must win anyway.
    let broken = Arc::new(test_client(Arc::new(RecordingTransport::new())));
    let mut registry = wiring::production(broken);
    let stub = Arc::new(Canned::ok(LoggedInUser::new("u1")));
    registry.bind::<dyn Authenticate>(stub.clone());

    let screens: Vec<LoginController> = (0..3)
        .map(|_| LoginController::assemble(&registry).unwrap())
        .collect();

    for screen in &screens {
        for password in ["a", "b", "c"] {
            let state = screen.did_tap_login(Credentials::new("anyone", password)).await;
            assert_eq!(state, LoginState::LoggedIn(LoggedInUser::new("u1")));
        }
    }
    assert_eq!(stub.calls(), 9);
}

#[tokio::test]
async fn restoring_a_binding_leaves_no_residue() {
    let transport = Arc::new(RecordingTransport::with_fallback(json_response(
        &json!({"items": [{"id": "real", "title": "From server"}]}),
    )));
    let mut registry = wiring::production(Arc::new(test_client(transport.clone())));

    // Test A: substitute the feed.
    let production_feed = registry
        .bind::<dyn LoadFeed>(Arc::new(Canned::ok(FeedPage::default())))
        .unwrap();
    let feed = FeedController::assemble(&registry).unwrap();
    feed.view_did_load().await;
    assert!(feed.items().is_empty());
    assert_eq!(transport.request_count(), 0);

    // Restore.
    registry.bind::<dyn LoadFeed>(production_feed);

    // Test B: sees only production behavior.
    let feed = FeedController::assemble(&registry).unwrap();
    feed.view_did_load().await;
    assert_eq!(feed.items()[0].id, "real");
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn executor_substitute_in_a_test_scoped_holder() {
    let holder = Holder::new(|| ApiClient::builder().build().unwrap());
    let transport = Arc::new(RecordingTransport::with_fallback(login_reply()));

    {
        let _guard = holder.install(Arc::new(test_client(transport.clone())));
        let registry = wiring::production(holder.get());
        let screens = wiring::Screens::assemble(&registry).unwrap();
        let state = screens.login.did_tap_login(Credentials::new("ada", "pw")).await;
        assert!(matches!(state, LoginState::LoggedIn(_)));
    }

    // The substitute was never counted as a construction and is gone now.
    assert_eq!(holder.constructions(), 0);
    assert!(!holder.is_initialized());
    assert_eq!(transport.request_count(), 1);
}
