//! Login feature.

use std::sync::Arc;

use futures::future::BoxFuture;
use parking_lot::Mutex;

use crate::error::ClientError;
use crate::features::{Completion, spawn_with_completion};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedInUser {
    pub id: String,
    pub name: Option<String>,
}

impl LoggedInUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }
}

/// What the login screen needs: turn credentials into a user.
pub trait Authenticate: Send + Sync {
    fn login(&self, credentials: Credentials) -> BoxFuture<'_, Result<LoggedInUser, ClientError>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoginState {
    #[default]
    Idle,
    InFlight,
    LoggedIn(LoggedInUser),
    Failed(String),
}

impl LoginState {
    fn from_result(result: &Result<LoggedInUser, ClientError>) -> Self {
        match result {
            Ok(user) => Self::LoggedIn(user.clone()),
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

/// Login screen controller.
pub struct LoginController {
    login: Arc<dyn Authenticate>,
    state: Arc<Mutex<LoginState>>,
}

impl LoginController {
    pub fn new(login: Arc<dyn Authenticate>) -> Self {
        Self {
            login,
            state: Arc::new(Mutex::new(LoginState::Idle)),
        }
    }

    pub fn state(&self) -> LoginState {
        self.state.lock().clone()
    }

    pub async fn did_tap_login(&self, credentials: Credentials) -> LoginState {
        *self.state.lock() = LoginState::InFlight;
        let result = self.login.login(credentials).await;
        let next = LoginState::from_result(&result);
        *self.state.lock() = next.clone();
        next
    }

    /// Fire-and-forget variant: returns at once, `completion` runs when the
    /// login finishes. Dropping interest is just ignoring the callback.
    pub fn did_tap_login_with(&self, credentials: Credentials, completion: Completion<LoggedInUser>) {
        *self.state.lock() = LoginState::InFlight;
        let login = Arc::clone(&self.login);
        let state = Arc::clone(&self.state);
        spawn_with_completion(
            async move { login.login(credentials).await },
            Box::new(move |result| {
                *state.lock() = LoginState::from_result(&result);
                completion(result);
            }),
        );
    }
}
