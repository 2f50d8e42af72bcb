//! Startup wiring.
//!
//! A [`Registry`] maps each contract type (`dyn Authenticate`, `dyn LoadFeed`,
//! ...) to the implementation that satisfies it. [`production`] fills it with
//! capabilities backed by the shared executor; tests fill it with substitutes.
//! Consumers are then built by [`Assemble`], which fails immediately when a
//! contract they need has no binding.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::capabilities::{RemoteFeed, RemoteLogin, RemoteUpload};
use crate::client::ApiClient;
use crate::features::{
    Authenticate, AvatarController, FeedController, LoadFeed, LoginController, UploadFile,
};
use crate::holder;

/// Configuration failures detected while assembling consumers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WiringError {
    #[error("No binding for contract `{contract}` required by {consumer}")]
    MissingBinding {
        contract: &'static str,
        consumer: &'static str,
    },
}

struct Binding {
    contract: &'static str,
    /// Always an `Arc<C>` for the contract type `C` keyed by this entry.
    value: Box<dyn Any + Send + Sync>,
}

/// Contract type -> implementation.
#[derive(Default)]
pub struct Registry {
    bindings: HashMap<TypeId, Binding>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `implementation` to contract `C`, returning the previous binding
    /// so the caller can restore it later.
    pub fn bind<C>(&mut self, implementation: Arc<C>) -> Option<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let contract = type_name::<C>();
        let previous = self.bindings.insert(
            TypeId::of::<C>(),
            Binding {
                contract,
                value: Box::new(implementation),
            },
        );
        match previous {
            Some(binding) => {
                debug!(contract, "Replacing contract binding");
                downcast::<C>(binding)
            }
            None => {
                debug!(contract, "Bound contract");
                None
            }
        }
    }

    /// Remove the binding for `C`, returning it.
    pub fn unbind<C>(&mut self) -> Option<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.bindings.remove(&TypeId::of::<C>()).and_then(downcast::<C>)
    }

    /// The implementation bound to `C`, if any.
    pub fn get<C>(&self) -> Option<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.bindings
            .get(&TypeId::of::<C>())
            .and_then(|binding| binding.value.downcast_ref::<Arc<C>>())
            .map(Arc::clone)
    }

    /// The implementation bound to `C`, or a configuration error naming the
    /// consumer that needed it.
    pub fn resolve<C>(&self, consumer: &'static str) -> Result<Arc<C>, WiringError>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.get::<C>().ok_or_else(|| {
            let contract = type_name::<C>();
            warn!(contract, consumer, "Missing contract binding");
            WiringError::MissingBinding { contract, consumer }
        })
    }

    pub fn contains<C>(&self) -> bool
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.bindings.contains_key(&TypeId::of::<C>())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Names of the bound contracts, sorted.
    pub fn contracts(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.bindings.values().map(|b| b.contract).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("contracts", &self.contracts())
            .finish()
    }
}

fn downcast<C>(binding: Binding) -> Option<Arc<C>>
where
    C: ?Sized + Send + Sync + 'static,
{
    binding.value.downcast::<Arc<C>>().ok().map(|boxed| *boxed)
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Build a consumer from the contracts bound in a [`Registry`].
pub trait Assemble: Sized {
    fn assemble(registry: &Registry) -> Result<Self, WiringError>;
}

impl Assemble for LoginController {
    fn assemble(registry: &Registry) -> Result<Self, WiringError> {
        Ok(Self::new(registry.resolve::<dyn Authenticate>("LoginController")?))
    }
}

impl Assemble for FeedController {
    fn assemble(registry: &Registry) -> Result<Self, WiringError> {
        Ok(Self::new(registry.resolve::<dyn LoadFeed>("FeedController")?))
    }
}

impl Assemble for AvatarController {
    fn assemble(registry: &Registry) -> Result<Self, WiringError> {
        Ok(Self::new(registry.resolve::<dyn UploadFile>("AvatarController")?))
    }
}

/// Every screen of the application, assembled at startup.
pub struct Screens {
    pub login: LoginController,
    pub feed: FeedController,
    pub avatar: AvatarController,
}

impl Assemble for Screens {
    fn assemble(registry: &Registry) -> Result<Self, WiringError> {
        let screens = Self {
            login: LoginController::assemble(registry)?,
            feed: FeedController::assemble(registry)?,
            avatar: AvatarController::assemble(registry)?,
        };
        info!(contracts = registry.len(), "Screens assembled");
        Ok(screens)
    }
}

/// Bind every contract to a capability backed by `client`.
pub fn production(client: Arc<ApiClient>) -> Registry {
    let mut registry = Registry::new();
    registry.bind::<dyn Authenticate>(Arc::new(RemoteLogin::new(Arc::clone(&client))));
    registry.bind::<dyn LoadFeed>(Arc::new(RemoteFeed::new(Arc::clone(&client))));
    registry.bind::<dyn UploadFile>(Arc::new(RemoteUpload::new(client)));
    registry
}

/// Production screens on top of the process-wide executor.
pub fn production_screens() -> Result<Screens, WiringError> {
    Screens::assemble(&production(holder::shared()))
}
