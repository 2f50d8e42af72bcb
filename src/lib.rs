//! # switchboard
//!
//! One shared API client for many independent feature modules.
//!
//! - [`client::ApiClient`] is the single executor: it only knows `execute`.
//! - [`capabilities`] attach named operations (`login`, `load_feed`, `upload`)
//!   to the executor from their own modules.
//! - [`holder`] builds the executor once per process and lets tests swap it.
//! - [`features`] declare the one-operation contracts their screens depend on.
//! - [`wiring`] binds capabilities to contracts at startup.
//!
//! ```rust,no_run
//! use switchboard::wiring;
//!
//! # async fn example() -> Result<(), switchboard::wiring::WiringError> {
//! let screens = wiring::production_screens()?;
//! screens.feed.view_did_load().await;
//! for item in screens.feed.items() {
//!     println!("{}", item.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod capabilities;
pub mod client;
pub mod config;
pub mod error;
pub mod features;
pub mod holder;
pub mod net;
pub mod testing;
pub mod wiring;

pub use client::{ApiClient, ApiRequest, ApiResponse, RetryPolicy};
pub use error::{ClientError, Result};
pub use holder::{Holder, HolderState, Substitution};
pub use wiring::{Assemble, Registry, Screens, WiringError};
