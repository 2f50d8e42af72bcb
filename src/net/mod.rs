//! Transport layer underneath the shared executor.

pub mod client;
pub mod traits;

pub use client::{HttpClient, HttpClientBuilder};
pub use traits::Transport;
