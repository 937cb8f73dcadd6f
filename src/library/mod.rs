//! Library manager module
//!
//! Knows which movies are already tracked and accepts acquisition requests.
//! [`RadarrClient`] is the production [`LibraryGateway`].

mod client;
mod models;

pub use client::RadarrClient;
pub use models::*;

use async_trait::async_trait;
use std::collections::HashSet;

use crate::error::BridgeResult;

/// Access to the library manager.
#[async_trait]
pub trait LibraryGateway: Send + Sync {
    /// Catalog ids of every movie the library already tracks.
    async fn list_known_identifiers(&self) -> BridgeResult<HashSet<i64>>;

    /// Ask the library to add, monitor and search for one movie.
    async fn submit(&self, request: &AcquisitionRequest) -> BridgeResult<AcquisitionResult>;
}
