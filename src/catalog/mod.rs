//! Metadata catalog module
//!
//! The catalog is where candidate movies come from. The workflow only sees the
//! [`CatalogGateway`] trait; [`TmdbClient`] is the production adapter.

mod client;
mod models;

pub use client::TmdbClient;
pub use models::*;

use async_trait::async_trait;

use crate::error::BridgeResult;

/// Read access to the metadata catalog.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Fetch the candidates of a listing, in catalog order.
    async fn fetch(&self, category: MovieCategory) -> BridgeResult<Vec<CatalogItem>>;

    /// Fetch a single movie by catalog id.
    async fn fetch_detail(&self, id: i64) -> BridgeResult<CatalogItem>;
}
