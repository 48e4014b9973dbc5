//! Vendor update-check API
//!
//! The oracle answers one question per run: what is the latest version of
//! this product, and where can it be downloaded? The request is signed (see
//! [`crate::signing`]) and the answer is a JSON object keyed by product id.
//!
//! - [`payload`] builds the request body with a stable key order
//! - [`response`] turns the response body into an [`UpdateRecord`]
//! - [`client`] sends the request over HTTP

pub mod client;
pub mod payload;
pub mod response;

use async_trait::async_trait;

use crate::core::MirrorError;
use crate::models::{Credentials, ProductReference, UpdateRecord};

pub use client::UpdateCheckClient;
pub use payload::{ProductQuery, UpdateCheckPayload, compare_product_ids};
pub use response::parse_update_response;

/// Source of the latest [`UpdateRecord`] for a product.
#[async_trait]
pub trait UpdateOracle: Send + Sync {
    /// Look up the latest version of `product`.
    ///
    /// # Errors
    ///
    /// [`MirrorError::UnexpectedResponseKind`], [`MirrorError::ProductNotFound`],
    /// [`MirrorError::InvalidUpdateRecord`], or [`MirrorError::Network`].
    async fn check(
        &self,
        credentials: &Credentials,
        product: &ProductReference,
    ) -> Result<UpdateRecord, MirrorError>;
}
