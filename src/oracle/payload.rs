//! Update-check request payload.

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;

use crate::core::MirrorError;
use crate::json::{self, EncodeOptions};

/// One product entry of the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductQuery {
    /// Vendor product identifier.
    pub product_id: String,
    /// Always empty: ask for the latest file of the product.
    pub file_id: String,
}

/// `{"products": {"<id>": {"product_id": "<id>", "file_id": ""}, ...}}`
///
/// Entries are kept sorted by [`compare_product_ids`] so the serialized body,
/// and therefore the signature, does not depend on the order ids were given in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCheckPayload {
    products: Vec<ProductQuery>,
}

impl UpdateCheckPayload {
    /// Payload asking for the latest version of each product in `ids`.
    /// Duplicate ids collapse into one entry.
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut products: Vec<ProductQuery> = ids
            .into_iter()
            .map(|id| {
                let product_id = id.into();
                ProductQuery {
                    product_id,
                    file_id: String::new(),
                }
            })
            .collect();
        products.sort_by(|a, b| compare_product_ids(&a.product_id, &b.product_id));
        products.dedup_by(|a, b| a.product_id == b.product_id);

        Self {
            products,
        }
    }

    /// Product ids in serialization order.
    pub fn product_ids(&self) -> impl Iterator<Item = &str> {
        self.products.iter().map(|p| p.product_id.as_str())
    }

    /// Request body, compact, in the canonical encoding.
    pub fn to_body(&self) -> Result<String, MirrorError> {
        Ok(json::encode(self, EncodeOptions::CANONICAL)?)
    }
}

impl Serialize for UpdateCheckPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut payload = serializer.serialize_struct("UpdateCheckPayload", 1)?;
        payload.serialize_field("products", &ProductMap(&self.products))?;
        payload.end()
    }
}

struct ProductMap<'a>(&'a [ProductQuery]);

impl Serialize for ProductMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for product in self.0 {
            map.serialize_entry(&product.product_id, product)?;
        }
        map.end()
    }
}

/// Ascending key order of the payload.
///
/// Ids written as canonical unsigned integers (no sign, no leading zeros)
/// compare numerically and sort before all other ids; the rest compare
/// byte-wise. This is a total order, so sorting is reproducible for any set
/// of ids.
pub fn compare_product_ids(a: &str, b: &str) -> Ordering {
    match (canonical_integer(a), canonical_integer(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn canonical_integer(id: &str) -> Option<u64> {
    let canonical = !id.is_empty()
        && id.bytes().all(|b| b.is_ascii_digit())
        && (id == "0" || !id.starts_with('0'));
    if canonical { id.parse().ok() } else { None }
}
