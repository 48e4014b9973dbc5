//! Update-check response interpretation.

use reqwest::Url;
use serde_json::Value;

use crate::core::MirrorError;
use crate::models::UpdateRecord;

/// Extract the [`UpdateRecord`] for `product_id` from a response body.
///
/// The body must be a JSON object keyed by product id; the entry must carry a
/// non-empty `version` and an absolute `package` URL. `url` is the endpoint
/// that was queried and only appears in diagnostics.
///
/// # Errors
///
/// - [`MirrorError::UnexpectedResponseKind`] when the body is not a JSON object
/// - [`MirrorError::ProductNotFound`] when the object has no `product_id` key
/// - [`MirrorError::InvalidUpdateRecord`] when the entry is unusable
pub fn parse_update_response(
    body: &str,
    product_id: &str,
    url: &str,
) -> Result<UpdateRecord, MirrorError> {
    let unexpected = || MirrorError::UnexpectedResponseKind {
        url: url.to_string(),
    };

    let value: Value = serde_json::from_str(body).map_err(|_| unexpected())?;
    let products = value.as_object().ok_or_else(unexpected)?;
    let entry = products.get(product_id).ok_or_else(|| MirrorError::ProductNotFound {
        product_id: product_id.to_string(),
    })?;

    let invalid = |reason: &str| MirrorError::InvalidUpdateRecord {
        product_id: product_id.to_string(),
        reason: reason.to_string(),
    };

    let entry = entry.as_object().ok_or_else(|| invalid("entry is not an object"))?;
    let version = entry
        .get("version")
        .and_then(scalar_text)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| invalid("missing version"))?;
    if !is_tag_suffix(&version) {
        return Err(invalid(&format!("version cannot name a release tag: {version:?}")));
    }
    let package_url = entry
        .get("package")
        .and_then(scalar_text)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| invalid("missing package URL"))?;

    if Url::parse(&package_url).is_err() {
        return Err(invalid(&format!("package URL is not absolute: {package_url}")));
    }

    Ok(UpdateRecord {
        version,
        package_url,
    })
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Whether `version` can follow the `v` of a tag and the `-` of an archive
/// file name: no whitespace, control characters, path separators, `..`, or
/// characters git refuses in ref names.
fn is_tag_suffix(version: &str) -> bool {
    !version.contains("..")
        && !version.contains("@{")
        && !version.ends_with('.')
        && !version.ends_with(".lock")
        && !version.chars().any(|c| {
            c.is_whitespace()
                || c.is_control()
                || matches!(c, '/' | '\\' | '~' | '^' | ':' | '?' | '*' | '[')
        })
}
