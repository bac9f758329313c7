//! Resolution of listing metadata URIs into descriptive fields.
//!
//! Three URI encodings are in circulation on-chain:
//! - inline base64-encoded JSON (`data:application/json;base64,...`),
//! - an HTTPS URL whose body is the JSON document,
//! - a bare content-addressed path (legacy records, `ipfs://...`).
//!
//! Each scheme gets its own strict parse; within a document, legacy field
//! spellings resolve through explicit ordered alias lists rather than ad
//! hoc probing. Resolution never fails: anything unparseable degrades to
//! fields derived from the URI path itself.

use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Data-URI prefix for inline metadata.
pub const INLINE_JSON_PREFIX: &str = "data:application/json;base64,";

/// Timeout for metadata document fetches.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Accepted spellings per field, in resolution order.
const NAME_ALIASES: &[&str] = &["name", "title"];
const IMAGE_ALIASES: &[&str] = &["image", "imageUrl", "image_url"];
const DESCRIPTION_ALIASES: &[&str] = &["description", "details"];
const PLATFORM_ALIASES: &[&str] = &["platform", "source"];

/// Descriptive fields presented next to a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFields {
    pub name: String,
    pub platform: String,
    pub image_url: String,
    pub description: String,
}

impl Default for MetadataFields {
    fn default() -> Self {
        Self {
            name: "Untitled".to_owned(),
            platform: "Unknown".to_owned(),
            image_url: String::new(),
            description: String::new(),
        }
    }
}

/// The known URI encodings, as a tagged union.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataUri {
    /// JSON document carried inline, base64-encoded.
    InlineBase64(String),
    /// JSON document behind an HTTPS URL.
    Https(String),
    /// Legacy content-addressed path; no document to fetch.
    LegacyPath(String),
}

impl MetadataUri {
    pub fn classify(uri: &str) -> Self {
        if let Some(payload) = uri.strip_prefix(INLINE_JSON_PREFIX) {
            Self::InlineBase64(payload.to_owned())
        } else if uri.starts_with("https://") {
            Self::Https(uri.to_owned())
        } else {
            Self::LegacyPath(uri.strip_prefix("ipfs://").unwrap_or(uri).to_owned())
        }
    }
}

/// Parse failures on the strict per-scheme paths. The resolver recovers
/// all of these into path-derived fields; they exist for logging.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("inline payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("metadata document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("metadata fetch returned status {0}")]
    Status(reqwest::StatusCode),
}

fn first_string(doc: &Value, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .find_map(|key| doc.get(key))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// Platform lives in the attribute list on well-formed documents
/// (`trait_type == "platform"`); older ones used a top-level key.
fn platform_field(doc: &Value) -> Option<String> {
    let from_attributes = doc
        .get("attributes")
        .and_then(Value::as_array)
        .and_then(|attrs| {
            attrs
                .iter()
                .find(|attr| attr.get("trait_type").and_then(Value::as_str) == Some("platform"))
        })
        .and_then(|attr| attr.get("value"))
        .and_then(Value::as_str)
        .map(str::to_owned);

    from_attributes.or_else(|| first_string(doc, PLATFORM_ALIASES))
}

/// Extract descriptive fields from a parsed metadata document.
pub fn fields_from_document(doc: &Value) -> MetadataFields {
    let defaults = MetadataFields::default();
    MetadataFields {
        name: first_string(doc, NAME_ALIASES).unwrap_or(defaults.name),
        platform: platform_field(doc).unwrap_or(defaults.platform),
        image_url: first_string(doc, IMAGE_ALIASES).unwrap_or(defaults.image_url),
        description: first_string(doc, DESCRIPTION_ALIASES).unwrap_or(defaults.description),
    }
}

/// Strict parse of an inline base64 JSON payload.
pub fn parse_inline(payload: &str) -> Result<MetadataFields, MetadataError> {
    let bytes = general_purpose::STANDARD.decode(payload)?;
    let doc: Value = serde_json::from_slice(&bytes)?;
    Ok(fields_from_document(&doc))
}

/// Derive what little we can from a bare path: last segment as the name,
/// first segment as the platform.
pub fn fields_from_path(path: &str) -> MetadataFields {
    let trimmed = path.strip_prefix("ipfs://").unwrap_or(path);
    let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
    let defaults = MetadataFields::default();

    MetadataFields {
        name: segments
            .last()
            .map(|s| s.to_string())
            .unwrap_or(defaults.name),
        platform: segments
            .first()
            .map(|s| s.to_string())
            .unwrap_or(defaults.platform),
        ..defaults
    }
}

/// Fetching resolver for the HTTPS scheme, with an optional same-origin
/// proxy for hosts that block direct cross-origin reads.
pub struct MetadataResolver {
    http: reqwest::Client,
    proxy_base: Option<String>,
    timeout: Duration,
}

impl MetadataResolver {
    pub fn new(proxy_base: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            proxy_base,
            timeout: FETCH_TIMEOUT,
        }
    }

    /// Resolve any supported URI to descriptive fields. Infallible: network
    /// and parse failures degrade to path-derived fields.
    pub async fn resolve(&self, uri: &str) -> MetadataFields {
        match MetadataUri::classify(uri) {
            MetadataUri::InlineBase64(payload) => match parse_inline(&payload) {
                Ok(fields) => fields,
                Err(err) => {
                    warn!(error = %err, "inline metadata failed to parse");
                    fields_from_path(uri)
                }
            },
            MetadataUri::LegacyPath(path) => fields_from_path(&path),
            MetadataUri::Https(url) => match self.fetch_document(&url).await {
                Ok(doc) => fields_from_document(&doc),
                Err(err) => {
                    debug!(error = %err, "metadata fetch failed on every route");
                    fields_from_path(&url)
                }
            },
        }
    }

    async fn fetch_document(&self, url: &str) -> Result<Value, MetadataError> {
        match self.fetch_json(url, &[]).await {
            Ok(doc) => Ok(doc),
            Err(err) => {
                let Some(proxy) = &self.proxy_base else {
                    return Err(err);
                };
                debug!(error = %err, "direct metadata fetch failed, trying proxy");
                self.fetch_json(proxy, &[("url", url)]).await
            }
        }
    }

    async fn fetch_json(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, MetadataError> {
        let response = self
            .http
            .get(url)
            .query(query)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MetadataError::Status(response.status()));
        }

        Ok(response.json().await?)
    }
}
