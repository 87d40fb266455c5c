//! NAPI-exposed data structures.

use napi_derive::napi;
use serde_json::Value as JsonValue;

/// Options accepted by `sanitizeHtml`.
#[napi(object)]
#[derive(Debug, Clone, Default)]
pub struct SanitizeOptions {
    /// Tag to attribute-list mapping (JSON). Defaults to the safe block-markup list.
    pub allow_list: Option<JsonValue>,
    /// `"unwrap"` (default) keeps the content of disallowed tags, `"strip"` drops it.
    pub disallowed_tags: Option<String>,
}

/// Options passed to the renderer constructor.
#[napi(object)]
#[derive(Debug, Clone, Default)]
pub struct RendererConfig {
    /// Tag to attribute-list mapping (JSON). Defaults to the safe block-markup list.
    pub allow_list: Option<JsonValue>,
    /// `"unwrap"` (default) or `"strip"`.
    pub disallowed_tags: Option<String>,
    /// Rule registry configuration (JSON).
    pub registry: Option<JsonValue>,
    /// Hand parsed `data-wp-block` metadata to matched components.
    pub forward_block_attributes: Option<bool>,
    /// `"fallback"` (default) or `"propagate"`.
    pub predicate_failure: Option<String>,
}

/// Per-call render options.
#[napi(object)]
#[derive(Debug, Clone, Default)]
pub struct RenderCallOptions {
    /// WordPress URL of the request site, used by link predicates.
    pub source_url: Option<String>,
    /// Also serialize the tree back to HTML.
    pub include_html: Option<bool>,
}

/// Result of rendering one HTML fragment.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct RenderResult {
    /// Render tree (`element`, `text` and `component` nodes).
    pub nodes: JsonValue,
    /// HTML serialization of the tree, when requested.
    pub html: Option<String>,
}

/// A route resolved against the headless settings.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct PreparedRoute {
    /// Normalized route path.
    pub path: String,
    /// Resolved site settings.
    pub site: JsonValue,
}
