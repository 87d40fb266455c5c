#![deny(missing_docs)]
//! Node.js bindings that surface headwp's Rust implementation.

use headwp_blocks::PredicateFailure;
use headwp_core::{AllowList, DisallowedTags, HeadlessError, Sanitizer, SiteSettings, parse_style};
use napi::bindgen_prelude::*;
use std::result::Result;
use napi_derive::napi;
use serde_json::Value as JsonValue;

/// Batch processing types.
pub mod batch;
/// The reusable renderer and its configuration.
pub mod renderer;
/// Resolved headless settings.
pub mod settings;
/// NAPI-exposed data structures.
pub mod types;
pub use batch::*;
pub use types::*;

/// Sanitizes an HTML fragment against an allow-list.
#[napi(js_name = "sanitizeHtml")]
pub fn sanitize_html_napi(html: String, options: Option<SanitizeOptions>) -> napi::Result<String> {
    let opts = options.unwrap_or_default();
    let sanitizer =
        build_sanitizer(opts.allow_list, opts.disallowed_tags.as_deref()).map_err(convert_error)?;
    sanitizer.sanitize(&html).map_err(convert_error)
}

/// Sanitizes and renders one fragment with a throwaway renderer.
///
/// Prefer `HeadlessRenderer` when rendering more than one fragment.
#[napi(js_name = "renderBlocks")]
pub fn render_blocks_napi(
    html: String,
    config: Option<RendererConfig>,
    options: Option<RenderCallOptions>,
) -> napi::Result<RenderResult> {
    let config = renderer::InternalRendererConfig::new(config).map_err(convert_error)?;
    let opts = options.unwrap_or_default();
    let site = site_for_source(opts.source_url);
    config
        .render(&html, site.as_ref(), opts.include_html.unwrap_or(false))
        .map_err(convert_error)
}

/// Parses an inline `style` attribute into a camelCase property map.
#[napi(js_name = "parseStyle")]
pub fn parse_style_napi(style: String) -> JsonValue {
    JsonValue::from(&parse_style(&style))
}

pub(crate) fn build_sanitizer(
    allow_list: Option<JsonValue>,
    disallowed_tags: Option<&str>,
) -> Result<Sanitizer, HeadlessError> {
    let allow_list = match allow_list {
        Some(value) => serde_json::from_value::<AllowList>(value)?,
        None => AllowList::default(),
    };
    let disallowed = match disallowed_tags {
        None | Some("unwrap") => DisallowedTags::Unwrap,
        Some("strip") => DisallowedTags::Strip,
        Some(other) => {
            return Err(HeadlessError::config(format!(
                "unknown disallowedTags mode '{other}', expected 'unwrap' or 'strip'"
            )));
        }
    };
    Ok(Sanitizer::new(allow_list).with_disallowed_tags(disallowed))
}

pub(crate) fn parse_predicate_failure(
    mode: Option<&str>,
) -> Result<PredicateFailure, HeadlessError> {
    match mode {
        None | Some("fallback") => Ok(PredicateFailure::Fallback),
        Some("propagate") => Ok(PredicateFailure::Propagate),
        Some(other) => Err(HeadlessError::config(format!(
            "unknown predicateFailure mode '{other}', expected 'fallback' or 'propagate'"
        ))),
    }
}

/// Minimal site context for callers that only know the WordPress URL.
pub(crate) fn site_for_source(source_url: Option<String>) -> Option<SiteSettings> {
    source_url.map(|url| SiteSettings {
        source_url: Some(url),
        ..SiteSettings::default()
    })
}

pub(crate) fn convert_error(err: HeadlessError) -> Error {
    match err {
        HeadlessError::Config { message } => {
            Error::new(Status::InvalidArg, format!("Config error: {}", message))
        }
        err @ HeadlessError::SiteNotFound { .. } => Error::new(Status::InvalidArg, err.to_string()),
        HeadlessError::Io(e) => Error::from_reason(format!("IO error: {}", e)),
        HeadlessError::Internal(msg) => Error::from_reason(format!("Internal error: {}", msg)),
        other => Error::from_reason(other.to_string()),
    }
}
