//! Block metadata extraction and DOM predicates for block-editor markup.

use crate::config::SiteSettings;
use crate::dom::NodeRef;
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

/// Attribute holding the JSON-encoded block attributes.
pub const BLOCK_ATTRIBUTES_ATTR: &str = "data-wp-block";
/// Attribute holding the block name (`core/heading`).
pub const BLOCK_NAME_ATTR: &str = "data-wp-block-name";

/// Block name, class and attributes read from a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockMetadata {
    /// Block name from `data-wp-block-name`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The node's `class` attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Parsed `data-wp-block` object (empty when absent or malformed).
    pub attributes: Map<String, Value>,
}

impl BlockMetadata {
    /// Reads block metadata, degrading malformed attributes to an empty object.
    pub fn from_node(node: NodeRef<'_>) -> Self {
        Self {
            name: node.attr(BLOCK_NAME_ATTR).map(str::to_string),
            class_name: node.attr("class").map(str::to_string),
            attributes: parse_block_attributes(node).unwrap_or_default(),
        }
    }

    /// Reads metadata for forwarding to a matched component.
    ///
    /// Returns `None` when the node carries no block data, or when
    /// `data-wp-block` is present but not a JSON object.
    pub fn forwarded(node: NodeRef<'_>) -> Option<Self> {
        let name = node.attr(BLOCK_NAME_ATTR);
        let attributes = match node.attr(BLOCK_ATTRIBUTES_ATTR) {
            Some(_) => parse_block_attributes(node)?,
            None if name.is_some() => Map::new(),
            None => return None,
        };
        Some(Self {
            name: name.map(str::to_string),
            class_name: node.attr("class").map(str::to_string),
            attributes,
        })
    }

    /// Returns a raw attribute value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key).filter(|v| !v.is_null())
    }

    /// Returns a string attribute.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Returns a numeric attribute, accepting numeric strings.
    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(coerce_number)
    }

    /// Returns an attribute coerced with JavaScript truthiness.
    pub fn get_truthy(&self, key: &str) -> bool {
        self.get(key).is_some_and(is_truthy)
    }
}

/// Parses `data-wp-block` into an object.
pub fn parse_block_attributes(node: NodeRef<'_>) -> Option<Map<String, Value>> {
    let raw = node.attr(BLOCK_ATTRIBUTES_ATTR)?;
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Some(map),
        Ok(other) => {
            log::debug!("Ignoring non-object block attributes: {}", other);
            None
        }
        Err(err) => {
            log::debug!("Ignoring malformed block attributes: {}", err);
            None
        }
    }
}

/// JavaScript truthiness of a JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Numbers pass through; non-empty numeric strings are parsed.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Tag and class requirements for [`is_block`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockQuery<'a> {
    /// Required tag name (case-insensitive).
    pub tag_name: Option<&'a str>,
    /// Classes that must all be present.
    pub class_list: &'a [&'a str],
}

/// Returns true if `node` is an element matching the tag and every class.
pub fn is_block(node: NodeRef<'_>, query: BlockQuery<'_>) -> bool {
    let Some(tag) = node.tag_name() else {
        return false;
    };
    if let Some(expected) = query.tag_name
        && !expected.eq_ignore_ascii_case(tag)
    {
        return false;
    }
    query.class_list.iter().all(|class| node.has_class(class))
}

/// Returns true if `node` declares the given block name.
pub fn is_block_by_name(node: NodeRef<'_>, name: &str) -> bool {
    node.attr(BLOCK_NAME_ATTR) == Some(name)
}

/// Link requirements for [`is_anchor_tag`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchorQuery {
    /// When set, the link must (or must not) be internal to the site.
    pub is_internal_link: Option<bool>,
}

/// Returns true if `node` is an `<a href>` satisfying `query`.
pub fn is_anchor_tag(node: NodeRef<'_>, query: AnchorQuery, site: Option<&SiteSettings>) -> bool {
    if node.tag_name() != Some("a") {
        return false;
    }
    let Some(href) = node.attr("href") else {
        return false;
    };
    match query.is_internal_link {
        Some(expected) => is_internal_link(href, site) == expected,
        None => true,
    }
}

/// Returns true if `href` points inside the site's WordPress source.
///
/// Root-relative paths are always internal. Absolute URLs must share the
/// source URL's host and sit under its path.
pub fn is_internal_link(href: &str, site: Option<&SiteSettings>) -> bool {
    if href.starts_with('/') && !href.starts_with("//") {
        return true;
    }
    let Some(source) = site.and_then(|s| s.source_url.as_deref()) else {
        return false;
    };
    let (Ok(link), Ok(source)) = (Url::parse(href), Url::parse(source)) else {
        return false;
    };
    if link.host_str() != source.host_str()
        || link.port_or_known_default() != source.port_or_known_default()
    {
        return false;
    }

    let base = source.path().trim_end_matches('/');
    let path = link.path();
    match path.strip_prefix(base) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Strips the site's source URL from an internal link, keeping path, query and fragment.
///
/// External links are returned unchanged.
pub fn to_site_path(href: &str, site: Option<&SiteSettings>) -> String {
    if !is_internal_link(href, site) || href.starts_with('/') {
        return href.to_string();
    }
    let (Some(source), Ok(link)) = (
        site.and_then(|s| s.source_url.as_deref())
            .and_then(|s| Url::parse(s).ok()),
        Url::parse(href),
    ) else {
        return href.to_string();
    };

    let base = source.path().trim_end_matches('/');
    let rest = link.path().strip_prefix(base).unwrap_or(link.path());
    let mut out = if rest.is_empty() {
        "/".to_string()
    } else {
        rest.to_string()
    };
    if let Some(query) = link.query() {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = link.fragment() {
        out.push('#');
        out.push_str(fragment);
    }
    out
}
