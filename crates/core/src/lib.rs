#![deny(missing_docs)]
//! headwp core: DOM arena, sanitizer, block metadata and headless configuration.

/// Block metadata extraction and DOM predicates.
pub mod block;
/// Headless configuration and site resolution.
pub mod config;
/// Arena DOM for parsed markup.
pub mod dom;
/// Core error types.
pub mod error;
/// Request route preparation.
pub mod query;
/// Allow-list HTML sanitization.
pub mod sanitize;
/// Inline style parsing.
pub mod style;

pub use block::{
    AnchorQuery, BLOCK_ATTRIBUTES_ATTR, BLOCK_NAME_ATTR, BlockMetadata, BlockQuery, is_anchor_tag,
    is_block, is_block_by_name, is_internal_link, to_site_path,
};
pub use config::{
    Customization, DebugConfig, HeadlessConfig, PostType, RedirectStrategy, Settings, SiteConfig,
    SiteSettings, Taxonomy, get_config, set_config,
};
pub use dom::{Document, Element, NodeData, NodeId, NodeRef};
pub use error::{HeadlessError, PredicateError};
pub use query::{PathParam, PreparedQuery, RouteParams, convert_to_path, prepare_query};
pub use sanitize::{AllowList, DisallowedTags, Sanitizer, parse_html, sanitize_html};
pub use style::{StyleMap, parse_style};
