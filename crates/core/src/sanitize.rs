//! HTML sanitization driven by a tag/attribute allow-list.
//!
//! Sanitizing runs as a single lol_html rewriting pass over the raw string;
//! the cleaned markup is then parsed into a [`Document`].

use crate::HeadlessError;
use crate::dom::Document;
use html_escape::decode_html_entities;
use lol_html::html_content::Element;
use lol_html::{RewriteStrSettings, doc_comments, element, rewrite_str};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Elements removed together with their content under every allow-list.
///
/// Besides script-type elements this covers the raw-text and RCDATA
/// elements, whose content the rewriter never sees as markup.
pub const ALWAYS_REMOVED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "textarea", "title", "xmp", "iframe", "noembed",
    "noframes", "plaintext",
];

/// Attributes whose values are URLs and get scheme-checked.
const URL_ATTRIBUTES: &[&str] = &["href", "src", "action", "formaction", "poster", "cite"];

/// Allow-list key holding attributes permitted on every allowed tag.
pub const GLOBAL_ATTRIBUTES_KEY: &str = "*";

/// Mapping of permitted tag names to permitted attribute names.
///
/// Attribute names ending in `*` match by prefix (`data-*`). Attributes listed
/// under the `"*"` key are allowed on every permitted tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, Vec<String>>",
    into = "BTreeMap<String, Vec<String>>"
)]
pub struct AllowList {
    tags: BTreeMap<String, Vec<String>>,
}

impl AllowList {
    /// An allow-list that permits no tags at all.
    pub fn empty() -> Self {
        Self {
            tags: BTreeMap::new(),
        }
    }

    /// Builds an allow-list from a tag -> attributes mapping.
    pub fn new(tags: BTreeMap<String, Vec<String>>) -> Self {
        let tags = tags
            .into_iter()
            .map(|(tag, attrs)| {
                let attrs = attrs.into_iter().map(|a| a.to_ascii_lowercase()).collect();
                (tag.to_ascii_lowercase(), attrs)
            })
            .collect();
        Self { tags }
    }

    /// Permits `tag` with the given attributes, replacing any previous entry.
    pub fn allow(mut self, tag: &str, attrs: &[&str]) -> Self {
        self.tags.insert(
            tag.to_ascii_lowercase(),
            attrs.iter().map(|a| a.to_ascii_lowercase()).collect(),
        );
        self
    }

    /// Returns true if `tag` may appear in sanitized output.
    pub fn is_tag_allowed(&self, tag: &str) -> bool {
        tag != GLOBAL_ATTRIBUTES_KEY
            && !ALWAYS_REMOVED_TAGS.contains(&tag)
            && self.tags.contains_key(tag)
    }

    /// Returns true if `attr` may stay on an allowed `tag`.
    pub fn is_attribute_allowed(&self, tag: &str, attr: &str) -> bool {
        let matches = |patterns: &Vec<String>| patterns.iter().any(|p| attribute_matches(p, attr));
        self.tags.get(tag).is_some_and(matches)
            || self.tags.get(GLOBAL_ATTRIBUTES_KEY).is_some_and(matches)
    }

    /// Iterates the permitted tag names.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags
            .keys()
            .map(String::as_str)
            .filter(|tag| *tag != GLOBAL_ATTRIBUTES_KEY)
    }
}

impl Default for AllowList {
    /// The safe subset of block-editor markup.
    fn default() -> Self {
        const PLAIN: &[&str] = &[
            "div", "span", "section", "article", "aside", "header", "footer", "main", "nav",
            "figure", "figcaption", "p", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "code",
            "strong", "b", "em", "i", "u", "s", "del", "ins", "mark", "small", "sub", "sup",
            "abbr", "br", "hr", "ul", "li", "dl", "dt", "dd", "picture", "table", "caption",
            "thead", "tbody", "tfoot", "tr", "summary", "cite",
        ];

        let mut list = AllowList::empty().allow(
            GLOBAL_ATTRIBUTES_KEY,
            &[
                "class", "id", "style", "title", "lang", "dir", "role", "aria-*", "data-*",
            ],
        );
        for tag in PLAIN {
            list = list.allow(tag, &[]);
        }

        list.allow("a", &["href", "target", "rel", "download", "hreflang"])
            .allow(
                "img",
                &[
                    "src", "alt", "width", "height", "srcset", "sizes", "loading", "decoding",
                ],
            )
            .allow("source", &["src", "srcset", "type", "media", "sizes"])
            .allow(
                "video",
                &[
                    "src", "controls", "poster", "width", "height", "loop", "muted",
                    "autoplay", "playsinline", "preload",
                ],
            )
            .allow("audio", &["src", "controls", "loop", "muted", "autoplay", "preload"])
            .allow("blockquote", &["cite"])
            .allow("ol", &["start", "reversed", "type"])
            .allow("time", &["datetime"])
            .allow("th", &["colspan", "rowspan", "scope"])
            .allow("td", &["colspan", "rowspan"])
            .allow("details", &["open"])
    }
}

impl From<BTreeMap<String, Vec<String>>> for AllowList {
    fn from(tags: BTreeMap<String, Vec<String>>) -> Self {
        Self::new(tags)
    }
}

impl From<AllowList> for BTreeMap<String, Vec<String>> {
    fn from(list: AllowList) -> Self {
        list.tags
    }
}

fn attribute_matches(pattern: &str, attr: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => attr.starts_with(prefix),
        None => pattern == attr,
    }
}

/// How tags missing from the allow-list are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DisallowedTags {
    /// Remove the tag but keep its children.
    #[default]
    Unwrap,
    /// Remove the tag and everything inside it.
    Strip,
}

/// Allow-list sanitizer.
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    allow_list: AllowList,
    disallowed: DisallowedTags,
}

impl Sanitizer {
    /// Creates a sanitizer for the given allow-list.
    pub fn new(allow_list: AllowList) -> Self {
        Self {
            allow_list,
            disallowed: DisallowedTags::default(),
        }
    }

    /// Sets the treatment of disallowed tags.
    pub fn with_disallowed_tags(mut self, disallowed: DisallowedTags) -> Self {
        self.disallowed = disallowed;
        self
    }

    /// The allow-list in use.
    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// Returns sanitized markup.
    pub fn sanitize(&self, html: &str) -> Result<String, HeadlessError> {
        let settings = RewriteStrSettings {
            element_content_handlers: vec![element!("*", |el| {
                self.clean_element(el);
                Ok(())
            })],
            document_content_handlers: vec![doc_comments!(|comment| {
                comment.remove();
                Ok(())
            })],
            ..RewriteStrSettings::new()
        };

        rewrite_str(html, settings).map_err(|err| HeadlessError::Sanitize(err.to_string()))
    }

    /// Sanitizes and parses markup into a [`Document`].
    pub fn parse(&self, html: &str) -> Result<Document, HeadlessError> {
        let clean = self.sanitize(html)?;
        Ok(Document::parse_fragment(&clean))
    }

    fn clean_element(&self, el: &mut Element<'_, '_>) {
        let tag = el.tag_name().to_ascii_lowercase();

        if ALWAYS_REMOVED_TAGS.contains(&tag.as_str()) {
            el.remove();
            return;
        }

        if !self.allow_list.is_tag_allowed(&tag) {
            match self.disallowed {
                DisallowedTags::Unwrap => el.remove_and_keep_content(),
                DisallowedTags::Strip => el.remove(),
            }
            return;
        }

        let rejected: Vec<String> = el
            .attributes()
            .iter()
            .filter_map(|attr| {
                let name = attr.name().to_ascii_lowercase();
                let keep = !name.starts_with("on")
                    && self.allow_list.is_attribute_allowed(&tag, &name)
                    && !(URL_ATTRIBUTES.contains(&name.as_str()) && is_unsafe_url(&attr.value()));
                (!keep).then(|| attr.name())
            })
            .collect();

        for name in rejected {
            log::debug!("Removing attribute '{}' from <{}>", name, tag);
            el.remove_attribute(&name);
        }
    }
}

/// Checks a raw attribute value, character references included.
///
/// A `&` left in the scheme part after decoding is an unknown reference and
/// counts as unsafe.
fn is_unsafe_url(value: &str) -> bool {
    let compact: String = decode_html_entities(value)
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    let scheme_part = compact.split(['/', '?', '#']).next().unwrap_or_default();
    scheme_part.contains('&')
        || compact.starts_with("javascript:")
        || compact.starts_with("vbscript:")
        || (compact.starts_with("data:") && !compact.starts_with("data:image/"))
}

/// Sanitizes markup with `allow_list`, or the default allow-list when `None`.
pub fn sanitize_html(html: &str, allow_list: Option<&AllowList>) -> Result<String, HeadlessError> {
    sanitizer_for(allow_list).sanitize(html)
}

/// Sanitizes and parses markup with `allow_list`, or the default when `None`.
pub fn parse_html(html: &str, allow_list: Option<&AllowList>) -> Result<Document, HeadlessError> {
    sanitizer_for(allow_list).parse(html)
}

fn sanitizer_for(allow_list: Option<&AllowList>) -> Sanitizer {
    Sanitizer::new(allow_list.cloned().unwrap_or_default())
}
